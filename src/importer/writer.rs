// ==========================================
// Console Orientation - Écriture des lignes
// ==========================================
// Responsabilité : substituer aux noms cités les ids du
// plan de résolution, construire l'enregistrement cible et
// l'écrire dans le magasin, ligne par ligne.
// Contrat d'erreur : seule une panne de connectivité du
// magasin remonte en Err (le job s'arrête) ; tout autre
// échec reste local à la ligne (RowOutcome::Failed)
// ==========================================

use crate::domain::company::{CompanyRecord, CompanySeed, NewCompany};
use crate::domain::import::{Anomaly, RowOutcome};
use crate::domain::visit::{NewVisit, VisitRecord};
use crate::importer::column_mapper::fields;
use crate::importer::resolver::{KeyIndex, ReferenceKey, ResolutionPlan};
use crate::repository::company_repo::CompanyRepository;
use crate::repository::error::RepositoryResult;
use crate::repository::visit_repo::VisitRepository;

/// Écrit une ligne entreprise
///
/// # Règles
/// - nom déjà présent dans l'index (magasin ou ligne
///   précédente du fichier) : ligne écartée avec
///   avertissement, aucune écriture
/// - secteur cité en échec de création : la ligne échoue
///   avec le motif propagé, aucune écriture
pub async fn write_company<R>(
    repo: &R,
    sectors: &ResolutionPlan<String>,
    seen: &mut KeyIndex,
    record: CompanyRecord,
) -> RepositoryResult<RowOutcome>
where
    R: CompanyRepository + ?Sized,
{
    let key = ReferenceKey::from_label(&record.name);
    if seen.contains(&key) {
        return Ok(RowOutcome::Skipped(vec![Anomaly::warning(
            record.row_number,
            fields::NAME,
            format!("entreprise « {} » déjà connue, ligne écartée", record.name),
        )]));
    }

    let sector_id = match record.sector.as_deref() {
        None => None,
        Some(label) => match sectors.require(label) {
            Ok(id) => Some(id),
            Err(message) => {
                return Ok(RowOutcome::Failed {
                    row_number: record.row_number,
                    message,
                })
            }
        },
    };

    let new_company = NewCompany {
        name: record.name,
        sector_id,
        address: record.address,
        city: record.city,
        contact: record.contact,
        phone: record.phone,
        email: record.email,
        headcount: record.headcount,
        interest: record.interest,
        notes: record.notes,
    };

    match repo.create(new_company).await {
        Ok(id) => {
            seen.insert(key);
            Ok(RowOutcome::Imported { id })
        }
        Err(e) if e.is_connectivity() => Err(e),
        Err(e) => Ok(RowOutcome::Failed {
            row_number: record.row_number,
            message: e.to_string(),
        }),
    }
}

/// Écrit une ligne visite
///
/// L'entreprise citée doit être résolue (existante ou créée
/// pendant ce job) ; une création d'entreprise échouée fait
/// échouer chaque ligne qui la cite, avec le motif propagé
pub async fn write_visit<R>(
    repo: &R,
    companies: &ResolutionPlan<CompanySeed>,
    record: VisitRecord,
) -> RepositoryResult<RowOutcome>
where
    R: VisitRepository + ?Sized,
{
    let company_id = match companies.require(&record.company) {
        Ok(id) => id,
        Err(message) => {
            return Ok(RowOutcome::Failed {
                row_number: record.row_number,
                message,
            })
        }
    };

    let new_visit = NewVisit {
        company_id,
        visit_date: record.visit_date,
        advisor: record.advisor,
        participants: record.participants,
        interest: record.interest,
        report: record.report,
    };

    match repo.create(new_visit).await {
        Ok(id) => Ok(RowOutcome::Imported { id }),
        Err(e) if e.is_connectivity() => Err(e),
        Err(e) => Ok(RowOutcome::Failed {
            row_number: record.row_number,
            message: e.to_string(),
        }),
    }
}
