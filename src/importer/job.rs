// ==========================================
// Console Orientation - Orchestration des jobs d'import
// ==========================================
// Cycle de vie : CREE → VALIDATION → {INTERROMPU | TRAITEMENT} → TERMINE
// Phases strictement séquentielles : lecture → entête →
// normalisation → résolution → création → écriture.
// Une erreur d'entête interrompt le job avec un rapport
// (aucune ligne traitée) ; une panne de connectivité
// arrête le job, marque les lignes restantes en échec et
// renvoie le rapport partiel ; il n'y a aucun retour en
// arrière sur les lignes déjà écrites.
// ==========================================

use crate::domain::company::{CompanyRecord, CompanySeed, NewCompany};
use crate::domain::import::{ImportBatch, ImportReport};
use crate::domain::types::ImportKind;
use crate::domain::visit::VisitRecord;
use crate::importer::column_mapper::{map_headers, synonym_table, RawRow};
use crate::importer::error::ImportResult;
use crate::importer::file_parser::{FileParser, UniversalFileParser};
use crate::importer::normalizer::{normalize_company, normalize_visit};
use crate::importer::resolver::{KeyIndex, ResolutionPlan};
use crate::importer::writer::{write_company, write_visit};
use crate::repository::company_repo::CompanyRepository;
use crate::repository::error::RepositoryError;
use crate::repository::import_batch_repo::ImportBatchRepository;
use crate::repository::sector_repo::SectorRepository;
use crate::repository::visit_repo::VisitRepository;
use chrono::Utc;
use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// JobState - États du job
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Created,
    Validating,
    Processing,
    Completed,
    Aborted,
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            JobState::Created => "CREE",
            JobState::Validating => "VALIDATION",
            JobState::Processing => "TRAITEMENT",
            JobState::Completed => "TERMINE",
            JobState::Aborted => "INTERROMPU",
        };
        write!(f, "{label}")
    }
}

fn transition(state: &mut JobState, next: JobState, batch_id: &str) {
    debug!(batch_id = %batch_id, de = %state, vers = %next, "changement d'état du job");
    *state = next;
}

// ==========================================
// Étapes partagées par les deux surfaces
// ==========================================

/// Résultat de la phase de lecture : lignes projetées, ou
/// erreur d'entête qui interrompt le job avec un rapport
enum ReadOutcome {
    Rows(Vec<RawRow>),
    HeaderError(String),
}

fn file_label(file_path: &Path) -> Option<String> {
    file_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

/// Lit le fichier et fait correspondre l'entête.
/// Les erreurs d'entête (colonne obligatoire absente,
/// fichier vide) deviennent un ReadOutcome::HeaderError ;
/// les autres erreurs de lecture restent fatales
fn read_rows(
    parser: &UniversalFileParser,
    file_path: &Path,
    kind: ImportKind,
    batch_id: &str,
) -> ImportResult<ReadOutcome> {
    let table = match parser.parse(file_path) {
        Ok(table) => table,
        Err(e) if e.is_header_error() => return Ok(ReadOutcome::HeaderError(e.to_string())),
        Err(e) => {
            error!(batch_id = %batch_id, error = %e, "lecture du fichier en échec");
            return Err(e);
        }
    };
    info!(batch_id = %batch_id, lignes = table.rows.len(), "fichier lu");

    let mapping = match map_headers(&table.headers, synonym_table(kind)) {
        Ok(mapping) => mapping,
        Err(e) => return Ok(ReadOutcome::HeaderError(e.to_string())),
    };
    debug!(batch_id = %batch_id, colonnes = mapping.mapped_fields(), "entête mise en correspondance");

    Ok(ReadOutcome::Rows(
        table.rows.iter().map(|row| mapping.project(row)).collect(),
    ))
}

fn batch_from_report(report: &ImportReport, operator: &str) -> ImportBatch {
    ImportBatch {
        batch_id: report.batch_id.clone(),
        kind: report.kind,
        file: report.file.clone(),
        total_rows: report.total_rows as i64,
        imported: report.imported as i64,
        skipped: report.skipped as i64,
        failed: report.failed as i64,
        created_entities: report.created_entities as i64,
        report_json: serde_json::to_string(report).ok(),
        imported_by: Some(operator.to_string()),
        imported_at: Utc::now(),
        elapsed_ms: Some(report.elapsed_ms as i64),
    }
}

/// Écrit la trace d'historique. Un échec ici est journalisé
/// mais ne fait pas échouer le job : le rapport reste
/// l'issue de référence
async fn persist_batch<B>(batch_repo: &B, report: &ImportReport, operator: &str)
where
    B: ImportBatchRepository + ?Sized,
{
    if let Err(e) = batch_repo.insert(batch_from_report(report, operator)).await {
        warn!(batch_id = %report.batch_id, error = %e, "écriture de la trace d'historique en échec");
    }
}

/// Clôt un job interrompu sur erreur d'entête
async fn finish_aborted<B>(
    batch_repo: &B,
    mut report: ImportReport,
    message: String,
    start: Instant,
    operator: &str,
) -> ImportResult<ImportReport>
where
    B: ImportBatchRepository + ?Sized,
{
    warn!(batch_id = %report.batch_id, motif = %message, etat = %JobState::Aborted, "job interrompu sur erreur d'entête");
    report.header_error = Some(message);
    report.elapsed_ms = start.elapsed().as_millis() as u64;
    persist_batch(batch_repo, &report, operator).await;
    Ok(report)
}

/// Clôt un job arrêté sur panne de connectivité : chaque
/// ligne restante passe en échec avec le motif, le rapport
/// partiel est renvoyé tel quel (pas de retour en arrière)
async fn finish_halted<B>(
    batch_repo: &B,
    mut report: ImportReport,
    remaining_rows: Vec<usize>,
    cause: &RepositoryError,
    start: Instant,
    operator: &str,
) -> ImportResult<ImportReport>
where
    B: ImportBatchRepository + ?Sized,
{
    let message = format!("connexion au magasin perdue : {cause}");
    error!(batch_id = %report.batch_id, error = %cause, lignes_restantes = remaining_rows.len(), "panne de connectivité, job arrêté");
    for row_number in remaining_rows {
        report.note_failed(row_number, message.clone());
    }
    report.elapsed_ms = start.elapsed().as_millis() as u64;
    persist_batch(batch_repo, &report, operator).await;
    Ok(report)
}

/// Crée les secteurs en attente du plan : une création par
/// clé distincte, quelle que soit la fréquence du secteur
/// dans le fichier. Un refus du magasin marque la clé en
/// échec ; seule une panne de connectivité remonte en Err
async fn create_pending_sectors<S>(
    sector_repo: &S,
    sectors: &mut ResolutionPlan<String>,
    batch_id: &str,
) -> Result<(), RepositoryError>
where
    S: SectorRepository + ?Sized,
{
    for (key, label) in sectors.pending() {
        match sector_repo.create(&label).await {
            Ok(id) => {
                debug!(batch_id = %batch_id, secteur = %label, id = id, "secteur créé");
                sectors.mark_created(&key, id);
            }
            Err(e) if e.is_connectivity() => return Err(e),
            Err(e) => {
                warn!(batch_id = %batch_id, secteur = %label, error = %e, "création du secteur refusée");
                sectors.mark_failed(&key, e.to_string());
            }
        }
    }
    Ok(())
}

// ==========================================
// CompanyImporter - Import du fichier entreprises
// ==========================================
// Entité référencée : le secteur d'activité. Les lignes
// elles-mêmes sont dédoublonnées par nom (dans le fichier
// et contre le magasin) : un doublon est écarté avec un
// avertissement, jamais réécrit
pub struct CompanyImporter<S, C, B>
where
    S: SectorRepository,
    C: CompanyRepository,
    B: ImportBatchRepository,
{
    sector_repo: Arc<S>,
    company_repo: Arc<C>,
    batch_repo: Arc<B>,
    parser: UniversalFileParser,
}

impl<S, C, B> CompanyImporter<S, C, B>
where
    S: SectorRepository,
    C: CompanyRepository,
    B: ImportBatchRepository,
{
    pub fn new(sector_repo: Arc<S>, company_repo: Arc<C>, batch_repo: Arc<B>) -> Self {
        Self {
            sector_repo,
            company_repo,
            batch_repo,
            parser: UniversalFileParser,
        }
    }

    /// Importe un fichier entreprises
    ///
    /// # Retour
    /// - Ok(rapport) : y compris jobs interrompus (erreur
    ///   d'entête) et jobs arrêtés (connectivité) — le
    ///   rapport porte le détail ligne à ligne
    /// - Err : fichier introuvable ou illisible
    #[instrument(skip(self, file_path), fields(batch_id))]
    pub async fn import(&self, file_path: &Path, operator: &str) -> ImportResult<ImportReport> {
        let start = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        let mut state = JobState::Created;
        let mut report = ImportReport::new(
            batch_id.clone(),
            ImportKind::Companies,
            file_label(file_path),
        );

        info!(batch_id = %batch_id, fichier = %file_path.display(), operateur = %operator, "import entreprises : démarrage");

        // === Phase 1 : lecture et entête ===
        transition(&mut state, JobState::Validating, &batch_id);
        let rows = match read_rows(&self.parser, file_path, ImportKind::Companies, &batch_id)? {
            ReadOutcome::Rows(rows) => rows,
            ReadOutcome::HeaderError(message) => {
                transition(&mut state, JobState::Aborted, &batch_id);
                return finish_aborted(self.batch_repo.as_ref(), report, message, start, operator)
                    .await;
            }
        };
        report.total_rows = rows.len();

        // === Phase 2 : normalisation ===
        transition(&mut state, JobState::Processing, &batch_id);
        let mut records: Vec<CompanyRecord> = Vec::new();
        for raw in &rows {
            let (record, anomalies) = normalize_company(raw);
            match record {
                Some(record) => {
                    report.add_anomalies(&anomalies);
                    records.push(record);
                }
                None => report.note_skipped(&anomalies),
            }
        }
        info!(batch_id = %batch_id, valides = records.len(), rejetees = report.skipped, "normalisation terminée");

        // === Phase 3 : résolution des secteurs et index des noms ===
        let mut sectors: ResolutionPlan<String> = ResolutionPlan::new("secteur");
        match self.sector_repo.load_all().await {
            Ok(index) => sectors.preload(index),
            Err(e) => {
                let remaining = records.iter().map(|r| r.row_number).collect();
                return finish_halted(self.batch_repo.as_ref(), report, remaining, &e, start, operator)
                    .await;
            }
        }
        let mut seen = match self.company_repo.load_all().await {
            Ok(index) => KeyIndex::from_labels(index.into_iter().map(|(_, name)| name)),
            Err(e) => {
                let remaining = records.iter().map(|r| r.row_number).collect();
                return finish_halted(self.batch_repo.as_ref(), report, remaining, &e, start, operator)
                    .await;
            }
        };
        for record in &records {
            if let Some(label) = record.sector.as_deref() {
                sectors.stage(label, || label.to_string());
            }
        }
        info!(batch_id = %batch_id, secteurs_inconnus = sectors.pending().len(), "plan de résolution prêt");

        // === Phase 4 : création des secteurs inconnus ===
        if let Err(e) =
            create_pending_sectors(self.sector_repo.as_ref(), &mut sectors, &batch_id).await
        {
            report.created_entities = sectors.created_count();
            let remaining = records.iter().map(|r| r.row_number).collect();
            return finish_halted(self.batch_repo.as_ref(), report, remaining, &e, start, operator)
                .await;
        }

        // === Phase 5 : écriture des lignes ===
        let mut iter = records.into_iter();
        while let Some(record) = iter.next() {
            let row_number = record.row_number;
            match write_company(self.company_repo.as_ref(), &sectors, &mut seen, record).await {
                Ok(outcome) => report.note_outcome(&outcome),
                Err(e) => {
                    report.created_entities = sectors.created_count();
                    let remaining = std::iter::once(row_number)
                        .chain(iter.map(|r| r.row_number))
                        .collect();
                    return finish_halted(self.batch_repo.as_ref(), report, remaining, &e, start, operator)
                        .await;
                }
            }
        }

        // === Phase 6 : clôture ===
        report.created_entities = sectors.created_count();
        report.elapsed_ms = start.elapsed().as_millis() as u64;
        transition(&mut state, JobState::Completed, &batch_id);
        persist_batch(self.batch_repo.as_ref(), &report, operator).await;
        info!(
            batch_id = %batch_id,
            total = report.total_rows,
            importees = report.imported,
            ignorees = report.skipped,
            echecs = report.failed,
            entites_creees = report.created_entities,
            duree_ms = report.elapsed_ms,
            etat = %state,
            "import entreprises : terminé"
        );
        Ok(report)
    }

    /// Importe plusieurs fichiers, jobs entiers menés de
    /// front ; chaque job garde son propre plan de résolution
    pub async fn import_many(
        &self,
        file_paths: &[PathBuf],
        operator: &str,
    ) -> Vec<ImportResult<ImportReport>> {
        info!(fichiers = file_paths.len(), "import entreprises : lot de fichiers");
        let jobs = file_paths.iter().map(|path| self.import(path, operator));
        join_all(jobs).await
    }
}

// ==========================================
// VisitImporter - Import du fichier visites
// ==========================================
// Entité référencée : l'entreprise, dont l'amorce (nom,
// secteur, ville, intérêt) vient de la première ligne qui
// l'introduit ; le secteur de l'amorce passe lui-même par
// un plan de résolution imbriqué. Un échec de création se
// propage strictement : secteur → entreprise → lignes
pub struct VisitImporter<S, C, V, B>
where
    S: SectorRepository,
    C: CompanyRepository,
    V: VisitRepository,
    B: ImportBatchRepository,
{
    sector_repo: Arc<S>,
    company_repo: Arc<C>,
    visit_repo: Arc<V>,
    batch_repo: Arc<B>,
    parser: UniversalFileParser,
}

impl<S, C, V, B> VisitImporter<S, C, V, B>
where
    S: SectorRepository,
    C: CompanyRepository,
    V: VisitRepository,
    B: ImportBatchRepository,
{
    pub fn new(
        sector_repo: Arc<S>,
        company_repo: Arc<C>,
        visit_repo: Arc<V>,
        batch_repo: Arc<B>,
    ) -> Self {
        Self {
            sector_repo,
            company_repo,
            visit_repo,
            batch_repo,
            parser: UniversalFileParser,
        }
    }

    /// Importe un fichier visites
    #[instrument(skip(self, file_path), fields(batch_id))]
    pub async fn import(&self, file_path: &Path, operator: &str) -> ImportResult<ImportReport> {
        let start = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        let mut state = JobState::Created;
        let mut report =
            ImportReport::new(batch_id.clone(), ImportKind::Visits, file_label(file_path));

        info!(batch_id = %batch_id, fichier = %file_path.display(), operateur = %operator, "import visites : démarrage");

        // === Phase 1 : lecture et entête ===
        transition(&mut state, JobState::Validating, &batch_id);
        let rows = match read_rows(&self.parser, file_path, ImportKind::Visits, &batch_id)? {
            ReadOutcome::Rows(rows) => rows,
            ReadOutcome::HeaderError(message) => {
                transition(&mut state, JobState::Aborted, &batch_id);
                return finish_aborted(self.batch_repo.as_ref(), report, message, start, operator)
                    .await;
            }
        };
        report.total_rows = rows.len();

        // === Phase 2 : normalisation ===
        transition(&mut state, JobState::Processing, &batch_id);
        let mut records: Vec<VisitRecord> = Vec::new();
        for raw in &rows {
            let (record, anomalies) = normalize_visit(raw);
            match record {
                Some(record) => {
                    report.add_anomalies(&anomalies);
                    records.push(record);
                }
                None => report.note_skipped(&anomalies),
            }
        }
        info!(batch_id = %batch_id, valides = records.len(), rejetees = report.skipped, "normalisation terminée");

        // === Phase 3 : plans de résolution (entreprises, puis secteurs d'amorce) ===
        let mut companies: ResolutionPlan<CompanySeed> = ResolutionPlan::new("entreprise");
        match self.company_repo.load_all().await {
            Ok(index) => companies.preload(index),
            Err(e) => {
                let remaining = records.iter().map(|r| r.row_number).collect();
                return finish_halted(self.batch_repo.as_ref(), report, remaining, &e, start, operator)
                    .await;
            }
        }
        let mut sectors: ResolutionPlan<String> = ResolutionPlan::new("secteur");
        match self.sector_repo.load_all().await {
            Ok(index) => sectors.preload(index),
            Err(e) => {
                let remaining = records.iter().map(|r| r.row_number).collect();
                return finish_halted(self.batch_repo.as_ref(), report, remaining, &e, start, operator)
                    .await;
            }
        }

        // L'amorce vient de la première ligne qui introduit
        // l'entreprise ; les lignes suivantes n'y touchent pas
        for record in &records {
            companies.stage(&record.company, || CompanySeed {
                name: record.company.clone(),
                sector: record.sector.clone(),
                city: record.city.clone(),
                interest: record.interest,
            });
        }
        let pending_companies = companies.pending();
        for (_, seed) in &pending_companies {
            if let Some(label) = seed.sector.as_deref() {
                sectors.stage(label, || label.to_string());
            }
        }
        info!(
            batch_id = %batch_id,
            entreprises_inconnues = pending_companies.len(),
            secteurs_inconnus = sectors.pending().len(),
            "plans de résolution prêts"
        );

        // === Phase 4 : création des secteurs d'amorce ===
        if let Err(e) =
            create_pending_sectors(self.sector_repo.as_ref(), &mut sectors, &batch_id).await
        {
            report.created_entities = sectors.created_count();
            let remaining = records.iter().map(|r| r.row_number).collect();
            return finish_halted(self.batch_repo.as_ref(), report, remaining, &e, start, operator)
                .await;
        }

        // === Phase 5 : création des entreprises inconnues ===
        // Propagation stricte : un secteur d'amorce en échec
        // fait échouer la création de l'entreprise, donc
        // chaque ligne qui la cite
        for (key, seed) in pending_companies {
            let sector_id = match seed.sector.as_deref() {
                None => None,
                Some(label) => match sectors.require(label) {
                    Ok(id) => Some(id),
                    Err(cause) => {
                        warn!(batch_id = %batch_id, entreprise = %seed.name, secteur = %label, "création de l'entreprise abandonnée, secteur indisponible");
                        companies.mark_failed(&key, cause);
                        continue;
                    }
                },
            };

            let new_company = NewCompany {
                name: seed.name.clone(),
                sector_id,
                city: seed.city.clone(),
                interest: seed.interest,
                ..NewCompany::default()
            };
            match self.company_repo.create(new_company).await {
                Ok(id) => {
                    debug!(batch_id = %batch_id, entreprise = %seed.name, id = id, "entreprise créée");
                    companies.mark_created(&key, id);
                }
                Err(e) if e.is_connectivity() => {
                    report.created_entities =
                        sectors.created_count() + companies.created_count();
                    let remaining = records.iter().map(|r| r.row_number).collect();
                    return finish_halted(self.batch_repo.as_ref(), report, remaining, &e, start, operator)
                        .await;
                }
                Err(e) => {
                    warn!(batch_id = %batch_id, entreprise = %seed.name, error = %e, "création de l'entreprise refusée");
                    companies.mark_failed(&key, e.to_string());
                }
            }
        }

        // === Phase 6 : écriture des visites ===
        let mut iter = records.into_iter();
        while let Some(record) = iter.next() {
            let row_number = record.row_number;
            match write_visit(self.visit_repo.as_ref(), &companies, record).await {
                Ok(outcome) => report.note_outcome(&outcome),
                Err(e) => {
                    report.created_entities =
                        sectors.created_count() + companies.created_count();
                    let remaining = std::iter::once(row_number)
                        .chain(iter.map(|r| r.row_number))
                        .collect();
                    return finish_halted(self.batch_repo.as_ref(), report, remaining, &e, start, operator)
                        .await;
                }
            }
        }

        // === Phase 7 : clôture ===
        report.created_entities = sectors.created_count() + companies.created_count();
        report.elapsed_ms = start.elapsed().as_millis() as u64;
        transition(&mut state, JobState::Completed, &batch_id);
        persist_batch(self.batch_repo.as_ref(), &report, operator).await;
        info!(
            batch_id = %batch_id,
            total = report.total_rows,
            importees = report.imported,
            ignorees = report.skipped,
            echecs = report.failed,
            entites_creees = report.created_entities,
            duree_ms = report.elapsed_ms,
            etat = %state,
            "import visites : terminé"
        );
        Ok(report)
    }

    /// Importe plusieurs fichiers visites de front
    pub async fn import_many(
        &self,
        file_paths: &[PathBuf],
        operator: &str,
    ) -> Vec<ImportResult<ImportReport>> {
        info!(fichiers = file_paths.len(), "import visites : lot de fichiers");
        let jobs = file_paths.iter().map(|path| self.import(path, operator));
        join_all(jobs).await
    }
}
