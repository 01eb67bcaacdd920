// ==========================================
// Console Orientation - Modèles de fichier d'import
// ==========================================
// Responsabilité : produire, à la demande, un fichier CSV
// d'entête canonique prêt à remplir, accompagné d'un
// second CSV (« valeurs ») qui documente les valeurs
// acceptées champ par champ. Le couple remplace le
// classeur Excel à deux onglets : la pile retenue n'écrit
// pas de .xlsx
// ==========================================

use crate::domain::types::ImportKind;
use crate::importer::column_mapper::synonym_table;
use crate::importer::error::{ImportError, ImportResult};
use std::path::{Path, PathBuf};
use tracing::info;

fn kind_slug(kind: ImportKind) -> &'static str {
    match kind {
        ImportKind::Companies => "entreprises",
        ImportKind::Visits => "visites",
    }
}

fn write_failure(e: impl std::fmt::Display) -> ImportError {
    ImportError::TemplateWriteError(e.to_string())
}

/// Ligne d'exemple affichée sous l'entête du modèle
fn sample_row(kind: ImportKind) -> Vec<&'static str> {
    match kind {
        ImportKind::Companies => vec![
            "Acme SARL",
            "Industrie",
            "12 rue des Forges",
            "Lyon",
            "Mme Dupont",
            "04 72 00 00 00",
            "contact@acme.fr",
            "120",
            "fort",
            "Partenaire de longue date",
        ],
        ImportKind::Visits => vec![
            "Acme SARL",
            "14/03/2025",
            "Industrie",
            "Lyon",
            "M. Diallo",
            "12",
            "fort",
            "Accueil chaleureux, atelier découverte des métiers",
        ],
    }
}

/// Notice des valeurs acceptées, champ par champ
fn value_notes(kind: ImportKind) -> Vec<(&'static str, &'static str)> {
    let mut notes = vec![(
        "Intérêt",
        "faible, moyen ou fort (cellule vide : moyen)",
    )];
    match kind {
        ImportKind::Companies => {
            notes.push(("Effectif", "nombre entier"));
        }
        ImportKind::Visits => {
            notes.insert(
                0,
                (
                    "Date",
                    "AAAA-MM-JJ, JJ/MM/AAAA ou date Excel (cellule au format date)",
                ),
            );
            notes.push(("Participants", "nombre entier"));
        }
    }
    notes
}

/// Écrit le couple de modèles dans `dir`
///
/// # Retour
/// - (modèle, notice) : chemins des deux fichiers écrits,
///   `modele_<type>.csv` et `modele_<type>_valeurs.csv`
pub fn export_template(kind: ImportKind, dir: &Path) -> ImportResult<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir).map_err(write_failure)?;

    let slug = kind_slug(kind);
    let template_path = dir.join(format!("modele_{slug}.csv"));
    let values_path = dir.join(format!("modele_{slug}_valeurs.csv"));

    // Modèle : entête canonique + une ligne d'exemple
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(&template_path)
        .map_err(write_failure)?;
    let headers: Vec<&str> = synonym_table(kind)
        .fields
        .iter()
        .map(|spec| spec.label)
        .collect();
    writer.write_record(&headers).map_err(write_failure)?;
    writer.write_record(&sample_row(kind)).map_err(write_failure)?;
    writer.flush().map_err(write_failure)?;

    // Notice : valeurs acceptées par champ
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(&values_path)
        .map_err(write_failure)?;
    writer
        .write_record(["Champ", "Valeurs acceptées"])
        .map_err(write_failure)?;
    for (field, accepted) in value_notes(kind) {
        writer.write_record([field, accepted]).map_err(write_failure)?;
    }
    writer.flush().map_err(write_failure)?;

    info!(
        type_import = %kind,
        modele = %template_path.display(),
        notice = %values_path.display(),
        "modèles de fichier écrits"
    );
    Ok((template_path, values_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::column_mapper::map_headers;
    use crate::importer::file_parser::{FileParser, UniversalFileParser};

    #[test]
    fn test_template_headers_map_back_onto_every_field() {
        let dir = tempfile::tempdir().expect("dossier temporaire");
        let (template_path, _) =
            export_template(ImportKind::Companies, dir.path()).expect("écriture du modèle");

        let table = UniversalFileParser
            .parse(&template_path)
            .expect("relecture du modèle");
        let mapping =
            map_headers(&table.headers, synonym_table(ImportKind::Companies)).expect("entête");

        // Chaque colonne du modèle correspond à un champ canonique
        assert_eq!(
            mapping.mapped_fields(),
            synonym_table(ImportKind::Companies).fields.len()
        );
        assert_eq!(table.rows.len(), 1); // la ligne d'exemple
    }

    #[test]
    fn test_visit_template_pair_is_written() {
        let dir = tempfile::tempdir().expect("dossier temporaire");
        let (template_path, values_path) =
            export_template(ImportKind::Visits, dir.path()).expect("écriture du modèle");

        assert!(template_path.ends_with("modele_visites.csv"));
        assert!(values_path.ends_with("modele_visites_valeurs.csv"));

        let notice = std::fs::read_to_string(&values_path).expect("lecture de la notice");
        assert!(notice.contains("faible, moyen ou fort"));
        assert!(notice.contains("AAAA-MM-JJ"));
    }

    #[test]
    fn test_sample_row_matches_header_width() {
        for kind in [ImportKind::Companies, ImportKind::Visits] {
            assert_eq!(
                sample_row(kind).len(),
                synonym_table(kind).fields.len(),
                "ligne d'exemple désalignée pour {kind}"
            );
        }
    }
}
