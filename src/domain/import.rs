// ==========================================
// Console Orientation - Artefacts d'import
// ==========================================
// Anomalies par ligne, issue de chaque ligne,
// rapport de job et trace d'historique en base
// ==========================================

use crate::domain::types::ImportKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Severity - Gravité d'une anomalie
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    #[serde(rename = "ERREUR")]
    Error, // invalide la ligne (champ obligatoire)
    #[serde(rename = "AVERTISSEMENT")]
    Warning, // champ facultatif dégradé, la ligne passe
}

// ==========================================
// Anomaly - Anomalie de normalisation
// ==========================================
// Toutes les anomalies d'une ligne sont collectées,
// jamais court-circuitées à la première rencontrée
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anomaly {
    pub row_number: usize,   // numéro de ligne du fichier source
    pub field: String,       // champ canonique concerné
    pub severity: Severity,  // gravité
    pub message: String,     // description (français, affichable)
}

impl Anomaly {
    pub fn error(row_number: usize, field: &str, message: impl Into<String>) -> Self {
        Self {
            row_number,
            field: field.to_string(),
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn warning(row_number: usize, field: &str, message: impl Into<String>) -> Self {
        Self {
            row_number,
            field: field.to_string(),
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    /// Message complet, champ inclus, pour le rapport
    pub fn describe(&self) -> String {
        if self.field.is_empty() {
            self.message.clone()
        } else {
            format!("champ « {} » : {}", self.field, self.message)
        }
    }
}

// ==========================================
// RowError - Entrée de rapport
// ==========================================
// Paire (ligne, message) exposée telle quelle à l'appelant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowError {
    pub row_number: usize,
    pub message: String,
}

// ==========================================
// RowOutcome - Issue d'une ligne
// ==========================================
// Chaque ligne de données se termine dans exactement
// un de ces trois états ; aucune issue ne fait échouer
// le job entier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RowOutcome {
    /// Écrite en base (identifiant de l'enregistrement créé)
    Imported { id: i64 },
    /// Rejetée à la validation, aucune écriture tentée
    Skipped(Vec<Anomaly>),
    /// Écriture ou résolution en échec (la ligne seulement)
    Failed { row_number: usize, message: String },
}

// ==========================================
// ImportReport - Rapport de job
// ==========================================
// Agrégé au fil des phases puis renvoyé à l'appelant ;
// persisté en JSON dans import_batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub batch_id: String,             // identifiant du job (UUID)
    pub kind: ImportKind,             // surface d'import
    pub file: Option<String>,         // nom du fichier source
    pub total_rows: usize,            // lignes de données présentes dans le fichier
    pub imported: usize,              // lignes écrites en base
    pub skipped: usize,               // lignes rejetées à la validation
    pub failed: usize,                // lignes en échec (résolution/écriture)
    pub created_entities: usize,      // entités référencées créées (secteurs + entreprises)
    pub header_error: Option<String>, // erreur d'entête (fatale, distincte des erreurs de ligne)
    pub errors: Vec<RowError>,        // erreurs par ligne (bloquantes)
    pub warnings: Vec<RowError>,      // avertissements par ligne (non bloquants)
    pub elapsed_ms: u64,              // durée du job
}

impl ImportReport {
    pub fn new(batch_id: impl Into<String>, kind: ImportKind, file: Option<String>) -> Self {
        Self {
            batch_id: batch_id.into(),
            kind,
            file,
            total_rows: 0,
            imported: 0,
            skipped: 0,
            failed: 0,
            created_entities: 0,
            header_error: None,
            errors: Vec::new(),
            warnings: Vec::new(),
            elapsed_ms: 0,
        }
    }

    /// Comptabilise une ligne écrite
    pub fn note_imported(&mut self) {
        self.imported += 1;
    }

    /// Comptabilise une ligne rejetée et verse ses anomalies
    pub fn note_skipped(&mut self, anomalies: &[Anomaly]) {
        self.skipped += 1;
        self.add_anomalies(anomalies);
    }

    /// Comptabilise une ligne en échec
    pub fn note_failed(&mut self, row_number: usize, message: impl Into<String>) {
        self.failed += 1;
        self.errors.push(RowError {
            row_number,
            message: message.into(),
        });
    }

    /// Verse des anomalies sans toucher aux compteurs de lignes
    /// (avertissements des lignes valides)
    pub fn add_anomalies(&mut self, anomalies: &[Anomaly]) {
        for anomaly in anomalies {
            let entry = RowError {
                row_number: anomaly.row_number,
                message: anomaly.describe(),
            };
            match anomaly.severity {
                Severity::Error => self.errors.push(entry),
                Severity::Warning => self.warnings.push(entry),
            }
        }
    }

    /// Enregistre l'issue d'une ligne déjà décidée
    pub fn note_outcome(&mut self, outcome: &RowOutcome) {
        match outcome {
            RowOutcome::Imported { .. } => self.note_imported(),
            RowOutcome::Skipped(anomalies) => self.note_skipped(anomalies),
            RowOutcome::Failed { row_number, message } => {
                self.note_failed(*row_number, message.clone())
            }
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.header_error.is_some()
    }
}

// ==========================================
// ImportBatch - Trace d'historique
// ==========================================
// Alignement : table import_batch ; une ligne par job,
// y compris les jobs interrompus sur erreur d'entête
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportBatch {
    pub batch_id: String,              // identifiant du job (UUID)
    pub kind: ImportKind,              // surface d'import
    pub file: Option<String>,          // nom du fichier source
    pub total_rows: i64,               // lignes de données du fichier
    pub imported: i64,                 // lignes écrites
    pub skipped: i64,                  // lignes rejetées
    pub failed: i64,                   // lignes en échec
    pub created_entities: i64,         // entités référencées créées
    pub report_json: Option<String>,   // rapport complet sérialisé
    pub imported_by: Option<String>,   // opérateur
    pub imported_at: DateTime<Utc>,    // horodatage du job
    pub elapsed_ms: Option<i64>,       // durée (millisecondes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts_follow_outcomes() {
        let mut report = ImportReport::new("b-1", ImportKind::Visits, None);
        report.total_rows = 3;

        report.note_outcome(&RowOutcome::Imported { id: 7 });
        report.note_outcome(&RowOutcome::Skipped(vec![Anomaly::error(
            2,
            "date",
            "date obligatoire absente",
        )]));
        report.note_outcome(&RowOutcome::Failed {
            row_number: 3,
            message: "création du secteur refusée".to_string(),
        });

        assert_eq!(report.imported, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.imported + report.skipped + report.failed, report.total_rows);
        assert_eq!(report.errors.len(), 2);
        assert!(report.has_failures());
    }

    #[test]
    fn test_warnings_do_not_touch_row_counts() {
        let mut report = ImportReport::new("b-2", ImportKind::Companies, None);
        report.add_anomalies(&[Anomaly::warning(4, "effectif", "valeur non numérique ignorée")]);

        assert_eq!(report.imported + report.skipped + report.failed, 0);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].message.contains("effectif"));
        assert!(!report.has_failures());
    }

    #[test]
    fn test_describe_includes_field() {
        let anomaly = Anomaly::error(5, "entreprise", "nom obligatoire absent");
        assert_eq!(anomaly.describe(), "champ « entreprise » : nom obligatoire absent");
    }
}
