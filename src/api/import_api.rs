// ==========================================
// Console Orientation - Façade d'import
// ==========================================
// Responsabilité : point d'entrée unique des imports pour
// les surfaces appelantes (CLI, UI). Assemble les
// importeurs sur une connexion partagée, résout
// l'opérateur, enveloppe le rapport dans une réponse
// sérialisable avec message de synthèse localisé
// ==========================================

use crate::api::error::ApiError;
use crate::config::{ConfigManager, ImportConfigReader};
use crate::db::open_and_init;
use crate::domain::import::{ImportBatch, ImportReport};
use crate::domain::types::ImportKind;
use crate::i18n::t_with_args;
use crate::importer::{CompanyImporter, VisitImporter};
use crate::repository::{
    ImportBatchRepository, SqliteCompanyRepository, SqliteImportBatchRepository,
    SqliteSectorRepository, SqliteVisitRepository,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Opérateur inscrit dans l'historique quand ni l'appel ni
/// la configuration n'en fournissent un
const FALLBACK_OPERATOR: &str = "systeme";

// ==========================================
// Réponses de la façade
// ==========================================

/// Réponse d'un job d'import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportApiResponse {
    /// Identifiant du job (UUID)
    pub batch_id: String,
    /// Surface d'import
    pub kind: ImportKind,
    /// Lignes de données du fichier
    pub total_rows: usize,
    /// Lignes écrites en base
    pub imported: usize,
    /// Lignes rejetées à la validation
    pub skipped: usize,
    /// Lignes en échec (résolution/écriture)
    pub failed: usize,
    /// Entités référencées créées pendant le job
    pub created_entities: usize,
    /// Vrai si le job a été interrompu sur erreur d'entête
    pub aborted: bool,
    /// Message de synthèse localisé
    pub message: String,
    /// Rapport complet, ligne à ligne
    pub report: ImportReport,
}

impl ImportApiResponse {
    pub fn from_report(report: ImportReport) -> Self {
        let aborted = report.header_error.is_some();
        let message = match &report.header_error {
            Some(reason) => t_with_args("import.aborted", &[("reason", reason.as_str())]),
            None => {
                let imported = report.imported.to_string();
                let skipped = report.skipped.to_string();
                let failed = report.failed.to_string();
                let created = report.created_entities.to_string();
                t_with_args(
                    "import.summary",
                    &[
                        ("imported", imported.as_str()),
                        ("skipped", skipped.as_str()),
                        ("failed", failed.as_str()),
                        ("created", created.as_str()),
                    ],
                )
            }
        };

        Self {
            batch_id: report.batch_id.clone(),
            kind: report.kind,
            total_rows: report.total_rows,
            imported: report.imported,
            skipped: report.skipped,
            failed: report.failed,
            created_entities: report.created_entities,
            aborted,
            message,
            report,
        }
    }
}

/// Réponse de l'export des modèles de fichier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateApiResponse {
    /// Chemin du modèle à remplir
    pub template_path: String,
    /// Chemin de la notice des valeurs acceptées
    pub values_path: String,
}

// ==========================================
// ImportApi - Façade
// ==========================================
// Toutes les méthodes partagent la même connexion SQLite ;
// les importeurs construits dessus restent cohérents entre
// eux (index et écritures voient le même état)
pub struct ImportApi {
    conn: Arc<Mutex<Connection>>,
}

impl ImportApi {
    /// Ouvre (et initialise si besoin) le magasin
    pub fn new(db_path: &str) -> Result<Self, ApiError> {
        let conn = open_and_init(db_path)
            .map_err(|e| ApiError::DatabaseError(format!("ouverture du magasin en échec : {e}")))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Réutilise une connexion déjà ouverte
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    // ===== Assemblage des composants =====

    fn company_importer(
        &self,
    ) -> CompanyImporter<SqliteSectorRepository, SqliteCompanyRepository, SqliteImportBatchRepository>
    {
        CompanyImporter::new(
            Arc::new(SqliteSectorRepository::from_connection(self.conn.clone())),
            Arc::new(SqliteCompanyRepository::from_connection(self.conn.clone())),
            Arc::new(SqliteImportBatchRepository::from_connection(self.conn.clone())),
        )
    }

    fn visit_importer(
        &self,
    ) -> VisitImporter<
        SqliteSectorRepository,
        SqliteCompanyRepository,
        SqliteVisitRepository,
        SqliteImportBatchRepository,
    > {
        VisitImporter::new(
            Arc::new(SqliteSectorRepository::from_connection(self.conn.clone())),
            Arc::new(SqliteCompanyRepository::from_connection(self.conn.clone())),
            Arc::new(SqliteVisitRepository::from_connection(self.conn.clone())),
            Arc::new(SqliteImportBatchRepository::from_connection(self.conn.clone())),
        )
    }

    fn batch_repo(&self) -> SqliteImportBatchRepository {
        SqliteImportBatchRepository::from_connection(self.conn.clone())
    }

    fn config(&self) -> Result<ConfigManager, ApiError> {
        ConfigManager::from_connection(self.conn.clone())
            .map_err(|e| ApiError::ConfigError(e.to_string()))
    }

    /// Opérateur retenu pour l'historique : celui de l'appel
    /// s'il est non vide, sinon celui de la configuration,
    /// sinon « systeme »
    async fn resolve_operator(&self, operator: Option<&str>) -> String {
        if let Some(op) = operator {
            let trimmed = op.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
        match self.config() {
            Ok(config) => config
                .get_default_operator()
                .await
                .unwrap_or_else(|_| FALLBACK_OPERATOR.to_string()),
            Err(e) => {
                warn!(error = %e, "lecture de l'opérateur par défaut impossible");
                FALLBACK_OPERATOR.to_string()
            }
        }
    }

    // ===== Opérations =====

    /// Importe un fichier entreprises
    ///
    /// # Paramètres
    /// - file_path : chemin du fichier (.xlsx/.xls/.csv)
    /// - operator : opérateur à inscrire dans l'historique
    ///
    /// # Retour
    /// - Ok(ImportApiResponse) : y compris jobs interrompus
    ///   (champ `aborted`) ; le rapport détaille chaque ligne
    /// - Err(ApiError) : fichier introuvable ou illisible
    pub async fn import_companies(
        &self,
        file_path: &str,
        operator: Option<&str>,
    ) -> Result<ImportApiResponse, ApiError> {
        let operator = self.resolve_operator(operator).await;
        let report = self
            .company_importer()
            .import(Path::new(file_path), &operator)
            .await?;
        Ok(ImportApiResponse::from_report(report))
    }

    /// Importe un fichier visites
    pub async fn import_visits(
        &self,
        file_path: &str,
        operator: Option<&str>,
    ) -> Result<ImportApiResponse, ApiError> {
        let operator = self.resolve_operator(operator).await;
        let report = self
            .visit_importer()
            .import(Path::new(file_path), &operator)
            .await?;
        Ok(ImportApiResponse::from_report(report))
    }

    /// Importe plusieurs fichiers d'une même surface, jobs
    /// menés de front ; une erreur sur un fichier n'empêche
    /// pas les autres
    pub async fn import_many(
        &self,
        kind: ImportKind,
        file_paths: &[String],
        operator: Option<&str>,
    ) -> Vec<Result<ImportApiResponse, String>> {
        let operator = self.resolve_operator(operator).await;
        let paths: Vec<PathBuf> = file_paths.iter().map(PathBuf::from).collect();
        let reports = match kind {
            ImportKind::Companies => self.company_importer().import_many(&paths, &operator).await,
            ImportKind::Visits => self.visit_importer().import_many(&paths, &operator).await,
        };
        reports
            .into_iter()
            .map(|result| {
                result
                    .map(ImportApiResponse::from_report)
                    .map_err(|e| e.to_string())
            })
            .collect()
    }

    /// Écrit le couple de modèles de fichier dans `dir`
    pub fn export_template(
        &self,
        kind: ImportKind,
        dir: &str,
    ) -> Result<TemplateApiResponse, ApiError> {
        let (template_path, values_path) =
            crate::importer::export_template(kind, Path::new(dir))?;
        Ok(TemplateApiResponse {
            template_path: template_path.display().to_string(),
            values_path: values_path.display().to_string(),
        })
    }

    /// Historique des derniers jobs, du plus récent au plus
    /// ancien
    pub async fn list_recent_batches(&self, limit: usize) -> Result<Vec<ImportBatch>, ApiError> {
        let limit = limit.max(1).min(200);
        Ok(self.batch_repo().list_recent(limit).await?)
    }

    /// Purge l'historique au-delà de la rétention configurée
    ///
    /// # Retour
    /// - nombre de traces supprimées
    pub async fn purge_old_batches(&self) -> Result<usize, ApiError> {
        let retention_days = match self.config() {
            Ok(config) => config
                .get_batch_retention_days()
                .await
                .map_err(|e| ApiError::ConfigError(e.to_string()))?,
            Err(e) => return Err(e),
        };
        let purged = self.batch_repo().purge_older_than(retention_days).await?;
        info!(
            retention_jours = retention_days,
            purgees = purged,
            "purge de l'historique des imports"
        );
        Ok(purged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn csv_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("fichier temporaire");
        file.write_all(content.as_bytes()).expect("écriture");
        file.flush().expect("vidage");
        file
    }

    #[tokio::test]
    async fn test_import_companies_end_to_end() {
        let api = ImportApi::new(":memory:").expect("ouverture du magasin");
        let file = csv_file(
            "Nom;Secteur;Ville\n\
             Acme SARL;Industrie;Lyon\n\
             ACME SARL;Industrie;Lyon\n\
             Globex SARL;Industrie;Villeurbanne\n",
        );

        let response = api
            .import_companies(file.path().to_str().expect("chemin utf-8"), Some("cio.martin"))
            .await
            .expect("import");

        assert_eq!(response.total_rows, 3);
        assert_eq!(response.imported, 2);
        assert_eq!(response.skipped, 1); // doublon de nom écarté
        assert_eq!(response.failed, 0);
        assert_eq!(response.created_entities, 1); // secteur Industrie
        assert!(!response.aborted);

        let batches = api.list_recent_batches(10).await.expect("historique");
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].imported, 2);
        assert_eq!(batches[0].imported_by.as_deref(), Some("cio.martin"));
    }

    #[tokio::test]
    async fn test_import_companies_aborts_on_missing_required_column() {
        let api = ImportApi::new(":memory:").expect("ouverture du magasin");
        let file = csv_file("Ville;Secteur\nLyon;Industrie\n");

        let response = api
            .import_companies(file.path().to_str().expect("chemin utf-8"), None)
            .await
            .expect("le job interrompu rend quand même un rapport");

        assert!(response.aborted);
        assert_eq!(response.imported, 0);
        assert_eq!(response.total_rows, 0);
        assert!(response.report.header_error.is_some());

        // Le job interrompu laisse aussi une trace d'historique
        let batches = api.list_recent_batches(10).await.expect("historique");
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].total_rows, 0);
    }

    #[tokio::test]
    async fn test_import_missing_file_is_an_error() {
        let api = ImportApi::new(":memory:").expect("ouverture du magasin");
        let result = api.import_companies("/tmp/nexiste-pas.csv", None).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_purge_old_batches_drops_expired_traces() {
        use chrono::{Duration, Utc};

        let api = ImportApi::new(":memory:").expect("ouverture du magasin");

        // Une trace au-delà de la rétention par défaut (365 jours)
        api.batch_repo()
            .insert(ImportBatch {
                batch_id: "b-perime".to_string(),
                kind: ImportKind::Companies,
                file: Some("archives_2024.csv".to_string()),
                total_rows: 4,
                imported: 4,
                skipped: 0,
                failed: 0,
                created_entities: 0,
                report_json: None,
                imported_by: Some("systeme".to_string()),
                imported_at: Utc::now() - Duration::days(400),
                elapsed_ms: Some(12),
            })
            .await
            .expect("insertion de la trace périmée");

        // Et une trace fraîche laissée par un import
        let file = csv_file("Nom\nAcme SARL\n");
        api.import_companies(file.path().to_str().expect("chemin utf-8"), None)
            .await
            .expect("import");

        let purged = api.purge_old_batches().await.expect("purge");
        assert_eq!(purged, 1);

        let batches = api.list_recent_batches(10).await.expect("historique");
        assert_eq!(batches.len(), 1);
        assert_ne!(batches[0].batch_id, "b-perime");
    }

    #[tokio::test]
    async fn test_export_template_reports_both_paths() {
        let api = ImportApi::new(":memory:").expect("ouverture du magasin");
        let dir = tempfile::tempdir().expect("dossier temporaire");

        let response = api
            .export_template(ImportKind::Visits, dir.path().to_str().expect("chemin utf-8"))
            .expect("export des modèles");

        assert!(response.template_path.ends_with("modele_visites.csv"));
        assert!(response.values_path.ends_with("modele_visites_valeurs.csv"));
    }
}
