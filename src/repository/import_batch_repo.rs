// ==========================================
// Console Orientation - Historique des imports
// ==========================================
// Responsabilité : table import_batch, une ligne par
// job (y compris les jobs interrompus sur entête)
// ==========================================

use crate::domain::import::ImportBatch;
use crate::domain::types::ImportKind;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// ImportBatchRepository Trait
// ==========================================
#[async_trait]
pub trait ImportBatchRepository: Send + Sync {
    /// Enregistre la trace d'un job terminé
    async fn insert(&self, batch: ImportBatch) -> RepositoryResult<()>;

    /// Derniers jobs, du plus récent au plus ancien
    async fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<ImportBatch>>;

    /// Supprime les traces plus anciennes que la rétention
    ///
    /// # Retour
    /// - nombre de lignes supprimées
    async fn purge_older_than(&self, retention_days: i32) -> RepositoryResult<usize>;
}

// ==========================================
// SqliteImportBatchRepository
// ==========================================
pub struct SqliteImportBatchRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteImportBatchRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_and_init(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::Lock(e.to_string()))
    }

    fn map_batch(row: &rusqlite::Row<'_>) -> rusqlite::Result<ImportBatch> {
        let kind: String = row.get(1)?;
        Ok(ImportBatch {
            batch_id: row.get(0)?,
            kind: ImportKind::from_db_value(&kind).unwrap_or(ImportKind::Companies),
            file: row.get(2)?,
            total_rows: row.get(3)?,
            imported: row.get(4)?,
            skipped: row.get(5)?,
            failed: row.get(6)?,
            created_entities: row.get(7)?,
            report_json: row.get(8)?,
            imported_by: row.get(9)?,
            imported_at: row.get::<_, DateTime<Utc>>(10)?,
            elapsed_ms: row.get(11)?,
        })
    }
}

#[async_trait]
impl ImportBatchRepository for SqliteImportBatchRepository {
    async fn insert(&self, batch: ImportBatch) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO import_batch (
                batch_id, type_import, fichier, lignes_total,
                lignes_importees, lignes_ignorees, lignes_echec,
                entites_creees, rapport_json, importe_par,
                importe_le, duree_ms
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                batch.batch_id,
                batch.kind.to_string(),
                batch.file,
                batch.total_rows,
                batch.imported,
                batch.skipped,
                batch.failed,
                batch.created_entities,
                batch.report_json,
                batch.imported_by,
                batch.imported_at.to_rfc3339(),
                batch.elapsed_ms,
            ],
        )?;

        Ok(())
    }

    async fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<ImportBatch>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT batch_id, type_import, fichier, lignes_total,
                   lignes_importees, lignes_ignorees, lignes_echec,
                   entites_creees, rapport_json, importe_par,
                   importe_le, duree_ms
            FROM import_batch
            ORDER BY importe_le DESC, rowid DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt
            .query_map(params![limit as i64], Self::map_batch)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    async fn purge_older_than(&self, retention_days: i32) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let cutoff = Utc::now() - Duration::days(retention_days as i64);

        // Comparaison lexicographique valide : importe_le est stocké
        // en RFC 3339 UTC à offset constant
        let affected = conn.execute(
            "DELETE FROM import_batch WHERE importe_le < ?1",
            params![cutoff.to_rfc3339()],
        )?;

        Ok(affected)
    }
}
