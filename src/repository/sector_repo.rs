// ==========================================
// Console Orientation - Magasin des secteurs
// ==========================================
// Responsabilité : accès à la table secteur, sans
// règle métier (le dédoublonnage vit dans l'import)
// ==========================================

use crate::domain::company::Sector;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// SectorRepository Trait
// ==========================================
// Usage : collaborateur du pipeline d'import ; la console
// relit les fiches par find_by_id
// Implémenté par : SqliteSectorRepository
#[async_trait]
pub trait SectorRepository: Send + Sync {
    /// Charge l'index complet (identifiant, libellé)
    ///
    /// # Retour
    /// - paires (secteur_id, libellé) ordonnées par identifiant,
    ///   pour que la première fiche gagne en cas de doublon en base
    async fn load_all(&self) -> RepositoryResult<Vec<(i64, String)>>;

    /// Crée un secteur et renvoie l'identifiant attribué
    async fn create(&self, label: &str) -> RepositoryResult<i64>;

    /// Relit une fiche complète
    async fn find_by_id(&self, sector_id: i64) -> RepositoryResult<Option<Sector>>;
}

// ==========================================
// SqliteSectorRepository
// ==========================================
pub struct SqliteSectorRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSectorRepository {
    /// Ouvre (et initialise) la base au chemin donné
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_and_init(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Réutilise une connexion partagée
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::Lock(e.to_string()))
    }

    fn map_sector(row: &rusqlite::Row<'_>) -> rusqlite::Result<Sector> {
        Ok(Sector {
            sector_id: row.get(0)?,
            label: row.get(1)?,
            created_at: row.get::<_, DateTime<Utc>>(2)?,
            updated_at: row.get::<_, DateTime<Utc>>(3)?,
        })
    }
}

#[async_trait]
impl SectorRepository for SqliteSectorRepository {
    async fn load_all(&self) -> RepositoryResult<Vec<(i64, String)>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT secteur_id, libelle FROM secteur ORDER BY secteur_id ASC")?;

        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    async fn create(&self, label: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO secteur (libelle, created_at, updated_at) VALUES (?1, ?2, ?3)",
            params![label, now, now],
        )?;

        Ok(conn.last_insert_rowid())
    }

    async fn find_by_id(&self, sector_id: i64) -> RepositoryResult<Option<Sector>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT secteur_id, libelle, created_at, updated_at
             FROM secteur WHERE secteur_id = ?1",
        )?;

        let result = stmt.query_row(params![sector_id], Self::map_sector);

        match result {
            Ok(sector) => Ok(Some(sector)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_load_all() {
        let repo = SqliteSectorRepository::new(":memory:").expect("ouverture base de test");

        let id_industrie = repo.create("Industrie").await.expect("création secteur");
        let id_sante = repo.create("Santé").await.expect("création secteur");
        assert!(id_sante > id_industrie);

        let all = repo.load_all().await.expect("chargement index");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0], (id_industrie, "Industrie".to_string()));
        assert_eq!(all[1], (id_sante, "Santé".to_string()));
    }

    #[tokio::test]
    async fn test_duplicate_labels_are_accepted_by_the_store() {
        // Le magasin n'impose aucune unicité : c'est le pipeline
        // d'import qui porte la garantie de dédoublonnage
        let repo = SqliteSectorRepository::new(":memory:").expect("ouverture base de test");

        repo.create("Numérique").await.expect("création 1");
        repo.create("Numérique").await.expect("création 2");

        let all = repo.load_all().await.expect("chargement index");
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_find_by_id_reads_the_full_record() {
        let repo = SqliteSectorRepository::new(":memory:").expect("ouverture base de test");
        let id = repo.create("Bâtiment").await.expect("création secteur");

        let sector = repo
            .find_by_id(id)
            .await
            .expect("relecture")
            .expect("fiche présente");
        assert_eq!(sector.sector_id, id);
        assert_eq!(sector.label, "Bâtiment");

        assert!(repo.find_by_id(id + 40).await.expect("relecture").is_none());
    }
}
