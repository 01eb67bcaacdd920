// ==========================================
// Console Orientation - Magasin des entreprises
// ==========================================
// Responsabilité : accès à la table entreprise
// (index de résolution, création, relecture)
// ==========================================

use crate::domain::company::{Company, NewCompany};
use crate::domain::types::InterestLevel;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// CompanyRepository Trait
// ==========================================
// Usage : collaborateur du pipeline d'import et du
// reste de la console pour la lecture des fiches
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// Charge l'index complet (identifiant, nom)
    ///
    /// Chargé une seule fois par job d'import ; ordonné par
    /// identifiant pour que la première fiche gagne en cas
    /// de doublon déjà présent en base
    async fn load_all(&self) -> RepositoryResult<Vec<(i64, String)>>;

    /// Crée une entreprise et renvoie l'identifiant attribué
    async fn create(&self, company: NewCompany) -> RepositoryResult<i64>;

    /// Relit une fiche complète
    async fn find_by_id(&self, company_id: i64) -> RepositoryResult<Option<Company>>;
}

// ==========================================
// SqliteCompanyRepository
// ==========================================
pub struct SqliteCompanyRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCompanyRepository {
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

    fn map_company(row: &rusqlite::Row<'_>) -> rusqlite::Result<Company> {
        let interest: String = row.get(9)?;
        Ok(Company {
            company_id: row.get(0)?,
            name: row.get(1)?,
            sector_id: row.get(2)?,
            address: row.get(3)?,
            city: row.get(4)?,
            contact: row.get(5)?,
            phone: row.get(6)?,
            email: row.get(7)?,
            headcount: row.get(8)?,
            interest: InterestLevel::from_db_value(&interest).unwrap_or_default(),
            notes: row.get(10)?,
            created_at: row.get::<_, DateTime<Utc>>(11)?,
            updated_at: row.get::<_, DateTime<Utc>>(12)?,
        })
    }
}

#[async_trait]
impl CompanyRepository for SqliteCompanyRepository {
    async fn load_all(&self) -> RepositoryResult<Vec<(i64, String)>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT entreprise_id, nom FROM entreprise ORDER BY entreprise_id ASC")?;

        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    async fn create(&self, company: NewCompany) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            r#"
            INSERT INTO entreprise (
                nom, secteur_id, adresse, ville, contact, telephone,
                email, effectif, niveau_interet, commentaire,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                company.name,
                company.sector_id,
                company.address,
                company.city,
                company.contact,
                company.phone,
                company.email,
                company.headcount,
                company.interest.to_string(),
                company.notes,
                now,
                now,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    async fn find_by_id(&self, company_id: i64) -> RepositoryResult<Option<Company>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT entreprise_id, nom, secteur_id, adresse, ville, contact,
                   telephone, email, effectif, niveau_interet, commentaire,
                   created_at, updated_at
            FROM entreprise
            WHERE entreprise_id = ?1
            "#,
        )?;

        let result = stmt.query_row(params![company_id], Self::map_company);

        match result {
            Ok(company) => Ok(Some(company)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
