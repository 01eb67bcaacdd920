// ==========================================
// Console Orientation - Magasin des visites
// ==========================================
// Responsabilité : écriture des visites d'entreprise et
// relecture de l'historique d'une fiche. Le pipeline
// d'import n'écrit qu'ici : la visite est l'enregistrement
// dépendant, créé une fois l'entreprise résolue.
// ==========================================

use crate::domain::types::InterestLevel;
use crate::domain::visit::{NewVisit, Visit};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// VisitRepository Trait
// ==========================================
#[async_trait]
pub trait VisitRepository: Send + Sync {
    /// Crée une visite et renvoie l'identifiant attribué
    ///
    /// # Paramètres
    /// - visit : charge d'insertion, entreprise déjà résolue
    async fn create(&self, visit: NewVisit) -> RepositoryResult<i64>;

    /// Historique des visites d'une entreprise, de la plus
    /// récente à la plus ancienne
    async fn list_for_company(&self, company_id: i64) -> RepositoryResult<Vec<Visit>>;
}

// ==========================================
// SqliteVisitRepository
// ==========================================
pub struct SqliteVisitRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteVisitRepository {
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

    fn map_visit(row: &rusqlite::Row<'_>) -> rusqlite::Result<Visit> {
        let interest: String = row.get(5)?;
        Ok(Visit {
            visit_id: row.get(0)?,
            company_id: row.get(1)?,
            visit_date: row.get(2)?,
            advisor: row.get(3)?,
            participants: row.get(4)?,
            interest: InterestLevel::from_db_value(&interest).unwrap_or_default(),
            report: row.get(6)?,
            created_at: row.get::<_, DateTime<Utc>>(7)?,
        })
    }
}

#[async_trait]
impl VisitRepository for SqliteVisitRepository {
    async fn create(&self, visit: NewVisit) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO visite_entreprise (
                entreprise_id, date_visite, intervenant, nb_participants,
                niveau_interet, compte_rendu, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                visit.company_id,
                visit.visit_date,
                visit.advisor,
                visit.participants,
                visit.interest.to_string(),
                visit.report,
                Utc::now().to_rfc3339(),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    async fn list_for_company(&self, company_id: i64) -> RepositoryResult<Vec<Visit>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT visite_id, entreprise_id, date_visite, intervenant,
                   nb_participants, niveau_interet, compte_rendu, created_at
            FROM visite_entreprise
            WHERE entreprise_id = ?1
            ORDER BY date_visite DESC, visite_id DESC
            "#,
        )?;

        let rows = stmt
            .query_map(params![company_id], Self::map_visit)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::company::NewCompany;
    use crate::domain::types::InterestLevel;
    use crate::repository::company_repo::{CompanyRepository, SqliteCompanyRepository};
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_create_visit_for_existing_company() {
        let conn = Arc::new(Mutex::new(
            crate::db::open_and_init(":memory:").expect("ouverture base de test"),
        ));
        let companies = SqliteCompanyRepository::from_connection(Arc::clone(&conn));
        let visits = SqliteVisitRepository::from_connection(Arc::clone(&conn));

        let company_id = companies
            .create(NewCompany {
                name: "Acme SARL".to_string(),
                ..NewCompany::default()
            })
            .await
            .expect("création entreprise");

        let visit_id = visits
            .create(NewVisit {
                company_id,
                visit_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
                advisor: Some("M. Diallo".to_string()),
                participants: Some(12),
                interest: InterestLevel::Medium,
                report: None,
            })
            .await
            .expect("création visite");

        assert!(visit_id > 0);

        let history = visits
            .list_for_company(company_id)
            .await
            .expect("historique");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].visit_id, visit_id);
        assert_eq!(history[0].advisor.as_deref(), Some("M. Diallo"));
    }

    #[tokio::test]
    async fn test_history_is_most_recent_first() {
        let conn = Arc::new(Mutex::new(
            crate::db::open_and_init(":memory:").expect("ouverture base de test"),
        ));
        let companies = SqliteCompanyRepository::from_connection(Arc::clone(&conn));
        let visits = SqliteVisitRepository::from_connection(Arc::clone(&conn));

        let company_id = companies
            .create(NewCompany {
                name: "Acme SARL".to_string(),
                ..NewCompany::default()
            })
            .await
            .expect("création entreprise");

        for (year, month, day) in [(2024, 11, 5), (2025, 3, 14), (2025, 1, 20)] {
            visits
                .create(NewVisit {
                    company_id,
                    visit_date: NaiveDate::from_ymd_opt(year, month, day).unwrap(),
                    advisor: None,
                    participants: None,
                    interest: InterestLevel::Medium,
                    report: None,
                })
                .await
                .expect("création visite");
        }

        let history = visits
            .list_for_company(company_id)
            .await
            .expect("historique");
        let dates: Vec<NaiveDate> = history.iter().map(|v| v.visit_date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
                NaiveDate::from_ymd_opt(2024, 11, 5).unwrap(),
            ]
        );
    }

    #[tokio::test]
    async fn test_create_visit_rejects_unknown_company() {
        let visits = SqliteVisitRepository::new(":memory:").expect("ouverture base de test");

        let result = visits
            .create(NewVisit {
                company_id: 999,
                visit_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
                advisor: None,
                participants: None,
                interest: InterestLevel::Medium,
                report: None,
            })
            .await;

        assert!(matches!(result, Err(RepositoryError::ForeignKey(_))));
    }
}
