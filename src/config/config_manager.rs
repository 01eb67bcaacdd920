// ==========================================
// Console Orientation - Gestionnaire de configuration
// ==========================================
// Responsabilité : lecture et écriture des réglages
// Stockage : table config_kv (clé-valeur + scope)
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// Ouvre (et initialise) la base au chemin donné
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = crate::db::open_and_init(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Réutilise une connexion partagée
    ///
    /// Note : les PRAGMA uniformes sont ré-appliqués (idempotent)
    /// pour garantir un comportement identique partout.
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| format!("verrou de connexion : {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// Lit une valeur de config_kv (scope_id='global')
    ///
    /// # Retour
    /// - Some(String) : valeur présente
    /// - None : clé absente
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| format!("verrou de connexion : {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// Lit une valeur avec repli sur la valeur par défaut
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// Écrit (ou remplace) une valeur de scope global
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| format!("verrou de connexion : {}", e))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;

        Ok(())
    }
}

// ==========================================
// Implémentation ImportConfigReader
// ==========================================
#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_default_operator(&self) -> Result<String, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::DEFAULT_OPERATOR, "systeme")?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Ok("systeme".to_string())
        } else {
            Ok(trimmed.to_string())
        }
    }

    async fn get_batch_retention_days(&self) -> Result<i32, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::BATCH_RETENTION_DAYS, "365")?;
        Ok(value.parse::<i32>().unwrap_or(365))
    }
}

// ==========================================
// Clés de configuration
// ==========================================
pub mod config_keys {
    /// Opérateur par défaut des imports
    pub const DEFAULT_OPERATOR: &str = "import_default_operator";
    /// Rétention de l'historique des imports (jours)
    pub const BATCH_RETENTION_DAYS: &str = "batch_retention_days";
}
