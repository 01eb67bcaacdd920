// ==========================================
// Console Orientation - Lecture de configuration d'import
// ==========================================
// Responsabilité : interface de lecture des réglages
// consommés par la façade d'import (aucune implémentation,
// aucune écriture ici)
// ==========================================

use async_trait::async_trait;
use std::error::Error;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// Implémenté par : ConfigManager (table config_kv)
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// Opérateur par défaut inscrit dans l'historique quand
    /// l'appelant n'en fournit pas
    ///
    /// # Valeur par défaut
    /// - "systeme"
    async fn get_default_operator(&self) -> Result<String, Box<dyn Error>>;

    /// Rétention de l'historique des imports (jours)
    ///
    /// # Valeur par défaut
    /// - 365
    async fn get_batch_retention_days(&self) -> Result<i32, Box<dyn Error>>;
}
