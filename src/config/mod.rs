// ==========================================
// Console Orientation - Couche configuration
// ==========================================
// Responsabilité : réglages de la console
// Stockage : table config_kv
// ==========================================

pub mod config_manager;
pub mod import_config_trait;

// Ré-export
pub use config_manager::{config_keys, ConfigManager};
pub use import_config_trait::ImportConfigReader;
