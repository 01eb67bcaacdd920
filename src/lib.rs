// ==========================================
// Console Orientation - Bibliothèque cœur
// ==========================================
// Console d'administration d'un centre d'orientation :
// import en masse de classeurs (entreprises, visites)
// vers le magasin SQLite, avec rapport ligne à ligne
// ==========================================

// Initialisation de l'internationalisation
rust_i18n::i18n!("locales", fallback = "fr");

// ==========================================
// Déclaration des modules
// ==========================================

// Couche domaine - entités et types
pub mod domain;

// Couche magasin - accès aux données
pub mod repository;

// Chaîne d'import - données externes
pub mod importer;

// Couche configuration
pub mod config;

// Infrastructure base de données (connexion / PRAGMA)
pub mod db;

// Journalisation
pub mod logging;

// Internationalisation
pub mod i18n;

// Couche API - façades
pub mod api;

// ==========================================
// Réexport des types cœur
// ==========================================

// Types du domaine
pub use domain::types::{ImportKind, InterestLevel};

// Entités du domaine
pub use domain::{
    Anomaly, Company, CompanyRecord, CompanySeed, ImportBatch, ImportReport, NewCompany,
    NewVisit, RowOutcome, Sector, Severity, Visit, VisitRecord,
};

// Chaîne d'import
pub use importer::{
    export_template, CompanyImporter, ImportError, ImportResult, JobState, ResolutionPlan,
    VisitImporter,
};

// API
pub use api::{ApiError, ImportApi, ImportApiResponse};

// ==========================================
// Constantes
// ==========================================

// Version du système
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Nom du système
pub const APP_NAME: &str = "Console Orientation";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
