// ==========================================
// Console Orientation - Couche domaine
// ==========================================
// Responsabilité : entités, types fermés et artefacts
// d'import ; aucune logique d'accès aux données ici
// ==========================================

pub mod company;
pub mod import;
pub mod types;
pub mod visit;

// Ré-export des types centraux
pub use company::{Company, CompanyRecord, CompanySeed, NewCompany, Sector};
pub use import::{
    Anomaly, ImportBatch, ImportReport, RowError, RowOutcome, Severity,
};
pub use types::{ImportKind, InterestLevel};
pub use visit::{NewVisit, Visit, VisitRecord};
