// ==========================================
// Console Orientation - Couche magasin
// ==========================================
// Responsabilité : accès aux données, aucune règle
// métier ici ; toutes les requêtes sont paramétrées
// ==========================================

pub mod company_repo;
pub mod error;
pub mod import_batch_repo;
pub mod sector_repo;
pub mod visit_repo;

// Ré-export des magasins
pub use company_repo::{CompanyRepository, SqliteCompanyRepository};
pub use error::{RepositoryError, RepositoryResult};
pub use import_batch_repo::{ImportBatchRepository, SqliteImportBatchRepository};
pub use sector_repo::{SectorRepository, SqliteSectorRepository};
pub use visit_repo::{SqliteVisitRepository, VisitRepository};
