// ==========================================
// Console Orientation - Couche API
// ==========================================
// Responsabilité : façades appelables par les surfaces
// externes (CLI, UI)
// ==========================================

pub mod error;
pub mod import_api;

// Réexport des types cœur
pub use error::ApiError;
pub use import_api::{ImportApi, ImportApiResponse, TemplateApiResponse};
