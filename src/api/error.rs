// ==========================================
// Console Orientation - Erreurs de la couche API
// ==========================================
// Responsabilité : convertir les erreurs techniques des
// couches basses en messages explicites pour l'appelant ;
// chaque message porte sa cause
// ==========================================

use crate::importer::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// Erreurs de la couche API
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("entrée invalide : {0}")]
    InvalidInput(String),

    #[error("ressource introuvable : {0}")]
    NotFound(String),

    #[error("erreur du magasin : {0}")]
    DatabaseError(String),

    #[error("import en échec : {0}")]
    ImportError(String),

    #[error("erreur de configuration : {0}")]
    ConfigError(String),

    #[error("erreur interne : {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// Conversions depuis les couches basses
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            other => ApiError::DatabaseError(other.to_string()),
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::FileNotFound(_) => ApiError::NotFound(err.to_string()),
            ImportError::Store(store) => store.into(),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_not_found_maps_to_not_found() {
        let err: ApiError = RepositoryError::NotFound {
            entity: "entreprise".to_string(),
            id: "12".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_import_store_error_maps_to_database_error() {
        let err: ApiError =
            ImportError::Store(RepositoryError::Connectivity("base verrouillée".to_string()))
                .into();
        assert!(matches!(err, ApiError::DatabaseError(_)));
        assert!(err.to_string().contains("base verrouillée"));
    }

    #[test]
    fn test_file_not_found_maps_to_not_found() {
        let err: ApiError = ImportError::FileNotFound("/tmp/absent.csv".to_string()).into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
