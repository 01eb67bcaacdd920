// ==========================================
// Console Orientation - Erreurs de la couche magasin
// ==========================================
// Outil : macro dérivée thiserror
// La classification « connectivité » pilote l'arrêt
// anticipé des jobs d'import (aucune nouvelle écriture
// n'est tentée quand le magasin devient inaccessible)
// ==========================================

use thiserror::Error;

/// Erreurs de la couche magasin
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== Connectivité =====
    #[error("magasin inaccessible : {0}")]
    Connectivity(String),

    #[error("verrou de connexion empoisonné : {0}")]
    Lock(String),

    // ===== Base de données =====
    #[error("enregistrement introuvable : {entity} id={id}")]
    NotFound { entity: String, id: String },

    #[error("échec de requête : {0}")]
    Query(String),

    #[error("contrainte de clé étrangère violée : {0}")]
    ForeignKey(String),

    #[error("contrainte d'unicité violée : {0}")]
    Unique(String),

    // ===== Générique =====
    #[error("erreur interne : {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RepositoryError {
    /// Vrai pour les erreurs qui signalent un magasin
    /// momentanément inaccessible (base occupée, verrouillée,
    /// fichier inouvrable, E/S) ; fatales pour le job en cours
    pub fn is_connectivity(&self) -> bool {
        matches!(self, RepositoryError::Connectivity(_))
    }
}

// Classification des erreurs rusqlite
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ffi_err, msg) => {
                let text = msg.unwrap_or_else(|| ffi_err.to_string());
                match ffi_err.code {
                    rusqlite::ErrorCode::DatabaseBusy
                    | rusqlite::ErrorCode::DatabaseLocked
                    | rusqlite::ErrorCode::SystemIoFailure
                    | rusqlite::ErrorCode::CannotOpen
                    | rusqlite::ErrorCode::DiskFull => RepositoryError::Connectivity(text),
                    rusqlite::ErrorCode::ConstraintViolation => {
                        if text.contains("FOREIGN KEY") {
                            RepositoryError::ForeignKey(text)
                        } else if text.contains("UNIQUE") {
                            RepositoryError::Unique(text)
                        } else {
                            RepositoryError::Query(text)
                        }
                    }
                    _ => RepositoryError::Query(text),
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "inconnu".to_string(),
                id: "inconnu".to_string(),
            },
            _ => RepositoryError::Query(err.to_string()),
        }
    }
}

/// Alias de Result
pub type RepositoryResult<T> = Result<T, RepositoryError>;
