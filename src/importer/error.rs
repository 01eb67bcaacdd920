// ==========================================
// Console Orientation - Erreurs du module d'import
// ==========================================
// Outil : macro dérivée thiserror
// Seules les erreurs fatales pour le JOB passent par ce
// type ; les anomalies de ligne restent dans le rapport
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// Erreurs du module d'import
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== Fichier =====
    #[error("fichier introuvable : {0}")]
    FileNotFound(String),

    #[error("format non pris en charge : {0} (extensions acceptées : .xlsx/.xls/.csv)")]
    UnsupportedFormat(String),

    #[error("lecture du fichier impossible : {0}")]
    FileReadError(String),

    #[error("lecture Excel en échec : {0}")]
    ExcelParseError(String),

    #[error("lecture CSV en échec : {0}")]
    CsvParseError(String),

    #[error("le fichier ne contient aucune ligne d'entête")]
    EmptyFile,

    // ===== Entête =====
    // Erreur fatale : le job est interrompu avant toute
    // lecture de ligne, rien n'est écrit
    #[error("colonnes obligatoires absentes de l'entête : {}", .fields.join(", "))]
    MissingColumns { fields: Vec<String> },

    // ===== Modèles de fichier =====
    #[error("écriture du modèle en échec : {0}")]
    TemplateWriteError(String),

    // ===== Magasin =====
    #[error(transparent)]
    Store(#[from] RepositoryError),

    // ===== Générique =====
    #[error("erreur interne : {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// Vrai pour une erreur d'entête : le job est interrompu
    /// avant la phase de traitement, mais produit quand même
    /// un rapport (et une trace d'historique)
    pub fn is_header_error(&self) -> bool {
        matches!(
            self,
            ImportError::MissingColumns { .. } | ImportError::EmptyFile
        )
    }
}

// Conversion depuis std::io::Error
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// Conversion depuis csv::Error
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// Conversion depuis calamine::XlsxError
impl From<calamine::XlsxError> for ImportError {
    fn from(err: calamine::XlsxError) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

// Conversion depuis calamine::XlsError
impl From<calamine::XlsError> for ImportError {
    fn from(err: calamine::XlsError) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Alias de Result
pub type ImportResult<T> = Result<T, ImportError>;
