// ==========================================
// Console Orientation - Chaîne d'import
// ==========================================
// Responsabilité : ingestion de classeurs Excel / fichiers
// CSV vers le magasin SQLite
// Chaîne : lecture → correspondance d'entête →
// normalisation → résolution des entités citées →
// écriture → rapport
// ==========================================

// Déclaration des modules
pub mod column_mapper;
pub mod error;
pub mod file_parser;
pub mod job;
pub mod normalizer;
pub mod resolver;
pub mod template;
pub mod writer;

// Réexport des types cœur
pub use column_mapper::{map_headers, synonym_table, ColumnMapping, FieldSpec, RawRow, SynonymTable};
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawTable, RawTableRow, UniversalFileParser};
pub use job::{CompanyImporter, JobState, VisitImporter};
pub use normalizer::{normalize_company, normalize_visit};
pub use resolver::{KeyIndex, ReferenceKey, ResolutionPlan};
pub use template::export_template;
pub use writer::{write_company, write_visit};
