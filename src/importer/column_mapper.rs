// ==========================================
// Console Orientation - Correspondance des colonnes
// ==========================================
// Responsabilité : faire correspondre l'entête réelle du
// fichier aux champs canoniques via une table de synonymes
// déclarée, puis projeter chaque ligne en RawRow.
// La correspondance ignore casse, accents, espaces
// superflus, tirets et points ; les colonnes inconnues
// sont ignorées ; une colonne obligatoire absente
// interrompt le job avant toute lecture de ligne.
// ==========================================

use crate::domain::types::ImportKind;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawTableRow;
use std::collections::HashMap;

// ==========================================
// Champs canoniques
// ==========================================
// Les noms courts servent de clés internes (RawRow,
// anomalies) ; les libellés servent aux messages et
// aux modèles de fichier
pub mod fields {
    // Fichier entreprises
    pub const NAME: &str = "nom";
    pub const SECTOR: &str = "secteur";
    pub const ADDRESS: &str = "adresse";
    pub const CITY: &str = "ville";
    pub const CONTACT: &str = "contact";
    pub const PHONE: &str = "telephone";
    pub const EMAIL: &str = "email";
    pub const HEADCOUNT: &str = "effectif";
    pub const INTEREST: &str = "interet";
    pub const NOTES: &str = "commentaire";

    // Fichier visites
    pub const COMPANY: &str = "entreprise";
    pub const VISIT_DATE: &str = "date";
    pub const ADVISOR: &str = "intervenant";
    pub const PARTICIPANTS: &str = "participants";
    pub const REPORT: &str = "compte_rendu";
}

// ==========================================
// FieldSpec / SynonymTable
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,                 // clé canonique interne
    pub label: &'static str,                // libellé affichable (modèle, messages)
    pub required: bool,                     // colonne exigée dans l'entête
    pub synonyms: &'static [&'static str],  // entêtes acceptées (repliées au même titre)
}

#[derive(Debug, Clone, Copy)]
pub struct SynonymTable {
    pub kind: ImportKind,
    pub fields: &'static [FieldSpec],
}

/// Table des colonnes du fichier entreprises
pub const COMPANY_TABLE: SynonymTable = SynonymTable {
    kind: ImportKind::Companies,
    fields: &[
        FieldSpec {
            name: fields::NAME,
            label: "Nom",
            required: true,
            synonyms: &["nom", "nom de l'entreprise", "entreprise", "raison sociale", "société"],
        },
        FieldSpec {
            name: fields::SECTOR,
            label: "Secteur",
            required: false,
            synonyms: &["secteur", "secteur d'activité", "domaine d'activité", "filière"],
        },
        FieldSpec {
            name: fields::ADDRESS,
            label: "Adresse",
            required: false,
            synonyms: &["adresse", "adresse postale"],
        },
        FieldSpec {
            name: fields::CITY,
            label: "Ville",
            required: false,
            synonyms: &["ville", "commune"],
        },
        FieldSpec {
            name: fields::CONTACT,
            label: "Contact",
            required: false,
            synonyms: &["contact", "interlocuteur", "référent"],
        },
        FieldSpec {
            name: fields::PHONE,
            label: "Téléphone",
            required: false,
            synonyms: &["téléphone", "tél.", "portable"],
        },
        FieldSpec {
            name: fields::EMAIL,
            label: "Email",
            required: false,
            synonyms: &["email", "e-mail", "courriel", "mail"],
        },
        FieldSpec {
            name: fields::HEADCOUNT,
            label: "Effectif",
            required: false,
            synonyms: &["effectif", "nombre de salariés", "taille"],
        },
        FieldSpec {
            name: fields::INTEREST,
            label: "Intérêt",
            required: false,
            synonyms: &["intérêt", "niveau d'intérêt", "motivation"],
        },
        FieldSpec {
            name: fields::NOTES,
            label: "Commentaire",
            required: false,
            synonyms: &["commentaire", "commentaires", "remarques", "notes", "observations"],
        },
    ],
};

/// Table des colonnes du fichier visites
///
/// Les colonnes « secteur » et « ville » sont des colonnes
/// sœurs : elles n'alimentent que l'amorce de création
/// d'une entreprise inconnue
pub const VISIT_TABLE: SynonymTable = SynonymTable {
    kind: ImportKind::Visits,
    fields: &[
        FieldSpec {
            name: fields::COMPANY,
            label: "Entreprise",
            required: true,
            synonyms: &["entreprise", "nom de l'entreprise", "société", "raison sociale", "nom"],
        },
        FieldSpec {
            name: fields::VISIT_DATE,
            label: "Date",
            required: true,
            synonyms: &["date", "date de la visite", "date visite", "jour"],
        },
        FieldSpec {
            name: fields::SECTOR,
            label: "Secteur",
            required: false,
            synonyms: &["secteur", "secteur d'activité", "domaine d'activité"],
        },
        FieldSpec {
            name: fields::CITY,
            label: "Ville",
            required: false,
            synonyms: &["ville", "commune"],
        },
        FieldSpec {
            name: fields::ADVISOR,
            label: "Intervenant",
            required: false,
            synonyms: &["intervenant", "accompagnateur", "conseiller", "animateur"],
        },
        FieldSpec {
            name: fields::PARTICIPANTS,
            label: "Participants",
            required: false,
            synonyms: &["participants", "nombre de participants", "nb participants", "nombre d'élèves", "effectif"],
        },
        FieldSpec {
            name: fields::INTEREST,
            label: "Intérêt",
            required: false,
            synonyms: &["intérêt", "niveau d'intérêt", "accueil"],
        },
        FieldSpec {
            name: fields::REPORT,
            label: "Compte rendu",
            required: false,
            synonyms: &["compte rendu", "compte-rendu", "bilan", "commentaire", "remarques", "observations"],
        },
    ],
};

/// Table de synonymes d'une surface d'import
pub fn synonym_table(kind: ImportKind) -> &'static SynonymTable {
    match kind {
        ImportKind::Companies => &COMPANY_TABLE,
        ImportKind::Visits => &VISIT_TABLE,
    }
}

// ==========================================
// Repli d'entête
// ==========================================
/// Replie un libellé d'entête pour la comparaison :
/// minuscules, accents français aplatis, tirets/points
/// ramenés à l'espace, espaces intérieurs condensés
pub fn fold_header(header: &str) -> String {
    let mut folded = String::with_capacity(header.len());
    for c in header.to_lowercase().chars() {
        match c {
            'à' | 'â' | 'ä' => folded.push('a'),
            'é' | 'è' | 'ê' | 'ë' => folded.push('e'),
            'î' | 'ï' => folded.push('i'),
            'ô' | 'ö' => folded.push('o'),
            'ù' | 'û' | 'ü' => folded.push('u'),
            'ç' => folded.push('c'),
            'œ' => folded.push_str("oe"),
            'æ' => folded.push_str("ae"),
            '’' => folded.push('\''),
            '-' | '_' => folded.push(' '),
            '.' | ':' => {}
            _ => folded.push(c),
        }
    }
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ==========================================
// RawRow - Ligne projetée
// ==========================================
// Une ligne de données réduite aux champs canoniques ;
// les cellules vides sont absentes de la table
#[derive(Debug, Clone)]
pub struct RawRow {
    pub row_number: usize,
    values: HashMap<&'static str, String>,
}

impl RawRow {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(|s| s.as_str())
    }

    #[cfg(test)]
    pub fn for_tests(row_number: usize, pairs: &[(&'static str, &str)]) -> Self {
        Self {
            row_number,
            values: pairs
                .iter()
                .filter(|(_, v)| !v.trim().is_empty())
                .map(|(k, v)| (*k, v.trim().to_string()))
                .collect(),
        }
    }
}

// ==========================================
// ColumnMapping
// ==========================================
// Position de chaque champ canonique dans l'entête
// réelle ; construit une fois par job, avant les lignes
#[derive(Debug, Clone)]
pub struct ColumnMapping {
    indices: HashMap<&'static str, usize>,
}

impl ColumnMapping {
    /// Projette une ligne brute sur les champs canoniques
    pub fn project(&self, row: &RawTableRow) -> RawRow {
        let mut values = HashMap::new();
        for (field, idx) in &self.indices {
            if let Some(cell) = row.cells.get(*idx) {
                let trimmed = cell.trim();
                if !trimmed.is_empty() {
                    values.insert(*field, trimmed.to_string());
                }
            }
        }
        RawRow {
            row_number: row.row_number,
            values,
        }
    }

    pub fn mapped_fields(&self) -> usize {
        self.indices.len()
    }
}

/// Fait correspondre l'entête réelle à la table de synonymes
///
/// # Paramètres
/// - headers : entête telle que lue dans le fichier
/// - table : table de synonymes de la surface d'import
///
/// # Retour
/// - Err(MissingColumns) listant TOUTES les colonnes
///   obligatoires absentes (échec rapide, avant les lignes)
///
/// # Règles
/// - première colonne gagnante si deux entêtes visent le
///   même champ canonique
/// - colonnes inconnues ignorées sans avertissement
pub fn map_headers(headers: &[String], table: &SynonymTable) -> ImportResult<ColumnMapping> {
    // Index replié synonyme → champ canonique
    let mut lookup: HashMap<String, &'static str> = HashMap::new();
    for spec in table.fields {
        for synonym in spec.synonyms {
            lookup.entry(fold_header(synonym)).or_insert(spec.name);
        }
    }

    let mut indices: HashMap<&'static str, usize> = HashMap::new();
    for (idx, header) in headers.iter().enumerate() {
        if let Some(&field) = lookup.get(&fold_header(header)) {
            indices.entry(field).or_insert(idx);
        }
    }

    let missing: Vec<String> = table
        .fields
        .iter()
        .filter(|spec| spec.required && !indices.contains_key(spec.name))
        .map(|spec| spec.label.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(ImportError::MissingColumns { fields: missing });
    }

    Ok(ColumnMapping { indices })
}
