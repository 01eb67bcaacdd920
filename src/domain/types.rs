// ==========================================
// Console Orientation - Types de domaine
// ==========================================
// Énumérations fermées partagées par les imports
// et les référentiels (valeurs stockées en base)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Niveau d'intérêt (Interest Level)
// ==========================================
// Échelle fermée à trois niveaux, commune aux fiches
// entreprise et aux comptes rendus de visite.
// Format sérialisé : valeur base de données (français)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InterestLevel {
    #[serde(rename = "FAIBLE")]
    Low, // intérêt faible
    #[serde(rename = "MOYEN")]
    Medium, // intérêt moyen (valeur par défaut)
    #[serde(rename = "FORT")]
    High, // intérêt fort
}

impl InterestLevel {
    /// Relit une valeur stockée en base ; None si inconnue
    pub fn from_db_value(value: &str) -> Option<Self> {
        match value {
            "FAIBLE" => Some(InterestLevel::Low),
            "MOYEN" => Some(InterestLevel::Medium),
            "FORT" => Some(InterestLevel::High),
            _ => None,
        }
    }
}

impl Default for InterestLevel {
    fn default() -> Self {
        InterestLevel::Medium
    }
}

impl fmt::Display for InterestLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterestLevel::Low => write!(f, "FAIBLE"),
            InterestLevel::Medium => write!(f, "MOYEN"),
            InterestLevel::High => write!(f, "FORT"),
        }
    }
}

// ==========================================
// Type d'import (Import Kind)
// ==========================================
// Les deux surfaces d'import du pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImportKind {
    #[serde(rename = "ENTREPRISES")]
    Companies, // fichier d'entreprises
    #[serde(rename = "VISITES")]
    Visits, // fichier de visites d'entreprise
}

impl ImportKind {
    pub fn from_db_value(value: &str) -> Option<Self> {
        match value {
            "ENTREPRISES" => Some(ImportKind::Companies),
            "VISITES" => Some(ImportKind::Visits),
            _ => None,
        }
    }
}

impl fmt::Display for ImportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportKind::Companies => write!(f, "ENTREPRISES"),
            ImportKind::Visits => write!(f, "VISITES"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interest_level_roundtrip() {
        for level in [InterestLevel::Low, InterestLevel::Medium, InterestLevel::High] {
            let db = level.to_string();
            assert_eq!(InterestLevel::from_db_value(&db), Some(level));
        }
        assert_eq!(InterestLevel::from_db_value("INCONNU"), None);
    }

    #[test]
    fn test_interest_level_default_is_medium() {
        assert_eq!(InterestLevel::default(), InterestLevel::Medium);
    }

    #[test]
    fn test_import_kind_db_values() {
        assert_eq!(ImportKind::Companies.to_string(), "ENTREPRISES");
        assert_eq!(ImportKind::Visits.to_string(), "VISITES");
        assert_eq!(ImportKind::from_db_value("VISITES"), Some(ImportKind::Visits));
    }

    #[test]
    fn test_interest_level_serde_uses_db_strings() {
        let json = serde_json::to_string(&InterestLevel::High).unwrap();
        assert_eq!(json, "\"FORT\"");
        let back: InterestLevel = serde_json::from_str("\"FAIBLE\"").unwrap();
        assert_eq!(back, InterestLevel::Low);
    }
}
