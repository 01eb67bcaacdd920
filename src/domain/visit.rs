// ==========================================
// Console Orientation - Modèle visite
// ==========================================
// Visites d'entreprise organisées par le centre
// (sorties de découverte des métiers)
// ==========================================

use crate::domain::types::InterestLevel;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Visit - Visite d'entreprise
// ==========================================
// Alignement : table visite_entreprise
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visit {
    // ===== Identité et rattachement =====
    pub visit_id: i64,              // identifiant (AUTOINCREMENT)
    pub company_id: i64,            // entreprise visitée (FK obligatoire)

    // ===== Déroulé =====
    pub visit_date: NaiveDate,      // date de la visite (obligatoire)
    pub advisor: Option<String>,    // conseiller accompagnateur
    pub participants: Option<i32>,  // nombre de participants
    pub interest: InterestLevel,    // accueil/intérêt constaté (défaut : MOYEN)
    pub report: Option<String>,     // compte rendu libre

    // ===== Audit =====
    pub created_at: DateTime<Utc>,
}

// ==========================================
// NewVisit - Charge d'insertion
// ==========================================
// Usage : écriture en base une fois l'entreprise résolue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVisit {
    pub company_id: i64,
    pub visit_date: NaiveDate,
    pub advisor: Option<String>,
    pub participants: Option<i32>,
    pub interest: InterestLevel,
    pub report: Option<String>,
}

// ==========================================
// VisitRecord - Intermédiaire d'import
// ==========================================
// Usage : produit de la normalisation d'une ligne du
// fichier visites ; l'entreprise est encore un NOM, le
// plan de résolution le convertira en identifiant.
// Les colonnes sœurs (secteur, ville) ne servent qu'à
// amorcer la création d'une entreprise inconnue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitRecord {
    pub company: String,            // nom d'entreprise (obligatoire)
    pub sector: Option<String>,     // colonne sœur : secteur de l'entreprise
    pub city: Option<String>,       // colonne sœur : ville de l'entreprise
    pub visit_date: NaiveDate,      // obligatoire (ligne invalide sinon)
    pub advisor: Option<String>,
    pub participants: Option<i32>,
    pub interest: InterestLevel,
    pub report: Option<String>,

    // Méta-information
    pub row_number: usize, // numéro de ligne du fichier source (entête = 1)
}
