// ==========================================
// Console Orientation - Modèle entreprise
// ==========================================
// Entités du référentiel partenaires : secteurs
// d'activité et entreprises visitées par le centre
// ==========================================

use crate::domain::types::InterestLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Sector - Secteur d'activité
// ==========================================
// Alignement : table secteur
// Aucune contrainte UNIQUE sur le libellé en base ;
// le dédoublonnage est porté par le pipeline d'import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sector {
    pub sector_id: i64,             // identifiant (AUTOINCREMENT)
    pub label: String,              // libellé affiché (casse d'origine)
    pub created_at: DateTime<Utc>,  // création de la fiche
    pub updated_at: DateTime<Utc>,  // dernière modification
}

// ==========================================
// Company - Entreprise partenaire
// ==========================================
// Alignement : table entreprise
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    // ===== Identité =====
    pub company_id: i64,            // identifiant (AUTOINCREMENT)
    pub name: String,               // raison sociale (casse d'origine)
    pub sector_id: Option<i64>,     // secteur d'activité (FK, facultatif)

    // ===== Coordonnées =====
    pub address: Option<String>,    // adresse postale
    pub city: Option<String>,       // ville
    pub contact: Option<String>,    // interlocuteur principal
    pub phone: Option<String>,      // téléphone (texte brut, non reformatté)
    pub email: Option<String>,      // courriel

    // ===== Suivi =====
    pub headcount: Option<i32>,     // effectif déclaré
    pub interest: InterestLevel,    // intérêt du partenariat (défaut : MOYEN)
    pub notes: Option<String>,      // commentaire libre

    // ===== Audit =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==========================================
// NewCompany - Charge d'insertion
// ==========================================
// Usage : création en base (import ou saisie) ;
// l'identifiant est attribué par le magasin
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCompany {
    pub name: String,
    pub sector_id: Option<i64>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub contact: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub headcount: Option<i32>,
    pub interest: InterestLevel,
    pub notes: Option<String>,
}

// ==========================================
// CompanyRecord - Intermédiaire d'import
// ==========================================
// Usage : produit de la normalisation d'une ligne du
// fichier entreprises (avant résolution du secteur)
// Durée de vie : le temps du job d'import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub name: String,               // obligatoire (ligne invalide sinon)
    pub sector: Option<String>,     // nom du secteur, résolu par le plan
    pub address: Option<String>,
    pub city: Option<String>,
    pub contact: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub headcount: Option<i32>,
    pub interest: InterestLevel,
    pub notes: Option<String>,

    // Méta-information
    pub row_number: usize, // numéro de ligne du fichier source (entête = 1)
}

// ==========================================
// CompanySeed - Amorce de création
// ==========================================
// Usage : attributs initiaux d'une entreprise inconnue
// rencontrée dans un fichier de visites ; alimentée par
// la PREMIÈRE ligne qui introduit le nom, jamais ré-écrite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanySeed {
    pub name: String,               // raison sociale, casse d'origine
    pub sector: Option<String>,     // nom de secteur (colonne sœur)
    pub city: Option<String>,       // ville (colonne sœur)
    pub interest: InterestLevel,    // intérêt relevé sur la ligne d'amorce
}
