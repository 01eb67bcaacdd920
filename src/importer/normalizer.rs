// ==========================================
// Console Orientation - Normalisation des champs
// ==========================================
// Responsabilité : convertir le texte brut des cellules en
// valeurs typées (dates, entiers, énumérations fermées) en
// collectant TOUTES les anomalies d'une ligne.
// Un champ obligatoire absent ou illisible invalide la
// ligne entière ; un champ facultatif illisible produit un
// avertissement et un champ laissé vide.
// ==========================================

use crate::domain::company::CompanyRecord;
use crate::domain::import::Anomaly;
use crate::domain::types::InterestLevel;
use crate::domain::visit::VisitRecord;
use crate::importer::column_mapper::{fields, fold_header, RawRow};
use chrono::{Duration, NaiveDate};

// ===== Numéros de série Excel =====

/// Base des numéros de série Excel (convention 1900, bug
/// de l'année bissextile inclus : jour 1 = 01/01/1900)
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Borne haute : 31/12/9999
const EXCEL_SERIAL_MAX: f64 = 2_958_465.0;

/// Convertit un numéro de série Excel en date civile.
/// Retourne None hors de la plage plausible (≤ 0, non fini,
/// au-delà de l'an 9999) : la fraction de jour est ignorée
pub fn excel_serial_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > EXCEL_SERIAL_MAX {
        return None;
    }
    let (y, m, d) = EXCEL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(y, m, d)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

// ===== Analyse des scalaires =====

/// Date civile depuis du texte de cellule.
/// Formats acceptés : AAAA-MM-JJ, JJ/MM/AAAA, horodatage
/// « AAAA-MM-JJ HH:MM:SS » (partie date retenue), numéro de
/// série Excel rendu en texte par la lecture du fichier
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let text = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%d/%m/%Y") {
        return Some(date);
    }
    if let Some((date_part, _)) = text.split_once(' ') {
        if let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
            return Some(date);
        }
    }
    // Cellule numérique : numéro de série Excel
    if let Ok(serial) = text.replace(',', ".").parse::<f64>() {
        return excel_serial_date(serial);
    }
    None
}

/// Entier depuis du texte de cellule.
/// Accepte la forme décimale sans partie fractionnaire
/// (« 12.0 »), rendue par certains exports Excel
pub fn parse_int(raw: &str) -> Option<i32> {
    let text = raw.trim();
    if let Ok(value) = text.parse::<i32>() {
        return Some(value);
    }
    if let Ok(value) = text.replace(',', ".").parse::<f64>() {
        if value.fract() == 0.0 && value >= i32::MIN as f64 && value <= i32::MAX as f64 {
            return Some(value as i32);
        }
    }
    None
}

/// Niveau d'intérêt depuis du texte de cellule.
/// Table fermée, commune aux deux surfaces d'import ;
/// None si le libellé n'est pas reconnu
pub fn parse_interest(raw: &str) -> Option<InterestLevel> {
    match fold_header(raw).as_str() {
        "faible" | "bas" | "low" | "1" => Some(InterestLevel::Low),
        "moyen" | "moyenne" | "normal" | "medium" | "2" => Some(InterestLevel::Medium),
        "fort" | "eleve" | "elevee" | "high" | "3" => Some(InterestLevel::High),
        _ => None,
    }
}

// ==========================================
// Lecture typée d'une ligne
// ==========================================
// Collecte les anomalies au fil des champs ; `invalid`
// n'est levé que par un champ obligatoire
struct FieldReader<'a> {
    row: &'a RawRow,
    anomalies: Vec<Anomaly>,
    invalid: bool,
}

impl<'a> FieldReader<'a> {
    fn new(row: &'a RawRow) -> Self {
        Self {
            row,
            anomalies: Vec::new(),
            invalid: false,
        }
    }

    fn text(&mut self, field: &'static str) -> Option<String> {
        self.row.get(field).map(|s| s.to_string())
    }

    fn required_text(&mut self, field: &'static str) -> Option<String> {
        match self.row.get(field) {
            Some(value) => Some(value.to_string()),
            None => {
                self.anomalies.push(Anomaly::error(
                    self.row.row_number,
                    field,
                    "champ obligatoire vide",
                ));
                self.invalid = true;
                None
            }
        }
    }

    fn int(&mut self, field: &'static str) -> Option<i32> {
        let raw = self.row.get(field)?;
        match parse_int(raw) {
            Some(value) => Some(value),
            None => {
                self.anomalies.push(Anomaly::warning(
                    self.row.row_number,
                    field,
                    format!("valeur entière illisible « {raw} », champ laissé vide"),
                ));
                None
            }
        }
    }

    fn required_date(&mut self, field: &'static str) -> Option<NaiveDate> {
        match self.row.get(field) {
            None => {
                self.anomalies.push(Anomaly::error(
                    self.row.row_number,
                    field,
                    "champ obligatoire vide",
                ));
                self.invalid = true;
                None
            }
            Some(raw) => match parse_date(raw) {
                Some(date) => Some(date),
                None => {
                    self.anomalies.push(Anomaly::error(
                        self.row.row_number,
                        field,
                        format!(
                            "date illisible « {raw} » (formats acceptés : AAAA-MM-JJ, JJ/MM/AAAA, numéro de série Excel)"
                        ),
                    ));
                    self.invalid = true;
                    None
                }
            },
        }
    }

    /// Niveau d'intérêt avec repli : cellule vide → Moyen
    /// sans bruit ; libellé inconnu → Moyen + avertissement
    fn interest(&mut self, field: &'static str) -> InterestLevel {
        match self.row.get(field) {
            None => InterestLevel::default(),
            Some(raw) => match parse_interest(raw) {
                Some(level) => level,
                None => {
                    self.anomalies.push(Anomaly::warning(
                        self.row.row_number,
                        field,
                        format!("niveau d'intérêt inconnu « {raw} », « moyen » appliqué"),
                    ));
                    InterestLevel::default()
                }
            },
        }
    }

    fn finish(self) -> (bool, Vec<Anomaly>) {
        (!self.invalid, self.anomalies)
    }
}

// ==========================================
// Normalisation par surface d'import
// ==========================================

/// Normalise une ligne du fichier entreprises
///
/// # Retour
/// - (Some(record), anomalies) : ligne exploitable, les
///   anomalies restantes sont des avertissements
/// - (None, anomalies) : ligne invalide, au moins une
///   anomalie de gravité ERREUR
pub fn normalize_company(row: &RawRow) -> (Option<CompanyRecord>, Vec<Anomaly>) {
    let mut reader = FieldReader::new(row);

    let name = reader.required_text(fields::NAME);
    let sector = reader.text(fields::SECTOR);
    let address = reader.text(fields::ADDRESS);
    let city = reader.text(fields::CITY);
    let contact = reader.text(fields::CONTACT);
    let phone = reader.text(fields::PHONE);
    let email = reader.text(fields::EMAIL);
    let headcount = reader.int(fields::HEADCOUNT);
    let interest = reader.interest(fields::INTEREST);
    let notes = reader.text(fields::NOTES);

    let (valid, anomalies) = reader.finish();
    match (valid, name) {
        (true, Some(name)) => (
            Some(CompanyRecord {
                name,
                sector,
                address,
                city,
                contact,
                phone,
                email,
                headcount,
                interest,
                notes,
                row_number: row.row_number,
            }),
            anomalies,
        ),
        _ => (None, anomalies),
    }
}

/// Normalise une ligne du fichier visites
pub fn normalize_visit(row: &RawRow) -> (Option<VisitRecord>, Vec<Anomaly>) {
    let mut reader = FieldReader::new(row);

    let company = reader.required_text(fields::COMPANY);
    let visit_date = reader.required_date(fields::VISIT_DATE);
    let sector = reader.text(fields::SECTOR);
    let city = reader.text(fields::CITY);
    let advisor = reader.text(fields::ADVISOR);
    let participants = reader.int(fields::PARTICIPANTS);
    let interest = reader.interest(fields::INTEREST);
    let report = reader.text(fields::REPORT);

    let (valid, anomalies) = reader.finish();
    match (valid, company, visit_date) {
        (true, Some(company), Some(visit_date)) => (
            Some(VisitRecord {
                company,
                sector,
                city,
                visit_date,
                advisor,
                participants,
                interest,
                report,
                row_number: row.row_number,
            }),
            anomalies,
        ),
        _ => (None, anomalies),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::import::Severity;

    #[test]
    fn test_excel_serial_date_bounds() {
        assert_eq!(
            excel_serial_date(45_000.0),
            NaiveDate::from_ymd_opt(2023, 3, 15)
        );
        assert_eq!(
            excel_serial_date(44_927.0),
            NaiveDate::from_ymd_opt(2023, 1, 1)
        );
        assert_eq!(excel_serial_date(0.0), None);
        assert_eq!(excel_serial_date(-3.0), None);
        assert_eq!(excel_serial_date(f64::NAN), None);
        assert_eq!(excel_serial_date(3_000_000.0), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 14);
        assert_eq!(parse_date("2025-03-14"), expected);
        assert_eq!(parse_date("14/03/2025"), expected);
        assert_eq!(parse_date("2025-03-14 09:30:00"), expected);
        assert_eq!(parse_date("45730"), expected); // numéro de série Excel
        assert_eq!(parse_date("pas une date"), None);
        assert_eq!(parse_date("14/25/2025"), None);
    }

    #[test]
    fn test_parse_int_accepts_excel_decimal_form() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int(" 42 "), Some(42));
        assert_eq!(parse_int("42.0"), Some(42));
        assert_eq!(parse_int("42,0"), Some(42));
        assert_eq!(parse_int("42.5"), None);
        assert_eq!(parse_int("beaucoup"), None);
    }

    #[test]
    fn test_parse_interest_closed_table() {
        assert_eq!(parse_interest("Faible"), Some(InterestLevel::Low));
        assert_eq!(parse_interest("MOYEN"), Some(InterestLevel::Medium));
        assert_eq!(parse_interest("Élevé"), Some(InterestLevel::High));
        assert_eq!(parse_interest("fort"), Some(InterestLevel::High));
        assert_eq!(parse_interest("tiède"), None);
    }

    #[test]
    fn test_normalize_company_minimal_row() {
        let row = RawRow::for_tests(2, &[(fields::NAME, "Acme SARL")]);
        let (record, anomalies) = normalize_company(&row);

        let record = record.expect("ligne exploitable");
        assert_eq!(record.name, "Acme SARL");
        assert_eq!(record.interest, InterestLevel::Medium);
        assert!(record.sector.is_none());
        assert!(anomalies.is_empty());
    }

    #[test]
    fn test_normalize_company_missing_name_invalidates_row() {
        let row = RawRow::for_tests(3, &[(fields::CITY, "Lyon")]);
        let (record, anomalies) = normalize_company(&row);

        assert!(record.is_none());
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].severity, Severity::Error);
        assert_eq!(anomalies[0].field, fields::NAME);
        assert_eq!(anomalies[0].row_number, 3);
    }

    #[test]
    fn test_normalize_company_optional_issues_stay_warnings() {
        let row = RawRow::for_tests(
            4,
            &[
                (fields::NAME, "Acme SARL"),
                (fields::HEADCOUNT, "beaucoup"),
                (fields::INTEREST, "tiède"),
            ],
        );
        let (record, anomalies) = normalize_company(&row);

        let record = record.expect("ligne exploitable malgré les avertissements");
        assert_eq!(record.headcount, None);
        assert_eq!(record.interest, InterestLevel::Medium);
        assert_eq!(anomalies.len(), 2);
        assert!(anomalies.iter().all(|a| a.severity == Severity::Warning));
    }

    #[test]
    fn test_normalize_visit_collects_every_anomaly() {
        // Entreprise absente ET date illisible : les deux
        // anomalies sont rapportées, pas seulement la première
        let row = RawRow::for_tests(
            5,
            &[
                (fields::VISIT_DATE, "hier"),
                (fields::PARTICIPANTS, "douze"),
            ],
        );
        let (record, anomalies) = normalize_visit(&row);

        assert!(record.is_none());
        assert_eq!(anomalies.len(), 3);
        let errors = anomalies
            .iter()
            .filter(|a| a.severity == Severity::Error)
            .count();
        assert_eq!(errors, 2);
    }

    #[test]
    fn test_normalize_visit_full_row() {
        let row = RawRow::for_tests(
            2,
            &[
                (fields::COMPANY, "Globex SARL"),
                (fields::VISIT_DATE, "14/03/2025"),
                (fields::SECTOR, "Industrie"),
                (fields::CITY, "Lyon"),
                (fields::ADVISOR, "M. Diallo"),
                (fields::PARTICIPANTS, "12"),
                (fields::INTEREST, "fort"),
                (fields::REPORT, "Accueil chaleureux"),
            ],
        );
        let (record, anomalies) = normalize_visit(&row);

        let record = record.expect("ligne exploitable");
        assert_eq!(record.company, "Globex SARL");
        assert_eq!(
            record.visit_date,
            NaiveDate::from_ymd_opt(2025, 3, 14).expect("date valide")
        );
        assert_eq!(record.participants, Some(12));
        assert_eq!(record.interest, InterestLevel::High);
        assert!(anomalies.is_empty());
    }

    #[test]
    fn test_normalize_is_idempotent_on_same_row() {
        let row = RawRow::for_tests(
            2,
            &[(fields::NAME, "Acme SARL"), (fields::INTEREST, "fort")],
        );
        let (first, _) = normalize_company(&row);
        let (second, _) = normalize_company(&row);
        assert_eq!(
            first.expect("ligne exploitable").name,
            second.expect("ligne exploitable").name
        );
    }
}
