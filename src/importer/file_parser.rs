// ==========================================
// Console Orientation - Lecture des fichiers d'import
// ==========================================
// Formats : Excel (.xlsx/.xls) et CSV (.csv)
// Sortie : tableau brut positionnel (entête + lignes),
// numéros de ligne du fichier conservés (entête = 1)
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::normalizer::excel_serial_date;
use calamine::{open_workbook, Data, Reader, Xls, Xlsx};
use csv::ReaderBuilder;
use std::path::Path;

// ==========================================
// RawTable - Tableau brut
// ==========================================
// Les cellules sont des chaînes déjà rognées ; les
// cellules date des classeurs sont rendues en ISO dès
// cette frontière (le reste du pipeline ne voit jamais
// un numéro de série Excel venu d'une vraie cellule date)
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawTableRow>,
}

#[derive(Debug, Clone)]
pub struct RawTableRow {
    pub row_number: usize, // numéro dans le fichier source (entête = 1)
    pub cells: Vec<String>,
}

// ==========================================
// FileParser Trait
// ==========================================
pub trait FileParser: Send + Sync {
    fn parse(&self, file_path: &Path) -> ImportResult<RawTable>;
}

// ==========================================
// CsvParser
// ==========================================
// Le délimiteur est déduit de la ligne d'entête :
// les exports de tableurs français utilisent « ; »
pub struct CsvParser;

impl CsvParser {
    fn sniff_delimiter(first_line: &str) -> ImportResult<u8> {
        if first_line.trim().is_empty() {
            return Err(ImportError::EmptyFile);
        }

        let semicolons = first_line.matches(';').count();
        let commas = first_line.matches(',').count();
        Ok(if semicolons > commas { b';' } else { b',' })
    }

    /// Numéro de ligne (1 = entête) depuis le décalage en octets
    /// du début d'enregistrement. Le compteur de lignes interne
    /// de la bibliothèque csv n'avance que pour les
    /// enregistrements émis et saute donc les lignes sans aucun
    /// octet ; les octets du fichier, eux, les comptent tous, y
    /// compris les sauts de ligne à l'intérieur d'un champ guillemeté
    fn line_from_offset(content: &[u8], byte_offset: usize) -> usize {
        1 + content[..byte_offset.min(content.len())]
            .iter()
            .filter(|&&b| b == b'\n')
            .count()
    }
}

impl FileParser for CsvParser {
    fn parse(&self, file_path: &Path) -> ImportResult<RawTable> {
        let path = file_path;

        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        if let Some(ext) = path.extension() {
            if ext != "csv" {
                return Err(ImportError::UnsupportedFormat(
                    ext.to_string_lossy().to_string(),
                ));
            }
        }

        // Fichier chargé en une fois : le délimiteur se déduit de
        // l'entête et les positions de ligne se calculent sur les
        // octets d'origine
        let content = std::fs::read(path)?;
        let first_line = content.split(|&b| b == b'\n').next().unwrap_or(&[]);
        let delimiter = Self::sniff_delimiter(&String::from_utf8_lossy(first_line))?;

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .flexible(true) // tolère les lignes plus courtes que l'entête
            .from_reader(content.as_slice());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let cells: Vec<String> = record.iter().map(|v| v.trim().to_string()).collect();

            // Les lignes entièrement vides sont ignorées,
            // la numérotation du fichier continue d'avancer
            if cells.iter().all(|v| v.is_empty()) {
                continue;
            }

            let row_number = record
                .position()
                .map(|p| Self::line_from_offset(&content, p.byte() as usize))
                .unwrap_or(idx + 2);

            rows.push(RawTableRow { row_number, cells });
        }

        Ok(RawTable { headers, rows })
    }
}

// ==========================================
// ExcelParser
// ==========================================
pub struct ExcelParser;

impl ExcelParser {
    /// Rend une cellule en chaîne ; les dates deviennent de
    /// l'ISO, les flottants entiers perdent leur « .0 »
    fn cell_to_string(cell: &Data) -> String {
        match cell {
            Data::Empty => String::new(),
            Data::String(s) => s.trim().to_string(),
            Data::Float(f) => Self::format_float(*f),
            Data::Int(i) => i.to_string(),
            Data::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            Data::DateTime(dt) => Self::serial_to_iso(dt.as_f64()),
            Data::DateTimeIso(s) => s.trim().to_string(),
            Data::DurationIso(s) => s.trim().to_string(),
            Data::Error(_) => String::new(),
        }
    }

    fn format_float(f: f64) -> String {
        if f.fract() == 0.0 && f.abs() < 1e15 {
            format!("{}", f as i64)
        } else {
            f.to_string()
        }
    }

    fn serial_to_iso(serial: f64) -> String {
        match excel_serial_date(serial) {
            Some(date) => {
                let secs = ((serial.fract() * 86_400.0).round() as u32).min(86_399);
                if secs > 0 {
                    let h = secs / 3_600;
                    let m = (secs % 3_600) / 60;
                    let s = secs % 60;
                    format!("{} {:02}:{:02}:{:02}", date.format("%Y-%m-%d"), h, m, s)
                } else {
                    date.format("%Y-%m-%d").to_string()
                }
            }
            // numéro de série hors calendrier : on laisse la valeur
            // brute, la normalisation la signalera
            None => Self::format_float(serial),
        }
    }

    fn range_to_table(range: calamine::Range<Data>) -> ImportResult<RawTable> {
        let mut rows_iter = range.rows();
        let header_row = rows_iter
            .next()
            .ok_or(ImportError::EmptyFile)?;

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (idx, data_row) in rows_iter.enumerate() {
            let cells: Vec<String> = data_row.iter().map(Self::cell_to_string).collect();

            if cells.iter().all(|v| v.is_empty()) {
                continue;
            }

            rows.push(RawTableRow {
                row_number: idx + 2,
                cells,
            });
        }

        Ok(RawTable { headers, rows })
    }
}

impl FileParser for ExcelParser {
    fn parse(&self, file_path: &Path) -> ImportResult<RawTable> {
        let path = file_path;

        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "xlsx" => {
                let mut workbook: Xlsx<_> = open_workbook(path)?;

                let sheet_names = workbook.sheet_names();
                if sheet_names.is_empty() {
                    return Err(ImportError::ExcelParseError(
                        "le classeur ne contient aucune feuille".to_string(),
                    ));
                }

                // Première feuille uniquement
                let sheet_name = sheet_names[0].clone();
                let range = workbook.worksheet_range(&sheet_name)?;
                Self::range_to_table(range)
            }
            "xls" => {
                let mut workbook: Xls<_> = open_workbook(path)?;

                let sheet_names = workbook.sheet_names();
                if sheet_names.is_empty() {
                    return Err(ImportError::ExcelParseError(
                        "le classeur ne contient aucune feuille".to_string(),
                    ));
                }

                let sheet_name = sheet_names[0].clone();
                let range = workbook.worksheet_range(&sheet_name)?;
                Self::range_to_table(range)
            }
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

// ==========================================
// UniversalFileParser (routage par extension)
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse(&self, file_path: &Path) -> ImportResult<RawTable> {
        let ext = file_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => CsvParser.parse(file_path),
            "xlsx" | "xls" => ExcelParser.parse(file_path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}
