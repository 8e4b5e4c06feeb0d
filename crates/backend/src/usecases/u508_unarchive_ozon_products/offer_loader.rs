use calamine::{open_workbook_auto, DataType, Reader};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Имя колонки с артикулами (без учета регистра)
pub const OFFER_ID_HEADER: &str = "offer_id";

const SPREADSHEET_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xls", "ods"];

#[derive(Debug, Error)]
pub enum FileFormatError {
    #[error("input file not found: {0}")]
    NotFound(PathBuf),

    #[error("unsupported input file type '{0}' (expected .xlsx, .xls, .ods or .csv)")]
    UnsupportedExtension(String),

    #[error("cannot read spreadsheet {path}: {message}")]
    Spreadsheet { path: PathBuf, message: String },

    #[error("workbook has no worksheets: {0}")]
    NoWorksheet(PathBuf),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Прочитать список offer_id из файла.
///
/// Если в первой строке есть заголовок `offer_id`, берется эта колонка со второй
/// строки. Иначе первая колонка с первой строки (файл без заголовка).
pub fn read_offer_ids(path: &Path) -> Result<Vec<String>, FileFormatError> {
    if !path.exists() {
        return Err(FileFormatError::NotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default();

    let rows = if extension == "csv" {
        read_csv_rows(path)?
    } else if SPREADSHEET_EXTENSIONS.contains(&extension.as_str()) {
        read_spreadsheet_rows(path)?
    } else {
        return Err(FileFormatError::UnsupportedExtension(extension));
    };

    let offer_ids = extract_offer_ids(&rows);
    tracing::info!(
        "Loaded {} offer ids from {} ({} rows)",
        offer_ids.len(),
        path.display(),
        rows.len()
    );
    Ok(offer_ids)
}

/// Выбрать колонку с offer_id и собрать непустые значения в исходном порядке
pub fn extract_offer_ids(rows: &[Vec<String>]) -> Vec<String> {
    let header_column = rows.first().and_then(|header| {
        header.iter().position(|cell| {
            cell.trim_start_matches('\u{feff}')
                .trim()
                .eq_ignore_ascii_case(OFFER_ID_HEADER)
        })
    });

    let (column, start_row) = match header_column {
        Some(column) => (column, 1),
        None => (0, 0),
    };

    rows.iter()
        .skip(start_row)
        .filter_map(|row| row.get(column))
        .map(|cell| cell.trim())
        .filter(|cell| !cell.is_empty())
        .map(str::to_string)
        .collect()
}

/// Первый лист книги Excel/ODS в виде строк текста
fn read_spreadsheet_rows(path: &Path) -> Result<Vec<Vec<String>>, FileFormatError> {
    let spreadsheet_error = |message: String| FileFormatError::Spreadsheet {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| spreadsheet_error(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| FileFormatError::NoWorksheet(path.to_path_buf()))?
        .map_err(|e| spreadsheet_error(e.to_string()))?;

    // rows() начинается с первой непустой ячейки, а не с A1
    let (first_row, first_col) = range.start().unwrap_or((0, 0));
    let leading_cells = vec![String::new(); first_col as usize];

    let mut rows = vec![Vec::new(); first_row as usize];
    rows.extend(range.rows().map(|row| {
        leading_cells
            .iter()
            .cloned()
            .chain(row.iter().map(cell_to_string))
            .collect()
    }));
    Ok(rows)
}

fn read_csv_rows(path: &Path) -> Result<Vec<Vec<String>>, FileFormatError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::String(value) => value.clone(),
        // 12345.0 → "12345": артикулы часто хранятся числами
        DataType::Float(value) => value.to_string(),
        DataType::Int(value) => value.to_string(),
        DataType::Bool(value) => value.to_string(),
        DataType::Empty => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[test]
    fn uses_offer_id_column_when_header_present() {
        let data = rows(&[
            &["name", " Offer_ID ", "price"],
            &["Chair", "CH-1", "10"],
            &["Table", "  ", "20"],
            &["Lamp", " LM-2 ", "5"],
            &["Short"],
        ]);
        assert_eq!(extract_offer_ids(&data), vec!["CH-1", "LM-2"]);
    }

    #[test]
    fn headerless_file_uses_first_column_from_first_row() {
        let data = rows(&[&["A-1", "x"], &["A-2"], &[""], &["A-1"]]);
        assert_eq!(extract_offer_ids(&data), vec!["A-1", "A-2", "A-1"]);
    }

    #[test]
    fn header_only_file_is_empty() {
        let data = rows(&[&["offer_id"]]);
        assert!(extract_offer_ids(&data).is_empty());
        assert!(extract_offer_ids(&[]).is_empty());
    }

    #[test]
    fn reads_xlsx_with_numeric_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offers.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "comment").unwrap();
        sheet.write_string(0, 1, "OFFER_ID").unwrap();
        sheet.write_string(1, 1, "SKU-1").unwrap();
        sheet.write_number(2, 1, 12345.0).unwrap();
        sheet.write_string(3, 1, " SKU-3 ").unwrap();
        workbook.save(&path).unwrap();

        let offer_ids = read_offer_ids(&path).unwrap();
        assert_eq!(offer_ids, vec!["SKU-1", "12345", "SKU-3"]);
    }

    #[test]
    fn sheet_positions_are_counted_from_a1() {
        let dir = tempfile::tempdir().unwrap();

        let headerless = dir.path().join("headerless.xlsx");
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 1, "SKU-1").unwrap();
        sheet.write_string(1, 1, "SKU-2").unwrap();
        workbook.save(&headerless).unwrap();
        // колонка A пуста: значения из B не подменяют первую колонку
        assert!(read_offer_ids(&headerless).unwrap().is_empty());

        let with_header = dir.path().join("with_header.xlsx");
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 2, "offer_id").unwrap();
        sheet.write_string(1, 2, "SKU-1").unwrap();
        workbook.save(&with_header).unwrap();
        assert_eq!(read_offer_ids(&with_header).unwrap(), vec!["SKU-1"]);

        let rows = read_spreadsheet_rows(&with_header).unwrap();
        assert_eq!(rows[0], vec!["", "", "offer_id"]);
    }

    #[test]
    fn reads_csv_without_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offers.csv");
        std::fs::write(&path, "A\nB,extra\n\nC\n").unwrap();

        assert_eq!(read_offer_ids(&path).unwrap(), vec!["A", "B", "C"]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_offer_ids(&dir.path().join("missing.xlsx"));
        assert!(matches!(result, Err(FileFormatError::NotFound(_))));
    }

    #[test]
    fn unknown_extension_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offers.txt");
        std::fs::write(&path, "A\n").unwrap();
        assert!(matches!(
            read_offer_ids(&path),
            Err(FileFormatError::UnsupportedExtension(ext)) if ext == "txt"
        ));
    }

    #[test]
    fn corrupt_workbook_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"not a zip archive").unwrap();
        assert!(matches!(
            read_offer_ids(&path),
            Err(FileFormatError::Spreadsheet { .. })
        ));
    }
}
