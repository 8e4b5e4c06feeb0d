use contracts::usecases::u508_unarchive_ozon_products::report::{NOT_FOUND_MARKER, REPORT_HEADER};
use contracts::usecases::u508_unarchive_ozon_products::{ReportAction, ReportRow};
use rust_xlsxwriter::{Workbook, Worksheet};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const REPORT_FILE_NAME: &str = "result.xlsx";

const REPORT_SHEET_NAME: &str = "result";

/// Целые по модулю до 2^53 хранятся в ячейке Excel (f64) без потерь
const MAX_EXACT_NUMBER: u64 = 1 << 53;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),
}

/// Отчет сохраняется рядом с входным файлом
pub fn report_path_for(input: &Path) -> PathBuf {
    input
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .join(REPORT_FILE_NAME)
}

/// Записать отчет: заголовок из 7 колонок и строки в порядке накопления.
/// Существующий файл перезаписывается.
pub fn write_report(path: &Path, rows: &[ReportRow]) -> Result<(), ReportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(REPORT_SHEET_NAME)?;

    for (col_idx, header) in REPORT_HEADER.iter().enumerate() {
        worksheet.write_string(0, col_idx as u16, *header)?;
    }

    for (row_idx, row) in rows.iter().enumerate() {
        write_row(worksheet, (row_idx + 1) as u32, row)?;
    }

    worksheet.set_freeze_panes(1, 0)?;
    worksheet.set_column_width(0, 24)?;
    worksheet.set_column_width(5, 24)?;

    workbook.save(path)?;
    tracing::info!("Report with {} rows saved to {}", rows.len(), path.display());
    Ok(())
}

fn write_row(
    worksheet: &mut Worksheet,
    row: u32,
    report_row: &ReportRow,
) -> Result<(), ReportError> {
    let not_found = report_row.action == ReportAction::NotFound;

    worksheet.write_string(row, 0, &report_row.offer_id)?;

    match report_row.product_id {
        Some(product_id) if product_id.unsigned_abs() <= MAX_EXACT_NUMBER => {
            worksheet.write_number(row, 1, product_id as f64)?;
        }
        Some(product_id) => {
            worksheet.write_string(row, 1, product_id.to_string())?;
        }
        None if not_found => {
            worksheet.write_string(row, 1, NOT_FOUND_MARKER)?;
        }
        None => {}
    }

    match &report_row.status_before {
        Some(status) => {
            worksheet.write_string(row, 2, status)?;
        }
        None => {
            worksheet.write_string(row, 2, NOT_FOUND_MARKER)?;
        }
    }

    write_flag(worksheet, row, 3, report_row.archived)?;
    write_flag(worksheet, row, 4, report_row.is_autoarchived)?;

    worksheet.write_string(row, 5, report_row.action.as_str())?;
    if !report_row.error.is_empty() {
        worksheet.write_string(row, 6, &report_row.error)?;
    }
    Ok(())
}

fn write_flag(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: Option<bool>,
) -> Result<(), ReportError> {
    match value {
        Some(flag) => worksheet.write_boolean(row, col, flag)?,
        None => worksheet.write_string(row, col, NOT_FOUND_MARKER)?,
    };
    Ok(())
}
