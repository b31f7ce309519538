//! 活頁簿輸出

use projection_core::calendar;
use projection_core::{CellValue, Table, Workbook};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};
use std::path::{Path, PathBuf};

use crate::WorkbookError;

/// 輸出檔名前綴
const OUTPUT_PREFIX: &str = "WOS_Audited_";

/// 預設輸出路徑：與輸入同目錄，檔名加上 `WOS_Audited_` 前綴
pub fn default_output_path(input: &Path) -> PathBuf {
    let file_name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "workbook.xlsx".to_string());
    input.with_file_name(format!("{OUTPUT_PREFIX}{file_name}"))
}

/// 將活頁簿寫入檔案
pub fn write_workbook(workbook: &Workbook, path: impl AsRef<Path>) -> crate::Result<()> {
    let path = path.as_ref();
    let mut out = build_xlsx(workbook)?;
    out.save(path)?;
    tracing::info!("已輸出活頁簿 {}", path.display());
    Ok(())
}

/// 將活頁簿寫入記憶體（下載用）
pub fn write_workbook_to_buffer(workbook: &Workbook) -> crate::Result<Vec<u8>> {
    let mut out = build_xlsx(workbook)?;
    Ok(out.save_to_buffer()?)
}

fn build_xlsx(workbook: &Workbook) -> crate::Result<XlsxWorkbook> {
    let mut out = XlsxWorkbook::new();
    let header_format = Format::new().set_bold();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let datetime_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    for table in workbook.sheets() {
        let sheet = out.add_worksheet();
        sheet.set_name(table.name.as_str())?;

        for (col, header) in table.headers.iter().enumerate() {
            let col = col_num(table, 0, col)?;
            sheet.write_string_with_format(0, col, header.as_str(), &header_format)?;
        }

        for (row_idx, cells) in table.rows.iter().enumerate() {
            let row = row_num(table, row_idx + 1, 0)?;
            for (col_idx, value) in cells.iter().enumerate() {
                let col = col_num(table, row_idx + 1, col_idx)?;
                match value {
                    CellValue::Empty => {}
                    CellValue::Number(v) if v.is_finite() => {
                        sheet.write_number(row, col, *v)?;
                    }
                    CellValue::Number(_) => {}
                    CellValue::Text(s) => {
                        sheet.write_string(row, col, s.as_str())?;
                    }
                    CellValue::Bool(b) => {
                        sheet.write_boolean(row, col, *b)?;
                    }
                    CellValue::Date(d) => {
                        let serial = calendar::date_to_excel_serial(*d);
                        sheet.write_number_with_format(row, col, serial, &date_format)?;
                    }
                    CellValue::DateTime(dt) => {
                        let serial = calendar::datetime_to_excel_serial(*dt);
                        sheet.write_number_with_format(row, col, serial, &datetime_format)?;
                    }
                }
            }
        }

        tracing::debug!("寫入工作表 {}: {} 列", table.name, table.row_count());
    }

    Ok(out)
}

fn row_num(table: &Table, row: usize, col: usize) -> crate::Result<u32> {
    u32::try_from(row).map_err(|_| out_of_bounds(table, row, col))
}

fn col_num(table: &Table, row: usize, col: usize) -> crate::Result<u16> {
    u16::try_from(col).map_err(|_| out_of_bounds(table, row, col))
}

fn out_of_bounds(table: &Table, row: usize, col: usize) -> WorkbookError {
    WorkbookError::OutOfBounds {
        sheet: table.name.clone(),
        row,
        col,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read_workbook;
    use chrono::NaiveDate;

    #[test]
    fn test_default_output_path() {
        let path = default_output_path(Path::new("/data/plan Q3.xlsx"));
        assert_eq!(path, PathBuf::from("/data/WOS_Audited_plan Q3.xlsx"));
    }

    #[test]
    fn test_write_and_read_back() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 27).unwrap();
        let shift = date.and_hms_opt(14, 30, 0).unwrap();
        let workbook = Workbook::from_sheets(vec![
            Table::new("Plan", vec!["Part Number".into(), "Date".into(), "Qty".into()]).with_rows(vec![
                vec![CellValue::from("A-1"), CellValue::Date(date), CellValue::Number(12.5)],
                vec![CellValue::from("A-2"), CellValue::DateTime(shift), CellValue::Empty],
            ]),
            Table::new("Summary Report", vec!["Month".into()])
                .with_rows(vec![vec![CellValue::from("2025-01")]]),
        ]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        write_workbook(&workbook, &path).unwrap();

        let loaded = read_workbook(&path).unwrap();
        assert_eq!(loaded.sheet_names(), vec!["Plan", "Summary Report"]);

        let plan = loaded.sheet("Plan").unwrap();
        assert_eq!(plan.headers, vec!["Part Number", "Date", "Qty"]);
        assert_eq!(plan.cell(0, 0), &CellValue::from("A-1"));
        assert_eq!(plan.cell(0, 1).to_date(), Some(date));
        assert_eq!(plan.cell(0, 2), &CellValue::Number(12.5));
        assert!(plan.cell(1, 2).is_empty());
        assert_eq!(plan.cell(1, 1).to_datetime(), Some(shift));
    }

    #[test]
    fn test_write_to_buffer() {
        let workbook = Workbook::from_sheets(vec![Table::new("Plan", vec!["Date".into()])]);

        let bytes = write_workbook_to_buffer(&workbook).unwrap();
        // xlsx 為 zip 格式
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_invalid_sheet_name_is_error() {
        let workbook = Workbook::from_sheets(vec![Table::new("Bad[Name]", vec![])]);

        assert!(matches!(
            write_workbook_to_buffer(&workbook),
            Err(WorkbookError::Write(_))
        ));
    }
}
