//! 活頁簿讀取

use calamine::{open_workbook_auto, Data, Range, Reader};
use projection_core::calendar;
use projection_core::{CellValue, Table, Workbook};
use std::path::Path;

/// 讀取活頁簿的所有工作表（保持原始順序）
///
/// 每張工作表的第一個使用列作為標題列
pub fn read_workbook(path: impl AsRef<Path>) -> crate::Result<Workbook> {
    let path = path.as_ref();
    let mut source = open_workbook_auto(path)?;

    let sheet_names = source.sheet_names().to_owned();
    tracing::info!("讀取活頁簿 {}：{} 張工作表", path.display(), sheet_names.len());

    let mut sheets = Vec::with_capacity(sheet_names.len());
    for sheet_name in sheet_names {
        let range = source.worksheet_range(&sheet_name)?;
        let table = range_to_table(&sheet_name, &range);
        tracing::debug!(
            "工作表 {}: {} 欄，{} 列",
            sheet_name,
            table.headers.len(),
            table.row_count()
        );
        sheets.push(table);
    }

    Ok(Workbook::from_sheets(sheets))
}

fn range_to_table(sheet_name: &str, range: &Range<Data>) -> Table {
    let mut rows = range.rows();

    let headers = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .enumerate()
            .map(|(idx, value)| header_name(idx, value))
            .collect(),
        None => Vec::new(),
    };

    let body = rows
        .map(|row| row.iter().map(convert_value).collect())
        .collect();

    Table::new(sheet_name, headers).with_rows(body)
}

fn header_name(idx: usize, value: &Data) -> String {
    let name = convert_value(value).to_string();
    let trimmed = name.trim();
    if trimmed.is_empty() {
        format!("Unnamed: {idx}")
    } else {
        trimmed.to_string()
    }
}

fn convert_value(value: &Data) -> CellValue {
    match value {
        Data::Empty => CellValue::Empty,
        Data::Bool(v) => CellValue::Bool(*v),
        Data::Int(v) => CellValue::Number(*v as f64),
        Data::Float(v) => CellValue::Number(*v),
        Data::String(v) => CellValue::Text(v.clone()),
        Data::DateTime(v) => {
            let serial = v.as_f64();
            calendar::excel_serial_to_datetime(serial)
                .map(CellValue::from_datetime)
                .unwrap_or(CellValue::Number(serial))
        }
        Data::DateTimeIso(v) => calendar::parse_datetime_text(v)
            .map(CellValue::from_datetime)
            .unwrap_or_else(|| CellValue::Text(v.clone())),
        Data::DurationIso(v) => CellValue::Text(v.clone()),
        Data::Error(e) => CellValue::Text(format!("#{e:?}")),
    }
}
