//! 工作表模型（與檔案格式無關）

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::calendar;

static EMPTY_CELL: CellValue = CellValue::Empty;

/// 儲存格值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 轉為數值，空白視為 0
    ///
    /// 日期或無法解析的文字回傳 `None`
    pub fn to_decimal(&self) -> Option<Decimal> {
        match self {
            CellValue::Empty => Some(Decimal::ZERO),
            CellValue::Number(v) => Decimal::try_from(*v).ok(),
            CellValue::Bool(b) => Some(if *b { Decimal::ONE } else { Decimal::ZERO }),
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Some(Decimal::ZERO);
                }
                Decimal::from_str(trimmed)
                    .or_else(|_| Decimal::from_scientific(trimmed))
                    .ok()
            }
            CellValue::Date(_) | CellValue::DateTime(_) => None,
        }
    }

    /// 日期時間儲存格；零時只存日期
    pub fn from_datetime(value: NaiveDateTime) -> Self {
        if value == calendar::start_of_day(value.date()) {
            CellValue::Date(value.date())
        } else {
            CellValue::DateTime(value)
        }
    }

    /// 轉為日期（數值視為 Excel 序號）
    pub fn to_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            CellValue::DateTime(dt) => Some(dt.date()),
            CellValue::Number(serial) => calendar::excel_serial_to_date(*serial),
            CellValue::Text(s) => calendar::parse_date_text(s),
            CellValue::Empty | CellValue::Bool(_) => None,
        }
    }

    /// 轉為日期時間（保留時間部分）
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::Date(d) => Some(calendar::start_of_day(*d)),
            CellValue::DateTime(dt) => Some(*dt),
            CellValue::Number(serial) => calendar::excel_serial_to_datetime(*serial),
            CellValue::Text(s) => calendar::parse_datetime_text(s),
            CellValue::Empty | CellValue::Bool(_) => None,
        }
    }

    /// 轉為查找鍵（物料編號）
    ///
    /// 空白填 0；整數型數值不帶小數點，與試算表顯示一致
    pub fn to_key(&self) -> String {
        match self {
            CellValue::Empty => "0".to_string(),
            CellValue::Text(s) if s.trim().is_empty() => "0".to_string(),
            CellValue::Text(s) => s.trim().to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{}", *v as i64),
            CellValue::Number(v) => write!(f, "{v}"),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Bool(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<Decimal> for CellValue {
    fn from(value: Decimal) -> Self {
        use rust_decimal::prelude::ToPrimitive;
        value
            .to_f64()
            .map(CellValue::Number)
            .unwrap_or_else(|| CellValue::Text(value.to_string()))
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::Date(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

/// 具名工作表：首列為標題，其餘為資料列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// 創建空工作表
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows: Vec::new(),
        }
    }

    /// 建構器模式：設置資料列
    pub fn with_rows(mut self, rows: Vec<Vec<CellValue>>) -> Self {
        self.rows = rows;
        self
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// 依完整名稱查找欄位（忽略前後空白）
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name.trim())
    }

    /// 查找第一個名稱包含指定字串的欄位
    pub fn column_containing(&self, marker: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.contains(marker))
    }

    /// 查找必要欄位，缺少時回報錯誤
    pub fn require_column(&self, name: &str) -> crate::Result<usize> {
        self.column_index(name)
            .ok_or_else(|| crate::ProjectionError::MissingColumn {
                sheet: self.name.clone(),
                column: name.to_string(),
            })
    }

    /// 讀取儲存格，超出範圍視為空白
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }
}

/// 活頁簿：依原始順序保存的具名工作表
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    sheets: Vec<Table>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_sheets(sheets: Vec<Table>) -> Self {
        Self { sheets }
    }

    pub fn sheets(&self) -> &[Table] {
        &self.sheets
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn sheet(&self, name: &str) -> Option<&Table> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// 取得工作表，不存在時回報錯誤
    pub fn require_sheet(&self, name: &str) -> crate::Result<&Table> {
        self.sheet(name)
            .ok_or_else(|| crate::ProjectionError::SheetNotFound(name.to_string()))
    }

    /// 新增或取代同名工作表（取代時保留原位置）
    pub fn upsert_sheet(&mut self, table: Table) {
        match self.sheets.iter_mut().find(|s| s.name == table.name) {
            Some(existing) => *existing = table,
            None => self.sheets.push(table),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_to_decimal() {
        assert_eq!(CellValue::Empty.to_decimal(), Some(Decimal::ZERO));
        assert_eq!(CellValue::Number(12.5).to_decimal(), Some(Decimal::new(125, 1)));
        assert_eq!(CellValue::Text(" 40 ".into()).to_decimal(), Some(Decimal::from(40)));
        assert_eq!(CellValue::Text("   ".into()).to_decimal(), Some(Decimal::ZERO));
        assert_eq!(CellValue::Bool(true).to_decimal(), Some(Decimal::ONE));
        assert_eq!(CellValue::Text("abc".into()).to_decimal(), None);
        assert_eq!(CellValue::Number(f64::NAN).to_decimal(), None);
    }

    #[test]
    fn test_cell_to_key() {
        assert_eq!(CellValue::Number(12345.0).to_key(), "12345");
        assert_eq!(CellValue::Text(" HP-001 ".into()).to_key(), "HP-001");
        assert_eq!(CellValue::Empty.to_key(), "0");
    }

    #[test]
    fn test_cell_to_date() {
        let expected = NaiveDate::from_ymd_opt(2025, 1, 27).unwrap();
        assert_eq!(CellValue::Date(expected).to_date(), Some(expected));
        assert_eq!(CellValue::Text("2025-01-27".into()).to_date(), Some(expected));
        // Excel 序號 45684 = 2025-01-27
        assert_eq!(CellValue::Number(45684.0).to_date(), Some(expected));
        assert_eq!(CellValue::Empty.to_date(), None);
    }

    #[test]
    fn test_cell_to_datetime() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 27).unwrap();
        let morning = day.and_hms_opt(6, 0, 0).unwrap();

        assert_eq!(CellValue::Number(45684.25).to_datetime(), Some(morning));
        assert_eq!(CellValue::Number(45684.25).to_date(), Some(day));
        assert_eq!(CellValue::Date(day).to_datetime(), day.and_hms_opt(0, 0, 0));
        assert_eq!(CellValue::from_datetime(morning), CellValue::DateTime(morning));
        assert_eq!(CellValue::from_datetime(day.and_hms_opt(0, 0, 0).unwrap()), CellValue::Date(day));
        assert_eq!(CellValue::DateTime(morning).to_string(), "2025-01-27 06:00:00");
    }

    #[test]
    fn test_table_lookup() {
        let table = Table::new(
            "Plan",
            vec!["Part Number".into(), "Date".into(), "Unit Cost (USD)".into()],
        )
        .with_rows(vec![vec![CellValue::from("A"), CellValue::Number(1.0)]]);

        assert_eq!(table.column_index("Date"), Some(1));
        assert_eq!(table.column_containing("Cost"), Some(2));
        assert!(table.require_column("MOQ").is_err());
        assert_eq!(table.cell(0, 0), &CellValue::from("A"));
        assert_eq!(table.cell(0, 2), &CellValue::Empty);
        assert_eq!(table.cell(5, 0), &CellValue::Empty);
    }

    #[test]
    fn test_workbook_upsert_keeps_position() {
        let mut workbook = Workbook::from_sheets(vec![
            Table::new("Plan", vec![]),
            Table::new("Master", vec![]),
        ]);

        workbook.upsert_sheet(Table::new("Plan", vec!["Date".into()]));
        workbook.upsert_sheet(Table::new("Summary Report", vec![]));

        assert_eq!(workbook.sheet_names(), vec!["Plan", "Master", "Summary Report"]);
        assert_eq!(workbook.sheet("Plan").unwrap().headers, vec!["Date".to_string()]);
        assert!(workbook.require_sheet("Missing").is_err());
    }
}
