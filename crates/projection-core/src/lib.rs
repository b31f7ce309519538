//! # Projection Core
//!
//! 庫存推算核心資料模型與類型定義

pub mod calendar;
pub mod config;
pub mod price;
pub mod row;
pub mod snapshot;
pub mod table;

// Re-export 主要類型
pub use config::{ColumnRegistry, ProjectionConfig};
pub use price::PriceLookup;
pub use row::{PlanningRow, ProjectedRow};
pub use snapshot::{MonthlySnapshot, SummaryReport};
pub use table::{CellValue, Table, Workbook};

/// 庫存推算錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    #[error("找不到工作表: {0}")]
    SheetNotFound(String),

    #[error("工作表 {sheet} 缺少必要欄位: {column}")]
    MissingColumn { sheet: String, column: String },

    #[error("無效的日期（第 {row} 列）: {value:?}")]
    InvalidDate { row: usize, value: String },

    #[error("無效的數值（第 {row} 列，欄位 {column}）: {value:?}")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("配置錯誤: {0}")]
    ConfigError(String),

    #[error("計算錯誤: {0}")]
    CalculationError(String),
}

pub type Result<T> = std::result::Result<T, ProjectionError>;
