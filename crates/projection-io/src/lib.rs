//! # Projection IO
//!
//! Excel 活頁簿讀寫（calamine 讀取、rust_xlsxwriter 輸出）

pub mod reader;
pub mod writer;

// Re-export 主要函式
pub use reader::read_workbook;
pub use writer::{default_output_path, write_workbook, write_workbook_to_buffer};

use thiserror::Error;

/// 活頁簿讀寫錯誤
#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("無法讀取活頁簿: {0}")]
    Read(#[from] calamine::Error),

    #[error("無法寫入活頁簿: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),

    #[error("工作表 {sheet} 的儲存格超出 Excel 範圍（第 {row} 列，第 {col} 欄）")]
    OutOfBounds { sheet: String, row: usize, col: usize },
}

pub type Result<T> = std::result::Result<T, WorkbookError>;
