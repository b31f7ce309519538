//! # Projection Calculation Engine
//!
//! 庫存餘額推算、補貨建議與月度快照

pub mod calculator;
pub mod projection;
pub mod replenishment;
pub mod snapshot;
pub mod timeline;

// Re-export 主要類型
pub use calculator::ProjectionCalculator;
pub use projection::{BalanceCarry, ProjectionEngine};
pub use timeline::{Timelines, TimelineBuilder};

use projection_core::{ProjectedRow, SummaryReport, Workbook};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// 物料編號 → 推算結果（依日期排序）
pub type ProjectedTimelines = BTreeMap<String, Vec<ProjectedRow>>;

/// 推算結果
#[derive(Debug, Clone)]
pub struct ProjectionResult {
    /// 輸出活頁簿（處理後的工作表與摘要表）
    pub workbook: Workbook,

    /// 處理的工作表名稱
    pub sheet_name: String,

    /// 各物料推算結果
    pub projected: ProjectedTimelines,

    /// 月度摘要（無單價參考表時為 None）
    pub summary: Option<SummaryReport>,

    /// 統計
    pub stats: ProjectionStats,

    /// 警告信息
    pub warnings: Vec<ProjectionWarning>,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

impl ProjectionResult {
    /// 依輸出順序（物料、日期）的所有推算列
    pub fn rows(&self) -> impl Iterator<Item = &ProjectedRow> {
        self.projected.values().flatten()
    }
}

/// 推算統計
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectionStats {
    /// 物料數
    pub total_parts: usize,

    /// 推算列數
    pub total_rows: usize,

    /// 有週供應覆蓋值的列數
    pub rows_with_wos: usize,

    /// 週供應覆蓋平均值；沒有任何覆蓋值時為 None
    pub average_wos: Option<Decimal>,
}

impl ProjectionStats {
    pub fn from_projected(projected: &ProjectedTimelines) -> Self {
        let values: Vec<Decimal> = projected
            .values()
            .flatten()
            .filter_map(|p| p.wos_check)
            .collect();

        let average_wos = if values.is_empty() {
            None
        } else {
            values
                .iter()
                .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
                .and_then(|sum| sum.checked_div(Decimal::from(values.len())))
        };

        Self {
            total_parts: projected.len(),
            total_rows: projected.values().map(Vec::len).sum(),
            rows_with_wos: values.len(),
            average_wos,
        }
    }
}

/// 推算警告
#[derive(Debug, Clone)]
pub struct ProjectionWarning {
    /// 相關的工作表或物料
    pub subject: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl ProjectionWarning {
    pub fn new(subject: String, message: String, severity: WarningSeverity) -> Self {
        Self {
            subject,
            message,
            severity,
        }
    }

    pub fn info(subject: String, message: String) -> Self {
        Self::new(subject, message, WarningSeverity::Info)
    }

    pub fn warning(subject: String, message: String) -> Self {
        Self::new(subject, message, WarningSeverity::Warning)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Info,
    Warning,
}
