//! 計劃列模型

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 計劃列：某物料在某日期的一筆觀測
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningRow {
    /// 物料編號
    pub part_id: String,

    /// 日期
    pub date: NaiveDate,

    /// 完整日期時間（排序與快照比對用）
    pub timestamp: NaiveDateTime,

    /// 在來源工作表中的資料列索引（0 起算，不含標題列）
    pub source_index: usize,

    /// 現有庫存（僅物料首列使用）
    pub on_hand: Decimal,

    /// 最小訂購量（原始值，可能為 0 或負）
    pub moq: Decimal,

    /// 計劃時界（往後檢視的期數；0 或負數為空窗口）
    pub horizon: i64,

    /// 已確認訂單
    pub confirmed_orders: Decimal,

    /// 來源中已有的未確認訂單（窗口不足時沿用）
    pub unconfirmed_orders: Decimal,

    /// 具名需求數量（扣減/前瞻欄位）
    pub quantities: HashMap<String, Decimal>,
}

impl PlanningRow {
    /// 創建新的計劃列
    pub fn new(part_id: String, date: NaiveDate) -> Self {
        Self {
            part_id,
            date,
            timestamp: crate::calendar::start_of_day(date),
            source_index: 0,
            on_hand: Decimal::ZERO,
            moq: Decimal::ONE,
            horizon: 5,
            confirmed_orders: Decimal::ZERO,
            unconfirmed_orders: Decimal::ZERO,
            quantities: HashMap::new(),
        }
    }

    /// 建構器模式：設置日期時間（同時更新日期）
    pub fn with_timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.date = timestamp.date();
        self.timestamp = timestamp;
        self
    }

    /// 建構器模式：設置來源索引
    pub fn with_source_index(mut self, index: usize) -> Self {
        self.source_index = index;
        self
    }

    /// 建構器模式：設置現有庫存
    pub fn with_on_hand(mut self, qty: Decimal) -> Self {
        self.on_hand = qty;
        self
    }

    /// 建構器模式：設置最小訂購量
    pub fn with_moq(mut self, moq: Decimal) -> Self {
        self.moq = moq;
        self
    }

    /// 建構器模式：設置計劃時界
    pub fn with_horizon(mut self, horizon: i64) -> Self {
        self.horizon = horizon;
        self
    }

    /// 建構器模式：設置已確認訂單
    pub fn with_confirmed_orders(mut self, qty: Decimal) -> Self {
        self.confirmed_orders = qty;
        self
    }

    /// 建構器模式：設置既有未確認訂單
    pub fn with_unconfirmed_orders(mut self, qty: Decimal) -> Self {
        self.unconfirmed_orders = qty;
        self
    }

    /// 建構器模式：設置具名需求數量
    pub fn with_quantity(mut self, column: impl Into<String>, qty: Decimal) -> Self {
        self.quantities.insert(column.into(), qty);
        self
    }

    /// 讀取具名數量，不存在時為 0
    pub fn quantity(&self, column: &str) -> Decimal {
        self.quantities.get(column).copied().unwrap_or(Decimal::ZERO)
    }

    /// 指定欄位的數量合計
    pub fn sum_of(&self, columns: &[String]) -> Decimal {
        columns.iter().map(|c| self.quantity(c)).sum()
    }

    /// 有效 MOQ：下限為 1
    pub fn effective_moq(&self) -> Decimal {
        self.moq.max(Decimal::ONE)
    }
}

/// 推算後的計劃列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedRow {
    pub row: PlanningRow,

    /// 期初餘額（首列為現有庫存，其後為上一列推算餘額）
    pub start_balance: Decimal,

    /// 本期扣減合計
    pub deductions: Decimal,

    /// 未確認訂單（建議下單量）
    pub unconfirmed_orders: Decimal,

    /// 推算餘額
    pub calculated_balance: Decimal,

    /// 週供應覆蓋；未來窗口不足時為 None
    pub wos_check: Option<Decimal>,
}

impl ProjectedRow {
    /// 本期總供應
    pub fn final_supply(&self) -> Decimal {
        self.unconfirmed_orders + self.row.confirmed_orders
    }
}
