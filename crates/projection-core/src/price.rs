//! 單價查找表

use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::{ProjectionConfig, ProjectionError, Table};

/// 物料單價查找表，未登錄的物料單價為 0
#[derive(Debug, Clone, Default)]
pub struct PriceLookup {
    prices: HashMap<String, Decimal>,
    price_column: String,
}

impl PriceLookup {
    pub fn new(price_column: impl Into<String>) -> Self {
        Self {
            prices: HashMap::new(),
            price_column: price_column.into(),
        }
    }

    /// 從單價參考工作表建立查找表
    ///
    /// 鍵欄位必須存在；找不到單價欄位時回傳 `None`（摘要略過）。
    /// 重複的物料以最後一列為準。
    pub fn from_master_sheet(table: &Table, config: &ProjectionConfig) -> crate::Result<Option<Self>> {
        let key_col = table.require_column(&config.price_key_column)?;
        let Some(price_col) = table.column_containing(&config.price_column_marker) else {
            return Ok(None);
        };

        let mut lookup = Self::new(table.headers[price_col].clone());
        for index in 0..table.row_count() {
            let key_cell = table.cell(index, key_col);
            if key_cell.is_empty() {
                continue;
            }

            let cost_cell = table.cell(index, price_col);
            let cost = cost_cell
                .to_decimal()
                .ok_or_else(|| ProjectionError::InvalidNumber {
                    row: index + 2,
                    column: lookup.price_column.clone(),
                    value: cost_cell.to_string(),
                })?;

            lookup.insert(key_cell.to_key(), cost);
        }

        Ok(Some(lookup))
    }

    pub fn insert(&mut self, part_id: String, unit_cost: Decimal) {
        self.prices.insert(part_id, unit_cost);
    }

    /// 單價，未登錄為 0
    pub fn unit_cost(&self, part_id: &str) -> Decimal {
        self.prices.get(part_id).copied().unwrap_or(Decimal::ZERO)
    }

    /// 使用的單價欄位名稱
    pub fn price_column(&self) -> &str {
        &self.price_column
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}
