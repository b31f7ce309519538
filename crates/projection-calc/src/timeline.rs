//! 物料時間序列建構

use projection_core::{
    CellValue, PlanningRow, ProjectionConfig, ProjectionError, Table,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::ProjectionWarning;

/// 物料編號 → 依日期排序的計劃列
pub type Timelines = BTreeMap<String, Vec<PlanningRow>>;

/// 工作表欄位對應（建構前一次性驗證）
#[derive(Debug, Clone)]
pub struct SheetSchema {
    pub part: usize,
    pub date: usize,
    pub confirmed: usize,
    pub on_hand: Option<usize>,
    pub moq: Option<usize>,
    pub horizon: Option<usize>,
    pub unconfirmed: Option<usize>,
    /// 工作表中存在的登錄欄位
    pub quantities: Vec<(String, usize)>,
    /// 工作表中缺少的登錄欄位（視為 0）
    pub missing_quantities: Vec<String>,
}

impl SheetSchema {
    /// 解析欄位對應，必要欄位缺少時回報錯誤
    pub fn resolve(table: &Table, config: &ProjectionConfig) -> projection_core::Result<Self> {
        let [part, date, confirmed] = config.required_columns();
        let part = table.require_column(part)?;
        let date = table.require_column(date)?;
        let confirmed = table.require_column(confirmed)?;

        let mut quantities = Vec::new();
        let mut missing_quantities = Vec::new();
        for name in config.registry.all_columns() {
            match table.column_index(name) {
                Some(idx) => quantities.push((name.to_string(), idx)),
                None => missing_quantities.push(name.to_string()),
            }
        }

        Ok(Self {
            part,
            date,
            confirmed,
            on_hand: table.column_index(&config.on_hand_column),
            moq: table.column_index(&config.moq_column),
            horizon: table.column_index(&config.horizon_column),
            unconfirmed: table.column_index(&config.unconfirmed_column),
            quantities,
            missing_quantities,
        })
    }
}

/// 時間序列建構結果
#[derive(Debug, Clone, Default)]
pub struct BuiltTimelines {
    pub timelines: Timelines,
    pub warnings: Vec<ProjectionWarning>,
    /// 略過的全空白列數
    pub skipped_rows: usize,
}

/// 時間序列建構器
pub struct TimelineBuilder<'a> {
    config: &'a ProjectionConfig,
}

impl<'a> TimelineBuilder<'a> {
    pub fn new(config: &'a ProjectionConfig) -> Self {
        Self { config }
    }

    /// 解析工作表、依物料分組並依日期排序
    ///
    /// 同日期的列保持原始順序。空白儲存格視為 0。
    pub fn build(&self, table: &Table) -> projection_core::Result<BuiltTimelines> {
        let schema = SheetSchema::resolve(table, self.config)?;

        let mut built = BuiltTimelines::default();
        for name in &schema.missing_quantities {
            tracing::warn!("工作表 {} 缺少需求欄位 {}，以 0 計算", table.name, name);
            built.warnings.push(ProjectionWarning::warning(
                table.name.clone(),
                format!("缺少需求欄位 {name}，以 0 計算"),
            ));
        }

        for (index, cells) in table.rows.iter().enumerate() {
            if cells.iter().all(CellValue::is_empty) {
                built.skipped_rows += 1;
                continue;
            }

            let row = self.parse_row(table, &schema, index)?;
            built
                .timelines
                .entry(row.part_id.clone())
                .or_insert_with(Vec::new)
                .push(row);
        }

        // sort_by_key 為穩定排序；同一時間保持原始順序
        for rows in built.timelines.values_mut() {
            rows.sort_by_key(|r| r.timestamp);
        }

        tracing::debug!(
            "工作表 {}: {} 個物料，略過空白列 {}",
            table.name,
            built.timelines.len(),
            built.skipped_rows
        );

        Ok(built)
    }

    fn parse_row(
        &self,
        table: &Table,
        schema: &SheetSchema,
        index: usize,
    ) -> projection_core::Result<PlanningRow> {
        // 工作表列號（標題為第 1 列）
        let sheet_row = index + 2;

        let part_id = table.cell(index, schema.part).to_key();

        let date_cell = table.cell(index, schema.date);
        let timestamp = date_cell
            .to_datetime()
            .ok_or_else(|| ProjectionError::InvalidDate {
                row: sheet_row,
                value: date_cell.to_string(),
            })?;

        let number = |col: usize| -> projection_core::Result<Decimal> {
            let cell = table.cell(index, col);
            cell.to_decimal().ok_or_else(|| ProjectionError::InvalidNumber {
                row: sheet_row,
                column: table.headers[col].clone(),
                value: cell.to_string(),
            })
        };

        let on_hand = schema.on_hand.map(&number).transpose()?.unwrap_or(Decimal::ZERO);
        let moq = schema.moq.map(&number).transpose()?.unwrap_or(self.config.default_moq);
        let confirmed = number(schema.confirmed)?;
        let unconfirmed = schema.unconfirmed.map(&number).transpose()?.unwrap_or(Decimal::ZERO);

        // 小數截斷；超出 i64 範圍時飽和
        let horizon = match schema.horizon {
            Some(col) => {
                let raw = number(col)?.trunc();
                raw.to_i64().unwrap_or(if raw.is_sign_negative() { i64::MIN } else { i64::MAX })
            }
            None => self.config.default_horizon,
        };

        let mut row = PlanningRow::new(part_id, timestamp.date())
            .with_timestamp(timestamp)
            .with_source_index(index)
            .with_on_hand(on_hand)
            .with_moq(moq)
            .with_horizon(horizon)
            .with_confirmed_orders(confirmed)
            .with_unconfirmed_orders(unconfirmed);

        for (name, col) in &schema.quantities {
            row.quantities.insert(name.clone(), number(*col)?);
        }

        Ok(row)
    }
}
