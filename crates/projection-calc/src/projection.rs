//! 餘額推算引擎

use projection_core::{PlanningRow, ProjectedRow, ProjectionConfig, ProjectionError};
use rust_decimal::Decimal;

use crate::replenishment::ReplenishmentCalculator;

/// 逐列傳遞的推算狀態
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BalanceCarry {
    /// 上一列推算餘額；物料首列為 None（改用現有庫存）
    pub previous_balance: Option<Decimal>,
}

impl BalanceCarry {
    /// 物料首列的初始狀態
    pub fn start() -> Self {
        Self::default()
    }
}

/// 餘額推算引擎
///
/// 每個物料序列獨立推算；序列內必須依日期順序逐列進行。
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    deduction_columns: Vec<String>,
    forward_columns: Vec<String>,
    wos_sentinel: Decimal,
    clamp_negative_orders: bool,
}

impl ProjectionEngine {
    pub fn new(config: &ProjectionConfig) -> Self {
        Self {
            deduction_columns: config.registry.deductions.clone(),
            forward_columns: config.registry.forward.clone(),
            wos_sentinel: config.wos_sentinel,
            clamp_negative_orders: config.clamp_negative_orders,
        }
    }

    /// 推算整個物料序列
    pub fn project_timeline(&self, timeline: &[PlanningRow]) -> projection_core::Result<Vec<ProjectedRow>> {
        let mut projected = Vec::with_capacity(timeline.len());
        (0..timeline.len()).try_fold(BalanceCarry::start(), |carry, index| {
            let (next, row) = self.step(carry, timeline, index)?;
            projected.push(row);
            Ok::<_, ProjectionError>(next)
        })?;
        Ok(projected)
    }

    /// 推算單列：接收上一列狀態，回傳下一列狀態與本列結果
    pub fn step(
        &self,
        carry: BalanceCarry,
        timeline: &[PlanningRow],
        index: usize,
    ) -> projection_core::Result<(BalanceCarry, ProjectedRow)> {
        let row = &timeline[index];
        let fail = |what: &str| {
            ProjectionError::CalculationError(format!(
                "物料 {} 日期 {}: {}",
                row.part_id, row.date, what
            ))
        };

        let moq = row.effective_moq();
        let n_weeks = row.horizon;
        let start_balance = carry.previous_balance.unwrap_or(row.on_hand);
        let deductions = self.checked_sum(row, &self.deduction_columns).ok_or_else(|| fail("扣減合計溢出"))?;
        let confirmed = row.confirmed_orders;

        let window = Self::forward_window(timeline, index, n_weeks);
        let window_demand = match window {
            Some(rows) => Some(self.window_demand(rows).ok_or_else(|| fail("未來需求合計溢出"))?),
            None => None,
        };

        let mut unconfirmed_orders = row.unconfirmed_orders;
        if let Some(target_sum) = window_demand {
            let base_balance = start_balance
                .checked_add(confirmed)
                .and_then(|v| v.checked_sub(deductions))
                .ok_or_else(|| fail("基礎餘額溢出"))?;
            unconfirmed_orders = ReplenishmentCalculator::unconfirmed_orders(base_balance, target_sum, moq)?;
            if self.clamp_negative_orders && unconfirmed_orders < Decimal::ZERO {
                unconfirmed_orders = Decimal::ZERO;
            }
        }

        let calculated_balance = unconfirmed_orders
            .checked_add(confirmed)
            .and_then(|supply| start_balance.checked_add(supply))
            .and_then(|v| v.checked_sub(deductions))
            .ok_or_else(|| fail("推算餘額溢出"))?;

        let wos_check = match window_demand {
            Some(future_sum) if future_sum > Decimal::ZERO => Some(
                calculated_balance
                    .checked_div(future_sum)
                    .and_then(|ratio| ratio.checked_mul(Decimal::from(n_weeks)))
                    .ok_or_else(|| fail("週供應覆蓋計算溢出"))?,
            ),
            Some(_) => Some(self.wos_sentinel),
            None => None,
        };

        let next = BalanceCarry {
            previous_balance: Some(calculated_balance),
        };
        let projected = ProjectedRow {
            row: row.clone(),
            start_balance,
            deductions,
            unconfirmed_orders,
            calculated_balance,
            wos_check,
        };

        Ok((next, projected))
    }

    /// 未來窗口：第 index+1 到 index+n 列
    ///
    /// n ≤ 0 時為空窗口；index+n 超出序列結尾時為 None
    pub fn forward_window(timeline: &[PlanningRow], index: usize, n_weeks: i64) -> Option<&[PlanningRow]> {
        if index >= timeline.len() {
            return None;
        }
        if n_weeks <= 0 {
            return Some(&timeline[index + 1..index + 1]);
        }
        let end = usize::try_from(n_weeks).ok()?.checked_add(index)?;
        if end < timeline.len() {
            Some(&timeline[index + 1..=end])
        } else {
            None
        }
    }

    fn window_demand(&self, window: &[PlanningRow]) -> Option<Decimal> {
        window.iter().try_fold(Decimal::ZERO, |acc, row| {
            acc.checked_add(self.checked_sum(row, &self.forward_columns)?)
        })
    }

    fn checked_sum(&self, row: &PlanningRow, columns: &[String]) -> Option<Decimal> {
        columns
            .iter()
            .try_fold(Decimal::ZERO, |acc, c| acc.checked_add(row.quantity(c)))
    }
}
