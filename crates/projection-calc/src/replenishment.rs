//! 補貨批量計算（MOQ 取整）

use projection_core::ProjectionError;
use rust_decimal::Decimal;

/// 補貨計算器
pub struct ReplenishmentCalculator;

impl ReplenishmentCalculator {
    /// 覆蓋缺口所需的 MOQ 批數
    ///
    /// `k = floor(gap / moq) + 1`：缺口剛好為 0 時仍下一批；
    /// 大量盈餘時 k 可能為 0 或負數。
    pub fn lots_required(gap: Decimal, moq: Decimal) -> projection_core::Result<Decimal> {
        let ratio = gap.checked_div(moq).ok_or_else(|| {
            ProjectionError::CalculationError(format!("缺口 {gap} 無法除以 MOQ {moq}"))
        })?;
        ratio
            .floor()
            .checked_add(Decimal::ONE)
            .ok_or_else(|| ProjectionError::CalculationError(format!("批數溢出：缺口 {gap}")))
    }

    /// 未確認訂單數量
    ///
    /// # 參數
    /// * `base_balance` - 僅計入已確認供應的本期餘額
    /// * `target_sum` - 未來窗口需求合計
    /// * `moq` - 有效 MOQ（≥ 1）
    pub fn unconfirmed_orders(
        base_balance: Decimal,
        target_sum: Decimal,
        moq: Decimal,
    ) -> projection_core::Result<Decimal> {
        let gap = target_sum.checked_sub(base_balance).ok_or_else(|| {
            ProjectionError::CalculationError(format!(
                "缺口溢出：需求 {target_sum}，餘額 {base_balance}"
            ))
        })?;

        let lots = Self::lots_required(gap, moq)?;
        lots.checked_mul(moq)
            .ok_or_else(|| ProjectionError::CalculationError(format!("訂購量溢出：{lots} 批 × {moq}")))
    }
}
