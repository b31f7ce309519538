//! 月度快照模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::{CellValue, Table};

/// 月度快照：某物料在某月最後一個週一的庫存價值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySnapshot {
    /// 物料編號
    pub part_id: String,

    /// 快照日期（當月最後一個週一）
    pub snapshot_date: NaiveDate,

    /// 月份標籤（YYYY-MM）
    pub month: String,

    /// 快照日推算餘額（無對應日期時為 0）
    pub balance: Decimal,

    /// 單價
    pub unit_cost: Decimal,

    /// 金額 = 餘額 × 單價
    pub amount: Decimal,
}

impl MonthlySnapshot {
    /// 創建新的快照，金額由餘額與單價計算
    pub fn new(
        part_id: String,
        snapshot_date: NaiveDate,
        balance: Decimal,
        unit_cost: Decimal,
    ) -> crate::Result<Self> {
        let amount = balance.checked_mul(unit_cost).ok_or_else(|| {
            crate::ProjectionError::CalculationError(format!(
                "物料 {part_id} 快照金額溢出：{balance} × {unit_cost}"
            ))
        })?;

        Ok(Self {
            part_id,
            snapshot_date,
            month: crate::calendar::month_label(snapshot_date),
            balance,
            unit_cost,
            amount,
        })
    }
}

/// 月度摘要報表
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub records: Vec<MonthlySnapshot>,
}

impl SummaryReport {
    pub fn new(records: Vec<MonthlySnapshot>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 報表中出現的月份（排序後）
    pub fn months(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.month.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// 篩選指定月份
    pub fn filter_months<S: AsRef<str>>(&self, months: &[S]) -> SummaryReport {
        let records = self
            .records
            .iter()
            .filter(|r| months.iter().any(|m| m.as_ref() == r.month))
            .cloned()
            .collect();
        SummaryReport::new(records)
    }

    /// 各快照日期的金額小計
    pub fn totals_by_snapshot_date(&self) -> BTreeMap<NaiveDate, Decimal> {
        let mut totals = BTreeMap::new();
        for record in &self.records {
            *totals.entry(record.snapshot_date).or_insert(Decimal::ZERO) += record.amount;
        }
        totals
    }

    /// 金額總計
    pub fn total_amount(&self) -> Decimal {
        self.records.iter().map(|r| r.amount).sum()
    }

    /// 轉為輸出工作表
    pub fn to_table(&self, name: &str) -> Table {
        let headers = ["Part Number", "Snapshot Date", "Month", "Balance", "Unit Price", "Amount"]
            .iter()
            .map(|h| h.to_string())
            .collect();

        let rows = self
            .records
            .iter()
            .map(|r| {
                vec![
                    CellValue::Text(r.part_id.clone()),
                    CellValue::Date(r.snapshot_date),
                    CellValue::Text(r.month.clone()),
                    CellValue::from(r.balance),
                    CellValue::from(r.unit_cost),
                    CellValue::from(r.amount),
                ]
            })
            .collect();

        Table::new(name, headers).with_rows(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_report() -> SummaryReport {
        SummaryReport::new(vec![
            MonthlySnapshot::new("A".into(), date(2025, 1, 27), Decimal::from(100), Decimal::from(2)).unwrap(),
            MonthlySnapshot::new("A".into(), date(2025, 2, 24), Decimal::from(50), Decimal::from(2)).unwrap(),
            MonthlySnapshot::new("B".into(), date(2025, 1, 27), Decimal::from(10), Decimal::new(15, 1)).unwrap(),
            MonthlySnapshot::new("B".into(), date(2025, 2, 24), Decimal::ZERO, Decimal::new(15, 1)).unwrap(),
        ])
    }

    #[test]
    fn test_snapshot_amount() {
        let snapshot = MonthlySnapshot::new("A".into(), date(2025, 3, 31), Decimal::from(40), Decimal::new(125, 2)).unwrap();

        assert_eq!(snapshot.month, "2025-03");
        assert_eq!(snapshot.amount, Decimal::from(50));
    }

    #[test]
    fn test_months_and_filter() {
        let report = sample_report();
        assert_eq!(report.months(), vec!["2025-01".to_string(), "2025-02".to_string()]);

        let january = report.filter_months(&["2025-01"]);
        assert_eq!(january.len(), 2);
        assert!(january.records.iter().all(|r| r.month == "2025-01"));

        let none = report.filter_months::<&str>(&[]);
        assert!(none.is_empty());
    }

    #[test]
    fn test_totals_by_snapshot_date() {
        let report = sample_report();
        let totals = report.totals_by_snapshot_date();

        assert_eq!(totals[&date(2025, 1, 27)], Decimal::from(215));
        assert_eq!(totals[&date(2025, 2, 24)], Decimal::from(100));
        assert_eq!(report.total_amount(), Decimal::from(315));
    }

    #[test]
    fn test_to_table() {
        let table = sample_report().to_table("Summary Report");

        assert_eq!(table.name, "Summary Report");
        assert_eq!(table.headers.len(), 6);
        assert_eq!(table.row_count(), 4);
        assert_eq!(table.cell(0, 1), &CellValue::Date(date(2025, 1, 27)));
        assert_eq!(table.cell(0, 5), &CellValue::Number(200.0));
    }
}
