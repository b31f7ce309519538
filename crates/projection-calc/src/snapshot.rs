//! 月度快照摘要

use chrono::{Datelike, NaiveDate};
use projection_core::calendar;
use projection_core::{MonthlySnapshot, PriceLookup, ProjectedRow, ProjectionError, SummaryReport};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

/// 月度快照計算器
pub struct SnapshotSummarizer;

impl SnapshotSummarizer {
    /// 由資料中出現的年月推導快照日期（各月最後一個週一，依時間排序）
    ///
    /// 與實際有哪些日期的資料列無關
    pub fn snapshot_dates<I>(dates: I) -> projection_core::Result<Vec<NaiveDate>>
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let months: BTreeSet<(i32, u32)> = dates.into_iter().map(|d| (d.year(), d.month())).collect();

        months
            .into_iter()
            .map(|(year, month)| {
                calendar::last_monday_of_month(year, month).ok_or_else(|| {
                    ProjectionError::CalculationError(format!("無法計算 {year}-{month:02} 的最後一個週一"))
                })
            })
            .collect()
    }

    /// 產生月度摘要
    ///
    /// 快照日沒有完全相同日期的資料列時餘額為 0（不內插）
    pub fn summarize(
        projected: &BTreeMap<String, Vec<ProjectedRow>>,
        prices: &PriceLookup,
    ) -> projection_core::Result<SummaryReport> {
        let snapshot_dates = Self::snapshot_dates(
            projected.values().flatten().map(|p| p.row.date),
        )?;

        tracing::debug!("快照日期: {:?}", snapshot_dates);

        let mut records = Vec::with_capacity(projected.len() * snapshot_dates.len());
        for (part_id, rows) in projected {
            let unit_cost = prices.unit_cost(part_id);
            for &snapshot_date in &snapshot_dates {
                let balance = Self::balance_on(rows, snapshot_date);
                records.push(MonthlySnapshot::new(
                    part_id.clone(),
                    snapshot_date,
                    balance,
                    unit_cost,
                )?);
            }
        }

        Ok(SummaryReport::new(records))
    }

    /// 指定日期零時的推算餘額（取第一筆時間完全相同的列），無則為 0
    pub fn balance_on(rows: &[ProjectedRow], date: NaiveDate) -> Decimal {
        let at = calendar::start_of_day(date);
        rows.iter()
            .find(|p| p.row.timestamp == at)
            .map(|p| p.calculated_balance)
            .unwrap_or(Decimal::ZERO)
    }
}
