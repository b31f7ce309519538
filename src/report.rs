//! 終端輸出：統計、預覽與月度摘要

use projection_calc::ProjectionResult;
use projection_core::SummaryReport;
use rust_decimal::Decimal;
use std::fmt::Write;

pub fn render_metrics(result: &ProjectionResult) -> String {
    let avg_wos = result.stats.average_wos.unwrap_or(Decimal::ZERO).round_dp(2);

    let mut out = String::new();
    let _ = writeln!(out, "Sheet: {}", result.sheet_name);
    let _ = writeln!(out, "Unique Parts: {}", result.stats.total_parts);
    let _ = writeln!(out, "Rows Projected: {}", result.stats.total_rows);
    let _ = writeln!(out, "Avg WOS: {avg_wos:.2}");
    if let Some(ms) = result.calculation_time_ms {
        let _ = writeln!(out, "Elapsed: {ms} ms");
    }
    out
}

/// 前 `limit` 筆處理後的列
pub fn render_preview(result: &ProjectionResult, limit: usize) -> String {
    let mut out = String::new();
    if limit == 0 {
        return out;
    }

    let _ = writeln!(
        out,
        "\n{:<20} {:<10} {:>14} {:>14} {:>14} {:>10}",
        "Part Number", "Date", "Unconfirmed", "Deductions", "Balance", "WOS"
    );
    for row in result.rows().take(limit) {
        let wos = row
            .wos_check
            .map(|w| format!("{:.2}", w.round_dp(2)))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{:<20} {:<10} {:>14} {:>14} {:>14} {:>10}",
            row.row.part_id,
            row.row.date.format("%Y-%m-%d"),
            row.unconfirmed_orders.normalize(),
            row.deductions.normalize(),
            row.calculated_balance.normalize(),
            wos
        );
    }
    if result.stats.total_rows > limit {
        let _ = writeln!(out, "... {} more rows", result.stats.total_rows - limit);
    }
    out
}

/// 可篩選的月份；標出報表中沒有的指定月份
pub fn render_months<S: AsRef<str>>(summary: &SummaryReport, requested: &[S]) -> String {
    let available = summary.months();
    let mut out = String::new();
    let _ = writeln!(out, "\nMonths: {}", available.join(", "));
    for month in requested {
        let month = month.as_ref();
        if !available.iter().any(|m| m == month) {
            let _ = writeln!(out, "Month {month} not in report");
        }
    }
    out
}

/// 各快照日期小計與總計
pub fn render_summary(summary: &SummaryReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\nMonthly Valuation");
    for (date, total) in summary.totals_by_snapshot_date() {
        let _ = writeln!(out, "Snapshot {}: ${}", date.format("%Y-%m-%d"), format_amount(total));
    }
    let _ = writeln!(out, "Grand Total: ${}", format_amount(summary.total_amount()));
    out
}

/// 兩位小數並加上千分位
fn format_amount(value: Decimal) -> String {
    let text = format!("{:.2}", value.round_dp(2));
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}{grouped}.{frac_part}")
}
