//! 集成測試

use chrono::NaiveDate;
use projection_calc::{ProjectionCalculator, ProjectionEngine};
use projection_core::*;
use proptest::prelude::*;
use rstest::rstest;
use rust_decimal::Decimal;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|h| h.to_string()).collect()
}

/// 單一物料、五週、現有庫存 100、MOQ 10、窗口 2 週
fn quarterly_plan() -> Table {
    let mut table = Table::new(
        "Q1 Plan",
        headers(&[
            "Part Number",
            "Date",
            "Onhand",
            "MOQ",
            "n",
            "SupplierHP(ConfirmedOrders)",
            "SupplierHP(UnconfirmedOrders)",
            "POR demand",
        ]),
    );

    let demand = [0.0, 0.0, 20.0, 20.0, 20.0];
    let dates = ["2025-01-06", "2025-01-13", "2025-01-20", "2025-01-27", "2025-02-03"];
    for (idx, (d, qty)) in dates.iter().zip(demand).enumerate() {
        let on_hand = if idx == 0 { 100.0 } else { 0.0 };
        table.push_row(vec![
            CellValue::from("PN-100"),
            CellValue::from(*d),
            CellValue::Number(on_hand),
            CellValue::Number(10.0),
            CellValue::Number(2.0),
            CellValue::Number(0.0),
            CellValue::Empty,
            CellValue::Number(qty),
        ]);
    }
    table
}

fn master() -> Table {
    Table::new("Master", headers(&["HPPN", "Std Cost USD"]))
        .with_rows(vec![vec![CellValue::from("PN-100"), CellValue::Number(1.5)]])
}

#[test]
fn test_end_to_end_single_part() {
    // 場景：需求 [0,0,20,20,20]
    // 第 1 週：窗口 20，基礎 100，缺口 -80 → -7 批 → -70，餘額 30
    // 第 2、3 週：窗口 40，缺口 10 → 2 批 → 20，餘額 50
    // 第 4、5 週：無完整窗口，沿用原值 0
    let workbook = Workbook::from_sheets(vec![quarterly_plan(), master()]);
    let calculator = ProjectionCalculator::new(ProjectionConfig::default());

    let result = calculator.calculate(&workbook, "Q1 Plan").unwrap();
    let rows = &result.projected["PN-100"];

    let unconfirmed: Vec<i64> = rows.iter().map(|r| r.unconfirmed_orders.try_into().unwrap()).collect();
    let balances: Vec<i64> = rows.iter().map(|r| r.calculated_balance.try_into().unwrap()).collect();
    assert_eq!(unconfirmed, vec![-70, 20, 20, 0, 0]);
    assert_eq!(balances, vec![30, 50, 50, 30, 10]);

    // 30 / 20 × 2 = 3；50 / 40 × 2 = 2.5
    assert_eq!(rows[0].wos_check, Some(Decimal::from(3)));
    assert_eq!(rows[1].wos_check, Some(Decimal::new(25, 1)));
    assert_eq!(rows[2].wos_check, Some(Decimal::new(25, 1)));
    assert_eq!(rows[3].wos_check, None);
    assert_eq!(rows[4].wos_check, None);

    assert_eq!(result.stats.total_parts, 1);
    assert_eq!(result.stats.rows_with_wos, 3);
}

#[test]
fn test_monthly_summary_with_missing_snapshot_date() {
    let workbook = Workbook::from_sheets(vec![quarterly_plan(), master()]);
    let calculator = ProjectionCalculator::new(ProjectionConfig::default());

    let summary = calculator
        .calculate(&workbook, "Q1 Plan")
        .unwrap()
        .summary
        .unwrap();

    // 1 月最後週一 1/27 有資料；2 月最後週一 2/24 沒有，餘額視為 0
    assert_eq!(summary.len(), 2);
    assert_eq!(summary.records[0].snapshot_date, date(2025, 1, 27));
    assert_eq!(summary.records[0].balance, Decimal::from(30));
    assert_eq!(summary.records[0].amount, Decimal::from(45));
    assert_eq!(summary.records[1].snapshot_date, date(2025, 2, 24));
    assert_eq!(summary.records[1].amount, Decimal::ZERO);
    assert_eq!(summary.total_amount(), Decimal::from(45));

    let february = summary.filter_months(&["2025-02"]);
    assert_eq!(february.total_amount(), Decimal::ZERO);
}

#[test]
fn test_workbook_round_trip() {
    let workbook = Workbook::from_sheets(vec![quarterly_plan(), master()]);
    let calculator = ProjectionCalculator::new(ProjectionConfig::default());
    let result = calculator.calculate(&workbook, "Q1 Plan").unwrap();

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("plan.xlsx");
    let output = projection_io::default_output_path(&input);
    assert!(output.ends_with("WOS_Audited_plan.xlsx"));

    projection_io::write_workbook(&result.workbook, &output).unwrap();
    let loaded = projection_io::read_workbook(&output).unwrap();

    assert_eq!(loaded.sheet_names(), vec!["Q1 Plan", "Master", "Summary Report"]);

    let plan = loaded.sheet("Q1 Plan").unwrap();
    let balance_col = plan.column_index("Calculated_Balance").unwrap();
    let wos_col = plan.column_index("WOS_Check").unwrap();
    let date_col = plan.column_index("Date").unwrap();
    assert_eq!(plan.row_count(), 5);
    assert_eq!(plan.cell(0, balance_col).to_decimal(), Some(Decimal::from(30)));
    assert_eq!(plan.cell(4, balance_col).to_decimal(), Some(Decimal::from(10)));
    assert!(plan.cell(4, wos_col).is_empty());
    assert_eq!(plan.cell(0, date_col).to_date(), Some(date(2025, 1, 6)));

    // 重新讀入後再次推算，結果一致
    let again = calculator.calculate(&loaded, "Q1 Plan").unwrap();
    assert_eq!(again.projected["PN-100"].len(), 5);
    assert_eq!(
        again.projected["PN-100"][2].calculated_balance,
        Decimal::from(50)
    );
}

#[rstest]
#[case::missing_part("Part Number")]
#[case::missing_date("Date")]
#[case::missing_confirmed("SupplierHP(ConfirmedOrders)")]
fn test_missing_required_column(#[case] column: &str) {
    let plan = quarterly_plan();
    let idx = plan.column_index(column).unwrap();
    let mut names = plan.headers.clone();
    names[idx] = "Renamed".to_string();
    let table = Table::new("Q1 Plan", names).with_rows(plan.rows.clone());

    let calculator = ProjectionCalculator::new(ProjectionConfig::default());
    let err = calculator
        .calculate(&Workbook::from_sheets(vec![table]), "Q1 Plan")
        .unwrap_err();

    assert!(matches!(err, ProjectionError::MissingColumn { .. }));
}

#[test]
fn test_parts_are_independent() {
    let mut table = quarterly_plan();
    let rows = table.rows.clone();
    for mut row in rows {
        row[0] = CellValue::from("PN-200");
        table.push_row(row);
    }

    let calculator = ProjectionCalculator::new(ProjectionConfig::default());
    let result = calculator
        .calculate(&Workbook::from_sheets(vec![table]), "Q1 Plan")
        .unwrap();

    assert_eq!(result.stats.total_parts, 2);
    assert_eq!(result.projected["PN-100"], result.projected["PN-200"]
        .iter()
        .map(|r| {
            let mut r = r.clone();
            r.row.part_id = "PN-100".to_string();
            r.row.source_index -= 5;
            r
        })
        .collect::<Vec<_>>());
}

fn timeline_strategy() -> impl Strategy<Value = (i64, i64, i64, Vec<(i64, i64)>)> {
    (
        0i64..500,
        1i64..50,
        1i64..6,
        prop::collection::vec((0i64..100, 0i64..30), 1..20),
    )
}

proptest! {
    #[test]
    fn prop_balance_continuity((on_hand, moq, n, weeks) in timeline_strategy()) {
        let start = date(2025, 1, 6);
        let timeline: Vec<PlanningRow> = weeks
            .iter()
            .enumerate()
            .map(|(idx, (demand, confirmed))| {
                PlanningRow::new("P".into(), start + chrono::Duration::weeks(idx as i64))
                    .with_on_hand(if idx == 0 { Decimal::from(on_hand) } else { Decimal::ZERO })
                    .with_moq(Decimal::from(moq))
                    .with_horizon(n)
                    .with_confirmed_orders(Decimal::from(*confirmed))
                    .with_quantity("POR demand", Decimal::from(*demand))
            })
            .collect();

        let engine = ProjectionEngine::new(&ProjectionConfig::default());
        let projected = engine.project_timeline(&timeline).unwrap();

        prop_assert_eq!(projected.len(), timeline.len());
        prop_assert_eq!(projected[0].start_balance, Decimal::from(on_hand));
        for pair in projected.windows(2) {
            prop_assert_eq!(pair[1].start_balance, pair[0].calculated_balance);
        }
        for (idx, p) in projected.iter().enumerate() {
            prop_assert_eq!(
                p.calculated_balance,
                p.start_balance + p.final_supply() - p.deductions
            );
            let has_window = idx + (n as usize) < timeline.len();
            prop_assert_eq!(p.wos_check.is_some(), has_window);
            if has_window {
                // 補貨量必為 MOQ 的整數倍
                prop_assert_eq!(p.unconfirmed_orders % Decimal::from(moq), Decimal::ZERO);
            }
        }
    }
}
