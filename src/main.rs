//! 季度庫存推算命令列工具
//!
//! 讀取 Excel 活頁簿，推算指定工作表的庫存餘額與補貨建議，
//! 輸出加上推算欄位與月度摘要的活頁簿。

mod report;

use anyhow::{Context, Result};
use clap::Parser;
use projection_calc::ProjectionCalculator;
use projection_core::ProjectionConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "wos-projection")]
#[command(about = "Quarterly inventory projection: unconfirmed orders, WOS and monthly valuation")]
#[command(version)]
struct Args {
    /// Input workbook (.xlsx)
    input: PathBuf,

    /// Sheet to process (default: first sheet)
    #[arg(short, long)]
    sheet: Option<String>,

    /// Output workbook (default: WOS_Audited_<input name> next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON configuration overriding column names and defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Restrict the monthly summary to these months (YYYY-MM, repeatable)
    #[arg(short, long = "month")]
    months: Vec<String>,

    /// Number of processed rows to preview
    #[arg(long, default_value_t = 100)]
    preview: usize,

    /// Clamp negative unconfirmed orders to zero
    #[arg(long)]
    clamp_negative: bool,

    /// Do not write the output workbook
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<ProjectionConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("無法讀取配置檔 {}", path.display()))?;
            ProjectionConfig::from_json(&json)?
        }
        None => ProjectionConfig::default(),
    };

    if args.clamp_negative {
        config = config.with_clamp_negative_orders(true);
    }
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = load_config(&args)?;

    let workbook = projection_io::read_workbook(&args.input)
        .with_context(|| format!("無法讀取活頁簿 {}", args.input.display()))?;

    let sheet_name = match &args.sheet {
        Some(name) => name.clone(),
        None => workbook
            .sheet_names()
            .first()
            .map(|name| name.to_string())
            .context("活頁簿沒有任何工作表")?,
    };

    let calculator = ProjectionCalculator::new(config);
    let result = calculator
        .calculate(&workbook, &sheet_name)
        .context("Logic Error")?;

    for warning in &result.warnings {
        tracing::warn!("[{}] {}", warning.subject, warning.message);
    }

    print!("{}", report::render_metrics(&result));
    print!("{}", report::render_preview(&result, args.preview));

    match &result.summary {
        Some(summary) => {
            print!("{}", report::render_months(summary, args.months.as_slice()));
            let filtered = if args.months.is_empty() {
                summary.clone()
            } else {
                summary.filter_months(args.months.as_slice())
            };
            print!("{}", report::render_summary(&filtered));
        }
        None => println!("\n{} sheet not found.", calculator.config().master_sheet),
    }

    if args.dry_run {
        return Ok(());
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| projection_io::default_output_path(&args.input));
    projection_io::write_workbook(&result.workbook, &output)
        .with_context(|| format!("無法寫入活頁簿 {}", output.display()))?;
    println!("\nSaved {}", output.display());

    Ok(())
}
