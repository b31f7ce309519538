//! 庫存推算主計算器

use projection_core::{
    CellValue, PriceLookup, ProjectionConfig, Table, Workbook,
};
use rayon::prelude::*;

use crate::projection::ProjectionEngine;
use crate::snapshot::SnapshotSummarizer;
use crate::timeline::{TimelineBuilder, Timelines};
use crate::{ProjectedTimelines, ProjectionResult, ProjectionStats, ProjectionWarning};

/// 庫存推算計算器
pub struct ProjectionCalculator {
    config: ProjectionConfig,
}

impl ProjectionCalculator {
    /// 創建新的計算器
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    /// 主計算入口
    ///
    /// 輸入活頁簿不會被修改；任何解析或計算錯誤都會中止整次計算。
    pub fn calculate(&self, workbook: &Workbook, sheet_name: &str) -> projection_core::Result<ProjectionResult> {
        let start_time = std::time::Instant::now();
        let table = workbook.require_sheet(sheet_name)?;

        tracing::info!("開始庫存推算：工作表 {}，資料列 {} 筆", sheet_name, table.row_count());

        // Step 1: 建立物料時間序列
        tracing::debug!("Step 1: 建立物料時間序列");
        let built = TimelineBuilder::new(&self.config).build(table)?;
        let mut warnings = built.warnings;

        // Step 2: 逐物料推算餘額
        tracing::debug!("Step 2: 逐物料推算餘額");
        let projected = self.project(&built.timelines)?;

        // Step 3: 月度快照
        tracing::debug!("Step 3: 月度快照");
        let summary = match self.load_prices(workbook, &mut warnings)? {
            Some(prices) => Some(SnapshotSummarizer::summarize(&projected, &prices)?),
            None => None,
        };

        // Step 4: 組裝輸出活頁簿
        tracing::debug!("Step 4: 組裝輸出活頁簿");
        let mut output = workbook.clone();
        output.upsert_sheet(self.augment_sheet(table, &projected));
        if let Some(report) = &summary {
            output.upsert_sheet(report.to_table(&self.config.summary_sheet));
        }

        let stats = ProjectionStats::from_projected(&projected);

        tracing::info!("庫存推算完成，耗時 {:?}", start_time.elapsed());
        tracing::info!(
            "物料數量: {}，推算列數: {}，摘要筆數: {}",
            stats.total_parts,
            stats.total_rows,
            summary.as_ref().map(|s| s.len()).unwrap_or(0)
        );

        Ok(ProjectionResult {
            workbook: output,
            sheet_name: sheet_name.to_string(),
            projected,
            summary,
            stats,
            warnings,
            calculation_time_ms: Some(start_time.elapsed().as_millis()),
        })
    }

    /// 推算所有物料序列（物料間平行，序列內依序）
    pub fn project(&self, timelines: &Timelines) -> projection_core::Result<ProjectedTimelines> {
        let engine = ProjectionEngine::new(&self.config);

        let results: Vec<_> = timelines
            .par_iter()
            .map(|(part_id, rows)| {
                tracing::debug!("推算物料: {} ({} 列)", part_id, rows.len());
                engine
                    .project_timeline(rows)
                    .map(|projected| (part_id.clone(), projected))
            })
            .collect::<projection_core::Result<_>>()?;

        Ok(results.into_iter().collect())
    }

    /// 載入單價參考表；工作表或單價欄位不存在時略過摘要
    fn load_prices(
        &self,
        workbook: &Workbook,
        warnings: &mut Vec<ProjectionWarning>,
    ) -> projection_core::Result<Option<PriceLookup>> {
        let master_name = &self.config.master_sheet;
        let Some(master) = workbook.sheet(master_name) else {
            tracing::info!("找不到單價參考表 {}，略過月度摘要", master_name);
            warnings.push(ProjectionWarning::info(
                master_name.clone(),
                "找不到單價參考表，略過月度摘要".to_string(),
            ));
            return Ok(None);
        };

        let prices = PriceLookup::from_master_sheet(master, &self.config)?;
        match &prices {
            Some(lookup) => tracing::debug!(
                "單價欄位 {}，物料 {} 筆",
                lookup.price_column(),
                lookup.len()
            ),
            None => {
                tracing::warn!(
                    "單價參考表 {} 沒有包含 {} 的欄位，略過月度摘要",
                    master_name,
                    self.config.price_column_marker
                );
                warnings.push(ProjectionWarning::warning(
                    master_name.clone(),
                    format!("沒有包含 {} 的單價欄位，略過月度摘要", self.config.price_column_marker),
                ));
            }
        }

        Ok(prices)
    }

    /// 產生處理後的工作表：保留原欄位，寫入推算欄位，依物料與日期排序
    fn augment_sheet(&self, table: &Table, projected: &ProjectedTimelines) -> Table {
        let mut headers = table.headers.clone();
        let mut column_for = |name: &str| match headers.iter().position(|h| h.trim() == name) {
            Some(idx) => idx,
            None => {
                headers.push(name.to_string());
                headers.len() - 1
            }
        };

        let date_col = column_for(&self.config.date_column);
        let unconfirmed_col = column_for(&self.config.unconfirmed_column);
        let balance_col = column_for(&self.config.balance_column);
        let wos_col = column_for(&self.config.wos_column);

        let width = headers.len();
        let rows = projected
            .values()
            .flatten()
            .map(|p| {
                let mut cells = table.rows.get(p.row.source_index).cloned().unwrap_or_default();
                cells.resize(width, CellValue::Empty);
                cells[date_col] = CellValue::from_datetime(p.row.timestamp);
                cells[unconfirmed_col] = CellValue::from(p.unconfirmed_orders);
                cells[balance_col] = CellValue::from(p.calculated_balance);
                cells[wos_col] = p.wos_check.map(CellValue::from).unwrap_or(CellValue::Empty);
                cells
            })
            .collect();

        Table::new(table.name.clone(), headers).with_rows(rows)
    }

    /// 獲取配置引用
    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }
}
