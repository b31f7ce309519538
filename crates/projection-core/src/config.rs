//! 推算配置模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 需求欄位登錄表
///
/// - `deductions`: 每期扣減的需求欄位
/// - `forward`: 用於計算未來窗口需求的欄位
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRegistry {
    pub deductions: Vec<String>,
    pub forward: Vec<String>,
}

impl ColumnRegistry {
    pub fn new(deductions: Vec<String>, forward: Vec<String>) -> Self {
        Self {
            deductions,
            forward,
        }
    }

    /// 所有登錄欄位（去重，保持順序）
    pub fn all_columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = Vec::new();
        for name in self.deductions.iter().chain(self.forward.iter()) {
            if !columns.contains(&name.as_str()) {
                columns.push(name);
            }
        }
        columns
    }
}

impl Default for ColumnRegistry {
    fn default() -> Self {
        let to_owned = |names: &[&str]| -> Vec<String> { names.iter().map(|s| s.to_string()).collect() };
        Self {
            deductions: to_owned(&[
                "POR demand",
                "PO vs POR adustment",
                "Backlog",
                "Build and Hold",
                "Pre-build",
                "Test Req't",
                "Strategic Buffer",
                "DCR",
                "Others (PP,NPI build, etc)",
            ]),
            forward: to_owned(&[
                "POR demand",
                "PO vs POR adustment",
                "Backlog",
                "Build and Hold",
                "Pre-build",
                "Test Req't",
            ]),
        }
    }
}

/// 庫存推算配置
///
/// 預設值與來源試算表的欄位命名一致，可由 JSON 檔部分覆寫
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// 物料編號欄位
    pub part_column: String,

    /// 日期欄位
    pub date_column: String,

    /// 現有庫存欄位（僅首列有意義）
    pub on_hand_column: String,

    /// 最小訂購量欄位
    pub moq_column: String,

    /// 計劃時界（期數）欄位
    pub horizon_column: String,

    /// 已確認訂單欄位
    pub confirmed_column: String,

    /// 未確認訂單欄位（輸出）
    pub unconfirmed_column: String,

    /// 推算餘額欄位（輸出）
    pub balance_column: String,

    /// 週供應覆蓋欄位（輸出）
    pub wos_column: String,

    /// 需求欄位登錄表
    pub registry: ColumnRegistry,

    /// 缺少時界欄位時的預設期數
    pub default_horizon: i64,

    /// 缺少 MOQ 欄位時的預設值
    pub default_moq: Decimal,

    /// 未來需求為 0 時的覆蓋值
    pub wos_sentinel: Decimal,

    /// 單價參考工作表
    pub master_sheet: String,

    /// 單價參考表的物料鍵欄位
    pub price_key_column: String,

    /// 單價欄位名稱需包含的字串（取第一個符合者）
    pub price_column_marker: String,

    /// 月度摘要工作表名稱
    pub summary_sheet: String,

    /// 是否將負的未確認訂單截為 0
    /// - false: 保留負值（預設，作為庫存消化訊號）
    /// - true: 負值一律視為 0
    pub clamp_negative_orders: bool,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            part_column: "Part Number".to_string(),
            date_column: "Date".to_string(),
            on_hand_column: "Onhand".to_string(),
            moq_column: "MOQ".to_string(),
            horizon_column: "n".to_string(),
            confirmed_column: "SupplierHP(ConfirmedOrders)".to_string(),
            unconfirmed_column: "SupplierHP(UnconfirmedOrders)".to_string(),
            balance_column: "Calculated_Balance".to_string(),
            wos_column: "WOS_Check".to_string(),
            registry: ColumnRegistry::default(),
            default_horizon: 5,
            default_moq: Decimal::ONE,
            wos_sentinel: Decimal::from(999),
            master_sheet: "Master".to_string(),
            price_key_column: "HPPN".to_string(),
            price_column_marker: "Cost".to_string(),
            summary_sheet: "Summary Report".to_string(),
            clamp_negative_orders: false,
        }
    }
}

impl ProjectionConfig {
    /// 創建預設配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 從 JSON 字串載入（未指定的欄位使用預設值）
    pub fn from_json(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json).map_err(|e| crate::ProjectionError::ConfigError(e.to_string()))
    }

    /// 建構器模式：設置需求欄位登錄表
    pub fn with_registry(mut self, registry: ColumnRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// 建構器模式：設置預設時界
    pub fn with_default_horizon(mut self, horizon: i64) -> Self {
        self.default_horizon = horizon;
        self
    }

    /// 建構器模式：設置單價參考工作表
    pub fn with_master_sheet(mut self, name: impl Into<String>) -> Self {
        self.master_sheet = name.into();
        self
    }

    /// 建構器模式：設置摘要工作表名稱
    pub fn with_summary_sheet(mut self, name: impl Into<String>) -> Self {
        self.summary_sheet = name.into();
        self
    }

    /// 建構器模式：設置是否截斷負訂單
    pub fn with_clamp_negative_orders(mut self, clamp: bool) -> Self {
        self.clamp_negative_orders = clamp;
        self
    }

    /// 推算時必須存在的欄位
    pub fn required_columns(&self) -> [&str; 3] {
        [
            self.part_column.as_str(),
            self.date_column.as_str(),
            self.confirmed_column.as_str(),
        ]
    }
}
