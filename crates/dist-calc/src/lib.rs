//! # Distribution Calculation Engine
//!
//! 運費與關稅解析引擎，以及配送分配表產生器

pub mod capacity;
pub mod cost_resolver;
pub mod customs;
pub mod freight_index;
pub mod generator;
pub mod restriction;

// Re-export 主要類型
pub use capacity::CapacityFilter;
pub use cost_resolver::{CostQuery, CostResolver, CostRule, Resolution, DEFAULT_RULES};
pub use customs::{CustomsDutyCalculator, DutyBreakdown, DutyGate};
pub use freight_index::{FreightRateIndex, LoadStats};
pub use generator::DistributionTableGenerator;
pub use restriction::ExportRestrictionIndex;

use dist_core::Route;

/// 分配表產生結果
#[derive(Debug, Clone)]
pub struct GenerationReport {
    /// 產生的路線（依 SKU、月份、倉庫、工廠排序）
    pub routes: Vec<Route>,

    /// 沒有可用工廠、只產生未指派路線的 (SKU, 月份) 數
    pub skipped_sku_months: usize,

    /// 被出口限制封鎖的路線數
    pub restricted_routes: usize,

    /// 結構上不允許調撥的路線數
    pub blocked_routes: usize,

    /// 警告信息
    pub warnings: Vec<GenerationWarning>,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

impl GenerationReport {
    /// 創建空的結果
    pub fn empty() -> Self {
        Self {
            routes: Vec::new(),
            skipped_sku_months: 0,
            restricted_routes: 0,
            blocked_routes: 0,
            warnings: Vec::new(),
            calculation_time_ms: None,
        }
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: GenerationWarning) {
        self.warnings.push(warning);
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }
}

/// 重算結果
#[derive(Debug, Clone, Default)]
pub struct RecomputeReport {
    /// 重算的路線數
    pub routes: usize,

    /// 被出口限制封鎖的路線數
    pub restricted_routes: usize,

    /// 結構上不允許調撥的路線數
    pub blocked_routes: usize,

    /// 數量超出邊界的路線數
    pub out_of_bounds: usize,

    /// 警告信息
    pub warnings: Vec<GenerationWarning>,
}

/// 產生過程的警告
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationWarning {
    pub sku: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl GenerationWarning {
    pub fn new(sku: String, message: String, severity: WarningSeverity) -> Self {
        Self {
            sku,
            message,
            severity,
        }
    }

    pub fn info(sku: String, message: String) -> Self {
        Self::new(sku, message, WarningSeverity::Info)
    }

    pub fn warning(sku: String, message: String) -> Self {
        Self::new(sku, message, WarningSeverity::Warning)
    }

    pub fn error(sku: String, message: String) -> Self {
        Self::new(sku, message, WarningSeverity::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Info,
    Warning,
    Error,
}
