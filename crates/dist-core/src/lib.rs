//! # Distribution Core
//!
//! 配送規劃的核心資料模型與類型定義

pub mod codes;
pub mod config;
pub mod demand;
pub mod freight;
pub mod horizon;
pub mod normalize;
pub mod reference;
pub mod route;

// Re-export 主要類型
pub use codes::{CostKey, CountryCode, FactoryCode, LaneKey, SkuCode, WarehouseCode};
pub use config::{BlockedTransfer, DistributionConfig, HorizonConfig, WarehouseSite};
pub use demand::DemandLine;
pub use freight::RawFreightRecord;
pub use horizon::{MonthSelector, PlanMonth, PlanningHorizon};
pub use normalize::CodeNormalizer;
pub use reference::{
    CapacityRow, CustomsReference, ReferenceSnapshot, RestrictionRow, SkuFactoryValue, SkuSelector,
};
pub use route::{CostSource, Route};

/// 配送規劃錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum DistError {
    #[error("找不到批次: {0}")]
    BatchNotFound(uuid::Uuid),

    #[error("無效的配置: {0}")]
    InvalidConfig(String),

    #[error("無法讀取配置檔: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("配置解析錯誤: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("無效的月份: {0}")]
    InvalidMonth(String),

    #[error("儲存鎖定失敗: {0}")]
    StoreLock(String),

    #[error("其他錯誤: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, DistError>;
