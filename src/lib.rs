//! # distplan
//!
//! 配送分配表產生引擎：將各層 crate 匯整為單一入口
//!
//! - [`domain`]：代碼、配置、參考資料與路線模型
//! - [`calc`]：運費索引、成本解析、關稅、產能與出口限制、分配表產生器
//! - [`cache`]：批次儲存、參考資料來源與批次服務

pub mod logging;

pub use dist_cache as cache;
pub use dist_calc as calc;
pub use dist_core as domain;

pub use dist_cache::{
    BatchSummary, DistributionService, InMemoryReferenceProvider, InMemoryRouteStore,
    ReferenceProvider, RouteKey, RouteStore,
};
pub use dist_calc::{DistributionTableGenerator, GenerationReport, RecomputeReport};
pub use dist_core::{DistError, DistributionConfig, ReferenceSnapshot, Result, Route};
