//! # Distribution Cache
//!
//! 分配表儲存、批次重算追蹤與批次服務入口

pub mod dirty_tracking;
pub mod provider;
pub mod service;
pub mod store;

// Re-export 主要類型
pub use dirty_tracking::DirtyTracker;
pub use provider::{InMemoryReferenceProvider, ReferenceProvider};
pub use service::{BatchSummary, DistributionService};
pub use store::{InMemoryRouteStore, RouteKey, RouteStore};
