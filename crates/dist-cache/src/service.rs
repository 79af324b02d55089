//! 批次服務：產生與重算分配表
//!
//! 每次產生都以批次 ID 為單位整批替換，相同輸入下重複執行結果一致。

use dist_calc::{DistributionTableGenerator, GenerationReport, RecomputeReport};
use dist_core::{DistributionConfig, Route};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use uuid::Uuid;

use crate::dirty_tracking::DirtyTracker;
use crate::provider::ReferenceProvider;
use crate::store::{RouteKey, RouteStore};

/// 批次處理摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub batch_id: Uuid,
    pub route_count: usize,
    pub skipped_sku_months: usize,
    pub restricted_routes: usize,
    pub blocked_routes: usize,
    pub out_of_bounds: usize,
    pub warnings: usize,
}

impl BatchSummary {
    fn from_generation(batch_id: Uuid, report: &GenerationReport) -> Self {
        Self {
            batch_id,
            route_count: report.routes.len(),
            skipped_sku_months: report.skipped_sku_months,
            restricted_routes: report.restricted_routes,
            blocked_routes: report.blocked_routes,
            out_of_bounds: report
                .routes
                .iter()
                .filter(|r| !r.is_within_bounds())
                .count(),
            warnings: report.warnings.len(),
        }
    }

    fn from_recompute(batch_id: Uuid, report: &RecomputeReport) -> Self {
        Self {
            batch_id,
            route_count: report.routes,
            skipped_sku_months: 0,
            restricted_routes: report.restricted_routes,
            blocked_routes: report.blocked_routes,
            out_of_bounds: report.out_of_bounds,
            warnings: report.warnings.len(),
        }
    }
}

/// 配送分配表服務
pub struct DistributionService<S: RouteStore, P: ReferenceProvider> {
    config: DistributionConfig,
    store: S,
    provider: P,
    dirty: Mutex<DirtyTracker>,
}

impl<S: RouteStore, P: ReferenceProvider> DistributionService<S, P> {
    /// 創建服務（配置無效時回傳錯誤）
    pub fn new(config: DistributionConfig, store: S, provider: P) -> dist_core::Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            store,
            provider,
            dirty: Mutex::new(DirtyTracker::new()),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &DistributionConfig {
        &self.config
    }

    /// 產生批次的分配表
    ///
    /// 先刪除該批次所有路線，再以完整產生的結果寫入；中途失敗不會留下部分資料
    pub fn generate(&self, batch_id: Uuid) -> dist_core::Result<BatchSummary> {
        tracing::info!("批次 {} 開始產生分配表", batch_id);

        if self.store.delete_batch(batch_id)? {
            tracing::debug!("批次 {} 既有路線已刪除", batch_id);
        }

        let snapshot = self.provider.snapshot(batch_id)?;
        let generator = DistributionTableGenerator::new(&self.config, &snapshot);
        let report = generator.generate();

        let summary = BatchSummary::from_generation(batch_id, &report);
        self.store.replace_batch(batch_id, report.routes)?;
        self.clear_dirty(batch_id)?;

        tracing::info!(
            "批次 {} 產生完成：路線 {} 筆，警告 {} 筆",
            batch_id,
            summary.route_count,
            summary.warnings
        );
        Ok(summary)
    }

    /// 以目前的參考資料重算既有路線的運費、關稅與邊界（不重新展開）
    pub fn recompute(&self, batch_id: Uuid) -> dist_core::Result<BatchSummary> {
        tracing::info!("批次 {} 開始重算", batch_id);

        let mut routes = self.store.routes(batch_id)?;
        let snapshot = self.provider.snapshot(batch_id)?;
        let generator = DistributionTableGenerator::new(&self.config, &snapshot);
        let report = generator.recompute(&mut routes);

        let summary = BatchSummary::from_recompute(batch_id, &report);
        self.store.replace_batch(batch_id, routes)?;
        self.clear_dirty(batch_id)?;

        Ok(summary)
    }

    /// 標記批次的參考資料已變更
    pub fn mark_dirty(&self, batch_id: Uuid) -> dist_core::Result<()> {
        self.dirty
            .lock()
            .map_err(|e| dist_core::DistError::StoreLock(e.to_string()))?
            .mark_dirty(batch_id);
        Ok(())
    }

    /// 重算所有被標記的批次
    pub fn recompute_dirty(&self) -> dist_core::Result<Vec<BatchSummary>> {
        let batches = self
            .dirty
            .lock()
            .map_err(|e| dist_core::DistError::StoreLock(e.to_string()))?
            .get_dirty_batches();

        tracing::info!("重算 {} 個髒批次", batches.len());

        batches
            .into_iter()
            .map(|batch_id| self.recompute(batch_id))
            .collect()
    }

    /// 由外部規劃設置路線數量
    pub fn update_quantity(
        &self,
        batch_id: Uuid,
        key: &RouteKey,
        quantity: Decimal,
    ) -> dist_core::Result<bool> {
        self.store.update_quantity(batch_id, key, quantity)
    }

    /// 讀取批次路線
    pub fn routes(&self, batch_id: Uuid) -> dist_core::Result<Vec<Route>> {
        self.store.routes(batch_id)
    }

    fn clear_dirty(&self, batch_id: Uuid) -> dist_core::Result<()> {
        self.dirty
            .lock()
            .map_err(|e| dist_core::DistError::StoreLock(e.to_string()))?
            .clear_batch(&batch_id);
        Ok(())
    }
}
