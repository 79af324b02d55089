//! 分配表儲存
//!
//! 以批次 ID 為單位整批替換（先刪除再寫入），不做增量更新。

use chrono::{DateTime, Utc};
use dist_core::{DistError, FactoryCode, PlanMonth, Route, SkuCode, WarehouseCode};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// 路線的唯一鍵：(倉庫, 工廠, SKU, 月份)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub warehouse: WarehouseCode,
    pub factory: FactoryCode,
    pub sku: SkuCode,
    pub month: PlanMonth,
}

impl RouteKey {
    pub fn new(
        warehouse: impl Into<WarehouseCode>,
        factory: impl Into<FactoryCode>,
        sku: impl Into<SkuCode>,
        month: PlanMonth,
    ) -> Self {
        Self {
            warehouse: warehouse.into(),
            factory: factory.into(),
            sku: sku.into(),
            month,
        }
    }

    pub fn of(route: &Route) -> Self {
        Self {
            warehouse: route.warehouse.clone(),
            factory: route.factory.clone(),
            sku: route.sku.clone(),
            month: route.month,
        }
    }

    fn matches(&self, route: &Route) -> bool {
        self.warehouse == route.warehouse
            && self.factory == route.factory
            && self.sku == route.sku
            && self.month == route.month
    }
}

/// 分配表儲存介面
pub trait RouteStore: Send + Sync {
    /// 整批替換：刪除該批次所有路線後寫入新路線，回傳寫入筆數
    fn replace_batch(&self, batch_id: Uuid, routes: Vec<Route>) -> dist_core::Result<usize>;

    /// 讀取批次的所有路線
    fn routes(&self, batch_id: Uuid) -> dist_core::Result<Vec<Route>>;

    /// 刪除批次，回傳是否存在
    fn delete_batch(&self, batch_id: Uuid) -> dist_core::Result<bool>;

    /// 設置單一路線的數量（衍生欄位隨之更新），回傳是否找到路線
    fn update_quantity(
        &self,
        batch_id: Uuid,
        key: &RouteKey,
        quantity: Decimal,
    ) -> dist_core::Result<bool>;

    /// 所有批次 ID
    fn batch_ids(&self) -> dist_core::Result<Vec<Uuid>>;
}

#[derive(Debug, Clone)]
struct StoredBatch {
    routes: Vec<Route>,
    written_at: DateTime<Utc>,
}

/// 記憶體內的分配表儲存
#[derive(Debug, Default)]
pub struct InMemoryRouteStore {
    batches: RwLock<HashMap<Uuid, StoredBatch>>,
}

impl InMemoryRouteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 批次最後寫入時間
    pub fn written_at(&self, batch_id: Uuid) -> dist_core::Result<Option<DateTime<Utc>>> {
        let batches = self
            .batches
            .read()
            .map_err(|e| DistError::StoreLock(e.to_string()))?;
        Ok(batches.get(&batch_id).map(|batch| batch.written_at))
    }
}

impl RouteStore for InMemoryRouteStore {
    fn replace_batch(&self, batch_id: Uuid, routes: Vec<Route>) -> dist_core::Result<usize> {
        let mut batches = self
            .batches
            .write()
            .map_err(|e| DistError::StoreLock(e.to_string()))?;

        let count = routes.len();
        if batches.remove(&batch_id).is_some() {
            tracing::debug!("批次 {} 的舊路線已刪除", batch_id);
        }
        batches.insert(
            batch_id,
            StoredBatch {
                routes,
                written_at: Utc::now(),
            },
        );

        tracing::debug!("批次 {} 寫入 {} 筆路線", batch_id, count);
        Ok(count)
    }

    fn routes(&self, batch_id: Uuid) -> dist_core::Result<Vec<Route>> {
        let batches = self
            .batches
            .read()
            .map_err(|e| DistError::StoreLock(e.to_string()))?;

        batches
            .get(&batch_id)
            .map(|batch| batch.routes.clone())
            .ok_or(DistError::BatchNotFound(batch_id))
    }

    fn delete_batch(&self, batch_id: Uuid) -> dist_core::Result<bool> {
        let mut batches = self
            .batches
            .write()
            .map_err(|e| DistError::StoreLock(e.to_string()))?;
        Ok(batches.remove(&batch_id).is_some())
    }

    fn update_quantity(
        &self,
        batch_id: Uuid,
        key: &RouteKey,
        quantity: Decimal,
    ) -> dist_core::Result<bool> {
        let mut batches = self
            .batches
            .write()
            .map_err(|e| DistError::StoreLock(e.to_string()))?;

        let batch = batches
            .get_mut(&batch_id)
            .ok_or(DistError::BatchNotFound(batch_id))?;

        match batch.routes.iter_mut().find(|route| key.matches(route)) {
            Some(route) => {
                route.set_quantity(quantity);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn batch_ids(&self) -> dist_core::Result<Vec<Uuid>> {
        let batches = self
            .batches
            .read()
            .map_err(|e| DistError::StoreLock(e.to_string()))?;

        let mut ids: Vec<Uuid> = batches.keys().copied().collect();
        ids.sort();
        Ok(ids)
    }
}
