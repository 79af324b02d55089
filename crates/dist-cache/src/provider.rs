//! 參考資料來源

use dist_core::{DistError, ReferenceSnapshot};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// 依批次提供參考資料快照
pub trait ReferenceProvider: Send + Sync {
    fn snapshot(&self, batch_id: Uuid) -> dist_core::Result<ReferenceSnapshot>;
}

/// 記憶體內的參考資料來源
#[derive(Debug, Default)]
pub struct InMemoryReferenceProvider {
    snapshots: RwLock<HashMap<Uuid, ReferenceSnapshot>>,
}

impl InMemoryReferenceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// 設置（或替換）批次的參考資料
    pub fn insert(&self, batch_id: Uuid, snapshot: ReferenceSnapshot) -> dist_core::Result<()> {
        let mut snapshots = self
            .snapshots
            .write()
            .map_err(|e| DistError::StoreLock(e.to_string()))?;
        snapshots.insert(batch_id, snapshot);
        Ok(())
    }
}

impl ReferenceProvider for InMemoryReferenceProvider {
    fn snapshot(&self, batch_id: Uuid) -> dist_core::Result<ReferenceSnapshot> {
        let snapshots = self
            .snapshots
            .read()
            .map_err(|e| DistError::StoreLock(e.to_string()))?;
        snapshots
            .get(&batch_id)
            .cloned()
            .ok_or(DistError::BatchNotFound(batch_id))
    }
}
