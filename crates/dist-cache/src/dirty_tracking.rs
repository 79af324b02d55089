//! 髒標記追蹤（參考資料已變更、需要重算的批次）

use std::collections::BTreeSet;
use uuid::Uuid;

/// 髒標記追蹤器
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    dirty_batches: BTreeSet<Uuid>,
}

impl DirtyTracker {
    /// 創建新的追蹤器
    pub fn new() -> Self {
        Self::default()
    }

    /// 標記批次為髒
    pub fn mark_dirty(&mut self, batch_id: Uuid) {
        self.dirty_batches.insert(batch_id);
    }

    /// 檢查批次是否為髒
    pub fn is_dirty(&self, batch_id: &Uuid) -> bool {
        self.dirty_batches.contains(batch_id)
    }

    /// 清除單一批次的髒標記
    pub fn clear_batch(&mut self, batch_id: &Uuid) -> bool {
        self.dirty_batches.remove(batch_id)
    }

    /// 清除所有髒標記
    pub fn clear(&mut self) {
        self.dirty_batches.clear();
    }

    /// 獲取所有髒批次（排序後）
    pub fn get_dirty_batches(&self) -> Vec<Uuid> {
        self.dirty_batches.iter().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.dirty_batches.is_empty()
    }
}
