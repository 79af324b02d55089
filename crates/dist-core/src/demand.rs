//! 需求衍生的配送來源

use serde::{Deserialize, Serialize};

use crate::codes::SkuCode;
use crate::horizon::PlanMonth;

/// 需要配送路線的 (SKU, 月份)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DemandLine {
    /// SKU 代碼
    pub sku: SkuCode,

    /// 計劃月份
    pub month: PlanMonth,
}

impl DemandLine {
    /// 創建需求列
    pub fn new(sku: impl Into<SkuCode>, month: PlanMonth) -> Self {
        Self {
            sku: sku.into(),
            month,
        }
    }
}
