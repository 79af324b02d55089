//! 原始運費資料

use serde::{Deserialize, Serialize};

/// 原始運費記錄（外部參考工作簿的一列，欄位可能為空或為缺值字串）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawFreightRecord {
    /// SKU 代碼
    pub sku_code: Option<String>,

    /// 起運工廠
    pub origin_factory: Option<String>,

    /// 目的國（名稱或代碼）
    pub destination_country: Option<String>,

    /// 整車裝載數量
    pub truck_load_units: Option<String>,

    /// 整車運費
    pub truck_freight_amount: Option<String>,
}

impl RawFreightRecord {
    /// 創建運費記錄
    pub fn new(
        sku_code: impl Into<String>,
        origin_factory: impl Into<String>,
        destination_country: impl Into<String>,
        truck_load_units: impl Into<String>,
        truck_freight_amount: impl Into<String>,
    ) -> Self {
        Self {
            sku_code: Some(sku_code.into()),
            origin_factory: Some(origin_factory.into()),
            destination_country: Some(destination_country.into()),
            truck_load_units: Some(truck_load_units.into()),
            truck_freight_amount: Some(truck_freight_amount.into()),
        }
    }
}
