//! 批次參考資料快照

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::codes::{CountryCode, FactoryCode, SkuCode};
use crate::demand::DemandLine;
use crate::freight::RawFreightRecord;
use crate::horizon::MonthSelector;

/// (SKU, 工廠) → 數值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuFactoryValue {
    pub sku: SkuCode,
    pub factory: FactoryCode,
    pub value: Decimal,
}

impl SkuFactoryValue {
    pub fn new(sku: impl Into<SkuCode>, factory: impl Into<FactoryCode>, value: Decimal) -> Self {
        Self {
            sku: sku.into(),
            factory: factory.into(),
            value,
        }
    }
}

/// 關稅參考資料
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomsReference {
    /// 平均原料價格
    pub rm_prices: Vec<SkuFactoryValue>,

    /// 工廠間接費用（USD）
    pub overheads: Vec<SkuFactoryValue>,

    /// 全域加成比例（0.1 = 10%）
    pub markup_pct: Option<Decimal>,

    /// 全域關稅比例（0.05 = 5%）
    pub duty_pct: Option<Decimal>,
}

/// 產能表的一列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityRow {
    pub sku: SkuCode,
    pub factory: FactoryCode,
    pub capacity: Decimal,
}

impl CapacityRow {
    pub fn new(sku: impl Into<SkuCode>, factory: impl Into<FactoryCode>, capacity: Decimal) -> Self {
        Self {
            sku: sku.into(),
            factory: factory.into(),
            capacity,
        }
    }
}

/// SKU 選擇器（「All」表示所有 SKU）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SkuSelector {
    All,
    Sku(SkuCode),
}

impl From<String> for SkuSelector {
    fn from(value: String) -> Self {
        if value.trim().eq_ignore_ascii_case("all") {
            SkuSelector::All
        } else {
            SkuSelector::Sku(SkuCode::new(value))
        }
    }
}

impl From<SkuSelector> for String {
    fn from(selector: SkuSelector) -> Self {
        match selector {
            SkuSelector::All => "All".to_string(),
            SkuSelector::Sku(sku) => sku.into(),
        }
    }
}

/// 出口限制表的一列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestrictionRow {
    pub sku: SkuSelector,
    pub origin_factory: FactoryCode,
    /// 目的地（名稱或代碼，載入時正規化）
    pub destination: String,
    pub month: MonthSelector,
}

impl RestrictionRow {
    pub fn new(
        sku: impl Into<String>,
        origin_factory: impl Into<FactoryCode>,
        destination: impl Into<String>,
        month: MonthSelector,
    ) -> Self {
        Self {
            sku: SkuSelector::from(sku.into()),
            origin_factory: origin_factory.into(),
            destination: destination.into(),
            month,
        }
    }
}

/// 一個上傳批次所需的全部參考資料
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceSnapshot {
    /// 原始運費記錄
    pub freight: Vec<RawFreightRecord>,

    /// 關稅參考
    pub customs: CustomsReference,

    /// 產能表
    pub capacity: Vec<CapacityRow>,

    /// 出口限制表
    pub restrictions: Vec<RestrictionRow>,

    /// 需求衍生的 (SKU, 月份)
    pub demand: Vec<DemandLine>,

    /// 單位重量
    pub unit_weights: BTreeMap<SkuCode, Decimal>,

    /// 目的國 → 預設起運工廠
    pub origin_hints: BTreeMap<CountryCode, FactoryCode>,
}

impl ReferenceSnapshot {
    /// 創建空的快照
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：設置運費記錄
    pub fn with_freight(mut self, freight: Vec<RawFreightRecord>) -> Self {
        self.freight = freight;
        self
    }

    /// 建構器模式：設置關稅參考
    pub fn with_customs(mut self, customs: CustomsReference) -> Self {
        self.customs = customs;
        self
    }

    /// 建構器模式：設置產能表
    pub fn with_capacity(mut self, capacity: Vec<CapacityRow>) -> Self {
        self.capacity = capacity;
        self
    }

    /// 建構器模式：設置出口限制
    pub fn with_restrictions(mut self, restrictions: Vec<RestrictionRow>) -> Self {
        self.restrictions = restrictions;
        self
    }

    /// 建構器模式：設置需求
    pub fn with_demand(mut self, demand: Vec<DemandLine>) -> Self {
        self.demand = demand;
        self
    }

    /// 建構器模式：設置單位重量
    pub fn with_unit_weight(mut self, sku: impl Into<SkuCode>, weight: Decimal) -> Self {
        self.unit_weights.insert(sku.into(), weight);
        self
    }

    /// 建構器模式：設置預設起運工廠
    pub fn with_origin_hint(
        mut self,
        country: impl Into<CountryCode>,
        factory: impl Into<FactoryCode>,
    ) -> Self {
        self.origin_hints.insert(country.into(), factory.into());
        self
    }
}
