//! 產能篩選：決定哪些工廠可以生產某個 SKU

use dist_core::{CapacityRow, FactoryCode, SkuCode};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

/// 產能篩選器
#[derive(Debug, Clone, Default)]
pub struct CapacityFilter {
    capacities: HashMap<SkuCode, BTreeMap<FactoryCode, Decimal>>,
}

impl CapacityFilter {
    /// 從產能表建立（重複的 (SKU, 工廠) 以最後一列為準）
    pub fn from_rows(rows: &[CapacityRow]) -> Self {
        let mut capacities: HashMap<SkuCode, BTreeMap<FactoryCode, Decimal>> = HashMap::new();
        for row in rows {
            capacities
                .entry(row.sku.clone())
                .or_default()
                .insert(row.factory.clone(), row.capacity);
        }

        tracing::debug!("產能表載入：SKU {} 個，共 {} 列", capacities.len(), rows.len());

        Self { capacities }
    }

    /// 可生產該 SKU 的工廠（產能 > 0），依代碼排序
    pub fn eligible_factories(&self, sku: &SkuCode) -> Vec<FactoryCode> {
        self.capacities
            .get(sku)
            .map(|factories| {
                factories
                    .iter()
                    .filter(|(_, capacity)| **capacity > Decimal::ZERO)
                    .map(|(factory, _)| factory.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// 查詢產能（無資料時為 0）
    pub fn capacity(&self, sku: &SkuCode, factory: &FactoryCode) -> Decimal {
        self.capacities
            .get(sku)
            .and_then(|factories| factories.get(factory))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// 是否有任何工廠可生產
    pub fn has_capacity(&self, sku: &SkuCode) -> bool {
        !self.eligible_factories(sku).is_empty()
    }
}
