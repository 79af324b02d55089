//! 出口限制索引
//!
//! 限制只影響路線資格（maxQty 歸零），不改變運費或關稅。

use dist_core::{
    CodeNormalizer, CountryCode, FactoryCode, PlanMonth, PlanningHorizon, RestrictionRow, SkuCode,
    SkuSelector, WarehouseCode,
};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RestrictionKey {
    sku: SkuSelector,
    origin: WarehouseCode,
    country: CountryCode,
    month: PlanMonth,
}

/// 出口限制索引
#[derive(Debug, Clone)]
pub struct ExportRestrictionIndex {
    blocked: HashSet<RestrictionKey>,
    normalizer: CodeNormalizer,
}

impl ExportRestrictionIndex {
    /// 建立索引；月份為「All」的限制在此展開到整個計劃時界
    pub fn build(
        rows: &[RestrictionRow],
        horizon: &PlanningHorizon,
        normalizer: &CodeNormalizer,
    ) -> Self {
        let mut blocked = HashSet::new();

        for row in rows {
            let origin = normalizer.origin_warehouse(row.origin_factory.as_str());
            let country = normalizer.country(&row.destination);

            for month in horizon.expand(row.month) {
                if !horizon.contains(month) {
                    tracing::debug!("出口限制月份 {} 不在計劃時界內", month);
                }
                blocked.insert(RestrictionKey {
                    sku: row.sku.clone(),
                    origin: origin.clone(),
                    country: country.clone(),
                    month,
                });
            }
        }

        tracing::debug!("出口限制載入：{} 列展開為 {} 個鍵", rows.len(), blocked.len());

        Self {
            blocked,
            normalizer: normalizer.clone(),
        }
    }

    /// 該路線是否被限制（指定 SKU 或「All」皆會封鎖）
    pub fn is_restricted(
        &self,
        sku: &SkuCode,
        origin_factory: &FactoryCode,
        destination: &CountryCode,
        month: PlanMonth,
    ) -> bool {
        if self.blocked.is_empty() {
            return false;
        }

        let origin = self.normalizer.origin_warehouse(origin_factory.as_str());
        let country = self.normalizer.country(destination.as_str());

        [SkuSelector::Sku(sku.clone()), SkuSelector::All]
            .into_iter()
            .any(|selector| {
                self.blocked.contains(&RestrictionKey {
                    sku: selector,
                    origin: origin.clone(),
                    country: country.clone(),
                    month,
                })
            })
    }

    pub fn len(&self) -> usize {
        self.blocked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocked.is_empty()
    }
}
