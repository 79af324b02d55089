//! 配送路線模型（分配表的一列）

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::codes::{CountryCode, FactoryCode, SkuCode, WarehouseCode};
use crate::horizon::PlanMonth;

/// 運輸成本的來源層級
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CostSource {
    /// 未指派虛擬倉庫
    Unassigned,
    /// 工廠出貨到同址倉庫
    SameSite,
    /// 國內運輸
    Domestic,
    /// 精確運費
    Exact,
    /// 工廠-目的國平均
    LaneAverage,
    /// 目的國平均
    DestinationAverage,
    /// 全域上限
    GlobalCeiling,
}

impl CostSource {
    /// 是否為覆寫規則（不查運費索引）
    pub fn is_override(&self) -> bool {
        matches!(
            self,
            CostSource::Unassigned | CostSource::SameSite | CostSource::Domestic
        )
    }
}

/// 配送路線
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// 目的倉庫
    pub warehouse: WarehouseCode,

    /// 起運工廠
    pub factory: FactoryCode,

    /// 目的國
    pub country: CountryCode,

    /// SKU
    pub sku: SkuCode,

    /// 計劃月份
    pub month: PlanMonth,

    /// 每單位運費
    pub cost_per_unit: Decimal,

    /// 運費來源
    pub cost_source: CostSource,

    /// 每單位關稅
    pub custom_cost_per_unit: Decimal,

    /// 最大數量
    pub max_qty: Decimal,

    /// 數量（由後續規劃/優化設定）
    pub quantity: Decimal,

    /// 單位重量
    pub unit_weight: Decimal,

    /// 總重量 = 數量 × 單位重量
    pub weight: Decimal,

    /// 關稅 = 數量 × 每單位關稅
    pub custom_duty: Decimal,

    /// 路線成本 = 數量 × 每單位運費
    pub row_cost: Decimal,

    /// 數量 ≥ 0
    pub positive_check: bool,

    /// 數量 ≤ 最大數量
    pub within_max_check: bool,

    /// 是否為目的國的預設起運工廠
    pub default_origin: bool,
}

impl Route {
    /// 創建新的路線（數量為 0）
    pub fn new(
        warehouse: WarehouseCode,
        factory: FactoryCode,
        country: CountryCode,
        sku: SkuCode,
        month: PlanMonth,
    ) -> Self {
        let mut route = Self {
            warehouse,
            factory,
            country,
            sku,
            month,
            cost_per_unit: Decimal::ZERO,
            cost_source: CostSource::GlobalCeiling,
            custom_cost_per_unit: Decimal::ZERO,
            max_qty: Decimal::ZERO,
            quantity: Decimal::ZERO,
            unit_weight: Decimal::ZERO,
            weight: Decimal::ZERO,
            custom_duty: Decimal::ZERO,
            row_cost: Decimal::ZERO,
            positive_check: true,
            within_max_check: true,
            default_origin: false,
        };
        route.refresh_derived();
        route
    }

    /// 建構器模式：設置運費
    pub fn with_cost(mut self, cost_per_unit: Decimal, source: CostSource) -> Self {
        self.cost_per_unit = cost_per_unit;
        self.cost_source = source;
        self.refresh_derived();
        self
    }

    /// 建構器模式：設置每單位關稅
    pub fn with_custom_cost(mut self, custom_cost_per_unit: Decimal) -> Self {
        self.custom_cost_per_unit = custom_cost_per_unit;
        self.refresh_derived();
        self
    }

    /// 建構器模式：設置最大數量
    pub fn with_max_qty(mut self, max_qty: Decimal) -> Self {
        self.max_qty = max_qty;
        self.refresh_derived();
        self
    }

    /// 建構器模式：設置單位重量
    pub fn with_unit_weight(mut self, unit_weight: Decimal) -> Self {
        self.unit_weight = unit_weight;
        self.refresh_derived();
        self
    }

    /// 建構器模式：標記為預設起運工廠
    pub fn with_default_origin(mut self, default_origin: bool) -> Self {
        self.default_origin = default_origin;
        self
    }

    /// 設置數量並重算衍生欄位
    pub fn set_quantity(&mut self, quantity: Decimal) {
        self.quantity = quantity;
        self.refresh_derived();
    }

    /// 重算衍生欄位（重量、關稅、路線成本、邊界檢查）
    ///
    /// 乘積溢位時飽和到 Decimal 的上下限
    pub fn refresh_derived(&mut self) {
        self.weight = self.quantity.saturating_mul(self.unit_weight);
        self.custom_duty = self.quantity.saturating_mul(self.custom_cost_per_unit);
        self.row_cost = self.quantity.saturating_mul(self.cost_per_unit);
        self.positive_check = self.quantity >= Decimal::ZERO;
        self.within_max_check = self.quantity <= self.max_qty;
    }

    /// 是否滿足 0 ≤ 數量 ≤ 最大數量
    pub fn is_within_bounds(&self) -> bool {
        self.positive_check && self.within_max_check
    }

    /// 路線排序鍵：(SKU, 月份, 倉庫, 工廠)
    pub fn sort_key(&self) -> (&SkuCode, PlanMonth, &WarehouseCode, &FactoryCode) {
        (&self.sku, self.month, &self.warehouse, &self.factory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route() -> Route {
        Route::new(
            "SYDM".into(),
            "AKL".into(),
            "AUS".into(),
            "S1".into(),
            PlanMonth::new(2025, 1).unwrap(),
        )
    }

    #[test]
    fn test_new_route_starts_at_zero() {
        let route = route().with_max_qty(Decimal::from(100));

        assert_eq!(route.quantity, Decimal::ZERO);
        assert_eq!(route.row_cost, Decimal::ZERO);
        assert!(route.is_within_bounds());
    }

    #[test]
    fn test_derived_fields_follow_quantity() {
        let mut route = route()
            .with_cost(Decimal::new(5, 0), CostSource::Exact)
            .with_custom_cost(Decimal::new(125, 2))
            .with_unit_weight(Decimal::new(2, 0))
            .with_max_qty(Decimal::from(100));

        route.set_quantity(Decimal::from(10));

        assert_eq!(route.row_cost, Decimal::from(50));
        assert_eq!(route.custom_duty, Decimal::new(1250, 2));
        assert_eq!(route.weight, Decimal::from(20));
        assert!(route.is_within_bounds());
    }

    #[test]
    fn test_bounds_flags() {
        let mut route = route().with_max_qty(Decimal::from(5));

        route.set_quantity(Decimal::from(6));
        assert!(route.positive_check);
        assert!(!route.within_max_check);

        route.set_quantity(Decimal::from(-1));
        assert!(!route.positive_check);
        assert!(route.within_max_check);
    }

    #[test]
    fn test_derived_fields_saturate_on_overflow() {
        let mut route = route()
            .with_cost(Decimal::MAX, CostSource::GlobalCeiling)
            .with_max_qty(Decimal::from(10_000_000_000i64));

        route.set_quantity(Decimal::from(10));
        assert_eq!(route.row_cost, Decimal::MAX);

        route.set_quantity(Decimal::from(-10));
        assert_eq!(route.row_cost, Decimal::MIN);
        assert!(!route.positive_check);
    }

    #[test]
    fn test_override_sources() {
        assert!(CostSource::SameSite.is_override());
        assert!(!CostSource::Exact.is_override());
    }
}
