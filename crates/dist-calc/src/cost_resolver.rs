//! 運輸成本解析
//!
//! 以有序規則表依序評估，第一條命中的規則決定結果：
//!
//! 1. 未指派虛擬倉庫 → 0
//! 2. 工廠出貨到同址倉庫 → 0
//! 3. 目的國即工廠所在國 → 0
//! 4. 精確運費
//! 5. 工廠-目的國平均
//! 6. 目的國平均
//! 7. 全域上限
//!
//! 前三條覆寫規則在查詢運費索引之前評估，即使索引中存在精確運費也會勝出。

use dist_core::{
    CodeNormalizer, CostKey, CostSource, CountryCode, DistributionConfig, FactoryCode, LaneKey,
    SkuCode, WarehouseCode,
};
use rust_decimal::Decimal;

use crate::freight_index::FreightRateIndex;

/// 成本查詢
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostQuery {
    /// 目的國
    pub country: CountryCode,
    /// 目的倉庫
    pub warehouse: WarehouseCode,
    /// 起運工廠
    pub factory: FactoryCode,
    /// SKU
    pub sku: SkuCode,
}

impl CostQuery {
    pub fn new(
        country: impl Into<CountryCode>,
        warehouse: impl Into<WarehouseCode>,
        factory: impl Into<FactoryCode>,
        sku: impl Into<SkuCode>,
    ) -> Self {
        Self {
            country: country.into(),
            warehouse: warehouse.into(),
            factory: factory.into(),
            sku: sku.into(),
        }
    }
}

/// 規則評估時可讀取的資料
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub index: &'a FreightRateIndex,
    pub normalizer: &'a CodeNormalizer,
    pub config: &'a DistributionConfig,
}

impl RuleContext<'_> {
    /// 查詢的目的國（經過別名正規化）
    fn country(&self, query: &CostQuery) -> CountryCode {
        self.normalizer.country(query.country.as_str())
    }

    /// 起運工廠對應的倉庫代碼
    fn origin_warehouse(&self, query: &CostQuery) -> WarehouseCode {
        self.normalizer.origin_warehouse(query.factory.as_str())
    }
}

/// 規則：命中時回傳成本，否則回傳 None 交給下一條
pub type RuleFn = fn(&RuleContext<'_>, &CostQuery) -> Option<Decimal>;

/// 成本規則
#[derive(Debug, Clone, Copy)]
pub struct CostRule {
    pub source: CostSource,
    pub evaluate: RuleFn,
}

impl CostRule {
    pub const fn new(source: CostSource, evaluate: RuleFn) -> Self {
        Self { source, evaluate }
    }
}

/// 預設規則表（優先級由高到低）
pub const DEFAULT_RULES: [CostRule; 7] = [
    CostRule::new(CostSource::Unassigned, unassigned_rule),
    CostRule::new(CostSource::SameSite, same_site_rule),
    CostRule::new(CostSource::Domestic, domestic_rule),
    CostRule::new(CostSource::Exact, exact_rule),
    CostRule::new(CostSource::LaneAverage, lane_average_rule),
    CostRule::new(CostSource::DestinationAverage, destination_average_rule),
    CostRule::new(CostSource::GlobalCeiling, global_ceiling_rule),
];

/// 規則 1：未指派虛擬倉庫
pub fn unassigned_rule(ctx: &RuleContext<'_>, query: &CostQuery) -> Option<Decimal> {
    ctx.config
        .is_unassigned(query.warehouse.as_str())
        .then_some(Decimal::ZERO)
}

/// 規則 2：工廠出貨到自己的同址倉庫
pub fn same_site_rule(ctx: &RuleContext<'_>, query: &CostQuery) -> Option<Decimal> {
    let home_factory = ctx
        .config
        .warehouse(&query.warehouse)
        .map(|site| &site.home_factory);

    let same_site = home_factory == Some(&query.factory)
        || ctx.origin_warehouse(query) == query.warehouse;

    same_site.then_some(Decimal::ZERO)
}

/// 規則 3：國內運輸
pub fn domestic_rule(ctx: &RuleContext<'_>, query: &CostQuery) -> Option<Decimal> {
    let factory_country = ctx.normalizer.factory_country(&query.factory)?;
    (factory_country == ctx.country(query)).then_some(Decimal::ZERO)
}

/// 規則 4：精確運費
pub fn exact_rule(ctx: &RuleContext<'_>, query: &CostQuery) -> Option<Decimal> {
    let key = CostKey::new(ctx.country(query), ctx.origin_warehouse(query), query.sku.clone());
    ctx.index.exact_cost(&key)
}

/// 規則 5：工廠-目的國平均
pub fn lane_average_rule(ctx: &RuleContext<'_>, query: &CostQuery) -> Option<Decimal> {
    let key = LaneKey::new(ctx.origin_warehouse(query), ctx.country(query));
    ctx.index.lane_average(&key)
}

/// 規則 6：目的國平均
pub fn destination_average_rule(ctx: &RuleContext<'_>, query: &CostQuery) -> Option<Decimal> {
    ctx.index.destination_average(&ctx.country(query))
}

/// 規則 7：全域上限（必定命中）
pub fn global_ceiling_rule(ctx: &RuleContext<'_>, _query: &CostQuery) -> Option<Decimal> {
    Some(ctx.index.global_ceiling())
}

/// 解析結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub cost: Decimal,
    pub source: CostSource,
}

/// 運輸成本解析器
#[derive(Debug, Clone)]
pub struct CostResolver<'a> {
    ctx: RuleContext<'a>,
    rules: Vec<CostRule>,
}

impl<'a> CostResolver<'a> {
    /// 使用預設規則表創建解析器
    pub fn new(
        index: &'a FreightRateIndex,
        normalizer: &'a CodeNormalizer,
        config: &'a DistributionConfig,
    ) -> Self {
        Self::with_rules(index, normalizer, config, DEFAULT_RULES.to_vec())
    }

    /// 使用自訂規則表創建解析器
    pub fn with_rules(
        index: &'a FreightRateIndex,
        normalizer: &'a CodeNormalizer,
        config: &'a DistributionConfig,
        rules: Vec<CostRule>,
    ) -> Self {
        Self {
            ctx: RuleContext {
                index,
                normalizer,
                config,
            },
            rules,
        }
    }

    /// 解析每單位運費（必定回傳 ≥ 0 的值）
    pub fn resolve(&self, query: &CostQuery) -> Decimal {
        self.resolve_traced(query).cost
    }

    /// 解析每單位運費並回傳命中的層級
    pub fn resolve_traced(&self, query: &CostQuery) -> Resolution {
        let resolution = self
            .rules
            .iter()
            .find_map(|rule| {
                (rule.evaluate)(&self.ctx, query).map(|cost| Resolution {
                    cost,
                    source: rule.source,
                })
            })
            .unwrap_or(Resolution {
                cost: self.ctx.index.global_ceiling(),
                source: CostSource::GlobalCeiling,
            });

        Resolution {
            cost: resolution.cost.max(Decimal::ZERO),
            source: resolution.source,
        }
    }

    pub fn rules(&self) -> &[CostRule] {
        &self.rules
    }
}
