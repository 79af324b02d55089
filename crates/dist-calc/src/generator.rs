//! 配送分配表產生器
//!
//! 對每個 (SKU, 月份) 展開 工廠 × 目的倉庫 的路線，套用產能篩選與出口限制，
//! 解析運費與關稅後計算衍生欄位。每個 (SKU, 月份) 只讀取共用的不可變索引、
//! 寫入互不重疊的輸出，因此以 rayon 在單位之間並行。

use dist_core::{
    CodeNormalizer, CountryCode, DemandLine, DistributionConfig, FactoryCode, PlanningHorizon,
    ReferenceSnapshot, Route, SkuCode, WarehouseCode,
};
use rayon::prelude::*;
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashMap};

use crate::capacity::CapacityFilter;
use crate::cost_resolver::{CostQuery, CostResolver};
use crate::customs::CustomsDutyCalculator;
use crate::freight_index::FreightRateIndex;
use crate::restriction::ExportRestrictionIndex;
use crate::{GenerationReport, GenerationWarning, RecomputeReport};

/// 單一 (SKU, 月份) 的展開結果
#[derive(Debug, Default)]
struct UnitOutcome {
    routes: Vec<Route>,
    skipped: bool,
    restricted: usize,
    blocked: usize,
    warnings: Vec<GenerationWarning>,
}

/// 單一路線的推導結果
#[derive(Debug, Default)]
struct DeriveOutcome {
    restricted: bool,
    blocked: bool,
}

/// 配送分配表產生器
///
/// 建立時載入整個批次的參考資料快照，之後只讀
#[derive(Debug, Clone)]
pub struct DistributionTableGenerator {
    config: DistributionConfig,
    normalizer: CodeNormalizer,
    horizon: PlanningHorizon,
    freight: FreightRateIndex,
    customs: CustomsDutyCalculator,
    capacity: CapacityFilter,
    restrictions: ExportRestrictionIndex,
    demand: Vec<DemandLine>,
    unit_weights: HashMap<SkuCode, Decimal>,
    origin_hints: HashMap<CountryCode, FactoryCode>,
}

impl DistributionTableGenerator {
    /// 從配置與參考資料快照建立產生器
    pub fn new(config: &DistributionConfig, snapshot: &ReferenceSnapshot) -> Self {
        tracing::debug!("載入參考資料快照");

        let normalizer = CodeNormalizer::from_config(config);
        let horizon = config.planning_horizon();
        let freight =
            FreightRateIndex::build(&snapshot.freight, &normalizer, &config.missing_sentinel);
        let customs = CustomsDutyCalculator::from_reference(&snapshot.customs, config);
        let capacity = CapacityFilter::from_rows(&snapshot.capacity);
        let restrictions =
            ExportRestrictionIndex::build(&snapshot.restrictions, &horizon, &normalizer);

        let demand: Vec<DemandLine> = snapshot
            .demand
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let origin_hints = snapshot
            .origin_hints
            .iter()
            .map(|(country, factory)| (normalizer.country(country.as_str()), factory.clone()))
            .collect();

        Self {
            config: config.clone(),
            normalizer,
            horizon,
            freight,
            customs,
            capacity,
            restrictions,
            demand,
            unit_weights: snapshot
                .unit_weights
                .iter()
                .map(|(sku, weight)| (sku.clone(), *weight))
                .collect(),
            origin_hints,
        }
    }

    /// 以本批次的索引建立成本解析器
    pub fn resolver(&self) -> CostResolver<'_> {
        CostResolver::new(&self.freight, &self.normalizer, &self.config)
    }

    pub fn freight_index(&self) -> &FreightRateIndex {
        &self.freight
    }

    pub fn customs(&self) -> &CustomsDutyCalculator {
        &self.customs
    }

    pub fn capacity(&self) -> &CapacityFilter {
        &self.capacity
    }

    pub fn restrictions(&self) -> &ExportRestrictionIndex {
        &self.restrictions
    }

    pub fn config(&self) -> &DistributionConfig {
        &self.config
    }

    /// 展開整個分配表
    pub fn generate(&self) -> GenerationReport {
        tracing::info!(
            "開始產生分配表：(SKU, 月份) {} 組，目的倉庫 {} 個",
            self.demand.len(),
            self.config.warehouses.len()
        );

        let start_time = std::time::Instant::now();
        let resolver = self.resolver();

        let outcomes: Vec<UnitOutcome> = if self.config.parallel {
            self.demand
                .par_iter()
                .map(|line| self.expand_unit(&resolver, line))
                .collect()
        } else {
            self.demand
                .iter()
                .map(|line| self.expand_unit(&resolver, line))
                .collect()
        };

        let mut report = GenerationReport::empty();
        for outcome in outcomes {
            report.routes.extend(outcome.routes);
            report.restricted_routes += outcome.restricted;
            report.blocked_routes += outcome.blocked;
            if outcome.skipped {
                report.skipped_sku_months += 1;
            }
            for warning in outcome.warnings {
                report.add_warning(warning);
            }
        }

        report.routes.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        for warning in self.unknown_factory_warnings(&report.routes) {
            report.add_warning(warning);
        }
        report.calculation_time_ms = Some(start_time.elapsed().as_millis());

        tracing::info!(
            "分配表產生完成：路線 {} 筆，略過 {} 組，限制 {} 筆，禁止調撥 {} 筆，耗時 {:?}",
            report.routes.len(),
            report.skipped_sku_months,
            report.restricted_routes,
            report.blocked_routes,
            start_time.elapsed()
        );

        report
    }

    /// 對既有路線重算運費、關稅與邊界，不重新展開
    ///
    /// 數量保持不變；若超出新的 maxQty 只會反映在檢查旗標上
    pub fn recompute(&self, routes: &mut [Route]) -> RecomputeReport {
        tracing::info!("開始重算 {} 筆路線", routes.len());

        let resolver = self.resolver();
        let derive = |route: &mut Route| {
            let weight = self.unit_weight(&route.sku).unwrap_or(Decimal::ZERO);
            self.derive_route(&resolver, route, weight)
        };

        let outcomes: Vec<DeriveOutcome> = if self.config.parallel {
            routes.par_iter_mut().map(derive).collect()
        } else {
            routes.iter_mut().map(derive).collect()
        };

        let mut report = RecomputeReport {
            routes: routes.len(),
            restricted_routes: outcomes.iter().filter(|o| o.restricted).count(),
            blocked_routes: outcomes.iter().filter(|o| o.blocked).count(),
            out_of_bounds: routes.iter().filter(|r| !r.is_within_bounds()).count(),
            warnings: Vec::new(),
        };

        let missing_weights: BTreeSet<&SkuCode> = routes
            .iter()
            .map(|route| &route.sku)
            .filter(|sku| self.unit_weight(sku).is_none())
            .collect();
        for sku in missing_weights {
            report.warnings.push(missing_weight_warning(sku));
        }
        report
            .warnings
            .extend(self.unknown_factory_warnings(routes));

        if report.out_of_bounds > 0 {
            tracing::warn!("重算後有 {} 筆路線數量超出邊界", report.out_of_bounds);
        }
        tracing::info!("重算完成：{} 筆", report.routes);

        report
    }

    /// 展開單一 (SKU, 月份)
    fn expand_unit(&self, resolver: &CostResolver<'_>, line: &DemandLine) -> UnitOutcome {
        let mut outcome = UnitOutcome::default();
        let sku = &line.sku;

        if !self.horizon.contains(line.month) {
            outcome.warnings.push(GenerationWarning::info(
                sku.to_string(),
                format!("月份 {} 不在計劃時界內", line.month),
            ));
        }

        let unit_weight = match self.unit_weight(sku) {
            Some(weight) => weight,
            None => {
                outcome.warnings.push(missing_weight_warning(sku));
                Decimal::ZERO
            }
        };

        // 未指派路線永遠存在
        let mut unassigned = Route::new(
            WarehouseCode::new(&self.config.unassigned_code),
            FactoryCode::new(&self.config.unassigned_code),
            CountryCode::new(&self.config.unassigned_code),
            sku.clone(),
            line.month,
        );
        self.derive_route(resolver, &mut unassigned, unit_weight);
        outcome.routes.push(unassigned);

        if sku.is_empty() {
            tracing::warn!("需求列 SKU 為空白（月份 {}），只產生未指派路線", line.month);
            outcome.warnings.push(GenerationWarning::error(
                String::new(),
                format!("月份 {} 的需求列缺少 SKU", line.month),
            ));
            outcome.skipped = true;
            return outcome;
        }

        let factories = self.capacity.eligible_factories(sku);
        if factories.is_empty() {
            tracing::debug!("SKU {} 月份 {} 沒有可用工廠", sku, line.month);
            outcome.skipped = true;
            return outcome;
        }

        for factory in &factories {
            for site in &self.config.warehouses {
                let mut route = Route::new(
                    site.code.clone(),
                    factory.clone(),
                    site.country.clone(),
                    sku.clone(),
                    line.month,
                );
                let derived = self.derive_route(resolver, &mut route, unit_weight);
                if derived.restricted {
                    outcome.restricted += 1;
                }
                if derived.blocked {
                    outcome.blocked += 1;
                }
                outcome.routes.push(route);
            }
        }

        outcome
    }

    /// 推導單一路線的運費、關稅、最大數量與衍生欄位（保留數量）
    ///
    /// 目的國先經過共用的正規化器，運費、出口限制與關稅都以同一個國家代碼判斷
    fn derive_route(
        &self,
        resolver: &CostResolver<'_>,
        route: &mut Route,
        unit_weight: Decimal,
    ) -> DeriveOutcome {
        let mut outcome = DeriveOutcome::default();
        route.country = self.normalizer.country(route.country.as_str());

        let query = CostQuery {
            country: route.country.clone(),
            warehouse: route.warehouse.clone(),
            factory: route.factory.clone(),
            sku: route.sku.clone(),
        };
        let resolution = resolver.resolve_traced(&query);

        let unassigned = self.config.is_unassigned(route.warehouse.as_str());
        // 工廠所在國家未知時不計關稅（每個工廠只在整批結束時警告一次）
        let customs_required = !unassigned
            && self
                .normalizer
                .factory_country(&route.factory)
                .is_some_and(|origin_country| origin_country != route.country);

        if !unassigned {
            outcome.restricted = self.restrictions.is_restricted(
                &route.sku,
                &route.factory,
                &route.country,
                route.month,
            );
            outcome.blocked = self
                .config
                .is_blocked_transfer(&route.factory, &route.warehouse);
        }

        let duty = self.customs.compute(
            &route.sku,
            &route.factory,
            resolution.cost,
            &route.country,
            customs_required,
        );

        route.cost_per_unit = resolution.cost;
        route.cost_source = resolution.source;
        route.custom_cost_per_unit = duty;
        route.max_qty = if outcome.restricted || outcome.blocked {
            Decimal::ZERO
        } else {
            self.config.default_max_qty
        };
        route.unit_weight = unit_weight;
        route.default_origin = !unassigned
            && self.origin_hints.get(&route.country) == Some(&route.factory);
        route.refresh_derived();

        outcome
    }

    fn unit_weight(&self, sku: &SkuCode) -> Option<Decimal> {
        self.unit_weights.get(sku).copied()
    }

    /// 所在國家未知的工廠，每個工廠一筆警告
    fn unknown_factory_warnings(&self, routes: &[Route]) -> Vec<GenerationWarning> {
        let unknown: BTreeSet<&FactoryCode> = routes
            .iter()
            .filter(|route| !self.config.is_unassigned(route.warehouse.as_str()))
            .map(|route| &route.factory)
            .filter(|factory| self.normalizer.factory_country(factory).is_none())
            .collect();

        unknown
            .into_iter()
            .map(|factory| {
                tracing::warn!("工廠 {} 所在國家未知，不計關稅", factory);
                GenerationWarning::warning(
                    String::new(),
                    format!("工廠 {} 所在國家未知，關稅以 0 計算", factory),
                )
            })
            .collect()
    }
}

fn missing_weight_warning(sku: &SkuCode) -> GenerationWarning {
    GenerationWarning::warning(sku.to_string(), "缺少單位重量，以 0 計算".to_string())
}
