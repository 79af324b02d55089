//! 集成測試

use distplan::calc::{CostQuery, DistributionTableGenerator, WarningSeverity};
use distplan::domain::{
    CapacityRow, CostSource, CustomsReference, DemandLine, DistributionConfig, MonthSelector,
    PlanMonth, RawFreightRecord, ReferenceSnapshot, RestrictionRow, Route, SkuFactoryValue,
    WarehouseSite,
};
use distplan::{DistributionService, InMemoryReferenceProvider, InMemoryRouteStore, RouteKey};
use proptest::prelude::*;
use rstest::rstest;
use rust_decimal::Decimal;
use uuid::Uuid;

fn jan() -> PlanMonth {
    PlanMonth::new(2025, 1).unwrap()
}

/// 三地（AKL/SYD/MNL）的參考資料
fn three_site_snapshot() -> ReferenceSnapshot {
    ReferenceSnapshot::new()
        .with_freight(vec![
            RawFreightRecord::new("S1", "AKL", "Philippines", "100", "500"),
            RawFreightRecord::new("S1", "SYD", "Australia", "100", "700"),
            RawFreightRecord::new("S1", "SYD", "PHL", "100", "300"),
            RawFreightRecord::new("S2", "SYD", "PHL", "100", "500"),
            RawFreightRecord::new("S9", "AKL", "Fiji", "10", "1,200"),
        ])
        .with_customs(CustomsReference {
            rm_prices: vec![SkuFactoryValue::new("S1", "AKL", Decimal::from(10))],
            overheads: vec![SkuFactoryValue::new("S1", "AKL", Decimal::from(2))],
            markup_pct: Some(Decimal::new(10, 2)),
            duty_pct: Some(Decimal::new(5, 2)),
        })
        .with_capacity(vec![
            CapacityRow::new("S1", "AKL", Decimal::from(100)),
            CapacityRow::new("S1", "SYD", Decimal::from(100)),
            CapacityRow::new("S1", "MPF", Decimal::from(100)),
        ])
        .with_demand(vec![DemandLine::new("S1", jan())])
        .with_unit_weight("S1", Decimal::from(2))
}

/// 單一目的國 C1 的配置（工廠 F1 的所在國未知，不觸發覆寫規則）
fn single_lane_config() -> DistributionConfig {
    DistributionConfig::default().with_warehouses(vec![WarehouseSite::new("C1W", "HOME", "C1")])
}

fn full_year_demand(sku: &str, config: &DistributionConfig) -> Vec<DemandLine> {
    config
        .planning_horizon()
        .months()
        .iter()
        .map(|month| DemandLine::new(sku, *month))
        .collect()
}

fn find<'a>(routes: &'a [Route], warehouse: &str, factory: &str) -> &'a Route {
    routes
        .iter()
        .find(|r| r.warehouse.as_str() == warehouse && r.factory.as_str() == factory)
        .unwrap()
}

#[test]
fn test_unassigned_route_is_free_even_with_freight_data() {
    let config = DistributionConfig::default();
    let generator = DistributionTableGenerator::new(&config, &three_site_snapshot());

    let resolution = generator
        .resolver()
        .resolve_traced(&CostQuery::new("PHL", "X", "AKL", "S1"));

    assert_eq!(resolution.cost, Decimal::ZERO);
    assert_eq!(resolution.source, CostSource::Unassigned);
}

#[test]
fn test_same_site_wins_over_exact_rate() {
    let config = DistributionConfig::default();
    let generator = DistributionTableGenerator::new(&config, &three_site_snapshot());
    let resolver = generator.resolver();

    // SYD → AUS 有精確運費 7，但 SYD 即 SYDM 的同址工廠
    let resolution = resolver.resolve_traced(&CostQuery::new("AUS", "SYDM", "SYD", "S1"));

    assert_eq!(resolution.cost, Decimal::ZERO);
    assert_eq!(resolution.source, CostSource::SameSite);
}

#[rstest]
#[case::exact("PHL", "MNLM", "SYD", "S1", Decimal::from(3), CostSource::Exact)]
#[case::lane_average("PHL", "MNLM", "SYD", "S7", Decimal::from(4), CostSource::LaneAverage)]
#[case::destination_average(
    "PHL",
    "MNLM",
    "ZZZ",
    "S1",
    Decimal::new(43333, 4),
    CostSource::DestinationAverage
)]
#[case::global_ceiling("TON", "MNLM", "AKL", "S1", Decimal::from(120), CostSource::GlobalCeiling)]
fn test_fallback_specificity(
    #[case] country: &str,
    #[case] warehouse: &str,
    #[case] factory: &str,
    #[case] sku: &str,
    #[case] expected: Decimal,
    #[case] source: CostSource,
) {
    let config = DistributionConfig::default();
    let generator = DistributionTableGenerator::new(&config, &three_site_snapshot());

    let resolution = generator
        .resolver()
        .resolve_traced(&CostQuery::new(country, warehouse, factory, sku));

    assert_eq!(resolution.cost, expected);
    assert_eq!(resolution.source, source);
}

#[test]
fn test_generation_is_deterministic() {
    let config = DistributionConfig::default();

    let first = DistributionTableGenerator::new(&config, &three_site_snapshot()).generate();
    let second = DistributionTableGenerator::new(&config, &three_site_snapshot()).generate();

    assert_eq!(
        serde_json::to_string(&first.routes).unwrap(),
        serde_json::to_string(&second.routes).unwrap()
    );

    let keys: Vec<_> = first.routes.iter().map(|r| r.sort_key()).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

#[test]
fn test_duty_gating() {
    let config = DistributionConfig::default();
    let report = DistributionTableGenerator::new(&config, &three_site_snapshot()).generate();
    let routes = &report.routes;

    // 跨境到課稅國：(10 + 5 + 2) × 1.1 × 0.05
    assert_eq!(
        find(routes, "MNLM", "AKL").custom_cost_per_unit,
        Decimal::new(935, 3)
    );
    // 免關稅工廠
    assert_eq!(find(routes, "MNLM", "MPF").custom_cost_per_unit, Decimal::ZERO);
    // 跨境但非課稅國
    assert_eq!(find(routes, "SYDM", "AKL").custom_cost_per_unit, Decimal::ZERO);
    // 國內
    assert_eq!(find(routes, "AKLM", "MPF").custom_cost_per_unit, Decimal::ZERO);
    // 未指派
    assert_eq!(find(routes, "X", "X").custom_cost_per_unit, Decimal::ZERO);

    // MPF → SYDM 結構上不允許
    assert_eq!(find(routes, "SYDM", "MPF").max_qty, Decimal::ZERO);
    assert_eq!(report.blocked_routes, 1);
}

#[test]
fn test_single_lane_exact_and_lane_average() {
    let config = single_lane_config();
    let snapshot = ReferenceSnapshot::new()
        .with_freight(vec![RawFreightRecord::new("S1", "F1", "C1", "100", "500")])
        .with_capacity(vec![
            CapacityRow::new("S1", "F1", Decimal::from(10)),
            CapacityRow::new("S2", "F1", Decimal::from(10)),
        ])
        .with_demand(vec![DemandLine::new("S1", jan()), DemandLine::new("S2", jan())])
        .with_unit_weight("S1", Decimal::ONE)
        .with_unit_weight("S2", Decimal::ONE);

    let report = DistributionTableGenerator::new(&config, &snapshot).generate();

    let s1 = report
        .routes
        .iter()
        .find(|r| r.sku.as_str() == "S1" && r.factory.as_str() == "F1")
        .unwrap();
    assert_eq!(s1.cost_per_unit, Decimal::new(50000, 4));
    assert_eq!(s1.cost_source, CostSource::Exact);

    let s2 = report
        .routes
        .iter()
        .find(|r| r.sku.as_str() == "S2" && r.factory.as_str() == "F1")
        .unwrap();
    assert_eq!(s2.cost_per_unit, Decimal::from(5));
    assert_eq!(s2.cost_source, CostSource::LaneAverage);

    // F1 所在國未知：不計關稅並產生警告
    assert!(report
        .warnings
        .iter()
        .any(|w| w.severity == WarningSeverity::Warning && w.message.contains("F1")));
}

#[test]
fn test_no_freight_records_fall_back_to_zero_ceiling() {
    let config = single_lane_config();
    let snapshot = ReferenceSnapshot::new()
        .with_capacity(vec![CapacityRow::new("S1", "F1", Decimal::from(10))])
        .with_demand(vec![DemandLine::new("S1", jan())])
        .with_unit_weight("S1", Decimal::ONE);

    let generator = DistributionTableGenerator::new(&config, &snapshot);
    let report = generator.generate();

    assert!(generator.freight_index().is_empty());
    let route = find(&report.routes, "C1W", "F1");
    assert_eq!(route.cost_per_unit, Decimal::ZERO);
    assert_eq!(route.cost_source, CostSource::GlobalCeiling);
}

#[test]
fn test_all_months_restriction_zeroes_max_qty_across_horizon() {
    let config = single_lane_config();
    let snapshot = ReferenceSnapshot::new()
        .with_freight(vec![RawFreightRecord::new("S1", "F1", "C1", "100", "500")])
        .with_capacity(vec![CapacityRow::new("S1", "F1", Decimal::from(10))])
        .with_restrictions(vec![RestrictionRow::new("All", "F1", "C1", MonthSelector::All)])
        .with_demand(full_year_demand("S1", &config))
        .with_unit_weight("S1", Decimal::ONE);

    let report = DistributionTableGenerator::new(&config, &snapshot).generate();

    let restricted: Vec<&Route> = report
        .routes
        .iter()
        .filter(|r| r.factory.as_str() == "F1")
        .collect();
    assert_eq!(restricted.len(), 12);
    assert_eq!(report.restricted_routes, 12);
    assert!(restricted.iter().all(|r| r.max_qty == Decimal::ZERO));
    assert!(restricted.iter().all(|r| r.cost_per_unit == Decimal::from(5)));

    // 未指派路線不受限制
    let unassigned: Vec<&Route> = report
        .routes
        .iter()
        .filter(|r| r.warehouse.as_str() == "X")
        .collect();
    assert_eq!(unassigned.len(), 12);
    assert!(unassigned
        .iter()
        .all(|r| r.max_qty == config.default_max_qty));
}

#[test]
fn test_service_round_trip_with_planner_quantities() {
    distplan::logging::init_test();

    let batch_id = Uuid::new_v4();
    let provider = InMemoryReferenceProvider::new();
    provider.insert(batch_id, three_site_snapshot()).unwrap();
    let service =
        DistributionService::new(DistributionConfig::default(), InMemoryRouteStore::new(), provider)
            .unwrap();

    let summary = service.generate(batch_id).unwrap();
    // 未指派 1 + 3 工廠 × 3 倉庫
    assert_eq!(summary.route_count, 10);
    assert_eq!(summary.blocked_routes, 1);
    assert_eq!(summary.out_of_bounds, 0);

    let key = RouteKey::new("MNLM", "AKL", "S1", jan());
    assert!(service
        .update_quantity(batch_id, &key, Decimal::from(20))
        .unwrap());

    // 限制 AKL → PHL 後重算：數量保留，邊界檢查反映違規
    let restricted = three_site_snapshot().with_restrictions(vec![RestrictionRow::new(
        "S1",
        "AKL",
        "PHL",
        MonthSelector::Month(jan()),
    )]);
    service.provider().insert(batch_id, restricted).unwrap();
    service.mark_dirty(batch_id).unwrap();

    let summaries = service.recompute_dirty().unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].out_of_bounds, 1);
    assert_eq!(summaries[0].restricted_routes, 1);

    let routes = service.routes(batch_id).unwrap();
    let route = find(&routes, "MNLM", "AKL");
    assert_eq!(route.quantity, Decimal::from(20));
    assert_eq!(route.row_cost, Decimal::from(100));
    assert_eq!(route.weight, Decimal::from(40));
    assert!(!route.within_max_check);

    // 重新產生：整批替換，數量歸零
    service.generate(batch_id).unwrap();
    let regenerated = service.routes(batch_id).unwrap();
    assert!(regenerated.iter().all(|r| r.quantity == Decimal::ZERO));
}

proptest! {
    #[test]
    fn prop_bounds_flags_match_quantity(
        quantity in -1_000_000i64..1_000_000,
        max_qty in 0i64..1_000_000,
    ) {
        let mut route = Route::new(
            "MNLM".into(),
            "AKL".into(),
            "PHL".into(),
            "S1".into(),
            jan(),
        )
        .with_max_qty(Decimal::from(max_qty));

        route.set_quantity(Decimal::from(quantity));

        prop_assert_eq!(route.positive_check, quantity >= 0);
        prop_assert_eq!(route.within_max_check, quantity <= max_qty);
        prop_assert_eq!(route.is_within_bounds(), (0..=max_qty).contains(&quantity));
    }

    #[test]
    fn prop_generated_routes_start_within_bounds(
        amounts in prop::collection::vec(1u32..100_000, 1..8),
    ) {
        let freight: Vec<RawFreightRecord> = amounts
            .iter()
            .enumerate()
            .map(|(i, amount)| {
                RawFreightRecord::new(format!("S{}", i), "AKL", "PHL", "100", amount.to_string())
            })
            .collect();
        let capacity: Vec<CapacityRow> = (0..amounts.len())
            .map(|i| CapacityRow::new(format!("S{}", i), "AKL", Decimal::ONE))
            .collect();
        let demand: Vec<DemandLine> = (0..amounts.len())
            .map(|i| DemandLine::new(format!("S{}", i), jan()))
            .collect();
        let snapshot = ReferenceSnapshot::new()
            .with_freight(freight)
            .with_capacity(capacity)
            .with_demand(demand);

        let report = DistributionTableGenerator::new(&DistributionConfig::default(), &snapshot)
            .generate();

        prop_assert_eq!(report.routes.len(), amounts.len() * 4);
        for route in &report.routes {
            prop_assert!(route.is_within_bounds());
            prop_assert!(route.cost_per_unit >= Decimal::ZERO);
            prop_assert!(route.custom_cost_per_unit >= Decimal::ZERO);
        }
    }
}
