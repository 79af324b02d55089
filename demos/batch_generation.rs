//! 批次產生分配表示例
//!
//! 執行：`RUST_LOG=debug cargo run --example batch_generation`

use distplan::domain::{
    CapacityRow, CustomsReference, DemandLine, DistributionConfig, MonthSelector, PlanMonth,
    RawFreightRecord, ReferenceSnapshot, RestrictionRow, SkuFactoryValue,
};
use distplan::{
    logging, DistributionService, InMemoryReferenceProvider, InMemoryRouteStore, RouteKey,
};
use rust_decimal::Decimal;
use uuid::Uuid;

fn main() -> anyhow::Result<()> {
    logging::init();

    println!("=== 配送分配表產生示例 ===\n");

    let config = DistributionConfig::default();
    let jan = PlanMonth::new(2025, 1)?;
    let feb = PlanMonth::new(2025, 2)?;

    // 上傳批次的參考資料
    let snapshot = ReferenceSnapshot::new()
        .with_freight(vec![
            RawFreightRecord::new("BEEF-01", "MPF", "Philippines", "24", "1,320"),
            RawFreightRecord::new("BEEF-01", "AKL", "Philippines", "24", "1,080"),
            RawFreightRecord::new("BEEF-01", "AKL", "Australia", "24", "600"),
            RawFreightRecord::new("MILK-02", "SYD", "PH", "20", "900"),
            RawFreightRecord::new("MILK-02", "SYD", "New Zealand", "Missing", "400"),
        ])
        .with_customs(CustomsReference {
            rm_prices: vec![
                SkuFactoryValue::new("BEEF-01", "AKL", Decimal::new(4250, 2)),
                SkuFactoryValue::new("MILK-02", "SYD", Decimal::new(1875, 2)),
            ],
            overheads: vec![SkuFactoryValue::new("MILK-02", "SYD", Decimal::new(320, 2))],
            markup_pct: Some(Decimal::new(15, 2)),
            duty_pct: Some(Decimal::new(7, 2)),
        })
        .with_capacity(vec![
            CapacityRow::new("BEEF-01", "MPF", Decimal::from(5_000)),
            CapacityRow::new("BEEF-01", "AKL", Decimal::from(2_000)),
            CapacityRow::new("MILK-02", "SYD", Decimal::from(8_000)),
            CapacityRow::new("MILK-02", "MNL", Decimal::ZERO),
        ])
        .with_restrictions(vec![RestrictionRow::new(
            "MILK-02",
            "SYD",
            "Philippines",
            MonthSelector::Month(feb),
        )])
        .with_demand(vec![
            DemandLine::new("BEEF-01", jan),
            DemandLine::new("BEEF-01", feb),
            DemandLine::new("MILK-02", jan),
            DemandLine::new("MILK-02", feb),
        ])
        .with_unit_weight("BEEF-01", Decimal::new(185, 1))
        .with_unit_weight("MILK-02", Decimal::new(105, 1))
        .with_origin_hint("PHL", "MPF");

    let batch_id = Uuid::new_v4();
    let provider = InMemoryReferenceProvider::new();
    provider.insert(batch_id, snapshot)?;

    let service = DistributionService::new(config, InMemoryRouteStore::new(), provider)?;

    let summary = service.generate(batch_id)?;
    println!("批次 {}", summary.batch_id);
    println!("  路線: {}", summary.route_count);
    println!("  出口限制: {}", summary.restricted_routes);
    println!("  禁止調撥: {}", summary.blocked_routes);
    println!("  警告: {}\n", summary.warnings);

    println!("分配表:");
    for route in service.routes(batch_id)? {
        println!(
            "  {} {} {:>4} ← {:<4} 運費 {:>8} ({:?}) 關稅 {:>8} maxQty {}{}",
            route.sku,
            route.month,
            route.warehouse,
            route.factory,
            route.cost_per_unit,
            route.cost_source,
            route.custom_cost_per_unit,
            route.max_qty,
            if route.default_origin { " *" } else { "" }
        );
    }

    // 規劃器寫回數量後，參考資料更新並重算
    let key = RouteKey::new("MNLM", "AKL", "BEEF-01", jan);
    service.update_quantity(batch_id, &key, Decimal::from(1_200))?;
    service.mark_dirty(batch_id)?;

    for summary in service.recompute_dirty()? {
        println!(
            "\n重算批次 {}：路線 {}，超出邊界 {}",
            summary.batch_id, summary.route_count, summary.out_of_bounds
        );
    }

    Ok(())
}
