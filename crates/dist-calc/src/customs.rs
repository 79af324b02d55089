//! 關稅計算
//!
//! ```text
//! base       = 平均原料價格 + 運費 + 工廠間接費用
//! withMarkup = base × (1 + 加成比例)
//! duty       = withMarkup × 關稅比例   （四捨五入到 4 位小數）
//! ```

use dist_core::{
    CodeNormalizer, CountryCode, CustomsReference, DistributionConfig, FactoryCode, SkuCode,
};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

/// 關稅保留的小數位數
pub const DUTY_DECIMAL_PLACES: u32 = 4;

/// 關稅閘門（依序短路）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DutyGate {
    /// 不需報關
    NotRequired,
    /// 免關稅工廠
    ExemptFactory,
    /// 目的國不課徵關稅
    NonDutyCountry,
    /// 課徵關稅
    Levied,
    /// 計算溢位，以 0 計算
    Overflowed,
}

/// 關稅計算明細
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DutyBreakdown {
    pub gate: DutyGate,
    pub base: Decimal,
    pub with_markup: Decimal,
    pub duty: Decimal,
}

impl DutyBreakdown {
    fn gated(gate: DutyGate) -> Self {
        Self {
            gate,
            base: Decimal::ZERO,
            with_markup: Decimal::ZERO,
            duty: Decimal::ZERO,
        }
    }
}

/// 關稅計算器
///
/// 參考資料在批次開始時讀入一次，之後為純函數
#[derive(Debug, Clone)]
pub struct CustomsDutyCalculator {
    rm_prices: HashMap<(SkuCode, FactoryCode), Decimal>,
    overheads: HashMap<(SkuCode, FactoryCode), Decimal>,
    markup_pct: Decimal,
    duty_pct: Decimal,
    exempt_factories: HashSet<FactoryCode>,
    duty_country: CountryCode,
}

impl CustomsDutyCalculator {
    /// 從參考資料建立計算器；缺少的比例視為 0 並記錄警告
    pub fn from_reference(reference: &CustomsReference, config: &DistributionConfig) -> Self {
        let markup_pct = reference.markup_pct.unwrap_or_else(|| {
            tracing::warn!("缺少全域加成比例，以 0 計算");
            Decimal::ZERO
        });
        let duty_pct = reference.duty_pct.unwrap_or_else(|| {
            tracing::warn!("缺少全域關稅比例，以 0 計算");
            Decimal::ZERO
        });

        let rm_prices = reference
            .rm_prices
            .iter()
            .map(|row| ((row.sku.clone(), row.factory.clone()), row.value))
            .collect();
        let overheads = reference
            .overheads
            .iter()
            .map(|row| ((row.sku.clone(), row.factory.clone()), row.value))
            .collect();

        Self {
            rm_prices,
            overheads,
            markup_pct,
            duty_pct,
            exempt_factories: config.duty_exempt_factories.iter().cloned().collect(),
            duty_country: CodeNormalizer::from_config(config).country(config.duty_country.as_str()),
        }
    }

    /// 計算每單位關稅（必定 ≥ 0）
    pub fn compute(
        &self,
        sku: &SkuCode,
        factory: &FactoryCode,
        freight_cost: Decimal,
        country: &CountryCode,
        customs_required: bool,
    ) -> Decimal {
        self.compute_traced(sku, factory, freight_cost, country, customs_required)
            .duty
    }

    /// 計算每單位關稅並回傳明細
    pub fn compute_traced(
        &self,
        sku: &SkuCode,
        factory: &FactoryCode,
        freight_cost: Decimal,
        country: &CountryCode,
        customs_required: bool,
    ) -> DutyBreakdown {
        if !customs_required {
            return DutyBreakdown::gated(DutyGate::NotRequired);
        }
        if self.exempt_factories.contains(factory) {
            return DutyBreakdown::gated(DutyGate::ExemptFactory);
        }
        if country != &self.duty_country {
            return DutyBreakdown::gated(DutyGate::NonDutyCountry);
        }

        let key = (sku.clone(), factory.clone());
        let rm_price = self.lookup(&self.rm_prices, &key, "平均原料價格");
        let overhead = self.lookup(&self.overheads, &key, "工廠間接費用");

        let levied = rm_price
            .checked_add(freight_cost)
            .and_then(|sum| sum.checked_add(overhead))
            .and_then(|base| {
                Decimal::ONE
                    .checked_add(self.markup_pct)
                    .and_then(|factor| base.checked_mul(factor))
                    .map(|with_markup| (base, with_markup))
            })
            .and_then(|(base, with_markup)| {
                with_markup
                    .checked_mul(self.duty_pct)
                    .map(|duty| (base, with_markup, duty))
            });

        match levied {
            Some((base, with_markup, duty)) => DutyBreakdown {
                gate: DutyGate::Levied,
                base,
                with_markup,
                duty: duty.round_dp(DUTY_DECIMAL_PLACES).max(Decimal::ZERO),
            },
            None => {
                tracing::warn!(
                    "關稅計算溢位 (SKU {}, 工廠 {}, 運費 {})，以 0 計算",
                    sku,
                    factory,
                    freight_cost
                );
                DutyBreakdown::gated(DutyGate::Overflowed)
            }
        }
    }

    fn lookup(
        &self,
        table: &HashMap<(SkuCode, FactoryCode), Decimal>,
        key: &(SkuCode, FactoryCode),
        label: &str,
    ) -> Decimal {
        match table.get(key) {
            Some(value) => *value,
            None => {
                tracing::debug!("{} 缺值 (SKU {}, 工廠 {})，以 0 計算", label, key.0, key.1);
                Decimal::ZERO
            }
        }
    }

    pub fn markup_pct(&self) -> Decimal {
        self.markup_pct
    }

    pub fn duty_pct(&self) -> Decimal {
        self.duty_pct
    }
}
