//! 運費索引
//!
//! 載入原始運費記錄，編譯成三層查詢結構：精確運費、工廠-目的國平均、目的國平均（加上全域上限）。
//! 建立後不可變。

use dist_core::{
    CodeNormalizer, CostKey, CountryCode, LaneKey, RawFreightRecord, SkuCode, WarehouseCode,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

/// 每單位運費保留的小數位數
pub const COST_DECIMAL_PLACES: u32 = 4;

/// 記錄被拒絕的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// 欄位缺值、空白或為缺值字串
    Missing(&'static str),
    /// 數值無法解析
    Unparseable(&'static str),
    /// 數值不是正數
    NonPositive(&'static str),
}

/// 載入統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub accepted: usize,
    pub rejected: usize,
    pub duplicates: usize,
}

/// 通過驗證的運費記錄
#[derive(Debug, Clone)]
struct ValidFreight {
    sku: SkuCode,
    warehouse: WarehouseCode,
    country: CountryCode,
    cost: Decimal,
}

/// 運費索引
#[derive(Debug, Clone, Default)]
pub struct FreightRateIndex {
    exact: HashMap<CostKey, Decimal>,
    lane_avg: HashMap<LaneKey, Decimal>,
    destination_avg: HashMap<CountryCode, Decimal>,
    global_ceiling: Decimal,
    stats: LoadStats,
}

impl FreightRateIndex {
    /// 空索引（無任何運費資料）
    pub fn empty() -> Self {
        Self::default()
    }

    /// 從原始記錄建立索引
    ///
    /// 無效記錄直接丟棄；沒有可用資料時回傳空索引而非錯誤
    pub fn build(
        records: &[RawFreightRecord],
        normalizer: &CodeNormalizer,
        missing_sentinel: &str,
    ) -> Self {
        let mut exact: HashMap<CostKey, Decimal> = HashMap::new();
        let mut lane_buckets: HashMap<LaneKey, Vec<Decimal>> = HashMap::new();
        let mut destination_buckets: HashMap<CountryCode, Vec<Decimal>> = HashMap::new();
        let mut stats = LoadStats::default();

        for (row, record) in records.iter().enumerate() {
            let valid = match validate_record(record, normalizer, missing_sentinel) {
                Ok(valid) => valid,
                Err(reason) => {
                    tracing::debug!("運費記錄第 {} 列被丟棄: {:?}", row, reason);
                    stats.rejected += 1;
                    continue;
                }
            };

            let key = CostKey::new(valid.country.clone(), valid.warehouse.clone(), valid.sku);
            if exact
                .insert(key, valid.cost.round_dp(COST_DECIMAL_PLACES))
                .is_some()
            {
                tracing::debug!("運費記錄第 {} 列覆寫了重複的鍵", row);
                stats.duplicates += 1;
            }

            lane_buckets
                .entry(LaneKey::new(valid.warehouse, valid.country.clone()))
                .or_default()
                .push(valid.cost);
            destination_buckets
                .entry(valid.country)
                .or_default()
                .push(valid.cost);

            stats.accepted += 1;
        }

        let lane_avg: HashMap<LaneKey, Decimal> = lane_buckets
            .into_iter()
            .map(|(key, costs)| (key, mean(&costs)))
            .collect();

        let destination_avg: HashMap<CountryCode, Decimal> = destination_buckets
            .into_iter()
            .map(|(country, costs)| (country, mean(&costs)))
            .collect();

        let global_ceiling = destination_avg
            .values()
            .copied()
            .max()
            .unwrap_or(Decimal::ZERO);

        tracing::info!(
            "運費索引建立完成：有效 {} 筆，丟棄 {} 筆，重複 {} 筆，目的國 {} 個，全域上限 {}",
            stats.accepted,
            stats.rejected,
            stats.duplicates,
            destination_avg.len(),
            global_ceiling
        );

        Self {
            exact,
            lane_avg,
            destination_avg,
            global_ceiling,
            stats,
        }
    }

    /// 精確運費
    pub fn exact_cost(&self, key: &CostKey) -> Option<Decimal> {
        self.exact.get(key).copied()
    }

    /// 工廠（起運倉庫）-目的國平均
    pub fn lane_average(&self, key: &LaneKey) -> Option<Decimal> {
        self.lane_avg.get(key).copied()
    }

    /// 目的國平均
    pub fn destination_average(&self, country: &CountryCode) -> Option<Decimal> {
        self.destination_avg.get(country).copied()
    }

    /// 全域上限（所有目的國平均的最大值；無資料時為 0）
    pub fn global_ceiling(&self) -> Decimal {
        self.global_ceiling
    }

    pub fn stats(&self) -> LoadStats {
        self.stats
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }

    pub fn len(&self) -> usize {
        self.exact.len()
    }
}

/// 未加權算術平均，四捨五入到 4 位小數
///
/// 總和溢位時改為逐項先除以筆數再加總，結果不會超過最大值
fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    let count = Decimal::from(values.len());

    let average = match values
        .iter()
        .try_fold(Decimal::ZERO, |acc, value| acc.checked_add(*value))
    {
        Some(sum) => sum / count,
        None => {
            tracing::debug!("運費加總溢位，改以逐項平均計算");
            values
                .iter()
                .try_fold(Decimal::ZERO, |acc, value| acc.checked_add(*value / count))
                .unwrap_or(Decimal::MAX)
        }
    };

    average.round_dp(COST_DECIMAL_PLACES)
}

fn validate_record(
    record: &RawFreightRecord,
    normalizer: &CodeNormalizer,
    missing_sentinel: &str,
) -> Result<ValidFreight, RejectReason> {
    let sku = required_text(record.sku_code.as_deref(), "sku_code", missing_sentinel)?;
    let origin = required_text(
        record.origin_factory.as_deref(),
        "origin_factory",
        missing_sentinel,
    )?;
    let destination = required_text(
        record.destination_country.as_deref(),
        "destination_country",
        missing_sentinel,
    )?;
    let load = parse_positive(
        record.truck_load_units.as_deref(),
        "truck_load_units",
        missing_sentinel,
    )?;
    let freight = parse_positive(
        record.truck_freight_amount.as_deref(),
        "truck_freight_amount",
        missing_sentinel,
    )?;

    let cost = freight
        .checked_div(load)
        .ok_or(RejectReason::Unparseable("truck_freight_amount"))?;

    Ok(ValidFreight {
        sku: SkuCode::new(sku),
        warehouse: normalizer.origin_warehouse(origin),
        country: normalizer.country(destination),
        cost,
    })
}

fn required_text<'a>(
    value: Option<&'a str>,
    field: &'static str,
    missing_sentinel: &str,
) -> Result<&'a str, RejectReason> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() && !text.eq_ignore_ascii_case(missing_sentinel) => Ok(text),
        _ => Err(RejectReason::Missing(field)),
    }
}

/// 解析正數（容許千分位逗號與科學記號）
fn parse_positive(
    value: Option<&str>,
    field: &'static str,
    missing_sentinel: &str,
) -> Result<Decimal, RejectReason> {
    let text = required_text(value, field, missing_sentinel)?.replace(',', "");

    let number = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| RejectReason::Unparseable(field))?;

    if number <= Decimal::ZERO {
        return Err(RejectReason::NonPositive(field));
    }

    Ok(number)
}
