//! 配送規劃配置模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::codes::{CountryCode, FactoryCode, WarehouseCode};
use crate::horizon::{PlanMonth, PlanningHorizon};
use crate::DistError;

/// 目的倉庫（實體位置與所屬工廠）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseSite {
    /// 倉庫代碼
    pub code: WarehouseCode,

    /// 同址工廠
    pub home_factory: FactoryCode,

    /// 倉庫所在國家
    pub country: CountryCode,
}

impl WarehouseSite {
    pub fn new(
        code: impl Into<WarehouseCode>,
        home_factory: impl Into<FactoryCode>,
        country: impl Into<CountryCode>,
    ) -> Self {
        Self {
            code: code.into(),
            home_factory: home_factory.into(),
            country: country.into(),
        }
    }
}

/// 結構上不允許的調撥（工廠 → 倉庫），該路線 maxQty 固定為 0
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedTransfer {
    pub factory: FactoryCode,
    pub warehouse: WarehouseCode,
}

/// 計劃時界配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HorizonConfig {
    /// 起始月份
    pub start: PlanMonth,

    /// 月數
    pub months: u32,
}

/// 配送規劃配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionConfig {
    /// 固定的目的倉庫
    pub warehouses: Vec<WarehouseSite>,

    /// 「未指派」虛擬倉庫/工廠代碼
    pub unassigned_code: String,

    /// 原始資料中表示缺值的字串
    pub missing_sentinel: String,

    /// 工廠代碼 → 倉庫代碼別名（優先於「三碼 + M」規則）
    pub factory_aliases: BTreeMap<String, WarehouseCode>,

    /// 目的地名稱 → 國家代碼別名（比對不分大小寫）
    pub country_aliases: BTreeMap<String, CountryCode>,

    /// 工廠所在國家
    pub factory_countries: BTreeMap<FactoryCode, CountryCode>,

    /// 免關稅工廠（肉品/禽類）
    pub duty_exempt_factories: Vec<FactoryCode>,

    /// 唯一課徵關稅的目的國
    pub duty_country: CountryCode,

    /// 預設最大數量（實質無上限）
    pub default_max_qty: Decimal,

    /// 不允許的調撥組合
    pub blocked_transfers: Vec<BlockedTransfer>,

    /// 計劃時界
    pub horizon: HorizonConfig,

    /// 是否以 rayon 並行展開 (SKU, 月份)
    pub parallel: bool,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        let country_aliases = [
            ("new zealand", "NZL"),
            ("nz", "NZL"),
            ("australia", "AUS"),
            ("au", "AUS"),
            ("philippines", "PHL"),
            ("ph", "PHL"),
        ]
        .into_iter()
        .map(|(name, code)| (name.to_string(), CountryCode::new(code)))
        .collect();

        let factory_countries = [("AKL", "NZL"), ("SYD", "AUS"), ("MNL", "PHL"), ("MPF", "NZL")]
            .into_iter()
            .map(|(factory, country)| (FactoryCode::new(factory), CountryCode::new(country)))
            .collect();

        Self {
            warehouses: vec![
                WarehouseSite::new("AKLM", "AKL", "NZL"),
                WarehouseSite::new("SYDM", "SYD", "AUS"),
                WarehouseSite::new("MNLM", "MNL", "PHL"),
            ],
            unassigned_code: "X".to_string(),
            missing_sentinel: "Missing".to_string(),
            factory_aliases: BTreeMap::new(),
            country_aliases,
            factory_countries,
            duty_exempt_factories: vec![FactoryCode::new("MPF")],
            duty_country: CountryCode::new("PHL"),
            default_max_qty: Decimal::from(10_000_000_000i64),
            blocked_transfers: vec![BlockedTransfer {
                factory: FactoryCode::new("MPF"),
                warehouse: WarehouseCode::new("SYDM"),
            }],
            horizon: HorizonConfig {
                start: PlanMonth::new(2025, 1).expect("固定月份必定有效"),
                months: 12,
            },
            parallel: true,
        }
    }
}

impl DistributionConfig {
    /// 從 JSON 字串載入配置
    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 從 JSON 檔案載入配置
    pub fn from_json_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// 建構器模式：設置目的倉庫
    pub fn with_warehouses(mut self, warehouses: Vec<WarehouseSite>) -> Self {
        self.warehouses = warehouses;
        self
    }

    /// 建構器模式：設置計劃時界
    pub fn with_horizon(mut self, start: PlanMonth, months: u32) -> Self {
        self.horizon = HorizonConfig { start, months };
        self
    }

    /// 建構器模式：設置課稅目的國
    pub fn with_duty_country(mut self, country: impl Into<CountryCode>) -> Self {
        self.duty_country = country.into();
        self
    }

    /// 建構器模式：設置免關稅工廠
    pub fn with_duty_exempt_factories(mut self, factories: Vec<FactoryCode>) -> Self {
        self.duty_exempt_factories = factories;
        self
    }

    /// 建構器模式：設置工廠所在國家
    pub fn with_factory_country(
        mut self,
        factory: impl Into<FactoryCode>,
        country: impl Into<CountryCode>,
    ) -> Self {
        self.factory_countries.insert(factory.into(), country.into());
        self
    }

    /// 建構器模式：添加工廠別名
    pub fn with_factory_alias(mut self, alias: &str, warehouse: impl Into<WarehouseCode>) -> Self {
        self.factory_aliases
            .insert(alias.trim().to_uppercase(), warehouse.into());
        self
    }

    /// 建構器模式：添加國家別名
    pub fn with_country_alias(mut self, alias: &str, country: impl Into<CountryCode>) -> Self {
        self.country_aliases
            .insert(alias.trim().to_lowercase(), country.into());
        self
    }

    /// 建構器模式：設置不允許的調撥
    pub fn with_blocked_transfers(mut self, blocked: Vec<BlockedTransfer>) -> Self {
        self.blocked_transfers = blocked;
        self
    }

    /// 建構器模式：設置是否並行
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// 檢查配置是否可用
    pub fn validate(&self) -> crate::Result<()> {
        if self.warehouses.is_empty() {
            return Err(DistError::InvalidConfig("未設定任何目的倉庫".to_string()));
        }

        if self.horizon.months == 0 {
            return Err(DistError::InvalidConfig("計劃時界月數必須大於 0".to_string()));
        }

        let mut seen = HashSet::new();
        for site in &self.warehouses {
            if site.code.as_str() == self.unassigned_code.trim().to_uppercase() {
                return Err(DistError::InvalidConfig(format!(
                    "倉庫代碼 {} 與未指派代碼衝突",
                    site.code
                )));
            }
            if !seen.insert(&site.code) {
                return Err(DistError::InvalidConfig(format!("重複的倉庫代碼: {}", site.code)));
            }
        }

        Ok(())
    }

    /// 計劃時界
    pub fn planning_horizon(&self) -> PlanningHorizon {
        PlanningHorizon::new(self.horizon.start, self.horizon.months)
    }

    /// 查找目的倉庫
    pub fn warehouse(&self, code: &WarehouseCode) -> Option<&WarehouseSite> {
        self.warehouses.iter().find(|site| &site.code == code)
    }

    /// 未指派代碼是否符合
    pub fn is_unassigned(&self, code: &str) -> bool {
        code.trim().eq_ignore_ascii_case(self.unassigned_code.trim())
    }

    /// 是否為免關稅工廠
    pub fn is_duty_exempt(&self, factory: &FactoryCode) -> bool {
        self.duty_exempt_factories.contains(factory)
    }

    /// 是否為不允許的調撥
    pub fn is_blocked_transfer(&self, factory: &FactoryCode, warehouse: &WarehouseCode) -> bool {
        self.blocked_transfers
            .iter()
            .any(|b| &b.factory == factory && &b.warehouse == warehouse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = DistributionConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.warehouses.len(), 3);
        assert_eq!(config.planning_horizon().len(), 12);
        assert_eq!(config.default_max_qty, Decimal::from(10_000_000_000i64));
    }

    #[test]
    fn test_config_builder() {
        let config = DistributionConfig::default()
            .with_duty_country("aus")
            .with_factory_alias("auckland", "AKLM")
            .with_country_alias("Aotearoa", "NZL")
            .with_parallel(false);

        assert_eq!(config.duty_country, CountryCode::new("AUS"));
        assert_eq!(
            config.factory_aliases.get("AUCKLAND"),
            Some(&WarehouseCode::new("AKLM"))
        );
        assert_eq!(
            config.country_aliases.get("aotearoa"),
            Some(&CountryCode::new("NZL"))
        );
        assert!(!config.parallel);
    }

    #[test]
    fn test_validate_rejects_duplicate_warehouse() {
        let config = DistributionConfig::default().with_warehouses(vec![
            WarehouseSite::new("AKLM", "AKL", "NZL"),
            WarehouseSite::new("aklm", "AKL", "NZL"),
        ]);

        assert!(matches!(config.validate(), Err(DistError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_unassigned_warehouse_code() {
        let config = DistributionConfig::default()
            .with_warehouses(vec![WarehouseSite::new("X", "AKL", "NZL")]);

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let json = r#"{
            "duty_country": "AUS",
            "horizon": { "start": "2026-04", "months": 6 }
        }"#;

        let config = DistributionConfig::from_json_str(json).unwrap();

        assert_eq!(config.duty_country, CountryCode::new("AUS"));
        assert_eq!(config.planning_horizon().len(), 6);
        assert_eq!(config.planning_horizon().months()[0].to_string(), "2026-04");
        assert_eq!(config.warehouses.len(), 3);
    }

    #[test]
    fn test_from_json_rejects_bad_month() {
        let json = r#"{ "horizon": { "start": "2026-13", "months": 6 } }"#;
        assert!(DistributionConfig::from_json_str(json).is_err());
    }

    #[test]
    fn test_blocked_transfer_lookup() {
        let config = DistributionConfig::default();

        assert!(config.is_blocked_transfer(&"MPF".into(), &"SYDM".into()));
        assert!(!config.is_blocked_transfer(&"MPF".into(), &"AKLM".into()));
    }
}
