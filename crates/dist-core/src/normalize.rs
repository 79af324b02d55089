//! 代碼正規化
//!
//! 運費索引與成本解析必須共用同一個正規化器，否則鍵值會對不上

use std::collections::HashMap;

use crate::codes::{CountryCode, FactoryCode, WarehouseCode};
use crate::config::DistributionConfig;

/// 代碼正規化器（工廠 → 倉庫、目的地名稱 → 國家代碼）
#[derive(Debug, Clone)]
pub struct CodeNormalizer {
    factory_aliases: HashMap<String, WarehouseCode>,
    country_aliases: HashMap<String, CountryCode>,
    factory_countries: HashMap<FactoryCode, CountryCode>,
    warehouse_countries: HashMap<WarehouseCode, CountryCode>,
}

impl CodeNormalizer {
    /// 從配置建立正規化器
    pub fn from_config(config: &DistributionConfig) -> Self {
        let factory_aliases = config
            .factory_aliases
            .iter()
            .map(|(alias, wh)| (alias.trim().to_uppercase(), wh.clone()))
            .collect();

        let country_aliases = config
            .country_aliases
            .iter()
            .map(|(alias, country)| (alias.trim().to_lowercase(), country.clone()))
            .collect();

        let mut normalizer = Self {
            factory_aliases,
            country_aliases,
            factory_countries: HashMap::new(),
            warehouse_countries: HashMap::new(),
        };

        // 配置中的國家也可能寫成名稱，一律轉成標準代碼
        normalizer.factory_countries = config
            .factory_countries
            .iter()
            .map(|(f, c)| (f.clone(), normalizer.country(c.as_str())))
            .collect();
        normalizer.warehouse_countries = config
            .warehouses
            .iter()
            .map(|site| (site.code.clone(), normalizer.country(site.country.as_str())))
            .collect();

        normalizer
    }

    /// 起運工廠代碼 → 倉庫代碼
    ///
    /// 別名表優先；否則三碼英文工廠代碼加上 `M`；其餘原樣保留
    pub fn origin_warehouse(&self, origin: &str) -> WarehouseCode {
        let code = origin.trim().to_uppercase();

        if let Some(wh) = self.factory_aliases.get(&code) {
            return wh.clone();
        }

        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            return WarehouseCode::new(format!("{code}M"));
        }

        WarehouseCode::new(code)
    }

    /// 目的地名稱 → 國家代碼
    pub fn country(&self, destination: &str) -> CountryCode {
        let key = destination.trim().to_lowercase();
        self.country_aliases
            .get(&key)
            .cloned()
            .unwrap_or_else(|| CountryCode::new(destination))
    }

    /// 工廠實體所在國家
    pub fn factory_country(&self, factory: &FactoryCode) -> Option<CountryCode> {
        if let Some(country) = self.factory_countries.get(factory) {
            return Some(country.clone());
        }

        let warehouse = self.origin_warehouse(factory.as_str());
        self.warehouse_countries.get(&warehouse).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WarehouseSite;
    use rstest::rstest;

    fn normalizer() -> CodeNormalizer {
        let config = DistributionConfig::default().with_factory_alias("AUCKLAND", "AKLM");
        CodeNormalizer::from_config(&config)
    }

    #[rstest]
    #[case("AKL", "AKLM")]
    #[case(" syd ", "SYDM")]
    #[case("Auckland", "AKLM")]
    #[case("AKLM", "AKLM")]
    #[case("F1", "F1")]
    fn test_origin_warehouse(#[case] origin: &str, #[case] expected: &str) {
        assert_eq!(normalizer().origin_warehouse(origin), WarehouseCode::new(expected));
    }

    #[rstest]
    #[case("New Zealand", "NZL")]
    #[case("  AUSTRALIA", "AUS")]
    #[case("ph", "PHL")]
    #[case("c1", "C1")]
    fn test_country(#[case] destination: &str, #[case] expected: &str) {
        assert_eq!(normalizer().country(destination), CountryCode::new(expected));
    }

    #[test]
    fn test_factory_country_falls_back_to_site() {
        let mut config = DistributionConfig::default();
        config.factory_countries.clear();
        let normalizer = CodeNormalizer::from_config(&config);

        assert_eq!(
            normalizer.factory_country(&FactoryCode::new("MNL")),
            Some(CountryCode::new("PHL"))
        );
        assert_eq!(normalizer.factory_country(&FactoryCode::new("ZZZ")), None);
    }

    #[test]
    fn test_configured_country_names_are_normalized() {
        let config = DistributionConfig::default()
            .with_warehouses(vec![WarehouseSite::new("MNLM", "MNL", "Philippines")])
            .with_factory_country("AKL", "New Zealand");
        let normalizer = CodeNormalizer::from_config(&config);

        assert_eq!(
            normalizer.factory_country(&FactoryCode::new("AKL")),
            Some(CountryCode::new("NZL"))
        );

        let mut config = config;
        config.factory_countries.remove(&FactoryCode::new("MNL"));
        let normalizer = CodeNormalizer::from_config(&config);
        assert_eq!(
            normalizer.factory_country(&FactoryCode::new("MNL")),
            Some(CountryCode::new("PHL"))
        );
    }
}
