//! 代碼類型（SKU / 工廠 / 倉庫 / 國家）與複合鍵

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! code_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// 創建代碼（去除空白並轉大寫）
            pub fn new(code: impl AsRef<str>) -> Self {
                Self(code.as_ref().trim().to_uppercase())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl From<String> for $name {
            fn from(code: String) -> Self {
                Self::new(code)
            }
        }

        impl From<&str> for $name {
            fn from(code: &str) -> Self {
                Self::new(code)
            }
        }

        impl From<$name> for String {
            fn from(code: $name) -> Self {
                code.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

code_type!(
    /// 成品 SKU 代碼
    SkuCode
);
code_type!(
    /// 工廠（PLT）代碼
    FactoryCode
);
code_type!(
    /// 倉庫（WH）代碼
    WarehouseCode
);
code_type!(
    /// 標準國家代碼
    CountryCode
);

/// 精確運費查詢鍵：(目的國, 起運倉庫, SKU)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CostKey {
    pub country: CountryCode,
    pub warehouse: WarehouseCode,
    pub sku: SkuCode,
}

impl CostKey {
    pub fn new(country: CountryCode, warehouse: WarehouseCode, sku: SkuCode) -> Self {
        Self {
            country,
            warehouse,
            sku,
        }
    }
}

/// 航線鍵：(起運倉庫, 目的國)
///
/// 起運倉庫與起運工廠一一對應，因此工廠-目的國平均值以此為鍵
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LaneKey {
    pub warehouse: WarehouseCode,
    pub country: CountryCode,
}

impl LaneKey {
    pub fn new(warehouse: WarehouseCode, country: CountryCode) -> Self {
        Self { warehouse, country }
    }
}
