//! 計劃月份與計劃時界

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::DistError;

/// 計劃月份（以當月第一天表示，格式 `YYYY-MM`）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlanMonth(NaiveDate);

impl PlanMonth {
    /// 創建計劃月份
    pub fn new(year: i32, month: u32) -> crate::Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self)
            .ok_or_else(|| DistError::InvalidMonth(format!("{year}-{month:02}")))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// 當月第一天
    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    /// 往後推算 n 個月
    pub fn plus_months(&self, n: u32) -> Option<Self> {
        self.0.checked_add_months(Months::new(n)).map(Self)
    }
}

impl FromStr for PlanMonth {
    type Err = DistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d")
            .map(Self)
            .map_err(|_| DistError::InvalidMonth(trimmed.to_string()))
    }
}

impl TryFrom<String> for PlanMonth {
    type Error = DistError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PlanMonth> for String {
    fn from(month: PlanMonth) -> Self {
        month.to_string()
    }
}

impl fmt::Display for PlanMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m"))
    }
}

/// 月份選擇器（限制表中的「All」展開到整個計劃時界）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MonthSelector {
    All,
    Month(PlanMonth),
}

impl TryFrom<String> for MonthSelector {
    type Error = DistError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().eq_ignore_ascii_case("all") {
            Ok(MonthSelector::All)
        } else {
            value.parse().map(MonthSelector::Month)
        }
    }
}

impl From<MonthSelector> for String {
    fn from(selector: MonthSelector) -> Self {
        match selector {
            MonthSelector::All => "All".to_string(),
            MonthSelector::Month(month) => month.to_string(),
        }
    }
}

/// 計劃時界
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanningHorizon {
    months: Vec<PlanMonth>,
}

impl PlanningHorizon {
    /// 從起始月份連續展開 `count` 個月
    pub fn new(start: PlanMonth, count: u32) -> Self {
        let months = (0..count).filter_map(|i| start.plus_months(i)).collect();
        Self { months }
    }

    pub fn months(&self) -> &[PlanMonth] {
        &self.months
    }

    pub fn contains(&self, month: PlanMonth) -> bool {
        self.months.contains(&month)
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// 展開月份選擇器
    pub fn expand(&self, selector: MonthSelector) -> Vec<PlanMonth> {
        match selector {
            MonthSelector::All => self.months.clone(),
            MonthSelector::Month(month) => vec![month],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display_month() {
        let month: PlanMonth = "2025-03".parse().unwrap();
        assert_eq!(month.year(), 2025);
        assert_eq!(month.month(), 3);
        assert_eq!(month.to_string(), "2025-03");
    }

    #[test]
    fn test_invalid_month_rejected() {
        assert!("2025-13".parse::<PlanMonth>().is_err());
        assert!("March".parse::<PlanMonth>().is_err());
    }

    #[test]
    fn test_horizon_crosses_year_boundary() {
        let start = PlanMonth::new(2025, 11).unwrap();
        let horizon = PlanningHorizon::new(start, 12);

        assert_eq!(horizon.len(), 12);
        assert_eq!(horizon.months()[0].to_string(), "2025-11");
        assert_eq!(horizon.months()[2].to_string(), "2026-01");
        assert_eq!(horizon.months()[11].to_string(), "2026-10");
    }

    #[test]
    fn test_expand_all_selector() {
        let horizon = PlanningHorizon::new(PlanMonth::new(2025, 1).unwrap(), 12);

        assert_eq!(horizon.expand(MonthSelector::All).len(), 12);

        let march = PlanMonth::new(2025, 3).unwrap();
        assert_eq!(horizon.expand(MonthSelector::Month(march)), vec![march]);
    }

    #[test]
    fn test_month_selector_from_string() {
        let all = MonthSelector::try_from("ALL".to_string()).unwrap();
        assert_eq!(all, MonthSelector::All);

        let month = MonthSelector::try_from("2025-06".to_string()).unwrap();
        assert_eq!(month, MonthSelector::Month(PlanMonth::new(2025, 6).unwrap()));
    }
}
