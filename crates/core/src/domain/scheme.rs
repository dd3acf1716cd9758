use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Plan {
    Direct,
    Regular,
}

impl Plan {
    /// Anything other than "direct" (case-insensitive) is a regular plan.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("direct") {
            Plan::Direct
        } else {
            Plan::Regular
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssetClass {
    Equity,
    Debt,
    Hybrid,
    Other,
}

impl AssetClass {
    pub const ALL: [AssetClass; 4] = [
        AssetClass::Equity,
        AssetClass::Debt,
        AssetClass::Hybrid,
        AssetClass::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Equity => "Equity",
            AssetClass::Debt => "Debt",
            AssetClass::Hybrid => "Hybrid",
            AssetClass::Other => "Other",
        }
    }
}

/// 1 (lowest) to 5 (highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct RiskGrade(u8);

impl RiskGrade {
    pub const MIN: RiskGrade = RiskGrade(1);
    pub const MAX: RiskGrade = RiskGrade(5);

    pub fn new(grade: u8) -> Option<Self> {
        (1..=5).contains(&grade).then_some(RiskGrade(grade))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for RiskGrade {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        RiskGrade::new(value).ok_or_else(|| format!("risk grade out of range: {value}"))
    }
}

impl From<RiskGrade> for u8 {
    fn from(value: RiskGrade) -> Self {
        value.0
    }
}

/// One normalized catalog row. Every optional input column has already been defaulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemeRecord {
    pub scheme_code: i64,
    pub scheme_name: String,
    pub fund_house: String,
    pub scheme_category: String,
    pub plan: Plan,
    pub nav: f64,
    pub aum_cr: f64,
    pub estimated_ter: f64,
    pub cagr_3y: f64,
    pub cagr_5y: f64,
    pub sharpe_1y_annualized: Option<f64>,
    pub min_sip: f64,
}

/// A catalog row together with the labels assigned once at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scheme {
    #[serde(flatten)]
    pub record: SchemeRecord,
    #[serde(rename = "Asset_Class")]
    pub asset_class: AssetClass,
    #[serde(rename = "Risk_Grade")]
    pub risk_grade: RiskGrade,
}

impl Scheme {
    pub fn category_lower(&self) -> String {
        self.record.scheme_category.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_grade_rejects_out_of_range() {
        assert!(RiskGrade::new(0).is_none());
        assert!(RiskGrade::new(6).is_none());
        assert_eq!(RiskGrade::new(3).map(RiskGrade::get), Some(3));
    }

    #[test]
    fn plan_parse_is_case_insensitive() {
        assert_eq!(Plan::parse("DIRECT"), Plan::Direct);
        assert_eq!(Plan::parse(" direct "), Plan::Direct);
        assert_eq!(Plan::parse("Regular"), Plan::Regular);
        assert_eq!(Plan::parse("growth"), Plan::Regular);
    }
}
