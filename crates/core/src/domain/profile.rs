use crate::error::InvalidProfileValue;
use std::collections::BTreeSet;
use std::str::FromStr;

fn normalize(s: &str) -> String {
    s.trim()
        .to_ascii_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses `raw`, substituting `T::default()` (and logging) when the value is not recognized.
pub fn parse_or_default<T>(raw: &str) -> T
where
    T: FromStr<Err = InvalidProfileValue> + Default,
{
    match raw.parse::<T>() {
        Ok(v) => v,
        Err(err) => {
            tracing::warn!(
                field = err.field,
                value = %err.value,
                fallback = err.fallback,
                "unrecognized profile value; using default"
            );
            T::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum RiskTolerance {
    Low,
    #[default]
    Moderate,
    High,
    VeryHigh,
}

impl FromStr for RiskTolerance {
    type Err = InvalidProfileValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "low" => Ok(RiskTolerance::Low),
            "moderate" | "medium" => Ok(RiskTolerance::Moderate),
            "high" => Ok(RiskTolerance::High),
            "very high" | "veryhigh" => Ok(RiskTolerance::VeryHigh),
            _ => Err(InvalidProfileValue {
                field: "risk_tolerance",
                value: s.to_string(),
                fallback: "Moderate",
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum InvestmentHorizon {
    UnderOneYear,
    OneToThreeYears,
    ThreeToFiveYears,
    FiveToTenYears,
    TenPlusYears,
    /// Unknown or missing horizon; treated like a 5+ year horizon.
    #[default]
    Unspecified,
}

impl InvestmentHorizon {
    pub fn is_under_three_years(self) -> bool {
        matches!(
            self,
            InvestmentHorizon::UnderOneYear | InvestmentHorizon::OneToThreeYears
        )
    }
}

impl FromStr for InvestmentHorizon {
    type Err = InvalidProfileValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let compact = compact
            .trim_end_matches("years")
            .trim_end_matches("year")
            .trim_end_matches("yrs")
            .trim_end_matches("yr");

        match compact {
            "<1" | "0-1" | "lessthan1" => Ok(InvestmentHorizon::UnderOneYear),
            "1-3" => Ok(InvestmentHorizon::OneToThreeYears),
            "3-5" => Ok(InvestmentHorizon::ThreeToFiveYears),
            "5-10" => Ok(InvestmentHorizon::FiveToTenYears),
            "10+" | ">10" => Ok(InvestmentHorizon::TenPlusYears),
            _ => Err(InvalidProfileValue {
                field: "investment_horizon",
                value: s.to_string(),
                fallback: "Unspecified",
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Experience {
    Beginner,
    #[default]
    Intermediate,
    Expert,
}

impl FromStr for Experience {
    type Err = InvalidProfileValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "beginner" => Ok(Experience::Beginner),
            "intermediate" => Ok(Experience::Intermediate),
            "expert" => Ok(Experience::Expert),
            _ => Err(InvalidProfileValue {
                field: "experience",
                value: s.to_string(),
                fallback: "Intermediate",
            }),
        }
    }
}

/// Annual income in lakh brackets ("5L", "10L", "25L", "50L+").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum IncomeBracket {
    UpTo5L,
    #[default]
    UpTo10L,
    UpTo25L,
    Above50L,
}

impl FromStr for IncomeBracket {
    type Err = InvalidProfileValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "5L" => Ok(IncomeBracket::UpTo5L),
            "10L" => Ok(IncomeBracket::UpTo10L),
            "25L" => Ok(IncomeBracket::UpTo25L),
            "50L+" | "50L" => Ok(IncomeBracket::Above50L),
            _ => Err(InvalidProfileValue {
                field: "annual_income",
                value: s.to_string(),
                fallback: "10L",
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InvestmentGoal {
    Emergency,
    Retirement,
    WealthGrowth,
    ChildEducation,
    Other(String),
}

impl InvestmentGoal {
    /// Unknown tags are kept verbatim rather than rejected.
    pub fn parse(s: &str) -> Self {
        match normalize(s).as_str() {
            "emergency" => InvestmentGoal::Emergency,
            "retirement" => InvestmentGoal::Retirement,
            "wealth growth" => InvestmentGoal::WealthGrowth,
            "child edu" | "child education" => InvestmentGoal::ChildEducation,
            _ => InvestmentGoal::Other(s.trim().to_string()),
        }
    }
}

/// A validated recommendation request profile. Construct via
/// [`ProfileRequest::validate_and_into_profile`](crate::domain::contract::ProfileRequest::validate_and_into_profile).
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub user_id: String,
    pub age: u32,
    pub annual_income: IncomeBracket,
    pub monthly_sip: u64,
    pub risk_tolerance: RiskTolerance,
    pub investment_horizon: InvestmentHorizon,
    pub investment_goals: BTreeSet<InvestmentGoal>,
    pub experience: Experience,
}

impl UserProfile {
    pub fn has_goal(&self, goal: &InvestmentGoal) -> bool {
        self.investment_goals.contains(goal)
    }

    pub fn is_emergency(&self) -> bool {
        self.has_goal(&InvestmentGoal::Emergency)
    }

    /// Yearly commitment implied by the monthly SIP.
    pub fn annual_amount(&self) -> f64 {
        self.monthly_sip as f64 * 12.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_risk_tolerance_defaults_to_moderate() {
        let err = "Adventurous".parse::<RiskTolerance>().unwrap_err();
        assert_eq!(err.field, "risk_tolerance");
        assert_eq!(err.fallback, "Moderate");
        assert_eq!(
            parse_or_default::<RiskTolerance>("Adventurous"),
            RiskTolerance::Moderate
        );
    }

    #[test]
    fn risk_tolerance_is_ordinal() {
        assert!(RiskTolerance::Low < RiskTolerance::Moderate);
        assert!(RiskTolerance::High < RiskTolerance::VeryHigh);
        assert_eq!(
            "Very High".parse::<RiskTolerance>().unwrap(),
            RiskTolerance::VeryHigh
        );
        assert_eq!(
            "very_high".parse::<RiskTolerance>().unwrap(),
            RiskTolerance::VeryHigh
        );
    }

    #[test]
    fn parses_horizon_buckets() {
        let cases = [
            ("<1yr", InvestmentHorizon::UnderOneYear),
            ("1-3yr", InvestmentHorizon::OneToThreeYears),
            ("3-5yr", InvestmentHorizon::ThreeToFiveYears),
            ("5-10 yr", InvestmentHorizon::FiveToTenYears),
            ("10+yr", InvestmentHorizon::TenPlusYears),
            ("10+ years", InvestmentHorizon::TenPlusYears),
        ];
        for (raw, expected) in cases {
            assert_eq!(raw.parse::<InvestmentHorizon>().unwrap(), expected, "{raw}");
        }
        assert_eq!(
            parse_or_default::<InvestmentHorizon>("someday"),
            InvestmentHorizon::Unspecified
        );
    }

    #[test]
    fn under_three_years_covers_short_buckets_only() {
        assert!(InvestmentHorizon::UnderOneYear.is_under_three_years());
        assert!(InvestmentHorizon::OneToThreeYears.is_under_three_years());
        assert!(!InvestmentHorizon::ThreeToFiveYears.is_under_three_years());
        assert!(!InvestmentHorizon::Unspecified.is_under_three_years());
    }

    #[test]
    fn experience_and_income_fall_back() {
        assert_eq!(
            parse_or_default::<Experience>("guru"),
            Experience::Intermediate
        );
        assert_eq!(
            parse_or_default::<IncomeBracket>("1Cr"),
            IncomeBracket::UpTo10L
        );
        assert_eq!("50l+".parse::<IncomeBracket>().unwrap(), IncomeBracket::Above50L);
    }

    #[test]
    fn goal_tags_are_case_insensitive_and_keep_unknowns() {
        assert_eq!(InvestmentGoal::parse("EMERGENCY"), InvestmentGoal::Emergency);
        assert_eq!(
            InvestmentGoal::parse("Child Edu"),
            InvestmentGoal::ChildEducation
        );
        assert_eq!(
            InvestmentGoal::parse(" House "),
            InvestmentGoal::Other("House".to_string())
        );
    }
}
