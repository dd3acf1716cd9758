use crate::domain::profile::{
    parse_or_default, Experience, IncomeBracket, InvestmentGoal, InvestmentHorizon,
    RiskTolerance, UserProfile,
};
use anyhow::ensure;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Raw profile as received from a caller. Categorical fields are free text until validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRequest {
    pub user_id: String,
    pub age: u32,
    #[serde(default)]
    pub annual_income: String,
    pub monthly_sip: u64,
    #[serde(default)]
    pub risk_tolerance: String,
    #[serde(default)]
    pub investment_horizon: String,
    pub investment_goals: Vec<String>,
    #[serde(default)]
    pub experience: String,
}

/// A profile plus the optional per-request overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendRequest {
    #[serde(flatten)]
    pub profile: ProfileRequest,
    #[serde(default)]
    pub top_n: Option<usize>,
    #[serde(default)]
    pub min_aum_cr: Option<f64>,
}

impl ProfileRequest {
    /// Structural problems (empty id, zero SIP, no goals) are errors. Unrecognized categorical
    /// values are not: they fall back to their documented defaults.
    pub fn validate_and_into_profile(self) -> anyhow::Result<UserProfile> {
        let user_id = self.user_id.trim().to_string();
        ensure!(!user_id.is_empty(), "user_id must be non-empty");
        ensure!(
            self.monthly_sip > 0,
            "monthly_sip must be positive (user_id={user_id})"
        );

        let investment_goals: BTreeSet<InvestmentGoal> = self
            .investment_goals
            .iter()
            .map(|g| g.trim())
            .filter(|g| !g.is_empty())
            .map(InvestmentGoal::parse)
            .collect();
        ensure!(
            !investment_goals.is_empty(),
            "investment_goals must be non-empty (user_id={user_id})"
        );

        if !(18..=80).contains(&self.age) {
            tracing::debug!(%user_id, age = self.age, "age outside the expected 18..=80 range");
        }

        Ok(UserProfile {
            user_id,
            age: self.age,
            annual_income: parse_or_default::<IncomeBracket>(&self.annual_income),
            monthly_sip: self.monthly_sip,
            risk_tolerance: parse_or_default::<RiskTolerance>(&self.risk_tolerance),
            investment_horizon: parse_or_default::<InvestmentHorizon>(&self.investment_horizon),
            investment_goals,
            experience: parse_or_default::<Experience>(&self.experience),
        })
    }
}
