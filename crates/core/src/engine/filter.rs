use crate::domain::profile::{Experience, InvestmentHorizon, UserProfile};
use crate::domain::scheme::{AssetClass, Scheme};
use std::collections::BTreeMap;

pub const DEFAULT_MIN_AUM_CR: f64 = 100.0;

const BEGINNER_EXCLUDED: [&str; 4] = ["sectoral", "thematic", "small cap", "small"];

/// The first constraint a scheme failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rejection {
    EmergencyRequiresLowRiskDebt,
    ShortHorizon,
    MediumHorizon,
    BeginnerComplexity,
    AumBelowMinimum,
    MinSipAboveBudget,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::EmergencyRequiresLowRiskDebt => "emergency_requires_low_risk_debt",
            Rejection::ShortHorizon => "short_horizon",
            Rejection::MediumHorizon => "medium_horizon",
            Rejection::BeginnerComplexity => "beginner_complexity",
            Rejection::AumBelowMinimum => "aum_below_minimum",
            Rejection::MinSipAboveBudget => "min_sip_above_budget",
        }
    }
}

fn goal_and_horizon(
    profile: &UserProfile,
    scheme: &Scheme,
    category: &str,
) -> Result<(), Rejection> {
    if profile.is_emergency() {
        let ok = scheme.asset_class == AssetClass::Debt && scheme.risk_grade.get() == 1;
        return if ok {
            Ok(())
        } else {
            Err(Rejection::EmergencyRequiresLowRiskDebt)
        };
    }

    let ok = match profile.investment_horizon {
        h if h.is_under_three_years() => match scheme.asset_class {
            AssetClass::Debt => true,
            AssetClass::Hybrid => category.contains("arbitrage"),
            AssetClass::Equity | AssetClass::Other => false,
        },
        InvestmentHorizon::ThreeToFiveYears => match scheme.asset_class {
            AssetClass::Debt | AssetClass::Hybrid => true,
            AssetClass::Equity => category.contains("large") || category.contains("flexi"),
            AssetClass::Other => false,
        },
        _ => true,
    };

    match (ok, profile.investment_horizon.is_under_three_years()) {
        (true, _) => Ok(()),
        (false, true) => Err(Rejection::ShortHorizon),
        (false, false) => Err(Rejection::MediumHorizon),
    }
}

/// Checks one scheme against every constraint in order.
pub fn admit(profile: &UserProfile, scheme: &Scheme, min_aum_cr: f64) -> Result<(), Rejection> {
    let category = scheme.category_lower();

    goal_and_horizon(profile, scheme, &category)?;

    if profile.experience == Experience::Beginner
        && BEGINNER_EXCLUDED.iter().any(|k| category.contains(k))
    {
        return Err(Rejection::BeginnerComplexity);
    }

    if scheme.record.aum_cr < min_aum_cr {
        return Err(Rejection::AumBelowMinimum);
    }

    if scheme.record.min_sip > profile.monthly_sip as f64 {
        return Err(Rejection::MinSipAboveBudget);
    }

    Ok(())
}

/// Returns the admissible schemes in catalog order. Never touches the catalog itself.
pub fn hard_filter<'a>(
    profile: &UserProfile,
    catalog: &'a [Scheme],
    min_aum_cr: f64,
) -> Vec<&'a Scheme> {
    let mut rejected = BTreeMap::<Rejection, usize>::new();
    let mut out = Vec::new();

    for scheme in catalog {
        match admit(profile, scheme, min_aum_cr) {
            Ok(()) => out.push(scheme),
            Err(reason) => *rejected.entry(reason).or_default() += 1,
        }
    }

    tracing::debug!(
        user_id = %profile.user_id,
        admitted = out.len(),
        rejected = ?rejected.iter().map(|(r, n)| (r.as_str(), *n)).collect::<Vec<_>>(),
        "hard filter applied"
    );

    out
}
