use crate::domain::profile::{RiskTolerance, UserProfile};
use serde::{Deserialize, Serialize};

/// Equity/debt split as fractions. `equity_pct + debt_pct == 1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub equity_pct: f64,
    pub debt_pct: f64,
}

impl Allocation {
    pub const ALL_DEBT: Allocation = Allocation {
        equity_pct: 0.0,
        debt_pct: 1.0,
    };

    fn from_equity_percent(equity_percent: f64) -> Self {
        let equity_pct = equity_percent.clamp(0.0, 100.0) / 100.0;
        Self {
            equity_pct,
            debt_pct: 1.0 - equity_pct,
        }
    }

    /// Above 1% counts as an equity allocation for bucket selection.
    pub fn has_equity(&self) -> bool {
        self.equity_pct > 0.01
    }
}

/// Target split from the profile alone: `110 - age`, +10 for High/Very High tolerance,
/// -20 for Low. Short horizons and emergency goals force 0% equity.
pub fn allocate(profile: &UserProfile) -> Allocation {
    if profile.investment_horizon.is_under_three_years() || profile.is_emergency() {
        return Allocation::ALL_DEBT;
    }

    let mut equity = (110.0 - profile.age as f64).clamp(0.0, 100.0);
    match profile.risk_tolerance {
        RiskTolerance::High | RiskTolerance::VeryHigh => equity += 10.0,
        RiskTolerance::Low => equity -= 20.0,
        RiskTolerance::Moderate => {}
    }

    Allocation::from_equity_percent(equity)
}
