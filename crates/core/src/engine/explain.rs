use crate::domain::profile::{RiskTolerance, UserProfile};
use crate::domain::scheme::{AssetClass, Plan, Scheme, SchemeRecord};

pub const TOP_AMCS: [&str; 10] = [
    "SBI",
    "ICICI Prudential",
    "HDFC",
    "Nippon India",
    "Kotak Mahindra",
    "Aditya Birla Sun Life",
    "UTI",
    "Axis",
    "Mirae Asset",
    "DSP",
];

pub const FALLBACK_REASON: &str = "Good fundamental match";

const SEPARATOR: &str = " • ";

pub fn is_top_amc(fund_house: &str) -> bool {
    let house = fund_house.to_lowercase();
    TOP_AMCS.iter().any(|amc| house.contains(&amc.to_lowercase()))
}

/// Reason fragments in fixed priority order: size, cost, performance, AMC, plan.
pub fn reasons(record: &SchemeRecord) -> Vec<&'static str> {
    let mut out = Vec::with_capacity(5);

    if record.aum_cr >= 1000.0 {
        out.push("Large AUM");
    } else if record.aum_cr >= 100.0 {
        out.push("Healthy AUM");
    }

    if record.estimated_ter < 0.5 {
        out.push("Low expense ratio");
    } else if record.estimated_ter < 1.0 {
        out.push("Reasonable costs");
    }

    if record.cagr_3y > 0.15 {
        out.push("Strong 3Y returns");
    }

    if is_top_amc(&record.fund_house) {
        out.push("Top 10 AMC");
    }

    if record.plan == Plan::Direct {
        out.push("Direct Plan (lower fees)");
    }

    out
}

/// Fragment tying the scheme's asset class to the investor's risk appetite, if any.
pub fn profile_match(scheme: &Scheme, profile: &UserProfile) -> Option<&'static str> {
    match (profile.risk_tolerance, scheme.asset_class) {
        (RiskTolerance::Low, AssetClass::Debt) => Some("Low-risk profile match"),
        (RiskTolerance::High | RiskTolerance::VeryHigh, AssetClass::Equity) => {
            Some("High-growth match")
        }
        _ => None,
    }
}

/// Scheme fragments first, then the profile fragment.
pub fn explain(scheme: &Scheme, profile: &UserProfile) -> String {
    let mut fragments = reasons(&scheme.record);
    fragments.extend(profile_match(scheme, profile));
    if fragments.is_empty() {
        FALLBACK_REASON.to_string()
    } else {
        fragments.join(SEPARATOR)
    }
}
