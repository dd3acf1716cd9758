//! Asset-class and risk-grade labelling.
//!
//! Both labels come from ordered keyword tables evaluated top to bottom; the first matching
//! rule wins. Order is significant because fund categories share vocabulary: "PSU Bond Plus
//! SDL Index" must be claimed by the debt tier before the equity tier sees "index", and a
//! "Gold ETF Fund of Fund" must be excluded before anything sees "fof" or "fund".

use crate::domain::scheme::{AssetClass, RiskGrade, SchemeRecord};

/// Which text a rule inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchScope {
    /// Lowercased scheme name only.
    Name,
    /// Lowercased "name category".
    Combined,
}

#[derive(Debug, Clone, Copy)]
pub struct AssetRule {
    pub tier: &'static str,
    pub scope: MatchScope,
    pub keywords: &'static [&'static str],
    pub label: AssetClass,
}

pub const ASSET_RULES: &[AssetRule] = &[
    AssetRule {
        tier: "exclusion",
        scope: MatchScope::Combined,
        keywords: &["gold", "silver", "commodity", "real estate", "reits"],
        label: AssetClass::Other,
    },
    AssetRule {
        tier: "debt_name",
        scope: MatchScope::Name,
        keywords: &["bond", "sdl", "g-sec", "g-security", "bharat bond"],
        label: AssetClass::Debt,
    },
    AssetRule {
        tier: "debt",
        scope: MatchScope::Combined,
        keywords: &[
            "liquid",
            "overnight",
            "corporate bond",
            "ultra short",
            "gilt",
            "bond index",
            "bond plus",
            "sdl",
            "target maturity",
            "money market",
            "floater",
            "credit risk",
            "banking",
            "psu bond",
            "short duration",
            "bharat bond",
            "fof",
        ],
        label: AssetClass::Debt,
    },
    AssetRule {
        tier: "hybrid",
        scope: MatchScope::Combined,
        keywords: &["arbitrage", "dynamic bond", "hybrid", "balanced"],
        label: AssetClass::Hybrid,
    },
    AssetRule {
        tier: "equity",
        scope: MatchScope::Combined,
        keywords: &[
            "large cap",
            "mid cap",
            "small cap",
            "flexi",
            "flexi cap",
            "sectoral",
            "thematic",
            "index",
            "growth",
            "dividend",
            "multi-cap",
            "multicap",
        ],
        label: AssetClass::Equity,
    },
];

pub const DEFAULT_ASSET_CLASS: AssetClass = AssetClass::Other;

#[derive(Debug, Clone, Copy)]
pub struct RiskRule {
    pub keywords: &'static [&'static str],
    pub grade: u8,
}

/// Evaluated against the lowercased category only.
pub const RISK_RULES: &[RiskRule] = &[
    RiskRule {
        keywords: &["liquid", "overnight"],
        grade: 1,
    },
    RiskRule {
        keywords: &["ultra short", "short duration", "money market"],
        grade: 2,
    },
    RiskRule {
        keywords: &["large cap", "flexi", "hybrid", "dynamic", "bond"],
        grade: 3,
    },
    RiskRule {
        keywords: &["mid cap", "small cap"],
        grade: 4,
    },
    RiskRule {
        keywords: &["sectoral", "thematic"],
        grade: 5,
    },
];

pub const DEFAULT_RISK_GRADE: u8 = 3;

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Index into [`ASSET_RULES`] of the rule that decides the label, if any.
pub fn matching_asset_rule(scheme_name: &str, scheme_category: &str) -> Option<usize> {
    let name = scheme_name.to_lowercase();
    let combined = format!("{name} {}", scheme_category.to_lowercase());

    ASSET_RULES.iter().position(|rule| {
        let text = match rule.scope {
            MatchScope::Name => name.as_str(),
            MatchScope::Combined => combined.as_str(),
        };
        contains_any(text, rule.keywords)
    })
}

pub fn asset_class(scheme_name: &str, scheme_category: &str) -> AssetClass {
    matching_asset_rule(scheme_name, scheme_category)
        .map(|idx| ASSET_RULES[idx].label)
        .unwrap_or(DEFAULT_ASSET_CLASS)
}

pub fn risk_grade(scheme_category: &str) -> RiskGrade {
    let category = scheme_category.to_lowercase();
    let grade = RISK_RULES
        .iter()
        .find(|rule| contains_any(&category, rule.keywords))
        .map(|rule| rule.grade)
        .unwrap_or(DEFAULT_RISK_GRADE);

    RiskGrade::new(grade).unwrap_or(RiskGrade::MIN)
}

/// Pure function of name and category.
pub fn classify(record: &SchemeRecord) -> (AssetClass, RiskGrade) {
    (
        asset_class(&record.scheme_name, &record.scheme_category),
        risk_grade(&record.scheme_category),
    )
}
