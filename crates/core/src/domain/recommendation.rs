use crate::domain::scheme::{AssetClass, Plan};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One ranked output entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub rank: u32,
    pub scheme_code: i64,
    pub scheme_name: String,
    pub fund_house: String,
    pub scheme_category: String,
    pub plan: Plan,
    pub aum_cr: f64,
    pub estimated_ter: f64,
    pub cagr_3y: f64,
    #[serde(rename = "Asset_Class")]
    pub asset_class: AssetClass,
    /// Display score on a 0..=100 scale.
    pub score: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub request_id: Uuid,
    pub user_id: String,
    pub generated_at: DateTime<Utc>,
    pub recommendations: Vec<Recommendation>,
}

/// A fund entry inside an allocation bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketFund {
    pub scheme_code: i64,
    pub scheme_name: String,
    pub fund_house: String,
    pub aum_cr: f64,
    pub estimated_ter: f64,
    pub cagr_3y: f64,
    /// Within-bucket composite score (z-score scale); this is the ranking key.
    pub score: f64,
    /// Display score on a 0..=100 scale.
    pub score_normalized: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocatedBucket {
    pub percent: f64,
    pub amount: f64,
    pub funds: Vec<BucketFund>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UnallocatedBucket {
    pub funds: Vec<BucketFund>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationBreakdown {
    #[serde(rename = "Equity")]
    pub equity: AllocatedBucket,
    #[serde(rename = "Debt")]
    pub debt: AllocatedBucket,
    #[serde(rename = "Hybrid")]
    pub hybrid: UnallocatedBucket,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationSummary {
    pub total_amount: f64,
    pub equity_percent: f64,
    pub debt_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredRecommendation {
    pub request_id: Uuid,
    pub user_id: String,
    pub generated_at: DateTime<Utc>,
    pub allocation: AllocationBreakdown,
    pub summary: AllocationSummary,
}

impl StructuredRecommendation {
    pub fn fund_count(&self) -> usize {
        self.allocation.equity.funds.len()
            + self.allocation.debt.funds.len()
            + self.allocation.hybrid.funds.len()
    }
}
