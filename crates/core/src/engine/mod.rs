pub mod allocate;
pub mod classify;
pub mod explain;
pub mod filter;
pub mod score;

use crate::domain::contract::RecommendRequest;
use crate::domain::profile::UserProfile;
use crate::domain::recommendation::{
    AllocatedBucket, AllocationBreakdown, AllocationSummary, BucketFund, Recommendation,
    RecommendationResponse, StructuredRecommendation, UnallocatedBucket,
};
use crate::domain::scheme::{AssetClass, Plan, Scheme, SchemeRecord};
use crate::ingest::catalog::normalize_rows;
use crate::ingest::source::CatalogSource;
use crate::ingest::types::CatalogRow;
use allocate::Allocation;
use anyhow::ensure;
use score::{BucketSizes, RankedBuckets, ScoredScheme};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendOptions {
    /// Cap on the flattened list. The bucket sizes bound it from above, so the
    /// default equals a full equity plus debt selection.
    pub top_n: usize,
    pub min_aum_cr: f64,
    pub equity_funds: usize,
    pub debt_funds: usize,
    /// Debt bucket size when the allocation carries no equity.
    pub debt_funds_without_equity: usize,
    pub hybrid_funds: usize,
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self {
            top_n: 5,
            min_aum_cr: filter::DEFAULT_MIN_AUM_CR,
            equity_funds: 3,
            debt_funds: 2,
            debt_funds_without_equity: 3,
            hybrid_funds: 0,
        }
    }
}

impl RecommendOptions {
    /// Defaults overridden by `RECOMMEND_TOP_N` and `RECOMMEND_MIN_AUM_CR`.
    /// Unparseable values are ignored; out-of-range values are an error.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut out = Self::default();

        if let Ok(s) = std::env::var("RECOMMEND_TOP_N") {
            if let Ok(n) = s.parse::<usize>() {
                out.top_n = n;
            }
        }

        if let Ok(s) = std::env::var("RECOMMEND_MIN_AUM_CR") {
            if let Ok(n) = s.parse::<f64>() {
                out.min_aum_cr = n;
            }
        }

        out.validate()?;
        Ok(out)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.top_n > 0, "top_n must be positive");
        ensure!(
            self.min_aum_cr.is_finite() && self.min_aum_cr >= 0.0,
            "min_aum_cr must be a non-negative number (got {})",
            self.min_aum_cr
        );
        Ok(())
    }

    pub fn bucket_sizes(&self, allocation: &Allocation) -> BucketSizes {
        if allocation.has_equity() {
            BucketSizes {
                equity: self.equity_funds,
                debt: self.debt_funds,
                hybrid: self.hybrid_funds,
            }
        } else {
            BucketSizes {
                equity: 0,
                debt: self.debt_funds_without_equity,
                hybrid: self.hybrid_funds,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStats {
    pub total_schemes: usize,
    pub total_aum_cr: f64,
    pub avg_ter: f64,
    pub top_amc_schemes: usize,
    pub direct_plans: usize,
    pub by_asset_class: BTreeMap<AssetClass, usize>,
}

/// A classified catalog plus the per-request pipeline.
///
/// The catalog is labelled once at construction and read-only afterwards; every request
/// works on borrowed views, so one engine can serve concurrent requests without locking.
#[derive(Debug, Clone)]
pub struct Engine {
    catalog: Vec<Scheme>,
    by_code: HashMap<i64, usize>,
    options: RecommendOptions,
}

struct Ranked<'a> {
    profile: UserProfile,
    allocation: Allocation,
    buckets: RankedBuckets<'a>,
}

impl Engine {
    pub fn from_records(records: Vec<SchemeRecord>, options: RecommendOptions) -> Self {
        let catalog: Vec<Scheme> = records
            .into_iter()
            .map(|record| {
                let (asset_class, risk_grade) = classify::classify(&record);
                Scheme {
                    record,
                    asset_class,
                    risk_grade,
                }
            })
            .collect();

        let by_code = catalog
            .iter()
            .enumerate()
            .map(|(idx, s)| (s.record.scheme_code, idx))
            .collect();

        let engine = Self {
            catalog,
            by_code,
            options,
        };
        let stats = engine.stats();
        tracing::info!(
            schemes = stats.total_schemes,
            by_asset_class = ?stats.by_asset_class,
            "catalog classified"
        );
        engine
    }

    /// Fails with [`SchemaError`](crate::error::SchemaError) when mandatory columns are absent.
    pub fn from_rows(rows: &[CatalogRow], options: RecommendOptions) -> anyhow::Result<Self> {
        let (records, _report) = normalize_rows(rows)?;
        Ok(Self::from_records(records, options))
    }

    pub async fn load(
        source: &dyn CatalogSource,
        options: RecommendOptions,
    ) -> anyhow::Result<Self> {
        let rows = source.load_rows().await?;
        Self::from_rows(&rows, options)
    }

    pub fn catalog(&self) -> &[Scheme] {
        &self.catalog
    }

    pub fn options(&self) -> &RecommendOptions {
        &self.options
    }

    pub fn scheme(&self, scheme_code: i64) -> Option<&Scheme> {
        self.by_code.get(&scheme_code).map(|&idx| &self.catalog[idx])
    }

    pub fn stats(&self) -> CatalogStats {
        let mut by_asset_class: BTreeMap<AssetClass, usize> =
            AssetClass::ALL.iter().map(|c| (*c, 0)).collect();
        let mut total_aum_cr = 0.0;
        let mut total_ter = 0.0;
        let mut top_amc_schemes = 0;
        let mut direct_plans = 0;

        for s in &self.catalog {
            *by_asset_class.entry(s.asset_class).or_default() += 1;
            total_aum_cr += s.record.aum_cr;
            total_ter += s.record.estimated_ter;
            if explain::is_top_amc(&s.record.fund_house) {
                top_amc_schemes += 1;
            }
            if s.record.plan == Plan::Direct {
                direct_plans += 1;
            }
        }

        let total_schemes = self.catalog.len();
        CatalogStats {
            total_schemes,
            total_aum_cr,
            avg_ter: if total_schemes == 0 {
                0.0
            } else {
                total_ter / total_schemes as f64
            },
            top_amc_schemes,
            direct_plans,
            by_asset_class,
        }
    }

    fn rank(&self, request: RecommendRequest) -> anyhow::Result<Ranked<'_>> {
        let min_aum_cr = request.min_aum_cr.unwrap_or(self.options.min_aum_cr);
        ensure!(
            min_aum_cr.is_finite() && min_aum_cr >= 0.0,
            "min_aum_cr must be a non-negative number (got {min_aum_cr})"
        );

        let profile = request.profile.validate_and_into_profile()?;
        let allocation = allocate::allocate(&profile);
        let filtered = filter::hard_filter(&profile, &self.catalog, min_aum_cr);
        let scored: Vec<ScoredScheme<'_>> = score::score(&filtered);
        let buckets = score::select(&scored, self.options.bucket_sizes(&allocation));

        tracing::info!(
            user_id = %profile.user_id,
            equity_pct = allocation.equity_pct,
            filtered = filtered.len(),
            equity = buckets.equity.len(),
            debt = buckets.debt.len(),
            "recommendation ranked"
        );

        Ok(Ranked {
            profile,
            allocation,
            buckets,
        })
    }

    /// Per-bucket allocation with amounts. An empty equity bucket reports 0% equity.
    pub fn recommend_structured(
        &self,
        request: RecommendRequest,
    ) -> anyhow::Result<StructuredRecommendation> {
        let Ranked {
            profile,
            allocation,
            buckets,
        } = self.rank(request)?;

        let allocation = if buckets.equity.is_empty() {
            Allocation::ALL_DEBT
        } else {
            allocation
        };

        let total_amount = profile.annual_amount();
        let funds = |bucket: &[ScoredScheme<'_>]| -> Vec<BucketFund> {
            bucket.iter().map(|s| bucket_fund(s, &profile)).collect()
        };

        Ok(StructuredRecommendation {
            request_id: uuid::Uuid::new_v4(),
            user_id: profile.user_id.clone(),
            generated_at: chrono::Utc::now(),
            allocation: AllocationBreakdown {
                equity: AllocatedBucket {
                    percent: allocation.equity_pct,
                    amount: total_amount * allocation.equity_pct,
                    funds: funds(&buckets.equity),
                },
                debt: AllocatedBucket {
                    percent: allocation.debt_pct,
                    amount: total_amount * allocation.debt_pct,
                    funds: funds(&buckets.debt),
                },
                hybrid: UnallocatedBucket {
                    funds: funds(&buckets.hybrid),
                },
            },
            summary: AllocationSummary {
                total_amount,
                equity_percent: allocation.equity_pct,
                debt_percent: allocation.debt_pct,
            },
        })
    }

    /// Flat ranked list: equity bucket, then debt, then hybrid, truncated to `top_n`.
    pub fn recommend(&self, request: RecommendRequest) -> anyhow::Result<RecommendationResponse> {
        let top_n = request.top_n.unwrap_or(self.options.top_n);
        ensure!(top_n > 0, "top_n must be positive");

        let Ranked {
            profile, buckets, ..
        } = self.rank(request)?;

        let recommendations: Vec<Recommendation> = buckets
            .equity
            .iter()
            .chain(&buckets.debt)
            .chain(&buckets.hybrid)
            .take(top_n)
            .zip(1u32..)
            .map(|(s, rank)| recommendation(rank, s, &profile))
            .collect();

        if recommendations.is_empty() {
            tracing::info!(user_id = %profile.user_id, "no scheme passed the hard filter");
        }

        Ok(RecommendationResponse {
            request_id: uuid::Uuid::new_v4(),
            user_id: profile.user_id,
            generated_at: chrono::Utc::now(),
            recommendations,
        })
    }
}

fn bucket_fund(s: &ScoredScheme<'_>, profile: &UserProfile) -> BucketFund {
    let r = &s.scheme.record;
    BucketFund {
        scheme_code: r.scheme_code,
        scheme_name: r.scheme_name.clone(),
        fund_house: r.fund_house.clone(),
        aum_cr: r.aum_cr,
        estimated_ter: r.estimated_ter,
        cagr_3y: r.cagr_3y,
        score: s.score,
        score_normalized: s.score_normalized,
        reason: explain::explain(s.scheme, profile),
    }
}

fn recommendation(rank: u32, s: &ScoredScheme<'_>, profile: &UserProfile) -> Recommendation {
    let r = &s.scheme.record;
    Recommendation {
        rank,
        scheme_code: r.scheme_code,
        scheme_name: r.scheme_name.clone(),
        fund_house: r.fund_house.clone(),
        scheme_category: r.scheme_category.clone(),
        plan: r.plan,
        aum_cr: r.aum_cr,
        estimated_ter: r.estimated_ter,
        cagr_3y: r.cagr_3y,
        asset_class: s.scheme.asset_class,
        score: s.score_normalized,
        reason: explain::explain(s.scheme, profile),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contract::ProfileRequest;
    use serde_json::{json, Value};
    use std::collections::HashSet;

    fn rows(v: Value) -> Vec<CatalogRow> {
        serde_json::from_value(v).unwrap()
    }

    fn three_row_catalog() -> Vec<CatalogRow> {
        rows(json!([
            {
                "scheme_code": 101,
                "scheme_name": "ABC Bluechip Fund - Direct Growth",
                "fund_house": "ABC Mutual Fund",
                "scheme_category": "Equity Scheme - Large Cap Fund",
                "plan": "Direct",
                "estimated_ter": 0.5,
                "aum_cr": 2000.0,
                "cagr_3y": 0.14,
            },
            {
                "scheme_code": 202,
                "scheme_name": "ABC Liquid Fund - Direct Growth",
                "fund_house": "ABC Mutual Fund",
                "scheme_category": "Debt Scheme - Liquid Fund",
                "plan": "Direct",
                "estimated_ter": 0.2,
                "aum_cr": 5000.0,
                "cagr_3y": 0.065,
            },
            {
                "scheme_code": 303,
                "scheme_name": "ABC Gold ETF",
                "fund_house": "ABC Mutual Fund",
                "scheme_category": "Other Scheme - Gold ETF",
                "plan": "Regular",
                "estimated_ter": 0.5,
                "aum_cr": 3000.0,
                "cagr_3y": 0.18,
            },
        ]))
    }

    fn request(risk: &str, horizon: &str, goals: &[&str], experience: &str) -> RecommendRequest {
        RecommendRequest {
            profile: ProfileRequest {
                user_id: "user_001".to_string(),
                age: 30,
                annual_income: "10L".to_string(),
                monthly_sip: 5000,
                risk_tolerance: risk.to_string(),
                investment_horizon: horizon.to_string(),
                investment_goals: goals.iter().map(|g| g.to_string()).collect(),
                experience: experience.to_string(),
            },
            top_n: None,
            min_aum_cr: None,
        }
    }

    fn engine(rows: &[CatalogRow]) -> Engine {
        Engine::from_rows(rows, RecommendOptions::default()).unwrap()
    }

    #[test]
    fn engine_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
    }

    #[test]
    fn three_row_catalog_yields_two_recommendations() {
        let engine = engine(&three_row_catalog());
        assert_eq!(engine.scheme(303).unwrap().asset_class, AssetClass::Other);

        let resp = engine
            .recommend(request("Moderate", "10+yr", &["Wealth Growth"], "Intermediate"))
            .unwrap();
        let codes: Vec<i64> = resp.recommendations.iter().map(|r| r.scheme_code).collect();
        assert_eq!(codes, vec![101, 202]);
        assert_eq!(resp.recommendations[0].rank, 1);
        assert_eq!(resp.recommendations[0].asset_class, AssetClass::Equity);
        assert_eq!(resp.recommendations[1].rank, 2);
        assert_eq!(resp.recommendations[1].asset_class, AssetClass::Debt);
        assert!(resp.recommendations[1].reason.contains("Low expense ratio"));
    }

    #[test]
    fn structured_breakdown_carries_amounts() {
        let engine = engine(&three_row_catalog());
        let out = engine
            .recommend_structured(request("Moderate", "10+yr", &["Wealth Growth"], "Intermediate"))
            .unwrap();

        assert_eq!(out.fund_count(), 2);
        assert!((out.summary.total_amount - 60_000.0).abs() < 1e-9);
        assert!((out.allocation.equity.percent - 0.8).abs() < 1e-9);
        assert!((out.allocation.equity.amount - 48_000.0).abs() < 1e-6);
        assert!((out.allocation.debt.amount - 12_000.0).abs() < 1e-6);
        assert!(out.allocation.hybrid.funds.is_empty());
    }

    #[test]
    fn empty_equity_bucket_reports_all_debt() {
        let catalog: Vec<CatalogRow> = three_row_catalog()
            .into_iter()
            .filter(|r| r["scheme_code"] != json!(101))
            .collect();
        let engine = engine(&catalog);
        let out = engine
            .recommend_structured(request("High", "10+yr", &["Retirement"], "Expert"))
            .unwrap();
        assert_eq!(out.allocation.equity.percent, 0.0);
        assert_eq!(out.allocation.debt.percent, 1.0);
        assert_eq!(out.allocation.debt.funds.len(), 1);
    }

    #[test]
    fn emergency_without_liquid_funds_is_empty_response() {
        let catalog: Vec<CatalogRow> = three_row_catalog()
            .into_iter()
            .filter(|r| r["scheme_code"] != json!(202))
            .collect();
        let engine = engine(&catalog);

        let resp = engine
            .recommend(request("High", "10+yr", &["Emergency"], "Expert"))
            .unwrap();
        assert!(resp.recommendations.is_empty());

        let out = engine
            .recommend_structured(request("High", "10+yr", &["Emergency"], "Expert"))
            .unwrap();
        assert_eq!(out.fund_count(), 0);
    }

    #[test]
    fn short_horizon_never_recommends_equity() {
        let engine = engine(&three_row_catalog());
        let resp = engine
            .recommend(request("Very High", "1-3yr", &["Wealth Growth"], "Expert"))
            .unwrap();
        assert!(!resp.recommendations.is_empty());
        assert!(resp
            .recommendations
            .iter()
            .all(|r| r.asset_class != AssetClass::Equity));
    }

    #[test]
    fn ranks_are_unique_and_codes_distinct() {
        let mut catalog = three_row_catalog();
        for i in 0..6 {
            let mut row = catalog[0].clone();
            row.insert("scheme_code".to_string(), json!(1000 + i));
            row.insert("estimated_ter".to_string(), json!(0.3 + 0.1 * i as f64));
            catalog.push(row);
        }
        let engine = engine(&catalog);
        let resp = engine
            .recommend(request("Moderate", "10+yr", &["Wealth Growth"], "Expert"))
            .unwrap();

        assert_eq!(resp.recommendations.len(), 4);
        let ranks: Vec<u32> = resp.recommendations.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
        let codes: HashSet<i64> = resp.recommendations.iter().map(|r| r.scheme_code).collect();
        assert_eq!(codes.len(), 4);
    }

    #[test]
    fn top_n_and_min_aum_overrides() {
        let engine = engine(&three_row_catalog());

        let mut req = request("Moderate", "10+yr", &["Wealth Growth"], "Intermediate");
        req.top_n = Some(1);
        let resp = engine.recommend(req).unwrap();
        assert_eq!(resp.recommendations.len(), 1);

        let mut req = request("Moderate", "10+yr", &["Wealth Growth"], "Intermediate");
        req.min_aum_cr = Some(2500.0);
        let resp = engine.recommend(req).unwrap();
        let codes: Vec<i64> = resp.recommendations.iter().map(|r| r.scheme_code).collect();
        assert_eq!(codes, vec![202]);

        let mut req = request("Moderate", "10+yr", &["Wealth Growth"], "Intermediate");
        req.top_n = Some(0);
        assert!(engine.recommend(req).is_err());
    }

    #[test]
    fn default_top_n_is_not_truncated_by_buckets() {
        let mut catalog = three_row_catalog();
        for i in 0..6 {
            let mut equity = catalog[0].clone();
            equity.insert("scheme_code".to_string(), json!(1000 + i));
            catalog.push(equity);
            let mut debt = catalog[1].clone();
            debt.insert("scheme_code".to_string(), json!(2000 + i));
            catalog.push(debt);
        }
        let engine = engine(&catalog);
        let resp = engine
            .recommend(request("Moderate", "10+yr", &["Wealth Growth"], "Intermediate"))
            .unwrap();
        let opts = RecommendOptions::default();
        assert_eq!(opts.top_n, opts.equity_funds + opts.debt_funds);
        assert_eq!(resp.recommendations.len(), opts.top_n);
    }

    #[test]
    fn options_reject_bad_min_aum_and_zero_top_n() {
        assert!(RecommendOptions::default().validate().is_ok());

        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            let opts = RecommendOptions {
                min_aum_cr: bad,
                ..RecommendOptions::default()
            };
            assert!(opts.validate().is_err(), "accepted min_aum_cr {bad}");
        }

        let opts = RecommendOptions {
            top_n: 0,
            ..RecommendOptions::default()
        };
        assert!(opts.validate().is_err());
    }

    #[test]
    fn from_env_rejects_negative_min_aum() {
        std::env::set_var("RECOMMEND_MIN_AUM_CR", "-50");
        let result = RecommendOptions::from_env();
        std::env::remove_var("RECOMMEND_MIN_AUM_CR");
        assert!(result.is_err());
    }

    #[test]
    fn bad_ter_rows_do_not_erase_cost_ordering() {
        let catalog = rows(json!([
            {
                "scheme_code": 1,
                "scheme_name": "Costly Liquid Fund",
                "fund_house": "X",
                "scheme_category": "Debt Scheme - Liquid Fund",
                "plan": "Direct",
                "estimated_ter": 0.9,
                "aum_cr": 1000.0,
                "cagr_3y": 0.06,
            },
            {
                "scheme_code": 2,
                "scheme_name": "Cheap Liquid Fund",
                "fund_house": "X",
                "scheme_category": "Debt Scheme - Liquid Fund",
                "plan": "Direct",
                "estimated_ter": 0.1,
                "aum_cr": 1000.0,
                "cagr_3y": 0.06,
            },
            {
                "scheme_code": 3,
                "scheme_name": "Broken Liquid Fund",
                "fund_house": "X",
                "scheme_category": "Debt Scheme - Liquid Fund",
                "plan": "Direct",
                "nav": -5.0,
                "estimated_ter": -1e-9,
                "aum_cr": 1000.0,
                "cagr_3y": 0.06,
            },
        ]));
        let engine = engine(&catalog);
        let broken = &engine.scheme(3).unwrap().record;
        assert_eq!(broken.estimated_ter, 1.0);
        assert_eq!(broken.nav, 100.0);

        let resp = engine
            .recommend(request("Low", "10+yr", &["Emergency"], "Intermediate"))
            .unwrap();
        assert!(resp.recommendations.iter().all(|r| r.score.is_finite()));
        assert_eq!(resp.recommendations[0].scheme_code, 2);
    }

    #[test]
    fn unknown_risk_tolerance_still_recommends() {
        let engine = engine(&three_row_catalog());
        let resp = engine
            .recommend(request("Reckless", "10+yr", &["Wealth Growth"], "Intermediate"))
            .unwrap();
        assert_eq!(resp.recommendations.len(), 2);
    }

    #[test]
    fn classification_is_stable_across_requests() {
        let engine = engine(&three_row_catalog());
        let before: Vec<_> = engine
            .catalog()
            .iter()
            .map(|s| (s.asset_class, s.risk_grade))
            .collect();
        for _ in 0..3 {
            engine
                .recommend(request("High", "3-5yr", &["Retirement"], "Beginner"))
                .unwrap();
        }
        let after: Vec<_> = engine
            .catalog()
            .iter()
            .map(|s| {
                assert_eq!(classify::classify(&s.record), (s.asset_class, s.risk_grade));
                (s.asset_class, s.risk_grade)
            })
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn stats_count_each_asset_class() {
        let engine = engine(&three_row_catalog());
        let stats = engine.stats();
        assert_eq!(stats.total_schemes, 3);
        assert_eq!(stats.by_asset_class[&AssetClass::Equity], 1);
        assert_eq!(stats.by_asset_class[&AssetClass::Debt], 1);
        assert_eq!(stats.by_asset_class[&AssetClass::Hybrid], 0);
        assert_eq!(stats.by_asset_class[&AssetClass::Other], 1);
        assert_eq!(stats.direct_plans, 2);
        assert!((stats.total_aum_cr - 10_000.0).abs() < 1e-9);
        assert!((stats.avg_ter - 0.4).abs() < 1e-9);
    }

    #[test]
    fn schema_error_aborts_construction() {
        let catalog = rows(json!([{ "scheme_code": 1, "scheme_name": "A" }]));
        let err = Engine::from_rows(&catalog, RecommendOptions::default()).unwrap_err();
        assert!(err.downcast_ref::<crate::error::SchemaError>().is_some());
    }
}
