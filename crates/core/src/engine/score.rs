//! Within-bucket scoring.
//!
//! Raw signals are z-scored per asset class: group statistics are aggregated in one pass,
//! then broadcast back to the rows. Scores are only comparable inside a bucket; the 0..=100
//! display value is a whole-set min-max rescale and never used for ranking.

use crate::domain::scheme::{AssetClass, Scheme, SchemeRecord};
use std::cmp::Ordering;
use std::collections::BTreeMap;

pub const EPSILON: f64 = 1e-9;

/// Volatility assumed when deriving a Sharpe-like proxy from 3y CAGR.
pub const PROXY_VOLATILITY: f64 = 0.15;

pub const WEIGHT_PERFORMANCE: f64 = 0.4;
pub const WEIGHT_COST: f64 = 0.4;
pub const WEIGHT_TRUST: f64 = 0.2;

/// Display value used when the rescale is undefined (single row, no spread, non-finite).
pub const NEUTRAL_DISPLAY_SCORE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Components {
    pub performance: f64,
    pub cost: f64,
    pub trust: f64,
}

impl Components {
    pub fn raw(record: &SchemeRecord) -> Self {
        let performance = record
            .sharpe_1y_annualized
            .unwrap_or(record.cagr_3y / PROXY_VOLATILITY);
        Self {
            performance,
            cost: 1.0 / (record.estimated_ter + EPSILON),
            trust: record.aum_cr.max(1.0).ln(),
        }
    }

    fn composite(&self) -> f64 {
        WEIGHT_PERFORMANCE * self.performance + WEIGHT_COST * self.cost + WEIGHT_TRUST * self.trust
    }
}

/// Welford accumulator for one signal.
#[derive(Debug, Clone, Copy, Default)]
struct Moments {
    n: usize,
    mean: f64,
    m2: f64,
}

impl Moments {
    fn push(&mut self, x: f64) {
        self.n += 1;
        let delta = x - self.mean;
        self.mean += delta / self.n as f64;
        self.m2 += delta * (x - self.mean);
    }

    /// Population standard deviation, floored at [`EPSILON`].
    fn stddev(&self) -> f64 {
        if self.n == 0 {
            return EPSILON;
        }
        let sd = (self.m2 / self.n as f64).sqrt();
        if sd.is_finite() && sd > EPSILON {
            sd
        } else {
            EPSILON
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupStats {
    pub count: usize,
    pub mean: Components,
    pub stddev: Components,
}

impl GroupStats {
    fn zscore(&self, raw: &Components) -> Components {
        let z = |x: f64, mean: f64, sd: f64| {
            let v = (x - mean) / sd;
            if v.is_finite() {
                v
            } else {
                0.0
            }
        };
        Components {
            performance: z(raw.performance, self.mean.performance, self.stddev.performance),
            cost: z(raw.cost, self.mean.cost, self.stddev.cost),
            trust: z(raw.trust, self.mean.trust, self.stddev.trust),
        }
    }
}

/// Aggregates per-class mean and standard deviation of each raw signal.
pub fn group_stats<'a, I>(rows: I) -> BTreeMap<AssetClass, GroupStats>
where
    I: IntoIterator<Item = (AssetClass, &'a Components)>,
{
    let mut acc = BTreeMap::<AssetClass, [Moments; 3]>::new();
    for (class, raw) in rows {
        let m = acc.entry(class).or_default();
        m[0].push(raw.performance);
        m[1].push(raw.cost);
        m[2].push(raw.trust);
    }

    acc.into_iter()
        .map(|(class, [p, c, t])| {
            let stats = GroupStats {
                count: p.n,
                mean: Components {
                    performance: p.mean,
                    cost: c.mean,
                    trust: t.mean,
                },
                stddev: Components {
                    performance: p.stddev(),
                    cost: c.stddev(),
                    trust: t.stddev(),
                },
            };
            (class, stats)
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
pub struct ScoredScheme<'a> {
    pub scheme: &'a Scheme,
    pub raw: Components,
    pub z: Components,
    /// Weighted z-score composite; the ranking key within a bucket.
    pub score: f64,
    /// 0..=100 across the whole scored set, for display.
    pub score_normalized: f64,
}

/// Scores the filtered subset, preserving input order.
pub fn score<'a>(filtered: &[&'a Scheme]) -> Vec<ScoredScheme<'a>> {
    let raws: Vec<Components> = filtered
        .iter()
        .map(|s| Components::raw(&s.record))
        .collect();
    let stats = group_stats(filtered.iter().map(|s| s.asset_class).zip(raws.iter()));

    let mut out: Vec<ScoredScheme<'a>> = filtered
        .iter()
        .zip(raws)
        .map(|(scheme, raw)| {
            let z = stats
                .get(&scheme.asset_class)
                .map(|g| g.zscore(&raw))
                .unwrap_or(Components {
                    performance: 0.0,
                    cost: 0.0,
                    trust: 0.0,
                });
            ScoredScheme {
                scheme,
                raw,
                z,
                score: z.composite(),
                score_normalized: NEUTRAL_DISPLAY_SCORE,
            }
        })
        .collect();

    rescale_for_display(&mut out);
    out
}

fn rescale_for_display(scored: &mut [ScoredScheme<'_>]) {
    let (min, max) = scored.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
        (lo.min(s.score), hi.max(s.score))
    });
    let span = max - min;
    if !span.is_finite() || span <= EPSILON {
        return;
    }

    for s in scored.iter_mut() {
        let v = (s.score - min) / span * 100.0;
        s.score_normalized = if v.is_finite() {
            v.clamp(0.0, 100.0)
        } else {
            NEUTRAL_DISPLAY_SCORE
        };
    }
}

/// Descending score, then ascending scheme code. A total order.
pub fn rank_order(a: &ScoredScheme<'_>, b: &ScoredScheme<'_>) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.scheme.record.scheme_code.cmp(&b.scheme.record.scheme_code))
}

/// The best `k` schemes of one class, best first.
pub fn top_k<'a>(
    scored: &[ScoredScheme<'a>],
    class: AssetClass,
    k: usize,
) -> Vec<ScoredScheme<'a>> {
    let mut bucket: Vec<ScoredScheme<'a>> = scored
        .iter()
        .filter(|s| s.scheme.asset_class == class)
        .copied()
        .collect();
    bucket.sort_by(rank_order);
    bucket.truncate(k);
    bucket
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketSizes {
    pub equity: usize,
    pub debt: usize,
    pub hybrid: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RankedBuckets<'a> {
    pub equity: Vec<ScoredScheme<'a>>,
    pub debt: Vec<ScoredScheme<'a>>,
    /// Tracked for completeness; empty unless a hybrid size is requested.
    pub hybrid: Vec<ScoredScheme<'a>>,
}

impl RankedBuckets<'_> {
    pub fn is_empty(&self) -> bool {
        self.equity.is_empty() && self.debt.is_empty() && self.hybrid.is_empty()
    }
}

pub fn select<'a>(scored: &[ScoredScheme<'a>], sizes: BucketSizes) -> RankedBuckets<'a> {
    RankedBuckets {
        equity: top_k(scored, AssetClass::Equity, sizes.equity),
        debt: top_k(scored, AssetClass::Debt, sizes.debt),
        hybrid: top_k(scored, AssetClass::Hybrid, sizes.hybrid),
    }
}
