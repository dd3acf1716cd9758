use crate::domain::scheme::{Plan, SchemeRecord};
use crate::error::SchemaError;
use crate::ingest::types::{cell_f64, cell_i64, cell_string, CatalogRow};
use std::collections::{BTreeSet, HashSet};

/// Columns that must exist somewhere in the catalog.
pub const MANDATORY_COLUMNS: [&str; 6] = [
    "scheme_code",
    "scheme_name",
    "fund_house",
    "scheme_category",
    "plan",
    "cagr_3y",
];

/// A numeric field filled from the first source column whose value is in range,
/// otherwise from `default`. Out-of-range values count as absent.
#[derive(Debug, Clone, Copy)]
pub struct FieldDefault {
    pub field: &'static str,
    pub sources: &'static [&'static str],
    pub default: f64,
    pub accepts: fn(f64) -> bool,
}

fn positive(v: f64) -> bool {
    v > 0.0
}

fn non_negative(v: f64) -> bool {
    v >= 0.0
}

fn any_finite(_: f64) -> bool {
    true
}

const NAV: FieldDefault = FieldDefault {
    field: "nav",
    sources: &["nav", "latest_nav"],
    default: 100.0,
    accepts: positive,
};
const ESTIMATED_TER: FieldDefault = FieldDefault {
    field: "estimated_ter",
    sources: &["estimated_ter", "expense_ratio"],
    default: 1.0,
    accepts: positive,
};
const AUM_CR: FieldDefault = FieldDefault {
    field: "aum_cr",
    sources: &["aum_cr"],
    default: 100.0,
    accepts: non_negative,
};
const CAGR_5Y: FieldDefault = FieldDefault {
    field: "cagr_5y",
    sources: &["cagr_5y"],
    default: 0.0,
    accepts: any_finite,
};
const MIN_SIP: FieldDefault = FieldDefault {
    field: "min_sip",
    sources: &["min_sip"],
    default: 0.0,
    accepts: non_negative,
};

pub const FIELD_DEFAULTS: [FieldDefault; 5] = [NAV, ESTIMATED_TER, AUM_CR, CAGR_5Y, MIN_SIP];

impl FieldDefault {
    fn resolve(&self, row: &CatalogRow) -> f64 {
        self.sources
            .iter()
            .filter_map(|col| row.get(*col).and_then(cell_f64))
            .find(|v| (self.accepts)(*v))
            .unwrap_or(self.default)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub accepted: usize,
    pub dropped_incomplete: usize,
    pub dropped_duplicate: usize,
}

/// Fails with [`SchemaError`] when a mandatory column is absent from every row.
pub fn check_schema(rows: &[CatalogRow]) -> Result<(), SchemaError> {
    let present: HashSet<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();

    let missing: Vec<String> = MANDATORY_COLUMNS
        .iter()
        .filter(|col| !present.contains(*col))
        .map(|col| col.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(SchemaError { missing })
    }
}

/// Converts one raw row. `None` means the row cannot be scored and is dropped.
pub fn normalize_row(row: &CatalogRow) -> Option<SchemeRecord> {
    let scheme_code = row.get("scheme_code").and_then(cell_i64)?;
    let scheme_name = row.get("scheme_name").and_then(cell_string)?;
    let cagr_3y = row.get("cagr_3y").and_then(cell_f64)?;

    let text = |col: &str| row.get(col).and_then(cell_string).unwrap_or_default();

    Some(SchemeRecord {
        scheme_code,
        scheme_name,
        fund_house: text("fund_house"),
        scheme_category: text("scheme_category"),
        plan: Plan::parse(&text("plan")),
        nav: NAV.resolve(row),
        aum_cr: AUM_CR.resolve(row),
        estimated_ter: ESTIMATED_TER.resolve(row),
        cagr_3y,
        cagr_5y: CAGR_5Y.resolve(row),
        sharpe_1y_annualized: row.get("sharpe_1y_annualized").and_then(cell_f64),
        min_sip: MIN_SIP.resolve(row),
    })
}

/// Validates the schema and normalizes every row. The first row for a scheme code wins.
pub fn normalize_rows(rows: &[CatalogRow]) -> anyhow::Result<(Vec<SchemeRecord>, LoadReport)> {
    check_schema(rows)?;

    let mut report = LoadReport::default();
    let mut seen = BTreeSet::<i64>::new();
    let mut out = Vec::with_capacity(rows.len());

    for (idx, row) in rows.iter().enumerate() {
        let Some(record) = normalize_row(row) else {
            report.dropped_incomplete += 1;
            tracing::debug!(row = idx, "dropping catalog row missing code, name, or cagr_3y");
            continue;
        };

        if !seen.insert(record.scheme_code) {
            report.dropped_duplicate += 1;
            tracing::warn!(
                scheme_code = record.scheme_code,
                row = idx,
                "duplicate scheme_code; keeping first occurrence"
            );
            continue;
        }

        out.push(record);
    }

    report.accepted = out.len();
    tracing::info!(
        accepted = report.accepted,
        dropped_incomplete = report.dropped_incomplete,
        dropped_duplicate = report.dropped_duplicate,
        "catalog loaded"
    );

    Ok((out, report))
}
