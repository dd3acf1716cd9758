use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One raw catalog row, keyed by column name.
pub type CatalogRow = Map<String, Value>;

/// Accepted on-disk shapes: a bare array of rows, or an object wrapping them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CatalogDocument {
    Rows(Vec<CatalogRow>),
    Wrapped { schemes: Vec<CatalogRow> },
}

impl CatalogDocument {
    pub fn into_rows(self) -> Vec<CatalogRow> {
        match self {
            CatalogDocument::Rows(rows) => rows,
            CatalogDocument::Wrapped { schemes } => schemes,
        }
    }
}

/// Numeric cell: numbers or numeric strings. `null`, blanks, and NaN count as absent.
pub fn cell_f64(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Integer cell. Accepts integral floats ("119551.0") as written by spreadsheet exports.
pub fn cell_i64(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && f.fract() == 0.0)
                    .map(|f| f as i64)
            })
        }
        _ => None,
    }
}

/// Text cell, trimmed. Empty strings count as absent.
pub fn cell_string(v: &Value) -> Option<String> {
    let s = match v {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}
