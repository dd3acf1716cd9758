use std::fmt;

/// The catalog is missing one or more mandatory columns. Fatal for engine construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    pub missing: Vec<String>,
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "catalog missing mandatory columns: {}",
            self.missing.join(", ")
        )
    }
}

impl std::error::Error for SchemaError {}

/// A categorical profile value that could not be parsed.
///
/// Recovered locally: the lenient parsers log this and substitute `fallback`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidProfileValue {
    pub field: &'static str,
    pub value: String,
    pub fallback: &'static str,
}

impl fmt::Display for InvalidProfileValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid {} value {:?} (falling back to {})",
            self.field, self.value, self.fallback
        )
    }
}

impl std::error::Error for InvalidProfileValue {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_lists_every_missing_column() {
        let err = SchemaError {
            missing: vec!["plan".to_string(), "cagr_3y".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "catalog missing mandatory columns: plan, cagr_3y"
        );
    }

    #[test]
    fn schema_error_survives_anyhow_downcast() {
        let err = anyhow::Error::new(SchemaError {
            missing: vec!["plan".to_string()],
        });
        let schema = err.downcast_ref::<SchemaError>().unwrap();
        assert_eq!(schema.missing, vec!["plan".to_string()]);
    }
}
