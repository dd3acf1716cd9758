use crate::config::Settings;
use crate::ingest::types::{CatalogDocument, CatalogRow};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Where raw catalog rows come from. Time-series fetching and metric derivation happen
/// upstream; a source only hands over the already-flattened table.
#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    async fn load_rows(&self) -> Result<Vec<CatalogRow>>;
}

#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(settings.require_catalog_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl CatalogSource for JsonFileSource {
    fn source_name(&self) -> &'static str {
        "json_file"
    }

    async fn load_rows(&self) -> Result<Vec<CatalogRow>> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read catalog {}", self.path.display()))?;
        let doc = serde_json::from_str::<CatalogDocument>(&text).with_context(|| {
            format!(
                "catalog {} is not a JSON array of rows or {{\"schemes\": [...]}}",
                self.path.display()
            )
        })?;
        let rows = doc.into_rows();

        tracing::debug!(
            source = self.source_name(),
            path = %self.path.display(),
            rows = rows.len(),
            "catalog rows read"
        );
        Ok(rows)
    }
}
