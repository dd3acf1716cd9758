pub mod domain;
pub mod engine;
pub mod error;
pub mod ingest;

pub use engine::{Engine, RecommendOptions};

pub mod config {
    use anyhow::Context;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub catalog_path: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                catalog_path: std::env::var("CATALOG_PATH").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        pub fn require_catalog_path(&self) -> anyhow::Result<&str> {
            self.catalog_path
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .context("CATALOG_PATH is required")
        }
    }
}
