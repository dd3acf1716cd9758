use anyhow::Context;
use clap::{Parser, Subcommand};
use fundmatch_core::ingest::source::JsonFileSource;
use fundmatch_core::{Engine, RecommendOptions};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod batch;

#[derive(Debug, Parser)]
#[command(name = "fundmatch_worker")]
struct Args {
    /// Scheme catalog (JSON rows). Defaults to CATALOG_PATH.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Recommend schemes for every profile in a request file.
    Recommend {
        /// One request, an array of requests, or {"users": [...]}.
        #[arg(long)]
        profiles: PathBuf,

        /// Emit per-bucket allocation instead of the flat ranked list.
        #[arg(long)]
        structured: bool,

        #[arg(long)]
        top_n: Option<usize>,

        #[arg(long)]
        min_aum_cr: Option<f64>,
    },
    /// Catalog statistics.
    Stats,
    /// Details for one scheme.
    Scheme {
        #[arg(long)]
        code: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = fundmatch_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let result = run(args, &settings).await;
    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %format!("{err:#}"), "worker run failed");
    }
    result
}

async fn run(args: Args, settings: &fundmatch_core::config::Settings) -> anyhow::Result<()> {
    let source = match args.catalog {
        Some(path) => JsonFileSource::new(path),
        None => JsonFileSource::from_settings(settings)?,
    };

    let mut options = RecommendOptions::from_env()?;
    if let Command::Recommend {
        top_n, min_aum_cr, ..
    } = &args.command
    {
        if let Some(n) = top_n {
            options.top_n = *n;
        }
        if let Some(v) = min_aum_cr {
            options.min_aum_cr = *v;
        }
    }
    options.validate()?;

    let engine = Engine::load(&source, options)
        .await
        .with_context(|| format!("failed to load catalog {}", source.path().display()))?;

    let output = match args.command {
        Command::Recommend {
            profiles,
            structured,
            ..
        } => {
            let requests = batch::read_requests(&profiles).await?;
            let shape = if structured {
                batch::OutputShape::Structured
            } else {
                batch::OutputShape::Flat
            };
            let results = batch::run(Arc::new(engine), requests, shape).await?;
            tracing::info!(batch_size = results.len(), "batch complete");
            serde_json::json!({
                "status": "success",
                "timestamp": chrono::Utc::now(),
                "batch_size": results.len(),
                "results": results,
            })
        }
        Command::Stats => serde_json::to_value(engine.stats())?,
        Command::Scheme { code } => {
            let scheme = engine
                .scheme(code)
                .with_context(|| format!("scheme {code} not found"))?;
            serde_json::to_value(scheme)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn init_sentry(settings: &fundmatch_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
