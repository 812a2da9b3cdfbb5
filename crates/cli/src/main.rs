mod metrics;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use objconv_core::{
    load_config, validate_config, BatchError, BatchRunner, BatchSummary, Config, NamingPolicy,
    RasterCodec, S3ObjectStore,
};

/// Re-encode every image in an object-storage bucket.
#[derive(Debug, Parser)]
#[command(name = "objconv", version, about)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, env = "OBJCONV_CONFIG", default_value = "objconv.toml")]
    config: PathBuf,

    /// Number of objects processed at once.
    #[arg(long)]
    concurrency: Option<usize>,

    /// Encoder quality, 0-100.
    #[arg(long)]
    quality: Option<u8>,

    /// Where converted objects are written.
    #[arg(long, value_enum)]
    naming: Option<NamingArg>,

    /// Write the final summary as JSON to this file.
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// Write Prometheus metrics in text format to this file at exit.
    #[arg(long)]
    metrics: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum NamingArg {
    /// Write next to the source with the target extension.
    Rename,
    /// Replace the source object in place.
    Overwrite,
}

impl From<NamingArg> for NamingPolicy {
    fn from(arg: NamingArg) -> Self {
        match arg {
            NamingArg::Rename => NamingPolicy::Rename,
            NamingArg::Overwrite => NamingPolicy::Overwrite,
        }
    }
}

impl Args {
    /// Flags take precedence over file and environment values.
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(concurrency) = self.concurrency {
            config.batch.concurrency = concurrency;
        }
        if let Some(quality) = self.quality {
            config.transform.quality = quality;
        }
        if let Some(naming) = self.naming {
            config.transform.naming = naming.into();
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Loading configuration from {:?}", args.config);
    let mut config = load_config(&args.config)
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;
    args.apply_overrides(&mut config);
    validate_config(&config).context("Configuration validation failed")?;

    info!(
        "Bucket {} in {}, target {} at quality {}, {:?} naming",
        config.storage.bucket,
        config.storage.region,
        config.transform.target_format,
        config.transform.quality,
        config.transform.naming
    );

    let store = S3ObjectStore::connect(config.storage.clone()).await;
    let codec = RasterCodec::new(config.transform.target_format);
    let runner = BatchRunner::new(
        config.batch.clone(),
        Arc::new(store),
        Arc::new(codec),
        config.transform.clone(),
    );

    let shutdown = runner.shutdown_handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Shutdown requested, finishing in-flight objects");
        let _ = shutdown.send(());
    });

    let result = runner.run().await;

    if let Some(path) = &args.metrics {
        metrics::write_metrics(path)?;
        info!("Metrics written to {:?}", path);
    }

    match result {
        Ok(summary) => {
            if let Some(path) = &args.summary_json {
                write_summary(path, &summary)?;
            }
            for item in &summary.errors {
                warn!("{} failed ({}): {}", item.key, item.kind, item.message);
            }
            Ok(())
        }
        Err(BatchError::StorageUnavailable { reason, partial }) => {
            if let Some(path) = &args.summary_json {
                write_summary(path, &partial)?;
            }
            anyhow::bail!(
                "Listing failed after {} objects: {}",
                partial.total(),
                reason
            )
        }
        Err(e) => Err(e.into()),
    }
}

fn write_summary(path: &Path, summary: &BatchSummary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary).context("Failed to serialize summary")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write summary to {:?}", path))?;
    info!("Summary written to {:?}", path);
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
