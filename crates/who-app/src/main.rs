//! # who-app
//!
//! who-exporter binary entry point.
//! Parses flags, wires the sampler, metric store and HTTP endpoint together
//! and runs them until a shutdown signal arrives.

mod lifecycle;
mod scheduler;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use who_core::config::ExporterConfig;
use who_core::ports::publisher::MetricsPublisher;
use who_core::ports::sampler::SessionSampler;
use who_monitor::sampler::WhoCommandSampler;
use who_web::{MetricsServer, SessionMetricStore};

use crate::lifecycle::LifecycleManager;
use crate::scheduler::{Scheduler, SchedulerConfig};

/// Prometheus exporter for logged-in user sessions
#[derive(Parser, Debug)]
#[command(name = "who-exporter")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Host address to listen on (e.g. 0.0.0.0 or localhost)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,

    /// Optional JSON configuration file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,
}

/// Resolve the effective configuration: defaults, then file, then flags
fn resolve_config(args: &Args) -> Result<ExporterConfig> {
    let mut config = match &args.config {
        Some(path) => ExporterConfig::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ExporterConfig::default(),
    };

    if let Some(ref host) = args.host {
        config.web.host = host.clone();
    }
    if let Some(port) = args.port {
        config.web.port = port;
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_filter = format!(
        "who_exporter={},who_core={},who_monitor={},who_web={},tower_http={}",
        args.log_level,
        args.log_level,
        args.log_level,
        args.log_level,
        args.log_level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .init();

    let config = resolve_config(&args)?;

    // ── adapters ──
    let store = Arc::new(SessionMetricStore::new().context("registering metrics")?);
    let who_sampler = WhoCommandSampler::from_config(&config.sampler);
    info!(
        "sampling '{}' every {}s",
        who_sampler.command(),
        config.sample_interval().as_secs()
    );
    let sampler: Arc<dyn SessionSampler> = Arc::new(who_sampler);
    let publisher: Arc<dyn MetricsPublisher> = store.clone();

    let lifecycle = Arc::new(LifecycleManager::new());

    // bind before sampling starts; without the endpoint there is nothing to do
    let server = MetricsServer::new(store, config.web.clone());
    info!("who-exporter starting, scrape URL {}", server.url());
    let listener = server
        .bind()
        .await
        .with_context(|| format!("binding metrics endpoint {}", config.web.listen_addr()))?;

    // ── tasks ──
    let sched = Arc::new(Scheduler::new(
        SchedulerConfig {
            sample_interval: config.sample_interval(),
        },
        sampler,
        publisher,
    ));
    let sched_task = tokio::spawn(sched.run(lifecycle.subscribe()));

    let signal_lifecycle = lifecycle.clone();
    tokio::spawn(async move {
        signal_lifecycle.wait_for_signal().await;
    });

    let served = server.serve(listener, lifecycle.subscribe()).await;

    // stop the sampler whether the server exited cleanly or not
    lifecycle.shutdown();
    if let Err(e) = sched_task.await {
        warn!("scheduler task ended abnormally: {e}");
    }

    served.context("serving metrics endpoint")?;
    info!("who-exporter stopped");
    Ok(())
}
