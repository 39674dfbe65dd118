//! Sampling scheduler.
//!
//! One loop: sample → aggregate → publish, then wait `sample_interval`,
//! until the shutdown channel fires. A failed sample skips the cycle and
//! leaves the published values untouched.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use who_core::config::SAMPLE_INTERVAL;
use who_core::error::CoreError;
use who_core::models::session::AggregationResult;
use who_core::ports::publisher::MetricsPublisher;
use who_core::ports::sampler::SessionSampler;
use who_monitor::parser;

/// Scheduler settings
pub struct SchedulerConfig {
    /// Period between cycles
    pub sample_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            sample_interval: SAMPLE_INTERVAL,
        }
    }
}

/// Periodic sample/publish loop
pub struct Scheduler {
    config: SchedulerConfig,
    sampler: Arc<dyn SessionSampler>,
    publisher: Arc<dyn MetricsPublisher>,
}

impl Scheduler {
    /// New scheduler
    pub fn new(
        config: SchedulerConfig,
        sampler: Arc<dyn SessionSampler>,
        publisher: Arc<dyn MetricsPublisher>,
    ) -> Self {
        Self {
            config,
            sampler,
            publisher,
        }
    }

    /// Run exactly one cycle.
    ///
    /// On sampler failure nothing is published and the error is returned.
    pub async fn run_cycle(&self) -> Result<AggregationResult, CoreError> {
        let raw = self.sampler.sample().await?;
        let result = parser::aggregate(&raw);
        self.publisher.publish(&result);
        Ok(result)
    }

    /// Run cycles until shutdown. The first cycle starts immediately.
    ///
    /// Cycles run in their own task, which is aborted once shutdown is
    /// signalled, so a hung sampler cannot hold the process open.
    pub async fn run(self: Arc<Self>, mut shutdown_rx: watch::Receiver<bool>) {
        info!(
            "scheduler started: interval={}ms",
            self.config.sample_interval.as_millis()
        );

        let worker = Arc::clone(&self);
        let sampling_task = tokio::spawn(async move { worker.sample_loop().await });

        while !*shutdown_rx.borrow() {
            if shutdown_rx.changed().await.is_err() {
                break;
            }
        }

        // abort only lands on an await point, never inside publish
        sampling_task.abort();
        info!("scheduler stopped");
    }

    /// Sample, then wait a full interval before the next cycle
    async fn sample_loop(&self) {
        let mut interval = tokio::time::interval(self.config.sample_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            match self.run_cycle().await {
                Ok(result) => debug!(
                    "cycle done: users={}, sessions={}",
                    result.unique_users,
                    result.total_sessions()
                ),
                Err(e) => warn!("session sampling failed, keeping previous metrics: {e}"),
            }
            // next tick is a full interval after this cycle ended
            interval.reset();
        }
    }
}
