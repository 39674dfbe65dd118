//! Session table sampler.
//!
//! `SessionSampler` port implementation that runs the session-listing
//! command (`who` by default) without arguments and returns its stdout.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;
use who_core::config::SamplerConfig;
use who_core::error::CoreError;
use who_core::ports::sampler::SessionSampler;

/// Runs the session-listing command on every `sample()` call
pub struct WhoCommandSampler {
    command: String,
}

impl WhoCommandSampler {
    /// Sampler for an arbitrary program name
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Sampler from the `sampler` config section
    pub fn from_config(config: &SamplerConfig) -> Self {
        Self::new(config.command.clone())
    }

    /// Program name this sampler runs
    pub fn command(&self) -> &str {
        &self.command
    }
}

impl Default for WhoCommandSampler {
    fn default() -> Self {
        Self::from_config(&SamplerConfig::default())
    }
}

#[async_trait]
impl SessionSampler for WhoCommandSampler {
    async fn sample(&self) -> Result<String, CoreError> {
        // no timeout: a hung command stalls this cycle
        let output = Command::new(&self.command)
            .output()
            .await
            .map_err(|source| CoreError::CommandSpawn {
                command: self.command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(CoreError::CommandFailed {
                command: self.command.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("{} returned {} bytes", self.command, stdout.len());
        Ok(stdout)
    }
}
