//! Exporter configuration.
//!
//! Listen address and sampler command. Values come from defaults, an optional
//! JSON file and finally CLI flags (applied by `who-app`).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::error::CoreError;

/// Fixed sampling period; intentionally not exposed as a config field
pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(10);

/// Top-level exporter configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// Metrics endpoint settings
    #[serde(default)]
    pub web: WebConfig,
    /// Session sampler settings
    #[serde(default)]
    pub sampler: SamplerConfig,
}

// ============================================================
// Metrics endpoint
// ============================================================

/// Metrics endpoint settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebConfig {
    /// Host or IP to listen on (default: localhost)
    #[serde(default = "default_web_host")]
    pub host: String,
    /// Port to listen on (default: 9101)
    #[serde(default = "default_web_port")]
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
        }
    }
}

impl WebConfig {
    /// `host:port` as shown in logs
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ============================================================
// Sampler
// ============================================================

/// Session sampler settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Session-listing program, always invoked without arguments
    #[serde(default = "default_sampler_command")]
    pub command: String,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            command: default_sampler_command(),
        }
    }
}

impl ExporterConfig {
    /// Load configuration from a JSON file. Missing fields take their defaults.
    pub fn load_from_file(path: &Path) -> Result<Self, CoreError> {
        let content = fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        let config: ExporterConfig = serde_json::from_str(&content).map_err(|e| {
            CoreError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;

        debug!("config loaded from {}", path.display());
        Ok(config)
    }

    /// Period between sampling cycles
    pub fn sample_interval(&self) -> Duration {
        SAMPLE_INTERVAL
    }
}

fn default_web_host() -> String {
    "localhost".to_string()
}
fn default_web_port() -> u16 {
    9101
}
fn default_sampler_command() -> String {
    "who".to_string()
}
