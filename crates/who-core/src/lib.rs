//! # who-core
//!
//! Domain models, port traits, error type and configuration shared by every
//! who-exporter crate.
//!
//! ## Layout
//!
//! - [`models`]: session records and the per-cycle aggregation result
//! - [`ports`]: hexagonal ports (`SessionSampler`, `MetricsPublisher`)
//! - [`error`]: core error type (thiserror)
//! - [`config`]: exporter configuration and its JSON loader

pub mod config;
pub mod error;
pub mod models;
pub mod ports;
