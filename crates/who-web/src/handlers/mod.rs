//! HTTP handlers.

pub mod metrics;
