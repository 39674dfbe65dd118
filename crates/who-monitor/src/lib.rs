//! # who-monitor
//!
//! Login session monitoring adapter.
//! Runs the session-listing command (`who`) and folds its output into
//! per-user, per-address session counts.

pub mod parser;
pub mod sampler;
