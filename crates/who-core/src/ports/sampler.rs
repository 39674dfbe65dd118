//! Session sampling port.
//!
//! Implementation: `who-monitor` crate (`who` command).

use async_trait::async_trait;

use crate::error::CoreError;

/// Source of raw session-listing text
#[async_trait]
pub trait SessionSampler: Send + Sync {
    /// Run the session-listing source once and return its standard output.
    ///
    /// No timeout is applied; a hung source stalls the caller.
    async fn sample(&self) -> Result<String, CoreError>;
}
