//! Port interfaces (traits).
//!
//! Adapter crates implement these traits and `who-app` wires them together
//! as `Arc<dyn T>`. Async ports use `async_trait` so they stay object safe.

pub mod publisher;
pub mod sampler;
