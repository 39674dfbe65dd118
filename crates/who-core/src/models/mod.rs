//! who-exporter domain models.
//!
//! Records and keys implement `serde` Serialize/Deserialize.

pub mod session;
