//! Engine configuration
//!
//! Board-agnostic tunables, stored as postcard binary data when the `serde`
//! feature is enabled.

#[cfg(feature = "serde")]
pub mod persist;
pub mod types;

pub use types::*;
