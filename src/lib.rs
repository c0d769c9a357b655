//! Trellis - engine-agnostic relational algebra with pluggable execution
//!
//! Trellis describes queries as immutable relation trees shared across
//! execution engines, and ships a native in-memory engine that runs those
//! trees over plain rows.

#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

// Re-export core crates
pub use common_display as display;
pub use common_error as error;
pub use trellis_algebra as algebra;
pub use trellis_core as core;
pub use trellis_iteration as iteration;

/// Trellis version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
