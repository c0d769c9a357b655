//! Error types and result aliases for trellis.
//!
//! One shared taxonomy for the whole workspace: factories raise
//! construction errors eagerly, engines raise execution errors lazily, and
//! everything funnels into [`TrellisError`].

mod error;

pub use error::{ConstructionError, ExecutionError, TrellisError, TrellisResult};
