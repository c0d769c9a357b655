//! Per-operation row sources and algorithms.
//!
//! Each module covers one relation variant's generic algorithm: the
//! adapters here are what the execution visitor falls back to when a
//! source's `try_*` hook declines. They are plain [`crate::rows::RowIterable`]
//! implementations, so custom sources can reuse them directly.

mod distinct;
mod join;
mod projection;
mod selection;
mod slice;
mod union;

pub use distinct::distinct_rows;
pub use join::{hash_join, ConditionedRows, GeneralJoinRows, UniqueJoinRows};
pub use projection::ProjectedRows;
pub use selection::FilteredRows;
pub use slice::{sorted_slice, WindowedRows};
pub use union::ChainRows;
