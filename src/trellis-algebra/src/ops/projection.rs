//! Projection operation: column subsetting.

use trellis_core::ColumnSet;

use crate::relation::Relation;

/// Narrows the base to a subset of its columns.
///
/// Duplicate rows produced by dropping columns are kept; wrap the result in
/// a distinct to eliminate them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionOp {
    /// Base relation.
    pub base: Relation,
    /// Columns to keep; non-empty subset of the base's columns.
    pub columns: ColumnSet,
}

impl ProjectionOp {
    /// Create a new projection.
    pub fn new(base: Relation, columns: ColumnSet) -> Self {
        Self { base, columns }
    }
}
