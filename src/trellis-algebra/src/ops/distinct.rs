//! Distinct operation: duplicate elimination.

use crate::relation::Relation;

/// Eliminates duplicate rows, keeping first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistinctOp {
    /// Base relation.
    pub base: Relation,
}

impl DistinctOp {
    /// Create a new distinct.
    pub fn new(base: Relation) -> Self {
        Self { base }
    }
}
