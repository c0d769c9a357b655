//! Selection operation: predicate-based row filtering.

use trellis_core::Predicate;

use crate::relation::Relation;

/// Keeps the base's rows that satisfy a predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionOp {
    /// Base relation.
    pub base: Relation,
    /// Row filter; must carry state for the base's engine.
    pub predicate: Predicate,
}

impl SelectionOp {
    /// Create a new selection.
    pub fn new(base: Relation, predicate: Predicate) -> Self {
        Self { base, predicate }
    }
}
