//! Slice operation: ordering plus a positional window.

use trellis_core::OrderByTerm;

use crate::relation::Relation;

/// Sorts the base by order terms, then keeps a positional window.
///
/// With no order terms the slice is purely positional over the base's
/// existing order. Sorting is stable: rows tied on every term keep their
/// input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceOp {
    /// Base relation.
    pub base: Relation,
    /// Sort terms, outermost first; may be empty.
    pub order_by: Vec<OrderByTerm>,
    /// Rows to skip after sorting.
    pub offset: usize,
    /// Maximum rows to keep; `None` keeps everything past the offset.
    pub limit: Option<usize>,
}

impl SliceOp {
    /// Create a new slice.
    pub fn new(base: Relation, order_by: Vec<OrderByTerm>, offset: usize, limit: Option<usize>) -> Self {
        Self {
            base,
            order_by,
            offset,
            limit,
        }
    }
}
