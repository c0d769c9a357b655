//! Union operation: concatenation of same-shaped operands.

use crate::relation::Relation;

/// Concatenates two or more operands with identical column sets.
///
/// Duplicates are kept; this is UNION ALL in SQL terms. Operand order is
/// meaningful: engines emit each operand's rows in turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionOp {
    /// Operands, emitted in declared order; always at least two.
    pub operands: Vec<Relation>,
}

impl UnionOp {
    /// Create a new union.
    pub fn new(operands: Vec<Relation>) -> Self {
        Self { operands }
    }
}
