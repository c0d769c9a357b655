//! Join operation: natural join of two operands.

use trellis_core::JoinCondition;

use crate::relation::Relation;

/// Natural join of exactly two operands.
///
/// Columns the operands share are equated automatically; the optional
/// condition is an extra match rule on top of that, never a replacement
/// for it. N-way joins are expressed as nested binary joins — there is no
/// join-order solving anywhere in the system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOp {
    /// Left operand; drives output order.
    pub lhs: Relation,
    /// Right operand.
    pub rhs: Relation,
    /// Extra match rule over merged candidate rows.
    pub condition: Option<JoinCondition>,
}

impl JoinOp {
    /// Create a join on automatic column equation alone.
    pub fn new(lhs: Relation, rhs: Relation) -> Self {
        Self {
            lhs,
            rhs,
            condition: None,
        }
    }

    /// Create a join with an extra condition.
    pub fn with_condition(lhs: Relation, rhs: Relation, condition: JoinCondition) -> Self {
        Self {
            lhs,
            rhs,
            condition: Some(condition),
        }
    }
}
