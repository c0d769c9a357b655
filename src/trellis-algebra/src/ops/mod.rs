//! Operation variants of the relation tree.

mod distinct;
mod extension;
mod join;
mod leaf;
mod projection;
mod selection;
mod slice;
mod transfer;
mod union;

pub use distinct::DistinctOp;
pub use extension::{ExtensionBehavior, ExtensionOp};
pub use join::JoinOp;
pub use leaf::{Leaf, LeafSource};
pub use projection::ProjectionOp;
pub use selection::SelectionOp;
pub use slice::SliceOp;
pub use transfer::TransferOp;
pub use union::UnionOp;

use crate::relation::Relation;

/// One node of a relation tree.
///
/// The vocabulary is a closed sum: traversals match exhaustively and the
/// compiler flags every site a new variant would touch. Operations outside
/// this vocabulary ride the [`ExtensionOp`] escape hatch instead of
/// extending the enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationOp {
    /// Stored rows, referenced or embedded.
    Leaf(Leaf),
    /// Natural join of two operands.
    Join(JoinOp),
    /// Predicate-based row filtering.
    Selection(SelectionOp),
    /// Column subsetting.
    Projection(ProjectionOp),
    /// Duplicate elimination.
    Distinct(DistinctOp),
    /// Ordering plus a positional window.
    Slice(SliceOp),
    /// Concatenation of same-shaped operands.
    Union(UnionOp),
    /// Engine change.
    Transfer(TransferOp),
    /// Foreign variant with an opaque payload.
    Extension(ExtensionOp),
}

impl RelationOp {
    /// Child relations, left to right.
    pub fn children(&self) -> Vec<&Relation> {
        match self {
            Self::Leaf(_) => vec![],
            Self::Join(op) => vec![&op.lhs, &op.rhs],
            Self::Selection(op) => vec![&op.base],
            Self::Projection(op) => vec![&op.base],
            Self::Distinct(op) => vec![&op.base],
            Self::Slice(op) => vec![&op.base],
            Self::Union(op) => op.operands.iter().collect(),
            Self::Transfer(op) => vec![&op.base],
            Self::Extension(op) => vec![&op.base],
        }
    }

    /// Get the name of this variant.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Leaf(_) => "Leaf",
            Self::Join(_) => "Join",
            Self::Selection(_) => "Selection",
            Self::Projection(_) => "Projection",
            Self::Distinct(_) => "Distinct",
            Self::Slice(_) => "Slice",
            Self::Union(_) => "Union",
            Self::Transfer(_) => "Transfer",
            Self::Extension(_) => "Extension",
        }
    }

    /// One-line description used by tree rendering.
    pub fn describe(&self) -> String {
        match self {
            Self::Leaf(leaf) => format!("Leaf '{}' ({})", leaf.name, leaf.engine),
            Self::Join(op) => match &op.condition {
                Some(condition) => format!("Join on {condition}"),
                None => "Join".to_string(),
            },
            Self::Selection(op) => format!("Selection {}", op.predicate),
            Self::Projection(op) => format!("Projection {}", op.columns),
            Self::Distinct(_) => "Distinct".to_string(),
            Self::Slice(op) => {
                let mut out = String::from("Slice");
                if !op.order_by.is_empty() {
                    let terms: Vec<_> = op.order_by.iter().map(ToString::to_string).collect();
                    out.push_str(&format!(" order by [{}]", terms.join(", ")));
                }
                if op.offset > 0 {
                    out.push_str(&format!(" offset {}", op.offset));
                }
                if let Some(limit) = op.limit {
                    out.push_str(&format!(" limit {limit}"));
                }
                out
            }
            Self::Union(op) => format!("Union of {}", op.operands.len()),
            Self::Transfer(op) => format!("Transfer to {}", op.destination),
            Self::Extension(op) => format!("Extension '{}'", op.payload.name()),
        }
    }
}
