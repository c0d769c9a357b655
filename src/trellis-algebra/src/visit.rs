//! Double-dispatch traversal over relation trees.

use crate::ops::{
    DistinctOp, ExtensionOp, JoinOp, Leaf, ProjectionOp, RelationOp, SelectionOp, SliceOp,
    TransferOp, UnionOp,
};
use crate::relation::Relation;

/// External behavior over relation trees, one method per variant.
///
/// [`Relation::visit`] dispatches through an exhaustive match, so adding a
/// variant breaks every visitor at compile time instead of at runtime.
/// Each method receives both the full relation (for engine, columns, and
/// props) and the variant's own payload. Recursion is the visitor's
/// responsibility; traversal order for multi-child nodes is left to right
/// unless the visitor has a reason to differ.
pub trait RelationVisitor {
    /// Result produced per node.
    type Output;

    /// Visit a leaf.
    fn visit_leaf(&mut self, relation: &Relation, leaf: &Leaf) -> Self::Output;

    /// Visit a join.
    fn visit_join(&mut self, relation: &Relation, op: &JoinOp) -> Self::Output;

    /// Visit a selection.
    fn visit_selection(&mut self, relation: &Relation, op: &SelectionOp) -> Self::Output;

    /// Visit a projection.
    fn visit_projection(&mut self, relation: &Relation, op: &ProjectionOp) -> Self::Output;

    /// Visit a distinct.
    fn visit_distinct(&mut self, relation: &Relation, op: &DistinctOp) -> Self::Output;

    /// Visit a slice.
    fn visit_slice(&mut self, relation: &Relation, op: &SliceOp) -> Self::Output;

    /// Visit a union.
    fn visit_union(&mut self, relation: &Relation, op: &UnionOp) -> Self::Output;

    /// Visit a transfer.
    fn visit_transfer(&mut self, relation: &Relation, op: &TransferOp) -> Self::Output;

    /// Visit an extension.
    fn visit_extension(&mut self, relation: &Relation, op: &ExtensionOp) -> Self::Output;
}

impl Relation {
    /// Dispatch to the visitor method matching this node's variant.
    pub fn visit<V: RelationVisitor>(&self, visitor: &mut V) -> V::Output {
        match self.op() {
            RelationOp::Leaf(leaf) => visitor.visit_leaf(self, leaf),
            RelationOp::Join(op) => visitor.visit_join(self, op),
            RelationOp::Selection(op) => visitor.visit_selection(self, op),
            RelationOp::Projection(op) => visitor.visit_projection(self, op),
            RelationOp::Distinct(op) => visitor.visit_distinct(self, op),
            RelationOp::Slice(op) => visitor.visit_slice(self, op),
            RelationOp::Union(op) => visitor.visit_union(self, op),
            RelationOp::Transfer(op) => visitor.visit_transfer(self, op),
            RelationOp::Extension(op) => visitor.visit_extension(self, op),
        }
    }
}
