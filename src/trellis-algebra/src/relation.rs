//! Relation trees and their validating factories.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use common_display::{render_tree, TreeItem};
use common_error::{TrellisError, TrellisResult};
use trellis_core::{ColumnSet, EngineTag, JoinCondition, OrderByTerm, Predicate};

use crate::ops::{
    DistinctOp, ExtensionBehavior, ExtensionOp, JoinOp, Leaf, LeafSource, ProjectionOp,
    RelationOp, SelectionOp, SliceOp, TransferOp, UnionOp,
};
use crate::props::RelationProps;

/// A relation: an immutable tree of algebraic operations over rows.
///
/// `Relation` is a cheap-clone shared handle. Operations never mutate;
/// each factory builds a new node around shared subtrees, so a subtree
/// used twice is the same allocation and trees are really DAGs.
///
/// Construction goes through the factory methods only. Each validates its
/// invariants up front and fails with a construction error instead of
/// building an inconsistent tree, so execution never meets a malformed
/// relation.
#[derive(Clone)]
pub struct Relation {
    inner: Arc<RelationInner>,
}

struct RelationInner {
    op: RelationOp,
    engine: EngineTag,
    columns: ColumnSet,
    props: RelationProps,
}

impl Relation {
    fn build(op: RelationOp, engine: EngineTag, columns: ColumnSet, props: RelationProps) -> Self {
        Self {
            inner: Arc::new(RelationInner {
                op,
                engine,
                columns,
                props,
            }),
        }
    }

    // =========================================================================
    // Factories
    // =========================================================================

    /// Wrap a [`Leaf`] as a relation.
    ///
    /// Fails when the leaf declares no columns, or embeds a row whose
    /// columns differ from the declared set.
    pub fn leaf(leaf: Leaf) -> TrellisResult<Self> {
        if leaf.columns.is_empty() {
            return Err(TrellisError::empty_columns(format!(
                "leaf '{}' declares no columns",
                leaf.name
            )));
        }
        if let LeafSource::Rows(rows) = &leaf.source {
            for row in rows.iter() {
                if row.columns() != leaf.columns {
                    return Err(TrellisError::column_mismatch(format!(
                        "leaf '{}' declares {} but embeds a row with {}",
                        leaf.name,
                        leaf.columns,
                        row.columns()
                    )));
                }
            }
        }

        let trivially_small =
            matches!(&leaf.source, LeafSource::Rows(rows) if rows.len() <= 1);
        let props = RelationProps {
            unique_rows: leaf.unique_rows || trivially_small,
            at_most_one_row: trivially_small,
            fully_ordered: trivially_small,
        };
        let engine = leaf.engine.clone();
        let columns = leaf.columns.clone();
        Ok(Self::build(RelationOp::Leaf(leaf), engine, columns, props))
    }

    /// Natural join with another relation.
    ///
    /// Shared columns are equated automatically; the output columns are the
    /// union of both sides'. Fails when the engine tags differ.
    pub fn join(&self, rhs: &Relation) -> TrellisResult<Self> {
        self.join_impl(rhs, None)
    }

    /// Natural join with an extra match condition.
    ///
    /// The condition applies on top of automatic column equation. Fails
    /// when the engines differ, when the condition needs columns neither
    /// side provides, or when it carries no state for the shared engine.
    pub fn join_on(&self, rhs: &Relation, condition: JoinCondition) -> TrellisResult<Self> {
        self.join_impl(rhs, Some(condition))
    }

    fn join_impl(&self, rhs: &Relation, condition: Option<JoinCondition>) -> TrellisResult<Self> {
        if self.engine() != rhs.engine() {
            return Err(TrellisError::engine_mismatch(format!(
                "cannot join '{}' relation with '{}' relation; insert a transfer first",
                self.engine(),
                rhs.engine()
            )));
        }
        let columns = self.columns().union(rhs.columns());
        if let Some(condition) = &condition {
            if !condition.columns_required().is_subset(&columns) {
                return Err(TrellisError::column_mismatch(format!(
                    "join condition '{}' needs {}, operands provide {}",
                    condition.name(),
                    condition.columns_required(),
                    columns
                )));
            }
            if !condition.supports_engine(self.engine()) {
                return Err(TrellisError::missing_engine_state(format!(
                    "join condition '{}' has no state for engine '{}'",
                    condition.name(),
                    self.engine()
                )));
            }
        }

        let (lhs_props, rhs_props) = (self.props(), rhs.props());
        let props = RelationProps {
            // With one side pinned to at most one row, joining cannot
            // multiply the other side's distinct rows.
            unique_rows: lhs_props.unique_rows
                && rhs_props.unique_rows
                && (lhs_props.at_most_one_row || rhs_props.at_most_one_row),
            at_most_one_row: lhs_props.at_most_one_row && rhs_props.at_most_one_row,
            fully_ordered: false,
        };
        let engine = self.engine().clone();
        let op = RelationOp::Join(JoinOp {
            lhs: self.clone(),
            rhs: rhs.clone(),
            condition,
        });
        Ok(Self::build(op, engine, columns, props))
    }

    /// Keep only rows satisfying `predicate`.
    ///
    /// Fails when the predicate needs columns the base lacks, or carries no
    /// state for the base's engine.
    pub fn select(&self, predicate: Predicate) -> TrellisResult<Self> {
        if !predicate.columns_required().is_subset(self.columns()) {
            return Err(TrellisError::column_mismatch(format!(
                "predicate '{}' needs {}, base provides {}",
                predicate.name(),
                predicate.columns_required(),
                self.columns()
            )));
        }
        if !predicate.supports_engine(self.engine()) {
            return Err(TrellisError::missing_engine_state(format!(
                "predicate '{}' has no state for engine '{}'",
                predicate.name(),
                self.engine()
            )));
        }

        // Dropping rows cannot break uniqueness, cardinality bounds, or order.
        let props = self.props();
        let engine = self.engine().clone();
        let columns = self.columns().clone();
        let op = RelationOp::Selection(SelectionOp::new(self.clone(), predicate));
        Ok(Self::build(op, engine, columns, props))
    }

    /// Narrow to a subset of columns.
    ///
    /// Projecting onto the full column set returns the base unchanged.
    /// Fails when `columns` is empty or not a subset of the base's.
    pub fn project(&self, columns: ColumnSet) -> TrellisResult<Self> {
        if columns.is_empty() {
            return Err(TrellisError::empty_columns(
                "projection onto no columns".to_string(),
            ));
        }
        if !columns.is_subset(self.columns()) {
            return Err(TrellisError::column_mismatch(format!(
                "projection onto {}, base provides only {}",
                columns,
                self.columns()
            )));
        }
        if &columns == self.columns() {
            return Ok(self.clone());
        }

        let props = RelationProps {
            // Dropping columns can collapse rows into duplicates.
            unique_rows: false,
            at_most_one_row: self.props().at_most_one_row,
            fully_ordered: self.props().fully_ordered,
        };
        let engine = self.engine().clone();
        let op = RelationOp::Projection(ProjectionOp::new(self.clone(), columns.clone()));
        Ok(Self::build(op, engine, columns, props))
    }

    /// Eliminate duplicate rows, keeping first-seen order.
    ///
    /// A base already marked unique is returned unchanged.
    pub fn distinct(&self) -> Self {
        if self.props().unique_rows {
            return self.clone();
        }
        let props = RelationProps {
            unique_rows: true,
            ..self.props()
        };
        let engine = self.engine().clone();
        let columns = self.columns().clone();
        let op = RelationOp::Distinct(DistinctOp::new(self.clone()));
        Self::build(op, engine, columns, props)
    }

    /// Sort by `order_by`, skip `offset` rows, keep at most `limit`.
    ///
    /// An empty `order_by` makes the slice purely positional over the
    /// base's existing order. Fails on a zero limit (a window that can
    /// never hold a row), on terms needing columns the base lacks, and on
    /// terms without state for the base's engine.
    pub fn slice(
        &self,
        order_by: Vec<OrderByTerm>,
        offset: usize,
        limit: Option<usize>,
    ) -> TrellisResult<Self> {
        if limit == Some(0) {
            return Err(TrellisError::invalid_bounds(
                "slice with a limit of 0 can never hold a row".to_string(),
            ));
        }
        for term in &order_by {
            if !term.columns_required().is_subset(self.columns()) {
                return Err(TrellisError::column_mismatch(format!(
                    "order term '{}' needs {}, base provides {}",
                    term.name(),
                    term.columns_required(),
                    self.columns()
                )));
            }
            if !term.supports_engine(self.engine()) {
                return Err(TrellisError::missing_engine_state(format!(
                    "order term '{}' has no state for engine '{}'",
                    term.name(),
                    self.engine()
                )));
            }
        }

        let base_props = self.props();
        let props = RelationProps {
            unique_rows: base_props.unique_rows,
            at_most_one_row: base_props.at_most_one_row || limit == Some(1),
            fully_ordered: !order_by.is_empty() || base_props.fully_ordered,
        };
        let engine = self.engine().clone();
        let columns = self.columns().clone();
        let op = RelationOp::Slice(SliceOp::new(self.clone(), order_by, offset, limit));
        Ok(Self::build(op, engine, columns, props))
    }

    /// Concatenate with another relation.
    pub fn union(&self, other: &Relation) -> TrellisResult<Self> {
        Self::union_all([self.clone(), other.clone()])
    }

    /// Concatenate two or more relations in declared order.
    ///
    /// Fails with fewer than two operands, and when operands disagree on
    /// columns or engine.
    pub fn union_all(operands: impl IntoIterator<Item = Relation>) -> TrellisResult<Self> {
        let operands: Vec<Relation> = operands.into_iter().collect();
        let Some(first) = operands.first() else {
            return Err(TrellisError::too_few_operands(
                "union of no operands".to_string(),
            ));
        };
        if operands.len() < 2 {
            return Err(TrellisError::too_few_operands(format!(
                "union needs at least 2 operands, got {}",
                operands.len()
            )));
        }
        for operand in &operands[1..] {
            if operand.engine() != first.engine() {
                return Err(TrellisError::engine_mismatch(format!(
                    "union operands span engines '{}' and '{}'; insert a transfer first",
                    first.engine(),
                    operand.engine()
                )));
            }
            if operand.columns() != first.columns() {
                return Err(TrellisError::column_mismatch(format!(
                    "union operands must share columns: {} vs {}",
                    first.columns(),
                    operand.columns()
                )));
            }
        }

        let engine = first.engine().clone();
        let columns = first.columns().clone();
        let op = RelationOp::Union(UnionOp::new(operands));
        Ok(Self::build(op, engine, columns, RelationProps::none()))
    }

    /// Move the relation to another engine.
    ///
    /// Only the engine tag changes; columns and properties pass through.
    /// Transferring to the current engine returns the base unchanged.
    pub fn transfer(&self, destination: impl Into<EngineTag>) -> Self {
        let destination = destination.into();
        if &destination == self.engine() {
            return self.clone();
        }
        let columns = self.columns().clone();
        let props = self.props();
        let op = RelationOp::Transfer(TransferOp::new(self.clone(), destination.clone()));
        Self::build(op, destination, columns, props)
    }

    /// Wrap in an extension operation.
    ///
    /// The payload decides the output columns and properties; both default
    /// to passthrough. Fails when the payload computes an empty column set.
    pub fn extend(&self, payload: Arc<dyn ExtensionBehavior>) -> TrellisResult<Self> {
        let columns = payload.columns(self.columns());
        if columns.is_empty() {
            return Err(TrellisError::empty_columns(format!(
                "extension '{}' computes no columns",
                payload.name()
            )));
        }
        let props = payload.props(self.props());
        let engine = self.engine().clone();
        let op = RelationOp::Extension(ExtensionOp::new(self.clone(), payload));
        Ok(Self::build(op, engine, columns, props))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The node's operation variant.
    pub fn op(&self) -> &RelationOp {
        &self.inner.op
    }

    /// The engine this relation belongs to.
    pub fn engine(&self) -> &EngineTag {
        &self.inner.engine
    }

    /// The columns every row of this relation carries.
    pub fn columns(&self) -> &ColumnSet {
        &self.inner.columns
    }

    /// Statically known properties of the row stream.
    pub fn props(&self) -> RelationProps {
        self.inner.props
    }

    /// Whether two handles share the same node allocation.
    pub fn ptr_eq(&self, other: &Relation) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Every engine tag appearing in the tree, this node included.
    pub fn engines(&self) -> BTreeSet<EngineTag> {
        fn collect(relation: &Relation, into: &mut BTreeSet<EngineTag>) {
            into.insert(relation.engine().clone());
            for child in relation.op().children() {
                collect(child, into);
            }
        }
        let mut engines = BTreeSet::new();
        collect(self, &mut engines);
        engines
    }

    /// Count the nodes in the tree, shared subtrees counted per use.
    pub fn node_count(&self) -> usize {
        1 + self
            .op()
            .children()
            .iter()
            .map(|child| child.node_count())
            .sum::<usize>()
    }

    /// The maximum depth of the tree.
    pub fn depth(&self) -> usize {
        1 + self
            .op()
            .children()
            .iter()
            .map(|child| child.depth())
            .max()
            .unwrap_or(0)
    }
}

impl PartialEq for Relation {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.inner.op == other.inner.op
    }
}

impl Eq for Relation {}

impl fmt::Debug for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Relation").field(&self.inner.op).finish()
    }
}

impl TreeItem for Relation {
    fn label(&self) -> String {
        self.inner.op.describe()
    }

    fn child_items(&self) -> Vec<&dyn TreeItem> {
        self.inner
            .op
            .children()
            .into_iter()
            .map(|child| child as &dyn TreeItem)
            .collect()
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_tree(self))
    }
}
