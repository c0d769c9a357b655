//! Lowering a relation tree into a composed row pipeline.
//!
//! One visitor pass walks the tree bottom-up and yields a row source per
//! node. Behavioral term states are resolved before a node's children are
//! evaluated, so a misconfigured term fails the execution without pulling
//! a single-pass source. Every node offers its child's source the chance
//! to take the operation over before falling back to the generic
//! algorithm.

use log::debug;

use common_error::{unsupported, TrellisError, TrellisResult};
use trellis_algebra::ops::{
    DistinctOp, ExtensionOp, JoinOp, Leaf, ProjectionOp, SelectionOp, SliceOp, TransferOp, UnionOp,
};
use trellis_algebra::{Relation, RelationVisitor};

use crate::collection::RowCollection;
use crate::engine::{IterationEngine, IterationExtension};
use crate::operators::{
    distinct_rows, hash_join, sorted_slice, ChainRows, ConditionedRows, FilteredRows,
    ProjectedRows, WindowedRows,
};
use crate::rows::{collect_rows_bounded, BoxedRows, FastPath, JoinFastPath, RowIterable};
use crate::terms::{condition_state, order_term_state, predicate_state};

pub(crate) struct ExecutionVisitor<'a> {
    pub(crate) engine: &'a mut IterationEngine,
}

impl ExecutionVisitor<'_> {
    /// Turn a source into a restartable collection, reusing one the source
    /// already holds. Only a fresh drain counts against the row ceiling.
    fn materialize(&self, mut source: BoxedRows, operation: &str) -> TrellisResult<RowCollection> {
        if let Some(collection) = source.as_collection() {
            debug!(
                "{operation}: reusing a materialized collection of {} rows",
                collection.len()
            );
            return Ok(collection.restarted());
        }
        let limit = self.engine.config().max_materialized_rows;
        let rows = collect_rows_bounded(source.as_mut(), limit, operation)?;
        Ok(RowCollection::new(rows))
    }
}

impl RelationVisitor for ExecutionVisitor<'_> {
    type Output = TrellisResult<BoxedRows>;

    fn visit_leaf(&mut self, _relation: &Relation, leaf: &Leaf) -> Self::Output {
        if let Some(rows) = leaf.embedded_rows() {
            return Ok(Box::new(RowCollection::from_shared(rows.clone())));
        }
        self.engine.resolve_leaf(&leaf.name)
    }

    fn visit_join(&mut self, _relation: &Relation, op: &JoinOp) -> Self::Output {
        let condition = op
            .condition
            .as_ref()
            .map(|condition| condition_state(condition, self.engine.tag()))
            .transpose()?;

        let lhs = op.lhs.visit(self)?;
        let mut rhs = op.rhs.visit(self)?;
        let common = op.lhs.columns().intersection(op.rhs.columns()).to_vec();

        let joined = match rhs.try_join(lhs, &common) {
            JoinFastPath::Applied(joined) => {
                debug!("join fast path applied by {}", rhs.name());
                joined
            }
            JoinFastPath::Declined(lhs) => {
                // An index keyed on all of the right side's columns maps
                // unique rows to unique keys, so one slot per key is enough.
                let rhs_unique =
                    op.rhs.props().unique_rows && common.len() == op.rhs.columns().len();
                let collection = self.materialize(rhs, "join")?;
                hash_join(lhs, &collection, &common, rhs_unique)?
            }
        };

        if let Some(condition) = condition {
            return Ok(Box::new(ConditionedRows::new(joined, condition)));
        }
        Ok(joined)
    }

    fn visit_selection(&mut self, _relation: &Relation, op: &SelectionOp) -> Self::Output {
        let predicate = predicate_state(&op.predicate, self.engine.tag())?;
        let mut child = op.base.visit(self)?;
        match child.try_selection(&predicate) {
            FastPath::Applied(rows) => {
                debug!("selection fast path applied by {}", child.name());
                Ok(rows)
            }
            FastPath::Declined => Ok(Box::new(FilteredRows::new(child, predicate))),
        }
    }

    fn visit_projection(&mut self, _relation: &Relation, op: &ProjectionOp) -> Self::Output {
        let child = op.base.visit(self)?;
        Ok(Box::new(ProjectedRows::new(child, op.columns.clone())))
    }

    fn visit_distinct(&mut self, _relation: &Relation, op: &DistinctOp) -> Self::Output {
        let child = op.base.visit(self)?;
        let limit = self.engine.config().max_materialized_rows;
        Ok(Box::new(distinct_rows(child, limit)?))
    }

    fn visit_slice(&mut self, _relation: &Relation, op: &SliceOp) -> Self::Output {
        let mut terms = Vec::with_capacity(op.order_by.len());
        for term in &op.order_by {
            terms.push(order_term_state(term, self.engine.tag())?);
        }
        let mut child = op.base.visit(self)?;
        match child.try_slice(&terms, op.offset, op.limit) {
            FastPath::Applied(rows) => {
                debug!("slice fast path applied by {}", child.name());
                Ok(rows)
            }
            FastPath::Declined if terms.is_empty() => {
                Ok(Box::new(WindowedRows::new(child, op.offset, op.limit)))
            }
            FastPath::Declined => {
                let limit = self.engine.config().max_materialized_rows;
                let rows = collect_rows_bounded(child.as_mut(), limit, "slice")?;
                let total = rows.len();
                let sorted = sorted_slice(rows, &terms, op.offset, op.limit)?;
                debug!(
                    "slice: sorted {total} materialized rows on {} terms",
                    terms.len()
                );
                Ok(Box::new(sorted))
            }
        }
    }

    fn visit_union(&mut self, _relation: &Relation, op: &UnionOp) -> Self::Output {
        let mut sources = Vec::with_capacity(op.operands.len());
        for operand in &op.operands {
            sources.push(operand.visit(self)?);
        }
        Ok(Box::new(ChainRows::new(sources)))
    }

    fn visit_transfer(&mut self, _relation: &Relation, op: &TransferOp) -> Self::Output {
        if &op.destination != self.engine.tag() {
            unsupported!(
                "transfer into engine '{}' cannot run on engine '{}'",
                op.destination,
                self.engine.tag()
            );
        }
        let source_engine = op.base.engine();
        let Some(exporter) = self.engine.exporter_for(source_engine) else {
            return Err(TrellisError::no_exporter(format!(
                "no exporter registered from engine '{}' into '{}'",
                source_engine,
                self.engine.tag()
            )));
        };
        debug!("transfer: exporting rows from engine '{source_engine}'");
        exporter.export(&op.base)
    }

    fn visit_extension(&mut self, _relation: &Relation, op: &ExtensionOp) -> Self::Output {
        let Some(extension) = op.payload.as_any().downcast_ref::<IterationExtension>() else {
            unsupported!(
                "extension '{}' has no iteration-engine support",
                op.payload.name()
            );
        };
        let base = op.base.visit(self)?;
        extension.apply(base)
    }
}
