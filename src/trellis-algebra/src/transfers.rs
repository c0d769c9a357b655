//! Rewrites transfer nodes into engine-native subtrees.
//!
//! A tree that spans engines carries explicit transfer nodes at the
//! boundaries. Those nodes are declarations, not implementations: how rows
//! actually move between a pair of engines is application knowledge. The
//! [`TransferResolver`] holds that knowledge as callbacks keyed by
//! `(source, destination)` and rebuilds a tree with every transfer node
//! replaced by the callback's output.

use std::collections::HashMap;

use common_error::{TrellisError, TrellisResult};
use trellis_core::EngineTag;

use crate::ops::RelationOp;
use crate::relation::Relation;

/// Materializes a relation on another engine.
///
/// The input is the transfer's base; the output must live on the
/// destination engine the callback was registered for.
pub type TransferFn = std::sync::Arc<dyn Fn(&Relation) -> TrellisResult<Relation> + Send + Sync>;

/// Registry of engine-to-engine transfer implementations.
#[derive(Default, Clone)]
pub struct TransferResolver {
    transfers: HashMap<(EngineTag, EngineTag), TransferFn>,
}

impl TransferResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the implementation for one engine pair.
    pub fn with_transfer(
        mut self,
        source: impl Into<EngineTag>,
        destination: impl Into<EngineTag>,
        transfer: TransferFn,
    ) -> Self {
        self.transfers
            .insert((source.into(), destination.into()), transfer);
        self
    }

    /// Whether an implementation is registered for this engine pair.
    pub fn supports(&self, source: &EngineTag, destination: &EngineTag) -> bool {
        self.transfers
            .contains_key(&(source.clone(), destination.clone()))
    }

    /// Replace every transfer node in `relation` with registered output.
    ///
    /// Rebuilds bottom-up through the factories, so replacements are
    /// validated like hand-built trees; subtrees without transfers are
    /// reused as-is. Fails when a pair has no registered implementation or
    /// when a callback's output lands on the wrong engine.
    pub fn resolve(&self, relation: &Relation) -> TrellisResult<Relation> {
        match relation.op() {
            RelationOp::Leaf(_) => Ok(relation.clone()),
            RelationOp::Join(op) => {
                let lhs = self.resolve(&op.lhs)?;
                let rhs = self.resolve(&op.rhs)?;
                if lhs.ptr_eq(&op.lhs) && rhs.ptr_eq(&op.rhs) {
                    return Ok(relation.clone());
                }
                match &op.condition {
                    Some(condition) => lhs.join_on(&rhs, condition.clone()),
                    None => lhs.join(&rhs),
                }
            }
            RelationOp::Selection(op) => {
                let base = self.resolve(&op.base)?;
                if base.ptr_eq(&op.base) {
                    return Ok(relation.clone());
                }
                base.select(op.predicate.clone())
            }
            RelationOp::Projection(op) => {
                let base = self.resolve(&op.base)?;
                if base.ptr_eq(&op.base) {
                    return Ok(relation.clone());
                }
                base.project(op.columns.clone())
            }
            RelationOp::Distinct(op) => {
                let base = self.resolve(&op.base)?;
                if base.ptr_eq(&op.base) {
                    return Ok(relation.clone());
                }
                Ok(base.distinct())
            }
            RelationOp::Slice(op) => {
                let base = self.resolve(&op.base)?;
                if base.ptr_eq(&op.base) {
                    return Ok(relation.clone());
                }
                base.slice(op.order_by.clone(), op.offset, op.limit)
            }
            RelationOp::Union(op) => {
                let operands = op
                    .operands
                    .iter()
                    .map(|operand| self.resolve(operand))
                    .collect::<TrellisResult<Vec<_>>>()?;
                let unchanged = operands
                    .iter()
                    .zip(&op.operands)
                    .all(|(resolved, original)| resolved.ptr_eq(original));
                if unchanged {
                    return Ok(relation.clone());
                }
                Relation::union_all(operands)
            }
            RelationOp::Transfer(op) => {
                let base = self.resolve(&op.base)?;
                // Resolving the base may already have landed it on the
                // destination engine.
                if base.engine() == &op.destination {
                    return Ok(base);
                }
                let key = (base.engine().clone(), op.destination.clone());
                let Some(transfer) = self.transfers.get(&key) else {
                    return Err(TrellisError::unsupported(format!(
                        "no transfer registered from engine '{}' to '{}'",
                        base.engine(),
                        op.destination
                    )));
                };
                let moved = transfer(&base)?;
                if moved.engine() != &op.destination {
                    return Err(TrellisError::engine_mismatch(format!(
                        "transfer from '{}' to '{}' produced a relation on '{}'",
                        base.engine(),
                        op.destination,
                        moved.engine()
                    )));
                }
                Ok(moved)
            }
            RelationOp::Extension(op) => {
                let base = self.resolve(&op.base)?;
                if base.ptr_eq(&op.base) {
                    return Ok(relation.clone());
                }
                base.extend(op.payload.clone())
            }
        }
    }
}

impl std::fmt::Debug for TransferResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut pairs: Vec<String> = self
            .transfers
            .keys()
            .map(|(source, destination)| format!("{source} -> {destination}"))
            .collect();
        pairs.sort();
        f.debug_struct("TransferResolver")
            .field("transfers", &pairs)
            .finish()
    }
}
