//! Transfer operation: the sanctioned engine change.

use trellis_core::EngineTag;

use crate::relation::Relation;

/// Marks that the base's rows move to another engine.
///
/// A transfer changes nothing but the engine tag. How rows actually cross
/// is the destination engine's business: the iteration engine asks the
/// source engine's exporter, and `TransferResolver` handles the general
/// engine-pair case ahead of execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOp {
    /// Base relation, still in the source engine.
    pub base: Relation,
    /// Engine the rows move to.
    pub destination: EngineTag,
}

impl TransferOp {
    /// Create a new transfer.
    pub fn new(base: Relation, destination: EngineTag) -> Self {
        Self { base, destination }
    }
}
