//! Extension operation: the escape hatch for foreign variants.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use trellis_core::ColumnSet;

use crate::props::RelationProps;
use crate::relation::Relation;

/// Behavior payload of an [`ExtensionOp`].
///
/// The payload describes the operation structurally (name, column and
/// property overrides, serialization extras); what it actually does to
/// rows is defined per engine, through capability traits the payload also
/// implements and engines discover via [`ExtensionBehavior::as_any`].
pub trait ExtensionBehavior: Send + Sync {
    /// Display name of the operation.
    fn name(&self) -> &str;

    /// Output columns, given the base's columns. Defaults to passthrough.
    fn columns(&self, base: &ColumnSet) -> ColumnSet {
        base.clone()
    }

    /// Output properties, given the base's. Defaults to passthrough.
    fn props(&self, base: RelationProps) -> RelationProps {
        base
    }

    /// Extra fields for the serialized form. Defaults to none.
    fn write_extra(&self) -> BTreeMap<String, serde_json::Value> {
        BTreeMap::new()
    }

    /// Downcast hook for engine capability lookups.
    fn as_any(&self) -> &dyn Any;
}

/// A relation variant the core vocabulary does not know.
#[derive(Clone)]
pub struct ExtensionOp {
    /// Base relation.
    pub base: Relation,
    /// The operation's behavior payload.
    pub payload: Arc<dyn ExtensionBehavior>,
}

impl ExtensionOp {
    /// Create a new extension.
    pub fn new(base: Relation, payload: Arc<dyn ExtensionBehavior>) -> Self {
        Self { base, payload }
    }
}

impl fmt::Debug for ExtensionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionOp")
            .field("base", &self.base)
            .field("payload", &self.payload.name())
            .finish()
    }
}

// Payloads have no structural identity, so extensions compare by payload
// instance.
impl PartialEq for ExtensionOp {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base && Arc::ptr_eq(&self.payload, &other.payload)
    }
}

impl Eq for ExtensionOp {}
