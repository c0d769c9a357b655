//! Column and engine identity tags.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Identifier of a column, with global identity.
///
/// Equal tags denote the same column wherever they appear: a join
/// automatically equates columns its operands share, a union requires its
/// operands to carry identical tag sets, and behavioral terms name the
/// columns they need by tag alone. There is no per-relation namespace, so
/// two unrelated relations using the tag `id` are talking about the same
/// column.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnTag(Arc<str>);

impl ColumnTag {
    /// Create a new column tag.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// The canonical string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ColumnTag {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ColumnTag {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&ColumnTag> for ColumnTag {
    fn from(tag: &ColumnTag) -> Self {
        tag.clone()
    }
}

/// Identifier of an execution engine.
///
/// A relation belongs to exactly one engine at a time, and relations
/// combine directly only when their engine tags compare equal. Engine
/// behavior lives on engine values (and on capability traits they
/// implement), never on the tag itself.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EngineTag(Arc<str>);

impl EngineTag {
    /// Create a new engine tag.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// The canonical string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EngineTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EngineTag {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for EngineTag {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}
