//! Leaf relations: stored rows, referenced or embedded.

use std::collections::BTreeMap;
use std::sync::Arc;

use trellis_core::{ColumnSet, EngineTag, Row};

/// Where a leaf's rows come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafSource {
    /// Rows live with the engine; it resolves them by the leaf's name at
    /// execution time.
    Reference,
    /// Rows are embedded in the relation itself. This is the serializable
    /// kind, and the form transfers into the iteration engine arrive in.
    Rows(Arc<[Row]>),
}

/// A relation that directly represents stored rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    /// Name identifying the row source to its engine.
    pub name: String,
    /// Engine the rows belong to.
    pub engine: EngineTag,
    /// Columns every row carries.
    pub columns: ColumnSet,
    /// Declared by the source: rows are pairwise distinct.
    pub unique_rows: bool,
    /// Free-form descriptor for external sources (connection hints, paths).
    pub parameters: BTreeMap<String, String>,
    /// Referenced or embedded rows.
    pub source: LeafSource,
}

impl Leaf {
    /// Create a leaf whose rows the engine resolves by name.
    pub fn reference(
        name: impl Into<String>,
        engine: impl Into<EngineTag>,
        columns: ColumnSet,
    ) -> Self {
        Self {
            name: name.into(),
            engine: engine.into(),
            columns,
            unique_rows: false,
            parameters: BTreeMap::new(),
            source: LeafSource::Reference,
        }
    }

    /// Create a leaf with embedded rows.
    pub fn rows(
        name: impl Into<String>,
        engine: impl Into<EngineTag>,
        columns: ColumnSet,
        rows: Vec<Row>,
    ) -> Self {
        Self {
            name: name.into(),
            engine: engine.into(),
            columns,
            unique_rows: false,
            parameters: BTreeMap::new(),
            source: LeafSource::Rows(rows.into()),
        }
    }

    /// Declare that the source's rows are pairwise distinct.
    pub fn with_unique_rows(mut self, unique_rows: bool) -> Self {
        self.unique_rows = unique_rows;
        self
    }

    /// Attach a descriptor parameter.
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// The embedded rows, if this is a `Rows` leaf.
    pub fn embedded_rows(&self) -> Option<&Arc<[Row]>> {
        match &self.source {
            LeafSource::Rows(rows) => Some(rows),
            LeafSource::Reference => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_leaf() {
        let leaf = Leaf::reference("movies", "sql", ColumnSet::of(["id", "title"]))
            .with_parameter("table", "movies_v2");
        assert_eq!(leaf.name, "movies");
        assert!(leaf.embedded_rows().is_none());
        assert_eq!(leaf.parameters.get("table").map(String::as_str), Some("movies_v2"));
    }

    #[test]
    fn test_rows_leaf() {
        let rows = vec![Row::new().with("id", 1i64)];
        let leaf = Leaf::rows("ids", "iteration", ColumnSet::of(["id"]), rows).with_unique_rows(true);
        assert!(leaf.unique_rows);
        assert_eq!(leaf.embedded_rows().map(|r| r.len()), Some(1));
    }
}
