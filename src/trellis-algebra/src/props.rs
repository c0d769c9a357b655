//! Statically derived relation properties.

/// Facts about a relation's row stream that are known without executing it.
///
/// Factories compute these at construction and propagate them
/// conservatively: a flag is set only when the operation guarantees it, so
/// a `false` never lies while a `true` can be exploited (a distinct over an
/// already-unique base collapses, a slice with `limit = 1` is known to be
/// at most one row, and so on).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelationProps {
    /// Rows are pairwise distinct.
    pub unique_rows: bool,

    /// The relation can produce at most one row.
    pub at_most_one_row: bool,

    /// Row order is fully determined, either by order terms or trivially.
    pub fully_ordered: bool,
}

impl RelationProps {
    /// Props asserting nothing.
    pub const fn none() -> Self {
        Self {
            unique_rows: false,
            at_most_one_row: false,
            fully_ordered: false,
        }
    }

    /// Props of a relation holding at most one row.
    ///
    /// A single row is trivially unique and trivially ordered.
    pub const fn single_row() -> Self {
        Self {
            unique_rows: true,
            at_most_one_row: true,
            fully_ordered: true,
        }
    }
}
