//! Row representation for engines that exchange materialized rows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::columns::ColumnSet;
use crate::tags::ColumnTag;
use crate::value::Value;

/// A mapping from column tag to value.
///
/// Column order is the tags' canonical order, so equal rows hash, compare,
/// and serialize identically. The derived `Eq`/`Hash` make whole rows usable
/// as dedup keys directly; [`Row::key`] extracts the sub-tuple used for join
/// probes and indexes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<ColumnTag, Value>);

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, tag: impl Into<ColumnTag>, value: impl Into<Value>) -> Self {
        self.0.insert(tag.into(), value.into());
        self
    }

    /// Get the value of a column.
    pub fn get(&self, tag: &ColumnTag) -> Option<&Value> {
        self.0.get(tag)
    }

    /// Number of columns in the row.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The row's column tags as a set.
    pub fn columns(&self) -> ColumnSet {
        self.0.keys().cloned().collect()
    }

    /// A new row keeping only the listed columns.
    ///
    /// Columns absent from the row are silently skipped; callers that need
    /// the distinction validate against [`Row::columns`] first.
    pub fn project(&self, columns: &ColumnSet) -> Self {
        Self(
            self.0
                .iter()
                .filter(|(tag, _)| columns.contains(tag))
                .map(|(tag, value)| (tag.clone(), value.clone()))
                .collect(),
        )
    }

    /// A new row combining both rows' columns.
    ///
    /// On shared tags the value from `other` wins. Join merges rely on
    /// shared tags already holding equal values, so the choice only matters
    /// for callers merging unconstrained rows.
    pub fn merged(&self, other: &Self) -> Self {
        let mut merged = self.0.clone();
        for (tag, value) in &other.0 {
            merged.insert(tag.clone(), value.clone());
        }
        Self(merged)
    }

    /// Extract the values of `columns`, in the given order.
    ///
    /// Returns `None` when any column is missing; probe and index builders
    /// turn that into an execution error naming the row source.
    pub fn key(&self, columns: &[ColumnTag]) -> Option<Vec<Value>> {
        columns
            .iter()
            .map(|tag| self.0.get(tag).cloned())
            .collect()
    }

    /// Iterate `(tag, value)` pairs in canonical column order.
    pub fn iter(&self) -> impl Iterator<Item = (&ColumnTag, &Value)> {
        self.0.iter()
    }
}

impl FromIterator<(ColumnTag, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (ColumnTag, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
