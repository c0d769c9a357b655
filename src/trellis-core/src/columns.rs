//! Ordered sets of column tags.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tags::ColumnTag;

/// An ordered set of column tags.
///
/// Relations, terms, and projections all describe the columns they touch
/// with a `ColumnSet`. Iteration follows the tags' canonical order, so
/// anything derived from a set (join keys, serialized forms, display
/// output) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnSet(BTreeSet<ColumnTag>);

impl ColumnSet {
    /// Create an empty column set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a column set from anything tag-like.
    pub fn of<I, T>(tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ColumnTag>,
    {
        Self(tags.into_iter().map(Into::into).collect())
    }

    /// Insert a tag, returning whether it was newly added.
    pub fn insert(&mut self, tag: impl Into<ColumnTag>) -> bool {
        self.0.insert(tag.into())
    }

    /// Check if a tag is present.
    pub fn contains(&self, tag: &ColumnTag) -> bool {
        self.0.contains(tag)
    }

    /// Number of tags in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate tags in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &ColumnTag> {
        self.0.iter()
    }

    /// Check if every tag here is also in `other`.
    pub fn is_subset(&self, other: &Self) -> bool {
        self.0.is_subset(&other.0)
    }

    /// Tags present in either set.
    pub fn union(&self, other: &Self) -> Self {
        Self(self.0.union(&other.0).cloned().collect())
    }

    /// Tags present in both sets.
    pub fn intersection(&self, other: &Self) -> Self {
        Self(self.0.intersection(&other.0).cloned().collect())
    }

    /// Tags present here but not in `other`.
    pub fn difference(&self, other: &Self) -> Self {
        Self(self.0.difference(&other.0).cloned().collect())
    }

    /// The tags as an ordered vector.
    pub fn to_vec(&self) -> Vec<ColumnTag> {
        self.0.iter().cloned().collect()
    }
}

impl fmt::Display for ColumnSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, tag) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{tag}")?;
        }
        write!(f, "}}")
    }
}

impl FromIterator<ColumnTag> for ColumnSet {
    fn from_iter<I: IntoIterator<Item = ColumnTag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ColumnSet {
    type Item = &'a ColumnTag;
    type IntoIter = std::collections::btree_set::Iter<'a, ColumnTag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for ColumnSet {
    type Item = ColumnTag;
    type IntoIter = std::collections::btree_set::IntoIter<ColumnTag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
