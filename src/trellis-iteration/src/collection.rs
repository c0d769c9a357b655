//! Materialized, restartable row storage.
//!
//! [`RowCollection`] is the multi-pass counterpart to the single-pass
//! sources in [`crate::rows`]: rows live in a shared `Arc<[Row]>`, so
//! clones, restarts, and positional windows never copy row data. The
//! collection also builds the hash indexes the join fallback probes.

use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

use log::debug;

use common_error::{TrellisError, TrellisResult};
use trellis_core::{ColumnTag, Row, Value};

use crate::rows::{FastPath, RowIterable};
use crate::terms::SortTerm;

/// Extract the values of `columns` from a row, as an index or probe key.
///
/// Rows reaching here come from bound sources the factories never saw, so
/// a declared column can genuinely be missing; that is the row's defect,
/// not the key's.
pub(crate) fn row_key(row: &Row, columns: &[ColumnTag]) -> TrellisResult<Vec<Value>> {
    if let Some(key) = row.key(columns) {
        return Ok(key);
    }
    let missing = columns
        .iter()
        .find(|column| row.get(column).is_none())
        .map(ToString::to_string)
        .unwrap_or_default();
    Err(TrellisError::malformed_row(format!(
        "row lacks key column '{missing}'"
    )))
}

/// Materialized rows with a cursor, restartable without limit.
///
/// A collection is a positional window over shared rows. Iterating moves
/// only the cursor; [`RowCollection::restarted`] hands out a fresh pass
/// over the same window, and the slice fast path narrows the window
/// without touching the rows.
#[derive(Debug, Clone)]
pub struct RowCollection {
    rows: Arc<[Row]>,
    range: Range<usize>,
    cursor: usize,
}

impl RowCollection {
    /// Materialize a vector of rows.
    pub fn new(rows: Vec<Row>) -> Self {
        Self::from_shared(rows.into())
    }

    /// Wrap already-shared rows without copying them.
    pub fn from_shared(rows: Arc<[Row]>) -> Self {
        let range = 0..rows.len();
        Self {
            rows,
            range,
            cursor: 0,
        }
    }

    /// Number of rows in the window.
    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// Whether the window holds no rows.
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// A fresh pass over the same window.
    pub fn restarted(&self) -> Self {
        Self {
            rows: self.rows.clone(),
            range: self.range.clone(),
            cursor: self.range.start,
        }
    }

    /// Iterate the window without moving the cursor.
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows[self.range.clone()].iter()
    }

    /// Narrow the window positionally; out-of-range bounds clamp to empty.
    fn window(&self, offset: usize, limit: Option<usize>) -> Self {
        let start = self.range.start.saturating_add(offset).min(self.range.end);
        let end = match limit {
            Some(limit) => start.saturating_add(limit).min(self.range.end),
            None => self.range.end,
        };
        Self {
            rows: self.rows.clone(),
            range: start..end,
            cursor: start,
        }
    }

    /// Index the window by `columns`, keeping one row per key.
    ///
    /// Only sound when the key covers every column of these rows: a
    /// repeated key is then a full-row duplicate and keeping the first
    /// occurrence loses nothing.
    pub fn unique_index(&self, columns: &[ColumnTag]) -> TrellisResult<UniqueIndex> {
        let mut slots = HashMap::with_capacity(self.len());
        for position in self.range.clone() {
            let key = row_key(&self.rows[position], columns)?;
            slots.entry(key).or_insert(position);
        }
        Ok(UniqueIndex {
            rows: self.rows.clone(),
            slots,
        })
    }

    /// Index the window by `columns`, keeping every row per key in
    /// insertion order.
    pub fn general_index(&self, columns: &[ColumnTag]) -> TrellisResult<GeneralIndex> {
        let mut slots: HashMap<Vec<Value>, Vec<usize>> = HashMap::new();
        for position in self.range.clone() {
            let key = row_key(&self.rows[position], columns)?;
            slots.entry(key).or_default().push(position);
        }
        Ok(GeneralIndex {
            rows: self.rows.clone(),
            slots,
        })
    }
}

impl RowIterable for RowCollection {
    fn name(&self) -> &'static str {
        "RowCollection"
    }

    fn next_row(&mut self) -> TrellisResult<Option<Row>> {
        if self.cursor >= self.range.end {
            return Ok(None);
        }
        let row = self.rows[self.cursor].clone();
        self.cursor += 1;
        Ok(Some(row))
    }

    fn as_collection(&self) -> Option<&RowCollection> {
        Some(self)
    }

    fn try_slice(
        &mut self,
        order_by: &[SortTerm],
        offset: usize,
        limit: Option<usize>,
    ) -> FastPath {
        if !order_by.is_empty() {
            return FastPath::Declined;
        }
        debug!(
            "slice fast path: positional window over {} materialized rows",
            self.len()
        );
        FastPath::Applied(Box::new(self.window(offset, limit)))
    }
}

/// Hash index holding one row per key.
#[derive(Debug, Clone)]
pub struct UniqueIndex {
    rows: Arc<[Row]>,
    slots: HashMap<Vec<Value>, usize>,
}

impl UniqueIndex {
    /// The row stored under `key`, if any.
    pub fn get(&self, key: &[Value]) -> Option<&Row> {
        self.slots.get(key).map(|&position| &self.rows[position])
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the index holds no keys.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Hash index holding every row per key, in insertion order.
#[derive(Debug, Clone)]
pub struct GeneralIndex {
    rows: Arc<[Row]>,
    slots: HashMap<Vec<Value>, Vec<usize>>,
}

impl GeneralIndex {
    /// Positions of the rows stored under `key`, oldest first.
    pub fn matches(&self, key: &[Value]) -> &[usize] {
        self.slots.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The row at an indexed position.
    pub fn row_at(&self, position: usize) -> &Row {
        &self.rows[position]
    }

    /// Number of distinct keys.
    pub fn key_count(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use common_error::ExecutionError;
    use trellis_core::ColumnTag;

    use super::*;

    fn collection() -> RowCollection {
        RowCollection::new(vec![
            Row::new().with("a", 1i64).with("b", 10i64),
            Row::new().with("a", 1i64).with("b", 20i64),
            Row::new().with("a", 2i64).with("b", 30i64),
        ])
    }

    fn tags(names: &[&str]) -> Vec<ColumnTag> {
        names.iter().map(|name| ColumnTag::from(*name)).collect()
    }

    #[test]
    fn test_multiple_passes() {
        let mut first = collection();
        assert_eq!(first.collect_rows().unwrap().len(), 3);
        // Past the end a collection just keeps answering none.
        assert!(first.next_row().unwrap().is_none());

        let mut second = first.restarted();
        assert_eq!(second.collect_rows().unwrap().len(), 3);
    }

    #[test]
    fn test_positional_slice_fast_path() {
        let mut rows = collection();
        let FastPath::Applied(mut window) = rows.try_slice(&[], 1, Some(1)) else {
            panic!("positional slice over a collection must apply");
        };
        let out = window.collect_rows().unwrap();
        assert_eq!(out, vec![Row::new().with("a", 1i64).with("b", 20i64)]);
    }

    #[test]
    fn test_windows_clamp_and_nest() {
        let rows = collection();
        assert!(rows.window(5, None).is_empty());
        assert_eq!(rows.window(1, Some(10)).len(), 2);

        // A window of a window stays positional over the outer window.
        let tail = rows.window(1, None);
        let mut inner = tail.window(1, Some(1));
        assert_eq!(
            inner.next_row().unwrap(),
            Some(Row::new().with("a", 2i64).with("b", 30i64))
        );
    }

    #[test]
    fn test_sorted_order_terms_decline() {
        let key: crate::terms::RowSortKey =
            Arc::new(|row| Ok(row.get(&"a".into()).cloned().unwrap_or(Value::Null)));
        let term = SortTerm {
            name: "by_a".to_string(),
            key,
            ascending: true,
        };
        assert!(matches!(
            collection().try_slice(&[term], 0, None),
            FastPath::Declined
        ));
    }

    #[test]
    fn test_unique_index_keeps_first_occurrence() {
        let rows = RowCollection::new(vec![
            Row::new().with("a", 1i64).with("b", 10i64),
            Row::new().with("a", 1i64).with("b", 10i64),
            Row::new().with("a", 2i64).with("b", 30i64),
        ]);
        let index = rows.unique_index(&tags(&["a", "b"])).unwrap();
        assert_eq!(index.len(), 2);
        let hit = index
            .get(&[Value::Int64(1), Value::Int64(10)])
            .expect("key must be present");
        assert_eq!(hit.get(&"b".into()), Some(&Value::Int64(10)));
        assert!(index.get(&[Value::Int64(9), Value::Int64(9)]).is_none());
    }

    #[test]
    fn test_general_index_keeps_per_key_order() {
        let rows = collection();
        let index = rows.general_index(&tags(&["a"])).unwrap();
        assert_eq!(index.key_count(), 2);

        let positions = index.matches(&[Value::Int64(1)]);
        assert_eq!(positions.len(), 2);
        assert_eq!(
            index.row_at(positions[0]).get(&"b".into()),
            Some(&Value::Int64(10))
        );
        assert_eq!(
            index.row_at(positions[1]).get(&"b".into()),
            Some(&Value::Int64(20))
        );
        assert!(index.matches(&[Value::Int64(9)]).is_empty());
    }

    #[test]
    fn test_missing_key_column_is_malformed() {
        let rows = RowCollection::new(vec![Row::new().with("a", 1i64)]);
        let err = rows.general_index(&tags(&["a", "b"])).unwrap_err();
        assert!(matches!(
            err,
            TrellisError::Execution(ExecutionError::MalformedRow(_))
        ));
        assert!(err.to_string().contains("'b'"));
    }
}
