//! Generic slice: sort by term keys, then keep a positional window.

use std::cmp::Ordering;

use common_error::TrellisResult;
use trellis_core::{Row, Value};

use crate::collection::RowCollection;
use crate::rows::{BoxedRows, RowIterable};
use crate::terms::SortTerm;

/// Sort materialized rows by the resolved order terms, then window them.
///
/// Each row's term keys are evaluated once up front; a single stable sort
/// compares keys term by term, flipping the comparison for descending
/// terms, so rows tied on every term keep their input order.
pub fn sorted_slice(
    rows: Vec<Row>,
    order_by: &[SortTerm],
    offset: usize,
    limit: Option<usize>,
) -> TrellisResult<RowCollection> {
    let mut decorated = Vec::with_capacity(rows.len());
    for row in rows {
        let mut keys = Vec::with_capacity(order_by.len());
        for term in order_by {
            keys.push((term.key)(&row)?);
        }
        decorated.push((keys, row));
    }
    decorated.sort_by(|(a, _), (b, _)| compare_keys(a, b, order_by));

    let windowed: Vec<Row> = decorated
        .into_iter()
        .map(|(_, row)| row)
        .skip(offset)
        .take(limit.unwrap_or(usize::MAX))
        .collect();
    Ok(RowCollection::new(windowed))
}

fn compare_keys(a: &[Value], b: &[Value], order_by: &[SortTerm]) -> Ordering {
    for ((x, y), term) in a.iter().zip(b).zip(order_by) {
        let ordering = if term.ascending {
            x.cmp(y)
        } else {
            y.cmp(x)
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Lazily skips and limits a source without materializing it.
///
/// This is the slice fallback when no order terms are given and the
/// source declined to window itself: a purely positional pass that pulls
/// the base only as far as the window requires.
pub struct WindowedRows {
    base: BoxedRows,
    skip: usize,
    remaining: Option<usize>,
}

impl WindowedRows {
    /// Skip `offset` rows of `base`, then emit at most `limit`.
    pub fn new(base: BoxedRows, offset: usize, limit: Option<usize>) -> Self {
        Self {
            base,
            skip: offset,
            remaining: limit,
        }
    }
}

impl RowIterable for WindowedRows {
    fn name(&self) -> &'static str {
        "WindowedRows"
    }

    fn next_row(&mut self) -> TrellisResult<Option<Row>> {
        if self.remaining == Some(0) {
            return Ok(None);
        }
        while self.skip > 0 {
            if self.base.next_row()?.is_none() {
                self.skip = 0;
                self.remaining = Some(0);
                return Ok(None);
            }
            self.skip -= 1;
        }
        match self.base.next_row()? {
            Some(row) => {
                if let Some(remaining) = self.remaining.as_mut() {
                    *remaining -= 1;
                }
                Ok(Some(row))
            }
            None => {
                self.remaining = Some(0);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::rows::LazyRows;
    use crate::terms::RowSortKey;

    use super::*;

    fn by(column: &'static str, ascending: bool) -> SortTerm {
        let key: RowSortKey = Arc::new(move |row: &Row| {
            Ok(row.get(&column.into()).cloned().unwrap_or(Value::Null))
        });
        SortTerm {
            name: column.to_string(),
            key,
            ascending,
        }
    }

    fn scores() -> Vec<Row> {
        vec![
            Row::new().with("a", 3i64).with("b", 1i64),
            Row::new().with("a", 1i64).with("b", 2i64),
            Row::new().with("a", 2i64).with("b", 3i64),
            Row::new().with("a", 1i64).with("b", 4i64),
        ]
    }

    fn column_values(rows: Vec<Row>, column: &str) -> Vec<i64> {
        rows.into_iter()
            .map(|row| match row.get(&column.into()) {
                Some(Value::Int64(v)) => *v,
                other => panic!("expected an integer, got {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_sorts_then_windows() {
        let mut sliced = sorted_slice(scores(), &[by("a", true)], 1, Some(2)).unwrap();
        let rows = sliced.collect_rows().unwrap();
        // Sorted by a: [1, 1, 2, 3]; window keeps the middle two.
        assert_eq!(column_values(rows, "a"), vec![1, 2]);
    }

    #[test]
    fn test_stable_on_ties() {
        let mut sliced = sorted_slice(scores(), &[by("a", true)], 0, None).unwrap();
        let rows = sliced.collect_rows().unwrap();
        // The two a=1 rows keep their input order b=2 before b=4.
        assert_eq!(column_values(rows, "b"), vec![2, 4, 3, 1]);
    }

    #[test]
    fn test_descending_flips_comparison_only() {
        let mut sliced = sorted_slice(scores(), &[by("a", false)], 0, None).unwrap();
        let rows = sliced.collect_rows().unwrap();
        assert_eq!(column_values(rows, "a"), vec![3, 2, 1, 1]);
        // Ties stay stable under descending terms too.
        let mut sliced = sorted_slice(scores(), &[by("a", false)], 2, None).unwrap();
        assert_eq!(
            column_values(sliced.collect_rows().unwrap(), "b"),
            vec![2, 4]
        );
    }

    #[test]
    fn test_secondary_term_breaks_ties() {
        let terms = [by("a", true), by("b", false)];
        let mut sliced = sorted_slice(scores(), &terms, 0, None).unwrap();
        let rows = sliced.collect_rows().unwrap();
        assert_eq!(column_values(rows, "b"), vec![4, 2, 3, 1]);
    }

    #[test]
    fn test_windowed_rows_pull_only_what_the_window_needs() {
        let base: BoxedRows = Box::new(LazyRows::from_rows(
            "numbers",
            (0..100i64).map(|n| Row::new().with("n", n)).collect(),
        ));
        let mut windowed = WindowedRows::new(base, 10, Some(2));
        let rows = windowed.collect_rows().unwrap();
        assert_eq!(column_values(rows, "n"), vec![10, 11]);
        // The limit was hit, so later pulls answer none without touching
        // the base again.
        assert!(windowed.next_row().unwrap().is_none());
    }

    #[test]
    fn test_windowed_rows_past_the_end() {
        let base: BoxedRows = Box::new(LazyRows::from_rows(
            "numbers",
            (0..3i64).map(|n| Row::new().with("n", n)).collect(),
        ));
        let mut windowed = WindowedRows::new(base, 5, None);
        assert!(windowed.next_row().unwrap().is_none());
        // The base's pass ended inside the skip; the window stays empty
        // instead of pulling the spent base again.
        assert!(windowed.next_row().unwrap().is_none());
    }
}
