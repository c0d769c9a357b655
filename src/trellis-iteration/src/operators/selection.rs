//! Generic selection: row-by-row predicate filtering.

use common_error::TrellisResult;
use trellis_core::Row;

use crate::rows::{BoxedRows, RowIterable};
use crate::terms::RowPredicate;

/// Lazily keeps the base's rows that satisfy a predicate.
pub struct FilteredRows {
    base: BoxedRows,
    predicate: RowPredicate,
}

impl FilteredRows {
    /// Filter `base` by the resolved predicate state.
    pub fn new(base: BoxedRows, predicate: RowPredicate) -> Self {
        Self { base, predicate }
    }
}

impl RowIterable for FilteredRows {
    fn name(&self) -> &'static str {
        "FilteredRows"
    }

    fn next_row(&mut self) -> TrellisResult<Option<Row>> {
        while let Some(row) = self.base.next_row()? {
            if (self.predicate)(&row)? {
                return Ok(Some(row));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use common_error::TrellisError;
    use trellis_core::Value;

    use crate::rows::LazyRows;

    use super::*;

    fn numbers() -> BoxedRows {
        Box::new(LazyRows::from_rows(
            "numbers",
            (0..6i64).map(|n| Row::new().with("n", n)).collect(),
        ))
    }

    #[test]
    fn test_keeps_matching_rows_in_order() {
        let even: RowPredicate = Arc::new(|row| {
            Ok(matches!(row.get(&"n".into()), Some(Value::Int64(n)) if n % 2 == 0))
        });
        let mut filtered = FilteredRows::new(numbers(), even);
        let values: Vec<_> = filtered
            .collect_rows()
            .unwrap()
            .into_iter()
            .map(|row| row.get(&"n".into()).cloned().unwrap())
            .collect();
        assert_eq!(
            values,
            vec![Value::Int64(0), Value::Int64(2), Value::Int64(4)]
        );
    }

    #[test]
    fn test_predicate_errors_propagate() {
        let broken: RowPredicate =
            Arc::new(|_| Err(TrellisError::term_evaluation("predicate 'even': boom")));
        let mut filtered = FilteredRows::new(numbers(), broken);
        assert!(filtered.next_row().is_err());
    }
}
