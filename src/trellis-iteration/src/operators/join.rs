//! Generic join: hash-probe against a materialized right operand.
//!
//! The left operand streams; the right operand is already materialized
//! and indexed by the common columns, the automatic equality constraint.
//! Output order is left-major: the left operand's order is primary, and
//! for a fixed left row matches come out in the right operand's own
//! order. With no common columns every left row probes the same empty
//! key and the join degenerates to a cross product, still left-major.

use log::debug;

use common_error::TrellisResult;
use trellis_core::{ColumnTag, Row};

use crate::collection::{row_key, GeneralIndex, RowCollection, UniqueIndex};
use crate::rows::{BoxedRows, RowIterable};
use crate::terms::{JoinMatch, RowCondition};

/// Index the right operand and stream the join of `lhs` against it.
///
/// `rhs_unique` declares that the common columns cover all of the right
/// operand's columns and its rows are unique, which admits the one-row-
/// per-key index; otherwise every row per key is kept.
pub fn hash_join(
    lhs: BoxedRows,
    rhs: &RowCollection,
    common: &[ColumnTag],
    rhs_unique: bool,
) -> TrellisResult<BoxedRows> {
    if rhs_unique {
        let index = rhs.unique_index(common)?;
        debug!(
            "join: unique index over {} rows on {} common columns",
            index.len(),
            common.len()
        );
        Ok(Box::new(UniqueJoinRows {
            lhs,
            index,
            common: common.to_vec(),
        }))
    } else {
        let index = rhs.general_index(common)?;
        debug!(
            "join: general index over {} rows ({} keys) on {} common columns",
            rhs.len(),
            index.key_count(),
            common.len()
        );
        Ok(Box::new(GeneralJoinRows {
            lhs,
            index,
            common: common.to_vec(),
            pending: None,
        }))
    }
}

/// Join against a right operand with at most one row per probe key.
pub struct UniqueJoinRows {
    lhs: BoxedRows,
    index: UniqueIndex,
    common: Vec<ColumnTag>,
}

impl RowIterable for UniqueJoinRows {
    fn name(&self) -> &'static str {
        "UniqueJoinRows"
    }

    fn next_row(&mut self) -> TrellisResult<Option<Row>> {
        while let Some(lrow) = self.lhs.next_row()? {
            let key = row_key(&lrow, &self.common)?;
            if let Some(rrow) = self.index.get(&key) {
                return Ok(Some(lrow.merged(rrow)));
            }
        }
        Ok(None)
    }
}

/// Join against a right operand that may repeat probe keys.
pub struct GeneralJoinRows {
    lhs: BoxedRows,
    index: GeneralIndex,
    common: Vec<ColumnTag>,
    /// The current left row and its remaining match positions.
    pending: Option<(Row, std::vec::IntoIter<usize>)>,
}

impl RowIterable for GeneralJoinRows {
    fn name(&self) -> &'static str {
        "GeneralJoinRows"
    }

    fn next_row(&mut self) -> TrellisResult<Option<Row>> {
        loop {
            if let Some((lrow, positions)) = self.pending.as_mut() {
                if let Some(position) = positions.next() {
                    let merged = lrow.merged(self.index.row_at(position));
                    return Ok(Some(merged));
                }
                self.pending = None;
            }
            let Some(lrow) = self.lhs.next_row()? else {
                return Ok(None);
            };
            let key = row_key(&lrow, &self.common)?;
            let positions = self.index.matches(&key).to_vec();
            self.pending = Some((lrow, positions.into_iter()));
        }
    }
}

/// Applies an explicit join condition on top of equality-joined rows.
///
/// The condition sees each merged candidate and may keep it, replace it,
/// or drop it.
pub struct ConditionedRows {
    base: BoxedRows,
    condition: RowCondition,
}

impl ConditionedRows {
    /// Screen `base`'s rows through the resolved condition state.
    pub fn new(base: BoxedRows, condition: RowCondition) -> Self {
        Self { base, condition }
    }
}

impl RowIterable for ConditionedRows {
    fn name(&self) -> &'static str {
        "ConditionedRows"
    }

    fn next_row(&mut self) -> TrellisResult<Option<Row>> {
        while let Some(row) = self.base.next_row()? {
            match (self.condition)(&row)? {
                JoinMatch::Keep => return Ok(Some(row)),
                JoinMatch::Replace(replacement) => return Ok(Some(replacement)),
                JoinMatch::Skip => {}
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use common_error::{ExecutionError, TrellisError};
    use trellis_core::Value;

    use crate::rows::LazyRows;

    use super::*;

    fn lhs_rows() -> BoxedRows {
        Box::new(LazyRows::from_rows(
            "lhs",
            vec![
                Row::new().with("a", 1i64),
                Row::new().with("a", 2i64),
                Row::new().with("a", 3i64),
            ],
        ))
    }

    fn rhs_rows() -> RowCollection {
        RowCollection::new(vec![
            Row::new().with("a", 1i64).with("b", 10i64),
            Row::new().with("a", 1i64).with("b", 20i64),
            Row::new().with("a", 2i64).with("b", 30i64),
        ])
    }

    fn pairs(rows: Vec<Row>) -> Vec<(i64, i64)> {
        rows.into_iter()
            .map(|row| {
                let Some(Value::Int64(a)) = row.get(&"a".into()).cloned() else {
                    panic!("join output must carry 'a'");
                };
                let Some(Value::Int64(b)) = row.get(&"b".into()).cloned() else {
                    panic!("join output must carry 'b'");
                };
                (a, b)
            })
            .collect()
    }

    #[test]
    fn test_general_join_is_left_major() {
        let common = vec![ColumnTag::from("a")];
        let mut joined = hash_join(lhs_rows(), &rhs_rows(), &common, false).unwrap();
        assert_eq!(
            pairs(joined.collect_rows().unwrap()),
            vec![(1, 10), (1, 20), (2, 30)]
        );
    }

    #[test]
    fn test_unique_join_probes_single_rows() {
        let rhs = RowCollection::new(vec![
            Row::new().with("a", 1i64),
            Row::new().with("a", 3i64),
        ]);
        let common = vec![ColumnTag::from("a")];
        let mut joined = hash_join(lhs_rows(), &rhs, &common, true).unwrap();
        let values: Vec<_> = joined
            .collect_rows()
            .unwrap()
            .into_iter()
            .map(|row| row.get(&"a".into()).cloned().unwrap())
            .collect();
        assert_eq!(values, vec![Value::Int64(1), Value::Int64(3)]);
    }

    #[test]
    fn test_no_common_columns_is_a_cross_product() {
        let lhs: BoxedRows = Box::new(LazyRows::from_rows(
            "lhs",
            vec![Row::new().with("a", 1i64), Row::new().with("a", 2i64)],
        ));
        let rhs = RowCollection::new(vec![
            Row::new().with("b", 10i64),
            Row::new().with("b", 20i64),
        ]);
        let mut joined = hash_join(lhs, &rhs, &[], false).unwrap();
        assert_eq!(
            pairs(joined.collect_rows().unwrap()),
            vec![(1, 10), (1, 20), (2, 10), (2, 20)]
        );
    }

    #[test]
    fn test_probe_row_missing_key_column_fails() {
        let lhs: BoxedRows = Box::new(LazyRows::from_rows(
            "lhs",
            vec![Row::new().with("oops", 1i64)],
        ));
        let common = vec![ColumnTag::from("a")];
        let mut joined = hash_join(lhs, &rhs_rows(), &common, false).unwrap();
        let err = joined.next_row().unwrap_err();
        assert!(matches!(
            err,
            TrellisError::Execution(ExecutionError::MalformedRow(_))
        ));
    }

    #[test]
    fn test_conditioned_rows_keep_replace_skip() {
        let base: BoxedRows = Box::new(LazyRows::from_rows(
            "merged",
            vec![
                Row::new().with("a", 1i64),
                Row::new().with("a", 2i64),
                Row::new().with("a", 3i64),
            ],
        ));
        let condition: RowCondition = Arc::new(|row| {
            Ok(match row.get(&"a".into()) {
                Some(Value::Int64(1)) => JoinMatch::Keep,
                Some(Value::Int64(2)) => JoinMatch::Skip,
                _ => JoinMatch::Replace(Row::new().with("a", 0i64)),
            })
        });
        let mut screened = ConditionedRows::new(base, condition);
        let values: Vec<_> = screened
            .collect_rows()
            .unwrap()
            .into_iter()
            .map(|row| row.get(&"a".into()).cloned().unwrap())
            .collect();
        assert_eq!(values, vec![Value::Int64(1), Value::Int64(0)]);
    }
}
