//! Generic distinct: first-seen-order deduplication.

use std::collections::HashSet;

use log::debug;

use common_error::{TrellisError, TrellisResult};
use trellis_core::Row;

use crate::collection::RowCollection;
use crate::rows::{BoxedRows, RowIterable};

/// Materialize the source's distinct rows, keeping first-seen order.
///
/// The whole row is the dedup key. The result is a restartable
/// collection, so downstream multi-pass consumers reuse it directly. The
/// guard counts rows kept, not rows consumed: a long stream of
/// duplicates stays within a small limit.
pub fn distinct_rows(
    mut source: BoxedRows,
    max_rows: Option<usize>,
) -> TrellisResult<RowCollection> {
    let mut seen: HashSet<Row> = HashSet::new();
    let mut kept: Vec<Row> = Vec::new();
    let mut consumed = 0usize;
    while let Some(row) = source.next_row()? {
        consumed += 1;
        if seen.contains(&row) {
            continue;
        }
        if let Some(limit) = max_rows {
            if kept.len() >= limit {
                return Err(TrellisError::row_limit(format!(
                    "distinct materialized more than {limit} rows from {}",
                    source.name()
                )));
            }
        }
        seen.insert(row.clone());
        kept.push(row);
    }
    debug!("distinct: {} rows in, {} kept", consumed, kept.len());
    Ok(RowCollection::new(kept))
}
