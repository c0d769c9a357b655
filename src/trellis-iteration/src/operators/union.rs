//! Generic union: lazy concatenation of operand sequences.

use common_error::TrellisResult;
use trellis_core::Row;

use crate::rows::{BoxedRows, RowIterable};

/// Emits each source's rows in turn, in declared source order.
///
/// No deduplication happens here; a union keeps every operand row and an
/// explicit distinct on top is what eliminates duplicates.
pub struct ChainRows {
    sources: std::vec::IntoIter<BoxedRows>,
    current: Option<BoxedRows>,
}

impl ChainRows {
    /// Chain the given sources in order.
    pub fn new(sources: Vec<BoxedRows>) -> Self {
        let mut sources = sources.into_iter();
        let current = sources.next();
        Self { sources, current }
    }
}

impl RowIterable for ChainRows {
    fn name(&self) -> &'static str {
        "ChainRows"
    }

    fn next_row(&mut self) -> TrellisResult<Option<Row>> {
        while let Some(current) = self.current.as_mut() {
            if let Some(row) = current.next_row()? {
                return Ok(Some(row));
            }
            self.current = self.sources.next();
        }
        Ok(None)
    }
}
