//! Generic projection: row-by-row column subsetting.

use common_error::{TrellisError, TrellisResult};
use trellis_core::{ColumnSet, Row};

use crate::rows::{BoxedRows, RowIterable};

/// Lazily narrows each of the base's rows to a subset of its columns.
pub struct ProjectedRows {
    base: BoxedRows,
    columns: ColumnSet,
}

impl ProjectedRows {
    /// Keep only `columns` of each row `base` produces.
    pub fn new(base: BoxedRows, columns: ColumnSet) -> Self {
        Self { base, columns }
    }
}

impl RowIterable for ProjectedRows {
    fn name(&self) -> &'static str {
        "ProjectedRows"
    }

    fn next_row(&mut self) -> TrellisResult<Option<Row>> {
        let Some(row) = self.base.next_row()? else {
            return Ok(None);
        };
        let narrowed = row.project(&self.columns);
        // Bound sources can hand over rows narrower than their leaf
        // declared; catch that here instead of emitting short rows.
        if narrowed.len() != self.columns.len() {
            let missing = self
                .columns
                .iter()
                .find(|column| row.get(column).is_none())
                .map(ToString::to_string)
                .unwrap_or_default();
            return Err(TrellisError::malformed_row(format!(
                "row lacks projected column '{missing}'"
            )));
        }
        Ok(Some(narrowed))
    }
}
