//! Lazy, forward-only row sources.
//!
//! Everything the engine produces or consumes satisfies [`RowIterable`]:
//! one row per pull, one full pass. The materialized, restartable kind
//! lives in [`crate::collection`]; everything else gets a single pass and
//! the provided single-pass type ([`LazyRows`]) poisons itself at the end
//! so an accidental second pass fails loudly instead of looking empty.

use common_error::{TrellisError, TrellisResult};
use trellis_core::{ColumnTag, Row};

use crate::collection::RowCollection;
use crate::terms::{RowPredicate, SortTerm};

/// A row source behind a fat pointer, the engine's working currency.
pub type BoxedRows = Box<dyn RowIterable>;

/// Outcome of a specialization hook.
pub enum FastPath {
    /// The hook produced the specialized result; the original source is
    /// spent and must be discarded.
    Applied(BoxedRows),
    /// The hook left the source untouched; run the generic algorithm.
    Declined,
}

/// Outcome of the join specialization hook.
///
/// The hook is handed ownership of the already-evaluated left operand, so
/// declining must give it back.
pub enum JoinFastPath {
    /// The hook consumed both operands and produced the joined rows.
    Applied(BoxedRows),
    /// The hook touched neither operand; here is the left one back.
    Declined(BoxedRows),
}

/// A lazy, forward-only sequence of rows.
///
/// The contract is a single full pass: callers pull rows until `Ok(None)`
/// and never visit a row twice. What happens on pulls past the end is the
/// implementation's choice; multi-pass implementations keep answering
/// `Ok(None)`, single-pass ones fail with a source-exhausted error.
///
/// The `try_*` hooks let a source take over an operation the engine would
/// otherwise run row by row, such as a pre-sorted source absorbing a
/// slice. Defaults decline everything. A specialization is lost as soon as
/// an intermediate operation wraps the source in a plain adapter, so hooks
/// only fire when the specialized source is the operation's direct input.
pub trait RowIterable: Send {
    /// Name of the source kind, for logs and error messages.
    fn name(&self) -> &'static str;

    /// Produce the next row, or `None` at the end of the pass.
    fn next_row(&mut self) -> TrellisResult<Option<Row>>;

    /// Drain the remaining rows into a vector.
    fn collect_rows(&mut self) -> TrellisResult<Vec<Row>> {
        let mut rows = Vec::new();
        while let Some(row) = self.next_row()? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// The materialized collection behind this source, if it is one.
    ///
    /// Lets the engine reuse already-materialized rows instead of copying
    /// them into a second collection.
    fn as_collection(&self) -> Option<&RowCollection> {
        None
    }

    /// Take over a selection with the given predicate state.
    fn try_selection(&mut self, _predicate: &RowPredicate) -> FastPath {
        FastPath::Declined
    }

    /// Take over a slice with resolved order terms and window bounds.
    fn try_slice(
        &mut self,
        _order_by: &[SortTerm],
        _offset: usize,
        _limit: Option<usize>,
    ) -> FastPath {
        FastPath::Declined
    }

    /// Take over a join as the right operand.
    ///
    /// `common` holds the automatically equated columns. A hook that
    /// applies must produce the equality join of `lhs` against itself in
    /// left-major order and nothing more; any explicit join condition is
    /// applied by the engine on top of the hook's output.
    fn try_join(&mut self, lhs: BoxedRows, _common: &[ColumnTag]) -> JoinFastPath {
        JoinFastPath::Declined(lhs)
    }
}

/// Single-pass rows over an arbitrary iterator.
///
/// After the underlying iterator ends, `next_row` answers `Ok(None)`
/// exactly once; every later pull is a source-exhausted error naming the
/// source. An error from the iterator also ends the pass.
pub struct LazyRows {
    source: String,
    inner: Option<Box<dyn Iterator<Item = TrellisResult<Row>> + Send>>,
}

impl LazyRows {
    /// Wrap a fallible row iterator.
    pub fn new(
        source: impl Into<String>,
        rows: impl Iterator<Item = TrellisResult<Row>> + Send + 'static,
    ) -> Self {
        Self {
            source: source.into(),
            inner: Some(Box::new(rows)),
        }
    }

    /// Wrap rows that are already in hand.
    pub fn from_rows(source: impl Into<String>, rows: Vec<Row>) -> Self {
        Self::new(source, rows.into_iter().map(Ok))
    }

    /// The name this source reports in exhaustion errors.
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl std::fmt::Debug for LazyRows {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyRows")
            .field("source", &self.source)
            .field("exhausted", &self.inner.is_none())
            .finish()
    }
}

impl RowIterable for LazyRows {
    fn name(&self) -> &'static str {
        "LazyRows"
    }

    fn next_row(&mut self) -> TrellisResult<Option<Row>> {
        let Some(inner) = self.inner.as_mut() else {
            return Err(TrellisError::source_exhausted(format!(
                "single-pass source '{}' was pulled again after its end",
                self.source
            )));
        };
        match inner.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => {
                self.inner = None;
                Err(e)
            }
            None => {
                self.inner = None;
                Ok(None)
            }
        }
    }
}

/// Drain a source into a vector, failing once `limit` rows are exceeded.
///
/// `operation` names the operation doing the materializing, so the error
/// says who asked for the rows as well as where they came from.
pub fn collect_rows_bounded(
    source: &mut dyn RowIterable,
    limit: Option<usize>,
    operation: &str,
) -> TrellisResult<Vec<Row>> {
    let mut rows = Vec::new();
    while let Some(row) = source.next_row()? {
        if let Some(limit) = limit {
            if rows.len() >= limit {
                return Err(TrellisError::row_limit(format!(
                    "{operation} materialized more than {limit} rows from {}",
                    source.name()
                )));
            }
        }
        rows.push(row);
    }
    Ok(rows)
}
