//! Core error types for trellis.

use thiserror::Error;

/// Result type alias using `TrellisError`.
pub type TrellisResult<T> = std::result::Result<T, TrellisError>;

/// Top-level error type for trellis operations.
///
/// Errors fall into two broad classes with different lifetimes:
/// [`ConstructionError`] is raised eagerly while a relation tree is being
/// built and is never deferred; [`ExecutionError`] is raised lazily, at the
/// produce-next-row step that triggered it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TrellisError {
    /// An invariant violation caught while building a relation tree.
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    /// A failure surfaced while an engine was producing rows.
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// An engine met a relation variant it does not implement.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// A serialized relation tree could not be read or written.
    #[error("SerializationError: {0}")]
    Serialization(String),
}

/// Invariant violations raised by relation factories.
///
/// These are always local and immediate: a tree that would violate an
/// invariant is never built, so no construction error is ever observed
/// during execution.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConstructionError {
    /// A relation would carry an empty column set.
    #[error("EmptyColumns: {0}")]
    EmptyColumns(String),

    /// Referenced columns are not provided by the operand relation(s).
    #[error("ColumnMismatch: {0}")]
    ColumnMismatch(String),

    /// Operand engine tags disagree where they must match.
    #[error("EngineMismatch: {0}")]
    EngineMismatch(String),

    /// A behavioral term carries no state for the relation's engine.
    #[error("MissingEngineState: {0}")]
    MissingEngineState(String),

    /// Slice bounds that could never produce a row.
    #[error("InvalidBounds: {0}")]
    InvalidBounds(String),

    /// An operation was given fewer operands than it requires.
    #[error("TooFewOperands: {0}")]
    TooFewOperands(String),
}

/// Failures raised while an engine is producing rows.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExecutionError {
    /// A reference leaf has no row source bound under its name.
    #[error("UnresolvedLeaf: {0}")]
    UnresolvedLeaf(String),

    /// A single-pass row source was pulled again after exhaustion.
    #[error("SourceExhausted: {0}")]
    SourceExhausted(String),

    /// No exporter is registered for a transfer's engine pair.
    #[error("NoExporter: {0}")]
    NoExporter(String),

    /// A per-engine callable failed while evaluating a term.
    #[error("TermEvaluation: {0}")]
    TermEvaluation(String),

    /// A term carries state for the engine, but not of the expected type.
    #[error("BadTermState: {0}")]
    BadTermState(String),

    /// A row from a bound source lacks a column its relation declares.
    #[error("MalformedRow: {0}")]
    MalformedRow(String),

    /// Materializing rows exceeded the configured limit.
    #[error("RowLimit: {0}")]
    RowLimit(String),
}

impl TrellisError {
    /// Create a new `Unsupported` error.
    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Create a new `Serialization` error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        Self::Serialization(msg.into())
    }

    /// Create a new `EmptyColumns` construction error.
    pub fn empty_columns<S: Into<String>>(msg: S) -> Self {
        ConstructionError::EmptyColumns(msg.into()).into()
    }

    /// Create a new `ColumnMismatch` construction error.
    pub fn column_mismatch<S: Into<String>>(msg: S) -> Self {
        ConstructionError::ColumnMismatch(msg.into()).into()
    }

    /// Create a new `EngineMismatch` construction error.
    pub fn engine_mismatch<S: Into<String>>(msg: S) -> Self {
        ConstructionError::EngineMismatch(msg.into()).into()
    }

    /// Create a new `MissingEngineState` construction error.
    pub fn missing_engine_state<S: Into<String>>(msg: S) -> Self {
        ConstructionError::MissingEngineState(msg.into()).into()
    }

    /// Create a new `InvalidBounds` construction error.
    pub fn invalid_bounds<S: Into<String>>(msg: S) -> Self {
        ConstructionError::InvalidBounds(msg.into()).into()
    }

    /// Create a new `TooFewOperands` construction error.
    pub fn too_few_operands<S: Into<String>>(msg: S) -> Self {
        ConstructionError::TooFewOperands(msg.into()).into()
    }

    /// Create a new `UnresolvedLeaf` execution error.
    pub fn unresolved_leaf<S: Into<String>>(msg: S) -> Self {
        ExecutionError::UnresolvedLeaf(msg.into()).into()
    }

    /// Create a new `SourceExhausted` execution error.
    pub fn source_exhausted<S: Into<String>>(msg: S) -> Self {
        ExecutionError::SourceExhausted(msg.into()).into()
    }

    /// Create a new `NoExporter` execution error.
    pub fn no_exporter<S: Into<String>>(msg: S) -> Self {
        ExecutionError::NoExporter(msg.into()).into()
    }

    /// Create a new `TermEvaluation` execution error.
    pub fn term_evaluation<S: Into<String>>(msg: S) -> Self {
        ExecutionError::TermEvaluation(msg.into()).into()
    }

    /// Create a new `BadTermState` execution error.
    pub fn bad_term_state<S: Into<String>>(msg: S) -> Self {
        ExecutionError::BadTermState(msg.into()).into()
    }

    /// Create a new `MalformedRow` execution error.
    pub fn malformed_row<S: Into<String>>(msg: S) -> Self {
        ExecutionError::MalformedRow(msg.into()).into()
    }

    /// Create a new `RowLimit` execution error.
    pub fn row_limit<S: Into<String>>(msg: S) -> Self {
        ExecutionError::RowLimit(msg.into()).into()
    }

    /// True when the error was raised by a relation factory.
    pub fn is_construction(&self) -> bool {
        matches!(self, Self::Construction(_))
    }

    /// True when the error was raised during row production.
    pub fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }
}

impl From<serde_json::Error> for TrellisError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Return early with an `Unsupported` error.
#[macro_export]
macro_rules! unsupported {
    ($($arg:tt)*) => {
        return Err($crate::TrellisError::Unsupported(format!($($arg)*)))
    };
}
