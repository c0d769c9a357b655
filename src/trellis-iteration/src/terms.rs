//! Iteration-engine state carried by behavioral terms.
//!
//! Terms declare their required columns engine-independently; what they
//! actually compute lives in per-engine state. For this engine that state
//! is a callable over materialized rows, one contract per term kind:
//!
//! - [`RowPredicate`] for `Predicate`: does the row pass?
//! - [`RowCondition`] for `JoinCondition`: what to emit for a merged
//!   candidate row, as a [`JoinMatch`].
//! - [`RowSortKey`] for `OrderByTerm`: the row's sort key. Direction is
//!   applied by the engine when comparing keys, never inside the callable.
//!
//! The resolvers here pull a term's state back out at execution time. The
//! factories already checked that state exists for the executing engine, so
//! a miss means the state was attached under a different type and both
//! cases surface as the same error class.

use std::fmt;
use std::sync::Arc;

use common_error::{TrellisError, TrellisResult};
use trellis_core::{EngineTag, JoinCondition, OrderByTerm, Predicate, Row, Value};

/// Predicate state: a fallible row test.
pub type RowPredicate = Arc<dyn Fn(&Row) -> TrellisResult<bool> + Send + Sync>;

/// Join-condition state: inspects a merged candidate row and decides what
/// to emit for it.
pub type RowCondition = Arc<dyn Fn(&Row) -> TrellisResult<JoinMatch> + Send + Sync>;

/// Order-term state: computes the sort key for a row.
pub type RowSortKey = Arc<dyn Fn(&Row) -> TrellisResult<Value> + Send + Sync>;

/// Outcome of a join condition for one merged candidate row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinMatch {
    /// Emit the candidate unchanged.
    Keep,
    /// Emit this row in the candidate's place.
    Replace(Row),
    /// Drop the candidate.
    Skip,
}

/// An order term resolved to its iteration state.
#[derive(Clone)]
pub struct SortTerm {
    /// The term's declared name.
    pub name: String,
    /// Computes the sort key for a row.
    pub key: RowSortKey,
    /// Sort direction. Descending flips the key comparison.
    pub ascending: bool,
}

impl fmt::Debug for SortTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortTerm")
            .field("name", &self.name)
            .field("ascending", &self.ascending)
            .finish()
    }
}

/// Pull a predicate's state for `engine` as a [`RowPredicate`].
pub fn predicate_state(predicate: &Predicate, engine: &EngineTag) -> TrellisResult<RowPredicate> {
    let Some(state) = predicate.state_for(engine) else {
        return Err(TrellisError::bad_term_state(format!(
            "predicate '{}' has no state for engine '{}'",
            predicate.name(),
            engine
        )));
    };
    state.downcast_ref::<RowPredicate>().cloned().ok_or_else(|| {
        TrellisError::bad_term_state(format!(
            "predicate '{}' carries state of the wrong type for engine '{}'",
            predicate.name(),
            engine
        ))
    })
}

/// Pull a join condition's state for `engine` as a [`RowCondition`].
pub fn condition_state(
    condition: &JoinCondition,
    engine: &EngineTag,
) -> TrellisResult<RowCondition> {
    let Some(state) = condition.state_for(engine) else {
        return Err(TrellisError::bad_term_state(format!(
            "join condition '{}' has no state for engine '{}'",
            condition.name(),
            engine
        )));
    };
    state.downcast_ref::<RowCondition>().cloned().ok_or_else(|| {
        TrellisError::bad_term_state(format!(
            "join condition '{}' carries state of the wrong type for engine '{}'",
            condition.name(),
            engine
        ))
    })
}

/// Pull an order term's state for `engine` as a [`SortTerm`].
pub fn order_term_state(term: &OrderByTerm, engine: &EngineTag) -> TrellisResult<SortTerm> {
    let Some(state) = term.state_for(engine) else {
        return Err(TrellisError::bad_term_state(format!(
            "order term '{}' has no state for engine '{}'",
            term.name(),
            engine
        )));
    };
    let key = state.downcast_ref::<RowSortKey>().cloned().ok_or_else(|| {
        TrellisError::bad_term_state(format!(
            "order term '{}' carries state of the wrong type for engine '{}'",
            term.name(),
            engine
        ))
    })?;
    Ok(SortTerm {
        name: term.name().to_string(),
        key,
        ascending: term.is_ascending(),
    })
}
