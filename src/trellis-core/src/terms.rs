//! Behavioral terms: predicates, join conditions, and order-by keys.
//!
//! A term is the engine-independent half of a behavior. It declares a name
//! and the columns it needs, and carries one opaque state per engine able
//! to evaluate it. The algebra validates terms structurally (required
//! columns present, state present for the relation's engine) without ever
//! looking inside a state; each engine documents the concrete type it
//! expects behind its state and downcasts at execution time.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::columns::ColumnSet;
use crate::tags::EngineTag;

/// Type-erased per-engine evaluation state.
pub type EngineState = Arc<dyn Any + Send + Sync>;

/// Map from engine tag to that engine's opaque evaluation state.
pub type EngineStateMap = HashMap<EngineTag, EngineState>;

/// A named row filter.
///
/// For the iteration engine the state behind [`Predicate::state_for`] is a
/// fallible function from a row to a boolean; other engines define their
/// own contracts (a SQL engine would store an expression fragment).
#[derive(Clone)]
pub struct Predicate {
    name: String,
    columns_required: ColumnSet,
    states: EngineStateMap,
}

impl Predicate {
    /// Create a predicate with no engine states attached.
    pub fn new(name: impl Into<String>, columns_required: ColumnSet) -> Self {
        Self {
            name: name.into(),
            columns_required,
            states: EngineStateMap::new(),
        }
    }

    /// Attach (or replace) the state for one engine.
    pub fn with_state(mut self, engine: EngineTag, state: EngineState) -> Self {
        self.states.insert(engine, state);
        self
    }

    /// The term's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns the term needs present in its input rows.
    pub fn columns_required(&self) -> &ColumnSet {
        &self.columns_required
    }

    /// Check if a state is attached for `engine`.
    pub fn supports_engine(&self, engine: &EngineTag) -> bool {
        self.states.contains_key(engine)
    }

    /// The opaque state attached for `engine`, if any.
    pub fn state_for(&self, engine: &EngineTag) -> Option<&EngineState> {
        self.states.get(engine)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("name", &self.name)
            .field("columns_required", &self.columns_required)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// Terms compare by declaration, never by state: two predicates with the
// same name and column set are the same term even when their state maps
// cover different engines.
impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.columns_required == other.columns_required
    }
}

impl Eq for Predicate {}

/// A named join-match rule applied on top of automatic column equation.
///
/// For the iteration engine the state is a fallible function from a merged
/// candidate row to a match decision (and optionally a replacement output
/// row).
#[derive(Clone)]
pub struct JoinCondition {
    name: String,
    columns_required: ColumnSet,
    states: EngineStateMap,
}

impl JoinCondition {
    /// Create a join condition with no engine states attached.
    pub fn new(name: impl Into<String>, columns_required: ColumnSet) -> Self {
        Self {
            name: name.into(),
            columns_required,
            states: EngineStateMap::new(),
        }
    }

    /// Attach (or replace) the state for one engine.
    pub fn with_state(mut self, engine: EngineTag, state: EngineState) -> Self {
        self.states.insert(engine, state);
        self
    }

    /// The term's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns the term needs present in merged candidate rows.
    pub fn columns_required(&self) -> &ColumnSet {
        &self.columns_required
    }

    /// Check if a state is attached for `engine`.
    pub fn supports_engine(&self, engine: &EngineTag) -> bool {
        self.states.contains_key(engine)
    }

    /// The opaque state attached for `engine`, if any.
    pub fn state_for(&self, engine: &EngineTag) -> Option<&EngineState> {
        self.states.get(engine)
    }
}

impl fmt::Debug for JoinCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoinCondition")
            .field("name", &self.name)
            .field("columns_required", &self.columns_required)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for JoinCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl PartialEq for JoinCondition {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.columns_required == other.columns_required
    }
}

impl Eq for JoinCondition {}

/// A named sort key with a direction.
///
/// The direction lives here, outside the opaque state: engines evaluate the
/// state to obtain a key and apply ascending/descending themselves, so one
/// state serves both directions. For the iteration engine the state is a
/// fallible function from a row to a [`crate::Value`] sort key.
#[derive(Clone)]
pub struct OrderByTerm {
    name: String,
    columns_required: ColumnSet,
    ascending: bool,
    states: EngineStateMap,
}

impl OrderByTerm {
    /// Create an ascending order term.
    pub fn asc(name: impl Into<String>, columns_required: ColumnSet) -> Self {
        Self {
            name: name.into(),
            columns_required,
            ascending: true,
            states: EngineStateMap::new(),
        }
    }

    /// Create a descending order term.
    pub fn desc(name: impl Into<String>, columns_required: ColumnSet) -> Self {
        Self {
            ascending: false,
            ..Self::asc(name, columns_required)
        }
    }

    /// Attach (or replace) the state for one engine.
    pub fn with_state(mut self, engine: EngineTag, state: EngineState) -> Self {
        self.states.insert(engine, state);
        self
    }

    /// The term's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns the term needs present in its input rows.
    pub fn columns_required(&self) -> &ColumnSet {
        &self.columns_required
    }

    /// Whether keys sort ascending.
    pub fn is_ascending(&self) -> bool {
        self.ascending
    }

    /// Check if a state is attached for `engine`.
    pub fn supports_engine(&self, engine: &EngineTag) -> bool {
        self.states.contains_key(engine)
    }

    /// The opaque state attached for `engine`, if any.
    pub fn state_for(&self, engine: &EngineTag) -> Option<&EngineState> {
        self.states.get(engine)
    }
}

impl fmt::Debug for OrderByTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderByTerm")
            .field("name", &self.name)
            .field("columns_required", &self.columns_required)
            .field("ascending", &self.ascending)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for OrderByTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = if self.ascending { "asc" } else { "desc" };
        write!(f, "{} {direction}", self.name)
    }
}

impl PartialEq for OrderByTerm {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.columns_required == other.columns_required
            && self.ascending == other.ascending
    }
}

impl Eq for OrderByTerm {}
