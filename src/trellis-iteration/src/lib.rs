//! Native in-memory execution engine for Trellis.
//!
//! `trellis-iteration` executes relation trees over plain [`Row`] values,
//! one visitor pass from the leaves up. It is the reference engine of the
//! workspace: small enough to read end to end, complete enough to run
//! every operation, and the engine tests lean on when a pipeline
//! misbehaves elsewhere.
//!
//! # Overview
//!
//! The engine is responsible for:
//!
//! - **Row sources**: The [`RowIterable`] pull protocol, single-pass
//!   streams, and restartable materialized collections
//! - **Operators**: Streaming selection, projection, union and windowing,
//!   hash joins against indexed collections, sorting, deduplication
//! - **Terms**: Resolving predicates, join conditions, and order terms to
//!   the callables this engine stores as their state
//! - **Boundaries**: Transfers into this engine through registered
//!   exporters, and extension payloads it knows how to run
//!
//! # Example
//!
//! ```rust
//! use trellis_algebra::{Leaf, Relation};
//! use trellis_core::{ColumnSet, ColumnTag, Row, Value};
//! use trellis_iteration::IterationEngine;
//!
//! let mut engine = IterationEngine::new();
//! engine.bind_rows(
//!     "readings",
//!     vec![
//!         Row::new().with("sensor", "a").with("level", 17i64),
//!         Row::new().with("sensor", "b").with("level", 3i64),
//!         Row::new().with("sensor", "a").with("level", 17i64),
//!     ],
//! );
//!
//! // The predicate's state under this engine's tag is a closure over rows.
//! let loud = engine.predicate("loud", ColumnSet::of(["level"]), |row| {
//!     Ok(matches!(
//!         row.get(&ColumnTag::from("level")),
//!         Some(Value::Int64(level)) if *level > 10
//!     ))
//! });
//!
//! let tree = Relation::leaf(Leaf::reference(
//!     "readings",
//!     engine.tag().clone(),
//!     ColumnSet::of(["sensor", "level"]),
//! ))?
//! .select(loud)?
//! .distinct();
//!
//! assert_eq!(engine.collect(&tree)?.len(), 1);
//! # Ok::<(), common_error::TrellisError>(())
//! ```
//!
//! # Modules
//!
//! - [`engine`]: The [`IterationEngine`], its config, bindings, and terms
//! - [`rows`]: The [`RowIterable`] protocol and single-pass sources
//! - [`collection`]: Materialized rows and their hash indexes
//! - [`operators`]: The per-operation row adapters
//! - [`terms`]: State types and resolution for behavioral terms

pub mod collection;
pub mod engine;
mod exec;
pub mod operators;
pub mod rows;
pub mod terms;

// Re-export the engine surface at crate root for convenience
pub use engine::{EngineConfig, IterationEngine, IterationExtension, RowExporter};

// Re-export the row protocol at crate root for convenience
pub use collection::{GeneralIndex, RowCollection, UniqueIndex};
pub use rows::{collect_rows_bounded, BoxedRows, FastPath, JoinFastPath, LazyRows, RowIterable};
pub use terms::{JoinMatch, RowCondition, RowPredicate, RowSortKey, SortTerm};
