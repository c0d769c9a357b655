//! Core data model for the trellis relational algebra.
//!
//! This crate provides the engine-independent building blocks:
//! - `ColumnTag` and `EngineTag` for column and engine identity
//! - `Value` and `Row` for the materialized-row model
//! - `ColumnSet` for ordered sets of column tags
//! - `Predicate`, `JoinCondition`, `OrderByTerm` behavioral terms

pub mod columns;
pub mod row;
pub mod tags;
pub mod terms;
pub mod value;

mod proptest_utils;

// Re-export commonly used types
pub use columns::ColumnSet;
pub use row::Row;
pub use tags::{ColumnTag, EngineTag};
pub use terms::{EngineState, EngineStateMap, JoinCondition, OrderByTerm, Predicate};
pub use value::Value;
