//! Engine-agnostic relation trees for Trellis.
//!
//! `trellis-algebra` provides the tree structure at the center of the
//! system: immutable relations built leaf-up through validating factories,
//! shared as subtrees, walked by visitors, serialized as tagged documents,
//! and handed to engines for execution.
//!
//! # Overview
//!
//! The algebra layer is responsible for:
//!
//! - **Operations**: The operation set (Leaf, Join, Selection, Projection,
//!   Distinct, Slice, Union, Transfer, Extension)
//! - **Validation**: Column and engine checks at construction, so an
//!   engine never sees a malformed tree
//! - **Properties**: Conservative row-set facts (uniqueness, cardinality,
//!   order) carried on every node
//! - **Serialization**: A document form that travels without engine state,
//!   plus the reader protocol that reattaches it
//! - **Transfers**: Resolution of cross-engine boundaries via registered
//!   callbacks
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use trellis_algebra::{Leaf, Relation};
//! use trellis_core::{ColumnSet, EngineTag, Predicate};
//!
//! let engine = EngineTag::new("iteration");
//! let movies = Relation::leaf(Leaf::reference(
//!     "movies",
//!     engine.clone(),
//!     ColumnSet::of(["id", "year"]),
//! ))?;
//! let ratings = Relation::leaf(Leaf::reference(
//!     "ratings",
//!     engine.clone(),
//!     ColumnSet::of(["id", "stars"]),
//! ))?;
//!
//! // Shared column tags join implicitly; terms carry per-engine state.
//! let recent = Predicate::new("recent", ColumnSet::of(["year"]))
//!     .with_state(engine, Arc::new(1990i64));
//! let tree = movies.join(&ratings)?.select(recent)?;
//!
//! assert_eq!(tree.columns(), &ColumnSet::of(["id", "year", "stars"]));
//! println!("{tree}");
//! # Ok::<(), common_error::TrellisError>(())
//! ```
//!
//! # Modules
//!
//! - [`ops`]: Operation structs and the [`RelationOp`] sum
//! - [`serial`]: Document form and the [`TermReader`] protocol
//! - [`transfers`]: The [`TransferResolver`] registry

pub mod ops;
pub mod serial;
pub mod transfers;

mod props;
mod relation;
mod visit;

// Re-export the tree types at crate root for convenience
pub use props::RelationProps;
pub use relation::Relation;
pub use visit::RelationVisitor;

// Re-export operation types at crate root for convenience
pub use ops::{
    DistinctOp, ExtensionBehavior, ExtensionOp, JoinOp, Leaf, LeafSource, ProjectionOp,
    RelationOp, SelectionOp, SliceOp, TransferOp, UnionOp,
};

// Re-export the serialization surface at crate root for convenience
pub use serial::{from_json, read_relation, to_json, write_relation, RelationDoc, TermReader};

// Re-export transfer resolution at crate root for convenience
pub use transfers::{TransferFn, TransferResolver};
