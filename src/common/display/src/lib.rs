//! Display utilities for trellis.
//!
//! Provides the tree formatting used by relation `Display` impls and
//! explain output.

mod tree;

pub use tree::{render_tree, TreeDisplay, TreeItem};
