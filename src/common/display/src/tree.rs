//! Tree display utilities for relation trees.

use std::fmt;

/// A node in a display tree.
pub trait TreeItem {
    /// One-line label for this node.
    fn label(&self) -> String;

    /// Child nodes, left to right.
    fn child_items(&self) -> Vec<&dyn TreeItem>;
}

/// Render a tree as indented text with box-drawing connectors.
///
/// The root label sits on the first line; every descendant is introduced by
/// `├─ ` or `└─ `, with `│  ` continuing open branches.
pub fn render_tree(root: &dyn TreeItem) -> String {
    let mut out = String::new();
    out.push_str(&root.label());
    out.push('\n');

    let children = root.child_items();
    for (i, child) in children.iter().enumerate() {
        render_into(&mut out, *child, "", i == children.len() - 1);
    }
    out
}

fn render_into(out: &mut String, node: &dyn TreeItem, prefix: &str, is_last: bool) {
    let connector = if is_last { "└─ " } else { "├─ " };
    out.push_str(prefix);
    out.push_str(connector);
    out.push_str(&node.label());
    out.push('\n');

    let children = node.child_items();
    let child_prefix = format!("{prefix}{}", if is_last { "   " } else { "│  " });

    for (i, child) in children.iter().enumerate() {
        render_into(out, *child, &child_prefix, i == children.len() - 1);
    }
}

/// Display adapter over any [`TreeItem`].
pub struct TreeDisplay<'a> {
    root: &'a dyn TreeItem,
}

impl<'a> TreeDisplay<'a> {
    /// Wrap a tree root for display.
    pub fn new(root: &'a dyn TreeItem) -> Self {
        Self { root }
    }
}

impl fmt::Display for TreeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_tree(self.root))
    }
}
