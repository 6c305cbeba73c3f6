//! Flatten a forest into the rows a tree view actually shows.

use arbor_core::{Forest, NodeId, TreeNode};

/// One on-screen row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleRow {
    pub id: NodeId,
    pub name: String,
    /// Nesting level; roots are 0. Drives indentation.
    pub depth: usize,
    pub can_expand: bool,
    pub is_expanded: bool,
    pub is_loading: bool,
}

impl VisibleRow {
    fn of(node: &TreeNode, depth: usize) -> Self {
        Self {
            id: node.id,
            name: node.name.clone(),
            depth,
            can_expand: node.can_expand(),
            is_expanded: node.is_expanded,
            is_loading: node.is_loading,
        }
    }
}

/// Pre-order rows, descending only into expanded nodes.
pub fn visible_rows(forest: &Forest) -> Vec<VisibleRow> {
    let mut rows = Vec::new();
    let mut stack: Vec<(usize, &TreeNode)> =
        forest.roots().iter().rev().map(|r| (0, &**r)).collect();
    while let Some((depth, node)) = stack.pop() {
        rows.push(VisibleRow::of(node, depth));
        if node.is_expanded
            && let Some(children) = &node.children
        {
            stack.extend(children.iter().rev().map(|c| (depth + 1, &**c)));
        }
    }
    rows
}
