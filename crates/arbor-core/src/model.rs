//! Core tree data model.
//!
//! A `Forest` is an ordered sequence of root `TreeNode`s. Nodes are immutable
//! once built: every structural edit produces a new forest that shares all
//! untouched subtrees with the old one through `Arc`. Holding on to an old
//! `Forest` is therefore cheap and always safe.

use crate::id::NodeId;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// An ordered run of sibling subtrees (a node's children, or the roots).
pub type Siblings = SmallVec<[Arc<TreeNode>; 4]>;

// ─── Node ────────────────────────────────────────────────────────────────

/// The unit of the hierarchy.
///
/// `children: None` is distinct from `Some(empty)`: together with
/// `has_lazy_children` it means "exists, not fetched yet".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: NodeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Siblings>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_expanded: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub has_lazy_children: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_loading: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl TreeNode {
    /// A collapsed leaf with no children sequence.
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            children: None,
            is_expanded: false,
            has_lazy_children: false,
            is_loading: false,
        }
    }

    /// Replace the children sequence.
    pub fn with_children(mut self, children: impl IntoIterator<Item = TreeNode>) -> Self {
        self.children = Some(children.into_iter().map(Arc::new).collect());
        self
    }

    /// Mark the node as having children that are not fetched yet.
    pub fn lazy(mut self) -> Self {
        self.has_lazy_children = true;
        self
    }

    pub fn expanded(mut self) -> Self {
        self.is_expanded = true;
        self
    }

    /// True when the node has at least one materialized child.
    pub fn has_children(&self) -> bool {
        self.children.as_ref().is_some_and(|c| !c.is_empty())
    }

    /// True when an expand affordance makes sense for this node.
    pub fn can_expand(&self) -> bool {
        self.has_children() || self.has_lazy_children
    }

    /// Does this subtree (including the node itself) contain `id`?
    pub fn contains(&self, id: NodeId) -> bool {
        self.id == id
            || self
                .children
                .iter()
                .flatten()
                .any(|child| child.contains(id))
    }

    /// Number of nodes in this subtree, the node itself included.
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children
            .iter()
            .flatten()
            .map(|child| child.subtree_len())
            .sum::<usize>()
    }

    /// Shallow copy with a new children sequence. Other fields are cloned,
    /// grandchildren stay shared.
    pub(crate) fn with_siblings(&self, children: Siblings) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            children: Some(children),
            is_expanded: self.is_expanded,
            has_lazy_children: self.has_lazy_children,
            is_loading: self.is_loading,
        }
    }
}

// ─── Forest ──────────────────────────────────────────────────────────────

/// The whole tree state: an ordered sequence of roots (no implicit root).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Forest {
    pub(crate) roots: Siblings,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_roots(roots: impl IntoIterator<Item = TreeNode>) -> Self {
        Self {
            roots: roots.into_iter().map(Arc::new).collect(),
        }
    }

    pub(crate) fn from_siblings(roots: Siblings) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[Arc<TreeNode>] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

impl FromIterator<TreeNode> for Forest {
    fn from_iter<I: IntoIterator<Item = TreeNode>>(iter: I) -> Self {
        Self::from_roots(iter)
    }
}

// ─── Relation ────────────────────────────────────────────────────────────

/// Where a moved node lands relative to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    /// Immediately before the target, as its sibling.
    Before,
    /// Immediately after the target, as its sibling.
    After,
    /// As the target's last child.
    Inside,
}

impl Relation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
            Self::Inside => "inside",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Patch ───────────────────────────────────────────────────────────────

/// A partial field update. `None` fields are left alone.
///
/// `children: Some(None)` clears the children sequence back to "absent".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    pub name: Option<String>,
    pub children: Option<Option<Siblings>>,
    pub is_expanded: Option<bool>,
    pub has_lazy_children: Option<bool>,
    pub is_loading: Option<bool>,
}

impl NodePatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn expanded(expanded: bool) -> Self {
        Self {
            is_expanded: Some(expanded),
            ..Default::default()
        }
    }

    pub fn loading(loading: bool) -> Self {
        Self {
            is_loading: Some(loading),
            ..Default::default()
        }
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = TreeNode>) -> Self {
        self.children = Some(Some(children.into_iter().map(Arc::new).collect()));
        self
    }

    pub fn with_lazy(mut self, lazy: bool) -> Self {
        self.has_lazy_children = Some(lazy);
        self
    }

    pub fn with_loading(mut self, loading: bool) -> Self {
        self.is_loading = Some(loading);
        self
    }

    pub fn with_expanded(mut self, expanded: bool) -> Self {
        self.is_expanded = Some(expanded);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply to `node`, producing the patched copy. Untouched children keep
    /// their `Arc` identity.
    pub fn apply_to(&self, node: &TreeNode) -> TreeNode {
        TreeNode {
            id: node.id,
            name: self.name.clone().unwrap_or_else(|| node.name.clone()),
            children: match &self.children {
                Some(children) => children.clone(),
                None => node.children.clone(),
            },
            is_expanded: self.is_expanded.unwrap_or(node.is_expanded),
            has_lazy_children: self.has_lazy_children.unwrap_or(node.has_lazy_children),
            is_loading: self.is_loading.unwrap_or(node.is_loading),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_and_empty_children_differ() {
        let absent = TreeNode::new("a", "A");
        let empty = TreeNode::new("a", "A").with_children([]);
        assert_ne!(absent, empty);
        assert!(!absent.has_children());
        assert!(!empty.has_children());
    }

    #[test]
    fn can_expand_covers_lazy_nodes() {
        assert!(TreeNode::new("l", "Lazy").lazy().can_expand());
        assert!(
            TreeNode::new("p", "Parent")
                .with_children([TreeNode::new("c", "Child")])
                .can_expand()
        );
        assert!(!TreeNode::new("f", "File").can_expand());
    }

    #[test]
    fn subtree_contains_and_len() {
        let node = TreeNode::new("a", "A").with_children([
            TreeNode::new("b", "B").with_children([TreeNode::new("c", "C")]),
            TreeNode::new("d", "D"),
        ]);
        assert!(node.contains(NodeId::intern("c")));
        assert!(!node.contains(NodeId::intern("zz")));
        assert_eq!(node.subtree_len(), 4);
    }

    #[test]
    fn patch_leaves_unset_fields() {
        let node = TreeNode::new("a", "A")
            .with_children([TreeNode::new("b", "B")])
            .expanded();
        let patched = NodePatch::rename("Renamed").apply_to(&node);
        assert_eq!(patched.name, "Renamed");
        assert!(patched.is_expanded);
        let (old, new) = (node.children.unwrap(), patched.children.unwrap());
        assert!(Arc::ptr_eq(&old[0], &new[0]));
    }

    #[test]
    fn patch_can_clear_children() {
        let node = TreeNode::new("a", "A").with_children([TreeNode::new("b", "B")]);
        let patch = NodePatch {
            children: Some(None),
            ..Default::default()
        };
        assert_eq!(patch.apply_to(&node).children, None);
    }

    #[test]
    fn json_uses_camel_case_and_omits_defaults() {
        let node = TreeNode::new("x", "X").lazy();
        let json = serde_json::to_string(&node).unwrap();
        assert_eq!(json, r#"{"id":"x","name":"X","hasLazyChildren":true}"#);
    }

    #[test]
    fn json_forest_parses_nested_records() {
        let json = r#"[
            {"id":"root","name":"Root","isExpanded":true,"children":[
                {"id":"leaf","name":"Leaf"}
            ]},
            {"id":"lazy","name":"Lazy","hasLazyChildren":true}
        ]"#;
        let forest: Forest = serde_json::from_str(json).unwrap();
        assert_eq!(forest.roots().len(), 2);
        assert!(forest.roots()[0].is_expanded);
        assert!(forest.roots()[1].has_lazy_children);
        assert_eq!(
            forest.roots()[0].children.as_ref().unwrap()[0].name,
            "Leaf"
        );
    }

    #[test]
    fn relation_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Relation::Inside).unwrap(),
            r#""inside""#
        );
        assert_eq!(Relation::Before.as_str(), "before");
    }
}
