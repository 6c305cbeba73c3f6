//! Tree mutation engine.
//!
//! Every operation takes `&Forest` and returns a new `Forest`. Only the chain
//! of ancestors above the edited node is reallocated; every other subtree is
//! the same `Arc` in both snapshots, so `Arc::ptr_eq` is a valid "unchanged"
//! test for callers diffing old and new state.
//!
//! Each edit comes in two forms:
//!
//! - `try_*` returns `Err(EditError)` when the edit does not apply.
//! - The plain form logs the rejection and hands back an unchanged, fully
//!   shared copy. UI events race with state updates, so a stale id is an
//!   expected input rather than a failure.

use crate::error::EditError;
use crate::id::NodeId;
use crate::model::{Forest, NodePatch, Relation, Siblings, TreeNode};
use std::collections::HashSet;
use std::sync::Arc;

// ─── Path-copying primitives ─────────────────────────────────────────────

fn find_in(siblings: &[Arc<TreeNode>], id: NodeId) -> Option<&Arc<TreeNode>> {
    for node in siblings {
        if node.id == id {
            return Some(node);
        }
        if let Some(children) = &node.children
            && let Some(found) = find_in(children, id)
        {
            return Some(found);
        }
    }
    None
}

/// Replace the node `id` with `f(node)`, copying only its ancestors.
/// `None` when `id` is not in `siblings`.
fn rewrite<F>(siblings: &Siblings, id: NodeId, f: &mut F) -> Option<Siblings>
where
    F: FnMut(&TreeNode) -> TreeNode,
{
    for (i, node) in siblings.iter().enumerate() {
        let replacement = if node.id == id {
            f(&**node)
        } else if let Some(children) = &node.children
            && let Some(children) = rewrite(children, id, f)
        {
            node.with_siblings(children)
        } else {
            continue;
        };
        let mut out = siblings.clone();
        out[i] = Arc::new(replacement);
        return Some(out);
    }
    None
}

/// Cut the subtree rooted at `id` out, returning the new siblings and the
/// detached subtree.
fn detach(siblings: &Siblings, id: NodeId) -> Option<(Siblings, Arc<TreeNode>)> {
    for (i, node) in siblings.iter().enumerate() {
        if node.id == id {
            let mut out = siblings.clone();
            let removed = out.remove(i);
            return Some((out, removed));
        }
        if let Some(children) = &node.children
            && let Some((children, removed)) = detach(children, id)
        {
            let mut out = siblings.clone();
            out[i] = Arc::new(node.with_siblings(children));
            return Some((out, removed));
        }
    }
    None
}

/// Append `child` to `parent`. A parent with known children is no longer lazy.
fn attach(parent: &TreeNode, child: &Arc<TreeNode>) -> TreeNode {
    let mut children = parent.children.clone().unwrap_or_default();
    children.push(Arc::clone(child));
    let mut out = parent.with_siblings(children);
    out.has_lazy_children = false;
    out
}

/// Splice `node` next to `target`, at whatever depth `target` lives.
fn insert_beside(
    siblings: &Siblings,
    target: NodeId,
    node: &Arc<TreeNode>,
    after: bool,
) -> Option<Siblings> {
    for (i, sibling) in siblings.iter().enumerate() {
        if sibling.id == target {
            let mut out = siblings.clone();
            out.insert(if after { i + 1 } else { i }, Arc::clone(node));
            return Some(out);
        }
        if let Some(children) = &sibling.children
            && let Some(children) = insert_beside(children, target, node, after)
        {
            let mut out = siblings.clone();
            out[i] = Arc::new(sibling.with_siblings(children));
            return Some(out);
        }
    }
    None
}

// ─── Queries ─────────────────────────────────────────────────────────────

/// Pre-order walk yielding `(depth, node)`; roots have depth 0.
pub struct Walk<'a> {
    stack: Vec<(usize, &'a TreeNode)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        if let Some(children) = &node.children {
            self.stack
                .extend(children.iter().rev().map(|c| (depth + 1, &**c)));
        }
        Some((depth, node))
    }
}

impl TreeNode {
    /// Pre-order walk of this subtree; the node itself has depth 0.
    pub fn iter(&self) -> Walk<'_> {
        Walk {
            stack: vec![(0, self)],
        }
    }
}

impl Forest {
    /// Depth-first lookup.
    pub fn find(&self, id: NodeId) -> Option<&TreeNode> {
        self.find_shared(id).map(|node| &**node)
    }

    /// Like `find`, but returns the shared handle so callers can compare
    /// snapshots with `Arc::ptr_eq`.
    pub fn find_shared(&self, id: NodeId) -> Option<&Arc<TreeNode>> {
        find_in(&self.roots, id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.find_shared(id).is_some()
    }

    /// The id of the node whose children hold `id`.
    /// `None` for roots and for unknown ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.iter()
            .find(|(_, node)| node.children.iter().flatten().any(|c| c.id == id))
            .map(|(_, node)| node.id)
    }

    /// Check if `ancestor` is a parent/grandparent/etc. of `descendant`.
    pub fn is_ancestor_of(&self, ancestor: NodeId, descendant: NodeId) -> bool {
        ancestor != descendant
            && self
                .find(ancestor)
                .is_some_and(|node| node.contains(descendant))
    }

    pub fn depth_of(&self, id: NodeId) -> Option<usize> {
        self.iter()
            .find(|(_, node)| node.id == id)
            .map(|(depth, _)| depth)
    }

    /// Total number of nodes at every depth.
    pub fn node_count(&self) -> usize {
        self.roots.iter().map(|root| root.subtree_len()).sum()
    }

    pub fn iter(&self) -> Walk<'_> {
        Walk {
            stack: self.roots.iter().rev().map(|r| (0, &**r)).collect(),
        }
    }

    /// Verify that every id is unique across all depths.
    pub fn validate(&self) -> Result<(), EditError> {
        let mut seen = HashSet::new();
        for (_, node) in self.iter() {
            if !seen.insert(node.id) {
                return Err(EditError::DuplicateId(node.id));
            }
        }
        Ok(())
    }

    // ─── Edits ───────────────────────────────────────────────────────────

    /// Apply `patch` to the node `id`.
    pub fn try_update(&self, id: NodeId, patch: &NodePatch) -> Result<Self, EditError> {
        rewrite(&self.roots, id, &mut |node| patch.apply_to(node))
            .map(Self::from_siblings)
            .ok_or(EditError::NotFound(id))
    }

    pub fn update(&self, id: NodeId, patch: &NodePatch) -> Self {
        self.try_update(id, patch)
            .unwrap_or_else(|err| self.rejected(err))
    }

    /// Append `node` as the last child of `parent`, creating the children
    /// sequence if absent and clearing the parent's lazy flag.
    pub fn try_add_child(&self, parent: NodeId, node: TreeNode) -> Result<Self, EditError> {
        let node = Arc::new(node);
        if let Some(dup) = self.first_clash(std::slice::from_ref(&node)) {
            return Err(EditError::DuplicateId(dup));
        }
        rewrite(&self.roots, parent, &mut |p| attach(p, &node))
            .map(Self::from_siblings)
            .ok_or(EditError::NotFound(parent))
    }

    pub fn add_child(&self, parent: NodeId, node: TreeNode) -> Self {
        self.try_add_child(parent, node)
            .unwrap_or_else(|err| self.rejected(err))
    }

    /// Delete `id` together with its whole subtree.
    pub fn try_remove(&self, id: NodeId) -> Result<Self, EditError> {
        detach(&self.roots, id)
            .map(|(roots, _)| Self::from_siblings(roots))
            .ok_or(EditError::NotFound(id))
    }

    pub fn remove(&self, id: NodeId) -> Self {
        self.try_remove(id).unwrap_or_else(|err| self.rejected(err))
    }

    /// Relocate the subtree rooted at `dragged` relative to `target`.
    ///
    /// The move is validated before anything is rewritten: self-moves,
    /// unknown ids and moves into the dragged node's own subtree are
    /// rejected. The subtree is detached first and the target position is
    /// then resolved on the detached forest, so a preceding sibling being
    /// pulled out never shifts where the node lands.
    pub fn try_move(
        &self,
        dragged: NodeId,
        target: NodeId,
        relation: Relation,
    ) -> Result<Self, EditError> {
        if dragged == target {
            return Err(EditError::SelfMove(dragged));
        }
        let moving = self
            .find_shared(dragged)
            .ok_or(EditError::NotFound(dragged))?;
        if moving.contains(target) {
            return Err(EditError::Cycle {
                dragged,
                target,
                relation,
            });
        }
        if !self.contains(target) {
            return Err(EditError::NotFound(target));
        }

        let (without, subtree) =
            detach(&self.roots, dragged).ok_or(EditError::NotFound(dragged))?;
        let roots = match relation {
            Relation::Inside => rewrite(&without, target, &mut |p| attach(p, &subtree)),
            Relation::Before => insert_beside(&without, target, &subtree, false),
            Relation::After => insert_beside(&without, target, &subtree, true),
        };
        roots
            .map(Self::from_siblings)
            .ok_or(EditError::NotFound(target))
    }

    pub fn move_node(&self, dragged: NodeId, target: NodeId, relation: Relation) -> Self {
        self.try_move(dragged, target, relation)
            .unwrap_or_else(|err| self.rejected(err))
    }

    /// Install fetched children on a lazy node in one step: loading and
    /// lazy flags cleared, node expanded.
    ///
    /// Rejected with `DuplicateId` if any fetched id, at any depth, is
    /// already in the forest or repeats within the batch.
    ///
    /// A node that still has its lazy flag has no children, so the fetched
    /// list becomes the children. Pre-existing children only appear when an
    /// add or an inside-drop landed mid-load, which already cleared the lazy
    /// flag; `TreeView::complete_load` refuses such nodes, and a direct call
    /// keeps them after the fetched ones.
    pub fn try_materialize_lazy_children(
        &self,
        id: NodeId,
        fetched: impl IntoIterator<Item = TreeNode>,
    ) -> Result<Self, EditError> {
        let fetched: Siblings = fetched.into_iter().map(Arc::new).collect();
        if let Some(dup) = self.first_clash(&fetched) {
            return Err(EditError::DuplicateId(dup));
        }
        rewrite(&self.roots, id, &mut |node| {
            let mut children = fetched.clone();
            children.extend(node.children.iter().flatten().cloned());
            let mut out = node.with_siblings(children);
            out.is_loading = false;
            out.has_lazy_children = false;
            out.is_expanded = true;
            out
        })
        .map(Self::from_siblings)
        .ok_or(EditError::NotFound(id))
    }

    pub fn materialize_lazy_children(
        &self,
        id: NodeId,
        fetched: impl IntoIterator<Item = TreeNode>,
    ) -> Self {
        self.try_materialize_lazy_children(id, fetched)
            .unwrap_or_else(|err| self.rejected(err))
    }

    /// First id in `incoming` already present in the forest or seen
    /// earlier in `incoming`.
    fn first_clash(&self, incoming: &[Arc<TreeNode>]) -> Option<NodeId> {
        let mut seen = HashSet::new();
        incoming
            .iter()
            .flat_map(|root| root.iter())
            .map(|(_, node)| node.id)
            .find(|&id| !seen.insert(id) || self.contains(id))
    }

    fn rejected(&self, err: EditError) -> Self {
        log::debug!("edit skipped: {err}");
        self.clone()
    }
}
