//! Tree view state owner.
//!
//! `TreeView` holds the authoritative `Forest` snapshot and turns UI intents
//! (toggle, add, rename, remove, drag, lazy load) into engine edits. Every
//! edit swaps in a new snapshot; callers that kept an older `Forest` (a
//! renderer diffing frames, a pending async task) keep a consistent view.
//!
//! Per-row UI state (rename box open, delete confirmation, "add child" input)
//! lives in the row widgets, not the tree.

use crate::drag::{DragSession, DropZones};
use crate::input::DragEvent;
use crate::lazy::{ChildSource, FetchError};
use crate::rows::{VisibleRow, visible_rows};
use arbor_core::{Forest, NodeId, NodePatch, Relation, TreeNode};

// ─── Config ──────────────────────────────────────────────────────────────

/// Configuration for a `TreeView`.
#[derive(Debug, Clone)]
pub struct ViewConfig {
    /// Row bands used to classify drops.
    pub drop_zones: DropZones,

    /// Expand a collapsed parent when a child is added to it, so the new row
    /// is visible. Default: **true**.
    pub expand_on_add: bool,
}

impl ViewConfig {
    pub fn new() -> Self {
        Self {
            drop_zones: DropZones::default(),
            expand_on_add: true,
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Mutations ───────────────────────────────────────────────────────────

/// One structural edit, as produced by UI handlers and the drag session.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeMutation {
    SetExpanded {
        id: NodeId,
        expanded: bool,
    },
    AddChild {
        parent_id: NodeId,
        node: Box<TreeNode>,
    },
    Remove {
        id: NodeId,
    },
    Rename {
        id: NodeId,
        name: String,
    },
    Move {
        dragged: NodeId,
        target: NodeId,
        relation: Relation,
    },
    /// Mark a lazy node as loading before its fetch is issued.
    BeginLoad {
        id: NodeId,
    },
    /// Install fetched children.
    CompleteLoad {
        id: NodeId,
        children: Vec<TreeNode>,
    },
    /// Fetch failed: stop loading, keep the node lazy so it can be retried.
    FailLoad {
        id: NodeId,
    },
}

/// What `toggle` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Expanded,
    Collapsed,
    /// The node is lazy and now marked loading; the caller must fetch.
    FetchRequired,
    NotFound,
}

// ─── View ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct TreeView {
    forest: Forest,
    drag: DragSession,
    config: ViewConfig,
}

impl Default for TreeView {
    fn default() -> Self {
        Self::new(Forest::new())
    }
}

impl TreeView {
    pub fn new(forest: Forest) -> Self {
        Self::with_config(forest, ViewConfig::new())
    }

    pub fn with_config(forest: Forest, config: ViewConfig) -> Self {
        Self {
            forest,
            drag: DragSession::new(config.drop_zones),
            config,
        }
    }

    /// The current snapshot.
    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    /// A cheap, fully shared copy of the current snapshot.
    pub fn snapshot(&self) -> Forest {
        self.forest.clone()
    }

    /// Swap in an externally produced snapshot. Any drag in progress refers
    /// to the old one and is dropped.
    pub fn replace(&mut self, forest: Forest) {
        self.forest = forest;
        self.drag.end();
    }

    pub fn drag(&self) -> &DragSession {
        &self.drag
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn visible_rows(&self) -> Vec<VisibleRow> {
        visible_rows(&self.forest)
    }

    /// Apply one mutation. Returns `false` when the engine rejected it
    /// (stale id, cycle, duplicate) and the snapshot was left as is.
    pub fn apply_mutation(&mut self, mutation: TreeMutation) -> bool {
        let result = match mutation {
            TreeMutation::SetExpanded { id, expanded } => {
                self.forest.try_update(id, &NodePatch::expanded(expanded))
            }
            TreeMutation::AddChild { parent_id, node } => {
                self.forest.try_add_child(parent_id, *node)
            }
            TreeMutation::Remove { id } => self.forest.try_remove(id),
            TreeMutation::Rename { id, name } => {
                self.forest.try_update(id, &NodePatch::rename(name))
            }
            TreeMutation::Move {
                dragged,
                target,
                relation,
            } => self.forest.try_move(dragged, target, relation),
            TreeMutation::BeginLoad { id } => self.forest.try_update(id, &NodePatch::loading(true)),
            TreeMutation::CompleteLoad { id, children } => {
                self.forest.try_materialize_lazy_children(id, children)
            }
            TreeMutation::FailLoad { id } => self.forest.try_update(id, &NodePatch::loading(false)),
        };
        match result {
            Ok(forest) => {
                self.forest = forest;
                true
            }
            Err(err) => {
                log::debug!("mutation skipped: {err}");
                false
            }
        }
    }

    // ─── Intents ─────────────────────────────────────────────────────────

    /// Expand or collapse `id`. An unfetched lazy node is marked loading
    /// instead and reported as `FetchRequired`.
    pub fn toggle(&mut self, id: NodeId) -> ToggleOutcome {
        let Some(node) = self.forest.find(id) else {
            return ToggleOutcome::NotFound;
        };
        if node.has_lazy_children && !node.has_children() && !node.is_loading {
            self.apply_mutation(TreeMutation::BeginLoad { id });
            return ToggleOutcome::FetchRequired;
        }
        let expanded = !node.is_expanded;
        self.apply_mutation(TreeMutation::SetExpanded { id, expanded });
        if expanded {
            ToggleOutcome::Expanded
        } else {
            ToggleOutcome::Collapsed
        }
    }

    /// Add a child named `name` (trimmed) under `parent`.
    /// Returns the new node's id, or `None` for a blank name or unknown parent.
    pub fn add_child(&mut self, parent: NodeId, name: &str) -> Option<NodeId> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let id = NodeId::generate();
        let node = Box::new(TreeNode::new(id, name));
        if !self.apply_mutation(TreeMutation::AddChild {
            parent_id: parent,
            node,
        }) {
            return None;
        }
        if self.config.expand_on_add
            && self.forest.find(parent).is_some_and(|p| !p.is_expanded)
        {
            self.apply_mutation(TreeMutation::SetExpanded {
                id: parent,
                expanded: true,
            });
        }
        Some(id)
    }

    /// Rename `id` to `name` (trimmed). Blank or unchanged names are ignored.
    pub fn rename(&mut self, id: NodeId, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.forest.find(id).is_none_or(|n| n.name == name) {
            return false;
        }
        self.apply_mutation(TreeMutation::Rename {
            id,
            name: name.to_string(),
        })
    }

    /// Delete `id` and everything below it.
    pub fn remove(&mut self, id: NodeId) -> bool {
        self.apply_mutation(TreeMutation::Remove { id })
    }

    /// Feed a drag event. Returns whether the view needs a redraw: the drop
    /// indicator moved, a gesture began or ended, or a move was committed.
    pub fn handle_drag(&mut self, event: &DragEvent) -> bool {
        match event {
            DragEvent::Over {
                id,
                offset_y,
                row_height,
            } => self.drag.over(*id, *offset_y, *row_height),
            DragEvent::Start { .. } => {
                self.drag.handle(event);
                true
            }
            DragEvent::Drop | DragEvent::End => {
                let was_active = self.drag.is_active();
                if let Some(mutation) = self.drag.handle(event) {
                    self.apply_mutation(mutation);
                }
                was_active
            }
        }
    }

    // ─── Lazy loading ────────────────────────────────────────────────────

    /// Mark a lazy node as loading. `false` if it is unknown, not lazy, or
    /// already loading.
    pub fn begin_load(&mut self, id: NodeId) -> bool {
        let ready = self
            .forest
            .find(id)
            .is_some_and(|n| n.has_lazy_children && !n.is_loading);
        ready && self.apply_mutation(TreeMutation::BeginLoad { id })
    }

    /// Fold a fetch result back in, looked up by id. A no-op when the node
    /// was removed while the fetch was in flight, or is no longer lazy (a
    /// repeated completion, or children added mid-load). A stale loading
    /// flag is cleared in the latter case.
    pub fn complete_load(&mut self, id: NodeId, result: Result<Vec<TreeNode>, FetchError>) -> bool {
        match result {
            Ok(_) if self.forest.find(id).is_some_and(|n| !n.has_lazy_children) => {
                log::debug!("late completion for {id} ignored: children already known");
                self.apply_mutation(TreeMutation::FailLoad { id });
                false
            }
            Ok(children) => {
                if self.apply_mutation(TreeMutation::CompleteLoad { id, children }) {
                    return true;
                }
                self.apply_mutation(TreeMutation::FailLoad { id });
                false
            }
            Err(err) => {
                log::warn!("{err}");
                self.apply_mutation(TreeMutation::FailLoad { id });
                false
            }
        }
    }

    /// Fetch and install the children of lazy node `id`.
    /// Returns whether children were installed.
    pub async fn load_children<S: ChildSource>(&mut self, id: NodeId, source: &S) -> bool {
        let Some(node) = self.forest.find(id).filter(|n| n.has_lazy_children) else {
            return false;
        };
        if !node.is_loading {
            self.apply_mutation(TreeMutation::BeginLoad { id });
        }
        let result = source.fetch_children(id).await;
        self.complete_load(id, result)
    }

    /// `toggle`, fetching children on the spot when required.
    pub async fn toggle_with<S: ChildSource>(&mut self, id: NodeId, source: &S) -> ToggleOutcome {
        let outcome = self.toggle(id);
        if outcome == ToggleOutcome::FetchRequired {
            let result = source.fetch_children(id).await;
            return if self.complete_load(id, result) {
                ToggleOutcome::Expanded
            } else if self.forest.contains(id) {
                ToggleOutcome::Collapsed
            } else {
                ToggleOutcome::NotFound
            };
        }
        outcome
    }
}
