//! WASM bridge for Arbor — exposes the tree view to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. Node ids cross the boundary
//! as plain strings; trees and rows cross as JSON. Incoming id strings are
//! only looked up, never interned, so a host passing arbitrary strings cannot
//! grow the id table.

use arbor_core::{Forest, NodeId, TreeNode, sample_forest};
use arbor_editor::{DragEvent, FetchError, ToggleOutcome, TreeView, VisibleRow};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// The JavaScript-facing tree controller.
///
/// Lazy fetches are driven from JS: when `toggle` answers `"fetch"`, the host
/// fetches however it likes and reports back through `complete_load` or
/// `fail_load`.
#[wasm_bindgen]
pub struct ArborTree {
    view: TreeView,
}

impl Default for ArborTree {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl ArborTree {
    /// Create an empty tree.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        console_error_panic_hook_setup();
        Self {
            view: TreeView::default(),
        }
    }

    /// Replace the tree with the bundled demo data.
    pub fn load_sample(&mut self) {
        self.view.replace(sample_forest());
    }

    /// Replace the tree with a JSON forest (an array of root nodes).
    /// Returns `false` and keeps the current tree on malformed JSON or
    /// duplicate ids.
    pub fn set_json(&mut self, json: &str) -> bool {
        match parse_forest(json) {
            Ok(forest) => {
                self.view.replace(forest);
                true
            }
            Err(e) => {
                log::warn!("set_json rejected: {e}");
                false
            }
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self.view.forest()).unwrap_or_else(|_| "[]".to_string())
    }

    /// Returns `"expanded"`, `"collapsed"`, `"fetch"` (the node is now
    /// loading and the host must fetch its children) or `"missing"`.
    pub fn toggle(&mut self, id: &str) -> String {
        let Some(id) = NodeId::lookup(id) else {
            return "missing".to_string();
        };
        let outcome = match self.view.toggle(id) {
            ToggleOutcome::Expanded => "expanded",
            ToggleOutcome::Collapsed => "collapsed",
            ToggleOutcome::FetchRequired => "fetch",
            ToggleOutcome::NotFound => "missing",
        };
        outcome.to_string()
    }

    /// Add a child; returns the new id, or `undefined` when rejected.
    pub fn add_child(&mut self, parent_id: &str, name: &str) -> Option<String> {
        let parent = NodeId::lookup(parent_id)?;
        self.view.add_child(parent, name).map(|id| id.to_string())
    }

    pub fn rename(&mut self, id: &str, name: &str) -> bool {
        NodeId::lookup(id).is_some_and(|id| self.view.rename(id, name))
    }

    pub fn remove(&mut self, id: &str) -> bool {
        NodeId::lookup(id).is_some_and(|id| self.view.remove(id))
    }

    // ─── Drag & drop ─────────────────────────────────────────────────────
    // Each returns `true` when the tree should be redrawn.

    pub fn drag_start(&mut self, id: &str) -> bool {
        NodeId::lookup(id).is_some_and(|id| self.view.handle_drag(&DragEvent::start(id)))
    }

    /// `offset_y` is measured from the top of the hovered row.
    pub fn drag_over(&mut self, id: &str, offset_y: f32, row_height: f32) -> bool {
        NodeId::lookup(id).is_some_and(|id| {
            self.view
                .handle_drag(&DragEvent::over(id, offset_y, row_height))
        })
    }

    pub fn drop(&mut self) -> bool {
        self.view.handle_drag(&DragEvent::Drop)
    }

    pub fn drag_end(&mut self) -> bool {
        self.view.handle_drag(&DragEvent::End)
    }

    /// `"before"`, `"after"` or `"inside"` if `id` is the current drop
    /// target, else `undefined`.
    pub fn drop_indicator(&self, id: &str) -> Option<String> {
        let id = NodeId::lookup(id)?;
        self.view
            .drag()
            .indicator_for(id)
            .map(|relation| relation.to_string())
    }

    // ─── Lazy loading ────────────────────────────────────────────────────

    /// Install fetched children (JSON array of nodes) under `id`.
    /// Unparseable payloads count as a failed fetch.
    pub fn complete_load(&mut self, id: &str, children_json: &str) -> bool {
        let Some(id) = NodeId::lookup(id) else {
            return false;
        };
        let result = serde_json::from_str::<Vec<TreeNode>>(children_json).map_err(|e| {
            FetchError::Failed {
                id,
                reason: e.to_string(),
            }
        });
        self.view.complete_load(id, result)
    }

    pub fn fail_load(&mut self, id: &str, reason: &str) {
        let Some(id) = NodeId::lookup(id) else {
            return;
        };
        let err = FetchError::Failed {
            id,
            reason: reason.to_string(),
        };
        self.view.complete_load(id, Err(err));
    }

    /// The rows currently on screen, as a JSON array.
    pub fn visible_rows_json(&self) -> String {
        let visible = self.view.visible_rows();
        let rows: Vec<RowJson> = visible.iter().map(RowJson::from).collect();
        serde_json::to_string(&rows).unwrap_or_else(|_| "[]".to_string())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RowJson<'a> {
    id: &'a str,
    name: &'a str,
    depth: usize,
    can_expand: bool,
    is_expanded: bool,
    is_loading: bool,
}

impl<'a> From<&'a VisibleRow> for RowJson<'a> {
    fn from(row: &'a VisibleRow) -> Self {
        Self {
            id: row.id.as_str(),
            name: &row.name,
            depth: row.depth,
            can_expand: row.can_expand,
            is_expanded: row.is_expanded,
            is_loading: row.is_loading,
        }
    }
}

fn parse_forest(json: &str) -> Result<Forest, String> {
    let forest: Forest = serde_json::from_str(json).map_err(|e| e.to_string())?;
    forest.validate().map_err(|e| e.to_string())?;
    Ok(forest)
}

/// Set up better panic messages for WASM debugging.
fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Arbor WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone validation (no tree needed) ─────────────────────────────

/// Validate a JSON forest. Returns `{"ok":true}` or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate_json(json: &str) -> String {
    let value = match parse_forest(json) {
        Ok(_) => serde_json::json!({ "ok": true }),
        Err(e) => serde_json::json!({ "ok": false, "error": e }),
    };
    value.to_string()
}
