//! Drop targeting for drag-and-drop re-ordering and re-parenting.
//!
//! A row is split vertically into three bands. With the default zones:
//!
//! | Pointer position (top → bottom) | Relation |
//! |---------------------------------|----------|
//! | `y < 0.25`                      | `Before` |
//! | `0.25 ≤ y ≤ 0.75`               | `Inside` |
//! | `y > 0.75`                      | `After`  |

use crate::input::DragEvent;
use crate::view::TreeMutation;
use arbor_core::{NodeId, Relation};

// ─── Zones ───────────────────────────────────────────────────────────────

/// Band boundaries as fractions of the row height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropZones {
    /// Above this fraction the pointer means `Before`. Default: **0.25**.
    pub before: f32,
    /// Below this fraction the pointer means `After`. Default: **0.75**.
    pub after: f32,
}

impl Default for DropZones {
    fn default() -> Self {
        Self {
            before: 0.25,
            after: 0.75,
        }
    }
}

impl DropZones {
    /// Classify a pointer position normalized to `[0, 1]` over the row.
    pub fn classify(&self, y: f32) -> Relation {
        if y < self.before {
            Relation::Before
        } else if y > self.after {
            Relation::After
        } else {
            Relation::Inside
        }
    }

    /// Classify a raw pointer offset from the top of a row of `row_height`.
    /// Compares against scaled thresholds, so a zero-height row never divides.
    pub fn relation_at(&self, offset_y: f32, row_height: f32) -> Relation {
        if offset_y < row_height * self.before {
            Relation::Before
        } else if offset_y > row_height * self.after {
            Relation::After
        } else {
            Relation::Inside
        }
    }
}

// ─── Session ─────────────────────────────────────────────────────────────

/// Transient state of one drag gesture.
///
/// Idle when `dragged` is `None`; all three fields are cleared together on
/// drop or end.
#[derive(Debug, Clone, Default)]
pub struct DragSession {
    dragged: Option<NodeId>,
    hover: Option<NodeId>,
    relation: Option<Relation>,
    zones: DropZones,
}

impl DragSession {
    pub fn new(zones: DropZones) -> Self {
        Self {
            zones,
            ..Default::default()
        }
    }

    pub fn dragged(&self) -> Option<NodeId> {
        self.dragged
    }

    pub fn hover(&self) -> Option<NodeId> {
        self.hover
    }

    pub fn relation(&self) -> Option<Relation> {
        self.relation
    }

    pub fn zones(&self) -> DropZones {
        self.zones
    }

    pub fn is_active(&self) -> bool {
        self.dragged.is_some()
    }

    /// `idle → dragging`.
    pub fn start(&mut self, id: NodeId) {
        log::trace!("drag start {id}");
        self.dragged = Some(id);
        self.hover = None;
        self.relation = None;
    }

    /// Re-classify the pointer over `id`. Returns whether the drop target
    /// or relation changed (i.e. the indicator needs a redraw).
    ///
    /// Hovering the dragged row itself, or hovering while idle, changes
    /// nothing.
    pub fn over(&mut self, id: NodeId, offset_y: f32, row_height: f32) -> bool {
        match self.dragged {
            None => return false,
            Some(dragged) if dragged == id => return false,
            Some(_) => {}
        }
        let relation = self.zones.relation_at(offset_y, row_height);
        let changed = self.hover != Some(id) || self.relation != Some(relation);
        self.hover = Some(id);
        self.relation = Some(relation);
        changed
    }

    /// Release over the current target. Yields the move to commit when a
    /// target was recorded; the session is reset either way.
    pub fn drop(&mut self) -> Option<TreeMutation> {
        let commit = match (self.dragged, self.hover, self.relation) {
            (Some(dragged), Some(target), Some(relation)) => Some(TreeMutation::Move {
                dragged,
                target,
                relation,
            }),
            _ => None,
        };
        log::debug!("drop: {commit:?}");
        self.reset();
        commit
    }

    /// `dragging → idle` without committing anything.
    pub fn end(&mut self) {
        self.reset();
    }

    /// Feed one input event; only `Drop` can produce a mutation.
    pub fn handle(&mut self, event: &DragEvent) -> Option<TreeMutation> {
        match event {
            DragEvent::Start { id } => {
                self.start(*id);
                None
            }
            DragEvent::Over {
                id,
                offset_y,
                row_height,
            } => {
                self.over(*id, *offset_y, *row_height);
                None
            }
            DragEvent::Drop => self.drop(),
            DragEvent::End => {
                self.end();
                None
            }
        }
    }

    /// Whether `id` is the row being dragged (rendered dimmed).
    pub fn is_dragging(&self, id: NodeId) -> bool {
        self.dragged == Some(id)
    }

    /// The drop indicator to draw on row `id`, if it is the hover target.
    pub fn indicator_for(&self, id: NodeId) -> Option<Relation> {
        if self.hover == Some(id) {
            self.relation
        } else {
            None
        }
    }

    fn reset(&mut self) {
        self.dragged = None;
        self.hover = None;
        self.relation = None;
    }
}
