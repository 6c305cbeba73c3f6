//! Input abstraction layer.
//!
//! Normalizes the drag-and-drop signals a row receives (HTML5 drag events,
//! pointer capture, a terminal mouse) into one `DragEvent` enum consumed by
//! the `DragSession`.

use arbor_core::NodeId;

/// A normalized drag gesture event.
#[derive(Debug, Clone, PartialEq)]
pub enum DragEvent {
    /// A row was picked up.
    Start { id: NodeId },

    /// The pointer is over a row.
    Over {
        id: NodeId,
        /// Pointer offset from the top edge of the row.
        offset_y: f32,
        /// Rendered height of the row, same unit as `offset_y`.
        row_height: f32,
    },

    /// Released over the current hover target.
    Drop,

    /// Gesture finished or was cancelled.
    End,
}

impl DragEvent {
    pub fn start(id: NodeId) -> Self {
        Self::Start { id }
    }

    pub fn over(id: NodeId, offset_y: f32, row_height: f32) -> Self {
        Self::Over {
            id,
            offset_y,
            row_height,
        }
    }

    /// The row this event refers to, if any.
    pub fn target(&self) -> Option<NodeId> {
        match self {
            Self::Start { id } | Self::Over { id, .. } => Some(*id),
            Self::Drop | Self::End => None,
        }
    }
}
