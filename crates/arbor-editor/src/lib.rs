pub mod drag;
pub mod input;
pub mod lazy;
pub mod rows;
pub mod view;

pub use drag::{DragSession, DropZones};
pub use input::DragEvent;
pub use lazy::{ChildSource, FetchError};
pub use rows::{VisibleRow, visible_rows};
pub use view::{ToggleOutcome, TreeMutation, TreeView, ViewConfig};
