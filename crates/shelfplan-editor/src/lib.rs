#![warn(missing_docs)]

//! Interactive 2D aisle authoring.
//!
//! The editor turns pointer input on a zoomable, pannable floor plan into
//! aisle rectangles: drag on empty floor to create, drag a handle of the
//! selected aisle to resize. Every commit is validate-then-apply; geometry
//! that is too small, leaves the store, or overlaps another aisle is
//! discarded without an error and the editor returns to idle.
//!
//! The editor does not own the aisle list. Callers pass the current aisles
//! in and apply the returned [`EditorCommit`] to their own state.
//!
//! # Example
//!
//! ```
//! use shelfplan_editor::{AisleEditor, EditorCommit, EditorConfig, Modifiers};
//! use shelfplan_ir::Store;
//! use shelfplan_math::Point2;
//!
//! let store = Store {
//!     id: "s1".into(),
//!     owner_id: "u1".into(),
//!     name: "Shop".into(),
//!     description: None,
//!     color: "#ffffff".into(),
//!     width: 20.0,
//!     depth: 10.0,
//!     created_at: 0,
//!     updated_at: 0,
//! };
//! let mut editor = AisleEditor::new(EditorConfig::default());
//! let from = editor.camera().world_to_screen(Point2::new(2.0, 1.0));
//! let to = editor.camera().world_to_screen(Point2::new(4.0, 7.0));
//!
//! editor.pointer_down(from, &[], None, Modifiers::default());
//! editor.pointer_move(to);
//! match editor.pointer_up(&store, &[]) {
//!     Some(EditorCommit::Create(aisle)) => assert_eq!(aisle.name, "Aisle 1"),
//!     other => panic!("expected a new aisle, got {other:?}"),
//! }
//! ```

mod camera;
mod config;
mod editor;
mod handle;
mod validate;

pub use camera::Camera;
pub use config::EditorConfig;
pub use editor::{AisleEditor, EditMode, EditorCommit, Modifiers, PointerDown};
pub use handle::{apply_resize, hit_test_resize_handle, ResizeHandle};
pub use validate::{validate_aisle_rect, Rejection};

use thiserror::Error;

/// Errors from editor configuration.
#[derive(Debug, Clone, Error)]
pub enum EditorError {
    /// A configuration value is out of range.
    #[error("invalid editor config: {0}")]
    InvalidConfig(String),
}

/// Result type for editor operations.
pub type Result<T> = std::result::Result<T, EditorError>;
