//! Pointer-driven aisle authoring state machine.

use shelfplan_ir::{Aisle, AisleId, NewAisle, Store};
use shelfplan_math::{Point2, Rect2, Vec2};
use tracing::debug;

use crate::{
    apply_resize, hit_test_resize_handle, validate_aisle_rect, Camera, EditorConfig, ResizeHandle,
};

/// Keyboard/tool state sampled with a pointer press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// The pan tool is selected in the toolbar.
    pub pan_tool: bool,
    /// A modifier key (e.g. space or middle button) is held.
    pub modifier: bool,
}

impl Modifiers {
    fn pans(&self) -> bool {
        self.pan_tool || self.modifier
    }
}

/// Current interaction of the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum EditMode {
    /// Nothing in progress.
    Idle,
    /// Dragging out a new aisle.
    DraggingNew {
        /// Snapped world anchor.
        anchor: Point2,
        /// Exact span anchor↔pointer; what a commit validates.
        span: Rect2,
        /// `span` with each extent raised to at least the minimum size.
        preview: Rect2,
    },
    /// Dragging a handle of an existing aisle.
    Resizing {
        /// Aisle being resized.
        aisle_id: AisleId,
        /// Handle being dragged.
        handle: ResizeHandle,
        /// Rectangle before the drag.
        original: Rect2,
        /// Rectangle following the pointer.
        preview: Rect2,
    },
    /// Dragging the view.
    Panning {
        /// Last pointer position in screen pixels.
        last: Point2,
    },
}

/// What a pointer press started.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerDown {
    /// The view is being panned.
    Panning,
    /// A handle of the selected aisle was grabbed.
    Resizing(ResizeHandle),
    /// An existing aisle was hit; the caller should select it.
    Selected(AisleId),
    /// A new aisle is being dragged out.
    Drawing,
}

/// A validated edit for the caller to apply.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorCommit {
    /// Add this aisle to the store.
    Create(NewAisle),
    /// Move/resize an existing aisle to `rect`.
    Resize {
        /// Aisle to update.
        aisle_id: AisleId,
        /// New rectangle.
        rect: Rect2,
    },
}

/// Floor-plan editor: camera plus the in-progress interaction.
#[derive(Debug, Clone)]
pub struct AisleEditor {
    config: EditorConfig,
    camera: Camera,
    mode: EditMode,
}

impl AisleEditor {
    /// New idle editor with an unpanned camera.
    pub fn new(config: EditorConfig) -> Self {
        let camera = Camera::new(&config);
        Self {
            config,
            camera,
            mode: EditMode::Idle,
        }
    }

    /// The configuration.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The camera.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Current interaction mode.
    pub fn mode(&self) -> &EditMode {
        &self.mode
    }

    /// Rectangle to draw for the in-progress create or resize.
    pub fn preview(&self) -> Option<Rect2> {
        match &self.mode {
            EditMode::DraggingNew { preview, .. } | EditMode::Resizing { preview, .. } => {
                Some(*preview)
            }
            _ => None,
        }
    }

    /// Handle grab distance in metres at the current zoom.
    pub fn handle_tolerance(&self) -> f64 {
        self.config.handle_tolerance / self.camera.zoom()
    }

    fn snapped_world(&self, screen: Point2) -> Point2 {
        let world = self.camera.screen_to_world(screen);
        Point2::new(self.config.snap_value(world.x), self.config.snap_value(world.y))
    }

    /// Topmost aisle under a world point (last drawn wins).
    pub fn aisle_at<'a>(&self, world: Point2, aisles: &'a [Aisle]) -> Option<&'a Aisle> {
        aisles.iter().rev().find(|a| a.rect().contains_point(world))
    }

    /// Handle of `aisle` under world point `world`.
    pub fn hit_test_resize_handle(&self, world: Point2, aisle: &Aisle) -> Option<ResizeHandle> {
        hit_test_resize_handle(world, &aisle.rect(), self.handle_tolerance())
    }

    /// Route a pointer press: pan with modifiers, resize on a handle of the
    /// selected aisle, select on an aisle body, otherwise start drawing.
    pub fn pointer_down(
        &mut self,
        screen: Point2,
        aisles: &[Aisle],
        selected: Option<&Aisle>,
        modifiers: Modifiers,
    ) -> PointerDown {
        if modifiers.pans() {
            self.begin_pan(screen);
            return PointerDown::Panning;
        }
        if let Some(aisle) = selected {
            if let Some(handle) = self.begin_resize(screen, aisle) {
                return PointerDown::Resizing(handle);
            }
        }
        let world = self.camera.screen_to_world(screen);
        if let Some(hit) = self.aisle_at(world, aisles) {
            return PointerDown::Selected(hit.id.clone());
        }
        self.begin_drag_create(screen, aisles, modifiers);
        PointerDown::Drawing
    }

    /// Feed pointer motion to whatever is in progress.
    pub fn pointer_move(&mut self, screen: Point2) {
        match self.mode {
            EditMode::DraggingNew { .. } => self.update_drag_create(screen),
            EditMode::Resizing { .. } => self.update_resize(screen),
            EditMode::Panning { .. } => self.update_pan(screen),
            EditMode::Idle => {}
        }
    }

    /// Finish whatever is in progress, returning the validated edit.
    pub fn pointer_up(&mut self, store: &Store, aisles: &[Aisle]) -> Option<EditorCommit> {
        match self.mode {
            EditMode::DraggingNew { .. } => self.commit_drag_create(store, aisles),
            EditMode::Resizing { .. } => self.commit_resize(store, aisles),
            EditMode::Panning { .. } => {
                self.end_pan();
                None
            }
            EditMode::Idle => None,
        }
    }

    /// Start dragging a new aisle. Refused when the press lands on an
    /// existing aisle or a pan modifier is active.
    pub fn begin_drag_create(
        &mut self,
        screen: Point2,
        aisles: &[Aisle],
        modifiers: Modifiers,
    ) -> bool {
        if modifiers.pans() {
            return false;
        }
        if self
            .aisle_at(self.camera.screen_to_world(screen), aisles)
            .is_some()
        {
            return false;
        }
        let anchor = self.snapped_world(screen);
        let span = Rect2::new(anchor.x, anchor.y, 0.0, 0.0);
        self.mode = EditMode::DraggingNew {
            anchor,
            span,
            preview: self.floor_preview(span),
        };
        true
    }

    fn floor_preview(&self, span: Rect2) -> Rect2 {
        let min = self.config.min_aisle_size;
        Rect2::new(span.x, span.z, span.width.max(min), span.length.max(min))
    }

    /// Update the new-aisle rectangle to span anchor↔pointer.
    pub fn update_drag_create(&mut self, screen: Point2) {
        let current = self.snapped_world(screen);
        if let EditMode::DraggingNew { anchor, .. } = self.mode {
            let span = Rect2::from_corners(anchor, current);
            self.mode = EditMode::DraggingNew {
                anchor,
                span,
                preview: self.floor_preview(span),
            };
        }
    }

    /// Validate the dragged rectangle and emit it as a new aisle named
    /// `"Aisle {n+1}"`. Invalid geometry is discarded silently.
    pub fn commit_drag_create(&mut self, store: &Store, aisles: &[Aisle]) -> Option<EditorCommit> {
        let EditMode::DraggingNew { span, .. } = std::mem::replace(&mut self.mode, EditMode::Idle)
        else {
            return None;
        };
        if let Err(reason) =
            validate_aisle_rect(&span, self.config.min_aisle_size, store, aisles, None)
        {
            debug!(rect = %span, %reason, "discarding new aisle");
            return None;
        }
        let existing = aisles.iter().filter(|a| a.store_id == store.id).count();
        Some(EditorCommit::Create(NewAisle::from_rect(
            format!("Aisle {}", existing + 1),
            span,
        )))
    }

    /// Grab a handle of `aisle` under `screen`, if one is there.
    pub fn begin_resize(&mut self, screen: Point2, aisle: &Aisle) -> Option<ResizeHandle> {
        let world = self.camera.screen_to_world(screen);
        let handle = self.hit_test_resize_handle(world, aisle)?;
        self.mode = EditMode::Resizing {
            aisle_id: aisle.id.clone(),
            handle,
            original: aisle.rect(),
            preview: aisle.rect(),
        };
        Some(handle)
    }

    /// Drag the grabbed handle to `screen`.
    pub fn update_resize(&mut self, screen: Point2) {
        let p = self.snapped_world(screen);
        let min = self.config.min_aisle_size;
        if let EditMode::Resizing {
            handle,
            original,
            preview,
            ..
        } = &mut self.mode
        {
            *preview = apply_resize(*handle, original, p, min);
        }
    }

    /// Validate the resized rectangle (ignoring the aisle itself). Invalid
    /// geometry is discarded and the aisle keeps its old rectangle.
    pub fn commit_resize(&mut self, store: &Store, aisles: &[Aisle]) -> Option<EditorCommit> {
        let EditMode::Resizing {
            aisle_id,
            original,
            preview,
            ..
        } = std::mem::replace(&mut self.mode, EditMode::Idle)
        else {
            return None;
        };
        if preview == original {
            return None;
        }
        if let Err(reason) = validate_aisle_rect(
            &preview,
            self.config.min_aisle_size,
            store,
            aisles,
            Some(&aisle_id),
        ) {
            debug!(aisle = %aisle_id, rect = %preview, %reason, "discarding resize");
            return None;
        }
        Some(EditorCommit::Resize {
            aisle_id,
            rect: preview,
        })
    }

    /// Start panning from `screen`.
    pub fn begin_pan(&mut self, screen: Point2) {
        self.mode = EditMode::Panning { last: screen };
    }

    /// Pan by the pointer's movement since the last event.
    pub fn update_pan(&mut self, screen: Point2) {
        if let EditMode::Panning { last } = &mut self.mode {
            let delta: Vec2 = screen - *last;
            *last = screen;
            self.camera.pan_by(delta);
        }
    }

    /// Stop panning.
    pub fn end_pan(&mut self) {
        if matches!(self.mode, EditMode::Panning { .. }) {
            self.mode = EditMode::Idle;
        }
    }

    /// Pan the view by `delta` pixels (scroll or keyboard).
    pub fn pan_by(&mut self, delta: Vec2) {
        self.camera.pan_by(delta);
    }

    /// Anchor-preserving zoom.
    pub fn zoom_at(&mut self, screen: Point2, factor: f64) {
        self.camera.zoom_at(screen, factor);
    }

    /// Drop any in-progress interaction without committing.
    pub fn cancel(&mut self) {
        self.mode = EditMode::Idle;
    }
}
