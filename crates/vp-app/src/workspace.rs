//! The chart area: shared axes, annotation overlay and mouse mode.

use std::path::PathBuf;

use vp_core::{Bounds, Point, Rect, TableHandle};
use vp_overlay::{AnnotationOverlay, MouseButton, MouseMode, OverlayResponse};

use crate::coordinator::MultiTableCoordinator;
use crate::export::png_path;
use crate::session::SessionEvent;

/// Status bar text for the pointer position.
pub fn cursor_readout(p: Point) -> String {
    format!("x = {:.6}, y = {:.6}", p.x, p.y)
}

#[derive(Debug)]
pub struct ChartWorkspace {
    coordinator: MultiTableCoordinator,
    overlay: AnnotationOverlay,
    /// Currently visible axis range; zooming narrows it.
    view: Bounds,
    /// Data range the view last snapped to.
    data: Bounds,
}

impl ChartWorkspace {
    /// Workspace with the default overlay, whose label extents are measured
    /// in pixels. Use [`ChartWorkspace::with_overlay`] when pointer events
    /// arrive in data coordinates.
    pub fn new(coordinator: MultiTableCoordinator) -> Self {
        Self::with_overlay(coordinator, AnnotationOverlay::new())
    }

    /// Pointer positions handed to the overlay must be in the same space as
    /// its `TextMeasure`.
    pub fn with_overlay(coordinator: MultiTableCoordinator, overlay: AnnotationOverlay) -> Self {
        let data = coordinator.combined_bounds();
        Self {
            coordinator,
            overlay,
            view: data,
            data,
        }
    }

    pub fn coordinator(&self) -> &MultiTableCoordinator {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut MultiTableCoordinator {
        &mut self.coordinator
    }

    pub fn overlay(&self) -> &AnnotationOverlay {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut AnnotationOverlay {
        &mut self.overlay
    }

    pub fn view(&self) -> Bounds {
        self.view
    }

    pub fn mouse_mode(&self) -> MouseMode {
        self.overlay.mode()
    }

    pub fn set_mouse_mode(&mut self, mode: MouseMode) {
        self.overlay.set_mode(mode);
    }

    pub fn add_table(&mut self) -> TableHandle {
        self.coordinator.add_table()
    }

    /// Drain session results; the view snaps to the data when bounds move.
    pub fn poll(&mut self) -> Vec<(TableHandle, SessionEvent)> {
        let events = self.coordinator.poll();
        let data = self.coordinator.combined_bounds();
        if data != self.data {
            self.data = data;
            self.view = data;
        }
        events
    }

    pub fn press(&mut self, pos: Point, button: MouseButton) -> OverlayResponse {
        self.overlay.press(pos, button)
    }

    pub fn drag(&mut self, pos: Point) -> OverlayResponse {
        self.overlay.drag(pos)
    }

    pub fn release(&mut self, pos: Point) -> OverlayResponse {
        self.overlay.release(pos)
    }

    pub fn double_click(&mut self, pos: Point) -> OverlayResponse {
        self.overlay.double_click(pos)
    }

    /// Zoom to a rubber-band rectangle. Degenerate rectangles are ignored.
    pub fn zoom_to(&mut self, area: Rect) -> bool {
        let r = area.normalized();
        if r.area() <= 0.0 {
            return false;
        }
        self.view = Bounds::new(r.left(), r.right(), r.top(), r.bottom());
        true
    }

    /// Back to the full data range, dropping annotations when configured to.
    pub fn reset_zoom(&mut self) -> Bounds {
        if self.coordinator.config().clear_overlay_on_zoom_reset {
            self.overlay.clear();
        }
        self.data = self.coordinator.combined_bounds();
        self.view = self.data;
        self.view
    }

    pub fn cursor_readout(&self, p: Point) -> String {
        cursor_readout(p)
    }

    pub fn image_path(&self, chosen: impl Into<PathBuf>) -> PathBuf {
        png_path(chosen)
    }
}
