//! Pointer-driven annotation state machine.
//!
//! Events arrive already mapped to chart coordinates. Every handler returns an
//! [`OverlayResponse`] telling the host whether the chart's own zoom/pan
//! handling should still see the event.

use serde::{Deserialize, Serialize};
use std::fmt;

use vp_core::{IdAllocator, LabelId, MarkerId, Point, Size};

use crate::items::{DEFAULT_LABEL_TEXT, FixedAdvance, GroupMarker, TextLabel, TextMeasure};

/// What a left press on empty chart space does.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseMode {
    /// Rubber-band zoom owned by the chart; the overlay stays out of the way.
    #[default]
    Zoom,
    DrawEllipse,
    WriteText,
}

impl fmt::Display for MouseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MouseMode::Zoom => "zoom",
            MouseMode::DrawEllipse => "draw ellipse",
            MouseMode::WriteText => "write text",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum OverlayState {
    #[default]
    Idle,
    /// A marker is being stretched from its origin to the pointer.
    DrawingMarker { marker: MarkerId },
    /// An existing label follows the pointer, keeping the original grab offset.
    DraggingExisting { label: LabelId, grab: Size },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayResponse {
    Consumed,
    Passthrough,
}

impl OverlayResponse {
    pub fn is_consumed(self) -> bool {
        matches!(self, OverlayResponse::Consumed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hit {
    Marker(MarkerId),
    Label(LabelId),
}

pub struct AnnotationOverlay {
    mode: MouseMode,
    state: OverlayState,
    /// Set while a press the overlay consumed is still held.
    pressed: bool,
    markers: Vec<GroupMarker>,
    labels: Vec<TextLabel>,
    ids: IdAllocator,
    measure: Box<dyn TextMeasure>,
}

impl fmt::Debug for AnnotationOverlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotationOverlay")
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("markers", &self.markers.len())
            .field("labels", &self.labels.len())
            .finish()
    }
}

impl Default for AnnotationOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationOverlay {
    pub fn new() -> Self {
        Self::with_measure(FixedAdvance::default())
    }

    pub fn with_measure(measure: impl TextMeasure + 'static) -> Self {
        Self {
            mode: MouseMode::default(),
            state: OverlayState::Idle,
            pressed: false,
            markers: Vec::new(),
            labels: Vec::new(),
            ids: IdAllocator::new(),
            measure: Box::new(measure),
        }
    }

    pub fn mode(&self) -> MouseMode {
        self.mode
    }

    /// Switch modes. Any gesture in flight is dropped; entities it created stay.
    pub fn set_mode(&mut self, mode: MouseMode) {
        if self.mode != mode {
            tracing::debug!(from = %self.mode, to = %mode, "overlay mode changed");
        }
        self.mode = mode;
        self.state = OverlayState::Idle;
        self.pressed = false;
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn markers(&self) -> &[GroupMarker] {
        &self.markers
    }

    pub fn labels(&self) -> &[TextLabel] {
        &self.labels
    }

    pub fn marker(&self, id: MarkerId) -> Option<&GroupMarker> {
        self.markers.iter().find(|m| m.id == id)
    }

    pub fn label(&self, id: LabelId) -> Option<&TextLabel> {
        self.labels.iter().find(|l| l.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty() && self.labels.is_empty()
    }

    /// First entity under `p`: markers before labels, each in creation order.
    pub fn hit_test(&self, p: Point) -> Option<Hit> {
        if let Some(m) = self.markers.iter().find(|m| m.contains(p)) {
            return Some(Hit::Marker(m.id));
        }
        self.labels
            .iter()
            .find(|l| l.contains(p))
            .map(|l| Hit::Label(l.id))
    }

    /// Topmost (most recently created) label under `p`.
    fn topmost_label_at(&self, p: Point) -> Option<LabelId> {
        self.labels.iter().rev().find(|l| l.contains(p)).map(|l| l.id)
    }

    pub fn press(&mut self, pos: Point, button: MouseButton) -> OverlayResponse {
        match button {
            MouseButton::Right => self.delete_at(pos),
            MouseButton::Middle => OverlayResponse::Passthrough,
            MouseButton::Left => self.left_press(pos),
        }
    }

    fn delete_at(&mut self, pos: Point) -> OverlayResponse {
        let Some(hit) = self.hit_test(pos) else {
            return OverlayResponse::Passthrough;
        };
        match hit {
            Hit::Marker(id) => {
                self.remove_marker(id);
            }
            Hit::Label(id) => {
                self.remove_label(id);
            }
        }
        OverlayResponse::Consumed
    }

    fn left_press(&mut self, pos: Point) -> OverlayResponse {
        match self.mode {
            MouseMode::Zoom => OverlayResponse::Passthrough,
            MouseMode::DrawEllipse => {
                let id = self.ids.allocate();
                self.markers.push(GroupMarker {
                    id,
                    origin: pos,
                    extent: Size::ZERO,
                });
                tracing::debug!(marker = %id, x = pos.x, y = pos.y, "marker started");
                self.state = OverlayState::DrawingMarker { marker: id };
                self.pressed = true;
                OverlayResponse::Consumed
            }
            MouseMode::WriteText => {
                if let Some(id) = self.topmost_label_at(pos) {
                    let grab = self
                        .label(id)
                        .map(|l| l.position.offset_to(pos))
                        .unwrap_or(Size::ZERO);
                    self.state = OverlayState::DraggingExisting { label: id, grab };
                } else {
                    let id = self.ids.allocate();
                    let extent = self.measure.measure(DEFAULT_LABEL_TEXT);
                    self.labels.push(TextLabel {
                        id,
                        position: pos,
                        text: DEFAULT_LABEL_TEXT.to_string(),
                        editable: false,
                        extent,
                    });
                    tracing::debug!(label = %id, x = pos.x, y = pos.y, "label placed");
                    self.state = OverlayState::Idle;
                }
                self.pressed = true;
                OverlayResponse::Consumed
            }
        }
    }

    /// Pointer moved with a button held.
    pub fn drag(&mut self, pos: Point) -> OverlayResponse {
        if !self.pressed {
            return OverlayResponse::Passthrough;
        }
        match self.state {
            OverlayState::DrawingMarker { marker } => {
                if let Some(m) = self.markers.iter_mut().find(|m| m.id == marker) {
                    m.extent = m.origin.offset_to(pos);
                }
            }
            OverlayState::DraggingExisting { label, grab } => {
                if let Some(l) = self.labels.iter_mut().find(|l| l.id == label) {
                    l.position = pos.translate(Size::new(-grab.width, -grab.height));
                }
            }
            OverlayState::Idle => {}
        }
        OverlayResponse::Consumed
    }

    pub fn release(&mut self, pos: Point) -> OverlayResponse {
        if !self.pressed {
            return OverlayResponse::Passthrough;
        }
        if let OverlayState::DrawingMarker { marker } = self.state {
            if let Some(m) = self.markers.iter_mut().find(|m| m.id == marker) {
                m.extent = m.origin.offset_to(pos);
            }
        }
        self.state = OverlayState::Idle;
        self.pressed = false;
        OverlayResponse::Consumed
    }

    /// Double-clicking a label makes its text editable.
    pub fn double_click(&mut self, pos: Point) -> OverlayResponse {
        let Some(id) = self.topmost_label_at(pos) else {
            return OverlayResponse::Passthrough;
        };
        if let Some(l) = self.labels.iter_mut().find(|l| l.id == id) {
            l.editable = true;
        }
        OverlayResponse::Consumed
    }

    /// Pointer left a label: editing ends. Returns whether anything changed.
    pub fn hover_leave(&mut self, id: LabelId) -> bool {
        match self.labels.iter_mut().find(|l| l.id == id) {
            Some(l) if l.editable => {
                l.editable = false;
                true
            }
            _ => false,
        }
    }

    /// Replace a label's text. Only editable labels accept new text.
    pub fn set_label_text(&mut self, id: LabelId, text: &str) -> bool {
        let Some(l) = self.labels.iter_mut().find(|l| l.id == id) else {
            return false;
        };
        if !l.editable {
            return false;
        }
        l.text = text.to_string();
        l.extent = self.measure.measure(text);
        true
    }

    pub fn remove_marker(&mut self, id: MarkerId) -> bool {
        let before = self.markers.len();
        self.markers.retain(|m| m.id != id);
        let removed = self.markers.len() != before;
        if removed {
            if self.state == (OverlayState::DrawingMarker { marker: id }) {
                self.state = OverlayState::Idle;
            }
            tracing::debug!(marker = %id, "marker removed");
        }
        removed
    }

    pub fn remove_label(&mut self, id: LabelId) -> bool {
        let before = self.labels.len();
        self.labels.retain(|l| l.id != id);
        let removed = self.labels.len() != before;
        if removed {
            if matches!(self.state, OverlayState::DraggingExisting { label, .. } if label == id) {
                self.state = OverlayState::Idle;
            }
            tracing::debug!(label = %id, "label removed");
        }
        removed
    }

    /// Remove every marker and label. The mode is kept.
    pub fn clear(&mut self) {
        if !self.is_empty() {
            tracing::debug!(
                markers = self.markers.len(),
                labels = self.labels.len(),
                "overlay cleared"
            );
        }
        self.markers.clear();
        self.labels.clear();
        self.state = OverlayState::Idle;
        self.pressed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vp_core::Rect;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn draw(o: &mut AnnotationOverlay, from: Point, to: Point) -> MarkerId {
        o.set_mode(MouseMode::DrawEllipse);
        o.press(from, MouseButton::Left);
        o.drag(to);
        o.release(to);
        o.markers().last().map(|m| m.id).unwrap()
    }

    #[test]
    fn zoom_mode_passes_left_gestures_through() {
        let mut o = AnnotationOverlay::new();
        assert_eq!(o.press(p(1.0, 1.0), MouseButton::Left), OverlayResponse::Passthrough);
        assert_eq!(o.drag(p(2.0, 2.0)), OverlayResponse::Passthrough);
        assert_eq!(o.release(p(2.0, 2.0)), OverlayResponse::Passthrough);
        assert!(o.is_empty());
    }

    #[test]
    fn drawing_tracks_pointer_and_finishes_idle() {
        let mut o = AnnotationOverlay::new();
        o.set_mode(MouseMode::DrawEllipse);
        assert!(o.press(p(1.0, 1.0), MouseButton::Left).is_consumed());
        let id = o.markers()[0].id;
        assert_eq!(o.state(), OverlayState::DrawingMarker { marker: id });

        o.drag(p(4.0, 3.0));
        assert_eq!(o.marker(id).unwrap().extent, Size::new(3.0, 2.0));

        o.release(p(5.0, 5.0));
        assert_eq!(o.state(), OverlayState::Idle);
        assert_eq!(o.marker(id).unwrap().extent, Size::new(4.0, 4.0));
    }

    #[test]
    fn negative_drag_normalizes_rect() {
        let mut o = AnnotationOverlay::new();
        let id = draw(&mut o, p(5.0, 5.0), p(2.0, 1.0));
        let m = o.marker(id).unwrap();
        assert_eq!(m.extent, Size::new(-3.0, -4.0));
        assert_eq!(m.rect(), Rect::new(p(2.0, 1.0), Size::new(3.0, 4.0)));
    }

    #[test]
    fn right_click_on_overlap_deletes_exactly_one() {
        let mut o = AnnotationOverlay::new();
        let first = draw(&mut o, p(0.0, 0.0), p(10.0, 10.0));
        let second = draw(&mut o, p(5.0, 5.0), p(15.0, 15.0));

        assert!(o.press(p(7.0, 7.0), MouseButton::Right).is_consumed());
        assert_eq!(o.markers().len(), 1);
        assert!(o.marker(first).is_none());
        assert!(o.marker(second).is_some());
    }

    #[test]
    fn right_click_prefers_marker_over_label() {
        let mut o = AnnotationOverlay::new();
        let marker = draw(&mut o, p(0.0, 0.0), p(100.0, 100.0));
        o.set_mode(MouseMode::WriteText);
        o.press(p(10.0, 10.0), MouseButton::Left);
        o.release(p(10.0, 10.0));
        assert_eq!(o.labels().len(), 1);

        o.press(p(12.0, 12.0), MouseButton::Right);
        assert!(o.marker(marker).is_none());
        assert_eq!(o.labels().len(), 1);

        o.press(p(12.0, 12.0), MouseButton::Right);
        assert!(o.labels().is_empty());
    }

    #[test]
    fn right_click_on_empty_space_passes_through() {
        let mut o = AnnotationOverlay::new();
        draw(&mut o, p(0.0, 0.0), p(1.0, 1.0));
        assert_eq!(o.press(p(50.0, 50.0), MouseButton::Right), OverlayResponse::Passthrough);
        assert_eq!(o.markers().len(), 1);
    }

    #[test]
    fn write_text_places_default_label() {
        let mut o = AnnotationOverlay::new();
        o.set_mode(MouseMode::WriteText);
        assert!(o.press(p(3.0, 4.0), MouseButton::Left).is_consumed());
        let l = &o.labels()[0];
        assert_eq!(l.text, DEFAULT_LABEL_TEXT);
        assert_eq!(l.position, p(3.0, 4.0));
        assert!(!l.editable);
        assert_eq!(l.extent, Size::new(35.0, 16.0));
    }

    #[test]
    fn pressing_existing_label_drags_it() {
        let mut o = AnnotationOverlay::new();
        o.set_mode(MouseMode::WriteText);
        o.press(p(0.0, 0.0), MouseButton::Left);
        o.release(p(0.0, 0.0));
        let id = o.labels()[0].id;

        assert!(o.press(p(5.0, 5.0), MouseButton::Left).is_consumed());
        assert_eq!(o.labels().len(), 1);
        assert_eq!(
            o.state(),
            OverlayState::DraggingExisting { label: id, grab: Size::new(5.0, 5.0) }
        );
        o.drag(p(25.0, 15.0));
        assert_eq!(o.label(id).unwrap().position, p(20.0, 10.0));
        o.release(p(25.0, 15.0));
        assert_eq!(o.state(), OverlayState::Idle);
    }

    #[test]
    fn editing_requires_double_click() {
        let mut o = AnnotationOverlay::new();
        o.set_mode(MouseMode::WriteText);
        o.press(p(0.0, 0.0), MouseButton::Left);
        o.release(p(0.0, 0.0));
        let id = o.labels()[0].id;

        assert!(!o.set_label_text(id, "cluster A"));
        assert!(o.double_click(p(1.0, 1.0)).is_consumed());
        assert!(o.label(id).unwrap().editable);
        assert!(o.set_label_text(id, "cluster A"));
        assert_eq!(o.label(id).unwrap().extent, Size::new(63.0, 16.0));

        assert!(o.hover_leave(id));
        assert!(!o.label(id).unwrap().editable);
        assert!(!o.hover_leave(id));
    }

    #[test]
    fn mode_switch_resets_gesture_but_keeps_items() {
        let mut o = AnnotationOverlay::new();
        o.set_mode(MouseMode::DrawEllipse);
        o.press(p(0.0, 0.0), MouseButton::Left);
        o.set_mode(MouseMode::Zoom);
        assert_eq!(o.state(), OverlayState::Idle);
        assert_eq!(o.markers().len(), 1);
        assert_eq!(o.drag(p(9.0, 9.0)), OverlayResponse::Passthrough);
        assert_eq!(o.markers()[0].extent, Size::ZERO);
    }

    #[test]
    fn clear_removes_everything_and_ids_are_not_reused() {
        let mut o = AnnotationOverlay::new();
        let a = draw(&mut o, p(0.0, 0.0), p(1.0, 1.0));
        o.clear();
        assert!(o.is_empty());
        assert_eq!(o.mode(), MouseMode::DrawEllipse);
        let b = draw(&mut o, p(0.0, 0.0), p(1.0, 1.0));
        assert_ne!(a, b);
    }
}
