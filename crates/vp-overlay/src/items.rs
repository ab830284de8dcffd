//! Overlay entities and text measurement.

use vp_core::{LabelId, MarkerId, Point, Rect, Size};

pub const DEFAULT_LABEL_TEXT: &str = "label";

/// Axis-aligned ellipse drawn by the user, described by its bounding rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMarker {
    pub id: MarkerId,
    pub origin: Point,
    /// May be negative when dragged up or left of the origin.
    pub extent: Size,
}

impl GroupMarker {
    /// Bounding rectangle with corners swapped so the extent is non-negative.
    pub fn rect(&self) -> Rect {
        Rect::new(self.origin, self.extent).normalized()
    }

    pub fn contains(&self, p: Point) -> bool {
        self.rect().contains(p)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub id: LabelId,
    /// Top-left corner of the text box.
    pub position: Point,
    pub text: String,
    pub editable: bool,
    pub extent: Size,
}

impl TextLabel {
    pub fn rect(&self) -> Rect {
        Rect::new(self.position, self.extent)
    }

    pub fn contains(&self, p: Point) -> bool {
        self.rect().contains(p)
    }
}

/// Size of rendered text, supplied by whatever draws the labels.
pub trait TextMeasure: Send {
    fn measure(&self, text: &str) -> Size;
}

/// Monospace approximation: fixed advance per character, fixed line height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedAdvance {
    pub char_width: f64,
    pub line_height: f64,
}

impl Default for FixedAdvance {
    fn default() -> Self {
        Self {
            char_width: 7.0,
            line_height: 16.0,
        }
    }
}

impl TextMeasure for FixedAdvance {
    fn measure(&self, text: &str) -> Size {
        let lines = text.lines().count().max(1);
        let widest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        Size::new(
            widest as f64 * self.char_width,
            lines as f64 * self.line_height,
        )
    }
}
