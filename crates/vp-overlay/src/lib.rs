//! vp-overlay: freehand annotations layered over the scatter chart.
//!
//! Users draw ellipse group markers around clusters and drop text labels.
//! The overlay is a small state machine fed with pointer events in chart
//! coordinates; it never renders anything itself.

pub mod items;
pub mod overlay;

pub use items::{DEFAULT_LABEL_TEXT, FixedAdvance, GroupMarker, TextLabel, TextMeasure};
pub use overlay::{AnnotationOverlay, Hit, MouseButton, MouseMode, OverlayResponse, OverlayState};
