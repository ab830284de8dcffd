//! vp-core: shared foundation for the ViewPCA crates.
//!
//! Contains:
//! - geometry (chart-space points, sizes, normalized rectangles)
//! - numeric (Real + float helpers)
//! - ids (compact handles for tables, markers and labels)
//! - error (shared error types)

pub mod error;
pub mod geometry;
pub mod ids;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use error::{VpError, VpResult};
pub use geometry::*;
pub use ids::*;
pub use numeric::*;
