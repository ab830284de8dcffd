//! Chart-space geometry shared by the table model and the annotation overlay.

use crate::Real;

/// A point in chart coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: Real,
    pub y: Real,
}

impl Point {
    pub const fn new(x: Real, y: Real) -> Self {
        Self { x, y }
    }

    pub fn offset_to(self, other: Point) -> Size {
        Size::new(other.x - self.x, other.y - self.y)
    }

    pub fn translate(self, by: Size) -> Point {
        Point::new(self.x + by.width, self.y + by.height)
    }
}

/// Width/height pair. Either component may be negative while a gesture is in progress.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: Real,
    pub height: Real,
}

impl Size {
    pub const ZERO: Size = Size::new(0.0, 0.0);

    pub const fn new(width: Real, height: Real) -> Self {
        Self { width, height }
    }
}

/// Rectangle anchored at `origin` spanning `extent`.
///
/// The extent may be negative; [`Rect::normalized`] swaps corners so that the
/// result has a non-negative extent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub origin: Point,
    pub extent: Size,
}

impl Rect {
    pub const fn new(origin: Point, extent: Size) -> Self {
        Self { origin, extent }
    }

    pub fn normalized(self) -> Rect {
        let (x, width) = if self.extent.width < 0.0 {
            (self.origin.x + self.extent.width, -self.extent.width)
        } else {
            (self.origin.x, self.extent.width)
        };
        let (y, height) = if self.extent.height < 0.0 {
            (self.origin.y + self.extent.height, -self.extent.height)
        } else {
            (self.origin.y, self.extent.height)
        };
        Rect::new(Point::new(x, y), Size::new(width, height))
    }

    pub fn left(&self) -> Real {
        self.normalized().origin.x
    }

    pub fn top(&self) -> Real {
        self.normalized().origin.y
    }

    pub fn right(&self) -> Real {
        let r = self.normalized();
        r.origin.x + r.extent.width
    }

    pub fn bottom(&self) -> Real {
        let r = self.normalized();
        r.origin.y + r.extent.height
    }

    pub fn area(&self) -> Real {
        (self.extent.width * self.extent.height).abs()
    }

    /// Edge-inclusive containment test on the normalized rectangle.
    pub fn contains(&self, p: Point) -> bool {
        let r = self.normalized();
        p.x >= r.origin.x
            && p.x <= r.origin.x + r.extent.width
            && p.y >= r.origin.y
            && p.y <= r.origin.y + r.extent.height
    }
}

/// Axis-aligned data range `[xmin, xmax] x [ymin, ymax]`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub xmin: Real,
    pub xmax: Real,
    pub ymin: Real,
    pub ymax: Real,
}

impl Bounds {
    pub const fn new(xmin: Real, xmax: Real, ymin: Real, ymax: Real) -> Self {
        Self {
            xmin,
            xmax,
            ymin,
            ymax,
        }
    }

    /// Smallest bounds enclosing every point, `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Bounds>
    where
        I: IntoIterator<Item = (Real, Real)>,
    {
        points.into_iter().fold(None, |acc, (x, y)| {
            let b = Bounds::new(x, x, y, y);
            Some(match acc {
                Some(a) => a.union(&b),
                None => b,
            })
        })
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds::new(
            self.xmin.min(other.xmin),
            self.xmax.max(other.xmax),
            self.ymin.min(other.ymin),
            self.ymax.max(other.ymax),
        )
    }

    /// Widen each bound by `fraction` of its own magnitude.
    ///
    /// The margin is asymmetric: `min - fraction*|min|` and `max + fraction*|max|`.
    pub fn padded(&self, fraction: Real) -> Bounds {
        Bounds::new(
            self.xmin - fraction * self.xmin.abs(),
            self.xmax + fraction * self.xmax.abs(),
            self.ymin - fraction * self.ymin.abs(),
            self.ymax + fraction * self.ymax.abs(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_extent_normalizes() {
        let r = Rect::new(Point::new(10.0, 10.0), Size::new(-5.0, -5.0)).normalized();
        assert_eq!(r.origin, Point::new(5.0, 5.0));
        assert_eq!(r.extent, Size::new(5.0, 5.0));
    }

    #[test]
    fn contains_uses_normalized_rect() {
        let r = Rect::new(Point::new(10.0, 10.0), Size::new(-5.0, 2.0));
        assert!(r.contains(Point::new(7.0, 11.0)));
        assert!(r.contains(Point::new(5.0, 10.0)));
        assert!(!r.contains(Point::new(11.0, 11.0)));
    }

    #[test]
    fn bounds_from_points() {
        let b = Bounds::from_points([(1.0, -2.0), (-3.0, 4.0), (0.5, 0.5)]).unwrap();
        assert_eq!(b, Bounds::new(-3.0, 1.0, -2.0, 4.0));
        assert!(Bounds::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn padding_is_relative_to_each_bound() {
        let b = Bounds::new(-10.0, 10.0, 0.0, 5.0).padded(0.15);
        assert!((b.xmin + 11.5).abs() < 1e-12);
        assert!((b.xmax - 11.5).abs() < 1e-12);
        assert_eq!(b.ymin, 0.0);
        assert!((b.ymax - 5.75).abs() < 1e-12);
    }
}
