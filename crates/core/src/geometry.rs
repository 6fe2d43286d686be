//! Pixel geometry in viewport (client) coordinates.
//!
//! All rectangles use the same origin as a bounding client rect: the top-left
//! corner of the visible viewport, x growing right and y growing down.

use serde::{Deserialize, Serialize};

/// A point in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Round both coordinates to the nearest whole pixel.
    #[must_use]
    pub fn round(self) -> Self {
        Self {
            x: self.x.round(),
            y: self.y.round(),
        }
    }

    /// Coordinate along the given axis.
    #[must_use]
    pub const fn along(self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }

    /// Mutable coordinate along the given axis.
    pub fn along_mut(&mut self, axis: Axis) -> &mut f64 {
        match axis {
            Axis::Horizontal => &mut self.x,
            Axis::Vertical => &mut self.y,
        }
    }
}

/// A width/height pair in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl Size {
    /// Create a new size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Extent along the given axis.
    #[must_use]
    pub const fn along(self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Zero-sized rectangle sitting on a point.
    #[must_use]
    pub const fn at_point(point: Point) -> Self {
        Self::new(point.x, point.y, 0.0, 0.0)
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Centre point.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Top-left corner.
    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Width and height.
    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Start edge along an axis (left or top).
    #[must_use]
    pub const fn start(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }

    /// Extent along an axis (width or height).
    #[must_use]
    pub const fn extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// True for the all-zero box a detached or not-yet-laid-out element reports.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.width == 0.0 && self.height == 0.0
    }

    /// Check whether two rectangles overlap. Touching edges count as overlap so
    /// that a zero-sized anchor on the viewport border is still considered visible.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.x <= other.right()
            && self.right() >= other.x
            && self.y <= other.bottom()
            && self.bottom() >= other.y
    }

    /// Check whether a point lies inside the rectangle (edges inclusive).
    #[must_use]
    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }
}

/// The visible viewport and its scroll offset within the document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Viewport width in pixels.
    pub width: f64,
    /// Viewport height in pixels.
    pub height: f64,
    /// Horizontal document scroll.
    #[serde(default)]
    pub scroll_x: f64,
    /// Vertical document scroll.
    #[serde(default)]
    pub scroll_y: f64,
}

impl Viewport {
    /// Create an unscrolled viewport.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }

    /// The viewport as a rectangle in client coordinates.
    #[must_use]
    pub const fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Viewport extent along an axis.
    #[must_use]
    pub const fn extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1024.0, 768.0)
    }
}

/// Layout axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// The x axis.
    Horizontal,
    /// The y axis.
    Vertical,
}

impl Axis {
    /// The perpendicular axis.
    #[must_use]
    pub const fn cross(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Only the all-zero box is degenerate; a zero-sized box elsewhere is a valid point anchor.
    ///
    /// # Panics
    /// Panics if degenerate detection is wrong.
    #[test]
    fn degenerate_only_for_all_zero() {
        assert!(Rect::default().is_degenerate());
        assert!(!Rect::new(10.0, 0.0, 0.0, 0.0).is_degenerate());
        assert!(!Rect::new(0.0, 0.0, 1.0, 0.0).is_degenerate());
    }

    /// A rectangle fully below the viewport does not intersect it.
    ///
    /// # Panics
    /// Panics if intersection is misreported.
    #[test]
    fn intersects_viewport() {
        let viewport = Viewport::new(800.0, 600.0).rect();
        assert!(Rect::new(10.0, 10.0, 20.0, 20.0).intersects(&viewport));
        assert!(Rect::new(0.0, 600.0, 20.0, 20.0).intersects(&viewport));
        assert!(!Rect::new(0.0, 700.0, 20.0, 20.0).intersects(&viewport));
        assert!(!Rect::new(-50.0, 10.0, 20.0, 20.0).intersects(&viewport));
    }

    /// Viewport scroll offsets default to zero when omitted from serialized input.
    ///
    /// # Panics
    /// Panics if deserialization fails or defaults differ.
    #[test]
    fn viewport_deserializes_without_scroll() {
        let viewport: Viewport =
            serde_json::from_str(r#"{"width":320,"height":240}"#).expect("valid viewport json");
        assert_eq!(viewport, Viewport::new(320.0, 240.0));
    }
}
