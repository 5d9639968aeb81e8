//! Points and rectangles living in the physical space of the canvas.
//!
//! The origin is the top left corner of the canvas and the y axis grows downward.

use std::ops::{Add, Div, Mul, Sub};

use crate::units::{cm_to_pixel, pixel_to_cm, Cm};

/// A 2-dimensional point (x, y), in centimeters.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Point {
    /// The horizontal coordinate.
    pub x: Cm,

    /// The vertical coordinate, growing downward.
    pub y: Cm,
}

impl Point {
    /// Creates a point from its coordinates in centimeters.
    pub fn new(x: f64, y: f64) -> Point {
        Point { x: Cm(x), y: Cm(y) }
    }

    /// Creates a point from a pixel position at the given resolution.
    pub fn from_pixel(x: i64, y: i64, dpi: u32) -> Point {
        Point {
            x: pixel_to_cm(x, dpi),
            y: pixel_to_cm(y, dpi),
        }
    }

    /// Converts the point into a pixel position at the given resolution.
    pub fn to_pixel(self, dpi: u32) -> (i64, i64) {
        (cm_to_pixel(self.x, dpi), cm_to_pixel(self.y, dpi))
    }

    /// Returns true if the point lies in the rectangle, borders included.
    pub fn is_in(self, rect: &Rect) -> bool {
        rect.contains(self)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, k: f64) -> Point {
        Point {
            x: self.x * k,
            y: self.y * k,
        }
    }
}

impl Div<f64> for Point {
    type Output = Point;

    fn div(self, k: f64) -> Point {
        Point {
            x: self.x / k,
            y: self.y / k,
        }
    }
}

/// An axis aligned rectangle.
///
/// Callers expect `min <= max` on both axes, but nothing enforces it. An inverted rectangle
/// simply contains no point.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    /// The top left corner.
    pub min: Point,

    /// The bottom right corner.
    pub max: Point,
}

impl Rect {
    /// Creates a rectangle from the coordinates of its corners.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect {
        Rect {
            min: Point::new(x0, y0),
            max: Point::new(x1, y1),
        }
    }

    /// Creates a rectangle anchored at the origin.
    pub fn from_size(size: Point) -> Rect {
        Rect {
            min: Point::default(),
            max: size,
        }
    }

    /// The horizontal extent of the rectangle.
    pub fn width(&self) -> Cm {
        self.max.x - self.min.x
    }

    /// The vertical extent of the rectangle.
    pub fn height(&self) -> Cm {
        self.max.y - self.min.y
    }

    /// Returns half the extent of the rectangle, `(max - min) / 2`.
    ///
    /// This is not the midpoint of the rectangle unless `min` is the origin. Centering a
    /// rectangle `r` in another rectangle `c` is written `r - r.center() + c.center()`, which is
    /// only right when both are anchored at the origin.
    pub fn center(&self) -> Point {
        (self.max - self.min) / 2.0
    }

    /// Returns true if the point lies in the rectangle, borders included.
    pub fn contains(&self, p: Point) -> bool {
        p.y >= self.min.y && p.y <= self.max.y && p.x >= self.min.x && p.x <= self.max.x
    }

    /// Shrinks the rectangle by `margin` on each side.
    pub fn shrink(&self, margin: Point) -> Rect {
        Rect {
            min: self.min + margin,
            max: self.max - margin,
        }
    }
}

impl Add<Point> for Rect {
    type Output = Rect;

    fn add(self, p: Point) -> Rect {
        Rect {
            min: self.min + p,
            max: self.max + p,
        }
    }
}

impl Sub<Point> for Rect {
    type Output = Rect;

    fn sub(self, p: Point) -> Rect {
        Rect {
            min: self.min - p,
            max: self.max - p,
        }
    }
}

impl Mul<f64> for Rect {
    type Output = Rect;

    fn mul(self, k: f64) -> Rect {
        Rect {
            min: self.min * k,
            max: self.max * k,
        }
    }
}

/// Unit tests for points and rectangles.
#[cfg(test)]
mod tests {
    use crate::geometry::{Point, Rect};
    use crate::units::Cm;
    use test_case::test_case;

    #[test]
    fn point_arithmetics() {
        let p = Point::new(1.0, 2.0);
        let q = Point::new(0.5, -1.0);

        assert_eq!(p + q, Point::new(1.5, 1.0));
        assert_eq!(q + p, p + q);
        assert_eq!(p - q, Point::new(0.5, 3.0));
        assert_eq!(p * 2.0, Point::new(2.0, 4.0));
        assert_eq!(p / 2.0, Point::new(0.5, 1.0));

        // Operands are left untouched.
        assert_eq!(p, Point::new(1.0, 2.0));
        assert_eq!(q, Point::new(0.5, -1.0));
    }

    #[test]
    fn contains_its_corners() {
        let r = Rect::new(1.0, 1.0, 3.0, 4.0);
        assert!(r.contains(r.min));
        assert!(r.contains(r.max));
        assert!(Point::new(2.0, 2.5).is_in(&r));
    }

    #[test_case(0.999, 2.0 ; "left")]
    #[test_case(3.001, 2.0 ; "right")]
    #[test_case(2.0, 0.999 ; "above")]
    #[test_case(2.0, 4.001 ; "below")]
    #[test_case(5.0, 5.0 ; "both axes")]
    fn does_not_contain_outside_points(x: f64, y: f64) {
        let r = Rect::new(1.0, 1.0, 3.0, 4.0);
        assert!(!r.contains(Point::new(x, y)));
    }

    #[test]
    fn inverted_rectangle_is_empty() {
        let r = Rect::new(3.0, 3.0, 1.0, 1.0);
        assert!(!r.contains(Point::new(2.0, 2.0)));
        assert!(!r.contains(r.min));
    }

    #[test]
    fn center_is_half_extent() {
        let r = Rect::new(2.0, 2.0, 6.0, 4.0);
        assert_eq!(r.center(), Point::new(2.0, 1.0));
    }

    #[test]
    fn centering_at_origin() {
        let canvas = Rect::from_size(Point::new(10.0, 12.0));
        let mask = Rect::from_size(Point::new(4.0, 2.0));
        let centered = mask - mask.center() + canvas.center();
        assert_eq!(centered, Rect::new(3.0, 5.0, 7.0, 7.0));
    }

    #[test]
    fn shrink_and_extents() {
        let canvas = Rect::from_size(Point::new(4.0, 4.0));
        let margin = canvas.shrink(Point::new(1.0, 0.5));
        assert_eq!(margin, Rect::new(1.0, 0.5, 3.0, 3.5));
        assert_eq!(margin.width(), Cm(2.0));
        assert_eq!(margin.height(), Cm(3.0));
    }

    #[test]
    fn scale_rectangle() {
        let r = Rect::new(1.0, 2.0, 3.0, 4.0) * 0.5;
        assert_eq!(r, Rect::new(0.5, 1.0, 1.5, 2.0));
    }

    #[test]
    fn pixel_positions() {
        let p = Point::new(2.54, 1.27);
        assert_eq!(p.to_pixel(100), (100, 50));
    }
}
