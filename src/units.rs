//! Dimension units used by codemosaic, along with conversion rules to go from physical lengths
//! to raster lengths.
//!
//! Everything that is laid out lives in centimeters. Pixels only appear at the boundaries: when
//! a mask image is sampled and when a raster output is written. The conversion rule is
//! 1 cm = 0.393701 in, so that a length of `c` centimeters spans `c * 0.393701 * dpi` pixels.
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, Neg, Sub, SubAssign};
use std::{f64, fmt};

use serde::{Deserialize, Serialize};

/// How many inches fit in a centimeter.
pub const INCHES_PER_CM: f64 = 0.393701;

/// Centimeters.
#[derive(Copy, Clone, Default, Serialize, Deserialize, PartialEq, PartialOrd)]
pub struct Cm(pub f64);

impl fmt::Debug for Cm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} cm", self.0)
    }
}

impl fmt::Display for Cm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}cm", self.0)
    }
}

impl Add for Cm {
    type Output = Cm;

    fn add(self, other: Cm) -> Cm {
        Cm(self.0 + other.0)
    }
}

impl AddAssign for Cm {
    fn add_assign(&mut self, other: Cm) {
        self.0 += other.0;
    }
}

impl Sub for Cm {
    type Output = Cm;

    fn sub(self, other: Cm) -> Cm {
        Cm(self.0 - other.0)
    }
}

impl SubAssign for Cm {
    fn sub_assign(&mut self, other: Cm) {
        self.0 -= other.0;
    }
}

impl Neg for Cm {
    type Output = Cm;

    fn neg(self) -> Cm {
        Cm(-self.0)
    }
}

impl Mul<f64> for Cm {
    type Output = Cm;

    fn mul(self, rhs: f64) -> Cm {
        Cm(self.0 * rhs)
    }
}

impl Div<f64> for Cm {
    type Output = Cm;

    fn div(self, rhs: f64) -> Cm {
        Cm(self.0 / rhs)
    }
}

impl DivAssign<f64> for Cm {
    fn div_assign(&mut self, rhs: f64) {
        self.0 /= rhs;
    }
}

/// The ratio of two lengths.
impl Div for Cm {
    type Output = f64;

    fn div(self, rhs: Cm) -> f64 {
        self.0 / rhs.0
    }
}

impl From<Cm> for printpdf::Mm {
    fn from(cm: Cm) -> printpdf::Mm {
        // 10 mm = 1 cm
        printpdf::Mm(cm.0 * 10.0)
    }
}

impl From<Cm> for printpdf::Pt {
    fn from(cm: Cm) -> printpdf::Pt {
        printpdf::Pt(cm.0 * INCHES_PER_CM * 72.0)
    }
}

/// Converts a physical length into a number of pixels at the given resolution.
///
/// The result is truncated toward zero. `dpi` must be positive, which the configuration checks
/// before anything gets converted.
///
/// # Examples
///
/// ```
/// # use codemosaic::units::{cm_to_pixel, Cm};
/// assert_eq!(cm_to_pixel(Cm(2.54), 100), 100);
/// assert_eq!(cm_to_pixel(Cm(-0.001), 72), 0);
/// ```
pub fn cm_to_pixel(cm: Cm, dpi: u32) -> i64 {
    (cm.0 * (INCHES_PER_CM * f64::from(dpi))) as i64
}

/// Converts a number of pixels at the given resolution into a physical length.
///
/// # Examples
///
/// ```
/// # use codemosaic::units::{nearly_equal, pixel_to_cm, Cm};
/// assert!(nearly_equal(pixel_to_cm(72, 72).0, 2.539999));
/// ```
pub fn pixel_to_cm(pixel: i64, dpi: u32) -> Cm {
    Cm(pixel as f64 / (INCHES_PER_CM * f64::from(dpi)))
}

/// Compares two float numbers to check if they're close enough to be
/// considered equal.
///
/// Inspired by [this post](https://users.rust-lang.org/t/assert-eq-for-float-numbers/7034/3).
///
/// # Examples
///
/// ```
/// # use codemosaic::units::nearly_equal;
/// assert_eq!(nearly_equal(3.0, 2.99999), true);
/// assert_eq!(nearly_equal(4.0, 3.999), false);
/// ```
pub fn nearly_equal(a: f64, b: f64) -> bool {
    let abs_a = a.abs();
    let abs_b = b.abs();
    let diff = (a - b).abs();

    if a == b {
        // Handle infinities.
        true
    } else if a == 0.0 || b == 0.0 || diff < f64::MIN_POSITIVE {
        // One of a or b is zero (or both are extremely close to it,) use absolute error.
        diff < (f64::EPSILON * f64::MIN_POSITIVE)
    } else {
        // Use relative error.
        (diff / f64::min(abs_a + abs_b, f64::MAX)) < 10e-5
    }
}
