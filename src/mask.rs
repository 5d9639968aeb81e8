//! The mask decides which glyphs get tinted and with which color.
//!
//! A mask is an image with a resolution. Its size in centimeters is scaled by a user factor and
//! the result is centered on the canvas. Each glyph whose cursor falls in that region looks up
//! the pixel under its visual center: if the pixel is opaque enough, the glyph takes its color.

use std::path::Path;

use image::{DynamicImage, ImageBuffer, Rgba};

use crate::color::Color;
use crate::geometry::{Point, Rect};
use crate::layout::errors::ConfigError;
use crate::layout::GlyphMetrics;
use crate::{Error, Result};

/// The largest value of a 16 bit channel.
pub const MAX_ALPHA: u32 = 65_535;

/// A decoded mask image along with the way it is placed on the canvas.
pub struct Mask {
    /// The pixels of the mask, with 16 bits per channel.
    pixels: ImageBuffer<Rgba<u16>, Vec<u16>>,

    /// The resolution of the mask, in dots per inch.
    dpi: u32,

    /// The user scale factor of the mask.
    scale: f64,

    /// The minimum alpha, in the 16 bit range, for a pixel to cover a glyph.
    threshold: u32,
}

impl Mask {
    /// Creates a mask from an image.
    ///
    /// `alpha_threshold` is a fraction of full opacity, usually between 0 and 1.
    pub fn new(image: DynamicImage, dpi: u32, scale: f64, alpha_threshold: f64) -> Result<Mask> {
        if dpi == 0 {
            return Err(Error::InvalidConfig(ConfigError::NonPositiveDpi("mask_dpi")));
        }

        if !(scale > 0.0) || !scale.is_finite() {
            return Err(Error::InvalidConfig(ConfigError::NonPositiveMaskScale(
                scale,
            )));
        }

        Ok(Mask {
            pixels: image.into_rgba16(),
            dpi,
            scale,
            threshold: (MAX_ALPHA as f64 * alpha_threshold) as u32,
        })
    }

    /// Opens and decodes the mask at the specified path.
    pub fn open<P: AsRef<Path>>(
        path: P,
        dpi: u32,
        scale: f64,
        alpha_threshold: f64,
    ) -> Result<Mask> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|e| Error::Mask(path.to_owned(), e))?;
        info!(
            "loaded mask {} ({}x{} px at {} dpi)",
            path.display(),
            image.width(),
            image.height(),
            dpi
        );
        Mask::new(image, dpi, scale, alpha_threshold)
    }

    /// Returns the alpha threshold in the 16 bit range.
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Returns the native size of the mask in centimeters, before scaling.
    pub fn size(&self) -> Point {
        let (width, height) = self.pixels.dimensions();
        Point::from_pixel(i64::from(width), i64::from(height), self.dpi)
    }

    /// Returns the region covered by the mask once scaled and centered on the canvas.
    pub fn region(&self, canvas: &Rect) -> Rect {
        let scaled = Rect::from_size(self.size() * self.scale);
        scaled - scaled.center() + canvas.center()
    }

    /// Returns the color of a pixel, multiplied by its alpha, with 16 bits per channel.
    ///
    /// Pixels outside of the image are fully transparent.
    pub fn pixel(&self, x: i64, y: i64) -> [u32; 4] {
        let (width, height) = self.pixels.dimensions();
        if x < 0 || y < 0 || x >= i64::from(width) || y >= i64::from(height) {
            return [0; 4];
        }

        let Rgba([r, g, b, a]) = *self.pixels.get_pixel(x as u32, y as u32);
        let a = u32::from(a);
        let premultiply = |c: u16| u32::from(c) * a / MAX_ALPHA;
        [premultiply(r), premultiply(g), premultiply(b), a]
    }
}

/// How a glyph covered by the mask and a glyph missing it are colored.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct SampleMode {
    /// Glyphs covered by the mask are black instead of the mask's color.
    pub monochrome: bool,

    /// Glyphs that fall in the mask region but miss its opaque pixels are red.
    pub debug: bool,
}

/// The color a glyph should be drawn with.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColorDecision {
    /// The default foreground color.
    Foreground,

    /// The color of the mask under the glyph, multiplied by its alpha and made opaque.
    Sampled(Color),

    /// Black, the mask covers the glyph in monochrome mode.
    Monochrome,

    /// Red, the glyph misses the mask in debug mode.
    Debug,
}

impl ColorDecision {
    /// Turns the decision into an actual color.
    pub fn resolve(self, foreground: Color) -> Color {
        match self {
            ColorDecision::Foreground => foreground,
            ColorDecision::Sampled(color) => color,
            ColorDecision::Monochrome => Color::BLACK,
            ColorDecision::Debug => Color::RED,
        }
    }

    /// Returns true if the color comes from the mask.
    pub fn is_tinted(self) -> bool {
        matches!(self, ColorDecision::Sampled(_) | ColorDecision::Monochrome)
    }
}

/// Decides the color of each glyph from its cursor position.
pub struct Sampler<'a> {
    /// The mask and the region it covers, if any.
    mask: Option<(&'a Mask, Rect)>,

    /// The metrics of the glyphs.
    metrics: GlyphMetrics,

    /// Monochrome and debug flags.
    mode: SampleMode,
}

impl<'a> Sampler<'a> {
    /// Creates a sampler for a canvas.
    pub fn new(
        mask: Option<&'a Mask>,
        canvas: &Rect,
        metrics: GlyphMetrics,
        mode: SampleMode,
    ) -> Sampler<'a> {
        let mask = mask.map(|mask| {
            let region = mask.region(canvas);
            debug!("mask region: {:?}", region);
            (mask, region)
        });

        Sampler {
            mask,
            metrics,
            mode,
        }
    }

    /// Creates a sampler that leaves every glyph in the foreground color.
    pub fn without_mask(metrics: GlyphMetrics) -> Sampler<'a> {
        Sampler {
            mask: None,
            metrics,
            mode: SampleMode::default(),
        }
    }

    /// Returns the region covered by the mask, if any.
    pub fn region(&self) -> Option<Rect> {
        self.mask.map(|(_, region)| region)
    }

    /// Decides the color of the glyph drawn at `cursor`.
    pub fn sample(&self, cursor: Point) -> ColorDecision {
        let (mask, region) = match self.mask {
            Some(mask) => mask,
            None => return ColorDecision::Foreground,
        };

        if !cursor.is_in(&region) {
            return ColorDecision::Foreground;
        }

        // The glyph grows upward from its baseline.
        let half = self.metrics.size / 2.0;
        let center = cursor + Point { x: half.x, y: -half.y };
        let native = (center - region.min) / mask.scale;
        let (x, y) = native.to_pixel(mask.dpi);

        let [r, g, b, a] = mask.pixel(x, y);
        if a >= mask.threshold {
            if self.mode.monochrome {
                ColorDecision::Monochrome
            } else {
                ColorDecision::Sampled(Color::from_premultiplied16(r, g, b))
            }
        } else if self.mode.debug {
            ColorDecision::Debug
        } else {
            ColorDecision::Foreground
        }
    }
}

/// Unit tests for the mask sampling.
#[cfg(test)]
mod tests {
    use image::{DynamicImage, Rgba, RgbaImage};

    use crate::color::Color;
    use crate::geometry::{Point, Rect};
    use crate::layout::GlyphMetrics;
    use crate::mask::{ColorDecision, Mask, SampleMode, Sampler};
    use crate::units::nearly_equal;
    use crate::Error;
    use test_case::test_case;

    fn uniform(width: u32, height: u32, pixel: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(pixel)))
    }

    fn glyph() -> GlyphMetrics {
        GlyphMetrics::new(Point::new(1.0, 1.0), 0.0)
    }

    #[test]
    fn region_is_centered() {
        // 100 px at 254 dpi is about 1 cm.
        let mask = Mask::new(uniform(100, 200, [0, 0, 0, 255]), 254, 2.0, 0.5).unwrap();
        let canvas = Rect::from_size(Point::new(10.0, 12.0));
        let region = mask.region(&canvas);

        assert!(nearly_equal(region.min.x.0, 4.0));
        assert!(nearly_equal(region.max.x.0, 6.0));
        assert!(nearly_equal(region.min.y.0, 4.0));
        assert!(nearly_equal(region.max.y.0, 8.0));
    }

    #[test]
    fn threshold_is_scaled() {
        let mask = Mask::new(uniform(1, 1, [0, 0, 0, 0]), 72, 1.0, 0.5).unwrap();
        assert_eq!(mask.threshold(), 32767);
    }

    #[test]
    fn out_of_bounds_pixels_are_transparent() {
        let mask = Mask::new(uniform(2, 2, [10, 20, 30, 255]), 72, 1.0, 0.5).unwrap();
        assert_eq!(mask.pixel(-1, 0), [0; 4]);
        assert_eq!(mask.pixel(0, 2), [0; 4]);
        assert_eq!(mask.pixel(2, 0), [0; 4]);
        assert_eq!(mask.pixel(1, 1), [2570, 5140, 7710, 65535]);
    }

    #[test]
    fn pixels_are_premultiplied() {
        let mask = Mask::new(uniform(1, 1, [255, 255, 255, 0x80]), 72, 1.0, 0.5).unwrap();
        let [r, _, _, a] = mask.pixel(0, 0);
        assert_eq!(a, 0x8080);
        assert_eq!(r, 0x8080);
    }

    #[test]
    fn rejects_degenerate_masks() {
        let zero_dpi = Mask::new(uniform(1, 1, [0; 4]), 0, 1.0, 0.5);
        assert!(matches!(zero_dpi, Err(Error::InvalidConfig(_))));

        let zero_scale = Mask::new(uniform(1, 1, [0; 4]), 72, 0.0, 0.5);
        assert!(matches!(zero_scale, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn no_mask_keeps_foreground() {
        let sampler = Sampler::without_mask(glyph());
        assert_eq!(sampler.sample(Point::new(1.0, 1.5)), ColorDecision::Foreground);
    }

    #[test]
    fn outside_region_keeps_foreground() {
        let mask = Mask::new(uniform(10, 10, [255, 0, 0, 255]), 254, 1.0, 0.5).unwrap();
        let canvas = Rect::from_size(Point::new(10.0, 10.0));
        let mode = SampleMode {
            monochrome: false,
            debug: true,
        };
        let sampler = Sampler::new(Some(&mask), &canvas, glyph(), mode);

        // The region is a small square in the middle of the canvas.
        assert_eq!(sampler.sample(Point::new(1.0, 1.5)), ColorDecision::Foreground);
    }

    #[test]
    fn sampling_is_deterministic() {
        let mut image = RgbaImage::from_pixel(100, 100, Rgba([0, 0, 0, 0]));
        for (x, y, pixel) in image.enumerate_pixels_mut() {
            *pixel = Rgba([x as u8, y as u8, 0, if (x + y) % 2 == 0 { 255 } else { 0 }]);
        }
        let mask = Mask::new(DynamicImage::ImageRgba8(image), 254, 1.0, 0.5).unwrap();
        let canvas = Rect::from_size(Point::new(10.0, 10.0));
        let sampler = Sampler::new(Some(&mask), &canvas, glyph(), SampleMode::default());

        for i in 0..20 {
            let cursor = Point::new(4.5 + 0.05 * i as f64, 5.0);
            assert_eq!(sampler.sample(cursor), sampler.sample(cursor));
        }
    }

    #[test]
    fn threshold_is_inclusive() {
        let mask = Mask::new(uniform(100, 100, [0, 0, 255, 255]), 25, 1.0, 1.0).unwrap();
        assert_eq!(mask.threshold(), 65535);

        let canvas = Rect::from_size(Point::new(10.0, 10.0));
        let sampler = Sampler::new(Some(&mask), &canvas, glyph(), SampleMode::default());
        let decision = sampler.sample(Point::new(4.6, 5.5));
        assert!(decision.is_tinted());
    }

    #[test]
    fn below_threshold_uses_debug_color() {
        let mask = Mask::new(uniform(100, 100, [0, 255, 0, 10]), 25, 1.0, 0.5).unwrap();
        let canvas = Rect::from_size(Point::new(10.0, 10.0));
        let cursor = Point::new(4.6, 5.5);

        let sampler = Sampler::new(Some(&mask), &canvas, glyph(), SampleMode::default());
        assert_eq!(sampler.sample(cursor), ColorDecision::Foreground);

        let mode = SampleMode {
            monochrome: false,
            debug: true,
        };
        let sampler = Sampler::new(Some(&mask), &canvas, glyph(), mode);
        assert_eq!(sampler.sample(cursor), ColorDecision::Debug);
        assert_eq!(sampler.sample(cursor).resolve(Color::WHITE), Color::RED);
    }

    #[test]
    fn above_threshold_uses_mask_color() {
        // 100 px at 25 dpi is a bit more than the whole canvas.
        let mask = Mask::new(uniform(100, 100, [0, 128, 255, 255]), 25, 1.0, 0.5).unwrap();
        let canvas = Rect::from_size(Point::new(10.0, 10.0));
        let cursor = Point::new(4.6, 5.5);

        let sampler = Sampler::new(Some(&mask), &canvas, glyph(), SampleMode::default());
        assert_eq!(
            sampler.sample(cursor),
            ColorDecision::Sampled(Color::rgb(0, 128, 255))
        );

        let mode = SampleMode {
            monochrome: true,
            debug: false,
        };
        let sampler = Sampler::new(Some(&mask), &canvas, glyph(), mode);
        assert_eq!(sampler.sample(cursor), ColorDecision::Monochrome);
        assert_eq!(sampler.sample(cursor).resolve(Color::WHITE), Color::BLACK);
    }

    #[test]
    fn half_transparent_pixels_give_opaque_colors() {
        let mask = Mask::new(uniform(100, 100, [255, 255, 255, 128]), 25, 1.0, 0.5).unwrap();
        let canvas = Rect::from_size(Point::new(10.0, 10.0));
        let sampler = Sampler::new(Some(&mask), &canvas, glyph(), SampleMode::default());

        let color = sampler.sample(Point::new(4.6, 5.5)).resolve(Color::WHITE);
        assert_eq!(color, Color::rgb(128, 128, 128));
        assert_eq!(color.to_string(), "#808080");
    }

    #[test]
    fn zero_threshold_outside_the_image_is_black() {
        let mask = Mask::new(uniform(100, 100, [0, 255, 0, 255]), 25, 1.0, 0.0).unwrap();
        let canvas = Rect::from_size(Point::new(10.0, 10.0));
        let sampler = Sampler::new(Some(&mask), &canvas, glyph(), SampleMode::default());

        // The visual center of a glyph at the corner of the region is above the image.
        let corner = sampler.region().unwrap().min;
        assert_eq!(sampler.sample(corner), ColorDecision::Sampled(Color::BLACK));
    }

    /// A 20 px mask at 10 dpi, one color per quadrant.
    fn quadrants() -> Mask {
        let image = RgbaImage::from_fn(20, 20, |x, y| match (x < 10, y < 10) {
            (true, true) => Rgba([255, 0, 0, 255]),
            (false, true) => Rgba([0, 255, 0, 255]),
            (true, false) => Rgba([0, 0, 255, 255]),
            (false, false) => Rgba([255, 255, 0, 255]),
        });
        Mask::new(DynamicImage::ImageRgba8(image), 10, 2.0, 0.5).unwrap()
    }

    #[test_case(2.0, 3.0, Color::rgb(255, 0, 0) ; "top left")]
    #[test_case(7.0, 3.0, Color::rgb(0, 255, 0) ; "top right")]
    #[test_case(2.0, 8.0, Color::rgb(0, 0, 255) ; "bottom left")]
    #[test_case(7.0, 8.0, Color::rgb(255, 255, 0) ; "bottom right")]
    #[test_case(4.4, 3.0, Color::rgb(255, 0, 0) ; "center left of the middle")]
    #[test_case(4.6, 3.0, Color::rgb(0, 255, 0) ; "center right of the middle")]
    #[test_case(2.0, 5.4, Color::rgb(255, 0, 0) ; "baseline below the middle")]
    #[test_case(2.0, 5.6, Color::rgb(0, 0, 255) ; "center below the middle")]
    fn samples_under_the_visual_center(x: f64, y: f64, expected: Color) {
        // Scaled twice, the mask covers the 10 cm canvas and its quadrants meet at (5, 5).
        let mask = quadrants();
        let canvas = Rect::from_size(Point::new(10.0, 10.0));
        let sampler = Sampler::new(Some(&mask), &canvas, glyph(), SampleMode::default());

        assert_eq!(
            sampler.sample(Point::new(x, y)),
            ColorDecision::Sampled(expected)
        );
    }

    #[test]
    fn debug_without_mask_keeps_foreground() {
        let canvas = Rect::from_size(Point::new(10.0, 10.0));
        let mode = SampleMode {
            monochrome: false,
            debug: true,
        };
        let sampler = Sampler::new(None, &canvas, glyph(), mode);

        assert_eq!(sampler.region(), None);
        assert_eq!(sampler.sample(Point::new(1.0, 1.5)), ColorDecision::Foreground);
    }
}
