//! Rasterizes a mosaic into a png image.
//!
//! Positions are converted to pixels here and nowhere else. Glyph shapes come from freetype
//! when a font file is provided; otherwise each glyph is a solid block filling its cell, which
//! gives a pixel mosaic rather than readable text.

use std::convert::TryFrom;
use std::path::{Path, PathBuf};

use freetype::bitmap::PixelMode;
use freetype::face::LoadFlag;
use freetype::{Face, Library};
use image::{ImageFormat, Rgba, RgbaImage};

use crate::color::Color;
use crate::geometry::Point;
use crate::layout::errors::ConfigError;
use crate::mosaic::DrawGlyph;
use crate::render::{Page, Renderer};
use crate::units::cm_to_pixel;
use crate::{Error, Result};

/// A freetype face ready to render glyphs at the size of the page.
struct GlyphRasterizer {
    /// The face of the font.
    face: Face,

    /// The library the face was loaded with.
    _library: Library,
}

/// Draws the glyphs in a pixel buffer.
pub struct PngRenderer {
    /// The resolution of the image, in dots per inch.
    dpi: u32,

    /// Where the image is saved when finished, if anywhere.
    output: Option<PathBuf>,

    /// The font used to draw the glyphs, blocks are drawn without it.
    rasterizer: Option<GlyphRasterizer>,

    /// The footprint of a glyph in pixels.
    cell: (i64, i64),

    /// The pixels.
    image: RgbaImage,
}

impl PngRenderer {
    /// Creates a renderer drawing blocks at the specified resolution.
    pub fn new(dpi: u32) -> Result<PngRenderer> {
        if dpi == 0 {
            return Err(Error::InvalidConfig(ConfigError::NonPositiveDpi(
                "raster_dpi",
            )));
        }

        Ok(PngRenderer {
            dpi,
            output: None,
            rasterizer: None,
            cell: (0, 0),
            image: RgbaImage::new(0, 0),
        })
    }

    /// Draws the glyphs with the font found at the specified path.
    pub fn with_font<P: AsRef<Path>>(mut self, path: P) -> Result<PngRenderer> {
        let library = Library::init()?;
        let face = library.new_face(path.as_ref(), 0)?;
        info!("rasterizing glyphs with {}", path.as_ref().display());
        self.rasterizer = Some(GlyphRasterizer {
            face,
            _library: library,
        });
        Ok(self)
    }

    /// Saves the image at the specified path once finished.
    pub fn save_to<P: AsRef<Path>>(mut self, path: P) -> PngRenderer {
        self.output = Some(path.as_ref().to_owned());
        self
    }

    /// Returns the pixels drawn so far.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Converts a position in centimeters into a pixel position.
    fn pixel(&self, point: Point) -> (i64, i64) {
        point.to_pixel(self.dpi)
    }

    /// Blends a color on a pixel, ignoring pixels out of the image.
    fn blend(&mut self, x: i64, y: i64, color: Color, coverage: u8) {
        if x < 0 || y < 0 || x >= i64::from(self.image.width()) || y >= i64::from(self.image.height())
        {
            return;
        }

        let pixel = self.image.get_pixel_mut(x as u32, y as u32);
        let Rgba([r, g, b, a]) = *pixel;
        let blended = color.over(Color { r, g, b, a }, coverage);
        *pixel = Rgba(blended.to_array());
    }

    /// Fills the cell of a glyph whose baseline starts at `(x, y)`.
    fn block(&mut self, x: i64, y: i64, color: Color) {
        let (width, height) = self.cell;
        for py in (y - height)..y {
            for px in x..(x + width) {
                self.blend(px, py, color, 255);
            }
        }
    }

    /// Draws the outline of a glyph whose baseline starts at `(x, y)`.
    fn outline(&mut self, glyph: char, x: i64, y: i64, color: Color) -> Result<()> {
        let (left, top, bitmap) = {
            let rasterizer = match self.rasterizer.as_ref() {
                Some(rasterizer) => rasterizer,
                None => return Ok(()),
            };

            if rasterizer
                .face
                .load_char(glyph as usize, LoadFlag::RENDER)
                .is_err()
            {
                warn!("no glyph for {:?} in the font", glyph);
                return Ok(());
            }

            let slot = rasterizer.face.glyph();
            let bitmap = slot.bitmap();
            let depth = match bitmap.pixel_mode() {
                Ok(PixelMode::Gray) => Depth::Gray,
                Ok(PixelMode::Mono) => Depth::Mono,
                _ => {
                    warn!("cannot draw {:?}, its bitmap is neither gray nor mono", glyph);
                    return Ok(());
                }
            };

            (
                i64::from(slot.bitmap_left()),
                i64::from(slot.bitmap_top()),
                Coverage {
                    buffer: bitmap.buffer().to_vec(),
                    depth,
                    width: i64::from(bitmap.width()),
                    rows: i64::from(bitmap.rows()),
                    pitch: i64::from(bitmap.pitch()),
                },
            )
        };

        for row in 0..bitmap.rows {
            for col in 0..bitmap.width {
                let coverage = bitmap.at(row, col);
                if coverage > 0 {
                    self.blend(x + left + col, y - top + row, color, coverage);
                }
            }
        }

        Ok(())
    }
}

/// How many bits a pixel of a glyph bitmap takes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Depth {
    /// One byte of coverage per pixel.
    Gray,

    /// One bit per pixel, most significant bit first.
    Mono,
}

/// A glyph bitmap copied out of freetype.
#[derive(Debug, Clone)]
struct Coverage {
    /// The bytes of the bitmap.
    buffer: Vec<u8>,

    /// The pixel format.
    depth: Depth,

    /// The width in pixels.
    width: i64,

    /// The number of rows.
    rows: i64,

    /// The bytes per row, negative when the rows are stored bottom up.
    pitch: i64,
}

impl Coverage {
    /// Returns the coverage of a pixel in [0, 255], 0 outside of the buffer.
    fn at(&self, row: i64, col: i64) -> u8 {
        if row < 0 || col < 0 || row >= self.rows || col >= self.width {
            return 0;
        }

        let start = if self.pitch >= 0 {
            row * self.pitch
        } else {
            (self.rows - 1 - row) * -self.pitch
        };

        match self.depth {
            Depth::Gray => self.byte(start + col),
            Depth::Mono => {
                if self.byte(start + col / 8) & (0x80 >> (col % 8)) != 0 {
                    255
                } else {
                    0
                }
            }
        }
    }

    fn byte(&self, index: i64) -> u8 {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.buffer.get(i))
            .copied()
            .unwrap_or(0)
    }
}

impl Renderer for PngRenderer {
    fn begin(&mut self, page: &Page) -> Result<()> {
        let width = cm_to_pixel(page.width, self.dpi).max(1) as u32;
        let height = cm_to_pixel(page.height, self.dpi).max(1) as u32;
        let (cell_width, cell_height) = self.pixel(page.glyph_size);
        self.cell = (cell_width.max(1), cell_height.max(1));

        if let Some(rasterizer) = self.rasterizer.as_ref() {
            let font_size = cm_to_pixel(page.font_size, self.dpi).max(1) as u32;
            rasterizer.face.set_pixel_sizes(0, font_size)?;
        }

        debug!("png canvas of {}x{} px", width, height);
        self.image = RgbaImage::from_pixel(width, height, Rgba(page.background.to_array()));
        Ok(())
    }

    fn glyph(&mut self, glyph: &DrawGlyph) -> Result<()> {
        if glyph.glyph.is_whitespace() {
            return Ok(());
        }

        let (x, y) = self.pixel(glyph.position);
        if self.rasterizer.is_some() {
            self.outline(glyph.glyph, x, y, glyph.color)
        } else {
            self.block(x, y, glyph.color);
            Ok(())
        }
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(path) = self.output.as_ref() {
            self.image.save_with_format(path, ImageFormat::Png)?;
            info!("saved {}", path.display());
        }
        Ok(())
    }
}
