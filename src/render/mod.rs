//! This module turns draw instructions into actual documents.
//!
//! A renderer is handed the page first, then every glyph in reading order. Vector outputs
//! stream the glyphs as they come, raster outputs convert positions to pixels at the last
//! moment.

pub mod pdf;
pub mod png;
pub mod svg;

use std::path::Path;

use crate::color::Color;
use crate::geometry::Point;
use crate::layout::Grid;
use crate::mosaic::DrawGlyph;
use crate::units::Cm;
use crate::Result;

pub use crate::render::pdf::PdfRenderer;
pub use crate::render::png::PngRenderer;
pub use crate::render::svg::SvgRenderer;

/// Everything a renderer needs to know before the first glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// The width of the canvas.
    pub width: Cm,

    /// The height of the canvas.
    pub height: Cm,

    /// The color behind the glyphs.
    pub background: Color,

    /// The name of the font, passed as is to the outputs that understand it.
    pub font_name: String,

    /// The size of the font.
    pub font_size: Cm,

    /// The footprint of a glyph.
    pub glyph_size: Point,
}

impl Page {
    /// Creates the page matching a grid.
    pub fn new(grid: &Grid, background: Color, font_name: &str) -> Page {
        let canvas = grid.canvas();
        let metrics = grid.metrics();

        Page {
            width: canvas.width(),
            height: canvas.height(),
            background,
            font_name: font_name.to_owned(),
            font_size: metrics.size.y,
            glyph_size: metrics.size,
        }
    }
}

/// Something that can draw a mosaic.
pub trait Renderer {
    /// Starts the document.
    fn begin(&mut self, page: &Page) -> Result<()>;

    /// Draws a glyph.
    fn glyph(&mut self, glyph: &DrawGlyph) -> Result<()>;

    /// Ends the document and flushes it.
    fn finish(&mut self) -> Result<()>;
}

/// The formats a mosaic can be written in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// Scalable vector graphics, one text element per glyph.
    Svg,

    /// A single page pdf document.
    Pdf,

    /// A png image.
    Png,
}

impl OutputFormat {
    /// Returns the file extension of the format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Png => "png",
        }
    }

    /// Detects the format from a file extension.
    pub fn from_extension(ext: &str) -> Option<OutputFormat> {
        match ext.to_ascii_lowercase().as_str() {
            "svg" => Some(OutputFormat::Svg),
            "pdf" => Some(OutputFormat::Pdf),
            "png" => Some(OutputFormat::Png),
            _ => None,
        }
    }

    /// Detects the format from a file path.
    pub fn from_path(path: &Path) -> Option<OutputFormat> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(OutputFormat::from_extension)
    }
}
