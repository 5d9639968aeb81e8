//! This module lays the glyphs out on the canvas.
//!
//! The text is cut into rows holding the same number of glyphs, and a cursor walks through the
//! canvas, left to right then top to bottom. There is no line breaking: a row is exactly as
//! long as the number of glyphs that fit between the margins.

pub mod errors;

use std::str::Chars;

use crate::geometry::{Point, Rect};
use crate::layout::errors::ConfigError;
use crate::units::Cm;

/// The ratio between the height and the width of a glyph.
pub const GLYPH_ASPECT_RATIO: f64 = 1.5;

/// The footprint of a glyph on the canvas.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlyphMetrics {
    /// The width and height allotted to a glyph.
    pub size: Point,

    /// The gap between two glyphs, horizontally and vertically.
    pub spacing: Point,
}

impl GlyphMetrics {
    /// Creates the metrics of a glyph from its size and a spacing given as a fraction of
    /// that size.
    pub fn new(size: Point, spacing: f64) -> GlyphMetrics {
        GlyphMetrics {
            size,
            spacing: size * spacing,
        }
    }

    /// Creates the metrics of a monospace glyph of the specified font size.
    ///
    /// Actual font metrics are never read, glyphs are assumed to be 1.5 times higher than wide.
    pub fn from_font_size(font_size: Cm, spacing: f64) -> GlyphMetrics {
        GlyphMetrics::new(
            Point {
                x: font_size / GLYPH_ASPECT_RATIO,
                y: font_size,
            },
            spacing,
        )
    }

    /// Returns how far the cursor moves after a glyph, and after a row.
    pub fn advance(&self) -> Point {
        self.size + self.spacing
    }
}

/// A glyph at its place on the canvas.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Placement {
    /// The glyph.
    pub glyph: char,

    /// The position of the cursor when the glyph is drawn. The glyph grows to the right and
    /// upward from here.
    pub position: Point,
}

/// The grid of glyphs covering a canvas.
#[derive(Debug, Clone)]
pub struct Grid {
    /// The whole canvas.
    canvas: Rect,

    /// The canvas minus one glyph on each side.
    margin: Rect,

    /// The metrics of the glyphs.
    metrics: GlyphMetrics,

    /// The number of glyphs in a row.
    row_width: usize,
}

impl Grid {
    /// Creates the grid of a canvas of the specified size.
    ///
    /// Fails if not a single glyph fits in a row.
    pub fn new(canvas_size: Point, metrics: GlyphMetrics) -> Result<Grid, ConfigError> {
        let canvas = Rect::from_size(canvas_size);
        let margin = canvas.shrink(metrics.size);
        let advance = metrics.advance();

        let columns = ((canvas.max.x - metrics.size.x * 2.0) / advance.x).floor();

        if !(columns >= 1.0) || !columns.is_finite() {
            return Err(ConfigError::DegenerateRowWidth {
                canvas_width: canvas.width(),
                advance: advance.x,
            });
        }

        Ok(Grid {
            canvas,
            margin,
            metrics,
            row_width: columns as usize,
        })
    }

    /// Returns the whole canvas.
    pub fn canvas(&self) -> &Rect {
        &self.canvas
    }

    /// Returns the region inside the margins.
    pub fn margin(&self) -> &Rect {
        &self.margin
    }

    /// Returns the metrics of the glyphs.
    pub fn metrics(&self) -> GlyphMetrics {
        self.metrics
    }

    /// Returns the number of glyphs in a row.
    pub fn row_width(&self) -> usize {
        self.row_width
    }

    /// Returns the position of the first glyph.
    pub fn origin(&self) -> Point {
        self.margin.min
            + Point {
                x: Cm(0.0),
                y: self.metrics.size.y / 2.0,
            }
    }

    /// Lays some text out, yielding glyphs in reading order.
    pub fn layout<'a>(&'a self, text: &'a str) -> Placements<'a> {
        Placements {
            grid: self,
            rows: split_rows(text, self.row_width),
            row: "".chars(),
            cursor: self.origin(),
            rows_started: 0,
            done: false,
        }
    }
}

/// Splits the text into rows of `width` chars, the last one holding whatever remains.
///
/// Rows borrow the text, so that concatenating them gives back the text. `width` must be
/// positive.
///
/// ```
/// # use codemosaic::layout::split_rows;
/// let rows = split_rows("héllo world", 4).collect::<Vec<_>>();
/// assert_eq!(rows, vec!["héll", "o wo", "rld"]);
/// ```
pub fn split_rows(text: &str, width: usize) -> Rows<'_> {
    Rows { rest: text, width }
}

/// An iterator over the rows of a text.
#[derive(Debug, Clone)]
pub struct Rows<'a> {
    /// What is left to split.
    rest: &'a str,

    /// The number of chars in a full row.
    width: usize,
}

impl<'a> Iterator for Rows<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }

        let end = self
            .rest
            .char_indices()
            .nth(self.width)
            .map(|(i, _)| i)
            .unwrap_or_else(|| self.rest.len());

        let (row, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(row)
    }
}

/// The glyphs of a text walked through the grid.
///
/// The iterator stops once the text is exhausted, or when a row would start below the canvas.
/// Only the start of a row is checked, glyphs overflowing on the right are still yielded.
#[derive(Debug, Clone)]
pub struct Placements<'a> {
    /// The grid the text is laid on.
    grid: &'a Grid,

    /// The rows that were not started yet.
    rows: Rows<'a>,

    /// The rest of the current row.
    row: Chars<'a>,

    /// The position of the next glyph.
    cursor: Point,

    /// How many rows were started.
    rows_started: usize,

    /// Whether the layout is over.
    done: bool,
}

impl<'a> Placements<'a> {
    /// Returns the number of rows that were started so far.
    pub fn rows_started(&self) -> usize {
        self.rows_started
    }

    /// Moves the cursor to the beginning of the next row, returning false if the canvas is
    /// full or the text is exhausted.
    fn start_row(&mut self) -> bool {
        let row = match self.rows.next() {
            Some(row) => row,
            None => return false,
        };

        if self.rows_started > 0 {
            self.cursor.y += self.grid.metrics.advance().y;
        }
        self.cursor.x = self.grid.margin.min.x;

        if !self.cursor.is_in(&self.grid.canvas) {
            debug!("row {} starts off the canvas, stopping", self.rows_started);
            return false;
        }

        self.row = row.chars();
        self.rows_started += 1;
        true
    }
}

impl<'a> Iterator for Placements<'a> {
    type Item = Placement;

    fn next(&mut self) -> Option<Placement> {
        while !self.done {
            if let Some(glyph) = self.row.next() {
                let placement = Placement {
                    glyph,
                    position: self.cursor,
                };
                self.cursor.x += self.grid.metrics.advance().x;
                return Some(placement);
            }

            self.done = !self.start_row();
        }

        None
    }
}
