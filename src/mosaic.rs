//! Glues the layout and the mask together.
//!
//! The layout tells where each glyph goes, the sampler tells which color it takes, and the
//! result is a stream of draw instructions a renderer can consume in order.

use std::fmt;

use colored::*;

use crate::color::Color;
use crate::geometry::Point;
use crate::layout::{Grid, Placements};
use crate::mask::Sampler;
use crate::render::{Page, Renderer};
use crate::Result;

/// A glyph ready to be drawn.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawGlyph {
    /// The glyph.
    pub glyph: char,

    /// Where the glyph is drawn, in centimeters. This is the left end of the glyph's
    /// baseline.
    pub position: Point,

    /// The color of the glyph.
    pub color: Color,
}

/// A grid whose glyphs are colored by a sampler.
pub struct Mosaic<'a> {
    /// The grid the glyphs are laid out on.
    grid: &'a Grid,

    /// The sampler that decides the color of the glyphs.
    sampler: Sampler<'a>,

    /// The color of the glyphs the mask does not tint.
    foreground: Color,
}

impl<'a> Mosaic<'a> {
    /// Creates a new mosaic.
    pub fn new(grid: &'a Grid, sampler: Sampler<'a>, foreground: Color) -> Mosaic<'a> {
        Mosaic {
            grid,
            sampler,
            foreground,
        }
    }

    /// Returns the draw instructions of a text, in reading order.
    pub fn glyphs<'b>(&'b self, text: &'b str) -> Glyphs<'b> {
        Glyphs {
            placements: self.grid.layout(text),
            sampler: &self.sampler,
            foreground: self.foreground,
            tinted: 0,
        }
    }

    /// Renders a text.
    ///
    /// The renderer receives the page first, then every glyph in reading order, and is finished
    /// once the text is exhausted or the canvas is full.
    pub fn render<R: Renderer + ?Sized>(
        &self,
        text: &str,
        page: &Page,
        renderer: &mut R,
    ) -> Result<Stats> {
        renderer.begin(page)?;

        let mut glyphs = self.glyphs(text);
        let mut emitted = 0;
        for glyph in glyphs.by_ref() {
            renderer.glyph(&glyph)?;
            emitted += 1;
        }

        renderer.finish()?;

        let stats = Stats {
            glyphs: emitted,
            tinted: glyphs.tinted(),
            rows: glyphs.rows_started(),
            row_width: self.grid.row_width(),
            dropped: text.chars().count() - emitted,
        };

        debug!("{:?}", stats);
        Ok(stats)
    }
}

/// The iterator over the draw instructions of a text.
pub struct Glyphs<'a> {
    /// The glyphs in their place.
    placements: Placements<'a>,

    /// The sampler deciding their colors.
    sampler: &'a Sampler<'a>,

    /// The default color.
    foreground: Color,

    /// How many glyphs took their color from the mask so far.
    tinted: usize,
}

impl<'a> Glyphs<'a> {
    /// Returns how many glyphs took their color from the mask so far.
    pub fn tinted(&self) -> usize {
        self.tinted
    }

    /// Returns how many rows were started so far.
    pub fn rows_started(&self) -> usize {
        self.placements.rows_started()
    }
}

impl<'a> Iterator for Glyphs<'a> {
    type Item = DrawGlyph;

    fn next(&mut self) -> Option<DrawGlyph> {
        let placement = self.placements.next()?;
        let decision = self.sampler.sample(placement.position);

        if decision.is_tinted() {
            self.tinted += 1;
        }

        Some(DrawGlyph {
            glyph: placement.glyph,
            position: placement.position,
            color: decision.resolve(self.foreground),
        })
    }
}

/// What happened while rendering a mosaic.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    /// The number of glyphs drawn.
    pub glyphs: usize,

    /// The number of glyphs that took their color from the mask.
    pub tinted: usize,

    /// The number of rows started.
    pub rows: usize,

    /// The number of glyphs in a full row.
    pub row_width: usize,

    /// The number of glyphs that did not fit on the canvas.
    pub dropped: usize,
}

impl fmt::Display for Stats {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(
            fmt,
            "{} glyphs on {} rows of {}, {} tinted by the mask",
            self.glyphs.to_string().bold(),
            self.rows.to_string().bold(),
            self.row_width,
            self.tinted.to_string().bold()
        )?;

        if self.dropped > 0 {
            write!(
                fmt,
                ", {}",
                format!("{} glyphs did not fit", self.dropped).yellow()
            )?;
        }

        Ok(())
    }
}

/// Unit tests for the mosaic.
#[cfg(test)]
mod tests {
    use crate::color::Color;
    use crate::geometry::Point;
    use crate::layout::{GlyphMetrics, Grid};
    use crate::mask::Sampler;
    use crate::mosaic::{DrawGlyph, Mosaic};
    use crate::render::{Page, Renderer};
    use crate::Result;

    /// A renderer that remembers every call.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl Renderer for Recorder {
        fn begin(&mut self, page: &Page) -> Result<()> {
            self.calls.push(format!("begin {}", page.background));
            Ok(())
        }

        fn glyph(&mut self, glyph: &DrawGlyph) -> Result<()> {
            self.calls.push(format!("glyph {}", glyph.glyph));
            Ok(())
        }

        fn finish(&mut self) -> Result<()> {
            self.calls.push("finish".into());
            Ok(())
        }
    }

    #[test]
    fn renderer_calls_are_ordered() -> Result<()> {
        let metrics = GlyphMetrics::new(Point::new(1.0, 1.0), 0.0);
        let grid = Grid::new(Point::new(4.0, 4.0), metrics)?;
        let mosaic = Mosaic::new(&grid, Sampler::without_mask(metrics), Color::BLACK);
        let page = Page::new(&grid, Color::WHITE, "monospace");

        let mut recorder = Recorder::default();
        let stats = mosaic.render("abcdefgh", &page, &mut recorder)?;

        assert_eq!(
            recorder.calls,
            vec![
                "begin #ffffff",
                "glyph a",
                "glyph b",
                "glyph c",
                "glyph d",
                "glyph e",
                "glyph f",
                "finish"
            ]
        );
        assert_eq!(stats.glyphs, 6);
        assert_eq!(stats.rows, 3);
        assert_eq!(stats.dropped, 2);
        assert_eq!(stats.tinted, 0);

        Ok(())
    }
}
