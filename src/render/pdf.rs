//! Writes a mosaic as a single page pdf document.

use std::io::{BufWriter, Write};

use printpdf::{
    BuiltinFont, Color as PdfColor, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point as PdfPoint, Pt, Rgb,
};

use crate::color::Color;
use crate::mosaic::DrawGlyph;
use crate::render::{Page, Renderer};
use crate::units::Cm;
use crate::Result;

/// The document being written, once the page is known.
struct Open {
    /// The inner document from printpdf.
    document: PdfDocumentReference,

    /// The only layer of the only page.
    layer: PdfLayerReference,

    /// The font every glyph is written with.
    font: IndirectFontRef,

    /// The height of the page, pdf's vertical axis growing upward.
    height: Cm,

    /// The size of the font in points.
    font_size: f64,

    /// The last fill color that was set.
    fill: Option<Color>,
}

/// Draws the glyphs with the builtin Courier font, each in its own color.
pub struct PdfRenderer<W: Write> {
    /// Where the document goes.
    writer: W,

    /// The title of the document.
    title: String,

    /// The document, between `begin` and `finish`.
    open: Option<Open>,
}

impl<W: Write> PdfRenderer<W> {
    /// Creates a renderer that writes a document with the specified title into `writer`.
    pub fn new(writer: W, title: &str) -> PdfRenderer<W> {
        PdfRenderer {
            writer,
            title: title.to_owned(),
            open: None,
        }
    }

    /// Returns the inner writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn pdf_color(color: Color) -> PdfColor {
    let (r, g, b) = color.to_unit_rgb();
    PdfColor::Rgb(Rgb::new(r, g, b, None))
}

impl Open {
    /// Sets the fill color, unless it is already the current one.
    fn fill(&mut self, color: Color) {
        if self.fill != Some(color) {
            self.layer.set_fill_color(pdf_color(color));
            self.fill = Some(color);
        }
    }
}

impl<W: Write> Renderer for PdfRenderer<W> {
    fn begin(&mut self, page: &Page) -> Result<()> {
        let (document, page_index, layer_index) =
            PdfDocument::new(&self.title, page.width.into(), page.height.into(), "mosaic");
        let layer = document.get_page(page_index).get_layer(layer_index);
        let font = document.add_builtin_font(BuiltinFont::Courier)?;
        let font_size: Pt = page.font_size.into();

        let mut open = Open {
            document,
            layer,
            font,
            height: page.height,
            font_size: font_size.0,
            fill: None,
        };

        if page.background.a > 0 {
            let (width, height): (Mm, Mm) = (page.width.into(), page.height.into());
            open.fill(page.background);
            open.layer.add_shape(Line {
                points: vec![
                    (PdfPoint::new(Mm(0.0), Mm(0.0)), false),
                    (PdfPoint::new(width, Mm(0.0)), false),
                    (PdfPoint::new(width, height), false),
                    (PdfPoint::new(Mm(0.0), height), false),
                ],
                is_closed: true,
                has_fill: true,
                has_stroke: false,
                is_clipping_path: false,
            });
        }

        self.open = Some(open);
        Ok(())
    }

    fn glyph(&mut self, glyph: &DrawGlyph) -> Result<()> {
        let open = match self.open.as_mut() {
            Some(open) => open,
            None => return Ok(()),
        };

        open.fill(glyph.color);
        open.layer.use_text(
            glyph.glyph.to_string(),
            open.font_size,
            glyph.position.x.into(),
            (open.height - glyph.position.y).into(),
            &open.font,
        );
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(open) = self.open.take() {
            let mut writer = BufWriter::new(&mut self.writer);
            open.document.save(&mut writer)?;
            writer.flush()?;
        }
        Ok(())
    }
}

/// Unit tests for the pdf output.
#[cfg(test)]
mod tests {
    use crate::color::Color;
    use crate::geometry::Point;
    use crate::mosaic::DrawGlyph;
    use crate::render::pdf::PdfRenderer;
    use crate::render::{Page, Renderer};
    use crate::units::Cm;
    use crate::Result;

    #[test]
    fn writes_a_pdf() -> Result<()> {
        let page = Page {
            width: Cm(4.0),
            height: Cm(4.0),
            background: Color::WHITE,
            font_name: "monospace".into(),
            font_size: Cm(1.0),
            glyph_size: Point::new(1.0, 1.0),
        };

        let mut renderer = PdfRenderer::new(Vec::new(), "test");
        renderer.begin(&page)?;
        renderer.glyph(&DrawGlyph {
            glyph: 'A',
            position: Point::new(1.0, 1.5),
            color: Color::RED,
        })?;
        renderer.finish()?;

        let bytes = renderer.into_inner();
        assert!(bytes.starts_with(b"%PDF"));

        Ok(())
    }
}
