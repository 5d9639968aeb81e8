//! Streams a mosaic as an svg document.

use std::borrow::Cow;
use std::io::Write;

use crate::mosaic::DrawGlyph;
use crate::render::{Page, Renderer};
use crate::Result;

/// Writes one svg text element per glyph, in the order they arrive.
pub struct SvgRenderer<W: Write> {
    /// Where the document goes.
    writer: W,

    /// The style shared by every glyph, set when the page begins.
    font_style: String,
}

impl<W: Write> SvgRenderer<W> {
    /// Creates a renderer writing into `writer`.
    pub fn new(writer: W) -> SvgRenderer<W> {
        SvgRenderer {
            writer,
            font_style: String::new(),
        }
    }

    /// Returns the inner writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Escapes a string that goes in a double quoted attribute.
fn escape_attribute(value: &str) -> Cow<'_, str> {
    if !value.contains(|c: char| c == '"' || c == '&' || c == '<') {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => escaped.push_str("&quot;"),
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

impl<W: Write> Renderer for SvgRenderer<W> {
    fn begin(&mut self, page: &Page) -> Result<()> {
        writeln!(self.writer, r#"<?xml version="1.0" standalone="no"?>"#)?;
        writeln!(
            self.writer,
            r#"<svg version="1.1" xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" xml:space="preserve" style="background-color: {};" width="{:.6}cm" height="{:.6}cm">"#,
            page.background,
            page.width.0,
            page.height.0
        )?;

        self.font_style = format!(
            "font-family: {}; font-size: {:.6}cm;",
            escape_attribute(&page.font_name),
            page.font_size.0
        );

        Ok(())
    }

    fn glyph(&mut self, glyph: &DrawGlyph) -> Result<()> {
        writeln!(
            self.writer,
            r#"<text x="{:.6}cm" y="{:.6}cm" style="{} fill: {};"><![CDATA[{}]]></text>"#,
            glyph.position.x.0, glyph.position.y.0, self.font_style, glyph.color, glyph.glyph
        )?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        writeln!(self.writer, "</svg>")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Unit tests for the svg output.
#[cfg(test)]
mod tests {
    use crate::color::Color;
    use crate::geometry::Point;
    use crate::mosaic::DrawGlyph;
    use crate::render::svg::{escape_attribute, SvgRenderer};
    use crate::render::{Page, Renderer};
    use crate::units::Cm;
    use crate::Result;

    fn page() -> Page {
        Page {
            width: Cm(4.0),
            height: Cm(4.0),
            background: Color::WHITE,
            font_name: "monospace".into(),
            font_size: Cm(1.0),
            glyph_size: Point::new(1.0, 1.0),
        }
    }

    #[test]
    fn empty_document() -> Result<()> {
        let mut renderer = SvgRenderer::new(Vec::new());
        renderer.begin(&page())?;
        renderer.finish()?;

        let svg = String::from_utf8(renderer.into_inner()).unwrap();
        let lines = svg.lines().collect::<Vec<_>>();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], r#"<?xml version="1.0" standalone="no"?>"#);
        assert!(lines[1].starts_with("<svg "));
        assert!(lines[1].contains(r#"style="background-color: #ffffff;""#));
        assert!(lines[1].contains(r#"width="4.000000cm" height="4.000000cm""#));
        assert_eq!(lines[2], "</svg>");

        Ok(())
    }

    #[test]
    fn text_element() -> Result<()> {
        let mut renderer = SvgRenderer::new(Vec::new());
        renderer.begin(&page())?;
        renderer.glyph(&DrawGlyph {
            glyph: '<',
            position: Point::new(1.0, 1.5),
            color: Color::rgb(0x80, 0x80, 0x80),
        })?;
        renderer.finish()?;

        let svg = String::from_utf8(renderer.into_inner()).unwrap();
        let text = svg.lines().nth(2).unwrap();

        assert_eq!(
            text,
            r#"<text x="1.000000cm" y="1.500000cm" style="font-family: monospace; font-size: 1.000000cm; fill: #808080;"><![CDATA[<]]></text>"#
        );

        Ok(())
    }

    #[test]
    fn escapes_font_names() {
        assert_eq!(escape_attribute("monospace"), "monospace");
        assert_eq!(
            escape_attribute(r#""Fira Code" & <co>"#),
            "&quot;Fira Code&quot; &amp; &lt;co>"
        );
    }
}
