//! End to end tests for codemosaic.

use std::fs;
use std::path::PathBuf;

use image::{DynamicImage, Rgba, RgbaImage};

use crate::color::Color;
use crate::config::Config;
use crate::geometry::{Point, Rect};
use crate::layout::{GlyphMetrics, Grid};
use crate::mask::{Mask, SampleMode, Sampler};
use crate::mosaic::{DrawGlyph, Mosaic};
use crate::render::{Page, SvgRenderer};
use crate::units::Cm;
use crate::Result;

/// A 4 by 4 cm canvas with glyphs of 1 cm.
fn small_grid() -> Result<Grid> {
    Ok(Grid::new(Point::new(4.0, 4.0), unit_glyph())?)
}

fn unit_glyph() -> GlyphMetrics {
    GlyphMetrics::new(Point::new(1.0, 1.0), 0.0)
}

/// A uniform mask of 40 px at 25 dpi, a bit more than 4 cm.
fn covering_mask(pixel: [u8; 4]) -> Result<Mask> {
    let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(40, 40, Rgba(pixel)));
    Mask::new(image, 25, 1.0, 0.5)
}

fn draw(text: &str, mask: Option<&Mask>, mode: SampleMode) -> Result<Vec<DrawGlyph>> {
    let grid = small_grid()?;
    let sampler = Sampler::new(mask, grid.canvas(), unit_glyph(), mode);
    let mosaic = Mosaic::new(&grid, sampler, Color::rgb(0x80, 0x80, 0x80));
    Ok(mosaic.glyphs(text).collect())
}

#[test]
fn two_glyphs_without_mask() -> Result<()> {
    let glyphs = draw("AB", None, SampleMode::default())?;

    assert_eq!(
        glyphs,
        vec![
            DrawGlyph {
                glyph: 'A',
                position: Point::new(1.0, 1.5),
                color: Color::rgb(0x80, 0x80, 0x80),
            },
            DrawGlyph {
                glyph: 'B',
                position: Point::new(2.0, 1.5),
                color: Color::rgb(0x80, 0x80, 0x80),
            },
        ]
    );

    Ok(())
}

#[test]
fn opaque_mask_tints_everything() -> Result<()> {
    let mask = covering_mask([10, 200, 30, 255])?;
    let glyphs = draw("abcdef", Some(&mask), SampleMode::default())?;

    assert_eq!(glyphs.len(), 6);
    for glyph in glyphs {
        assert_eq!(glyph.color, Color::rgb(10, 200, 30));
    }

    Ok(())
}

#[test]
fn transparent_mask_keeps_foreground() -> Result<()> {
    let mask = covering_mask([10, 200, 30, 0])?;

    let glyphs = draw("abc", Some(&mask), SampleMode::default())?;
    assert!(glyphs
        .iter()
        .all(|g| g.color == Color::rgb(0x80, 0x80, 0x80)));

    let debug = SampleMode {
        monochrome: false,
        debug: true,
    };
    let glyphs = draw("abc", Some(&mask), debug)?;
    assert!(glyphs.iter().all(|g| g.color == Color::RED));

    Ok(())
}

#[test]
fn long_text_stops_at_the_bottom() -> Result<()> {
    let grid = small_grid()?;
    let mosaic = Mosaic::new(
        &grid,
        Sampler::without_mask(unit_glyph()),
        Color::BLACK,
    );
    let page = Page::new(&grid, Color::WHITE, "monospace");

    let text = "x".repeat(100);
    let mut renderer = SvgRenderer::new(Vec::new());
    let stats = mosaic.render(&text, &page, &mut renderer)?;

    assert_eq!(stats.glyphs, 6);
    assert_eq!(stats.rows, 3);
    assert_eq!(stats.dropped, 94);

    let svg = String::from_utf8(renderer.into_inner()).unwrap();
    assert_eq!(svg.lines().filter(|l| l.starts_with("<text ")).count(), 6);
    assert!(svg.ends_with("</svg>\n"));

    Ok(())
}

#[test]
fn mask_region_is_centered_on_the_page() -> Result<()> {
    let mask = covering_mask([0, 0, 0, 255])?;
    let canvas = Rect::from_size(Point::new(4.0, 4.0));
    let sampler = Sampler::new(Some(&mask), &canvas, unit_glyph(), SampleMode::default());
    let region = sampler.region().unwrap();

    assert!(region.min.x < Cm(0.0) && region.max.x > Cm(4.0));
    assert!(region.min.y < Cm(0.0) && region.max.y > Cm(4.0));

    Ok(())
}

#[test]
fn build_from_configuration() -> Result<()> {
    let dir = std::env::temp_dir().join(format!("codemosaic-build-{}", std::process::id()));
    fs::remove_dir_all(&dir).ok();
    fs::create_dir_all(dir.join("src"))?;
    fs::write(dir.join("src").join("lib.rs"), "pub fn answer() -> u32 {\n    42\n}\n")?;

    let mask = RgbaImage::from_pixel(40, 40, Rgba([0, 0, 255, 255]));
    mask.save(dir.join("mask.png"))?;

    let mut config = Config::from_toml(
        r##"
        title = "answer"
        source = "src"
        output = "mosaic.svg"
        mask = "mask.png"
        mask_dpi = 25
        width = 4
        height = 4
        font_size = 1.5
        foreground = "#000000"
        "##,
    )?;
    config.resolve(&dir);

    let summary = config.build()?;
    assert_eq!(summary.files, 1);
    assert!(summary.warnings.is_empty());
    assert_eq!(summary.output, Some(dir.join("mosaic.svg")));

    // Glyphs of 1 by 1.5 cm leave room for 2 glyphs on 2 rows.
    assert_eq!(summary.stats.row_width, 2);
    assert_eq!(summary.stats.glyphs, 4);
    assert_eq!(summary.stats.tinted, 4);

    let svg = fs::read_to_string(dir.join("mosaic.svg"))?;
    assert!(svg.contains("<![CDATA[p]]>"));
    assert!(svg.contains("fill: #0000ff;"));

    fs::remove_dir_all(&dir).ok();
    Ok(())
}

#[test]
fn invalid_configuration_writes_nothing() {
    let output = std::env::temp_dir().join(format!("codemosaic-none-{}.svg", std::process::id()));
    fs::remove_file(&output).ok();

    let mut config = Config::default();
    config.source = PathBuf::from("does-not-exist");
    config.output = Some(output.clone());
    config.font_size = Cm(20.0);

    assert!(config.build().is_err());
    assert!(!output.exists());
}
