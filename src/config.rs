//! This module defines the configuration of a mosaic. The configuration is parsed from a TOML
//! file located at the root of the project, and every measurement has a default value.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::{fmt, result};

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::color::{deserialize_color, serialize_color, Color};
use crate::geometry::{Point, Rect};
use crate::layout::errors::ConfigError;
use crate::layout::{GlyphMetrics, Grid};
use crate::mask::{Mask, SampleMode, Sampler};
use crate::mosaic::{Mosaic, Stats};
use crate::render::{OutputFormat, Page, PdfRenderer, PngRenderer, Renderer, SvgRenderer};
use crate::text::{extract, find_files, Warnings};
use crate::units::Cm;
use crate::{Error, Result};

/// The name of the configuration file.
pub const CONFIG_FILE: &str = "codemosaic.toml";

/// Serializes a `Cm` structure.
// This is required to use in macro `serialize_with`.
#[allow(clippy::trivially_copy_pass_by_ref)]
pub fn serialize_cm<S: Serializer>(cm: &Cm, serializer: S) -> result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(cm.0)
}

/// Deserializes a `Cm` structure.
pub fn deserialize_cm<'a, D: Deserializer<'a>>(deserializer: D) -> result::Result<Cm, D::Error> {
    deserializer.deserialize_f64(CmVisitor)
}

macro_rules! visit_from {
    ($visit: ident, $ty: ty) => {
        fn $visit<E>(self, value: $ty) -> result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Cm(f64::from(value)))
        }
    };
}

macro_rules! visit_as {
    ($visit: ident, $ty: ty) => {
        fn $visit<E>(self, value: $ty) -> result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Cm(value as f64))
        }
    };
}

/// Visitor for the `Cm` structure.
pub struct CmVisitor;

impl<'a> Visitor<'a> for CmVisitor {
    type Value = Cm;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a length in centimeters")
    }

    visit_from!(visit_u8, u8);
    visit_from!(visit_u16, u16);
    visit_from!(visit_u32, u32);
    visit_as!(visit_u64, u64);
    visit_from!(visit_i8, i8);
    visit_from!(visit_i16, i16);
    visit_from!(visit_i32, i32);
    visit_as!(visit_i64, i64);
    visit_from!(visit_f32, f32);
    visit_from!(visit_f64, f64);
}

/// Holds the configuration of a mosaic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The title of the mosaic, used as the title of pdf outputs.
    pub title: String,

    /// The file or directory whose sources make up the text.
    pub source: PathBuf,

    /// The extensions of the source files.
    pub extensions: Vec<String>,

    /// The path of the output, whose extension decides the format. The svg goes to the
    /// standard output when there is none.
    pub output: Option<PathBuf>,

    /// The width of the canvas.
    #[serde(serialize_with = "serialize_cm")]
    #[serde(deserialize_with = "deserialize_cm")]
    pub width: Cm,

    /// The height of the canvas.
    #[serde(serialize_with = "serialize_cm")]
    #[serde(deserialize_with = "deserialize_cm")]
    pub height: Cm,

    /// The path to the mask image.
    pub mask: Option<PathBuf>,

    /// The resolution of the mask image.
    pub mask_dpi: u32,

    /// The scale of the mask image.
    pub mask_scale: f64,

    /// The fraction of full opacity a mask pixel needs to tint a glyph.
    pub alpha_threshold: f64,

    /// The font family written in vector outputs.
    pub font_name: String,

    /// The size of the font.
    #[serde(serialize_with = "serialize_cm")]
    #[serde(deserialize_with = "deserialize_cm")]
    pub font_size: Cm,

    /// The spacing between glyphs, as a fraction of the glyph size.
    pub font_spacing: f64,

    /// A font file used to rasterize the glyphs of png outputs.
    pub font_file: Option<PathBuf>,

    /// The color of the glyphs the mask does not tint.
    #[serde(serialize_with = "serialize_color")]
    #[serde(deserialize_with = "deserialize_color")]
    pub foreground: Color,

    /// The color of the background.
    #[serde(serialize_with = "serialize_color")]
    #[serde(deserialize_with = "deserialize_color")]
    pub background: Color,

    /// Whether the glyphs tinted by the mask are black.
    pub monochrome: bool,

    /// Whether the glyphs missing the mask are red.
    pub debug: bool,

    /// The resolution of png outputs.
    pub raster_dpi: u32,
}

impl Default for Config {
    fn default() -> Config {
        Config::with_title("mosaic")
    }
}

/// What a build produced.
#[derive(Debug)]
pub struct Summary {
    /// Where the mosaic was written, `None` for the standard output.
    pub output: Option<PathBuf>,

    /// The number of source files read.
    pub files: usize,

    /// What happened during rendering.
    pub stats: Stats,

    /// The source files that were skipped.
    pub warnings: Warnings,
}

impl fmt::Display for Summary {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        use colored::*;

        let output = match &self.output {
            Some(path) => path.display().to_string(),
            None => String::from("standard output"),
        };

        write!(
            fmt,
            "{} {} from {} files: {}",
            "Finished".bold().green(),
            output,
            self.files,
            self.stats
        )
    }
}

/// Values given on the command line, that win over the configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    /// The file or directory to read.
    pub source: Option<PathBuf>,

    /// The output file.
    pub output: Option<PathBuf>,

    /// The mask image.
    pub mask: Option<PathBuf>,

    /// The resolution of the mask.
    pub mask_dpi: Option<u32>,

    /// The scale of the mask.
    pub mask_scale: Option<f64>,

    /// The alpha threshold.
    pub alpha_threshold: Option<f64>,

    /// The width of the canvas.
    pub width: Option<Cm>,

    /// The height of the canvas.
    pub height: Option<Cm>,

    /// The font family.
    pub font_name: Option<String>,

    /// The font size.
    pub font_size: Option<Cm>,

    /// The spacing between glyphs.
    pub font_spacing: Option<f64>,

    /// The color of the glyphs.
    pub foreground: Option<Color>,

    /// The color of the background.
    pub background: Option<Color>,

    /// Forces the monochrome mode.
    pub monochrome: bool,

    /// Forces the debug mode.
    pub debug: bool,
}

impl Config {
    /// Creates a default configuration with a title.
    pub fn with_title(title: &str) -> Config {
        Config {
            title: String::from(title),
            source: PathBuf::from("."),
            extensions: vec![String::from("rs")],
            output: None,
            width: Cm(10.0),
            height: Cm(12.0),
            mask: None,
            mask_dpi: 72,
            mask_scale: 1.0,
            alpha_threshold: 0.5,
            font_name: String::from("monospace"),
            font_size: Cm(0.1),
            font_spacing: 0.0,
            font_file: None,
            foreground: Color::rgb(0x80, 0x80, 0x80),
            background: Color::WHITE,
            monochrome: false,
            debug: false,
            raster_dpi: 300,
        }
    }

    /// Parses a configuration from the content of a TOML file.
    pub fn from_toml(content: &str) -> Result<Config> {
        Ok(toml::from_str(content)?)
    }

    /// Writes the configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Reads the configuration file at the specified path.
    ///
    /// Relative paths in the file are relative to the directory of the file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Config> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config = Config::from_toml(&content)?;

        if let Some(dir) = path.parent() {
            config.resolve(dir);
        }

        Ok(config)
    }

    /// Looks for a configuration file in `dir` and its parents.
    pub fn search(dir: &Path) -> Option<PathBuf> {
        dir.ancestors()
            .map(|dir| dir.join(CONFIG_FILE))
            .find(|path| path.is_file())
    }

    /// Applies the command line values.
    pub fn apply(&mut self, overrides: &Overrides) {
        macro_rules! apply {
            ($($field: ident),*) => {
                $(
                    if let Some(value) = &overrides.$field {
                        self.$field = value.clone();
                    }
                )*
            };
        }

        apply!(
            source,
            mask_dpi,
            mask_scale,
            alpha_threshold,
            width,
            height,
            font_name,
            font_size,
            font_spacing,
            foreground,
            background
        );

        if overrides.output.is_some() {
            self.output = overrides.output.clone();
        }

        if overrides.mask.is_some() {
            self.mask = overrides.mask.clone();
        }

        self.monochrome |= overrides.monochrome;
        self.debug |= overrides.debug;
    }

    /// Makes the relative paths of the configuration relative to `dir`.
    pub fn resolve(&mut self, dir: &Path) {
        let join = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = dir.join(&path);
            }
        };

        join(&mut self.source);
        for path in [&mut self.output, &mut self.mask, &mut self.font_file] {
            if let Some(path) = path {
                join(path);
            }
        }
    }

    /// Returns the metrics of a glyph.
    pub fn metrics(&self) -> GlyphMetrics {
        GlyphMetrics::from_font_size(self.font_size, self.font_spacing)
    }

    /// Returns the monochrome and debug flags.
    pub fn sample_mode(&self) -> SampleMode {
        SampleMode {
            monochrome: self.monochrome,
            debug: self.debug,
        }
    }

    /// Returns the format of the output.
    pub fn output_format(&self) -> Result<OutputFormat> {
        match &self.output {
            None => Ok(OutputFormat::Svg),
            Some(path) => {
                OutputFormat::from_path(path).ok_or_else(|| Error::UnsupportedOutput(path.clone()))
            }
        }
    }

    /// Checks that the configuration can produce a mosaic, and returns its grid.
    pub fn validate(&self) -> Result<Grid> {
        if self.mask.is_some() && self.mask_dpi == 0 {
            return Err(Error::InvalidConfig(ConfigError::NonPositiveDpi("mask_dpi")));
        }

        if self.mask.is_some() && !(self.mask_scale > 0.0 && self.mask_scale.is_finite()) {
            return Err(Error::InvalidConfig(ConfigError::NonPositiveMaskScale(
                self.mask_scale,
            )));
        }

        if self.output_format()? == OutputFormat::Png && self.raster_dpi == 0 {
            return Err(Error::InvalidConfig(ConfigError::NonPositiveDpi(
                "raster_dpi",
            )));
        }

        let canvas = Point {
            x: self.width,
            y: self.height,
        };

        Ok(Grid::new(canvas, self.metrics())?)
    }

    /// Creates the renderer matching the output.
    fn renderer(&self) -> Result<Box<dyn Renderer>> {
        let format = self.output_format()?;

        let output = match &self.output {
            Some(path) => path,
            None => return Ok(Box::new(SvgRenderer::new(BufWriter::new(io::stdout())))),
        };

        Ok(match format {
            OutputFormat::Svg => Box::new(SvgRenderer::new(BufWriter::new(File::create(output)?))),
            OutputFormat::Pdf => Box::new(PdfRenderer::new(File::create(output)?, &self.title)),
            OutputFormat::Png => {
                let mut renderer = PngRenderer::new(self.raster_dpi)?.save_to(output);
                if let Some(font_file) = &self.font_file {
                    renderer = renderer.with_font(font_file)?;
                }
                Box::new(renderer)
            }
        })
    }

    /// Builds the mosaic described by the configuration.
    pub fn build(&self) -> Result<Summary> {
        let grid = self.validate()?;

        let mask = match &self.mask {
            Some(path) => Some(Mask::open(
                path,
                self.mask_dpi,
                self.mask_scale,
                self.alpha_threshold,
            )?),
            None => None,
        };

        let files = match find_files(&self.source, &self.extensions) {
            Ok(files) => files,
            Err(e) => {
                warn!("problems searching files: {}", e);
                vec![]
            }
        };

        let extracted = extract(&files);
        let mut renderer = self.renderer()?;

        let canvas = Rect::from_size(Point {
            x: self.width,
            y: self.height,
        });
        let sampler = Sampler::new(mask.as_ref(), &canvas, self.metrics(), self.sample_mode());
        let mosaic = Mosaic::new(&grid, sampler, self.foreground);
        let page = Page::new(&grid, self.background, &self.font_name);

        let stats = mosaic.render(&extracted.text, &page, renderer.as_mut())?;

        Ok(Summary {
            output: self.output.clone(),
            files: extracted.files,
            stats,
            warnings: extracted.warnings,
        })
    }
}
