//! This crate contains all the tools we need to turn a source tree into a typographic mosaic.

#![warn(missing_docs)]

#[macro_use]
extern crate log;

pub mod color;
pub mod config;
pub mod geometry;
pub mod layout;
pub mod mask;
pub mod mosaic;
pub mod render;
pub mod text;
pub mod units;

#[cfg(test)]
mod tests;

use std::path::PathBuf;
use std::{error, fmt, io, result};

use crate::layout::errors::ConfigError;

macro_rules! impl_from_error {
    ($type: ty, $variant: path, $from: ty) => {
        impl From<$from> for $type {
            fn from(e: $from) -> $type {
                $variant(e)
            }
        }
    };
}

/// The error type of the library.
#[derive(Debug)]
pub enum Error {
    /// Cannot read current directory.
    CannotReadCurrentDir,

    /// No codemosaic.toml was found.
    NoConfigFile,

    /// The configuration cannot produce a mosaic.
    InvalidConfig(ConfigError),

    /// The mask image could not be opened or decoded.
    Mask(PathBuf, image::ImageError),

    /// The output path has an extension we cannot encode.
    UnsupportedOutput(PathBuf),

    /// Error while dealing with freetype.
    FreetypeError(freetype::Error),

    /// Error while dealing with printpdf.
    PrintpdfError(printpdf::errors::Error),

    /// Error while encoding or decoding an image.
    ImageError(image::ImageError),

    /// The configuration file is not valid toml.
    TomlDeError(toml::de::Error),

    /// The configuration could not be written as toml.
    TomlSerError(toml::ser::Error),

    /// Another io error occured.
    IoError(io::Error),
}

impl_from_error!(Error, Error::InvalidConfig, ConfigError);
impl_from_error!(Error, Error::FreetypeError, freetype::Error);
impl_from_error!(Error, Error::PrintpdfError, printpdf::errors::Error);
impl_from_error!(Error, Error::ImageError, image::ImageError);
impl_from_error!(Error, Error::TomlDeError, toml::de::Error);
impl_from_error!(Error, Error::TomlSerError, toml::ser::Error);
impl_from_error!(Error, Error::IoError, io::Error);

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::CannotReadCurrentDir => write!(fmt, "cannot read current directory"),
            Error::NoConfigFile => write!(fmt, "no codemosaic.toml was found"),
            Error::InvalidConfig(e) => write!(fmt, "invalid configuration: {}", e),
            Error::Mask(path, e) => write!(fmt, "cannot load mask \"{}\": {}", path.display(), e),
            Error::UnsupportedOutput(path) => write!(
                fmt,
                "cannot guess the output format of \"{}\", expected .svg, .pdf or .png",
                path.display()
            ),
            Error::FreetypeError(e) => write!(fmt, "freetype error: {}", e),
            Error::PrintpdfError(e) => write!(fmt, "printpdf error: {}", e),
            Error::ImageError(e) => write!(fmt, "image error: {}", e),
            Error::TomlDeError(e) => write!(fmt, "cannot parse configuration: {}", e),
            Error::TomlSerError(e) => write!(fmt, "cannot write configuration: {}", e),
            Error::IoError(e) => write!(fmt, "an io error occured: {}", e),
        }
    }
}

impl error::Error for Error {}

/// The result type of the library.
pub type Result<T> = result::Result<T, Error>;
