//! This module gathers the text of a source tree.
//!
//! Files are found by extension, read line by line, and every line is condensed so that the
//! whole tree becomes a single line of text with single spaces.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use colored::*;
use walkdir::WalkDir;

use crate::Result;

/// Trims a line and collapses its runs of ASCII whitespace into single spaces.
///
/// Unicode spaces are trimmed at both ends but kept inside the line.
///
/// ```
/// # use codemosaic::text::condense;
/// assert_eq!(condense("  let   x =\t1;  "), "let x = 1;");
/// assert_eq!(condense(" \t "), "");
/// ```
pub fn condense(line: &str) -> String {
    line.trim()
        .split_ascii_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns true if the path has one of the extensions.
fn has_extension(path: &Path, extensions: &[String]) -> bool {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => extensions.iter().any(|e| e.trim_start_matches('.') == ext),
        None => false,
    }
}

/// Finds the files under `root` that have one of the extensions, sorted by path.
///
/// If `root` is a file, it is returned as is.
pub fn find_files<P: AsRef<Path>>(root: P, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();

    if root.is_file() {
        return Ok(vec![root.to_owned()]);
    }

    let mut files = vec![];
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            io::Error::new(io::ErrorKind::Other, format!("cannot walk {}: {}", root.display(), e))
        })?;

        if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
            files.push(entry.into_path());
        }
    }

    debug!("found {} files under {}", files.len(), root.display());
    Ok(files)
}

/// The text of a source tree.
#[derive(Debug)]
pub struct Extracted {
    /// The condensed text, lines separated by single spaces.
    pub text: String,

    /// The number of files that were read.
    pub files: usize,

    /// The files that could not be read.
    pub warnings: Warnings,
}

/// Reads the files in order and joins their condensed, non empty lines.
///
/// Files that cannot be read are skipped and reported in the warnings. Invalid UTF-8 is
/// replaced rather than rejected.
pub fn extract<P: AsRef<Path>>(files: &[P]) -> Extracted {
    let mut text = String::new();
    let mut read = 0;
    let mut warnings = Warnings::default();

    for path in files {
        let path = path.as_ref();
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("failed to read {}: {}", path.display(), e);
                warnings.push(path, e);
                continue;
            }
        };

        read += 1;
        for line in String::from_utf8_lossy(&bytes).lines() {
            let line = condense(line);
            if line.is_empty() {
                continue;
            }

            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(&line);
        }
    }

    info!(
        "extracted {} chars from {} files",
        text.chars().count(),
        read
    );

    Extracted {
        text,
        files: read,
        warnings,
    }
}

/// A file that could not be read.
#[derive(Debug)]
pub struct Warning {
    /// The path to the file.
    pub path: PathBuf,

    /// Why it could not be read.
    pub error: io::Error,
}

/// The files that were skipped while extracting text.
#[derive(Debug, Default)]
pub struct Warnings {
    /// The warnings produced.
    pub warnings: Vec<Warning>,
}

impl Warnings {
    /// Adds a warning.
    pub fn push(&mut self, path: &Path, error: io::Error) {
        self.warnings.push(Warning {
            path: path.to_owned(),
            error,
        });
    }

    /// Returns true if no file was skipped.
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }
}

impl fmt::Display for Warnings {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        for warning in &self.warnings {
            writeln!(
                fmt,
                "{}{}",
                "warning: ".bold().yellow(),
                "cannot read source file".bold()
            )?;
            writeln!(fmt, " {} {}", "-->".bold().blue(), warning.path.display())?;
            writeln!(
                fmt,
                "  {} {}{}",
                "=".blue().bold(),
                "note: ".bold(),
                warning.error
            )?;
        }

        Ok(())
    }
}
