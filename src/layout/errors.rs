//! The errors relative to layouts.
use std::fmt;

use crate::units::Cm;

/// Detailed configuration errors.
///
/// They are all detected before anything is written, so a failed run never leaves a partial
/// output behind.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Case where not a single glyph fits between the margins.
    DegenerateRowWidth {
        /// The width of the canvas.
        canvas_width: Cm,

        /// The width of a glyph plus the spacing that follows it.
        advance: Cm,
    },

    /// Case where a resolution is zero; the name of the setting is attached.
    NonPositiveDpi(&'static str),

    /// Case where the mask would be scaled down to nothing.
    NonPositiveMaskScale(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::DegenerateRowWidth {
                canvas_width,
                advance,
            } => write!(
                fmt,
                "no glyph of width {} fits in a canvas of width {} once margins are applied",
                advance, canvas_width
            ),
            ConfigError::NonPositiveDpi(name) => write!(fmt, "{} must be positive", name),
            ConfigError::NonPositiveMaskScale(scale) => {
                write!(fmt, "mask scale must be positive, got {}", scale)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
