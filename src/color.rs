//! Colors of the glyphs and of the background.
//!
//! Colors are written the way they are in CSS: `#rgb`, `#rrggbb` or `#rrggbbaa`. The words
//! `none` and `transparent` give a fully transparent color.

// Allow redundant closure because of nom.
#![allow(clippy::redundant_closure)]

use std::fmt;
use std::str::FromStr;

use nom::branch::alt;
use nom::bytes::complete::{tag, tag_no_case, take_while_m_n};
use nom::combinator::{all_consuming, map, map_res, opt, value};
use nom::sequence::{preceded, tuple};
use nom::IResult;
use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};

/// An RGBA color with 8 bits per channel.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Color {
    /// The red channel.
    pub r: u8,

    /// The green channel.
    pub g: u8,

    /// The blue channel.
    pub b: u8,

    /// The alpha channel, 255 being opaque.
    pub a: u8,
}

impl Color {
    /// Opaque black, used for the glyphs covered by the mask in monochrome mode.
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    /// Opaque white.
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Opaque red, used to show the glyphs that missed the mask in debug mode.
    pub const RED: Color = Color::rgb(255, 0, 0);

    /// Fully transparent.
    pub const TRANSPARENT: Color = Color {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    /// Creates an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b, a: 255 }
    }

    /// Creates an opaque color from 16 bit channels that are already multiplied by alpha.
    ///
    /// The alpha is dropped: a half transparent white becomes an opaque gray.
    pub fn from_premultiplied16(r: u32, g: u32, b: u32) -> Color {
        Color::rgb((r / 257) as u8, (g / 257) as u8, (b / 257) as u8)
    }

    /// Returns the channels of the color as an array, in RGBA order.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Returns the channels of the color in the [0, 1] range, in RGB order.
    pub fn to_unit_rgb(self) -> (f64, f64, f64) {
        (
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        )
    }

    /// Blends the color over `background` with an extra coverage in [0, 255].
    pub fn over(self, background: Color, coverage: u8) -> Color {
        let alpha = u32::from(self.a) * u32::from(coverage) / 255;
        let mix = |fg: u8, bg: u8| -> u8 {
            ((u32::from(fg) * alpha + u32::from(bg) * (255 - alpha)) / 255) as u8
        };

        Color {
            r: mix(self.r, background.r),
            g: mix(self.g, background.g),
            b: mix(self.b, background.b),
            a: (alpha + u32::from(background.a) * (255 - alpha) / 255) as u8,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        if self.a == 255 {
            write!(fmt, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(
                fmt,
                "#{:02x}{:02x}{:02x}{:02x}",
                self.r, self.g, self.b, self.a
            )
        }
    }
}

/// The error returned when a color cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError(pub String);

impl fmt::Display for ParseColorError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(
            fmt,
            "invalid color \"{}\", expected #rgb, #rrggbb or #rrggbbaa",
            self.0
        )
    }
}

impl std::error::Error for ParseColorError {}

fn hex_pair(input: &str) -> IResult<&str, u8> {
    map_res(take_while_m_n(2, 2, |c: char| c.is_ascii_hexdigit()), |x| {
        u8::from_str_radix(x, 16)
    })(input)
}

fn hex_digit(input: &str) -> IResult<&str, u8> {
    map_res(take_while_m_n(1, 1, |c: char| c.is_ascii_hexdigit()), |x| {
        u8::from_str_radix(x, 16).map(|v| v * 17)
    })(input)
}

/// Parses a `#rrggbb` or `#rrggbbaa` color.
fn parse_long(input: &str) -> IResult<&str, Color> {
    map(
        tuple((hex_pair, hex_pair, hex_pair, opt(hex_pair))),
        |(r, g, b, a)| Color {
            r,
            g,
            b,
            a: a.unwrap_or(255),
        },
    )(input)
}

/// Parses a `#rgb` color.
fn parse_short(input: &str) -> IResult<&str, Color> {
    map(tuple((hex_digit, hex_digit, hex_digit)), |(r, g, b)| {
        Color::rgb(r, g, b)
    })(input)
}

/// Parses a color.
///
/// ```
/// # use codemosaic::color::{parse_color, Color};
/// assert_eq!(parse_color("#808080").unwrap().1, Color::rgb(128, 128, 128));
/// assert_eq!(parse_color("#f00").unwrap().1, Color::RED);
/// ```
pub fn parse_color(input: &str) -> IResult<&str, Color> {
    alt((
        preceded(
            tag("#"),
            alt((all_consuming(parse_long), all_consuming(parse_short))),
        ),
        value(Color::TRANSPARENT, tag_no_case("transparent")),
        value(Color::TRANSPARENT, tag_no_case("none")),
    ))(input)
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Color, ParseColorError> {
        match all_consuming(parse_color)(s.trim()) {
            Ok((_, color)) => Ok(color),
            Err(_) => Err(ParseColorError(s.to_owned())),
        }
    }
}

/// Serializes a `Color` as its hexadecimal notation.
// This is required to use in macro `serialize_with`.
#[allow(clippy::trivially_copy_pass_by_ref)]
pub fn serialize_color<S: Serializer>(color: &Color, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&color.to_string())
}

/// Deserializes a `Color` from its textual notation.
pub fn deserialize_color<'a, D: Deserializer<'a>>(deserializer: D) -> Result<Color, D::Error> {
    deserializer.deserialize_str(ColorVisitor)
}

/// Visitor for the `Color` structure.
pub struct ColorVisitor;

impl<'a> Visitor<'a> for ColorVisitor {
    type Value = Color;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a color such as \"#808080\"")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        value.parse().map_err(E::custom)
    }
}
