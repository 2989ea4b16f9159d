//! Color types for terminal rendering.
//!
//! The encoder emits named and 256-color palette SGR codes. RGB values are
//! accepted at the API surface but are downgraded to the nearest palette
//! entry before emission (truecolor output is a documented limitation).

use crate::error::{Result, TesselError};

/// A terminal color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Color {
    /// True color RGB. Downgraded to the 256-color palette on output.
    Rgb {
        /// Red component.
        r: u8,
        /// Green component.
        g: u8,
        /// Blue component.
        b: u8,
    },
    /// 256-color palette index.
    Indexed(u8),
    /// Named ANSI color.
    Named(NamedColor),
    /// Reset to terminal default.
    Reset,
}

/// The sixteen colors of the base terminal palette.
///
/// Variants are declared in palette order: the dim colors first, then
/// their bright counterparts. [`NamedColor::index`] recovers the palette
/// number, which is also what the SGR code arithmetic builds on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum NamedColor {
    /// Dim black.
    Black,
    /// Dim red.
    Red,
    /// Dim green.
    Green,
    /// Dim yellow.
    Yellow,
    /// Dim blue.
    Blue,
    /// Dim magenta.
    Magenta,
    /// Dim cyan.
    Cyan,
    /// Dim white (light gray on most terminals).
    White,
    /// Bright black (dark gray on most terminals).
    BrightBlack,
    /// Bright red.
    BrightRed,
    /// Bright green.
    BrightGreen,
    /// Bright yellow.
    BrightYellow,
    /// Bright blue.
    BrightBlue,
    /// Bright magenta.
    BrightMagenta,
    /// Bright cyan.
    BrightCyan,
    /// Bright white.
    BrightWhite,
}

impl NamedColor {
    /// Index of this color in the 16-entry palette (0-7 dim, 8-15 bright).
    pub const fn index(self) -> u8 {
        self as u8
    }
}

impl Color {
    /// Normalize for emission: RGB becomes the nearest 256-color index.
    pub fn to_palette(self) -> Color {
        match self {
            Color::Rgb { r, g, b } => Color::Indexed(rgb_to_256(r, g, b)),
            other => other,
        }
    }

    /// Parse a hex color string like `"#rrggbb"` or `"#rgb"`.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let channel = |s: &str| {
            u8::from_str_radix(s, 16)
                .map_err(|e| TesselError::InvalidStyle(format!("invalid hex color: {e}")))
        };
        match hex.len() {
            6 => Ok(Self::Rgb {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
            }),
            3 => Ok(Self::Rgb {
                r: channel(&hex[0..1])? * 17,
                g: channel(&hex[1..2])? * 17,
                b: channel(&hex[2..3])? * 17,
            }),
            _ => Err(TesselError::InvalidStyle(format!(
                "invalid hex color length: expected 3 or 6, got {}",
                hex.len()
            ))),
        }
    }
}

/// SGR code selecting a palette color as the foreground.
///
/// The dim colors occupy codes 30-37 and the bright ones 90-97, in
/// palette order, so the code falls out of the index.
pub(crate) fn named_fg_code(color: NamedColor) -> u8 {
    let i = color.index();
    if i < 8 {
        30 + i
    } else {
        90 + (i - 8)
    }
}

/// SGR code selecting a palette color as the background (foreground + 10).
pub(crate) fn named_bg_code(color: NamedColor) -> u8 {
    named_fg_code(color) + 10
}

/// Return the SGR parameter codes for a foreground color (no ESC[ or m).
pub(crate) fn fg_color_codes(color: Color) -> Vec<String> {
    match color.to_palette() {
        Color::Indexed(i) => vec!["38".into(), "5".into(), i.to_string()],
        Color::Named(n) => vec![named_fg_code(n).to_string()],
        Color::Reset => vec!["39".into()],
        // to_palette never returns Rgb
        Color::Rgb { .. } => vec!["39".into()],
    }
}

/// Return the SGR parameter codes for a background color (no ESC[ or m).
pub(crate) fn bg_color_codes(color: Color) -> Vec<String> {
    match color.to_palette() {
        Color::Indexed(i) => vec!["48".into(), "5".into(), i.to_string()],
        Color::Named(n) => vec![named_bg_code(n).to_string()],
        Color::Reset => vec!["49".into()],
        Color::Rgb { .. } => vec!["49".into()],
    }
}

/// Convert RGB to the nearest 256-color palette index.
///
/// The palette is: 0-15 standard colors, 16-231 a 6x6x6 color cube,
/// 232-255 a grayscale ramp. Near-gray inputs map onto the ramp, everything
/// else quantizes into the cube.
pub fn rgb_to_256(r: u8, g: u8, b: u8) -> u8 {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);

    // Grayscale ramp for low-saturation colors.
    if max - min < 12 {
        let gray = (u16::from(r) + u16::from(g) + u16::from(b)) / 3;
        if gray < 4 {
            return 16; // cube black
        }
        if gray > 246 {
            return 231; // cube white
        }
        return 232 + ((gray - 8) / 10).min(23) as u8;
    }

    let quantize = |c: u8| -> u8 {
        if c < 48 {
            0
        } else if c < 115 {
            1
        } else {
            ((u16::from(c) - 35) / 40) as u8
        }
    };
    16 + 36 * quantize(r) + 6 * quantize(g) + quantize(b)
}

// Crossterm conversions so a host shell can hand colors straight through.
// Crossterm's named variants remix the dim/bright naming (its bare `Red`
// is the bright one), so palette colors go over as their index instead;
// `AnsiValue` 0-15 resolves to the same entries on every terminal.

impl From<Color> for crossterm::style::Color {
    fn from(color: Color) -> Self {
        match color {
            Color::Rgb { r, g, b } => crossterm::style::Color::Rgb { r, g, b },
            Color::Indexed(i) => crossterm::style::Color::AnsiValue(i),
            Color::Named(n) => crossterm::style::Color::AnsiValue(n.index()),
            Color::Reset => crossterm::style::Color::Reset,
        }
    }
}

impl From<&Color> for crossterm::style::Color {
    fn from(color: &Color) -> Self {
        (*color).into()
    }
}
