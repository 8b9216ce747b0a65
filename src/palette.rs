//! Highlight colors
//!
//! The walker tags every span with a [`ColorRole`]; the [`Palette`] maps each
//! role to the ARGB value sent to the editor. A palette is built once at
//! startup and never changes afterwards.

use std::fmt;

/// ARGB color (0-255 per channel)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Create a new color from RGB values (alpha defaults to 255)
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { a: 255, r, g, b }
    }

    /// Create a new color from ARGB values
    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    /// Pack into the `AARRGGBB` integer the editor expects
    pub fn to_argb_u32(&self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }

    /// Parse from "RRGGBB" or "AARRGGBB" hex string (leading '#' optional)
    pub fn from_hex(s: &str) -> Result<Self, String> {
        let s = s.trim_start_matches('#');
        if !s.is_ascii() {
            return Err(format!("Invalid color format: {}", s));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&s[range], 16).map_err(|e| format!("Invalid color {}: {}", s, e))
        };
        match s.len() {
            6 => Ok(Color::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Ok(Color::argb(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => Err(format!("Invalid color format: {}", s)),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.to_argb_u32())
    }
}

/// The five highlight categories a span can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorRole {
    /// Bare identifiers and placeholder nodes
    Identifier,
    /// Numeric, string and rune literals
    Literal,
    /// Field names, declared type names, parameter names, struct-literal keys
    Field,
    /// Default text color; reserved, the walker never emits it
    Punctuation,
    /// `package`, `import`, `const`, `type`, `var`, `struct`, `interface`
    Keyword,
}

impl ColorRole {
    pub const ALL: [ColorRole; 5] = [
        ColorRole::Identifier,
        ColorRole::Literal,
        ColorRole::Field,
        ColorRole::Punctuation,
        ColorRole::Keyword,
    ];
}

/// Immutable role -> color table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub identifier: Color,
    pub literal: Color,
    pub field: Color,
    pub punctuation: Color,
    pub keyword: Color,
}

impl Palette {
    pub fn color(&self, role: ColorRole) -> Color {
        match role {
            ColorRole::Identifier => self.identifier,
            ColorRole::Literal => self.literal,
            ColorRole::Field => self.field,
            ColorRole::Punctuation => self.punctuation,
            ColorRole::Keyword => self.keyword,
        }
    }

    /// Wire value for a role
    pub fn fg(&self, role: ColorRole) -> u32 {
        self.color(role).to_argb_u32()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            identifier: Color::argb(0xff, 0x32, 0x33, 0x33),
            literal: Color::argb(0xff, 0x18, 0x37, 0x92),
            field: Color::argb(0xff, 0xed, 0x6a, 0x43),
            punctuation: Color::argb(0xff, 0x96, 0x98, 0x9f),
            keyword: Color::argb(0xff, 0xa7, 0x1e, 0x77),
        }
    }
}
