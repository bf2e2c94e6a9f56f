//! Hex colors and fill paints.
//!
//! Annotations persist colors as CSS-style hex strings. Fills may also be the
//! literal `"transparent"`, which means "no fill".

use peniko::Color;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Color parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("Invalid hex color: {0}")]
    InvalidHex(String),
}

/// Serializable color representation (RGBA8), stored as `#rrggbb` or `#rrggbbaa`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let digits = hex.trim().trim_start_matches('#');
        let invalid = || ColorError::InvalidHex(hex.to_string());
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
        match digits.len() {
            3 => {
                let nibble = |i: usize| {
                    u8::from_str_radix(&digits[i..i + 1], 16)
                        .map(|n| n * 17)
                        .map_err(|_| invalid())
                };
                Ok(Self::rgb(nibble(0)?, nibble(1)?, nibble(2)?))
            }
            6 => Ok(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Self::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(invalid()),
        }
    }

    /// Format as lowercase hex; the alpha pair is only written when not opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Same RGB with the alpha channel replaced by `alpha` in `[0, 1]`.
    pub fn with_alpha(self, alpha: f64) -> Self {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { a, ..self }
    }

    /// Alpha as a fraction in `[0, 1]`.
    pub fn alpha(&self) -> f64 {
        f64::from(self.a) / 255.0
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

impl fmt::Display for SerializableColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for SerializableColor {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for SerializableColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for SerializableColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_hex(&raw).map_err(serde::de::Error::custom)
    }
}

/// A fill: either nothing, or a solid color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Paint {
    #[default]
    Transparent,
    Solid(SerializableColor),
}

impl Paint {
    pub const TRANSPARENT_KEYWORD: &'static str = "transparent";

    /// Parse `"transparent"` or a hex color.
    pub fn parse(value: &str) -> Result<Self, ColorError> {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case(Self::TRANSPARENT_KEYWORD) {
            return Ok(Paint::Transparent);
        }
        SerializableColor::from_hex(value).map(Paint::Solid)
    }

    pub fn is_transparent(&self) -> bool {
        matches!(self, Paint::Transparent)
    }

    /// The translucent equivalent at `alpha`; transparent stays transparent.
    pub fn translucent(self, alpha: f64) -> Self {
        match self {
            Paint::Transparent => Paint::Transparent,
            Paint::Solid(color) => Paint::Solid(color.with_alpha(alpha)),
        }
    }

    pub fn solid(&self) -> Option<SerializableColor> {
        match self {
            Paint::Transparent => None,
            Paint::Solid(color) => Some(*color),
        }
    }

    pub fn color(&self) -> Option<Color> {
        self.solid().map(Color::from)
    }
}

impl From<SerializableColor> for Paint {
    fn from(color: SerializableColor) -> Self {
        Paint::Solid(color)
    }
}

impl fmt::Display for Paint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Paint::Transparent => f.write_str(Self::TRANSPARENT_KEYWORD),
            Paint::Solid(color) => f.write_str(&color.to_hex()),
        }
    }
}

impl FromStr for Paint {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Paint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Paint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Convert a hex color (or `"transparent"`) to its translucent equivalent.
pub fn translucent(value: &str, alpha: f64) -> Result<Paint, ColorError> {
    Ok(Paint::parse(value)?.translucent(alpha))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(
            SerializableColor::from_hex("#ef4444").unwrap(),
            SerializableColor::rgb(0xef, 0x44, 0x44)
        );
        assert_eq!(
            SerializableColor::from_hex("#fff").unwrap(),
            SerializableColor::white()
        );
        assert_eq!(
            SerializableColor::from_hex("00000080").unwrap(),
            SerializableColor::new(0, 0, 0, 0x80)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(SerializableColor::from_hex("#12345").is_err());
        assert!(SerializableColor::from_hex("#gggggg").is_err());
        assert!(SerializableColor::from_hex("red").is_err());
    }

    #[test]
    fn test_hex_roundtrip_keeps_alpha_only_when_needed() {
        let opaque = SerializableColor::rgb(1, 2, 3);
        assert_eq!(opaque.to_hex(), "#010203");
        let faded = opaque.with_alpha(0.5);
        assert_eq!(faded.to_hex(), "#01020380");
    }

    #[test]
    fn test_translucent_keeps_transparent() {
        assert_eq!(translucent("transparent", 0.4).unwrap(), Paint::Transparent);
    }

    #[test]
    fn test_translucent_replaces_alpha() {
        let paint = translucent("#3b82f6", 0.2).unwrap();
        let color = paint.solid().unwrap();
        assert_eq!((color.r, color.g, color.b), (0x3b, 0x82, 0xf6));
        assert_eq!(color.a, 51);
    }

    #[test]
    fn test_paint_serde() {
        let json = serde_json::to_string(&Paint::Transparent).unwrap();
        assert_eq!(json, "\"transparent\"");
        let solid: Paint = serde_json::from_str("\"#ABC\"").unwrap();
        assert_eq!(solid, Paint::Solid(SerializableColor::rgb(0xaa, 0xbb, 0xcc)));
    }

    #[test]
    fn test_peniko_conversion() {
        let color = SerializableColor::new(10, 20, 30, 40);
        let back = SerializableColor::from(Color::from(color));
        assert_eq!(color, back);
    }
}
