//! Text annotations.

use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Approximate advance of one character, as a fraction of the font size.
const CHAR_ADVANCE_EM: f64 = 0.6;

/// Placeholder width used for empty text so it stays clickable.
const EMPTY_WIDTH_EM: f64 = 4.0;

/// Bold/italic combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FontStyle {
    pub bold: bool,
    pub italic: bool,
}

impl FontStyle {
    pub const NORMAL: FontStyle = FontStyle {
        bold: false,
        italic: false,
    };

    pub fn toggle_bold(self) -> Self {
        Self {
            bold: !self.bold,
            ..self
        }
    }

    pub fn toggle_italic(self) -> Self {
        Self {
            italic: !self.italic,
            ..self
        }
    }

    /// Parse `normal`, `bold`, `italic`, `bold italic` (any order, any case).
    pub fn parse(value: &str) -> Self {
        let lower = value.to_ascii_lowercase();
        Self {
            bold: lower.contains("bold"),
            italic: lower.contains("italic"),
        }
    }
}

impl fmt::Display for FontStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match (self.bold, self.italic) {
            (false, false) => "normal",
            (true, false) => "bold",
            (false, true) => "italic",
            (true, true) => "bold italic",
        })
    }
}

impl Serialize for FontStyle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FontStyle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::parse(&String::deserialize(deserializer)?))
    }
}

fn default_font_size() -> f64 {
    16.0
}

/// Family for new text and for measurement and angle labels.
pub const DEFAULT_FONT_FAMILY: &str = "Inter";

fn default_font_family() -> String {
    DEFAULT_FONT_FAMILY.to_string()
}

/// A text annotation anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default)]
    pub font_style: FontStyle,
}

impl Text {
    pub fn new(origin: Point, font_size: f64, font_family: impl Into<String>) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            text: String::new(),
            font_size,
            font_family: font_family.into(),
            font_style: FontStyle::NORMAL,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }

    /// Estimated layout box. Line height equals the font size.
    pub fn bounds(&self) -> Rect {
        let longest = self.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        let line_count = self.lines().count().max(1);
        let width = if longest == 0 {
            self.font_size * EMPTY_WIDTH_EM
        } else {
            longest as f64 * self.font_size * CHAR_ADVANCE_EM
        };
        Rect::from_origin_size(
            self.origin(),
            (width, line_count as f64 * self.font_size),
        )
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    /// Move the origin and scale the font by the transform's vertical factor.
    pub fn transform(&mut self, affine: Affine) {
        let origin = affine * self.origin();
        let scale = affine.as_coeffs()[3].abs();
        self.x = origin.x;
        self.y = origin.y;
        if scale > f64::EPSILON {
            self.font_size *= scale;
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_style_roundtrip() {
        for style in ["normal", "bold", "italic", "bold italic"] {
            assert_eq!(FontStyle::parse(style).to_string(), style);
        }
        assert_eq!(FontStyle::parse("italic bold").to_string(), "bold italic");
    }

    #[test]
    fn test_toggles() {
        let style = FontStyle::NORMAL.toggle_bold().toggle_italic().toggle_bold();
        assert!(!style.bold);
        assert!(style.italic);
    }

    #[test]
    fn test_bounds_grow_with_content() {
        let mut text = Text::new(Point::new(10.0, 20.0), 10.0, "Inter");
        let empty = text.bounds();
        assert!((empty.width() - 40.0).abs() < f64::EPSILON);
        text.text = "Kitchen\nSink".to_string();
        let filled = text.bounds();
        assert!((filled.width() - 42.0).abs() < 1e-9);
        assert!((filled.height() - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_blank_detection() {
        let mut text = Text::new(Point::ZERO, 10.0, "Inter");
        text.text = "  \n ".to_string();
        assert!(text.is_blank());
    }
}
