//! Text outlining with system fonts.
//!
//! Faces are looked up in a `fontdb` database and outlined with `rusttype`
//! into kurbo paths, so the rasterizer only ever fills paths.

use crate::paint::{TextAlign, TextRun};
use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use kurbo::{BezPath, Point};
use rusttype::{Font, OutlineBuilder, Scale, point as rt_point};
use std::collections::{HashMap, HashSet};

#[derive(Clone, PartialEq, Eq, Hash)]
struct FontKey {
    family: String,
    bold: bool,
    italic: bool,
}

/// Resolved faces keyed by family and style. Misses are cached too.
pub struct FontBook {
    db: Database,
    cache: HashMap<FontKey, Option<Font<'static>>>,
    warned: HashSet<String>,
}

impl FontBook {
    /// A book over the fonts installed on this machine.
    pub fn system() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        log::debug!("Loaded {} font faces", db.len());
        Self::with_database(db)
    }

    /// A book with no fonts; every text run is skipped.
    pub fn empty() -> Self {
        Self::with_database(Database::new())
    }

    pub fn with_database(db: Database) -> Self {
        Self {
            db,
            cache: HashMap::new(),
            warned: HashSet::new(),
        }
    }

    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    fn font(&mut self, family: &str, bold: bool, italic: bool) -> Option<&Font<'static>> {
        let key = FontKey {
            family: family.to_string(),
            bold,
            italic,
        };
        if !self.cache.contains_key(&key) {
            let loaded = load_font(&self.db, family, bold, italic);
            if loaded.is_none() && self.warned.insert(family.to_string()) {
                log::warn!("No font face for family {:?}, text will not be drawn", family);
            }
            self.cache.insert(key.clone(), loaded);
        }
        self.cache.get(&key).and_then(Option::as_ref)
    }

    /// Glyph outlines for `run` in page coordinates, or `None` when no face
    /// is available.
    pub fn outline(&mut self, run: &TextRun) -> Option<BezPath> {
        let font = self.font(&run.font_family, run.bold, run.italic)?;
        let scale = Scale::uniform(run.font_size as f32);
        let ascent = f64::from(font.v_metrics(scale).ascent);

        let mut path = BezPath::new();
        for (i, line) in run.lines.iter().enumerate() {
            let baseline = run.anchor.y + i as f64 * run.font_size + ascent;
            let x = match run.align {
                TextAlign::Left => run.anchor.x,
                TextAlign::Center => run.anchor.x - line_width(font, line, scale) / 2.0,
            };
            let start = rt_point(x as f32, baseline as f32);
            let mut sink = PathSink(&mut path);
            for glyph in font.layout(line, scale, start) {
                glyph.build_outline(&mut sink);
            }
        }
        Some(path)
    }
}

fn load_font(db: &Database, family: &str, bold: bool, italic: bool) -> Option<Font<'static>> {
    let families = [Family::Name(family), Family::SansSerif];
    let query = Query {
        families: &families,
        weight: if bold { Weight::BOLD } else { Weight::NORMAL },
        stretch: Stretch::Normal,
        style: if italic { Style::Italic } else { Style::Normal },
    };
    let id = db.query(&query)?;
    db.with_face_data(id, |data, index| Font::try_from_vec_and_index(data.to_vec(), index))
        .flatten()
}

/// Advance width of one laid-out line.
fn line_width(font: &Font<'_>, line: &str, scale: Scale) -> f64 {
    font.layout(line, scale, rt_point(0.0, 0.0))
        .last()
        .map(|g| f64::from(g.position().x + g.unpositioned().h_metrics().advance_width))
        .unwrap_or(0.0)
}

/// Collects positioned glyph outlines into a kurbo path.
struct PathSink<'a>(&'a mut BezPath);

impl OutlineBuilder for PathSink<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        self.0.move_to(pt(x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.0.line_to(pt(x, y));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.0.quad_to(pt(x1, y1), pt(x, y));
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.0.curve_to(pt(x1, y1), pt(x2, y2), pt(x, y));
    }

    fn close(&mut self) {
        self.0.close_path();
    }
}

fn pt(x: f32, y: f32) -> Point {
    Point::new(f64::from(x), f64::from(y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagemark_core::color::SerializableColor;

    fn run(family: &str, align: TextAlign) -> TextRun {
        TextRun {
            anchor: Point::new(10.0, 20.0),
            lines: vec!["Door".into(), "Window".into()],
            font_size: 16.0,
            font_family: family.into(),
            bold: false,
            italic: false,
            align,
            fill: SerializableColor::black(),
            outline: None,
        }
    }

    #[test]
    fn test_empty_book_skips_text() {
        let mut book = FontBook::empty();
        assert_eq!(book.face_count(), 0);
        assert!(book.outline(&run("Inter", TextAlign::Left)).is_none());
        // The miss is cached.
        assert_eq!(book.cache.len(), 1);
        assert!(book.outline(&run("Inter", TextAlign::Left)).is_none());
        assert_eq!(book.cache.len(), 1);
        assert_eq!(book.warned.len(), 1);
    }

    #[test]
    fn test_system_outline_stays_near_anchor() {
        let mut book = FontBook::system();
        let Some(path) = book.outline(&run("Arial", TextAlign::Left)) else {
            // No fonts installed on this machine.
            return;
        };
        let bounds = kurbo::Shape::bounding_box(&path);
        assert!(bounds.x0 >= 9.0);
        assert!(bounds.y0 >= 18.0);
        // Two lines of 16px text.
        assert!(bounds.y1 <= 20.0 + 2.0 * 16.0 + 8.0);

        let centered = book
            .outline(&run("Arial", TextAlign::Center))
            .map(|p| kurbo::Shape::bounding_box(&p));
        if let Some(c) = centered {
            assert!(c.x0 < 10.0 && c.x1 > 10.0);
        }
    }
}
