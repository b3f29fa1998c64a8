//! Glyph decoding and the glyph database
//!
//! Each glyph is a string of two-character pairs, every character offset by
//! `'R'`:
//!
//! - the first pair holds the left and right advance bounds
//! - `" R"` lifts the pen and starts a new stroke
//! - any other pair is a point; Y carries an extra offset of -10 so the
//!   baseline decodes to zero
//!
//! Decoded coordinates are in units of the glyph size: capitals span
//! roughly `-1..0` in Y (Y grows downward) and descenders go below zero.

use std::sync::OnceLock;

use copper_core::{Box2, Vector2};

use crate::simplex::SIMPLEX_GLYPHS;

/// Scale of one encoded unit
pub const STROKE_FONT_SCALE: f64 = 1.0 / 21.0;

/// Y offset applied to every decoded point
pub const FONT_OFFSET: i32 = -10;

const DECODE_BASE: u8 = b'R';

const PEN_UP: &[u8] = b" R";

/// One pen-down polyline
pub type Stroke = Vec<Vector2>;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Glyph {
    strokes: Vec<Stroke>,
    bbox: Box2,
}

static EMPTY_GLYPH: Glyph = Glyph {
    strokes: Vec::new(),
    bbox: Box2::new(Vector2::ZERO, Vector2::ZERO),
};

fn decode(c: u8) -> f64 {
    (c as i32 - DECODE_BASE as i32) as f64 * STROKE_FONT_SCALE
}

impl Glyph {
    /// Decode one glyph string
    ///
    /// A trailing unpaired character is ignored.
    pub fn parse(encoded: &str) -> Glyph {
        let mut pairs = encoded.as_bytes().chunks_exact(2);

        let (start_x, end_x) = match pairs.next() {
            Some(bounds) => (decode(bounds[0]), decode(bounds[1])),
            None => (0.0, 0.0),
        };

        let mut strokes = Vec::new();
        let mut current: Stroke = Vec::new();
        for pair in pairs {
            if pair == PEN_UP {
                if !current.is_empty() {
                    strokes.push(std::mem::take(&mut current));
                }
                continue;
            }

            let x = decode(pair[0]) - start_x;
            let y = (pair[1] as i32 - DECODE_BASE as i32 + FONT_OFFSET) as f64 * STROKE_FONT_SCALE;
            current.push(Vector2::new(x, y));
        }
        if !current.is_empty() {
            strokes.push(current);
        }

        let bbox = Self::compute_bbox(&strokes, end_x - start_x);
        Glyph { strokes, bbox }
    }

    /// X spans the advance, Y spans every point and the baseline
    fn compute_bbox(strokes: &[Stroke], advance: f64) -> Box2 {
        let mut points = vec![Vector2::ZERO, Vector2::new(advance, 0.0)];
        points.extend(
            strokes
                .iter()
                .flatten()
                .map(|p| Vector2::new(0.0, p.y)),
        );
        Box2::compute(&points)
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn bbox(&self) -> Box2 {
        self.bbox
    }

    /// Horizontal advance in glyph units
    pub fn advance(&self) -> f64 {
        self.bbox.end().x
    }
}

/// Glyphs indexed by character code minus `' '`
#[derive(Clone, Debug, Default)]
pub struct GlyphDatabase {
    glyphs: Vec<Glyph>,
}

impl GlyphDatabase {
    /// Decode a glyph table whose first entry is `' '`
    pub fn load(table: &[&str]) -> Self {
        let glyphs: Vec<Glyph> = table.iter().map(|entry| Glyph::parse(entry)).collect();
        tracing::debug!("loaded {} stroke font glyphs", glyphs.len());
        Self { glyphs }
    }

    /// Process-wide database built from the bundled simplex table
    pub fn builtin() -> &'static GlyphDatabase {
        static BUILTIN: OnceLock<GlyphDatabase> = OnceLock::new();
        BUILTIN.get_or_init(|| Self::load(&SIMPLEX_GLYPHS))
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Glyph for `c`; characters outside the table use the glyph for `?`
    pub fn glyph(&self, c: char) -> &Glyph {
        let index = (c as u32)
            .checked_sub(' ' as u32)
            .map(|i| i as usize)
            .filter(|&i| i < self.glyphs.len())
            .unwrap_or(('?' as u32 - ' ' as u32) as usize);

        self.glyphs.get(index).unwrap_or(&EMPTY_GLYPH)
    }
}
