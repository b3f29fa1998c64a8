//! Copper Stroke Font
//!
//! Vector text for CAD views. Glyphs are Hershey-style stroke sequences
//! decoded from a compact two-character encoding, and text is drawn as GAL
//! polylines so it scales, rotates and mirrors with the rest of the scene.
//!
//! # Example
//!
//! ```rust
//! use copper_core::{Gal, RecordingGal, Vector2};
//! use copper_font::StrokeFont;
//!
//! let mut gal = RecordingGal::new();
//! gal.set_glyph_size(Vector2::new(10.0, 10.0));
//! gal.begin_drawing();
//! StrokeFont::new().draw(&mut gal, "~RESET~", Vector2::ZERO, 0.0);
//! gal.end_drawing();
//!
//! assert!(gal.commands().iter().any(|c| c.is_line()));
//! ```

pub mod font;
pub mod glyph;
pub mod simplex;

pub use font::{
    StrokeFont, TextExtents, BOLD_FACTOR, INTERLINE_PITCH_RATIO, ITALIC_TILT,
    OVERBAR_POSITION_FACTOR,
};
pub use glyph::{Glyph, GlyphDatabase, Stroke, FONT_OFFSET, STROKE_FONT_SCALE};
