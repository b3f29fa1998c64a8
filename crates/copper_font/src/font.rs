//! Stroke font layout and rendering
//!
//! Text is drawn as polylines through any [`Gal`]. Glyph size, line width,
//! justification and the bold/italic/mirrored flags come from the GAL text
//! attributes. Layout works in the GAL's local coordinates with Y growing
//! downward: the baseline of the first line sits at the anchor (adjusted by
//! the vertical justification) and following lines move down.
//!
//! A `~` toggles the overbar for the characters after it; `~~` draws a
//! literal tilde.

use copper_core::{Gal, GalExt, HorizontalJustify, Vector2, VerticalJustify};

use crate::glyph::{Glyph, GlyphDatabase};

/// Line pitch as a multiple of the glyph height
pub const INTERLINE_PITCH_RATIO: f64 = 1.5;

/// Overbar height above the baseline as a multiple of the glyph height
pub const OVERBAR_POSITION_FACTOR: f64 = 1.22;

/// Line width multiplier for bold text
pub const BOLD_FACTOR: f64 = 1.3;

/// Horizontal shear per unit of height for italic text
pub const ITALIC_TILT: f64 = 1.0 / 8.0;

/// Size of one line of text
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextExtents {
    /// Advance sum times glyph width, plus line thickness and italic slant
    pub width: f64,
    pub height: f64,
    /// Largest glyph Y (the lowest point, Y grows downward)
    pub top: f64,
    /// Smallest glyph Y (the highest point)
    pub bottom: f64,
}

impl TextExtents {
    pub fn size(&self) -> Vector2 {
        Vector2::new(self.width, self.height)
    }
}

/// Stroke font renderer over a glyph database
#[derive(Clone, Copy, Debug)]
pub struct StrokeFont<'a> {
    glyphs: &'a GlyphDatabase,
    overbar_italic_compensation: bool,
}

impl Default for StrokeFont<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl StrokeFont<'static> {
    /// Font over the built-in simplex glyphs
    pub fn new() -> Self {
        Self::with_glyphs(GlyphDatabase::builtin())
    }
}

impl<'a> StrokeFont<'a> {
    pub fn with_glyphs(glyphs: &'a GlyphDatabase) -> Self {
        Self {
            glyphs,
            overbar_italic_compensation: true,
        }
    }

    pub fn glyphs(&self) -> &'a GlyphDatabase {
        self.glyphs
    }

    /// Shift the start of each italic overbar run by the slant at overbar
    /// height, so the bar lines up with the leaning glyphs
    ///
    /// This is a visual heuristic: only the first segment of a contiguous
    /// run moves, which keeps consecutive segments overlapping. Enabled by
    /// default; disable it to get bars spanning exactly the glyph advances.
    pub fn set_overbar_italic_compensation(&mut self, enabled: bool) {
        self.overbar_italic_compensation = enabled;
    }

    pub fn overbar_italic_compensation(&self) -> bool {
        self.overbar_italic_compensation
    }

    /// Distance between two baselines
    pub fn interline(glyph_height: f64, thickness: f64) -> f64 {
        glyph_height * INTERLINE_PITCH_RATIO + thickness
    }

    /// Distance from the baseline to the overbar axis
    pub fn overbar_position(glyph_height: f64, thickness: f64) -> f64 {
        glyph_height * OVERBAR_POSITION_FACTOR + thickness
    }

    pub fn lines_count(text: &str) -> usize {
        text.matches('\n').count() + 1
    }

    /// Draw possibly multiline text anchored at `position`
    ///
    /// `rotation_angle` is counterclockwise on screen, in radians. The GAL
    /// state is left exactly as it was.
    pub fn draw(&self, gal: &mut dyn Gal, text: &str, position: Vector2, rotation_angle: f64) {
        if text.is_empty() {
            return;
        }

        let mut gal = gal.scoped();
        gal.translate(position);
        gal.rotate(-rotation_angle);

        let glyph_size = gal.glyph_size();
        let line_height = Self::interline(glyph_size.y, gal.line_width());
        let line_count = Self::lines_count(text);
        let text_attributes = *gal.state().text();

        // align the first line
        match text_attributes.vertical_justify {
            VerticalJustify::Top => gal.translate(Vector2::new(0.0, glyph_size.y)),
            VerticalJustify::Center => gal.translate(Vector2::new(0.0, glyph_size.y / 2.0)),
            VerticalJustify::Bottom => {}
        }

        if line_count > 1 {
            let lines_below = (line_count - 1) as f64;
            match text_attributes.vertical_justify {
                VerticalJustify::Top => {}
                VerticalJustify::Center => {
                    gal.translate(Vector2::new(0.0, -lines_below * line_height / 2.0))
                }
                VerticalJustify::Bottom => {
                    gal.translate(Vector2::new(0.0, -lines_below * line_height))
                }
            }
        }

        gal.set_is_stroke(true);
        if text_attributes.bold {
            let width = gal.line_width();
            gal.set_line_width(width * BOLD_FACTOR);
        }

        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                gal.translate(Vector2::new(0.0, line_height));
            }
            self.draw_single_line(&mut *gal, line);
        }
    }

    /// Draw one line of text at the current origin
    ///
    /// Only horizontal justification applies here. The GAL transform is
    /// restored afterwards.
    pub fn draw_single_line(&self, gal: &mut dyn Gal, line: &str) {
        let text_attributes = *gal.state().text();
        let mirrored = text_attributes.mirrored;
        let italic = text_attributes.italic;
        let mut glyph_size = gal.glyph_size();
        let thickness = gal.line_width();

        let overbar_position = Self::overbar_position(glyph_size.y, thickness);
        let mut overbar_italic_comp = if italic && self.overbar_italic_compensation {
            overbar_position * ITALIC_TILT
        } else {
            0.0
        };
        if mirrored {
            overbar_italic_comp = -overbar_italic_comp;
        }

        let width = self
            .compute_text_extents(line, glyph_size, thickness, italic)
            .width;

        let mut gal = gal.scoped();

        // strokes are centered on the glyph outline; keep the ink inside 0..width
        gal.translate(Vector2::new(thickness / 2.0, 0.0));

        match text_attributes.horizontal_justify {
            HorizontalJustify::Center => gal.translate(Vector2::new(-width / 2.0, 0.0)),
            HorizontalJustify::Right if !mirrored => gal.translate(Vector2::new(-width, 0.0)),
            HorizontalJustify::Left if mirrored => gal.translate(Vector2::new(-width, 0.0)),
            _ => {}
        }

        // mirrored text runs right to left from where it would have ended
        let mut x_offset = if mirrored {
            glyph_size.x = -glyph_size.x;
            width - thickness
        } else {
            0.0
        };

        let mut last_had_overbar = false;

        for (c, overbar) in GlyphChars::new(line) {
            let glyph = self.glyphs.glyph(c);
            let advance = glyph_size.x * glyph.advance();

            if overbar {
                let mut start_x = x_offset;
                if !last_had_overbar {
                    start_x += overbar_italic_comp;
                    last_had_overbar = true;
                }
                gal.draw_line(
                    Vector2::new(start_x, -overbar_position),
                    Vector2::new(x_offset + advance, -overbar_position),
                );
            } else {
                last_had_overbar = false;
            }

            draw_glyph(&mut *gal, glyph, glyph_size, x_offset, italic, mirrored);
            x_offset += advance;
        }
    }

    /// Extents of one line of text without drawing it
    ///
    /// `~` markers take no room; a trailing lone `~` ends the line.
    pub fn compute_text_extents(
        &self,
        line: &str,
        glyph_size: Vector2,
        thickness: f64,
        italic: bool,
    ) -> TextExtents {
        debug_assert!(
            !line.contains('\n'),
            "text extents are computed for single lines"
        );

        let mut advance = 0.0;
        let mut y_max = 0.0_f64;
        let mut y_min = 0.0_f64;

        for (c, _) in GlyphChars::new(line) {
            let bbox = self.glyphs.glyph(c).bbox();
            advance += bbox.end().x;
            y_max = y_max.max(bbox.origin.y).max(bbox.end().y);
            y_min = y_min.min(bbox.origin.y).min(bbox.end().y);
        }

        let mut width = advance * glyph_size.x + thickness;
        if italic {
            width += glyph_size.y * ITALIC_TILT;
        }

        TextExtents {
            width,
            height: glyph_size.y,
            top: y_max * glyph_size.y,
            bottom: y_min * glyph_size.y,
        }
    }

    /// Extents of one line using the GAL's current text attributes
    pub fn compute_text_line_size(&self, gal: &dyn Gal, line: &str) -> Vector2 {
        self.compute_text_extents(
            line,
            gal.glyph_size(),
            gal.line_width(),
            gal.state().text().italic,
        )
        .size()
    }
}

fn draw_glyph(
    gal: &mut dyn Gal,
    glyph: &Glyph,
    glyph_size: Vector2,
    x_offset: f64,
    italic: bool,
    mirrored: bool,
) {
    for stroke in glyph.strokes() {
        let points: Vec<Vector2> = stroke
            .iter()
            .map(|p| {
                let mut point = Vector2::new(p.x * glyph_size.x + x_offset, p.y * glyph_size.y);
                if italic {
                    if mirrored {
                        point.x += point.y * ITALIC_TILT;
                    } else {
                        point.x -= point.y * ITALIC_TILT;
                    }
                }
                point
            })
            .collect();

        gal.draw_polyline(&points);
    }
}

/// Characters of a line with overbar markers resolved
///
/// Yields each drawable character with the overbar state it is drawn
/// with.
struct GlyphChars<'s> {
    chars: std::str::Chars<'s>,
    overbar: bool,
}

impl<'s> GlyphChars<'s> {
    fn new(line: &'s str) -> Self {
        Self {
            chars: line.chars(),
            overbar: false,
        }
    }
}

impl Iterator for GlyphChars<'_> {
    type Item = (char, bool);

    fn next(&mut self) -> Option<(char, bool)> {
        let mut c = self.chars.next()?;
        if c == '~' {
            c = self.chars.next()?;
            if c != '~' {
                self.overbar = !self.overbar;
            }
        }
        Some((c, self.overbar))
    }
}
