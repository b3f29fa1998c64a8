//! GAL state machine
//!
//! Pen and fill attributes, text attributes, the local transform with its
//! save stack, and the world/screen viewing parameters. Every backend embeds
//! one [`GalState`] and exposes it through [`crate::Gal::state`].

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::geometry::{Matrix3, Vector2};

// ─────────────────────────────────────────────────────────────────────────────
// Style Enums
// ─────────────────────────────────────────────────────────────────────────────

/// Line end style
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineCap {
    /// Ends exactly at the end point
    Butt,
    /// Half circle of diameter equal to the line width
    #[default]
    Round,
    /// Extends past the end point by half the line width
    Square,
}

/// Style of the corner between consecutive polyline segments
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineJoin {
    Miter,
    #[default]
    Round,
    Bevel,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HorizontalJustify {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerticalJustify {
    Top,
    #[default]
    Center,
    Bottom,
}

// ─────────────────────────────────────────────────────────────────────────────
// Attributes
// ─────────────────────────────────────────────────────────────────────────────

/// Text rendering attributes consumed by the stroke font
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextAttributes {
    pub glyph_size: Vector2,
    pub horizontal_justify: HorizontalJustify,
    pub vertical_justify: VerticalJustify,
    pub bold: bool,
    pub italic: bool,
    pub mirrored: bool,
}

impl Default for TextAttributes {
    fn default() -> Self {
        Self {
            glyph_size: Vector2::new(1.0, 1.0),
            horizontal_justify: HorizontalJustify::Left,
            vertical_justify: VerticalJustify::Bottom,
            bold: false,
            italic: false,
            mirrored: false,
        }
    }
}

/// Everything a save/restore pair snapshots besides the transform
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attributes {
    pub is_fill: bool,
    pub is_stroke: bool,
    pub fill_color: Color,
    pub stroke_color: Color,
    pub line_width: f64,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    /// Ordering key; smaller values are drawn on top
    pub layer_depth: f64,
    pub text: TextAttributes,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            is_fill: false,
            is_stroke: true,
            fill_color: Color::BLACK,
            stroke_color: Color::WHITE,
            line_width: 1.0,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            layer_depth: 0.0,
            text: TextAttributes::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// World / Screen Mapping
// ─────────────────────────────────────────────────────────────────────────────

/// Parameters of the world to screen mapping
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldView {
    /// World point shown at the center of the screen
    pub look_at: Vector2,
    pub zoom: f64,
    /// Length of one world unit in inches
    pub world_unit_length: f64,
    pub screen_dpi: f64,
    /// Screen size in pixels
    pub screen_size: Vector2,
    pub flip_x: bool,
    pub flip_y: bool,
}

impl Default for WorldView {
    fn default() -> Self {
        Self {
            look_at: Vector2::ZERO,
            zoom: 1.0,
            world_unit_length: 1.0 / 96.0,
            screen_dpi: 96.0,
            screen_size: Vector2::new(1.0, 1.0),
            flip_x: false,
            flip_y: false,
        }
    }
}

impl WorldView {
    /// Pixels per world unit at the current zoom
    pub fn world_scale(&self) -> f64 {
        self.screen_dpi * self.world_unit_length * self.zoom
    }

    pub fn world_screen_matrix(&self) -> Matrix3 {
        let scale = self.world_scale();
        let flip = Vector2::new(
            if self.flip_x { -scale } else { scale },
            if self.flip_y { -scale } else { scale },
        );

        Matrix3::translation(self.screen_size / 2.0)
            * Matrix3::scale(flip)
            * Matrix3::translation(-self.look_at)
    }

    /// Screen pixel position to world coordinates
    pub fn screen_to_world(&self, screen: Vector2) -> Vector2 {
        match self.world_screen_matrix().inverse() {
            Some(inv) => inv.transform_point(screen),
            None => {
                tracing::warn!("world/screen matrix is singular (zoom {})", self.zoom);
                self.look_at
            }
        }
    }

    pub fn world_to_screen(&self, world: Vector2) -> Vector2 {
        self.world_screen_matrix().transform_point(world)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// GalState
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
struct SavedState {
    attributes: Attributes,
    transform: Matrix3,
}

/// Attribute and transform state shared by all backends
#[derive(Clone, Debug, Default)]
pub struct GalState {
    attributes: Attributes,
    transform: Matrix3,
    stack: Vec<SavedState>,
    background_color: Color,
    view: WorldView,
    drawing: bool,
}

impl GalState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    pub fn text(&self) -> &TextAttributes {
        &self.attributes.text
    }

    pub fn text_mut(&mut self) -> &mut TextAttributes {
        &mut self.attributes.text
    }

    pub fn background_color(&self) -> Color {
        self.background_color
    }

    pub fn set_background_color(&mut self, color: Color) {
        self.background_color = color;
    }

    pub fn view(&self) -> &WorldView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut WorldView {
        &mut self.view
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transform stack
    // ─────────────────────────────────────────────────────────────────────────

    /// Local to world transform
    pub fn transform(&self) -> Matrix3 {
        self.transform
    }

    pub fn set_transform(&mut self, transform: Matrix3) {
        self.transform = transform;
    }

    /// Apply `matrix` in the current local frame
    pub fn apply(&mut self, matrix: Matrix3) {
        self.transform = self.transform * matrix;
    }

    pub fn translate(&mut self, offset: Vector2) {
        self.apply(Matrix3::translation(offset));
    }

    pub fn rotate(&mut self, angle: f64) {
        self.apply(Matrix3::rotation(angle));
    }

    pub fn scale(&mut self, factors: Vector2) {
        self.apply(Matrix3::scale(factors));
    }

    /// Push attributes and transform
    pub fn save(&mut self) {
        self.stack.push(SavedState {
            attributes: self.attributes,
            transform: self.transform,
        });
    }

    /// Pop the state pushed by the matching [`GalState::save`]
    ///
    /// An unmatched restore is a contract violation: it asserts in debug
    /// builds and leaves the state untouched otherwise.
    pub fn restore(&mut self) {
        match self.stack.pop() {
            Some(saved) => {
                self.attributes = saved.attributes;
                self.transform = saved.transform;
            }
            None => {
                tracing::error!("GAL restore() without a matching save()");
                debug_assert!(false, "GAL restore() without a matching save()");
            }
        }
    }

    /// Number of outstanding saves
    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Frame bookkeeping
    // ─────────────────────────────────────────────────────────────────────────

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    /// Start a frame: the transform stack is reset, attributes carry over
    pub fn begin_frame(&mut self) {
        if self.drawing {
            tracing::warn!("begin_drawing() called inside an active frame");
        }
        self.drawing = true;
        self.transform = Matrix3::IDENTITY;
        self.stack.clear();
    }

    pub fn end_frame(&mut self) {
        if !self.stack.is_empty() {
            tracing::error!(
                "frame ended with {} unbalanced save() call(s)",
                self.stack.len()
            );
            debug_assert!(self.stack.is_empty(), "unbalanced GAL save/restore");
            self.stack.clear();
        }
        self.drawing = false;
    }

    /// Contract check for primitive calls outside a frame
    pub fn check_drawing(&self, operation: &str) {
        if !self.drawing {
            tracing::warn!("{operation} called outside begin_drawing()/end_drawing()");
            debug_assert!(self.drawing, "{operation} called outside an active frame");
        }
    }
}
