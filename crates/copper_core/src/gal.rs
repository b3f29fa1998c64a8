//! Graphics abstraction layer contract
//!
//! [`Gal`] is the one interface scene painters and the stroke font draw
//! through. Backends implement the primitives, groups and frame lifecycle;
//! attribute and transform handling is provided on top of the shared
//! [`GalState`].
//!
//! All point arguments are in the current local frame. Angles are radians,
//! counter-clockwise in a y-up frame (clockwise on a y-down screen).

use std::ops::{Deref, DerefMut};

use crate::color::Color;
use crate::geometry::{Matrix3, Vector2};
use crate::group::GroupId;
use crate::state::{GalState, HorizontalJustify, LineCap, LineJoin, VerticalJustify};

/// Drawing-primitive interface implemented by every rendering backend
pub trait Gal {
    /// Shared attribute and transform state
    fn state(&self) -> &GalState;

    fn state_mut(&mut self) -> &mut GalState;

    // ─────────────────────────────────────────────────────────────────────────
    // Frame Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Start a frame; primitives are only valid between this and
    /// [`Gal::end_drawing`]
    fn begin_drawing(&mut self);

    /// Finish the frame and present it
    fn end_drawing(&mut self);

    /// Submit pending geometry without ending the frame
    fn flush(&mut self) {}

    /// Clear the frame to the background color
    fn clear_screen(&mut self);

    /// Reallocate screen-sized resources
    fn resize_screen(&mut self, width: u32, height: u32);

    // ─────────────────────────────────────────────────────────────────────────
    // Primitives
    // ─────────────────────────────────────────────────────────────────────────

    fn draw_line(&mut self, start: Vector2, end: Vector2);

    fn draw_polyline(&mut self, points: &[Vector2]);

    fn draw_circle(&mut self, center: Vector2, radius: f64);

    /// Arc from `start_angle` to `end_angle`; the sweep direction follows the
    /// sign of `end_angle - start_angle`
    fn draw_arc(&mut self, center: Vector2, radius: f64, start_angle: f64, end_angle: f64);

    /// Axis-aligned rectangle between two opposite corners
    fn draw_rectangle(&mut self, start: Vector2, end: Vector2);

    /// Closed polygon; filled with the nonzero winding rule
    fn draw_polygon(&mut self, points: &[Vector2]);

    /// Cubic Bezier curve
    fn draw_curve(&mut self, start: Vector2, control_a: Vector2, control_b: Vector2, end: Vector2);

    // ─────────────────────────────────────────────────────────────────────────
    // Groups
    // ─────────────────────────────────────────────────────────────────────────

    /// Start recording a group; primitives are captured until
    /// [`Gal::end_group`] instead of being drawn
    fn begin_group(&mut self) -> GroupId;

    fn end_group(&mut self);

    /// Replay a recorded group at the current transform
    fn draw_group(&mut self, group: GroupId);

    /// Release a group; deleting a deleted group is a no-op
    fn delete_group(&mut self, group: GroupId);

    /// Number of live groups held by the backend
    fn group_count(&self) -> usize;

    // ─────────────────────────────────────────────────────────────────────────
    // Screen & Cursor
    // ─────────────────────────────────────────────────────────────────────────

    /// Copy the current frame contents into the backup buffer
    fn save_screen(&mut self);

    /// Copy the backup buffer back into the frame
    fn restore_screen(&mut self);

    fn set_cursor_enabled(&mut self, enabled: bool);

    /// Move the cursor overlay to `position`, in screen pixels
    fn draw_cursor(&mut self, position: Vector2);

    // ─────────────────────────────────────────────────────────────────────────
    // Attributes (provided)
    // ─────────────────────────────────────────────────────────────────────────

    fn set_is_fill(&mut self, is_fill: bool) {
        self.state_mut().attributes_mut().is_fill = is_fill;
    }

    fn set_is_stroke(&mut self, is_stroke: bool) {
        self.state_mut().attributes_mut().is_stroke = is_stroke;
    }

    fn set_fill_color(&mut self, color: Color) {
        self.state_mut().attributes_mut().fill_color = color;
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.state_mut().attributes_mut().stroke_color = color;
    }

    fn set_background_color(&mut self, color: Color) {
        self.state_mut().set_background_color(color);
    }

    fn set_line_width(&mut self, width: f64) {
        self.state_mut().attributes_mut().line_width = width;
    }

    fn line_width(&self) -> f64 {
        self.state().attributes().line_width
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.state_mut().attributes_mut().line_cap = cap;
    }

    fn set_line_join(&mut self, join: LineJoin) {
        self.state_mut().attributes_mut().line_join = join;
    }

    fn set_layer_depth(&mut self, depth: f64) {
        self.state_mut().attributes_mut().layer_depth = depth;
    }

    fn layer_depth(&self) -> f64 {
        self.state().attributes().layer_depth
    }

    /// Shift the layer depth; negative values move towards the viewer
    fn adjust_layer_depth(&mut self, delta: f64) {
        self.state_mut().attributes_mut().layer_depth += delta;
    }

    fn set_glyph_size(&mut self, size: Vector2) {
        self.state_mut().text_mut().glyph_size = size;
    }

    fn glyph_size(&self) -> Vector2 {
        self.state().text().glyph_size
    }

    fn set_horizontal_justify(&mut self, justify: HorizontalJustify) {
        self.state_mut().text_mut().horizontal_justify = justify;
    }

    fn set_vertical_justify(&mut self, justify: VerticalJustify) {
        self.state_mut().text_mut().vertical_justify = justify;
    }

    fn set_font_bold(&mut self, bold: bool) {
        self.state_mut().text_mut().bold = bold;
    }

    fn set_font_italic(&mut self, italic: bool) {
        self.state_mut().text_mut().italic = italic;
    }

    fn set_text_mirrored(&mut self, mirrored: bool) {
        self.state_mut().text_mut().mirrored = mirrored;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transform (provided)
    // ─────────────────────────────────────────────────────────────────────────

    fn translate(&mut self, offset: Vector2) {
        self.state_mut().translate(offset);
    }

    fn rotate(&mut self, angle: f64) {
        self.state_mut().rotate(angle);
    }

    fn scale(&mut self, factors: Vector2) {
        self.state_mut().scale(factors);
    }

    fn transform(&mut self, matrix: Matrix3) {
        self.state_mut().apply(matrix);
    }

    /// Push attributes and transform; prefer [`GalExt::scoped`]
    fn save(&mut self) {
        self.state_mut().save();
    }

    fn restore(&mut self) {
        self.state_mut().restore();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // World / Screen (provided)
    // ─────────────────────────────────────────────────────────────────────────

    fn set_look_at(&mut self, point: Vector2) {
        self.state_mut().view_mut().look_at = point;
    }

    fn set_zoom_factor(&mut self, zoom: f64) {
        self.state_mut().view_mut().zoom = zoom;
    }

    fn zoom_factor(&self) -> f64 {
        self.state().view().zoom
    }

    fn set_flip(&mut self, flip_x: bool, flip_y: bool) {
        let view = self.state_mut().view_mut();
        view.flip_x = flip_x;
        view.flip_y = flip_y;
    }

    fn world_screen_matrix(&self) -> Matrix3 {
        self.state().view().world_screen_matrix()
    }

    /// Convert a cursor position in screen pixels to world coordinates
    fn screen_to_world(&self, screen: Vector2) -> Vector2 {
        self.state().view().screen_to_world(screen)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scoped Save / Restore
// ─────────────────────────────────────────────────────────────────────────────

/// Guard that restores the GAL state saved at construction when dropped
///
/// Dereferences to the wrapped GAL, so drawing continues through the guard.
pub struct StateGuard<'a, G: Gal + ?Sized> {
    gal: &'a mut G,
}

impl<'a, G: Gal + ?Sized> StateGuard<'a, G> {
    pub fn new(gal: &'a mut G) -> Self {
        gal.save();
        Self { gal }
    }
}

impl<G: Gal + ?Sized> Deref for StateGuard<'_, G> {
    type Target = G;

    fn deref(&self) -> &G {
        self.gal
    }
}

impl<G: Gal + ?Sized> DerefMut for StateGuard<'_, G> {
    fn deref_mut(&mut self) -> &mut G {
        self.gal
    }
}

impl<G: Gal + ?Sized> Drop for StateGuard<'_, G> {
    fn drop(&mut self) {
        self.gal.restore();
    }
}

/// Convenience methods available on every [`Gal`], including `dyn Gal`
pub trait GalExt: Gal {
    /// Save the state now and restore it when the guard goes out of scope
    fn scoped(&mut self) -> StateGuard<'_, Self> {
        StateGuard::new(self)
    }

    /// Stroke-only drawing with the given color and width
    fn set_stroke_style(&mut self, color: Color, width: f64) {
        self.set_is_fill(false);
        self.set_is_stroke(true);
        self.set_stroke_color(color);
        self.set_line_width(width);
    }

    /// Fill-only drawing with the given color
    fn set_fill_style(&mut self, color: Color) {
        self.set_is_fill(true);
        self.set_is_stroke(false);
        self.set_fill_color(color);
    }
}

impl<T: Gal + ?Sized> GalExt for T {}
