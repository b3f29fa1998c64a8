//! Cursor overlay
//!
//! The crosshair is written straight into the main color target. Before it
//! is written, the pixels underneath are copied aside; before it moves, they
//! are copied back. That gives the effect of an XOR cursor without XOR
//! blending and without re-rendering the scene.
//!
//! [`CursorOverlay::plan_move`] works out the rectangles; the renderer
//! executes them as texture copies and writes.

use smallvec::SmallVec;

use copper_core::{Color, Vector2};

/// Pixel rectangle on the screen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Texture operations for one cursor move, executed in field order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CursorPlan {
    /// Put back the pixels saved at the previous position
    pub restore: Option<PixelRect>,
    /// Copy aside the pixels under the new position
    pub save: Option<PixelRect>,
    /// Crosshair bars to fill with the cursor color
    pub strokes: SmallVec<[PixelRect; 2]>,
}

impl CursorPlan {
    pub fn is_empty(&self) -> bool {
        self.restore.is_none() && self.save.is_none() && self.strokes.is_empty()
    }
}

/// Crosshair cursor state
#[derive(Clone, Debug)]
pub struct CursorOverlay {
    size: u32,
    color: Color,
    enabled: bool,
    position: Option<Vector2>,
    saved: Option<PixelRect>,
}

impl CursorOverlay {
    pub fn new(size: u32, color: Color) -> Self {
        Self {
            size: size.max(1),
            color,
            enabled: false,
            position: None,
            saved: None,
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn position(&self) -> Option<Vector2> {
        self.position
    }

    /// Enable or disable; disabling yields a plan that erases the cursor
    pub fn set_enabled(&mut self, enabled: bool) -> CursorPlan {
        self.enabled = enabled;
        if enabled {
            return CursorPlan::default();
        }
        CursorPlan {
            restore: self.saved.take(),
            ..CursorPlan::default()
        }
    }

    /// The saved pixels no longer match the screen (the scene was redrawn)
    pub fn invalidate(&mut self) {
        self.saved = None;
    }

    /// Plan moving the cursor to `position` on a screen of `screen` pixels
    pub fn plan_move(&mut self, position: Vector2, screen: (u32, u32)) -> CursorPlan {
        let mut plan = CursorPlan {
            restore: self.saved.take(),
            ..CursorPlan::default()
        };
        self.position = Some(position);

        if !self.enabled {
            return plan;
        }

        let cx = position.x.round() as i64;
        let cy = position.y.round() as i64;
        let half = (self.size / 2) as i64;

        let Some(region) = clip(cx - half, cy - half, self.size as i64, self.size as i64, screen)
        else {
            return plan;
        };

        plan.save = Some(region);
        self.saved = Some(region);

        if let Some(bar) = clip(cx - half, cy, self.size as i64, 1, screen) {
            plan.strokes.push(bar);
        }
        if let Some(bar) = clip(cx, cy - half, 1, self.size as i64, screen) {
            plan.strokes.push(bar);
        }
        plan
    }

    /// RGBA8 pixels for a stroke rectangle, row by row
    pub fn stroke_pixels(&self, rect: &PixelRect) -> Vec<u8> {
        self.color.to_rgba8().repeat(rect.pixel_count())
    }
}

/// Intersect a signed rectangle with the screen
fn clip(x: i64, y: i64, width: i64, height: i64, screen: (u32, u32)) -> Option<PixelRect> {
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + width).min(screen.0 as i64);
    let y1 = (y + height).min(screen.1 as i64);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }

    Some(PixelRect {
        x: x0 as u32,
        y: y0 as u32,
        width: (x1 - x0) as u32,
        height: (y1 - y0) as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: (u32, u32) = (800, 600);

    fn cursor() -> CursorOverlay {
        let mut c = CursorOverlay::new(20, Color::WHITE);
        c.set_enabled(true);
        c
    }

    #[test]
    fn test_first_move_saves_then_draws() {
        let mut c = cursor();
        let plan = c.plan_move(Vector2::new(100.0, 100.0), SCREEN);
        assert_eq!(plan.restore, None);
        assert_eq!(
            plan.save,
            Some(PixelRect {
                x: 90,
                y: 90,
                width: 20,
                height: 20
            })
        );
        assert_eq!(plan.strokes.len(), 2);
        assert_eq!(plan.strokes[0].height, 1);
        assert_eq!(plan.strokes[1].width, 1);
    }

    #[test]
    fn test_second_move_restores_previous() {
        let mut c = cursor();
        let first = c.plan_move(Vector2::new(100.0, 100.0), SCREEN);
        let second = c.plan_move(Vector2::new(300.0, 200.0), SCREEN);
        assert_eq!(second.restore, first.save);
        assert_ne!(second.save, first.save);
    }

    #[test]
    fn test_clamped_at_screen_edge() {
        let mut c = cursor();
        let plan = c.plan_move(Vector2::new(2.0, 595.0), SCREEN);
        let save = plan.save.unwrap();
        assert_eq!((save.x, save.y), (0, 585));
        assert_eq!((save.width, save.height), (12, 15));
    }

    #[test]
    fn test_off_screen_only_restores() {
        let mut c = cursor();
        c.plan_move(Vector2::new(10.0, 10.0), SCREEN);
        let plan = c.plan_move(Vector2::new(-100.0, -100.0), SCREEN);
        assert!(plan.restore.is_some());
        assert!(plan.save.is_none());
        assert!(plan.strokes.is_empty());
    }

    #[test]
    fn test_disable_erases() {
        let mut c = cursor();
        let drawn = c.plan_move(Vector2::new(50.0, 50.0), SCREEN);
        let erase = c.set_enabled(false);
        assert_eq!(erase.restore, drawn.save);
        assert!(c.plan_move(Vector2::new(60.0, 60.0), SCREEN).is_empty());
    }

    #[test]
    fn test_invalidate_skips_stale_restore() {
        let mut c = cursor();
        c.plan_move(Vector2::new(50.0, 50.0), SCREEN);
        c.invalidate();
        assert_eq!(c.plan_move(Vector2::new(60.0, 60.0), SCREEN).restore, None);
    }

    #[test]
    fn test_stroke_pixels() {
        let c = CursorOverlay::new(4, Color::RED);
        let rect = PixelRect {
            x: 0,
            y: 0,
            width: 4,
            height: 1,
        };
        let pixels = c.stroke_pixels(&rect);
        assert_eq!(pixels.len(), 16);
        assert_eq!(&pixels[..4], &[255, 0, 0, 255]);
    }
}
