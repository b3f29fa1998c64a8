//! RGBA colors

use serde::{Deserialize, Serialize};

/// RGBA color, components in `0.0..=1.0`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::opaque(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::opaque(0.0, 0.0, 0.0);
    pub const RED: Color = Color::opaque(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::opaque(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::opaque(0.0, 0.0, 1.0);
    pub const YELLOW: Color = Color::opaque(1.0, 1.0, 0.0);
    pub const CYAN: Color = Color::opaque(0.0, 1.0, 1.0);
    pub const GRAY: Color = Color::opaque(0.5, 0.5, 0.5);
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Opaque color from 8 bit channels, as board palettes are written
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        let unit = |c: u8| c as f32 / 255.0;
        Self::opaque(unit(r), unit(g), unit(b))
    }

    /// Same color drawn with `opacity`, clamped to `0.0..=1.0`
    pub fn with_opacity(self, opacity: f32) -> Self {
        Self {
            a: opacity.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Blend towards white by `factor` (0 keeps the color, 1 gives white)
    pub fn brightened(&self, factor: f32) -> Color {
        Color {
            r: self.r * (1.0 - factor) + factor,
            g: self.g * (1.0 - factor) + factor,
            b: self.b * (1.0 - factor) + factor,
            a: self.a,
        }
    }

    /// Blend towards black by `factor` (0 keeps the color, 1 gives black)
    pub fn darkened(&self, factor: f32) -> Color {
        Color {
            r: self.r * (1.0 - factor),
            g: self.g * (1.0 - factor),
            b: self.b * (1.0 - factor),
            a: self.a,
        }
    }

    pub fn inverted(&self) -> Color {
        Color::new(1.0 - self.r, 1.0 - self.g, 1.0 - self.b, self.a)
    }

    /// Packed RGBA8, as written into cursor pixel patterns
    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

}

impl From<Color> for [f32; 4] {
    fn from(c: Color) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}
