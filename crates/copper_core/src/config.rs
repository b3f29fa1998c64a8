//! GAL configuration
//!
//! Loaded from the `[gal]` table of a TOML settings file, or built with
//! [`GalConfig::default`].

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{GalError, Result};

/// Backend independent rendering options
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GalConfig {
    /// Use the antialiasing shader programs
    pub antialiasing: bool,
    /// Cursor crosshair size in pixels
    pub cursor_size: u32,
    pub cursor_color: Color,
    pub background_color: Color,
    /// Layer depths are normalized from this range into the depth buffer
    pub depth_range: [f64; 2],
    /// Length of one world unit in inches
    pub world_unit_length: f64,
    pub screen_dpi: f64,
    /// Initial vertex capacity of the immediate-mode buffer
    pub max_vertices: usize,
}

impl Default for GalConfig {
    fn default() -> Self {
        Self {
            antialiasing: true,
            cursor_size: 80,
            cursor_color: Color::WHITE,
            background_color: Color::BLACK,
            depth_range: [-1024.0, 1024.0],
            // nanometer units
            world_unit_length: 1e-9 / 0.0254,
            screen_dpi: 106.0,
            max_vertices: 1 << 16,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct SettingsFile {
    #[serde(default)]
    gal: GalConfig,
}

impl GalConfig {
    /// Parse the `[gal]` table of a settings document; missing keys keep
    /// their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: SettingsFile =
            toml::from_str(content).map_err(|e| GalError::Config(e.to_string()))?;
        settings.gal.validated()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| GalError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        let settings = SettingsFile { gal: self.clone() };
        toml::to_string_pretty(&settings).map_err(|e| GalError::Config(e.to_string()))
    }

    fn validated(self) -> Result<Self> {
        let [near, far] = self.depth_range;
        if !(near < far) {
            return Err(GalError::Config(format!(
                "depth_range must be increasing, got [{near}, {far}]"
            )));
        }
        if self.world_unit_length <= 0.0 || self.screen_dpi <= 0.0 {
            return Err(GalError::Config(
                "world_unit_length and screen_dpi must be positive".to_string(),
            ));
        }
        Ok(self)
    }

    /// Map a layer depth into `0.0..=1.0`
    pub fn normalize_depth(&self, depth: f64) -> f64 {
        let [near, far] = self.depth_range;
        ((depth - near) / (far - near)).clamp(0.0, 1.0)
    }
}
