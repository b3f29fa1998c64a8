//! Render settings
//!
//! Colors and display modes used by [`PcbPainter`](crate::PcbPainter).
//! Settings load from the `[render]` table of a TOML document; derived
//! color variants are recomputed by [`RenderSettings::update`], which the
//! loaders call for you.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use copper_core::{Color, GalError, Result};
use copper_view::LayerId;

use crate::layers::{self, ItemLayer, LAYER_COUNT};

/// Draw outlines instead of filled shapes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchMode {
    pub pads: bool,
    pub vias: bool,
    pub tracks: bool,
}

#[derive(Clone, Copy, Debug, Default)]
struct ColorVariants {
    highlighted: Color,
    darkened: Color,
    selected: Color,
}

impl ColorVariants {
    fn of(base: Color, highlight_factor: f32, select_factor: f32) -> Self {
        Self {
            highlighted: base.brightened(highlight_factor),
            darkened: base.darkened(1.0 - highlight_factor),
            selected: base.brightened(select_factor),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// One color per board layer
    pub layer_colors: Vec<Color>,
    /// One color per [`ItemLayer`]
    pub item_colors: Vec<Color>,
    /// Alpha applied to every layer and item color
    pub layer_opacity: f32,
    pub highlight_factor: f32,
    pub select_factor: f32,
    /// Gray level of inactive layers in high contrast mode
    pub high_contrast_factor: f32,

    pub highlight_enabled: bool,
    pub highlight_net: i32,
    pub high_contrast_enabled: bool,
    /// Layer kept in color when high contrast is on
    pub active_layer: i32,

    pub sketch: SketchMode,
    /// Pen width of sketch mode outlines, in world units
    pub outline_width: f64,

    #[serde(skip)]
    layer_variants: Vec<ColorVariants>,
    #[serde(skip)]
    item_variants: Vec<ColorVariants>,
    #[serde(skip)]
    high_contrast_color: Color,
}

fn default_layer_colors() -> Vec<Color> {
    (0..LAYER_COUNT)
        .map(|i| match LayerId(i) {
            layers::BACK_COPPER => Color::from_rgb8(0x00, 0xC0, 0x00),
            layers::FRONT_COPPER => Color::from_rgb8(0xC0, 0x00, 0x00),
            layers::BACK_SILKSCREEN => Color::from_rgb8(0xC0, 0x00, 0xC0),
            layers::FRONT_SILKSCREEN => Color::from_rgb8(0x00, 0xC0, 0xC0),
            layers::BACK_MASK | layers::FRONT_MASK => Color::from_rgb8(0x84, 0x00, 0x84),
            layers::BACK_PASTE | layers::FRONT_PASTE => Color::from_rgb8(0x84, 0x84, 0x84),
            layers::BACK_ADHESIVE | layers::FRONT_ADHESIVE => Color::from_rgb8(0x00, 0x00, 0x84),
            layers::EDGE_CUTS => Color::YELLOW,
            layers::DRAWINGS | layers::COMMENTS => Color::from_rgb8(0xC2, 0xC2, 0xC2),
            layers::ECO1 | layers::ECO2 => Color::from_rgb8(0x84, 0x84, 0x00),
            inner if layers::is_copper(inner) => Color::from_rgb8(0xC2, 0xC2, 0x00),
            _ => Color::GRAY,
        })
        .collect()
}

fn default_item_colors() -> Vec<Color> {
    ItemLayer::ALL
        .iter()
        .map(|item| match item {
            ItemLayer::Vias | ItemLayer::Pads => Color::opaque(0.7, 0.7, 0.7),
            ItemLayer::ViaHoles => Color::opaque(0.5, 0.4, 0.0),
            ItemLayer::PadHoles => Color::opaque(0.0, 0.5, 0.5),
            ItemLayer::Tracks => Color::from_rgb8(0xC0, 0x00, 0x00),
            ItemLayer::NetNames => Color::opaque(0.9, 0.9, 0.9),
        })
        .collect()
}

impl Default for RenderSettings {
    fn default() -> Self {
        let mut settings = Self {
            layer_colors: default_layer_colors(),
            item_colors: default_item_colors(),
            layer_opacity: 0.8,
            highlight_factor: 0.5,
            select_factor: 0.5,
            high_contrast_factor: 0.2,
            highlight_enabled: false,
            highlight_net: -1,
            high_contrast_enabled: false,
            active_layer: layers::FRONT_COPPER.0,
            sketch: SketchMode::default(),
            outline_width: 1.0,
            layer_variants: Vec::new(),
            item_variants: Vec::new(),
            high_contrast_color: Color::GRAY,
        };
        settings.update();
        settings
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct SettingsFile {
    #[serde(default)]
    render: RenderSettings,
}

impl RenderSettings {
    /// Parse the `[render]` table of a settings document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: SettingsFile =
            toml::from_str(content).map_err(|e| GalError::Config(e.to_string()))?;
        let mut settings = file.render;
        settings.pad_color_tables();
        settings.update();
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| GalError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        let file = SettingsFile {
            render: self.clone(),
        };
        toml::to_string_pretty(&file).map_err(|e| GalError::Config(e.to_string()))
    }

    /// Short color tables are completed with the defaults
    fn pad_color_tables(&mut self) {
        let layer_defaults = default_layer_colors();
        if self.layer_colors.len() < layer_defaults.len() {
            let start = self.layer_colors.len();
            self.layer_colors.extend_from_slice(&layer_defaults[start..]);
        }
        let item_defaults = default_item_colors();
        if self.item_colors.len() < item_defaults.len() {
            let start = self.item_colors.len();
            self.item_colors.extend_from_slice(&item_defaults[start..]);
        }
    }

    /// Recompute opacity and the highlighted/darkened/selected variants
    ///
    /// Call after changing any color or factor.
    pub fn update(&mut self) {
        let opacity = self.layer_opacity;
        let (highlight, select) = (self.highlight_factor, self.select_factor);

        for color in self.layer_colors.iter_mut().chain(self.item_colors.iter_mut()) {
            *color = color.with_opacity(opacity);
        }
        self.layer_variants = self
            .layer_colors
            .iter()
            .map(|&c| ColorVariants::of(c, highlight, select))
            .collect();
        self.item_variants = self
            .item_colors
            .iter()
            .map(|&c| ColorVariants::of(c, highlight, select))
            .collect();

        let gray = self.high_contrast_factor;
        self.high_contrast_color = Color::new(gray, gray, gray, opacity);
    }

    pub fn set_layer_color(&mut self, layer: LayerId, color: Color) {
        if let Some(slot) = usize::try_from(layer.0)
            .ok()
            .and_then(|i| self.layer_colors.get_mut(i))
        {
            *slot = color;
            self.update();
        }
    }

    pub fn set_item_color(&mut self, item: ItemLayer, color: Color) {
        if let Some(slot) = self.item_colors.get_mut(item.index()) {
            *slot = color;
            self.update();
        }
    }

    /// Highlight `net`, darkening everything else; `None` turns it off
    pub fn set_highlight(&mut self, net: Option<i32>) {
        self.highlight_enabled = net.is_some();
        if let Some(net) = net {
            self.highlight_net = net;
        }
    }

    /// Gray out every layer but `active`
    pub fn set_high_contrast(&mut self, enabled: bool, active: LayerId) {
        self.high_contrast_enabled = enabled;
        self.active_layer = active.0;
    }

    /// Color of an item with net `net` drawn on `layer`
    pub fn layer_color(&self, layer: LayerId, net: i32) -> Color {
        if self.high_contrast_enabled && self.active_layer != layer.0 {
            return self.high_contrast_color;
        }

        let (base, variants) = match ItemLayer::from_id(layer) {
            Some(item) => (
                self.item_colors.get(item.index()),
                self.item_variants.get(item.index()),
            ),
            None => {
                let index = usize::try_from(layer.0).ok();
                (
                    index.and_then(|i| self.layer_colors.get(i)),
                    index.and_then(|i| self.layer_variants.get(i)),
                )
            }
        };

        let (Some(&base), Some(variants)) = (base, variants) else {
            tracing::warn!("no color for layer {:?}", layer);
            return Color::GRAY;
        };

        if !self.highlight_enabled {
            base
        } else if net == self.highlight_net {
            variants.highlighted
        } else {
            variants.darkened
        }
    }

    /// Color of a display-only item layer
    pub fn item_color(&self, item: ItemLayer, net: i32) -> Color {
        self.layer_color(item.id(), net)
    }

    /// Selection color of `layer`
    pub fn selected_color(&self, layer: LayerId) -> Color {
        let variants = match ItemLayer::from_id(layer) {
            Some(item) => self.item_variants.get(item.index()),
            None => usize::try_from(layer.0)
                .ok()
                .and_then(|i| self.layer_variants.get(i)),
        };
        variants.map_or(Color::WHITE, |v| v.selected)
    }
}
