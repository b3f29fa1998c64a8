//! Screen-sized render targets
//!
//! The scene is rendered into an off-screen main target and blitted to the
//! surface. Keeping our own target makes the frame contents copyable:
//!
//! - `save_screen` / `restore_screen` copy the whole main target to and from
//!   a backup texture
//! - the cursor overlay copies the region under the crosshair to and from a
//!   small cursor texture
//!
//! Texture sizes are fixed at creation, so a resize reallocates everything.

use crate::cursor::PixelRect;

/// Format of the off-screen targets; the cursor pattern is written in RGBA8
pub const SCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Depth buffer format, 24 bits of depth precision
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

/// A texture with its default view
struct Target {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl Target {
    fn new(
        device: &wgpu::Device,
        label: &str,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Target { texture, view }
    }
}

/// Main, backup, cursor and depth targets
pub struct ScreenBuffers {
    main: Target,
    backup: Target,
    cursor_backup: Target,
    depth: Target,
    width: u32,
    height: u32,
    cursor_size: u32,
    has_backup: bool,
}

impl ScreenBuffers {
    pub fn new(device: &wgpu::Device, width: u32, height: u32, cursor_size: u32) -> Self {
        let color_usage = wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_SRC
            | wgpu::TextureUsages::COPY_DST;
        let copy_usage = wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::COPY_DST;

        Self {
            main: Target::new(device, "Screen Main", width, height, SCREEN_FORMAT, color_usage),
            backup: Target::new(device, "Screen Backup", width, height, SCREEN_FORMAT, copy_usage),
            cursor_backup: Target::new(
                device,
                "Cursor Backup",
                cursor_size,
                cursor_size,
                SCREEN_FORMAT,
                copy_usage,
            ),
            depth: Target::new(
                device,
                "Screen Depth",
                width,
                height,
                DEPTH_FORMAT,
                wgpu::TextureUsages::RENDER_ATTACHMENT,
            ),
            width: width.max(1),
            height: height.max(1),
            cursor_size: cursor_size.max(1),
            has_backup: false,
        }
    }

    /// Reallocate for a new size; returns false when the size is unchanged
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) -> bool {
        let (width, height) = (width.max(1), height.max(1));
        if self.width == width && self.height == height {
            return false;
        }

        tracing::debug!(
            "reallocating screen buffers {}x{} -> {}x{}",
            self.width,
            self.height,
            width,
            height
        );
        *self = Self::new(device, width, height, self.cursor_size);
        true
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn main_view(&self) -> &wgpu::TextureView {
        &self.main.view
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth.view
    }

    pub fn has_backup(&self) -> bool {
        self.has_backup
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Screen save / restore
    // ─────────────────────────────────────────────────────────────────────────

    pub fn save_screen(&mut self, encoder: &mut wgpu::CommandEncoder) {
        let full = self.full_rect();
        copy(encoder, &self.main.texture, &self.backup.texture, full, (0, 0));
        self.has_backup = true;
    }

    /// Returns false when nothing was saved since the last reallocation
    pub fn restore_screen(&self, encoder: &mut wgpu::CommandEncoder) -> bool {
        if !self.has_backup {
            return false;
        }
        let full = self.full_rect();
        copy(encoder, &self.backup.texture, &self.main.texture, full, (0, 0));
        true
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Cursor regions
    // ─────────────────────────────────────────────────────────────────────────

    /// Copy a screen region into the cursor texture
    pub fn save_region(&self, encoder: &mut wgpu::CommandEncoder, rect: PixelRect) {
        let Some(rect) = self.fit_cursor(rect) else {
            return;
        };
        copy_region(
            encoder,
            &self.main.texture,
            (rect.x, rect.y),
            &self.cursor_backup.texture,
            (0, 0),
            (rect.width, rect.height),
        );
    }

    /// Copy the cursor texture back into a screen region
    pub fn restore_region(&self, encoder: &mut wgpu::CommandEncoder, rect: PixelRect) {
        let Some(rect) = self.fit_cursor(rect) else {
            return;
        };
        copy_region(
            encoder,
            &self.cursor_backup.texture,
            (0, 0),
            &self.main.texture,
            (rect.x, rect.y),
            (rect.width, rect.height),
        );
    }

    /// Overwrite a screen region with RGBA8 pixels
    pub fn write_region(&self, queue: &wgpu::Queue, rect: PixelRect, pixels: &[u8]) {
        if rect.is_empty() || pixels.len() < rect.pixel_count() * 4 {
            return;
        }
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.main.texture,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: rect.x,
                    y: rect.y,
                    z: 0,
                },
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(rect.width * 4),
                rows_per_image: Some(rect.height),
            },
            wgpu::Extent3d {
                width: rect.width,
                height: rect.height,
                depth_or_array_layers: 1,
            },
        );
    }

    fn full_rect(&self) -> PixelRect {
        PixelRect {
            x: 0,
            y: 0,
            width: self.width,
            height: self.height,
        }
    }

    /// Clip a region to both the screen and the cursor texture
    fn fit_cursor(&self, rect: PixelRect) -> Option<PixelRect> {
        let width = rect
            .width
            .min(self.cursor_size)
            .min(self.width.saturating_sub(rect.x));
        let height = rect
            .height
            .min(self.cursor_size)
            .min(self.height.saturating_sub(rect.y));
        let fitted = PixelRect {
            width,
            height,
            ..rect
        };
        (!fitted.is_empty()).then_some(fitted)
    }
}

fn copy(
    encoder: &mut wgpu::CommandEncoder,
    source: &wgpu::Texture,
    destination: &wgpu::Texture,
    rect: PixelRect,
    dest_origin: (u32, u32),
) {
    copy_region(
        encoder,
        source,
        (rect.x, rect.y),
        destination,
        dest_origin,
        (rect.width, rect.height),
    );
}

fn copy_region(
    encoder: &mut wgpu::CommandEncoder,
    source: &wgpu::Texture,
    source_origin: (u32, u32),
    destination: &wgpu::Texture,
    dest_origin: (u32, u32),
    size: (u32, u32),
) {
    encoder.copy_texture_to_texture(
        wgpu::ImageCopyTexture {
            texture: source,
            mip_level: 0,
            origin: wgpu::Origin3d {
                x: source_origin.0,
                y: source_origin.1,
                z: 0,
            },
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::ImageCopyTexture {
            texture: destination,
            mip_level: 0,
            origin: wgpu::Origin3d {
                x: dest_origin.0,
                y: dest_origin.1,
                z: 0,
            },
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::Extent3d {
            width: size.0,
            height: size.1,
            depth_or_array_layers: 1,
        },
    );
}
