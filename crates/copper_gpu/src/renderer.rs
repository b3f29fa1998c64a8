//! Hardware GAL backend
//!
//! [`GpuGal`] owns the wgpu device, the pipelines and the screen buffers,
//! and executes the draw list produced by its [`Canvas`]. Geometry is
//! rendered into an off-screen main target which is then blitted to the
//! window surface (if any); see [`crate::backbuffer`].

use std::num::NonZeroU64;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use wgpu::util::DeviceExt;

use copper_core::{Gal, GalConfig, GalError, GalState, GroupId, Matrix3, Result, Vector2};

use crate::backbuffer::{ScreenBuffers, DEPTH_FORMAT, SCREEN_FORMAT};
use crate::canvas::{Canvas, FrameOp};
use crate::container::{GalVertex, ShaderProgram, VertexContainer};
use crate::cursor::{CursorOverlay, CursorPlan};
use crate::shaders::{BLIT_SHADER, GAL_SHADER};

/// Per-op uniform block
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct OpUniforms {
    transform: [[f32; 4]; 4],
}

const UNIFORM_SIZE: u64 = std::mem::size_of::<OpUniforms>() as u64;

/// Render pipelines, one per shader program plus the blit
struct Pipelines {
    solid: wgpu::RenderPipeline,
    fill_edge: wgpu::RenderPipeline,
    hairline: wgpu::RenderPipeline,
    blit: wgpu::RenderPipeline,
}

impl Pipelines {
    fn get(&self, program: ShaderProgram) -> &wgpu::RenderPipeline {
        match program {
            ShaderProgram::Solid => &self.solid,
            ShaderProgram::FillEdge => &self.fill_edge,
            ShaderProgram::Hairline => &self.hairline,
        }
    }
}

/// Uniform buffer addressed with dynamic offsets, one slot per draw op
struct UniformRing {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    stride: u64,
    capacity: usize,
}

impl UniformRing {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, capacity: usize) -> Self {
        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let stride = UNIFORM_SIZE.div_ceil(alignment) * alignment;
        let capacity = capacity.max(1);

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("GAL Op Uniforms"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("GAL Op Uniforms Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(UNIFORM_SIZE),
                }),
            }],
        });

        Self {
            buffer,
            bind_group,
            stride,
            capacity,
        }
    }
}

struct SurfaceTarget {
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
}

/// wgpu implementation of [`Gal`]
pub struct GpuGal {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    surface: Option<SurfaceTarget>,
    pipelines: Pipelines,
    uniform_layout: wgpu::BindGroupLayout,
    uniforms: UniformRing,
    blit_layout: wgpu::BindGroupLayout,
    blit_bind_group: wgpu::BindGroup,
    sampler: wgpu::Sampler,
    screen: ScreenBuffers,
    canvas: Canvas,
    immediate_buffer: Option<wgpu::Buffer>,
    group_buffers: FxHashMap<GroupId, wgpu::Buffer>,
    cursor: CursorOverlay,
    clear_pending: bool,
    depth_cleared: bool,
}

impl GpuGal {
    /// Get the preferred backend for the current platform
    fn preferred_backends() -> wgpu::Backends {
        #[cfg(target_os = "macos")]
        {
            wgpu::Backends::METAL
        }
        #[cfg(target_os = "windows")]
        {
            wgpu::Backends::DX12
        }
        #[cfg(target_os = "linux")]
        {
            wgpu::Backends::VULKAN | wgpu::Backends::GL
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
        {
            wgpu::Backends::PRIMARY
        }
    }

    /// Create a backend without a window (renders into the off-screen target)
    pub async fn new(config: GalConfig, width: u32, height: u32) -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: Self::preferred_backends(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GalError::AdapterNotFound)
            .map_err(report_init_failure)?;

        let (device, queue) = Self::request_device(&adapter).await?;

        Ok(Self::create(device, queue, None, SCREEN_FORMAT, config, width, height))
    }

    /// Create a backend presenting to a window surface
    pub async fn with_surface<W>(
        window: Arc<W>,
        config: GalConfig,
        width: u32,
        height: u32,
    ) -> Result<Self>
    where
        W: raw_window_handle::HasWindowHandle
            + raw_window_handle::HasDisplayHandle
            + Send
            + Sync
            + 'static,
    {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: Self::preferred_backends(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .map_err(|e| GalError::Surface(e.to_string()))
            .map_err(report_init_failure)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GalError::AdapterNotFound)
            .map_err(report_init_failure)?;

        let (device, queue) = Self::request_device(&adapter).await?;

        let caps = surface.get_capabilities(&adapter);
        tracing::debug!("Surface capabilities - formats: {:?}", caps.formats);

        // CAD colors are specified directly in display space
        let format = caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or(caps.formats.first())
            .copied()
            .ok_or_else(|| GalError::Surface("surface reports no formats".to_string()))
            .map_err(report_init_failure)?;
        tracing::debug!("Selected surface format: {:?}", format);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let target = SurfaceTarget {
            surface,
            config: surface_config,
        };

        Ok(Self::create(
            device,
            queue,
            Some(target),
            format,
            config,
            width,
            height,
        ))
    }

    /// Blocking variant of [`GpuGal::new`]
    pub fn new_blocking(config: GalConfig, width: u32, height: u32) -> Result<Self> {
        pollster::block_on(Self::new(config, width, height))
    }

    async fn request_device(adapter: &wgpu::Adapter) -> Result<(Arc<wgpu::Device>, Arc<wgpu::Queue>)> {
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Copper GAL Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::MemoryUsage,
                },
                None,
            )
            .await
            .map_err(|e| GalError::Device(e.to_string()))
            .map_err(report_init_failure)?;

        Ok((Arc::new(device), Arc::new(queue)))
    }

    fn create(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        surface: Option<SurfaceTarget>,
        present_format: wgpu::TextureFormat,
        config: GalConfig,
        width: u32,
        height: u32,
    ) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("GAL Uniform Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(UNIFORM_SIZE),
                },
                count: None,
            }],
        });

        let blit_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Blit Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipelines =
            Self::create_pipelines(&device, &uniform_layout, &blit_layout, present_format);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Blit Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let screen = ScreenBuffers::new(&device, width, height, config.cursor_size);
        let blit_bind_group = Self::create_blit_bind_group(&device, &blit_layout, &screen, &sampler);
        let uniforms = UniformRing::new(&device, &uniform_layout, 256);
        let cursor = CursorOverlay::new(config.cursor_size, config.cursor_color);

        let mut canvas = Canvas::new(config);
        canvas.resize_screen(width.max(1), height.max(1));

        tracing::debug!("GpuGal created ({}x{})", width, height);

        Self {
            device,
            queue,
            surface,
            pipelines,
            uniform_layout,
            uniforms,
            blit_layout,
            blit_bind_group,
            sampler,
            screen,
            canvas,
            immediate_buffer: None,
            group_buffers: FxHashMap::default(),
            cursor,
            clear_pending: true,
            depth_cleared: false,
        }
    }

    fn create_pipelines(
        device: &wgpu::Device,
        uniform_layout: &wgpu::BindGroupLayout,
        blit_layout: &wgpu::BindGroupLayout,
        present_format: wgpu::TextureFormat,
    ) -> Pipelines {
        let gal_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("GAL Shader"),
            source: wgpu::ShaderSource::Wgsl(GAL_SHADER.into()),
        });
        let blit_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Blit Shader"),
            source: wgpu::ShaderSource::Wgsl(BLIT_SHADER.into()),
        });

        let gal_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("GAL Pipeline Layout"),
            bind_group_layouts: &[uniform_layout],
            push_constant_ranges: &[],
        });

        // GalVertex layout (32 bytes total):
        //   position: [f32; 2] - 8 bytes, offset 0
        //   depth: f32         - 4 bytes, offset 8
        //   edge: f32          - 4 bytes, offset 12
        //   color: [f32; 4]    - 16 bytes, offset 16
        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GalVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 0,
                    shader_location: 0,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32,
                    offset: 8,
                    shader_location: 1,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32,
                    offset: 12,
                    shader_location: 2,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x4,
                    offset: 16,
                    shader_location: 3,
                },
            ],
        };

        let color_targets = &[Some(wgpu::ColorTargetState {
            format: SCREEN_FORMAT,
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            write_mask: wgpu::ColorWrites::ALL,
        })];

        let primitive_state = wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        };

        let depth_stencil = wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        };

        let gal_pipeline = |label: &str, fragment_entry: &str| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&gal_layout),
                vertex: wgpu::VertexState {
                    module: &gal_shader,
                    entry_point: Some("vs_main"),
                    buffers: &[vertex_layout.clone()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &gal_shader,
                    entry_point: Some(fragment_entry),
                    targets: color_targets,
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: primitive_state,
                depth_stencil: Some(depth_stencil.clone()),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let solid = gal_pipeline("GAL Solid Pipeline", "fs_solid");
        let fill_edge = gal_pipeline("GAL Fill Edge Pipeline", "fs_fill_edge");
        let hairline = gal_pipeline("GAL Hairline Pipeline", "fs_hairline");

        let blit_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Blit Pipeline Layout"),
            bind_group_layouts: &[blit_layout],
            push_constant_ranges: &[],
        });

        let blit = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Blit Pipeline"),
            layout: Some(&blit_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &blit_shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &blit_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: present_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: primitive_state,
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Pipelines {
            solid,
            fill_edge,
            hairline,
            blit,
        }
    }

    fn create_blit_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        screen: &ScreenBuffers,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Blit Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(screen.main_view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// The device-independent engine, for inspection
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn set_antialiasing(&mut self, enabled: bool) {
        self.canvas.set_antialiasing(enabled);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Submission
    // ─────────────────────────────────────────────────────────────────────────

    /// Clip-space transform for screen pixels
    fn screen_to_clip(&self) -> Matrix3 {
        let (w, h) = self.screen.size();
        Matrix3 {
            m: [
                [2.0 / w as f64, 0.0, -1.0],
                [0.0, -2.0 / h as f64, 1.0],
                [0.0, 0.0, 1.0],
            ],
        }
    }

    /// Fails when a vertex buffer of `size` bytes would exceed the device limit
    fn check_buffer_size(&self, size: u64) -> Result<()> {
        let limit = self.device.limits().max_buffer_size;
        if size > limit {
            return Err(GalError::ResourceExhausted(format!(
                "vertex buffer of {size} bytes exceeds the device limit of {limit}"
            )));
        }
        Ok(())
    }

    fn upload_immediate(&mut self) {
        let container = self.canvas.immediate();
        let size = container.byte_size();
        if size == 0 {
            return;
        }
        if let Err(e) = self.check_buffer_size(size) {
            tracing::error!("dropping immediate geometry: {}", e);
            return;
        }

        let need_new_buffer = match &self.immediate_buffer {
            Some(buf) => buf.size() < size,
            None => true,
        };
        if need_new_buffer {
            self.immediate_buffer = Some(self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("GAL Immediate Vertices"),
                size: size.next_power_of_two().min(self.device.limits().max_buffer_size),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
        }

        if let Some(buffer) = &self.immediate_buffer {
            self.queue
                .write_buffer(buffer, 0, bytemuck::cast_slice(container.vertices()));
        }
    }

    fn upload_uniforms(&mut self) {
        let ops_len = self.canvas.ops().len();
        if ops_len > self.uniforms.capacity {
            self.uniforms = UniformRing::new(
                &self.device,
                &self.uniform_layout,
                ops_len.next_power_of_two(),
            );
        }

        let view = self.screen_to_clip() * self.canvas.state().view().world_screen_matrix();
        for (i, op) in self.canvas.ops().iter().enumerate() {
            let matrix = match op {
                FrameOp::Immediate(_) => view,
                FrameOp::Group { transform, .. } => view * *transform,
            };
            let uniforms = OpUniforms {
                transform: matrix.to_mat4_f32(),
            };
            self.queue.write_buffer(
                &self.uniforms.buffer,
                i as u64 * self.uniforms.stride,
                bytemuck::bytes_of(&uniforms),
            );
        }
    }

    /// Render the pending draw list into the main target
    fn submit_batch(&mut self) {
        if self.canvas.ops().is_empty() && !self.clear_pending && self.depth_cleared {
            return;
        }

        self.upload_immediate();
        self.upload_uniforms();

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("GAL Batch Encoder"),
            });

        {
            let background = self.canvas.background_color();
            let color_load = if self.clear_pending {
                wgpu::LoadOp::Clear(wgpu::Color {
                    r: background.r as f64,
                    g: background.g as f64,
                    b: background.b as f64,
                    a: background.a as f64,
                })
            } else {
                wgpu::LoadOp::Load
            };
            let depth_load = if self.depth_cleared && !self.clear_pending {
                wgpu::LoadOp::Load
            } else {
                wgpu::LoadOp::Clear(1.0)
            };

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("GAL Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.screen.main_view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: color_load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.screen.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for (i, op) in self.canvas.ops().iter().enumerate() {
                let offset = (i as u64 * self.uniforms.stride) as u32;
                pass.set_bind_group(0, &self.uniforms.bind_group, &[offset]);

                match op {
                    FrameOp::Immediate(runs) => {
                        let Some(buffer) = &self.immediate_buffer else {
                            continue;
                        };
                        let container = self.canvas.immediate();
                        pass.set_vertex_buffer(0, buffer.slice(..));
                        draw_runs(&mut pass, &self.pipelines, container, runs.clone());
                    }
                    FrameOp::Group { id, .. } => {
                        let (Some(buffer), Some(container)) =
                            (self.group_buffers.get(id), self.canvas.group(*id))
                        else {
                            continue;
                        };
                        pass.set_vertex_buffer(0, buffer.slice(..));
                        draw_runs(&mut pass, &self.pipelines, container, 0..container.runs().len());
                    }
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        self.clear_pending = false;
        self.depth_cleared = true;
        self.canvas.finish_batch();
    }

    fn upload_group(&mut self, id: GroupId) {
        let Some(container) = self.canvas.group(id) else {
            return;
        };
        if container.is_empty() {
            return;
        }
        if let Err(e) = self.check_buffer_size(container.byte_size()) {
            tracing::error!("group {:?} not uploaded: {}", id, e);
            return;
        }

        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("GAL Group Vertices"),
                contents: bytemuck::cast_slice(container.vertices()),
                usage: wgpu::BufferUsages::VERTEX,
            });
        self.group_buffers.insert(id, buffer);
    }

    fn apply_cursor_plan(&mut self, plan: CursorPlan) {
        if plan.is_empty() {
            return;
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Cursor Encoder"),
            });
        if let Some(rect) = plan.restore {
            self.screen.restore_region(&mut encoder, rect);
        }
        if let Some(rect) = plan.save {
            self.screen.save_region(&mut encoder, rect);
        }
        self.queue.submit(std::iter::once(encoder.finish()));

        // texture writes land before the next submission
        for stroke in &plan.strokes {
            let pixels = self.cursor.stroke_pixels(stroke);
            self.screen.write_region(&self.queue, *stroke, &pixels);
        }
    }

    /// Blit the main target to the surface and present it
    fn present(&mut self) {
        let Some(target) = &self.surface else {
            // headless: flush pending texture writes
            self.queue.submit(std::iter::empty());
            return;
        };

        let frame = match target.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                tracing::warn!("surface lost, reconfiguring");
                target.surface.configure(&self.device, &target.config);
                return;
            }
            Err(e) => {
                tracing::warn!("failed to acquire surface texture: {}", e);
                return;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Blit Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Blit Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.pipelines.blit);
            pass.set_bind_group(0, &self.blit_bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }
}

fn draw_runs(
    pass: &mut wgpu::RenderPass<'_>,
    pipelines: &Pipelines,
    container: &VertexContainer,
    runs: std::ops::Range<usize>,
) {
    let mut current: Option<ShaderProgram> = None;
    for run in container.runs().get(runs).unwrap_or(&[]) {
        if current != Some(run.program) {
            pass.set_pipeline(pipelines.get(run.program));
            current = Some(run.program);
        }
        pass.draw(run.vertices.clone(), 0..1);
    }
}

fn report_init_failure(error: GalError) -> GalError {
    tracing::error!("GPU backend initialization failed: {}", error);
    error
}

impl Gal for GpuGal {
    fn state(&self) -> &GalState {
        self.canvas.state()
    }

    fn state_mut(&mut self) -> &mut GalState {
        self.canvas.state_mut()
    }

    fn begin_drawing(&mut self) {
        self.canvas.begin_drawing();
        self.depth_cleared = false;
    }

    fn end_drawing(&mut self) {
        self.canvas.end_drawing();
        self.submit_batch();

        // the scene under the cursor changed
        self.cursor.invalidate();
        if let Some(position) = self.cursor.position() {
            let plan = self.cursor.plan_move(position, self.screen.size());
            self.apply_cursor_plan(plan);
        }
        self.present();
    }

    fn flush(&mut self) {
        self.submit_batch();
    }

    fn clear_screen(&mut self) {
        self.canvas.clear_screen();
        self.clear_pending = true;
    }

    fn resize_screen(&mut self, width: u32, height: u32) {
        self.canvas.resize_screen(width.max(1), height.max(1));
        if self.screen.resize(&self.device, width, height) {
            self.blit_bind_group = Self::create_blit_bind_group(
                &self.device,
                &self.blit_layout,
                &self.screen,
                &self.sampler,
            );
            self.cursor.invalidate();
            self.clear_pending = true;
        }
        if let Some(target) = &mut self.surface {
            target.config.width = width.max(1);
            target.config.height = height.max(1);
            target.surface.configure(&self.device, &target.config);
        }
    }

    fn draw_line(&mut self, start: Vector2, end: Vector2) {
        self.canvas.draw_line(start, end);
    }

    fn draw_polyline(&mut self, points: &[Vector2]) {
        self.canvas.draw_polyline(points);
    }

    fn draw_circle(&mut self, center: Vector2, radius: f64) {
        self.canvas.draw_circle(center, radius);
    }

    fn draw_arc(&mut self, center: Vector2, radius: f64, start_angle: f64, end_angle: f64) {
        self.canvas.draw_arc(center, radius, start_angle, end_angle);
    }

    fn draw_rectangle(&mut self, start: Vector2, end: Vector2) {
        self.canvas.draw_rectangle(start, end);
    }

    fn draw_polygon(&mut self, points: &[Vector2]) {
        self.canvas.draw_polygon(points);
    }

    fn draw_curve(&mut self, start: Vector2, control_a: Vector2, control_b: Vector2, end: Vector2) {
        self.canvas.draw_curve(start, control_a, control_b, end);
    }

    fn begin_group(&mut self) -> GroupId {
        self.canvas.begin_group()
    }

    fn end_group(&mut self) {
        if let Some(id) = self.canvas.end_group() {
            self.upload_group(id);
        }
    }

    fn draw_group(&mut self, group: GroupId) {
        self.canvas.draw_group(group);
    }

    fn delete_group(&mut self, group: GroupId) {
        self.canvas.delete_group(group);
        self.group_buffers.remove(&group);
    }

    fn group_count(&self) -> usize {
        self.canvas.group_count()
    }

    fn save_screen(&mut self) {
        self.submit_batch();
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Save Screen Encoder"),
            });
        self.screen.save_screen(&mut encoder);
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    fn restore_screen(&mut self) {
        self.submit_batch();
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Restore Screen Encoder"),
            });
        if !self.screen.restore_screen(&mut encoder) {
            tracing::warn!("restore_screen() without a saved screen");
            return;
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        self.cursor.invalidate();
    }

    fn set_cursor_enabled(&mut self, enabled: bool) {
        let plan = self.cursor.set_enabled(enabled);
        self.apply_cursor_plan(plan);
    }

    fn draw_cursor(&mut self, position: Vector2) {
        let plan = self.cursor.plan_move(position, self.screen.size());
        self.apply_cursor_plan(plan);
        self.present();
    }
}
