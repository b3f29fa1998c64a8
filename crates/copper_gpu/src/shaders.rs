//! WGSL shaders
//!
//! One module draws all tessellated geometry; its three fragment entry
//! points are the shader programs selected per run. A second module blits
//! the off-screen main target to the window surface.

/// Geometry shader with the `fs_solid`, `fs_fill_edge` and `fs_hairline`
/// fragment programs
pub const GAL_SHADER: &str = r#"
// ============================================================================
// Copper GAL Geometry Shader
// ============================================================================

struct Uniforms {
    // model -> world -> screen -> clip, one per draw op
    transform: mat4x4<f32>,
}

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) depth: f32,
    @location(2) edge: f32,
    @location(3) color: vec4<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) edge: f32,
}

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let p = uniforms.transform * vec4<f32>(in.position, 0.0, 1.0);
    out.clip_position = vec4<f32>(p.xy, in.depth, 1.0);
    out.color = in.color;
    out.edge = in.edge;
    return out;
}

@fragment
fn fs_solid(in: VertexOutput) -> @location(0) vec4<f32> {
    return in.color;
}

// Filled shapes: fade the last pixel before the geometric edge
@fragment
fn fs_fill_edge(in: VertexOutput) -> @location(0) vec4<f32> {
    let w = max(fwidth(in.edge), 1e-6);
    let coverage = clamp((1.0 - abs(in.edge)) / w, 0.0, 1.0);
    return vec4<f32>(in.color.rgb, in.color.a * coverage);
}

// Strokes: like fill_edge, but lines narrower than a pixel fade out
// proportionally to their width instead of breaking up
@fragment
fn fs_hairline(in: VertexOutput) -> @location(0) vec4<f32> {
    let w = max(fwidth(in.edge), 1e-6);
    let edge = clamp((1.0 - abs(in.edge)) / w + 0.5, 0.0, 1.0);
    let thin = clamp(2.0 / w, 0.25, 1.0);
    return vec4<f32>(in.color.rgb, in.color.a * edge * thin);
}
"#;

/// Fullscreen blit of the main target
pub const BLIT_SHADER: &str = r#"
// ============================================================================
// Copper Screen Blit
// ============================================================================

@group(0) @binding(0)
var screen_texture: texture_2d<f32>;
@group(0) @binding(1)
var screen_sampler: sampler;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}

// one triangle covering the viewport
@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> VertexOutput {
    var out: VertexOutput;
    let uv = vec2<f32>(f32((index << 1u) & 2u), f32(index & 2u));
    out.position = vec4<f32>(uv.x * 2.0 - 1.0, 1.0 - uv.y * 2.0, 0.0, 1.0);
    out.uv = uv;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(screen_texture, screen_sampler, in.uv);
}
"#;
