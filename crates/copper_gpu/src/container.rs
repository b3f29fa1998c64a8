//! Vertex storage
//!
//! Triangles are stored non-indexed, in draw order. Consecutive triangles
//! that use the same shader program form one [`Run`], which becomes one
//! draw call.

use std::ops::Range;

/// A vertex of tessellated GAL geometry
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GalVertex {
    /// World position (or group-local position for recorded groups)
    pub position: [f32; 2],
    /// Normalized depth, `0.0` nearest
    pub depth: f32,
    /// Antialiasing edge coordinate: `0` inside, `±1` on the geometric edge
    pub edge: f32,
    pub color: [f32; 4],
}

/// Fragment program a run of triangles is drawn with
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderProgram {
    /// Flat color, no antialiasing
    Solid,
    /// Filled geometry with antialiased outer edges
    FillEdge,
    /// Stroked geometry; fades sub-pixel lines instead of dropping them
    Hairline,
}

/// Contiguous vertices drawn with one program
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Run {
    pub program: ShaderProgram,
    pub vertices: Range<u32>,
}

/// Growable triangle list with program runs
#[derive(Clone, Debug, Default)]
pub struct VertexContainer {
    vertices: Vec<GalVertex>,
    runs: Vec<Run>,
    sealed: bool,
}

impl VertexContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            ..Self::default()
        }
    }

    pub fn push_triangle(&mut self, program: ShaderProgram, triangle: [GalVertex; 3]) {
        let start = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&triangle);
        let end = self.vertices.len() as u32;

        match self.runs.last_mut() {
            Some(run) if !self.sealed && run.program == program && run.vertices.end == start => {
                run.vertices.end = end;
            }
            _ => self.runs.push(Run {
                program,
                vertices: start..end,
            }),
        }
        self.sealed = false;
    }

    /// Stop the next triangle from extending the current run
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn vertices(&self) -> &[GalVertex] {
        &self.vertices
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.runs.clear();
        self.sealed = false;
    }

    /// Size of the vertex data in bytes
    pub fn byte_size(&self) -> u64 {
        (std::mem::size_of::<GalVertex>() * self.vertices.len()) as u64
    }
}
