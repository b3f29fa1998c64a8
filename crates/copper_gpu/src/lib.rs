//! Copper GPU Backend
//!
//! Hardware implementation of the [`copper_core::Gal`] trait using wgpu.
//!
//! # Features
//!
//! - **Tessellation**: lines, arcs, circles and polygons become depth-tagged
//!   triangles; later primitives of a layer draw over earlier ones
//! - **Groups**: retained vertex buffers replayed under a transform
//! - **Antialiasing**: per-program edge fading for fills and hairlines
//! - **Screen buffers**: off-screen main target with full-screen
//!   save/restore and a crosshair cursor overlay

pub mod backbuffer;
pub mod canvas;
pub mod container;
pub mod cursor;
pub mod renderer;
pub mod shaders;
pub mod tables;
pub mod tessellator;

pub use backbuffer::{ScreenBuffers, DEPTH_FORMAT, SCREEN_FORMAT};
pub use canvas::{Canvas, FrameOp};
pub use container::{GalVertex, Run, ShaderProgram, VertexContainer};
pub use cursor::{CursorOverlay, CursorPlan, PixelRect};
pub use renderer::GpuGal;
pub use shaders::{BLIT_SHADER, GAL_SHADER};
pub use tables::{unit_tables, UnitTables};
pub use tessellator::{Tessellator, DEPTH_ADJUST_FACTOR};
