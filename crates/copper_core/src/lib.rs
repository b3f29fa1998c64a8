//! Copper Core
//!
//! Foundation of the Copper 2D CAD renderer:
//!
//! - **Geometry**: `f64` vectors, affine matrices and boxes in world units
//! - **GAL**: the [`Gal`] drawing-primitive trait every backend implements
//! - **State**: pen/fill/text attributes with a save stack and the
//!   world/screen mapping
//! - **Groups**: generation-checked handles to retained primitive sequences
//! - **Recording**: an in-memory backend for display-list dumps and tests
//!
//! # Example
//!
//! ```rust
//! use copper_core::{Gal, GalExt, RecordingGal, Vector2};
//!
//! let mut gal = RecordingGal::new();
//! gal.begin_drawing();
//! {
//!     let mut gal = gal.scoped();
//!     gal.translate(Vector2::new(10.0, 0.0));
//!     gal.draw_line(Vector2::ZERO, Vector2::new(0.0, 10.0));
//! }
//! gal.end_drawing();
//!
//! assert_eq!(gal.commands()[0].world_points()[0], Vector2::new(10.0, 0.0));
//! ```

pub mod color;
pub mod config;
pub mod error;
pub mod gal;
pub mod geometry;
pub mod group;
pub mod recording;
pub mod state;

pub use color::Color;
pub use config::GalConfig;
pub use error::{GalError, Result};
pub use gal::{Gal, GalExt, StateGuard};
pub use geometry::{Box2, Matrix3, Vector2};
pub use group::{GroupId, GroupStore};
pub use recording::{DrawCommand, Primitive, RecordingGal};
pub use state::{
    Attributes, GalState, HorizontalJustify, LineCap, LineJoin, TextAttributes, VerticalJustify,
    WorldView,
};
