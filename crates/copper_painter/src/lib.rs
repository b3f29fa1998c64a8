//! Copper PCB Painter
//!
//! Draws printed circuit board items through the GAL:
//!
//! - **Board items**: [`BoardItem`] wraps tracks, vias, pads, graphic
//!   segments, texts, zones, dimensions and targets as view items
//! - **Layers**: board and display-only layer numbering, plus the default
//!   stacking order for a [`copper_view::View`]
//! - **Settings**: [`RenderSettings`] holds layer colors, highlight and high
//!   contrast modes and sketch (outline) flags, loadable from TOML
//! - **Painter**: [`PcbPainter`] implements [`copper_view::Painter`]
//!
//! # Example
//!
//! ```rust
//! use copper_core::{RecordingGal, Gal, Vector2};
//! use copper_painter::{layers, BoardItem, PcbPainter, RenderSettings, Track};
//! use copper_view::{CachePolicy, View};
//!
//! let mut view = View::new(CachePolicy::Groups);
//! layers::add_board_layers(&mut view);
//!
//! let mut items = vec![BoardItem::new(Track {
//!     start: Vector2::new(0.0, 0.0),
//!     end: Vector2::new(1_000_000.0, 0.0),
//!     width: 250_000.0,
//!     layer: layers::FRONT_COPPER,
//!     net: 1,
//! })];
//!
//! let mut gal = RecordingGal::new();
//! let mut painter = PcbPainter::new(RenderSettings::default());
//! gal.begin_drawing();
//! view.redraw(&mut gal, &mut painter, &mut items);
//! gal.end_drawing();
//!
//! assert_eq!(gal.group_count(), 1);
//! ```

pub mod board;
pub mod layers;
pub mod painter;
pub mod settings;

pub use board::{
    BoardItem, BoardText, Dimension, DrawSegment, DrillShape, ItemKind, Pad, PadShape,
    SegmentShape, Target, TargetShape, Track, Via, Zone,
};
pub use layers::ItemLayer;
pub use painter::{PcbPainter, MAX_FONT_SIZE};
pub use settings::{RenderSettings, SketchMode};
