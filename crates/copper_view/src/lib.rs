//! Copper View
//!
//! Scene items, painters and the retained group cache:
//!
//! - **Items**: [`ViewItem`] reports bounds and layers and owns its cached
//!   (layer, group) pairs
//! - **Painters**: [`Painter`] turns an item into GAL calls
//! - **Cache**: [`GroupCache`] records each item/layer into a GAL group once
//!   and replays it until the item changes
//! - **View**: [`View`] draws items layer by layer with bounding box culling

pub mod cache;
pub mod item;
pub mod painter;
pub mod view;

pub use cache::{CachePolicy, CacheStats, GroupCache};
pub use item::{ItemGroups, LayerId, UpdateFlags, ViewItem, ViewItemBase};
pub use painter::{ItemPainter, Painter};
pub use view::{View, ViewLayer};
