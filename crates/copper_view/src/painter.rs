//! Painter contract

use std::any::Any;

use copper_core::Gal;

use crate::item::LayerId;

/// Translates scene items into GAL calls
///
/// A painter inspects the concrete item type behind `item` and returns
/// `false` when it does not know how to draw it, in which case the view
/// falls back to [`crate::ViewItem::view_draw`].
pub trait Painter {
    fn draw(&mut self, gal: &mut dyn Gal, item: &dyn Any, layer: LayerId) -> bool;
}

/// Painter that recognises nothing; every item draws itself
#[derive(Clone, Copy, Debug, Default)]
pub struct ItemPainter;

impl Painter for ItemPainter {
    fn draw(&mut self, _gal: &mut dyn Gal, _item: &dyn Any, _layer: LayerId) -> bool {
        false
    }
}
