//! Board layer numbering
//!
//! Board layers (copper and technical) take ids `0..LAYER_COUNT`. Layers
//! that only exist for display, such as via holes or pad names, follow
//! them as [`ItemLayer`]s.

use copper_view::LayerId;

pub const COPPER_LAYER_COUNT: i32 = 16;

/// Number of board layers; item layers start here
pub const LAYER_COUNT: i32 = 32;

pub const BACK_COPPER: LayerId = LayerId(0);
pub const FRONT_COPPER: LayerId = LayerId(COPPER_LAYER_COUNT - 1);
pub const BACK_ADHESIVE: LayerId = LayerId(16);
pub const FRONT_ADHESIVE: LayerId = LayerId(17);
pub const BACK_PASTE: LayerId = LayerId(18);
pub const FRONT_PASTE: LayerId = LayerId(19);
pub const BACK_SILKSCREEN: LayerId = LayerId(20);
pub const FRONT_SILKSCREEN: LayerId = LayerId(21);
pub const BACK_MASK: LayerId = LayerId(22);
pub const FRONT_MASK: LayerId = LayerId(23);
pub const DRAWINGS: LayerId = LayerId(24);
pub const COMMENTS: LayerId = LayerId(25);
pub const ECO1: LayerId = LayerId(26);
pub const ECO2: LayerId = LayerId(27);
pub const EDGE_CUTS: LayerId = LayerId(28);

/// Inner copper layer `n`, counted from the back (`1..=14`)
pub fn inner_copper(n: i32) -> LayerId {
    debug_assert!((1..COPPER_LAYER_COUNT - 1).contains(&n));
    LayerId(n)
}

pub fn is_copper(layer: LayerId) -> bool {
    (0..COPPER_LAYER_COUNT).contains(&layer.0)
}

pub fn is_board_layer(layer: LayerId) -> bool {
    (0..LAYER_COUNT).contains(&layer.0)
}

/// Display-only layers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ItemLayer {
    Vias = 0,
    ViaHoles,
    Pads,
    PadHoles,
    Tracks,
    NetNames,
}

impl ItemLayer {
    pub const COUNT: usize = 6;

    pub const ALL: [ItemLayer; Self::COUNT] = [
        ItemLayer::Vias,
        ItemLayer::ViaHoles,
        ItemLayer::Pads,
        ItemLayer::PadHoles,
        ItemLayer::Tracks,
        ItemLayer::NetNames,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn id(self) -> LayerId {
        LayerId(LAYER_COUNT + self as i32)
    }

    pub fn from_id(layer: LayerId) -> Option<ItemLayer> {
        let index = usize::try_from(layer.0 - LAYER_COUNT).ok()?;
        Self::ALL.get(index).copied()
    }
}

/// Layers from the topmost to the bottommost
///
/// Pad names sit above holes, holes above the front copper, and the back of
/// the board is drawn last.
pub fn draw_order() -> Vec<LayerId> {
    let mut order = vec![
        ItemLayer::NetNames.id(),
        ItemLayer::ViaHoles.id(),
        ItemLayer::PadHoles.id(),
        ItemLayer::Vias.id(),
        ItemLayer::Pads.id(),
        DRAWINGS,
        COMMENTS,
        ECO1,
        ECO2,
        EDGE_CUTS,
        FRONT_SILKSCREEN,
        FRONT_PASTE,
        FRONT_ADHESIVE,
        FRONT_MASK,
    ];
    order.extend((0..COPPER_LAYER_COUNT).rev().map(LayerId));
    order.extend([BACK_MASK, BACK_ADHESIVE, BACK_PASTE, BACK_SILKSCREEN]);
    order
}

/// Register every board and item layer with `view`, depths following
/// [`draw_order`]
pub fn add_board_layers(view: &mut copper_view::View) {
    for (depth, layer) in draw_order().into_iter().enumerate() {
        view.add_layer(layer, depth as f64);
    }
}
