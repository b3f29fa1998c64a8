//! Board items
//!
//! Only the geometric parameters the painter needs. Coordinates and sizes
//! are world units, angles are radians.

use std::any::Any;

use smallvec::{smallvec, SmallVec};

use copper_core::{Box2, TextAttributes, Vector2};
use copper_font::StrokeFont;
use copper_view::{LayerId, UpdateFlags, ViewItem, ViewItemBase};

use crate::layers::ItemLayer;

// ─────────────────────────────────────────────────────────────────────────────
// Item Kinds
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub start: Vector2,
    pub end: Vector2,
    pub width: f64,
    pub layer: LayerId,
    pub net: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Via {
    pub position: Vector2,
    pub width: f64,
    pub drill: f64,
    pub net: i32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PadShape {
    #[default]
    Circle,
    Oval,
    Rect,
    Trapezoid,
    Octagon,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DrillShape {
    #[default]
    Circle,
    Oval,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pad {
    pub position: Vector2,
    pub size: Vector2,
    /// Offset of the pad shape from the hole
    pub offset: Vector2,
    /// Zero for SMD pads
    pub drill: Vector2,
    pub drill_shape: DrillShape,
    pub shape: PadShape,
    pub orientation: f64,
    pub name: String,
    pub netname: String,
    pub net: i32,
    /// Layers the pad shape is drawn on
    pub layers: SmallVec<[LayerId; 4]>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SegmentShape {
    Segment {
        start: Vector2,
        end: Vector2,
    },
    Rect {
        start: Vector2,
        end: Vector2,
    },
    Arc {
        center: Vector2,
        radius: f64,
        start_angle: f64,
        /// Signed sweep from `start_angle`
        angle: f64,
    },
    Circle {
        center: Vector2,
        radius: f64,
    },
    Polygon(Vec<Vector2>),
    Curve {
        start: Vector2,
        control_a: Vector2,
        control_b: Vector2,
        end: Vector2,
    },
}

/// Graphic line, arc or outline on a non-copper layer
#[derive(Clone, Debug, PartialEq)]
pub struct DrawSegment {
    pub shape: SegmentShape,
    pub width: f64,
    pub layer: LayerId,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoardText {
    pub text: String,
    pub position: Vector2,
    pub orientation: f64,
    pub attributes: TextAttributes,
    pub thickness: f64,
    pub layer: LayerId,
}

/// Copper zone with its already computed fill
#[derive(Clone, Debug, PartialEq)]
pub struct Zone {
    /// Closed contours of the filled area
    pub contours: Vec<Vec<Vector2>>,
    pub filled: bool,
    pub thermal_bridge_width: f64,
    pub layer: LayerId,
    pub net: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Dimension {
    pub crossbar: [Vector2; 2],
    pub feature_lines: [[Vector2; 2]; 2],
    pub arrows: [[Vector2; 2]; 4],
    pub width: f64,
    pub layer: LayerId,
    pub text: BoardText,
}

impl Dimension {
    /// Every line of the dimension, crossbar first
    pub fn lines(&self) -> impl Iterator<Item = [Vector2; 2]> + '_ {
        std::iter::once(self.crossbar)
            .chain(self.feature_lines.iter().copied())
            .chain(self.arrows.iter().copied())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TargetShape {
    #[default]
    Plus,
    Cross,
}

/// Alignment target
#[derive(Clone, Debug, PartialEq)]
pub struct Target {
    pub position: Vector2,
    pub size: f64,
    pub width: f64,
    pub shape: TargetShape,
    pub layer: LayerId,
}

impl Target {
    pub fn radius(&self) -> f64 {
        match self.shape {
            TargetShape::Cross => self.size / 2.0,
            TargetShape::Plus => self.size / 3.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ItemKind {
    Track(Track),
    Via(Via),
    Pad(Pad),
    Segment(DrawSegment),
    Text(BoardText),
    Zone(Zone),
    Dimension(Dimension),
    Target(Target),
}

// ─────────────────────────────────────────────────────────────────────────────
// Board Item
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct BoardItem {
    base: ViewItemBase,
    kind: ItemKind,
}

impl BoardItem {
    pub fn new(kind: impl Into<ItemKind>) -> Self {
        Self {
            base: ViewItemBase::new(),
            kind: kind.into(),
        }
    }

    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    /// Change the item and schedule a redraw
    pub fn edit(&mut self, f: impl FnOnce(&mut ItemKind)) {
        f(&mut self.kind);
        self.view_update(UpdateFlags::GEOMETRY | UpdateFlags::APPEARANCE, false);
    }
}

macro_rules! impl_into_kind {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for ItemKind {
                fn from(item: $ty) -> Self {
                    ItemKind::$variant(item)
                }
            }
        )*
    };
}

impl_into_kind! {
    Track => Track,
    Via => Via,
    Pad => Pad,
    DrawSegment => Segment,
    BoardText => Text,
    Zone => Zone,
    Dimension => Dimension,
    Target => Target,
}

fn around(center: Vector2, radius: f64) -> Box2 {
    Box2::new(center, Vector2::ZERO).inflate(radius)
}

/// Bounds of `text` for any rotation and justification
fn text_bbox(text: &BoardText) -> Box2 {
    let font = StrokeFont::new();
    let size = text.attributes.glyph_size;
    let width = text
        .text
        .split('\n')
        .map(|line| {
            font.compute_text_extents(line, size, text.thickness, text.attributes.italic)
                .width
        })
        .fold(0.0, f64::max);
    let height = StrokeFont::lines_count(&text.text) as f64
        * StrokeFont::interline(size.y, text.thickness);

    around(text.position, width.hypot(height))
}

fn segment_bbox(segment: &DrawSegment) -> Box2 {
    let bbox = match &segment.shape {
        SegmentShape::Segment { start, end } | SegmentShape::Rect { start, end } => {
            Box2::compute(&[*start, *end])
        }
        SegmentShape::Arc { center, radius, .. } | SegmentShape::Circle { center, radius } => {
            around(*center, *radius)
        }
        SegmentShape::Polygon(points) => Box2::compute(points),
        SegmentShape::Curve {
            start,
            control_a,
            control_b,
            end,
        } => Box2::compute(&[*start, *control_a, *control_b, *end]),
    };
    bbox.inflate(segment.width / 2.0)
}

impl ViewItem for BoardItem {
    fn view_bbox(&self) -> Box2 {
        match &self.kind {
            ItemKind::Track(track) => {
                Box2::compute(&[track.start, track.end]).inflate(track.width / 2.0)
            }
            ItemKind::Via(via) => around(via.position, via.width.max(via.drill) / 2.0),
            ItemKind::Pad(pad) => {
                let reach = (pad.size / 2.0).length().max((pad.drill / 2.0).length());
                around(pad.position, reach + pad.offset.length())
            }
            ItemKind::Segment(segment) => segment_bbox(segment),
            ItemKind::Text(text) => text_bbox(text),
            ItemKind::Zone(zone) => {
                let points: Vec<Vector2> = zone.contours.iter().flatten().copied().collect();
                Box2::compute(&points).inflate(zone.thermal_bridge_width / 2.0)
            }
            ItemKind::Dimension(dimension) => {
                let points: Vec<Vector2> = dimension.lines().flatten().collect();
                Box2::compute(&points)
                    .inflate(dimension.width / 2.0)
                    .merge(&text_bbox(&dimension.text))
            }
            ItemKind::Target(target) => around(target.position, target.size / 2.0),
        }
    }

    fn view_layers(&self) -> SmallVec<[LayerId; 4]> {
        match &self.kind {
            ItemKind::Track(track) => smallvec![track.layer],
            ItemKind::Via(via) => {
                let mut layers = smallvec![ItemLayer::Vias.id()];
                if via.drill > 0.0 {
                    layers.push(ItemLayer::ViaHoles.id());
                }
                layers
            }
            ItemKind::Pad(pad) => {
                let mut layers = pad.layers.clone();
                if pad.drill.x > 0.0 && pad.drill.y > 0.0 {
                    layers.push(ItemLayer::PadHoles.id());
                }
                layers.push(ItemLayer::NetNames.id());
                layers
            }
            ItemKind::Segment(segment) => smallvec![segment.layer],
            ItemKind::Text(text) => smallvec![text.layer],
            ItemKind::Zone(zone) => smallvec![zone.layer],
            ItemKind::Dimension(dimension) => smallvec![dimension.layer],
            ItemKind::Target(target) => smallvec![target.layer],
        }
    }

    fn base(&self) -> &ViewItemBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ViewItemBase {
        &mut self.base
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers;

    fn pad() -> Pad {
        Pad {
            position: Vector2::new(100.0, 100.0),
            size: Vector2::new(60.0, 80.0),
            drill: Vector2::new(30.0, 30.0),
            shape: PadShape::Oval,
            layers: smallvec![layers::FRONT_COPPER, layers::BACK_COPPER],
            ..Pad::default()
        }
    }

    #[test]
    fn test_pad_layers() {
        let item = BoardItem::new(pad());
        assert_eq!(
            item.view_layers().as_slice(),
            &[
                layers::FRONT_COPPER,
                layers::BACK_COPPER,
                ItemLayer::PadHoles.id(),
                ItemLayer::NetNames.id()
            ]
        );

        let smd = BoardItem::new(Pad {
            drill: Vector2::ZERO,
            ..pad()
        });
        assert!(!smd.view_layers().contains(&ItemLayer::PadHoles.id()));
    }

    #[test]
    fn test_via_layers() {
        let via = Via {
            position: Vector2::ZERO,
            width: 10.0,
            drill: 4.0,
            net: 1,
        };
        let item = BoardItem::new(via);
        assert_eq!(
            item.view_layers().as_slice(),
            &[ItemLayer::Vias.id(), ItemLayer::ViaHoles.id()]
        );
        assert_eq!(item.view_bbox().width(), 10.0);
    }

    #[test]
    fn test_track_bbox_includes_width() {
        let item = BoardItem::new(Track {
            start: Vector2::new(0.0, 0.0),
            end: Vector2::new(100.0, 0.0),
            width: 10.0,
            layer: layers::FRONT_COPPER,
            net: 0,
        });
        let bbox = item.view_bbox();
        assert_eq!(bbox.origin, Vector2::new(-5.0, -5.0));
        assert_eq!(bbox.end(), Vector2::new(105.0, 5.0));
    }

    #[test]
    fn test_text_bbox_covers_rotations() {
        let text = BoardText {
            text: "ABC".to_string(),
            position: Vector2::new(50.0, 50.0),
            orientation: 0.0,
            attributes: TextAttributes {
                glyph_size: Vector2::new(10.0, 10.0),
                ..TextAttributes::default()
            },
            thickness: 1.0,
            layer: layers::FRONT_SILKSCREEN,
        };
        let bbox = BoardItem::new(text).view_bbox();
        assert!(bbox.contains(Vector2::new(50.0 + 25.0, 50.0)));
        assert!(bbox.contains(Vector2::new(50.0, 50.0 - 25.0)));
    }

    #[test]
    fn test_edit_schedules_update() {
        let mut item = BoardItem::new(Target {
            position: Vector2::ZERO,
            size: 30.0,
            width: 1.0,
            shape: TargetShape::Cross,
            layer: layers::EDGE_CUTS,
        });
        assert!(item.base().pending_update().is_empty());

        item.edit(|kind| {
            if let ItemKind::Target(target) = kind {
                target.size = 60.0;
            }
        });
        assert!(item.base().pending_update().contains(UpdateFlags::GEOMETRY));
        assert_eq!(item.view_bbox().width(), 60.0);
    }

    #[test]
    fn test_target_radius() {
        let mut target = Target {
            position: Vector2::ZERO,
            size: 30.0,
            width: 1.0,
            shape: TargetShape::Cross,
            layer: layers::EDGE_CUTS,
        };
        assert_eq!(target.radius(), 15.0);
        target.shape = TargetShape::Plus;
        assert_eq!(target.radius(), 10.0);
    }

    #[test]
    fn test_dimension_lines() {
        let p = |x: f64| Vector2::new(x, 0.0);
        let dimension = Dimension {
            crossbar: [p(0.0), p(1.0)],
            feature_lines: [[p(2.0), p(3.0)], [p(4.0), p(5.0)]],
            arrows: [[p(6.0), p(7.0)]; 4],
            width: 1.0,
            layer: layers::DRAWINGS,
            text: BoardText {
                text: String::new(),
                position: Vector2::ZERO,
                orientation: 0.0,
                attributes: TextAttributes::default(),
                thickness: 0.1,
                layer: layers::DRAWINGS,
            },
        };
        assert_eq!(dimension.lines().count(), 7);
        assert_eq!(dimension.lines().next(), Some([p(0.0), p(1.0)]));
    }
}
