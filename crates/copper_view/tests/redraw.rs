//! View redraw against the recording backend

use std::any::Any;

use copper_core::{Box2, Gal, RecordingGal, Vector2};
use copper_view::{CachePolicy, LayerId, Painter, UpdateFlags, View, ViewItem, ViewItemBase};
use smallvec::{smallvec, SmallVec};

const TOP: LayerId = LayerId(0);
const BOTTOM: LayerId = LayerId(31);

struct Marker {
    base: ViewItemBase,
    at: Vector2,
    layers: SmallVec<[LayerId; 4]>,
}

impl Marker {
    fn new(at: Vector2, layers: &[LayerId]) -> Self {
        Self {
            base: ViewItemBase::new(),
            at,
            layers: layers.iter().copied().collect(),
        }
    }
}

impl ViewItem for Marker {
    fn view_bbox(&self) -> Box2 {
        Box2::new(self.at, Vector2::ZERO).inflate(1.0)
    }

    fn view_layers(&self) -> SmallVec<[LayerId; 4]> {
        self.layers.clone()
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

/// Draws markers as circles and counts the calls it received
#[derive(Default)]
struct MarkerPainter {
    calls: Vec<LayerId>,
}

impl Painter for MarkerPainter {
    fn draw(&mut self, gal: &mut dyn Gal, item: &dyn Any, layer: LayerId) -> bool {
        let Some(marker) = item.downcast_ref::<Marker>() else {
            return false;
        };
        self.calls.push(layer);
        gal.draw_circle(marker.at, 0.5);
        true
    }
}

fn view() -> View {
    let mut view = View::new(CachePolicy::Groups);
    view.add_layer(TOP, -10.0);
    view.add_layer(BOTTOM, 10.0);
    view
}

fn frame(view: &mut View, gal: &mut RecordingGal, painter: &mut MarkerPainter, items: &mut [Marker]) {
    gal.begin_drawing();
    view.redraw(gal, painter, items);
    gal.end_drawing();
}

#[test]
fn test_items_drawn_per_layer_far_to_near() {
    let mut gal = RecordingGal::new();
    let mut painter = MarkerPainter::default();
    let mut view = view();
    let mut items = vec![Marker::new(Vector2::new(1.0, 1.0), &[TOP, BOTTOM])];

    frame(&mut view, &mut gal, &mut painter, &mut items);

    assert_eq!(painter.calls, vec![BOTTOM, TOP]);
    let depths: Vec<f64> = gal
        .commands()
        .iter()
        .map(|c| c.attributes.layer_depth)
        .collect();
    assert_eq!(depths, vec![10.0, -10.0]);
    assert_eq!(gal.group_count(), 2);
}

#[test]
fn test_cached_items_are_not_repainted() {
    let mut gal = RecordingGal::new();
    let mut painter = MarkerPainter::default();
    let mut view = view();
    let mut items = vec![
        Marker::new(Vector2::new(1.0, 1.0), &[TOP]),
        Marker::new(Vector2::new(5.0, 5.0), &[BOTTOM]),
    ];

    frame(&mut view, &mut gal, &mut painter, &mut items);
    frame(&mut view, &mut gal, &mut painter, &mut items);

    assert_eq!(painter.calls.len(), 2);
    assert_eq!(gal.replayed_groups().len(), 2);
    assert_eq!(gal.commands().len(), 2);
}

#[test]
fn test_update_repaints_without_leaking_groups() {
    let mut gal = RecordingGal::new();
    let mut painter = MarkerPainter::default();
    let mut view = view();
    let mut items = vec![Marker::new(Vector2::new(1.0, 1.0), &[TOP])];
    frame(&mut view, &mut gal, &mut painter, &mut items);

    for _ in 0..3 {
        items[0].at += Vector2::new(1.0, 0.0);
        items[0].view_update(UpdateFlags::GEOMETRY, false);
        frame(&mut view, &mut gal, &mut painter, &mut items);
        frame(&mut view, &mut gal, &mut painter, &mut items);
    }

    assert_eq!(gal.group_count(), 1);
    assert_eq!(gal.commands()[0].world_points()[0], Vector2::new(4.0, 1.0));
}

#[test]
fn test_hidden_layers_items_and_culling() {
    let mut gal = RecordingGal::new();
    let mut painter = MarkerPainter::default();
    let mut view = view();
    let mut items = vec![
        Marker::new(Vector2::new(0.0, 0.0), &[TOP]),
        Marker::new(Vector2::new(0.0, 0.0), &[BOTTOM]),
        Marker::new(Vector2::new(100.0, 100.0), &[TOP]),
        Marker::new(Vector2::new(1.0, 1.0), &[TOP]),
    ];
    view.set_layer_visible(BOTTOM, false);
    items[3].view_set_visible(false);
    view.set_visible_area(Some(Box2::new(Vector2::new(-5.0, -5.0), Vector2::new(10.0, 10.0))));

    frame(&mut view, &mut gal, &mut painter, &mut items);

    assert_eq!(painter.calls, vec![TOP]);
    assert_eq!(gal.commands().len(), 1);
}

#[test]
fn test_release_all_frees_every_group() {
    let mut gal = RecordingGal::new();
    let mut painter = MarkerPainter::default();
    let mut view = view();
    let mut items = vec![
        Marker::new(Vector2::new(0.0, 0.0), &[TOP, BOTTOM]),
        Marker::new(Vector2::new(2.0, 0.0), &[TOP]),
    ];
    frame(&mut view, &mut gal, &mut painter, &mut items);
    assert_eq!(gal.group_count(), 3);

    view.release_all(&mut gal, &mut items);
    assert_eq!(gal.group_count(), 0);
    assert!(items.iter().all(|item| !item.base().groups().is_cached()));
}
