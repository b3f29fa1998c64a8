//! A small board drawn through the view and the group cache

use copper_core::{Gal, RecordingGal, TextAttributes, Vector2};
use copper_painter::{
    layers, BoardItem, BoardText, ItemKind, ItemLayer, Pad, PadShape, PcbPainter, RenderSettings,
    Track, Via,
};
use copper_view::{CachePolicy, View, ViewItem};
use smallvec::smallvec;

fn board() -> Vec<BoardItem> {
    vec![
        BoardItem::new(Track {
            start: Vector2::new(0.0, 0.0),
            end: Vector2::new(100.0, 0.0),
            width: 10.0,
            layer: layers::FRONT_COPPER,
            net: 1,
        }),
        BoardItem::new(Via {
            position: Vector2::new(100.0, 0.0),
            width: 16.0,
            drill: 8.0,
            net: 1,
        }),
        BoardItem::new(Pad {
            position: Vector2::new(0.0, 0.0),
            size: Vector2::new(30.0, 30.0),
            drill: Vector2::new(12.0, 12.0),
            shape: PadShape::Rect,
            name: "1".to_string(),
            netname: "VCC".to_string(),
            net: 1,
            layers: smallvec![layers::FRONT_COPPER, layers::BACK_COPPER],
            ..Pad::default()
        }),
        BoardItem::new(BoardText {
            text: "U1".to_string(),
            position: Vector2::new(50.0, -40.0),
            orientation: 0.0,
            attributes: TextAttributes {
                glyph_size: Vector2::new(10.0, 10.0),
                ..TextAttributes::default()
            },
            thickness: 1.0,
            layer: layers::FRONT_SILKSCREEN,
        }),
    ]
}

fn view() -> View {
    let mut view = View::new(CachePolicy::Groups);
    layers::add_board_layers(&mut view);
    view
}

fn frame(view: &mut View, gal: &mut RecordingGal, painter: &mut PcbPainter, items: &mut [BoardItem]) {
    gal.begin_drawing();
    view.redraw(gal, painter, items);
    gal.end_drawing();
}

/// (item, layer) pairs of the board
const LAYER_COUNT: usize = 1 + 2 + 4 + 1;

#[test]
fn test_board_recorded_once_then_replayed() {
    let mut gal = RecordingGal::new();
    let mut painter = PcbPainter::new(RenderSettings::default());
    let mut view = view();
    let mut items = board();

    frame(&mut view, &mut gal, &mut painter, &mut items);
    assert_eq!(gal.group_count(), LAYER_COUNT);
    let first_frame = gal.commands().len();

    frame(&mut view, &mut gal, &mut painter, &mut items);
    assert_eq!(gal.group_count(), LAYER_COUNT);
    assert_eq!(gal.replayed_groups().len(), LAYER_COUNT);
    assert_eq!(gal.commands().len(), first_frame);
    assert_eq!(view.cache().stats().recorded, LAYER_COUNT);
}

#[test]
fn test_holes_drawn_above_copper() {
    let mut gal = RecordingGal::new();
    let mut painter = PcbPainter::new(RenderSettings::default());
    let mut view = view();
    let mut items = board();
    frame(&mut view, &mut gal, &mut painter, &mut items);

    let depth_of = |color| {
        gal.commands()
            .iter()
            .find(|c| c.attributes.fill_color == color && c.attributes.is_fill)
            .map(|c| c.attributes.layer_depth)
    };
    let settings = painter.settings();
    let hole = depth_of(settings.item_color(ItemLayer::ViaHoles, 1)).unwrap();
    let via = depth_of(settings.item_color(ItemLayer::Vias, 1)).unwrap();
    assert!(hole < via);
}

#[test]
fn test_settings_change_needs_invalidation() {
    let mut gal = RecordingGal::new();
    let mut painter = PcbPainter::new(RenderSettings::default());
    let mut view = view();
    let mut items = board();
    frame(&mut view, &mut gal, &mut painter, &mut items);

    let track_color = |gal: &RecordingGal| {
        gal.commands()
            .iter()
            .find(|c| c.is_line() && c.attributes.line_width == 10.0)
            .map(|c| c.attributes.stroke_color)
    };
    let normal = track_color(&gal).unwrap();

    painter.settings_mut().set_highlight(Some(2));
    frame(&mut view, &mut gal, &mut painter, &mut items);
    assert_eq!(track_color(&gal), Some(normal));

    view.invalidate_all(&mut gal, &mut items);
    frame(&mut view, &mut gal, &mut painter, &mut items);
    assert_eq!(track_color(&gal), Some(normal.darkened(0.5)));
    assert_eq!(gal.group_count(), LAYER_COUNT);
}

#[test]
fn test_edited_item_is_redrawn() {
    let mut gal = RecordingGal::new();
    let mut painter = PcbPainter::new(RenderSettings::default());
    let mut view = view();
    let mut items = board();
    frame(&mut view, &mut gal, &mut painter, &mut items);

    items[0].edit(|kind| {
        if let ItemKind::Track(track) = kind {
            track.end = Vector2::new(0.0, 100.0);
        }
    });
    frame(&mut view, &mut gal, &mut painter, &mut items);
    frame(&mut view, &mut gal, &mut painter, &mut items);

    assert_eq!(gal.group_count(), LAYER_COUNT);
    let track = gal
        .commands()
        .iter()
        .find(|c| c.is_line() && c.attributes.line_width == 10.0)
        .unwrap();
    assert_eq!(track.world_points()[1], Vector2::new(0.0, 100.0));
}

#[test]
fn test_hidden_layer_and_release() {
    let mut gal = RecordingGal::new();
    let mut painter = PcbPainter::new(RenderSettings::default());
    let mut view = view();
    let mut items = board();
    view.set_layer_visible(ItemLayer::NetNames.id(), false);
    view.set_layer_visible(layers::FRONT_SILKSCREEN, false);

    frame(&mut view, &mut gal, &mut painter, &mut items);
    assert_eq!(gal.group_count(), LAYER_COUNT - 2);

    view.release_all(&mut gal, &mut items);
    assert_eq!(gal.group_count(), 0);
    assert!(items.iter().all(|item| !item.base().groups().is_cached()));
}
