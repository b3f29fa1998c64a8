//! PCB painter
//!
//! Translates [`BoardItem`]s into GAL calls. Each call to
//! [`Painter::draw`] runs inside a scoped state guard, so colors, widths and
//! transforms set for one item never leak into the next.

use std::any::Any;
use std::f64::consts::{FRAC_PI_2, PI};

use copper_core::{
    Color, Gal, GalExt, HorizontalJustify, LineCap, LineJoin, Vector2, VerticalJustify,
};
use copper_font::StrokeFont;
use copper_view::{LayerId, Painter};

use crate::board::{
    BoardItem, BoardText, Dimension, DrawSegment, DrillShape, ItemKind, Pad, PadShape,
    SegmentShape, Target, TargetShape, Track, Via, Zone,
};
use crate::layers::ItemLayer;
use crate::settings::RenderSettings;

/// Largest glyph size used for pad labels
pub const MAX_FONT_SIZE: f64 = 1_500_000.0;

/// Fold `angle` by half turns into `[-PI/2, PI/2]` so labels never read
/// upside down
///
/// Angles already in range, both ends included, are kept as they are.
fn normalize_angle_90(angle: f64) -> f64 {
    if angle > FRAC_PI_2 {
        let wrapped = angle.rem_euclid(PI);
        if wrapped > FRAC_PI_2 {
            wrapped - PI
        } else {
            wrapped
        }
    } else if angle < -FRAC_PI_2 {
        (angle + FRAC_PI_2).rem_euclid(PI) - FRAC_PI_2
    } else {
        angle
    }
}

#[derive(Debug, Default)]
pub struct PcbPainter {
    settings: RenderSettings,
    font: StrokeFont<'static>,
}

impl PcbPainter {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            font: StrokeFont::new(),
        }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Cached groups keep the old colors; invalidate the view's items
    /// after changing settings
    pub fn settings_mut(&mut self) -> &mut RenderSettings {
        &mut self.settings
    }

    pub fn font_mut(&mut self) -> &mut StrokeFont<'static> {
        &mut self.font
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Copper
    // ─────────────────────────────────────────────────────────────────────────

    fn draw_track(&self, gal: &mut dyn Gal, track: &Track) {
        let color = self.settings.layer_color(track.layer, track.net);

        gal.set_line_cap(LineCap::Round);
        gal.set_line_join(LineJoin::Round);
        gal.set_stroke_color(color);

        if !self.settings.sketch.tracks {
            gal.set_is_fill(true);
            gal.set_is_stroke(false);
            gal.set_line_width(track.width);
            gal.draw_line(track.start, track.end);
            return;
        }

        let line = track.end - track.start;
        let length = line.length();
        let half = track.width / 2.0;

        gal.set_stroke_style(color, self.settings.outline_width);
        let mut gal = gal.scoped();
        gal.translate(track.start);
        gal.rotate(line.angle());
        gal.draw_line(Vector2::new(0.0, half), Vector2::new(length, half));
        gal.draw_line(Vector2::new(0.0, -half), Vector2::new(length, -half));
        gal.draw_arc(Vector2::ZERO, half, FRAC_PI_2, 3.0 * FRAC_PI_2);
        gal.draw_arc(Vector2::new(length, 0.0), half, FRAC_PI_2, -FRAC_PI_2);
    }

    fn draw_via(&self, gal: &mut dyn Gal, via: &Via, layer: LayerId) {
        let radius = match ItemLayer::from_id(layer) {
            Some(ItemLayer::Vias) => via.width / 2.0,
            Some(ItemLayer::ViaHoles) => via.drill / 2.0,
            _ => return,
        };

        let color = self.settings.layer_color(layer, via.net);
        if self.settings.sketch.vias {
            gal.set_stroke_style(color, self.settings.outline_width);
        } else {
            gal.set_fill_style(color);
        }
        gal.draw_circle(via.position, radius);
    }

    fn draw_pad(&self, gal: &mut dyn Gal, pad: &Pad, layer: LayerId) {
        let color = self.settings.layer_color(layer, pad.net);
        let orientation = normalize_angle_90(pad.orientation);

        if layer == ItemLayer::NetNames.id() {
            self.draw_pad_label(gal, pad, color, orientation);
            return;
        }

        let sketch = self.settings.sketch.pads;
        let mut gal = gal.scoped();
        gal.translate(pad.position);
        gal.rotate(-orientation);

        if sketch {
            gal.set_stroke_style(color, self.settings.outline_width);
            gal.set_line_cap(LineCap::Round);
            gal.set_line_join(LineJoin::Miter);
        } else {
            gal.set_fill_style(color);
        }

        let (size, shape) = if layer == ItemLayer::PadHoles.id() {
            let shape = match pad.drill_shape {
                DrillShape::Circle => PadShape::Circle,
                DrillShape::Oval => PadShape::Oval,
            };
            (pad.drill / 2.0, shape)
        } else {
            gal.translate(pad.offset);
            (pad.size / 2.0, pad.shape)
        };

        match shape {
            PadShape::Oval => draw_oval(&mut *gal, size, sketch),
            PadShape::Rect | PadShape::Trapezoid => gal.draw_rectangle(-size, size),
            PadShape::Circle => gal.draw_circle(Vector2::ZERO, size.x),
            PadShape::Octagon => gal.draw_polygon(&octagon(size)),
        }
    }

    /// Pad number, with the net name above it when there is one
    fn draw_pad_label(&self, gal: &mut dyn Gal, pad: &Pad, color: Color, orientation: f64) {
        let mut orientation = orientation;
        let mut size = pad.size / 2.0;
        size.x = size.x.min(MAX_FONT_SIZE);
        size.y = size.y.min(MAX_FONT_SIZE);

        // keep a 3:4 glyph inside the pad, along its longer side
        if size.x < size.y {
            orientation -= FRAC_PI_2;
            size.y = size.x * 4.0 / 3.0;
        } else {
            size.x = size.y * 3.0 / 4.0;
        }

        let mut gal = gal.scoped();
        gal.translate(pad.position);
        gal.rotate(-orientation);

        gal.set_horizontal_justify(HorizontalJustify::Center);
        gal.set_vertical_justify(VerticalJustify::Center);
        gal.set_font_bold(false);
        gal.set_font_italic(false);
        gal.set_text_mirrored(false);
        gal.set_stroke_color(color);

        if !pad.netname.is_empty() {
            size = size / 2.0;
            gal.set_glyph_size(size);
            gal.set_line_width(size.y / 10.0);
            self.font
                .draw(&mut *gal, &pad.netname, Vector2::new(0.0, size.y), 0.0);
            gal.translate(Vector2::new(0.0, -size.y / 2.0));
        } else {
            gal.set_glyph_size(size);
            gal.set_line_width(size.y / 10.0);
        }

        self.font.draw(&mut *gal, &pad.name, Vector2::ZERO, 0.0);
    }

    fn draw_zone(&self, gal: &mut dyn Gal, zone: &Zone) {
        let color = self.settings.layer_color(zone.layer, zone.net);

        gal.set_line_cap(LineCap::Butt);
        gal.set_line_join(LineJoin::Round);
        gal.set_fill_color(color);
        gal.set_stroke_color(color);
        gal.set_is_fill(zone.filled);
        gal.set_is_stroke(true);
        gal.set_line_width(zone.thermal_bridge_width / 2.0);

        for contour in zone.contours.iter().filter(|c| c.len() > 1) {
            gal.draw_polygon(contour);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Graphics
    // ─────────────────────────────────────────────────────────────────────────

    fn draw_segment(&self, gal: &mut dyn Gal, segment: &DrawSegment) {
        let color = self.settings.layer_color(segment.layer, 0);

        gal.set_stroke_style(color, segment.width);
        gal.set_line_cap(LineCap::Round);
        gal.set_line_join(LineJoin::Round);

        match &segment.shape {
            SegmentShape::Segment { start, end } => gal.draw_line(*start, *end),
            SegmentShape::Rect { start, end } => {
                gal.set_line_cap(LineCap::Square);
                gal.set_line_join(LineJoin::Bevel);
                gal.draw_rectangle(*start, *end);
            }
            SegmentShape::Arc {
                center,
                radius,
                start_angle,
                angle,
            } => gal.draw_arc(*center, *radius, *start_angle, start_angle + angle),
            SegmentShape::Circle { center, radius } => gal.draw_circle(*center, *radius),
            SegmentShape::Polygon(points) => gal.draw_polygon(points),
            SegmentShape::Curve {
                start,
                control_a,
                control_b,
                end,
            } => gal.draw_curve(*start, *control_a, *control_b, *end),
        }
    }

    fn draw_text(&self, gal: &mut dyn Gal, text: &BoardText) {
        let color = self.settings.layer_color(text.layer, 0);

        gal.set_stroke_color(color);
        gal.set_line_width(text.thickness);
        *gal.state_mut().text_mut() = text.attributes;
        self.font
            .draw(gal, &text.text, text.position, text.orientation);
    }

    fn draw_dimension(&self, gal: &mut dyn Gal, dimension: &Dimension) {
        let color = self.settings.layer_color(dimension.layer, 0);

        gal.set_stroke_style(color, dimension.width);
        for [start, end] in dimension.lines() {
            gal.draw_line(start, end);
        }

        self.draw_text(gal, &dimension.text);
    }

    fn draw_target(&self, gal: &mut dyn Gal, target: &Target) {
        let color = self.settings.layer_color(target.layer, 0);
        let radius = target.radius();
        let center = target.position;

        gal.set_stroke_style(color, target.width);
        gal.draw_circle(center, radius);

        let (a, b) = match target.shape {
            TargetShape::Cross => (Vector2::new(radius, radius), Vector2::new(radius, -radius)),
            TargetShape::Plus => (Vector2::new(radius, 0.0), Vector2::new(0.0, radius)),
        };
        gal.draw_line(center - a, center + a);
        gal.draw_line(center - b, center + b);
    }
}

/// Stadium of half size `size` centered on the origin
fn draw_oval(gal: &mut dyn Gal, size: Vector2, sketch: bool) {
    if size.y >= size.x {
        let m = size.y - size.x;
        let n = size.x;

        if sketch {
            gal.draw_arc(Vector2::new(0.0, -m), n, -PI, 0.0);
            gal.draw_arc(Vector2::new(0.0, m), n, PI, 0.0);
            gal.draw_line(Vector2::new(-n, -m), Vector2::new(-n, m));
            gal.draw_line(Vector2::new(n, -m), Vector2::new(n, m));
        } else {
            gal.draw_circle(Vector2::new(0.0, -m), n);
            gal.draw_circle(Vector2::new(0.0, m), n);
            gal.draw_rectangle(Vector2::new(-n, -m), Vector2::new(n, m));
        }
    } else {
        let m = size.x - size.y;
        let n = size.y;

        if sketch {
            gal.draw_arc(Vector2::new(-m, 0.0), n, FRAC_PI_2, 3.0 * FRAC_PI_2);
            gal.draw_arc(Vector2::new(m, 0.0), n, FRAC_PI_2, -FRAC_PI_2);
            gal.draw_line(Vector2::new(-m, -n), Vector2::new(m, -n));
            gal.draw_line(Vector2::new(-m, n), Vector2::new(m, n));
        } else {
            gal.draw_circle(Vector2::new(-m, 0.0), n);
            gal.draw_circle(Vector2::new(m, 0.0), n);
            gal.draw_rectangle(Vector2::new(-m, -n), Vector2::new(m, n));
        }
    }
}

/// Rectangle of half size `size` with 45 degree corners
fn octagon(size: Vector2) -> [Vector2; 8] {
    let cut = size.x.min(size.y) * (1.0 - (PI / 8.0).tan());
    let (x, y) = (size.x, size.y);
    [
        Vector2::new(x, -(y - cut)),
        Vector2::new(x, y - cut),
        Vector2::new(x - cut, y),
        Vector2::new(-(x - cut), y),
        Vector2::new(-x, y - cut),
        Vector2::new(-x, -(y - cut)),
        Vector2::new(-(x - cut), -y),
        Vector2::new(x - cut, -y),
    ]
}

impl Painter for PcbPainter {
    fn draw(&mut self, gal: &mut dyn Gal, item: &dyn Any, layer: LayerId) -> bool {
        let Some(item) = item.downcast_ref::<BoardItem>() else {
            return false;
        };

        let mut gal = gal.scoped();
        match item.kind() {
            ItemKind::Track(track) => self.draw_track(&mut *gal, track),
            ItemKind::Via(via) => self.draw_via(&mut *gal, via, layer),
            ItemKind::Pad(pad) => self.draw_pad(&mut *gal, pad, layer),
            ItemKind::Segment(segment) => self.draw_segment(&mut *gal, segment),
            ItemKind::Text(text) => self.draw_text(&mut *gal, text),
            ItemKind::Zone(zone) => self.draw_zone(&mut *gal, zone),
            ItemKind::Dimension(dimension) => self.draw_dimension(&mut *gal, dimension),
            ItemKind::Target(target) => self.draw_target(&mut *gal, target),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers;
    use copper_core::{Primitive, RecordingGal, TextAttributes};
    use smallvec::smallvec;

    fn paint(painter: &mut PcbPainter, item: impl Into<ItemKind>, layer: LayerId) -> RecordingGal {
        let mut gal = RecordingGal::new();
        gal.begin_drawing();
        assert!(painter.draw(&mut gal, &BoardItem::new(item), layer));
        gal
    }

    fn track() -> Track {
        Track {
            start: Vector2::new(0.0, 0.0),
            end: Vector2::new(100.0, 0.0),
            width: 10.0,
            layer: layers::FRONT_COPPER,
            net: 2,
        }
    }

    fn pad(size: Vector2) -> Pad {
        Pad {
            position: Vector2::new(1000.0, 500.0),
            size,
            shape: PadShape::Oval,
            name: "1".to_string(),
            layers: smallvec![layers::FRONT_COPPER],
            ..Pad::default()
        }
    }

    #[test]
    fn test_unknown_items_are_declined() {
        let mut painter = PcbPainter::default();
        let mut gal = RecordingGal::new();
        gal.begin_drawing();
        assert!(!painter.draw(&mut gal, &42_u32, layers::FRONT_COPPER));
        assert!(gal.commands().is_empty());
    }

    #[test]
    fn test_filled_track() {
        let mut painter = PcbPainter::default();
        let gal = paint(&mut painter, track(), layers::FRONT_COPPER);

        assert_eq!(gal.commands().len(), 1);
        let command = &gal.commands()[0];
        assert!(command.is_line());
        assert_eq!(command.attributes.line_width, 10.0);
        assert_eq!(command.attributes.line_cap, LineCap::Round);
        assert_eq!(
            command.attributes.stroke_color,
            painter.settings().layer_color(layers::FRONT_COPPER, 2)
        );
    }

    #[test]
    fn test_sketch_track_outline() {
        let mut painter = PcbPainter::default();
        painter.settings_mut().sketch.tracks = true;
        let gal = paint(&mut painter, track(), layers::FRONT_COPPER);

        let commands = gal.commands();
        assert_eq!(commands.len(), 4);
        assert_eq!(
            commands[0].world_points(),
            vec![Vector2::new(0.0, 5.0), Vector2::new(100.0, 5.0)]
        );
        assert_eq!(
            commands[1].world_points(),
            vec![Vector2::new(0.0, -5.0), Vector2::new(100.0, -5.0)]
        );
        assert!(matches!(commands[2].primitive, Primitive::Arc { radius, .. } if radius == 5.0));
        assert_eq!(commands[3].world_points(), vec![Vector2::new(100.0, 0.0)]);
        assert!(commands.iter().all(|c| c.attributes.line_width == 1.0));
        assert!(commands.iter().all(|c| !c.attributes.is_fill));
    }

    #[test]
    fn test_via_pad_and_hole() {
        let mut painter = PcbPainter::default();
        let via = Via {
            position: Vector2::new(10.0, 10.0),
            width: 8.0,
            drill: 3.0,
            net: 1,
        };

        let gal = paint(&mut painter, via.clone(), ItemLayer::Vias.id());
        let command = &gal.commands()[0];
        assert_eq!(
            command.primitive,
            Primitive::Circle {
                center: via.position,
                radius: 4.0
            }
        );
        assert!(command.attributes.is_fill);

        let gal = paint(&mut painter, via.clone(), ItemLayer::ViaHoles.id());
        let command = &gal.commands()[0];
        assert!(matches!(command.primitive, Primitive::Circle { radius, .. } if radius == 1.5));
        assert_eq!(
            command.attributes.fill_color,
            painter.settings().item_color(ItemLayer::ViaHoles, 1)
        );

        let gal = paint(&mut painter, via, layers::FRONT_COPPER);
        assert!(gal.commands().is_empty());
    }

    #[test]
    fn test_filled_oval_pad() {
        let mut painter = PcbPainter::default();
        let gal = paint(&mut painter, pad(Vector2::new(60.0, 100.0)), layers::FRONT_COPPER);

        let commands = gal.commands();
        assert_eq!(commands.len(), 3);
        assert_eq!(commands[0].world_points(), vec![Vector2::new(1000.0, 480.0)]);
        assert_eq!(commands[1].world_points(), vec![Vector2::new(1000.0, 520.0)]);
        assert_eq!(
            commands[2].world_points(),
            vec![Vector2::new(970.0, 480.0), Vector2::new(1030.0, 520.0)]
        );
        assert!(commands.iter().all(|c| c.attributes.is_fill && !c.attributes.is_stroke));
    }

    #[test]
    fn test_sketch_oval_pad() {
        let mut painter = PcbPainter::default();
        painter.settings_mut().sketch.pads = true;
        let gal = paint(&mut painter, pad(Vector2::new(100.0, 60.0)), layers::FRONT_COPPER);

        let arcs = gal
            .commands()
            .iter()
            .filter(|c| matches!(c.primitive, Primitive::Arc { .. }))
            .count();
        assert_eq!(arcs, 2);
        assert_eq!(gal.commands().len(), 4);
        assert_eq!(gal.commands()[0].attributes.line_join, LineJoin::Miter);
    }

    #[test]
    fn test_pad_offset_and_hole() {
        let mut painter = PcbPainter::default();
        let mut pad = pad(Vector2::new(40.0, 40.0));
        pad.shape = PadShape::Circle;
        pad.offset = Vector2::new(5.0, 0.0);
        pad.drill = Vector2::new(20.0, 20.0);

        let gal = paint(&mut painter, pad.clone(), layers::FRONT_COPPER);
        assert_eq!(gal.commands()[0].world_points(), vec![Vector2::new(1005.0, 500.0)]);

        let gal = paint(&mut painter, pad, ItemLayer::PadHoles.id());
        let command = &gal.commands()[0];
        assert_eq!(command.world_points(), vec![Vector2::new(1000.0, 500.0)]);
        assert!(matches!(command.primitive, Primitive::Circle { radius, .. } if radius == 10.0));
    }

    #[test]
    fn test_rect_and_octagon_pads() {
        let mut painter = PcbPainter::default();
        let mut rect = pad(Vector2::new(40.0, 20.0));
        rect.shape = PadShape::Trapezoid;
        let gal = paint(&mut painter, rect, layers::FRONT_COPPER);
        assert_eq!(
            gal.commands()[0].world_points(),
            vec![Vector2::new(980.0, 490.0), Vector2::new(1020.0, 510.0)]
        );

        let outline = octagon(Vector2::new(10.0, 10.0));
        let radius = outline[0].length();
        assert!(outline.iter().all(|p| (p.length() - radius).abs() < 1e-9));
        assert!((outline[1].y - 10.0 * (PI / 8.0).tan()).abs() < 1e-9);
    }

    fn glyph_sizes(gal: &RecordingGal) -> Vec<Vector2> {
        let mut sizes: Vec<Vector2> = gal
            .commands()
            .iter()
            .map(|c| c.attributes.text.glyph_size)
            .collect();
        sizes.dedup();
        sizes
    }

    #[test]
    fn test_pad_label_with_netname() {
        let mut painter = PcbPainter::default();
        let mut pad = pad(Vector2::new(60.0, 80.0));
        pad.netname = "GND".to_string();
        let gal = paint(&mut painter, pad, ItemLayer::NetNames.id());

        assert!(!gal.commands().is_empty());
        assert_eq!(glyph_sizes(&gal), vec![Vector2::new(15.0, 20.0)]);
        let command = &gal.commands()[0];
        assert_eq!(command.attributes.line_width, 2.0);
        assert_eq!(
            command.attributes.text.horizontal_justify,
            HorizontalJustify::Center
        );
        assert_eq!(
            command.attributes.stroke_color,
            painter.settings().item_color(ItemLayer::NetNames, 0)
        );
    }

    #[test]
    fn test_pad_label_sizes() {
        let mut painter = PcbPainter::default();

        let gal = paint(&mut painter, pad(Vector2::new(80.0, 60.0)), ItemLayer::NetNames.id());
        assert_eq!(glyph_sizes(&gal), vec![Vector2::new(22.5, 30.0)]);

        let huge = pad(Vector2::new(4.0e6, 4.0e6));
        let gal = paint(&mut painter, huge, ItemLayer::NetNames.id());
        assert_eq!(glyph_sizes(&gal), vec![Vector2::new(1.125e6, MAX_FONT_SIZE)]);
    }

    #[test]
    fn test_painter_leaves_gal_state_untouched() {
        let mut painter = PcbPainter::default();
        painter.settings_mut().sketch.tracks = true;
        let mut gal = RecordingGal::new();
        gal.begin_drawing();
        gal.set_stroke_color(Color::CYAN);
        let before = *gal.state().attributes();
        let transform = gal.state().transform();

        let mut label = pad(Vector2::new(60.0, 80.0));
        label.orientation = 0.3;
        painter.draw(&mut gal, &BoardItem::new(track()), layers::FRONT_COPPER);
        painter.draw(&mut gal, &BoardItem::new(label), ItemLayer::NetNames.id());

        assert_eq!(*gal.state().attributes(), before);
        assert_eq!(gal.state().transform(), transform);
        assert_eq!(gal.state().save_depth(), 0);
    }

    #[test]
    fn test_segment_shapes() {
        let mut painter = PcbPainter::default();
        let arc = DrawSegment {
            shape: SegmentShape::Arc {
                center: Vector2::ZERO,
                radius: 10.0,
                start_angle: 0.5,
                angle: -1.0,
            },
            width: 2.0,
            layer: layers::EDGE_CUTS,
        };
        let gal = paint(&mut painter, arc, layers::EDGE_CUTS);
        let command = &gal.commands()[0];
        assert_eq!(
            command.primitive,
            Primitive::Arc {
                center: Vector2::ZERO,
                radius: 10.0,
                start_angle: 0.5,
                end_angle: -0.5
            }
        );
        assert!(command.attributes.is_stroke && !command.attributes.is_fill);
        assert_eq!(command.attributes.line_width, 2.0);

        let rect = DrawSegment {
            shape: SegmentShape::Rect {
                start: Vector2::ZERO,
                end: Vector2::new(5.0, 5.0),
            },
            width: 1.0,
            layer: layers::DRAWINGS,
        };
        let gal = paint(&mut painter, rect, layers::DRAWINGS);
        let command = &gal.commands()[0];
        assert!(matches!(command.primitive, Primitive::Rectangle { .. }));
        assert_eq!(command.attributes.line_cap, LineCap::Square);
        assert_eq!(command.attributes.line_join, LineJoin::Bevel);
    }

    #[test]
    fn test_text_uses_its_attributes() {
        let mut painter = PcbPainter::default();
        let text = BoardText {
            text: "R1\nR2".to_string(),
            position: Vector2::new(30.0, 40.0),
            orientation: 0.0,
            attributes: TextAttributes {
                glyph_size: Vector2::new(8.0, 9.0),
                italic: true,
                ..TextAttributes::default()
            },
            thickness: 1.5,
            layer: layers::FRONT_SILKSCREEN,
        };
        let gal = paint(&mut painter, text, layers::FRONT_SILKSCREEN);

        assert!(!gal.commands().is_empty());
        let command = &gal.commands()[0];
        assert!(command.attributes.text.italic);
        assert_eq!(command.attributes.text.glyph_size, Vector2::new(8.0, 9.0));
        assert_eq!(command.attributes.line_width, 1.5);
    }

    #[test]
    fn test_zone_contours() {
        let mut painter = PcbPainter::default();
        let square = vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(10.0, 0.0),
            Vector2::new(10.0, 10.0),
            Vector2::new(0.0, 10.0),
        ];
        let zone = Zone {
            contours: vec![square.clone(), vec![Vector2::ZERO], square],
            filled: true,
            thermal_bridge_width: 4.0,
            layer: layers::BACK_COPPER,
            net: 5,
        };
        let gal = paint(&mut painter, zone, layers::BACK_COPPER);

        assert_eq!(gal.commands().len(), 2);
        let attributes = gal.commands()[0].attributes;
        assert!(attributes.is_fill && attributes.is_stroke);
        assert_eq!(attributes.line_width, 2.0);
        assert_eq!(attributes.line_cap, LineCap::Butt);
    }

    #[test]
    fn test_dimension_and_target() {
        let mut painter = PcbPainter::default();
        let p = |x: f64| Vector2::new(x, 0.0);
        let dimension = Dimension {
            crossbar: [p(0.0), p(100.0)],
            feature_lines: [[p(0.0), p(0.0)], [p(100.0), p(100.0)]],
            arrows: [[p(0.0), p(10.0)]; 4],
            width: 2.0,
            layer: layers::DRAWINGS,
            text: BoardText {
                text: "100".to_string(),
                position: Vector2::new(50.0, -10.0),
                orientation: 0.0,
                attributes: TextAttributes::default(),
                thickness: 1.0,
                layer: layers::DRAWINGS,
            },
        };
        let gal = paint(&mut painter, dimension, layers::DRAWINGS);
        let lines = gal.commands().iter().filter(|c| c.is_line()).count();
        assert!(lines >= 7);
        assert!(gal.commands().len() > 7);

        let target = Target {
            position: Vector2::new(5.0, 5.0),
            size: 30.0,
            width: 1.0,
            shape: TargetShape::Cross,
            layer: layers::EDGE_CUTS,
        };
        let gal = paint(&mut painter, target, layers::EDGE_CUTS);
        let commands = gal.commands();
        assert_eq!(commands.len(), 3);
        assert!(matches!(commands[0].primitive, Primitive::Circle { radius, .. } if radius == 15.0));
        assert_eq!(
            commands[1].world_points(),
            vec![Vector2::new(-10.0, -10.0), Vector2::new(20.0, 20.0)]
        );
    }

    #[test]
    fn test_normalize_angle_90() {
        assert_eq!(normalize_angle_90(0.0), 0.0);
        assert!((normalize_angle_90(PI) - 0.0).abs() < 1e-12);
        assert!((normalize_angle_90(PI + 1.0) - 1.0).abs() < 1e-12);
        assert!((normalize_angle_90(FRAC_PI_2) - FRAC_PI_2).abs() < 1e-12);
        assert!((normalize_angle_90(-0.25) + 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_angle_90_keeps_both_ends() {
        assert_eq!(normalize_angle_90(-FRAC_PI_2), -FRAC_PI_2);
        assert_eq!(normalize_angle_90(FRAC_PI_2), FRAC_PI_2);
        assert!((normalize_angle_90(-PI - 0.5) + 0.5).abs() < 1e-12);
        assert!((normalize_angle_90(-PI + 0.5) - 0.5).abs() < 1e-12);
    }
}
