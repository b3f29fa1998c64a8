//! Tessellation of GAL primitives into triangles
//!
//! Strokes are expanded into quads of the requested width with separate cap
//! and join geometry; circles and arcs come from the unit tables; filled
//! polygons go through lyon's fill tessellator.
//!
//! Every sub-step of a primitive (segment quad, cap, join) is placed
//! [`DEPTH_ADJUST_FACTOR`] further away than the previous one. With a
//! `LessEqual` depth test the overlap between sub-steps is painted once, so
//! translucent strokes show no darker seams at their joints.

use copper_core::{LineCap, LineJoin, Matrix3, Vector2};
use lyon::lyon_tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, VertexBuffers,
};
use lyon::math::point;

use crate::container::{GalVertex, ShaderProgram, VertexContainer};
use crate::tables::{rotate_by, unit_tables, UnitTables, CIRCLE_POINTS};

/// Depth distance between consecutive sub-steps of one primitive
///
/// One step of a 24 bit depth buffer. The default depth range of
/// `[-1024, 1024]` maps one unit of layer depth to `2^-11`, so 4096 sub-steps
/// fit between two layers a unit apart.
pub const DEPTH_ADJUST_FACTOR: f32 = 1.0 / (1u32 << 23) as f32;

/// Longest miter allowed, relative to half the line width
pub const MITER_LIMIT: f64 = 1.5;

/// Emits triangles for one primitive into a container
pub struct Tessellator<'a> {
    out: &'a mut VertexContainer,
    tables: &'static UnitTables,
    transform: Matrix3,
    color: [f32; 4],
    program: ShaderProgram,
    base_depth: f32,
    step: u32,
}

impl<'a> Tessellator<'a> {
    /// `transform` maps the caller's local frame into the container's frame
    pub fn new(out: &'a mut VertexContainer, transform: Matrix3, base_depth: f32) -> Self {
        Self {
            out,
            tables: unit_tables(),
            transform,
            color: [1.0; 4],
            program: ShaderProgram::Solid,
            base_depth,
            step: 0,
        }
    }

    /// Select color and program for the following geometry
    ///
    /// Starts a new pass: depth sub-steps restart at the base depth, so the
    /// stroke of a filled shape lands on top of its fill.
    pub fn set_pen(&mut self, color: [f32; 4], program: ShaderProgram) {
        self.color = color;
        self.program = program;
        self.step = 0;
    }

    /// Number of sub-steps emitted in the current pass
    pub fn steps(&self) -> u32 {
        self.step
    }

    fn next_depth(&mut self) -> f32 {
        let depth = self.base_depth + self.step as f32 * DEPTH_ADJUST_FACTOR;
        self.step += 1;
        depth.min(1.0)
    }

    fn triangle(&mut self, depth: f32, corners: [(Vector2, f32); 3]) {
        let vertex = |(p, edge): (Vector2, f32)| GalVertex {
            position: self.transform.transform_point(p).to_f32(),
            depth,
            edge,
            color: self.color,
        };
        let triangle = [vertex(corners[0]), vertex(corners[1]), vertex(corners[2])];
        self.out.push_triangle(self.program, triangle);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sub-steps
    // ─────────────────────────────────────────────────────────────────────────

    /// Quad of `width` centered on the segment, without caps
    pub fn line_quad(&mut self, a: Vector2, b: Vector2, width: f64) {
        let depth = self.next_depth();
        let n = (b - a).normalized().perpendicular() * (width / 2.0);
        if n == Vector2::ZERO {
            return;
        }

        self.triangle(depth, [(a + n, 1.0), (a - n, -1.0), (b + n, 1.0)]);
        self.triangle(depth, [(a - n, -1.0), (b - n, -1.0), (b + n, 1.0)]);
    }

    /// Filled circle as a triangle fan
    pub fn disc(&mut self, center: Vector2, radius: f64) {
        let depth = self.next_depth();
        let tables = self.tables;
        let circle = &tables.circle;
        for i in 0..CIRCLE_POINTS {
            let p0 = center + circle[i] * radius;
            let p1 = center + circle[i + 1] * radius;
            self.triangle(depth, [(center, 0.0), (p0, 1.0), (p1, 1.0)]);
        }
    }

    /// Half disc of diameter `width` bulging towards `direction`
    pub fn round_cap(&mut self, center: Vector2, direction: Vector2, width: f64) {
        let rotation = direction.normalized();
        if rotation == Vector2::ZERO {
            self.disc(center, width / 2.0);
            return;
        }

        let depth = self.next_depth();
        let radius = width / 2.0;
        let tables = self.tables;
        let semicircle = &tables.semicircle;
        for i in 0..semicircle.len() - 1 {
            let p0 = center + rotate_by(semicircle[i], rotation) * radius;
            let p1 = center + rotate_by(semicircle[i + 1], rotation) * radius;
            self.triangle(depth, [(center, 0.0), (p0, 1.0), (p1, 1.0)]);
        }
    }

    /// Flat extension of half the width past `end`, towards `direction`
    pub fn square_cap(&mut self, end: Vector2, direction: Vector2, width: f64) {
        let ext = direction.resized(width / 2.0);
        self.line_quad(end, end + ext, width);
    }

    /// Annulus of `width` around a circle of `radius`
    pub fn ring(&mut self, center: Vector2, radius: f64, width: f64) {
        let depth = self.next_depth();
        let inner = (radius - width / 2.0).max(0.0);
        let outer = radius + width / 2.0;
        let tables = self.tables;
        let circle = &tables.circle;
        for i in 0..CIRCLE_POINTS {
            let (u0, u1) = (circle[i], circle[i + 1]);
            self.triangle(
                depth,
                [
                    (center + u0 * outer, 1.0),
                    (center + u0 * inner, -1.0),
                    (center + u1 * outer, 1.0),
                ],
            );
            self.triangle(
                depth,
                [
                    (center + u0 * inner, -1.0),
                    (center + u1 * inner, -1.0),
                    (center + u1 * outer, 1.0),
                ],
            );
        }
    }

    /// Stroked arc: a band of quads plus round caps at both ends
    pub fn arc_band(
        &mut self,
        center: Vector2,
        radius: f64,
        width: f64,
        start_angle: f64,
        end_angle: f64,
    ) {
        let units = self.tables.arc_points(1.0, start_angle, end_angle);
        let inner = (radius - width / 2.0).max(0.0);
        let outer = radius + width / 2.0;

        let depth = self.next_depth();
        for pair in units.windows(2) {
            let (u0, u1) = (pair[0], pair[1]);
            self.triangle(
                depth,
                [
                    (center + u0 * outer, 1.0),
                    (center + u0 * inner, -1.0),
                    (center + u1 * outer, 1.0),
                ],
            );
            self.triangle(
                depth,
                [
                    (center + u0 * inner, -1.0),
                    (center + u1 * inner, -1.0),
                    (center + u1 * outer, 1.0),
                ],
            );
        }

        let sense = if end_angle >= start_angle { 1.0 } else { -1.0 };
        if let (Some(first), Some(last)) = (units.first().copied(), units.last().copied()) {
            // tangent of motion along the arc
            self.round_cap(center + first * radius, -first.perpendicular() * sense, width);
            self.round_cap(center + last * radius, last.perpendicular() * sense, width);
        }
    }

    /// Filled circular sector
    pub fn pie(&mut self, center: Vector2, radius: f64, start_angle: f64, end_angle: f64) {
        let points = self.tables.arc_points(radius, start_angle, end_angle);
        let depth = self.next_depth();
        for pair in points.windows(2) {
            self.triangle(
                depth,
                [
                    (center, 0.0),
                    (center + pair[0], 1.0),
                    (center + pair[1], 1.0),
                ],
            );
        }
    }

    /// Axis-aligned filled rectangle
    pub fn fill_rect(&mut self, start: Vector2, end: Vector2) {
        let depth = self.next_depth();
        let (b, d) = (Vector2::new(end.x, start.y), Vector2::new(start.x, end.y));
        self.triangle(depth, [(start, 0.0), (b, 0.0), (end, 0.0)]);
        self.triangle(depth, [(start, 0.0), (end, 0.0), (d, 0.0)]);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Composite strokes
    // ─────────────────────────────────────────────────────────────────────────

    /// Single segment with caps
    pub fn stroke_line(&mut self, a: Vector2, b: Vector2, width: f64, cap: LineCap) {
        let dir = b - a;
        if dir == Vector2::ZERO {
            match cap {
                LineCap::Round => self.disc(a, width / 2.0),
                LineCap::Square => {
                    let h = Vector2::new(width / 2.0, 0.0);
                    self.line_quad(a - h, a + h, width);
                }
                LineCap::Butt => {}
            }
            return;
        }

        match cap {
            LineCap::Butt => self.line_quad(a, b, width),
            LineCap::Square => {
                let ext = dir.resized(width / 2.0);
                self.line_quad(a - ext, b + ext, width);
            }
            LineCap::Round => {
                self.line_quad(a, b, width);
                self.round_cap(a, -dir, width);
                self.round_cap(b, dir, width);
            }
        }
    }

    /// Connected segments with joins; a polyline whose last point repeats
    /// the first is closed and gets a join instead of caps
    pub fn stroke_polyline(&mut self, points: &[Vector2], width: f64, cap: LineCap, join: LineJoin) {
        let mut pts: Vec<Vector2> = Vec::with_capacity(points.len());
        for p in points {
            if pts.last() != Some(p) {
                pts.push(*p);
            }
        }

        match pts.len() {
            0 => return,
            1 => {
                self.stroke_line(pts[0], pts[0], width, cap);
                return;
            }
            2 => {
                self.stroke_line(pts[0], pts[1], width, cap);
                return;
            }
            _ => {}
        }

        let closed = pts.len() > 3 && pts.first() == pts.last();
        let segments = pts.len() - 1;

        for i in 0..segments {
            self.line_quad(pts[i], pts[i + 1], width);
            if i + 1 < segments {
                self.join(pts[i + 1], pts[i + 1] - pts[i], pts[i + 2] - pts[i + 1], width, join);
            }
        }

        if closed {
            self.join(pts[0], pts[0] - pts[segments - 1], pts[1] - pts[0], width, join);
            return;
        }

        let (first, second) = (pts[0], pts[1]);
        let (last, before) = (pts[segments], pts[segments - 1]);
        match cap {
            LineCap::Butt => {}
            LineCap::Round => {
                self.round_cap(first, first - second, width);
                self.round_cap(last, last - before, width);
            }
            LineCap::Square => {
                self.square_cap(first, first - second, width);
                self.square_cap(last, last - before, width);
            }
        }
    }

    /// Corner wedge at `p` between an incoming and an outgoing direction
    fn join(&mut self, p: Vector2, incoming: Vector2, outgoing: Vector2, width: f64, join: LineJoin) {
        let cross = incoming.cross(outgoing);
        if cross.abs() <= f64::EPSILON * incoming.length() * outgoing.length() {
            if incoming.dot(outgoing) >= 0.0 {
                // straight continuation
                return;
            }
            // full reversal: only a round join covers the end
            if join == LineJoin::Round {
                self.disc(p, width / 2.0);
            }
            return;
        }

        if join == LineJoin::Round {
            self.disc(p, width / 2.0);
            return;
        }

        // the outer side of the turn is to the right when turning left
        let side = if cross > 0.0 { -1.0 } else { 1.0 };
        let half = width / 2.0;
        let n_in = incoming.normalized().perpendicular() * (half * side);
        let n_out = outgoing.normalized().perpendicular() * (half * side);

        let depth = self.next_depth();
        let bisector = (n_in + n_out).normalized();
        let cos_half = n_in.normalized().dot(bisector);

        if join == LineJoin::Miter && cos_half > 0.0 && 1.0 / cos_half <= MITER_LIMIT {
            let tip = p + bisector * (half / cos_half);
            self.triangle(depth, [(p, 0.0), (p + n_in, 1.0), (tip, 1.0)]);
            self.triangle(depth, [(p, 0.0), (tip, 1.0), (p + n_out, 1.0)]);
        } else {
            self.triangle(depth, [(p, 0.0), (p + n_in, 1.0), (p + n_out, 1.0)]);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Fills
    // ─────────────────────────────────────────────────────────────────────────

    /// Fill an arbitrary (concave, self-intersecting) polygon, nonzero rule
    pub fn fill_polygon(&mut self, points: &[Vector2]) {
        if points.len() < 3 {
            return;
        }

        let mut builder = lyon::path::Path::builder();
        builder.begin(point(points[0].x as f32, points[0].y as f32));
        for p in &points[1..] {
            builder.line_to(point(p.x as f32, p.y as f32));
        }
        builder.end(true);
        let path = builder.build();

        let mut geometry: VertexBuffers<Vector2, u32> = VertexBuffers::new();
        let mut tessellator = FillTessellator::new();
        let options = FillOptions::default()
            .with_fill_rule(FillRule::NonZero)
            .with_tolerance(0.1);

        let result = tessellator.tessellate_path(
            &path,
            &options,
            &mut BuffersBuilder::new(&mut geometry, |vertex: FillVertex| {
                let p = vertex.position();
                Vector2::new(p.x as f64, p.y as f64)
            }),
        );

        if let Err(e) = result {
            tracing::warn!("Polygon fill tessellation failed: {:?}", e);
            return;
        }

        let depth = self.next_depth();
        for tri in geometry.indices.chunks_exact(3) {
            let v = |i: u32| (geometry.vertices[i as usize], 0.0);
            self.triangle(depth, [v(tri[0]), v(tri[1]), v(tri[2])]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tessellate(f: impl FnOnce(&mut Tessellator<'_>)) -> VertexContainer {
        let mut out = VertexContainer::new();
        let mut t = Tessellator::new(&mut out, Matrix3::IDENTITY, 0.25);
        t.set_pen([1.0, 0.0, 0.0, 1.0], ShaderProgram::Hairline);
        f(&mut t);
        out
    }

    fn distinct_depths(c: &VertexContainer) -> Vec<f32> {
        let mut depths: Vec<f32> = c.vertices().iter().map(|v| v.depth).collect();
        depths.dedup();
        depths
    }

    #[test]
    fn test_butt_line_is_one_quad() {
        let c = tessellate(|t| {
            t.stroke_line(Vector2::ZERO, Vector2::new(10.0, 0.0), 2.0, LineCap::Butt)
        });
        assert_eq!(c.vertex_count(), 6);
        for v in c.vertices() {
            assert!((v.position[1].abs() - 1.0).abs() < 1e-6);
            assert_eq!(v.edge.abs(), 1.0);
        }
    }

    #[test]
    fn test_round_caps_add_semicircles_at_later_depths() {
        let c = tessellate(|t| {
            t.stroke_line(Vector2::ZERO, Vector2::new(10.0, 0.0), 2.0, LineCap::Round)
        });
        assert_eq!(c.vertex_count(), 6 + 2 * (CIRCLE_POINTS / 2) * 3);
        let depths = distinct_depths(&c);
        assert_eq!(depths.len(), 3);
        assert!(depths.windows(2).all(|w| w[1] > w[0]));
        assert_eq!(depths[0], 0.25);

        // the start cap bulges backwards
        let min_x = c
            .vertices()
            .iter()
            .map(|v| v.position[0])
            .fold(f32::MAX, f32::min);
        assert!((min_x + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_square_cap_extends_half_width() {
        let c = tessellate(|t| {
            t.stroke_line(Vector2::ZERO, Vector2::new(10.0, 0.0), 4.0, LineCap::Square)
        });
        let xs: Vec<f32> = c.vertices().iter().map(|v| v.position[0]).collect();
        assert_eq!(xs.iter().cloned().fold(f32::MAX, f32::min), -2.0);
        assert_eq!(xs.iter().cloned().fold(f32::MIN, f32::max), 12.0);
    }

    #[test]
    fn test_polyline_joins_step_depth() {
        let c = tessellate(|t| {
            t.stroke_polyline(
                &[
                    Vector2::ZERO,
                    Vector2::new(10.0, 0.0),
                    Vector2::new(10.0, 10.0),
                ],
                1.0,
                LineCap::Butt,
                LineJoin::Bevel,
            )
        });
        // quad, bevel wedge, quad
        assert_eq!(c.vertex_count(), 6 + 3 + 6);
        let depths = distinct_depths(&c);
        assert_eq!(depths.len(), 3);
        assert!((depths[1] - depths[0] - DEPTH_ADJUST_FACTOR).abs() < 1e-12);
    }

    #[test]
    fn test_miter_falls_back_to_bevel_on_sharp_turns() {
        let sharp = tessellate(|t| {
            t.stroke_polyline(
                &[Vector2::ZERO, Vector2::new(10.0, 0.0), Vector2::new(0.0, 1.0)],
                1.0,
                LineCap::Butt,
                LineJoin::Miter,
            )
        });
        let right_angle = tessellate(|t| {
            t.stroke_polyline(
                &[Vector2::ZERO, Vector2::new(10.0, 0.0), Vector2::new(10.0, 10.0)],
                1.0,
                LineCap::Butt,
                LineJoin::Miter,
            )
        });
        assert_eq!(sharp.vertex_count(), 6 + 3 + 6);
        assert_eq!(right_angle.vertex_count(), 6 + 6 + 6);
    }

    #[test]
    fn test_closed_polyline_has_no_caps() {
        let square = [
            Vector2::ZERO,
            Vector2::new(1.0, 0.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(0.0, 1.0),
            Vector2::ZERO,
        ];
        let c = tessellate(|t| t.stroke_polyline(&square, 0.1, LineCap::Round, LineJoin::Bevel));
        // four quads and four corner wedges
        assert_eq!(c.vertex_count(), 4 * 6 + 4 * 3);
    }

    #[test]
    fn test_disc_and_ring_use_circle_table() {
        let disc = tessellate(|t| t.disc(Vector2::ZERO, 5.0));
        assert_eq!(disc.vertex_count(), CIRCLE_POINTS * 3);
        let ring = tessellate(|t| t.ring(Vector2::ZERO, 5.0, 1.0));
        assert_eq!(ring.vertex_count(), CIRCLE_POINTS * 6);
        for v in ring.vertices() {
            let r = (v.position[0].powi(2) + v.position[1].powi(2)).sqrt();
            assert!((4.5 - 1e-4..=5.5 + 1e-4).contains(&r));
        }
    }

    #[test]
    fn test_transform_applies_to_vertices() {
        let mut out = VertexContainer::new();
        let mut t = Tessellator::new(
            &mut out,
            Matrix3::translation(Vector2::new(100.0, 50.0)),
            0.0,
        );
        t.fill_rect(Vector2::ZERO, Vector2::new(1.0, 1.0));
        assert!(out.vertices().iter().all(|v| v.position[0] >= 100.0));
        assert!(out.vertices().iter().all(|v| v.position[1] >= 50.0));
    }

    #[test]
    fn test_concave_polygon_fill_covers_area() {
        // L shape, area 3
        let l_shape = [
            Vector2::ZERO,
            Vector2::new(2.0, 0.0),
            Vector2::new(2.0, 1.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(1.0, 2.0),
            Vector2::new(0.0, 2.0),
        ];
        let c = tessellate(|t| t.fill_polygon(&l_shape));
        assert_eq!(c.vertex_count() % 3, 0);
        let area: f32 = c
            .vertices()
            .chunks_exact(3)
            .map(|v| {
                let (a, b, d) = (v[0].position, v[1].position, v[2].position);
                ((b[0] - a[0]) * (d[1] - a[1]) - (d[0] - a[0]) * (b[1] - a[1])).abs() / 2.0
            })
            .sum();
        assert!((area - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_set_pen_restarts_depth() {
        let mut out = VertexContainer::new();
        let mut t = Tessellator::new(&mut out, Matrix3::IDENTITY, 0.5);
        t.set_pen([0.0; 4], ShaderProgram::FillEdge);
        t.disc(Vector2::ZERO, 1.0);
        t.set_pen([1.0; 4], ShaderProgram::Hairline);
        t.ring(Vector2::ZERO, 1.0, 0.1);
        assert!(out.vertices().iter().all(|v| v.depth == 0.5));
        assert_eq!(out.runs().len(), 2);
    }
}
