//! Device-independent half of the hardware backend
//!
//! [`Canvas`] turns GAL calls into triangles and keeps the frame's draw
//! list. Immediate-mode geometry lands in one per-frame container in world
//! coordinates; group geometry is recorded in the group's own frame and
//! replayed with a model transform. The renderer only uploads and draws
//! what the canvas produced.

use std::ops::Range;

use copper_core::{
    Attributes, Color, GalConfig, GalState, GroupId, GroupStore, Matrix3, Vector2,
};

use crate::container::{ShaderProgram, VertexContainer};
use crate::tables::unit_tables;
use crate::tessellator::Tessellator;

/// One entry of the per-frame draw list
#[derive(Clone, Debug, PartialEq)]
pub enum FrameOp {
    /// Runs `start..end` of the immediate container
    Immediate(Range<usize>),
    /// Replay of a recorded group with a model transform
    Group { id: GroupId, transform: Matrix3 },
}

#[derive(Clone, Copy, Debug)]
struct ActiveGroup {
    id: GroupId,
    base_inverse: Matrix3,
}

/// GAL primitive engine without a device
#[derive(Debug)]
pub struct Canvas {
    state: GalState,
    config: GalConfig,
    immediate: VertexContainer,
    groups: GroupStore<VertexContainer>,
    active_group: Option<ActiveGroup>,
    ops: Vec<FrameOp>,
    noted_runs: usize,
}

impl Canvas {
    pub fn new(config: GalConfig) -> Self {
        // tables are shared; build them before the first frame
        let _ = unit_tables();

        let mut state = GalState::new();
        state.set_background_color(config.background_color);
        {
            let view = state.view_mut();
            view.world_unit_length = config.world_unit_length;
            view.screen_dpi = config.screen_dpi;
        }

        Self {
            state,
            immediate: VertexContainer::with_capacity(config.max_vertices),
            config,
            groups: GroupStore::new(),
            active_group: None,
            ops: Vec::new(),
            noted_runs: 0,
        }
    }

    pub fn state(&self) -> &GalState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GalState {
        &mut self.state
    }

    pub fn config(&self) -> &GalConfig {
        &self.config
    }

    pub fn set_antialiasing(&mut self, enabled: bool) {
        self.config.antialiasing = enabled;
    }

    /// Draw list of the pending batch
    pub fn ops(&self) -> &[FrameOp] {
        &self.ops
    }

    pub fn immediate(&self) -> &VertexContainer {
        &self.immediate
    }

    pub fn group(&self, id: GroupId) -> Option<&VertexContainer> {
        self.groups.get(id)
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn is_recording(&self) -> bool {
        self.active_group.is_some()
    }

    /// Forget the pending batch after it was submitted
    pub fn finish_batch(&mut self) {
        self.ops.clear();
        self.immediate.clear();
        self.noted_runs = 0;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Shader selection
    // ─────────────────────────────────────────────────────────────────────────

    pub fn fill_program(&self) -> ShaderProgram {
        if self.config.antialiasing {
            ShaderProgram::FillEdge
        } else {
            ShaderProgram::Solid
        }
    }

    pub fn stroke_program(&self) -> ShaderProgram {
        if self.config.antialiasing {
            ShaderProgram::Hairline
        } else {
            ShaderProgram::Solid
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Emission
    // ─────────────────────────────────────────────────────────────────────────

    fn emit<F>(&mut self, operation: &str, f: F)
    where
        F: FnOnce(&mut Tessellator<'_>, &Attributes, ShaderProgram, ShaderProgram),
    {
        let attributes = *self.state.attributes();
        let depth = self.config.normalize_depth(attributes.layer_depth) as f32;
        let (fill, stroke) = (self.fill_program(), self.stroke_program());
        let transform = self.state.transform();

        match self.active_group {
            Some(active) => {
                let Some(group) = self.groups.get_mut(active.id) else {
                    return;
                };
                let mut t = Tessellator::new(group, active.base_inverse * transform, depth);
                f(&mut t, &attributes, fill, stroke);
            }
            None => {
                self.state.check_drawing(operation);
                let mut t = Tessellator::new(&mut self.immediate, transform, depth);
                f(&mut t, &attributes, fill, stroke);
                self.note_immediate();
            }
        }
    }

    /// Extend or open the immediate op covering newly added runs
    fn note_immediate(&mut self) {
        let runs = self.immediate.runs().len();
        if runs == self.noted_runs {
            return;
        }

        match self.ops.last_mut() {
            Some(FrameOp::Immediate(range)) if range.end == self.noted_runs => range.end = runs,
            _ => self.ops.push(FrameOp::Immediate(self.noted_runs..runs)),
        }
        self.noted_runs = runs;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Frame lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    pub fn begin_drawing(&mut self) {
        self.state.begin_frame();
        self.finish_batch();
    }

    pub fn end_drawing(&mut self) {
        if self.active_group.is_some() {
            tracing::error!("frame ended while a group was being recorded");
            debug_assert!(false, "frame ended inside begin_group()/end_group()");
            self.active_group = None;
        }
        self.state.end_frame();
    }

    pub fn clear_screen(&mut self) {
        self.finish_batch();
    }

    pub fn resize_screen(&mut self, width: u32, height: u32) {
        self.state.view_mut().screen_size = Vector2::new(width as f64, height as f64);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Primitives
    // ─────────────────────────────────────────────────────────────────────────

    pub fn draw_line(&mut self, start: Vector2, end: Vector2) {
        self.emit("draw_line", |t, a, _, stroke| {
            t.set_pen(a.stroke_color.into(), stroke);
            t.stroke_line(start, end, a.line_width, a.line_cap);
        });
    }

    pub fn draw_polyline(&mut self, points: &[Vector2]) {
        self.emit("draw_polyline", |t, a, _, stroke| {
            t.set_pen(a.stroke_color.into(), stroke);
            t.stroke_polyline(points, a.line_width, a.line_cap, a.line_join);
        });
    }

    pub fn draw_circle(&mut self, center: Vector2, radius: f64) {
        self.emit("draw_circle", |t, a, fill, stroke| {
            if a.is_fill {
                t.set_pen(a.fill_color.into(), fill);
                t.disc(center, radius);
            }
            if a.is_stroke {
                t.set_pen(a.stroke_color.into(), stroke);
                t.ring(center, radius, a.line_width);
            }
        });
    }

    pub fn draw_arc(&mut self, center: Vector2, radius: f64, start_angle: f64, end_angle: f64) {
        self.emit("draw_arc", |t, a, fill, stroke| {
            if a.is_fill {
                t.set_pen(a.fill_color.into(), fill);
                t.pie(center, radius, start_angle, end_angle);
            }
            if a.is_stroke {
                t.set_pen(a.stroke_color.into(), stroke);
                t.arc_band(center, radius, a.line_width, start_angle, end_angle);
            }
        });
    }

    pub fn draw_rectangle(&mut self, start: Vector2, end: Vector2) {
        self.emit("draw_rectangle", |t, a, fill, stroke| {
            if a.is_fill {
                t.set_pen(a.fill_color.into(), fill);
                t.fill_rect(start, end);
            }
            if a.is_stroke {
                t.set_pen(a.stroke_color.into(), stroke);
                let outline = [
                    start,
                    Vector2::new(end.x, start.y),
                    end,
                    Vector2::new(start.x, end.y),
                    start,
                ];
                t.stroke_polyline(&outline, a.line_width, a.line_cap, a.line_join);
            }
        });
    }

    pub fn draw_polygon(&mut self, points: &[Vector2]) {
        self.emit("draw_polygon", |t, a, fill, stroke| {
            if a.is_fill {
                t.set_pen(a.fill_color.into(), fill);
                t.fill_polygon(points);
            }
            if a.is_stroke && !points.is_empty() {
                t.set_pen(a.stroke_color.into(), stroke);
                let mut closed = points.to_vec();
                closed.push(points[0]);
                t.stroke_polyline(&closed, a.line_width, a.line_cap, a.line_join);
            }
        });
    }

    pub fn draw_curve(
        &mut self,
        start: Vector2,
        control_a: Vector2,
        control_b: Vector2,
        end: Vector2,
    ) {
        let points = unit_tables().flatten_curve(start, control_a, control_b, end);
        self.draw_polyline(&points);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Groups
    // ─────────────────────────────────────────────────────────────────────────

    pub fn begin_group(&mut self) -> GroupId {
        if self.active_group.is_some() {
            tracing::error!("begin_group() while another group is being recorded");
            debug_assert!(false, "nested begin_group()");
            self.end_group();
        }

        let base_inverse = self.state.transform().inverse().unwrap_or_else(|| {
            tracing::warn!("recording a group under a singular transform");
            Matrix3::IDENTITY
        });
        let id = self.groups.insert(VertexContainer::new());
        self.active_group = Some(ActiveGroup { id, base_inverse });
        id
    }

    /// Stop recording; returns the finished group for upload
    pub fn end_group(&mut self) -> Option<GroupId> {
        match self.active_group.take() {
            Some(active) => Some(active.id),
            None => {
                tracing::error!("end_group() without begin_group()");
                debug_assert!(false, "end_group() without begin_group()");
                None
            }
        }
    }

    pub fn draw_group(&mut self, id: GroupId) {
        if !self.groups.contains(id) {
            tracing::warn!("draw_group() on a deleted group {:?}", id);
            debug_assert!(false, "draw_group() on a deleted group");
            return;
        }
        if self.active_group.is_some() {
            tracing::warn!("draw_group() while recording a group is not supported");
            return;
        }

        self.state.check_drawing("draw_group");
        self.immediate.seal();
        self.ops.push(FrameOp::Group {
            id,
            transform: self.state.transform(),
        });
    }

    /// Remove a group; returns false when it was already gone
    pub fn delete_group(&mut self, id: GroupId) -> bool {
        if self.active_group.is_some_and(|active| active.id == id) {
            self.active_group = None;
        }
        self.ops
            .retain(|op| !matches!(op, FrameOp::Group { id: op_id, .. } if *op_id == id));
        self.groups.remove(id).is_some()
    }

    /// Background color as configured or last set
    pub fn background_color(&self) -> Color {
        self.state.background_color()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use copper_core::LineCap;

    fn canvas() -> Canvas {
        let mut canvas = Canvas::new(GalConfig::default());
        canvas.begin_drawing();
        canvas
    }

    #[test]
    fn test_immediate_ops_merge() {
        let mut c = canvas();
        c.draw_line(Vector2::ZERO, Vector2::new(1.0, 0.0));
        c.draw_line(Vector2::ZERO, Vector2::new(0.0, 1.0));
        assert_eq!(c.ops().len(), 1);
        assert!(matches!(c.ops()[0], FrameOp::Immediate(_)));
    }

    #[test]
    fn test_shader_selection_follows_fill_state() {
        let mut c = canvas();
        c.state_mut().attributes_mut().is_fill = true;
        c.state_mut().attributes_mut().is_stroke = true;
        c.draw_circle(Vector2::ZERO, 10.0);

        let programs: Vec<_> = c.immediate().runs().iter().map(|r| r.program).collect();
        assert_eq!(
            programs,
            vec![ShaderProgram::FillEdge, ShaderProgram::Hairline]
        );

        let mut flat = Canvas::new(GalConfig {
            antialiasing: false,
            ..Default::default()
        });
        flat.begin_drawing();
        flat.state_mut().attributes_mut().is_fill = true;
        flat.draw_circle(Vector2::ZERO, 10.0);
        assert!(flat
            .immediate()
            .runs()
            .iter()
            .all(|r| r.program == ShaderProgram::Solid));
    }

    #[test]
    fn test_group_recorded_relative_and_replayed() {
        let mut c = canvas();
        c.state_mut().translate(Vector2::new(50.0, 0.0));
        let id = c.begin_group();
        c.state_mut().attributes_mut().line_cap = LineCap::Butt;
        c.draw_line(Vector2::ZERO, Vector2::new(10.0, 0.0));
        assert_eq!(c.end_group(), Some(id));

        // recording emits nothing into the frame
        assert!(c.ops().is_empty());
        // the group is stored in its own frame
        let group = c.group(id).unwrap();
        assert!(group.vertices().iter().all(|v| v.position[0] <= 10.0));

        c.draw_group(id);
        c.draw_line(Vector2::ZERO, Vector2::new(1.0, 1.0));
        assert_eq!(c.ops().len(), 2);
        match &c.ops()[0] {
            FrameOp::Group { transform, .. } => {
                let p = transform.transform_point(Vector2::ZERO);
                assert_eq!(p, Vector2::new(50.0, 0.0));
            }
            other => panic!("unexpected op {:?}", other),
        }
    }

    #[test]
    fn test_group_between_immediate_draws_keeps_order() {
        let mut c = canvas();
        let id = c.begin_group();
        c.draw_circle(Vector2::ZERO, 1.0);
        c.end_group();

        c.draw_line(Vector2::ZERO, Vector2::new(1.0, 0.0));
        c.draw_group(id);
        c.draw_line(Vector2::ZERO, Vector2::new(2.0, 0.0));

        assert_eq!(c.ops().len(), 3);
        assert_eq!(c.ops()[0], FrameOp::Immediate(0..1));
        assert_eq!(c.ops()[2], FrameOp::Immediate(1..2));
    }

    #[test]
    fn test_delete_group_twice() {
        let mut c = canvas();
        let before = c.group_count();
        let id = c.begin_group();
        c.end_group();
        assert!(c.delete_group(id));
        assert!(!c.delete_group(id));
        assert_eq!(c.group_count(), before);
    }

    #[test]
    fn test_layer_depth_is_normalized() {
        let mut c = canvas();
        c.state_mut().attributes_mut().layer_depth = 0.0;
        c.draw_line(Vector2::ZERO, Vector2::new(1.0, 0.0));
        assert_eq!(c.immediate().vertices()[0].depth, 0.5);
    }

    #[test]
    fn test_curve_flattens_to_polyline() {
        let mut c = canvas();
        c.state_mut().attributes_mut().line_cap = LineCap::Butt;
        c.state_mut().attributes_mut().line_join = copper_core::LineJoin::Bevel;
        c.draw_curve(
            Vector2::ZERO,
            Vector2::new(0.0, 10.0),
            Vector2::new(10.0, 10.0),
            Vector2::new(10.0, 0.0),
        );
        assert!(c.immediate().vertex_count() >= crate::tables::CURVE_POINTS * 6);
    }
}
