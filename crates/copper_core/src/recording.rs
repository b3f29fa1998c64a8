//! In-memory GAL backend
//!
//! [`RecordingGal`] keeps every primitive it receives, together with the
//! transform and attributes in effect, instead of rasterizing it. Groups are
//! stored relative to the frame they were recorded in and replayed at the
//! transform current at [`Gal::draw_group`] time, exactly like a hardware
//! backend would.

use crate::geometry::{Matrix3, Vector2};
use crate::gal::Gal;
use crate::group::{GroupId, GroupStore};
use crate::state::{Attributes, GalState};

/// A primitive call with its local-frame arguments
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    Line {
        start: Vector2,
        end: Vector2,
    },
    Polyline {
        points: Vec<Vector2>,
    },
    Circle {
        center: Vector2,
        radius: f64,
    },
    Arc {
        center: Vector2,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
    Rectangle {
        start: Vector2,
        end: Vector2,
    },
    Polygon {
        points: Vec<Vector2>,
    },
    Curve {
        start: Vector2,
        control_a: Vector2,
        control_b: Vector2,
        end: Vector2,
    },
}

/// One recorded primitive
#[derive(Clone, Debug, PartialEq)]
pub struct DrawCommand {
    pub primitive: Primitive,
    /// Local to world transform at the time of the call
    pub transform: Matrix3,
    pub attributes: Attributes,
}

impl DrawCommand {
    /// The defining points of the primitive mapped to world coordinates
    ///
    /// Circles and arcs contribute their center only.
    pub fn world_points(&self) -> Vec<Vector2> {
        let local: Vec<Vector2> = match &self.primitive {
            Primitive::Line { start, end } | Primitive::Rectangle { start, end } => {
                vec![*start, *end]
            }
            Primitive::Polyline { points } | Primitive::Polygon { points } => points.clone(),
            Primitive::Circle { center, .. } | Primitive::Arc { center, .. } => vec![*center],
            Primitive::Curve {
                start,
                control_a,
                control_b,
                end,
            } => vec![*start, *control_a, *control_b, *end],
        };

        local
            .into_iter()
            .map(|p| self.transform.transform_point(p))
            .collect()
    }

    pub fn is_line(&self) -> bool {
        matches!(self.primitive, Primitive::Line { .. })
    }

    pub fn is_polyline(&self) -> bool {
        matches!(self.primitive, Primitive::Polyline { .. })
    }
}

#[derive(Debug)]
struct ActiveGroup {
    id: GroupId,
    /// Maps the current local frame back into the group's frame
    base_inverse: Matrix3,
}

/// A GAL backend that records instead of rendering
#[derive(Debug, Default)]
pub struct RecordingGal {
    state: GalState,
    commands: Vec<DrawCommand>,
    groups: GroupStore<Vec<DrawCommand>>,
    active_group: Option<ActiveGroup>,
    replayed_groups: Vec<GroupId>,
    saved_screen: Option<usize>,
    cursor_enabled: bool,
    cursor_position: Option<Vector2>,
    frames: usize,
}

impl RecordingGal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands of the current frame, groups expanded in place
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Recorded content of a live group
    pub fn group(&self, id: GroupId) -> Option<&[DrawCommand]> {
        self.groups.get(id).map(Vec::as_slice)
    }

    /// Groups replayed through [`Gal::draw_group`] this frame, in call order
    pub fn replayed_groups(&self) -> &[GroupId] {
        &self.replayed_groups
    }

    pub fn cursor_position(&self) -> Option<Vector2> {
        self.cursor_position
    }

    /// Number of completed frames
    pub fn frame_count(&self) -> usize {
        self.frames
    }

    fn record(&mut self, primitive: Primitive) {
        let attributes = *self.state.attributes();
        let transform = self.state.transform();

        if let Some(active) = &self.active_group {
            let command = DrawCommand {
                primitive,
                transform: active.base_inverse * transform,
                attributes,
            };
            if let Some(group) = self.groups.get_mut(active.id) {
                group.push(command);
            }
            return;
        }

        self.state.check_drawing("primitive");
        self.commands.push(DrawCommand {
            primitive,
            transform,
            attributes,
        });
    }
}

impl Gal for RecordingGal {
    fn state(&self) -> &GalState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut GalState {
        &mut self.state
    }

    fn begin_drawing(&mut self) {
        self.state.begin_frame();
        self.commands.clear();
        self.replayed_groups.clear();
    }

    fn end_drawing(&mut self) {
        self.state.end_frame();
        self.frames += 1;
    }

    fn clear_screen(&mut self) {
        self.commands.clear();
    }

    fn resize_screen(&mut self, width: u32, height: u32) {
        self.state.view_mut().screen_size = Vector2::new(width as f64, height as f64);
        self.saved_screen = None;
    }

    fn draw_line(&mut self, start: Vector2, end: Vector2) {
        self.record(Primitive::Line { start, end });
    }

    fn draw_polyline(&mut self, points: &[Vector2]) {
        self.record(Primitive::Polyline {
            points: points.to_vec(),
        });
    }

    fn draw_circle(&mut self, center: Vector2, radius: f64) {
        self.record(Primitive::Circle { center, radius });
    }

    fn draw_arc(&mut self, center: Vector2, radius: f64, start_angle: f64, end_angle: f64) {
        self.record(Primitive::Arc {
            center,
            radius,
            start_angle,
            end_angle,
        });
    }

    fn draw_rectangle(&mut self, start: Vector2, end: Vector2) {
        self.record(Primitive::Rectangle { start, end });
    }

    fn draw_polygon(&mut self, points: &[Vector2]) {
        self.record(Primitive::Polygon {
            points: points.to_vec(),
        });
    }

    fn draw_curve(&mut self, start: Vector2, control_a: Vector2, control_b: Vector2, end: Vector2) {
        self.record(Primitive::Curve {
            start,
            control_a,
            control_b,
            end,
        });
    }

    fn begin_group(&mut self) -> GroupId {
        if self.active_group.is_some() {
            tracing::error!("begin_group() while another group is being recorded");
            debug_assert!(false, "nested begin_group()");
            self.end_group();
        }

        let base_inverse = self.state.transform().inverse().unwrap_or_else(|| {
            tracing::warn!("recording a group under a singular transform");
            Matrix3::IDENTITY
        });
        let id = self.groups.insert(Vec::new());
        self.active_group = Some(ActiveGroup { id, base_inverse });
        id
    }

    fn end_group(&mut self) {
        if self.active_group.take().is_none() {
            tracing::error!("end_group() without begin_group()");
            debug_assert!(false, "end_group() without begin_group()");
        }
    }

    fn draw_group(&mut self, group: GroupId) {
        let Some(recorded) = self.groups.get(group).cloned() else {
            tracing::warn!("draw_group() on a deleted group {:?}", group);
            debug_assert!(false, "draw_group() on a deleted group");
            return;
        };

        self.state.check_drawing("draw_group");
        let transform = self.state.transform();
        self.replayed_groups.push(group);
        self.commands
            .extend(recorded.into_iter().map(|command| DrawCommand {
                transform: transform * command.transform,
                ..command
            }));
    }

    fn delete_group(&mut self, group: GroupId) {
        if self
            .active_group
            .as_ref()
            .is_some_and(|active| active.id == group)
        {
            self.active_group = None;
        }
        self.groups.remove(group);
    }

    fn group_count(&self) -> usize {
        self.groups.len()
    }

    fn save_screen(&mut self) {
        self.saved_screen = Some(self.commands.len());
    }

    fn restore_screen(&mut self) {
        match self.saved_screen {
            Some(len) => self.commands.truncate(len),
            None => tracing::warn!("restore_screen() without a saved screen"),
        }
    }

    fn set_cursor_enabled(&mut self, enabled: bool) {
        self.cursor_enabled = enabled;
        if !enabled {
            self.cursor_position = None;
        }
    }

    fn draw_cursor(&mut self, position: Vector2) {
        if self.cursor_enabled {
            self.cursor_position = Some(position);
        }
    }
}
