//! Precomputed unit geometry
//!
//! Circles, arcs, round caps and curves are all generated from these tables
//! by scaling and rotating, so the hot path does no trigonometry per point.
//! The tables are built once per process and never change.

use std::f64::consts::{PI, TAU};
use std::sync::OnceLock;

use copper_core::Vector2;

/// Segments of a full circle
pub const CIRCLE_POINTS: usize = 64;

/// Segments a cubic Bezier is flattened into
pub const CURVE_POINTS: usize = 32;

/// Angle between consecutive circle table points
pub const CIRCLE_STEP: f64 = TAU / CIRCLE_POINTS as f64;

/// Read-only unit geometry shared by every backend instance
#[derive(Debug)]
pub struct UnitTables {
    /// `CIRCLE_POINTS + 1` points on the unit circle, counter-clockwise from
    /// angle 0; the last point repeats the first
    pub circle: Vec<Vector2>,
    /// `CIRCLE_POINTS / 2 + 1` points on the half circle facing +x, from
    /// -90 to +90 degrees
    pub semicircle: Vec<Vector2>,
    /// Bernstein basis `[(1-t)^3, 3t(1-t)^2, 3t^2(1-t), t^3]` at
    /// `t = i / CURVE_POINTS` for `i` in `0..=CURVE_POINTS`
    pub curve: Vec<[f64; 4]>,
}

impl UnitTables {
    fn build() -> Self {
        let circle = (0..=CIRCLE_POINTS)
            .map(|i| {
                let angle = (i % CIRCLE_POINTS) as f64 * CIRCLE_STEP;
                Vector2::new(angle.cos(), angle.sin())
            })
            .collect();

        let semicircle = (0..=CIRCLE_POINTS / 2)
            .map(|i| {
                let angle = -PI / 2.0 + i as f64 * CIRCLE_STEP;
                Vector2::new(angle.cos(), angle.sin())
            })
            .collect();

        let curve = (0..=CURVE_POINTS)
            .map(|i| {
                let t = i as f64 / CURVE_POINTS as f64;
                let s = 1.0 - t;
                [s * s * s, 3.0 * t * s * s, 3.0 * t * t * s, t * t * t]
            })
            .collect();

        tracing::debug!(
            "built unit tables: {} circle points, {} curve steps",
            CIRCLE_POINTS,
            CURVE_POINTS
        );

        Self {
            circle,
            semicircle,
            curve,
        }
    }

    /// Points of an arc of the given radius around the origin
    ///
    /// The table is walked from `start_angle` in whole circle steps towards
    /// `end_angle` (either direction), and the exact end point closes the
    /// arc. Only the start and end angle need trigonometry. Sweeps beyond a
    /// full turn are clamped to one; non-finite angles give no points.
    pub fn arc_points(&self, radius: f64, start_angle: f64, end_angle: f64) -> Vec<Vector2> {
        if !start_angle.is_finite() || !end_angle.is_finite() {
            tracing::warn!(
                "arc with non-finite angles {} .. {} skipped",
                start_angle,
                end_angle
            );
            return Vec::new();
        }

        let sweep = (end_angle - start_angle).clamp(-TAU, TAU);
        let end_angle = start_angle + sweep;
        let steps = ((sweep.abs() / CIRCLE_STEP - 1e-9).ceil() as usize).max(1);
        let rotation = Vector2::new(start_angle.cos(), start_angle.sin());

        let mut points = Vec::with_capacity(steps + 1);
        for i in 0..steps {
            let p = self.circle[i % CIRCLE_POINTS];
            let unit = if sweep >= 0.0 { p } else { Vector2::new(p.x, -p.y) };
            points.push(rotate_by(unit, rotation) * radius);
        }
        points.push(Vector2::new(end_angle.cos(), end_angle.sin()) * radius);
        points
    }

    /// Evaluate a cubic Bezier at the table's parameter steps
    pub fn flatten_curve(
        &self,
        start: Vector2,
        control_a: Vector2,
        control_b: Vector2,
        end: Vector2,
    ) -> Vec<Vector2> {
        self.curve
            .iter()
            .map(|[b0, b1, b2, b3]| start * *b0 + control_a * *b1 + control_b * *b2 + end * *b3)
            .collect()
    }
}

/// Rotate `v` by the unit direction `rotation` (complex multiplication)
pub fn rotate_by(v: Vector2, rotation: Vector2) -> Vector2 {
    Vector2::new(
        v.x * rotation.x - v.y * rotation.y,
        v.x * rotation.y + v.y * rotation.x,
    )
}

/// The process-wide unit tables
pub fn unit_tables() -> &'static UnitTables {
    static TABLES: OnceLock<UnitTables> = OnceLock::new();
    TABLES.get_or_init(UnitTables::build)
}
