//! Geometry primitives
//!
//! Double precision vectors, affine matrices and boxes. Board coordinates
//! are large integers in internal units, so everything on the CPU side of
//! the pipeline stays in `f64` until vertices are emitted.

use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Vector2
// ─────────────────────────────────────────────────────────────────────────────

/// 2D vector / point
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2::new(0.0, 0.0);

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Vector2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product
    pub fn cross(self, other: Vector2) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn squared_length(self) -> f64 {
        self.dot(self)
    }

    /// Angle to the positive x axis, in radians
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Rotate counter-clockwise by `angle` radians
    pub fn rotate(self, angle: f64) -> Vector2 {
        let (sin, cos) = angle.sin_cos();
        Vector2::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Vector rotated by 90 degrees
    pub fn perpendicular(self) -> Vector2 {
        Vector2::new(-self.y, self.x)
    }

    /// Unit vector in the same direction; the zero vector stays zero
    pub fn normalized(self) -> Vector2 {
        let len = self.length();
        if len == 0.0 {
            Vector2::ZERO
        } else {
            self / len
        }
    }

    /// Same direction, scaled to `length`
    pub fn resized(self, length: f64) -> Vector2 {
        self.normalized() * length
    }

    pub fn distance(self, other: Vector2) -> f64 {
        (other - self).length()
    }

    pub fn lerp(self, other: Vector2, t: f64) -> Vector2 {
        self + (other - self) * t
    }

    pub fn to_f32(self) -> [f32; 2] {
        [self.x as f32, self.y as f32]
    }
}

impl Add for Vector2 {
    type Output = Vector2;

    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector2 {
    fn add_assign(&mut self, rhs: Vector2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector2 {
    type Output = Vector2;

    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vector2 {
    fn sub_assign(&mut self, rhs: Vector2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for Vector2 {
    type Output = Vector2;

    fn mul(self, rhs: f64) -> Vector2 {
        Vector2::new(self.x * rhs, self.y * rhs)
    }
}

impl MulAssign<f64> for Vector2 {
    fn mul_assign(&mut self, rhs: f64) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

impl Div<f64> for Vector2 {
    type Output = Vector2;

    fn div(self, rhs: f64) -> Vector2 {
        Vector2::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vector2 {
    type Output = Vector2;

    fn neg(self) -> Vector2 {
        Vector2::new(-self.x, -self.y)
    }
}

impl From<(f64, f64)> for Vector2 {
    fn from((x, y): (f64, f64)) -> Self {
        Vector2::new(x, y)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Matrix3
// ─────────────────────────────────────────────────────────────────────────────

/// 3x3 affine transformation matrix, row major
///
/// Points are column vectors: `p' = M * p`. The bottom row of an affine
/// matrix is always `[0, 0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix3 {
    pub m: [[f64; 3]; 3],
}

impl Default for Matrix3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix3 {
    pub const IDENTITY: Matrix3 = Matrix3 {
        m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    pub fn translation(offset: Vector2) -> Self {
        Matrix3 {
            m: [[1.0, 0.0, offset.x], [0.0, 1.0, offset.y], [0.0, 0.0, 1.0]],
        }
    }

    /// Counter-clockwise rotation by `angle` radians
    pub fn rotation(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Matrix3 {
            m: [[cos, -sin, 0.0], [sin, cos, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    pub fn scale(factors: Vector2) -> Self {
        Matrix3 {
            m: [[factors.x, 0.0, 0.0], [0.0, factors.y, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Matrix product `self * rhs`: `rhs` is applied first
    pub fn multiply(&self, rhs: &Matrix3) -> Matrix3 {
        let mut out = [[0.0; 3]; 3];
        for (row, out_row) in out.iter_mut().enumerate() {
            for (col, cell) in out_row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.m[row][k] * rhs.m[k][col]).sum();
            }
        }
        Matrix3 { m: out }
    }

    pub fn transform_point(&self, p: Vector2) -> Vector2 {
        Vector2::new(
            self.m[0][0] * p.x + self.m[0][1] * p.y + self.m[0][2],
            self.m[1][0] * p.x + self.m[1][1] * p.y + self.m[1][2],
        )
    }

    /// Transform a direction, ignoring translation
    pub fn transform_vector(&self, v: Vector2) -> Vector2 {
        Vector2::new(
            self.m[0][0] * v.x + self.m[0][1] * v.y,
            self.m[1][0] * v.x + self.m[1][1] * v.y,
        )
    }

    pub fn determinant(&self) -> f64 {
        let m = &self.m;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// Inverse matrix, `None` when singular
    pub fn inverse(&self) -> Option<Matrix3> {
        let det = self.determinant();
        if det.abs() < f64::EPSILON * 1e-6 || !det.is_finite() {
            return None;
        }

        let m = &self.m;
        let inv_det = 1.0 / det;
        let cofactor = |r0: usize, r1: usize, c0: usize, c1: usize| {
            m[r0][c0] * m[r1][c1] - m[r0][c1] * m[r1][c0]
        };

        Some(Matrix3 {
            m: [
                [
                    cofactor(1, 2, 1, 2) * inv_det,
                    -cofactor(0, 2, 1, 2) * inv_det,
                    cofactor(0, 1, 1, 2) * inv_det,
                ],
                [
                    -cofactor(1, 2, 0, 2) * inv_det,
                    cofactor(0, 2, 0, 2) * inv_det,
                    -cofactor(0, 1, 0, 2) * inv_det,
                ],
                [
                    cofactor(1, 2, 0, 1) * inv_det,
                    -cofactor(0, 2, 0, 1) * inv_det,
                    cofactor(0, 1, 0, 1) * inv_det,
                ],
            ],
        })
    }

    /// Average linear scale factor, used to size circles and line widths
    pub fn scale_factor(&self) -> f64 {
        self.determinant().abs().sqrt()
    }

    /// Column-major 4x4 matrix suitable for a WGSL `mat4x4<f32>` uniform
    pub fn to_mat4_f32(&self) -> [[f32; 4]; 4] {
        let m = &self.m;
        [
            [m[0][0] as f32, m[1][0] as f32, 0.0, 0.0],
            [m[0][1] as f32, m[1][1] as f32, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [m[0][2] as f32, m[1][2] as f32, 0.0, 1.0],
        ]
    }
}

impl Mul for Matrix3 {
    type Output = Matrix3;

    fn mul(self, rhs: Matrix3) -> Matrix3 {
        self.multiply(&rhs)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Box2
// ─────────────────────────────────────────────────────────────────────────────

/// Axis-aligned box given by origin and size
///
/// The size may be negative until [`Box2::normalize`] is called.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Box2 {
    pub origin: Vector2,
    pub size: Vector2,
}

impl Box2 {
    pub const fn new(origin: Vector2, size: Vector2) -> Self {
        Self { origin, size }
    }

    /// Smallest box containing all `points`; the empty slice yields a
    /// zero-sized box at the origin
    pub fn compute(points: &[Vector2]) -> Self {
        let Some(first) = points.first() else {
            return Box2::default();
        };

        let (mut min, mut max) = (*first, *first);
        for p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }

        Box2::new(min, max - min)
    }

    pub fn end(&self) -> Vector2 {
        self.origin + self.size
    }

    pub fn width(&self) -> f64 {
        self.size.x
    }

    pub fn height(&self) -> f64 {
        self.size.y
    }

    pub fn center(&self) -> Vector2 {
        self.origin + self.size / 2.0
    }

    /// Make the size non-negative, keeping the covered area
    pub fn normalize(mut self) -> Self {
        if self.size.x < 0.0 {
            self.origin.x += self.size.x;
            self.size.x = -self.size.x;
        }
        if self.size.y < 0.0 {
            self.origin.y += self.size.y;
            self.size.y = -self.size.y;
        }
        self
    }

    pub fn merge(&self, other: &Box2) -> Box2 {
        let a = self.normalize();
        let b = other.normalize();
        Box2::compute(&[a.origin, a.end(), b.origin, b.end()])
    }

    pub fn inflate(&self, delta: f64) -> Box2 {
        let b = self.normalize();
        Box2::new(
            b.origin - Vector2::new(delta, delta),
            b.size + Vector2::new(delta * 2.0, delta * 2.0),
        )
    }

    pub fn contains(&self, p: Vector2) -> bool {
        let b = self.normalize();
        let end = b.end();
        p.x >= b.origin.x && p.x <= end.x && p.y >= b.origin.y && p.y <= end.y
    }

    pub fn intersects(&self, other: &Box2) -> bool {
        let a = self.normalize();
        let b = other.normalize();
        a.origin.x <= b.end().x
            && b.origin.x <= a.end().x
            && a.origin.y <= b.end().y
            && b.origin.y <= a.end().y
    }
}
