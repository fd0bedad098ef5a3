//! PF-003: Vector and frame primitives shared by pose resolution and target formatting.
//!
//! A `Frame` is an origin plus two orthonormal in-plane axes; the third axis is
//! always derived as `x × y` so frames read from YAML cannot be left-handed.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// Tolerance for orthonormality checks on user-supplied frames.
pub const FRAME_TOLERANCE: f64 = 1e-6;

/// A 3D vector / point. Serialized as `[x, y, z]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const X: Vec3 = Vec3::new(1.0, 0.0, 0.0);
    pub const Y: Vec3 = Vec3::new(0.0, 1.0, 0.0);
    pub const Z: Vec3 = Vec3::new(0.0, 0.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction; the zero vector is returned unchanged.
    pub fn normalized(self) -> Vec3 {
        let len = self.length();
        if len == 0.0 {
            self
        } else {
            self * (1.0 / len)
        }
    }

    /// Rotate about the world Z axis by `angle` radians.
    pub fn rotate_z(self, angle: f64) -> Vec3 {
        let (s, c) = angle.sin_cos();
        Vec3::new(c * self.x - s * self.y, s * self.x + c * self.y, self.z)
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(v: [f64; 3]) -> Self {
        Vec3::new(v[0], v[1], v[2])
    }
}

impl From<Vec3> for [f64; 3] {
    fn from(v: Vec3) -> Self {
        [v.x, v.y, v.z]
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

/// An oriented plane: origin plus X and Y axes in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(default)]
    pub origin: Vec3,

    #[serde(default = "default_x_axis")]
    pub x_axis: Vec3,

    #[serde(default = "default_y_axis")]
    pub y_axis: Vec3,
}

fn default_x_axis() -> Vec3 {
    Vec3::X
}

fn default_y_axis() -> Vec3 {
    Vec3::Y
}

impl Default for Frame {
    fn default() -> Self {
        Self::world_xy(Vec3::ZERO)
    }
}

impl Frame {
    pub fn new(origin: Vec3, x_axis: Vec3, y_axis: Vec3) -> Self {
        Self {
            origin,
            x_axis,
            y_axis,
        }
    }

    /// A world-aligned frame placed at `origin`.
    pub fn world_xy(origin: Vec3) -> Self {
        Self::new(origin, Vec3::X, Vec3::Y)
    }

    pub fn z_axis(&self) -> Vec3 {
        self.x_axis.cross(self.y_axis)
    }

    /// Map local coordinates to a world point.
    pub fn point_at(&self, local: Vec3) -> Vec3 {
        self.origin + self.direction_at(local)
    }

    /// Map a local direction to a world direction (no translation).
    pub fn direction_at(&self, local: Vec3) -> Vec3 {
        self.x_axis * local.x + self.y_axis * local.y + self.z_axis() * local.z
    }

    /// Express a world point in this frame's local coordinates.
    pub fn to_local(&self, point: Vec3) -> Vec3 {
        let d = point - self.origin;
        Vec3::new(d.dot(self.x_axis), d.dot(self.y_axis), d.dot(self.z_axis()))
    }

    fn direction_to_local(&self, dir: Vec3) -> Vec3 {
        Vec3::new(
            dir.dot(self.x_axis),
            dir.dot(self.y_axis),
            dir.dot(self.z_axis()),
        )
    }

    /// Apply the change of basis that carries `from` onto `to`.
    pub fn orient(&self, from: &Frame, to: &Frame) -> Frame {
        Frame::new(
            to.point_at(from.to_local(self.origin)),
            to.direction_at(from.direction_to_local(self.x_axis)),
            to.direction_at(from.direction_to_local(self.y_axis)),
        )
    }

    /// Rotate the whole frame about the world Z axis through the world origin.
    pub fn rotate_about_world_z(&self, angle: f64) -> Frame {
        Frame::new(
            self.origin.rotate_z(angle),
            self.x_axis.rotate_z(angle),
            self.y_axis.rotate_z(angle),
        )
    }

    pub fn is_orthonormal(&self) -> bool {
        (self.x_axis.length() - 1.0).abs() < FRAME_TOLERANCE
            && (self.y_axis.length() - 1.0).abs() < FRAME_TOLERANCE
            && self.x_axis.dot(self.y_axis).abs() < FRAME_TOLERANCE
    }

    /// Orientation as a unit quaternion `[w, x, y, z]`.
    pub fn quaternion(&self) -> [f64; 4] {
        let (x, y, z) = (self.x_axis, self.y_axis, self.z_axis());
        // Rotation matrix columns are the frame axes.
        let (m00, m01, m02) = (x.x, y.x, z.x);
        let (m10, m11, m12) = (x.y, y.y, z.y);
        let (m20, m21, m22) = (x.z, y.z, z.z);
        let trace = m00 + m11 + m22;

        let q = if trace > 0.0 {
            let s = (trace + 1.0).sqrt() * 2.0;
            [0.25 * s, (m21 - m12) / s, (m02 - m20) / s, (m10 - m01) / s]
        } else if m00 > m11 && m00 > m22 {
            let s = (1.0 + m00 - m11 - m22).sqrt() * 2.0;
            [(m21 - m12) / s, 0.25 * s, (m01 + m10) / s, (m02 + m20) / s]
        } else if m11 > m22 {
            let s = (1.0 + m11 - m00 - m22).sqrt() * 2.0;
            [(m02 - m20) / s, (m01 + m10) / s, 0.25 * s, (m12 + m21) / s]
        } else {
            let s = (1.0 + m22 - m00 - m11).sqrt() * 2.0;
            [(m10 - m01) / s, (m02 + m20) / s, (m12 + m21) / s, 0.25 * s]
        };

        let norm = q.iter().map(|c| c * c).sum::<f64>().sqrt();
        q.map(|c| c / norm)
    }

    /// Orientation as intrinsic Z-Y-X Euler angles `(a, b, c)` in degrees.
    pub fn euler_zyx(&self) -> (f64, f64, f64) {
        let (x, y, z) = (self.x_axis, self.y_axis, self.z_axis());
        let cos_b = (x.x * x.x + x.y * x.y).sqrt();
        let b = (-x.z).atan2(cos_b);
        let (a, c) = if cos_b > 1e-9 {
            (x.y.atan2(x.x), y.z.atan2(z.z))
        } else {
            // gimbal lock: fold C into A
            ((-y.x).atan2(y.y), 0.0)
        };
        (a.to_degrees(), b.to_degrees(), c.to_degrees())
    }
}
