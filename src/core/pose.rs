//! PF-004: Rotary-axis pose resolution for a decoupled two-axis head.
//!
//! Converts a target frame into the A (about world Z) and B (tilt) angles of a
//! 5-axis head plus machine XY. The head is solved independently of the
//! linear axes: the target frame is first carried to the world origin, A is
//! read off its X axis, then its Z axis is re-expressed in a reference frame
//! that has been swung through A to read off B.

use super::geometry::{Frame, Vec3};
use super::types::AxisCalibration;
use std::fmt;

/// Historical probe distance. Any nonzero length works.
pub const DEFAULT_PROBE_DISTANCE: f64 = 5.0;

/// Round to 3 decimals, folding negative zero to zero.
pub fn round3(v: f64) -> f64 {
    let r = (v * 1000.0).round() / 1000.0;
    if r == 0.0 {
        0.0
    } else {
        r
    }
}

/// Move tag for a point in a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    /// Positioning move (G0)
    Rapid,
    /// Cutting move (G1)
    Cut,
}

impl MoveKind {
    /// First point of a path positions, every later point cuts.
    pub fn for_index(index: usize) -> Self {
        if index == 0 {
            Self::Rapid
        } else {
            Self::Cut
        }
    }
}

impl fmt::Display for MoveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rapid => write!(f, "G0"),
            Self::Cut => write!(f, "G1"),
        }
    }
}

/// Resolved machine pose. All values rounded to 3 decimals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotaryPose {
    /// Rotation about world Z (degrees)
    pub a: f64,
    /// Head tilt (degrees)
    pub b: f64,
    /// Machine X (= target Y)
    pub x: f64,
    /// Machine Y (= -target X)
    pub y: f64,
    /// Machine Z (= target Z)
    pub z: f64,
}

/// Stateless solver for the two rotary axes.
#[derive(Debug, Clone, Copy)]
pub struct PoseResolver {
    probe_distance: f64,
    calibration: AxisCalibration,
}

impl Default for PoseResolver {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_DISTANCE, AxisCalibration::default())
    }
}

impl PoseResolver {
    pub fn new(probe_distance: f64, calibration: AxisCalibration) -> Self {
        let probe_distance = if probe_distance == 0.0 {
            DEFAULT_PROBE_DISTANCE
        } else {
            probe_distance.abs()
        };
        Self {
            probe_distance,
            calibration,
        }
    }

    /// Resolve one target frame.
    pub fn resolve(&self, target: &Frame) -> RotaryPose {
        let d = self.probe_distance;

        let ik_frame = Frame::world_xy(target.origin);
        let remapped = target.orient(&ik_frame, &Frame::default());

        let x_probe = remapped.point_at(Vec3::new(d, 0.0, 0.0));
        let alpha = round3(x_probe.y.atan2(x_probe.x).to_degrees());

        let b_frame = Frame::new(Vec3::ZERO, Vec3::Z, Vec3::X)
            .rotate_about_world_z(alpha.to_radians());
        let z_probe = b_frame.to_local(remapped.point_at(Vec3::new(0.0, 0.0, d)));
        let beta = round3(z_probe.y.atan2(z_probe.x).to_degrees());

        RotaryPose {
            a: round3(alpha * self.calibration.a_sign),
            b: round3(beta * self.calibration.b_sign),
            x: round3(target.origin.y),
            y: round3(-target.origin.x),
            z: round3(target.origin.z),
        }
    }

    /// Resolve a whole path, tagging each point with its move kind.
    pub fn resolve_path<'a, I>(&self, frames: I) -> Vec<(MoveKind, RotaryPose)>
    where
        I: IntoIterator<Item = &'a Frame>,
    {
        frames
            .into_iter()
            .enumerate()
            .map(|(i, f)| (MoveKind::for_index(i), self.resolve(f)))
            .collect()
    }
}
