//! View point geometry used by focus traces.
//!
//! World space is right-handed with +X forward, +Y right and +Z up. Rotations
//! are expressed in degrees.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Pitch/yaw/roll orientation in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotator {
    /// Rotation around the right axis (look up/down)
    pub pitch: f32,
    /// Rotation around the up axis (look left/right)
    pub yaw: f32,
    /// Rotation around the forward axis
    pub roll: f32,
}

impl Rotator {
    /// Creates a new rotator.
    #[must_use]
    pub const fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Unit vector this rotation faces along. Roll does not affect it.
    #[must_use]
    pub fn forward(self) -> Vec3 {
        let (sin_pitch, cos_pitch) = self.pitch.to_radians().sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.to_radians().sin_cos();
        Vec3::new(cos_pitch * cos_yaw, cos_pitch * sin_yaw, sin_pitch)
    }

    /// Rotation that looks from `from` towards `to`.
    ///
    /// Returns the zero rotation when the points coincide.
    #[must_use]
    pub fn look_at(from: Vec3, to: Vec3) -> Self {
        let delta = to - from;
        if delta.length_squared() <= f32::EPSILON {
            return Self::default();
        }

        let planar = delta.x.hypot(delta.y);
        Self {
            pitch: delta.z.atan2(planar).to_degrees(),
            yaw: delta.y.atan2(delta.x).to_degrees(),
            roll: 0.0,
        }
    }

    /// Adds yaw/pitch deltas, clamping pitch to straight up/down.
    #[must_use]
    pub fn add_look(self, yaw: f32, pitch: f32) -> Self {
        Self {
            pitch: (self.pitch + pitch).clamp(-89.9, 89.9),
            yaw: (self.yaw + yaw).rem_euclid(360.0),
            roll: self.roll,
        }
    }
}

/// Location and orientation an actor sees the world from.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewPoint {
    /// Eye location
    pub location: Vec3,
    /// Eye orientation
    pub rotation: Rotator,
}

impl ViewPoint {
    /// Creates a view point.
    #[must_use]
    pub const fn new(location: Vec3, rotation: Rotator) -> Self {
        Self { location, rotation }
    }

    /// Unit view direction.
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        self.rotation.forward()
    }

    /// Point `distance` units along the view direction.
    #[must_use]
    pub fn point_at(&self, distance: f32) -> Vec3 {
        self.location + self.direction() * distance
    }
}
