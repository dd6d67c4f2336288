//! Rigid transforms used for parts and connectors.
use glam::{Quat, Vec3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Position and orientation in world or part-local space.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        orientation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
        }
    }

    /// Translation plus a rotation of `yaw` radians about +Y.
    pub fn from_position_yaw(position: Vec3, yaw: f32) -> Self {
        Self {
            position,
            orientation: Quat::from_rotation_y(yaw),
        }
    }

    /// Maps a transform expressed in this transform's local frame into the parent frame.
    #[inline]
    pub fn compose(&self, local: &Transform) -> Transform {
        Transform {
            position: self.position + self.orientation * local.position,
            orientation: self.orientation * local.orientation,
        }
    }

    /// Local +Z axis in the parent frame.
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::Z
    }

    #[inline]
    pub fn distance_squared(&self, position: Vec3) -> f32 {
        self.position.distance_squared(position)
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.orientation.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    #[test]
    fn compose_rotates_local_offset() {
        let parent = Transform::from_position_yaw(Vec3::new(1.0, 0.0, 0.0), FRAC_PI_2);
        let local = Transform::from_position(Vec3::new(0.0, 0.0, 2.0));
        let world = parent.compose(&local);
        assert!(world.position.abs_diff_eq(Vec3::new(3.0, 0.0, 0.0), 1e-5));
        assert!(world.orientation.abs_diff_eq(parent.orientation, 1e-6));
    }

    #[test]
    fn identity_is_neutral() {
        let t = Transform::from_position_yaw(Vec3::new(4.0, 1.0, -2.0), 0.3);
        let front = Transform::IDENTITY.compose(&t);
        assert!(front.position.abs_diff_eq(t.position, 1e-6));
        assert!(front.orientation.abs_diff_eq(t.orientation, 1e-6));
        let back = t.compose(&Transform::IDENTITY);
        assert!(back.position.abs_diff_eq(t.position, 1e-6));
        assert!(back.orientation.abs_diff_eq(t.orientation, 1e-6));
    }

    #[test]
    fn forward_follows_yaw() {
        let t = Transform::from_position_yaw(Vec3::ZERO, FRAC_PI_2);
        assert!(t.forward().abs_diff_eq(Vec3::X, 1e-6));
    }
}
