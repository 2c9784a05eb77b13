//! Transform component: position, rotation and scale.

use crate::math::{consts, Matrix4x4, Quaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Position, rotation and scale composed into a single affine transform.
///
/// The matrix is derived on demand by [`Transform::transformation`] and is
/// never cached. The mutators read and write the fields in place, so a
/// transform shared across threads needs external synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Position.
    pub position: Vector3,
    /// Rotation as a unit quaternion.
    pub rotation: Quaternion,
    /// Per-axis scale.
    pub scale: Vector3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::ZERO,
            rotation: Quaternion::IDENTITY,
            scale: Vector3::ONE,
        }
    }
}

impl Transform {
    /// World up axis used by [`Transform::look_at`].
    pub const WORLD_UP: Vector3 = Vector3::UNIT_Y;

    /// Create a transform from position, rotation, and scale.
    pub fn new(position: Vector3, rotation: Quaternion, scale: Vector3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Create a transform from position.
    pub fn from_position(position: Vector3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Build the transformation matrix `T * R * S`.
    ///
    /// Applied to a point this scales first, then rotates, then translates.
    pub fn transformation(&self) -> Matrix4x4 {
        Matrix4x4::from_position(&self.position)
            * Matrix4x4::from_quaternion(&self.rotation)
            * Matrix4x4::from_scale(&self.scale)
    }

    /// Move by `v` expressed in local space (rotated by the current rotation).
    pub fn translate_by(&mut self, v: &Vector3) -> &mut Self {
        self.position += v.rotate_by(&self.rotation);
        self
    }

    /// Move by `(x, y, z)` expressed in local space.
    #[inline]
    pub fn translate_by_xyz(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.translate_by(&Vector3::new(x, y, z))
    }

    /// Apply `delta` after the current rotation.
    pub fn rotate_by(&mut self, delta: &Quaternion) -> &mut Self {
        self.rotation = self.rotation.rotate_by(delta);
        self
    }

    /// Orient the transform so its forward (+Z) axis points at `target`.
    ///
    /// Uses [`Transform::WORLD_UP`] as the up hint. Looking straight along
    /// world up (or at the current position) has no defined orientation and
    /// produces a degenerate rotation.
    pub fn look_at(&mut self, target: &Vector3) -> &mut Self {
        let forward = (*target - self.position).normalized();
        let right_sq = Self::WORLD_UP.cross(&forward).mag_sq();
        if right_sq.is_nan() || right_sq <= consts::EPSILON {
            log::warn!(
                "look_at target {target} is along world up from {}; orientation is undefined",
                self.position
            );
        }

        let basis = Matrix4x4::from_axes(&forward, &Self::WORLD_UP);
        self.rotation = Quaternion::from_matrix(&basis);
        self
    }

    /// Orient the transform so its forward axis points at `(x, y, z)`.
    #[inline]
    pub fn look_at_xyz(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.look_at(&Vector3::new(x, y, z))
    }

    /// Local +Z axis in world space.
    #[inline]
    pub fn forward(&self) -> Vector3 {
        self.rotation.forward()
    }

    /// Local +X axis in world space.
    #[inline]
    pub fn right(&self) -> Vector3 {
        self.rotation.right()
    }

    /// Local +Y axis in world space.
    #[inline]
    pub fn up(&self) -> Vector3 {
        self.rotation.up()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_default_transform() {
        let t = Transform::default();
        assert_eq!(t.position, Vector3::ZERO);
        assert_eq!(t.rotation, Quaternion::IDENTITY);
        assert_eq!(t.scale, Vector3::ONE);
        assert_eq!(t.transformation(), Matrix4x4::IDENTITY);
    }

    #[test]
    fn test_translate_identity_rotation() {
        let mut t = Transform::default();
        t.translate_by_xyz(0.0, 0.0, 1.0);
        assert_eq!(t.position, Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_translate_is_local() {
        let mut t = Transform::default();
        t.rotate_by(&Quaternion::from_axis_angle(&Vector3::UNIT_Y, FRAC_PI_2))
            .translate_by(&Vector3::UNIT_Z);
        assert!(t.position.approx_eq(&Vector3::UNIT_X, 1e-6));
    }

    #[test]
    fn test_transformation_order() {
        let t = Transform::new(
            Vector3::new(10.0, 0.0, 0.0),
            Quaternion::from_axis_angle(&Vector3::UNIT_Z, FRAC_PI_2),
            Vector3::new(2.0, 1.0, 1.0),
        );
        // scale (1,0,0) -> (2,0,0), rotate -> (0,2,0), translate -> (10,2,0)
        let p = t.transformation() * Vector3::UNIT_X;
        assert!(p.approx_eq(&Vector3::new(10.0, 2.0, 0.0), 1e-5));
        assert!(t.transformation().get_position().approx_eq(&t.position, 1e-6));
    }

    #[test]
    fn test_rotate_by_accumulates() {
        let mut t = Transform::default();
        let step = Quaternion::from_axis_angle(&Vector3::UNIT_Y, 0.25);
        for _ in 0..4 {
            t.rotate_by(&step);
        }
        let expected = Quaternion::from_axis_angle(&Vector3::UNIT_Y, 1.0);
        assert!(t.rotation.approx_eq(&expected, 1e-5));
        assert!((t.rotation.magnitude() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_look_at() {
        let mut t = Transform::from_position(Vector3::new(1.0, 0.0, 1.0));
        t.look_at(&Vector3::new(4.0, 0.0, 5.0));
        assert!(t.forward().approx_eq(&Vector3::new(0.6, 0.0, 0.8), 1e-5));
        assert!(t.up().approx_eq(&Vector3::UNIT_Y, 1e-5));

        t.look_at_xyz(1.0, 0.0, -5.0);
        assert!(t.forward().approx_eq(&-Vector3::UNIT_Z, 1e-5));
        assert!(t.right().approx_eq(&-Vector3::UNIT_X, 1e-5));
    }

    #[test]
    fn test_serde_shape() {
        let t = Transform::from_position(Vector3::new(1.0, 2.0, 3.0));
        let json = serde_json::to_value(t).unwrap();
        assert_eq!(json["position"]["y"], 2.0);
        assert_eq!(json["rotation"]["w"], 1.0);
        let parsed: Transform = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, t);
    }
}
