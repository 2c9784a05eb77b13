//! Quaternion implementation for rotations.

use super::{Matrix4x4, Vector3};
use crate::error::{MathError, Result};
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Index, IndexMut, Mul, MulAssign, Neg, Sub};

/// A quaternion representing a rotation.
///
/// Rotations are encoded as `(sin(θ/2)·axis, cos(θ/2))` and must be unit
/// length before they are used to rotate anything. Blends such as
/// [`Quaternion::nlerp`] renormalize for you; raw arithmetic does not.
///
/// Equality is exact component comparison. Use [`Quaternion::approx_eq`]
/// for tolerance-based checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct Quaternion {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
    /// Z component.
    pub z: f32,
    /// W component (scalar).
    pub w: f32,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    /// Identity quaternion (no rotation).
    pub const IDENTITY: Self = Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    /// Near-parallel threshold for [`Quaternion::slerp`].
    ///
    /// `slerp` falls back to `nlerp` once `|dot| >= 1 - SLERP_EPSILON`. The
    /// value is kept at `1e3`, which makes that test always pass, so `slerp`
    /// currently behaves exactly like `nlerp`. Call
    /// [`Quaternion::slerp_with_epsilon`] with e.g. `1e-3` for a true
    /// great-circle blend.
    pub const SLERP_EPSILON: f32 = 1e3;

    /// Create a new quaternion.
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Create from an array [x, y, z, w].
    #[inline]
    pub const fn from_array(a: [f32; 4]) -> Self {
        Self { x: a[0], y: a[1], z: a[2], w: a[3] }
    }

    /// Convert to an array [x, y, z, w].
    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }

    /// Create a quaternion from a unit axis and an angle in radians.
    pub fn from_axis_angle(axis: &Vector3, angle: f32) -> Self {
        let half_angle = angle / 2.0;
        let s = half_angle.sin();
        Self {
            x: axis.x * s,
            y: axis.y * s,
            z: axis.z * s,
            w: half_angle.cos(),
        }
    }

    /// Create a quaternion from a vector whose direction is the rotation axis
    /// and whose magnitude is the angle in radians.
    ///
    /// The zero vector has no direction and produces `NaN` components.
    pub fn from_scaled_axis(v: &Vector3) -> Self {
        Self::from_axis_angle(&v.normalized(), v.magnitude())
    }

    /// Create a quaternion from Euler angles in radians.
    ///
    /// The rotation about X is applied first, then Z, then Y
    /// (`Qy * Qz * Qx`). This differs from [`Matrix4x4::rotation`], which
    /// applies X, then Y, then Z; the two only agree when at most one
    /// angle is non-zero.
    pub fn from_euler_angles(x: f32, y: f32, z: f32) -> Self {
        let s1 = (x / 2.0).sin();
        let c1 = (x / 2.0).cos();
        let s2 = (z / 2.0).sin();
        let c2 = (z / 2.0).cos();
        let s3 = (y / 2.0).sin();
        let c3 = (y / 2.0).cos();

        let s1s2 = s1 * s2;
        let c1c2 = c1 * c2;

        Self {
            x: s1 * c2 * c3 + c1 * s2 * s3,
            y: c1c2 * s3 + s1s2 * c3,
            z: c1 * s2 * c3 - s1 * c2 * s3,
            w: c1c2 * c3 - s1s2 * s3,
        }
    }

    /// Create a quaternion from Euler angles packed in a vector.
    #[inline]
    pub fn from_euler_vector(angles: &Vector3) -> Self {
        Self::from_euler_angles(angles.x, angles.y, angles.z)
    }

    /// Extract a unit quaternion from the rotation block of a matrix.
    ///
    /// The rows of the upper-left 3x3 block are read as the rotated basis
    /// (right, up, forward), which is the layout [`Matrix4x4::from_axes`]
    /// produces. A matrix built by [`Matrix4x4::from_quaternion`] stores the
    /// basis in its columns instead, so for it this returns the conjugate.
    pub fn from_matrix(m: &Matrix4x4) -> Self {
        let e = &m.elements;
        let trace = e[0][0] + e[1][1] + e[2][2];

        let (x, y, z, w) = if trace > 0.0 {
            let s = 0.5 / (trace + 1.0).sqrt();
            (
                (e[1][2] - e[2][1]) * s,
                (e[2][0] - e[0][2]) * s,
                (e[0][1] - e[1][0]) * s,
                0.25 / s,
            )
        } else if e[0][0] > e[1][1] && e[0][0] > e[2][2] {
            let s = 2.0 * (1.0 + e[0][0] - e[1][1] - e[2][2]).sqrt();
            (
                0.25 * s,
                (e[1][0] + e[0][1]) / s,
                (e[2][0] + e[0][2]) / s,
                (e[1][2] - e[2][1]) / s,
            )
        } else if e[1][1] > e[2][2] {
            let s = 2.0 * (1.0 + e[1][1] - e[0][0] - e[2][2]).sqrt();
            (
                (e[1][0] + e[0][1]) / s,
                0.25 * s,
                (e[2][1] + e[1][2]) / s,
                (e[2][0] - e[0][2]) / s,
            )
        } else {
            let s = 2.0 * (1.0 + e[2][2] - e[0][0] - e[1][1]).sqrt();
            (
                (e[2][0] + e[0][2]) / s,
                (e[1][2] + e[2][1]) / s,
                0.25 * s,
                (e[0][1] - e[1][0]) / s,
            )
        };

        let q = Self::new(x, y, z, w);
        if q.mag_sq() != 0.0 {
            q.normalized()
        } else {
            log::debug!("from_matrix produced a zero quaternion; leaving it unnormalized");
            q
        }
    }

    /// Get the magnitude (length) of the quaternion.
    #[inline]
    pub fn magnitude(&self) -> f32 {
        self.mag_sq().sqrt()
    }

    /// Get the squared magnitude.
    #[inline]
    pub fn mag_sq(&self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w
    }

    /// Return a unit-length copy.
    ///
    /// The zero quaternion yields `NaN` components.
    #[inline]
    pub fn normalized(&self) -> Self {
        let mag = self.magnitude();
        Self::new(self.x / mag, self.y / mag, self.z / mag, self.w / mag)
    }

    /// Return a unit-length copy, or an error for zero or non-finite input.
    pub fn try_normalized(&self) -> Result<Self> {
        let mag_sq = self.mag_sq();
        if mag_sq > 0.0 && mag_sq.is_finite() {
            Ok(self.normalized())
        } else {
            log::debug!("refusing to normalize degenerate quaternion {}", self);
            Err(MathError::degenerate_input("cannot normalize a zero quaternion"))
        }
    }

    /// Conjugate (inverse for unit quaternions).
    #[inline]
    pub fn conjugate(&self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
            w: self.w,
        }
    }

    /// Dot product.
    #[inline]
    pub fn dot(&self, other: &Quaternion) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Normalized linear interpolation.
    ///
    /// With `shortest`, `to` is negated when it lies in the opposite
    /// hemisphere so the blend takes the short arc.
    pub fn nlerp(&self, to: &Quaternion, t: f32, shortest: bool) -> Self {
        let to = if shortest && self.dot(to) < 0.0 { -*to } else { *to };
        (*self + (to - *self) * t).normalized()
    }

    /// Spherical linear interpolation using [`Quaternion::SLERP_EPSILON`].
    #[inline]
    pub fn slerp(&self, to: &Quaternion, t: f32, shortest: bool) -> Self {
        self.slerp_with_epsilon(to, t, shortest, Self::SLERP_EPSILON)
    }

    /// Spherical linear interpolation with an explicit near-parallel threshold.
    ///
    /// When `|dot| >= 1 - epsilon` the endpoints are too close for
    /// `1 / sin(angle)` to be stable and the result is an `nlerp` instead.
    pub fn slerp_with_epsilon(&self, to: &Quaternion, t: f32, shortest: bool, epsilon: f32) -> Self {
        let mut cs = self.dot(to);
        let mut to = *to;

        if shortest && cs < 0.0 {
            cs = -cs;
            to = -to;
        }

        if cs.abs() >= 1.0 - epsilon {
            return self.nlerp(&to, t, false);
        }

        let sn = (1.0 - cs * cs).sqrt();
        let angle = sn.atan2(cs);
        let inv_sin = 1.0 / sn;

        let src_factor = ((1.0 - t) * angle).sin() * inv_sin;
        let dest_factor = (t * angle).sin() * inv_sin;

        *self * src_factor + to * dest_factor
    }

    /// Apply `by` after this rotation and renormalize (`normalize(by * self)`).
    #[inline]
    pub fn rotate_by(&self, by: &Quaternion) -> Self {
        (*by * *self).normalized()
    }

    /// Local +Z axis after rotation.
    #[inline]
    pub fn forward(&self) -> Vector3 {
        Vector3::UNIT_Z.rotate_by(self)
    }

    /// Local -Z axis after rotation.
    #[inline]
    pub fn back(&self) -> Vector3 {
        (-Vector3::UNIT_Z).rotate_by(self)
    }

    /// Local -X axis after rotation.
    #[inline]
    pub fn left(&self) -> Vector3 {
        (-Vector3::UNIT_X).rotate_by(self)
    }

    /// Local +X axis after rotation.
    #[inline]
    pub fn right(&self) -> Vector3 {
        Vector3::UNIT_X.rotate_by(self)
    }

    /// Local +Y axis after rotation.
    #[inline]
    pub fn up(&self) -> Vector3 {
        Vector3::UNIT_Y.rotate_by(self)
    }

    /// Local -Y axis after rotation.
    #[inline]
    pub fn down(&self) -> Vector3 {
        (-Vector3::UNIT_Y).rotate_by(self)
    }

    /// Get a component by index (0 = x, 1 = y, 2 = z, 3 = w).
    pub fn component(&self, index: usize) -> Result<f32> {
        match index {
            0 => Ok(self.x),
            1 => Ok(self.y),
            2 => Ok(self.z),
            3 => Ok(self.w),
            _ => Err(MathError::index_out_of_range(index, 4)),
        }
    }

    /// Check if approximately equal.
    #[inline]
    pub fn approx_eq(&self, other: &Quaternion, epsilon: f32) -> bool {
        (self.x - other.x).abs() < epsilon
            && (self.y - other.y).abs() < epsilon
            && (self.z - other.z).abs() < epsilon
            && (self.w - other.w).abs() < epsilon
    }
}

impl Add for Quaternion {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z, self.w + rhs.w)
    }
}

impl Sub for Quaternion {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z, self.w - rhs.w)
    }
}

impl Neg for Quaternion {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, -self.w)
    }
}

/// Hamilton product.
impl Mul for Quaternion {
    type Output = Self;
    fn mul(self, q: Self) -> Self {
        Self {
            x: self.x * q.w + self.w * q.x + self.y * q.z - self.z * q.y,
            y: self.y * q.w + self.w * q.y + self.z * q.x - self.x * q.z,
            z: self.z * q.w + self.w * q.z + self.x * q.y - self.y * q.x,
            w: self.w * q.w - self.x * q.x - self.y * q.y - self.z * q.z,
        }
    }
}

impl MulAssign for Quaternion {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

/// Product with the pure quaternion `(v, 0)`.
///
/// This is one half of the rotation sandwich, not a rotation; see
/// [`Vector3::rotate_by`].
impl Mul<Vector3> for Quaternion {
    type Output = Quaternion;
    fn mul(self, v: Vector3) -> Quaternion {
        Quaternion {
            x: self.w * v.x + self.y * v.z - self.z * v.y,
            y: self.w * v.y + self.z * v.x - self.x * v.z,
            z: self.w * v.z + self.x * v.y - self.y * v.x,
            w: -self.x * v.x - self.y * v.y - self.z * v.z,
        }
    }
}

impl Mul<f32> for Quaternion {
    type Output = Self;
    #[inline]
    fn mul(self, n: f32) -> Self {
        Self::new(self.x * n, self.y * n, self.z * n, self.w * n)
    }
}

impl Index<usize> for Quaternion {
    type Output = f32;
    fn index(&self, index: usize) -> &f32 {
        match index {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            3 => &self.w,
            _ => panic!("Quaternion index {index} out of range (0..4)"),
        }
    }
}

impl IndexMut<usize> for Quaternion {
    fn index_mut(&mut self, index: usize) -> &mut f32 {
        match index {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            3 => &mut self.w,
            _ => panic!("Quaternion index {index} out of range (0..4)"),
        }
    }
}

impl fmt::Display for Quaternion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.2}, {:.2}, {:.2}, {:.2})",
            self.x, self.y, self.z, self.w
        )
    }
}

impl From<glam::Quat> for Quaternion {
    fn from(q: glam::Quat) -> Self {
        Self {
            x: q.x,
            y: q.y,
            z: q.z,
            w: q.w,
        }
    }
}

impl From<Quaternion> for glam::Quat {
    fn from(q: Quaternion) -> Self {
        glam::Quat::from_xyzw(q.x, q.y, q.z, q.w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn same_rotation(a: &Quaternion, b: &Quaternion) -> bool {
        a.dot(b).abs() > 1.0 - 1e-5
    }

    #[test]
    fn test_identity() {
        let v = Vector3::new(1.0, 2.0, 3.0);
        let result = v.rotate_by(&Quaternion::IDENTITY);
        assert!(result.approx_eq(&v, 1e-6));
        assert_eq!(Quaternion::default(), Quaternion::IDENTITY);
    }

    #[test]
    fn test_axis_angle_handedness() {
        let q = Quaternion::from_axis_angle(&Vector3::UNIT_Y, FRAC_PI_2);
        let result = Vector3::UNIT_X.rotate_by(&q);
        assert!(result.approx_eq(&Vector3::new(0.0, 0.0, -1.0), 1e-6));

        let q = Quaternion::from_axis_angle(&Vector3::UNIT_Y, PI);
        assert!(Vector3::UNIT_X.rotate_by(&q).approx_eq(&-Vector3::UNIT_X, 1e-5));
    }

    #[test]
    fn test_scaled_axis() {
        let a = Quaternion::from_scaled_axis(&Vector3::new(0.0, 0.0, 2.0 * FRAC_PI_2));
        let b = Quaternion::from_axis_angle(&Vector3::UNIT_Z, PI);
        assert!(a.approx_eq(&b, 1e-6));
    }

    #[test]
    fn test_hamilton_product_matches_glam() {
        let a = Quaternion::from_axis_angle(&Vector3::new(1.0, 2.0, 2.0).normalized(), 0.7);
        let b = Quaternion::from_axis_angle(&Vector3::new(-3.0, 0.0, 4.0).normalized(), -1.3);
        let expected: Quaternion = (glam::Quat::from(a) * glam::Quat::from(b)).into();
        assert!((a * b).approx_eq(&expected, 1e-6));
    }

    #[test]
    fn test_vector_product_is_half_sandwich() {
        let q = Quaternion::new(0.1, 0.2, 0.3, 0.9);
        let v = Vector3::new(1.0, -2.0, 0.5);
        let pure = Quaternion::new(v.x, v.y, v.z, 0.0);
        assert!((q * v).approx_eq(&(q * pure), 1e-6));
    }

    #[test]
    fn test_conjugate() {
        let q = Quaternion::new(0.5, -0.25, 0.125, 0.8);
        assert_eq!(q.conjugate(), Quaternion::new(-0.5, 0.25, -0.125, 0.8));
        assert_eq!(q.conjugate().conjugate(), q);
    }

    #[test]
    fn test_normalize() {
        let q = Quaternion::new(1.0, 2.0, 3.0, 4.0).normalized();
        assert!((q.magnitude() - 1.0).abs() < 1e-6);
        assert!(Quaternion::new(0.0, 0.0, 0.0, 0.0).try_normalized().is_err());
    }

    #[test]
    fn test_rotate_by_applies_after() {
        let yaw = Quaternion::from_axis_angle(&Vector3::UNIT_Y, FRAC_PI_2);
        let roll = Quaternion::from_axis_angle(&Vector3::UNIT_Z, FRAC_PI_2);
        // X --roll--> Y --yaw--> Y
        let q = roll.rotate_by(&yaw);
        assert!(Vector3::UNIT_X.rotate_by(&q).approx_eq(&Vector3::UNIT_Y, 1e-6));
        // X --yaw--> -Z --roll--> -Z
        let q = yaw.rotate_by(&roll);
        assert!(Vector3::UNIT_X.rotate_by(&q).approx_eq(&-Vector3::UNIT_Z, 1e-6));
    }

    #[test]
    fn test_directions() {
        let q = Quaternion::from_axis_angle(&Vector3::UNIT_Y, FRAC_PI_2);
        assert!(q.forward().approx_eq(&Vector3::UNIT_X, 1e-6));
        assert!(q.back().approx_eq(&-Vector3::UNIT_X, 1e-6));
        assert!(q.right().approx_eq(&-Vector3::UNIT_Z, 1e-6));
        assert!(q.left().approx_eq(&Vector3::UNIT_Z, 1e-6));
        assert!(q.up().approx_eq(&Vector3::UNIT_Y, 1e-6));
        assert!(q.down().approx_eq(&-Vector3::UNIT_Y, 1e-6));
    }

    #[test]
    fn test_from_matrix_all_branches() {
        // trace > 0, then each dominant-diagonal branch (180 degree turns)
        let cases = [
            Quaternion::from_axis_angle(&Vector3::new(1.0, 1.0, 0.0).normalized(), 0.5),
            Quaternion::from_axis_angle(&Vector3::UNIT_X, PI),
            Quaternion::from_axis_angle(&Vector3::UNIT_Y, PI),
            Quaternion::from_axis_angle(&Vector3::UNIT_Z, PI),
        ];
        for q in cases {
            let m = Matrix4x4::from_quaternion(&q);
            let extracted = Quaternion::from_matrix(&m);
            assert!((extracted.magnitude() - 1.0).abs() < 1e-6);
            assert!(same_rotation(&extracted, &q.conjugate()), "{q} -> {extracted}");
        }
    }

    #[test]
    fn test_from_matrix_of_axes_faces_forward() {
        let forward = Vector3::new(1.0, 0.0, 1.0).normalized();
        let q = Quaternion::from_matrix(&Matrix4x4::from_axes(&forward, &Vector3::UNIT_Y));
        assert!(q.forward().approx_eq(&forward, 1e-6));
        assert!(q.up().approx_eq(&Vector3::UNIT_Y, 1e-6));
    }

    #[test]
    fn test_euler_single_axis_matches_axis_angle() {
        let x = Quaternion::from_euler_angles(0.3, 0.0, 0.0);
        let y = Quaternion::from_euler_angles(0.0, 0.3, 0.0);
        let z = Quaternion::from_euler_angles(0.0, 0.0, 0.3);
        assert!(x.approx_eq(&Quaternion::from_axis_angle(&Vector3::UNIT_X, 0.3), 1e-6));
        assert!(y.approx_eq(&Quaternion::from_axis_angle(&Vector3::UNIT_Y, 0.3), 1e-6));
        assert!(z.approx_eq(&Quaternion::from_axis_angle(&Vector3::UNIT_Z, 0.3), 1e-6));
    }

    #[test]
    fn test_euler_applies_x_then_z_then_y() {
        let (ax, ay, az) = (0.4, -0.9, 1.1);
        let qx = Quaternion::from_axis_angle(&Vector3::UNIT_X, ax);
        let qy = Quaternion::from_axis_angle(&Vector3::UNIT_Y, ay);
        let qz = Quaternion::from_axis_angle(&Vector3::UNIT_Z, az);
        let expected = qy * qz * qx;
        let q = Quaternion::from_euler_vector(&Vector3::new(ax, ay, az));
        assert!(q.approx_eq(&expected, 1e-6));
    }

    #[test]
    fn test_nlerp_shortest() {
        let a = Quaternion::IDENTITY;
        let b = -Quaternion::from_axis_angle(&Vector3::UNIT_Z, 0.5);
        let mid = a.nlerp(&b, 0.5, true);
        let expected = Quaternion::from_axis_angle(&Vector3::UNIT_Z, 0.25);
        assert!(mid.approx_eq(&expected, 1e-6));

        let long = a.nlerp(&b, 0.5, false);
        assert!(!same_rotation(&long, &mid));
    }

    #[test]
    fn test_slerp_preserved_epsilon_falls_back_to_nlerp() {
        let a = Quaternion::from_axis_angle(&Vector3::UNIT_Y, 0.2);
        let b = Quaternion::from_axis_angle(&Vector3::UNIT_Y, 2.4);
        for t in [0.0, 0.3, 0.5, 0.9, 1.0] {
            assert_eq!(a.slerp(&b, t, true), a.nlerp(&b, t, false));
        }
    }

    #[test]
    fn test_slerp_great_circle() {
        let a = Quaternion::from_axis_angle(&Vector3::UNIT_Y, 0.2);
        let b = Quaternion::from_axis_angle(&Vector3::UNIT_Y, 2.4);
        let q = a.slerp_with_epsilon(&b, 0.25, true, 1e-3);
        let expected = Quaternion::from_axis_angle(&Vector3::UNIT_Y, 0.75);
        assert!(q.approx_eq(&expected, 1e-5));

        let oracle: Quaternion = glam::Quat::from(a).slerp(glam::Quat::from(b), 0.25).into();
        assert!(q.approx_eq(&oracle, 1e-5));
    }

    #[test]
    fn test_slerp_shortest_negates_target() {
        let a = Quaternion::IDENTITY;
        let b = -Quaternion::from_axis_angle(&Vector3::UNIT_X, 1.0);
        let q = a.slerp_with_epsilon(&b, 0.5, true, 1e-3);
        assert!(q.approx_eq(&Quaternion::from_axis_angle(&Vector3::UNIT_X, 0.5), 1e-5));
    }

    #[test]
    fn test_index() {
        let mut q = Quaternion::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(q[3], 4.0);
        q[0] = 9.0;
        assert_eq!(q.component(0), Ok(9.0));
        assert_eq!(q.component(5), Err(MathError::index_out_of_range(5, 4)));
    }

    #[test]
    #[should_panic]
    fn test_index_out_of_range_panics() {
        let q = Quaternion::IDENTITY;
        let _ = q[4];
    }

    #[test]
    fn test_display() {
        assert_eq!(Quaternion::IDENTITY.to_string(), "(0.00, 0.00, 0.00, 1.00)");
    }
}
