//! 4x4 Matrix implementation.

use super::{Quaternion, Vector3};
use crate::error::{MathError, Result};
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut, Mul};

/// A 4x4 matrix stored in row-major order.
///
/// Vectors are columns multiplied on the right (`M * v`): translation lives
/// in column 3 and rotation/scale in the upper-left 3x3 block. Every affine
/// constructor leaves the bottom row at `(0, 0, 0, 1)`; only
/// [`Matrix4x4::perspective`] breaks that.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct Matrix4x4 {
    /// Matrix elements, `elements[row][col]`.
    pub elements: [[f32; 4]; 4],
}

impl Default for Matrix4x4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix4x4 {
    /// Identity matrix.
    pub const IDENTITY: Self = Self {
        elements: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Zero matrix.
    pub const ZERO: Self = Self {
        elements: [[0.0; 4]; 4],
    };

    /// Create from rows.
    #[inline]
    pub const fn from_rows(elements: [[f32; 4]; 4]) -> Self {
        Self { elements }
    }

    /// Convert to rows.
    #[inline]
    pub const fn to_rows(self) -> [[f32; 4]; 4] {
        self.elements
    }

    /// Create identity matrix.
    #[inline]
    pub fn identity() -> Self {
        Self::IDENTITY
    }

    /// Create a translation matrix.
    pub fn position(x: f32, y: f32, z: f32) -> Self {
        Self::from_rows([
            [1.0, 0.0, 0.0, x],
            [0.0, 1.0, 0.0, y],
            [0.0, 0.0, 1.0, z],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Create a translation matrix from a vector.
    #[inline]
    pub fn from_position(v: &Vector3) -> Self {
        Self::position(v.x, v.y, v.z)
    }

    /// Create a scale matrix.
    pub fn scale(x: f32, y: f32, z: f32) -> Self {
        Self::from_rows([
            [x, 0.0, 0.0, 0.0],
            [0.0, y, 0.0, 0.0],
            [0.0, 0.0, z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Create a scale matrix from a vector.
    #[inline]
    pub fn from_scale(v: &Vector3) -> Self {
        Self::scale(v.x, v.y, v.z)
    }

    /// Create a rotation matrix around the X axis.
    pub fn rotation_x(theta: f32) -> Self {
        let (s, c) = theta.sin_cos();
        Self::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, c, -s, 0.0],
            [0.0, s, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Create a rotation matrix around the Y axis.
    pub fn rotation_y(theta: f32) -> Self {
        let (s, c) = theta.sin_cos();
        Self::from_rows([
            [c, 0.0, s, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [-s, 0.0, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Create a rotation matrix around the Z axis.
    pub fn rotation_z(theta: f32) -> Self {
        let (s, c) = theta.sin_cos();
        Self::from_rows([
            [c, -s, 0.0, 0.0],
            [s, c, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Create a rotation matrix from Euler angles in radians.
    ///
    /// Composed as `Rz * (Ry * Rx)`: X is applied first, then Y, then Z.
    /// Note that [`Quaternion::from_euler_angles`] uses a different order.
    pub fn rotation(x: f32, y: f32, z: f32) -> Self {
        let rx = Self::rotation_x(x);
        let ry = Self::rotation_y(y);
        let rz = Self::rotation_z(z);
        rz * (ry * rx)
    }

    /// Create a rotation matrix from Euler angles packed in a vector.
    #[inline]
    pub fn from_euler_vector(angles: &Vector3) -> Self {
        Self::rotation(angles.x, angles.y, angles.z)
    }

    /// Create a rotation matrix from quaternion components.
    pub fn rotation_xyzw(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self::from_rows([
            [
                1.0 - 2.0 * (y * y + z * z),
                2.0 * (x * y - w * z),
                2.0 * (x * z + w * y),
                0.0,
            ],
            [
                2.0 * (x * y + w * z),
                1.0 - 2.0 * (x * x + z * z),
                2.0 * (y * z - w * x),
                0.0,
            ],
            [
                2.0 * (x * z - w * y),
                2.0 * (y * z + w * x),
                1.0 - 2.0 * (x * x + y * y),
                0.0,
            ],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Create a rotation matrix from a unit quaternion.
    #[inline]
    pub fn from_quaternion(q: &Quaternion) -> Self {
        Self::rotation_xyzw(q.x, q.y, q.z, q.w)
    }

    /// Create a rotation matrix around a unit axis (Rodrigues' formula).
    pub fn from_axis_angle(axis: &Vector3, angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        let Vector3 { x, y, z } = *axis;

        Self::from_rows([
            [c + x * x * t, x * y * t - z * s, x * z * t + y * s, 0.0],
            [y * x * t + z * s, c + y * y * t, y * z * t - x * s, 0.0],
            [z * x * t - y * s, z * y * t + x * s, c + z * z * t, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Create a rotation matrix from a vector whose direction is the axis and
    /// whose magnitude is the angle in radians.
    pub fn from_scaled_axis(v: &Vector3) -> Self {
        Self::from_axis_angle(&v.normalized(), v.magnitude())
    }

    /// Create a basis matrix from unit forward and up vectors.
    ///
    /// `right = up × forward`; the rows are right, up, forward. `forward`
    /// must not be parallel to `up`.
    pub fn from_axes(forward: &Vector3, up: &Vector3) -> Self {
        let right = up.cross(forward);
        Self::from_basis(forward, up, &right)
    }

    /// Create a basis matrix with rows right, up, forward.
    pub fn from_basis(forward: &Vector3, up: &Vector3, right: &Vector3) -> Self {
        Self::from_rows([
            [right.x, right.y, right.z, 0.0],
            [up.x, up.y, up.z, 0.0],
            [forward.x, forward.y, forward.z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Create a perspective projection matrix.
    ///
    /// The camera looks down +Z and `w` receives the view-space depth.
    /// After the divide, `z = z_near` maps to -1 and `z = z_far` to +1.
    pub fn perspective(fov: f32, aspect: f32, z_near: f32, z_far: f32) -> Self {
        let tan_half_fov = (fov / 2.0).tan();
        let z_range = z_near - z_far;

        Self::from_rows([
            [1.0 / (tan_half_fov * aspect), 0.0, 0.0, 0.0],
            [0.0, 1.0 / tan_half_fov, 0.0, 0.0],
            [0.0, 0.0, (-z_near - z_far) / z_range, 2.0 * z_far * z_near / z_range],
            [0.0, 0.0, 1.0, 0.0],
        ])
    }

    /// Determinant of the upper-left 3x3 block.
    ///
    /// Assumes the affine bottom row `(0, 0, 0, 1)`; not valid for
    /// general 4x4 matrices.
    pub fn determinant(&self) -> f32 {
        let m = &self.elements;

        -m[0][2] * m[1][1] * m[2][0] + m[0][1] * m[1][2] * m[2][0]
            + m[0][2] * m[1][0] * m[2][1]
            - m[0][0] * m[1][2] * m[2][1]
            - m[0][1] * m[1][0] * m[2][2]
            + m[0][0] * m[1][1] * m[2][2]
    }

    /// Inverse of an affine matrix.
    ///
    /// Inverts the 3x3 block by cofactors, derives the translation as
    /// `-R⁻¹·t` and copies the bottom row. A singular matrix yields `NaN`/`Inf`
    /// entries; see [`Matrix4x4::try_inverse`].
    pub fn inverse(&self) -> Self {
        let m = &self.elements;
        let k = 1.0 / self.determinant();

        let mut out = Self::ZERO;
        let o = &mut out.elements;

        o[0][0] = (m[1][1] * m[2][2] - m[2][1] * m[1][2]) * k;
        o[0][1] = (m[2][1] * m[0][2] - m[0][1] * m[2][2]) * k;
        o[0][2] = (m[0][1] * m[1][2] - m[1][1] * m[0][2]) * k;
        o[1][0] = (m[1][2] * m[2][0] - m[2][2] * m[1][0]) * k;
        o[1][1] = (m[2][2] * m[0][0] - m[0][2] * m[2][0]) * k;
        o[1][2] = (m[0][2] * m[1][0] - m[1][2] * m[0][0]) * k;
        o[2][0] = (m[1][0] * m[2][1] - m[2][0] * m[1][1]) * k;
        o[2][1] = (m[2][0] * m[0][1] - m[0][0] * m[2][1]) * k;
        o[2][2] = (m[0][0] * m[1][1] - m[1][0] * m[0][1]) * k;

        for row in 0..3 {
            o[row][3] = -(o[row][0] * m[0][3] + o[row][1] * m[1][3] + o[row][2] * m[2][3]);
        }

        o[3] = m[3];

        out
    }

    /// Inverse of an affine matrix, or an error when it is singular.
    pub fn try_inverse(&self) -> Result<Self> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            log::debug!("cannot invert matrix with determinant {det}");
            return Err(MathError::singular_matrix(det));
        }
        Ok(self.inverse())
    }

    /// Return the transpose of this matrix.
    pub fn transpose(&self) -> Self {
        let mut out = Self::ZERO;
        for y in 0..4 {
            for x in 0..4 {
                out.elements[y][x] = self.elements[x][y];
            }
        }
        out
    }

    /// Multiply this matrix by another (`self * other`).
    pub fn multiply(&self, other: &Matrix4x4) -> Self {
        let a = &self.elements;
        let b = &other.elements;

        let mut out = Self::ZERO;
        for y in 0..4 {
            for x in 0..4 {
                out.elements[y][x] =
                    a[y][0] * b[0][x] + a[y][1] * b[1][x] + a[y][2] * b[2][x] + a[y][3] * b[3][x];
            }
        }
        out
    }

    /// Transform a point by the upper 3x4 block (implicit `w = 1`).
    ///
    /// The bottom row is ignored, so projective matrices need
    /// [`Matrix4x4::project_point`] instead.
    pub fn transform_point(&self, v: &Vector3) -> Vector3 {
        let m = &self.elements;
        Vector3 {
            x: m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z + m[0][3],
            y: m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z + m[1][3],
            z: m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z + m[2][3],
        }
    }

    /// Transform a direction (no translation).
    pub fn transform_direction(&self, v: &Vector3) -> Vector3 {
        let m = &self.elements;
        Vector3 {
            x: m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
            y: m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
            z: m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
        }
    }

    /// Transform a point as homogeneous `(v, 1)` and divide by the resulting `w`.
    pub fn project_point(&self, v: &Vector3) -> Vector3 {
        let m = &self.elements;
        let w = m[3][0] * v.x + m[3][1] * v.y + m[3][2] * v.z + m[3][3];
        self.transform_point(v) / w
    }

    /// Extract the translation column.
    #[inline]
    pub fn get_position(&self) -> Vector3 {
        Vector3::new(self.elements[0][3], self.elements[1][3], self.elements[2][3])
    }

    /// Get an element, checking bounds.
    pub fn get(&self, row: usize, col: usize) -> Result<f32> {
        self.elements
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .ok_or_else(|| MathError::index_out_of_range(row.max(col), 4))
    }

    /// Set an element, checking bounds.
    pub fn set(&mut self, row: usize, col: usize, value: f32) -> Result<()> {
        let slot = self
            .elements
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or_else(|| MathError::index_out_of_range(row.max(col), 4))?;
        *slot = value;
        Ok(())
    }

    /// Get a row, checking bounds.
    pub fn row(&self, row: usize) -> Result<[f32; 4]> {
        self.elements
            .get(row)
            .copied()
            .ok_or_else(|| MathError::index_out_of_range(row, 4))
    }

    /// Check if approximately equal to another matrix.
    pub fn approx_eq(&self, other: &Matrix4x4, epsilon: f32) -> bool {
        self.elements
            .iter()
            .flatten()
            .zip(other.elements.iter().flatten())
            .all(|(a, b)| (a - b).abs() < epsilon)
    }
}

impl Mul for Matrix4x4 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        self.multiply(&rhs)
    }
}

impl Mul<Vector3> for Matrix4x4 {
    type Output = Vector3;
    fn mul(self, rhs: Vector3) -> Vector3 {
        self.transform_point(&rhs)
    }
}

/// Element access by `(row, col)`; panics when either index is above 3.
impl Index<(usize, usize)> for Matrix4x4 {
    type Output = f32;
    fn index(&self, (row, col): (usize, usize)) -> &f32 {
        &self.elements[row][col]
    }
}

impl IndexMut<(usize, usize)> for Matrix4x4 {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f32 {
        &mut self.elements[row][col]
    }
}

impl fmt::Display for Matrix4x4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, r) in self.elements.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{:.2} {:.2} {:.2} {:.2}", r[0], r[1], r[2], r[3])?;
        }
        Ok(())
    }
}

impl From<glam::Mat4> for Matrix4x4 {
    fn from(m: glam::Mat4) -> Self {
        // glam stores columns; the columns of the transpose are our rows.
        Self::from_rows(m.transpose().to_cols_array_2d())
    }
}

impl From<Matrix4x4> for glam::Mat4 {
    fn from(m: Matrix4x4) -> Self {
        glam::Mat4::from_cols_array_2d(&m.elements).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn sample_affine() -> Matrix4x4 {
        let q = Quaternion::from_axis_angle(&Vector3::new(1.0, -2.0, 0.5).normalized(), 0.9);
        Matrix4x4::position(1.0, 2.0, 3.0)
            * Matrix4x4::from_quaternion(&q)
            * Matrix4x4::scale(2.0, 3.0, 0.5)
    }

    #[test]
    fn test_identity() {
        let m = Matrix4x4::IDENTITY;
        let v = Vector3::new(1.0, 2.0, 3.0);
        assert_eq!(m * v, v);
        assert_eq!(Matrix4x4::default(), Matrix4x4::identity());
    }

    #[test]
    fn test_translation() {
        let m = Matrix4x4::position(1.0, 2.0, 3.0);
        assert_eq!(m * Vector3::ZERO, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(m.get_position(), Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(m.transform_direction(&Vector3::UNIT_X), Vector3::UNIT_X);
    }

    #[test]
    fn test_multiply_matches_glam() {
        let a = sample_affine();
        let b = Matrix4x4::rotation(0.3, -0.2, 1.1) * Matrix4x4::position(-4.0, 0.5, 2.0);
        let expected: Matrix4x4 = (glam::Mat4::from(a) * glam::Mat4::from(b)).into();
        assert!((a * b).approx_eq(&expected, 1e-5));
    }

    #[test]
    fn test_quaternion_matrix_matches_glam() {
        let q = Quaternion::from_axis_angle(&Vector3::new(0.0, 3.0, 4.0).normalized(), 1.2);
        let expected: Matrix4x4 = glam::Mat4::from_quat(q.into()).into();
        assert!(Matrix4x4::from_quaternion(&q).approx_eq(&expected, 1e-6));
    }

    #[test]
    fn test_euler_composition_order() {
        let (x, y, z) = (0.3, -0.7, 1.9);
        let expected: Matrix4x4 = (glam::Mat4::from_rotation_z(z)
            * glam::Mat4::from_rotation_y(y)
            * glam::Mat4::from_rotation_x(x))
        .into();
        assert!(Matrix4x4::rotation(x, y, z).approx_eq(&expected, 1e-6));
        assert_eq!(
            Matrix4x4::from_euler_vector(&Vector3::new(x, y, z)),
            Matrix4x4::rotation(x, y, z)
        );
    }

    #[test]
    fn test_axis_angle_matches_quaternion() {
        let axis = Vector3::new(2.0, -1.0, 2.0).normalized();
        let m = Matrix4x4::from_axis_angle(&axis, 0.8);
        let q = Matrix4x4::from_quaternion(&Quaternion::from_axis_angle(&axis, 0.8));
        assert!(m.approx_eq(&q, 1e-6));
        assert!(Matrix4x4::from_scaled_axis(&(axis * 0.8)).approx_eq(&m, 1e-6));
    }

    #[test]
    fn test_from_axes_rows() {
        let m = Matrix4x4::from_axes(&Vector3::UNIT_Z, &Vector3::UNIT_Y);
        assert_eq!(m, Matrix4x4::IDENTITY);

        let m = Matrix4x4::from_axes(&Vector3::UNIT_X, &Vector3::UNIT_Y);
        assert_eq!(m.row(0), Ok([0.0, 0.0, -1.0, 0.0]));
        assert_eq!(m.row(2), Ok([1.0, 0.0, 0.0, 0.0]));
    }

    #[test]
    fn test_determinant() {
        assert_eq!(Matrix4x4::scale(2.0, 3.0, 4.0).determinant(), 24.0);
        assert!((Matrix4x4::rotation(0.4, 1.0, -2.0).determinant() - 1.0).abs() < 1e-5);
        // translation does not participate
        assert_eq!(Matrix4x4::position(5.0, 6.0, 7.0).determinant(), 1.0);
    }

    #[test]
    fn test_inverse() {
        let m = sample_affine();
        assert!((m.inverse() * m).approx_eq(&Matrix4x4::IDENTITY, 1e-5));
        assert!((m * m.inverse()).approx_eq(&Matrix4x4::IDENTITY, 1e-5));

        let expected: Matrix4x4 = glam::Mat4::from(m).inverse().into();
        assert!(m.inverse().approx_eq(&expected, 1e-5));
    }

    #[test]
    fn test_inverse_singular() {
        let m = Matrix4x4::scale(0.0, 1.0, 1.0);
        assert_eq!(m.try_inverse(), Err(MathError::singular_matrix(0.0)));
        assert!(m.inverse().elements[0][0].is_infinite() || m.inverse().elements[0][0].is_nan());
        assert!(Matrix4x4::position(1.0, 2.0, 3.0).try_inverse().is_ok());
    }

    #[test]
    fn test_transpose() {
        let m = sample_affine();
        assert_eq!(m.transpose().transpose(), m);
        assert_eq!(m.transpose()[(3, 0)], m[(0, 3)]);
    }

    #[test]
    fn test_perspective_depth_range() {
        let p = Matrix4x4::perspective(FRAC_PI_2, 1.0, 0.1, 100.0);
        let near = p.project_point(&Vector3::new(0.0, 0.0, 0.1));
        let far = p.project_point(&Vector3::new(0.0, 0.0, 100.0));
        assert!((near.z + 1.0).abs() < 1e-5);
        assert!((far.z - 1.0).abs() < 1e-5);

        let edge = p.project_point(&Vector3::new(1.0, 1.0, 1.0));
        assert!(edge.approx_eq(&Vector3::new(1.0, 1.0, edge.z), 1e-6));
        assert_eq!(p[(3, 3)], 0.0);
        assert_eq!(p[(3, 2)], 1.0);
    }

    #[test]
    fn test_checked_access() {
        let mut m = Matrix4x4::ZERO;
        assert_eq!(m.set(2, 3, 7.0), Ok(()));
        assert_eq!(m.get(2, 3), Ok(7.0));
        m[(1, 1)] = 4.0;
        assert_eq!(m.get(1, 1), Ok(4.0));
        assert_eq!(m.get(4, 0), Err(MathError::index_out_of_range(4, 4)));
        assert!(m.set(0, 9, 1.0).is_err());
        assert!(m.row(4).is_err());
    }

    #[test]
    #[should_panic]
    fn test_index_out_of_range_panics() {
        let m = Matrix4x4::IDENTITY;
        let _ = m[(0, 4)];
    }

    #[test]
    fn test_display() {
        let text = Matrix4x4::position(1.0, 2.0, 3.0).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "1.00 0.00 0.00 1.00");
        assert_eq!(lines[3], "0.00 0.00 0.00 1.00");
    }
}
