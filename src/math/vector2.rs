//! 2D Vector implementation.

use crate::error::{MathError, Result};
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{
    Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign,
};

/// A 2D vector with x and y components.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct Vector2 {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
}

impl Vector2 {
    /// Zero vector (0, 0).
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
    /// One vector (1, 1).
    pub const ONE: Self = Self { x: 1.0, y: 1.0 };
    /// Unit X vector (1, 0).
    pub const UNIT_X: Self = Self { x: 1.0, y: 0.0 };
    /// Unit Y vector (0, 1).
    pub const UNIT_Y: Self = Self { x: 0.0, y: 1.0 };

    /// Create a new Vector2.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Create a vector with all components set to the same value.
    #[inline]
    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v }
    }

    /// Create from an array.
    #[inline]
    pub const fn from_array(a: [f32; 2]) -> Self {
        Self { x: a[0], y: a[1] }
    }

    /// Convert to an array.
    #[inline]
    pub const fn to_array(self) -> [f32; 2] {
        [self.x, self.y]
    }

    /// Get the magnitude (length) of the vector.
    #[inline]
    pub fn magnitude(&self) -> f32 {
        self.mag_sq().sqrt()
    }

    /// Get the squared magnitude of the vector.
    #[inline]
    pub fn mag_sq(&self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    /// Return a unit-length copy of the vector.
    ///
    /// A zero vector yields `NaN` components; use [`Vector2::try_normalized`]
    /// when the input may be degenerate.
    #[inline]
    pub fn normalized(&self) -> Self {
        *self / self.magnitude()
    }

    /// Return a unit-length copy, or an error for zero or non-finite input.
    pub fn try_normalized(&self) -> Result<Self> {
        let mag_sq = self.mag_sq();
        if mag_sq > 0.0 && mag_sq.is_finite() {
            Ok(self.normalized())
        } else {
            log::debug!("refusing to normalize degenerate Vector2 {}", self);
            Err(MathError::degenerate_input("cannot normalize a zero-length Vector2"))
        }
    }

    /// Dot product with another vector.
    #[inline]
    pub fn dot(&self, other: &Vector2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Linear interpolation to another vector.
    #[inline]
    pub fn lerp(&self, other: &Vector2, t: f32) -> Self {
        *self + (*other - *self) * t
    }

    /// Get a component by index (0 = x, 1 = y).
    pub fn component(&self, index: usize) -> Result<f32> {
        match index {
            0 => Ok(self.x),
            1 => Ok(self.y),
            _ => Err(MathError::index_out_of_range(index, 2)),
        }
    }

    /// Check if the vector is approximately equal to another.
    #[inline]
    pub fn approx_eq(&self, other: &Vector2, epsilon: f32) -> bool {
        (self.x - other.x).abs() < epsilon && (self.y - other.y).abs() < epsilon
    }
}

impl Add for Vector2 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Add<f32> for Vector2 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: f32) -> Self {
        Self::new(self.x + rhs, self.y + rhs)
    }
}

impl AddAssign for Vector2 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl AddAssign<f32> for Vector2 {
    #[inline]
    fn add_assign(&mut self, rhs: f32) {
        self.x += rhs;
        self.y += rhs;
    }
}

impl Sub for Vector2 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Sub<f32> for Vector2 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: f32) -> Self {
        Self::new(self.x - rhs, self.y - rhs)
    }
}

impl SubAssign for Vector2 {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl SubAssign<f32> for Vector2 {
    #[inline]
    fn sub_assign(&mut self, rhs: f32) {
        self.x -= rhs;
        self.y -= rhs;
    }
}

impl Mul for Vector2 {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y)
    }
}

impl Mul<f32> for Vector2 {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Mul<Vector2> for f32 {
    type Output = Vector2;
    #[inline]
    fn mul(self, rhs: Vector2) -> Vector2 {
        rhs * self
    }
}

impl MulAssign for Vector2 {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        self.x *= rhs.x;
        self.y *= rhs.y;
    }
}

impl MulAssign<f32> for Vector2 {
    #[inline]
    fn mul_assign(&mut self, rhs: f32) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

impl Div for Vector2 {
    type Output = Self;
    #[inline]
    fn div(self, rhs: Self) -> Self {
        Self::new(self.x / rhs.x, self.y / rhs.y)
    }
}

impl Div<f32> for Vector2 {
    type Output = Self;
    #[inline]
    fn div(self, rhs: f32) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl DivAssign for Vector2 {
    #[inline]
    fn div_assign(&mut self, rhs: Self) {
        self.x /= rhs.x;
        self.y /= rhs.y;
    }
}

impl DivAssign<f32> for Vector2 {
    #[inline]
    fn div_assign(&mut self, rhs: f32) {
        self.x /= rhs;
        self.y /= rhs;
    }
}

impl Neg for Vector2 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Index<usize> for Vector2 {
    type Output = f32;
    fn index(&self, index: usize) -> &f32 {
        match index {
            0 => &self.x,
            1 => &self.y,
            _ => panic!("Vector2 index {index} out of range (0..2)"),
        }
    }
}

impl IndexMut<usize> for Vector2 {
    fn index_mut(&mut self, index: usize) -> &mut f32 {
        match index {
            0 => &mut self.x,
            1 => &mut self.y,
            _ => panic!("Vector2 index {index} out of range (0..2)"),
        }
    }
}

impl fmt::Display for Vector2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

impl From<[f32; 2]> for Vector2 {
    fn from(a: [f32; 2]) -> Self {
        Self::from_array(a)
    }
}

impl From<Vector2> for [f32; 2] {
    fn from(v: Vector2) -> Self {
        v.to_array()
    }
}

impl From<glam::Vec2> for Vector2 {
    fn from(v: glam::Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<Vector2> for glam::Vec2 {
    fn from(v: Vector2) -> Self {
        glam::Vec2::new(v.x, v.y)
    }
}
