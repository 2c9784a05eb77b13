//! # Math Module
//!
//! Vectors, quaternions and 4x4 matrices for 3D affine geometry.
//!
//! All types are plain `Copy` values with `f32` components. They convert to
//! and from their `glam` counterparts, serialize with `serde`, and are `Pod`
//! so they can be written into GPU buffers directly.

mod matrix4x4;
mod quaternion;
mod vector2;
mod vector3;

pub use matrix4x4::Matrix4x4;
pub use quaternion::Quaternion;
pub use vector2::Vector2;
pub use vector3::Vector3;

/// Common math constants.
pub mod consts {
    /// Pi constant.
    pub const PI: f32 = std::f32::consts::PI;
    /// Two times Pi.
    pub const TWO_PI: f32 = PI * 2.0;
    /// Half of Pi.
    pub const HALF_PI: f32 = PI / 2.0;
    /// Degrees to radians conversion factor.
    pub const DEG2RAD: f32 = PI / 180.0;
    /// Radians to degrees conversion factor.
    pub const RAD2DEG: f32 = 180.0 / PI;
    /// Small epsilon for floating point comparisons.
    pub const EPSILON: f32 = 1e-6;
}

/// Convert degrees to radians.
#[inline]
pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees * consts::DEG2RAD
}

/// Convert radians to degrees.
#[inline]
pub fn rad_to_deg(radians: f32) -> f32 {
    radians * consts::RAD2DEG
}
