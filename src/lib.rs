//! # math3d - 3D affine geometry core
//!
//! Numeric primitives for graphics, physics and simulation code:
//!
//! - **Vectors**: [`Vector2`] and [`Vector3`] componentwise algebra
//! - **Rotations**: [`Quaternion`] construction, composition and interpolation
//! - **Matrices**: [`Matrix4x4`] affine transforms, inversion and projection
//! - **Transforms**: [`Transform`] position + rotation + scale
//!
//! ## Conventions
//!
//! Matrices are row-major (`elements[row][col]`) and act on column vectors
//! (`M * v`). Rotations are right-handed: a positive quarter turn about +Y
//! takes +X to -Z. A quaternion's forward axis is +Z.
//!
//! ## Example
//!
//! ```
//! use math3d::prelude::*;
//!
//! let mut transform = Transform::default();
//! transform
//!     .rotate_by(&Quaternion::from_axis_angle(&Vector3::UNIT_Y, std::f32::consts::FRAC_PI_2))
//!     .translate_by(&Vector3::UNIT_Z);
//!
//! let world = transform.transformation() * Vector3::ZERO;
//! assert!(world.approx_eq(&Vector3::UNIT_X, 1e-6));
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod math;
pub mod scene;

pub use error::{MathError, Result};
pub use math::{Matrix4x4, Quaternion, Vector2, Vector3};
pub use scene::Transform;

// Re-export commonly used types
pub mod prelude {
    //! Convenient re-exports of commonly used types.

    pub use crate::error::MathError;
    pub use crate::math::*;
    pub use crate::scene::*;
}

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = "math3d";
