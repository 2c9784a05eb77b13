//! # Scene Module
//!
//! Object-level transforms built on top of the math types.

mod transform;

pub use transform::Transform;
