//! Core data structures for slamview
//!
//! This crate provides the geometry record shared by the loader and the viewer grid:
//! positions with optional colors, triangle indices and normals, plus bounding boxes
//! and simple affine transforms.

pub mod point;
pub mod bounds;
pub mod geometry;
pub mod transform;
pub mod error;

pub use point::*;
pub use bounds::*;
pub use geometry::*;
pub use transform::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3, Matrix4, UnitQuaternion};
