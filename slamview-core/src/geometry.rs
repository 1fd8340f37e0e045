//! Geometry record shared by meshes and point clouds

use crate::bounds::BoundingBox;
use crate::error::{Error, Result};
use crate::point::*;
use serde::{Deserialize, Serialize};

/// Vertex data with optional colors, triangle indices and normals.
///
/// A geometry with `indices` renders as a triangle surface; without them it is a
/// plain point set. Optional buffers, when present, have one entry per position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Geometry {
    pub positions: Vec<Point3f>,
    pub colors: Option<Vec<Rgb8>>,
    pub indices: Option<Vec<[usize; 3]>>,
    pub normals: Option<Vec<Vector3f>>,
    pub bounding_box: Option<BoundingBox>,
}

impl Geometry {
    /// Create a new empty geometry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an unindexed geometry from positions
    pub fn from_positions(positions: Vec<Point3f>) -> Self {
        Self {
            positions,
            ..Self::default()
        }
    }

    /// Create an indexed triangle geometry
    pub fn from_positions_and_faces(positions: Vec<Point3f>, faces: Vec<[usize; 3]>) -> Self {
        Self {
            positions,
            indices: Some(faces),
            ..Self::default()
        }
    }

    /// An axis-aligned box centered at the origin
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let (x, y, z) = (width / 2.0, height / 2.0, depth / 2.0);
        let positions = vec![
            Point3f::new(-x, -y, -z),
            Point3f::new(x, -y, -z),
            Point3f::new(x, y, -z),
            Point3f::new(-x, y, -z),
            Point3f::new(-x, -y, z),
            Point3f::new(x, -y, z),
            Point3f::new(x, y, z),
            Point3f::new(-x, y, z),
        ];
        let faces = vec![
            [4, 5, 6], [4, 6, 7], // +z
            [1, 0, 3], [1, 3, 2], // -z
            [5, 1, 2], [5, 2, 6], // +x
            [0, 4, 7], [0, 7, 3], // -x
            [7, 6, 2], [7, 2, 3], // +y
            [0, 1, 5], [0, 5, 4], // -y
        ];
        Self::from_positions_and_faces(positions, faces)
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Get the number of triangles, zero for point sets
    pub fn face_count(&self) -> usize {
        self.indices.as_ref().map_or(0, |f| f.len())
    }

    pub fn is_indexed(&self) -> bool {
        self.indices.is_some()
    }

    pub fn has_colors(&self) -> bool {
        self.colors.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Set vertex colors; ignored unless there is one color per vertex
    pub fn set_colors(&mut self, colors: Vec<Rgb8>) {
        if colors.len() == self.positions.len() {
            self.colors = Some(colors);
        }
    }

    /// Set vertex normals; ignored unless there is one normal per vertex
    pub fn set_normals(&mut self, normals: Vec<Vector3f>) {
        if normals.len() == self.positions.len() {
            self.normals = Some(normals);
        }
    }

    /// Replace or drop the triangle index buffer
    pub fn set_index(&mut self, indices: Option<Vec<[usize; 3]>>) {
        self.indices = indices;
    }

    /// Compute area-weighted vertex normals from the triangle index buffer.
    ///
    /// Fails for point sets and for faces that reference missing vertices.
    pub fn compute_vertex_normals(&mut self) -> Result<()> {
        let faces = self.indices.as_ref().ok_or_else(|| {
            Error::Unsupported("vertex normals need triangle indices".to_string())
        })?;

        let mut normals = vec![Vector3f::zeros(); self.positions.len()];
        for face in faces {
            if face.iter().any(|&i| i >= self.positions.len()) {
                return Err(Error::InvalidData(format!(
                    "face {:?} references a vertex out of range (vertex count {})",
                    face,
                    self.positions.len()
                )));
            }

            let v0 = self.positions[face[0]];
            let v1 = self.positions[face[1]];
            let v2 = self.positions[face[2]];
            // Unnormalized cross product weights by triangle area
            let n = (v1 - v0).cross(&(v2 - v0));
            for &i in face {
                normals[i] += n;
            }
        }

        for n in &mut normals {
            let len = n.norm();
            if len > f32::EPSILON {
                *n /= len;
            }
        }

        self.normals = Some(normals);
        Ok(())
    }

    /// Compute and cache the bounding box of the positions
    pub fn compute_bounding_box(&mut self) -> Result<BoundingBox> {
        let bbox = BoundingBox::from_points(&self.positions)
            .ok_or_else(|| Error::InvalidData("cannot bound an empty geometry".to_string()))?;
        self.bounding_box = Some(bbox);
        Ok(bbox)
    }

    /// Move every position by `offset`, keeping a cached bounding box in step
    pub fn translate(&mut self, offset: Vector3f) {
        for p in &mut self.positions {
            *p += offset;
        }
        if let Some(bbox) = &mut self.bounding_box {
            bbox.translate(&offset);
        }
    }

    /// Keep every `stride`-th position starting at the first, up to `cap` positions.
    ///
    /// Colors and normals are sampled alongside. Triangle indices no longer refer to
    /// valid vertices afterwards and are dropped.
    pub fn subsample(&mut self, stride: usize, cap: usize) {
        let stride = stride.max(1);
        self.positions = take_strided(&self.positions, stride, cap);
        if let Some(colors) = &self.colors {
            self.colors = Some(take_strided(colors, stride, cap));
        }
        if let Some(normals) = &self.normals {
            self.normals = Some(take_strided(normals, stride, cap));
        }
        self.indices = None;
    }
}

fn take_strided<T: Copy>(items: &[T], stride: usize, cap: usize) -> Vec<T> {
    items.iter().step_by(stride).take(cap).copied().collect()
}
