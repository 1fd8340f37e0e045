//! Axis-aligned bounding boxes

use crate::point::*;
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3f,
    pub max: Point3f,
}

impl BoundingBox {
    pub fn new(min: Point3f, max: Point3f) -> Self {
        Self { min, max }
    }

    /// Compute the box enclosing all points, or `None` for an empty slice
    pub fn from_points(points: &[Point3f]) -> Option<Self> {
        let first = *points.first()?;
        let mut min = first;
        let mut max = first;

        for p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);

            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        Some(Self { min, max })
    }

    /// Center point of the box
    pub fn center(&self) -> Point3f {
        nalgebra::center(&self.min, &self.max)
    }

    /// Extent along each axis
    pub fn size(&self) -> Vector3f {
        self.max - self.min
    }

    /// Move the box by `offset`
    pub fn translate(&mut self, offset: &Vector3f) {
        self.min += *offset;
        self.max += *offset;
    }

    /// Smallest box containing both boxes
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: Point3f::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Point3f::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }

    /// The eight corners of the box
    pub fn corners(&self) -> [Point3f; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3f::new(a.x, a.y, a.z),
            Point3f::new(b.x, a.y, a.z),
            Point3f::new(a.x, b.y, a.z),
            Point3f::new(b.x, b.y, a.z),
            Point3f::new(a.x, a.y, b.z),
            Point3f::new(b.x, a.y, b.z),
            Point3f::new(a.x, b.y, b.z),
            Point3f::new(b.x, b.y, b.z),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_points() {
        let points = vec![
            Point3f::new(-1.0, 2.0, 0.5),
            Point3f::new(3.0, -2.0, 0.0),
            Point3f::new(0.0, 0.0, 4.0),
        ];
        let bbox = BoundingBox::from_points(&points).unwrap();

        assert_eq!(bbox.min, Point3f::new(-1.0, -2.0, 0.0));
        assert_eq!(bbox.max, Point3f::new(3.0, 2.0, 4.0));
        assert_relative_eq!(bbox.center(), Point3f::new(1.0, 0.0, 2.0));
        assert_relative_eq!(bbox.size(), Vector3f::new(4.0, 4.0, 4.0));
    }

    #[test]
    fn test_empty_points_have_no_box() {
        assert!(BoundingBox::from_points(&[]).is_none());
    }

    #[test]
    fn test_union() {
        let a = BoundingBox::new(Point3f::new(0.0, 0.0, 0.0), Point3f::new(1.0, 1.0, 1.0));
        let b = BoundingBox::new(Point3f::new(-1.0, 0.5, 0.5), Point3f::new(0.5, 2.0, 0.5));
        let u = a.union(&b);

        assert_eq!(u.min, Point3f::new(-1.0, 0.0, 0.0));
        assert_eq!(u.max, Point3f::new(1.0, 2.0, 1.0));
    }
}
