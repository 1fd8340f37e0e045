//! Perspective camera for the viewports

use nalgebra::{Isometry3, Matrix4, Perspective3, Point3, Translation3, UnitQuaternion, Vector3};

/// Offset added to a view direction lying on the up axis
const UP_AXIS_TILT: f32 = 1e-4;

/// A perspective camera looking down its local -Z axis
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub rotation: UnitQuaternion<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in radians
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

/// Everything needed to put another viewport's camera in the same place
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Point3<f32>,
    pub rotation: UnitQuaternion<f32>,
    pub target: Point3<f32>,
}

impl Camera {
    /// Create a camera at the origin looking down -Z
    pub fn new(fov_degrees: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        Self {
            position: Point3::origin(),
            rotation: UnitQuaternion::identity(),
            up: Vector3::y(),
            fov: fov_degrees.to_radians(),
            aspect_ratio,
            near,
            far,
        }
    }

    /// Rotate the camera so that it faces `target`.
    ///
    /// Leaves the rotation alone when the target coincides with the camera. A target
    /// straight along the up axis is looked at from a slight tilt.
    pub fn look_at(&mut self, target: &Point3<f32>) {
        let offset = self.position - target;
        if offset.norm_squared() <= f32::EPSILON {
            return;
        }
        let mut backward = offset.normalize();
        if backward.cross(&self.up).norm_squared() <= f32::EPSILON {
            if self.up.z.abs() >= 1.0 - f32::EPSILON {
                backward.x += UP_AXIS_TILT;
            } else {
                backward.z += UP_AXIS_TILT;
            }
            backward.normalize_mut();
        }
        self.rotation = UnitQuaternion::face_towards(&backward, &self.up);
    }

    /// Direction the camera is looking in
    pub fn forward(&self) -> Vector3<f32> {
        self.rotation * -Vector3::z()
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Matrix4<f32> {
        let world = Isometry3::from_parts(Translation3::from(self.position.coords), self.rotation);
        world.inverse().to_homogeneous()
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let perspective = Perspective3::new(self.aspect_ratio, self.fov, self.near, self.far);
        perspective.into_inner()
    }

    /// Recompute the aspect ratio from a pixel size; a zero height keeps the old ratio
    pub fn set_viewport_size(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect_ratio = width as f32 / height as f32;
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(60.0, 1.0, 0.01, 100.0)
    }
}
