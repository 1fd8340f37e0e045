//! Damped orbit controls
//!
//! User input (rotate, zoom, pan) accumulates as pending motion that `update`
//! applies to the camera. With damping enabled the motion is applied a fraction per
//! update and decays over following frames. Every change is tagged with its origin so
//! listeners can tell user motion apart from programmatic repositioning.

use crate::camera::{Camera, CameraPose};
use nalgebra::{Point3, Vector3};
use std::f32::consts::PI;

/// Keeps the camera off the poles
const POLAR_EPSILON: f32 = 1e-6;

/// Residual motion below this is dropped
const MOTION_EPSILON: f32 = 1e-6;

/// Where a camera change came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// Motion from user input, including its damped tail
    User,
    /// Repositioning done by code, e.g. camera sync or a reset after loading
    Programmatic,
}

#[derive(Debug, Clone, Copy)]
struct Spherical {
    radius: f32,
    theta: f32,
    phi: f32,
}

impl Spherical {
    fn from_offset(offset: &Vector3<f32>) -> Self {
        let radius = offset.norm();
        if radius <= f32::EPSILON {
            return Self { radius: 0.0, theta: 0.0, phi: 0.0 };
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vector3<f32> {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vector3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Point3<f32>,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    theta_delta: f32,
    phi_delta: f32,
    zoom_scale: f32,
    pan_delta: (f32, f32),
}

impl OrbitControls {
    pub fn new(target: Point3<f32>, damping_factor: f32) -> Self {
        Self {
            target,
            enable_damping: true,
            damping_factor,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            theta_delta: 0.0,
            phi_delta: 0.0,
            zoom_scale: 1.0,
            pan_delta: (0.0, 0.0),
        }
    }

    /// Orbit by `left` radians around the up axis and `up` radians towards the pole
    pub fn rotate(&mut self, left: f32, up: f32) {
        self.theta_delta -= left * self.rotate_speed;
        self.phi_delta -= up * self.rotate_speed;
    }

    /// Dolly towards the target; negative steps move away
    pub fn zoom(&mut self, steps: f32) {
        self.zoom_scale *= 0.95f32.powf(self.zoom_speed * steps);
    }

    /// Move the target along the camera's right and up axes, in fractions of the
    /// current target distance
    pub fn pan(&mut self, right: f32, up: f32) {
        self.pan_delta.0 += right;
        self.pan_delta.1 += up;
    }

    pub fn has_pending_motion(&self) -> bool {
        self.theta_delta != 0.0
            || self.phi_delta != 0.0
            || self.zoom_scale != 1.0
            || self.pan_delta != (0.0, 0.0)
    }

    /// Drop any pending or damped motion
    pub fn stop(&mut self) {
        self.theta_delta = 0.0;
        self.phi_delta = 0.0;
        self.zoom_scale = 1.0;
        self.pan_delta = (0.0, 0.0);
    }

    /// Apply pending motion to `camera` and aim it at the target.
    ///
    /// Returns the origin of the change, or `None` when the camera did not move.
    pub fn update(&mut self, camera: &mut Camera) -> Option<ChangeOrigin> {
        if self.has_pending_motion() {
            self.apply_motion(camera);
            camera.look_at(&self.target);
            return Some(ChangeOrigin::User);
        }

        let rotation_before = camera.rotation;
        camera.look_at(&self.target);
        (camera.rotation != rotation_before).then_some(ChangeOrigin::Programmatic)
    }

    fn apply_motion(&mut self, camera: &mut Camera) {
        let factor = if self.enable_damping { self.damping_factor } else { 1.0 };

        let offset = camera.position - self.target;
        let distance = offset.norm();

        let right = camera.rotation * Vector3::x();
        let up = camera.rotation * Vector3::y();
        self.target += (right * self.pan_delta.0 + up * self.pan_delta.1) * distance * factor;

        let mut spherical = Spherical::from_offset(&offset);
        spherical.theta += self.theta_delta * factor;
        spherical.phi = (spherical.phi + self.phi_delta * factor).clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        spherical.radius = (spherical.radius * self.zoom_scale).clamp(self.min_distance, self.max_distance);

        camera.position = self.target + spherical.to_offset();

        if self.enable_damping {
            let decay = 1.0 - self.damping_factor;
            self.theta_delta *= decay;
            self.phi_delta *= decay;
            self.pan_delta.0 *= decay;
            self.pan_delta.1 *= decay;
        } else {
            self.theta_delta = 0.0;
            self.phi_delta = 0.0;
            self.pan_delta = (0.0, 0.0);
        }
        // Zoom is applied in full each update
        self.zoom_scale = 1.0;

        for delta in [&mut self.theta_delta, &mut self.phi_delta, &mut self.pan_delta.0, &mut self.pan_delta.1] {
            if delta.abs() < MOTION_EPSILON {
                *delta = 0.0;
            }
        }
    }

    /// Current pose of `camera` under these controls
    pub fn pose(&self, camera: &Camera) -> CameraPose {
        CameraPose {
            position: camera.position,
            rotation: camera.rotation,
            target: self.target,
        }
    }

    /// Move `camera` to `pose` without producing user motion
    pub fn set_pose(&mut self, camera: &mut Camera, pose: &CameraPose) -> Option<ChangeOrigin> {
        self.stop();
        camera.position = pose.position;
        camera.rotation = pose.rotation;
        self.target = pose.target;
        self.update(camera)
    }
}
