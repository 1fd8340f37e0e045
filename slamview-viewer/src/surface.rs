//! Render surfaces
//!
//! A surface is the drawing target attached to one page container. The grid only
//! talks to the [`RenderSurface`] trait; [`HeadlessSurface`] is the built-in
//! implementation, which walks the scene and records what a frame would draw.

use crate::camera::Camera;
use crate::layout::Container;
use crate::scene::{Scene, SceneNode};
use nalgebra::Vector4;
use slamview_core::{BoundingBox, Result};

/// Per-surface draw statistics for the most recent frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderInfo {
    pub frames: u64,
    pub draw_calls: usize,
    pub triangles: usize,
    pub points: usize,
    /// Objects whose world-space center projects inside the view volume
    pub objects_in_view: usize,
    pub scene_bounds: Option<BoundingBox>,
}

pub trait RenderSurface {
    /// Device pixels per layout pixel
    fn set_pixel_ratio(&mut self, ratio: f32);

    fn pixel_ratio(&self) -> f32;

    /// Resize the drawing buffer in layout pixels
    fn set_size(&mut self, width: u32, height: u32);

    fn size(&self) -> (u32, u32);

    fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<()>;

    fn info(&self) -> &RenderInfo;
}

/// Creates the surface for a container when the viewport pool is built
pub trait SurfaceFactory {
    fn create_surface(&mut self, container: &Container) -> Box<dyn RenderSurface>;
}

#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    width: u32,
    height: u32,
    pixel_ratio: f32,
    info: RenderInfo,
}

impl HeadlessSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixel_ratio: 1.0,
            info: RenderInfo::default(),
        }
    }

    /// Size of the drawing buffer in device pixels
    pub fn buffer_size(&self) -> (u32, u32) {
        (
            (self.width as f32 * self.pixel_ratio).round() as u32,
            (self.height as f32 * self.pixel_ratio).round() as u32,
        )
    }
}

impl RenderSurface for HeadlessSurface {
    fn set_pixel_ratio(&mut self, ratio: f32) {
        self.pixel_ratio = ratio;
    }

    fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<()> {
        let view_projection = camera.projection_matrix() * camera.view_matrix();

        let mut info = RenderInfo {
            frames: self.info.frames + 1,
            ..RenderInfo::default()
        };

        scene.traverse(|node| {
            let SceneNode::Object(object) = node else {
                return;
            };
            if object.geometry.is_empty() {
                return;
            }

            info.draw_calls += 1;
            if object.is_points() {
                info.points += object.geometry.vertex_count();
            } else {
                info.triangles += object.geometry.face_count();
            }

            if let Some(bounds) = object.world_bounds() {
                let clip = view_projection * bounds.center().to_homogeneous();
                if in_view_volume(&clip) {
                    info.objects_in_view += 1;
                }
                info.scene_bounds = Some(match info.scene_bounds {
                    Some(total) => total.union(&bounds),
                    None => bounds,
                });
            }
        });

        self.info = info;
        Ok(())
    }

    fn info(&self) -> &RenderInfo {
        &self.info
    }
}

/// Clip-space point inside the view volume, in front of the camera
fn in_view_volume(clip: &Vector4<f32>) -> bool {
    if clip.w <= 0.0 {
        return false;
    }
    let ndc = clip.xyz() / clip.w;
    ndc.iter().all(|c| c.is_finite() && (-1.0..=1.0).contains(c))
}

/// Hands out [`HeadlessSurface`]s sized to their containers
#[derive(Debug, Default)]
pub struct HeadlessSurfaceFactory;

impl HeadlessSurfaceFactory {
    pub fn new() -> Self {
        Self
    }
}

impl SurfaceFactory for HeadlessSurfaceFactory {
    fn create_surface(&mut self, container: &Container) -> Box<dyn RenderSurface> {
        Box::new(HeadlessSurface::new(container.width, container.height))
    }
}
