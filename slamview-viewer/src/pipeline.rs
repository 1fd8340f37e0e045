//! Asset pipeline: background loading plus the geometry preparation applied to each
//! loaded model before it enters a scene
//!
//! Loads are issued in batches, one batch per framework switch. Each batch gets a
//! new generation number and every completion carries the generation it was issued
//! under, so completions from a superseded batch are dropped instead of landing in a
//! scene that already shows another framework.

use crate::config::GridConfig;
use crate::framework::RenderPolicy;
use crate::material::{MeshMaterial, PointsMaterial};
use crate::scene::Object3D;
use slamview_core::{Error, Geometry, Result, Vector3f};
use slamview_io::AssetSource;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Result of one background load
#[derive(Debug)]
pub struct LoadCompletion {
    pub generation: u64,
    /// Index of the viewer the load was issued for
    pub viewer: usize,
    pub path: String,
    pub result: Result<Geometry>,
}

pub struct AssetPipeline {
    source: Arc<dyn AssetSource>,
    generation: u64,
    pending: usize,
    stale_discarded: usize,
    sender: Sender<LoadCompletion>,
    receiver: Receiver<LoadCompletion>,
}

impl AssetPipeline {
    pub fn new(source: Arc<dyn AssetSource>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            source,
            generation: 0,
            pending: 0,
            stale_discarded: 0,
            sender,
            receiver,
        }
    }

    /// Start a new batch; loads still running from earlier batches become stale
    pub fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.pending = 0;
        self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Loads of the current batch not yet handed out
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Completions dropped because their batch was superseded
    pub fn stale_discarded(&self) -> usize {
        self.stale_discarded
    }

    /// Load `path` on the rayon pool for viewer `viewer`
    pub fn request(&mut self, viewer: usize, path: String) {
        self.pending += 1;
        let generation = self.generation;
        let source = Arc::clone(&self.source);
        let sender = self.sender.clone();

        rayon::spawn(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| source.load(&path))).unwrap_or_else(|payload| {
                Err(Error::Asset {
                    path: path.clone(),
                    message: format!("loader panicked: {}", panic_message(payload.as_ref())),
                })
            });
            // The receiver lives as long as the pipeline; a failed send means the
            // grid is gone and nobody wants the result.
            let _ = sender.send(LoadCompletion {
                generation,
                viewer,
                path,
                result,
            });
        });
    }

    /// Pass through completions of the current batch, dropping stale ones
    pub fn accept(&mut self, completion: LoadCompletion) -> Option<LoadCompletion> {
        if completion.generation != self.generation {
            self.stale_discarded += 1;
            log::warn!(
                "Discarding stale load of {} (generation {}, current {})",
                completion.path,
                completion.generation,
                self.generation
            );
            return None;
        }
        self.pending = self.pending.saturating_sub(1);
        Some(completion)
    }

    /// Next finished load of the current batch, without blocking
    pub fn try_next(&mut self) -> Option<LoadCompletion> {
        while let Ok(completion) = self.receiver.try_recv() {
            if let Some(completion) = self.accept(completion) {
                return Some(completion);
            }
        }
        None
    }

    /// Next finished load of the current batch, waiting up to `timeout`
    pub fn next_timeout(&mut self, timeout: Duration) -> Option<LoadCompletion> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let completion = self.receiver.recv_timeout(remaining).ok()?;
            if let Some(completion) = self.accept(completion) {
                return Some(completion);
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

/// Uniform scale mapping the largest extent of `size` onto `target_size`.
///
/// Zero or non-finite extents count as one unit.
pub fn scale_to_fit(size: &Vector3f, target_size: f32) -> f32 {
    let extent = |v: f32| if v == 0.0 || !v.is_finite() { 1.0 } else { v };
    let max_dim = extent(size.x).max(extent(size.y)).max(extent(size.z));
    if max_dim > 0.0 {
        target_size / max_dim
    } else {
        1.0
    }
}

/// Add normals where possible, center the geometry on the origin, and return the
/// scale fitting it into `target_size`
pub fn normalize(geometry: &mut Geometry, target_size: f32) -> f32 {
    if let Err(e) = geometry.compute_vertex_normals() {
        log::trace!("No vertex normals: {}", e);
    }

    let size = match geometry.compute_bounding_box() {
        Ok(bbox) => {
            geometry.translate(-bbox.center().coords);
            bbox.size()
        }
        Err(e) => {
            log::trace!("No bounding box: {}", e);
            Vector3f::new(1.0, 1.0, 1.0)
        }
    };

    scale_to_fit(&size, target_size)
}

/// Reduce a geometry to bare positions, keeping at most `max_points` of them.
///
/// Past the cap, positions are taken at a stride of `count / max_points` from the
/// first one on.
pub fn prepare_points(geometry: &mut Geometry, max_points: usize) {
    geometry.set_index(None);
    geometry.normals = None;
    geometry.colors = None;

    let total = geometry.vertex_count();
    if total > max_points {
        let stride = total / max_points.max(1);
        geometry.subsample(stride, max_points);
    }
}

/// Turn a loaded geometry into a scene object under `policy`
pub fn build_object(mut geometry: Geometry, policy: RenderPolicy, config: &GridConfig) -> Object3D {
    let scale = normalize(&mut geometry, config.target_size);

    let mut object = match policy {
        RenderPolicy::PointCloud => {
            prepare_points(&mut geometry, config.max_points);
            Object3D::points(
                geometry,
                PointsMaterial {
                    size: config.point_size,
                    size_attenuation: true,
                    color: config.point_color,
                },
            )
        }
        RenderPolicy::Surface => {
            let material = if geometry.has_colors() {
                MeshMaterial::vertex_colored()
            } else {
                MeshMaterial::flat(config.mesh_color)
            };
            Object3D::mesh(geometry, material)
        }
    };

    object.scale = scale;
    object
}

/// Unit cube marking a viewport whose model is missing or failed to load
pub fn fallback_object(config: &GridConfig) -> Object3D {
    Object3D::mesh(Geometry::cuboid(1.0, 1.0, 1.0), MeshMaterial::lambert(config.fallback_color))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{Color, Material, Side};
    use approx::assert_relative_eq;
    use slamview_core::Point3f;
    use slamview_io::source::MemoryAssetSource;

    struct PanickingSource;

    impl AssetSource for PanickingSource {
        fn load(&self, path: &str) -> Result<Geometry> {
            panic!("corrupt model {}", path);
        }
    }

    fn colored_cube(size: f32) -> Geometry {
        let mut cube = Geometry::cuboid(size, size / 2.0, size / 4.0);
        cube.translate(Vector3f::new(10.0, -4.0, 2.0));
        cube.set_colors(vec![[10, 20, 30]; 8]);
        cube
    }

    fn line_of_points(count: usize) -> Geometry {
        let positions = (0..count).map(|i| Point3f::new(i as f32, 0.0, 0.0)).collect();
        let mut geometry = Geometry::from_positions(positions);
        geometry.set_colors(vec![[255, 0, 0]; count]);
        geometry.set_normals(vec![Vector3f::z(); count]);
        geometry
    }

    #[test]
    fn test_scale_to_fit() {
        assert_relative_eq!(scale_to_fit(&Vector3f::new(3.0, 1.0, 2.0), 1.5), 0.5);
        // A flat 0.5-wide geometry counts its empty axes as one unit
        assert_relative_eq!(scale_to_fit(&Vector3f::new(0.5, 0.0, 0.0), 1.5), 1.5);
    }

    #[test]
    fn test_normalize_centers_geometry() {
        let mut cube = colored_cube(3.0);
        let scale = normalize(&mut cube, 1.5);

        assert_relative_eq!(scale, 0.5);
        assert_relative_eq!(cube.bounding_box.unwrap().center(), Point3f::origin(), epsilon = 1e-5);
        assert!(cube.normals.is_some());
    }

    #[test]
    fn test_normalize_empty_geometry() {
        let mut empty = Geometry::new();
        assert_relative_eq!(normalize(&mut empty, 1.5), 1.5);
    }

    #[test]
    fn test_downsample_large_cloud() {
        let mut geometry = Geometry::from_positions_and_faces(
            (0..900_000).map(|i| Point3f::new(i as f32, 0.0, 0.0)).collect(),
            vec![[0, 1, 2]],
        );
        geometry.set_normals(vec![Vector3f::z(); 900_000]);

        prepare_points(&mut geometry, 300_000);

        assert!(geometry.vertex_count() <= 300_000);
        assert!(geometry.indices.is_none());
        assert!(geometry.normals.is_none());
        assert!(geometry.colors.is_none());
        // Stride of three from the first vertex on
        assert_eq!(geometry.positions[0].x, 0.0);
        assert_eq!(geometry.positions[1].x, 3.0);
        assert_eq!(geometry.positions[1000].x, 3000.0);
    }

    #[test]
    fn test_small_cloud_keeps_every_point() {
        let mut geometry = line_of_points(1000);
        prepare_points(&mut geometry, 300_000);
        assert_eq!(geometry.vertex_count(), 1000);
        assert!(!geometry.has_colors());
    }

    #[test]
    fn test_point_cloud_policy() {
        let config = GridConfig::default();
        let object = build_object(line_of_points(10), RenderPolicy::PointCloud, &config);

        match &object.material {
            Material::Points(m) => {
                assert_eq!(m.color, Color(0x4444ff));
                assert_relative_eq!(m.size, 0.004);
                assert!(m.size_attenuation);
            }
            other => panic!("expected points, got {:?}", other),
        }
        assert!(object.geometry.normals.is_none());
        // 9 units long, fitted to 1.5
        assert_relative_eq!(object.scale, 1.5 / 9.0);
    }

    #[test]
    fn test_surface_policy_uses_vertex_colors() {
        let config = GridConfig::default();
        let object = build_object(colored_cube(2.0), RenderPolicy::Surface, &config);

        match &object.material {
            Material::Mesh(m) => {
                assert!(m.vertex_colors);
                assert_eq!(m.side, Side::Double);
            }
            other => panic!("expected mesh, got {:?}", other),
        }
        assert_eq!(object.geometry.face_count(), 12);
    }

    #[test]
    fn test_surface_policy_without_colors_is_flat() {
        let config = GridConfig::default();
        let object = build_object(Geometry::cuboid(1.0, 1.0, 1.0), RenderPolicy::Surface, &config);
        assert_eq!(object.material, Material::Mesh(MeshMaterial::flat(Color(0x8888aa))));
    }

    #[test]
    fn test_stale_completions_are_dropped() {
        let mut pipeline = AssetPipeline::new(Arc::new(MemoryAssetSource::new()));
        let first = pipeline.begin();
        pipeline.request(0, "a.ply".to_string());
        let second = pipeline.begin();
        pipeline.request(0, "b.ply".to_string());

        let stale = LoadCompletion {
            generation: first,
            viewer: 0,
            path: "a.ply".to_string(),
            result: Err(Error::InvalidData("late".to_string())),
        };
        assert!(pipeline.accept(stale).is_none());
        assert_eq!(pipeline.stale_discarded(), 1);
        assert_eq!(pipeline.pending(), 1);

        let current = LoadCompletion {
            generation: second,
            viewer: 0,
            path: "b.ply".to_string(),
            result: Err(Error::InvalidData("missing".to_string())),
        };
        assert!(pipeline.accept(current).is_some());
        assert_eq!(pipeline.pending(), 0);
    }

    #[test]
    fn test_background_load_arrives() {
        let mut source = MemoryAssetSource::new();
        source.insert("./static/mesh/cube.ply", Geometry::cuboid(1.0, 1.0, 1.0));
        let mut pipeline = AssetPipeline::new(Arc::new(source));

        let generation = pipeline.begin();
        pipeline.request(3, "./static/mesh/cube.ply".to_string());

        let completion = pipeline.next_timeout(Duration::from_secs(10)).unwrap();
        assert_eq!(completion.generation, generation);
        assert_eq!(completion.viewer, 3);
        assert_eq!(completion.result.unwrap().face_count(), 12);
        assert_eq!(pipeline.pending(), 0);
    }

    #[test]
    fn test_panicking_loader_becomes_asset_error() {
        let mut pipeline = AssetPipeline::new(Arc::new(PanickingSource));
        pipeline.begin();
        pipeline.request(1, "./static/mesh/ESLAM/0080_GT.ply".to_string());

        let completion = pipeline.next_timeout(Duration::from_secs(10)).unwrap();
        assert_eq!(completion.viewer, 1);
        match completion.result {
            Err(Error::Asset { path, message }) => {
                assert_eq!(path, "./static/mesh/ESLAM/0080_GT.ply");
                assert!(message.contains("corrupt model"), "{}", message);
            }
            other => panic!("expected asset error, got {:?}", other),
        }
    }
}
