//! Integration tests for slamview-viewer
//!
//! These tests drive a full grid over headless surfaces: framework switches, label
//! cycling, stale loads, fallbacks, camera sync and page changes.

use approx::assert_relative_eq;
use slamview_core::{Geometry, Point3f, Vector3f};
use slamview_io::{AssetSource, FileAssetSource, MemoryAssetSource};
use slamview_viewer::*;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

const LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// A source holding a box model for every path of every framework
fn populated_source() -> MemoryAssetSource {
    let mut source = MemoryAssetSource::new();
    for framework in Framework::ALL {
        for path in framework.model_paths().into_iter().flatten() {
            let mut model = Geometry::cuboid(3.0, 2.0, 1.0);
            model.translate(Vector3f::new(4.0, 1.0, -2.0));
            source.insert(path, model);
        }
    }
    source
}

/// Holds every load back until `open` is called
struct GatedSource {
    models: MemoryAssetSource,
    open: Mutex<bool>,
    opened: Condvar,
}

impl GatedSource {
    fn new(models: MemoryAssetSource) -> Self {
        Self {
            models,
            open: Mutex::new(false),
            opened: Condvar::new(),
        }
    }

    fn open(&self) {
        *self.open.lock().unwrap() = true;
        self.opened.notify_all();
    }
}

impl AssetSource for GatedSource {
    fn load(&self, path: &str) -> slamview_core::Result<Geometry> {
        let mut open = self.open.lock().unwrap();
        while !*open {
            open = self.opened.wait(open).unwrap();
        }
        drop(open);
        self.models.load(path)
    }
}

struct PanickingSource;

impl AssetSource for PanickingSource {
    fn load(&self, path: &str) -> slamview_core::Result<Geometry> {
        panic!("decoder crashed on {}", path);
    }
}

fn build_grid(layout: PageLayout, source: MemoryAssetSource) -> ViewerGrid {
    ViewerGrid::new(
        GridConfig::default(),
        layout,
        TabBar::for_frameworks(),
        Arc::new(source),
        &mut HeadlessSurfaceFactory::new(),
    )
}

fn started_grid() -> ViewerGrid {
    let mut grid = build_grid(PageLayout::full(320, 240, 2.0), populated_source());
    grid.start();
    assert!(grid.wait_for_loads(LOAD_TIMEOUT));
    grid
}

fn select(grid: &mut ViewerGrid, framework: Framework) {
    let index = grid.tabs().position(framework.as_str()).unwrap();
    assert_eq!(grid.select_tab(index), Some(framework));
}

#[test]
fn test_label_cycling() {
    let grid = started_grid();
    let layout = grid.layout();

    // Positions 1, 5, 9 and 4, 8, 12 counted from one
    for slot in [0, 4, 8] {
        assert_eq!(layout.caption(slot), Some("ESLAM"));
    }
    for slot in [3, 7, 11] {
        assert_eq!(layout.caption(slot), Some("Ground Truth"));
    }
    assert_eq!(layout.caption(5), Some("ESLAM (w/ PDNet)"));
    assert_eq!(layout.caption(10), Some("ESLAM (w/ Ours)"));
}

#[test]
fn test_eslam_loads_surfaces() {
    let grid = started_grid();

    assert_eq!(grid.framework(), Framework::Eslam);
    assert_eq!(grid.tabs().active().unwrap().value, "ESLAM");
    for viewer in grid.viewers() {
        let objects: Vec<_> = viewer.scene.objects().collect();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].material, Material::Mesh(MeshMaterial::flat(Color(0x8888aa))));
        assert_relative_eq!(objects[0].scale, 0.5);
        assert_relative_eq!(viewer.camera.position, Point3f::new(2.5, 1.25, 2.5));
        assert_relative_eq!(viewer.controls.target, Point3f::origin());
    }
}

#[test]
fn test_switch_to_splatam() {
    let mut grid = started_grid();
    select(&mut grid, Framework::SplaTam);

    // Nothing applied yet: lights only
    for viewer in grid.viewers() {
        assert_eq!(viewer.scene.len(), 3);
        assert_eq!(viewer.scene.lights().count(), 3);
    }
    assert_eq!(grid.layout().caption(0), Some("SplaTAM"));
    assert_eq!(grid.layout().caption(9), Some("SplaTAM (w/ PDNet)"));
    assert_eq!(grid.layout().caption(11), Some("Ground Truth"));
    assert_eq!(grid.tabs().active().unwrap().value, "SplaTAM");

    assert!(grid.wait_for_loads(LOAD_TIMEOUT));
    for viewer in grid.viewers() {
        let objects: Vec<_> = viewer.scene.objects().collect();
        assert_eq!(objects.len(), 1);
        assert!(objects[0].is_points(), "slot {} is not a point cloud", viewer.slot);
        assert!(objects[0].geometry.indices.is_none());
    }

    assert_eq!(grid.render_frame(), 12);
    for surface in grid.surfaces() {
        assert_eq!(surface.info().points, 8);
        assert_eq!(surface.info().triangles, 0);
        assert_eq!(surface.info().objects_in_view, 1);
    }
}

#[test]
fn test_stale_loads_never_land() {
    let source = Arc::new(GatedSource::new(populated_source()));
    let mut grid = ViewerGrid::new(
        GridConfig::default(),
        PageLayout::full(320, 240, 1.0),
        TabBar::for_frameworks(),
        source.clone(),
        &mut HeadlessSurfaceFactory::new(),
    );
    grid.start();
    select(&mut grid, Framework::SplaTam);

    // Every ESLAM load is still held back
    assert_eq!(grid.pump(), 0);
    assert_eq!(grid.pipeline().stale_discarded(), 0);

    source.open();
    assert!(grid.wait_for_loads(LOAD_TIMEOUT));

    let deadline = Instant::now() + LOAD_TIMEOUT;
    while grid.pipeline().stale_discarded() < 12 && Instant::now() < deadline {
        grid.pump();
        std::thread::sleep(Duration::from_millis(5));
    }

    assert_eq!(grid.pipeline().stale_discarded(), 12);
    assert_eq!(grid.pipeline().pending(), 0);
    for viewer in grid.viewers() {
        let objects: Vec<_> = viewer.scene.objects().collect();
        assert_eq!(objects.len(), 1);
        assert!(objects[0].is_points());
    }
}

#[test]
fn test_panicking_loader_falls_back() {
    let mut grid = ViewerGrid::new(
        GridConfig::default(),
        PageLayout::full(320, 240, 1.0),
        TabBar::for_frameworks(),
        Arc::new(PanickingSource),
        &mut HeadlessSurfaceFactory::new(),
    );
    grid.start();
    assert!(grid.wait_for_loads(LOAD_TIMEOUT));

    let fallback = Material::Mesh(MeshMaterial::lambert(Color(0xff6b6b)));
    for viewer in grid.viewers() {
        let objects: Vec<_> = viewer.scene.objects().collect();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].material, fallback);
    }
}

#[test]
fn test_unknown_selector_loads_eslam() {
    let mut grid = build_grid(PageLayout::full(320, 240, 1.0), populated_source());
    assert_eq!(grid.load_framework("ORB-SLAM"), Framework::Eslam);
    assert!(grid.wait_for_loads(LOAD_TIMEOUT));

    assert_eq!(grid.layout().caption(0), Some("ESLAM"));
    assert!(grid.viewers().iter().all(|v| v.scene.objects().count() == 1));
}

#[test]
fn test_missing_and_failed_models_fall_back() {
    // Everything but the PDNet model of the second row
    let mut source = MemoryAssetSource::new();
    for path in Framework::Eslam.model_paths().into_iter().flatten() {
        if path != "./static/mesh/ESLAM/0112_PDNet.ply" {
            source.insert(path, Geometry::cuboid(3.0, 2.0, 1.0));
        }
    }

    let mut grid = build_grid(PageLayout::full(320, 240, 1.0), source);
    let mut paths = Framework::Eslam.model_paths();
    paths[2] = None;
    grid.load_paths(Framework::Eslam, &paths);
    assert!(grid.wait_for_loads(LOAD_TIMEOUT));

    let fallback = Material::Mesh(MeshMaterial::lambert(Color(0xff6b6b)));
    for slot in [2, 5] {
        let viewer = grid.viewer_for_slot(slot).unwrap();
        let objects: Vec<_> = viewer.scene.objects().collect();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].material, fallback);
        assert_eq!(objects[0].geometry.vertex_count(), 8);
        // Camera untouched by a fallback
        assert_relative_eq!(viewer.camera.position, Point3f::new(0.0, 0.0, 2.0));
    }
    let loaded = grid.viewer_for_slot(6).unwrap();
    assert_ne!(loaded.scene.objects().next().unwrap().material, fallback);
}

#[test]
fn test_camera_sync_stays_in_group() {
    let mut grid = started_grid();
    let untouched = grid.viewer_for_slot(4).unwrap().pose();

    let synced = grid.rotate(0, 0.6, 0.2);
    assert_eq!(synced, vec![1, 2, 3]);

    // Let the damped tail play out over a few frames
    for _ in 0..20 {
        grid.render_frame();
    }

    let source = grid.viewer_for_slot(0).unwrap().pose();
    assert_ne!(source.position, Point3f::new(2.5, 1.25, 2.5));
    for slot in 1..4 {
        let pose = grid.viewer_for_slot(slot).unwrap().pose();
        assert_relative_eq!(pose.position, source.position, epsilon = 1e-5);
        assert_relative_eq!(pose.rotation, source.rotation, epsilon = 1e-5);
        assert_relative_eq!(pose.target, source.target, epsilon = 1e-5);
    }
    for slot in 4..12 {
        assert_eq!(grid.viewer_for_slot(slot).unwrap().pose(), untouched);
    }
}

#[test]
fn test_sync_from_any_member() {
    let mut grid = started_grid();
    grid.pan(10, 0.1, 0.0);
    grid.zoom(10, 2.0);

    let source = grid.viewer_for_slot(10).unwrap().pose();
    for slot in [8, 9, 11] {
        let pose = grid.viewer_for_slot(slot).unwrap().pose();
        assert_relative_eq!(pose.position, source.position, epsilon = 1e-5);
        assert_relative_eq!(pose.target, source.target, epsilon = 1e-5);
    }
    let other_row = grid.viewer_for_slot(0).unwrap().pose();
    assert_relative_eq!(other_row.target, Point3f::origin());
}

#[test]
fn test_sparse_layout_and_hidden_viewers() {
    let mut layout = PageLayout::full(320, 240, 1.0);
    layout.remove(5);
    layout.set_visible(7, false);

    let mut grid = build_grid(layout, populated_source());
    grid.start();
    assert!(grid.wait_for_loads(LOAD_TIMEOUT));

    assert_eq!(grid.viewers().len(), 11);
    assert!(grid.viewer_for_slot(5).is_none());
    assert_eq!(grid.sync().group(1).unwrap().members().len(), 3);
    assert_eq!(grid.layout().caption(6), Some("ESLAM (w/ Ours)"));

    assert_eq!(grid.render_frame(), 10);
    assert_eq!(grid.viewer_for_slot(7).unwrap().surface.info().frames, 0);
    assert_eq!(grid.viewer_for_slot(6).unwrap().surface.info().frames, 1);
}

#[test]
fn test_resize_updates_visible_viewers_only() {
    let mut layout = PageLayout::full(320, 240, 1.0);
    layout.set_visible(7, false);
    let mut grid = build_grid(layout, populated_source());

    grid.layout_mut().resize_container(0, 400, 100);
    grid.layout_mut().resize_container(7, 400, 100);
    grid.handle_resize();

    let resized = grid.viewer_for_slot(0).unwrap();
    assert_relative_eq!(resized.camera.aspect_ratio, 4.0);
    assert_eq!(resized.surface.size(), (400, 100));

    let hidden = grid.viewer_for_slot(7).unwrap();
    assert_relative_eq!(hidden.camera.aspect_ratio, 320.0 / 240.0);
    assert_eq!(hidden.surface.size(), (320, 240));
}

#[test]
fn test_run_stops_on_request() {
    let mut grid = started_grid();
    let frames = grid.run(|g| g.surfaces().next().unwrap().info().frames < 3);
    assert_eq!(frames, 3);
}

#[test]
fn test_ply_files_from_disk() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("static/mesh/ESLAM");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("0080_Kinect.ply"),
        "ply\n\
         format ascii 1.0\n\
         element vertex 4\n\
         property float x\n\
         property float y\n\
         property float z\n\
         property uchar red\n\
         property uchar green\n\
         property uchar blue\n\
         element face 1\n\
         property list uchar int vertex_indices\n\
         end_header\n\
         0 0 0 255 0 0\n\
         2 0 0 0 255 0\n\
         2 1 0 0 0 255\n\
         0 1 0 255 255 255\n\
         4 0 1 2 3\n",
    )
    .unwrap();

    let mut grid = ViewerGrid::new(
        GridConfig::default(),
        PageLayout::full(320, 240, 1.0),
        TabBar::for_frameworks(),
        Arc::new(FileAssetSource::new(root.path())),
        &mut HeadlessSurfaceFactory::new(),
    );
    grid.start();
    assert!(grid.wait_for_loads(LOAD_TIMEOUT));

    let first = grid.viewer_for_slot(0).unwrap().scene.objects().next().unwrap();
    assert_eq!(first.material, Material::Mesh(MeshMaterial::vertex_colored()));
    assert_eq!(first.geometry.face_count(), 2);
    assert_relative_eq!(first.scale, 0.75);

    let fallback = Material::Mesh(MeshMaterial::lambert(Color(0xff6b6b)));
    for viewer in &grid.viewers()[1..] {
        assert_eq!(viewer.scene.objects().next().unwrap().material, fallback);
    }
}
