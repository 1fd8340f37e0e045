//! The comparison grid: a pool of viewports over the page containers, grouped into
//! rows with synchronized cameras, fed by the asset pipeline
//!
//! All viewer state lives on the thread that owns the grid. Model decoding happens
//! on the rayon pool and finished loads are applied when the host calls
//! [`ViewerGrid::pump`], [`ViewerGrid::tick`] or [`ViewerGrid::wait_for_loads`].

use crate::camera::{Camera, CameraPose};
use crate::config::GridConfig;
use crate::controls::{ChangeOrigin, OrbitControls};
use crate::framework::{Framework, ModelPathList, COLUMNS};
use crate::layout::{Container, PageLayout, TabBar};
use crate::pipeline::{self, AssetPipeline, LoadCompletion};
use crate::scene::{Light, Scene};
use crate::surface::{RenderSurface, SurfaceFactory};
use crate::sync::CameraSync;
use slamview_core::Point3f;
use slamview_io::AssetSource;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// One viewport: a scene seen through a camera, drawn onto a surface
pub struct Viewer {
    /// Container slot, zero based
    pub slot: usize,
    /// Comparison row
    pub scene_index: usize,
    /// Column within the row
    pub viewer_index: usize,
    pub scene: Scene,
    pub camera: Camera,
    pub controls: OrbitControls,
    pub surface: Box<dyn RenderSurface>,
}

impl Viewer {
    fn new(slot: usize, container: &Container, surface: Box<dyn RenderSurface>, config: &GridConfig) -> Self {
        let mut scene = Scene::new(config.background);
        for light in Light::default_rig() {
            scene.add(light);
        }

        let camera_config = &config.camera;
        let aspect_ratio = if container.height > 0 {
            container.width as f32 / container.height as f32
        } else {
            1.0
        };
        let mut camera = Camera::new(camera_config.fov_degrees, aspect_ratio, camera_config.near, camera_config.far);
        camera.position = Point3f::new(0.0, 0.0, camera_config.initial_distance);

        Self {
            slot,
            scene_index: slot / COLUMNS,
            viewer_index: slot % COLUMNS,
            scene,
            camera,
            controls: OrbitControls::new(Point3f::origin(), camera_config.damping_factor),
            surface,
        }
    }

    pub fn pose(&self) -> CameraPose {
        self.controls.pose(&self.camera)
    }

    /// Move to `pose` as a programmatic change
    pub fn apply_pose(&mut self, pose: &CameraPose) {
        self.controls.set_pose(&mut self.camera, pose);
    }

    /// Advance the controls by one frame
    pub fn update_controls(&mut self) -> Option<ChangeOrigin> {
        self.controls.update(&mut self.camera)
    }

    /// Put the camera at `(r, r / 2, r)` aimed at the origin
    pub fn reset_camera(&mut self, radius: f32) {
        self.controls.stop();
        self.controls.target = Point3f::origin();
        self.camera.position = Point3f::new(radius, radius / 2.0, radius);
        self.camera.look_at(&self.controls.target);
        self.controls.update(&mut self.camera);
    }
}

pub struct ViewerGrid {
    config: GridConfig,
    layout: PageLayout,
    tabs: TabBar,
    viewers: Vec<Viewer>,
    sync: CameraSync,
    pipeline: AssetPipeline,
    framework: Framework,
}

impl ViewerGrid {
    /// Build one viewer per present container; missing containers leave gaps
    pub fn new(
        config: GridConfig,
        mut layout: PageLayout,
        tabs: TabBar,
        source: Arc<dyn AssetSource>,
        factory: &mut dyn SurfaceFactory,
    ) -> Self {
        let pixel_ratio = layout.device_pixel_ratio.min(config.max_pixel_ratio);
        let slots: Vec<usize> = layout.containers().map(|(slot, _)| slot).collect();

        let mut viewers = Vec::with_capacity(slots.len());
        let mut sync = CameraSync::new();
        for slot in slots {
            let Some(container) = layout.container(slot) else {
                continue;
            };
            let mut surface = factory.create_surface(container);
            surface.set_pixel_ratio(pixel_ratio);
            surface.set_size(container.width, container.height);
            let viewer = Viewer::new(slot, container, surface, &config);

            if let Some(container) = layout.container_mut(slot) {
                container.has_surface = true;
            }
            sync.register(viewers.len(), slot);
            viewers.push(viewer);
        }

        log::info!("Created {} viewports at pixel ratio {}", viewers.len(), pixel_ratio);

        let framework = config.default_framework;
        Self {
            config,
            layout,
            tabs,
            viewers,
            sync,
            pipeline: AssetPipeline::new(source),
            framework,
        }
    }

    /// Activate the default framework's tab and load its models
    pub fn start(&mut self) {
        let framework = self.config.default_framework;
        if let Some(index) = self.tabs.position(framework.as_str()) {
            self.tabs.activate(index);
        }
        self.load_framework(framework.as_str());
    }

    /// Relabel the captions and load the models of `selector`; unknown selectors load
    /// the default framework
    pub fn load_framework(&mut self, selector: &str) -> Framework {
        let framework = Framework::resolve(selector);
        if Framework::from_selector(selector).is_none() {
            log::debug!("Unknown framework '{}', using {}", selector, framework);
        }
        log::info!("Loading {} models", framework);

        self.update_labels(framework);
        self.load_paths(framework, &framework.model_paths());
        framework
    }

    /// Replace every scene's content with the models in `paths`
    pub fn load_paths(&mut self, framework: Framework, paths: &ModelPathList) {
        self.framework = framework;
        let generation = self.pipeline.begin();
        log::debug!("Starting load generation {}", generation);

        for (index, viewer) in self.viewers.iter_mut().enumerate() {
            viewer.scene.clear_except_lights();
            match paths.get(viewer.slot).cloned().flatten() {
                Some(path) => self.pipeline.request(index, path),
                None => {
                    log::debug!(
                        "No model for {}, showing {} cube",
                        Container::id_for_slot(viewer.slot),
                        self.config.fallback_color
                    );
                    viewer.scene.add(pipeline::fallback_object(&self.config));
                }
            }
        }
    }

    /// Write the column captions of `framework`; returns how many were written
    pub fn update_labels(&mut self, framework: Framework) -> usize {
        let labels = framework.labels();
        let slots: Vec<usize> = self.layout.containers().map(|(slot, _)| slot).collect();
        slots
            .into_iter()
            .filter(|&slot| self.layout.set_caption(slot, labels[slot % COLUMNS]))
            .count()
    }

    /// Handle a click on tab `index`
    pub fn select_tab(&mut self, index: usize) -> Option<Framework> {
        let selector = self.tabs.activate(index)?.to_string();
        Some(self.load_framework(&selector))
    }

    /// Apply every load that has finished; returns how many were applied
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Some(completion) = self.pipeline.try_next() {
            self.apply_completion(completion);
            applied += 1;
        }
        applied
    }

    /// Block until the current batch has been applied or `timeout` passes
    pub fn wait_for_loads(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.pipeline.pending() > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.pipeline.next_timeout(remaining) {
                Some(completion) => self.apply_completion(completion),
                None => return false,
            }
        }
        true
    }

    fn apply_completion(&mut self, completion: LoadCompletion) {
        let policy = self.framework.render_policy();
        let Some(viewer) = self.viewers.get_mut(completion.viewer) else {
            return;
        };

        match completion.result {
            Ok(geometry) => {
                log::debug!(
                    "Loaded {} into {} ({} vertices, {} faces)",
                    completion.path,
                    Container::id_for_slot(viewer.slot),
                    geometry.vertex_count(),
                    geometry.face_count()
                );
                let object = pipeline::build_object(geometry, policy, &self.config);
                viewer.scene.add(object);
                viewer.reset_camera(self.config.camera.reset_radius);
            }
            Err(e) => {
                log::error!("Failed to load {}: {}", completion.path, e);
                viewer.scene.add(pipeline::fallback_object(&self.config));
            }
        }
    }

    /// Advance controls and draw every visible viewer; returns how many were drawn
    pub fn render_frame(&mut self) -> usize {
        let mut rendered = 0;
        for index in 0..self.viewers.len() {
            if !self.layout.is_visible(self.viewers[index].slot) {
                continue;
            }

            if let Some(origin) = self.viewers[index].update_controls() {
                self.sync.on_change(index, origin, &mut self.viewers);
            }

            let viewer = &mut self.viewers[index];
            match viewer.surface.render(&viewer.scene, &viewer.camera) {
                Ok(()) => rendered += 1,
                Err(e) => log::error!("Render failed for {}: {}", Container::id_for_slot(viewer.slot), e),
            }
        }
        rendered
    }

    /// Apply finished loads, then render a frame
    pub fn tick(&mut self) -> usize {
        self.pump();
        self.render_frame()
    }

    /// Tick at the configured frame interval while `keep_running` says so; returns the
    /// number of frames run
    pub fn run<F>(&mut self, mut keep_running: F) -> u64
    where
        F: FnMut(&ViewerGrid) -> bool,
    {
        let interval = Duration::from_millis(self.config.frame_interval_ms);
        let mut frames = 0;
        while keep_running(self) {
            let started = Instant::now();
            self.tick();
            frames += 1;
            if let Some(rest) = interval.checked_sub(started.elapsed()) {
                std::thread::sleep(rest);
            }
        }
        frames
    }

    /// Resync camera aspect and surface size with the containers of visible viewers
    pub fn handle_resize(&mut self) {
        for viewer in &mut self.viewers {
            let Some(container) = self.layout.container(viewer.slot) else {
                continue;
            };
            if !container.visible {
                continue;
            }
            viewer.camera.set_viewport_size(container.width, container.height);
            viewer.surface.set_size(container.width, container.height);
        }
    }

    /// Orbit the viewer in `slot`; returns the viewers synced to it
    pub fn rotate(&mut self, slot: usize, left: f32, up: f32) -> Vec<usize> {
        self.interact(slot, |controls| controls.rotate(left, up))
    }

    /// Dolly the viewer in `slot`; positive steps move in
    pub fn zoom(&mut self, slot: usize, steps: f32) -> Vec<usize> {
        self.interact(slot, |controls| controls.zoom(steps))
    }

    pub fn pan(&mut self, slot: usize, right: f32, up: f32) -> Vec<usize> {
        self.interact(slot, |controls| controls.pan(right, up))
    }

    fn interact<F: FnOnce(&mut OrbitControls)>(&mut self, slot: usize, input: F) -> Vec<usize> {
        let Some(index) = self.viewers.iter().position(|v| v.slot == slot) else {
            return Vec::new();
        };
        input(&mut self.viewers[index].controls);
        match self.viewers[index].update_controls() {
            Some(origin) => self.sync.on_change(index, origin, &mut self.viewers),
            None => Vec::new(),
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    /// Page access for hosts changing container sizes or visibility
    pub fn layout_mut(&mut self) -> &mut PageLayout {
        &mut self.layout
    }

    pub fn tabs(&self) -> &TabBar {
        &self.tabs
    }

    /// Framework of the current load batch
    pub fn framework(&self) -> Framework {
        self.framework
    }

    pub fn viewers(&self) -> &[Viewer] {
        &self.viewers
    }

    pub fn viewer_for_slot(&self, slot: usize) -> Option<&Viewer> {
        self.viewers.iter().find(|v| v.slot == slot)
    }

    pub fn sync(&self) -> &CameraSync {
        &self.sync
    }

    pub fn pipeline(&self) -> &AssetPipeline {
        &self.pipeline
    }

    /// Render surfaces of all viewers, in slot order
    pub fn surfaces(&self) -> impl Iterator<Item = &dyn RenderSurface> {
        self.viewers.iter().map(|v| v.surface.as_ref())
    }
}
