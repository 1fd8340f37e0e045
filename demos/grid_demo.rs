//! Grid demo
//!
//! Builds a full twelve-container page over headless surfaces, loads a framework's
//! reconstructions from an asset root, optionally switches to a second framework,
//! orbits the first viewport and logs what every viewport drew.

use anyhow::{Context, Result};
use clap::Parser;
use slamview_io::FileAssetSource;
use slamview_viewer::{
    Container, Framework, GridConfig, HeadlessSurfaceFactory, PageLayout, TabBar, ViewerGrid,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[clap(about = "Render the SLAM comparison grid headlessly")]
struct Args {
    /// Directory containing `static/mesh/...`
    #[clap(short, long)]
    asset_root: Option<PathBuf>,
    /// JSON file with grid settings
    #[clap(short, long)]
    config: Option<PathBuf>,
    /// Framework to load first: ESLAM, NICE-SLAM or SplaTAM
    #[clap(short, long)]
    framework: Option<String>,
    /// Framework tab to activate after the first load
    #[clap(long)]
    switch_to: Option<String>,
    #[clap(long, default_value_t = 60)]
    frames: u64,
    #[clap(short = 'W', long, default_value_t = 320)]
    width: u32,
    #[clap(short = 'H', long, default_value_t = 240)]
    height: u32,
    #[clap(long, default_value_t = 2.0)]
    pixel_ratio: f32,
    /// Seconds to wait for each batch of loads
    #[clap(long, default_value_t = 60)]
    timeout: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GridConfig::from_json_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => GridConfig::default(),
    };
    if let Some(root) = args.asset_root {
        config.asset_root = root;
    }
    if let Some(selector) = &args.framework {
        config.default_framework = Framework::resolve(selector);
    }

    let source = Arc::new(FileAssetSource::new(config.asset_root.clone()));
    let layout = PageLayout::full(args.width, args.height, args.pixel_ratio);
    let timeout = Duration::from_secs(args.timeout);

    let mut grid = ViewerGrid::new(config, layout, TabBar::for_frameworks(), source, &mut HeadlessSurfaceFactory::new());
    grid.start();
    if !grid.wait_for_loads(timeout) {
        log::warn!("{} loads still pending after {:?}", grid.pipeline().pending(), timeout);
    }

    if let Some(selector) = &args.switch_to {
        match grid.tabs().position(selector) {
            Some(index) => {
                grid.select_tab(index);
                if !grid.wait_for_loads(timeout) {
                    log::warn!("{} loads still pending after {:?}", grid.pipeline().pending(), timeout);
                }
            }
            None => log::warn!("No tab for '{}'", selector),
        }
    }

    grid.rotate(0, 0.4, 0.1);
    let total = args.frames;
    let frames = grid.run(|grid| grid.surfaces().next().map_or(0, |s| s.info().frames) < total);
    log::info!("Ran {} frames showing {}", frames, grid.framework());

    for viewer in grid.viewers() {
        let info = viewer.surface.info();
        log::info!(
            "{} [{}]: {} draw calls, {} triangles, {} points, {} in view",
            Container::id_for_slot(viewer.slot),
            grid.layout().caption(viewer.slot).unwrap_or("-"),
            info.draw_calls,
            info.triangles,
            info.points,
            info.objects_in_view
        );
    }
    if grid.pipeline().stale_discarded() > 0 {
        log::info!("Discarded {} stale loads", grid.pipeline().stale_discarded());
    }

    Ok(())
}
