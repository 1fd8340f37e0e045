//! Grid configuration

use crate::framework::Framework;
use crate::material::Color;
use serde::{Deserialize, Serialize};
use slamview_core::{Error, Result};
use std::path::{Path, PathBuf};

/// Camera defaults for every viewport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Distance along +Z before any model is loaded
    pub initial_distance: f32,
    /// Camera lands at `(r, r / 2, r)` after a model loads
    pub reset_radius: f32,
    pub damping_factor: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            near: 0.01,
            far: 100.0,
            initial_distance: 2.0,
            reset_radius: 2.5,
            damping_factor: 0.05,
        }
    }
}

/// Tunables for the asset pipeline and rendering policies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Directory the `./static/...` model paths are resolved against
    pub asset_root: PathBuf,
    pub default_framework: Framework,
    /// Largest bounding-box dimension after normalization
    pub target_size: f32,
    /// Vertex cap for point-cloud rendering
    pub max_points: usize,
    pub point_size: f32,
    pub point_color: Color,
    /// Surface color for geometry without vertex colors
    pub mesh_color: Color,
    /// Color of the placeholder cube shown for missing or failed models
    pub fallback_color: Color,
    pub background: Color,
    /// Upper bound on the device pixel ratio used for surfaces
    pub max_pixel_ratio: f32,
    pub frame_interval_ms: u64,
    pub camera: CameraConfig,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("."),
            default_framework: Framework::DEFAULT,
            target_size: 1.5,
            max_points: 300_000,
            point_size: 0.004,
            point_color: Color(0x4444ff),
            mesh_color: Color(0x8888aa),
            fallback_color: Color(0xff6b6b),
            background: Color::WHITE,
            max_pixel_ratio: 1.5,
            frame_interval_ms: 16,
            camera: CameraConfig::default(),
        }
    }
}

impl GridConfig {
    /// Load a JSON config; missing fields take their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::InvalidData(format!("invalid config: {}", e)))
    }
}
