//! The compared SLAM frameworks and their per-framework data: model paths,
//! column captions and rendering policy

use crate::layout::MAX_CONTAINERS;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Viewports per comparison row
pub const COLUMNS: usize = 4;

/// Scene ids of the three comparison rows
pub const SCENES: [&str; 3] = ["0080", "0112", "0146"];

/// Model variants shown in the first three columns; the fourth is ground truth
const VARIANTS: [&str; 3] = ["Kinect", "PDNet", "Ours"];

/// One optional model path per viewport slot
pub type ModelPathList = [Option<String>; MAX_CONTAINERS];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Framework {
    #[serde(rename = "ESLAM")]
    Eslam,
    #[serde(rename = "NICE-SLAM")]
    NiceSlam,
    #[serde(rename = "SplaTAM")]
    SplaTam,
}

/// How loaded geometry is turned into a drawable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPolicy {
    /// Shaded double-sided triangles
    Surface,
    /// Uniformly colored points, downsampled past a vertex cap
    PointCloud,
}

impl Framework {
    pub const ALL: [Framework; 3] = [Framework::Eslam, Framework::NiceSlam, Framework::SplaTam];

    pub const DEFAULT: Framework = Framework::Eslam;

    pub fn as_str(&self) -> &'static str {
        match self {
            Framework::Eslam => "ESLAM",
            Framework::NiceSlam => "NICE-SLAM",
            Framework::SplaTam => "SplaTAM",
        }
    }

    /// Exact match on the selector string carried by a tab
    pub fn from_selector(selector: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|fw| fw.as_str() == selector)
    }

    /// Like [`Framework::from_selector`], falling back to [`Framework::DEFAULT`]
    pub fn resolve(selector: &str) -> Self {
        Self::from_selector(selector).unwrap_or(Self::DEFAULT)
    }

    pub fn render_policy(&self) -> RenderPolicy {
        match self {
            Framework::SplaTam => RenderPolicy::PointCloud,
            Framework::Eslam | Framework::NiceSlam => RenderPolicy::Surface,
        }
    }

    /// Captions for the four columns of every row
    pub fn labels(&self) -> [&'static str; COLUMNS] {
        match self {
            Framework::Eslam => ["ESLAM", "ESLAM (w/ PDNet)", "ESLAM (w/ Ours)", "Ground Truth"],
            Framework::NiceSlam => [
                "NICE-SLAM",
                "NICE-SLAM (w/ PDNet)",
                "NICE-SLAM (w/ Ours)",
                "Ground Truth",
            ],
            Framework::SplaTam => [
                "SplaTAM",
                "SplaTAM (w/ PDNet)",
                "SplaTAM (w/ Ours)",
                "Ground Truth",
            ],
        }
    }

    /// Model path for a row and column.
    ///
    /// Ground truth always comes from the ESLAM directory; SplaTAM outputs carry an
    /// `aligned` infix.
    pub fn model_path(&self, scene: &str, column: usize) -> Option<String> {
        if column == COLUMNS - 1 {
            return Some(format!("./static/mesh/ESLAM/{}_GT.ply", scene));
        }
        let variant = VARIANTS.get(column)?;
        let path = match self {
            Framework::SplaTam => format!("./static/mesh/SplaTAM/{}_aligned_{}.ply", scene, variant),
            _ => format!("./static/mesh/{}/{}_{}.ply", self.as_str(), scene, variant),
        };
        Some(path)
    }

    /// Paths for all slots, row by row
    pub fn model_paths(&self) -> ModelPathList {
        std::array::from_fn(|slot| {
            let scene = SCENES.get(slot / COLUMNS)?;
            self.model_path(scene, slot % COLUMNS)
        })
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model paths for a tab selector, unknown selectors resolving to the default
pub fn resolve_paths(selector: &str) -> ModelPathList {
    Framework::resolve(selector).model_paths()
}

/// Column captions for a tab selector, unknown selectors resolving to the default
pub fn resolve_labels(selector: &str) -> [&'static str; COLUMNS] {
    Framework::resolve(selector).labels()
}
