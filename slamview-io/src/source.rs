//! Asset sources the viewer grid loads model files through

use slamview_core::{Error, Geometry, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Something that can turn a model path into a decoded geometry.
///
/// Loads run on worker threads, so sources must be shareable.
pub trait AssetSource: Send + Sync {
    fn load(&self, path: &str) -> Result<Geometry>;
}

/// Reads model files relative to an asset root directory
#[derive(Debug, Clone)]
pub struct FileAssetSource {
    root: PathBuf,
}

impl FileAssetSource {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a page-relative path such as `./static/mesh/x.ply` against the root
    pub fn resolve(&self, path: &str) -> PathBuf {
        let relative = path.trim_start_matches("./");
        self.root.join(relative)
    }
}

impl AssetSource for FileAssetSource {
    fn load(&self, path: &str) -> Result<Geometry> {
        let full = self.resolve(path);
        log::debug!("Reading {}", full.display());

        crate::read_geometry(&full).map_err(|e| Error::Asset {
            path: path.to_string(),
            message: e.to_string(),
        })
    }
}

/// Serves geometry registered in memory under its path
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetSource {
    assets: HashMap<String, Geometry>,
}

impl MemoryAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<S: Into<String>>(&mut self, path: S, geometry: Geometry) {
        self.assets.insert(path.into(), geometry);
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl AssetSource for MemoryAssetSource {
    fn load(&self, path: &str) -> Result<Geometry> {
        self.assets.get(path).cloned().ok_or_else(|| Error::Asset {
            path: path.to_string(),
            message: "not found".to_string(),
        })
    }
}
