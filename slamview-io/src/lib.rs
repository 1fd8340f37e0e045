//! Model file loading for slamview
//!
//! This crate decodes model files into [`Geometry`] records and provides the
//! [`AssetSource`] abstraction the viewer grid loads through.

pub mod ply;
pub mod source;

pub use ply::PlyReader;
pub use source::{AssetSource, FileAssetSource, MemoryAssetSource};

use slamview_core::{Error, Geometry, Result};
use std::path::Path;

/// Trait for reading geometry from files
pub trait GeometryReader {
    fn read_geometry<P: AsRef<Path>>(path: P) -> Result<Geometry>;
}

/// Auto-detect format from the extension and read a geometry
pub fn read_geometry<P: AsRef<Path>>(path: P) -> Result<Geometry> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("ply") => PlyReader::read_geometry(path),
        _ => Err(Error::UnsupportedFormat(
            format!("Unsupported model format: {:?}", path.extension())
        )),
    }
}
