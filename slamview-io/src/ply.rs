//! PLY format support

use crate::GeometryReader;
use slamview_core::{Error, Geometry, Point3f, Result, Rgb8, Vector3f};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use ply_rs::{
    parser::Parser,
    ply::{DefaultElement, Property},
};

pub struct PlyReader;

impl GeometryReader for PlyReader {
    fn read_geometry<P: AsRef<Path>>(path: P) -> Result<Geometry> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        PlyReader::read_from(&mut reader)
    }
}

impl PlyReader {
    /// Decode an ASCII or binary PLY stream.
    ///
    /// Positions are required. Normals and colors are kept only when every vertex
    /// carries them. Polygon faces are fan-triangulated; a file without a face
    /// element yields an unindexed point set.
    pub fn read_from<R: BufRead>(reader: &mut R) -> Result<Geometry> {
        let parser = Parser::<DefaultElement>::new();
        let ply = parser.read_ply(reader)?;

        let vertex_element = ply
            .payload
            .get("vertex")
            .ok_or_else(|| Error::InvalidData("PLY file has no vertex element".to_string()))?;

        let mut positions = Vec::with_capacity(vertex_element.len());
        for vertex in vertex_element {
            let x = extract_property_value(vertex, "x")?;
            let y = extract_property_value(vertex, "y")?;
            let z = extract_property_value(vertex, "z")?;
            positions.push(Point3f::new(x, y, z));
        }

        let mut geometry = Geometry::from_positions(positions);

        if let Some(normals) = collect_all(vertex_element, extract_normal) {
            geometry.set_normals(normals);
        }
        if let Some(colors) = collect_all(vertex_element, extract_color) {
            geometry.set_colors(colors);
        }

        if let Some(face_element) = ply.payload.get("face") {
            let mut faces = Vec::with_capacity(face_element.len());
            for face in face_element {
                let indices = extract_face_indices(face)?;
                // Fan triangulation: (0, i, i + 1)
                for i in 1..indices.len().saturating_sub(1) {
                    faces.push([indices[0], indices[i], indices[i + 1]]);
                }
            }
            if !faces.is_empty() {
                geometry.set_index(Some(faces));
            }
        }

        Ok(geometry)
    }
}

/// Map every vertex through `extract`, or `None` if any vertex lacks the attribute
fn collect_all<T>(
    vertices: &[DefaultElement],
    extract: impl Fn(&DefaultElement) -> Option<T>,
) -> Option<Vec<T>> {
    if vertices.is_empty() {
        return None;
    }
    vertices.iter().map(extract).collect()
}

fn extract_normal(vertex: &DefaultElement) -> Option<Vector3f> {
    let nx = extract_property_value(vertex, "nx").ok()?;
    let ny = extract_property_value(vertex, "ny").ok()?;
    let nz = extract_property_value(vertex, "nz").ok()?;
    Some(Vector3f::new(nx, ny, nz))
}

fn extract_color(vertex: &DefaultElement) -> Option<Rgb8> {
    let channel = |names: [&str; 2]| {
        names
            .iter()
            .find_map(|name| vertex.get(*name))
            .and_then(color_channel)
    };
    Some([
        channel(["red", "diffuse_red"])?,
        channel(["green", "diffuse_green"])?,
        channel(["blue", "diffuse_blue"])?,
    ])
}

/// Integer channels are taken as 0-255, floating point channels as 0.0-1.0
fn color_channel(property: &Property) -> Option<u8> {
    match property {
        Property::UChar(v) => Some(*v),
        Property::Char(v) => Some((*v).max(0) as u8),
        Property::UShort(v) => Some((*v).min(255) as u8),
        Property::Short(v) => Some((*v).clamp(0, 255) as u8),
        Property::Int(v) => Some((*v).clamp(0, 255) as u8),
        Property::UInt(v) => Some((*v).min(255) as u8),
        Property::Float(v) => Some((v.clamp(0.0, 1.0) * 255.0).round() as u8),
        Property::Double(v) => Some((v.clamp(0.0, 1.0) * 255.0).round() as u8),
        _ => None,
    }
}

/// Extract a property value as f32 from a PLY element
fn extract_property_value(element: &DefaultElement, name: &str) -> Result<f32> {
    match element.get(name) {
        Some(Property::Float(val)) => Ok(*val),
        Some(Property::Double(val)) => Ok(*val as f32),
        Some(Property::Int(val)) => Ok(*val as f32),
        Some(Property::UInt(val)) => Ok(*val as f32),
        Some(Property::Short(val)) => Ok(*val as f32),
        Some(Property::UShort(val)) => Ok(*val as f32),
        Some(Property::Char(val)) => Ok(*val as f32),
        Some(Property::UChar(val)) => Ok(*val as f32),
        _ => Err(Error::InvalidData(
            format!("Property '{}' not found or invalid type", name)
        )),
    }
}

/// Extract face indices from a PLY face element
fn extract_face_indices(element: &DefaultElement) -> Result<Vec<usize>> {
    let to_index = |idx: i64| {
        usize::try_from(idx)
            .map_err(|_| Error::InvalidData(format!("Negative face index {}", idx)))
    };

    match element.get("vertex_indices").or_else(|| element.get("vertex_index")) {
        Some(Property::ListInt(indices)) => {
            indices.iter().map(|&idx| to_index(idx as i64)).collect()
        }
        Some(Property::ListUInt(indices)) => {
            Ok(indices.iter().map(|&idx| idx as usize).collect())
        }
        Some(Property::ListShort(indices)) => {
            indices.iter().map(|&idx| to_index(idx as i64)).collect()
        }
        Some(Property::ListUShort(indices)) => {
            Ok(indices.iter().map(|&idx| idx as usize).collect())
        }
        Some(Property::ListUChar(indices)) => {
            Ok(indices.iter().map(|&idx| idx as usize).collect())
        }
        _ => Err(Error::InvalidData(
            "Face indices not found".to_string()
        )),
    }
}
