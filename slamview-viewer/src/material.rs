//! Colors and materials

use serde::{Deserialize, Serialize};

/// A 24-bit RGB color written as `0xRRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    pub const WHITE: Color = Color(0xffffff);
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

/// Which triangle faces are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Front,
    Double,
}

/// Lighting model for surface materials
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shading {
    /// Unlit, color only
    Basic,
    /// Diffuse lighting from the scene lights
    Lambert,
}

/// Material for triangle surfaces
#[derive(Debug, Clone, PartialEq)]
pub struct MeshMaterial {
    pub shading: Shading,
    pub color: Color,
    pub vertex_colors: bool,
    pub side: Side,
}

impl MeshMaterial {
    /// Unlit material taking colors from the geometry's color buffer
    pub fn vertex_colored() -> Self {
        Self {
            shading: Shading::Basic,
            color: Color::WHITE,
            vertex_colors: true,
            side: Side::Double,
        }
    }

    /// Unlit single-color material
    pub fn flat(color: Color) -> Self {
        Self {
            shading: Shading::Basic,
            color,
            vertex_colors: false,
            side: Side::Double,
        }
    }

    /// Lit single-color material, front faces only
    pub fn lambert(color: Color) -> Self {
        Self {
            shading: Shading::Lambert,
            color,
            vertex_colors: false,
            side: Side::Front,
        }
    }
}

/// Material for point primitives
#[derive(Debug, Clone, PartialEq)]
pub struct PointsMaterial {
    pub size: f32,
    /// Shrink points with distance from the camera
    pub size_attenuation: bool,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    Mesh(MeshMaterial),
    Points(PointsMaterial),
}
