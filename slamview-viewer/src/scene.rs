//! Minimal scene graph: lights plus drawable objects

use crate::material::{Color, Material, MeshMaterial, PointsMaterial};
use slamview_core::{BoundingBox, Geometry, Point3f, Transform3D, Vector3f};

#[derive(Debug, Clone, PartialEq)]
pub enum Light {
    Ambient { color: Color, intensity: f32 },
    Directional { color: Color, intensity: f32, position: Point3f },
}

impl Light {
    /// One ambient light and two opposing directional lights
    pub fn default_rig() -> [Light; 3] {
        [
            Light::Ambient { color: Color::WHITE, intensity: 0.8 },
            Light::Directional {
                color: Color::WHITE,
                intensity: 0.4,
                position: Point3f::new(5.0, 5.0, 5.0),
            },
            Light::Directional {
                color: Color::WHITE,
                intensity: 0.4,
                position: Point3f::new(-5.0, 5.0, -5.0),
            },
        ]
    }
}

/// A geometry drawn with a material under a position and uniform scale
#[derive(Debug, Clone)]
pub struct Object3D {
    pub geometry: Geometry,
    pub material: Material,
    pub position: Vector3f,
    pub scale: f32,
}

impl Object3D {
    /// A triangle surface
    pub fn mesh(geometry: Geometry, material: MeshMaterial) -> Self {
        Self::new(geometry, Material::Mesh(material))
    }

    /// A point primitive
    pub fn points(geometry: Geometry, material: PointsMaterial) -> Self {
        Self::new(geometry, Material::Points(material))
    }

    fn new(geometry: Geometry, material: Material) -> Self {
        Self {
            geometry,
            material,
            position: Vector3f::zeros(),
            scale: 1.0,
        }
    }

    pub fn is_points(&self) -> bool {
        matches!(self.material, Material::Points(_))
    }

    pub fn world_transform(&self) -> Transform3D {
        Transform3D::translation(self.position) * Transform3D::uniform_scaling(self.scale)
    }

    /// Bounds in world space, `None` for an empty geometry
    pub fn world_bounds(&self) -> Option<BoundingBox> {
        let local = self
            .geometry
            .bounding_box
            .or_else(|| BoundingBox::from_points(&self.geometry.positions))?;
        Some(self.world_transform().transform_box(&local))
    }
}

#[derive(Debug, Clone)]
pub enum SceneNode {
    Light(Light),
    Object(Object3D),
}

impl SceneNode {
    pub fn is_light(&self) -> bool {
        matches!(self, SceneNode::Light(_))
    }
}

impl From<Light> for SceneNode {
    fn from(light: Light) -> Self {
        SceneNode::Light(light)
    }
}

impl From<Object3D> for SceneNode {
    fn from(object: Object3D) -> Self {
        SceneNode::Object(object)
    }
}

#[derive(Debug, Clone)]
pub struct Scene {
    pub background: Color,
    children: Vec<SceneNode>,
}

impl Scene {
    pub fn new(background: Color) -> Self {
        Self {
            background,
            children: Vec::new(),
        }
    }

    pub fn add(&mut self, node: impl Into<SceneNode>) {
        self.children.push(node.into());
    }

    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    pub fn clear(&mut self) {
        self.children.clear();
    }

    /// Remove everything except lights, keeping the lights in their original order
    pub fn clear_except_lights(&mut self) {
        let keep: Vec<SceneNode> = self.children.iter().filter(|n| n.is_light()).cloned().collect();
        self.clear();
        for light in keep {
            self.add(light);
        }
    }

    pub fn lights(&self) -> impl Iterator<Item = &Light> {
        self.children.iter().filter_map(|n| match n {
            SceneNode::Light(light) => Some(light),
            SceneNode::Object(_) => None,
        })
    }

    pub fn objects(&self) -> impl Iterator<Item = &Object3D> {
        self.children.iter().filter_map(|n| match n {
            SceneNode::Object(object) => Some(object),
            SceneNode::Light(_) => None,
        })
    }

    pub fn traverse<F: FnMut(&SceneNode)>(&self, mut visit: F) {
        for node in &self.children {
            visit(node);
        }
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}
