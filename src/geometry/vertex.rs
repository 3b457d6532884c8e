/// Caller-facing geometry submitted to the renderer each frame
use std::sync::Arc;

use glam::{DVec2, DVec3};

use crate::rendering::{Color, Material};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Vertex {
    pub pos_ws: DVec3,
    pub pos_uv: DVec2,
    pub normal: DVec3,
    pub color: Color,
}

impl Vertex {
    pub fn new(pos_ws: DVec3, pos_uv: DVec2, normal: DVec3) -> Self {
        Self {
            pos_ws,
            pos_uv,
            normal,
            color: Color::WHITE,
        }
    }

    pub fn at(pos_ws: DVec3) -> Self {
        Self::new(pos_ws, DVec2::ZERO, DVec3::ZERO)
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Self::at(DVec3::ZERO)
    }
}

/// Three vertices and an optional shared material.
/// Counter-clockwise winding (y up) faces the camera.
#[derive(Clone, Debug, Default)]
pub struct RenderTriangle3D {
    pub a: Vertex,
    pub b: Vertex,
    pub c: Vertex,
    pub material: Option<Arc<Material>>,
}

impl RenderTriangle3D {
    pub fn new(a: Vertex, b: Vertex, c: Vertex) -> Self {
        Self {
            a,
            b,
            c,
            material: None,
        }
    }

    pub fn with_material(mut self, material: Arc<Material>) -> Self {
        self.material = Some(material);
        self
    }

    pub fn from_positions(a: DVec3, b: DVec3, c: DVec3) -> Self {
        Self::new(Vertex::at(a), Vertex::at(b), Vertex::at(c))
    }

    /// Same triangle moved by `offset`
    pub fn translated(&self, offset: DVec3) -> Self {
        let mut moved = self.clone();
        moved.a.pos_ws += offset;
        moved.b.pos_ws += offset;
        moved.c.pos_ws += offset;
        moved
    }

    pub fn vertices(&self) -> [&Vertex; 3] {
        [&self.a, &self.b, &self.c]
    }
}
