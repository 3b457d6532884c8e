/// Procedural meshes for demos, benches and tests
use std::sync::Arc;

use glam::{DMat4, DVec2, DVec3};

use super::vertex::{RenderTriangle3D, Vertex};
use crate::rendering::{Color, Material};

/// Face directions with a (tangent, bitangent) pair whose cross product is the normal
const CUBE_FACES: [(DVec3, DVec3, DVec3); 6] = [
    (DVec3::X, DVec3::NEG_Z, DVec3::Y),
    (DVec3::NEG_X, DVec3::Z, DVec3::Y),
    (DVec3::Y, DVec3::X, DVec3::NEG_Z),
    (DVec3::NEG_Y, DVec3::X, DVec3::Z),
    (DVec3::Z, DVec3::X, DVec3::Y),
    (DVec3::NEG_Z, DVec3::NEG_X, DVec3::Y),
];

/// Two triangles spanning the parallelogram `origin`, `origin + u`, `origin + u + v`, `origin + v`.
/// Counter-clockwise when seen from the side `u x v` points to.
pub fn quad(
    origin: DVec3,
    u: DVec3,
    v: DVec3,
    color: Color,
    material: Option<Arc<Material>>,
) -> [RenderTriangle3D; 2] {
    let normal = u.cross(v).normalize_or_zero();
    let corner = |pos: DVec3, uv: DVec2| Vertex::new(pos, uv, normal).with_color(color);

    let p0 = corner(origin, DVec2::new(0.0, 0.0));
    let p1 = corner(origin + u, DVec2::new(1.0, 0.0));
    let p2 = corner(origin + u + v, DVec2::new(1.0, 1.0));
    let p3 = corner(origin + v, DVec2::new(0.0, 1.0));

    let mut first = RenderTriangle3D::new(p0, p1, p2);
    let mut second = RenderTriangle3D::new(p0, p2, p3);
    first.material = material.clone();
    second.material = material;
    [first, second]
}

/// Axis-aligned cube with outward-facing, counter-clockwise faces
pub fn cube(center: DVec3, size: f64, material: Option<Arc<Material>>) -> Vec<RenderTriangle3D> {
    let h = size * 0.5;
    CUBE_FACES
        .iter()
        .enumerate()
        .flat_map(|(i, &(normal, u, v))| {
            let origin = center + (normal - u - v) * h;
            quad(origin, u * size, v * size, face_color(i), material.clone())
        })
        .collect()
}

fn face_color(face: usize) -> Color {
    match face {
        0 => Color::rgb(230.0, 80.0, 80.0),
        1 => Color::rgb(80.0, 230.0, 80.0),
        2 => Color::rgb(80.0, 80.0, 230.0),
        3 => Color::rgb(230.0, 230.0, 80.0),
        4 => Color::rgb(80.0, 230.0, 230.0),
        _ => Color::rgb(230.0, 80.0, 230.0),
    }
}

/// Applies `transform` to positions and normals of every triangle
pub fn transform_triangles(triangles: &mut [RenderTriangle3D], transform: &DMat4) {
    for tri in triangles {
        for v in [&mut tri.a, &mut tri.b, &mut tri.c] {
            v.pos_ws = transform.transform_point3(v.pos_ws);
            v.normal = transform.transform_vector3(v.normal).normalize_or_zero();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_twelve_outward_triangles() {
        let tris = cube(DVec3::new(0.0, 0.0, -10.0), 2.0, None);
        assert_eq!(tris.len(), 12);

        let center = DVec3::new(0.0, 0.0, -10.0);
        for tri in &tris {
            let geometric = (tri.b.pos_ws - tri.a.pos_ws).cross(tri.c.pos_ws - tri.a.pos_ws);
            let centroid = (tri.a.pos_ws + tri.b.pos_ws + tri.c.pos_ws) / 3.0;
            assert!(geometric.dot(centroid - center) > 0.0, "face winding must point outward");
            assert!(geometric.normalize().dot(tri.a.normal) > 0.999);
        }
    }

    #[test]
    fn cube_vertices_lie_on_surface() {
        let tris = cube(DVec3::ZERO, 4.0, None);
        for tri in &tris {
            for v in tri.vertices() {
                assert!((v.pos_ws.abs().max_element() - 2.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn quad_shares_material() {
        let material = Arc::new(Material::vertex_colored());
        let [a, b] = quad(DVec3::ZERO, DVec3::X, DVec3::Y, Color::WHITE, Some(material.clone()));
        assert!(Arc::ptr_eq(a.material.as_ref().unwrap(), &material));
        assert!(Arc::ptr_eq(b.material.as_ref().unwrap(), &material));
        assert_eq!(a.a.normal, DVec3::Z);
    }
}
