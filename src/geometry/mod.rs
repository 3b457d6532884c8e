/// Input geometry: vertices, triangles, procedural meshes and boxes
pub mod bounding_box;
pub mod mesh;
pub mod vertex;

pub use bounding_box::BoundingBox;
pub use vertex::{RenderTriangle3D, Vertex};
