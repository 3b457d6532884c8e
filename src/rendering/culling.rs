/// Coarse pre-projection rejection of triangles facing away from the camera.
///
/// The facing test averages positions together with normals and compares
/// the result against world backward. Triangles whose vertices all lie
/// beyond the far clip distance from the origin are dropped as well.
use glam::DVec3;
use rayon::prelude::*;
use tracing::debug;

use super::projection_properties::ProjectionProperties;
use crate::count_add;
use crate::geometry::RenderTriangle3D;

/// Direction the camera looks along
pub const WORLD_BACKWARD: DVec3 = DVec3::NEG_Z;

#[derive(Default)]
pub struct BackfaceCullingEngine {
    registered: Vec<RenderTriangle3D>,
    keep: Vec<bool>,
}

impl BackfaceCullingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_batch(&mut self, reserve: usize) {
        self.registered.clear();
        self.keep.clear();
        self.registered.reserve(reserve);
        self.keep.reserve(reserve);
    }

    pub fn register_render_triangle(&mut self, triangle: RenderTriangle3D) {
        self.registered.push(triangle);
        self.keep.push(true);
    }

    /// Computes the keep flag of every registered triangle
    pub fn cull(&mut self, props: &ProjectionProperties) {
        let sqr_far = props.sqr_far_clip();
        self.registered
            .par_iter()
            .zip(self.keep.par_iter_mut())
            .for_each(|(tri, keep)| {
                *keep = Self::is_front_facing(tri) && !Self::is_beyond_far_clip(tri, sqr_far);
            });

        let culled = self.keep.iter().filter(|&&k| !k).count();
        count_add!(triangles_backface_culled, culled as u64);
        debug!(registered = self.registered.len(), culled, "backface culling finished");
    }

    /// Kept triangles in registration order
    pub fn finish(&mut self) -> Vec<RenderTriangle3D> {
        let keep = std::mem::take(&mut self.keep);
        std::mem::take(&mut self.registered)
            .into_iter()
            .zip(keep)
            .filter_map(|(tri, keep)| keep.then_some(tri))
            .collect()
    }

    #[inline]
    pub fn is_front_facing(tri: &RenderTriangle3D) -> bool {
        let sum = tri.a.pos_ws + tri.a.normal + tri.b.pos_ws + tri.b.normal + tri.c.pos_ws + tri.c.normal;
        let average = sum / 3.0;
        average.dot(WORLD_BACKWARD) > 0.0
    }

    #[inline]
    fn is_beyond_far_clip(tri: &RenderTriangle3D, sqr_far: f64) -> bool {
        tri.vertices()
            .iter()
            .all(|v| v.pos_ws.length_squared() > sqr_far)
    }
}
