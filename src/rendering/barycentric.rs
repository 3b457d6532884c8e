/// Perspective-correct barycentric interpolation in screen space.
///
/// Weighting each vertex by its 1/w undoes the perspective distortion of a
/// plain screen-space blend. The weights depend only on (triangle, pixel), so
/// a `BerpCache` lets every attribute of one pixel reuse them.
use glam::DVec2;

use super::inter_render::InterRenderTriangle;
use crate::math::edge_function;

/// Weights shared across attribute lookups for one (triangle, pixel) pair
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BerpCache {
    initialized: bool,
    weights: [f64; 3],
}

impl BerpCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the weights, e.g. when moving on to the next pixel
    #[inline]
    pub fn invalidate(&mut self) {
        self.initialized = false;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn weights(&self) -> Option<[f64; 3]> {
        self.initialized.then_some(self.weights)
    }
}

pub struct BarycentricInterpolationEngine;

impl BarycentricInterpolationEngine {
    /// Interpolates the per-vertex values `v1`, `v2`, `v3` at `pos`.
    /// Computes the weights on the first call for a fresh cache and reuses them after.
    /// Points outside the triangle are not rejected; callers test containment first.
    #[inline]
    pub fn perspective_correct_cached(
        tri: &InterRenderTriangle,
        pos: DVec2,
        v1: f64,
        v2: f64,
        v3: f64,
        cache: &mut BerpCache,
    ) -> f64 {
        if !cache.initialized {
            cache.weights = Self::weights(tri, pos);
            cache.initialized = true;
        }
        let [w1, w2, w3] = cache.weights;
        v1 * w1 + v2 * w2 + v3 * w3
    }

    /// Uncached variant; recomputes the weights every call
    pub fn perspective_correct(tri: &InterRenderTriangle, pos: DVec2, v1: f64, v2: f64, v3: f64) -> f64 {
        let mut cache = BerpCache::new();
        Self::perspective_correct_cached(tri, pos, v1, v2, v3, &mut cache)
    }

    /// Normalised perspective-correct weights of `pos` relative to a, b, c
    pub fn weights(tri: &InterRenderTriangle, pos: DVec2) -> [f64; 3] {
        let a = tri.a.pos_ss.truncate();
        let b = tri.b.pos_ss.truncate();
        let c = tri.c.pos_ss.truncate();

        // Sub-areas opposite each vertex, same orientation as ss_area
        let area_a = edge_function(pos, b, c);
        let area_b = edge_function(a, pos, c);
        let area_c = edge_function(a, b, pos);

        let w1 = area_a * tri.ss_iarea * tri.a.berp_iw;
        let w2 = area_b * tri.ss_iarea * tri.b.berp_iw;
        let w3 = area_c * tri.ss_iarea * tri.c.berp_iw;

        let inv_sum = 1.0 / (w1 + w2 + w3);
        [w1 * inv_sum, w2 * inv_sum, w3 * inv_sum]
    }
}
