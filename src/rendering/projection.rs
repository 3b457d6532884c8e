/// World space to screen space, one worker task per registered triangle.
///
/// Each task transforms its triangle, clips it and finalizes the surviving
/// fragments. Only the final append to the shared result list is locked.
use std::sync::{Arc, Mutex, PoisonError};

use glam::DMat4;
use tracing::debug;

use super::clipping::ClippingEngine;
use super::inter_render::{InterRenderTriangle, InterRenderVertex};
use super::projection_properties::ProjectionProperties;
use crate::geometry::{RenderTriangle3D, Vertex};
use crate::threading::WorkerPool;
use crate::{count_add, count_call};

#[derive(Default)]
pub struct ProjectionEngine {
    triangles: Vec<RenderTriangle3D>,
    results: Arc<Mutex<Vec<InterRenderTriangle>>>,
}

impl ProjectionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops last frame's input and output
    pub fn begin_batch(&mut self, reserve: usize) {
        self.triangles.clear();
        self.triangles.reserve(reserve);
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn register_render_triangle(&mut self, triangle: RenderTriangle3D) {
        self.triangles.push(triangle);
    }

    pub fn num_registered(&self) -> usize {
        self.triangles.len()
    }

    /// Projects every registered triangle on `pool`; blocks until done
    pub fn project(&mut self, pool: &mut WorkerPool, props: &ProjectionProperties, world_matrix: &DMat4) {
        let triangles: Arc<Vec<RenderTriangle3D>> = Arc::new(std::mem::take(&mut self.triangles));
        let props = Arc::new(props.clone());
        let world_matrix = *world_matrix;

        for index in 0..triangles.len() {
            let triangles = Arc::clone(&triangles);
            let props = Arc::clone(&props);
            let results = Arc::clone(&self.results);

            pool.queue_task(move || {
                let fragments = Self::project_triangle(&triangles[index], &props, &world_matrix);
                if fragments.is_empty() {
                    return;
                }
                results
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .extend(fragments);
            });
        }
        pool.execute();

        // Every task has run and released its handle by now
        self.triangles = Arc::try_unwrap(triangles).unwrap_or_else(|shared| (*shared).clone());

        debug!(
            triangles = self.triangles.len(),
            fragments = self.results.lock().unwrap_or_else(PoisonError::into_inner).len(),
            "projection finished"
        );
    }

    /// Takes the fragments produced by the last `project`
    pub fn finish(&mut self) -> Vec<InterRenderTriangle> {
        std::mem::take(&mut *self.results.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Body of one projection task
    pub fn project_triangle(
        triangle: &RenderTriangle3D,
        props: &ProjectionProperties,
        world_matrix: &DMat4,
    ) -> Vec<InterRenderTriangle> {
        count_call!(triangles_projected);

        // Distance from the world origin, not the camera
        let sqr_far = props.sqr_far_clip();
        if triangle
            .vertices()
            .iter()
            .all(|v| v.pos_ws.length_squared() > sqr_far)
        {
            count_call!(triangles_far_rejected);
            return Vec::new();
        }

        let projection = props.projection_matrix();
        let to_clip_space = |v: &Vertex| {
            let mut irv = InterRenderVertex::from_vertex(v);
            irv.pos_wsmx = world_matrix.transform_point3(v.pos_ws);
            irv.pos_cs = *projection * irv.pos_wsmx.extend(1.0);
            irv
        };

        let mut ird = InterRenderTriangle::new(
            to_clip_space(&triangle.a),
            to_clip_space(&triangle.b),
            to_clip_space(&triangle.c),
        );
        ird.material = triangle.material.clone();

        let mut fragments = ClippingEngine::clip(ird);
        if fragments.is_empty() {
            count_call!(triangles_clip_rejected);
            return fragments;
        }

        let half_resolution = props.half_resolution();
        for fragment in &mut fragments {
            fragment.finalize_screen_space(half_resolution);
        }
        count_add!(fragments_produced, fragments.len() as u64);

        fragments
    }
}
