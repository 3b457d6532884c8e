/// Frame orchestrator.
///
/// Owns the worker pool and one engine per stage. A frame is
/// `begin_frame`, any number of `register_render`/`register_light` calls,
/// then `render`, after which `pixel_buffer` holds the image.
use std::sync::Arc;
use std::time::Instant;

use glam::{DMat4, UVec2};
use tracing::debug;

use crate::config::TornadoConfig;
use crate::error::Result;
use crate::geometry::RenderTriangle3D;
use crate::perf::FrameStats;
use crate::rendering::{
    BackfaceCullingEngine, DrawingEngine, LightingEngine, PixelBuffer, ProjectionEngine,
    ProjectionProperties, RenderLightSource,
};
use crate::threading::WorkerPool;
use crate::{count_call, perf_scope};

pub struct Tornado {
    worker_pool: WorkerPool,
    backface_culling: BackfaceCullingEngine,
    projection: ProjectionEngine,
    drawing: DrawingEngine,
    pixel_buffer: PixelBuffer<3>,
    registered_triangles: Vec<RenderTriangle3D>,
    registered_lights: Vec<Arc<dyn RenderLightSource>>,
    last_frame: FrameStats,
}

impl Tornado {
    /// `num_render_threads == 0` uses one worker per hardware thread
    pub fn new(render_target_size: UVec2, num_render_threads: usize) -> Result<Self> {
        let drawing = DrawingEngine::new(render_target_size)?;
        Self::with_drawing_engine(drawing, render_target_size, num_render_threads)
    }

    pub fn from_config(config: &TornadoConfig) -> Result<Self> {
        config.validate()?;
        let drawing = DrawingEngine::new(config.resolution())?
            .with_shading(config.shading)
            .with_max_threads_per_triangle(config.max_threads_per_triangle)
            .with_depth_sentinel(config.depth_sentinel);
        Self::with_drawing_engine(drawing, config.resolution(), config.num_threads)
    }

    fn with_drawing_engine(
        drawing: DrawingEngine,
        render_target_size: UVec2,
        num_render_threads: usize,
    ) -> Result<Self> {
        let pixel_buffer = PixelBuffer::<3>::new(render_target_size)?;
        let worker_pool = WorkerPool::new(num_render_threads)?;
        debug!(
            width = render_target_size.x,
            height = render_target_size.y,
            workers = worker_pool.num_workers(),
            "renderer created"
        );

        Ok(Self {
            worker_pool,
            backface_culling: BackfaceCullingEngine::new(),
            projection: ProjectionEngine::new(),
            drawing,
            pixel_buffer,
            registered_triangles: Vec::new(),
            registered_lights: Vec::new(),
            last_frame: FrameStats::default(),
        })
    }

    /// Forgets everything registered for the previous frame
    pub fn begin_frame(&mut self) {
        self.registered_triangles.clear();
        self.registered_lights.clear();
    }

    pub fn register_render(&mut self, triangle: RenderTriangle3D) {
        self.registered_triangles.push(triangle);
    }

    pub fn register_renders<I>(&mut self, triangles: I)
    where
        I: IntoIterator<Item = RenderTriangle3D>,
    {
        self.registered_triangles.extend(triangles);
    }

    pub fn register_light(&mut self, light: Arc<dyn RenderLightSource>) {
        self.registered_lights.push(light);
    }

    /// Culls, projects and draws everything registered since `begin_frame`
    pub fn render(&mut self, props: &ProjectionProperties, world_matrix: &DMat4) {
        perf_scope!("render");
        let frame_start = Instant::now();
        let mut stats = FrameStats {
            triangles_registered: self.registered_triangles.len(),
            ..Default::default()
        };

        let stage = Instant::now();
        self.backface_culling.begin_batch(self.registered_triangles.len());
        for tri in &self.registered_triangles {
            self.backface_culling.register_render_triangle(tri.clone());
        }
        self.backface_culling.cull(props);
        let survivors = self.backface_culling.finish();
        stats.culling = stage.elapsed();

        let stage = Instant::now();
        self.projection.begin_batch(survivors.len());
        for tri in survivors {
            self.projection.register_render_triangle(tri);
        }
        self.projection.project(&mut self.worker_pool, props, world_matrix);
        let fragments = self.projection.finish();
        stats.projection = stage.elapsed();
        stats.fragments_projected = fragments.len();

        let stage = Instant::now();
        let mut lighting = LightingEngine::new();
        lighting.begin_batch(self.registered_lights.len());
        for light in &self.registered_lights {
            lighting.register_light_source(Arc::clone(light));
        }
        self.drawing.set_lighting(lighting);

        self.drawing.begin_batch(fragments.len());
        stats.fragments_drawn = fragments.len();
        for fragment in fragments {
            self.drawing.register_inter_render_triangle(fragment);
        }
        self.drawing.draw(&mut self.worker_pool);
        self.drawing.resolve_into(&mut self.pixel_buffer);
        stats.drawing = stage.elapsed();
        stats.draw_tasks = self.drawing.tasks_last_draw();

        stats.total = frame_start.elapsed();
        self.last_frame = stats;
        count_call!(frames_rendered);
        debug!(
            triangles = stats.triangles_registered,
            fragments = stats.fragments_projected,
            micros = stats.total.as_micros() as u64,
            "frame rendered"
        );
    }

    /// RGB bytes, `width * height * 3`, row-major
    pub fn pixel_buffer(&self) -> &PixelBuffer<3> {
        &self.pixel_buffer
    }

    /// Depth stored at a pixel by the last frame
    pub fn depth_at(&self, x: usize, y: usize) -> Option<f64> {
        self.drawing.depth_at(x, y)
    }

    pub fn depth_sentinel(&self) -> f64 {
        self.drawing.depth_sentinel()
    }

    pub fn last_frame_stats(&self) -> FrameStats {
        self.last_frame
    }

    pub fn num_workers(&self) -> usize {
        self.worker_pool.num_workers()
    }

    pub fn num_registered(&self) -> usize {
        self.registered_triangles.len()
    }
}
