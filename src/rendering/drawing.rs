/// Rasterizer: z-buffered, perspective-correct, parallel by screen coverage.
///
/// Every triangle is split into vertical column slices of its screen-space
/// bounding box. Bigger triangles get more slices, and each slice becomes one
/// worker task that scans its pixels, depth-tests and shades them.
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use glam::{DVec2, UVec2};
use tracing::debug;

use super::barycentric::{BarycentricInterpolationEngine, BerpCache};
use super::color::Color;
use super::inter_render::InterRenderTriangle;
use super::lighting::LightingEngine;
use super::pixel_buffer::PixelBuffer;
use super::shading::ShadingConfig;
use crate::error::{Result, TornadoError};
use crate::threading::WorkerPool;
use crate::{count_add, count_call};

/// Number of locks serialising depth-and-color writes
const WRITE_LOCK_STRIPES: usize = 256;

/// Padding added to a slice so float seams between slices leave no gaps
const SLICE_PADDING: f64 = 2.0;

pub const DEFAULT_DEPTH_SENTINEL: f64 = 1e8;
pub const DEFAULT_MAX_THREADS_PER_TRIANGLE: usize = 16;

/// Axis-aligned screen rectangle in pixel units
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct ScreenRect {
    pub pos: DVec2,
    pub size: DVec2,
}

impl ScreenRect {
    pub fn bounding(tri: &InterRenderTriangle) -> Self {
        let a = tri.a.pos_ss.truncate();
        let b = tri.b.pos_ss.truncate();
        let c = tri.c.pos_ss.truncate();
        let min = a.min(b).min(c);
        let max = a.max(b).max(c);
        Self {
            pos: min,
            size: max - min,
        }
    }
}

/// Depth and color storage shared by all draw tasks of a frame
struct RasterTarget {
    width: usize,
    height: usize,
    depth: Vec<AtomicU64>,
    color: Vec<AtomicU32>,
    write_locks: Vec<Mutex<()>>,
}

impl RasterTarget {
    fn new(width: usize, height: usize) -> Self {
        let pixels = width * height;
        Self {
            width,
            height,
            depth: (0..pixels).map(|_| AtomicU64::new(0)).collect(),
            color: (0..pixels).map(|_| AtomicU32::new(0)).collect(),
            write_locks: (0..WRITE_LOCK_STRIPES).map(|_| Mutex::new(())).collect(),
        }
    }

    fn reset(&self, depth_sentinel: f64, clear_color: u32) {
        let bits = depth_sentinel.to_bits();
        for d in &self.depth {
            d.store(bits, Ordering::Relaxed);
        }
        for c in &self.color {
            c.store(clear_color, Ordering::Relaxed);
        }
    }

    #[inline]
    fn depth(&self, index: usize) -> f64 {
        f64::from_bits(self.depth[index].load(Ordering::Relaxed))
    }

    /// Stores depth and color together if `depth` is still the nearest
    #[inline]
    fn write_if_closer(&self, index: usize, depth: f64, color: u32) -> bool {
        let _guard = self.write_locks[index % WRITE_LOCK_STRIPES]
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if depth < self.depth(index) {
            self.depth[index].store(depth.to_bits(), Ordering::Relaxed);
            self.color[index].store(color, Ordering::Relaxed);
            true
        } else {
            false
        }
    }
}

pub struct DrawingEngine {
    target: Arc<RasterTarget>,
    triangles: Vec<InterRenderTriangle>,
    lights: Arc<LightingEngine>,
    shading: ShadingConfig,
    max_threads_per_triangle: usize,
    depth_sentinel: f64,
    tasks_last_draw: usize,
}

impl DrawingEngine {
    pub fn new(resolution: UVec2) -> Result<Self> {
        if resolution.x == 0 || resolution.y == 0 {
            return Err(TornadoError::InvalidResolution {
                width: resolution.x,
                height: resolution.y,
            });
        }
        let target = RasterTarget::new(resolution.x as usize, resolution.y as usize);
        let shading = ShadingConfig::default();
        target.reset(DEFAULT_DEPTH_SENTINEL, Color::from_rgb8(shading.clear_color).pack_rgb());

        Ok(Self {
            target: Arc::new(target),
            triangles: Vec::new(),
            lights: Arc::new(LightingEngine::new()),
            shading,
            max_threads_per_triangle: DEFAULT_MAX_THREADS_PER_TRIANGLE,
            depth_sentinel: DEFAULT_DEPTH_SENTINEL,
            tasks_last_draw: 0,
        })
    }

    pub fn with_shading(mut self, shading: ShadingConfig) -> Self {
        self.shading = shading;
        self
    }

    pub fn with_max_threads_per_triangle(mut self, max_threads: usize) -> Self {
        self.max_threads_per_triangle = max_threads.max(1);
        self
    }

    pub fn with_depth_sentinel(mut self, sentinel: f64) -> Self {
        self.depth_sentinel = sentinel;
        self
    }

    pub fn shading(&self) -> &ShadingConfig {
        &self.shading
    }

    pub fn depth_sentinel(&self) -> f64 {
        self.depth_sentinel
    }

    /// Clears depth and color, and forgets last frame's triangles
    pub fn begin_batch(&mut self, reserve: usize) {
        self.target.reset(
            self.depth_sentinel,
            Color::from_rgb8(self.shading.clear_color).pack_rgb(),
        );
        self.triangles.clear();
        self.triangles.reserve(reserve);
    }

    pub fn register_inter_render_triangle(&mut self, triangle: InterRenderTriangle) {
        self.triangles.push(triangle);
    }

    pub fn num_registered(&self) -> usize {
        self.triangles.len()
    }

    /// Lights used by the pixel shader from the next draw on
    pub fn set_lighting(&mut self, lights: LightingEngine) {
        self.lights = Arc::new(lights);
    }

    /// Rasterizes every registered triangle; blocks until done
    pub fn draw(&mut self, pool: &mut WorkerPool) {
        let triangles = Arc::new(std::mem::take(&mut self.triangles));
        self.tasks_last_draw = self.create_tasks(pool, &triangles);
        pool.execute();

        self.triangles = Arc::try_unwrap(triangles).unwrap_or_else(|shared| (*shared).clone());
        debug!(
            triangles = self.triangles.len(),
            tasks = self.tasks_last_draw,
            "drawing finished"
        );
    }

    /// Worker tasks queued by the last `draw`
    pub fn tasks_last_draw(&self) -> usize {
        self.tasks_last_draw
    }

    /// Slice count for a triangle covering `area` pixels: proportional to
    /// its share of the screen, between 1 and `max_threads`.
    pub fn threads_for_area(area: f64, screen_area: f64, num_workers: usize, max_threads: usize) -> usize {
        let share = area.abs() / screen_area;
        let lerped = share * num_workers.saturating_sub(1) as f64;
        // NaN and negative casts saturate to 0
        (lerped as usize + 1).min(max_threads)
    }

    /// Equal-width column slices of `bounds`, padded where the target allows
    pub fn column_slices(bounds: ScreenRect, count: usize, target_size: DVec2) -> Vec<ScreenRect> {
        let segment = bounds.size.x / count as f64;
        (0..count)
            .map(|i| {
                let mut slice = ScreenRect {
                    pos: DVec2::new(bounds.pos.x + segment * i as f64, bounds.pos.y),
                    size: DVec2::new(segment, bounds.size.y),
                };
                if slice.pos.x + slice.size.x < target_size.x - SLICE_PADDING {
                    slice.size.x += SLICE_PADDING;
                }
                if slice.pos.y + slice.size.y < target_size.y - SLICE_PADDING {
                    slice.size.y += SLICE_PADDING;
                }
                slice
            })
            .collect()
    }

    fn create_tasks(&self, pool: &mut WorkerPool, triangles: &Arc<Vec<InterRenderTriangle>>) -> usize {
        let target_size = DVec2::new(self.target.width as f64, self.target.height as f64);
        let screen_area = target_size.x * target_size.y;
        let num_workers = pool.num_workers();
        let mut queued = 0;

        for (index, tri) in triangles.iter().enumerate() {
            let threads = Self::threads_for_area(tri.ss_area, screen_area, num_workers, self.max_threads_per_triangle);
            let bounds = ScreenRect::bounding(tri);

            for slice in Self::column_slices(bounds, threads, target_size) {
                let triangles = Arc::clone(triangles);
                let target = Arc::clone(&self.target);
                let lights = Arc::clone(&self.lights);
                let shading = self.shading;

                pool.queue_task(move || {
                    Self::draw_slice(&triangles[index], slice, &target, &lights, &shading);
                });
                queued += 1;
            }
        }

        count_add!(draw_tasks_queued, queued as u64);
        queued
    }

    /// Body of one draw task
    fn draw_slice(
        tri: &InterRenderTriangle,
        bounds: ScreenRect,
        target: &RasterTarget,
        lights: &LightingEngine,
        shading: &ShadingConfig,
    ) {
        let x0 = bounds.pos.x.max(0.0) as usize;
        let y0 = bounds.pos.y.max(0.0) as usize;
        let x1 = ((bounds.pos.x.max(0.0) as usize) + (bounds.size.x.max(0.0) as usize)).min(target.width);
        let y1 = ((bounds.pos.y.max(0.0) as usize) + (bounds.size.y.max(0.0) as usize)).min(target.height);

        let mut cache = BerpCache::new();
        for y in y0..y1 {
            let row = y * target.width;
            for x in x0..x1 {
                count_call!(pixels_tested);
                let pixel = DVec2::new(x as f64, y as f64);
                if !tri.does_screenspace_contain_point(pixel) {
                    continue;
                }
                count_call!(pixels_inside);

                let index = row + x;
                cache.invalidate();
                let z = BarycentricInterpolationEngine::perspective_correct_cached(
                    tri,
                    pixel,
                    tri.a.pos_ss.z,
                    tri.b.pos_ss.z,
                    tri.c.pos_ss.z,
                    &mut cache,
                );

                // Cheap early out before shading; the locked write re-checks
                if !(z < target.depth(index)) {
                    count_call!(depth_test_failed);
                    continue;
                }

                let color = shading.shade(tri, pixel, &mut cache, lights).pack_rgb();
                if target.write_if_closer(index, z, color) {
                    count_call!(depth_test_passed);
                } else {
                    count_call!(depth_test_failed);
                }
            }
        }
    }

    /// Copies the color target into `out`. Sizes must match.
    pub fn resolve_into(&self, out: &mut PixelBuffer<3>) {
        for (px, packed) in out.as_bytes_mut().chunks_exact_mut(3).zip(&self.target.color) {
            px.copy_from_slice(&Color::unpack_rgb(packed.load(Ordering::Relaxed)));
        }
    }

    /// Depth stored at (x, y), or None outside the target
    pub fn depth_at(&self, x: usize, y: usize) -> Option<f64> {
        (x < self.target.width && y < self.target.height).then(|| self.target.depth(y * self.target.width + x))
    }
}
