/// Call and event counters for the render pipeline
/// Counting is compiled in only with the `profiling` feature
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters, one per pipeline event
pub struct FunctionCounters {
    // Projection
    pub triangles_projected: AtomicU64,
    pub triangles_far_rejected: AtomicU64,
    pub triangles_clipped: AtomicU64,
    pub triangles_clip_rejected: AtomicU64,
    pub fragments_produced: AtomicU64,

    // Culling
    pub triangles_backface_culled: AtomicU64,

    // Drawing
    pub draw_tasks_queued: AtomicU64,
    pub pixels_tested: AtomicU64,
    pub pixels_inside: AtomicU64,
    pub depth_test_passed: AtomicU64,
    pub depth_test_failed: AtomicU64,

    // Scheduling
    pub pool_tasks_executed: AtomicU64,
    pub pool_tasks_completed: AtomicU64,

    pub frames_rendered: AtomicU64,
}

impl FunctionCounters {
    pub const fn new() -> Self {
        Self {
            triangles_projected: AtomicU64::new(0),
            triangles_far_rejected: AtomicU64::new(0),
            triangles_clipped: AtomicU64::new(0),
            triangles_clip_rejected: AtomicU64::new(0),
            fragments_produced: AtomicU64::new(0),
            triangles_backface_culled: AtomicU64::new(0),
            draw_tasks_queued: AtomicU64::new(0),
            pixels_tested: AtomicU64::new(0),
            pixels_inside: AtomicU64::new(0),
            depth_test_passed: AtomicU64::new(0),
            depth_test_failed: AtomicU64::new(0),
            pool_tasks_executed: AtomicU64::new(0),
            pool_tasks_completed: AtomicU64::new(0),
            frames_rendered: AtomicU64::new(0),
        }
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        self.triangles_projected.store(0, Ordering::Relaxed);
        self.triangles_far_rejected.store(0, Ordering::Relaxed);
        self.triangles_clipped.store(0, Ordering::Relaxed);
        self.triangles_clip_rejected.store(0, Ordering::Relaxed);
        self.fragments_produced.store(0, Ordering::Relaxed);
        self.triangles_backface_culled.store(0, Ordering::Relaxed);
        self.draw_tasks_queued.store(0, Ordering::Relaxed);
        self.pixels_tested.store(0, Ordering::Relaxed);
        self.pixels_inside.store(0, Ordering::Relaxed);
        self.depth_test_passed.store(0, Ordering::Relaxed);
        self.depth_test_failed.store(0, Ordering::Relaxed);
        self.pool_tasks_executed.store(0, Ordering::Relaxed);
        self.pool_tasks_completed.store(0, Ordering::Relaxed);
        self.frames_rendered.store(0, Ordering::Relaxed);
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            triangles_projected: self.triangles_projected.load(Ordering::Relaxed),
            triangles_far_rejected: self.triangles_far_rejected.load(Ordering::Relaxed),
            triangles_clipped: self.triangles_clipped.load(Ordering::Relaxed),
            triangles_clip_rejected: self.triangles_clip_rejected.load(Ordering::Relaxed),
            fragments_produced: self.fragments_produced.load(Ordering::Relaxed),
            triangles_backface_culled: self.triangles_backface_culled.load(Ordering::Relaxed),
            draw_tasks_queued: self.draw_tasks_queued.load(Ordering::Relaxed),
            pixels_tested: self.pixels_tested.load(Ordering::Relaxed),
            pixels_inside: self.pixels_inside.load(Ordering::Relaxed),
            depth_test_passed: self.depth_test_passed.load(Ordering::Relaxed),
            depth_test_failed: self.depth_test_failed.load(Ordering::Relaxed),
            pool_tasks_executed: self.pool_tasks_executed.load(Ordering::Relaxed),
            pool_tasks_completed: self.pool_tasks_completed.load(Ordering::Relaxed),
            frames_rendered: self.frames_rendered.load(Ordering::Relaxed),
        }
    }
}

impl Default for FunctionCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of counter values at a point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub triangles_projected: u64,
    pub triangles_far_rejected: u64,
    pub triangles_clipped: u64,
    pub triangles_clip_rejected: u64,
    pub fragments_produced: u64,
    pub triangles_backface_culled: u64,
    pub draw_tasks_queued: u64,
    pub pixels_tested: u64,
    pub pixels_inside: u64,
    pub depth_test_passed: u64,
    pub depth_test_failed: u64,
    pub pool_tasks_executed: u64,
    pub pool_tasks_completed: u64,
    pub frames_rendered: u64,
}

impl CounterSnapshot {
    /// Print formatted report
    pub fn print_report(&self) {
        println!("\n=== Pipeline Counters Report ===");
        println!("\nProjection:");
        println!("  triangles projected:        {:12}", self.triangles_projected);
        println!("  rejected by far distance:   {:12}", self.triangles_far_rejected);
        println!("  sent through clipper:       {:12}", self.triangles_clipped);
        println!("  rejected by clipper:        {:12}", self.triangles_clip_rejected);
        println!("  fragments produced:         {:12}", self.fragments_produced);

        println!("\nCulling:");
        println!("  backfaces culled:           {:12}", self.triangles_backface_culled);

        println!("\nDrawing:");
        println!("  draw tasks queued:          {:12}", self.draw_tasks_queued);
        println!("  pixels tested:              {:12}", self.pixels_tested);
        println!("  pixels inside triangle:     {:12}", self.pixels_inside);
        println!("  depth test passed:          {:12}", self.depth_test_passed);
        println!("  depth test failed:          {:12}", self.depth_test_failed);
        let depth_tests = self.depth_test_passed + self.depth_test_failed;
        if depth_tests > 0 {
            let pass_rate = (self.depth_test_passed as f64 / depth_tests as f64) * 100.0;
            println!("  depth test pass rate:       {:11.2}%", pass_rate);
        }

        println!("\nScheduling:");
        println!("  pool tasks executed:        {:12}", self.pool_tasks_executed);
        println!("  pool tasks completed:       {:12}", self.pool_tasks_completed);
        println!("  frames rendered:            {:12}", self.frames_rendered);

        println!();
    }
}

/// Global function counters instance
pub static FUNCTION_COUNTERS: FunctionCounters = FunctionCounters::new();

/// Increments a `FUNCTION_COUNTERS` field (only when profiling feature is enabled)
#[macro_export]
macro_rules! count_call {
    ($counter:ident) => {
        #[cfg(feature = "profiling")]
        {
            $crate::perf::FUNCTION_COUNTERS
                .$counter
                .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        }
    };
}

/// Adds to a `FUNCTION_COUNTERS` field (only when profiling feature is enabled)
#[macro_export]
macro_rules! count_add {
    ($counter:ident, $value:expr) => {
        #[cfg(feature = "profiling")]
        {
            $crate::perf::FUNCTION_COUNTERS
                .$counter
                .fetch_add($value, std::sync::atomic::Ordering::Relaxed);
        }
        #[cfg(not(feature = "profiling"))]
        {
            let _ = $value;
        }
    };
}
