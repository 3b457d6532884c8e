/// Performance measurement utilities
/// Each rendering stage is timed so frame cost can be broken down
pub mod profiling;

pub use profiling::{CounterSnapshot, FunctionCounters, FUNCTION_COUNTERS};

use std::time::{Duration, Instant};

use tracing::debug;

/// Scope timer that reports its lifetime through `tracing` when dropped
pub struct PerfTimer {
    name: &'static str,
    start: Instant,
}

impl PerfTimer {
    #[inline]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for PerfTimer {
    fn drop(&mut self) {
        debug!(stage = self.name, micros = self.elapsed().as_micros() as u64, "stage finished");
    }
}

/// Per-frame timing and throughput of the last `Tornado::render` call
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStats {
    pub projection: Duration,
    pub culling: Duration,
    pub drawing: Duration,
    pub total: Duration,
    pub triangles_registered: usize,
    pub fragments_projected: usize,
    pub fragments_drawn: usize,
    pub draw_tasks: usize,
}

impl FrameStats {
    pub fn fps(&self) -> f64 {
        let secs = self.total.as_secs_f64();
        if secs > 0.0 {
            1.0 / secs
        } else {
            0.0
        }
    }

    pub fn print_summary(&self) {
        let total_us = self.total.as_secs_f64() * 1e6;
        let share = |d: Duration| {
            if total_us > 0.0 {
                d.as_secs_f64() * 1e6 / total_us * 100.0
            } else {
                0.0
            }
        };

        println!("\n========== FRAME SUMMARY ==========");
        println!(
            "Projection: {:10.2}μs ({:5.1}%)",
            self.projection.as_secs_f64() * 1e6,
            share(self.projection)
        );
        println!(
            "Culling:    {:10.2}μs ({:5.1}%)",
            self.culling.as_secs_f64() * 1e6,
            share(self.culling)
        );
        println!(
            "Drawing:    {:10.2}μs ({:5.1}%)",
            self.drawing.as_secs_f64() * 1e6,
            share(self.drawing)
        );
        println!("───────────────────────────────────");
        println!("Total:      {:10.2}μs", total_us);
        println!(
            "Triangles {} -> fragments {} -> drawn {} ({} tasks)",
            self.triangles_registered, self.fragments_projected, self.fragments_drawn, self.draw_tasks
        );
        println!("===================================\n");
    }
}

/// Macro for easy performance measurement
#[macro_export]
macro_rules! perf_scope {
    ($name:expr) => {
        let _timer = $crate::perf::PerfTimer::new($name);
    };
}
