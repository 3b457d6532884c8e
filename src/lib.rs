/// Tornado - multithreaded CPU software rasterizer
/// Cull, project, clip and draw triangles into an RGB pixel buffer
pub mod camera;
pub mod config;
pub mod error;
pub mod geometry;
pub mod math;
pub mod perf;
pub mod renderer;
pub mod rendering;
pub mod threading;

pub use camera::Camera;
pub use config::TornadoConfig;
pub use error::{Result, TornadoError};
pub use geometry::{mesh, BoundingBox, RenderTriangle3D, Vertex};
pub use perf::{CounterSnapshot, FrameStats, FunctionCounters, PerfTimer, FUNCTION_COUNTERS};
pub use rendering::{
    BackfaceCullingEngine, BarycentricInterpolationEngine, BerpCache, ClipPlane, ClippingEngine, Color,
    DrawingEngine, InterRenderTriangle, InterRenderVertex, InterpolationMask, LightingEngine, Material,
    PixelBuffer, ProjectionEngine, ProjectionProperties, RenderLightSource, RenderPointLight, ScreenRect,
    ShadingConfig, Texture,
};
pub use renderer::Tornado;
pub use threading::WorkerPool;
