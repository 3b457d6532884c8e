/// Software rendering pipeline
/// Projection, clipping, culling, rasterization and shading on the CPU
pub mod barycentric;
pub mod clipping;
pub mod color;
pub mod culling;
pub mod drawing;
pub mod inter_render;
pub mod lighting;
pub mod material;
pub mod pixel_buffer;
pub mod projection;
pub mod projection_properties;
pub mod shading;
pub mod texture;

pub use barycentric::{BarycentricInterpolationEngine, BerpCache};
pub use clipping::{ClipPlane, ClippingEngine};
pub use color::Color;
pub use culling::BackfaceCullingEngine;
pub use drawing::{DrawingEngine, ScreenRect};
pub use inter_render::{InterRenderTriangle, InterRenderVertex, InterpolationMask};
pub use lighting::{LightingEngine, RenderLightSource, RenderPointLight};
pub use material::Material;
pub use pixel_buffer::PixelBuffer;
pub use projection::ProjectionEngine;
pub use projection_properties::ProjectionProperties;
pub use shading::ShadingConfig;
pub use texture::Texture;
