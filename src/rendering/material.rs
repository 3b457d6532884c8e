/// Surface description attached to triangles
use std::sync::Arc;

use super::texture::Texture;

#[derive(Clone, Debug, Default)]
pub struct Material {
    /// Sampled when present, otherwise the interpolated vertex color is used
    pub texture: Option<Arc<Texture>>,
    /// Skip lighting and write the base color as-is
    pub no_shading: bool,
}

impl Material {
    pub fn textured(texture: Arc<Texture>) -> Self {
        Self {
            texture: Some(texture),
            no_shading: false,
        }
    }

    pub fn vertex_colored() -> Self {
        Self::default()
    }

    pub fn unshaded(mut self) -> Self {
        self.no_shading = true;
        self
    }
}
