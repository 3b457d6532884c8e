/// Per-pixel shading.
/// Kept separate from the rasterizer so the lighting model can change
/// without touching coverage or depth logic.
use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use super::barycentric::{BarycentricInterpolationEngine as Berp, BerpCache};
use super::color::Color;
use super::inter_render::InterRenderTriangle;
use super::lighting::LightingEngine;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadingConfig {
    /// Brightness every shaded pixel gets before lights are added
    pub global_illumination: f64,
    /// Written for triangles without a material
    pub missing_material_color: [u8; 3],
    /// Background the color target is cleared to each frame
    pub clear_color: [u8; 3],
}

impl Default for ShadingConfig {
    fn default() -> Self {
        Self {
            global_illumination: 1.0,
            missing_material_color: [255, 0, 255],
            clear_color: [0, 0, 0],
        }
    }
}

impl ShadingConfig {
    /// Color of `tri` at pixel `pos`. `cache` must already hold, or be about
    /// to receive, the weights of this exact pixel.
    pub fn shade(
        &self,
        tri: &InterRenderTriangle,
        pos: DVec2,
        cache: &mut BerpCache,
        lights: &LightingEngine,
    ) -> Color {
        let Some(material) = tri.material.as_deref() else {
            return Color::from_rgb8(self.missing_material_color);
        };

        let (a, b, c) = (&tri.a, &tri.b, &tri.c);
        let mut interp = |v1: f64, v2: f64, v3: f64| Berp::perspective_correct_cached(tri, pos, v1, v2, v3, cache);

        let base = match material.texture.as_deref() {
            Some(texture) => {
                let uv = DVec2::new(
                    interp(a.pos_uv.x, b.pos_uv.x, c.pos_uv.x),
                    interp(a.pos_uv.y, b.pos_uv.y, c.pos_uv.y),
                );
                let [r, g, bl, _] = texture.sample_nearest(uv);
                Color::rgb(r as f64, g as f64, bl as f64)
            }
            None => Color::rgb(
                interp(a.color.r, b.color.r, c.color.r),
                interp(a.color.g, b.color.g, c.color.g),
                interp(a.color.b, b.color.b, c.color.b),
            ),
        };

        if material.no_shading || lights.is_empty() {
            return base;
        }

        let point = DVec3::new(
            interp(a.pos_ws.x, b.pos_ws.x, c.pos_ws.x),
            interp(a.pos_ws.y, b.pos_ws.y, c.pos_ws.y),
            interp(a.pos_ws.z, b.pos_ws.z, c.pos_ws.z),
        );
        let normal = DVec3::new(
            interp(a.normal.x, b.normal.x, c.normal.x),
            interp(a.normal.y, b.normal.y, c.normal.y),
            interp(a.normal.z, b.normal.z, c.normal.z),
        )
        .normalize_or_zero();

        let light = lights.color_intensity_factors(point, normal);
        Color::rgb(
            base.r * (self.global_illumination + light.r / 255.0),
            base.g * (self.global_illumination + light.g / 255.0),
            base.b * (self.global_illumination + light.b / 255.0),
        )
    }
}
