/// Light sources and the per-pixel light accumulator.
///
/// Lights return per-channel intensity factors on the color's 0..255 scale.
/// The engine only sums them; the pixel shader decides how to apply and clamp.
use std::fmt::Debug;
use std::sync::Arc;

use glam::DVec3;

use super::color::Color;
use crate::geometry::BoundingBox;

/// Anything that can light a surface point
pub trait RenderLightSource: Send + Sync + Debug {
    /// Contribution at world-space `point` with surface `normal`
    fn color_intensity_factors(&self, point: DVec3, normal: DVec3) -> Color;
}

/// Omnidirectional light with inverse-square falloff and an optional
/// "soft" blend that ignores the surface angle.
#[derive(Clone, Debug)]
pub struct RenderPointLight {
    color: Color,
    intensity: f64,
    intensity_times_255: f64,
    softness: f64,
    position: DVec3,
    use_bounding_boxes: bool,
    bounding_boxes: Vec<BoundingBox>,
}

impl RenderPointLight {
    pub fn new(position: DVec3, color: Color, intensity: f64) -> Self {
        let mut light = Self {
            color,
            intensity: 0.0,
            intensity_times_255: 0.0,
            softness: 0.0,
            position,
            use_bounding_boxes: false,
            bounding_boxes: Vec::new(),
        };
        light.set_intensity(intensity);
        light
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    pub fn set_intensity(&mut self, intensity: f64) {
        self.intensity = intensity;
        self.intensity_times_255 = intensity * 255.0;
    }

    /// Squared distance beyond which the light contributes nothing
    pub fn intensity_times_255(&self) -> f64 {
        self.intensity_times_255
    }

    pub fn softness(&self) -> f64 {
        self.softness
    }

    /// 0 is a pure angle-dependent light, 1 ignores the surface angle
    pub fn set_softness(&mut self, softness: f64) {
        self.softness = softness.clamp(0.0, 1.0);
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn set_position(&mut self, position: DVec3) {
        self.position = position;
    }

    pub fn use_bounding_boxes(&self) -> bool {
        self.use_bounding_boxes
    }

    pub fn set_use_bounding_boxes(&mut self, enabled: bool) {
        self.use_bounding_boxes = enabled;
    }

    pub fn bounding_boxes(&self) -> &[BoundingBox] {
        &self.bounding_boxes
    }

    pub fn bounding_boxes_mut(&mut self) -> &mut Vec<BoundingBox> {
        &mut self.bounding_boxes
    }

    pub fn do_bounding_boxes_contain_point(&self, point: DVec3) -> bool {
        self.bounding_boxes.iter().any(|bb| bb.contains(point))
    }
}

impl RenderLightSource for RenderPointLight {
    fn color_intensity_factors(&self, point: DVec3, normal: DVec3) -> Color {
        if self.use_bounding_boxes && !self.do_bounding_boxes_contain_point(point) {
            return Color::BLACK;
        }

        let to_light = self.position - point;
        let sqr_distance = to_light.length_squared();
        if self.intensity_times_255 <= sqr_distance {
            return Color::BLACK;
        }

        let falloff = self.intensity / sqr_distance;
        let dot = to_light.normalize_or_zero().dot(normal);
        let hardlight = if dot < 0.0 { 0.0 } else { falloff * dot };
        let softlight = falloff;

        let factor = hardlight + (softlight - hardlight) * self.softness;
        self.color * factor
    }
}

/// Set of lights registered for the current frame
#[derive(Clone, Debug, Default)]
pub struct LightingEngine {
    lights: Vec<Arc<dyn RenderLightSource>>,
}

impl LightingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_batch(&mut self, reserve: usize) {
        self.lights.clear();
        self.lights.reserve(reserve);
    }

    pub fn register_light_source(&mut self, light: Arc<dyn RenderLightSource>) {
        self.lights.push(light);
    }

    pub fn num_lights(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// Sum of every light's contribution, unclamped
    pub fn color_intensity_factors(&self, point: DVec3, normal: DVec3) -> Color {
        let mut total = Color::new(0.0, 0.0, 0.0, 255.0);
        for light in &self.lights {
            total += light.color_intensity_factors(point, normal);
        }
        total
    }
}
