/// Renderer configuration.
///
/// Loadable from JSON; every field falls back to its default when missing.
use std::path::Path;

use glam::UVec2;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TornadoError};
use crate::rendering::drawing::{DEFAULT_DEPTH_SENTINEL, DEFAULT_MAX_THREADS_PER_TRIANGLE};
use crate::rendering::{ProjectionProperties, ShadingConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TornadoConfig {
    /// Render target size in pixels, `[width, height]`
    #[serde(default = "default_resolution")]
    pub resolution: [u32; 2],
    /// Worker threads; 0 uses one per hardware thread
    #[serde(default)]
    pub num_threads: usize,
    /// Vertical field of view in degrees
    #[serde(default = "default_fov")]
    pub field_of_view: f64,
    #[serde(default = "default_near_clip")]
    pub near_clip: f64,
    #[serde(default = "default_far_clip")]
    pub far_clip: f64,
    #[serde(default)]
    pub shading: ShadingConfig,
    /// Upper bound on column slices per triangle
    #[serde(default = "default_max_threads_per_triangle")]
    pub max_threads_per_triangle: usize,
    /// Initial z-buffer value each frame
    #[serde(default = "default_depth_sentinel")]
    pub depth_sentinel: f64,
}

fn default_resolution() -> [u32; 2] {
    [800, 600]
}

fn default_fov() -> f64 {
    90.0
}

fn default_near_clip() -> f64 {
    2.0
}

fn default_far_clip() -> f64 {
    100.0
}

fn default_max_threads_per_triangle() -> usize {
    DEFAULT_MAX_THREADS_PER_TRIANGLE
}

fn default_depth_sentinel() -> f64 {
    DEFAULT_DEPTH_SENTINEL
}

impl Default for TornadoConfig {
    fn default() -> Self {
        Self {
            resolution: default_resolution(),
            num_threads: 0,
            field_of_view: default_fov(),
            near_clip: default_near_clip(),
            far_clip: default_far_clip(),
            shading: ShadingConfig::default(),
            max_threads_per_triangle: default_max_threads_per_triangle(),
            depth_sentinel: default_depth_sentinel(),
        }
    }
}

impl TornadoConfig {
    /// Parses and validates a JSON document
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn resolution(&self) -> UVec2 {
        UVec2::from_array(self.resolution)
    }

    pub fn validate(&self) -> Result<()> {
        let [width, height] = self.resolution;
        if width == 0 || height == 0 {
            return Err(TornadoError::InvalidResolution { width, height });
        }
        if !(self.field_of_view > 0.0 && self.field_of_view < 180.0) {
            return Err(TornadoError::InvalidConfig(format!(
                "field_of_view must be in (0, 180) degrees, got {}",
                self.field_of_view
            )));
        }
        if !(self.near_clip > 0.0 && self.near_clip < self.far_clip) {
            return Err(TornadoError::InvalidConfig(format!(
                "clip planes must satisfy 0 < near < far, got near={} far={}",
                self.near_clip, self.far_clip
            )));
        }
        if self.max_threads_per_triangle == 0 {
            return Err(TornadoError::InvalidConfig(
                "max_threads_per_triangle must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }

    pub fn projection_properties(&self) -> ProjectionProperties {
        ProjectionProperties::new(self.resolution(), self.field_of_view, self.near_clip, self.far_clip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = TornadoConfig::from_json_str("{}").unwrap();
        assert_eq!(config, TornadoConfig::default());
    }

    #[test]
    fn partial_document_overrides_fields() {
        let config = TornadoConfig::from_json_str(
            r#"{ "resolution": [320, 200], "num_threads": 3, "shading": { "clear_color": [10, 20, 30] } }"#,
        )
        .unwrap();
        assert_eq!(config.resolution(), UVec2::new(320, 200));
        assert_eq!(config.num_threads, 3);
        assert_eq!(config.shading.clear_color, [10, 20, 30]);
        assert_eq!(config.shading.missing_material_color, [255, 0, 255]);
        assert_eq!(config.far_clip, 100.0);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            TornadoConfig::from_json_str(r#"{ "resolution": [0, 10] }"#),
            Err(TornadoError::InvalidResolution { .. })
        ));
        assert!(matches!(
            TornadoConfig::from_json_str(r#"{ "near_clip": 50.0, "far_clip": 10.0 }"#),
            Err(TornadoError::InvalidConfig(_))
        ));
        assert!(matches!(
            TornadoConfig::from_json_str("{ not json"),
            Err(TornadoError::Json(_))
        ));
    }

    #[test]
    fn serialises_back_to_equal_config() {
        let config = TornadoConfig::default();
        let text = config.to_json_string().unwrap();
        assert_eq!(TornadoConfig::from_json_str(&text).unwrap(), config);
    }

    #[test]
    fn projection_properties_follow_config() {
        let props = TornadoConfig::default().projection_properties();
        assert_eq!(props.resolution(), UVec2::new(800, 600));
        assert_eq!(props.near_clip(), 2.0);
        assert_eq!(props.far_clip(), 100.0);
    }
}
