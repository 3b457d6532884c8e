/// Camera lens settings and the projection matrix derived from them.
/// Every setter recomputes the derived values immediately.
use glam::{DMat4, DVec2, DVec4, UVec2};

#[derive(Clone, Debug, PartialEq)]
pub struct ProjectionProperties {
    resolution: UVec2,
    fov: f64,
    near_clip: f64,
    far_clip: f64,

    // Derived
    aspect_ratio: f64,
    half_resolution: DVec2,
    sqr_far_clip: f64,
    projection_matrix: DMat4,
}

impl ProjectionProperties {
    /// `fov` is the vertical field of view in degrees
    pub fn new(resolution: UVec2, fov: f64, near_clip: f64, far_clip: f64) -> Self {
        let mut props = Self {
            resolution,
            fov,
            near_clip,
            far_clip,
            aspect_ratio: 1.0,
            half_resolution: DVec2::ZERO,
            sqr_far_clip: 0.0,
            projection_matrix: DMat4::IDENTITY,
        };
        props.update_matrix();
        props
    }

    pub fn fov(&self) -> f64 {
        self.fov
    }

    pub fn set_fov(&mut self, fov: f64) {
        self.fov = fov;
        self.update_matrix();
    }

    pub fn near_clip(&self) -> f64 {
        self.near_clip
    }

    pub fn set_near_clip(&mut self, near_clip: f64) {
        self.near_clip = near_clip;
        self.update_matrix();
    }

    pub fn far_clip(&self) -> f64 {
        self.far_clip
    }

    pub fn sqr_far_clip(&self) -> f64 {
        self.sqr_far_clip
    }

    pub fn set_far_clip(&mut self, far_clip: f64) {
        self.far_clip = far_clip;
        self.update_matrix();
    }

    pub fn resolution(&self) -> UVec2 {
        self.resolution
    }

    pub fn set_resolution(&mut self, resolution: UVec2) {
        self.resolution = resolution;
        self.update_matrix();
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    pub fn half_resolution(&self) -> DVec2 {
        self.half_resolution
    }

    pub fn projection_matrix(&self) -> &DMat4 {
        &self.projection_matrix
    }

    fn update_matrix(&mut self) {
        self.aspect_ratio = self.resolution.x as f64 / self.resolution.y as f64;
        self.half_resolution = self.resolution.as_dvec2() / 2.0;
        self.sqr_far_clip = self.far_clip * self.far_clip;

        let (near, far) = (self.near_clip, self.far_clip);
        let tan_half_fov = (self.fov * 0.5).to_radians().tan();
        let sx = 1.0 / (tan_half_fov * self.aspect_ratio);
        let sy = 1.0 / tan_half_fov;
        let zz = (near + far) / (near - far);
        let zw = 2.0 * far * near / (near - far);

        // Columns; row 3 is (0, 0, -1, 1)
        self.projection_matrix = DMat4::from_cols(
            DVec4::new(sx, 0.0, 0.0, 0.0),
            DVec4::new(0.0, sy, 0.0, 0.0),
            DVec4::new(0.0, 0.0, zz, -1.0),
            DVec4::new(0.0, 0.0, zw, 1.0),
        );
    }
}

impl Default for ProjectionProperties {
    fn default() -> Self {
        Self::new(UVec2::new(800, 600), 90.0, 2.0, 100.0)
    }
}
