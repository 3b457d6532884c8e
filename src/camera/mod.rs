/// Camera producing the world matrix handed to `Tornado::render`.
/// Yaw/pitch orientation, looking down -Z when both are zero.
use glam::{DMat4, DQuat, DVec3};

use crate::error::Result;
use crate::math::try_inverse;

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: DVec3,
    pub yaw: f64,   // Rotation around Y axis (radians)
    pub pitch: f64, // Rotation around X axis (radians)
}

impl Camera {
    pub fn new(position: DVec3) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    /// Turn toward `target`
    pub fn look_at(&mut self, target: DVec3) {
        let dir = (target - self.position).normalize_or_zero();
        if dir == DVec3::ZERO {
            return;
        }
        self.yaw = (-dir.x).atan2(-dir.z);
        self.pitch = dir.y.clamp(-1.0, 1.0).asin();
    }

    /// World-to-camera transform. Fails when position or angles are not finite.
    pub fn world_matrix(&self) -> Result<DMat4> {
        let camera_to_world = DMat4::from_rotation_translation(self.rotation_quat(), self.position);
        try_inverse(&camera_to_world)
    }

    /// View direction in world space
    pub fn forward(&self) -> DVec3 {
        self.rotation_quat() * DVec3::NEG_Z
    }

    fn rotation_quat(&self) -> DQuat {
        DQuat::from_rotation_y(self.yaw) * DQuat::from_rotation_x(self.pitch)
    }

    /// Adds to yaw and pitch; pitch stops just short of straight up/down
    pub fn rotate(&mut self, delta_yaw: f64, delta_pitch: f64) {
        self.yaw += delta_yaw;
        self.pitch += delta_pitch;

        const MAX_PITCH: f64 = std::f64::consts::FRAC_PI_2 - 0.01;
        self.pitch = self.pitch.clamp(-MAX_PITCH, MAX_PITCH);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(DVec3::ZERO)
    }
}
