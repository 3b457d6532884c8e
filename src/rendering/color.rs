/// RGBA color with f64 channels on a nominal 0..255 scale.
/// Lighting accumulates into these without clamping; clamping happens on write.
use std::ops::{Add, AddAssign, Mul};

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    #[serde(default = "default_alpha")]
    pub a: f64,
}

fn default_alpha() -> f64 {
    255.0
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(255.0, 255.0, 255.0);
    pub const MAGENTA: Color = Color::rgb(255.0, 0.0, 255.0);

    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 255.0 }
    }

    pub fn from_rgb8(rgb: [u8; 3]) -> Self {
        Self::rgb(rgb[0] as f64, rgb[1] as f64, rgb[2] as f64)
    }

    pub fn from_rgba8(rgba: [u8; 4]) -> Self {
        Self::new(rgba[0] as f64, rgba[1] as f64, rgba[2] as f64, rgba[3] as f64)
    }

    /// Clamp to [0, 255] and truncate to bytes
    #[inline]
    pub fn to_rgb8(&self) -> [u8; 3] {
        [clamp_channel(self.r), clamp_channel(self.g), clamp_channel(self.b)]
    }

    #[inline]
    pub fn to_rgba8(&self) -> [u8; 4] {
        [
            clamp_channel(self.r),
            clamp_channel(self.g),
            clamp_channel(self.b),
            clamp_channel(self.a),
        ]
    }

    /// Pack as 0x00RRGGBB
    #[inline]
    pub fn pack_rgb(&self) -> u32 {
        let [r, g, b] = self.to_rgb8();
        ((r as u32) << 16) | ((g as u32) << 8) | b as u32
    }

    #[inline]
    pub fn unpack_rgb(packed: u32) -> [u8; 3] {
        [(packed >> 16) as u8, (packed >> 8) as u8, packed as u8]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

#[inline(always)]
fn clamp_channel(v: f64) -> u8 {
    // NaN maps to 0
    if v >= 255.0 {
        255
    } else if v > 0.0 {
        v as u8
    } else {
        0
    }
}

impl Add for Color {
    type Output = Color;

    fn add(self, rhs: Color) -> Color {
        Color::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b, self.a)
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, rhs: Color) {
        self.r += rhs.r;
        self.g += rhs.g;
        self.b += rhs.b;
    }
}

/// Scales the color channels, leaving alpha alone
impl Mul<f64> for Color {
    type Output = Color;

    fn mul(self, rhs: f64) -> Color {
        Color::new(self.r * rhs, self.g * rhs, self.b * rhs, self.a)
    }
}
