/// RGBA texture sampled by the pixel shader.
use glam::{DVec2, UVec2};

use super::color::Color;
use super::pixel_buffer::PixelBuffer;
use crate::error::Result;

#[derive(Clone, Debug)]
pub struct Texture {
    pixels: PixelBuffer<4>,
}

impl Texture {
    pub fn from_pixel_buffer(pixels: PixelBuffer<4>) -> Self {
        Self { pixels }
    }

    /// 1x1 texture of a single color
    pub fn from_color(color: Color) -> Self {
        Self {
            pixels: PixelBuffer::single_pixel(color.to_rgba8()),
        }
    }

    /// Texture of `size` filled with `color`
    pub fn filled(color: Color, size: UVec2) -> Result<Self> {
        let mut pixels = PixelBuffer::<4>::new(size)?;
        pixels.fill(color.to_rgba8());
        Ok(Self { pixels })
    }

    pub fn pixel_buffer(&self) -> &PixelBuffer<4> {
        &self.pixels
    }

    pub fn pixel_buffer_mut(&mut self) -> &mut PixelBuffer<4> {
        &mut self.pixels
    }

    pub fn dimensions(&self) -> UVec2 {
        self.pixels.dimensions()
    }

    /// Nearest-neighbour lookup. UV is clamped to [0, 1]; v = 1 is the top row.
    #[inline]
    pub fn sample_nearest(&self, uv: DVec2) -> [u8; 4] {
        let u = uv.x.clamp(0.0, 1.0);
        let v = uv.y.clamp(0.0, 1.0);
        let x = (u * (self.pixels.width() - 1) as f64) as usize;
        let y = ((1.0 - v) * (self.pixels.height() - 1) as f64) as usize;

        match self.pixels.pixel(x, y) {
            Some(px) => [px[0], px[1], px[2], px[3]],
            None => [0, 0, 0, 0],
        }
    }
}
