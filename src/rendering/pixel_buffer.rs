/// Contiguous row-major byte image with `C` channels per pixel.
/// Rows are stored in increasing index order. A render target's row index is
/// the screen-space y, so its first row is the bottom edge of the view.
/// Textures use 4 channels and store the top row first.
use glam::UVec2;

use crate::error::{Result, TornadoError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer<const C: usize> {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl<const C: usize> PixelBuffer<C> {
    /// Zero-filled buffer of the given size
    pub fn new(size: UVec2) -> Result<Self> {
        Self::check_size(size)?;
        let (width, height) = (size.x as usize, size.y as usize);
        Ok(Self {
            width,
            height,
            data: vec![0; width * height * C],
        })
    }

    /// Wraps existing pixel data. `data.len()` must equal `width * height * C`.
    pub fn from_raw(data: Vec<u8>, size: UVec2) -> Result<Self> {
        Self::check_size(size)?;
        let (width, height) = (size.x as usize, size.y as usize);
        let expected = width * height * C;
        if data.len() != expected {
            return Err(TornadoError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    /// 1x1 buffer holding one pixel
    pub fn single_pixel(value: [u8; C]) -> Self {
        Self {
            width: 1,
            height: 1,
            data: value.to_vec(),
        }
    }

    fn check_size(size: UVec2) -> Result<()> {
        if size.x == 0 || size.y == 0 {
            return Err(TornadoError::InvalidResolution {
                width: size.x,
                height: size.y,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dimensions(&self) -> UVec2 {
        UVec2::new(self.width as u32, self.height as u32)
    }

    pub const fn channels(&self) -> usize {
        C
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Channels of the pixel at (x, y), or None outside the buffer
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * C;
        Some(&self.data[i..i + C])
    }

    #[inline]
    pub fn pixel_mut(&mut self, x: usize, y: usize) -> Option<&mut [u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * C;
        Some(&mut self.data[i..i + C])
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Fill every pixel with the same channel values
    pub fn fill(&mut self, value: [u8; C]) {
        for px in self.data.chunks_exact_mut(C) {
            px.copy_from_slice(&value);
        }
    }
}
