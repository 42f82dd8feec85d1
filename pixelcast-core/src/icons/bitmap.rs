//! RGB565 bitmaps

use alloc::vec::Vec;

use super::cache::IconError;

/// Owned RGB565 pixel buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u16,
    height: u16,
    pixels: Vec<u16>,
}

impl Bitmap {
    /// Allocate a zeroed bitmap without aborting on allocation failure
    pub fn try_new(width: u16, height: u16) -> Result<Self, IconError> {
        let len = usize::from(width) * usize::from(height);
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|_| IconError::OutOfMemory)?;
        pixels.resize(len, 0);
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Mutable pixel data, row-major
    pub fn pixels_mut(&mut self) -> &mut [u16] {
        &mut self.pixels
    }

    /// Heap bytes held by the pixel buffer
    pub fn byte_len(&self) -> usize {
        self.pixels.len() * core::mem::size_of::<u16>()
    }

    /// Borrow as a view
    pub fn view(&self) -> BitmapView<'_> {
        BitmapView {
            width: self.width,
            height: self.height,
            pixels: &self.pixels,
        }
    }
}

/// Borrowed RGB565 image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapView<'a> {
    pub width: u16,
    pub height: u16,
    /// Row-major, `width * height` pixels
    pub pixels: &'a [u16],
}

impl<'a> BitmapView<'a> {
    /// Pixel at `(x, y)`, or `None` outside the image
    pub fn pixel(&self, x: u16, y: u16) -> Option<u16> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(usize::from(y) * usize::from(self.width) + usize::from(x))
            .copied()
    }

    /// Iterate over rows
    pub fn rows(&self) -> impl Iterator<Item = &'a [u16]> {
        self.pixels.chunks(usize::from(self.width.max(1)))
    }
}
