//! Canvas trait
//!
//! Defines the interface for pixel surfaces.

use pixelcast_core::traits::TextMetrics;
use pixelcast_core::BitmapView;

/// Canvas errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CanvasError {
    /// Communication error with the panel
    Communication,
    /// Panel not initialized
    NotInitialized,
}

/// Pixel surface
///
/// Coordinates are signed so scrolled text can start left of the screen;
/// implementations clip everything to their bounds. Colors are RGB565.
pub trait Canvas: TextMetrics {
    /// Surface size in pixels `(width, height)`
    fn size(&self) -> (u16, u16);

    /// Fill the whole surface with black
    fn clear(&mut self) -> Result<(), CanvasError>;

    /// Fill a rectangle
    fn fill_rect(&mut self, x: i32, y: i32, width: u16, height: u16, color: u16) -> Result<(), CanvasError>;

    /// Draw a single line of text with its top-left corner at `(x, y)`
    fn draw_text(&mut self, x: i32, y: i32, text: &str, color: u16) -> Result<(), CanvasError>;

    /// Copy a bitmap with its top-left corner at `(x, y)`
    fn blit(&mut self, x: i32, y: i32, image: &BitmapView<'_>) -> Result<(), CanvasError>;

    /// Set panel brightness (0-255)
    fn set_brightness(&mut self, level: u8) -> Result<(), CanvasError>;

    /// Present the drawn frame
    ///
    /// For double-buffered panels, this swaps the buffers.
    fn flush(&mut self) -> Result<(), CanvasError>;
}
