//! Font metrics trait

/// Measures rendered text
pub trait TextMetrics {
    /// Width of `text` in pixels with the display font
    fn text_width(&self, text: &str) -> u16;
}

/// Fixed-advance font
impl TextMetrics for u16 {
    fn text_width(&self, text: &str) -> u16 {
        let chars = u16::try_from(text.chars().count()).unwrap_or(u16::MAX);
        chars.saturating_mul(*self)
    }
}
