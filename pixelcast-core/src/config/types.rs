//! Configuration type definitions
//!
//! Capacities are compile-time constants because every table in the core is
//! a fixed array. Everything else lives in [`Settings`] and may change at
//! runtime.

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum number of registered apps (system apps included)
pub const MAX_APPS: usize = 16;

/// Maximum number of decoded icons kept resident
pub const MAX_ICON_CACHE: usize = 8;

/// Maximum app id length in bytes
pub const MAX_ID_LEN: usize = 24;

/// Maximum app text length in bytes
pub const MAX_TEXT_LEN: usize = 64;

/// Maximum icon name length in bytes
pub const MAX_ICON_NAME_LEN: usize = 32;

/// Maximum encoded icon size accepted from the asset store (bytes)
pub const MAX_ICON_SIZE: usize = 8192;

/// Maximum icon width/height in pixels
pub const MAX_ICON_DIMENSION: u16 = 64;

/// Panel width in pixels
pub const DISPLAY_WIDTH: u16 = 64;

/// Panel height in pixels
pub const DISPLAY_HEIGHT: u16 = 64;

/// Fallback display duration per rotation turn (ms)
pub const DEFAULT_APP_DURATION_MS: u32 = 10_000;

/// Milliseconds per scrolled pixel
pub const SCROLL_STEP_MS: u32 = 50;

/// Dwell at the start and end of a scroll cycle (ms)
pub const SCROLL_PAUSE_MS: u32 = 2_000;

/// Lowest accepted app priority
pub const PRIORITY_MIN: i8 = -10;

/// Highest accepted app priority
pub const PRIORITY_MAX: i8 = 10;

/// Brightness limits (0 would blank the panel)
pub const MIN_BRIGHTNESS: u8 = 1;
pub const DEFAULT_BRIGHTNESS: u8 = 128;

/// Packed `0xRRGGBB` color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color(0x000000);
    pub const WHITE: Color = Color(0xFFFFFF);

    /// Build from 8-bit channels
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn b(self) -> u8 {
        self.0 as u8
    }

    /// Convert to the panel's native RGB565
    pub const fn to_rgb565(self) -> u16 {
        rgb565(self.r(), self.g(), self.b())
    }

    /// True for the all-zero color, which means "no background"
    pub const fn is_black(self) -> bool {
        self.0 & 0xFF_FFFF == 0
    }
}

/// Pack 8-bit channels into RGB565
pub const fn rgb565(r: u8, g: u8, b: u8) -> u16 {
    (((r as u16) & 0xF8) << 8) | (((g as u16) & 0xFC) << 3) | ((b as u16) >> 3)
}

/// Date layout for the date system app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DateFormat {
    /// DD/MM/YYYY
    #[default]
    DayMonthYear,
    /// MM/DD/YYYY
    MonthDayYear,
    /// YYYY-MM-DD
    Iso,
}

impl DateFormat {
    /// Parse the settings spelling of a date format
    pub fn from_pattern(pattern: &str) -> Option<Self> {
        match pattern {
            "DD/MM/YYYY" => Some(DateFormat::DayMonthYear),
            "MM/DD/YYYY" => Some(DateFormat::MonthDayYear),
            "YYYY-MM-DD" => Some(DateFormat::Iso),
            _ => None,
        }
    }
}

/// Display section
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplaySettings {
    /// Panel brightness (1-255)
    pub brightness: u8,
    /// Rotate between apps automatically
    pub auto_rotate: bool,
    /// Duration used when an app is pushed without one (ms)
    pub default_duration_ms: u32,
    /// Visible width in pixels
    pub width: u16,
    /// Visible height in pixels
    pub height: u16,
    /// Width reserved on the left for an app icon (pixels)
    pub icon_column: u16,
    /// Left inset of app text when there is no icon (pixels)
    pub text_margin: u16,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            brightness: DEFAULT_BRIGHTNESS,
            auto_rotate: true,
            default_duration_ms: DEFAULT_APP_DURATION_MS,
            width: DISPLAY_WIDTH,
            height: DISPLAY_HEIGHT,
            icon_column: 10,
            text_margin: 2,
        }
    }
}

/// Clock system app
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClockSettings {
    pub enabled: bool,
    pub format_24h: bool,
    pub show_seconds: bool,
    pub color: Color,
}

impl Default for ClockSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            format_24h: true,
            show_seconds: true,
            color: Color::WHITE,
        }
    }
}

/// Date system app
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DateSettings {
    pub enabled: bool,
    pub format: DateFormat,
    pub color: Color,
}

impl Default for DateSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            format: DateFormat::DayMonthYear,
            color: Color(0x6464FF),
        }
    }
}

/// Scroll animation timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScrollSettings {
    /// Milliseconds per one-pixel step
    pub step_ms: u32,
    /// Dwell at each end of the cycle (ms)
    pub pause_ms: u32,
    /// Extra pixels scrolled past the end of the text
    pub margin: u16,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            step_ms: SCROLL_STEP_MS,
            pause_ms: SCROLL_PAUSE_MS,
            margin: 0,
        }
    }
}

/// Icon loading limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IconSettings {
    /// Largest encoded source read from the asset store (bytes)
    pub max_source_bytes: usize,
    /// Largest decoded width or height (pixels)
    pub max_dimension: u16,
}

impl Default for IconSettings {
    fn default() -> Self {
        Self {
            max_source_bytes: MAX_ICON_SIZE,
            max_dimension: MAX_ICON_DIMENSION,
        }
    }
}

/// Complete runtime settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Settings {
    pub display: DisplaySettings,
    pub clock: ClockSettings,
    pub date: DateSettings,
    pub scroll: ScrollSettings,
    pub icons: IconSettings,
}

/// Copy `text` into a bounded string, truncating on a char boundary
pub fn truncated<const N: usize>(text: &str) -> String<N> {
    let mut end = text.len().min(N);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = String::new();
    // Cannot fail: `end <= N`
    let _ = out.push_str(&text[..end]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_channels() {
        let c = Color::rgb(0x12, 0x34, 0x56);
        assert_eq!(c, Color(0x123456));
        assert_eq!((c.r(), c.g(), c.b()), (0x12, 0x34, 0x56));
    }

    #[test]
    fn test_rgb565() {
        assert_eq!(Color::WHITE.to_rgb565(), 0xFFFF);
        assert_eq!(Color::BLACK.to_rgb565(), 0x0000);
        assert_eq!(Color::rgb(255, 0, 0).to_rgb565(), 0xF800);
        assert_eq!(Color::rgb(0, 255, 0).to_rgb565(), 0x07E0);
    }

    #[test]
    fn test_truncated_respects_char_boundary() {
        let s: String<4> = truncated("abcé");
        // 'é' is two bytes and would straddle the limit
        assert_eq!(s.as_str(), "abc");

        let s: String<8> = truncated("short");
        assert_eq!(s.as_str(), "short");
    }

    #[test]
    fn test_date_format_patterns() {
        assert_eq!(DateFormat::from_pattern("YYYY-MM-DD"), Some(DateFormat::Iso));
        assert_eq!(DateFormat::from_pattern("bogus"), None);
    }
}
