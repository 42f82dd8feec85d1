//! Screen rendering
//!
//! Draws the screens for the app on air: the clock and date system apps,
//! custom apps with optional icon and scrolling text, and the boot screen.
//!
//! All text sits on one line at y = 28 of the 64x64 panel.

use core::fmt::Write;

use heapless::String;
use pixelcast_core::config::{ClockSettings, DateFormat, DateSettings, Settings};
use pixelcast_core::scheduler::{CLOCK_APP_ID, DATE_APP_ID};
use pixelcast_core::scroll::ScrollFrame;
use pixelcast_core::{AppItem, BitmapView, Color, Frame};

use crate::canvas::{Canvas, CanvasError};

/// Firmware version shown on the boot screen
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Top of the text line
const TEXT_Y: i32 = 28;

const BOOT_TITLE_COLOR: Color = Color::rgb(0, 150, 255);
const BOOT_VERSION_COLOR: Color = Color::rgb(100, 100, 100);

/// Calendar time for the clock and date screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WallTime {
    pub year: u16,
    /// 1-12
    pub month: u8,
    /// 1-31
    pub day: u8,
    /// 0-23
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl WallTime {
    /// Format as `HH:MM` or `HH:MM:SS`
    ///
    /// In 12 hour mode midnight and noon both show as 12.
    pub fn format_time(&self, format_24h: bool, show_seconds: bool) -> String<8> {
        let hours = if format_24h {
            self.hours
        } else {
            match self.hours % 12 {
                0 => 12,
                h => h,
            }
        };

        let mut out = String::new();
        let _ = if show_seconds {
            write!(out, "{:02}:{:02}:{:02}", hours, self.minutes, self.seconds)
        } else {
            write!(out, "{:02}:{:02}", hours, self.minutes)
        };
        out
    }

    pub fn format_date(&self, format: DateFormat) -> String<10> {
        let mut out = String::new();
        let _ = match format {
            DateFormat::DayMonthYear => {
                write!(out, "{:02}/{:02}/{:04}", self.day, self.month, self.year)
            }
            DateFormat::MonthDayYear => {
                write!(out, "{:02}/{:02}/{:04}", self.month, self.day, self.year)
            }
            DateFormat::Iso => write!(out, "{:04}-{:02}-{:02}", self.year, self.month, self.day),
        };
        out
    }
}

/// Screen renderer
#[derive(Debug, Clone)]
pub struct Renderer {
    clock: ClockSettings,
    date: DateSettings,
    icon_column: u16,
    text_margin: u16,
    brightness: u8,
}

impl Renderer {
    pub fn new(settings: &Settings) -> Self {
        Self {
            clock: settings.clock.clone(),
            date: settings.date.clone(),
            icon_column: settings.display.icon_column,
            text_margin: settings.display.text_margin,
            brightness: settings.display.brightness,
        }
    }

    /// Take new settings; brightness is applied on the next boot screen or
    /// [`Renderer::apply_brightness`] call
    pub fn apply_settings(&mut self, settings: &Settings) {
        *self = Self::new(settings);
    }

    pub fn apply_brightness<C: Canvas + ?Sized>(&self, canvas: &mut C) -> Result<(), CanvasError> {
        canvas.set_brightness(self.brightness)
    }

    /// Render the boot screen
    pub fn render_boot<C: Canvas + ?Sized>(&self, canvas: &mut C) -> Result<(), CanvasError> {
        self.apply_brightness(canvas)?;
        canvas.clear()?;
        canvas.draw_text(4, 24, "PixelCast", BOOT_TITLE_COLOR.to_rgb565())?;

        let mut version: String<16> = String::new();
        let _ = write!(version, "v{}", VERSION);
        canvas.draw_text(4, 36, &version, BOOT_VERSION_COLOR.to_rgb565())?;
        canvas.flush()
    }

    /// Render one controller frame
    ///
    /// `time` is `None` until the wall clock has been set; the clock and
    /// date screens then show placeholders.
    pub fn render_frame<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        frame: &Frame<'_>,
        time: Option<WallTime>,
    ) -> Result<(), CanvasError> {
        match frame {
            Frame::Idle => self.render_clock(canvas, time)?,
            Frame::App { item, .. } if item.is_system && item.id.as_str() == CLOCK_APP_ID => {
                self.render_clock(canvas, time)?
            }
            Frame::App { item, .. } if item.is_system && item.id.as_str() == DATE_APP_ID => {
                self.render_date(canvas, time)?
            }
            Frame::App {
                item, icon, scroll, ..
            } => self.render_app(canvas, item, icon.as_ref(), *scroll)?,
        }
        canvas.flush()
    }

    fn render_centered<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        text: &str,
        color: Color,
    ) -> Result<(), CanvasError> {
        canvas.clear()?;
        let (width, _) = canvas.size();
        let x = (i32::from(width) - i32::from(canvas.text_width(text))) / 2;
        canvas.draw_text(x.max(0), TEXT_Y, text, color.to_rgb565())
    }

    fn render_clock<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        time: Option<WallTime>,
    ) -> Result<(), CanvasError> {
        let text: String<8> = match time {
            Some(t) => t.format_time(self.clock.format_24h, self.clock.show_seconds),
            None if self.clock.show_seconds => String::try_from("--:--:--").unwrap_or_default(),
            None => String::try_from("--:--").unwrap_or_default(),
        };
        self.render_centered(canvas, &text, self.clock.color)
    }

    fn render_date<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        time: Option<WallTime>,
    ) -> Result<(), CanvasError> {
        let text: String<10> = match time {
            Some(t) => t.format_date(self.date.format),
            None => String::try_from("--/--/----").unwrap_or_default(),
        };
        self.render_centered(canvas, &text, self.date.color)
    }

    fn render_app<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        item: &AppItem,
        icon: Option<&BitmapView<'_>>,
        scroll: ScrollFrame,
    ) -> Result<(), CanvasError> {
        canvas.clear()?;
        let (width, height) = canvas.size();
        let background = item.background_color.to_rgb565();
        if !item.background_color.is_black() {
            canvas.fill_rect(0, 0, width, height, background)?;
        }

        let text_x = if item.has_icon() {
            i32::from(self.icon_column)
        } else {
            i32::from(self.text_margin)
        };
        canvas.draw_text(
            text_x - i32::from(scroll.offset),
            TEXT_Y,
            &item.text,
            item.text_color.to_rgb565(),
        )?;

        if item.has_icon() {
            // Keep scrolled text out of the icon column
            canvas.fill_rect(0, 0, self.icon_column, height, background)?;
            if let Some(icon) = icon {
                let x = (i32::from(self.icon_column) - i32::from(icon.width)) / 2;
                let y = (i32::from(height) - i32::from(icon.height)) / 2;
                canvas.blit(x.max(0), y, icon)?;
            }
        }
        Ok(())
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}
