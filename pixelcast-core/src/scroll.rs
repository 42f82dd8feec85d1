//! Scroll animation for text wider than its viewport
//!
//! Cycles `PauseStart -> Scrolling -> PauseEnd -> PauseStart`. The offset
//! advances one pixel per step interval, however late the step arrives.

use crate::config::ScrollSettings;

/// Scroll phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScrollPhase {
    /// Dwell at offset 0
    PauseStart,
    /// Moving left one pixel per step
    Scrolling,
    /// Dwell at the end
    PauseEnd,
}

/// Output of one scroll step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScrollFrame {
    /// Horizontal text offset in pixels
    pub offset: u16,
    /// True while the offset is moving
    pub animating: bool,
}

/// Scroll state machine
#[derive(Debug, Clone)]
pub struct ScrollEngine {
    config: ScrollSettings,
    phase: ScrollPhase,
    offset: u16,
    content_width: u16,
    viewport_width: u16,
    needs_scroll: bool,
    /// Start of the current phase; `None` until the first step after a reset
    phase_started: Option<u32>,
    last_step: u32,
}

impl ScrollEngine {
    pub fn new(config: ScrollSettings) -> Self {
        Self {
            config,
            phase: ScrollPhase::PauseStart,
            offset: 0,
            content_width: 0,
            viewport_width: 0,
            needs_scroll: false,
            phase_started: None,
            last_step: 0,
        }
    }

    /// Replace the timing configuration and restart the cycle
    pub fn set_config(&mut self, config: ScrollSettings) {
        self.config = config;
        self.reset(self.content_width, self.viewport_width);
    }

    /// Restart at `(PauseStart, 0)` for new content
    pub fn reset(&mut self, content_width: u16, viewport_width: u16) {
        self.phase = ScrollPhase::PauseStart;
        self.offset = 0;
        self.content_width = content_width;
        self.viewport_width = viewport_width;
        self.needs_scroll = content_width > viewport_width;
        self.phase_started = None;
    }

    /// Update metrics, resetting only if one of them changed
    ///
    /// Returns true if the engine was reset.
    pub fn set_metrics(&mut self, content_width: u16, viewport_width: u16) -> bool {
        if content_width == self.content_width && viewport_width == self.viewport_width {
            return false;
        }
        self.reset(content_width, viewport_width);
        true
    }

    pub fn phase(&self) -> ScrollPhase {
        self.phase
    }

    pub fn offset(&self) -> u16 {
        self.offset
    }

    pub fn needs_scroll(&self) -> bool {
        self.needs_scroll
    }

    /// Offset at which scrolling stops
    pub fn max_offset(&self) -> u16 {
        self.content_width
            .saturating_sub(self.viewport_width)
            .saturating_add(self.config.margin)
    }

    /// Current output without advancing
    pub fn frame(&self) -> ScrollFrame {
        ScrollFrame {
            offset: self.offset,
            animating: self.phase == ScrollPhase::Scrolling,
        }
    }

    fn enter(&mut self, phase: ScrollPhase, now: u32) {
        self.phase = phase;
        self.phase_started = Some(now);
        self.last_step = now;
    }

    /// Advance the animation to `now`
    pub fn step(&mut self, now: u32) -> ScrollFrame {
        if !self.needs_scroll {
            return ScrollFrame::default();
        }

        let started = *self.phase_started.get_or_insert(now);
        let in_phase = now.wrapping_sub(started);

        match self.phase {
            ScrollPhase::PauseStart => {
                if in_phase >= self.config.pause_ms {
                    self.enter(ScrollPhase::Scrolling, now);
                }
            }
            ScrollPhase::Scrolling => {
                if now.wrapping_sub(self.last_step) >= self.config.step_ms {
                    self.offset = self.offset.saturating_add(1);
                    self.last_step = now;
                    if self.offset >= self.max_offset() {
                        self.enter(ScrollPhase::PauseEnd, now);
                    }
                }
            }
            ScrollPhase::PauseEnd => {
                if in_phase >= self.config.pause_ms {
                    self.offset = 0;
                    self.enter(ScrollPhase::PauseStart, now);
                }
            }
        }

        self.frame()
    }
}

impl Default for ScrollEngine {
    fn default() -> Self {
        Self::new(ScrollSettings::default())
    }
}
