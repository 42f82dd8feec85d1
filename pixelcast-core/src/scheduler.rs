//! Round-robin app scheduler
//!
//! Owns the [`AppRegistry`] and decides which app is on screen. Rotation is
//! strictly by slot order; priority never changes the order.

use crate::config::{Color, Settings, MAX_APPS};
use crate::registry::{AppHandle, AppItem, AppRecord, AppRegistry, ContentPatch, RegistryError};

/// Id of the built-in clock app
pub const CLOCK_APP_ID: &str = "clock";
/// Id of the built-in date app
pub const DATE_APP_ID: &str = "date";

/// Outcome of a scheduler tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Selection {
    /// Current app did not change
    Unchanged,
    /// A different app is now current
    Switched(AppHandle),
    /// Nothing to show
    Empty,
}

/// Summary of scheduler state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SchedulerStatus {
    /// Active apps
    pub count: usize,
    /// Slot capacity
    pub capacity: usize,
    /// Slot index of the current app
    pub current: Option<usize>,
    /// Whether apps rotate on their duration
    pub rotation_enabled: bool,
}

/// One entry of [`Scheduler::list`]
#[derive(Debug, Clone, Copy)]
pub struct AppEntry<'a> {
    pub handle: AppHandle,
    pub item: &'a AppItem,
    pub is_current: bool,
}

/// App scheduler
#[derive(Debug, Clone)]
pub struct Scheduler<const N: usize = MAX_APPS> {
    registry: AppRegistry<N>,
    /// App on screen
    current: Option<AppHandle>,
    /// When the current app was selected
    last_switch: u32,
    rotation_enabled: bool,
}

impl<const N: usize> Scheduler<N> {
    /// Create a scheduler with an empty registry
    pub fn new(default_duration_ms: u32) -> Self {
        Self {
            registry: AppRegistry::new(default_duration_ms),
            current: None,
            last_switch: 0,
            rotation_enabled: true,
        }
    }

    /// Create a scheduler configured from settings
    pub fn from_settings(settings: &Settings) -> Self {
        let mut sched = Self::new(settings.display.default_duration_ms);
        sched.rotation_enabled = settings.display.auto_rotate;
        sched
    }

    /// Read-only access to the registry
    pub fn registry(&self) -> &AppRegistry<N> {
        &self.registry
    }

    /// Handle of the app on screen
    pub fn current(&self) -> Option<AppHandle> {
        self.current
    }

    /// The app on screen
    pub fn current_item(&self) -> Option<&AppItem> {
        self.current.and_then(|h| self.registry.get(h))
    }

    /// Change the duration used for apps pushed without one
    pub fn set_default_duration(&mut self, duration_ms: u32) {
        self.registry.set_default_duration(duration_ms);
    }

    /// Enable or disable rotation
    ///
    /// With rotation off the current app stays until it is removed or
    /// expires.
    pub fn set_rotation(&mut self, enabled: bool) {
        if self.rotation_enabled != enabled {
            info!("Rotation {}", if enabled { "enabled" } else { "disabled" });
        }
        self.rotation_enabled = enabled;
    }

    pub fn rotation_enabled(&self) -> bool {
        self.rotation_enabled
    }

    /// Get a summary of the scheduler state
    pub fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            count: self.registry.len(),
            capacity: N,
            current: self.current.map(AppHandle::index),
            rotation_enabled: self.rotation_enabled,
        }
    }

    /// Iterate over active apps, marking the current one
    pub fn list(&self) -> impl Iterator<Item = AppEntry<'_>> + Clone + '_ {
        let current = self.current;
        self.registry.iter().map(move |(handle, item)| AppEntry {
            handle,
            item,
            is_current: current == Some(handle),
        })
    }

    /// Create or replace an app
    pub fn add_or_update(&mut self, record: &AppRecord, now: u32) -> Result<AppHandle, RegistryError> {
        self.registry.add_or_update(record, now)
    }

    /// Update text, icon or colors of an app
    pub fn update_content(
        &mut self,
        id: &str,
        patch: &ContentPatch<'_>,
        now: u32,
    ) -> Result<AppHandle, RegistryError> {
        self.registry.update_content(id, patch, now)
    }

    /// Remove an app, clearing the selection if it was on screen
    pub fn remove(&mut self, id: &str) -> Result<(), RegistryError> {
        let handle = self.registry.remove(id)?;
        if self.current == Some(handle) {
            self.current = None;
        }
        Ok(())
    }

    /// Register the built-in clock and date apps enabled in `settings`
    pub fn seed_system_apps(&mut self, settings: &Settings, now: u32) -> Result<(), RegistryError> {
        if settings.clock.enabled {
            self.seed(CLOCK_APP_ID, settings.clock.color, now)?;
        }
        if settings.date.enabled {
            self.seed(DATE_APP_ID, settings.date.color, now)?;
        }
        Ok(())
    }

    fn seed(&mut self, id: &str, color: Color, now: u32) -> Result<(), RegistryError> {
        let record = AppRecord::system(id)?.with_colors(color, Color::BLACK);
        self.registry.add_or_update(&record, now)?;
        Ok(())
    }

    fn select(&mut self, handle: AppHandle, now: u32) -> Selection {
        self.current = Some(handle);
        self.last_switch = now;
        if let Some(item) = self.registry.get(handle) {
            debug!("Switched to app {}", item.id.as_str());
        }
        Selection::Switched(handle)
    }

    /// Advance the schedule to `now`
    ///
    /// Expires old apps first, then selects or rotates. With nothing on
    /// screen the scan starts over from slot 0. A lone app never "switches"
    /// to itself; its duration timer just restarts.
    pub fn tick(&mut self, now: u32) -> Selection {
        let expired = self.registry.expire(now);
        if let Some(current) = self.current {
            if expired.contains(&current) {
                self.current = None;
            }
        }

        let Some(current) = self.current else {
            return match self.registry.next_after(None) {
                Some(handle) => self.select(handle, now),
                None => Selection::Empty,
            };
        };

        if !self.rotation_enabled {
            return Selection::Unchanged;
        }

        let duration = self.registry.get(current).map_or(0, |item| item.duration_ms);
        if now.wrapping_sub(self.last_switch) < duration {
            return Selection::Unchanged;
        }

        match self.registry.next_after(Some(current.index())) {
            Some(next) if next != current => self.select(next, now),
            _ => {
                self.last_switch = now;
                Selection::Unchanged
            }
        }
    }
}

impl<const N: usize> Default for Scheduler<N> {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}
