//! Display controller coordinating scheduler, scroll and icons
//!
//! The controller is the single owner of all display state. Once per loop
//! iteration it:
//! - Applies queued commands
//! - Ticks the scheduler
//! - Restarts the scroll animation when the app on screen changes
//! - Steps the scroll animation
//!
//! [`Controller::frame`] then resolves the icon and hands the renderer
//! everything it needs for one frame.

use heapless::Deque;

use crate::command::Command;
use crate::config::{Settings, MAX_APPS, MAX_ICON_CACHE};
use crate::icons::{builtin, BitmapView, CacheStats, IconCache};
use crate::registry::{AppHandle, AppItem, AppRecord, ContentPatch, RegistryError};
use crate::scheduler::{AppEntry, Scheduler, SchedulerStatus, Selection};
use crate::scroll::{ScrollEngine, ScrollFrame};
use crate::traits::{AssetSource, Decoder, MonotonicClock, TextMetrics};
#[cfg(feature = "serde")]
use crate::{
    persist::{self, PersistError},
    traits::SnapshotStore,
};

/// Commands that can wait for the next tick
pub const COMMAND_QUEUE_DEPTH: usize = 8;

/// What to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame<'a> {
    /// An app is on screen
    App {
        handle: AppHandle,
        item: &'a AppItem,
        /// `None` when the app has no icon or it failed to load
        icon: Option<BitmapView<'a>>,
        scroll: ScrollFrame,
    },
    /// No apps registered
    Idle,
}

/// Controller status summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerStatus {
    pub apps: SchedulerStatus,
    pub cached_icons: usize,
    pub icon_bytes: usize,
    pub icons: CacheStats,
    pub queued_commands: usize,
}

/// Display controller
pub struct Controller<const A: usize = MAX_APPS, const I: usize = MAX_ICON_CACHE> {
    scheduler: Scheduler<A>,
    icons: IconCache<I>,
    scroll: ScrollEngine,
    settings: Settings,
    commands: Deque<Command, COMMAND_QUEUE_DEPTH>,
    /// Set by every successful mutation
    dirty: bool,
    /// App the scroll engine was last reset for, with its revision
    shown: Option<(AppHandle, u32)>,
    /// App whose icon failed to load, with its revision
    icon_failed: Option<(AppHandle, u32)>,
    /// Timestamp of the last tick (ms)
    last_tick_ms: u32,
}

impl<const A: usize, const I: usize> Controller<A, I> {
    /// Create a controller with no apps
    pub fn new(settings: Settings) -> Self {
        Self {
            scheduler: Scheduler::from_settings(&settings),
            icons: IconCache::new(settings.icons),
            scroll: ScrollEngine::new(settings.scroll),
            settings,
            commands: Deque::new(),
            dirty: false,
            shown: None,
            icon_failed: None,
            last_tick_ms: 0,
        }
    }

    /// Register the built-in clock and date apps
    pub fn seed_system_apps(&mut self, now: u32) -> Result<(), RegistryError> {
        self.scheduler.seed_system_apps(&self.settings, now)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Apply new settings
    ///
    /// Existing apps keep their durations; the new default applies to
    /// later requests. Changed icon limits empty the cache.
    pub fn apply_settings(&mut self, settings: Settings) {
        self.scheduler
            .set_default_duration(settings.display.default_duration_ms);
        self.scheduler.set_rotation(settings.display.auto_rotate);
        if settings.scroll != self.settings.scroll {
            self.scroll.set_config(settings.scroll);
        }
        self.icons.set_limits(settings.icons);
        if settings.display != self.settings.display {
            // Viewport may have changed
            self.shown = None;
        }
        self.icon_failed = None;
        self.settings = settings;
        info!("Settings applied");
    }

    pub fn scheduler(&self) -> &Scheduler<A> {
        &self.scheduler
    }

    pub fn icons(&self) -> &IconCache<I> {
        &self.icons
    }

    /// Queue a command for the next tick
    ///
    /// Returns the command back if the queue is full.
    pub fn enqueue(&mut self, command: Command) -> Result<(), Command> {
        self.commands.push_back(command)
    }

    /// Apply a command immediately
    pub fn apply(&mut self, command: Command, now: u32) -> Result<(), RegistryError> {
        match command {
            Command::Upsert(record) => self.add_or_update(&record, now).map(|_| ()),
            Command::UpdateContent {
                id,
                text,
                icon,
                text_color,
                background_color,
            } => {
                let patch = ContentPatch {
                    text: text.as_deref(),
                    icon: icon.as_deref(),
                    text_color,
                    background_color,
                };
                self.update_content(&id, &patch, now).map(|_| ())
            }
            Command::Remove(id) => self.remove(&id),
            Command::InvalidateIcon(name) => {
                self.invalidate_icon(&name);
                Ok(())
            }
            Command::SetRotation(enabled) => {
                self.scheduler.set_rotation(enabled);
                Ok(())
            }
        }
    }

    fn drain_commands(&mut self, now: u32) {
        while let Some(command) = self.commands.pop_front() {
            if let Err(e) = self.apply(command, now) {
                warn!("Queued command rejected: {}", e);
            }
        }
    }

    /// Create or replace an app
    pub fn add_or_update(&mut self, record: &AppRecord, now: u32) -> Result<AppHandle, RegistryError> {
        let handle = self.scheduler.add_or_update(record, now)?;
        self.dirty = true;
        Ok(handle)
    }

    /// Update text, icon or colors of an app
    pub fn update_content(
        &mut self,
        id: &str,
        patch: &ContentPatch<'_>,
        now: u32,
    ) -> Result<AppHandle, RegistryError> {
        let handle = self.scheduler.update_content(id, patch, now)?;
        self.dirty = true;
        Ok(handle)
    }

    /// Remove an app
    pub fn remove(&mut self, id: &str) -> Result<(), RegistryError> {
        self.scheduler.remove(id)?;
        self.dirty = true;
        Ok(())
    }

    /// Iterate over active apps, marking the one on screen
    pub fn list(&self) -> impl Iterator<Item = AppEntry<'_>> + Clone + '_ {
        self.scheduler.list()
    }

    /// The app on screen
    pub fn current(&self) -> Option<&AppItem> {
        self.scheduler.current_item()
    }

    pub fn status(&self) -> ControllerStatus {
        ControllerStatus {
            apps: self.scheduler.status(),
            cached_icons: self.icons.len(),
            icon_bytes: self.icons.resident_bytes(),
            icons: self.icons.stats(),
            queued_commands: self.commands.len(),
        }
    }

    /// Check and clear the "apps changed" flag
    ///
    /// Persistence polls this to decide when to write a snapshot.
    pub fn take_dirty(&mut self) -> bool {
        core::mem::replace(&mut self.dirty, false)
    }

    /// Width available to an app's text
    fn viewport(&self, item: &AppItem) -> u16 {
        let display = &self.settings.display;
        let inset = if item.has_icon() {
            display.icon_column
        } else {
            display.text_margin
        };
        display.width.saturating_sub(inset)
    }

    /// Run one loop iteration
    pub fn tick<M>(&mut self, now: u32, metrics: &M) -> Selection
    where
        M: TextMetrics + ?Sized,
    {
        self.drain_commands(now);
        let selection = self.scheduler.tick(now);
        self.last_tick_ms = now;

        let shown = self
            .scheduler
            .current()
            .and_then(|h| self.scheduler.registry().get(h).map(|item| (h, item.revision)));
        if shown != self.shown {
            self.shown = shown;
            let (content, viewport) = match self.scheduler.current_item() {
                Some(item) => (metrics.text_width(&item.text), self.viewport(item)),
                None => (0, 0),
            };
            self.scroll.reset(content, viewport);
        }

        self.scroll.step(now);
        selection
    }

    /// Run one loop iteration at the clock's current time
    pub fn poll<C, M>(&mut self, clock: &C, metrics: &M) -> Selection
    where
        C: MonotonicClock + ?Sized,
        M: TextMetrics + ?Sized,
    {
        self.tick(clock.now_ms(), metrics)
    }

    /// Resolve everything needed to draw the current frame
    ///
    /// Icons are looked up in the built-in table first, then in the cache.
    /// An icon that fails to load is not retried until the app changes or
    /// the icon is invalidated.
    pub fn frame<S, D>(&mut self, source: &mut S, decoder: &mut D) -> Frame<'_>
    where
        S: AssetSource + ?Sized,
        D: Decoder + ?Sized,
    {
        let Some(handle) = self.scheduler.current() else {
            return Frame::Idle;
        };
        let Some(item) = self.scheduler.registry().get(handle) else {
            return Frame::Idle;
        };
        let scroll = self.scroll.frame();
        let key = (handle, item.revision);

        let icon = if !item.has_icon() || self.icon_failed == Some(key) {
            None
        } else if let Some(view) = builtin(&item.icon) {
            Some(view)
        } else {
            match self.icons.get(&item.icon, self.last_tick_ms, source, decoder) {
                Ok(view) => Some(view),
                Err(_) => {
                    self.icon_failed = Some(key);
                    None
                }
            }
        };

        Frame::App {
            handle,
            item,
            icon,
            scroll,
        }
    }

    /// Look up an icon by name
    pub fn get_icon<S, D>(&mut self, name: &str, now: u32, source: &mut S, decoder: &mut D) -> Option<BitmapView<'_>>
    where
        S: AssetSource + ?Sized,
        D: Decoder + ?Sized,
    {
        if let Some(view) = builtin(name) {
            return Some(view);
        }
        self.icons.get(name, now, source, decoder).ok()
    }

    /// Drop a cached icon so the next lookup reloads it
    pub fn invalidate_icon(&mut self, name: &str) -> bool {
        self.icon_failed = None;
        self.icons.invalidate(name)
    }
}

#[cfg(feature = "serde")]
impl<const A: usize, const I: usize> Controller<A, I> {
    /// Write user apps to the store and clear the dirty flag
    pub fn save_apps<S>(&mut self, store: &mut S, buf: &mut [u8]) -> Result<usize, PersistError>
    where
        S: SnapshotStore + ?Sized,
    {
        let len = persist::save(&self.scheduler, store, buf)?;
        self.dirty = false;
        Ok(len)
    }

    /// Replay the stored user apps; call once at boot
    pub fn restore_apps<S>(&mut self, store: &mut S, buf: &mut [u8], now: u32) -> Result<usize, PersistError>
    where
        S: SnapshotStore + ?Sized,
    {
        persist::restore(store, &mut self.scheduler, buf, now)
    }
}

impl<const A: usize, const I: usize> Default for Controller<A, I> {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}
