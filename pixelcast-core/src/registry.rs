//! App registry
//!
//! Fixed-capacity table of scheduled screens. Slots are addressed by stable
//! [`AppHandle`]s; a free slot is `None`, so there is no separate "active"
//! flag that could disagree with the slot contents.

use heapless::{String, Vec};

use crate::config::{
    truncated, Color, MAX_APPS, MAX_ICON_NAME_LEN, MAX_ID_LEN, MAX_TEXT_LEN, PRIORITY_MAX,
    PRIORITY_MIN,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Registry errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// No free slot for a new id
    Full,
    /// Unknown id
    NotFound,
    /// Attempted mutation of a system app
    Protected,
    /// Empty or over-long id, or no usable duration
    Invalid,
}

/// Stable slot handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AppHandle(usize);

impl AppHandle {
    /// Slot index of this handle
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Request to create or replace an app
///
/// This is also the persisted form of an app: everything except the
/// bookkeeping the registry stamps itself.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AppRecord {
    /// Unique app id
    pub id: String<MAX_ID_LEN>,
    /// Text to display
    pub text: String<MAX_TEXT_LEN>,
    /// Icon name (empty = no icon)
    pub icon: String<MAX_ICON_NAME_LEN>,
    /// Text color
    pub text_color: Color,
    /// Background color (black = none)
    pub background_color: Color,
    /// Display time per rotation turn (ms, 0 = configured default)
    pub duration_ms: u32,
    /// Age after which the app is dropped (ms, 0 = never)
    pub lifetime_ms: u32,
    /// Reserved for preemption; does not affect rotation order
    pub priority: i8,
    /// Built-in app that the mutation API cannot remove
    pub is_system: bool,
}

impl AppRecord {
    /// Create a record for a user app with default content
    pub fn new(id: &str) -> Result<Self, RegistryError> {
        if id.is_empty() {
            return Err(RegistryError::Invalid);
        }
        let id = String::try_from(id).map_err(|_| RegistryError::Invalid)?;
        Ok(Self {
            id,
            text: String::new(),
            icon: String::new(),
            text_color: Color::WHITE,
            background_color: Color::BLACK,
            duration_ms: 0,
            lifetime_ms: 0,
            priority: 0,
            is_system: false,
        })
    }

    /// Create a record for a built-in app
    pub fn system(id: &str) -> Result<Self, RegistryError> {
        Ok(Self {
            is_system: true,
            ..Self::new(id)?
        })
    }

    /// Set the text, truncating to the maximum length
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = truncated(text);
        self
    }

    /// Set the icon name, truncating to the maximum length
    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = truncated(icon);
        self
    }

    pub fn with_colors(mut self, text_color: Color, background_color: Color) -> Self {
        self.text_color = text_color;
        self.background_color = background_color;
        self
    }

    pub fn with_duration(mut self, duration_ms: u32) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn with_lifetime(mut self, lifetime_ms: u32) -> Self {
        self.lifetime_ms = lifetime_ms;
        self
    }

    pub fn with_priority(mut self, priority: i8) -> Self {
        self.priority = priority;
        self
    }
}

/// Partial content update (text, icon and colors only)
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentPatch<'a> {
    pub text: Option<&'a str>,
    pub icon: Option<&'a str>,
    pub text_color: Option<Color>,
    pub background_color: Option<Color>,
}

/// One registered app
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AppItem {
    /// Unique app id (immutable)
    pub id: String<MAX_ID_LEN>,
    pub text: String<MAX_TEXT_LEN>,
    /// Icon name (empty = no icon)
    pub icon: String<MAX_ICON_NAME_LEN>,
    pub text_color: Color,
    pub background_color: Color,
    /// Display time per rotation turn (ms, always > 0)
    pub duration_ms: u32,
    /// Age after which the app expires (ms, 0 = never)
    pub lifetime_ms: u32,
    /// Timestamp of creation or last update (ms)
    pub created_at: u32,
    /// Clamped to `PRIORITY_MIN..=PRIORITY_MAX`
    pub priority: i8,
    /// Built-in app
    pub is_system: bool,
    /// Changes whenever the content changes
    pub revision: u32,
}

impl AppItem {
    /// Check whether the app has outlived its lifetime at `now`
    pub fn is_expired(&self, now: u32) -> bool {
        self.lifetime_ms > 0 && now.wrapping_sub(self.created_at) >= self.lifetime_ms
    }

    /// Check whether the app has an icon to resolve
    pub fn has_icon(&self) -> bool {
        !self.icon.is_empty()
    }

    /// Convert back to the persisted form
    pub fn to_record(&self) -> AppRecord {
        AppRecord {
            id: self.id.clone(),
            text: self.text.clone(),
            icon: self.icon.clone(),
            text_color: self.text_color,
            background_color: self.background_color,
            duration_ms: self.duration_ms,
            lifetime_ms: self.lifetime_ms,
            priority: self.priority,
            is_system: self.is_system,
        }
    }
}

/// Fixed-capacity app table
#[derive(Debug, Clone)]
pub struct AppRegistry<const N: usize = MAX_APPS> {
    /// Slots; `None` is free
    slots: [Option<AppItem>; N],
    /// Duration used when a record asks for 0
    default_duration_ms: u32,
    /// Next revision stamp
    next_revision: u32,
}

impl<const N: usize> AppRegistry<N> {
    /// Create an empty registry
    pub fn new(default_duration_ms: u32) -> Self {
        Self {
            slots: core::array::from_fn(|_| None),
            default_duration_ms,
            next_revision: 1,
        }
    }

    /// Change the fallback duration for future requests
    pub fn set_default_duration(&mut self, duration_ms: u32) {
        self.default_duration_ms = duration_ms;
    }

    /// Get the fallback duration
    pub fn default_duration(&self) -> u32 {
        self.default_duration_ms
    }

    /// Number of slots
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of active apps
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Check if no app is active
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| s.is_none())
    }

    /// Check if every slot is taken
    pub fn is_full(&self) -> bool {
        self.slots.iter().all(|s| s.is_some())
    }

    /// Find the slot holding `id`
    pub fn find(&self, id: &str) -> Option<AppHandle> {
        self.slots
            .iter()
            .position(|s| s.as_ref().is_some_and(|app| app.id.as_str() == id))
            .map(AppHandle)
    }

    /// Get the app in a slot
    pub fn get(&self, handle: AppHandle) -> Option<&AppItem> {
        self.slots.get(handle.0).and_then(|s| s.as_ref())
    }

    /// Get an app by id
    pub fn get_by_id(&self, id: &str) -> Option<&AppItem> {
        self.find(id).and_then(|h| self.get(h))
    }

    /// Iterate over active apps in slot order
    pub fn iter(&self) -> impl Iterator<Item = (AppHandle, &AppItem)> + Clone + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|app| (AppHandle(i), app)))
    }

    fn take_revision(&mut self) -> u32 {
        let revision = self.next_revision;
        self.next_revision = self.next_revision.wrapping_add(1);
        revision
    }

    /// Create an app, or replace every mutable field of an existing one
    ///
    /// Updating refreshes `created_at`, so the lifetime restarts.
    pub fn add_or_update(&mut self, record: &AppRecord, now: u32) -> Result<AppHandle, RegistryError> {
        if record.id.is_empty() {
            return Err(RegistryError::Invalid);
        }

        let duration_ms = if record.duration_ms > 0 {
            record.duration_ms
        } else {
            self.default_duration_ms
        };
        if duration_ms == 0 {
            return Err(RegistryError::Invalid);
        }
        let priority = record.priority.clamp(PRIORITY_MIN, PRIORITY_MAX);

        if let Some(handle) = self.find(&record.id) {
            if self.slots[handle.0].as_ref().is_some_and(|a| a.is_system) && !record.is_system {
                warn!("Cannot overwrite system app {}", record.id.as_str());
                return Err(RegistryError::Protected);
            }

            let revision = self.take_revision();
            if let Some(app) = self.slots[handle.0].as_mut() {
                app.text = record.text.clone();
                app.icon = record.icon.clone();
                app.text_color = record.text_color;
                app.background_color = record.background_color;
                app.duration_ms = duration_ms;
                app.lifetime_ms = record.lifetime_ms;
                app.priority = priority;
                app.created_at = now;
                app.revision = revision;
            }
            info!("Updated app {}", record.id.as_str());
            return Ok(handle);
        }

        let Some(index) = self.slots.iter().position(|s| s.is_none()) else {
            warn!("No empty slot for app {}", record.id.as_str());
            return Err(RegistryError::Full);
        };

        let revision = self.take_revision();
        self.slots[index] = Some(AppItem {
            id: record.id.clone(),
            text: record.text.clone(),
            icon: record.icon.clone(),
            text_color: record.text_color,
            background_color: record.background_color,
            duration_ms,
            lifetime_ms: record.lifetime_ms,
            created_at: now,
            priority,
            is_system: record.is_system,
            revision,
        });
        info!(
            "Added app {} (slot {}, total {})",
            record.id.as_str(),
            index,
            self.len()
        );
        Ok(AppHandle(index))
    }

    /// Update only the content fields of a user app
    pub fn update_content(
        &mut self,
        id: &str,
        patch: &ContentPatch<'_>,
        now: u32,
    ) -> Result<AppHandle, RegistryError> {
        let handle = self.find(id).ok_or(RegistryError::NotFound)?;
        if self.slots[handle.0].as_ref().is_some_and(|a| a.is_system) {
            return Err(RegistryError::Protected);
        }

        let revision = self.take_revision();
        if let Some(app) = self.slots[handle.0].as_mut() {
            if let Some(text) = patch.text {
                app.text = truncated(text);
            }
            if let Some(icon) = patch.icon {
                app.icon = truncated(icon);
            }
            if let Some(color) = patch.text_color {
                app.text_color = color;
            }
            if let Some(color) = patch.background_color {
                app.background_color = color;
            }
            app.created_at = now;
            app.revision = revision;
        }
        debug!("Patched app {}", id);
        Ok(handle)
    }

    /// Remove a user app, freeing its slot
    ///
    /// Returns the freed handle so the caller can drop references to it.
    pub fn remove(&mut self, id: &str) -> Result<AppHandle, RegistryError> {
        let handle = self.find(id).ok_or(RegistryError::NotFound)?;
        if self.slots[handle.0].as_ref().is_some_and(|a| a.is_system) {
            warn!("Cannot remove system app {}", id);
            return Err(RegistryError::Protected);
        }
        self.slots[handle.0] = None;
        info!("Removed app {}", id);
        Ok(handle)
    }

    /// Drop every app whose lifetime has elapsed at `now`
    ///
    /// Returns the handles that were freed.
    pub fn expire(&mut self, now: u32) -> Vec<AppHandle, N> {
        let mut expired = Vec::new();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.as_ref().is_some_and(|app| app.is_expired(now)) {
                if let Some(app) = slot.take() {
                    info!("App expired: {}", app.id.as_str());
                }
                // Cannot overflow: at most one entry per slot
                let _ = expired.push(AppHandle(i));
            }
        }
        expired
    }

    /// Circular scan for the next active app after slot `after`
    ///
    /// `None` starts the scan at slot 0. The slot itself is checked last, so
    /// a registry with a single app returns that app.
    pub fn next_after(&self, after: Option<usize>) -> Option<AppHandle> {
        if N == 0 {
            return None;
        }
        let start = after.map_or(0, |i| (i + 1) % N);
        (0..N)
            .map(|offset| (start + offset) % N)
            .find(|&i| self.slots[i].is_some())
            .map(AppHandle)
    }
}

impl<const N: usize> Default for AppRegistry<N> {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_APP_DURATION_MS)
    }
}
