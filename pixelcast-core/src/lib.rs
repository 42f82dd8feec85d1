//! Board-agnostic core logic for the PixelCast display firmware
//!
//! This crate contains all application logic that does not depend on
//! the panel driver, the network stack or the filesystem:
//!
//! - App registry and round-robin scheduler
//! - Bounded LRU cache of decoded icons
//! - Scroll animation state machine for overflowing text
//! - Controller that ties them together once per loop tick
//! - Settings types and TOML parsing
//! - Collaborator traits (decoder, asset source, clock, storage)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

#[macro_use]
mod fmt;

pub mod command;
pub mod config;
pub mod controller;
pub mod icons;
#[cfg(feature = "serde")]
pub mod persist;
pub mod registry;
pub mod scheduler;
pub mod scroll;
pub mod traits;

pub use command::Command;
pub use config::{Color, Settings};
pub use controller::{Controller, ControllerStatus, Frame};
pub use icons::{BitmapView, IconCache, IconError};
pub use registry::{AppHandle, AppItem, AppRecord, AppRegistry, ContentPatch, RegistryError};
pub use scheduler::{AppEntry, Scheduler, SchedulerStatus, Selection};
pub use scroll::{ScrollEngine, ScrollFrame, ScrollPhase};
