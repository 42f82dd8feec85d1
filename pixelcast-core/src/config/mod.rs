//! Configuration types
//!
//! Settings types, limits, and the TOML subset parser for the settings file.

pub mod toml;
pub mod types;

pub use self::toml::{parse_settings, ParseError};
pub use types::*;

/// Default settings shipped with the firmware image
pub const DEFAULT_SETTINGS_TOML: &str = include_str!("../../default_settings.toml");
