//! Simple TOML parser for display settings
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! PixelCast settings. It does NOT support full TOML syntax.
//!
//! Supported features:
//! - Key = value pairs (string, integer, boolean)
//! - Inline integer arrays for colors: color = [255, 128, 0]
//! - [section] and [apps.section] headers
//! - Comments (# ...)
//!
//! NOT supported:
//! - Multi-line strings or arrays
//! - Datetime values
//! - Dotted keys outside section headers

use super::types::{Color, DateFormat, Settings, MIN_BRIGHTNESS};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// Key/value line outside any section
    KeyOutsideSection,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Display,
    Clock,
    Date,
    Scroll,
    Icons,
}

/// Parse TOML settings, starting from the built-in defaults
///
/// Keys that are absent keep their default value. Unknown keys inside a
/// known section are ignored so older firmware accepts newer files.
pub fn parse_settings(input: &str) -> Result<Settings, ParseError> {
    let mut settings = Settings::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        if let Some((key, value)) = parse_key_value(line) {
            apply_value(section, key, value, &mut settings)?;
        }
    }

    Ok(settings)
}

/// Parse section header like "display", "clock" or "apps.clock"
fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    let header = header.trim();
    let name = header.strip_prefix("apps.").unwrap_or(header);

    match name {
        "display" => Ok(Section::Display),
        "clock" => Ok(Section::Clock),
        "date" => Ok(Section::Date),
        "scroll" => Ok(Section::Scroll),
        "icons" => Ok(Section::Icons),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments; a # inside a string ("#FF0000" colors) is kept
    let value = value
        .match_indices('#')
        .map(|(pos, _)| pos)
        .find(|&pos| value[..pos].matches('"').count() % 2 == 0)
        .map_or(value, |pos| value[..pos].trim());

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> &str {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        &value[1..value.len() - 1]
    } else {
        // Allow unquoted strings for simple values
        value
    }
}

/// Parse an integer value
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value
        .replace_underscores()
        .parse()
        .map_err(|_| ParseError::InvalidValue)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Parse a color given as `[r, g, b]`, `"#RRGGBB"` or a packed integer
fn parse_color(value: &str) -> Result<Color, ParseError> {
    if let Some(inner) = value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
        let mut channels = [0u8; 3];
        let mut count = 0;
        for part in inner.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            if count == 3 {
                return Err(ParseError::InvalidValue);
            }
            channels[count] = parse_int(part)?;
            count += 1;
        }
        if count != 3 {
            return Err(ParseError::InvalidValue);
        }
        return Ok(Color::rgb(channels[0], channels[1], channels[2]));
    }

    let text = parse_string(value);
    if let Some(hex) = text.strip_prefix('#') {
        if hex.len() != 6 {
            return Err(ParseError::InvalidValue);
        }
        return u32::from_str_radix(hex, 16)
            .map(Color)
            .map_err(|_| ParseError::InvalidValue);
    }

    let packed: u32 = parse_int(text)?;
    if packed > 0xFF_FFFF {
        return Err(ParseError::InvalidValue);
    }
    Ok(Color(packed))
}

/// Apply a key/value pair to the settings for the current section
fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    settings: &mut Settings,
) -> Result<(), ParseError> {
    match section {
        Section::Root => return Err(ParseError::KeyOutsideSection),
        Section::Display => {
            let display = &mut settings.display;
            match key {
                "brightness" => {
                    let brightness: u8 = parse_int(value)?;
                    display.brightness = brightness.max(MIN_BRIGHTNESS);
                }
                "auto_rotate" | "autoRotate" => display.auto_rotate = parse_bool(value)?,
                "default_duration_ms" | "defaultDuration" => {
                    let duration: u32 = parse_int(value)?;
                    if duration == 0 {
                        return Err(ParseError::InvalidValue);
                    }
                    display.default_duration_ms = duration;
                }
                "width" => display.width = parse_int(value)?,
                "height" => display.height = parse_int(value)?,
                "icon_column" => display.icon_column = parse_int(value)?,
                "text_margin" => display.text_margin = parse_int(value)?,
                _ => debug!("Ignoring unknown display key"),
            }
        }
        Section::Clock => {
            let clock = &mut settings.clock;
            match key {
                "enabled" => clock.enabled = parse_bool(value)?,
                "format_24h" | "format24h" => clock.format_24h = parse_bool(value)?,
                "show_seconds" | "showSeconds" => clock.show_seconds = parse_bool(value)?,
                "color" => clock.color = parse_color(value)?,
                _ => debug!("Ignoring unknown clock key"),
            }
        }
        Section::Date => {
            let date = &mut settings.date;
            match key {
                "enabled" => date.enabled = parse_bool(value)?,
                "format" => {
                    date.format = DateFormat::from_pattern(parse_string(value))
                        .ok_or(ParseError::InvalidValue)?
                }
                "color" => date.color = parse_color(value)?,
                _ => debug!("Ignoring unknown date key"),
            }
        }
        Section::Scroll => {
            let scroll = &mut settings.scroll;
            match key {
                "step_ms" => {
                    let step: u32 = parse_int(value)?;
                    if step == 0 {
                        return Err(ParseError::InvalidValue);
                    }
                    scroll.step_ms = step;
                }
                "pause_ms" => scroll.pause_ms = parse_int(value)?,
                "margin" => scroll.margin = parse_int(value)?,
                _ => debug!("Ignoring unknown scroll key"),
            }
        }
        Section::Icons => {
            let icons = &mut settings.icons;
            match key {
                "max_source_bytes" => icons.max_source_bytes = parse_int(value)?,
                "max_dimension" => {
                    let dim: u16 = parse_int(value)?;
                    if dim == 0 {
                        return Err(ParseError::InvalidValue);
                    }
                    icons.max_dimension = dim;
                }
                _ => debug!("Ignoring unknown icons key"),
            }
        }
    }

    Ok(())
}

/// TOML integers may contain `_` separators
trait ReplaceUnderscores {
    fn replace_underscores(&self) -> heapless::String<24>;
}

impl ReplaceUnderscores for str {
    fn replace_underscores(&self) -> heapless::String<24> {
        let mut out = heapless::String::new();
        for ch in self.chars().filter(|c| *c != '_') {
            if out.push(ch).is_err() {
                // Too long to be any integer we accept; the parse will fail
                break;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{ClockSettings, DEFAULT_APP_DURATION_MS};
    use crate::config::DEFAULT_SETTINGS_TOML;

    #[test]
    fn test_empty_input_gives_defaults() {
        let settings = parse_settings("").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_embedded_defaults_parse() {
        let settings = parse_settings(DEFAULT_SETTINGS_TOML).unwrap();
        assert_eq!(settings.display.default_duration_ms, DEFAULT_APP_DURATION_MS);
        assert!(settings.display.auto_rotate);
        assert_eq!(settings.clock, ClockSettings::default());
    }

    #[test]
    fn test_embedded_defaults_are_valid_toml() {
        // The subset parser is lenient; make sure the shipped file is real TOML too
        let parsed: Result<::toml::Table, _> = ::toml::from_str(DEFAULT_SETTINGS_TOML);
        assert!(parsed.is_ok());
    }

    #[test]
    fn test_display_section() {
        let input = r#"
            # Display options
            [display]
            brightness = 40
            auto_rotate = false
            default_duration_ms = 5_000   # five seconds
        "#;
        let settings = parse_settings(input).unwrap();
        assert_eq!(settings.display.brightness, 40);
        assert!(!settings.display.auto_rotate);
        assert_eq!(settings.display.default_duration_ms, 5000);
    }

    #[test]
    fn test_zero_brightness_is_clamped() {
        let settings = parse_settings("[display]\nbrightness = 0").unwrap();
        assert_eq!(settings.display.brightness, MIN_BRIGHTNESS);
    }

    #[test]
    fn test_color_forms() {
        let input = r##"
            [apps.clock]
            color = [255, 0, 16]
            [apps.date]
            color = "#00FF80" # hex
            format = "YYYY-MM-DD"
        "##;
        let settings = parse_settings(input).unwrap();
        assert_eq!(settings.clock.color, Color::rgb(255, 0, 16));
        assert_eq!(settings.date.color, Color(0x00FF80));
        assert_eq!(settings.date.format, DateFormat::Iso);

        let settings = parse_settings("[clock]\ncolor = 16711680").unwrap();
        assert_eq!(settings.clock.color, Color(0xFF0000));
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            parse_settings("[clock]\ncolor = [1, 2]"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_settings("[clock]\ncolor = \"#12\""),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_settings("[display]\nauto_rotate = yes"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_settings("[display]\ndefault_duration_ms = 0"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_settings("[scroll]\nstep_ms = 0"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_settings("[date]\nformat = \"DD.MM.YY\""),
            Err(ParseError::InvalidValue)
        );
    }

    #[test]
    fn test_structure_errors() {
        assert_eq!(parse_settings("[wifi]"), Err(ParseError::InvalidSection));
        assert_eq!(
            parse_settings("brightness = 10"),
            Err(ParseError::KeyOutsideSection)
        );
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let settings = parse_settings("[display]\ncolor_depth = 6\ntransition = \"none\"").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_scroll_and_icons() {
        let input = "[scroll]\nstep_ms = 30\npause_ms = 1000\nmargin = 4\n[icons]\nmax_dimension = 32";
        let settings = parse_settings(input).unwrap();
        assert_eq!(settings.scroll.step_ms, 30);
        assert_eq!(settings.scroll.pause_ms, 1000);
        assert_eq!(settings.scroll.margin, 4);
        assert_eq!(settings.icons.max_dimension, 32);
    }
}
