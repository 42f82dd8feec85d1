//! Queued mutation requests
//!
//! Network handlers run outside the render loop; they build a [`Command`]
//! and hand it to [`Controller::enqueue`](crate::controller::Controller::enqueue).
//! The controller applies queued commands at the start of its next tick.

use heapless::String;

use crate::config::{truncated, Color, MAX_ICON_NAME_LEN, MAX_ID_LEN, MAX_TEXT_LEN};
use crate::registry::{AppRecord, RegistryError};

/// Commands accepted by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Create or replace an app
    Upsert(AppRecord),
    /// Change text, icon or colors of an existing app
    UpdateContent {
        id: String<MAX_ID_LEN>,
        text: Option<String<MAX_TEXT_LEN>>,
        icon: Option<String<MAX_ICON_NAME_LEN>>,
        text_color: Option<Color>,
        background_color: Option<Color>,
    },
    /// Remove an app
    Remove(String<MAX_ID_LEN>),
    /// Drop a cached icon so it is reloaded from the asset source
    InvalidateIcon(String<MAX_ICON_NAME_LEN>),
    /// Turn rotation on or off
    SetRotation(bool),
}

impl Command {
    pub fn remove(id: &str) -> Result<Self, RegistryError> {
        String::try_from(id)
            .map(Command::Remove)
            .map_err(|_| RegistryError::Invalid)
    }

    /// Content update that only replaces the text
    pub fn set_text(id: &str, text: &str) -> Result<Self, RegistryError> {
        Ok(Command::UpdateContent {
            id: String::try_from(id).map_err(|_| RegistryError::Invalid)?,
            text: Some(truncated(text)),
            icon: None,
            text_color: None,
            background_color: None,
        })
    }

    pub fn invalidate_icon(name: &str) -> Self {
        Command::InvalidateIcon(truncated(name))
    }
}

impl From<AppRecord> for Command {
    fn from(record: AppRecord) -> Self {
        Command::Upsert(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(
            Command::remove("weather").unwrap(),
            Command::Remove(String::try_from("weather").unwrap())
        );
        assert_eq!(
            Command::remove("an_id_that_is_much_too_long_for_a_slot"),
            Err(RegistryError::Invalid)
        );

        match Command::set_text("weather", "21°C").unwrap() {
            Command::UpdateContent { id, text, icon, .. } => {
                assert_eq!(id.as_str(), "weather");
                assert_eq!(text.unwrap().as_str(), "21°C");
                assert!(icon.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }

        let record = AppRecord::new("x").unwrap();
        assert_eq!(Command::from(record.clone()), Command::Upsert(record));
    }
}
