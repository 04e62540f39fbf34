// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Chalo contributors

pub mod editor;
pub mod favorites;
pub mod model;
pub mod provider;
pub mod rotation;
pub mod search;
pub mod settings;
pub mod storage;
pub mod trip;

pub use editor::{ItineraryEditor, RefreshKind, RefreshOutcome, RefreshTicket, SessionId};
pub use favorites::FavoritesStore;
pub use model::{total_duration, ActiveTrip, Itinerary, Stop, DWELL_MINUTES_PER_STOP};
pub use provider::{ProviderError, ProviderErrorKind, SpotProvider};
pub use rotation::{CategoryRotation, AMNESTY_TURNS};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use trip::TripStore;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChaloError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("Storage error for key '{key}': {message}")]
    Storage { key: String, message: String },
}

impl ChaloError {
    /// Text suitable for showing to the user in place of the raw error.
    pub fn user_message(&self) -> String {
        match self {
            ChaloError::Validation(e) => e.to_string(),
            ChaloError::Provider(e) => e.user_message(),
            other => other.to_string(),
        }
    }

    pub fn provider_kind(&self) -> Option<&ProviderErrorKind> {
        match self {
            ChaloError::Provider(e) => Some(&e.kind),
            _ => None,
        }
    }
}

/// Input problems rejected locally, before any request is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please provide a location.")]
    EmptyLocation,
    #[error("Please select at least one category.")]
    NoCategorySelected,
    #[error("Unknown category '{0}'.")]
    UnknownCategory(String),
    #[error("Unknown preset '{0}'.")]
    UnknownPreset(String),
    #[error("Unknown price level '{0}'.")]
    UnknownPriceLevel(String),
    #[error("Cannot remove the last stop. An itinerary must have at least one stop.")]
    LastStop,
    #[error("Stop '{0}' is not part of this itinerary.")]
    StopNotFound(String),
    #[error("Position {index} is out of range for an itinerary with {len} stops.")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Stop '{0}' is already being refreshed.")]
    RefreshPending(String),
}

pub type Result<T> = std::result::Result<T, ChaloError>;

/// Directory holding settings and the default file-backed stores.
pub fn get_config_root() -> PathBuf {
    directories::ProjectDirs::from("org", "chalo", "Chalo")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".chalo"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_friendly_provider_text() {
        let err: ChaloError = ProviderError::new(ProviderErrorKind::RateLimited, "HTTP 429").into();
        assert_eq!(
            err.user_message(),
            "Too many requests. Please try again later."
        );
        assert_eq!(err.provider_kind(), Some(&ProviderErrorKind::RateLimited));
    }

    #[test]
    fn test_validation_message_is_display_text() {
        let err: ChaloError = ValidationError::LastStop.into();
        assert!(err.user_message().contains("at least one stop"));
        assert!(err.provider_kind().is_none());
    }
}
