// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Chalo contributors

//! Access to the remote service that supplies itineraries and replacement stops.

pub mod http;
pub mod mock;

pub use http::HttpSpotProvider;
pub use mock::MockSpotProvider;

use crate::model::{ItineraryResponse, MapsConfig, Stop};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryRequest {
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_distance_miles: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomTripRequest {
    pub location: String,
    pub categories: Vec<String>,
    pub max_distance_miles: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshSpotRequest {
    pub location: String,
    pub category: String,
    pub excluded_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshCategoryRequest {
    pub location: String,
    pub current_category: String,
    pub excluded_spot_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailableSpotsRequest {
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub excluded_ids: Vec<String>,
    pub max_distance_miles: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableSpotsResponse {
    pub spots: Vec<Stop>,
}

/// What went wrong talking to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// Connection refused, DNS failure, timeout
    Network,
    RateLimited,
    Server,
    BadRequest,
    NotFound,
    /// Any other non-success status
    Http(u16),
    /// Body missing or not the expected shape
    InvalidResponse,
    NoAlternativeCategories,
    NoAlternativeSpots,
    NoCachedResults,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    /// Raw detail, kept for logs and for 400/404 display
    pub message: String,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn user_message(&self) -> String {
        match &self.kind {
            ProviderErrorKind::Network => {
                "Unable to connect to the recommendation service. Please ensure the backend server is running."
                    .to_string()
            }
            ProviderErrorKind::RateLimited => "Too many requests. Please try again later.".to_string(),
            ProviderErrorKind::Server => "Server error occurred. Please try again.".to_string(),
            ProviderErrorKind::InvalidResponse => {
                "Invalid data format received from API.".to_string()
            }
            ProviderErrorKind::NoAlternativeCategories => {
                "All categories have been recently used. Try refreshing the same category instead, or search for a new location."
                    .to_string()
            }
            ProviderErrorKind::NoAlternativeSpots => {
                "No alternative spots found from different categories. Try refreshing the same category instead."
                    .to_string()
            }
            ProviderErrorKind::NoCachedResults => {
                "Please search for itineraries first before refreshing categories.".to_string()
            }
            ProviderErrorKind::BadRequest
            | ProviderErrorKind::NotFound
            | ProviderErrorKind::Http(_) => self.message.clone(),
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ProviderErrorKind::Http(status) => write!(f, "HTTP error ({}): {}", status, self.message),
            kind => write!(f, "Provider error ({:?}): {}", kind, self.message),
        }
    }
}

impl std::error::Error for ProviderError {}

/// The remote collaborator the editor and the search screens depend on.
pub trait SpotProvider {
    fn itineraries(&self, request: &ItineraryRequest) -> Result<ItineraryResponse, ProviderError>;

    fn custom_trips(&self, request: &CustomTripRequest)
        -> Result<ItineraryResponse, ProviderError>;

    /// Another stop of the same category.
    fn refresh_spot(&self, request: &RefreshSpotRequest) -> Result<Stop, ProviderError>;

    /// A stop from some other category.
    fn refresh_category(&self, request: &RefreshCategoryRequest) -> Result<Stop, ProviderError>;

    /// Candidates for insertion; an empty list is not an error.
    fn available_spots(&self, request: &AvailableSpotsRequest) -> Result<Vec<Stop>, ProviderError>;

    fn maps_config(&self) -> Result<MapsConfig, ProviderError>;

    fn health(&self) -> bool;
}
