// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Chalo contributors

use super::{
    AvailableSpotsRequest, AvailableSpotsResponse, CustomTripRequest, ItineraryRequest,
    ProviderError, ProviderErrorKind, RefreshCategoryRequest, RefreshSpotRequest, SpotProvider,
};
use crate::model::{ItineraryResponse, MapsConfig, Stop};
use crate::settings::Settings;
use log::{debug, info, warn};
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::{Duration, Instant};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Blocking JSON client for the recommendation backend.
pub struct HttpSpotProvider {
    client: Client,
    base_url: String,
}

impl HttpSpotProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            ProviderError::new(
                ProviderErrorKind::Network,
                format!("Failed to create HTTP client: {}", e),
            )
        })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ProviderError> {
        Self::new(
            &settings.api_base_url,
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ProviderError> {
        let url = self.url(path);
        let start = Instant::now();
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .map_err(|e| transport_error(path, e))?;
        debug!(
            "POST complete — path={} status={} elapsed_ms={}",
            path,
            response.status(),
            start.elapsed().as_millis()
        );
        decode(path, response)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ProviderError> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| transport_error(path, e))?;
        debug!("GET complete — path={} status={}", path, response.status());
        decode(path, response)
    }
}

impl SpotProvider for HttpSpotProvider {
    fn itineraries(&self, request: &ItineraryRequest) -> Result<ItineraryResponse, ProviderError> {
        let response: ItineraryResponse = self.post_json("/api/itineraries", request)?;
        info!(
            "Fetched itineraries — location={} preset={:?} count={}",
            request.location,
            request.preset,
            response.itineraries.len()
        );
        Ok(response)
    }

    fn custom_trips(
        &self,
        request: &CustomTripRequest,
    ) -> Result<ItineraryResponse, ProviderError> {
        let response: ItineraryResponse = self.post_json("/api/custom-trips", request)?;
        info!(
            "Fetched custom trips — location={} categories={} count={}",
            request.location,
            request.categories.len(),
            response.itineraries.len()
        );
        Ok(response)
    }

    fn refresh_spot(&self, request: &RefreshSpotRequest) -> Result<Stop, ProviderError> {
        self.post_json("/api/refresh-spot", request)
    }

    fn refresh_category(&self, request: &RefreshCategoryRequest) -> Result<Stop, ProviderError> {
        self.post_json("/api/refresh-category", request)
    }

    fn available_spots(
        &self,
        request: &AvailableSpotsRequest,
    ) -> Result<Vec<Stop>, ProviderError> {
        let response: AvailableSpotsResponse =
            self.post_json("/api/get-available-spots", request)?;
        Ok(response.spots)
    }

    fn maps_config(&self) -> Result<MapsConfig, ProviderError> {
        self.get_json("/api/maps-config")
    }

    fn health(&self) -> bool {
        match self.client.get(self.url("/api/health")).send() {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("Health check failed — base_url={} error={}", self.base_url, e);
                false
            }
        }
    }
}

fn decode<T: DeserializeOwned>(path: &str, response: Response) -> Result<T, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        let detail = response.text().ok().and_then(|body| extract_detail(&body));
        let err = classify(status.as_u16(), detail);
        warn!(
            "Provider request rejected — path={} status={} kind={:?} detail={}",
            path, status, err.kind, err.message
        );
        return Err(err);
    }

    response.json::<T>().map_err(|e| {
        warn!("Malformed provider response — path={} error={}", path, e);
        ProviderError::new(
            ProviderErrorKind::InvalidResponse,
            format!("Parse error: {}", e),
        )
    })
}

fn transport_error(path: &str, e: reqwest::Error) -> ProviderError {
    warn!("Provider unreachable — path={} error={}", path, e);
    let kind = if e.is_decode() {
        ProviderErrorKind::InvalidResponse
    } else {
        ProviderErrorKind::Network
    };
    ProviderError::new(kind, e.to_string())
}

/// Pulls `detail` out of an error body, if it is a string.
fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("detail")
        .and_then(|d| d.as_str())
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

/// Maps a failed response to an error kind. Domain refusals are recognised
/// from the server's detail text here and nowhere else.
fn classify(status: u16, detail: Option<String>) -> ProviderError {
    let message = detail.unwrap_or_else(|| format!("HTTP error! status: {}", status));

    let kind = if message.contains("No alternative categories available") {
        ProviderErrorKind::NoAlternativeCategories
    } else if message.contains("Could not find alternative spots") {
        ProviderErrorKind::NoAlternativeSpots
    } else if message.contains("No cached results found") {
        ProviderErrorKind::NoCachedResults
    } else {
        match status {
            400 => ProviderErrorKind::BadRequest,
            404 => ProviderErrorKind::NotFound,
            429 => ProviderErrorKind::RateLimited,
            500..=599 => ProviderErrorKind::Server,
            other => ProviderErrorKind::Http(other),
        }
    };

    ProviderError::new(kind, message)
}
