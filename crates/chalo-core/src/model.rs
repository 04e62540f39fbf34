// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Chalo contributors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minutes spent at each stop, added on top of the walking time.
pub const DWELL_MINUTES_PER_STOP: u32 = 30;

/// A single point of interest. Replaced wholesale, never patched in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stop {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub image_url: String,
    /// Walk to the next stop, in minutes
    pub walking_time_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Itinerary {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Derived from `stops`; see [`total_duration`]
    pub duration_minutes: u32,
    pub stops: Vec<Stop>,
}

impl Itinerary {
    pub fn recompute_duration(&mut self) -> u32 {
        self.duration_minutes = total_duration(&self.stops);
        self.duration_minutes
    }

    pub fn stop(&self, id: &str) -> Option<&Stop> {
        self.stops.iter().find(|s| s.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.stops.iter().position(|s| s.id == id)
    }

    /// Duration in hours rounded to one decimal, as shown in trip headers.
    pub fn duration_hours(&self) -> f64 {
        (self.duration_minutes as f64 / 60.0 * 10.0).round() / 10.0
    }
}

/// Sum of walking times plus a fixed dwell per stop. Saturates at `u32::MAX`.
pub fn total_duration(stops: &[Stop]) -> u32 {
    stops.iter().fold(0u32, |acc, s| {
        acc.saturating_add(s.walking_time_minutes.saturating_add(DWELL_MINUTES_PER_STOP))
    })
}

/// The single itinerary the user is currently on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveTrip {
    pub itinerary: Itinerary,
    pub location: String,
    #[serde(rename = "startedAt")]
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSource {
    pub uri: String,
    pub title: String,
}

/// Grounding link returned alongside generated itineraries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub web: WebSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItineraryResponse {
    pub itineraries: Vec<Itinerary>,
    #[serde(default)]
    pub sources: Vec<Source>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapsConfig {
    pub maps_api_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(id: &str, walk: u32) -> Stop {
        Stop {
            id: id.to_string(),
            name: format!("Stop {}", id),
            category: "Cafe".to_string(),
            description: None,
            image_url: "https://example.com/a.jpg".to_string(),
            walking_time_minutes: walk,
        }
    }

    #[test]
    fn test_total_duration_adds_dwell_per_stop() {
        assert_eq!(total_duration(&[]), 0);
        assert_eq!(total_duration(&[stop("a", 5), stop("b", 10)]), 75);
    }

    #[test]
    fn test_total_duration_saturates_on_huge_walking_time() {
        let huge: Stop = serde_json::from_str(
            r#"{"id":"x","name":"Far","category":"Trail","image_url":"","walking_time_minutes":4294967295}"#,
        )
        .unwrap();
        assert_eq!(total_duration(&[huge.clone()]), u32::MAX);
        assert_eq!(total_duration(&[stop("a", 5), huge]), u32::MAX);
    }

    #[test]
    fn test_recompute_duration_is_idempotent() {
        let mut itinerary = Itinerary {
            id: "it-1".into(),
            title: "Morning".into(),
            description: "".into(),
            duration_minutes: 0,
            stops: vec![stop("a", 5), stop("b", 8), stop("c", 10)],
        };
        let first = itinerary.recompute_duration();
        let second = itinerary.recompute_duration();
        assert_eq!(first, 113);
        assert_eq!(first, second);
        assert_eq!(itinerary.duration_hours(), 1.9);
    }

    #[test]
    fn test_stop_wire_format() {
        let json = r#"{"id":"s1","name":"Blue Bottle","category":"Cafe",
            "walking_time_minutes":7,"image_url":"https://example.com/x.jpg"}"#;
        let parsed: Stop = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.walking_time_minutes, 7);
        assert!(parsed.description.is_none());

        let out = serde_json::to_string(&parsed).unwrap();
        assert!(!out.contains("description"));
        assert!(out.contains("\"image_url\""));
    }

    #[test]
    fn test_active_trip_uses_started_at_key() {
        let trip = ActiveTrip {
            itinerary: Itinerary {
                id: "it".into(),
                title: "t".into(),
                description: "d".into(),
                duration_minutes: 35,
                stops: vec![stop("a", 5)],
            },
            location: "Austin".into(),
            started_at: Utc::now(),
        };
        let value = serde_json::to_value(&trip).unwrap();
        assert!(value.get("startedAt").is_some());
        assert!(value.get("started_at").is_none());
    }

    #[test]
    fn test_response_sources_default_to_empty() {
        let parsed: ItineraryResponse = serde_json::from_str(r#"{"itineraries":[]}"#).unwrap();
        assert!(parsed.sources.is_empty());
    }
}
