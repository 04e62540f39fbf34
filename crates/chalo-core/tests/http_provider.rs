// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Chalo contributors

//! HttpSpotProvider against a local server replaying canned responses.

use chalo_core::provider::{
    AvailableSpotsRequest, HttpSpotProvider, ItineraryRequest, RefreshCategoryRequest,
    RefreshSpotRequest,
};
use chalo_core::{ChaloError, Itinerary, ItineraryEditor, ProviderErrorKind, SpotProvider, Stop};
use std::io::Read;
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tiny_http::{Header, Response, Server};

#[derive(Debug)]
struct Captured {
    method: String,
    path: String,
    body: serde_json::Value,
}

/// Serves one canned `(status, body)` per incoming request, then stops.
fn serve(replies: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<Captured>>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();

    let handle = thread::spawn(move || {
        let mut captured = Vec::new();
        for (status, body) in replies {
            let mut request = match server.recv() {
                Ok(r) => r,
                Err(_) => break,
            };
            let mut raw = String::new();
            let _ = request.as_reader().read_to_string(&mut raw);
            captured.push(Captured {
                method: request.method().to_string(),
                path: request.url().to_string(),
                body: serde_json::from_str(&raw).unwrap_or(serde_json::Value::Null),
            });

            let header = Header::from_bytes("Content-Type", "application/json").unwrap();
            let response = Response::from_string(body)
                .with_status_code(status)
                .with_header(header);
            let _ = request.respond(response);
        }
        captured
    });

    (format!("http://127.0.0.1:{}", port), handle)
}

fn provider(base_url: &str) -> HttpSpotProvider {
    HttpSpotProvider::new(base_url, Duration::from_secs(5)).unwrap()
}

fn spot_request() -> RefreshSpotRequest {
    RefreshSpotRequest {
        location: "Soho".into(),
        category: "Cafe".into(),
        excluded_ids: vec!["a".into(), "b".into()],
    }
}

const STOP_JSON: &str = r#"{
    "id": "c9",
    "name": "Blue Bottle",
    "category": "Cafe",
    "description": "Pour-over coffee",
    "image_url": "https://img.example/c9.jpg",
    "walking_time_minutes": 6
}"#;

#[test]
fn test_itineraries_success() {
    let (url, handle) = serve(vec![(
        200,
        r#"{
            "itineraries": [{
                "id": "1",
                "title": "Foodie Delights Adventure 1 in Soho",
                "description": "Explore",
                "duration_minutes": 95,
                "stops": [{
                    "id": "s1", "name": "Dim Sum", "category": "Restaurant",
                    "image_url": "https://img.example/s1.jpg", "walking_time_minutes": 5
                }]
            }],
            "sources": [{"web": {"uri": "https://example.com", "title": "Guide"}}]
        }"#,
    )]);

    let response = provider(&url)
        .itineraries(&ItineraryRequest {
            location: "Soho".into(),
            preset: Some("Foodie Delights".into()),
            max_price_level: Some("20-50".into()),
            max_distance_miles: Some(1.5),
        })
        .unwrap();

    assert_eq!(response.itineraries.len(), 1);
    assert_eq!(response.itineraries[0].stops[0].description, None);
    assert_eq!(response.sources.len(), 1);

    let captured = handle.join().unwrap();
    assert_eq!(captured[0].method, "POST");
    assert_eq!(captured[0].path, "/api/itineraries");
    assert_eq!(captured[0].body["preset"], "Foodie Delights");
    assert_eq!(captured[0].body["max_price_level"], "20-50");
}

#[test]
fn test_refresh_spot_sends_exclusions() {
    let (url, handle) = serve(vec![(200, STOP_JSON)]);

    let stop = provider(&url).refresh_spot(&spot_request()).unwrap();
    assert_eq!(stop.id, "c9");
    assert_eq!(stop.walking_time_minutes, 6);

    let captured = handle.join().unwrap();
    assert_eq!(captured[0].path, "/api/refresh-spot");
    assert_eq!(captured[0].body["excluded_ids"], serde_json::json!(["a", "b"]));
}

#[test]
fn test_status_codes_map_to_kinds() {
    let (url, handle) = serve(vec![
        (429, r#"{"detail": "slow down"}"#),
        (500, r#"{"detail": "Traceback (most recent call last)"}"#),
        (400, r#"{"detail": "Location must be at least 2 characters long"}"#),
        (404, r#"{"detail": "Could not find places near 'Qq'"}"#),
        (503, "<html>unavailable</html>"),
    ]);
    let provider = provider(&url);

    let err = provider.refresh_spot(&spot_request()).unwrap_err();
    assert_eq!(err.kind, ProviderErrorKind::RateLimited);
    assert_eq!(err.user_message(), "Too many requests. Please try again later.");

    let err = provider.refresh_spot(&spot_request()).unwrap_err();
    assert_eq!(err.kind, ProviderErrorKind::Server);
    assert_eq!(err.user_message(), "Server error occurred. Please try again.");

    let err = provider.refresh_spot(&spot_request()).unwrap_err();
    assert_eq!(err.kind, ProviderErrorKind::BadRequest);
    assert_eq!(err.user_message(), "Location must be at least 2 characters long");

    let err = provider.refresh_spot(&spot_request()).unwrap_err();
    assert_eq!(err.kind, ProviderErrorKind::NotFound);
    assert_eq!(err.user_message(), "Could not find places near 'Qq'");

    let err = provider.refresh_spot(&spot_request()).unwrap_err();
    assert_eq!(err.kind, ProviderErrorKind::Server);
    assert_eq!(err.message, "HTTP error! status: 503");

    handle.join().unwrap();
}

#[test]
fn test_domain_refusals_reach_the_editor() {
    let (url, handle) = serve(vec![
        (
            404,
            r#"{"detail": "No alternative categories available. All categories have been recently used."}"#,
        ),
        (
            404,
            r#"{"detail": "No cached results found for Soho. Please search for itineraries first."}"#,
        ),
    ]);
    let provider = provider(&url);
    let stops = vec![
        Stop {
            id: "a".into(),
            name: "Cafe A".into(),
            category: "Cafe".into(),
            description: None,
            image_url: String::new(),
            walking_time_minutes: 5,
        },
        Stop {
            id: "b".into(),
            name: "Park B".into(),
            category: "Park".into(),
            description: None,
            image_url: String::new(),
            walking_time_minutes: 10,
        },
    ];
    let mut editor = ItineraryEditor::open(
        Itinerary {
            id: "1".into(),
            title: "T".into(),
            description: String::new(),
            duration_minutes: 75,
            stops: stops.clone(),
        },
        "Soho",
    );

    let err = editor.replace_stop_category(&provider, "a").unwrap_err();
    assert!(matches!(err, ChaloError::Provider(_)));
    assert_eq!(
        err.provider_kind(),
        Some(&ProviderErrorKind::NoAlternativeCategories)
    );
    assert_eq!(editor.stops(), stops.as_slice());

    let err = editor.replace_stop_category(&provider, "b").unwrap_err();
    assert_eq!(err.provider_kind(), Some(&ProviderErrorKind::NoCachedResults));
    assert_eq!(
        editor.error(),
        Some("Please search for itineraries first before refreshing categories.")
    );

    let captured = handle.join().unwrap();
    assert_eq!(captured[1].path, "/api/refresh-category");
    assert_eq!(captured[1].body["current_category"], "Park");
    assert_eq!(captured[1].body["excluded_spot_ids"], serde_json::json!(["a", "b"]));
}

#[test]
fn test_malformed_bodies_are_invalid_responses() {
    let (url, handle) = serve(vec![
        (200, r#"{"results": []}"#),
        (200, r#"{"spots": [{"id": "x"}]}"#),
    ]);
    let provider = provider(&url);

    let err = provider
        .itineraries(&ItineraryRequest {
            location: "Soho".into(),
            preset: None,
            max_price_level: None,
            max_distance_miles: None,
        })
        .unwrap_err();
    assert_eq!(err.kind, ProviderErrorKind::InvalidResponse);

    let err = provider
        .available_spots(&AvailableSpotsRequest {
            location: "Soho".into(),
            category: None,
            excluded_ids: vec![],
            max_distance_miles: 1.5,
        })
        .unwrap_err();
    assert_eq!(err.kind, ProviderErrorKind::InvalidResponse);
    assert_eq!(err.user_message(), "Invalid data format received from API.");

    handle.join().unwrap();
}

#[test]
fn test_available_spots_may_be_empty() {
    let (url, handle) = serve(vec![(200, r#"{"spots": []}"#)]);
    let spots = provider(&url)
        .available_spots(&AvailableSpotsRequest {
            location: "Soho".into(),
            category: Some("Museum".into()),
            excluded_ids: vec!["a".into()],
            max_distance_miles: 2.0,
        })
        .unwrap();
    assert!(spots.is_empty());

    let captured = handle.join().unwrap();
    assert_eq!(captured[0].path, "/api/get-available-spots");
    assert_eq!(captured[0].body["max_distance_miles"], 2.0);
}

#[test]
fn test_unreachable_backend_is_network_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let provider = HttpSpotProvider::new(
        &format!("http://127.0.0.1:{}", port),
        Duration::from_secs(2),
    )
    .unwrap();

    let err = provider
        .refresh_category(&RefreshCategoryRequest {
            location: "Soho".into(),
            current_category: "Cafe".into(),
            excluded_spot_ids: vec![],
        })
        .unwrap_err();
    assert_eq!(err.kind, ProviderErrorKind::Network);
    assert!(err.user_message().starts_with("Unable to connect"));
    assert!(!provider.health());
}

#[test]
fn test_maps_config_and_health() {
    let (url, handle) = serve(vec![
        (200, r#"{"maps_api_key": "k-123"}"#),
        (200, r#"{"status": "healthy"}"#),
        (503, r#"{"status": "down"}"#),
    ]);
    let provider = provider(&url);

    assert_eq!(provider.maps_config().unwrap().maps_api_key, "k-123");
    assert!(provider.health());
    assert!(!provider.health());

    let captured = handle.join().unwrap();
    assert_eq!(captured[0].method, "GET");
    assert_eq!(captured[0].path, "/api/maps-config");
    assert_eq!(captured[1].path, "/api/health");
}
