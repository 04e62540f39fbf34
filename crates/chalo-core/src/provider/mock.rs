// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Chalo contributors

//! Offline provider producing randomized stops from stock photos and
//! name templates. Used by `--offline` and by tests.

use super::{
    AvailableSpotsRequest, CustomTripRequest, ItineraryRequest, ProviderError, ProviderErrorKind,
    RefreshCategoryRequest, RefreshSpotRequest, SpotProvider,
};
use crate::model::{total_duration, Itinerary, ItineraryResponse, MapsConfig, Stop};
use crate::search::Preset;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

const STOCK_IMAGES: [&str; 5] = [
    "https://images.unsplash.com/photo-1517248135467-4c7edcad34c4?q=80&w=1470&auto=format&fit=crop",
    "https://images.unsplash.com/photo-1541167760496-1628856ab772?q=80&w=1637&auto=format&fit=crop",
    "https://images.unsplash.com/photo-1472851294608-062f824d29cc?q=80&w=1470&auto=format&fit=crop",
    "https://images.unsplash.com/photo-1521791136064-7986c2920216?q=80&w=1469&auto=format&fit=crop",
    "https://images.unsplash.com/photo-1477959858617-67f85cf4f1df?q=80&w=1544&auto=format&fit=crop",
];

const MIXED_CATEGORIES: [&str; 5] = ["Restaurant", "Museum", "Park", "Cafe", "Gallery"];

const CATALOG: [&str; 12] = [
    "Restaurant",
    "Cafe",
    "Bar",
    "Museum",
    "Gallery",
    "Theater",
    "Park",
    "Garden",
    "Trail",
    "Landmark",
    "Boutique",
    "Market",
];

const ITINERARY_COUNT: usize = 3;
const STOPS_PER_ITINERARY: usize = 3;
const AVAILABLE_SPOT_COUNT: usize = 6;
/// Refreshes a swapped-away category stays unavailable for, per location
const CATEGORY_EXCLUSION_TURNS: u32 = 5;

struct MockState {
    rng: StdRng,
    /// location key -> category -> turns remaining
    exclusions: HashMap<String, BTreeMap<String, u32>>,
}

impl MockState {
    fn fresh_id(&mut self, excluded: &[String]) -> String {
        loop {
            let id = format!("mock-{:012x}", self.rng.gen::<u64>() & 0xffff_ffff_ffff);
            if !excluded.contains(&id) {
                return id;
            }
        }
    }

    fn image(&mut self) -> String {
        STOCK_IMAGES
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(STOCK_IMAGES[0])
            .to_string()
    }

    fn make_stop(
        &mut self,
        name: String,
        category: &str,
        description: String,
        max_walk: u32,
        excluded: &[String],
    ) -> Stop {
        Stop {
            id: self.fresh_id(excluded),
            name,
            category: category.to_string(),
            description: Some(description),
            image_url: self.image(),
            walking_time_minutes: self.rng.gen_range(5..=max_walk.max(5)),
        }
    }

    /// Ages every exclusion at this location by one refresh.
    fn increment_turn(&mut self, key: &str) {
        if let Some(ledger) = self.exclusions.get_mut(key) {
            ledger.retain(|_, turns| {
                *turns = turns.saturating_sub(1);
                *turns > 0
            });
            if ledger.is_empty() {
                self.exclusions.remove(key);
            }
        }
    }
}

pub struct MockSpotProvider {
    catalog: Vec<String>,
    state: Mutex<MockState>,
}

impl Default for MockSpotProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSpotProvider {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic output for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            catalog: CATALOG.iter().map(|c| c.to_string()).collect(),
            state: Mutex::new(MockState {
                rng,
                exclusions: HashMap::new(),
            }),
        }
    }

    /// Restricts the categories that category swaps and open searches draw from.
    pub fn with_catalog(mut self, categories: &[&str]) -> Self {
        self.catalog = categories.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Categories currently excluded for `location` by category swaps.
    pub fn excluded_categories(&self, location: &str) -> Vec<String> {
        self.state()
            .exclusions
            .get(&location_key(location))
            .map(|ledger| ledger.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn build_itineraries(
        &self,
        location: &str,
        title_prefix: &str,
        categories: &[String],
        max_distance_miles: f64,
    ) -> Vec<Itinerary> {
        let mut state = self.state();
        let max_walk = max_walk_minutes(max_distance_miles);
        let mut issued: Vec<String> = Vec::new();

        (1..=ITINERARY_COUNT)
            .map(|i| {
                let stops: Vec<Stop> = (1..=STOPS_PER_ITINERARY)
                    .map(|n| {
                        let category = categories
                            .choose(&mut state.rng)
                            .cloned()
                            .unwrap_or_else(|| "Restaurant".to_string());
                        let stop = state.make_stop(
                            format!("{} {} in {}", category, n, location),
                            &category,
                            format!("A great {} in {}", category.to_lowercase(), location),
                            max_walk,
                            &issued,
                        );
                        issued.push(stop.id.clone());
                        stop
                    })
                    .collect();

                Itinerary {
                    id: format!("itinerary-{}", i),
                    title: format!("{} Adventure {} in {}", title_prefix, i, location),
                    description: format!(
                        "Explore the best of {} with this curated itinerary",
                        location
                    ),
                    duration_minutes: total_duration(&stops),
                    stops,
                }
            })
            .collect()
    }
}

impl SpotProvider for MockSpotProvider {
    fn itineraries(&self, request: &ItineraryRequest) -> Result<ItineraryResponse, ProviderError> {
        let location = checked_location(&request.location)?;
        let preset = request
            .preset
            .as_deref()
            .and_then(|p| p.parse::<Preset>().ok());

        let categories: Vec<String> = match preset {
            Some(p) => p.categories().iter().map(|c| c.to_string()).collect(),
            None => MIXED_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        };
        let prefix = request.preset.as_deref().unwrap_or("Local");
        let max_distance = request.max_distance_miles.unwrap_or(1.5);

        log::debug!(
            "Mock itineraries — location={} preset={:?} price={:?}",
            location,
            preset,
            request.max_price_level
        );
        Ok(ItineraryResponse {
            itineraries: self.build_itineraries(location, prefix, &categories, max_distance),
            sources: Vec::new(),
        })
    }

    fn custom_trips(
        &self,
        request: &CustomTripRequest,
    ) -> Result<ItineraryResponse, ProviderError> {
        let location = checked_location(&request.location)?;
        if request.categories.is_empty() {
            return Err(ProviderError::new(
                ProviderErrorKind::BadRequest,
                "At least one category is required",
            ));
        }
        let categories: Vec<String> = request.categories.iter().map(|c| display_category(c)).collect();

        Ok(ItineraryResponse {
            itineraries: self.build_itineraries(
                location,
                "Custom",
                &categories,
                request.max_distance_miles,
            ),
            sources: Vec::new(),
        })
    }

    fn refresh_spot(&self, request: &RefreshSpotRequest) -> Result<Stop, ProviderError> {
        let location = checked_location(&request.location)?;
        let category = request.category.trim();
        if category.is_empty() {
            return Err(ProviderError::new(
                ProviderErrorKind::BadRequest,
                "Category is required",
            ));
        }

        let mut state = self.state();
        Ok(state.make_stop(
            format!("Alternative {} in {}", category, location),
            category,
            format!(
                "This is an alternative {} spot in {}.",
                category.to_lowercase(),
                location
            ),
            15,
            &request.excluded_ids,
        ))
    }

    fn refresh_category(&self, request: &RefreshCategoryRequest) -> Result<Stop, ProviderError> {
        let location = checked_location(&request.location)?;
        let current = request.current_category.trim();
        if current.is_empty() {
            return Err(ProviderError::new(
                ProviderErrorKind::BadRequest,
                "Current category is required",
            ));
        }

        let key = location_key(location);
        let mut state = self.state();
        state
            .exclusions
            .entry(key.clone())
            .or_default()
            .insert(current.to_string(), CATEGORY_EXCLUSION_TURNS);

        let available: Vec<String> = {
            let ledger = state.exclusions.get(&key);
            self.catalog
                .iter()
                .filter(|c| c.as_str() != current)
                .filter(|c| ledger.map_or(true, |l| !l.contains_key(c.as_str())))
                .cloned()
                .collect()
        };

        let category = match available.choose(&mut state.rng) {
            Some(c) => c.clone(),
            None => {
                return Err(ProviderError::new(
                    ProviderErrorKind::NoAlternativeCategories,
                    "No alternative categories available. All categories have been recently used.",
                ))
            }
        };

        let stop = state.make_stop(
            format!("{} near {}", category, location),
            &category,
            format!("A {} to mix things up in {}", category.to_lowercase(), location),
            15,
            &request.excluded_spot_ids,
        );
        state.increment_turn(&key);

        log::debug!(
            "Mock category swap — location={} from={} to={}",
            location,
            current,
            category
        );
        Ok(stop)
    }

    fn available_spots(
        &self,
        request: &AvailableSpotsRequest,
    ) -> Result<Vec<Stop>, ProviderError> {
        let location = checked_location(&request.location)?;
        if self.catalog.is_empty() && request.category.is_none() {
            return Ok(Vec::new());
        }

        let mut state = self.state();
        let max_walk = max_walk_minutes(request.max_distance_miles);
        let mut excluded = request.excluded_ids.clone();
        let mut spots = Vec::with_capacity(AVAILABLE_SPOT_COUNT);

        for n in 1..=AVAILABLE_SPOT_COUNT {
            let category = match &request.category {
                Some(c) => c.clone(),
                None => match self.catalog.choose(&mut state.rng) {
                    Some(c) => c.clone(),
                    None => break,
                },
            };
            let stop = state.make_stop(
                format!("{} {} near {}", category, n, location),
                &category,
                format!("A nearby {} in {}", category.to_lowercase(), location),
                max_walk,
                &excluded,
            );
            excluded.push(stop.id.clone());
            spots.push(stop);
        }

        Ok(spots)
    }

    fn maps_config(&self) -> Result<MapsConfig, ProviderError> {
        Ok(MapsConfig {
            maps_api_key: String::new(),
        })
    }

    fn health(&self) -> bool {
        true
    }
}

fn checked_location(location: &str) -> Result<&str, ProviderError> {
    let trimmed = location.trim();
    if trimmed.chars().count() < 2 {
        return Err(ProviderError::new(
            ProviderErrorKind::BadRequest,
            "Location must be at least 2 characters long",
        ));
    }
    Ok(trimmed)
}

fn location_key(location: &str) -> String {
    location.trim().to_lowercase()
}

/// Walking minutes roughly covered by the distance filter.
fn max_walk_minutes(max_distance_miles: f64) -> u32 {
    ((max_distance_miles * 20.0).round() as u32).clamp(5, 60)
}

/// `art_gallery` -> `Art Gallery`
fn display_category(api_value: &str) -> String {
    api_value
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
