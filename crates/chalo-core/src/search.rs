// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Chalo contributors

use crate::provider::{CustomTripRequest, ItineraryRequest};
use crate::ValidationError;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_MAX_DISTANCE_MILES: f64 = 1.5;

/// Walking radii offered by the filter controls.
pub const DISTANCE_OPTIONS_MILES: [f64; 7] = [0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 5.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    NatureAndParks,
    ArtAndCulture,
    FoodieDelights,
    HistoricalLandmarks,
    ShoppingAndBoutiques,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::NatureAndParks,
        Preset::ArtAndCulture,
        Preset::FoodieDelights,
        Preset::HistoricalLandmarks,
        Preset::ShoppingAndBoutiques,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Preset::NatureAndParks => "Nature & Parks",
            Preset::ArtAndCulture => "Art & Culture",
            Preset::FoodieDelights => "Foodie Delights",
            Preset::HistoricalLandmarks => "Historical Landmarks",
            Preset::ShoppingAndBoutiques => "Shopping & Boutiques",
        }
    }

    /// Stop categories the mock backend draws from for this preset.
    pub fn categories(&self) -> &'static [&'static str] {
        match self {
            Preset::NatureAndParks => &["Park", "Garden", "Trail"],
            Preset::ArtAndCulture => &["Museum", "Gallery", "Theater"],
            Preset::FoodieDelights => &["Restaurant", "Cafe", "Bar"],
            Preset::HistoricalLandmarks => &["Landmark", "Monument", "Museum"],
            Preset::ShoppingAndBoutiques => &["Boutique", "Market", "Mall"],
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Preset {
    type Err = ValidationError;

    /// Accepts the display label or a one-word shorthand (`nature`, `food`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        let preset = match needle.as_str() {
            "nature" | "parks" => Some(Preset::NatureAndParks),
            "art" | "culture" => Some(Preset::ArtAndCulture),
            "food" | "foodie" => Some(Preset::FoodieDelights),
            "history" | "historical" | "landmarks" => Some(Preset::HistoricalLandmarks),
            "shopping" | "boutiques" => Some(Preset::ShoppingAndBoutiques),
            _ => Preset::ALL
                .iter()
                .copied()
                .find(|p| p.label().to_lowercase() == needle),
        };
        preset.ok_or_else(|| ValidationError::UnknownPreset(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceLevel {
    Low,
    Mid,
    High,
}

impl PriceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceLevel::Low => "10-20",
            PriceLevel::Mid => "20-50",
            PriceLevel::High => "50+",
        }
    }
}

impl FromStr for PriceLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('$') {
            "10-20" => Ok(PriceLevel::Low),
            "20-50" => Ok(PriceLevel::Mid),
            "50+" => Ok(PriceLevel::High),
            _ => Err(ValidationError::UnknownPriceLevel(s.to_string())),
        }
    }
}

/// Categories selectable when building a custom trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripCategory {
    Cafes,
    Restaurants,
    Parks,
    Museums,
    Galleries,
    Attractions,
}

impl TripCategory {
    pub const ALL: [TripCategory; 6] = [
        TripCategory::Cafes,
        TripCategory::Restaurants,
        TripCategory::Parks,
        TripCategory::Museums,
        TripCategory::Galleries,
        TripCategory::Attractions,
    ];

    /// Value sent to the backend.
    pub fn api_value(&self) -> &'static str {
        match self {
            TripCategory::Cafes => "cafe",
            TripCategory::Restaurants => "restaurant",
            TripCategory::Parks => "park",
            TripCategory::Museums => "museum",
            TripCategory::Galleries => "art_gallery",
            TripCategory::Attractions => "tourist_attraction",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TripCategory::Cafes => "Cafes",
            TripCategory::Restaurants => "Restaurants",
            TripCategory::Parks => "Parks",
            TripCategory::Museums => "Museums",
            TripCategory::Galleries => "Art Galleries",
            TripCategory::Attractions => "Tourist Attractions",
        }
    }
}

impl FromStr for TripCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        TripCategory::ALL
            .iter()
            .copied()
            .find(|c| {
                c.api_value() == needle
                    || c.label().to_lowercase() == needle
                    || c.label().to_lowercase().trim_end_matches('s') == needle
            })
            .ok_or_else(|| ValidationError::UnknownCategory(s.to_string()))
    }
}

/// Parameters of a location search, validated before any request is built.
#[derive(Debug, Clone, PartialEq)]
pub struct ItineraryQuery {
    pub location: String,
    pub preset: Option<Preset>,
    pub price: Option<PriceLevel>,
    pub max_distance_miles: f64,
}

impl ItineraryQuery {
    pub fn new(location: &str) -> Self {
        Self {
            location: location.to_string(),
            preset: None,
            price: None,
            max_distance_miles: DEFAULT_MAX_DISTANCE_MILES,
        }
    }

    pub fn preset(mut self, preset: Preset) -> Self {
        self.preset = Some(preset);
        self
    }

    pub fn price(mut self, price: PriceLevel) -> Self {
        self.price = Some(price);
        self
    }

    pub fn max_distance(mut self, miles: f64) -> Self {
        self.max_distance_miles = miles;
        self
    }

    pub fn validate(&self) -> Result<ItineraryRequest, ValidationError> {
        let location = self.location.trim();
        if location.is_empty() {
            return Err(ValidationError::EmptyLocation);
        }
        Ok(ItineraryRequest {
            location: location.to_string(),
            preset: self.preset.map(|p| p.label().to_string()),
            max_price_level: self.price.map(|p| p.as_str().to_string()),
            max_distance_miles: Some(self.max_distance_miles),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomTripQuery {
    pub location: String,
    pub categories: Vec<TripCategory>,
    pub max_distance_miles: f64,
}

impl CustomTripQuery {
    pub fn new(location: &str, categories: Vec<TripCategory>) -> Self {
        Self {
            location: location.to_string(),
            categories,
            max_distance_miles: DEFAULT_MAX_DISTANCE_MILES,
        }
    }

    pub fn max_distance(mut self, miles: f64) -> Self {
        self.max_distance_miles = miles;
        self
    }

    pub fn validate(&self) -> Result<CustomTripRequest, ValidationError> {
        let location = self.location.trim();
        if location.is_empty() {
            return Err(ValidationError::EmptyLocation);
        }
        if self.categories.is_empty() {
            return Err(ValidationError::NoCategorySelected);
        }
        let mut categories: Vec<String> = Vec::with_capacity(self.categories.len());
        for c in &self.categories {
            let value = c.api_value().to_string();
            if !categories.contains(&value) {
                categories.push(value);
            }
        }
        Ok(CustomTripRequest {
            location: location.to_string(),
            categories,
            max_distance_miles: self.max_distance_miles,
        })
    }
}
