// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Chalo contributors

use crate::model::{ActiveTrip, Itinerary};
use crate::storage::{KeyValueStore, CURRENT_TRIP_KEY};
use chrono::Utc;

/// Holds at most one active trip. Persistence is best effort; the
/// in-memory state always reflects the last call.
pub struct TripStore<S: KeyValueStore> {
    storage: S,
    current: Option<ActiveTrip>,
}

impl<S: KeyValueStore> TripStore<S> {
    pub fn load(mut storage: S) -> Self {
        let current = match storage.get(CURRENT_TRIP_KEY) {
            Ok(Some(content)) => match serde_json::from_str::<ActiveTrip>(&content) {
                Ok(trip) => Some(trip),
                Err(e) => {
                    log::warn!("Discarding unreadable stored trip — error={}", e);
                    if let Err(e) = storage.clear(CURRENT_TRIP_KEY) {
                        log::error!("Failed to clear stored trip — error={}", e);
                    }
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                log::warn!("Failed to read stored trip — error={}", e);
                None
            }
        };

        if let Some(trip) = &current {
            log::debug!(
                "Loaded active trip — itinerary={} location={} stops={}",
                trip.itinerary.id,
                trip.location,
                trip.itinerary.stops.len()
            );
        }

        Self { storage, current }
    }

    pub fn current(&self) -> Option<&ActiveTrip> {
        self.current.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Replaces any existing trip.
    pub fn start(&mut self, itinerary: Itinerary, location: &str) -> &ActiveTrip {
        let trip = ActiveTrip {
            itinerary,
            location: location.to_string(),
            started_at: Utc::now(),
        };

        match serde_json::to_string(&trip) {
            Ok(content) => {
                if let Err(e) = self.storage.set(CURRENT_TRIP_KEY, &content) {
                    log::error!("Failed to persist trip — error={}", e);
                }
            }
            Err(e) => log::error!("Failed to serialize trip — error={}", e),
        }

        log::info!(
            "Trip started — itinerary={} location={} stops={} duration_minutes={}",
            trip.itinerary.id,
            trip.location,
            trip.itinerary.stops.len(),
            trip.itinerary.duration_minutes
        );
        self.current.insert(trip)
    }

    pub fn end(&mut self) -> Option<ActiveTrip> {
        if let Err(e) = self.storage.clear(CURRENT_TRIP_KEY) {
            log::error!("Failed to remove stored trip — error={}", e);
        }
        let ended = self.current.take();
        if let Some(trip) = &ended {
            log::info!("Trip ended — itinerary={}", trip.itinerary.id);
        }
        ended
    }

    pub fn into_storage(self) -> S {
        self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Stop;
    use crate::storage::MemoryStore;
    use crate::{ChaloError, Result};

    fn itinerary(id: &str) -> Itinerary {
        Itinerary {
            id: id.to_string(),
            title: format!("Trip {}", id),
            description: "A walk".to_string(),
            duration_minutes: 40,
            stops: vec![Stop {
                id: format!("{}-s1", id),
                name: "Corner Cafe".to_string(),
                category: "Cafe".to_string(),
                description: None,
                image_url: "https://example.com/c.jpg".to_string(),
                walking_time_minutes: 10,
            }],
        }
    }

    /// Storage whose writes always fail.
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }
        fn set(&mut self, key: &str, _value: &str) -> Result<()> {
            Err(ChaloError::Storage {
                key: key.to_string(),
                message: "read-only".to_string(),
            })
        }
        fn clear(&mut self, key: &str) -> Result<()> {
            Err(ChaloError::Storage {
                key: key.to_string(),
                message: "read-only".to_string(),
            })
        }
    }

    #[test]
    fn test_second_start_overwrites_first() {
        let mut trips = TripStore::load(MemoryStore::new());
        trips.start(itinerary("first"), "Boston");
        trips.start(itinerary("second"), "Denver");

        let current = trips.current().unwrap();
        assert_eq!(current.itinerary.id, "second");
        assert_eq!(current.location, "Denver");

        let reloaded = TripStore::load(trips.into_storage());
        assert_eq!(reloaded.current().unwrap().itinerary.id, "second");
    }

    #[test]
    fn test_end_clears_memory_and_storage() {
        let mut trips = TripStore::load(MemoryStore::new());
        trips.start(itinerary("a"), "Austin");
        let ended = trips.end().unwrap();
        assert_eq!(ended.itinerary.id, "a");
        assert!(!trips.is_active());
        assert!(trips.end().is_none());

        let storage = trips.into_storage();
        assert!(storage.get(CURRENT_TRIP_KEY).unwrap().is_none());
    }

    #[test]
    fn test_persistence_failure_does_not_block_state_change() {
        let mut trips = TripStore::load(ReadOnlyStore);
        trips.start(itinerary("a"), "Austin");
        assert_eq!(trips.current().unwrap().itinerary.id, "a");
        assert!(trips.end().is_some());
        assert!(!trips.is_active());
    }

    #[test]
    fn test_corrupt_trip_is_cleared_on_load() {
        let storage = MemoryStore::new().with_entry(CURRENT_TRIP_KEY, "{\"itinerary\": 3}");
        let trips = TripStore::load(storage);
        assert!(trips.current().is_none());
        assert!(trips.into_storage().get(CURRENT_TRIP_KEY).unwrap().is_none());
    }
}
