// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Chalo contributors

use crate::model::Stop;
use crate::storage::{KeyValueStore, FAVORITES_KEY};

/// Favorited stops, unique by id, kept in the order they were added.
pub struct FavoritesStore<S: KeyValueStore> {
    storage: S,
    favorites: Vec<Stop>,
}

impl<S: KeyValueStore> FavoritesStore<S> {
    /// Reads the persisted set. Anything unreadable counts as an empty set.
    pub fn load(storage: S) -> Self {
        let favorites = match storage.get(FAVORITES_KEY) {
            Ok(Some(content)) => match serde_json::from_str::<Vec<Stop>>(&content) {
                Ok(stops) => dedup_by_id(stops),
                Err(e) => {
                    log::warn!("Ignoring unreadable favorites — error={}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("Failed to read favorites — error={}", e);
                Vec::new()
            }
        };

        log::debug!("Loaded favorites — count={}", favorites.len());
        Self { storage, favorites }
    }

    pub fn favorites(&self) -> &[Stop] {
        &self.favorites
    }

    pub fn len(&self) -> usize {
        self.favorites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty()
    }

    pub fn is_favorite(&self, stop_id: &str) -> bool {
        self.favorites.iter().any(|s| s.id == stop_id)
    }

    /// Returns false when a stop with the same id is already present.
    pub fn add(&mut self, stop: Stop) -> bool {
        if self.is_favorite(&stop.id) {
            return false;
        }
        self.favorites.push(stop);
        self.persist();
        true
    }

    pub fn remove(&mut self, stop_id: &str) -> bool {
        let before = self.favorites.len();
        self.favorites.retain(|s| s.id != stop_id);
        let removed = self.favorites.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    /// Flips membership and returns whether the stop is now a favorite.
    pub fn toggle(&mut self, stop: &Stop) -> bool {
        if self.is_favorite(&stop.id) {
            self.remove(&stop.id);
            false
        } else {
            self.add(stop.clone());
            true
        }
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    fn persist(&mut self) {
        let content = match serde_json::to_string(&self.favorites) {
            Ok(c) => c,
            Err(e) => {
                log::error!("Failed to serialize favorites — error={}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set(FAVORITES_KEY, &content) {
            log::error!(
                "Failed to persist favorites — count={} error={}",
                self.favorites.len(),
                e
            );
        }
    }
}

fn dedup_by_id(stops: Vec<Stop>) -> Vec<Stop> {
    let mut out: Vec<Stop> = Vec::with_capacity(stops.len());
    for stop in stops {
        if !out.iter().any(|s| s.id == stop.id) {
            out.push(stop);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn stop(id: &str) -> Stop {
        Stop {
            id: id.to_string(),
            name: format!("Place {}", id),
            category: "Park".to_string(),
            description: Some("Green".to_string()),
            image_url: "https://example.com/p.jpg".to_string(),
            walking_time_minutes: 6,
        }
    }

    #[test]
    fn test_add_is_idempotent_by_id() {
        let mut favs = FavoritesStore::load(MemoryStore::new());
        assert!(favs.add(stop("a")));
        let mut renamed = stop("a");
        renamed.name = "Other name".to_string();
        assert!(!favs.add(renamed));
        assert_eq!(favs.len(), 1);
        assert_eq!(favs.favorites()[0].name, "Place a");
    }

    #[test]
    fn test_remove_then_is_favorite_false() {
        let mut favs = FavoritesStore::load(MemoryStore::new());
        favs.add(stop("a"));
        favs.add(stop("b"));
        assert!(favs.remove("a"));
        assert!(!favs.is_favorite("a"));
        assert!(favs.is_favorite("b"));
        assert!(!favs.remove("a"));
    }

    #[test]
    fn test_toggle() {
        let mut favs = FavoritesStore::load(MemoryStore::new());
        let s = stop("x");
        assert!(favs.toggle(&s));
        assert!(favs.is_favorite("x"));
        assert!(!favs.toggle(&s));
        assert!(favs.is_empty());
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let mut favs = FavoritesStore::load(MemoryStore::new());
        favs.add(stop("a"));
        favs.add(stop("b"));
        favs.remove("a");

        let storage = favs.into_storage();
        let reloaded = FavoritesStore::load(storage);
        assert_eq!(reloaded.len(), 1);
        assert!(reloaded.is_favorite("b"));
    }

    #[test]
    fn test_corrupt_blob_loads_empty() {
        let storage = MemoryStore::new().with_entry(FAVORITES_KEY, "{not json");
        let favs = FavoritesStore::load(storage);
        assert!(favs.is_empty());
    }

    #[test]
    fn test_partially_valid_blob_is_not_partially_loaded() {
        let blob = r#"[{"id":"a","name":"A","category":"Cafe","image_url":"u","walking_time_minutes":3},
                       {"id":"b","name":"B"}]"#;
        let favs = FavoritesStore::load(MemoryStore::new().with_entry(FAVORITES_KEY, blob));
        assert!(favs.is_empty());
    }
}
