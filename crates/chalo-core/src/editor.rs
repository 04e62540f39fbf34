// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Chalo contributors

//! Working copy of one itinerary during an editing session.
//!
//! Provider calls are split into a ticket handed out by [`ItineraryEditor::begin_refresh`]
//! and a completion passed to [`ItineraryEditor::finish_refresh`]. The one-shot helpers
//! run both around a blocking call; callers driving requests on their own schedule use
//! the two halves directly.

use crate::model::{total_duration, Itinerary, Stop};
use crate::provider::{
    AvailableSpotsRequest, ProviderError, RefreshCategoryRequest, RefreshSpotRequest, SpotProvider,
};
use crate::rotation::CategoryRotation;
use crate::search::DEFAULT_MAX_DISTANCE_MILES;
use crate::storage::KeyValueStore;
use crate::trip::TripStore;
use crate::{ChaloError, Result, ValidationError};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

/// Identifies one editing session. Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    fn next() -> Self {
        SessionId(NEXT_SESSION.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshKind {
    /// Another stop in the same category
    Same,
    /// A stop from a different category
    Category,
}

/// An in-flight refresh of one stop.
#[derive(Debug, Clone)]
pub struct RefreshTicket {
    session: SessionId,
    stop_id: String,
    category: String,
    kind: RefreshKind,
    location: String,
    excluded_ids: Vec<String>,
}

impl RefreshTicket {
    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn stop_id(&self) -> &str {
        &self.stop_id
    }

    pub fn kind(&self) -> RefreshKind {
        self.kind
    }

    pub fn spot_request(&self) -> RefreshSpotRequest {
        RefreshSpotRequest {
            location: self.location.clone(),
            category: self.category.clone(),
            excluded_ids: self.excluded_ids.clone(),
        }
    }

    pub fn category_request(&self) -> RefreshCategoryRequest {
        RefreshCategoryRequest {
            location: self.location.clone(),
            current_category: self.category.clone(),
            excluded_spot_ids: self.excluded_ids.clone(),
        }
    }

    /// Runs the provider call matching this ticket's kind.
    pub fn fetch(&self, provider: &dyn SpotProvider) -> std::result::Result<Stop, ProviderError> {
        match self.kind {
            RefreshKind::Same => provider.refresh_spot(&self.spot_request()),
            RefreshKind::Category => provider.refresh_category(&self.category_request()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The stop at `index` was replaced
    Applied { index: usize },
    /// The response arrived for a session or stop that no longer exists
    Stale,
}

pub struct ItineraryEditor {
    session: SessionId,
    itinerary_id: String,
    title: String,
    description: String,
    location: String,
    max_distance_miles: f64,
    stops: Vec<Stop>,
    duration_minutes: u32,
    seen_ids: Vec<String>,
    rotation: CategoryRotation,
    pending: HashMap<String, RefreshKind>,
    error: Option<String>,
}

impl ItineraryEditor {
    pub fn open(itinerary: Itinerary, location: &str) -> Self {
        let seen_ids = itinerary.stops.iter().map(|s| s.id.clone()).collect();
        let duration_minutes = total_duration(&itinerary.stops);
        let session = SessionId::next();

        debug!(
            "Editor opened — session={} itinerary={} stops={}",
            session,
            itinerary.id,
            itinerary.stops.len()
        );

        Self {
            session,
            itinerary_id: itinerary.id,
            title: itinerary.title,
            description: itinerary.description,
            location: location.trim().to_string(),
            max_distance_miles: DEFAULT_MAX_DISTANCE_MILES,
            stops: itinerary.stops,
            duration_minutes,
            seen_ids,
            rotation: CategoryRotation::new(),
            pending: HashMap::new(),
            error: None,
        }
    }

    pub fn with_max_distance(mut self, miles: f64) -> Self {
        self.max_distance_miles = miles;
        self
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    /// Every id shown this session, in the order first seen.
    pub fn seen_ids(&self) -> &[String] {
        &self.seen_ids
    }

    pub fn rotation(&self) -> &CategoryRotation {
        &self.rotation
    }

    /// Message for the last failed operation, cleared by the next success.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_refreshing(&self, stop_id: &str) -> bool {
        self.pending.get(stop_id) == Some(&RefreshKind::Same)
    }

    pub fn is_category_refreshing(&self, stop_id: &str) -> bool {
        self.pending.get(stop_id) == Some(&RefreshKind::Category)
    }

    /// Exclusions never carry across locations.
    pub fn set_location(&mut self, location: &str) {
        let location = location.trim();
        if location == self.location {
            return;
        }
        debug!(
            "Editor location changed — session={} from={} to={}",
            self.session, self.location, location
        );
        self.location = location.to_string();
        self.rotation.reset();
    }

    /// Marks `stop_id` as refreshing. The ticket must be passed to
    /// [`finish_refresh`](Self::finish_refresh) or
    /// [`cancel_refresh`](Self::cancel_refresh); until then the stop
    /// rejects further refreshes.
    pub fn begin_refresh(&mut self, stop_id: &str, kind: RefreshKind) -> Result<RefreshTicket> {
        let category = match self.stops.iter().find(|s| s.id == stop_id) {
            Some(stop) => stop.category.clone(),
            None => return Err(self.fail(ValidationError::StopNotFound(stop_id.to_string()).into())),
        };
        if self.pending.contains_key(stop_id) {
            return Err(self.fail(ValidationError::RefreshPending(stop_id.to_string()).into()));
        }

        self.pending.insert(stop_id.to_string(), kind);
        self.error = None;

        Ok(RefreshTicket {
            session: self.session,
            stop_id: stop_id.to_string(),
            category,
            kind,
            location: self.location.clone(),
            excluded_ids: self.seen_ids.clone(),
        })
    }

    pub fn finish_refresh(
        &mut self,
        ticket: RefreshTicket,
        result: std::result::Result<Stop, ProviderError>,
    ) -> Result<RefreshOutcome> {
        if ticket.session != self.session {
            warn!(
                "Discarding refresh from another session — ticket={} editor={}",
                ticket.session, self.session
            );
            return Ok(RefreshOutcome::Stale);
        }
        self.pending.remove(&ticket.stop_id);

        let Some(index) = self.stops.iter().position(|s| s.id == ticket.stop_id) else {
            debug!(
                "Discarding refresh for removed stop — session={} stop={}",
                self.session, ticket.stop_id
            );
            return Ok(RefreshOutcome::Stale);
        };

        let new_stop = match result {
            Ok(stop) => stop,
            Err(e) => {
                warn!(
                    "Refresh failed — session={} stop={} kind={:?} error={}",
                    self.session, ticket.stop_id, ticket.kind, e
                );
                return Err(self.fail(e.into()));
            }
        };

        info!(
            "Stop replaced — session={} index={} from={} to={} category={}",
            self.session, index, ticket.stop_id, new_stop.id, new_stop.category
        );
        self.seen_ids.push(new_stop.id.clone());
        self.stops[index] = new_stop;
        if ticket.kind == RefreshKind::Category {
            self.rotation.record_swap(&ticket.category);
        }
        self.recompute_duration();
        self.error = None;

        Ok(RefreshOutcome::Applied { index })
    }

    /// Abandons a ticket that will never be finished, releasing its stop.
    pub fn cancel_refresh(&mut self, ticket: RefreshTicket) {
        if ticket.session != self.session {
            return;
        }
        if self.pending.remove(&ticket.stop_id).is_some() {
            debug!(
                "Refresh cancelled — session={} stop={}",
                self.session, ticket.stop_id
            );
        }
    }

    /// Swaps the stop for another in the same category.
    pub fn replace_stop(
        &mut self,
        provider: &dyn SpotProvider,
        stop_id: &str,
    ) -> Result<RefreshOutcome> {
        let ticket = self.begin_refresh(stop_id, RefreshKind::Same)?;
        let result = ticket.fetch(provider);
        self.finish_refresh(ticket, result)
    }

    /// Swaps the stop for one from a different category.
    pub fn replace_stop_category(
        &mut self,
        provider: &dyn SpotProvider,
        stop_id: &str,
    ) -> Result<RefreshOutcome> {
        let ticket = self.begin_refresh(stop_id, RefreshKind::Category)?;
        let result = ticket.fetch(provider);
        self.finish_refresh(ticket, result)
    }

    pub fn remove_stop(&mut self, stop_id: &str) -> Result<Stop> {
        if self.stops.len() <= 1 {
            return Err(self.fail(ValidationError::LastStop.into()));
        }
        let Some(index) = self.stops.iter().position(|s| s.id == stop_id) else {
            return Err(self.fail(ValidationError::StopNotFound(stop_id.to_string()).into()));
        };

        let removed = self.stops.remove(index);
        self.pending.remove(stop_id);
        self.recompute_duration();
        self.error = None;
        info!(
            "Stop removed — session={} stop={} remaining={}",
            self.session,
            stop_id,
            self.stops.len()
        );
        Ok(removed)
    }

    /// Candidates for insertion after `index`. An empty list is not an error.
    pub fn available_spots(
        &mut self,
        provider: &dyn SpotProvider,
        index: usize,
        category: Option<&str>,
    ) -> Result<Vec<Stop>> {
        self.check_index(index)?;
        let request = AvailableSpotsRequest {
            location: self.location.clone(),
            category: category.map(str::to_string),
            excluded_ids: self.seen_ids.clone(),
            max_distance_miles: self.max_distance_miles,
        };

        match provider.available_spots(&request) {
            Ok(spots) => {
                debug!(
                    "Available spots — session={} index={} category={:?} count={}",
                    self.session,
                    index,
                    category,
                    spots.len()
                );
                self.error = None;
                Ok(spots)
            }
            Err(e) => {
                warn!(
                    "Listing available spots failed — session={} error={}",
                    self.session, e
                );
                Err(self.fail(e.into()))
            }
        }
    }

    /// Inserts `stop` immediately after position `index`.
    pub fn insert_after(&mut self, index: usize, stop: Stop) -> Result<()> {
        self.check_index(index)?;
        info!(
            "Stop added — session={} after={} stop={} category={}",
            self.session, index, stop.id, stop.category
        );
        self.seen_ids.push(stop.id.clone());
        self.stops.insert(index + 1, stop);
        self.recompute_duration();
        self.error = None;
        Ok(())
    }

    /// Lists candidates and inserts the one `pick` chooses. Returns the new
    /// stop's position, or `None` when nothing was picked.
    pub fn add_stop_after<F>(
        &mut self,
        provider: &dyn SpotProvider,
        index: usize,
        category: Option<&str>,
        pick: F,
    ) -> Result<Option<usize>>
    where
        F: FnOnce(&[Stop]) -> Option<usize>,
    {
        let mut candidates = self.available_spots(provider, index, category)?;
        let Some(choice) = pick(&candidates).filter(|&i| i < candidates.len()) else {
            return Ok(None);
        };
        let stop = candidates.swap_remove(choice);
        self.insert_after(index, stop)?;
        Ok(Some(index + 1))
    }

    pub fn recompute_duration(&mut self) -> u32 {
        self.duration_minutes = total_duration(&self.stops);
        self.duration_minutes
    }

    /// Current state packaged as an itinerary.
    pub fn snapshot(&self) -> Itinerary {
        Itinerary {
            id: self.itinerary_id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            duration_minutes: total_duration(&self.stops),
            stops: self.stops.clone(),
        }
    }

    /// Ends the session and starts the edited itinerary as the active trip.
    pub fn commit<S: KeyValueStore>(self, trips: &mut TripStore<S>) -> Itinerary {
        let itinerary = self.snapshot();
        debug!("Editor committed — session={}", self.session);
        trips.start(itinerary.clone(), &self.location);
        itinerary
    }

    /// Ends the session without starting a trip.
    pub fn close(self) {
        debug!(
            "Editor closed — session={} pending={}",
            self.session,
            self.pending.len()
        );
    }

    fn check_index(&mut self, index: usize) -> Result<()> {
        if index >= self.stops.len() {
            let len = self.stops.len();
            return Err(self.fail(ValidationError::IndexOutOfRange { index, len }.into()));
        }
        Ok(())
    }

    fn fail(&mut self, err: ChaloError) -> ChaloError {
        self.error = Some(err.user_message());
        err
    }
}
