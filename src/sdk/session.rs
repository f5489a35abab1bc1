//! Search session state and its transitions.
//!
//! Every async step is split in two: a `begin_*`/`set_query` call that mutates
//! state synchronously and hands back a ticket, and a `resolve_*` call that
//! takes the ticket plus the remote result. A ticket that no longer matches
//! the session is discarded, which is what keeps late responses from
//! overwriting newer state.

use crate::sdk::geo::{Coordinate, PlaceCandidate, Route};
use crate::sdk::routing::error::RoutingError;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::VecDeque;

pub const RECENT_SEARCHES_KEY: &str = "recent_searches";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionPhase {
    Idle,
    Typing,
    /// Non-empty text with its `suggest` call in flight. A keystroke lands here
    /// directly; `Typing` is where a failed call with nothing listed settles.
    SuggestionsLoading,
    SuggestionsReady,
    RouteLoading,
    RouteReady,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentSearchEntry {
    pub display_address: String,
}

/// Most-recent-first, no duplicate addresses, oldest dropped past `capacity`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentSearches {
    entries: VecDeque<RecentSearchEntry>,
    capacity: usize,
}

// Same shape as the stored form: a plain array of addresses.
impl Serialize for RecentSearches {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter().map(|e| e.display_address.as_str()))
    }
}

impl RecentSearches {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Moves `address` to the front, inserting it if absent.
    pub fn promote(&mut self, address: &str) {
        if let Some(pos) = self.entries.iter().position(|e| e.display_address == address) {
            if let Some(entry) = self.entries.remove(pos) {
                self.entries.push_front(entry);
            }
            return;
        }
        self.entries.push_front(RecentSearchEntry {
            display_address: address.to_string(),
        });
        self.entries.truncate(self.capacity);
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecentSearchEntry> {
        self.entries.iter()
    }

    pub fn first(&self) -> Option<&RecentSearchEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stored form: a JSON array of addresses, newest first.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(data: &str, capacity: usize) -> Result<Self, serde_json::Error> {
        let addresses: Vec<String> = serde_json::from_str(data)?;
        let mut recent = RecentSearches::new(capacity);
        // Oldest first so the stored head ends up at the front again.
        for address in addresses.iter().rev() {
            recent.promote(address);
        }
        Ok(recent)
    }
}

/// Everything the presentation layer reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchSessionState {
    pub query_text: String,
    pub suggestions: Vec<PlaceCandidate>,
    pub origin: Option<Coordinate>,
    pub destination: Option<Coordinate>,
    pub route: Option<Route>,
    pub recent_searches: RecentSearches,
}

impl SearchSessionState {
    pub fn new(recent_searches: RecentSearches) -> Self {
        Self {
            query_text: String::new(),
            suggestions: Vec::new(),
            origin: None,
            destination: None,
            route: None,
            recent_searches,
        }
    }
}

/// Tag for a `suggest` call: the query text active when it was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestTicket {
    query: String,
}

impl SuggestTicket {
    pub fn query(&self) -> &str {
        &self.query
    }
}

/// Tag for a free-text submit. Any later keystroke, selection or submit
/// supersedes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    generation: u64,
    query: String,
}

impl LookupTicket {
    pub fn query(&self) -> &str {
        &self.query
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteTicket {
    seq: u64,
    origin: Coordinate,
    destination: Coordinate,
    // Destination to put back if the route fails. Only set for free-text submits.
    rollback: Option<Option<Coordinate>>,
}

impl RouteTicket {
    pub fn origin(&self) -> Coordinate {
        self.origin
    }

    pub fn destination(&self) -> Coordinate {
        self.destination
    }
}

#[derive(Debug)]
pub enum Resolution {
    Installed,
    /// The response belonged to a superseded request.
    Discarded,
    Failed(RoutingError),
}

impl Resolution {
    pub fn is_installed(&self) -> bool {
        matches!(self, Resolution::Installed)
    }

    pub fn is_discarded(&self) -> bool {
        matches!(self, Resolution::Discarded)
    }
}

#[derive(Debug, Clone)]
pub struct SearchSession {
    state: SearchSessionState,
    phase: SessionPhase,
    route_seq: u64,
    // Bumped by every user action that replaces a pending lookup.
    generation: u64,
    // The latest route request has not answered yet.
    route_pending: bool,
}

impl SearchSession {
    pub fn new(recent_searches: RecentSearches) -> Self {
        Self {
            state: SearchSessionState::new(recent_searches),
            phase: SessionPhase::Idle,
            route_seq: 0,
            generation: 0,
            route_pending: false,
        }
    }

    pub fn state(&self) -> &SearchSessionState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn set_origin(&mut self, origin: Coordinate) {
        self.state.origin = Some(origin);
    }

    /// Stores the new text. Empty text clears suggestions and needs no call.
    pub fn set_query(&mut self, text: &str) -> Option<SuggestTicket> {
        self.generation += 1;
        self.state.query_text = text.to_string();
        if text.is_empty() {
            self.state.suggestions.clear();
            if !self.route_pending {
                self.phase = SessionPhase::Idle;
            }
            return None;
        }
        if !self.route_pending {
            self.phase = SessionPhase::SuggestionsLoading;
        }
        Some(SuggestTicket {
            query: text.to_string(),
        })
    }

    pub fn resolve_suggestions(
        &mut self,
        ticket: SuggestTicket,
        result: Result<Vec<PlaceCandidate>, RoutingError>,
    ) -> Resolution {
        if ticket.query != self.state.query_text {
            log::debug!(
                "Discarding suggestions for \"{}\", query is now \"{}\"",
                ticket.query,
                self.state.query_text
            );
            return Resolution::Discarded;
        }
        match result {
            Ok(suggestions) => {
                self.state.suggestions = suggestions;
                if self.phase == SessionPhase::SuggestionsLoading {
                    self.phase = SessionPhase::SuggestionsReady;
                }
                Resolution::Installed
            }
            Err(e) => {
                if self.phase == SessionPhase::SuggestionsLoading {
                    self.phase = self.settled_phase();
                }
                Resolution::Failed(e)
            }
        }
    }

    /// A concrete candidate was picked: set the destination, record the search,
    /// and ask for a route. The current route stays until the new one lands.
    pub fn select_candidate(&mut self, candidate: &PlaceCandidate, origin: Coordinate) -> RouteTicket {
        self.generation += 1;
        self.begin_route(candidate, origin, None)
    }

    pub fn begin_lookup(&mut self) -> Option<LookupTicket> {
        if self.state.query_text.is_empty() {
            return None;
        }
        self.generation += 1;
        self.phase = SessionPhase::RouteLoading;
        Some(LookupTicket {
            generation: self.generation,
            query: self.state.query_text.clone(),
        })
    }

    /// Finishes a free-text lookup. On success the route is requested with the
    /// previous destination kept aside, so a route failure restores it.
    ///
    /// `Ok(None)` means the lookup was superseded; the result is dropped,
    /// errors included, and the session is left as it is.
    pub fn resolve_lookup(
        &mut self,
        ticket: LookupTicket,
        result: Result<PlaceCandidate, RoutingError>,
        origin: Coordinate,
    ) -> Result<Option<RouteTicket>, RoutingError> {
        if ticket.generation != self.generation {
            log::debug!(
                "Discarding lookup for \"{}\", a newer action replaced it",
                ticket.query
            );
            return Ok(None);
        }
        match result {
            Ok(candidate) => {
                let previous = self.state.destination;
                Ok(Some(self.begin_route(&candidate, origin, Some(previous))))
            }
            Err(e) => {
                self.phase = self.settled_phase();
                Err(e)
            }
        }
    }

    /// Drops a pending lookup without touching state, e.g. when no origin is known.
    pub fn abandon_lookup(&mut self, ticket: LookupTicket) {
        if ticket.generation == self.generation {
            self.phase = self.settled_phase();
        }
    }

    pub fn resolve_route(
        &mut self,
        ticket: RouteTicket,
        result: Result<Route, RoutingError>,
    ) -> Resolution {
        if ticket.seq != self.route_seq {
            log::debug!(
                "Discarding route to {}, a newer destination was chosen",
                ticket.destination
            );
            return Resolution::Discarded;
        }
        self.route_pending = false;
        match result {
            Ok(route) => {
                self.state.route = Some(route);
                self.phase = SessionPhase::RouteReady;
                Resolution::Installed
            }
            Err(e) => {
                if let Some(previous) = ticket.rollback {
                    self.state.destination = previous;
                }
                self.phase = self.settled_phase();
                Resolution::Failed(e)
            }
        }
    }

    fn begin_route(
        &mut self,
        candidate: &PlaceCandidate,
        origin: Coordinate,
        rollback: Option<Option<Coordinate>>,
    ) -> RouteTicket {
        self.state.destination = Some(candidate.coordinate);
        self.state.recent_searches.promote(&candidate.display_address);
        self.route_seq += 1;
        self.route_pending = true;
        self.phase = SessionPhase::RouteLoading;
        RouteTicket {
            seq: self.route_seq,
            origin,
            destination: candidate.coordinate,
            rollback,
        }
    }

    // Where control returns after a failed call.
    fn settled_phase(&self) -> SessionPhase {
        if self.state.route.is_some() && self.state.destination.is_some() && self.state.query_text.is_empty() {
            SessionPhase::RouteReady
        } else if !self.state.suggestions.is_empty() {
            SessionPhase::SuggestionsReady
        } else if !self.state.query_text.is_empty() {
            SessionPhase::Typing
        } else {
            SessionPhase::Idle
        }
    }
}
