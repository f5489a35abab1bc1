use crate::sdk::config::{DEFAULT_RECENT_CAPACITY, DEFAULT_SUGGESTION_LIMIT};
use crate::sdk::geo::{Coordinate, PlaceCandidate};
use crate::sdk::location::LocationProvider;
use crate::sdk::routing::error::{ErrorKind, RoutingError};
use crate::sdk::routing::service::{PlaceSearchProvider, RoutingProvider};
use crate::sdk::session::{
    RecentSearches, Resolution, SearchSession, SearchSessionState, SessionPhase,
    RECENT_SEARCHES_KEY,
};
use crate::sdk::store::KeyValueStore;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::Arc;

/// One user-facing alert per failed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: ErrorKind,
    pub message: String,
}

impl Notice {
    fn from_error(e: &RoutingError) -> Self {
        Notice {
            kind: e.kind(),
            message: format!("{}: {}", e.kind().title(), e),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ControllerSettings {
    pub suggestion_limit: usize,
    pub recent_capacity: usize,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            recent_capacity: DEFAULT_RECENT_CAPACITY,
        }
    }
}

/// Owns one map-view session and sequences the remote calls behind it.
///
/// Runs on a single thread. State lives in a `RefCell` that is never borrowed
/// across an `.await`, so several calls may be in flight at once and each
/// resolves against whatever the session looks like when it lands.
pub struct SearchController {
    location: Arc<dyn LocationProvider>,
    search: Arc<dyn PlaceSearchProvider>,
    routing: Arc<dyn RoutingProvider>,
    store: Option<Box<dyn KeyValueStore>>,
    settings: ControllerSettings,
    session: RefCell<SearchSession>,
    notices: RefCell<VecDeque<Notice>>,
}

impl SearchController {
    pub fn new(
        location: Arc<dyn LocationProvider>,
        search: Arc<dyn PlaceSearchProvider>,
        routing: Arc<dyn RoutingProvider>,
        settings: ControllerSettings,
    ) -> Self {
        Self {
            location,
            search,
            routing,
            store: None,
            settings,
            session: RefCell::new(SearchSession::new(RecentSearches::new(
                settings.recent_capacity,
            ))),
            notices: RefCell::new(VecDeque::new()),
        }
    }

    /// Attaches persistence for recent searches and loads what it holds.
    pub fn with_store(mut self, store: Box<dyn KeyValueStore>) -> Self {
        let loaded = match store.get(RECENT_SEARCHES_KEY) {
            Ok(Some(data)) => RecentSearches::from_json(&data, self.settings.recent_capacity)
                .map_err(|e| log::warn!("Ignoring unreadable recent searches: {}", e))
                .ok(),
            Ok(None) => None,
            Err(e) => {
                log::warn!("Could not read recent searches: {}", e);
                None
            }
        };
        if let Some(recent) = loaded {
            log::debug!("Loaded {} recent searches", recent.len());
            self.session = RefCell::new(SearchSession::new(recent));
        }
        self.store = Some(store);
        self
    }

    /// A copy of the current state for rendering.
    pub fn snapshot(&self) -> SearchSessionState {
        self.session.borrow().state().clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.borrow().phase()
    }

    pub fn drain_notices(&self) -> Vec<Notice> {
        self.notices.borrow_mut().drain(..).collect()
    }

    /// Asks for the device position once and remembers it as the route origin.
    pub async fn locate(&self) -> Result<Coordinate, RoutingError> {
        match self.location.request_current_position().await {
            Ok(position) => {
                log::debug!("Current position is {}", position);
                self.session.borrow_mut().set_origin(position);
                Ok(position)
            }
            Err(e) => {
                self.notify(&e);
                Err(e)
            }
        }
    }

    /// Feeds a keystroke. Non-empty text fires a `suggest` whose answer is
    /// installed only if the text is still current when it arrives.
    pub async fn on_query_changed(&self, text: &str) -> Resolution {
        let Some(ticket) = self.session.borrow_mut().set_query(text) else {
            return Resolution::Installed;
        };

        let result = self
            .search
            .suggest(ticket.query(), self.settings.suggestion_limit)
            .await;

        let resolution = self
            .session
            .borrow_mut()
            .resolve_suggestions(ticket, result);
        self.report(resolution)
    }

    /// The user tapped a suggestion.
    pub async fn select(&self, candidate: &PlaceCandidate) -> Resolution {
        let origin = match self.origin().await {
            Ok(origin) => origin,
            Err(e) => return Resolution::Failed(e),
        };

        let ticket = self
            .session
            .borrow_mut()
            .select_candidate(candidate, origin);
        self.persist_recent();

        let result = self
            .routing
            .compute_route(ticket.origin(), ticket.destination())
            .await;
        let resolution = self.session.borrow_mut().resolve_route(ticket, result);
        self.report(resolution)
    }

    /// The user submitted the typed text without picking a suggestion.
    /// A keystroke, selection or submit made while the lookup runs wins over it.
    pub async fn submit(&self) -> Resolution {
        let Some(lookup) = self.session.borrow_mut().begin_lookup() else {
            return Resolution::Discarded;
        };

        let origin = match self.origin().await {
            Ok(origin) => origin,
            Err(e) => {
                self.session.borrow_mut().abandon_lookup(lookup);
                return Resolution::Failed(e);
            }
        };

        let found = self.search.find_best(lookup.query()).await;
        let ticket = match self.session.borrow_mut().resolve_lookup(lookup, found, origin) {
            Ok(Some(ticket)) => ticket,
            Ok(None) => return Resolution::Discarded,
            Err(e) => return self.report(Resolution::Failed(e)),
        };
        self.persist_recent();

        let result = self
            .routing
            .compute_route(ticket.origin(), ticket.destination())
            .await;
        let resolution = self.session.borrow_mut().resolve_route(ticket, result);
        self.report(resolution)
    }

    // Last known origin, or a fresh position request.
    async fn origin(&self) -> Result<Coordinate, RoutingError> {
        let known = self.session.borrow().state().origin;
        match known {
            Some(origin) => Ok(origin),
            None => self.locate().await,
        }
    }

    fn report(&self, resolution: Resolution) -> Resolution {
        if let Resolution::Failed(e) = &resolution {
            self.notify(e);
        }
        resolution
    }

    fn notify(&self, e: &RoutingError) {
        log::warn!("{}", e);
        self.notices.borrow_mut().push_back(Notice::from_error(e));
    }

    fn persist_recent(&self) {
        let Some(store) = &self.store else {
            return;
        };
        let data = match self.session.borrow().state().recent_searches.to_json() {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Could not encode recent searches: {}", e);
                return;
            }
        };
        if let Err(e) = store.set(RECENT_SEARCHES_KEY, &data) {
            log::warn!("Could not save recent searches: {}", e);
        }
    }
}
