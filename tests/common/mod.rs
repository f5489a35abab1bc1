#![allow(dead_code)]

use async_trait::async_trait;
use navassist::sdk::routing::error::ServiceFault;
use navassist::{
    Coordinate, LocationProvider, PlaceCandidate, PlaceSearchProvider, Route, RoutingError,
    RoutingProvider,
};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

pub const ORIGIN: Coordinate = Coordinate::new(48.8566, 2.3522);

pub fn place(address: &str, latitude: f64, longitude: f64) -> PlaceCandidate {
    PlaceCandidate {
        display_address: address.to_string(),
        coordinate: Coordinate::new(latitude, longitude),
    }
}

pub fn tour_eiffel() -> PlaceCandidate {
    place("Tour Eiffel", 48.8584, 2.2945)
}

pub fn louvre() -> PlaceCandidate {
    place("Musée du Louvre", 48.8606, 2.3376)
}

pub fn eifel() -> PlaceCandidate {
    place("Eifel, Germany", 50.33, 6.78)
}

pub fn unavailable() -> RoutingError {
    ServiceFault::RawApi {
        status: 503,
        body: "Service Unavailable".to_string(),
    }
    .into()
}

/// Substring search over a fixed catalogue, with per-query latency.
pub struct ScriptedSearch {
    catalogue: Vec<PlaceCandidate>,
    delays: HashMap<String, Duration>,
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedSearch {
    pub fn new(catalogue: Vec<PlaceCandidate>) -> Self {
        Self {
            catalogue,
            delays: HashMap::new(),
            failing: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn paris() -> Self {
        Self::new(vec![tour_eiffel(), eifel(), louvre()])
    }

    pub fn delay(mut self, query: &str, delay: Duration) -> Self {
        self.delays.insert(query.to_string(), delay);
        self
    }

    pub fn fail(mut self, query: &str) -> Self {
        self.failing.insert(query.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlaceSearchProvider for ScriptedSearch {
    async fn suggest(&self, query: &str, limit: usize) -> Result<Vec<PlaceCandidate>, RoutingError> {
        self.calls.lock().unwrap().push(query.to_string());
        if let Some(delay) = self.delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(query) {
            return Err(unavailable());
        }
        let needle = query.to_lowercase();
        Ok(self
            .catalogue
            .iter()
            .filter(|p| p.display_address.to_lowercase().contains(&needle))
            .take(limit)
            .cloned()
            .collect())
    }
}

type RouteFn = Box<dyn Fn(Coordinate, Coordinate) -> Result<Route, RoutingError> + Send + Sync>;

/// Routes through a fixed via-point, with optional failures and per-destination latency.
pub struct ScriptedRouting {
    plan: RouteFn,
    delays: Vec<(Coordinate, Duration)>,
    calls: Mutex<Vec<(Coordinate, Coordinate)>>,
}

impl ScriptedRouting {
    pub fn new<F>(plan: F) -> Self
    where
        F: Fn(Coordinate, Coordinate) -> Result<Route, RoutingError> + Send + Sync + 'static,
    {
        Self {
            plan: Box::new(plan),
            delays: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// origin -> (48.859, 2.30) -> destination
    pub fn via_trocadero() -> Self {
        Self::new(|origin, destination| {
            Ok(Route::new(vec![
                origin,
                Coordinate::new(48.859, 2.30),
                destination,
            ]))
        })
    }

    /// Like `via_trocadero`, but never reaches `unreachable`.
    pub fn failing_for(unreachable: Coordinate) -> Self {
        Self::new(move |origin, destination| {
            if destination == unreachable {
                Err(RoutingError::NoRouteFound)
            } else {
                Ok(Route::new(vec![origin, destination]))
            }
        })
    }

    pub fn delay(mut self, destination: Coordinate, delay: Duration) -> Self {
        self.delays.push((destination, delay));
        self
    }

    pub fn calls(&self) -> Vec<(Coordinate, Coordinate)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RoutingProvider for ScriptedRouting {
    async fn compute_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Route, RoutingError> {
        self.calls.lock().unwrap().push((origin, destination));
        if let Some((_, delay)) = self.delays.iter().find(|(d, _)| *d == destination) {
            tokio::time::sleep(*delay).await;
        }
        (self.plan)(origin, destination)
    }
}

/// Counts position requests.
pub struct CountingLocation {
    position: Option<Coordinate>,
    requests: Mutex<usize>,
}

impl CountingLocation {
    pub fn at(position: Coordinate) -> Self {
        Self {
            position: Some(position),
            requests: Mutex::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            position: None,
            requests: Mutex::new(0),
        }
    }

    pub fn requests(&self) -> usize {
        *self.requests.lock().unwrap()
    }
}

#[async_trait]
impl LocationProvider for CountingLocation {
    async fn request_current_position(&self) -> Result<Coordinate, RoutingError> {
        *self.requests.lock().unwrap() += 1;
        self.position.ok_or(RoutingError::PositionUnavailable)
    }
}
