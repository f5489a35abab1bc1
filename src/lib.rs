pub mod sdk;

pub use sdk::config::NavConfig;
pub use sdk::controller::{ControllerSettings, Notice, SearchController};
pub use sdk::geo::{Coordinate, PlaceCandidate, Route, RouteSummary};
pub use sdk::location::{FixedLocationProvider, LocationProvider};
pub use sdk::routing::{ErrorKind, PlaceSearchProvider, RemoteTomTomProvider, RoutingError, RoutingProvider};
pub use sdk::session::{Resolution, SearchSessionState, SessionPhase};
pub use sdk::store::{FileStore, KeyValueStore, MemoryStore};
pub use sdk::zone::EmissionZone;
