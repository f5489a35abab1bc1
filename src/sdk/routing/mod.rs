pub mod error;
pub mod provider;
pub mod service;

pub use error::{ErrorKind, RoutingError, ServiceFault};
pub use provider::RemoteTomTomProvider;
pub use service::{PlaceSearchProvider, RoutingProvider};
