use crate::sdk::geo::Coordinate;
use crate::sdk::routing::error::RoutingError;
use async_trait::async_trait;

/// Single-shot access to the device position.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Fails with `PermissionDenied` or `PositionUnavailable`.
    async fn request_current_position(&self) -> Result<Coordinate, RoutingError>;
}

/// Answers from a position known up front, e.g. a `--from` flag.
#[derive(Debug, Clone, Copy)]
pub enum FixedLocationProvider {
    Granted(Option<Coordinate>),
    Denied,
}

impl FixedLocationProvider {
    pub fn at(position: Coordinate) -> Self {
        FixedLocationProvider::Granted(Some(position))
    }
}

impl From<Option<Coordinate>> for FixedLocationProvider {
    fn from(position: Option<Coordinate>) -> Self {
        FixedLocationProvider::Granted(position)
    }
}

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn request_current_position(&self) -> Result<Coordinate, RoutingError> {
        match self {
            FixedLocationProvider::Granted(Some(position)) => Ok(*position),
            FixedLocationProvider::Granted(None) => Err(RoutingError::PositionUnavailable),
            FixedLocationProvider::Denied => Err(RoutingError::PermissionDenied),
        }
    }
}
