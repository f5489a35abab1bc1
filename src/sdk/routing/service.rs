use super::error::RoutingError;
use crate::sdk::geo::{Coordinate, PlaceCandidate, Route};
use async_trait::async_trait;

#[async_trait]
pub trait PlaceSearchProvider: Send + Sync {
    /// Ranked candidates for free text, at most `limit` of them.
    ///
    /// No match is an empty list, not an error. Callers skip empty queries.
    async fn suggest(&self, query: &str, limit: usize) -> Result<Vec<PlaceCandidate>, RoutingError>;

    /// The top hit for `query`, or `NoMatch`.
    async fn find_best(&self, query: &str) -> Result<PlaceCandidate, RoutingError> {
        self.suggest(query, 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RoutingError::NoMatch(query.to_string()))
    }
}

#[async_trait]
pub trait RoutingProvider: Send + Sync {
    /// Waypoints of the first alternative the provider returns.
    async fn compute_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Route, RoutingError>;
}
