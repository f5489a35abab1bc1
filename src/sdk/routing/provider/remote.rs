use super::types::{api_fault, parse_route, parse_search};
use crate::sdk::config::NavConfig;
use crate::sdk::geo::{Coordinate, PlaceCandidate, Route};
use crate::sdk::routing::error::{RoutingError, ServiceFault};
use crate::sdk::routing::service::{PlaceSearchProvider, RoutingProvider};
use crate::sdk::util::rate_limit::Limiter;
use async_trait::async_trait;
use reqwest::{Client, Url};

const NO_ROUTE_CODE: &str = "NO_ROUTE_FOUND";

/// Search and routing over the TomTom HTTP API.
pub struct RemoteTomTomProvider {
    client: Client,
    api_key: String,
    base_url: String,
    route_type: String,
    traffic: bool,
    limiter: Limiter,
}

impl RemoteTomTomProvider {
    pub fn new(config: &NavConfig, limiter: Limiter) -> Result<Self, RoutingError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            route_type: "fastest".to_string(),
            traffic: false,
            limiter,
        })
    }

    /// `{base}/search/2/search/{query}.json`, with the query percent-encoded as one segment.
    pub fn search_url(&self, query: &str) -> Result<Url, RoutingError> {
        let mut url = self.base()?;
        url.path_segments_mut()
            .map_err(|_| ServiceFault::Endpoint(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["search", "2", "search", &format!("{}.json", query)]);
        Ok(url)
    }

    /// `{base}/routing/1/calculateRoute/{oLat},{oLon}:{dLat},{dLon}/json`
    pub fn route_url(&self, origin: Coordinate, destination: Coordinate) -> Result<Url, RoutingError> {
        let mut url = self.base()?;
        url.path_segments_mut()
            .map_err(|_| ServiceFault::Endpoint(self.base_url.clone()))?
            .pop_if_empty()
            .extend([
                "routing",
                "1",
                "calculateRoute",
                &format!("{}:{}", origin, destination),
                "json",
            ]);
        Ok(url)
    }

    fn base(&self) -> Result<Url, RoutingError> {
        Url::parse(&self.base_url)
            .map_err(|e| ServiceFault::Endpoint(format!("{}: {}", self.base_url, e)).into())
    }

    async fn get_text(&self, url: Url, query: &[(&str, String)]) -> Result<String, RoutingError> {
        self.limiter.until_ready().await;

        let response = match self.client.get(url.clone()).query(query).send().await {
            Ok(resp) => resp,
            Err(e) => {
                log::error!("Failed to send GET request. URL: {}\nError: {}", url, e);
                return Err(e.into());
            }
        };

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(match api_fault(status.as_u16(), &text) {
                ServiceFault::Api { code, .. } if code == NO_ROUTE_CODE => RoutingError::NoRouteFound,
                fault => fault.into(),
            });
        }
        Ok(text)
    }
}

#[async_trait]
impl PlaceSearchProvider for RemoteTomTomProvider {
    async fn suggest(&self, query: &str, limit: usize) -> Result<Vec<PlaceCandidate>, RoutingError> {
        log::debug!("[PROVIDER] Calling remote search for query: \"{}\"", query);
        let url = self.search_url(query)?;
        let params = [("key", self.api_key.clone()), ("limit", limit.to_string())];

        let text = self.get_text(url.clone(), &params).await?;
        parse_search(&text, limit).map_err(|e| {
            log::error!(
                "Failed to parse SearchResponse. URL: {}\nError: {}. Body: {}",
                url,
                e,
                text
            );
            e
        })
    }
}

#[async_trait]
impl RoutingProvider for RemoteTomTomProvider {
    async fn compute_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Route, RoutingError> {
        log::debug!(
            "[PROVIDER] Calling remote calculateRoute for {} -> {}",
            origin,
            destination
        );
        let url = self.route_url(origin, destination)?;
        let params = [
            ("key", self.api_key.clone()),
            ("routeType", self.route_type.clone()),
            ("traffic", self.traffic.to_string()),
        ];

        let text = self.get_text(url.clone(), &params).await?;
        parse_route(&text).map_err(|e| {
            if matches!(e, RoutingError::ServiceUnavailable(_)) {
                log::error!(
                    "Failed to parse CalculateRouteResponse. URL: {}\nError: {}. Body: {}",
                    url,
                    e,
                    text
                );
            }
            e
        })
    }
}
