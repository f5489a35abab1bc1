use crate::sdk::geo::{Coordinate, PlaceCandidate, Route, RouteSummary};
use crate::sdk::routing::error::{ApiErrorPayload, RoutingError, ServiceFault};
use serde::Deserialize;

// --- Data Structures for parsing search responses ---

#[derive(Deserialize)]
pub struct SearchResponse {
    // A body without `results` is an empty hit list.
    #[serde(default)]
    pub results: Vec<SearchResult>,
}
#[derive(Deserialize)]
pub struct SearchResult {
    pub address: Address,
    pub position: Position,
}
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub freeform_address: String,
}
#[derive(Deserialize, Clone, Copy)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

// --- Data Structures for parsing calculateRoute responses ---

#[derive(Deserialize)]
pub struct CalculateRouteResponse {
    #[serde(default)]
    pub routes: Vec<RouteAlternative>,
}
#[derive(Deserialize)]
pub struct RouteAlternative {
    pub summary: Option<AlternativeSummary>,
    #[serde(default)]
    pub legs: Vec<Leg>,
}
#[derive(Deserialize, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeSummary {
    pub length_in_meters: f64,
    pub travel_time_in_seconds: f64,
}
#[derive(Deserialize)]
pub struct Leg {
    #[serde(default)]
    pub points: Vec<Point>,
}
#[derive(Deserialize, Clone, Copy)]
pub struct Point {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<SearchResult> for PlaceCandidate {
    fn from(r: SearchResult) -> Self {
        PlaceCandidate {
            display_address: r.address.freeform_address,
            coordinate: Coordinate::new(r.position.lat, r.position.lon),
        }
    }
}

impl From<AlternativeSummary> for RouteSummary {
    fn from(s: AlternativeSummary) -> Self {
        RouteSummary {
            distance_km: s.length_in_meters / 1000.0,
            duration_hours: s.travel_time_in_seconds / 3600.0,
        }
    }
}

/// Turns a non-2xx body into a fault, preferring the structured payload.
pub fn api_fault(status: u16, text: &str) -> ServiceFault {
    match serde_json::from_str::<ApiErrorPayload>(text) {
        Ok(ApiErrorPayload {
            detailed_error: Some(detail),
            ..
        }) => ServiceFault::Api {
            code: detail.code,
            message: detail.message,
        },
        Ok(ApiErrorPayload {
            error_text: Some(message),
            ..
        }) => ServiceFault::Api {
            code: status.to_string(),
            message,
        },
        _ => {
            log::error!(
                "API returned non-success status: {}. Unparseable Body: {}",
                status,
                text
            );
            ServiceFault::RawApi {
                status,
                body: text.to_string(),
            }
        }
    }
}

/// Parses a search body into at most `limit` candidates, provider order kept.
pub fn parse_search(text: &str, limit: usize) -> Result<Vec<PlaceCandidate>, RoutingError> {
    let resp: SearchResponse = serde_json::from_str(text)?;
    Ok(resp
        .results
        .into_iter()
        .take(limit)
        .map(PlaceCandidate::from)
        .collect())
}

/// Parses a calculateRoute body: alternative 0, leg 0, points verbatim.
pub fn parse_route(text: &str) -> Result<Route, RoutingError> {
    let resp: CalculateRouteResponse = serde_json::from_str(text)?;
    let alternative = resp
        .routes
        .into_iter()
        .next()
        .ok_or(RoutingError::NoRouteFound)?;
    let leg = alternative
        .legs
        .into_iter()
        .next()
        .ok_or(RoutingError::NoRouteFound)?;

    let waypoints = leg
        .points
        .into_iter()
        .map(|p| Coordinate::new(p.latitude, p.longitude))
        .collect();

    let route = Route::new(waypoints);
    Ok(match alternative.summary {
        Some(summary) => route.with_summary(summary.into()),
        None => route,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::routing::error::ErrorKind;

    const EIFFEL_SEARCH: &str = r#"{
        "summary": {"query": "eiffel", "numResults": 2},
        "results": [
            {"type": "POI", "address": {"freeformAddress": "Tour Eiffel"}, "position": {"lat": 48.8584, "lon": 2.2945}},
            {"type": "Street", "address": {"freeformAddress": "Avenue Gustave Eiffel"}, "position": {"lat": 48.8570, "lon": 2.2960}}
        ]
    }"#;

    #[test]
    fn search_results_keep_provider_order() {
        let candidates = parse_search(EIFFEL_SEARCH, 5).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].display_address, "Tour Eiffel");
        assert_eq!(candidates[0].coordinate, Coordinate::new(48.8584, 2.2945));
        assert_eq!(candidates[1].display_address, "Avenue Gustave Eiffel");
    }

    #[test]
    fn search_results_are_truncated_to_limit() {
        let candidates = parse_search(EIFFEL_SEARCH, 1).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].display_address, "Tour Eiffel");
    }

    #[test]
    fn missing_results_is_an_empty_list() {
        assert!(parse_search(r#"{"summary": {}}"#, 5).unwrap().is_empty());
        assert!(parse_search(r#"{"results": []}"#, 5).unwrap().is_empty());
    }

    #[test]
    fn malformed_search_body_is_service_unavailable() {
        let err = parse_search("<html>oops</html>", 5).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
    }

    #[test]
    fn route_takes_first_alternative_first_leg() {
        let body = r#"{
            "routes": [
                {
                    "summary": {"lengthInMeters": 4200, "travelTimeInSeconds": 900},
                    "legs": [
                        {"points": [
                            {"latitude": 48.85, "longitude": 2.35},
                            {"latitude": 48.859, "longitude": 2.30},
                            {"latitude": 48.8584, "longitude": 2.2945}
                        ]},
                        {"points": [{"latitude": 0.0, "longitude": 0.0}]}
                    ]
                },
                {"legs": [{"points": [{"latitude": 1.0, "longitude": 1.0}]}]}
            ]
        }"#;
        let route = parse_route(body).unwrap();
        assert_eq!(
            route.waypoints,
            vec![
                Coordinate::new(48.85, 2.35),
                Coordinate::new(48.859, 2.30),
                Coordinate::new(48.8584, 2.2945),
            ]
        );
        let summary = route.summary.unwrap();
        assert!((summary.distance_km - 4.2).abs() < 1e-9);
        assert!((summary.duration_hours - 0.25).abs() < 1e-9);
    }

    #[test]
    fn zero_alternatives_is_no_route_found() {
        let err = parse_route(r#"{"routes": []}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoRouteFound);

        let err = parse_route(r#"{"routes": [{"legs": []}]}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoRouteFound);
    }

    #[test]
    fn structured_error_payloads_are_recognised() {
        let detailed = r#"{"formatVersion":"0.0.12","detailedError":{"code":"NO_ROUTE_FOUND","message":"Unable to find a route."}}"#;
        match api_fault(400, detailed) {
            ServiceFault::Api { code, message } => {
                assert_eq!(code, "NO_ROUTE_FOUND");
                assert_eq!(message, "Unable to find a route.");
            }
            other => panic!("unexpected fault: {other:?}"),
        }

        match api_fault(403, r#"{"errorText":"Forbidden"}"#) {
            ServiceFault::Api { code, message } => {
                assert_eq!(code, "403");
                assert_eq!(message, "Forbidden");
            }
            other => panic!("unexpected fault: {other:?}"),
        }

        match api_fault(502, "Bad Gateway") {
            ServiceFault::RawApi { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body, "Bad Gateway");
            }
            other => panic!("unexpected fault: {other:?}"),
        }
    }
}
