use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

impl FromStr for Coordinate {
    type Err = String;

    /// Parses `"lat,lon"`, the same shape `Display` produces.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| format!("Expected LAT,LON but got \"{}\"", s))?;
        let latitude: f64 = lat
            .trim()
            .parse()
            .map_err(|e| format!("Invalid latitude \"{}\": {}", lat, e))?;
        let longitude: f64 = lon
            .trim()
            .parse()
            .map_err(|e| format!("Invalid longitude \"{}\": {}", lon, e))?;

        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(format!("Coordinate out of range: {},{}", latitude, longitude));
        }
        Ok(Coordinate::new(latitude, longitude))
    }
}

/// One place returned by the search provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub display_address: String,
    pub coordinate: Coordinate,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub distance_km: f64,
    pub duration_hours: f64,
}

/// An ordered polyline from origin to destination.
///
/// Built in one piece by a routing provider and swapped into the session whole.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Route {
    pub waypoints: Vec<Coordinate>,
    pub summary: Option<RouteSummary>,
}

impl Route {
    pub fn new(waypoints: Vec<Coordinate>) -> Self {
        Self {
            waypoints,
            summary: None,
        }
    }

    pub fn with_summary(mut self, summary: RouteSummary) -> Self {
        self.summary = Some(summary);
        self
    }

    /// An empty polyline means no route was computed.
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }
}
