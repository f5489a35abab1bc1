//! Static low-emission zone drawn over the map.

use crate::sdk::geo::{Coordinate, Route};
use geo::{Intersects, LineString, Point, Polygon};
use serde::Serialize;

/// A closed polygon. Points on the boundary count as inside.
#[derive(Debug, Clone)]
pub struct EmissionZone {
    name: String,
    polygon: Polygon<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ZoneReport {
    pub destination_inside: bool,
    pub route_crosses: bool,
}

impl EmissionZone {
    pub fn new(name: impl Into<String>, vertices: &[Coordinate]) -> Self {
        // geo is x = longitude, y = latitude
        let ring: LineString<f64> = vertices
            .iter()
            .map(|c| (c.longitude, c.latitude))
            .collect::<Vec<_>>()
            .into();
        Self {
            name: name.into(),
            polygon: Polygon::new(ring, vec![]),
        }
    }

    /// The rectangle around the Champ-de-Mars shown by the map screen.
    pub fn paris_default() -> Self {
        Self::new(
            "Paris CO2 zone",
            &[
                Coordinate::new(48.8584, 2.2945),
                Coordinate::new(48.8584, 2.3045),
                Coordinate::new(48.8484, 2.3045),
                Coordinate::new(48.8484, 2.2945),
            ],
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Polygon vertices in drawing order, ring closed.
    pub fn vertices(&self) -> Vec<Coordinate> {
        self.polygon
            .exterior()
            .coords()
            .map(|c| Coordinate::new(c.y, c.x))
            .collect()
    }

    pub fn contains(&self, coordinate: Coordinate) -> bool {
        self.polygon
            .intersects(&Point::new(coordinate.longitude, coordinate.latitude))
    }

    /// True when any segment of the polyline touches the zone.
    pub fn crossed_by(&self, route: &Route) -> bool {
        match route.waypoints.as_slice() {
            [] => false,
            [only] => self.contains(*only),
            points => {
                let line: LineString<f64> = points
                    .iter()
                    .map(|c| (c.longitude, c.latitude))
                    .collect::<Vec<_>>()
                    .into();
                self.polygon.intersects(&line)
            }
        }
    }

    pub fn report(&self, destination: Option<Coordinate>, route: Option<&Route>) -> ZoneReport {
        ZoneReport {
            destination_inside: destination.is_some_and(|d| self.contains(d)),
            route_crosses: route.is_some_and(|r| self.crossed_by(r)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_and_interior_are_inside() {
        let zone = EmissionZone::paris_default();
        assert!(zone.contains(Coordinate::new(48.8534, 2.2995)));
        assert!(zone.contains(Coordinate::new(48.8584, 2.2945)));
        assert!(!zone.contains(Coordinate::new(48.8738, 2.2950)));
    }

    #[test]
    fn route_passing_through_the_zone_crosses_it() {
        let zone = EmissionZone::paris_default();
        let through = Route::new(vec![
            Coordinate::new(48.8534, 2.2800),
            Coordinate::new(48.8534, 2.3200),
        ]);
        let around = Route::new(vec![
            Coordinate::new(48.8700, 2.2800),
            Coordinate::new(48.8700, 2.3200),
        ]);
        assert!(zone.crossed_by(&through));
        assert!(!zone.crossed_by(&around));
        assert!(!zone.crossed_by(&Route::default()));
    }

    #[test]
    fn report_handles_missing_state() {
        let zone = EmissionZone::paris_default();
        assert_eq!(
            zone.report(None, None),
            ZoneReport {
                destination_inside: false,
                route_crosses: false
            }
        );
        let inside = Coordinate::new(48.8534, 2.2995);
        let route = Route::new(vec![inside]);
        assert_eq!(
            zone.report(Some(inside), Some(&route)),
            ZoneReport {
                destination_inside: true,
                route_crosses: true
            }
        );
    }

    #[test]
    fn vertices_round_trip_in_lat_lon_order() {
        let zone = EmissionZone::paris_default();
        let vertices = zone.vertices();
        assert_eq!(vertices.first(), Some(&Coordinate::new(48.8584, 2.2945)));
        // Polygon::new closes the ring
        assert_eq!(vertices.first(), vertices.last());
        assert_eq!(vertices.len(), 5);
        assert_eq!(zone.name(), "Paris CO2 zone");
    }
}
