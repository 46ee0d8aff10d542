//! Bounding-box route filters

use super::RouteFilter;
use crate::domain::{BoundingBox, Route};

/// Earth radius used for great-circle distances, in km
pub const EARTH_RADIUS_KM: f64 = 6372.8;

/// Built-in country boxes (lon/lat degrees)
pub const COUNTRY_BOXES: [(&str, BoundingBox); 3] = [
    (
        "italy",
        BoundingBox {
            min_lon: 6.75,
            min_lat: 36.62,
            max_lon: 18.48,
            max_lat: 47.12,
        },
    ),
    (
        "germany",
        BoundingBox {
            min_lon: 5.988_658_074_58,
            min_lat: 47.302_487_697_9,
            max_lon: 15.016_995_883_9,
            max_lat: 54.983_104_153,
        },
    ),
    (
        "austria",
        BoundingBox {
            min_lon: 9.48,
            min_lat: 46.43,
            max_lon: 16.98,
            max_lat: 49.04,
        },
    ),
];

/// Great-circle distance between two points, in km
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lat2) = (lat1.to_radians(), lat2.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// Length of the diagonal of a route's bounding box, in km
pub fn diagonal_km(bbox: &BoundingBox) -> f64 {
    haversine_km(bbox.min_lat, bbox.min_lon, bbox.max_lat, bbox.max_lon)
}

/// Keeps routes whose bounding-box diagonal is at least `min_km`
///
/// Short loops around the block have a small box; this drops them while
/// keeping anything that actually went somewhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiagonalBoxFilter {
    /// Minimum diagonal in km
    pub min_km: f64,
}

impl DiagonalBoxFilter {
    /// Create a new filter
    pub fn new(min_km: f64) -> Self {
        Self { min_km }
    }
}

impl RouteFilter for DiagonalBoxFilter {
    fn name(&self) -> &str {
        "diagonal"
    }

    fn keep(&self, route: &Route) -> bool {
        route
            .bounding_box()
            .is_some_and(|bbox| diagonal_km(&bbox) >= self.min_km)
    }
}

/// Keeps routes lying entirely inside a lon/lat box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountryBoxFilter {
    /// Box a route must fit into
    pub bbox: BoundingBox,
}

impl CountryBoxFilter {
    /// Filter for an arbitrary box
    pub fn new(bbox: BoundingBox) -> Self {
        Self { bbox }
    }

    /// Filter for a built-in country, matched case-insensitively
    pub fn country(name: &str) -> Option<Self> {
        COUNTRY_BOXES
            .iter()
            .find(|(country, _)| country.eq_ignore_ascii_case(name.trim()))
            .map(|(_, bbox)| Self::new(*bbox))
    }

    /// Italy
    pub fn italy() -> Self {
        Self::new(COUNTRY_BOXES[0].1)
    }

    /// Germany
    pub fn germany() -> Self {
        Self::new(COUNTRY_BOXES[1].1)
    }

    /// Austria
    pub fn austria() -> Self {
        Self::new(COUNTRY_BOXES[2].1)
    }
}

impl RouteFilter for CountryBoxFilter {
    fn name(&self) -> &str {
        "country"
    }

    fn keep(&self, route: &Route) -> bool {
        route
            .bounding_box()
            .is_some_and(|bbox| self.bbox.contains(&bbox))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::route::{parse_point_time, RoutePoint};
    use test_case::test_case;

    fn route(coords: &[(f64, f64)]) -> Route {
        let points = coords
            .iter()
            .enumerate()
            .map(|(i, (lon, lat))| RoutePoint {
                lon: *lon,
                lat: *lat,
                elevation: 0.0,
                time: parse_point_time(&format!("2021-05-01T10:00:{:02}Z", i)).unwrap(),
                speed: 0.0,
                course: 0.0,
                h_acc: 0.0,
                v_acc: 0.0,
            })
            .collect();
        Route::new("r", points)
    }

    #[test]
    fn test_haversine_one_degree_of_latitude() {
        let d = haversine_km(47.0, 11.0, 48.0, 11.0);
        assert!((d - 111.226).abs() < 0.01, "got {d}");
    }

    #[test]
    fn test_haversine_same_point_is_zero() {
        assert_eq!(haversine_km(47.26, 11.39, 47.26, 11.39), 0.0);
    }

    #[test_case(100.0, true ; "below the diagonal")]
    #[test_case(111.0, true ; "just below the diagonal")]
    #[test_case(112.0, false ; "above the diagonal")]
    fn test_diagonal_filter(min_km: f64, kept: bool) {
        let r = route(&[(11.0, 47.0), (11.0, 48.0)]);
        assert_eq!(DiagonalBoxFilter::new(min_km).keep(&r), kept);
    }

    #[test]
    fn test_diagonal_filter_drops_empty_route() {
        assert!(!DiagonalBoxFilter::new(0.0).keep(&route(&[])));
    }

    #[test]
    fn test_country_lookup() {
        assert_eq!(CountryBoxFilter::country("Austria"), Some(CountryBoxFilter::austria()));
        assert_eq!(CountryBoxFilter::country("germany"), Some(CountryBoxFilter::germany()));
        assert!(CountryBoxFilter::country("atlantis").is_none());
    }

    #[test]
    fn test_country_filter() {
        let innsbruck = route(&[(11.39, 47.26), (11.45, 47.28)]);
        let rome = route(&[(12.49, 41.89), (12.50, 41.90)]);
        let border = route(&[(9.0, 47.2), (9.6, 47.3)]);

        let austria = CountryBoxFilter::austria();
        assert!(austria.keep(&innsbruck));
        assert!(!austria.keep(&rome));
        assert!(!austria.keep(&border));
        assert!(CountryBoxFilter::italy().keep(&rome));
    }
}
