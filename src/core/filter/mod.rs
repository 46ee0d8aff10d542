//! Route filters
//!
//! A [`RouteFilter`] decides per route whether it is kept. Filters are combined
//! with a [`FilterPipeline`], which applies them in insertion order so each one
//! only sees what the previous filters kept.
//!
//! ```rust
//! use vitalport::core::filter::{CountryBoxFilter, DiagonalBoxFilter, FilterPipeline};
//!
//! let pipeline = FilterPipeline::new()
//!     .with(DiagonalBoxFilter::new(2.0))
//!     .with(CountryBoxFilter::austria());
//! assert_eq!(pipeline.len(), 2);
//! ```

pub mod bbox;
pub mod time;

pub use bbox::{haversine_km, CountryBoxFilter, DiagonalBoxFilter, COUNTRY_BOXES};
pub use time::TimeFilter;

use crate::domain::Route;

/// Predicate over routes
pub trait RouteFilter: Send + Sync {
    /// Short name used in log output
    fn name(&self) -> &str;

    /// True when `route` passes the filter
    fn keep(&self, route: &Route) -> bool;

    /// Keeps the passing routes, preserving their order
    fn apply(&self, mut routes: Vec<Route>) -> Vec<Route> {
        let before = routes.len();
        routes.retain(|route| self.keep(route));
        tracing::debug!(
            filter = self.name(),
            before,
            kept = routes.len(),
            "Route filter applied"
        );
        routes
    }
}

/// Ordered chain of route filters
#[derive(Default)]
pub struct FilterPipeline {
    filters: Vec<Box<dyn RouteFilter>>,
}

impl FilterPipeline {
    /// Empty pipeline; keeps every route
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a filter
    pub fn with(mut self, filter: impl RouteFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Appends a boxed filter
    pub fn push(&mut self, filter: Box<dyn RouteFilter>) {
        self.filters.push(filter);
    }

    /// Number of filters
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// True when no filter is configured
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Names of the filters in application order
    pub fn names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Runs every filter in order
    pub fn apply(&self, routes: Vec<Route>) -> Vec<Route> {
        let total = routes.len();
        let kept = self
            .filters
            .iter()
            .fold(routes, |routes, filter| filter.apply(routes));
        tracing::info!(
            filters = self.filters.len(),
            total,
            kept = kept.len(),
            "Route filters applied"
        );
        kept
    }
}

impl std::fmt::Debug for FilterPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterPipeline")
            .field("filters", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::route::{parse_point_time, RoutePoint};

    fn route(name: &str, coords: &[(f64, f64)]) -> Route {
        let points = coords
            .iter()
            .enumerate()
            .map(|(i, (lon, lat))| RoutePoint {
                lon: *lon,
                lat: *lat,
                elevation: 600.0,
                time: parse_point_time(&format!("2021-05-01T10:00:{:02}Z", i)).unwrap(),
                speed: 2.5,
                course: 90.0,
                h_acc: 3.0,
                v_acc: 2.0,
            })
            .collect();
        Route::new(name, points)
    }

    struct NameStartsWith(&'static str);

    impl RouteFilter for NameStartsWith {
        fn name(&self) -> &str {
            "prefix"
        }

        fn keep(&self, route: &Route) -> bool {
            route.name.starts_with(self.0)
        }
    }

    #[test]
    fn test_empty_pipeline_keeps_everything() {
        let routes = vec![route("a", &[(11.0, 47.0)]), route("b", &[(11.0, 47.0)])];
        let pipeline = FilterPipeline::new();
        assert!(pipeline.is_empty());
        assert_eq!(pipeline.apply(routes).len(), 2);
    }

    #[test]
    fn test_filters_apply_in_order() {
        let routes = vec![
            route("innsbruck-long", &[(11.0, 47.0), (11.5, 47.3)]),
            route("innsbruck-short", &[(11.0, 47.0), (11.001, 47.0)]),
            route("rome-long", &[(12.4, 41.8), (12.6, 42.0)]),
        ];
        let pipeline = FilterPipeline::new()
            .with(NameStartsWith("innsbruck"))
            .with(DiagonalBoxFilter::new(5.0));

        let kept = pipeline.apply(routes);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "innsbruck-long");
        assert_eq!(pipeline.names(), vec!["prefix", "diagonal"]);
    }
}
