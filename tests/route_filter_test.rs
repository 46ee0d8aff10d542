//! Parsed routes through the filter pipeline

use chrono::{DateTime, Utc};
use vitalport::adapters::export::RouteExtractor;
use vitalport::core::filter::{
    CountryBoxFilter, DiagonalBoxFilter, FilterPipeline, RouteFilter, TimeFilter,
};
use vitalport::domain::Route;

/// GPX document with one point per `(lon, lat, time)`
fn gpx(points: &[(f64, f64, &str)]) -> String {
    let trkpts: String = points
        .iter()
        .map(|(lon, lat, time)| {
            format!(
                r#"<trkpt lon="{lon}" lat="{lat}"><ele>600</ele><time>{time}</time><extensions><speed>4.2</speed><course>80</course><hAcc>3</hAcc><vAcc>2</vAcc></extensions></trkpt>"#
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" xmlns="http://www.topografix.com/GPX/1/1"><trk><trkseg>{trkpts}</trkseg></trk></gpx>"#
    )
}

fn route(name: &str, points: &[(f64, f64, &str)]) -> Route {
    RouteExtractor::parse_str(name, &gpx(points)).unwrap().route
}

fn at(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
}

fn routes() -> Vec<Route> {
    vec![
        route(
            "block_loop",
            &[
                (11.3941, 47.2682, "2021-05-01T06:00:00Z"),
                (11.3962, 47.2695, "2021-05-01T06:04:00Z"),
                (11.3940, 47.2683, "2021-05-01T06:09:00Z"),
            ],
        ),
        route(
            "inn_valley_ride",
            &[
                (11.3941, 47.2682, "2021-06-10T16:00:00Z"),
                (11.4520, 47.2761, "2021-06-10T16:25:00Z"),
                (11.5080, 47.2830, "2021-06-10T17:00:00Z"),
            ],
        ),
        route(
            "spree_ride",
            &[
                (13.4000, 52.5200, "2021-07-01T08:00:00Z"),
                (13.4400, 52.5400, "2021-07-01T08:20:00Z"),
                (13.4800, 52.5600, "2021-07-01T08:40:00Z"),
            ],
        ),
    ]
}

fn names(routes: &[Route]) -> Vec<&str> {
    routes.iter().map(|r| r.name.as_str()).collect()
}

#[test]
fn test_short_loops_are_dropped() {
    let kept = DiagonalBoxFilter::new(2.0).apply(routes());
    assert_eq!(names(&kept), vec!["inn_valley_ride", "spree_ride"]);
}

#[test]
fn test_country_boxes_split_routes() {
    let austria = CountryBoxFilter::austria().apply(routes());
    assert_eq!(names(&austria), vec!["block_loop", "inn_valley_ride"]);

    let germany = CountryBoxFilter::country("Germany").unwrap().apply(routes());
    assert_eq!(names(&germany), vec!["spree_ride"]);

    assert!(CountryBoxFilter::italy().apply(routes()).is_empty());
}

#[test]
fn test_pipeline_combines_filters() {
    let pipeline = FilterPipeline::new()
        .with(DiagonalBoxFilter::new(2.0))
        .with(CountryBoxFilter::austria())
        .with(
            TimeFilter::new(at("2021-05-15T00:00:00Z"), at("2021-12-31T00:00:00Z"))
                .with_duration(600, 7200),
        );

    assert_eq!(pipeline.names(), vec!["diagonal", "country", "time"]);
    let kept = pipeline.apply(routes());
    assert_eq!(names(&kept), vec!["inn_valley_ride"]);
    assert_eq!(kept[0].duration_sec, 3600);
}

#[test]
fn test_duration_bounds_drop_long_rides() {
    let filter = TimeFilter::default().with_duration(0, 45 * 60);
    let kept = filter.apply(routes());
    assert_eq!(names(&kept), vec!["block_loop", "spree_ride"]);
}
