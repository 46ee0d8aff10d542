//! Workout route domain model
//!
//! A [`Route`] is the ordered track of a workout: every [`RoutePoint`] carries
//! all eight GPX fields. Start, end and duration are derived from the first and
//! last point when the route is built.

use super::errors::VitalportError;
use super::result::Result;
use super::table::Table;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Column order of a cached route table
pub const ROUTE_COLUMNS: [&str; 8] = [
    "lon",
    "lat",
    "elevation",
    "time",
    "speed",
    "course",
    "hAcc",
    "vAcc",
];

/// A single GPS track point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    /// Longitude in degrees
    pub lon: f64,
    /// Latitude in degrees
    pub lat: f64,
    /// Elevation in meters
    pub elevation: f64,
    /// Fix time (UTC)
    pub time: DateTime<Utc>,
    /// Speed in m/s
    pub speed: f64,
    /// Course in degrees
    pub course: f64,
    /// Horizontal accuracy in meters
    pub h_acc: f64,
    /// Vertical accuracy in meters
    pub v_acc: f64,
}

/// Parses an ISO 8601 point time such as `2021-05-01T10:00:00Z`
pub fn parse_point_time(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| VitalportError::Validation(format!("Invalid point time '{raw}': {e}")))
}

/// Formats a point time with a trailing `Z`
pub fn format_point_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Ordered, time-ascending sequence of track points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Route name (file stem or workout uuid)
    pub name: String,

    /// Points sorted by time; ties keep document order
    pub points: Vec<RoutePoint>,

    /// Time of the first point
    pub start: Option<DateTime<Utc>>,

    /// Time of the last point
    pub end: Option<DateTime<Utc>>,

    /// Seconds between first and last point; 0 for an empty route
    pub duration_sec: i64,
}

impl Route {
    /// Builds a route, sorting points by time and deriving its time span
    pub fn new(name: impl Into<String>, mut points: Vec<RoutePoint>) -> Self {
        points.sort_by_key(|p| p.time);

        let start = points.first().map(|p| p.time);
        let end = points.last().map(|p| p.time);
        let duration_sec = match (start, end) {
            (Some(s), Some(e)) => (e - s).num_seconds(),
            _ => 0,
        };

        Self {
            name: name.into(),
            points,
            start,
            end,
            duration_sec,
        }
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the route has no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bounding box of the track, `None` for an empty route
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let first = self.points.first()?;
        let init = BoundingBox {
            min_lon: first.lon,
            min_lat: first.lat,
            max_lon: first.lon,
            max_lat: first.lat,
        };
        Some(self.points.iter().fold(init, |acc, p| BoundingBox {
            min_lon: acc.min_lon.min(p.lon),
            min_lat: acc.min_lat.min(p.lat),
            max_lon: acc.max_lon.max(p.lon),
            max_lat: acc.max_lat.max(p.lat),
        }))
    }

    /// Converts the route into its cached table form
    pub fn to_table(&self) -> Result<Table> {
        let mut table = Table::with_columns(ROUTE_COLUMNS);
        for p in &self.points {
            table.push_row([
                p.lon.to_string(),
                p.lat.to_string(),
                p.elevation.to_string(),
                format_point_time(&p.time),
                p.speed.to_string(),
                p.course.to_string(),
                p.h_acc.to_string(),
                p.v_acc.to_string(),
            ])?;
        }
        Ok(table)
    }

    /// Rebuilds a route from its cached table form
    pub fn from_table(name: impl Into<String>, table: &Table) -> Result<Self> {
        let idx: Vec<usize> = ROUTE_COLUMNS
            .iter()
            .map(|c| table.require_column(c))
            .collect::<Result<_>>()?;

        let float = |raw: &str, column: &str| -> Result<f64> {
            raw.parse::<f64>().map_err(|e| {
                VitalportError::Validation(format!("Invalid {column} value '{raw}': {e}"))
            })
        };

        let points = table
            .rows()
            .iter()
            .map(|row| {
                Ok(RoutePoint {
                    lon: float(&row[idx[0]], "lon")?,
                    lat: float(&row[idx[1]], "lat")?,
                    elevation: float(&row[idx[2]], "elevation")?,
                    time: parse_point_time(&row[idx[3]])?,
                    speed: float(&row[idx[4]], "speed")?,
                    course: float(&row[idx[5]], "course")?,
                    h_acc: float(&row[idx[6]], "hAcc")?,
                    v_acc: float(&row[idx[7]], "vAcc")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(name, points))
    }
}

/// Longitude/latitude box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western edge
    pub min_lon: f64,
    /// Southern edge
    pub min_lat: f64,
    /// Eastern edge
    pub max_lon: f64,
    /// Northern edge
    pub max_lat: f64,
}

impl BoundingBox {
    /// Creates a box from its corners
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// True when `other` lies inside this box, edges included
    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.min_lon >= self.min_lon
            && other.max_lon <= self.max_lon
            && other.min_lat >= self.min_lat
            && other.max_lat <= self.max_lat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lon: f64, lat: f64, time: &str) -> RoutePoint {
        RoutePoint {
            lon,
            lat,
            elevation: 512.25,
            time: parse_point_time(time).unwrap(),
            speed: 3.1,
            course: 87.5,
            h_acc: 2.0,
            v_acc: 1.5,
        }
    }

    #[test]
    fn test_empty_route_has_no_span() {
        let route = Route::new("empty", Vec::new());
        assert!(route.is_empty());
        assert_eq!(route.start, None);
        assert_eq!(route.end, None);
        assert_eq!(route.duration_sec, 0);
        assert!(route.bounding_box().is_none());
    }

    #[test]
    fn test_route_sorts_points_and_derives_span() {
        let route = Route::new(
            "r",
            vec![
                point(11.0, 47.0, "2021-05-01T10:01:40Z"),
                point(11.1, 47.1, "2021-05-01T10:00:00Z"),
            ],
        );
        assert_eq!(route.points[0].lon, 11.1);
        assert_eq!(route.duration_sec, 100);
        assert_eq!(
            route.start.map(|t| format_point_time(&t)).as_deref(),
            Some("2021-05-01T10:00:00Z")
        );
    }

    #[test]
    fn test_route_table_round_trip() {
        let route = Route::new(
            "r",
            vec![
                point(11.394_857_2, 47.268_431_9, "2021-05-01T10:00:00Z"),
                point(11.394_901, 47.268_5, "2021-05-01T10:00:01Z"),
            ],
        );
        let table = route.to_table().unwrap();
        assert_eq!(table.columns(), &ROUTE_COLUMNS);
        let back = Route::from_table("r", &table).unwrap();
        assert_eq!(back, route);
    }

    #[test]
    fn test_bounding_box() {
        let route = Route::new(
            "r",
            vec![
                point(11.0, 47.5, "2021-05-01T10:00:00Z"),
                point(11.4, 47.2, "2021-05-01T10:00:01Z"),
            ],
        );
        let bbox = route.bounding_box().unwrap();
        assert_eq!(bbox, BoundingBox::new(11.0, 47.2, 11.4, 47.5));
        assert!(BoundingBox::new(10.0, 46.0, 12.0, 48.0).contains(&bbox));
        assert!(!BoundingBox::new(11.1, 46.0, 12.0, 48.0).contains(&bbox));
    }
}
