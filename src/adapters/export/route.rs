//! Route document extractor
//!
//! Parses a GPX track (`http://www.topografix.com/GPX/1/1`) into a [`Route`].
//! Matching is done on local names, so prefixed (`gpx:trkpt`) and default
//! namespace documents read the same.
//!
//! Extraction is best effort: a track point missing any of its eight fields is
//! dropped and reported, the rest of the route survives.

use super::layout::stem_of;
use super::xml::{attributes_of, local_name_of};
use crate::domain::route::parse_point_time;
use crate::domain::{ParseError, Result, Route, RoutePoint};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

const TRACK_POINT: &str = "trkpt";

/// Child elements of a track point that carry a value
const POINT_FIELDS: [&str; 6] = ["ele", "time", "speed", "course", "hAcc", "vAcc"];

/// Result of extracting one route document
#[derive(Debug)]
pub struct RouteExtraction {
    /// The route built from every well-formed point
    pub route: Route,

    /// One entry per dropped point
    pub skipped: Vec<ParseError>,

    /// Number of track points in the document, dropped ones included
    pub raw_points: usize,
}

impl RouteExtraction {
    /// True when no point had to be dropped
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Raw field values of a track point still being read
#[derive(Debug, Default)]
struct PointDraft {
    lon: Option<String>,
    lat: Option<String>,
    ele: Option<String>,
    time: Option<String>,
    speed: Option<String>,
    course: Option<String>,
    h_acc: Option<String>,
    v_acc: Option<String>,
}

impl PointDraft {
    fn slot(&mut self, field: &str) -> Option<&mut Option<String>> {
        match field {
            "ele" => Some(&mut self.ele),
            "time" => Some(&mut self.time),
            "speed" => Some(&mut self.speed),
            "course" => Some(&mut self.course),
            "hAcc" => Some(&mut self.h_acc),
            "vAcc" => Some(&mut self.v_acc),
            _ => None,
        }
    }

    /// Converts the draft into a point; the error names the first bad field
    fn build(self) -> std::result::Result<RoutePoint, String> {
        fn float(raw: Option<String>, field: &str) -> std::result::Result<f64, String> {
            let raw = raw.ok_or_else(|| format!("missing {field}"))?;
            raw.trim()
                .parse::<f64>()
                .map_err(|e| format!("invalid {field} '{raw}': {e}"))
        }

        let time = self.time.ok_or_else(|| "missing time".to_string())?;
        let time = parse_point_time(&time).map_err(|e| e.to_string())?;

        Ok(RoutePoint {
            lon: float(self.lon, "lon")?,
            lat: float(self.lat, "lat")?,
            elevation: float(self.ele, "elevation")?,
            time,
            speed: float(self.speed, "speed")?,
            course: float(self.course, "course")?,
            h_acc: float(self.h_acc, "hAcc")?,
            v_acc: float(self.v_acc, "vAcc")?,
        })
    }
}

/// Extractor for GPX route documents
pub struct RouteExtractor;

impl RouteExtractor {
    /// Extracts the route at `path`, named after the file stem
    pub fn extract(path: &Path) -> Result<RouteExtraction> {
        Self::extract_as(path, stem_of(path))
    }

    /// Extracts the route at `path` under an explicit name
    pub fn extract_as(path: &Path, name: impl Into<String>) -> Result<RouteExtraction> {
        let file = File::open(path).map_err(|e| ParseError::RouteDocument {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse_reader(name, BufReader::new(file), path)
    }

    /// Extracts a route held in memory
    pub fn parse_str(name: &str, xml: &str) -> Result<RouteExtraction> {
        Self::parse_reader(name, xml.as_bytes(), Path::new(name))
    }

    /// Extracts a route from any buffered reader; `origin` only labels errors
    pub fn parse_reader<R: BufRead>(
        name: impl Into<String>,
        source: R,
        origin: &Path,
    ) -> Result<RouteExtraction> {
        let name = name.into();
        let mut reader = Reader::from_reader(source);
        reader.config_mut().trim_text(true);

        let document_error = |reason: String| ParseError::RouteDocument {
            path: PathBuf::from(origin),
            reason,
        };

        let mut points = Vec::new();
        let mut skipped = Vec::new();
        let mut raw_points = 0usize;
        let mut draft: Option<PointDraft> = None;
        let mut field: Option<String> = None;
        let mut buf = Vec::new();

        loop {
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|e| document_error(format!("XML error: {e}")))?;

            match &event {
                Event::Start(e) | Event::Empty(e) if local_name_of(e) == TRACK_POINT => {
                    let attrs = attributes_of(e).map_err(document_error)?;
                    let new_draft = PointDraft {
                        lon: attrs.get("lon").cloned(),
                        lat: attrs.get("lat").cloned(),
                        ..PointDraft::default()
                    };
                    raw_points += 1;

                    if matches!(event, Event::Empty(_)) {
                        finish_point(new_draft, raw_points - 1, &mut points, &mut skipped);
                    } else {
                        draft = Some(new_draft);
                    }
                }
                Event::Start(e) if draft.is_some() => {
                    let tag = local_name_of(e);
                    field = POINT_FIELDS.contains(&tag.as_str()).then_some(tag);
                }
                Event::Text(text) => {
                    if let (Some(d), Some(f)) = (draft.as_mut(), field.as_deref()) {
                        let value = text
                            .unescape()
                            .map_err(|e| document_error(format!("bad text: {e}")))?;
                        if let Some(slot) = d.slot(f) {
                            *slot = Some(value.into_owned());
                        }
                    }
                }
                Event::End(e) => {
                    let tag = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    if tag == TRACK_POINT {
                        if let Some(d) = draft.take() {
                            finish_point(d, raw_points - 1, &mut points, &mut skipped);
                        }
                    }
                    field = None;
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        let route = Route::new(name, points);
        tracing::debug!(
            route = %route.name,
            points = route.len(),
            skipped = skipped.len(),
            "Extracted route"
        );

        Ok(RouteExtraction {
            route,
            skipped,
            raw_points,
        })
    }
}

fn finish_point(
    draft: PointDraft,
    index: usize,
    points: &mut Vec<RoutePoint>,
    skipped: &mut Vec<ParseError>,
) {
    match draft.build() {
        Ok(point) => points.push(point),
        Err(reason) => {
            tracing::warn!(point = index, reason = %reason, "Skipping malformed track point");
            skipped.push(ParseError::RouteParse {
                point: index,
                reason,
            });
        }
    }
}
