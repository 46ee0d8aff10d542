//! Export document parser
//!
//! Streams `Export.xml` with `quick-xml` and produces an [`ExportDocument`]:
//! records grouped by type, workout shells, activity summaries and the export
//! metadata. Workout routes are only referenced here; their payload is parsed
//! later by the route extractor.
//!
//! Only direct children of the `HealthData` root are considered, so records
//! nested in `Correlation` elements are not double counted.

use super::xml::{attributes_of, local_name_of};
use crate::domain::record::parse_record_timestamp;
use crate::domain::{
    Attributes, HealthRecord, ParseError, RecordSet, Result, Table, VitalportError, Workout,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

const ROOT_ELEMENT: &str = "HealthData";

/// Everything extracted from one export document
#[derive(Debug, Clone, Default)]
pub struct ExportDocument {
    /// `locale` attribute of the root element
    pub locale: Option<String>,

    /// `value` attribute of `ExportDate`
    pub export_date: String,

    /// Attributes of the `Me` element
    pub me: Attributes,

    /// Records grouped by type
    pub records: RecordSet,

    /// Number of `Record` elements seen
    pub record_count: usize,

    /// Workout shells in document order
    pub workouts: Vec<Workout>,

    /// Attribute maps of `ActivitySummary` elements
    pub activity_summaries: Vec<Attributes>,
}

impl ExportDocument {
    /// One-row metadata table: `Me` attributes plus locale and export date
    pub fn metadata_table(&self) -> Result<Table> {
        let mut row = self.me.clone();
        row.insert(
            "locale".to_string(),
            self.locale.clone().unwrap_or_default(),
        );
        row.insert("export_date".to_string(), self.export_date.clone());
        Ok(Table::from_attribute_maps([&row]))
    }

    /// Workouts with a route reference
    pub fn routed_workouts(&self) -> impl Iterator<Item = &Workout> {
        self.workouts.iter().filter(|w| w.has_route())
    }
}

/// Parser for `Export.xml`
pub struct RecordParser;

impl RecordParser {
    /// Parses the export document at `path`
    pub fn parse_file(path: &Path) -> Result<ExportDocument> {
        let file = File::open(path).map_err(|e| {
            ParseError::MalformedExport(format!("cannot open {}: {e}", path.display()))
        })?;
        tracing::info!(path = %path.display(), "Parsing export document");
        Self::parse_reader(BufReader::new(file))
    }

    /// Parses an export document held in memory
    pub fn parse_str(xml: &str) -> Result<ExportDocument> {
        Self::parse_reader(xml.as_bytes())
    }

    /// Parses an export document from any buffered reader
    pub fn parse_reader<R: BufRead>(source: R) -> Result<ExportDocument> {
        let mut reader = Reader::from_reader(source);
        reader.config_mut().trim_text(true);

        let mut state = ParseState::default();
        let mut buf = Vec::new();

        loop {
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|e| malformed(format!("XML error: {e}")))?;

            match event {
                Event::Start(e) => {
                    state.open(&e, false)?;
                }
                Event::Empty(e) => {
                    state.open(&e, true)?;
                }
                Event::End(e) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    state.close(&name);
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        state.finish()
    }
}

fn malformed(reason: impl Into<String>) -> VitalportError {
    ParseError::MalformedExport(reason.into()).into()
}

/// Cursor over the element tree while streaming
#[derive(Default)]
struct ParseState {
    depth: usize,
    seen_root: bool,
    closed_root: bool,
    seen_export_date: bool,
    in_workout_route: bool,
    current_workout: Option<Workout>,
    document: ExportDocument,
}

impl ParseState {
    /// Handles an opening (or self-closing) element at the current depth
    fn open(&mut self, element: &BytesStart<'_>, empty: bool) -> Result<()> {
        let name = local_name_of(element);

        match self.depth {
            0 => self.open_root(&name, element)?,
            1 => self.open_top_level(&name, element, empty)?,
            2 => self.open_workout_child(&name, element, empty)?,
            3 if self.in_workout_route && name == "FileReference" => {
                let attrs = attributes_of(element).map_err(malformed)?;
                if let (Some(workout), Some(path)) =
                    (self.current_workout.as_mut(), attrs.get("path"))
                {
                    workout.route_ref = Some(PathBuf::from(path));
                }
            }
            _ => {}
        }

        if !empty {
            self.depth += 1;
        }
        Ok(())
    }

    fn close(&mut self, name: &str) {
        self.depth = self.depth.saturating_sub(1);
        match (self.depth, name) {
            (0, _) => self.closed_root = true,
            (1, "Workout") => {
                if let Some(workout) = self.current_workout.take() {
                    self.document.workouts.push(workout);
                }
            }
            (2, "WorkoutRoute") => self.in_workout_route = false,
            _ => {}
        }
    }

    fn open_root(&mut self, name: &str, element: &BytesStart<'_>) -> Result<()> {
        if self.seen_root {
            return Err(malformed("more than one root element"));
        }
        if name != ROOT_ELEMENT {
            return Err(malformed(format!(
                "expected root element <{ROOT_ELEMENT}>, found <{name}>"
            )));
        }
        self.seen_root = true;
        let attrs = attributes_of(element).map_err(malformed)?;
        self.document.locale = attrs.get("locale").cloned();
        Ok(())
    }

    fn open_top_level(&mut self, name: &str, element: &BytesStart<'_>, empty: bool) -> Result<()> {
        match name {
            "Record" => {
                let attrs = attributes_of(element).map_err(malformed)?;
                let record = record_from(&attrs, self.document.record_count)?;
                self.document.record_count += 1;
                self.document.records.push(record);
            }
            "Workout" => {
                let attrs = attributes_of(element).map_err(malformed)?;
                let workout = Workout::new(attrs);
                if empty {
                    self.document.workouts.push(workout);
                } else {
                    self.current_workout = Some(workout);
                }
            }
            "ActivitySummary" => {
                let attrs = attributes_of(element).map_err(malformed)?;
                self.document.activity_summaries.push(attrs);
            }
            "ExportDate" => {
                let attrs = attributes_of(element).map_err(malformed)?;
                self.document.export_date = attrs.get("value").cloned().unwrap_or_default();
                self.seen_export_date = true;
            }
            "Me" => {
                self.document.me = attributes_of(element).map_err(malformed)?;
            }
            _ => {}
        }
        Ok(())
    }

    fn open_workout_child(
        &mut self,
        name: &str,
        element: &BytesStart<'_>,
        empty: bool,
    ) -> Result<()> {
        let Some(workout) = self.current_workout.as_mut() else {
            return Ok(());
        };

        match name {
            "WorkoutEvent" => {
                let attrs = attributes_of(element).map_err(malformed)?;
                workout.events.push(attrs);
            }
            "WorkoutStatistics" => {
                let attrs = attributes_of(element).map_err(malformed)?;
                workout.statistics.push(attrs);
            }
            "WorkoutMetadataEntry" | "MetadataEntry" => {
                let attrs = attributes_of(element).map_err(malformed)?;
                if let Some(key) = attrs.get("key") {
                    let value = attrs.get("value").cloned().unwrap_or_default();
                    workout.metadata_entries.insert(key.clone(), value);
                }
            }
            "WorkoutRoute" => {
                self.in_workout_route = !empty;
            }
            _ => {}
        }
        Ok(())
    }

    fn finish(self) -> Result<ExportDocument> {
        if !self.seen_root {
            return Err(malformed(format!("missing <{ROOT_ELEMENT}> root element")));
        }
        if !self.closed_root {
            return Err(malformed("unexpected end of document"));
        }
        if !self.seen_export_date {
            return Err(malformed("missing <ExportDate> element"));
        }

        tracing::info!(
            records = self.document.record_count,
            record_types = self.document.records.type_count(),
            workouts = self.document.workouts.len(),
            activity_summaries = self.document.activity_summaries.len(),
            "Parsed export document"
        );
        Ok(self.document)
    }
}

/// Builds a record from its attributes
///
/// The creation date is the record timestamp, falling back to the start date.
fn record_from(attrs: &Attributes, index: usize) -> Result<HealthRecord> {
    let record_type = attrs
        .get("type")
        .ok_or_else(|| malformed(format!("Record #{index} has no type attribute")))?;

    let raw_timestamp = attrs
        .get("creationDate")
        .or_else(|| attrs.get("startDate"))
        .ok_or_else(|| malformed(format!("Record #{index} ({record_type}) has no date")))?;

    let timestamp = parse_record_timestamp(raw_timestamp)
        .map_err(|e| malformed(format!("Record #{index} ({record_type}): {e}")))?;

    let value = attrs.get("value").cloned().unwrap_or_default();
    Ok(HealthRecord::new(record_type.clone(), timestamp, value))
}
