//! Data loader façade
//!
//! [`DataLoader`] is the single entry point over an export bundle. It composes
//! the export parsers, the [`CacheStore`] and the [`ParallelLoader`], and
//! answers every request cache first: a [`CacheError::Miss`] sends it back to
//! the source files, and whatever it parses on the way is written back.
//!
//! [`CacheError::Miss`]: crate::domain::CacheError::Miss

use super::parallel::{ParallelLoader, RouteJob};
use super::summary::{BatchOutcome, IngestSummary};
use crate::adapters::cache::{CacheCategory, CacheInfo, CacheStore};
use crate::adapters::export::layout::{stem_of, visible_files};
use crate::adapters::export::{
    EcgParser, ExportDocument, ExportLayout, RecordParser, RouteExtractor,
};
use crate::config::VitalportConfig;
use crate::domain::record::{record_set_to_table, records_from_table, records_to_table};
use crate::domain::{
    Attributes, Ecg, HealthRecord, ItemFailure, Result, Route, Table, VitalportError, Workout,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Export metadata table (Root)
pub const METADATA_TABLE: &str = "metadata";
/// Activity summary table (Root)
pub const ACTIVITY_SUMMARY_TABLE: &str = "activity_summary";
/// Every record in one table (Root)
pub const RECORDS_TABLE: &str = "records";
/// Workout attributes plus uuid (Root)
pub const WORKOUTS_TABLE: &str = "workouts";
/// Workout events tagged with their workout (Root)
pub const WORKOUT_EVENTS_TABLE: &str = "workout_events";
/// Route references per workout (Root)
pub const ROUTES_META_TABLE: &str = "routes_meta";
/// ECG header values (Root)
pub const ECG_METADATA_TABLE: &str = "ecg_metadata";

const UUID_COLUMN: &str = "uuid";
const WORKOUT_UUID_COLUMN: &str = "workout_uuid";
const ECG_EXTENSION: &str = "csv";

/// Kind of source data in an export bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataCategory {
    /// `Export.xml`
    Health,
    /// `electrocardiograms/`
    Ecg,
    /// `workout-routes/`
    Routes,
}

/// Cache-first access to one export bundle
#[derive(Debug, Clone)]
pub struct DataLoader {
    layout: ExportLayout,
    store: CacheStore,
    parallel: ParallelLoader,
}

impl DataLoader {
    /// Create a new loader
    pub fn new(layout: ExportLayout, store: CacheStore, parallel: ParallelLoader) -> Self {
        Self {
            layout,
            store,
            parallel,
        }
    }

    /// Loader wired from the configuration
    pub fn from_config(config: &VitalportConfig) -> Self {
        Self::new(
            config.export.layout(),
            CacheStore::new(config.export.cache_root()),
            ParallelLoader::from_config(&config.ingest),
        )
    }

    /// Export bundle paths
    pub fn layout(&self) -> &ExportLayout {
        &self.layout
    }

    /// Underlying cache store
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// True when the bundle holds source data of `category`
    pub fn supports(&self, category: DataCategory) -> bool {
        match category {
            DataCategory::Health => self.layout.export_file().is_file(),
            DataCategory::Ecg => has_visible_files(&self.layout.ecg_dir()),
            DataCategory::Routes => has_visible_files(&self.layout.routes_dir()),
        }
    }

    /// Parses `Export.xml`
    pub fn parse_export(&self) -> Result<ExportDocument> {
        RecordParser::parse_file(&self.layout.export_file())
    }

    /// Populates the cache from the bundle
    ///
    /// Workout-derived categories are always rebuilt because workout uuids are
    /// regenerated on every parse. `force` clears the whole cache first. Route
    /// and ECG failures are collected in the summary; a malformed export
    /// document aborts the run.
    pub fn ingest(&self, force: bool) -> Result<IngestSummary> {
        let started = Instant::now();
        tracing::info!(
            root = %self.layout.root().display(),
            cache = %self.store.root().display(),
            force,
            "Starting ingestion"
        );

        self.store.scaffold()?;
        if force {
            for category in CacheCategory::ALL {
                self.store.delete_all(category)?;
            }
        }

        let doc = self.parse_export()?;
        let jobs = self.write_export_tables(&doc)?;

        let mut summary = IngestSummary::new();
        summary.records = doc.record_count;
        summary.record_types = doc.records.type_count();
        summary.workouts = doc.workouts.len();
        summary.activity_summaries = doc.activity_summaries.len();
        summary.routes_total = jobs.len();

        let routes = self.parallel.extract_routes(&jobs);
        summary.failures.extend(routes.failures);
        for (name, extraction) in routes.successes {
            summary.skipped_points += extraction.skipped.len();
            let written = extraction
                .route
                .to_table()
                .and_then(|table| self.store.write(CacheCategory::Routes, &name, &table));
            match written {
                Ok(_) => summary.routes_cached += 1,
                Err(error) => summary.failures.push(ItemFailure::new(name, error)),
            }
        }

        let ecgs = self.load_ecgs()?;
        summary.ecgs_total = ecgs.total();
        summary.ecgs_cached = ecgs.succeeded();
        summary.failures.extend(ecgs.failures);

        self.store.write_info(&CacheInfo::now())?;

        let summary = summary.with_duration(started.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    /// Records of one type
    ///
    /// Fails with a cache miss when the export holds no record of that type.
    pub fn load_records(&self, record_type: &str) -> Result<Vec<HealthRecord>> {
        match self.store.read(CacheCategory::Records, record_type) {
            Ok(table) => records_from_table(record_type, &table),
            Err(miss) if miss.is_cache_miss() => {
                tracing::debug!(record_type, "Record cache miss, parsing export");
                let doc = self.parse_export()?;
                self.write_record_tables(&doc)?;
                doc.records
                    .get(record_type)
                    .map(<[HealthRecord]>::to_vec)
                    .ok_or(miss)
            }
            Err(e) => Err(e),
        }
    }

    /// Record types of the export, sorted
    pub fn record_types(&self) -> Result<Vec<String>> {
        if self.store.exists(CacheCategory::Records) {
            return self.store.keys(CacheCategory::Records);
        }
        let doc = self.parse_export()?;
        self.write_record_tables(&doc)?;
        Ok(doc.records.types().map(str::to_string).collect())
    }

    /// Workout table: every workout attribute plus `uuid`
    pub fn load_workouts(&self) -> Result<Table> {
        self.read_root_or_ingest(WORKOUTS_TABLE)
    }

    /// Route of one workout
    pub fn load_route(&self, workout_uuid: &str) -> Result<Route> {
        let cached = self.store.exists(CacheCategory::Routes);
        if cached && self.store.contains(CacheCategory::Routes, workout_uuid) {
            let table = self.store.read(CacheCategory::Routes, workout_uuid)?;
            return Route::from_table(workout_uuid, &table);
        }

        let job = self
            .route_jobs()?
            .into_iter()
            .find(|job| job.name == workout_uuid)
            .ok_or_else(|| {
                VitalportError::Validation(format!(
                    "Workout {workout_uuid} does not reference a route"
                ))
            })?;
        self.route_for_job(&job, false)
    }

    /// Routes of every workout that has one
    pub fn load_routes(&self) -> Result<BatchOutcome<Route>> {
        let jobs = self.route_jobs()?;
        let cached = self.store.exists(CacheCategory::Routes);
        Ok(self.parallel.load(
            "routes",
            &jobs,
            |job| job.name.clone(),
            |job| self.route_for_job(job, cached),
        ))
    }

    /// Route documents in `workout-routes/`
    pub fn route_files(&self) -> Result<Vec<PathBuf>> {
        visible_files(&self.layout.routes_dir())
    }

    /// Parses one route document by file name or stem, bypassing the cache
    pub fn load_route_file(&self, name: &str) -> Result<Route> {
        let path = self.source_path(&self.layout.routes_dir(), name, "gpx");
        Ok(RouteExtractor::extract(&path)?.route)
    }

    /// Parses every route document, bypassing the cache
    pub fn parse_route_files(&self) -> Result<BatchOutcome<Route>> {
        let jobs: Vec<RouteJob> = self
            .route_files()?
            .into_iter()
            .map(|path| RouteJob::new(stem_of(&path), path))
            .collect();
        Ok(self
            .parallel
            .extract_routes(&jobs)
            .map(|extraction| extraction.route))
    }

    /// ECG files in `electrocardiograms/`
    pub fn ecg_files(&self) -> Result<Vec<PathBuf>> {
        visible_files(&self.layout.ecg_dir())
    }

    /// One ECG by file name or stem
    pub fn load_ecg(&self, name: &str) -> Result<Ecg> {
        let name = name.strip_suffix(".csv").unwrap_or(name);
        let mut metadata = self.ecg_metadata()?;
        let (ecg, refreshed) = self.ecg_for_name(name, &metadata)?;
        if refreshed {
            metadata.insert(ecg.name.clone(), ecg.meta.clone());
            self.write_ecg_metadata(&metadata)?;
        }
        Ok(ecg)
    }

    /// Every ECG of the bundle
    ///
    /// A file that fails to parse only fails itself. The metadata table is
    /// rewritten from the loaded recordings.
    pub fn load_ecgs(&self) -> Result<BatchOutcome<Ecg>> {
        let names: Vec<String> = self.ecg_files()?.iter().map(|p| stem_of(p)).collect();
        let metadata = self.ecg_metadata()?;

        let outcome = self.parallel.load(
            "ecg",
            &names,
            String::clone,
            |name| self.ecg_for_name(name, &metadata).map(|(ecg, _)| ecg),
        );

        let metadata: BTreeMap<String, Attributes> = outcome
            .values()
            .map(|ecg| (ecg.name.clone(), ecg.meta.clone()))
            .collect();
        self.write_ecg_metadata(&metadata)?;
        Ok(outcome)
    }

    /// Writes every Root, record and workout-derived table of a parsed export
    /// and returns the route documents still to parse
    fn write_export_tables(&self, doc: &ExportDocument) -> Result<Vec<RouteJob>> {
        for category in CacheCategory::WORKOUT_DERIVED {
            self.store.delete_all(category)?;
        }

        self.store
            .write(CacheCategory::Root, METADATA_TABLE, &doc.metadata_table()?)?;
        self.store.write(
            CacheCategory::Root,
            ACTIVITY_SUMMARY_TABLE,
            &Table::from_attribute_maps(&doc.activity_summaries),
        )?;
        self.write_record_tables(doc)?;
        self.write_workout_tables(&doc.workouts)?;

        let mut routes_meta = Table::with_columns([WORKOUT_UUID_COLUMN, "path"]);
        let mut jobs = Vec::new();
        for workout in doc.routed_workouts() {
            if let Some(reference) = &workout.route_ref {
                let uuid = workout.uuid.to_string();
                routes_meta.push_row([uuid.clone(), reference.to_string_lossy().into_owned()])?;
                jobs.push(RouteJob::new(uuid, self.layout.resolve(reference)));
            }
        }
        self.store
            .write(CacheCategory::Root, ROUTES_META_TABLE, &routes_meta)?;

        Ok(jobs)
    }

    fn write_record_tables(&self, doc: &ExportDocument) -> Result<()> {
        self.store.write(
            CacheCategory::Root,
            RECORDS_TABLE,
            &record_set_to_table(&doc.records)?,
        )?;
        for (record_type, records) in doc.records.groups() {
            self.store.write(
                CacheCategory::Records,
                record_type,
                &records_to_table(records)?,
            )?;
        }
        Ok(())
    }

    fn write_workout_tables(&self, workouts: &[Workout]) -> Result<()> {
        let mut rows = Vec::with_capacity(workouts.len());
        let mut events = Vec::new();

        for workout in workouts {
            let uuid = workout.uuid.to_string();

            let mut row = workout.attributes.clone();
            row.insert(UUID_COLUMN.to_string(), uuid.clone());
            rows.push(row);

            for event in &workout.events {
                let mut event = event.clone();
                event.insert(WORKOUT_UUID_COLUMN.to_string(), uuid.clone());
                events.push(event);
            }

            if !workout.statistics.is_empty() {
                self.store.write(
                    CacheCategory::WorkoutStatistics,
                    &uuid,
                    &Table::from_attribute_maps(&workout.statistics),
                )?;
            }

            if !workout.metadata_entries.is_empty() {
                let mut entries = Table::with_columns(["key", "value"]);
                for (key, value) in &workout.metadata_entries {
                    entries.push_row([key.as_str(), value.as_str()])?;
                }
                self.store
                    .write(CacheCategory::WorkoutMetadataEntries, &uuid, &entries)?;
            }
        }

        self.store.write(
            CacheCategory::Root,
            WORKOUTS_TABLE,
            &Table::from_attribute_maps(&rows),
        )?;
        self.store.write(
            CacheCategory::Root,
            WORKOUT_EVENTS_TABLE,
            &Table::from_attribute_maps(&events),
        )?;
        Ok(())
    }

    /// Reads a Root table, rebuilding the export tables once on a miss
    fn read_root_or_ingest(&self, key: &str) -> Result<Table> {
        match self.store.read(CacheCategory::Root, key) {
            Err(e) if e.is_cache_miss() => {
                tracing::debug!(table = key, "Root table cache miss, parsing export");
                let doc = self.parse_export()?;
                self.write_export_tables(&doc)?;
                self.store.read(CacheCategory::Root, key)
            }
            other => other,
        }
    }

    /// Route documents referenced by workouts, from `routes_meta`
    fn route_jobs(&self) -> Result<Vec<RouteJob>> {
        let meta = self.read_root_or_ingest(ROUTES_META_TABLE)?;
        let uuid_idx = meta.require_column(WORKOUT_UUID_COLUMN)?;
        let path_idx = meta.require_column("path")?;
        Ok(meta
            .rows()
            .iter()
            .map(|row| {
                RouteJob::new(
                    row[uuid_idx].clone(),
                    self.layout.resolve(Path::new(&row[path_idx])),
                )
            })
            .collect())
    }

    fn route_for_job(&self, job: &RouteJob, cached: bool) -> Result<Route> {
        if cached && self.store.contains(CacheCategory::Routes, &job.name) {
            let table = self.store.read(CacheCategory::Routes, &job.name)?;
            return Route::from_table(job.name.clone(), &table);
        }

        let extraction = RouteExtractor::extract_as(&job.path, job.name.clone())?;
        if !extraction.is_complete() {
            tracing::debug!(
                route = %job.name,
                skipped = extraction.skipped.len(),
                raw_points = extraction.raw_points,
                "Route loaded with dropped points"
            );
        }
        self.store
            .write(CacheCategory::Routes, &job.name, &extraction.route.to_table()?)?;
        Ok(extraction.route)
    }

    /// Cached ECG or a freshly parsed one
    ///
    /// The flag is set when the header values were read from the source file
    /// and still need writing to the metadata table.
    fn ecg_for_name(
        &self,
        name: &str,
        metadata: &BTreeMap<String, Attributes>,
    ) -> Result<(Ecg, bool)> {
        match self.store.read(CacheCategory::Ecg, name) {
            Ok(table) => {
                let (meta, recovered) = match metadata.get(name) {
                    Some(meta) => (meta.clone(), false),
                    None => self.ecg_header(name),
                };
                Ok((Ecg::from_samples_table(name, &table, meta)?, recovered))
            }
            Err(e) if e.is_cache_miss() => {
                let path = self.source_path(&self.layout.ecg_dir(), name, ECG_EXTENSION);
                let ecg = EcgParser::parse_file(&path)?;
                self.store
                    .write(CacheCategory::Ecg, &ecg.name, &ecg.samples_table()?)?;
                Ok((ecg, true))
            }
            Err(e) => Err(e),
        }
    }

    /// Header of the source file of a cached ECG whose metadata row is gone;
    /// the flag is false when the source cannot supply it either
    fn ecg_header(&self, name: &str) -> (Attributes, bool) {
        let path = self.source_path(&self.layout.ecg_dir(), name, ECG_EXTENSION);
        if !path.is_file() {
            return (Attributes::new(), false);
        }
        match EcgParser::parse_header(&path) {
            Ok(meta) => {
                tracing::debug!(ecg = name, "Recovered ECG metadata from source header");
                (meta, true)
            }
            Err(e) => {
                tracing::warn!(ecg = name, error = %e, "Cannot read ECG header");
                (Attributes::new(), false)
            }
        }
    }

    /// Header values of every cached ECG, by name
    fn ecg_metadata(&self) -> Result<BTreeMap<String, Attributes>> {
        let table = match self.store.read(CacheCategory::Root, ECG_METADATA_TABLE) {
            Ok(table) => table,
            Err(e) if e.is_cache_miss() => return Ok(BTreeMap::new()),
            Err(e) => return Err(e),
        };

        let name_idx = table.require_column("name")?;
        let key_idx = table.require_column("key")?;
        let value_idx = table.require_column("value")?;

        let mut metadata: BTreeMap<String, Attributes> = BTreeMap::new();
        for row in table.rows() {
            metadata
                .entry(row[name_idx].clone())
                .or_default()
                .insert(row[key_idx].clone(), row[value_idx].clone());
        }
        Ok(metadata)
    }

    fn write_ecg_metadata(&self, metadata: &BTreeMap<String, Attributes>) -> Result<()> {
        let mut table = Table::with_columns(["name", "key", "value"]);
        for (name, meta) in metadata {
            for (key, value) in meta {
                table.push_row([name.as_str(), key.as_str(), value.as_str()])?;
            }
        }
        self.store
            .write(CacheCategory::Root, ECG_METADATA_TABLE, &table)?;
        Ok(())
    }

    /// `dir/name` when that file exists, otherwise `dir/name.<extension>`
    fn source_path(&self, dir: &Path, name: &str, extension: &str) -> PathBuf {
        let exact = dir.join(name);
        if exact.is_file() {
            exact
        } else {
            dir.join(format!("{name}.{extension}"))
        }
    }
}

fn has_visible_files(dir: &Path) -> bool {
    visible_files(dir).map(|files| !files.is_empty()).unwrap_or(false)
}
