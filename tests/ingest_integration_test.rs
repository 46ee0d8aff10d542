//! End-to-end ingestion of a synthetic export bundle

use clap::Parser;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use vitalport::adapters::cache::{CacheCategory, CacheStore};
use vitalport::cli::Cli;
use vitalport::config::VitalportConfig;
use vitalport::core::ingest::loader::{RECORDS_TABLE, ROUTES_META_TABLE, WORKOUTS_TABLE};
use vitalport::core::ingest::{DataCategory, DataLoader};

const HEART_RATE: &str = "HKQuantityTypeIdentifierHeartRate";
const STEP_COUNT: &str = "HKQuantityTypeIdentifierStepCount";

fn export_xml() -> String {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE HealthData [
<!ELEMENT HealthData (ExportDate,Me,(Record|Workout|ActivitySummary)*)>
]>
<HealthData locale="de_AT">
 <ExportDate value="2021-05-03 09:12:44 +0200"/>
 <Me HKCharacteristicTypeIdentifierDateOfBirth="1990-02-14" HKCharacteristicTypeIdentifierBloodType="HKBloodTypeNotSet"/>
 <Record type="HKQuantityTypeIdentifierHeartRate" sourceName="Watch" unit="count/min" creationDate="2021-05-01 10:00:03 +0200" startDate="2021-05-01 10:00:00 +0200" endDate="2021-05-01 10:00:00 +0200" value="71">
  <MetadataEntry key="HKMetadataKeyHeartRateMotionContext" value="0"/>
 </Record>
 <Record type="HKQuantityTypeIdentifierStepCount" sourceName="Phone" unit="count" creationDate="2021-05-01 10:30:00 +0200" startDate="2021-05-01 10:20:00 +0200" endDate="2021-05-01 10:30:00 +0200" value="804"/>
 <Record type="HKQuantityTypeIdentifierHeartRate" sourceName="Watch" unit="count/min" creationDate="2021-05-01 10:05:03 +0200" startDate="2021-05-01 10:05:00 +0200" endDate="2021-05-01 10:05:00 +0200" value="118"/>
 <Correlation type="HKCorrelationTypeIdentifierBloodPressure" creationDate="2021-05-01 11:00:00 +0200" startDate="2021-05-01 11:00:00 +0200" endDate="2021-05-01 11:00:00 +0200">
  <Record type="HKQuantityTypeIdentifierBloodPressureSystolic" unit="mmHg" creationDate="2021-05-01 11:00:00 +0200" startDate="2021-05-01 11:00:00 +0200" value="121"/>
 </Correlation>
 <Workout workoutActivityType="HKWorkoutActivityTypeRunning" duration="31.5" durationUnit="min" sourceName="Watch" startDate="2021-05-01 08:00:00 +0200" endDate="2021-05-01 08:31:30 +0200">
  <MetadataEntry key="HKIndoorWorkout" value="0"/>
  <MetadataEntry key="HKWeatherTemperature" value="14 degC"/>
  <WorkoutEvent type="HKWorkoutEventTypeSegment" date="2021-05-01 08:10:00 +0200" duration="10" durationUnit="min"/>
  <WorkoutStatistics type="HKQuantityTypeIdentifierDistanceWalkingRunning" sum="5.21" unit="km"/>
  <WorkoutStatistics type="HKQuantityTypeIdentifierHeartRate" average="151" minimum="98" maximum="176" unit="count/min"/>
  <WorkoutRoute sourceName="Watch" creationDate="2021-05-01 08:32:00 +0200">
   <FileReference path="/workout-routes/route_2021-05-01_8.00am.gpx"/>
  </WorkoutRoute>
 </Workout>
 <Workout workoutActivityType="HKWorkoutActivityTypeCycling" duration="55" durationUnit="min" sourceName="Watch" startDate="2021-05-02 17:00:00 +0200" endDate="2021-05-02 17:55:00 +0200">
  <WorkoutRoute sourceName="Watch">
   <FileReference path="/workout-routes/route_2021-05-02_5.00pm.gpx"/>
  </WorkoutRoute>
 </Workout>
 <Workout workoutActivityType="HKWorkoutActivityTypeYoga" duration="20" durationUnit="min" sourceName="Watch" startDate="2021-05-02 19:00:00 +0200" endDate="2021-05-02 19:20:00 +0200"/>
 <ActivitySummary dateComponents="2021-05-01" activeEnergyBurned="512.4" activeEnergyBurnedGoal="500" appleExerciseTime="41"/>
 <ActivitySummary dateComponents="2021-05-02" activeEnergyBurned="388" appleStandHours="11"/>
</HealthData>
"#
    .to_string()
}

fn trkpt(lon: f64, lat: f64, time: &str, speed: Option<f64>) -> String {
    let speed = speed
        .map(|s| format!("<speed>{s}</speed>"))
        .unwrap_or_default();
    format!(
        r#"<trkpt lon="{lon}" lat="{lat}"><ele>574.2</ele><time>{time}</time><extensions>{speed}<course>12.5</course><hAcc>2.4</hAcc><vAcc>1.9</vAcc></extensions></trkpt>"#
    )
}

fn route_gpx() -> String {
    let points = [
        trkpt(11.3941, 47.2682, "2021-05-01T06:00:00Z", Some(2.9)),
        trkpt(11.3950, 47.2690, "2021-05-01T06:00:05Z", None),
        trkpt(11.3962, 47.2701, "2021-05-01T06:00:10Z", Some(3.1)),
        trkpt(11.3975, 47.2713, "2021-05-01T06:00:15Z", Some(3.2)),
    ];
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="Watch" xmlns="http://www.topografix.com/GPX/1/1">
 <metadata><time>2021-05-01T06:32:00Z</time></metadata>
 <trk><name>Route 2021-05-01 8:00am</name><trkseg>
{}
 </trkseg></trk>
</gpx>
"#,
        points.join("\n")
    )
}

fn ecg_csv(samples: &[f64]) -> String {
    let header = [
        "Name,Jane Doe",
        "Date of Birth,1990-02-14",
        "Recorded Date,2021-05-01 12:00:00 +0200",
        "Classification,Sinus Rhythm",
        "Symptoms,",
        "Software Version,1.90",
        "Device,Watch6,1",
        "Sample Rate,512 hertz",
        "",
        "Lead,Lead I",
        "Unit,µV",
        "",
    ];
    let mut text = header.join("\n");
    text.push_str("\n\n");
    for s in samples {
        text.push_str(&s.to_string().replace('.', ","));
        text.push('\n');
    }
    text
}

fn square_wave(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| if i % 200 < 100 { 0.0 } else { 300.0 })
        .collect()
}

fn write_bundle(root: &Path) {
    fs::write(root.join("Export.xml"), export_xml()).unwrap();

    fs::create_dir(root.join("workout-routes")).unwrap();
    // The cycling route is referenced but missing from the bundle
    fs::write(
        root.join("workout-routes/route_2021-05-01_8.00am.gpx"),
        route_gpx(),
    )
    .unwrap();

    fs::create_dir(root.join("electrocardiograms")).unwrap();
    fs::write(
        root.join("electrocardiograms/ecg_2021-05-01.csv"),
        ecg_csv(&square_wave(2000)),
    )
    .unwrap();
    fs::write(
        root.join("electrocardiograms/ecg_2021-05-02.csv"),
        "Name,Jane Doe\nDate of Birth,1990-02-14\n",
    )
    .unwrap();
}

fn loader_for(root: &Path) -> DataLoader {
    let mut config = VitalportConfig::for_export(root.display().to_string());
    config.ingest.workers = 2;
    DataLoader::from_config(&config)
}

#[test]
fn test_ingest_full_bundle() {
    let dir = TempDir::new().unwrap();
    write_bundle(dir.path());
    let loader = loader_for(dir.path());

    assert!(loader.supports(DataCategory::Health));
    assert!(loader.supports(DataCategory::Routes));
    assert!(loader.supports(DataCategory::Ecg));

    let summary = loader.ingest(false).unwrap();

    // The nested blood pressure record is not a direct child of the root
    assert_eq!(summary.records, 3);
    assert_eq!(summary.record_types, 2);
    assert_eq!(summary.workouts, 3);
    assert_eq!(summary.activity_summaries, 2);
    assert_eq!(summary.routes_total, 2);
    assert_eq!(summary.routes_cached, 1);
    assert_eq!(summary.skipped_points, 1);
    assert_eq!(summary.ecgs_total, 2);
    assert_eq!(summary.ecgs_cached, 1);
    assert_eq!(
        summary.failure_summary().as_deref(),
        Some("2 of 4 items failed")
    );

    let store = CacheStore::new(dir.path().join("cache"));
    assert!(store.read_info().unwrap().is_some());
    assert_eq!(
        store.keys(CacheCategory::Records).unwrap(),
        vec![HEART_RATE.to_string(), STEP_COUNT.to_string()]
    );
    assert_eq!(store.read(CacheCategory::Root, RECORDS_TABLE).unwrap().len(), 3);
    assert_eq!(store.read(CacheCategory::Root, ROUTES_META_TABLE).unwrap().len(), 2);
    assert_eq!(store.file_count(CacheCategory::WorkoutStatistics), 1);
    assert_eq!(store.file_count(CacheCategory::WorkoutMetadataEntries), 1);

    let activity = store.read(CacheCategory::Root, "activity_summary").unwrap();
    assert_eq!(activity.len(), 2);
    assert_eq!(activity.get(1, "appleStandHours"), Some("11"));
    assert_eq!(activity.get(1, "activeEnergyBurnedGoal"), Some(""));

    let metadata = store.read(CacheCategory::Root, "metadata").unwrap();
    assert_eq!(metadata.get(0, "locale"), Some("de_AT"));
    assert_eq!(
        metadata.get(0, "export_date"),
        Some("2021-05-03 09:12:44 +0200")
    );
}

#[test]
fn test_cached_records_match_the_export() {
    let dir = TempDir::new().unwrap();
    write_bundle(dir.path());
    let loader = loader_for(dir.path());
    loader.ingest(false).unwrap();

    let heart_rate = loader.load_records(HEART_RATE).unwrap();
    let values: Vec<&str> = heart_rate.iter().map(|r| r.value.as_str()).collect();
    assert_eq!(values, vec!["71", "118"]);
    assert_eq!(heart_rate[0].short_type(), "HeartRate");

    // Served from the cache once the export is gone
    fs::remove_file(dir.path().join("Export.xml")).unwrap();
    assert_eq!(loader.load_records(STEP_COUNT).unwrap()[0].value, "804");
    assert_eq!(loader.record_types().unwrap().len(), 2);
}

#[test]
fn test_routes_through_the_loader() {
    let dir = TempDir::new().unwrap();
    write_bundle(dir.path());
    let loader = loader_for(dir.path());
    loader.ingest(false).unwrap();

    let workouts = loader.load_workouts().unwrap();
    assert_eq!(workouts.len(), 3);

    let routes = loader.load_routes().unwrap();
    assert_eq!(routes.succeeded(), 1);
    assert_eq!(routes.failed(), 1);

    let route = routes.into_values().remove(0);
    assert_eq!(route.len(), 3);
    assert_eq!(route.duration_sec, 15);
    assert!(route.points.windows(2).all(|w| w[0].time <= w[1].time));

    let direct = loader
        .load_route_file("route_2021-05-01_8.00am.gpx")
        .unwrap();
    assert_eq!(direct.points, route.points);
}

#[test]
fn test_reingest_is_idempotent() {
    let dir = TempDir::new().unwrap();
    write_bundle(dir.path());
    let loader = loader_for(dir.path());
    let store = loader.store().clone();

    loader.ingest(false).unwrap();
    let records = store.read(CacheCategory::Root, RECORDS_TABLE).unwrap();
    let heart_rate = store.read(CacheCategory::Records, HEART_RATE).unwrap();

    loader.ingest(false).unwrap();
    assert_eq!(store.read(CacheCategory::Root, RECORDS_TABLE).unwrap(), records);
    assert_eq!(store.read(CacheCategory::Records, HEART_RATE).unwrap(), heart_rate);
    assert_eq!(store.file_count(CacheCategory::Routes), 1);
    assert_eq!(store.read(CacheCategory::Root, WORKOUTS_TABLE).unwrap().len(), 3);
}

#[test]
fn test_forced_ingest_drops_stale_artifacts() {
    let dir = TempDir::new().unwrap();
    write_bundle(dir.path());
    let loader = loader_for(dir.path());
    loader.ingest(false).unwrap();

    let store = loader.store();
    let stale = store.read(CacheCategory::Records, STEP_COUNT).unwrap();
    store
        .write(CacheCategory::Records, "HKQuantityTypeIdentifierVO2Max", &stale)
        .unwrap();

    loader.ingest(false).unwrap();
    assert!(store.contains(CacheCategory::Records, "HKQuantityTypeIdentifierVO2Max"));

    loader.ingest(true).unwrap();
    assert!(!store.contains(CacheCategory::Records, "HKQuantityTypeIdentifierVO2Max"));
    assert_eq!(store.file_count(CacheCategory::Records), 2);
}

#[test]
fn test_malformed_export_aborts() {
    let dir = TempDir::new().unwrap();
    write_bundle(dir.path());
    fs::write(
        dir.path().join("Export.xml"),
        "<HealthData><Record type=\"x\"",
    )
    .unwrap();

    let loader = loader_for(dir.path());
    assert!(loader.ingest(false).is_err());
}

#[test]
fn test_cli_ingest_and_ecg() {
    let dir = TempDir::new().unwrap();
    write_bundle(dir.path());
    let root = dir.path().display().to_string();
    let config = dir.path().join("absent.toml").display().to_string();

    let ingest = Cli::parse_from(["vitalport", "--config", &config, "ingest", "--root", &root]);
    assert_eq!(ingest.execute().unwrap(), 1);

    let ecg = Cli::parse_from([
        "vitalport",
        "--config",
        &config,
        "ecg",
        "--root",
        &root,
        "--name",
        "ecg_2021-05-01",
    ]);
    assert_eq!(ecg.execute().unwrap(), 0);

    let store = CacheStore::new(dir.path().join("cache"));
    let analysis = store.read(CacheCategory::Root, "ecg_analysis").unwrap();
    assert_eq!(analysis.get(0, "name"), Some("ecg_2021-05-01"));
    assert_eq!(analysis.get(0, "beats"), Some("10"));
    assert_eq!(analysis.get(0, "bpm"), Some("153.60"));
    assert_eq!(analysis.get(0, "hrv"), Some("0.00"));

    let status = Cli::parse_from(["vitalport", "--config", &config, "status", "--root", &root]);
    assert_eq!(status.execute().unwrap(), 0);
}
