//! Workout domain model
//!
//! A [`Workout`] is the "shell" of a `Workout` element: its attributes, events,
//! statistics and metadata entries, plus an unresolved reference to its route
//! document. The route payload is parsed separately, on demand.

use super::table::Attributes;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Attribute carrying the workout activity type
pub const ACTIVITY_TYPE_ATTRIBUTE: &str = "workoutActivityType";

const ACTIVITY_TYPE_PREFIX: &str = "HKWorkoutActivityType";

/// Workout shell parsed from the export document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    /// Generated once at parse time; joins every derived workout artifact
    pub uuid: Uuid,

    /// All XML attributes of the `Workout` element
    pub attributes: Attributes,

    /// Attribute maps of `WorkoutEvent` children
    pub events: Vec<Attributes>,

    /// Attribute maps of `WorkoutStatistics` children
    pub statistics: Vec<Attributes>,

    /// `key -> value` pairs of metadata entry children
    pub metadata_entries: Attributes,

    /// Route document path as referenced by the export (bundle-relative)
    pub route_ref: Option<PathBuf>,
}

impl Workout {
    /// Creates an empty workout shell with a fresh uuid
    pub fn new(attributes: Attributes) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            attributes,
            events: Vec::new(),
            statistics: Vec::new(),
            metadata_entries: Attributes::new(),
            route_ref: None,
        }
    }

    /// Raw activity type identifier, if present
    pub fn activity_type(&self) -> Option<&str> {
        self.attributes
            .get(ACTIVITY_TYPE_ATTRIBUTE)
            .map(String::as_str)
    }

    /// Human readable activity label
    pub fn activity_label(&self) -> Option<String> {
        self.activity_type().map(activity_label)
    }

    /// True when the workout references a route document
    pub fn has_route(&self) -> bool {
        self.route_ref.is_some()
    }
}

/// Maps an `HKWorkoutActivityType*` identifier to a display label
pub fn activity_label(identifier: &str) -> String {
    let label = match identifier {
        "HKWorkoutActivityTypeCycling" => "Cycling",
        "HKWorkoutActivityTypeRunning" => "Running",
        "HKWorkoutActivityTypeWalking" => "Walking",
        "HKWorkoutActivityTypeSwimming" => "Swimming",
        "HKWorkoutActivityTypeHiking" => "Hiking",
        "HKWorkoutActivityTypeTraditionalStrengthTraining" => "Traditional Strength Training",
        "HKWorkoutActivityTypeHighIntensityIntervalTraining" => {
            "High Intensity Interval Training"
        }
        "HKWorkoutActivityTypeYoga" => "Yoga",
        "HKWorkoutActivityTypeSkatingSports" => "Skating Sports",
        "HKWorkoutActivityTypeOther" => "Other",
        other => other.strip_prefix(ACTIVITY_TYPE_PREFIX).unwrap_or(other),
    };
    label.to_string()
}
