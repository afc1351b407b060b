use chrono::NaiveDate;
use reserve_america::FetchError;
use serde::Deserialize;
use validator::Validate;

use crate::availability::DateWindow;
use crate::snapshot_store::SnapshotError;

/// Site type monitored when the configuration names none
pub const DEFAULT_SITE_TYPE: &str = "TENT SITE";

fn default_site_type() -> String {
    DEFAULT_SITE_TYPE.to_string()
}

/// One monitoring target: a park, a site type and an optional date window
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
#[validate(schema(function = "validate_window"))]
pub struct ParkQuery {
    /// Park identifier on the reservation site
    #[validate(length(min = 1, message = "Park ID is required"))]
    pub park_id: String,

    /// Park name for display purposes
    #[validate(length(min = 1, message = "Park name is required"))]
    pub park_name: String,

    /// Site filter sent to the reservation site
    #[serde(default = "default_site_type")]
    #[validate(length(min = 1, message = "Site type must not be empty"))]
    pub site_type: String,

    /// First date of interest (inclusive)
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    /// Last date of interest (inclusive)
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl ParkQuery {
    /// Create a query for every date of the default site type
    pub fn new(park_id: impl Into<String>, park_name: impl Into<String>) -> Self {
        Self {
            park_id: park_id.into(),
            park_name: park_name.into(),
            site_type: default_site_type(),
            start_date: None,
            end_date: None,
        }
    }

    /// Dates outside this window are never reported
    pub fn window(&self) -> DateWindow {
        DateWindow {
            start: self.start_date,
            end: self.end_date,
        }
    }

    /// Run the field validations, mapping failures to `ScanError::Validation`
    pub fn check(&self) -> Result<(), ScanError> {
        self.validate()
            .map_err(|e| ScanError::Validation(e.to_string()))
    }
}

fn validate_window(query: &ParkQuery) -> Result<(), validator::ValidationError> {
    match (query.start_date, query.end_date) {
        (Some(start), Some(end)) if start > end => {
            Err(validator::ValidationError::new("start_date_after_end_date"))
        }
        _ => Ok(()),
    }
}

/// Custom error type for scan operations
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Fetching the park calendar failed
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Reading or writing the snapshot failed
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// Park query is not usable
    #[error("Validation error: {0}")]
    Validation(String),
}
