//! # Campground Scan
//!
//! This crate turns fetched calendar pages into per-site availability snapshots,
//! compares each snapshot with the one saved by the previous run, and reports
//! opened or closed dates for every monitored park.

/// Types for park monitoring targets and scan errors
mod scan_types;
pub use scan_types::*;

/// Assembly of calendar pages into a site -> dates snapshot
mod availability;
pub use availability::*;

/// Categorized comparison of two snapshots
mod diff;
pub use diff::*;

/// Human-readable rendering of change reports
mod report;
pub use report::*;

/// Durable per-park snapshot files
mod snapshot_store;
pub use snapshot_store::*;

/// Sequential per-park scan loop
mod executor;
pub use executor::*;
