use std::collections::BTreeMap;

use chrono::NaiveDate;
use reserve_america::CalendarPage;
use tracing::debug;

/// Display and storage format of an available date, e.g. `03/20 (Wed)`
pub const DATE_FORMAT: &str = "%m/%d (%a)";

/// Site name -> formatted available dates, in first-seen order
pub type AvailabilitySnapshot = BTreeMap<String, Vec<String>>;

/// Format a date the way snapshots and reports show it
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Inclusive date range; a missing bound is open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
    /// First date included, if any
    pub start: Option<NaiveDate>,
    /// Last date included, if any
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    /// Whether `date` falls inside the window
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }

    /// Both bounds were given explicitly
    pub fn is_bounded(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }
}

/// Combine every page of a park into one snapshot.
///
/// A site seen on several pages accumulates into one entry. Repeated dates are
/// kept once, and sites left without any date are omitted.
pub fn assemble_availability(pages: &[CalendarPage], window: &DateWindow) -> AvailabilitySnapshot {
    let mut snapshot = AvailabilitySnapshot::new();

    for page in pages {
        for site in &page.sites {
            for date in page.available_dates(site) {
                if !window.contains(date) {
                    continue;
                }

                let formatted = format_date(date);
                let dates = snapshot.entry(site.site_name.clone()).or_default();
                if !dates.contains(&formatted) {
                    dates.push(formatted);
                }
            }
        }
    }

    debug!(
        "Assembled availability for {} sites from {} pages",
        snapshot.len(),
        pages.len()
    );

    snapshot
}
