use std::fmt;

use crate::availability::format_date;
use crate::diff::{ChangeRecord, ChangeReport, SiteSummary};
use crate::scan_types::ParkQuery;

impl fmt::Display for ChangeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeRecord::DateRemoved { site, date } => {
                write!(f, "- {}: {} is no longer available", site, date)
            }
            ChangeRecord::DateAdded { site, date } => {
                write!(f, "+ {}: {} is newly available", site, date)
            }
            ChangeRecord::SiteAdded { site, dates } => {
                write!(f, "+ New site {}: {}", site, dates.join(", "))
            }
            ChangeRecord::SiteRemoved { site } => write!(f, "- Site {} is no longer listed", site),
        }
    }
}

impl fmt::Display for SiteSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "✖ {} available dates: {}", self.site, self.dates.join(", "))
    }
}

/// Report lines: every change first, then the summaries of changed sites
pub fn render_report(report: &ChangeReport) -> Vec<String> {
    report
        .changes
        .iter()
        .map(ToString::to_string)
        .chain(report.summaries.iter().map(ToString::to_string))
        .collect()
}

/// Headline identifying the park, site type and, when configured, the window
pub fn notification_title(park: &ParkQuery) -> String {
    let window = park.window();
    let date_range = match (window.start, window.end) {
        (Some(start), Some(end)) => format!(" | {} ~ {}", format_date(start), format_date(end)),
        _ => String::new(),
    };

    format!(
        "{} ({}) | {}{}",
        park.park_name, park.park_id, park.site_type, date_range
    )
}

/// Full notification text: title line followed by the report lines
pub fn notification_message(park: &ParkQuery, report: &ChangeReport) -> String {
    let mut lines = vec![notification_title(park)];
    lines.extend(render_report(report));
    lines.join("\n")
}
