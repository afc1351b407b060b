use std::collections::HashSet;

use crate::availability::AvailabilitySnapshot;

/// One categorized difference between two snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeRecord {
    /// A known site gained a date
    DateAdded {
        /// Site name
        site: String,
        /// Formatted date
        date: String,
    },
    /// A known site lost a date
    DateRemoved {
        /// Site name
        site: String,
        /// Formatted date
        date: String,
    },
    /// A site appeared with these dates
    SiteAdded {
        /// Site name
        site: String,
        /// Formatted dates, in page order
        dates: Vec<String>,
    },
    /// A site no longer has any available date
    SiteRemoved {
        /// Site name
        site: String,
    },
}

/// Current availability of a site that changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSummary {
    /// Site name
    pub site: String,
    /// Every date the site has now
    pub dates: Vec<String>,
}

/// Outcome of comparing two snapshots of the same park and site type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeReport {
    /// Differences, site by site
    pub changes: Vec<ChangeRecord>,
    /// Full current dates of every site that changed and is still listed
    pub summaries: Vec<SiteSummary>,
}

impl ChangeReport {
    /// Whether anything differs from the previous snapshot
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }
}

/// Compare the previous snapshot with the current one.
///
/// Dates are compared as sets, so order and repeats within a site's list never
/// count as a change. Records follow site name order; within a site, removed
/// dates keep the previous list's order and added dates the current list's.
pub fn diff_snapshots(
    previous: &AvailabilitySnapshot,
    current: &AvailabilitySnapshot,
) -> ChangeReport {
    let mut report = ChangeReport::default();

    for (site, current_dates) in current {
        match previous.get(site) {
            Some(previous_dates) => {
                let removed = missing_from(previous_dates, current_dates);
                let added = missing_from(current_dates, previous_dates);

                if removed.is_empty() && added.is_empty() {
                    continue;
                }

                report
                    .changes
                    .extend(removed.into_iter().map(|date| ChangeRecord::DateRemoved {
                        site: site.clone(),
                        date,
                    }));
                report
                    .changes
                    .extend(added.into_iter().map(|date| ChangeRecord::DateAdded {
                        site: site.clone(),
                        date,
                    }));
                report.summaries.push(SiteSummary {
                    site: site.clone(),
                    dates: current_dates.clone(),
                });
            }
            None if !current_dates.is_empty() => {
                report.changes.push(ChangeRecord::SiteAdded {
                    site: site.clone(),
                    dates: current_dates.clone(),
                });
                report.summaries.push(SiteSummary {
                    site: site.clone(),
                    dates: current_dates.clone(),
                });
            }
            None => {}
        }
    }

    for site in previous.keys() {
        if !current.contains_key(site) {
            report
                .changes
                .push(ChangeRecord::SiteRemoved { site: site.clone() });
        }
    }

    report
}

/// Distinct entries of `from` absent from `other`, in `from`'s order
fn missing_from(from: &[String], other: &[String]) -> Vec<String> {
    let other: HashSet<&String> = other.iter().collect();
    let mut seen = HashSet::new();

    from.iter()
        .filter(|date| !other.contains(date) && seen.insert(*date))
        .cloned()
        .collect()
}
