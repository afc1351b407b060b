use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use notification_services::MessageSender;
use reserve_america::{SessionFetcher, SessionProvider};
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::availability::assemble_availability;
use crate::diff::diff_snapshots;
use crate::report::{notification_message, render_report};
use crate::scan_types::*;
use crate::snapshot_store::SnapshotStore;

/// What happened to one park during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParkOutcome {
    /// Availability matched the previous snapshot
    Unchanged,
    /// Changes were found and delivered
    Notified {
        /// Number of change records in the report
        changes: usize,
    },
    /// Changes were found and saved, but delivery failed
    NotificationFailed(String),
    /// The park was skipped; its snapshot is untouched
    Failed(String),
}

/// Per-park outcomes of one run, in processing order
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Each park with what happened to it
    pub results: Vec<(ParkQuery, ParkOutcome)>,
}

impl RunSummary {
    /// Parks whose change report could not be delivered
    pub fn notification_failures(&self) -> usize {
        self.count(|outcome| matches!(outcome, ParkOutcome::NotificationFailed(_)))
    }

    /// Parks skipped because of an error
    pub fn failures(&self) -> usize {
        self.count(|outcome| matches!(outcome, ParkOutcome::Failed(_)))
    }

    /// Parks with delivered changes
    pub fn notified(&self) -> usize {
        self.count(|outcome| matches!(outcome, ParkOutcome::Notified { .. }))
    }

    fn count(&self, predicate: impl Fn(&ParkOutcome) -> bool) -> usize {
        self.results
            .iter()
            .filter(|(_, outcome)| predicate(outcome))
            .count()
    }
}

/// Tunables for the scan loop
#[derive(Debug, Clone)]
pub struct ScanExecutorConfig {
    /// Pause between two parks to stay gentle on the reservation site (default: 1 second)
    pub park_delay: Duration,
}

impl Default for ScanExecutorConfig {
    fn default() -> Self {
        Self {
            park_delay: Duration::from_secs(1),
        }
    }
}

/// Main scan execution engine
pub struct ScanExecutor {
    fetcher: SessionFetcher,
    sessions: Arc<dyn SessionProvider>,
    store: SnapshotStore,
    notifier: Arc<dyn MessageSender>,
    config: ScanExecutorConfig,
}

impl ScanExecutor {
    /// Wire an executor from its collaborators
    pub fn new(
        fetcher: SessionFetcher,
        sessions: Arc<dyn SessionProvider>,
        store: SnapshotStore,
        notifier: Arc<dyn MessageSender>,
        config: Option<ScanExecutorConfig>,
    ) -> Self {
        Self {
            fetcher,
            sessions,
            store,
            notifier,
            config: config.unwrap_or_default(),
        }
    }

    /// Scan every park in order. A failing park is logged and skipped.
    pub async fn run(&self, parks: &[ParkQuery]) -> RunSummary {
        info!("Starting scan of {} parks", parks.len());

        let mut summary = RunSummary::default();

        for (index, park) in parks.iter().enumerate() {
            if index > 0 {
                sleep(self.config.park_delay).await;
            }

            let today = Local::now().date_naive();
            let outcome = match self.process_park(park, today).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(
                        "Error fetching data for {} (ID: {}, TYPE: {}): {}",
                        park.park_name, park.park_id, park.site_type, e
                    );
                    ParkOutcome::Failed(e.to_string())
                }
            };

            summary.results.push((park.clone(), outcome));
        }

        info!(
            "Scan finished: {} notified, {} failed, {} notification failures",
            summary.notified(),
            summary.failures(),
            summary.notification_failures()
        );

        summary
    }

    /// Fetch, diff, persist and report one park.
    ///
    /// The snapshot is saved before the notification is sent; a delivery
    /// failure does not roll it back.
    pub async fn process_park(
        &self,
        park: &ParkQuery,
        today: NaiveDate,
    ) -> Result<ParkOutcome, ScanError> {
        park.check()?;

        let window = park.window();
        info!(
            "Fetching availability for {} / {} ~ {} (ID: {}, TYPE: {})",
            park.park_name,
            window.start.map_or("*".to_string(), |d| d.to_string()),
            window.end.map_or("*".to_string(), |d| d.to_string()),
            park.park_id,
            park.site_type
        );

        let session = self.sessions.open_session()?;
        let pages = self
            .fetcher
            .fetch_park(session, &park.park_id, &park.site_type, today)
            .await?;

        let current = assemble_availability(&pages, &window);
        let previous = self
            .store
            .load_or_reset(&park.park_id, &park.site_type)
            .await?;
        let report = diff_snapshots(&previous, &current);

        let path = self
            .store
            .save(&park.park_id, &park.site_type, &current)
            .await?;
        info!("Snapshot saved to {}", path.display());

        if !report.has_changes() {
            info!("No changes for {} ({})", park.park_name, park.park_id);
            return Ok(ParkOutcome::Unchanged);
        }

        for line in render_report(&report) {
            debug!("{}", line);
        }

        let message = notification_message(park, &report);
        match self.notifier.send_message(&message).await {
            Ok(()) => {
                info!(
                    "Sent {} changes for {} ({})",
                    report.changes.len(),
                    park.park_name,
                    park.park_id
                );
                Ok(ParkOutcome::Notified {
                    changes: report.changes.len(),
                })
            }
            Err(e) => {
                error!(
                    "Failed to send notification for {} ({}): {}",
                    park.park_name, park.park_id, e
                );
                Ok(ParkOutcome::NotificationFailed(e.to_string()))
            }
        }
    }
}
