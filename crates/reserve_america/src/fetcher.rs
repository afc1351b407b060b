use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::calendar::{CalendarPage, CalendarParser};
use crate::session::SessionTransport;
use crate::types::{FetchError, ReserveAmericaConfig};

/// Runs the filter / count / paging request sequence for one park
pub struct SessionFetcher {
    config: ReserveAmericaConfig,
    parser: CalendarParser,
}

impl SessionFetcher {
    /// Create a fetcher for the given site
    pub fn new(config: ReserveAmericaConfig) -> Self {
        Self {
            config,
            parser: CalendarParser::new(),
        }
    }

    /// Number of paging requests needed for `total` rows
    pub fn batch_count(&self, total: usize) -> usize {
        total.div_ceil(self.config.batch_size.max(1))
    }

    /// Fetch every calendar page of `park_id` for `site_type`.
    ///
    /// The session is consumed: its cookies hold this park's filter, so the
    /// next park must start from a fresh session and set its own filter.
    pub async fn fetch_park(
        &self,
        session: Box<dyn SessionTransport>,
        park_id: &str,
        site_type: &str,
        today: NaiveDate,
    ) -> Result<Vec<CalendarPage>, FetchError> {
        let contract_code = self.config.contract_code.clone();

        // Step 1: store the site-type filter in the session cookies
        let filter_params = [
            ("sitefilter", site_type.to_string()),
            ("startIdx", "0".to_string()),
            ("contractCode", contract_code.clone()),
            ("parkId", park_id.to_string()),
        ];
        session
            .get_text(&self.config.filter_url(), &filter_params)
            .await?;

        // Step 2: read the total row count under that filter
        let calendar_params = [
            ("page", "calendar".to_string()),
            ("contractCode", contract_code.clone()),
            ("parkId", park_id.to_string()),
            ("sitepage", "true".to_string()),
            ("startIdx", "0".to_string()),
        ];
        let calendar_html = session
            .get_text(&self.config.calendar_url(), &calendar_params)
            .await?;
        let total = self.parser.parse_total(&calendar_html)?;
        let batches = self.batch_count(total);

        info!(
            "Park {} has {} calendar rows in {} batches",
            park_id, total, batches
        );

        // Step 3: walk the pages strictly in order
        let mut pages = Vec::with_capacity(batches);
        for batch in 0..batches {
            let start_idx = batch * self.config.batch_size;
            let page_params = [
                ("contractCode", contract_code.clone()),
                ("parkId", park_id.to_string()),
                ("startIdx", start_idx.to_string()),
            ];

            debug!("Fetching park {} batch starting at {}", park_id, start_idx);
            let html = session
                .get_text(&self.config.page_url(), &page_params)
                .await?;

            let page = self.parser.parse_page(&html, today)?;
            if !page.is_chronological() {
                warn!(
                    "Calendar for park {} at startIdx {} spans more than one month boundary; inferred dates may be wrong",
                    park_id, start_idx
                );
            }
            pages.push(page);
        }

        Ok(pages)
    }
}
