use chrono::{Datelike, NaiveDate};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::types::{CalendarError, FetchError};

/// Availability code of one site on one date
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteStatus {
    /// Code "A", bookable
    Available,
    /// Any other code (reserved, walk-up, closed, ...)
    Unavailable(String),
}

impl SiteStatus {
    /// Interpret a raw status cell
    pub fn from_code(code: &str) -> Self {
        match code {
            "A" => SiteStatus::Available,
            other => SiteStatus::Unavailable(other.to_string()),
        }
    }

    /// Whether the site can be booked on this date
    pub fn is_available(&self) -> bool {
        matches!(self, SiteStatus::Available)
    }
}

/// One date column of the calendar grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarColumn {
    /// Weekday label as printed on the page. Not used for date math.
    pub weekday: String,
    /// Inferred date, `None` when the day cell was not a number
    pub date: Option<NaiveDate>,
}

/// One site row with statuses aligned to the page's columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteRow {
    /// Site label, e.g. `A01`
    pub site_name: String,
    /// Campground loop the site belongs to, empty when not shown
    pub loop_name: String,
    /// One status per column, left to right
    pub statuses: Vec<SiteStatus>,
}

/// A parsed batch of the calendar grid
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarPage {
    /// Date columns, left to right
    pub columns: Vec<CalendarColumn>,
    /// Site rows, top to bottom
    pub sites: Vec<SiteRow>,
}

impl CalendarPage {
    /// Dates of the columns, in page order
    pub fn dates(&self) -> Vec<Option<NaiveDate>> {
        self.columns.iter().map(|c| c.date).collect()
    }

    /// Dates on which `site` is available. Statuses past the last column are ignored.
    pub fn available_dates<'a>(&'a self, site: &'a SiteRow) -> impl Iterator<Item = NaiveDate> + 'a {
        self.columns
            .iter()
            .zip(site.statuses.iter())
            .filter(|(_, status)| status.is_available())
            .filter_map(|(column, _)| column.date)
    }

    /// True when the known dates strictly increase left to right.
    ///
    /// Date inference only knows "this month" and "next month", so a page
    /// spanning more than one month boundary shows up as a step backwards.
    pub fn is_chronological(&self) -> bool {
        let dates: Vec<NaiveDate> = self.columns.iter().filter_map(|c| c.date).collect();
        dates.windows(2).all(|pair| pair[0] < pair[1])
    }

    /// True when the page carried neither columns nor sites
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.sites.is_empty()
    }
}

/// Infer the full date of a calendar cell from its day-of-month.
///
/// The page only prints day numbers. A day on or after `today`'s day belongs to
/// `today`'s month; an earlier day belongs to the following month. Precondition:
/// the calendar never reaches more than one month boundary past `today`.
pub fn infer_date(day: u32, today: NaiveDate) -> Result<NaiveDate, CalendarError> {
    let (year, month) = if day >= today.day() {
        (today.year(), today.month())
    } else if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };

    NaiveDate::from_ymd_opt(year, month, day).ok_or(CalendarError::ImpossibleDate {
        day,
        month,
        year,
    })
}

/// Extracts calendar grids and result totals from ReserveAmerica markup
pub struct CalendarParser {
    calendar_block: Selector,
    column: Selector,
    date: Selector,
    weekday: Selector,
    site_row: Selector,
    site_name: Selector,
    loop_name: Selector,
    status: Selector,
    result_total: Selector,
}

impl CalendarParser {
    /// Compile the selectors for the calendar layout
    pub fn new() -> Self {
        Self {
            calendar_block: Selector::parse("div#calendar.items").expect("calendar selector"),
            column: Selector::parse("div[class*='calendar']").expect("column selector"),
            date: Selector::parse("div.date").expect("date selector"),
            weekday: Selector::parse("div.weekday").expect("weekday selector"),
            site_row: Selector::parse("div.br").expect("site row selector"),
            site_name: Selector::parse("div.siteListLabel").expect("site name selector"),
            loop_name: Selector::parse("div.loopName").expect("loop name selector"),
            status: Selector::parse("div.status").expect("status selector"),
            result_total: Selector::parse("#resulttotal_dr_top").expect("total selector"),
        }
    }

    /// Parse one paging response. A page without a calendar block is empty, not an error.
    pub fn parse_page(&self, html: &str, today: NaiveDate) -> Result<CalendarPage, CalendarError> {
        let document = Html::parse_document(html);

        let Some(block) = document.select(&self.calendar_block).next() else {
            debug!("No calendar block found in page");
            return Ok(CalendarPage::default());
        };

        let columns = self.extract_columns(block, today)?;
        let sites = self.extract_sites(block);

        Ok(CalendarPage { columns, sites })
    }

    /// Read the total number of calendar rows from the calendar metadata page
    pub fn parse_total(&self, html: &str) -> Result<usize, FetchError> {
        let document = Html::parse_document(html);

        let element = document
            .select(&self.result_total)
            .next()
            .ok_or(FetchError::MissingTotal)?;

        let raw = element.text().collect::<String>();
        let digits = raw.trim().replace(',', "");

        digits
            .parse::<usize>()
            .map_err(|_| FetchError::InvalidTotal(raw.trim().to_string()))
    }

    fn extract_columns(
        &self,
        block: ElementRef<'_>,
        today: NaiveDate,
    ) -> Result<Vec<CalendarColumn>, CalendarError> {
        let mut columns = Vec::new();

        for element in block.select(&self.column) {
            // A column owns its date cell directly; wrappers around columns are skipped
            let Some(day_text) = child_text(element, &self.date) else {
                continue;
            };
            let weekday = child_text(element, &self.weekday).unwrap_or_default();

            let date = match day_text.parse::<u32>() {
                Ok(day) => Some(infer_date(day, today)?),
                Err(_) => {
                    warn!("Unreadable calendar day: {:?}", day_text);
                    None
                }
            };

            columns.push(CalendarColumn { weekday, date });
        }

        Ok(columns)
    }

    fn extract_sites(&self, block: ElementRef<'_>) -> Vec<SiteRow> {
        let mut sites = Vec::new();

        for row in block.select(&self.site_row) {
            let site_name = match row.select(&self.site_name).next() {
                Some(label) => stripped_text(label),
                None => String::new(),
            };
            if site_name.is_empty() {
                debug!("Skipping site row without a name");
                continue;
            }

            let loop_name = row
                .select(&self.loop_name)
                .next()
                .map(stripped_text)
                .unwrap_or_default();

            let statuses = row
                .select(&self.status)
                .map(|cell| SiteStatus::from_code(&stripped_text(cell)))
                .collect();

            sites.push(SiteRow {
                site_name,
                loop_name,
                statuses,
            });
        }

        sites
    }
}

/// Trimmed text of the first direct child matching `selector`
fn child_text(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| selector.matches(child))
        .map(|found| found.text().collect::<String>().trim().to_string())
}

/// Text of every descendant text node, each trimmed, concatenated
fn stripped_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <div id="calendar" class="items">
          <div class="thead">
            <div class="th calendar"><div class="date">14</div><div class="weekday">Thu</div></div>
            <div class="th calendar"><div class="date">15</div><div class="weekday">Fri</div></div>
            <div class="th calendar"><div class="date">1</div><div class="weekday">Mon</div></div>
          </div>
          <div class="br">
            <div class="siteListLabel"><a href="/site/1">A01</a></div>
            <div class="loopName">Loop A</div>
            <div class="td status a">A</div>
            <div class="td status r">R</div>
            <div class="td status a"> A </div>
          </div>
          <div class="br">
            <div class="siteListLabel"><a href="/site/2">B07</a></div>
            <div class="td status w">W</div>
            <div class="td status a">A</div>
            <div class="td status r">R</div>
          </div>
          <div class="br">
            <div class="loopName">Loop C</div>
            <div class="td status a">A</div>
          </div>
        </div>
        </body></html>
    "#;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_infer_date_same_and_next_month() {
        let today = date(2024, 3, 15);
        assert_eq!(infer_date(10, today), Ok(date(2024, 4, 10)));
        assert_eq!(infer_date(20, today), Ok(date(2024, 3, 20)));
        assert_eq!(infer_date(15, today), Ok(date(2024, 3, 15)));
    }

    #[test]
    fn test_infer_date_year_rollover() {
        let today = date(2024, 12, 20);
        assert_eq!(infer_date(5, today), Ok(date(2025, 1, 5)));
        assert_eq!(infer_date(31, today), Ok(date(2024, 12, 31)));
    }

    #[test]
    fn test_infer_date_impossible_day() {
        let today = date(2024, 1, 31);
        assert_eq!(
            infer_date(30, today),
            Err(CalendarError::ImpossibleDate {
                day: 30,
                month: 2,
                year: 2024
            })
        );
    }

    #[test]
    fn test_parse_page() {
        let parser = CalendarParser::new();
        let page = parser.parse_page(PAGE, date(2024, 3, 14)).unwrap();

        assert_eq!(
            page.dates(),
            vec![
                Some(date(2024, 3, 14)),
                Some(date(2024, 3, 15)),
                Some(date(2024, 4, 1))
            ]
        );
        assert_eq!(page.columns[0].weekday, "Thu");
        assert!(page.is_chronological());

        // Row without a site label is dropped
        assert_eq!(page.sites.len(), 2);

        let a01 = &page.sites[0];
        assert_eq!(a01.site_name, "A01");
        assert_eq!(a01.loop_name, "Loop A");
        assert_eq!(
            a01.statuses,
            vec![
                SiteStatus::Available,
                SiteStatus::Unavailable("R".to_string()),
                SiteStatus::Available
            ]
        );
        assert_eq!(
            page.available_dates(a01).collect::<Vec<_>>(),
            vec![date(2024, 3, 14), date(2024, 4, 1)]
        );

        let b07 = &page.sites[1];
        assert_eq!(b07.loop_name, "");
        assert_eq!(
            page.available_dates(b07).collect::<Vec<_>>(),
            vec![date(2024, 3, 15)]
        );
    }

    #[test]
    fn test_parse_page_without_calendar_block() {
        let parser = CalendarParser::new();
        let page = parser
            .parse_page("<html><body><p>Nothing here</p></body></html>", date(2024, 3, 14))
            .unwrap();
        assert!(page.is_empty());
    }

    #[test]
    fn test_unreadable_day_keeps_alignment() {
        let html = r#"
            <div id="calendar" class="items">
              <div class="calendar"><div class="date">??</div><div class="weekday">Sat</div></div>
              <div class="calendar"><div class="date">22</div><div class="weekday">Sun</div></div>
              <div class="br">
                <div class="siteListLabel">C03</div>
                <div class="status">A</div>
                <div class="status">A</div>
              </div>
            </div>
        "#;
        let parser = CalendarParser::new();
        let page = parser.parse_page(html, date(2024, 6, 20)).unwrap();

        assert_eq!(page.dates(), vec![None, Some(date(2024, 6, 22))]);
        assert_eq!(
            page.available_dates(&page.sites[0]).collect::<Vec<_>>(),
            vec![date(2024, 6, 22)]
        );
    }

    #[test]
    fn test_wrapped_columns_are_counted_once() {
        let html = r#"
            <div id="calendar" class="items">
              <div class="calendarHeader">
                <div class="calendar"><div class="date">21</div><div class="weekday">Fri</div></div>
                <div class="calendar"><div class="date">22</div><div class="weekday">Sat</div></div>
              </div>
              <div class="br">
                <div class="siteListLabel">C03</div>
                <div class="status">R</div>
                <div class="status">A</div>
              </div>
            </div>
        "#;
        let parser = CalendarParser::new();
        let page = parser.parse_page(html, date(2024, 6, 20)).unwrap();

        assert_eq!(
            page.dates(),
            vec![Some(date(2024, 6, 21)), Some(date(2024, 6, 22))]
        );
        assert_eq!(page.columns[1].weekday, "Sat");
        assert_eq!(
            page.available_dates(&page.sites[0]).collect::<Vec<_>>(),
            vec![date(2024, 6, 22)]
        );
    }

    #[test]
    fn test_detects_multiple_month_boundaries() {
        // 25, 5, 22: the last cell is two months out but infers to this month
        let html = r#"
            <div id="calendar" class="items">
              <div class="calendar"><div class="date">25</div></div>
              <div class="calendar"><div class="date">5</div></div>
              <div class="calendar"><div class="date">22</div></div>
            </div>
        "#;
        let parser = CalendarParser::new();
        let page = parser.parse_page(html, date(2024, 6, 20)).unwrap();
        assert!(!page.is_chronological());
    }

    #[test]
    fn test_parse_total() {
        let parser = CalendarParser::new();
        let html = r#"<span id="resulttotal_dr_top"> 1,037 </span>"#;
        assert_eq!(parser.parse_total(html).unwrap(), 1037);

        assert!(matches!(
            parser.parse_total("<div></div>"),
            Err(FetchError::MissingTotal)
        ));
        assert!(matches!(
            parser.parse_total(r#"<span id="resulttotal_dr_top">many</span>"#),
            Err(FetchError::InvalidTotal(_))
        ));
    }
}
