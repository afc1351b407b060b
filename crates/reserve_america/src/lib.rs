//! # Reserve America
//!
//! This crate provides a client for the ReserveAmerica campsite calendar pages.
//! It drives the filter / calendar / paging request sequence for one park inside
//! its own cookie session and parses each returned page into dates and site rows.

/// Endpoint configuration and error types.
mod types;
pub use types::*;

/// Parsing of calendar page markup into dated site status rows.
mod calendar;
pub use calendar::*;

/// Cookie-backed HTTP sessions, one per park.
mod session;
pub use session::*;

/// The dependent filter / count / paging request sequence.
mod fetcher;
pub use fetcher::*;
