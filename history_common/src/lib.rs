//!
//! Historical price table scraping: shared types and the extraction pipeline.
//!
//! This crate aggregates:
//! - `error` — unified error type `ScrapeError` used across the workspace.
//! - `result` — handy `Result<T, ScrapeError>` alias.
//! - `tickers` — ticker symbols and ticker-file parsing.
//! - `period` — supported history periods and their spans.
//! - `net` — history page URL building.
//! - `agent` — the page-rendering agent boundary and its scoped session.
//! - `model` — raw and typed table types.
//! - `locator`, `extract`, `normalize`, `coerce`, `sanitize`, `persist` — the
//!   pipeline stages, in the order they run.
//! - `pipeline` — one ticker end to end; `runner` — a batch of tickers.
#![warn(missing_docs)]
pub mod error;
pub mod result;
pub mod tickers;
pub mod period;
pub mod net;
pub mod agent;
pub mod model;
pub mod locator;
pub mod extract;
pub mod normalize;
pub mod coerce;
pub mod sanitize;
pub mod persist;
pub mod pipeline;
pub mod runner;

pub use error::ScrapeError;
pub use result::Result;
pub use tickers::Ticker;
pub use period::Period;
