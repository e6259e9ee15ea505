//! One ticker, end to end.
//!
//! Locator → extraction chain → normalizer → coercer → sanitizer →
//! persister. The rendering agent lives in an `AgentSession` and is closed
//! as soon as the markup has been read, or on whichever error ends the run
//! first.

use std::path::PathBuf;

use chrono::Utc;
use log::{info, warn};

use crate::agent::{AgentFactory, AgentSession, RenderAgent};
use crate::coerce::coerce;
use crate::error::ScrapeError;
use crate::extract::{MarkupSources, extract};
use crate::locator::{LocatorConfig, locate_table};
use crate::model::TypedTable;
use crate::net::history_url;
use crate::normalize::normalize;
use crate::period::Period;
use crate::persist::persist;
use crate::sanitize::drop_empty_rows;
use crate::tickers::Ticker;

/// Per-ticker pipeline settings.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory receiving the CSV files.
    pub output_dir: PathBuf,
    /// History window.
    pub period: Period,
    /// Table search patterns and time limits.
    pub locator: LocatorConfig,
}

/// What a successful ticker run produced.
#[derive(Debug, Clone)]
pub struct TickerOutput {
    /// The persisted table.
    pub table: TypedTable,
    /// Where it was written.
    pub path: PathBuf,
}

/// Scrape, clean and persist the history of `ticker`.
pub fn scrape_ticker<F: AgentFactory>(
    factory: &F,
    ticker: &Ticker,
    config: &PipelineConfig,
) -> Result<TickerOutput, ScrapeError> {
    let sources = {
        let mut session = AgentSession::new(factory.open(ticker)?);
        fetch_markup(&mut *session, ticker, config)?
    };

    let table = build_table(&sources)?;
    let path = persist(&table, &config.output_dir, ticker, config.period)?;
    Ok(TickerOutput { table, path })
}

/// Navigate to the history page, locate the table and read back markup.
pub fn fetch_markup<A: RenderAgent + ?Sized>(
    agent: &mut A,
    ticker: &Ticker,
    config: &PipelineConfig,
) -> Result<MarkupSources, ScrapeError> {
    let url = history_url(ticker, config.period, Utc::now().timestamp());
    info!("Navigating to history page for {}", ticker);
    agent.navigate(&url)?;

    info!("Waiting for {} data table to load...", ticker);
    let element = locate_table(&mut *agent, &config.locator)?;

    let document = agent
        .markup()
        .inspect_err(|e| warn!("Could not read page markup for {}: {}", ticker, e))
        .ok();
    let table = agent
        .element_markup(&element)
        .inspect_err(|e| warn!("Could not read table markup for {}: {}", ticker, e))
        .ok();
    Ok(MarkupSources { document, table })
}

/// Extraction chain followed by normalization, coercion and row cleanup.
///
/// A table left without rows counts as an extraction failure so nothing is
/// persisted for it.
pub fn build_table(sources: &MarkupSources) -> Result<TypedTable, ScrapeError> {
    let raw = extract(sources)?;
    let table = drop_empty_rows(coerce(normalize(raw)));
    if table.is_empty() {
        return Err(ScrapeError::ExtractionFailed(
            "no rows left after cleaning".to_string(),
        ));
    }
    Ok(table)
}
