//! Live pages over HTTP with a blocking `reqwest` client.

use std::time::Duration;

use history_common::agent::AgentFactory;
use history_common::{ScrapeError, Ticker};
use log::info;
use reqwest::blocking::Client;

use super::{PageAgent, PageLoader};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches one URL per navigation.
pub struct HttpLoader {
    client: Client,
}

impl PageLoader for HttpLoader {
    fn load(&self, url: &str) -> Result<String, ScrapeError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| ScrapeError::Agent(format!("request to {} failed: {}", url, e)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Agent(format!("HTTP error: {} {}", status, url)));
        }
        response
            .text()
            .map_err(|e| ScrapeError::Agent(format!("reading body of {} failed: {}", url, e)))
    }
}

/// Opens an HTTP agent per ticker, sharing one connection pool.
pub struct HttpFactory {
    client: Client,
}

impl HttpFactory {
    /// Build the shared client.
    pub fn new() -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .cookie_store(true)
            .build()
            .map_err(|e| ScrapeError::Agent(format!("HTTP client setup failed: {}", e)))?;
        Ok(Self { client })
    }
}

impl AgentFactory for HttpFactory {
    type Agent = PageAgent<HttpLoader>;

    fn open(&self, ticker: &Ticker) -> Result<Self::Agent, ScrapeError> {
        info!("Initializing HTTP agent for {}...", ticker);
        Ok(PageAgent::new(HttpLoader { client: self.client.clone() }))
    }
}
