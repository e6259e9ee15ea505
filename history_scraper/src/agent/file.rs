//! Saved pages read from a directory, one `<TICKER>.html` per ticker.

use std::fs;
use std::path::PathBuf;

use history_common::agent::AgentFactory;
use history_common::{ScrapeError, Ticker};
use log::debug;

use super::{PageAgent, PageLoader};

/// Serves the saved page of a single ticker whatever URL is requested.
pub struct FileLoader {
    path: PathBuf,
}

impl PageLoader for FileLoader {
    fn load(&self, url: &str) -> Result<String, ScrapeError> {
        debug!("Serving {} from {}", url, self.path.display());
        fs::read_to_string(&self.path).map_err(|e| {
            ScrapeError::Agent(format!("cannot read saved page {}: {}", self.path.display(), e))
        })
    }
}

/// Opens a file agent per ticker.
pub struct FileFactory {
    dir: PathBuf,
}

impl FileFactory {
    /// Factory reading pages from `dir`.
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl AgentFactory for FileFactory {
    type Agent = PageAgent<FileLoader>;

    fn open(&self, ticker: &Ticker) -> Result<Self::Agent, ScrapeError> {
        let path = self.dir.join(format!("{}.html", ticker));
        Ok(PageAgent::new(FileLoader { path }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use history_common::agent::RenderAgent;

    #[test]
    fn reads_ticker_page() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("AAPL.html"), "<table><tr><td>1</td></tr></table>").unwrap();
        let factory = FileFactory::new(dir.path().to_path_buf());

        let mut agent = factory.open(&"aapl".parse().unwrap()).unwrap();
        agent.navigate("https://example.test").unwrap();
        assert!(agent.markup().unwrap().contains("<td>1</td>"));

        let mut missing = factory.open(&"MSFT".parse().unwrap()).unwrap();
        assert!(matches!(missing.navigate("x"), Err(ScrapeError::Agent(_))));
    }
}
