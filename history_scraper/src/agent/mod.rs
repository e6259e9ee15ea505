//! Concrete rendering agents for static documents.
//!
//! Both agents load a complete HTML document up front and answer element
//! lookups against it. A static document cannot change while a lookup
//! waits, so each lookup is evaluated once and returns immediately; the
//! per-pattern timeout is only an upper bound.
//!
//! - `http` — fetch the live history page.
//! - `file` — read a page saved earlier to disk.
pub mod file;
pub mod http;

use std::time::Duration;

use history_common::ScrapeError;
use history_common::agent::{ElementHandle, RenderAgent, SelectorPattern, StaticDocument};
use log::debug;

/// Produces the markup for a URL.
pub trait PageLoader {
    /// Load the document behind `url`.
    fn load(&self, url: &str) -> Result<String, ScrapeError>;
}

/// `RenderAgent` over a document produced by a `PageLoader`.
pub struct PageAgent<L: PageLoader> {
    loader: L,
    document: Option<StaticDocument>,
}

impl<L: PageLoader> PageAgent<L> {
    /// Agent with nothing loaded yet.
    pub fn new(loader: L) -> Self {
        Self { loader, document: None }
    }

    fn document(&self) -> Result<&StaticDocument, ScrapeError> {
        self.document
            .as_ref()
            .ok_or_else(|| ScrapeError::Agent("no page loaded".to_string()))
    }
}

impl<L: PageLoader> RenderAgent for PageAgent<L> {
    fn navigate(&mut self, url: &str) -> Result<(), ScrapeError> {
        let html = self.loader.load(url)?;
        debug!("Loaded {} bytes of markup", html.len());
        self.document = Some(StaticDocument::new(html));
        Ok(())
    }

    fn find_element(
        &mut self,
        pattern: &SelectorPattern,
        _timeout: Duration,
    ) -> Result<Option<ElementHandle>, ScrapeError> {
        match self.document.as_mut() {
            Some(document) => document.find(pattern),
            None => Err(ScrapeError::Agent("no page loaded".to_string())),
        }
    }

    fn markup(&self) -> Result<String, ScrapeError> {
        Ok(self.document()?.html().to_string())
    }

    fn element_markup(&self, element: &ElementHandle) -> Result<String, ScrapeError> {
        self.document()?.element_markup(element)
    }

    fn close(&mut self) {
        self.document = None;
    }
}
