//! Boundary to the page-rendering agent.
//!
//! The pipeline never drives a browser itself. It talks to a `RenderAgent`
//! that can navigate, wait for an element matching a `SelectorPattern`, and
//! hand back serialized markup. One agent is opened per ticker through an
//! `AgentFactory` and wrapped in an `AgentSession`, which closes it on drop
//! so every exit path releases it.
//!
//! `StaticDocument` is the shared element finder for agents whose document
//! is a fixed HTML string (a fetched page or a saved file).

use std::ops::{Deref, DerefMut};
use std::time::Duration;

use log::{debug, warn};
use scraper::{ElementRef, Html, Selector};

use crate::error::ScrapeError;
use crate::tickers::Ticker;

/// How a selector pattern addresses its element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// Matches on the element's own attributes (`table[data-test=...]`).
    Attribute,
    /// Matches by position under a container (`div[id*='history'] table`).
    Structural,
    /// Any element of the tag; last resort.
    Any,
}

/// A rule for locating an element within rendered markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorPattern {
    /// Addressing style, used for logging and ordering.
    pub kind: PatternKind,
    /// CSS selector text.
    pub css: String,
}

impl SelectorPattern {
    /// Pattern matching on the element's attributes.
    pub fn attribute(css: &str) -> Self {
        Self { kind: PatternKind::Attribute, css: css.to_string() }
    }

    /// Pattern matching on the element's position in the document.
    pub fn structural(css: &str) -> Self {
        Self { kind: PatternKind::Structural, css: css.to_string() }
    }

    /// Pattern matching any element of the given tag.
    pub fn any(tag: &str) -> Self {
        Self { kind: PatternKind::Any, css: tag.to_string() }
    }

    /// Compile to a `scraper` selector.
    pub fn compile(&self) -> Result<Selector, ScrapeError> {
        Selector::parse(&self.css).map_err(|_| ScrapeError::Selector(self.css.clone()))
    }
}

/// Opaque reference to an element found by an agent.
///
/// Only meaningful to the agent that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementHandle(usize);

impl ElementHandle {
    /// Wrap an agent-specific element id.
    pub fn new(id: usize) -> Self {
        ElementHandle(id)
    }

    /// Agent-specific element id.
    pub fn id(&self) -> usize {
        self.0
    }
}

/// A page-rendering agent that yields raw HTML on demand.
pub trait RenderAgent {
    /// Load `url` into the agent's document.
    fn navigate(&mut self, url: &str) -> Result<(), ScrapeError>;

    /// Wait up to `timeout` for a visible element matching `pattern`.
    ///
    /// `Ok(None)` means the wait ran out; `Err` is reserved for failures of
    /// the agent itself or an invalid pattern.
    fn find_element(
        &mut self,
        pattern: &SelectorPattern,
        timeout: Duration,
    ) -> Result<Option<ElementHandle>, ScrapeError>;

    /// Serialized markup of the whole current document.
    fn markup(&self) -> Result<String, ScrapeError>;

    /// Serialized outer markup of a previously found element.
    fn element_markup(&self, element: &ElementHandle) -> Result<String, ScrapeError>;

    /// Release the agent's resources. Must be safe to call more than once.
    fn close(&mut self);
}

/// Opens one fresh agent per ticker.
pub trait AgentFactory {
    /// Agent type produced by this factory.
    type Agent: RenderAgent;

    /// Start an agent for `ticker`.
    fn open(&self, ticker: &Ticker) -> Result<Self::Agent, ScrapeError>;
}

/// Owns an agent for the duration of one ticker and closes it on drop.
pub struct AgentSession<A: RenderAgent> {
    agent: A,
}

impl<A: RenderAgent> AgentSession<A> {
    /// Take ownership of `agent`.
    pub fn new(agent: A) -> Self {
        Self { agent }
    }
}

impl<A: RenderAgent> Deref for AgentSession<A> {
    type Target = A;

    fn deref(&self) -> &A {
        &self.agent
    }
}

impl<A: RenderAgent> DerefMut for AgentSession<A> {
    fn deref_mut(&mut self) -> &mut A {
        &mut self.agent
    }
}

impl<A: RenderAgent> Drop for AgentSession<A> {
    fn drop(&mut self) {
        debug!("Closing rendering agent");
        self.agent.close();
    }
}

/// A fixed HTML document with element lookup by selector pattern.
///
/// Elements returned by `find` are remembered so their outer markup can be
/// served later through the handle.
#[derive(Debug, Default)]
pub struct StaticDocument {
    html: String,
    found: Vec<String>,
}

impl StaticDocument {
    /// Wrap a serialized document.
    pub fn new(html: String) -> Self {
        Self { html, found: Vec::new() }
    }

    /// Whole document markup.
    pub fn html(&self) -> &str {
        &self.html
    }

    /// First visible element matching `pattern`, if any.
    pub fn find(&mut self, pattern: &SelectorPattern) -> Result<Option<ElementHandle>, ScrapeError> {
        let selector = pattern.compile()?;
        let document = Html::parse_document(&self.html);
        let outer = document
            .select(&selector)
            .find(|el| is_visible(*el))
            .map(|el| el.html());

        Ok(outer.map(|markup| {
            self.found.push(markup);
            ElementHandle::new(self.found.len() - 1)
        }))
    }

    /// Outer markup of an element previously returned by `find`.
    pub fn element_markup(&self, element: &ElementHandle) -> Result<String, ScrapeError> {
        self.found.get(element.id()).cloned().ok_or_else(|| {
            warn!("Unknown element handle {}", element.id());
            ScrapeError::Agent(format!("unknown element handle {}", element.id()))
        })
    }
}

/// An element is visible unless it or an ancestor is hidden by attribute or
/// inline style.
fn is_visible(element: ElementRef<'_>) -> bool {
    let hidden = |el: ElementRef<'_>| {
        let value = el.value();
        if value.attr("hidden").is_some() {
            return true;
        }
        value.attr("style").is_some_and(|style| {
            let style: String = style
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_ascii_lowercase();
            style.contains("display:none") || style.contains("visibility:hidden")
        })
    };

    if hidden(element) {
        return false;
    }
    !element.ancestors().filter_map(ElementRef::wrap).any(hidden)
}
