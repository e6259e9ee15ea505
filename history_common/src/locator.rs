//! Locating the price history table in a rendered document.
//!
//! Patterns are tried strictly in priority order, each with its own wait,
//! under one wall-clock budget for the whole list. When the list is
//! exhausted (or the budget runs out) a generic `table` search gets one more
//! short wait of its own.

use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::agent::{ElementHandle, RenderAgent, SelectorPattern};
use crate::error::ScrapeError;

/// Default wait for a single pattern.
pub const PATTERN_TIMEOUT: Duration = Duration::from_secs(3);
/// Default budget for the whole pattern list.
pub const TABLE_BUDGET: Duration = Duration::from_secs(15);

/// Selector patterns and time limits for `locate_table`.
#[derive(Debug, Clone)]
pub struct LocatorConfig {
    /// Patterns in priority order, each with its own wait.
    pub attempts: Vec<(SelectorPattern, Duration)>,
    /// Wall-clock budget across `attempts`.
    pub budget: Duration,
    /// Last-resort pattern tried after `attempts`.
    pub fallback: (SelectorPattern, Duration),
}

impl LocatorConfig {
    /// Default pattern list with the given per-pattern wait and budget.
    pub fn with_timeouts(pattern_timeout: Duration, budget: Duration) -> Self {
        let patterns = [
            SelectorPattern::attribute("table[data-test='historical-prices']"),
            SelectorPattern::attribute("table.historical-prices"),
            SelectorPattern::attribute("table[class*='historical-prices']"),
            SelectorPattern::attribute("table[data-test*='historical-prices']"),
            SelectorPattern::structural("div[id*='history'] table"),
            SelectorPattern::structural("div[class*='history'] table"),
        ];
        Self {
            attempts: patterns.into_iter().map(|p| (p, pattern_timeout)).collect(),
            budget,
            fallback: (SelectorPattern::any("table"), pattern_timeout),
        }
    }
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self::with_timeouts(PATTERN_TIMEOUT, TABLE_BUDGET)
    }
}

/// Try `attempts` in order until one yields an element or `deadline` passes.
///
/// Each wait is capped by the time left before `deadline`; `None` means the
/// budget is too large to represent and only per-pattern waits apply. Agent failures on
/// one pattern are logged and the next pattern is tried. Returns the index of
/// the matching attempt with its element.
pub fn find_first<A: RenderAgent + ?Sized>(
    agent: &mut A,
    attempts: &[(SelectorPattern, Duration)],
    deadline: Option<Instant>,
) -> Option<(usize, ElementHandle)> {
    for (idx, (pattern, timeout)) in attempts.iter().enumerate() {
        let remaining = match deadline {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()),
            None => Duration::MAX,
        };
        if remaining.is_zero() {
            debug!("Table search budget exhausted before '{}'", pattern.css);
            break;
        }

        debug!("Trying {:?} pattern '{}'", pattern.kind, pattern.css);
        match agent.find_element(pattern, (*timeout).min(remaining)) {
            Ok(Some(handle)) => return Some((idx, handle)),
            Ok(None) => debug!("No visible match for '{}'", pattern.css),
            Err(e) => warn!("Pattern '{}' failed: {}", pattern.css, e),
        }
    }
    None
}

/// Locate the single table holding the price history.
pub fn locate_table<A: RenderAgent + ?Sized>(
    agent: &mut A,
    config: &LocatorConfig,
) -> Result<ElementHandle, ScrapeError> {
    let deadline = Instant::now().checked_add(config.budget);
    if let Some((idx, handle)) = find_first(&mut *agent, &config.attempts, deadline) {
        info!("Located table with pattern '{}'", config.attempts[idx].0.css);
        return Ok(handle);
    }

    let (pattern, timeout) = &config.fallback;
    warn!("No specific pattern matched, falling back to '{}'", pattern.css);
    match agent.find_element(pattern, *timeout) {
        Ok(Some(handle)) => Ok(handle),
        Ok(None) => Err(ScrapeError::TableNotFound(format!(
            "no visible element for {} patterns or fallback '{}'",
            config.attempts.len(),
            pattern.css
        ))),
        Err(e) => Err(ScrapeError::TableNotFound(format!(
            "fallback '{}' failed: {}",
            pattern.css, e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    /// Agent that matches only the listed selectors and otherwise sleeps out
    /// the full wait.
    struct ScriptedAgent {
        present: Vec<&'static str>,
        tried: Vec<String>,
    }

    impl ScriptedAgent {
        fn new(present: &[&'static str]) -> Self {
            Self { present: present.to_vec(), tried: Vec::new() }
        }
    }

    impl RenderAgent for ScriptedAgent {
        fn navigate(&mut self, _url: &str) -> Result<(), ScrapeError> {
            Ok(())
        }
        fn find_element(
            &mut self,
            pattern: &SelectorPattern,
            timeout: Duration,
        ) -> Result<Option<ElementHandle>, ScrapeError> {
            self.tried.push(pattern.css.clone());
            match self.present.iter().position(|p| *p == pattern.css) {
                Some(idx) => Ok(Some(ElementHandle::new(idx))),
                None => {
                    thread::sleep(timeout);
                    Ok(None)
                }
            }
        }
        fn markup(&self) -> Result<String, ScrapeError> {
            Ok(String::new())
        }
        fn element_markup(&self, _element: &ElementHandle) -> Result<String, ScrapeError> {
            Ok(String::new())
        }
        fn close(&mut self) {}
    }

    fn config(patterns: &[&str], each: Duration, budget: Duration) -> LocatorConfig {
        LocatorConfig {
            attempts: patterns
                .iter()
                .map(|p| (SelectorPattern::attribute(p), each))
                .collect(),
            budget,
            fallback: (SelectorPattern::any("table"), each),
        }
    }

    #[test]
    fn third_pattern_wins_after_two_timeouts() {
        let each = Duration::from_millis(40);
        let cfg = config(&["table.a", "table.b", "table.c"], each, Duration::from_secs(2));
        let mut agent = ScriptedAgent::new(&["table.c"]);

        let started = Instant::now();
        let handle = locate_table(&mut agent, &cfg).unwrap();
        let spent = started.elapsed();

        assert_eq!(handle, ElementHandle::new(0));
        assert_eq!(agent.tried, ["table.a", "table.b", "table.c"]);
        assert!(spent >= each * 2);
        assert!(spent < each * 3 + Duration::from_millis(200));
    }

    #[test]
    fn budget_stops_before_untried_patterns() {
        let each = Duration::from_millis(50);
        let cfg = config(
            &["table.a", "table.b", "table.c", "table.d"],
            each,
            Duration::from_millis(70),
        );
        let mut agent = ScriptedAgent::new(&["table.d", "table"]);

        let handle = locate_table(&mut agent, &cfg).unwrap();

        // table.b gets only the 20ms left, table.c and table.d are never tried.
        assert_eq!(agent.tried, ["table.a", "table.b", "table"]);
        assert_eq!(handle, ElementHandle::new(1));
    }

    #[test]
    fn falls_back_to_any_table() {
        let each = Duration::from_millis(5);
        let cfg = config(&["table.a"], each, Duration::from_secs(1));
        let mut agent = ScriptedAgent::new(&["table"]);

        assert!(locate_table(&mut agent, &cfg).is_ok());
        assert_eq!(agent.tried, ["table.a", "table"]);
    }

    #[test]
    fn not_found_when_everything_times_out() {
        let each = Duration::from_millis(5);
        let cfg = config(&["table.a", "table.b"], each, Duration::from_secs(1));
        let mut agent = ScriptedAgent::new(&[]);

        let err = locate_table(&mut agent, &cfg).unwrap_err();
        assert!(matches!(err, ScrapeError::TableNotFound(_)));
    }

    #[test]
    fn unrepresentable_budget_means_no_deadline() {
        let each = Duration::from_millis(1);
        let cfg = config(&["table.a", "table.b"], each, Duration::from_secs_f64(1e19));
        let mut agent = ScriptedAgent::new(&["table.b"]);

        let handle = locate_table(&mut agent, &cfg).unwrap();
        assert_eq!(handle, ElementHandle::new(0));
        assert_eq!(agent.tried, ["table.a", "table.b"]);

        let cfg = config(&["table.a"], each, Duration::MAX);
        let mut agent = ScriptedAgent::new(&[]);
        assert!(matches!(locate_table(&mut agent, &cfg), Err(ScrapeError::TableNotFound(_))));
    }

    #[test]
    fn default_list_is_attribute_first() {
        let cfg = LocatorConfig::default();
        assert_eq!(cfg.attempts.len(), 6);
        assert_eq!(cfg.attempts[0].0.css, "table[data-test='historical-prices']");
        assert_eq!(cfg.budget, TABLE_BUDGET);
        assert_eq!(cfg.fallback.0.css, "table");
    }
}
