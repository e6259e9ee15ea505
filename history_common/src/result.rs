//! Result type alias shared across the workspace.
//!
//! Defaults the error type to `ScrapeError`, so functions can simply return
//! `Result<T>`.
use crate::error::ScrapeError;

/// Workspace-wide `Result` alias with `ScrapeError` as the default error.
pub type Result<T, E = ScrapeError> = std::result::Result<T, E>;
