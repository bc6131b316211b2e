//! The fetch service the history core pulls data through.
//!
//! Transport is left to implementors; see [`crate::memory::InMemoryHistory`]
//! for the in-process one.

use crate::revision::{PaginationCursor, RevisionBatch};
use crate::stats::{EditCountKind, EditCounts, EditMetric};
use chrono::{DateTime, Utc};
use std::future::Future;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Fetch cancelled")]
    Cancelled,
}

/// Source of revision history and page statistics.
///
/// Futures must be `Send` so callers can drive them on any executor.
pub trait HistoryFetcher: Send + Sync {
    /// One page of revisions, newest first, starting at `cursor`
    fn fetch_revision_batch(
        &self,
        page: &str,
        cursor: &PaginationCursor,
    ) -> impl Future<Output = Result<RevisionBatch, FetchError>> + Send;

    /// Timestamp of the page's first revision
    fn fetch_page_creation_date(
        &self,
        page: &str,
    ) -> impl Future<Output = Result<DateTime<Utc>, FetchError>> + Send;

    /// Edit counts for the requested kinds. Kinds the service cannot count
    /// are left out of the result.
    fn fetch_edit_counts(
        &self,
        page: &str,
        kinds: &[EditCountKind],
    ) -> impl Future<Output = Result<EditCounts, FetchError>> + Send;

    /// Edits per day
    fn fetch_edit_metrics(
        &self,
        page: &str,
    ) -> impl Future<Output = Result<Vec<EditMetric>, FetchError>> + Send;
}
