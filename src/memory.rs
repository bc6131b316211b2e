//! A [`HistoryFetcher`] that serves a fixed list of revisions.

use crate::constant::DEFAULT_BATCH_SIZE;
use crate::fetcher::{FetchError, HistoryFetcher};
use crate::revision::{PaginationCursor, RevisionBatch, RevisionItem};
use crate::stats::{EditCountKind, EditCounts, EditMetric};
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use tracing::debug;

pub struct InMemoryHistory {
    /// Newest first
    revisions: Vec<RevisionItem>,
    batch_size: usize,
    /// Each page after the first repeats this many revisions from the
    /// previous one
    overlap: usize,
    fail_next: Mutex<Option<FetchError>>,
}

impl InMemoryHistory {
    pub fn new(mut revisions: Vec<RevisionItem>) -> Self {
        revisions.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then(b.revision_id.cmp(&a.revision_id))
        });
        Self {
            revisions,
            batch_size: DEFAULT_BATCH_SIZE,
            overlap: 0,
            fail_next: Mutex::new(None),
        }
    }

    /// Load revisions from a JSON array
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let revisions: Vec<RevisionItem> = serde_json::from_str(json)?;
        Ok(Self::new(revisions))
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = overlap;
        self
    }

    /// Make the next revision fetch fail with `error`
    pub fn fail_next(&self, error: FetchError) {
        *self.fail_next.lock() = Some(error);
    }

    pub fn revisions(&self) -> &[RevisionItem] {
        &self.revisions
    }

    fn page_start(&self, cursor: &PaginationCursor) -> Result<usize, FetchError> {
        match cursor.token() {
            None => Ok(0),
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| FetchError::InvalidResponse(format!("Bad cursor: {}", token))),
        }
    }
}

impl HistoryFetcher for InMemoryHistory {
    async fn fetch_revision_batch(
        &self,
        page: &str,
        cursor: &PaginationCursor,
    ) -> Result<RevisionBatch, FetchError> {
        if let Some(error) = self.fail_next.lock().take() {
            return Err(error);
        }

        let start = self.page_start(cursor)?.min(self.revisions.len());
        let end = (start + self.batch_size).min(self.revisions.len());
        let is_complete = end == self.revisions.len();
        let next = end.saturating_sub(self.overlap).max(start + 1);

        debug!(page, start, end, "Serving revision batch");

        Ok(RevisionBatch {
            items: self.revisions[start..end].to_vec(),
            next_cursor: if is_complete {
                PaginationCursor::start()
            } else {
                PaginationCursor::new(next.to_string())
            },
            is_complete,
        })
    }

    async fn fetch_page_creation_date(&self, page: &str) -> Result<DateTime<Utc>, FetchError> {
        self.revisions
            .last()
            .map(|r| r.timestamp)
            .ok_or_else(|| FetchError::PageNotFound(page.to_string()))
    }

    async fn fetch_edit_counts(
        &self,
        _page: &str,
        kinds: &[EditCountKind],
    ) -> Result<EditCounts, FetchError> {
        let mut counts = EditCounts::default();
        for kind in kinds {
            match kind {
                EditCountKind::Edits => counts.insert(*kind, self.revisions.len() as u64),
                EditCountKind::AnonEdits => counts.insert(
                    *kind,
                    self.revisions.iter().filter(|r| r.is_anon).count() as u64,
                ),
                // Not derivable from revision metadata alone
                EditCountKind::BotEdits | EditCountKind::RevertedEdits => {}
            }
        }
        Ok(counts)
    }

    async fn fetch_edit_metrics(&self, _page: &str) -> Result<Vec<EditMetric>, FetchError> {
        let mut per_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        for revision in &self.revisions {
            *per_day.entry(revision.day()).or_default() += 1;
        }
        Ok(per_day
            .into_iter()
            .map(|(day, edits)| EditMetric { day, edits })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn revisions(count: u64) -> Vec<RevisionItem> {
        (1..=count)
            .map(|id| RevisionItem {
                revision_id: id,
                timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                    + chrono::Duration::hours(id as i64 * 7),
                user: format!("user{}", id),
                is_anon: id % 3 == 0,
                size_delta: id as i64,
                parsed_comment: None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_pages_newest_first() {
        let history = InMemoryHistory::new(revisions(5)).with_batch_size(2);

        let first = history
            .fetch_revision_batch("Example", &PaginationCursor::start())
            .await
            .unwrap();
        let ids: Vec<u64> = first.items.iter().map(|r| r.revision_id).collect();
        assert_eq!(ids, vec![5, 4]);
        assert!(!first.is_complete);

        let second = history
            .fetch_revision_batch("Example", &first.next_cursor)
            .await
            .unwrap();
        let third = history
            .fetch_revision_batch("Example", &second.next_cursor)
            .await
            .unwrap();
        assert_eq!(third.items.len(), 1);
        assert!(third.is_complete);
    }

    #[tokio::test]
    async fn test_overlap_repeats_boundary() {
        let history = InMemoryHistory::new(revisions(4))
            .with_batch_size(2)
            .with_overlap(1);
        let first = history
            .fetch_revision_batch("Example", &PaginationCursor::start())
            .await
            .unwrap();
        let second = history
            .fetch_revision_batch("Example", &first.next_cursor)
            .await
            .unwrap();
        assert_eq!(second.items[0].revision_id, 3);
    }

    #[tokio::test]
    async fn test_fail_next_only_once() {
        let history = InMemoryHistory::new(revisions(2));
        history.fail_next(FetchError::Network("offline".into()));
        let cursor = PaginationCursor::start();
        assert!(history.fetch_revision_batch("Example", &cursor).await.is_err());
        assert!(history.fetch_revision_batch("Example", &cursor).await.is_ok());
    }

    #[tokio::test]
    async fn test_bad_cursor() {
        let history = InMemoryHistory::new(revisions(2));
        let result = history
            .fetch_revision_batch("Example", &PaginationCursor::new("nope"))
            .await;
        assert!(matches!(result, Err(FetchError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_empty_history_has_no_creation_date() {
        let history = InMemoryHistory::new(Vec::new());
        let result = history.fetch_page_creation_date("Missing").await;
        assert_eq!(result, Err(FetchError::PageNotFound("Missing".into())));
    }

    #[test]
    fn test_from_json() {
        let history = InMemoryHistory::from_json(
            r#"[
                {"revision_id": 1, "timestamp": "2024-03-01T10:00:00Z", "user": "A"},
                {"revision_id": 2, "timestamp": "2024-03-02T10:00:00Z", "user": "B"}
            ]"#,
        )
        .unwrap();
        assert_eq!(history.revisions()[0].revision_id, 2);
    }
}
