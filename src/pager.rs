//! Incremental pagination over a page's revision history.
//!
//! [`HistoryPager`] holds the continuation cursor and the sections built so
//! far. Callers ask [`HistoryPager::should_fetch_more`] on every scroll,
//! bracket each fetch with [`HistoryPager::begin_fetch`] and either
//! [`HistoryPager::merge_result`] or [`HistoryPager::on_fetch_failure`].

use crate::constant::DEFAULT_LOOKAHEAD_THRESHOLD;
use crate::revision::{PaginationCursor, RevisionBatch};
use crate::section::{HistorySection, append_to_sections};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PagerError {
    #[error("A fetch is already in flight")]
    AlreadyFetching,

    #[error("History is already complete")]
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerState {
    Idle,
    Fetching,
    /// The last batch said there is nothing left
    Complete,
}

/// Visible window of the scrolling list, in layout units
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Viewport {
    pub offset: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(offset: f64, height: f64) -> Self {
        Self { offset, height }
    }

    pub fn trailing_edge(&self) -> f64 {
        self.offset + self.height
    }
}

/// Issued by [`HistoryPager::begin_fetch`]; identifies the fetch a result
/// belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    cursor: PaginationCursor,
}

impl FetchTicket {
    /// Cursor the fetch should be issued with
    pub fn cursor(&self) -> &PaginationCursor {
        &self.cursor
    }
}

/// What a merge did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub appended: usize,
    pub duplicates: usize,
    /// The ticket was stale and nothing changed
    pub ignored: bool,
}

pub struct HistoryPager {
    sections: Vec<HistorySection>,
    seen: HashSet<u64>,
    cursor: PaginationCursor,
    state: PagerState,
    generation: u64,
    lookahead_threshold: f64,
}

impl Default for HistoryPager {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKAHEAD_THRESHOLD)
    }
}

impl HistoryPager {
    pub fn new(lookahead_threshold: f64) -> Self {
        Self {
            sections: Vec::new(),
            seen: HashSet::new(),
            cursor: PaginationCursor::start(),
            state: PagerState::Idle,
            generation: 0,
            lookahead_threshold,
        }
    }

    pub fn state(&self) -> PagerState {
        self.state
    }

    pub fn is_fetching(&self) -> bool {
        self.state == PagerState::Fetching
    }

    pub fn is_complete(&self) -> bool {
        self.state == PagerState::Complete
    }

    pub fn cursor(&self) -> &PaginationCursor {
        &self.cursor
    }

    pub fn sections(&self) -> &[HistorySection] {
        &self.sections
    }

    /// Total number of revisions held
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Whether the list is scrolled close enough to its end that the next
    /// batch should be requested.
    pub fn should_fetch_more(&self, viewport: Viewport, content_extent: f64) -> bool {
        if self.state != PagerState::Idle {
            return false;
        }
        viewport.trailing_edge() + self.lookahead_threshold >= content_extent
    }

    /// Enter the fetching state. The returned ticket must be handed back with
    /// the result.
    pub fn begin_fetch(&mut self) -> Result<FetchTicket, PagerError> {
        match self.state {
            PagerState::Fetching => {
                warn!("begin_fetch called while a fetch is already in flight");
                Err(PagerError::AlreadyFetching)
            }
            PagerState::Complete => {
                warn!("begin_fetch called after history completed");
                Err(PagerError::Complete)
            }
            PagerState::Idle => {
                self.state = PagerState::Fetching;
                debug!(
                    generation = self.generation,
                    cursor = ?self.cursor.token(),
                    "Begin history fetch"
                );
                Ok(FetchTicket {
                    generation: self.generation,
                    cursor: self.cursor.clone(),
                })
            }
        }
    }

    /// Fold a fetched batch into the sections.
    ///
    /// Revisions whose id is already held (from an earlier batch or earlier
    /// in this one) are skipped.
    pub fn merge_result(&mut self, ticket: &FetchTicket, batch: RevisionBatch) -> MergeOutcome {
        if !self.accepts(ticket) {
            debug!(
                generation = ticket.generation,
                "Ignoring merge for a superseded fetch"
            );
            return MergeOutcome {
                ignored: true,
                ..Default::default()
            };
        }

        let mut outcome = MergeOutcome::default();
        for item in batch.items {
            if !self.seen.insert(item.revision_id) {
                warn!(
                    revision_id = item.revision_id,
                    "Skipping duplicate revision"
                );
                outcome.duplicates += 1;
                continue;
            }
            append_to_sections(&mut self.sections, item);
            outcome.appended += 1;
        }

        self.cursor = batch.next_cursor;
        self.state = if batch.is_complete {
            info!(revisions = self.seen.len(), "History complete");
            PagerState::Complete
        } else {
            PagerState::Idle
        };

        outcome
    }

    /// Leave the fetching state without touching sections or cursor.
    /// Returns false when the ticket was stale.
    pub fn on_fetch_failure(
        &mut self,
        ticket: &FetchTicket,
        error: &dyn std::error::Error,
    ) -> bool {
        if !self.accepts(ticket) {
            debug!(
                generation = ticket.generation,
                "Ignoring failure for a superseded fetch"
            );
            return false;
        }
        warn!("History fetch failed: {}", error);
        self.state = PagerState::Idle;
        true
    }

    /// Drop everything and start over from the first page. Results for
    /// tickets issued before the reset are ignored.
    pub fn reset(&mut self) {
        self.sections.clear();
        self.seen.clear();
        self.cursor = PaginationCursor::start();
        self.state = PagerState::Idle;
        self.generation += 1;
    }

    fn accepts(&self, ticket: &FetchTicket) -> bool {
        self.state == PagerState::Fetching && ticket.generation == self.generation
    }
}
