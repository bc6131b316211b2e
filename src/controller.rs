//! Wires the pager, the selection state machine and the stats loader to a
//! [`HistoryFetcher`], and publishes everything the screen needs to redraw
//! as [`HistoryEvent`]s.

use crate::config::Settings;
use crate::fetcher::{FetchError, HistoryFetcher};
use crate::pager::{FetchTicket, HistoryPager, MergeOutcome, PagerState, Viewport};
use crate::revision::RevisionItem;
use crate::section::HistorySection;
use crate::selection::{
    SelectionError, SelectionEvent, SelectionMode, SelectionStateMachine, ToggleOutcome,
};
use crate::stats::{PageStats, load_page_stats};
use parking_lot::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, info};

/// Messages for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEvent {
    SectionsChanged(Vec<HistorySection>),
    ModeChanged(SelectionMode),
    SelectionChanged {
        selection: Vec<RevisionItem>,
        compare_enabled: bool,
    },
    DeselectAll,
    ShowDiff {
        from: RevisionItem,
        to: RevisionItem,
    },
    FetchFailed(String),
    StatsLoaded(PageStats),
}

impl From<SelectionEvent> for HistoryEvent {
    fn from(event: SelectionEvent) -> Self {
        match event {
            SelectionEvent::ModeChanged(mode) => HistoryEvent::ModeChanged(mode),
            SelectionEvent::SelectionChanged {
                selection,
                compare_enabled,
            } => HistoryEvent::SelectionChanged {
                selection,
                compare_enabled,
            },
            SelectionEvent::DeselectAll => HistoryEvent::DeselectAll,
            SelectionEvent::ShowDiff { from, to } => HistoryEvent::ShowDiff { from, to },
        }
    }
}

/// Revision history of one page.
///
/// All methods take `&self`; share it behind an `Arc` to drive fetches from
/// several tasks. Pager checks and merges happen under one lock that is
/// never held across an await.
pub struct PageHistory<F> {
    page: String,
    fetcher: F,
    pager: Mutex<HistoryPager>,
    selection: Mutex<SelectionStateMachine>,
    sender: Sender<HistoryEvent>,
}

impl<F: HistoryFetcher> PageHistory<F> {
    pub fn new(
        page: impl Into<String>,
        fetcher: F,
        settings: &Settings,
    ) -> (Self, Receiver<HistoryEvent>) {
        let (sender, receiver) = mpsc::channel();
        let history = Self {
            page: page.into(),
            fetcher,
            pager: Mutex::new(HistoryPager::new(settings.lookahead_threshold)),
            selection: Mutex::new(SelectionStateMachine::new(settings.full_selection_policy)),
            sender,
        };
        (history, receiver)
    }

    pub fn page(&self) -> &str {
        &self.page
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn sections(&self) -> Vec<HistorySection> {
        self.pager.lock().sections().to_vec()
    }

    pub fn pager_state(&self) -> PagerState {
        self.pager.lock().state()
    }

    pub fn mode(&self) -> SelectionMode {
        self.selection.lock().mode()
    }

    pub fn compare_enabled(&self) -> bool {
        self.selection.lock().compare_enabled()
    }

    /// Fetch the first page. Returns `None` when a fetch is already running
    /// or the history is complete.
    pub async fn load_initial(&self) -> Result<Option<MergeOutcome>, FetchError> {
        let ticket = match self.pager.lock().begin_fetch() {
            Ok(ticket) => ticket,
            Err(e) => {
                debug!("Initial load skipped: {}", e);
                return Ok(None);
            }
        };
        self.fetch(ticket).await.map(Some)
    }

    /// Fetch the next page if the viewport is close enough to the end of
    /// the content. Returns `None` when no fetch was started.
    pub async fn on_scroll(
        &self,
        viewport: Viewport,
        content_extent: f64,
    ) -> Result<Option<MergeOutcome>, FetchError> {
        let ticket = {
            let mut pager = self.pager.lock();
            if !pager.should_fetch_more(viewport, content_extent) {
                return Ok(None);
            }
            match pager.begin_fetch() {
                Ok(ticket) => ticket,
                Err(_) => return Ok(None),
            }
        };
        self.fetch(ticket).await.map(Some)
    }

    /// Load page statistics and publish them
    pub async fn load_stats(&self) -> PageStats {
        let stats = load_page_stats(&self.fetcher, &self.page).await;
        self.emit(HistoryEvent::StatsLoaded(stats.clone()));
        stats
    }

    pub fn enter_selection_mode(&self) {
        let mut selection = self.selection.lock();
        selection.enter_selection_mode();
        self.forward(selection.take_events());
    }

    pub fn exit_selection_mode(&self) {
        let mut selection = self.selection.lock();
        selection.exit_selection_mode();
        self.forward(selection.take_events());
    }

    /// Toggle a loaded revision in or out of the comparison
    pub fn toggle_select(&self, revision_id: u64) -> Result<ToggleOutcome, SelectionError> {
        let item = self
            .find_revision(revision_id)
            .ok_or(SelectionError::UnknownRevision(revision_id))?;
        let mut selection = self.selection.lock();
        let outcome = selection.toggle_select(item)?;
        self.forward(selection.take_events());
        Ok(outcome)
    }

    /// Publish `ShowDiff` for the two selected revisions.
    ///
    /// # Panics
    ///
    /// Panics when compare is not enabled, see
    /// [`SelectionStateMachine::request_compare`].
    pub fn request_compare(&self) -> (RevisionItem, RevisionItem) {
        let mut selection = self.selection.lock();
        let pair = selection.request_compare();
        self.forward(selection.take_events());
        pair
    }

    /// Tear down: leave selection mode and forget all loaded data. A fetch
    /// still in flight is ignored when it lands.
    pub fn close(&self) {
        self.exit_selection_mode();
        self.pager.lock().reset();
        info!(page = %self.page, "Page history closed");
    }

    async fn fetch(&self, ticket: FetchTicket) -> Result<MergeOutcome, FetchError> {
        let result = self
            .fetcher
            .fetch_revision_batch(&self.page, ticket.cursor())
            .await;

        match result {
            Ok(batch) => {
                let (outcome, sections) = {
                    let mut pager = self.pager.lock();
                    let outcome = pager.merge_result(&ticket, batch);
                    (outcome, pager.sections().to_vec())
                };
                if !outcome.ignored {
                    self.emit(HistoryEvent::SectionsChanged(sections));
                }
                Ok(outcome)
            }
            Err(e) => {
                let applied = self.pager.lock().on_fetch_failure(&ticket, &e);
                if applied {
                    self.emit(HistoryEvent::FetchFailed(e.to_string()));
                }
                Err(e)
            }
        }
    }

    fn find_revision(&self, revision_id: u64) -> Option<RevisionItem> {
        self.pager
            .lock()
            .sections()
            .iter()
            .flat_map(|s| s.items.iter())
            .find(|i| i.revision_id == revision_id)
            .cloned()
    }

    fn forward(&self, events: Vec<SelectionEvent>) {
        for event in events {
            self.emit(event.into());
        }
    }

    fn emit(&self, event: HistoryEvent) {
        // The screen may already be gone
        let _ = self.sender.send(event);
    }
}
