//! Page History library
//!
//! UI-agnostic core of a revision-history screen: incremental pagination
//! into day sections, a two-revision compare mode and page statistics.

pub mod config;
pub mod constant;
pub mod controller;
pub mod display;
pub mod fetcher;
pub mod memory;
pub mod pager;
pub mod revision;
pub mod section;
pub mod selection;
pub mod stats;

pub use controller::{HistoryEvent, PageHistory};
pub use fetcher::{FetchError, HistoryFetcher};
pub use pager::{HistoryPager, Viewport};
pub use revision::{PaginationCursor, RevisionBatch, RevisionItem};
pub use section::HistorySection;
pub use selection::{SelectionMode, SelectionStateMachine};
