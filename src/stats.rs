//! Page statistics shown above the revision list.

use crate::fetcher::{FetchError, HistoryFetcher};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditCountKind {
    Edits,
    AnonEdits,
    BotEdits,
    RevertedEdits,
}

impl EditCountKind {
    pub const ALL: [EditCountKind; 4] = [
        EditCountKind::Edits,
        EditCountKind::AnonEdits,
        EditCountKind::BotEdits,
        EditCountKind::RevertedEdits,
    ];
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditCounts(BTreeMap<EditCountKind, u64>);

impl EditCounts {
    pub fn get(&self, kind: EditCountKind) -> Option<u64> {
        self.0.get(&kind).copied()
    }

    pub fn insert(&mut self, kind: EditCountKind, count: u64) {
        self.0.insert(kind, count);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(EditCountKind, u64)> for EditCounts {
    fn from_iter<I: IntoIterator<Item = (EditCountKind, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Edits made on one day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditMetric {
    pub day: NaiveDate,
    pub edits: u64,
}

/// Headline numbers: when the page was created and how often it was edited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSummary {
    pub first_edit_date: DateTime<Utc>,
    pub total_edits: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageStats {
    /// Missing when either the creation date or the total count failed
    pub summary: Option<StatsSummary>,
    pub edit_counts: EditCounts,
    pub timeseries: Vec<EditMetric>,
}

/// Load every statistic for `page`.
///
/// The total edit count is only requested once the creation date is known.
/// The grouped counts and the timeseries load alongside that chain. A failed
/// request leaves its part empty without affecting the others.
pub async fn load_page_stats<F: HistoryFetcher>(fetcher: &F, page: &str) -> PageStats {
    let summary = async {
        let first_edit_date = fetcher.fetch_page_creation_date(page).await?;
        let counts = fetcher
            .fetch_edit_counts(page, &[EditCountKind::Edits])
            .await?;
        Ok::<_, FetchError>(counts.get(EditCountKind::Edits).map(|total_edits| {
            StatsSummary {
                first_edit_date,
                total_edits,
            }
        }))
    };

    let (summary, edit_counts, timeseries) = futures::join!(
        summary,
        fetcher.fetch_edit_counts(page, &EditCountKind::ALL),
        fetcher.fetch_edit_metrics(page)
    );

    let summary = summary.unwrap_or_else(|e| {
        error!("Failed to load page summary for {}: {}", page, e);
        None
    });
    let edit_counts = edit_counts.unwrap_or_else(|e| {
        error!("Failed to load edit counts for {}: {}", page, e);
        EditCounts::default()
    });
    let timeseries = timeseries.unwrap_or_else(|e| {
        error!("Failed to load edit metrics for {}: {}", page, e);
        Vec::new()
    });

    debug!(
        page,
        has_summary = summary.is_some(),
        metrics = timeseries.len(),
        "Loaded page stats"
    );

    PageStats {
        summary,
        edit_counts,
        timeseries,
    }
}
