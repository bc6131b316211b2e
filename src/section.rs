use crate::display::day_title;
use crate::revision::RevisionItem;
use chrono::NaiveDate;
use serde::Serialize;

/// Revisions made on one calendar day (UTC), newest first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySection {
    pub day: NaiveDate,
    pub title: String,
    pub items: Vec<RevisionItem>,
}

impl HistorySection {
    pub fn new(day: NaiveDate) -> Self {
        Self {
            day,
            title: day_title(day),
            items: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Append `item` to the section for its day, or open a new trailing section.
/// Existing sections never move.
pub(crate) fn append_to_sections(sections: &mut Vec<HistorySection>, item: RevisionItem) {
    let day = item.day();
    // Sorted input always lands in the last section, so search from the back.
    match sections.iter_mut().rev().find(|s| s.day == day) {
        Some(section) => section.items.push(item),
        None => {
            let mut section = HistorySection::new(day);
            section.items.push(item);
            sections.push(section);
        }
    }
}
