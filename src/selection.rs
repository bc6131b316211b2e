//! Browse / compare-select modes for the revision list.
//!
//! The state machine knows nothing about widgets. Presentation code reads
//! [`SelectionStateMachine::mode`] and drains [`SelectionEvent`]s after each
//! call to decide what to enable, show, or deselect.

use crate::constant::MAX_SELECTION;
use crate::revision::RevisionItem;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Not in compare-selection mode")]
    NotSelecting,

    #[error("Comparison needs two revisions, {0} selected")]
    IncompleteSelection(usize),

    #[error("Revision {0} is not loaded")]
    UnknownRevision(u64),
}

/// What a tap on a third revision does while two are already selected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FullSelectionPolicy {
    /// Leave the selection as it is
    #[default]
    Ignore,
    /// Drop the earliest pick and add the new one
    EvictOldest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    Browsing,
    Selecting,
}

/// Which of the two comparison slots a revision fills
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSlot {
    First,
    Second,
}

/// Up to two revisions, in the order they were picked
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionSet {
    items: Vec<RevisionItem>,
}

impl SelectionSet {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() == MAX_SELECTION
    }

    pub fn contains(&self, revision_id: u64) -> bool {
        self.position(revision_id).is_some()
    }

    pub fn items(&self) -> &[RevisionItem] {
        &self.items
    }

    pub fn slot_of(&self, revision_id: u64) -> Option<SelectionSlot> {
        match self.position(revision_id)? {
            0 => Some(SelectionSlot::First),
            _ => Some(SelectionSlot::Second),
        }
    }

    fn position(&self, revision_id: u64) -> Option<usize> {
        self.items.iter().position(|i| i.revision_id == revision_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    ModeChanged(SelectionMode),
    SelectionChanged {
        selection: Vec<RevisionItem>,
        compare_enabled: bool,
    },
    /// Every row should drop its selected look
    DeselectAll,
    ShowDiff {
        from: RevisionItem,
        to: RevisionItem,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added(SelectionSlot),
    Removed,
    /// Selection was full; the oldest pick made room
    Evicted { evicted: u64 },
    /// Selection was full and the tap was ignored
    RejectedFull,
}

#[derive(Debug, Clone, PartialEq)]
enum SelectionState {
    Browsing,
    Selecting(SelectionSet),
}

pub struct SelectionStateMachine {
    state: SelectionState,
    policy: FullSelectionPolicy,
    events: Vec<SelectionEvent>,
}

impl Default for SelectionStateMachine {
    fn default() -> Self {
        Self::new(FullSelectionPolicy::default())
    }
}

impl SelectionStateMachine {
    pub fn new(policy: FullSelectionPolicy) -> Self {
        Self {
            state: SelectionState::Browsing,
            policy,
            events: Vec::new(),
        }
    }

    pub fn mode(&self) -> SelectionMode {
        match self.state {
            SelectionState::Browsing => SelectionMode::Browsing,
            SelectionState::Selecting(_) => SelectionMode::Selecting,
        }
    }

    /// Current picks; `None` while browsing
    pub fn selection(&self) -> Option<&SelectionSet> {
        match &self.state {
            SelectionState::Browsing => None,
            SelectionState::Selecting(set) => Some(set),
        }
    }

    pub fn compare_enabled(&self) -> bool {
        self.selection().is_some_and(SelectionSet::is_full)
    }

    pub fn slot_of(&self, revision_id: u64) -> Option<SelectionSlot> {
        self.selection()?.slot_of(revision_id)
    }

    pub fn enter_selection_mode(&mut self) {
        if self.mode() == SelectionMode::Selecting {
            debug!("Already in compare-selection mode");
            return;
        }
        info!("Enter compare-selection mode");
        self.state = SelectionState::Selecting(SelectionSet::default());
        self.events
            .push(SelectionEvent::ModeChanged(SelectionMode::Selecting));
        self.push_selection_changed();
    }

    /// Back to browsing with nothing selected. No-op while browsing.
    pub fn exit_selection_mode(&mut self) {
        if self.mode() == SelectionMode::Browsing {
            return;
        }
        info!("Exit compare-selection mode");
        self.state = SelectionState::Browsing;
        self.events.push(SelectionEvent::DeselectAll);
        self.events
            .push(SelectionEvent::ModeChanged(SelectionMode::Browsing));
    }

    pub fn toggle_select(&mut self, item: RevisionItem) -> Result<ToggleOutcome, SelectionError> {
        let policy = self.policy;
        let SelectionState::Selecting(set) = &mut self.state else {
            return Err(SelectionError::NotSelecting);
        };

        let outcome = if let Some(index) = set.position(item.revision_id) {
            set.items.remove(index);
            ToggleOutcome::Removed
        } else if !set.is_full() {
            set.items.push(item);
            match set.items.len() {
                1 => ToggleOutcome::Added(SelectionSlot::First),
                _ => ToggleOutcome::Added(SelectionSlot::Second),
            }
        } else {
            match policy {
                FullSelectionPolicy::Ignore => {
                    debug!(
                        revision_id = item.revision_id,
                        "Selection full, ignoring tap"
                    );
                    return Ok(ToggleOutcome::RejectedFull);
                }
                FullSelectionPolicy::EvictOldest => {
                    let evicted = set.items.remove(0).revision_id;
                    set.items.push(item);
                    ToggleOutcome::Evicted { evicted }
                }
            }
        };

        self.push_selection_changed();
        Ok(outcome)
    }

    /// Hand the two picked revisions, in pick order, to the diff view.
    ///
    /// # Panics
    ///
    /// Panics unless in compare-selection mode with exactly two revisions
    /// selected. The compare action must only be enabled when
    /// [`Self::compare_enabled`] is true.
    pub fn request_compare(&mut self) -> (RevisionItem, RevisionItem) {
        match self.try_request_compare() {
            Ok(pair) => pair,
            Err(e) => panic!("request_compare called in an invalid state: {}", e),
        }
    }

    pub fn try_request_compare(&mut self) -> Result<(RevisionItem, RevisionItem), SelectionError> {
        let SelectionState::Selecting(set) = &self.state else {
            return Err(SelectionError::NotSelecting);
        };
        let [from, to] = set.items.as_slice() else {
            return Err(SelectionError::IncompleteSelection(set.len()));
        };
        let (from, to) = (from.clone(), to.clone());

        info!(
            from = from.revision_id,
            to = to.revision_id,
            "Compare revisions"
        );
        self.events.push(SelectionEvent::ShowDiff {
            from: from.clone(),
            to: to.clone(),
        });
        Ok((from, to))
    }

    /// Events produced since the last call
    pub fn take_events(&mut self) -> Vec<SelectionEvent> {
        std::mem::take(&mut self.events)
    }

    fn push_selection_changed(&mut self) {
        if let SelectionState::Selecting(set) = &self.state {
            self.events.push(SelectionEvent::SelectionChanged {
                selection: set.items.clone(),
                compare_enabled: set.is_full(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn rev(id: u64) -> RevisionItem {
        RevisionItem {
            revision_id: id,
            timestamp: Utc.with_ymd_and_hms(2024, 3, 10, 12, id as u32, 0).unwrap(),
            user: format!("user{}", id),
            is_anon: false,
            size_delta: 0,
            parsed_comment: None,
        }
    }

    fn selected_ids(machine: &SelectionStateMachine) -> Vec<u64> {
        machine
            .selection()
            .map(|s| s.items().iter().map(|i| i.revision_id).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_compare_scenario() {
        let mut machine = SelectionStateMachine::default();
        machine.enter_selection_mode();
        assert_eq!(
            machine.toggle_select(rev(1)),
            Ok(ToggleOutcome::Added(SelectionSlot::First))
        );
        assert!(!machine.compare_enabled());
        assert_eq!(
            machine.toggle_select(rev(2)),
            Ok(ToggleOutcome::Added(SelectionSlot::Second))
        );
        assert!(machine.compare_enabled());

        let (from, to) = machine.request_compare();
        assert_eq!((from.revision_id, to.revision_id), (1, 2));
        assert!(machine.take_events().contains(&SelectionEvent::ShowDiff {
            from: rev(1),
            to: rev(2),
        }));

        assert_eq!(machine.toggle_select(rev(1)), Ok(ToggleOutcome::Removed));
        assert_eq!(selected_ids(&machine), vec![2]);
        assert_eq!(machine.slot_of(2), Some(SelectionSlot::First));
        assert!(!machine.compare_enabled());
    }

    #[test]
    fn test_third_tap_ignored() {
        let mut machine = SelectionStateMachine::new(FullSelectionPolicy::Ignore);
        machine.enter_selection_mode();
        machine.toggle_select(rev(1)).unwrap();
        machine.toggle_select(rev(2)).unwrap();
        machine.take_events();

        assert_eq!(machine.toggle_select(rev(3)), Ok(ToggleOutcome::RejectedFull));
        assert_eq!(selected_ids(&machine), vec![1, 2]);
        assert!(machine.take_events().is_empty());
    }

    #[test]
    fn test_third_tap_evicts_oldest() {
        let mut machine = SelectionStateMachine::new(FullSelectionPolicy::EvictOldest);
        machine.enter_selection_mode();
        machine.toggle_select(rev(1)).unwrap();
        machine.toggle_select(rev(2)).unwrap();

        assert_eq!(
            machine.toggle_select(rev(3)),
            Ok(ToggleOutcome::Evicted { evicted: 1 })
        );
        assert_eq!(selected_ids(&machine), vec![2, 3]);
        assert!(machine.compare_enabled());
    }

    #[test]
    fn test_selection_never_exceeds_two() {
        for policy in [FullSelectionPolicy::Ignore, FullSelectionPolicy::EvictOldest] {
            let mut machine = SelectionStateMachine::new(policy);
            machine.enter_selection_mode();
            for id in [1, 2, 3, 4, 2, 5, 6, 1, 7] {
                let _ = machine.toggle_select(rev(id));
                assert!(machine.selection().unwrap().len() <= 2);
            }
        }
    }

    #[test]
    fn test_exit_clears_selection() {
        let mut machine = SelectionStateMachine::default();
        for picks in [vec![], vec![1], vec![1, 2]] {
            machine.enter_selection_mode();
            for id in picks {
                machine.toggle_select(rev(id)).unwrap();
            }
            machine.take_events();

            machine.exit_selection_mode();
            assert_eq!(machine.mode(), SelectionMode::Browsing);
            assert!(machine.selection().is_none());
            assert_eq!(
                machine.take_events(),
                vec![
                    SelectionEvent::DeselectAll,
                    SelectionEvent::ModeChanged(SelectionMode::Browsing)
                ]
            );

            machine.enter_selection_mode();
            assert!(machine.selection().unwrap().is_empty());
            machine.exit_selection_mode();
        }
    }

    #[test]
    fn test_exit_while_browsing_is_noop() {
        let mut machine = SelectionStateMachine::default();
        machine.exit_selection_mode();
        assert!(machine.take_events().is_empty());
    }

    #[test]
    fn test_enter_emits_events() {
        let mut machine = SelectionStateMachine::default();
        machine.enter_selection_mode();
        machine.enter_selection_mode();
        assert_eq!(
            machine.take_events(),
            vec![
                SelectionEvent::ModeChanged(SelectionMode::Selecting),
                SelectionEvent::SelectionChanged {
                    selection: vec![],
                    compare_enabled: false,
                },
            ]
        );
    }

    #[test]
    fn test_toggle_while_browsing() {
        let mut machine = SelectionStateMachine::default();
        assert_eq!(
            machine.toggle_select(rev(1)),
            Err(SelectionError::NotSelecting)
        );
    }

    #[test]
    fn test_try_request_compare_errors() {
        let mut machine = SelectionStateMachine::default();
        assert_eq!(
            machine.try_request_compare(),
            Err(SelectionError::NotSelecting)
        );
        machine.enter_selection_mode();
        machine.toggle_select(rev(1)).unwrap();
        assert_eq!(
            machine.try_request_compare(),
            Err(SelectionError::IncompleteSelection(1))
        );
    }

    #[test]
    #[should_panic(expected = "request_compare called in an invalid state")]
    fn test_request_compare_with_one_selection_panics() {
        let mut machine = SelectionStateMachine::default();
        machine.enter_selection_mode();
        machine.toggle_select(rev(1)).unwrap();
        machine.request_compare();
    }
}
