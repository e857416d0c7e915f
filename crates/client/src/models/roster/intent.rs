// SPDX-FileCopyrightText: Copyright (C) 2024-2026 tubelist contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use tubelist_core::{EntryId, Submission};

use crate::prelude::MutableModel as _;

use super::{Action, ControlState, State, StateUpdated, Task};

#[derive(Debug)]
pub enum Intent {
    /// Fetch the collection for the first time.
    FetchEntries,
    /// A change notification arrived, refetch the collection.
    ChangesOccurred,
    /// Add a new entry to the collection.
    AddEntry(Submission),
    /// Remove an entry from the collection.
    RemoveEntry(EntryId),
    /// Tear down the view model.
    Terminate,
}

impl Intent {
    pub fn apply_on(self, state: &mut State) -> StateUpdated {
        log::trace!("Applying intent {self:?} on {state:?}");
        if state.is_terminating() && !matches!(self, Self::Terminate) {
            log::debug!("Discarding intent while terminating: {self:?}");
            return StateUpdated::unchanged(None);
        }
        match self {
            Self::FetchEntries | Self::ChangesOccurred => {
                let token = state.begin_fetch();
                StateUpdated::maybe_changed(Action::dispatch_task(Task::FetchEntries { token }))
            }
            Self::AddEntry(submission) => {
                if state.is_submission_pending() {
                    log::debug!("Rejecting concurrent submission: {submission:?}");
                    return StateUpdated::unchanged(None);
                }
                // Validate before any network round trip.
                if let Err(err) = submission.validate() {
                    log::debug!("Rejecting invalid submission: {err}");
                    state.reject_submission(submission);
                    return StateUpdated::maybe_changed(None);
                }
                state.begin_submission(submission.clone());
                StateUpdated::maybe_changed(Action::dispatch_task(Task::SubmitEntry {
                    submission,
                }))
            }
            Self::RemoveEntry(entry_id) => {
                if !state.begin_removal(entry_id.clone()) {
                    log::debug!("Rejecting concurrent removal of entry {entry_id}");
                    return StateUpdated::unchanged(None);
                }
                StateUpdated::maybe_changed(Action::dispatch_task(Task::DiscardEntry {
                    entry_id,
                }))
            }
            Self::Terminate => {
                state.control = ControlState::Terminating;
                StateUpdated::maybe_changed(None)
            }
        }
    }
}
