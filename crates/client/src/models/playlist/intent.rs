// SPDX-FileCopyrightText: Copyright (C) 2024-2026 tubelist contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use tubelist_core::EntryId;

use crate::prelude::MutableModel as _;

use super::{Action, ControlState, State, StateUpdated, Task};

#[derive(Debug)]
pub enum Intent {
    /// Fetch the collection for the first time.
    FetchEntries,
    /// A change notification arrived, refetch the collection.
    ChangesOccurred,
    /// Select an entry for playback. Purely local, no network round
    /// trip.
    SelectEntry(EntryId),
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
            Self::SelectEntry(entry_id) => {
                state.select_entry(entry_id);
                StateUpdated::maybe_changed(None)
            }
            Self::Terminate => {
                state.control = ControlState::Terminating;
                StateUpdated::maybe_changed(None)
            }
        }
    }
}
