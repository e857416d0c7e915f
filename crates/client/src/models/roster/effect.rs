// SPDX-FileCopyrightText: Copyright (C) 2024-2026 tubelist contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use tubelist_core::{EntryId, PlaylistEntry};

use crate::prelude::MutableModel as _;

use super::{State, StateUpdated};

#[derive(Debug)]
pub enum Effect {
    EntriesFetched {
        token: u64,
        result: anyhow::Result<Vec<PlaylistEntry>>,
    },
    SubmissionFinished {
        result: anyhow::Result<()>,
    },
    RemovalFinished {
        entry_id: EntryId,
        result: anyhow::Result<()>,
    },
}

impl Effect {
    pub fn apply_on(self, state: &mut State) -> StateUpdated {
        log::trace!("Applying effect {self:?} on {state:?}");
        if state.is_terminating() {
            // No mutation after teardown
            log::debug!("Discarding effect while terminating: {self:?}");
            return StateUpdated::unchanged(None);
        }
        match self {
            Self::EntriesFetched { token, result } => {
                if state.apply_fetched_entries(token, result) {
                    StateUpdated::maybe_changed(None)
                } else {
                    StateUpdated::unchanged(None)
                }
            }
            Self::SubmissionFinished { result } => {
                state.finish_submission(result);
                StateUpdated::maybe_changed(None)
            }
            Self::RemovalFinished { entry_id, result } => {
                state.finish_removal(&entry_id, result);
                StateUpdated::maybe_changed(None)
            }
        }
    }
}
