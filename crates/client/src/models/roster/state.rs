// SPDX-FileCopyrightText: Copyright (C) 2024-2026 tubelist contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::collections::HashSet;

use tubelist_core::{EntryId, PlaylistEntry, Submission};

use crate::{
    models::FetchSequence,
    prelude::{Message, ModelUpdated, MutableModel, RemoteData},
};

/// Shown instead of the roster when fetching the collection failed.
pub const FAILED_TO_LOAD_MESSAGE: &str = "Failed to load videos for management.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ControlState {
    #[default]
    Running,
    Terminating,
}

/// Outcome of the last add or remove attempt.
///
/// The messages are deliberately static. Raw error details never reach
/// the user, they only end up in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Invalid,
    Added,
    AddFailed,
    RemoveFailed,
}

impl Feedback {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Invalid => "Title and URL are required.",
            Self::Added => "Video added successfully!",
            Self::AddFailed => "Failed to add video.",
            Self::RemoveFailed => "Failed to remove video.",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RemoteState {
    pub(super) entries: RemoteData<Vec<PlaylistEntry>>,
}

impl RemoteState {
    pub const fn entries(&self) -> &RemoteData<Vec<PlaylistEntry>> {
        &self.entries
    }
}

#[derive(Debug, Default)]
pub struct State {
    pub(super) control: ControlState,
    pub(super) remote: RemoteState,
    pub(super) fetch_sequence: FetchSequence,
    pub(super) last_failure: Option<&'static str>,
    pub(super) feedback: Option<Feedback>,
    pub(super) pending_submission: Option<Submission>,
    pub(super) retained_input: Option<Submission>,
    pub(super) pending_removals: HashSet<EntryId>,
}

impl State {
    pub const fn remote(&self) -> &RemoteState {
        &self.remote
    }

    pub const fn last_failure(&self) -> Option<&'static str> {
        self.last_failure
    }

    pub const fn feedback(&self) -> Option<Feedback> {
        self.feedback
    }

    pub fn entries(&self) -> Option<&[PlaylistEntry]> {
        self.remote.entries.get().map(Vec::as_slice)
    }

    /// `true` while an add request is in flight.
    #[must_use]
    pub fn is_submission_pending(&self) -> bool {
        self.pending_submission.is_some()
    }

    /// `true` while a remove request for this entry is in flight.
    #[must_use]
    pub fn is_removal_pending(&self, entry_id: &EntryId) -> bool {
        self.pending_removals.contains(entry_id)
    }

    /// The rejected or failed input, to be restored into the form.
    #[must_use]
    pub const fn retained_input(&self) -> Option<&Submission> {
        self.retained_input.as_ref()
    }

    pub(super) fn begin_fetch(&mut self) -> u64 {
        self.remote.entries.set_pending();
        self.fetch_sequence.issue_next()
    }

    /// Applies a completed fetch unless it has become stale.
    ///
    /// Returns `false` if the completion has been discarded.
    pub(super) fn apply_fetched_entries(
        &mut self,
        token: u64,
        result: anyhow::Result<Vec<PlaylistEntry>>,
    ) -> bool {
        if !self.fetch_sequence.try_apply(token) {
            log::debug!("Discarding stale fetch completion with token {token}");
            return false;
        }
        match result {
            Ok(mut entries) => {
                // Invariant: entries are displayed in creation order.
                entries.sort_by(|lhs, rhs| lhs.created_at.cmp(&rhs.created_at));
                self.last_failure = None;
                self.remote.entries = RemoteData::ready(entries);
            }
            Err(err) => {
                log::warn!("Failed to fetch roster entries: {err:#}");
                self.last_failure = Some(FAILED_TO_LOAD_MESSAGE);
                self.remote.entries.reset();
            }
        }
        true
    }

    pub(super) fn reject_submission(&mut self, submission: Submission) {
        self.feedback = Some(Feedback::Invalid);
        self.retained_input = Some(submission);
    }

    pub(super) fn begin_submission(&mut self, submission: Submission) {
        debug_assert!(self.pending_submission.is_none());
        self.feedback = None;
        self.retained_input = None;
        self.pending_submission = Some(submission);
    }

    pub(super) fn finish_submission(&mut self, result: anyhow::Result<()>) {
        let pending_submission = self.pending_submission.take();
        debug_assert!(pending_submission.is_some());
        match result {
            Ok(()) => {
                self.feedback = Some(Feedback::Added);
            }
            Err(err) => {
                log::warn!("Failed to submit entry: {err:#}");
                self.feedback = Some(Feedback::AddFailed);
                // Restore the input so the user can try again.
                self.retained_input = pending_submission;
            }
        }
    }

    /// Returns `false` if a removal for this entry is already pending.
    ///
    /// A rejected duplicate must not mutate any observable state.
    pub(super) fn begin_removal(&mut self, entry_id: EntryId) -> bool {
        if self.pending_removals.contains(&entry_id) {
            return false;
        }
        self.feedback = None;
        self.pending_removals.insert(entry_id)
    }

    pub(super) fn finish_removal(&mut self, entry_id: &EntryId, result: anyhow::Result<()>) {
        let removal_was_pending = self.pending_removals.remove(entry_id);
        debug_assert!(removal_was_pending);
        if let Err(err) = result {
            log::warn!("Failed to discard entry {entry_id}: {err:#}");
            self.feedback = Some(Feedback::RemoveFailed);
        }
    }
}

impl MutableModel for State {
    type Intent = super::Intent;
    type Effect = super::Effect;
    type Task = super::Task;

    fn update(
        &mut self,
        message: Message<Self::Intent, Self::Effect>,
    ) -> ModelUpdated<Self::Effect, Self::Task> {
        match message {
            Message::Intent(intent) => intent.apply_on(self),
            Message::Effect(effect) => effect.apply_on(self),
        }
    }

    fn is_terminating(&self) -> bool {
        self.control == ControlState::Terminating
    }
}
