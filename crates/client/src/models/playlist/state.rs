// SPDX-FileCopyrightText: Copyright (C) 2024-2026 tubelist contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use tubelist_core::{EntryId, PlaylistEntry, VideoId};

use crate::{
    models::FetchSequence,
    prelude::{Message, ModelUpdated, MutableModel, RemoteData},
};

/// Shown instead of the playlist when fetching the collection failed.
pub const FAILED_TO_LOAD_MESSAGE: &str = "Failed to load playlist.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ControlState {
    #[default]
    Running,
    Terminating,
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

/// The entry currently selected for playback.
///
/// A selected entry with an unextractable video URL is still a valid
/// selection, it just cannot be resolved into an embedded player.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    None,
    Unresolved {
        entry_id: EntryId,
    },
    Resolved {
        entry_id: EntryId,
        video_id: VideoId,
    },
}

impl Selection {
    #[must_use]
    pub fn entry_id(&self) -> Option<&EntryId> {
        match self {
            Self::None => None,
            Self::Unresolved { entry_id } | Self::Resolved { entry_id, .. } => Some(entry_id),
        }
    }
}

/// What the rendering of the playlist should display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode<'a> {
    /// No data has arrived yet.
    Loading,
    /// Fetching the collection failed.
    Failed(&'static str),
    /// Play the selected, resolved entry.
    Player(&'a VideoId),
    /// Entries are available, none is selected.
    PickPrompt,
    /// The collection is empty.
    Empty,
}

#[derive(Debug, Default)]
pub struct State {
    pub(super) control: ControlState,
    pub(super) remote: RemoteState,
    pub(super) selection: Selection,
    pub(super) fetch_sequence: FetchSequence,
    pub(super) last_failure: Option<&'static str>,
}

impl State {
    pub const fn remote(&self) -> &RemoteState {
        &self.remote
    }

    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    pub const fn last_failure(&self) -> Option<&'static str> {
        self.last_failure
    }

    pub fn entries(&self) -> Option<&[PlaylistEntry]> {
        self.remote.entries.get().map(Vec::as_slice)
    }

    /// Derives the view mode from the current state.
    ///
    /// A pending refetch keeps displaying the stale snapshot instead of
    /// falling back to the loading mode.
    #[must_use]
    pub fn view_mode(&self) -> ViewMode<'_> {
        if let Some(message) = self.last_failure {
            return ViewMode::Failed(message);
        }
        let Some(entries) = self.remote.entries.get() else {
            return ViewMode::Loading;
        };
        if let Selection::Resolved { video_id, .. } = &self.selection {
            return ViewMode::Player(video_id);
        }
        if entries.is_empty() {
            ViewMode::Empty
        } else {
            ViewMode::PickPrompt
        }
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
            Ok(entries) => {
                self.last_failure = None;
                self.set_fetched_entries(entries);
            }
            Err(err) => {
                log::warn!("Failed to fetch playlist entries: {err:#}");
                self.last_failure = Some(FAILED_TO_LOAD_MESSAGE);
                self.remote.entries.reset();
            }
        }
        true
    }

    fn set_fetched_entries(&mut self, mut entries: Vec<PlaylistEntry>) {
        // Invariant: entries are displayed in creation order.
        entries.sort_by(|lhs, rhs| lhs.created_at.cmp(&rhs.created_at));
        // Revalidate the selection against the new snapshot. A selected
        // entry that has disappeared remotely resets the selection.
        if let Some(selected_id) = self.selection.entry_id() {
            if !entries.iter().any(|entry| &entry.id == selected_id) {
                log::debug!("Selected entry {selected_id} disappeared");
                self.selection = Selection::None;
            }
        }
        self.remote.entries = RemoteData::ready(entries);
    }

    pub(super) fn select_entry(&mut self, entry_id: EntryId) {
        let Some(entry) = self
            .remote
            .entries
            .get()
            .and_then(|entries| entries.iter().find(|entry| entry.id == entry_id))
        else {
            log::debug!("Cannot select unknown entry {entry_id}");
            return;
        };
        self.selection = match VideoId::extract_from_url(&entry.url) {
            Some(video_id) => Selection::Resolved { entry_id, video_id },
            None => {
                log::debug!(
                    "No video identifier in URL \"{url}\" of entry {entry_id}",
                    url = entry.url
                );
                Selection::Unresolved { entry_id }
            }
        };
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
