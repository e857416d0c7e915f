// SPDX-FileCopyrightText: Copyright (C) 2024-2026 tubelist contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use chrono::DateTime;

use tubelist_core::{EntryId, PlaylistEntry};

use crate::prelude::{Action, Message, ModelMutation, MutableModel as _};

use super::{state::FAILED_TO_LOAD_MESSAGE, Effect, Intent, Selection, State, Task, ViewMode};

fn entry(id: &str, title: &str, url: &str, created_secs: i64) -> PlaylistEntry {
    PlaylistEntry {
        id: EntryId::new(id),
        title: title.to_owned(),
        url: url.to_owned(),
        created_at: DateTime::from_timestamp(created_secs, 0).unwrap(),
    }
}

fn fetched_state(entries: Vec<PlaylistEntry>) -> State {
    let mut state = State::default();
    let updated = state.update(Message::Intent(Intent::FetchEntries));
    let Some(Action::DispatchTask(Task::FetchEntries { token })) = updated.next_action else {
        panic!("expected a fetch task");
    };
    state.update(Message::Effect(Effect::EntriesFetched {
        token,
        result: Ok(entries),
    }));
    state
}

#[test]
fn fetch_intent_marks_pending_and_dispatches_task() {
    let mut state = State::default();
    assert_eq!(ViewMode::Loading, state.view_mode());
    let updated = state.update(Message::Intent(Intent::FetchEntries));
    assert_eq!(ModelMutation::MaybeChanged, updated.state_mutation);
    let Some(Action::DispatchTask(Task::FetchEntries { token })) = updated.next_action else {
        panic!("expected a fetch task");
    };
    assert_eq!(1, token);
    assert!(state.remote().entries().is_pending());
}

#[test]
fn fetched_entries_are_ordered_by_creation_time() {
    let state = fetched_state(vec![
        entry("2", "Second", "https://youtu.be/bbbbbb", 20),
        entry("1", "First", "https://youtu.be/aaaaaa", 10),
    ]);
    let titles: Vec<_> = state
        .entries()
        .unwrap()
        .iter()
        .map(|entry| entry.title.as_str())
        .collect();
    assert_eq!(vec!["First", "Second"], titles);
}

#[test]
fn empty_collection_view_mode() {
    let state = fetched_state(vec![]);
    assert_eq!(ViewMode::Empty, state.view_mode());
}

#[test]
fn unselected_non_empty_collection_prompts_for_a_pick() {
    let state = fetched_state(vec![entry("1", "First", "https://youtu.be/abc123", 10)]);
    assert_eq!(ViewMode::PickPrompt, state.view_mode());
}

#[test]
fn select_entry_resolves_video_id() {
    let mut state = fetched_state(vec![entry(
        "1",
        "First",
        "https://www.youtube.com/watch?v=abc123",
        10,
    )]);
    state.update(Message::Intent(Intent::SelectEntry(EntryId::new("1"))));
    let ViewMode::Player(video_id) = state.view_mode() else {
        panic!("expected player view mode");
    };
    assert_eq!("abc123", video_id.as_str());
}

#[test]
fn select_entry_with_unextractable_url_stays_unresolved() {
    let mut state = fetched_state(vec![entry("1", "First", "https://example.com/watch", 10)]);
    state.update(Message::Intent(Intent::SelectEntry(EntryId::new("1"))));
    assert_eq!(
        &Selection::Unresolved {
            entry_id: EntryId::new("1")
        },
        state.selection()
    );
    assert_eq!(ViewMode::PickPrompt, state.view_mode());
}

#[test]
fn select_unknown_entry_is_ignored() {
    let mut state = fetched_state(vec![entry("1", "First", "https://youtu.be/abc123", 10)]);
    state.update(Message::Intent(Intent::SelectEntry(EntryId::new("404"))));
    assert_eq!(&Selection::None, state.selection());
}

#[test]
fn selection_survives_refetch_when_entry_remains() {
    let mut state = fetched_state(vec![entry("1", "First", "https://youtu.be/abc123", 10)]);
    state.update(Message::Intent(Intent::SelectEntry(EntryId::new("1"))));
    let updated = state.update(Message::Intent(Intent::ChangesOccurred));
    let Some(Action::DispatchTask(Task::FetchEntries { token })) = updated.next_action else {
        panic!("expected a fetch task");
    };
    state.update(Message::Effect(Effect::EntriesFetched {
        token,
        result: Ok(vec![
            entry("1", "First", "https://youtu.be/abc123", 10),
            entry("2", "Second", "https://youtu.be/def456", 20),
        ]),
    }));
    assert_eq!(Some(&EntryId::new("1")), state.selection().entry_id());
    assert!(matches!(state.view_mode(), ViewMode::Player(_)));
}

#[test]
fn selection_resets_when_entry_disappears() {
    let mut state = fetched_state(vec![
        entry("1", "First", "https://youtu.be/abc123", 10),
        entry("2", "Second", "https://youtu.be/def456", 20),
    ]);
    state.update(Message::Intent(Intent::SelectEntry(EntryId::new("1"))));
    let updated = state.update(Message::Intent(Intent::ChangesOccurred));
    let Some(Action::DispatchTask(Task::FetchEntries { token })) = updated.next_action else {
        panic!("expected a fetch task");
    };
    state.update(Message::Effect(Effect::EntriesFetched {
        token,
        result: Ok(vec![entry("2", "Second", "https://youtu.be/def456", 20)]),
    }));
    assert_eq!(&Selection::None, state.selection());
    assert_eq!(ViewMode::PickPrompt, state.view_mode());
}

#[test]
fn stale_fetch_completion_is_discarded() {
    let mut state = State::default();
    let first = state.update(Message::Intent(Intent::FetchEntries));
    let Some(Action::DispatchTask(Task::FetchEntries { token: first_token })) = first.next_action
    else {
        panic!("expected a fetch task");
    };
    let second = state.update(Message::Intent(Intent::ChangesOccurred));
    let Some(Action::DispatchTask(Task::FetchEntries { token: second_token })) =
        second.next_action
    else {
        panic!("expected a fetch task");
    };
    // The younger fetch completes first.
    state.update(Message::Effect(Effect::EntriesFetched {
        token: second_token,
        result: Ok(vec![entry("1", "Current", "https://youtu.be/abc123", 10)]),
    }));
    let updated = state.update(Message::Effect(Effect::EntriesFetched {
        token: first_token,
        result: Ok(vec![]),
    }));
    assert_eq!(ModelMutation::Unchanged, updated.state_mutation);
    assert_eq!(1, state.entries().unwrap().len());
}

#[test]
fn failed_fetch_switches_to_failure_view_mode() {
    let mut state = State::default();
    let updated = state.update(Message::Intent(Intent::FetchEntries));
    let Some(Action::DispatchTask(Task::FetchEntries { token })) = updated.next_action else {
        panic!("expected a fetch task");
    };
    state.update(Message::Effect(Effect::EntriesFetched {
        token,
        result: Err(anyhow::anyhow!("connection refused")),
    }));
    assert_eq!(ViewMode::Failed(FAILED_TO_LOAD_MESSAGE), state.view_mode());
}

#[test]
fn successful_refetch_clears_the_failure() {
    let mut state = State::default();
    let updated = state.update(Message::Intent(Intent::FetchEntries));
    let Some(Action::DispatchTask(Task::FetchEntries { token })) = updated.next_action else {
        panic!("expected a fetch task");
    };
    state.update(Message::Effect(Effect::EntriesFetched {
        token,
        result: Err(anyhow::anyhow!("connection refused")),
    }));
    let updated = state.update(Message::Intent(Intent::ChangesOccurred));
    let Some(Action::DispatchTask(Task::FetchEntries { token })) = updated.next_action else {
        panic!("expected a fetch task");
    };
    state.update(Message::Effect(Effect::EntriesFetched {
        token,
        result: Ok(vec![]),
    }));
    assert_eq!(ViewMode::Empty, state.view_mode());
}

#[test]
fn terminating_discards_refetch_intents_and_late_effects() {
    let mut state = fetched_state(vec![entry("1", "First", "https://youtu.be/abc123", 10)]);
    let in_flight = state.update(Message::Intent(Intent::ChangesOccurred));
    let Some(Action::DispatchTask(Task::FetchEntries { token })) = in_flight.next_action else {
        panic!("expected a fetch task");
    };
    state.update(Message::Intent(Intent::Terminate));
    assert!(state.is_terminating());
    let updated = state.update(Message::Intent(Intent::ChangesOccurred));
    assert!(updated.next_action.is_none());
    // A late completion of the in-flight fetch must not mutate the
    // terminated model.
    let updated = state.update(Message::Effect(Effect::EntriesFetched {
        token,
        result: Ok(vec![]),
    }));
    assert_eq!(ModelMutation::Unchanged, updated.state_mutation);
    assert_eq!(1, state.entries().unwrap().len());
}
