// SPDX-FileCopyrightText: Copyright (C) 2024-2026 tubelist contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

///////////////////////////////////////////////////////////////////////

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use chrono::DateTime;
use tokio::sync::mpsc;

use tubelist_core::{EntryId, PlaylistEntry, Submission, VideoId};

use crate::{
    models::{playlist, roster},
    prelude::{message_channel, message_loop, send_message, Environment, Message},
    webapi::{emit_change_intents, ChangeEvent, ChangeSubscription, EntryGateway},
};

/// Store double that mimics the eventual consistency of the hosted
/// store: mutations only become visible through a change notification
/// and the subsequent refetch.
#[derive(Default)]
struct InMemoryGateway {
    entries: Mutex<Vec<PlaylistEntry>>,
    next_id: AtomicUsize,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<ChangeEvent>>>,
    fail_fetch: AtomicBool,
}

impl InMemoryGateway {
    fn seeded(titles_and_urls: &[(&str, &str)]) -> Self {
        let gateway = Self::default();
        for (title, url) in titles_and_urls {
            gateway.insert_entry(title, url);
        }
        gateway
    }

    fn insert_entry(&self, title: &str, url: &str) -> EntryId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let entry_id = EntryId::new(id.to_string());
        let entry = PlaylistEntry {
            id: entry_id.clone(),
            title: title.to_owned(),
            url: url.to_owned(),
            created_at: DateTime::from_timestamp(id as i64, 0).unwrap(),
        };
        self.entries.lock().unwrap().push(entry);
        entry_id
    }

    fn notify(&self, event: ChangeEvent) {
        self.subscribers
            .lock()
            .unwrap()
            .retain(|subscriber| subscriber.send(event).is_ok());
    }
}

#[async_trait]
impl EntryGateway for InMemoryGateway {
    async fn fetch_all_entries(&self) -> anyhow::Result<Vec<PlaylistEntry>> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            anyhow::bail!("store unreachable");
        }
        Ok(self.entries.lock().unwrap().clone())
    }

    async fn submit_entry(&self, submission: Submission) -> anyhow::Result<()> {
        submission.validate()?;
        self.insert_entry(&submission.title, &submission.url);
        self.notify(ChangeEvent::Insert);
        Ok(())
    }

    async fn discard_entry(&self, entry_id: &EntryId) -> anyhow::Result<()> {
        self.entries
            .lock()
            .unwrap()
            .retain(|entry| &entry.id != entry_id);
        self.notify(ChangeEvent::Delete);
        Ok(())
    }

    async fn subscribe_changes(&self) -> anyhow::Result<ChangeSubscription> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        self.subscribers.lock().unwrap().push(event_tx);
        let reader = tokio::spawn(async {});
        Ok(ChangeSubscription::new(event_rx, reader))
    }
}

#[tokio::test]
async fn playlist_terminates_without_any_activity() {
    let shared_env = Arc::new(Environment::new(Arc::new(InMemoryGateway::default())));
    let (message_tx, message_rx) = message_channel();
    send_message(&message_tx, Message::Intent(playlist::Intent::Terminate));
    let state = message_loop(
        shared_env,
        (message_tx, message_rx),
        playlist::State::default(),
        Box::new(|_: &playlist::State| None),
    )
    .await;
    assert!(matches!(state.view_mode(), playlist::ViewMode::Loading));
}

#[tokio::test]
async fn playlist_fetches_selects_and_plays() {
    let gateway = Arc::new(InMemoryGateway::seeded(&[
        ("Song A", "https://www.youtube.com/watch?v=abc123"),
        ("Song B", "https://youtu.be/def456"),
    ]));
    let shared_env = Arc::new(Environment::new(gateway));
    let (message_tx, message_rx) = message_channel();
    send_message(&message_tx, Message::Intent(playlist::Intent::FetchEntries));
    let mut selection_submitted = false;
    let mut termination_submitted = false;
    let state = message_loop(
        shared_env,
        (message_tx, message_rx),
        playlist::State::default(),
        Box::new(move |state: &playlist::State| {
            if !selection_submitted {
                if let Some(entries) = state.entries() {
                    selection_submitted = true;
                    return Some(playlist::Intent::SelectEntry(entries[0].id.clone()));
                }
            }
            if matches!(state.view_mode(), playlist::ViewMode::Player(_))
                && !termination_submitted
            {
                termination_submitted = true;
                return Some(playlist::Intent::Terminate);
            }
            None
        }),
    )
    .await;
    let playlist::ViewMode::Player(video_id) = state.view_mode() else {
        panic!("expected player view mode");
    };
    assert_eq!(&VideoId::extract_from_url("https://youtu.be/abc123").unwrap(), video_id);
}

#[tokio::test]
async fn playlist_reports_failure_with_static_message() {
    let gateway = Arc::new(InMemoryGateway::default());
    gateway.fail_fetch.store(true, Ordering::SeqCst);
    let shared_env = Arc::new(Environment::new(gateway));
    let (message_tx, message_rx) = message_channel();
    send_message(&message_tx, Message::Intent(playlist::Intent::FetchEntries));
    let mut termination_submitted = false;
    let state = message_loop(
        shared_env,
        (message_tx, message_rx),
        playlist::State::default(),
        Box::new(move |state: &playlist::State| {
            if state.last_failure().is_some() && !termination_submitted {
                termination_submitted = true;
                return Some(playlist::Intent::Terminate);
            }
            None
        }),
    )
    .await;
    assert_eq!(
        playlist::ViewMode::Failed("Failed to load playlist."),
        state.view_mode()
    );
}

#[tokio::test]
async fn playlist_refetches_on_change_notifications() {
    let gateway = Arc::new(InMemoryGateway::seeded(&[(
        "Song A",
        "https://youtu.be/abc123",
    )]));
    let shared_env = Arc::new(Environment::new(Arc::clone(&gateway) as _));
    let (message_tx, message_rx) = message_channel();
    let subscription = gateway.subscribe_changes().await.unwrap();
    tokio::spawn(emit_change_intents(subscription, message_tx.clone(), |_| {
        playlist::Intent::ChangesOccurred
    }));
    send_message(&message_tx, Message::Intent(playlist::Intent::FetchEntries));
    let mut mutation_submitted = false;
    let mut termination_submitted = false;
    let state = message_loop(
        shared_env,
        (message_tx, message_rx),
        playlist::State::default(),
        Box::new(move |state: &playlist::State| {
            let Some(entries) = state.entries() else {
                return None;
            };
            if !mutation_submitted {
                mutation_submitted = true;
                // Mutate the store out of band. The view model must
                // pick up the change through the notification feed.
                gateway.insert_entry("Song B", "https://youtu.be/def456");
                gateway.notify(ChangeEvent::Insert);
                return None;
            }
            if entries.len() == 2 && !termination_submitted {
                termination_submitted = true;
                return Some(playlist::Intent::Terminate);
            }
            None
        }),
    )
    .await;
    assert_eq!(2, state.entries().unwrap().len());
}

#[tokio::test]
async fn roster_adds_and_removes_entries_through_the_change_feed() {
    let gateway = Arc::new(InMemoryGateway::default());
    let shared_env = Arc::new(Environment::new(Arc::clone(&gateway) as _));
    let (message_tx, message_rx) = message_channel();
    let subscription = gateway.subscribe_changes().await.unwrap();
    tokio::spawn(emit_change_intents(subscription, message_tx.clone(), |_| {
        roster::Intent::ChangesOccurred
    }));
    send_message(&message_tx, Message::Intent(roster::Intent::FetchEntries));
    let mut addition_submitted = false;
    let mut removal_submitted = false;
    let mut termination_submitted = false;
    let state = message_loop(
        shared_env,
        (message_tx, message_rx),
        roster::State::default(),
        Box::new(move |state: &roster::State| {
            let Some(entries) = state.entries() else {
                return None;
            };
            if !addition_submitted {
                addition_submitted = true;
                return Some(roster::Intent::AddEntry(Submission::new(
                    "Song A",
                    "https://youtu.be/abc123",
                )));
            }
            if !removal_submitted {
                if let Some(entry) = entries.first() {
                    removal_submitted = true;
                    return Some(roster::Intent::RemoveEntry(entry.id.clone()));
                }
                return None;
            }
            if entries.is_empty() && !termination_submitted {
                termination_submitted = true;
                return Some(roster::Intent::Terminate);
            }
            None
        }),
    )
    .await;
    assert_eq!(0, state.entries().unwrap().len());
}
