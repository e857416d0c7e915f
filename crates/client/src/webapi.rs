// SPDX-FileCopyrightText: Copyright (C) 2024-2026 tubelist contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Thin wrapper around the hosted data store that owns the `videos`
//! table: full fetch, insert, delete-by-id, and the change-notification
//! feed that drives the refetch-on-change synchronization.

use std::{env, fmt, time::Duration};

use anyhow::{anyhow, Context as _};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt as _;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION},
    Response,
};
use serde::Deserialize;
use tokio::{sync::mpsc, task::JoinHandle};
use url::Url;

use tubelist_core::{EntryId, PlaylistEntry, Submission};

use crate::prelude::{Message, MessageSender};

pub const SERVICE_URL_ENV: &str = "TUBELIST_SERVICE_URL";
pub const API_KEY_ENV: &str = "TUBELIST_API_KEY";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Mandatory connection settings for the hosted store.
#[derive(Debug, Clone)]
pub struct Config {
    pub service_url: Url,
    pub api_key: String,
}

impl Config {
    /// Reads the endpoint URL and the public API key from the
    /// environment.
    ///
    /// Both settings are mandatory. A missing or invalid value is
    /// reported as a startup diagnostic through the error, it does not
    /// panic.
    pub fn from_env() -> anyhow::Result<Self> {
        let service_url = env::var(SERVICE_URL_ENV)
            .with_context(|| format!("missing service endpoint URL ({SERVICE_URL_ENV})"))?;
        let service_url = service_url
            .parse()
            .with_context(|| format!("invalid service endpoint URL ({SERVICE_URL_ENV})"))?;
        let api_key = env::var(API_KEY_ENV)
            .with_context(|| format!("missing public API key ({API_KEY_ENV})"))?;
        Ok(Self {
            service_url,
            api_key,
        })
    }
}

/// A change notification delivered by the store.
///
/// Any event on the watched table invalidates the local copy as a whole,
/// therefore only the kind of change is retained and the affected row is
/// deliberately discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum ChangeEvent {
    Insert,
    Update,
    Delete,
}

/// Receiving half of a change-notification feed.
///
/// Dropping the subscription unsubscribes immediately by aborting the
/// feed reader task.
#[derive(Debug)]
pub struct ChangeSubscription {
    event_rx: mpsc::UnboundedReceiver<ChangeEvent>,
    reader: JoinHandle<()>,
}

impl ChangeSubscription {
    #[must_use]
    pub fn new(event_rx: mpsc::UnboundedReceiver<ChangeEvent>, reader: JoinHandle<()>) -> Self {
        Self { event_rx, reader }
    }

    /// Receives the next change notification.
    ///
    /// Returns `None` after the feed has ended.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        self.event_rx.recv().await
    }
}

impl Drop for ChangeSubscription {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

/// Operations of the external store for the single logical table
/// `videos` with columns `{id, title, url, created_at}`.
#[async_trait]
pub trait EntryGateway: Send + Sync + 'static {
    /// Fetches the full collection, ordered by `created_at` ascending.
    async fn fetch_all_entries(&self) -> anyhow::Result<Vec<PlaylistEntry>>;

    /// Inserts a new entry.
    ///
    /// The store assigns `id` and `created_at`. Callers must not expect
    /// the created row in return: the new entry becomes visible through
    /// the change-notification-triggered refetch.
    async fn submit_entry(&self, submission: Submission) -> anyhow::Result<()>;

    /// Deletes the entry with the given id.
    async fn discard_entry(&self, entry_id: &EntryId) -> anyhow::Result<()>;

    /// Opens a subscription to "any change" events on the table.
    async fn subscribe_changes(&self) -> anyhow::Result<ChangeSubscription>;
}

/// [`EntryGateway`] implementation for the hosted HTTP/SSE surface of
/// the store.
pub struct WebApiGateway {
    client: reqwest::Client,
    base_url: Url,
}

impl fmt::Debug for WebApiGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebApiGateway")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl WebApiGateway {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let Config {
            mut service_url,
            api_key,
        } = config;
        // Url::join() drops the last path segment unless the base path
        // ends with a slash.
        if !service_url.path().ends_with('/') {
            let path = format!("{}/", service_url.path());
            service_url.set_path(&path);
        }
        let mut default_headers = HeaderMap::new();
        let api_key_value =
            HeaderValue::from_str(&api_key).context("invalid public API key")?;
        default_headers.insert("apikey", api_key_value);
        let bearer_value = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .context("invalid public API key")?;
        default_headers.insert(AUTHORIZATION, bearer_value);
        // No client-wide timeout: the change feed is a long-lived
        // request. CRUD requests set their own deadline instead.
        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .build()
            .context("failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: service_url,
        })
    }

    fn join_url(&self, input: &str) -> anyhow::Result<Url> {
        self.base_url.join(input).map_err(Into::into)
    }
}

#[async_trait]
impl EntryGateway for WebApiGateway {
    async fn fetch_all_entries(&self) -> anyhow::Result<Vec<PlaylistEntry>> {
        let url = self.join_url("videos")?;
        let request = self
            .client
            .get(url)
            .query(&[("select", "*"), ("order", "created_at.asc")])
            .timeout(REQUEST_TIMEOUT);
        let response = request.send().await?;
        let response_body = receive_response_body(response).await?;
        let entries = serde_json::from_slice::<Vec<PlaylistEntry>>(&response_body)?;
        log::debug!("Fetched {num_entries} playlist entries", num_entries = entries.len());
        Ok(entries)
    }

    async fn submit_entry(&self, submission: Submission) -> anyhow::Result<()> {
        let url = self.join_url("videos")?;
        let request = self
            .client
            .post(url)
            .json(&submission)
            .timeout(REQUEST_TIMEOUT);
        let response = request.send().await?;
        receive_response_body(response).await?;
        Ok(())
    }

    async fn discard_entry(&self, entry_id: &EntryId) -> anyhow::Result<()> {
        let url = self.join_url("videos")?;
        let request = self
            .client
            .delete(url)
            .query(&[("id", format!("eq.{entry_id}"))])
            .timeout(REQUEST_TIMEOUT);
        let response = request.send().await?;
        receive_response_body(response).await?;
        Ok(())
    }

    async fn subscribe_changes(&self) -> anyhow::Result<ChangeSubscription> {
        let url = self.join_url("videos/events")?;
        let request = self
            .client
            .get(url)
            .header(ACCEPT, "text/event-stream");
        let response = request.send().await?;
        let response_status = response.status();
        if !response_status.is_success() {
            return Err(anyhow!("failed to subscribe to changes: {response_status}"));
        }
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let reader = tokio::spawn(read_event_stream(response, event_tx));
        Ok(ChangeSubscription::new(event_rx, reader))
    }
}

/// Decodes the server-sent change-notification feed line by line and
/// forwards each decoded event.
async fn read_event_stream(response: Response, event_tx: mpsc::UnboundedSender<ChangeEvent>) {
    let mut bytes_stream = response.bytes_stream();
    let mut line_buf: Vec<u8> = Vec::new();
    while let Some(chunk) = bytes_stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(err) => {
                log::warn!("Change feed interrupted: {err}");
                break;
            }
        };
        line_buf.extend_from_slice(&chunk);
        while let Some(line_end) = line_buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = line_buf.drain(..=line_end).collect();
            let Some(event) = decode_event_line(&line) else {
                continue;
            };
            if event_tx.send(event).is_err() {
                // Unsubscribed
                return;
            }
        }
    }
    log::debug!("Change feed ended");
}

fn decode_event_line(line: &[u8]) -> Option<ChangeEvent> {
    let line = std::str::from_utf8(line).ok()?.trim();
    let payload = line.strip_prefix("data:")?.trim();
    if payload.is_empty() {
        return None;
    }
    match serde_json::from_str(payload) {
        Ok(event) => Some(event),
        Err(err) => {
            log::warn!("Skipping undecodable change event \"{payload}\": {err}");
            None
        }
    }
}

pub(crate) async fn receive_response_body(response: Response) -> anyhow::Result<Bytes> {
    let response_status = response.status();
    let bytes = response.bytes().await?;
    if !response_status.is_success() {
        let json = serde_json::from_slice::<serde_json::Value>(&bytes).unwrap_or_default();
        let err = if json.is_null() {
            anyhow!("{response_status}")
        } else {
            anyhow!("{response_status} {json}")
        };
        return Err(err);
    }
    Ok(bytes)
}

/// Forwards every change notification into the message channel of the
/// owning view model until either side shuts down.
///
/// Spawn alongside the model's message loop and drop the subscription on
/// teardown to stop the forwarding.
pub async fn emit_change_intents<I, E>(
    mut subscription: ChangeSubscription,
    message_tx: MessageSender<I, E>,
    mut change_intent: impl FnMut(ChangeEvent) -> I + Send,
) where
    I: fmt::Debug + Send + 'static,
    E: fmt::Debug + Send + 'static,
{
    while let Some(event) = subscription.recv().await {
        log::debug!("Change received: {event:?}");
        let intent = change_intent(event);
        if message_tx.send(Message::Intent(intent)).is_err() {
            // The view has been torn down
            break;
        }
    }
    log::debug!("Stopped forwarding change notifications");
}

///////////////////////////////////////////////////////////////////////
// Tests
///////////////////////////////////////////////////////////////////////
