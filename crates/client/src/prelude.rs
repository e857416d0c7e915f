// SPDX-FileCopyrightText: Copyright (C) 2024-2026 tubelist contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Message-driven state machine plumbing shared by all view models.
//!
//! Every view model is a [`MutableModel`] that is updated exclusively on
//! its own message queue: user interactions enter as intents, completed
//! asynchronous tasks re-enter as effects. No state is ever mutated
//! outside of [`message_loop`].

use std::{
    fmt,
    future::Future,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::webapi::EntryGateway;

/// Immutable environment of a running view model.
///
/// Holds the explicitly constructed store gateway (dependency injection,
/// no global client handle) and tracks the number of in-flight tasks.
pub struct Environment {
    gateway: Arc<dyn EntryGateway>,
    pending_tasks_count: AtomicUsize,
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("pending_tasks_count", &self.pending_tasks_count)
            .finish_non_exhaustive()
    }
}

impl Environment {
    #[must_use]
    pub fn new(gateway: Arc<dyn EntryGateway>) -> Self {
        Self {
            gateway,
            pending_tasks_count: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn gateway(&self) -> &dyn EntryGateway {
        self.gateway.as_ref()
    }

    #[must_use]
    pub fn all_tasks_finished(&self) -> bool {
        self.pending_tasks_count.load(Ordering::Acquire) == 0
    }

    pub fn dispatch_task<I, T>(
        shared_self: Arc<Self>,
        message_tx: MessageSender<I, T::Output>,
        task: T,
    ) where
        T: Future + Send + 'static,
        T::Output: fmt::Debug + Send + 'static,
        I: fmt::Debug + Send + 'static,
    {
        shared_self
            .pending_tasks_count
            .fetch_add(1, Ordering::Acquire);
        tokio::spawn(async move {
            let effect = task.await;
            log::debug!("Received effect from task: {effect:?}");
            // Decrement before sending: when the loop receives this
            // effect the task must no longer count as pending.
            shared_self
                .pending_tasks_count
                .fetch_sub(1, Ordering::Release);
            send_message(&message_tx, Message::Effect(effect));
        });
    }
}

pub type MessageSender<I, E> = mpsc::UnboundedSender<Message<I, E>>;
pub type MessageReceiver<I, E> = mpsc::UnboundedReceiver<Message<I, E>>;
pub type MessageChannel<I, E> = (MessageSender<I, E>, MessageReceiver<I, E>);

#[must_use]
pub fn message_channel<I, E>() -> MessageChannel<I, E> {
    mpsc::unbounded_channel()
}

pub fn send_message<I: fmt::Debug, E: fmt::Debug>(
    message_tx: &MessageSender<I, E>,
    message: impl Into<Message<I, E>>,
) {
    let message = message.into();
    log::debug!("Sending message: {message:?}");
    if let Err(message) = message_tx.send(message) {
        // Channel is closed, i.e. the receiving loop has been torn down
        log::debug!("Failed to send message: {:?}", message.0);
    }
}

/// An asynchronous operation that terminates with an effect.
#[async_trait]
pub trait AsyncTask<E> {
    async fn execute(self, shared_env: Arc<Environment>) -> E;
}

#[derive(Debug, Clone)]
pub enum Message<I, E> {
    Intent(I),
    Effect(E),
}

impl<I, E> Message<I, E> {
    pub fn intent(intent: impl Into<I>) -> Self {
        Self::Intent(intent.into())
    }

    pub fn effect(effect: impl Into<E>) -> Self {
        Self::Effect(effect.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action<E, T> {
    ApplyEffect(E),
    DispatchTask(T),
}

impl<E, T> Action<E, T> {
    pub fn apply_effect(effect: impl Into<E>) -> Self {
        Self::ApplyEffect(effect.into())
    }

    pub fn dispatch_task(task: impl Into<T>) -> Self {
        Self::DispatchTask(task.into())
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ModelMutation {
    Unchanged,
    MaybeChanged,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ModelUpdated<E, T> {
    pub state_mutation: ModelMutation,
    pub next_action: Option<Action<E, T>>,
}

impl<E, T> ModelUpdated<E, T> {
    pub fn unchanged(next_action: impl Into<Option<Action<E, T>>>) -> Self {
        Self {
            state_mutation: ModelMutation::Unchanged,
            next_action: next_action.into(),
        }
    }

    pub fn maybe_changed(next_action: impl Into<Option<Action<E, T>>>) -> Self {
        Self {
            state_mutation: ModelMutation::MaybeChanged,
            next_action: next_action.into(),
        }
    }
}

/// Mutable, message-driven view model.
pub trait MutableModel {
    type Intent;
    type Effect;
    type Task;

    fn update(
        &mut self,
        message: Message<Self::Intent, Self::Effect>,
    ) -> ModelUpdated<Self::Effect, Self::Task>;

    /// Teardown has been requested.
    ///
    /// A terminating model must not be mutated by any subsequently
    /// completing effects and its message loop exits as soon as all
    /// pending tasks have finished.
    fn is_terminating(&self) -> bool;
}

/// Local copy of data that is remotely owned by the external store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteData<T> {
    Unknown,
    Pending { stale: Option<T> },
    Ready { value: T },
}

impl<T> Default for RemoteData<T> {
    fn default() -> Self {
        Self::Unknown
    }
}

impl<T> RemoteData<T> {
    pub fn ready(value: impl Into<T>) -> Self {
        Self::Ready {
            value: value.into(),
        }
    }

    /// The last known value, possibly stale while a refresh is pending.
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Unknown => None,
            Self::Pending { stale } => stale.as_ref(),
            Self::Ready { value } => Some(value),
        }
    }

    #[must_use]
    pub fn get_ready(&self) -> Option<&T> {
        match self {
            Self::Unknown | Self::Pending { .. } => None,
            Self::Ready { value } => Some(value),
        }
    }

    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    pub fn reset(&mut self) {
        *self = Self::Unknown;
    }

    /// Marks the data as pending, retaining the last known value as a
    /// stale snapshot.
    pub fn set_pending(&mut self) {
        let stale = match std::mem::replace(self, Self::Unknown) {
            Self::Unknown => None,
            Self::Pending { stale } => stale,
            Self::Ready { value } => Some(value),
        };
        *self = Self::Pending { stale };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageHandled {
    Progressing,
    NoProgress,
}

pub type RenderModelFn<M, I> = dyn FnMut(&M) -> Option<I> + Send;

pub fn handle_next_message<M>(
    shared_env: &Arc<Environment>,
    model: &mut M,
    message_tx: &MessageSender<M::Intent, M::Effect>,
    mut next_message: Message<M::Intent, M::Effect>,
    render_fn: &mut RenderModelFn<M, M::Intent>,
) -> MessageHandled
where
    M: MutableModel + fmt::Debug,
    M::Intent: fmt::Debug + Send + 'static,
    M::Effect: fmt::Debug + Send + 'static,
    M::Task: AsyncTask<M::Effect> + fmt::Debug + 'static,
{
    let mut state_mutation = ModelMutation::Unchanged;
    let mut number_of_next_actions = 0;
    let mut number_of_messages_sent = 0;
    let mut number_of_tasks_dispatched = 0;
    'process_next_message: loop {
        let ModelUpdated {
            state_mutation: next_state_mutation,
            next_action,
        } = model.update(next_message);
        if next_state_mutation == ModelMutation::MaybeChanged {
            state_mutation = ModelMutation::MaybeChanged;
        }
        if let Some(next_action) = next_action {
            number_of_next_actions += 1;
            match next_action {
                Action::ApplyEffect(effect) => {
                    log::debug!("Applying subsequent effect immediately: {effect:?}");
                    next_message = Message::Effect(effect);
                    continue 'process_next_message;
                }
                Action::DispatchTask(task) => {
                    if model.is_terminating() {
                        log::warn!("Discarding task while terminating: {task:?}");
                    } else {
                        log::debug!("Dispatching task asynchronously: {task:?}");
                        Environment::dispatch_task(
                            shared_env.clone(),
                            message_tx.clone(),
                            task.execute(shared_env.clone()),
                        );
                        number_of_tasks_dispatched += 1;
                    }
                }
            }
        }
        if state_mutation == ModelMutation::MaybeChanged || number_of_next_actions > 0 {
            log::debug!("Rendering current state: {model:?}");
            if let Some(rendering_intent) = render_fn(model) {
                log::debug!("Received intent after rendering state: {rendering_intent:?}");
                send_message(message_tx, Message::Intent(rendering_intent));
                number_of_messages_sent += 1;
            }
        }
        break;
    }
    if number_of_messages_sent + number_of_tasks_dispatched > 0 {
        MessageHandled::Progressing
    } else {
        MessageHandled::NoProgress
    }
}

/// Runs a view model on its message channel until torn down.
///
/// The loop exits after the model started terminating and all pending
/// tasks have finished, or after all message senders have been dropped.
/// Returns the final model.
pub async fn message_loop<M>(
    shared_env: Arc<Environment>,
    (message_tx, mut message_rx): MessageChannel<M::Intent, M::Effect>,
    mut model: M,
    mut render_fn: Box<RenderModelFn<M, M::Intent>>,
) -> M
where
    M: MutableModel + fmt::Debug,
    M::Intent: fmt::Debug + Send + 'static,
    M::Effect: fmt::Debug + Send + 'static,
    M::Task: AsyncTask<M::Effect> + fmt::Debug + 'static,
{
    while let Some(next_message) = message_rx.recv().await {
        handle_next_message(
            &shared_env,
            &mut model,
            &message_tx,
            next_message,
            &mut *render_fn,
        );
        if model.is_terminating() && shared_env.all_tasks_finished() {
            break;
        }
    }
    log::debug!("Exiting message loop");
    model
}
