// SPDX-FileCopyrightText: Copyright (C) 2024-2026 tubelist contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::sync::Arc;

use async_trait::async_trait;

use tubelist_core::{EntryId, Submission};

use crate::prelude::{AsyncTask, Environment};

use super::Effect;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    FetchEntries { token: u64 },
    SubmitEntry { submission: Submission },
    DiscardEntry { entry_id: EntryId },
}

impl Task {
    pub async fn execute_with(self, env: &Environment) -> Effect {
        log::trace!("Executing task: {self:?}");
        match self {
            Self::FetchEntries { token } => {
                let result = env.gateway().fetch_all_entries().await;
                Effect::EntriesFetched { token, result }
            }
            Self::SubmitEntry { submission } => {
                let result = env.gateway().submit_entry(submission).await;
                Effect::SubmissionFinished { result }
            }
            Self::DiscardEntry { entry_id } => {
                let result = env.gateway().discard_entry(&entry_id).await;
                Effect::RemovalFinished { entry_id, result }
            }
        }
    }
}

#[async_trait]
impl AsyncTask<Effect> for Task {
    async fn execute(self, shared_env: Arc<Environment>) -> Effect {
        self.execute_with(&shared_env).await
    }
}
