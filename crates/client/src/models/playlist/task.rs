// SPDX-FileCopyrightText: Copyright (C) 2024-2026 tubelist contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::sync::Arc;

use async_trait::async_trait;

use crate::prelude::{AsyncTask, Environment};

use super::Effect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    FetchEntries { token: u64 },
}

impl Task {
    pub async fn execute_with(self, env: &Environment) -> Effect {
        log::trace!("Executing task: {self:?}");
        match self {
            Self::FetchEntries { token } => {
                let result = env.gateway().fetch_all_entries().await;
                Effect::EntriesFetched { token, result }
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
