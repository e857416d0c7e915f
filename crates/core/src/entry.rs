// SPDX-FileCopyrightText: Copyright (C) 2024-2026 tubelist contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identifier of a playlist entry.
///
/// Assigned by the external store when an entry is created and never
/// reassigned afterwards.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntryId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_owned()))
    }
}

/// A single entry of the shared playlist.
///
/// The in-memory collection is always a full replacement snapshot of the
/// external table, ordered by `created_at` ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub id: EntryId,

    /// Non-empty display string, user-supplied.
    pub title: String,

    /// Expected to be a video hosting URL, but only checked for
    /// non-emptiness on submission.
    pub url: String,

    /// Creation timestamp assigned by the store. Defines the display
    /// ordering of the collection (ascending).
    pub created_at: DateTime<Utc>,
}

/// User input for adding a new entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub title: String,
    pub url: String,
}

impl Submission {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }

    /// Local validation, performed before any network activity.
    pub fn validate(&self) -> Result<(), InvalidSubmission> {
        if self.title.trim().is_empty() {
            return Err(InvalidSubmission::EmptyTitle);
        }
        if self.url.trim().is_empty() {
            return Err(InvalidSubmission::EmptyUrl);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidSubmission {
    #[error("missing title")]
    EmptyTitle,

    #[error("missing URL")]
    EmptyUrl,
}

///////////////////////////////////////////////////////////////////////
// Tests
///////////////////////////////////////////////////////////////////////
