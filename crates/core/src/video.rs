// SPDX-FileCopyrightText: Copyright (C) 2024-2026 tubelist contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

// Recognized URL shapes, checked in order of likelihood. The identifier
// is everything up to the next delimiter, so both canonical 11-character
// identifiers and shorter test fixtures are accepted.
static WATCH_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"youtube\.com/watch\?(?:[^#\s]*&)*v=([A-Za-z0-9_-]+)").expect("valid regex")
});
static SHORT_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"youtu\.be/([A-Za-z0-9_-]+)").expect("valid regex"));
static EMBED_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"youtube\.com/embed/([A-Za-z0-9_-]+)").expect("valid regex"));

/// Canonical short code of a hosted video, extracted from a URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Tries to locate a video identifier in the given URL string.
    ///
    /// Matches the standard watch URL query parameter, the short-link
    /// path segment, and the embed path segment, in that order. Pure and
    /// deterministic: malformed input never panics, it simply yields
    /// `None`.
    #[must_use]
    pub fn extract_from_url(url: &str) -> Option<Self> {
        [&WATCH_URL_REGEX, &SHORT_URL_REGEX, &EMBED_URL_REGEX]
            .into_iter()
            .find_map(|regex| regex.captures(url))
            .and_then(|captures| captures.get(1))
            .map(|matched| Self(matched.as_str().to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URL of the embeddable player for this video.
    #[must_use]
    pub fn embed_url(&self) -> String {
        format!("https://www.youtube.com/embed/{}", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

///////////////////////////////////////////////////////////////////////
// Tests
///////////////////////////////////////////////////////////////////////
