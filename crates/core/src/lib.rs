// SPDX-FileCopyrightText: Copyright (C) 2024-2026 tubelist contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

#![forbid(unsafe_code)]
#![cfg_attr(not(debug_assertions), deny(warnings))]
#![warn(clippy::all, rust_2018_idioms)]

//! Core domain model of the shared video playlist: entries as stored in
//! the hosted collection and the pure video identifier extractor.

pub mod entry;
pub use self::entry::{EntryId, InvalidSubmission, PlaylistEntry, Submission};

pub mod video;
pub use self::video::VideoId;
