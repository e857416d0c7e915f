// SPDX-FileCopyrightText: Copyright (C) 2024-2026 tubelist contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Read-only playlist view model.
//!
//! Keeps a local copy of the remote collection in sync by refetching the
//! full snapshot whenever a change notification arrives and tracks which
//! entry is currently selected for playback.

use crate::prelude as model_prelude;

pub mod effect;
pub use self::effect::Effect;

pub mod intent;
pub use self::intent::Intent;

pub mod state;
pub use self::state::{ControlState, Selection, State, ViewMode};

pub mod task;
pub use self::task::Task;

pub type Action = model_prelude::Action<Effect, Task>;
pub type Message = model_prelude::Message<Intent, Effect>;
pub type MessageSender = model_prelude::MessageSender<Intent, Effect>;
pub type StateUpdated = model_prelude::ModelUpdated<Effect, Task>;

#[cfg(test)]
mod tests;
