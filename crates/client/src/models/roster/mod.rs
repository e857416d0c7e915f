// SPDX-FileCopyrightText: Copyright (C) 2024-2026 tubelist contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Administrative roster view model.
//!
//! Extends the synchronized collection view with adding and removing
//! entries. Mutations are optimistic only in their bookkeeping: the
//! displayed collection changes exclusively through the refetch that is
//! triggered by the store's change notification.

use crate::prelude as model_prelude;

pub mod effect;
pub use self::effect::Effect;

pub mod intent;
pub use self::intent::Intent;

pub mod state;
pub use self::state::{ControlState, Feedback, State};

pub mod task;
pub use self::task::Task;

pub type Action = model_prelude::Action<Effect, Task>;
pub type Message = model_prelude::Message<Intent, Effect>;
pub type MessageSender = model_prelude::MessageSender<Intent, Effect>;
pub type StateUpdated = model_prelude::ModelUpdated<Effect, Task>;
