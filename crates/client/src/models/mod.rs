// SPDX-FileCopyrightText: Copyright (C) 2024-2026 tubelist contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

pub mod playlist;
pub mod roster;

/// Staleness guard for overlapping fetches.
///
/// Rapid successive change notifications trigger overlapping fetch-all
/// requests without any completion-order guarantee. Each fetch is tagged
/// with a monotonically increasing token and a completion is discarded
/// when a younger completion has already been applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct FetchSequence {
    issued: u64,
    applied: u64,
}

impl FetchSequence {
    pub(crate) fn issue_next(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Returns `false` for stale completions that must be discarded.
    pub(crate) fn try_apply(&mut self, token: u64) -> bool {
        debug_assert!(token <= self.issued);
        if token <= self.applied {
            return false;
        }
        self.applied = token;
        true
    }
}

///////////////////////////////////////////////////////////////////////
// Tests
///////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::FetchSequence;

    #[test]
    fn apply_in_issue_order() {
        let mut sequence = FetchSequence::default();
        let first = sequence.issue_next();
        let second = sequence.issue_next();
        assert!(sequence.try_apply(first));
        assert!(sequence.try_apply(second));
    }

    #[test]
    fn discard_older_completion_after_younger_applied() {
        let mut sequence = FetchSequence::default();
        let first = sequence.issue_next();
        let second = sequence.issue_next();
        assert!(sequence.try_apply(second));
        assert!(!sequence.try_apply(first));
    }

    #[test]
    fn never_apply_the_same_completion_twice() {
        let mut sequence = FetchSequence::default();
        let token = sequence.issue_next();
        assert!(sequence.try_apply(token));
        assert!(!sequence.try_apply(token));
    }
}
