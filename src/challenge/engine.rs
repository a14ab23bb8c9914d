// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/girarm-rs

//! Challenge progress engine - single-writer accumulator for one session

use std::collections::HashMap;

use tracing::{debug, info};

use super::{ChallengeError, ChallengeKind, ChallengeProgress};

/// Result of applying a detector emission to the session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApplyOutcome {
    /// Snapshot of the entry after the update
    pub progress: ChallengeProgress,
    /// True when this apply transitioned the entry to completed
    pub newly_completed: bool,
}

/// Owns the challenge session for one ringing alarm.
///
/// Not internally synchronized: all mutation must happen from a single
/// logical thread of control (the session controller task).
#[derive(Debug, Default)]
pub struct ChallengeEngine {
    session: HashMap<ChallengeKind, ChallengeProgress>,
}

impl ChallengeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize one entry per requested kind at zero progress.
    ///
    /// Fails with `InvalidConfiguration` for an empty kind set and leaves no
    /// session state behind; an alarm with zero challenges is never
    /// challenge-gated and must not reach the engine.
    pub fn start_session(&mut self, kinds: &[ChallengeKind]) -> Result<(), ChallengeError> {
        if kinds.is_empty() {
            return Err(ChallengeError::InvalidConfiguration);
        }

        self.session.clear();
        for kind in kinds {
            self.session.insert(*kind, ChallengeProgress::new(*kind));
        }

        info!("Challenge session started with {} kinds", self.session.len());
        Ok(())
    }

    /// Apply a detector emission: clamp to [0, 1], store, and complete the
    /// entry when progress reaches 1.0 (one-way within the session).
    /// Emissions for kinds not in the session are ignored.
    pub fn apply(&mut self, kind: ChallengeKind, progress: f64) -> Option<ApplyOutcome> {
        let Some(entry) = self.session.get_mut(&kind) else {
            debug!("Ignoring emission for {:?}: not in session", kind);
            return None;
        };

        let newly_completed = entry.apply(progress);
        if newly_completed {
            info!("Challenge completed: {}", kind.label());
        }

        Some(ApplyOutcome {
            progress: *entry,
            newly_completed,
        })
    }

    /// True iff the session is non-empty and every entry is completed
    pub fn is_session_complete(&self) -> bool {
        !self.session.is_empty() && self.session.values().all(|p| p.completed)
    }

    /// Clear all entries. Called on dismissal or completion.
    pub fn end_session(&mut self) {
        self.session.clear();
    }

    /// Current state of one entry, if the kind is in the session
    pub fn progress(&self, kind: ChallengeKind) -> Option<ChallengeProgress> {
        self.session.get(&kind).copied()
    }

    /// Snapshot of all entries, for UI rendering
    pub fn snapshot(&self) -> Vec<ChallengeProgress> {
        self.session.values().copied().collect()
    }

    /// Kinds still pending completion
    pub fn remaining(&self) -> Vec<ChallengeKind> {
        self.session
            .values()
            .filter(|p| !p.completed)
            .map(|p| p.kind)
            .collect()
    }
}
