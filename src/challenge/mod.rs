// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/girarm-rs

//! Challenge value types and the progress engine

mod engine;

pub use engine::{ApplyOutcome, ChallengeEngine};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The physical challenges that can gate alarm dismissal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChallengeKind {
    /// Hold the phone upright
    Posture,
    /// Be in a lit room
    Light,
    /// Smile at the camera
    Expression,
    /// Speak a wake phrase
    Voice,
}

impl ChallengeKind {
    /// All challenge kinds, in display order
    pub const ALL: [ChallengeKind; 4] = [
        ChallengeKind::Posture,
        ChallengeKind::Light,
        ChallengeKind::Expression,
        ChallengeKind::Voice,
    ];

    /// Human-readable label for UI and logs
    pub fn label(&self) -> &'static str {
        match self {
            ChallengeKind::Posture => "Hold upright",
            ChallengeKind::Light => "Find the light",
            ChallengeKind::Expression => "Smile",
            ChallengeKind::Voice => "Say the wake phrase",
        }
    }
}

/// Completion state of one challenge within a session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChallengeProgress {
    pub kind: ChallengeKind,
    /// Current progress in [0, 1]
    pub progress: f64,
    /// One-way flag: never cleared within a session
    pub completed: bool,
}

impl ChallengeProgress {
    pub fn new(kind: ChallengeKind) -> Self {
        Self {
            kind,
            progress: 0.0,
            completed: false,
        }
    }

    /// Store a new progress value, clamped to [0, 1]. Returns true when this
    /// call transitioned the challenge to completed. The completed flag is
    /// monotonic: later values below 1.0 still get stored but never clear it.
    pub fn apply(&mut self, value: f64) -> bool {
        self.progress = value.clamp(0.0, 1.0);
        if !self.completed && self.progress >= 1.0 {
            self.completed = true;
            return true;
        }
        false
    }
}

/// Errors surfaced by the challenge engine and session controller
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChallengeError {
    /// A session was started with no challenge kinds. The alarm is not
    /// challenge-gated and must bypass the engine entirely.
    #[error("challenge session started with no challenge kinds")]
    InvalidConfiguration,

    /// The underlying sensor capability for a challenge could not be
    /// acquired (permission denied, hardware missing). Non-fatal: the
    /// session runs, but this kind can never complete on its own.
    #[error("sensor for {} challenge is unavailable", .0.label())]
    SensorUnavailable(ChallengeKind),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_clamps() {
        let mut p = ChallengeProgress::new(ChallengeKind::Posture);
        p.apply(3.5);
        assert_eq!(p.progress, 1.0);
        p.apply(-2.0);
        assert_eq!(p.progress, 0.0);
    }

    #[test]
    fn test_completed_is_monotonic() {
        let mut p = ChallengeProgress::new(ChallengeKind::Light);
        assert!(p.apply(1.0));
        assert!(p.completed);

        // Lower value still stored, flag untouched
        assert!(!p.apply(0.2));
        assert_eq!(p.progress, 0.2);
        assert!(p.completed);
    }

    #[test]
    fn test_completion_fires_once() {
        let mut p = ChallengeProgress::new(ChallengeKind::Voice);
        assert!(p.apply(1.0));
        assert!(!p.apply(1.0));
    }
}
