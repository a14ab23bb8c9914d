// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/girarm-rs

//! Detectors - per-kind heuristics over raw sensor samples
//!
//! Each detector owns exactly one progress accumulator and applies an
//! asymmetric increment/decrement policy (hysteresis): progress climbs only
//! while the triggering condition holds and drifts back toward zero when it
//! is absent, so a single noisy sample cannot flip completion.
//!
//! Detectors know nothing about each other or about the aggregate session.
//! Samples arrive on one typed channel tagged by kind; the session
//! controller routes each sample to the matching detector and forwards the
//! emitted progress to the engine.

mod expression;
mod light;
mod posture;
mod simulator;
mod voice;

pub use expression::{is_smiling, ExpressionDetector};
pub use light::{is_bright, LightDetector};
pub use posture::{is_upright, PostureDetector};
pub use simulator::SimulatedSource;
pub use voice::{keyword_matches, VoiceDetector};

use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use nalgebra::Vector3;
use tokio::sync::mpsc;

use crate::challenge::{ChallengeError, ChallengeKind};
use crate::config::DetectorConfig;

/// A raw observation from one sensor service, tagged by challenge kind
#[derive(Debug, Clone)]
pub enum SensorSample {
    /// Device gravity vector in the device frame (motion service)
    Gravity {
        vector: Vector3<f64>,
        timestamp: DateTime<Utc>,
    },
    /// Normalized ambient brightness in [0, 1]; `None` when the sensor
    /// produced no reading and the time-of-day fallback applies
    Brightness {
        level: Option<f64>,
        timestamp: DateTime<Local>,
    },
    /// Face observation from the vision service
    Face { smiling: bool, confidence: f64 },
    /// Cumulative partial transcript of the current utterance. Later
    /// samples are longer prefixes of the same utterance, not fresh
    /// independent observations.
    Transcript { text: String },
}

impl SensorSample {
    /// The challenge kind this sample feeds
    pub fn kind(&self) -> ChallengeKind {
        match self {
            SensorSample::Gravity { .. } => ChallengeKind::Posture,
            SensorSample::Brightness { .. } => ChallengeKind::Light,
            SensorSample::Face { .. } => ChallengeKind::Expression,
            SensorSample::Transcript { .. } => ChallengeKind::Voice,
        }
    }
}

/// Asymmetric progress accumulator shared by all detectors.
///
/// Climbs by `gain` while the condition holds, decays by `decay` otherwise,
/// clamped to [0, 1] after every step.
#[derive(Debug, Clone, Copy)]
pub struct Hysteresis {
    progress: f64,
    gain: f64,
    decay: f64,
}

impl Hysteresis {
    pub fn new(gain: f64, decay: f64) -> Self {
        Self {
            progress: 0.0,
            gain,
            decay,
        }
    }

    /// Step the accumulator and return the new progress
    pub fn update(&mut self, held: bool) -> f64 {
        if held {
            self.progress += self.gain;
        } else {
            self.progress -= self.decay;
        }
        self.progress = self.progress.clamp(0.0, 1.0);
        self.progress
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn reset(&mut self) {
        self.progress = 0.0;
    }
}

/// A per-kind heuristic over raw samples.
///
/// `update` consumes one sample, mutates the internal accumulator, and
/// returns the new progress in [0, 1]. Samples for other kinds return
/// `None` and leave the accumulator untouched. No side effects beyond the
/// accumulator: detectors never touch UI or persistence.
pub trait Detector: Send {
    fn kind(&self) -> ChallengeKind;

    fn update(&mut self, sample: &SensorSample) -> Option<f64>;

    /// Drop accumulated progress, for session reuse
    fn reset(&mut self);
}

/// Build the detector for one challenge kind from configured thresholds
pub fn detector_for(kind: ChallengeKind, config: &DetectorConfig) -> Box<dyn Detector> {
    match kind {
        ChallengeKind::Posture => Box::new(PostureDetector::new(&config.posture)),
        ChallengeKind::Light => Box::new(LightDetector::new(&config.light)),
        ChallengeKind::Expression => Box::new(ExpressionDetector::new(&config.expression)),
        ChallengeKind::Voice => Box::new(VoiceDetector::new(&config.voice)),
    }
}

/// Lifecycle state of a sample source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStatus {
    Idle,
    Running,
    Failed,
    Stopped,
}

/// A sensor service adapter: acquires the underlying platform capability
/// and pushes typed samples into the session's sample channel.
///
/// `start` fails with `SensorUnavailable` when the capability cannot be
/// acquired; that challenge then simply never reports progress. `stop` is
/// idempotent, and after it returns no further samples are delivered.
/// Transient per-sample errors are the source's own concern (restart the
/// capture loop); they never surface past this boundary.
#[async_trait]
pub trait SampleSource: Send {
    fn kind(&self) -> ChallengeKind;

    fn status(&self) -> SourceStatus;

    async fn start(&mut self, tx: mpsc::Sender<SensorSample>) -> Result<(), ChallengeError>;

    async fn stop(&mut self);
}
