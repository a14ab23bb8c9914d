// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/girarm-rs

//! Girarm - Challenge-Gated Alarm Clock Core
//!
//! An alarm clock whose alarms cannot simply be swiped away: dismissal
//! requires completing physical challenges first.
//!
//! - Hold the phone upright (gravity-vector thresholding)
//! - Be in a lit room (frame brightness, time-of-day fallback)
//! - Smile at the camera (facial-landmark heuristic)
//! - Speak a wake phrase (keyword spotting in streamed transcripts)
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     Girarm Core                          │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌─────────┐   ┌───────────┐   ┌────────────────────┐   │
//! │  │ Sample  │ → │ Detectors │ → │ Challenge Progress │   │
//! │  │ Sources │   │ (4 kinds) │   │ Engine             │   │
//! │  └─────────┘   └───────────┘   └────────────────────┘   │
//! │       ↓              ↓                   ↓               │
//! │  ┌──────────────────────────────────────────────────┐   │
//! │  │          Alarm Session Controller                │   │
//! │  └──────────────────────────────────────────────────┘   │
//! │       ↓              ↓                   ↓               │
//! │  ┌─────────┐   ┌───────────┐   ┌────────────────────┐   │
//! │  │ Ringer  │   │ Scheduler │   │ UI event broadcast │   │
//! │  └─────────┘   └───────────┘   └────────────────────┘   │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Sensor services deliver samples from arbitrary tasks; all of them are
//! funneled through one channel into the controller task, the single
//! writer into the engine.

#![warn(missing_docs)]
#![allow(dead_code)]

pub mod alarm;
pub mod challenge;
pub mod config;
pub mod detectors;
pub mod session;

// Re-exports for convenience
pub use alarm::{Alarm, AlarmScheduler, AlarmStore, LogRinger, Ringer, TokioScheduler};
pub use challenge::{ChallengeEngine, ChallengeError, ChallengeKind, ChallengeProgress};
pub use config::Config;
pub use detectors::{Detector, SampleSource, SensorSample, SimulatedSource};
pub use session::{AlarmSessionController, SessionEvent};

/// Girarm version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Girarm name
pub const NAME: &str = "Girarm";
