// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/girarm-rs

//! Sample simulator for demo mode and headless testing
//!
//! Synthesizes a plausible wake-up: the phone gets picked up and held
//! vertical, the room brightens, the user smiles and mutters a wake phrase.

use async_trait::async_trait;
use chrono::{Local, Utc};
use nalgebra::Vector3;
use rand::prelude::*;
use rand_distr::Normal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};
use tracing::debug;

use super::{SampleSource, SensorSample, SourceStatus};
use crate::challenge::{ChallengeError, ChallengeKind};

const WAKE_PHRASE: &[&str] = &["okay", "okay", "i", "am", "up", "wake", "up", "already"];

/// Simulated sensor service producing samples for one challenge kind
pub struct SimulatedSource {
    kind: ChallengeKind,
    period: Duration,
    status: SourceStatus,
    handle: Option<JoinHandle<()>>,
}

impl SimulatedSource {
    pub fn new(kind: ChallengeKind) -> Self {
        Self::with_period(kind, Duration::from_millis(100))
    }

    pub fn with_period(kind: ChallengeKind, period: Duration) -> Self {
        Self {
            kind,
            period,
            status: SourceStatus::Idle,
            handle: None,
        }
    }

    fn synthesize(kind: ChallengeKind, step: u32, rng: &mut StdRng) -> SensorSample {
        let noise = Normal::new(0.0, 0.05).expect("valid distribution");
        match kind {
            ChallengeKind::Posture => {
                // Phone flat for the first second, then picked up
                let vector = if step < 10 {
                    Vector3::new(noise.sample(rng), noise.sample(rng), -1.0)
                } else {
                    Vector3::new(noise.sample(rng), -1.0 + noise.sample(rng), noise.sample(rng))
                };
                SensorSample::Gravity {
                    vector,
                    timestamp: Utc::now(),
                }
            }
            ChallengeKind::Light => {
                // Lights come on gradually
                let level = (0.1 + f64::from(step) * 0.06 + noise.sample(rng)).clamp(0.0, 1.0);
                SensorSample::Brightness {
                    level: Some(level),
                    timestamp: Local::now(),
                }
            }
            ChallengeKind::Expression => SensorSample::Face {
                smiling: step > 8 && rng.gen_bool(0.8),
                confidence: (0.75 + noise.sample(rng)).clamp(0.0, 1.0),
            },
            ChallengeKind::Voice => {
                // Cumulative partial transcript, one word per couple of steps
                let words = (step as usize / 2).min(WAKE_PHRASE.len());
                SensorSample::Transcript {
                    text: WAKE_PHRASE[..words].join(" "),
                }
            }
        }
    }
}

#[async_trait]
impl SampleSource for SimulatedSource {
    fn kind(&self) -> ChallengeKind {
        self.kind
    }

    fn status(&self) -> SourceStatus {
        self.status
    }

    async fn start(&mut self, tx: mpsc::Sender<SensorSample>) -> Result<(), ChallengeError> {
        if self.status == SourceStatus::Running {
            return Ok(());
        }

        let kind = self.kind;
        let period = self.period;
        self.handle = Some(tokio::spawn(async move {
            let mut rng = StdRng::from_entropy();
            let mut tick = interval(period);
            let mut step = 0u32;
            loop {
                tick.tick().await;
                let sample = Self::synthesize(kind, step, &mut rng);
                step = step.saturating_add(1);
                if tx.send(sample).await.is_err() {
                    // Session torn down; nobody is listening anymore
                    debug!("Simulated {:?} source stopping: channel closed", kind);
                    break;
                }
            }
        }));
        self.status = SourceStatus::Running;
        Ok(())
    }

    async fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.status = SourceStatus::Stopped;
    }
}
