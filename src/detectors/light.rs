// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/girarm-rs

//! Light detector - frame brightness thresholding with time-of-day fallback

use chrono::{DateTime, Local, Timelike};

use super::{Detector, Hysteresis, SensorSample};
use crate::challenge::ChallengeKind;
use crate::config::LightConfig;

/// True when the room counts as lit. With a brightness reading, compare
/// against the configured threshold; without one (camera denied, frame
/// dropped at startup) fall back to the configured daytime window.
pub fn is_bright(level: Option<f64>, timestamp: &DateTime<Local>, config: &LightConfig) -> bool {
    match level {
        Some(level) => level >= config.min_brightness,
        None => {
            let hour = timestamp.hour();
            hour >= config.day_start_hour && hour < config.day_end_hour
        }
    }
}

/// Accumulates progress while ambient brightness stays above threshold
pub struct LightDetector {
    accumulator: Hysteresis,
    config: LightConfig,
}

impl LightDetector {
    pub fn new(config: &LightConfig) -> Self {
        Self {
            accumulator: Hysteresis::new(config.gain, config.decay),
            config: config.clone(),
        }
    }
}

impl Detector for LightDetector {
    fn kind(&self) -> ChallengeKind {
        ChallengeKind::Light
    }

    fn update(&mut self, sample: &SensorSample) -> Option<f64> {
        let SensorSample::Brightness { level, timestamp } = sample else {
            return None;
        };
        Some(
            self.accumulator
                .update(is_bright(*level, timestamp, &self.config)),
        )
    }

    fn reset(&mut self) {
        self.accumulator.reset();
    }
}
