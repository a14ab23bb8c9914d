// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/girarm-rs

//! Posture detector - gravity-vector thresholding

use nalgebra::Vector3;

use super::{Detector, Hysteresis, SensorSample};
use crate::challenge::ChallengeKind;
use crate::config::PostureConfig;

/// True when the device is held upright: the gravity vector points toward
/// the bottom edge of the device (-Y in the device frame) within
/// `max_tilt_deg` of vertical. A degenerate (near-zero) vector is never
/// upright.
pub fn is_upright(gravity: &Vector3<f64>, max_tilt_deg: f64) -> bool {
    let norm = gravity.norm();
    if norm < 1e-6 {
        return false;
    }
    let cos_tilt = -gravity.y / norm;
    cos_tilt >= max_tilt_deg.to_radians().cos()
}

/// Accumulates progress while the phone is held upright
pub struct PostureDetector {
    accumulator: Hysteresis,
    max_tilt_deg: f64,
}

impl PostureDetector {
    pub fn new(config: &PostureConfig) -> Self {
        Self {
            accumulator: Hysteresis::new(config.gain, config.decay),
            max_tilt_deg: config.max_tilt_deg,
        }
    }
}

impl Detector for PostureDetector {
    fn kind(&self) -> ChallengeKind {
        ChallengeKind::Posture
    }

    fn update(&mut self, sample: &SensorSample) -> Option<f64> {
        let SensorSample::Gravity { vector, .. } = sample else {
            return None;
        };
        Some(
            self.accumulator
                .update(is_upright(vector, self.max_tilt_deg)),
        )
    }

    fn reset(&mut self) {
        self.accumulator.reset();
    }
}
