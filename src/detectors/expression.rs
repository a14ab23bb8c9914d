// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/girarm-rs

//! Expression detector - smile heuristic over face landmarks

use super::{Detector, Hysteresis, SensorSample};
use crate::challenge::ChallengeKind;
use crate::config::ExpressionConfig;

/// True when the vision service reports a smile with enough
/// landmark-derived confidence behind it
pub fn is_smiling(smiling: bool, confidence: f64, min_confidence: f64) -> bool {
    smiling && confidence >= min_confidence
}

/// Accumulates progress while the user keeps smiling at the camera
pub struct ExpressionDetector {
    accumulator: Hysteresis,
    min_confidence: f64,
}

impl ExpressionDetector {
    pub fn new(config: &ExpressionConfig) -> Self {
        Self {
            accumulator: Hysteresis::new(config.gain, config.decay),
            min_confidence: config.min_confidence,
        }
    }
}

impl Detector for ExpressionDetector {
    fn kind(&self) -> ChallengeKind {
        ChallengeKind::Expression
    }

    fn update(&mut self, sample: &SensorSample) -> Option<f64> {
        let SensorSample::Face {
            smiling,
            confidence,
        } = sample
        else {
            return None;
        };
        Some(
            self.accumulator
                .update(is_smiling(*smiling, *confidence, self.min_confidence)),
        )
    }

    fn reset(&mut self) {
        self.accumulator.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_confidence_smile_rejected() {
        assert!(!is_smiling(true, 0.3, 0.6));
        assert!(is_smiling(true, 0.8, 0.6));
        assert!(!is_smiling(false, 0.99, 0.6));
    }

    #[test]
    fn test_sustained_smile_completes_in_four_frames() {
        let config = ExpressionConfig::default();
        let mut detector = ExpressionDetector::new(&config);

        let smile = SensorSample::Face {
            smiling: true,
            confidence: 0.9,
        };

        // Default gain 0.25
        let mut progress = 0.0;
        for _ in 0..4 {
            progress = detector.update(&smile).unwrap();
        }
        assert_eq!(progress, 1.0);
    }

    #[test]
    fn test_neutral_face_decays() {
        let config = ExpressionConfig::default();
        let mut detector = ExpressionDetector::new(&config);

        let smile = SensorSample::Face {
            smiling: true,
            confidence: 0.9,
        };
        let neutral = SensorSample::Face {
            smiling: false,
            confidence: 0.9,
        };

        let up = detector.update(&smile).unwrap();
        let down = detector.update(&neutral).unwrap();
        assert!((up - down - config.decay).abs() < 1e-9);
    }
}
