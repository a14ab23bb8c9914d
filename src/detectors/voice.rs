// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/girarm-rs

//! Voice detector - wake-keyword spotting in streamed transcripts
//!
//! Speech-to-text delivers cumulative partial results: each callback
//! carries a longer prefix of the same utterance, not an independent
//! sample. The detector therefore counts keyword *occurrences* and only
//! credits growth in that count, so the same spoken word is never credited
//! twice across overlapping partials. Progress never decays: a heard wake
//! word stays heard.

use super::{Detector, Hysteresis, SensorSample};
use crate::challenge::ChallengeKind;
use crate::config::VoiceConfig;

/// Number of wake-keyword occurrences in a transcript. Case-insensitive,
/// whole words only ("upset" does not match "up").
pub fn keyword_matches(transcript: &str, keywords: &[String]) -> usize {
    transcript
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .filter(|word| keywords.iter().any(|k| k.eq_ignore_ascii_case(word)))
        .count()
}

/// Credits +gain once per keyword occurrence across partial transcripts
pub struct VoiceDetector {
    accumulator: Hysteresis,
    keywords: Vec<String>,
    credited: usize,
    last_transcript: String,
}

impl VoiceDetector {
    pub fn new(config: &VoiceConfig) -> Self {
        Self {
            accumulator: Hysteresis::new(config.gain, 0.0),
            keywords: config.keywords.clone(),
            credited: 0,
            last_transcript: String::new(),
        }
    }
}

impl Detector for VoiceDetector {
    fn kind(&self) -> ChallengeKind {
        ChallengeKind::Voice
    }

    fn update(&mut self, sample: &SensorSample) -> Option<f64> {
        let SensorSample::Transcript { text } = sample else {
            return None;
        };

        // A transcript that does not extend the previous one means the
        // recognizer started a fresh utterance; earlier credits stand but
        // occurrence counting restarts.
        if !text.starts_with(&self.last_transcript) {
            self.credited = 0;
        }
        self.last_transcript = text.clone();

        let matches = keyword_matches(text, &self.keywords);
        let mut progress = self.accumulator.progress();
        while self.credited < matches {
            self.credited += 1;
            progress = self.accumulator.update(true);
        }
        Some(progress)
    }

    fn reset(&mut self) {
        self.accumulator.reset();
        self.credited = 0;
        self.last_transcript.clear();
    }
}
