// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/girarm-rs

//! Alarm model, ringer seam, persistence and scheduling

mod scheduler;
mod store;

pub use scheduler::{AlarmScheduler, TokioScheduler};
pub use store::AlarmStore;

use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::challenge::ChallengeKind;

/// One configured alarm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alarm {
    pub id: Uuid,
    pub label: String,
    /// Fire time, local wall clock
    pub hour: u32,
    pub minute: u32,
    /// Weekdays the alarm repeats on; empty means one-shot
    pub repeat_days: Vec<Weekday>,
    pub enabled: bool,
    /// Challenges required to dismiss; empty means the alarm is not gated
    pub challenges: Vec<ChallengeKind>,
    /// Ringer sound name
    pub sound: String,
}

impl Alarm {
    pub fn new(hour: u32, minute: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: String::new(),
            hour,
            minute,
            repeat_days: Vec::new(),
            enabled: true,
            challenges: Vec::new(),
            sound: "classic".to_string(),
        }
    }

    /// Next wall-clock instant this alarm should fire strictly after `now`,
    /// or `None` when disabled or the fire time is invalid.
    pub fn next_fire_after(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        if !self.enabled {
            return None;
        }
        let time = NaiveTime::from_hms_opt(self.hour, self.minute, 0)?;

        for offset in 0..=7 {
            let date = now.date() + Duration::days(offset);
            let candidate = date.and_time(time);
            if candidate <= now {
                continue;
            }
            if self.repeat_days.is_empty() || self.repeat_days.contains(&date.weekday()) {
                return Some(candidate);
            }
        }
        None
    }
}

/// Plays and silences the alarm sound. Injected into the session
/// controller; the core never touches audio directly.
pub trait Ringer: Send + Sync {
    fn start_ringing(&self, alarm: &Alarm);
    fn stop_ringing(&self);
}

/// Ringer that only logs, for headless and demo runs
pub struct LogRinger;

impl Ringer for LogRinger {
    fn start_ringing(&self, alarm: &Alarm) {
        info!("🔔 Ringing: {} ({})", alarm.label, alarm.sound);
    }

    fn stop_ringing(&self) {
        info!("🔕 Ringer silenced");
    }
}
