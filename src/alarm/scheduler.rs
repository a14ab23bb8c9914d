// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/girarm-rs

//! Alarm scheduler - fires "alarm X started ringing" triggers
//!
//! The platform notification center is behind a trait so the session
//! controller and engine can be driven by a fake trigger in tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Local;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info};
use uuid::Uuid;

use super::Alarm;

/// Delivers alarm-fired triggers. Implementations own the timing source.
#[async_trait]
pub trait AlarmScheduler: Send + Sync {
    /// Arm (or re-arm) the trigger for one alarm
    async fn schedule(&self, alarm: &Alarm);

    /// Disarm the trigger; idempotent
    async fn cancel(&self, id: Uuid);

    /// Subscribe to fired alarm ids
    fn subscribe_fired(&self) -> broadcast::Receiver<Uuid>;
}

/// Scheduler backed by tokio timers and the local wall clock.
///
/// Repeating alarms re-arm themselves after each fire; one-shot alarms fire
/// once and disarm.
pub struct TokioScheduler {
    fired_tx: broadcast::Sender<Uuid>,
    tasks: Mutex<HashMap<Uuid, JoinHandle<()>>>,
}

impl TokioScheduler {
    pub fn new(capacity: usize) -> Self {
        let (fired_tx, _) = broadcast::channel(capacity);
        Self {
            fired_tx,
            tasks: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for TokioScheduler {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl AlarmScheduler for TokioScheduler {
    async fn schedule(&self, alarm: &Alarm) {
        let alarm = alarm.clone();
        let fired_tx = self.fired_tx.clone();
        let id = alarm.id;

        let handle = tokio::spawn(async move {
            loop {
                let now = Local::now().naive_local();
                let Some(next) = alarm.next_fire_after(now) else {
                    break;
                };
                let delay = (next - now).to_std().unwrap_or_default();
                debug!("Alarm {} armed for {} ({:?} away)", id, next, delay);

                sleep(delay).await;
                info!("Alarm fired: {} ({})", alarm.label, id);
                let _ = fired_tx.send(id);

                if alarm.repeat_days.is_empty() {
                    break;
                }
            }
        });

        let mut tasks = self.tasks.lock().await;
        if let Some(previous) = tasks.insert(id, handle) {
            previous.abort();
        }
    }

    async fn cancel(&self, id: Uuid) {
        let mut tasks = self.tasks.lock().await;
        if let Some(handle) = tasks.remove(&id) {
            handle.abort();
            debug!("Alarm {} disarmed", id);
        }
    }

    fn subscribe_fired(&self) -> broadcast::Receiver<Uuid> {
        self.fired_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::{timeout, Duration};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_one_shot_fires_once() {
        let scheduler = TokioScheduler::default();
        let mut fired = scheduler.subscribe_fired();

        let alarm = Alarm::new(7, 0);
        scheduler.schedule(&alarm).await;

        // Paused clock auto-advances through the sleep
        let id = timeout(Duration::from_secs(2 * 24 * 3600), fired.recv())
            .await
            .expect("alarm should fire")
            .unwrap();
        assert_eq!(id, alarm.id);

        // One-shot: no second fire
        assert!(
            timeout(Duration::from_secs(2 * 24 * 3600), fired.recv())
                .await
                .is_err()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_disarms() {
        let scheduler = TokioScheduler::default();
        let mut fired = scheduler.subscribe_fired();

        let alarm = Alarm::new(7, 0);
        scheduler.schedule(&alarm).await;
        scheduler.cancel(alarm.id).await;
        scheduler.cancel(alarm.id).await; // idempotent

        assert!(
            timeout(Duration::from_secs(2 * 24 * 3600), fired.recv())
                .await
                .is_err()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_alarm_never_armed() {
        let scheduler = TokioScheduler::default();
        let mut fired = scheduler.subscribe_fired();

        let mut alarm = Alarm::new(7, 0);
        alarm.enabled = false;
        scheduler.schedule(&alarm).await;

        assert!(
            timeout(Duration::from_secs(2 * 24 * 3600), fired.recv())
                .await
                .is_err()
        );
    }
}
