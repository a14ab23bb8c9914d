// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/girarm-rs

//! Alarm session controller - glue between one ringing alarm and the engine
//!
//! Samples from all sensor services arrive on one mpsc channel; the
//! controller task is the single writer into the [`ChallengeEngine`], so
//! the engine itself needs no synchronization. UI consumers subscribe to a
//! broadcast of session events. Once the task exits (completion or stop),
//! the sample receiver is dropped and any emission still in flight fails to
//! send instead of being applied to a torn-down session.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Duration, Instant};
use tracing::{debug, info, warn};

use crate::alarm::{Alarm, Ringer};
use crate::challenge::{ChallengeEngine, ChallengeError, ChallengeKind, ChallengeProgress};
use crate::config::Config;
use crate::detectors::{detector_for, Detector, SampleSource, SensorSample};

/// Events published to UI subscribers over the session's lifetime
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A detector emission was applied; snapshot of the updated entry
    Progress(ChallengeProgress),
    /// One challenge just completed (one-way within the session)
    ChallengeCompleted(ChallengeKind),
    /// Every challenge is complete; the ringer has been silenced
    SessionComplete,
    /// The user tried to dismiss before completing all challenges
    DismissRejected { remaining: Vec<ChallengeKind> },
    /// Some sensors never started; these kinds can never complete on their
    /// own and the UI should offer a skip or fallback
    SessionStuck { kinds: Vec<ChallengeKind> },
}

enum Command {
    RequestDismiss,
    Stop,
}

/// Binds one ringing alarm to the challenge engine and its detectors
pub struct AlarmSessionController {
    config: Arc<Config>,
    ringer: Arc<dyn Ringer>,
    events_tx: broadcast::Sender<SessionEvent>,
    cmd_tx: Option<mpsc::Sender<Command>>,
    task: Option<JoinHandle<()>>,
}

impl AlarmSessionController {
    pub fn new(config: Arc<Config>, ringer: Arc<dyn Ringer>) -> Self {
        let (events_tx, _) = broadcast::channel(config.session.event_buffer);
        Self {
            config,
            ringer,
            events_tx,
            cmd_tx: None,
            task: None,
        }
    }

    /// Subscribe to session events for UI rendering
    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events_tx.subscribe()
    }

    /// True while a session task is running
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Start a session for a ringing alarm: derive the challenge kinds,
    /// start the requested sensor sources, start the ringer, and spawn the
    /// controller task.
    ///
    /// Fails with `InvalidConfiguration` when the alarm has no challenges
    /// (such an alarm is not gated and must be dismissed directly); on
    /// error no session state is left behind. A source that fails to start
    /// does not abort the session; its kind is reported via `SessionStuck`
    /// after the configured timeout.
    pub async fn start(
        &mut self,
        alarm: &Alarm,
        mut sources: Vec<Box<dyn SampleSource>>,
    ) -> Result<(), ChallengeError> {
        // One session per alarm, never shared
        self.stop().await;

        let mut kinds: Vec<ChallengeKind> = Vec::new();
        for kind in &alarm.challenges {
            if !kinds.contains(kind) {
                kinds.push(*kind);
            }
        }

        let mut engine = ChallengeEngine::new();
        engine.start_session(&kinds)?;

        let mut detectors: HashMap<ChallengeKind, Box<dyn Detector>> = kinds
            .iter()
            .map(|kind| (*kind, detector_for(*kind, &self.config.detectors)))
            .collect();

        let (sample_tx, mut sample_rx) =
            mpsc::channel::<SensorSample>(self.config.session.sample_buffer);
        let (cmd_tx, mut cmd_rx) = mpsc::channel(8);

        // Kinds with no working sensor behind them
        let mut stuck: Vec<ChallengeKind> = Vec::new();
        for kind in &kinds {
            let Some(source) = sources.iter_mut().find(|s| s.kind() == *kind) else {
                warn!("No sensor source provided for {:?}", kind);
                stuck.push(*kind);
                continue;
            };
            if let Err(e) = source.start(sample_tx.clone()).await {
                warn!("Sensor failed to start: {}", e);
                stuck.push(*kind);
            }
        }
        drop(sample_tx);

        self.ringer.start_ringing(alarm);
        info!(
            "Alarm session started: {} challenges, {} sensors unavailable",
            kinds.len(),
            stuck.len()
        );

        let events_tx = self.events_tx.clone();
        let ringer = self.ringer.clone();
        let stuck_deadline =
            Instant::now() + Duration::from_secs(self.config.session.stuck_timeout_secs);

        self.task = Some(tokio::spawn(async move {
            let mut stuck_reported = stuck.is_empty();
            let mut samples_open = true;

            loop {
                tokio::select! {
                    maybe_sample = sample_rx.recv(), if samples_open => {
                        let Some(sample) = maybe_sample else {
                            samples_open = false;
                            continue;
                        };
                        let kind = sample.kind();
                        let Some(detector) = detectors.get_mut(&kind) else {
                            debug!("Dropping sample for {:?}: not part of this session", kind);
                            continue;
                        };
                        let Some(progress) = detector.update(&sample) else {
                            continue;
                        };
                        let Some(outcome) = engine.apply(kind, progress) else {
                            continue;
                        };

                        let _ = events_tx.send(SessionEvent::Progress(outcome.progress));
                        if outcome.newly_completed {
                            let _ = events_tx.send(SessionEvent::ChallengeCompleted(kind));
                        }

                        if engine.is_session_complete() {
                            for source in &mut sources {
                                source.stop().await;
                            }
                            ringer.stop_ringing();
                            engine.end_session();
                            info!("All challenges complete, alarm dismissed");
                            let _ = events_tx.send(SessionEvent::SessionComplete);
                            break;
                        }
                    }
                    maybe_cmd = cmd_rx.recv() => {
                        match maybe_cmd {
                            Some(Command::RequestDismiss) => {
                                let remaining = engine.remaining();
                                warn!(
                                    "Manual dismiss rejected: {} challenges pending",
                                    remaining.len()
                                );
                                let _ = events_tx.send(SessionEvent::DismissRejected { remaining });
                            }
                            // Controller gone or stopped: tear down either way
                            Some(Command::Stop) | None => {
                                for source in &mut sources {
                                    source.stop().await;
                                }
                                ringer.stop_ringing();
                                engine.end_session();
                                info!("Alarm session torn down");
                                break;
                            }
                        }
                    }
                    _ = sleep_until(stuck_deadline), if !stuck_reported => {
                        stuck_reported = true;
                        warn!("Session stuck: no progress possible for {:?}", stuck);
                        let _ = events_tx.send(SessionEvent::SessionStuck { kinds: stuck.clone() });
                    }
                }
            }
        }));
        self.cmd_tx = Some(cmd_tx);

        Ok(())
    }

    /// Manual dismissal attempt. Only honored through the all-complete
    /// path; before completion the session answers with `DismissRejected`.
    pub async fn request_dismiss(&self) {
        if let Some(cmd_tx) = &self.cmd_tx {
            let _ = cmd_tx.send(Command::RequestDismiss).await;
        }
    }

    /// External teardown (alarm view dismissed, app backgrounded): stop all
    /// sources and end the session unconditionally. Idempotent; safe to
    /// call after completion.
    pub async fn stop(&mut self) {
        if let Some(cmd_tx) = self.cmd_tx.take() {
            let _ = cmd_tx.send(Command::Stop).await;
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;
    use nalgebra::Vector3;
    use tokio::time::timeout;

    use crate::detectors::SourceStatus;

    use super::*;

    struct TestRinger {
        ringing: AtomicBool,
    }

    impl TestRinger {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                ringing: AtomicBool::new(false),
            })
        }

        fn is_ringing(&self) -> bool {
            self.ringing.load(Ordering::SeqCst)
        }
    }

    impl Ringer for TestRinger {
        fn start_ringing(&self, _alarm: &Alarm) {
            self.ringing.store(true, Ordering::SeqCst);
        }

        fn stop_ringing(&self) {
            self.ringing.store(false, Ordering::SeqCst);
        }
    }

    /// Sends a fixed script of samples, 1ms apart, then goes quiet
    struct ScriptedSource {
        kind: ChallengeKind,
        samples: Vec<SensorSample>,
        status: SourceStatus,
        handle: Option<JoinHandle<()>>,
    }

    impl ScriptedSource {
        fn new(kind: ChallengeKind, samples: Vec<SensorSample>) -> Box<Self> {
            Box::new(Self {
                kind,
                samples,
                status: SourceStatus::Idle,
                handle: None,
            })
        }
    }

    #[async_trait]
    impl SampleSource for ScriptedSource {
        fn kind(&self) -> ChallengeKind {
            self.kind
        }

        fn status(&self) -> SourceStatus {
            self.status
        }

        async fn start(&mut self, tx: mpsc::Sender<SensorSample>) -> Result<(), ChallengeError> {
            let samples = self.samples.clone();
            self.handle = Some(tokio::spawn(async move {
                for sample in samples {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    if tx.send(sample).await.is_err() {
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

    /// Source whose capability can never be acquired
    struct DeadSource(ChallengeKind);

    #[async_trait]
    impl SampleSource for DeadSource {
        fn kind(&self) -> ChallengeKind {
            self.0
        }

        fn status(&self) -> SourceStatus {
            SourceStatus::Failed
        }

        async fn start(&mut self, _tx: mpsc::Sender<SensorSample>) -> Result<(), ChallengeError> {
            Err(ChallengeError::SensorUnavailable(self.0))
        }

        async fn stop(&mut self) {}
    }

    /// Keeps emitting after stop, like an in-flight background callback.
    /// Records whether a send was ever refused.
    struct RogueSource {
        kind: ChallengeKind,
        send_failed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl SampleSource for RogueSource {
        fn kind(&self) -> ChallengeKind {
            self.kind
        }

        fn status(&self) -> SourceStatus {
            SourceStatus::Running
        }

        async fn start(&mut self, tx: mpsc::Sender<SensorSample>) -> Result<(), ChallengeError> {
            let failed = self.send_failed.clone();
            tokio::spawn(async move {
                loop {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    let sample = SensorSample::Face {
                        smiling: false,
                        confidence: 0.0,
                    };
                    if tx.send(sample).await.is_err() {
                        failed.store(true, Ordering::SeqCst);
                        break;
                    }
                }
            });
            Ok(())
        }

        // Deliberately leaves the task running
        async fn stop(&mut self) {}
    }

    fn upright() -> SensorSample {
        SensorSample::Gravity {
            vector: Vector3::new(0.0, -1.0, 0.0),
            timestamp: Utc::now(),
        }
    }

    fn gated_alarm(kinds: &[ChallengeKind]) -> Alarm {
        let mut alarm = Alarm::new(7, 0);
        alarm.challenges = kinds.to_vec();
        alarm
    }

    fn controller(ringer: Arc<TestRinger>) -> AlarmSessionController {
        AlarmSessionController::new(Arc::new(Config::default()), ringer)
    }

    async fn wait_for<F: Fn(&SessionEvent) -> bool>(
        rx: &mut broadcast::Receiver<SessionEvent>,
        pred: F,
    ) -> SessionEvent {
        timeout(Duration::from_secs(5), async {
            loop {
                let event = rx.recv().await.expect("event channel closed");
                if pred(&event) {
                    return event;
                }
            }
        })
        .await
        .expect("expected event never arrived")
    }

    #[tokio::test]
    async fn test_session_completes_and_silences_ringer() {
        let ringer = TestRinger::new();
        let mut controller = controller(ringer.clone());
        let mut events = controller.subscribe_events();

        let alarm = gated_alarm(&[ChallengeKind::Posture, ChallengeKind::Voice]);
        let sources: Vec<Box<dyn SampleSource>> = vec![
            ScriptedSource::new(ChallengeKind::Posture, vec![upright(); 12]),
            ScriptedSource::new(
                ChallengeKind::Voice,
                vec![SensorSample::Transcript {
                    text: "wake up".to_string(),
                }],
            ),
        ];

        controller.start(&alarm, sources).await.unwrap();
        assert!(ringer.is_ringing());

        wait_for(&mut events, |e| matches!(e, SessionEvent::SessionComplete)).await;
        assert!(!ringer.is_ringing());
    }

    #[tokio::test]
    async fn test_completion_events_arrive_per_kind() {
        let ringer = TestRinger::new();
        let mut controller = controller(ringer.clone());
        let mut events = controller.subscribe_events();

        let alarm = gated_alarm(&[ChallengeKind::Voice]);
        let sources: Vec<Box<dyn SampleSource>> = vec![ScriptedSource::new(
            ChallengeKind::Voice,
            vec![SensorSample::Transcript {
                text: "good morning wake".to_string(),
            }],
        )];

        controller.start(&alarm, sources).await.unwrap();

        let event = wait_for(&mut events, |e| {
            matches!(e, SessionEvent::ChallengeCompleted(_))
        })
        .await;
        assert!(matches!(
            event,
            SessionEvent::ChallengeCompleted(ChallengeKind::Voice)
        ));
    }

    #[tokio::test]
    async fn test_empty_challenge_set_is_invalid() {
        let ringer = TestRinger::new();
        let mut controller = controller(ringer.clone());

        let alarm = gated_alarm(&[]);
        let result = controller.start(&alarm, Vec::new()).await;

        assert_eq!(result, Err(ChallengeError::InvalidConfiguration));
        assert!(!controller.is_active());
        assert!(!ringer.is_ringing());
    }

    #[tokio::test]
    async fn test_manual_dismiss_rejected_before_completion() {
        let ringer = TestRinger::new();
        let mut controller = controller(ringer.clone());
        let mut events = controller.subscribe_events();

        // A single sample cannot complete posture
        let alarm = gated_alarm(&[ChallengeKind::Posture]);
        let sources: Vec<Box<dyn SampleSource>> =
            vec![ScriptedSource::new(ChallengeKind::Posture, vec![upright()])];

        controller.start(&alarm, sources).await.unwrap();
        controller.request_dismiss().await;

        let event = wait_for(&mut events, |e| {
            matches!(e, SessionEvent::DismissRejected { .. })
        })
        .await;
        let SessionEvent::DismissRejected { remaining } = event else {
            unreachable!();
        };
        assert!(remaining.contains(&ChallengeKind::Posture));
        assert!(ringer.is_ringing(), "rejected dismiss must not silence");

        controller.stop().await;
    }

    #[tokio::test]
    async fn test_unavailable_sensor_reports_stuck_session() {
        let ringer = TestRinger::new();
        let mut config = Config::default();
        config.session.stuck_timeout_secs = 0;
        let mut controller = AlarmSessionController::new(Arc::new(config), ringer.clone());
        let mut events = controller.subscribe_events();

        let alarm = gated_alarm(&[ChallengeKind::Expression]);
        let sources: Vec<Box<dyn SampleSource>> =
            vec![Box::new(DeadSource(ChallengeKind::Expression))];

        controller.start(&alarm, sources).await.unwrap();

        let event = wait_for(&mut events, |e| {
            matches!(e, SessionEvent::SessionStuck { .. })
        })
        .await;
        let SessionEvent::SessionStuck { kinds } = event else {
            unreachable!();
        };
        assert_eq!(kinds, vec![ChallengeKind::Expression]);

        controller.stop().await;
    }

    #[tokio::test]
    async fn test_stop_is_idempotent_and_tears_down() {
        let ringer = TestRinger::new();
        let mut controller = controller(ringer.clone());

        let alarm = gated_alarm(&[ChallengeKind::Posture]);
        let sources: Vec<Box<dyn SampleSource>> =
            vec![ScriptedSource::new(ChallengeKind::Posture, vec![upright(); 3])];

        controller.start(&alarm, sources).await.unwrap();
        controller.stop().await;
        controller.stop().await;

        assert!(!controller.is_active());
        assert!(!ringer.is_ringing());
    }

    #[tokio::test]
    async fn test_emission_after_stop_is_discarded() {
        let ringer = TestRinger::new();
        let mut controller = controller(ringer.clone());

        let send_failed = Arc::new(AtomicBool::new(false));
        let alarm = gated_alarm(&[ChallengeKind::Expression]);
        let sources: Vec<Box<dyn SampleSource>> = vec![Box::new(RogueSource {
            kind: ChallengeKind::Expression,
            send_failed: send_failed.clone(),
        })];

        controller.start(&alarm, sources).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        controller.stop().await;

        // The rogue callback keeps firing; with the session torn down its
        // emission must be refused at the channel, never applied.
        timeout(Duration::from_secs(5), async {
            while !send_failed.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        })
        .await
        .expect("post-stop emission was not refused");
    }
}
