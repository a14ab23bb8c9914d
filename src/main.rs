// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/girarm-rs

//! Girarm - Challenge-Gated Alarm Clock
//!
//! Headless runner for the Girarm core: schedules the configured alarms
//! and, when one fires, runs a challenge session until every challenge is
//! complete. `--demo` skips the wait and rings an alarm immediately against
//! simulated sensors.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use girarm::{
    Alarm, AlarmScheduler, AlarmSessionController, AlarmStore, ChallengeKind, Config, LogRinger,
    SampleSource, SessionEvent, SimulatedSource, TokioScheduler, VERSION,
};

/// Girarm - Challenge-Gated Alarm Clock
#[derive(Parser, Debug)]
#[command(name = "girarm")]
#[command(author = "Girarm Project")]
#[command(version = VERSION)]
#[command(about = "Alarm clock that makes you earn the snooze button")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Alarm store path
    #[arg(long)]
    alarms: Option<PathBuf>,

    /// Ring a demo alarm immediately with simulated sensors
    #[arg(long)]
    demo: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace-level logging
    #[arg(long)]
    trace: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.trace {
        Level::TRACE
    } else if args.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("⏰ Girarm v{} - Challenge-Gated Alarm Clock", VERSION);

    let config_path = args.config.unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_create(&config_path)?;
    if args.demo {
        config.demo_mode = true;
    }

    let rt = tokio::runtime::Runtime::new()?;
    if config.demo_mode {
        rt.block_on(run_demo(config))
    } else {
        let alarms_path = args.alarms.unwrap_or_else(AlarmStore::default_path);
        rt.block_on(run(config, alarms_path))
    }
}

/// Schedule the stored alarms and run challenge sessions as they fire
async fn run(config: Config, alarms_path: PathBuf) -> Result<()> {
    let config = Arc::new(config);
    let store = AlarmStore::load_or_default(&alarms_path)?;
    if store.alarms().is_empty() {
        warn!("No alarms configured in {:?}; try --demo", alarms_path);
        return Ok(());
    }

    let scheduler = TokioScheduler::default();
    let mut fired = scheduler.subscribe_fired();
    for alarm in store.alarms() {
        scheduler.schedule(alarm).await;
    }
    info!("Scheduled {} alarms", store.alarms().len());
    info!("Press Ctrl+C to shutdown");

    loop {
        tokio::select! {
            Ok(id) = fired.recv() => {
                let Some(alarm) = store.get(id) else { continue };
                if alarm.challenges.is_empty() {
                    // Not challenge-gated; nothing blocks dismissal
                    info!("Alarm {} rang (no challenges)", alarm.label);
                    continue;
                }
                run_session(config.clone(), alarm).await;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    Ok(())
}

/// Ring one demo alarm against simulated sensors and run it to completion
async fn run_demo(config: Config) -> Result<()> {
    info!("Demo mode: ringing an alarm right now");

    let mut alarm = Alarm::new(7, 0);
    alarm.label = "demo".to_string();
    alarm.challenges = ChallengeKind::ALL.to_vec();

    run_session(Arc::new(config), &alarm).await;
    Ok(())
}

/// Drive one challenge session to completion, logging progress
async fn run_session(config: Arc<Config>, alarm: &Alarm) {
    let mut controller = AlarmSessionController::new(config, Arc::new(LogRinger));
    let mut events = controller.subscribe_events();

    // Headless builds have no platform sensors; the simulator stands in
    let sources: Vec<Box<dyn SampleSource>> = alarm
        .challenges
        .iter()
        .map(|kind| Box::new(SimulatedSource::new(*kind)) as Box<dyn SampleSource>)
        .collect();

    if let Err(e) = controller.start(alarm, sources).await {
        warn!("Session not started: {}", e);
        return;
    }

    loop {
        match events.recv().await {
            Ok(SessionEvent::Progress(p)) => {
                info!(
                    "{:<22} {:>5.0}%{}",
                    p.kind.label(),
                    p.progress * 100.0,
                    if p.completed { "  ✓" } else { "" }
                );
            }
            Ok(SessionEvent::ChallengeCompleted(kind)) => {
                info!("Challenge complete: {}", kind.label());
            }
            Ok(SessionEvent::SessionComplete) => {
                info!("Good morning. Alarm dismissed.");
                break;
            }
            Ok(SessionEvent::DismissRejected { remaining }) => {
                warn!("Dismiss rejected: {} challenges left", remaining.len());
            }
            Ok(SessionEvent::SessionStuck { kinds }) => {
                warn!("Session stuck, sensors unavailable for {:?}", kinds);
            }
            Err(_) => break,
        }
    }

    controller.stop().await;
}
