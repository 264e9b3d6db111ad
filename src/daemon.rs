//! Periodic scan driver.
//!
//! Runs one cycle as soon as it starts, then one per interval until the
//! shutdown channel flips to `true`. Cycles run inline, so a new one never
//! starts while the previous is still going; ticks missed meanwhile are
//! dropped rather than queued.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

use crate::config::format_duration;
use crate::scan::{CycleReport, ScanCycle};

/// Sender side flips to `true` to request shutdown.
pub fn shutdown_channel() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    watch::channel(false)
}

pub struct Scheduler {
    cycle: ScanCycle,
    interval: Duration,
}

impl Scheduler {
    /// `interval` must be non-zero.
    pub fn new(cycle: ScanCycle, interval: Duration) -> Self {
        Self { cycle, interval }
    }

    /// Run a single cycle.
    pub async fn run_once(&self) -> CycleReport {
        self.cycle.run().await
    }

    /// Run until `shutdown` becomes `true` or its sender is dropped.
    ///
    /// A cycle already in progress when shutdown is requested is allowed
    /// to finish. Returns the number of cycles run.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> usize {
        if *shutdown.borrow_and_update() {
            return 0;
        }

        tracing::info!(
            "Scheduler started (interval: {}, feeds: {})",
            format_duration(self.interval),
            self.cycle.feeds().len()
        );

        tracing::info!("Running initial scan...");
        self.run_once().await;
        let mut cycles = 1;

        let mut timer = interval(self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        timer.tick().await; // Skip the first immediate tick

        loop {
            // Shutdown wins over a tick that became due during a long cycle.
            tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow_and_update() {
                        break;
                    }
                }
                _ = timer.tick() => {
                    if *shutdown.borrow() {
                        break;
                    }
                    tracing::info!("Running scheduled scan...");
                    self.run_once().await;
                    cycles += 1;
                }
            }
        }

        tracing::info!("Scheduler stopped after {} cycles", cycles);
        cycles
    }
}

/// Resolve on SIGINT or SIGTERM (ctrl-c elsewhere).
pub async fn wait_for_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        tokio::select! {
            _ = sigterm.recv() => tracing::info!("Received SIGTERM"),
            _ = sigint.recv() => tracing::info!("Received SIGINT"),
        }
        Ok(())
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        tracing::info!("Received ctrl-c");
        Ok(())
    }
}
