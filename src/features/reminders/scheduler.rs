//! Background polling loops
//!
//! Two independent tasks drive the engine: a due-reminder check every
//! 5 seconds and a grace-window cleanup every 10. Both loops log
//! failures and keep running for the lifetime of the process.

use std::time::Duration;

use log::{error, info};
use tokio::time;

use super::engine::ReminderEngine;

const CHECK_INTERVAL: Duration = Duration::from_secs(5);
const CLEANUP_INTERVAL: Duration = Duration::from_secs(10);

pub struct ReminderScheduler {
    engine: ReminderEngine,
}

impl ReminderScheduler {
    pub fn new(engine: ReminderEngine) -> Self {
        Self { engine }
    }

    /// Spawn both polling loops. Returns immediately.
    pub fn start(&self) {
        info!(
            "Starting reminder scheduler (check every {}s, cleanup every {}s)",
            CHECK_INTERVAL.as_secs(),
            CLEANUP_INTERVAL.as_secs()
        );

        let engine = self.engine.clone();
        tokio::spawn(async move {
            let mut ticker = time::interval(CHECK_INTERVAL);
            loop {
                ticker.tick().await;
                if let Err(e) = engine.check_due().await {
                    error!("Reminder check failed: {e}");
                }
            }
        });

        let engine = self.engine.clone();
        tokio::spawn(async move {
            let mut ticker = time::interval(CLEANUP_INTERVAL);
            loop {
                ticker.tick().await;
                if let Err(e) = engine.cleanup_handled().await {
                    error!("Reminder cleanup failed: {e}");
                }
            }
        });
    }
}
