//! Randomized polling schedule

use rand::Rng;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::{ResponderError, Result};
use crate::responder::Responder;

/// Default lower bound between ticks (45 seconds)
pub const DEFAULT_MIN_INTERVAL_MS: u64 = 45_000;
/// Default upper bound between ticks (120 seconds)
pub const DEFAULT_MAX_INTERVAL_MS: u64 = 120_000;

/// Draw a polling delay uniformly from [min_ms, max_ms], inclusive
///
/// Re-drawn independently on every tick; the schedule is jittered, not fixed.
pub fn random_interval(min_ms: u64, max_ms: u64) -> u64 {
    if min_ms >= max_ms {
        return min_ms;
    }
    rand::thread_rng().gen_range(min_ms..=max_ms)
}

/// Serialized polling loop
///
/// The scheduler owns the responder behind a mutex that doubles as the
/// run-in-progress token; a tick entered while another holds the responder is
/// a logged skip rather than an overlapping run.
pub struct Scheduler {
    min_ms: u64,
    max_ms: u64,
    responder: Mutex<Responder>,
}

impl Scheduler {
    pub fn new(min_ms: u64, max_ms: u64, responder: Responder) -> Result<Self> {
        if min_ms == 0 {
            return Err(ResponderError::ConfigError(
                "poll interval must be at least 1 ms".to_string(),
            ));
        }
        if min_ms > max_ms {
            return Err(ResponderError::ConfigError(format!(
                "poll min_interval_ms ({}) exceeds max_interval_ms ({})",
                min_ms, max_ms
            )));
        }
        Ok(Self {
            min_ms,
            max_ms,
            responder: Mutex::new(responder),
        })
    }

    /// Run a single guarded tick
    ///
    /// Returns Ok(false) without touching the mailbox when a tick is already
    /// in flight.
    pub async fn tick(&self) -> Result<bool> {
        let mut responder = match self.responder.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                warn!("Previous tick still running, skipping this one");
                return Ok(false);
            }
        };

        responder.run_once().await?;
        Ok(true)
    }

    /// Poll forever, sleeping a freshly randomized delay after each tick
    ///
    /// A failed tick is logged and the loop continues; nothing short of
    /// process termination stops the schedule.
    pub async fn run(&self) {
        loop {
            if let Err(e) = self.tick().await {
                warn!("Tick failed: {}", e);
            }

            let delay = random_interval(self.min_ms, self.max_ms);
            info!("Next inbox check in {:.1}s", delay as f64 / 1000.0);
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }
}
