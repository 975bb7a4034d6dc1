//! Rate limiting for bursty sync triggers.
//!
//! Editors fire clusters of near-simultaneous save notifications (an
//! auto-formatter alone can produce several for one keystroke). A
//! [`Throttle`] collapses such a burst into a single orchestration cycle:
//! the leading trigger is admitted, the rest of the window is dropped.

use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

/// Default admission window for save-triggered syncs.
pub const SAVE_BURST_WINDOW: Duration = Duration::from_millis(500);

#[derive(Debug)]
pub struct Throttle {
    window: Duration,
    last_admitted: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_admitted: Mutex::new(None),
        }
    }

    /// Leading-edge check: `true` admits this trigger and opens a new
    /// window; `false` drops it.
    pub fn admit(&self) -> bool {
        self.admit_at(Instant::now())
    }

    fn admit_at(&self, now: Instant) -> bool {
        let mut last = self
            .last_admitted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match *last {
            Some(admitted) if now.duration_since(admitted) < self.window => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(SAVE_BURST_WINDOW)
    }
}
