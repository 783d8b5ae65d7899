//! # Admission Controller
//! Process-wide gate bounding how many outbound fetches may *start* within
//! any rolling window (default: 5 per second).
//!
//! Keeps a log of recent admission instants, same shape as a sliding window
//! over timestamps. Callers queue on an async mutex, which hands the lock out
//! in FIFO order; the head of the queue sleeps until the oldest admission
//! leaves the window.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

#[derive(Debug)]
pub struct AdmissionController {
    limit: usize,
    window: Duration,
    /// Admission instants inside the current window, oldest first.
    admitted: Mutex<VecDeque<Instant>>,
}

impl AdmissionController {
    /// `limit` admissions per `window`. A zero limit is treated as 1.
    pub fn new(limit: u32, window: Duration) -> Self {
        let limit = limit.max(1) as usize;
        Self {
            limit,
            window,
            admitted: Mutex::new(VecDeque::with_capacity(limit)),
        }
    }

    /// Convenience constructor for an N-per-second gate.
    pub fn per_second(limit: u32) -> Self {
        Self::new(limit, Duration::from_secs(1))
    }

    /// Wait until this caller may start an outbound call, then record the admission.
    pub async fn acquire(&self) {
        let mut log = self.admitted.lock().await;
        loop {
            let now = Instant::now();
            while let Some(&t) = log.front() {
                if now.duration_since(t) >= self.window {
                    log.pop_front();
                } else {
                    break;
                }
            }

            if log.len() < self.limit {
                log.push_back(now);
                return;
            }

            // Window is full; the lock stays held so later callers keep their place.
            if let Some(&oldest) = log.front() {
                tracing::debug!(
                    limit = self.limit,
                    wait_ms = (oldest + self.window)
                        .saturating_duration_since(now)
                        .as_millis() as u64,
                    "admission window full"
                );
                sleep_until(oldest + self.window).await;
            }
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}
