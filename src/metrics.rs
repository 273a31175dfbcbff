//! Return-to-player monitoring

use crate::common::types::Money;
use crate::games::types::GameOutcome;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Lock-free counters of money wagered and returned
#[derive(Clone)]
pub struct RtpMonitor {
    start_time: Instant,
    rounds: Arc<AtomicU64>,
    wins: Arc<AtomicU64>,
    pushes: Arc<AtomicU64>,
    wagered_cents: Arc<AtomicU64>,
    returned_cents: Arc<AtomicU64>,
}

impl RtpMonitor {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            rounds: Arc::new(AtomicU64::new(0)),
            wins: Arc::new(AtomicU64::new(0)),
            pushes: Arc::new(AtomicU64::new(0)),
            wagered_cents: Arc::new(AtomicU64::new(0)),
            returned_cents: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn record_round(&self, bet: Money, payout: Money, result: GameOutcome) {
        self.rounds.fetch_add(1, Ordering::Relaxed);
        self.wagered_cents.fetch_add(bet.cents(), Ordering::Relaxed);
        self.returned_cents.fetch_add(payout.cents(), Ordering::Relaxed);
        match result {
            GameOutcome::Win => {
                self.wins.fetch_add(1, Ordering::Relaxed);
            }
            GameOutcome::Push => {
                self.pushes.fetch_add(1, Ordering::Relaxed);
            }
            GameOutcome::Loss => {}
        }
    }

    pub fn rounds(&self) -> u64 {
        self.rounds.load(Ordering::Relaxed)
    }

    pub fn wagered(&self) -> Money {
        Money::from_cents(self.wagered_cents.load(Ordering::Relaxed))
    }

    pub fn returned(&self) -> Money {
        Money::from_cents(self.returned_cents.load(Ordering::Relaxed))
    }

    /// Returned / wagered; 0 before the first round
    pub fn observed_rtp(&self) -> f64 {
        let wagered = self.wagered_cents.load(Ordering::Relaxed);
        if wagered == 0 {
            return 0.0;
        }
        self.returned_cents.load(Ordering::Relaxed) as f64 / wagered as f64
    }

    pub fn win_rate(&self) -> f64 {
        let rounds = self.rounds();
        if rounds == 0 {
            return 0.0;
        }
        self.wins.load(Ordering::Relaxed) as f64 / rounds as f64
    }

    pub fn push_count(&self) -> u64 {
        self.pushes.load(Ordering::Relaxed)
    }

    pub fn total_runtime(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn rounds_per_second(&self) -> f64 {
        let seconds = self.total_runtime().as_secs_f64();
        if seconds <= 0.0 {
            return 0.0;
        }
        self.rounds() as f64 / seconds
    }
}

impl Default for RtpMonitor {
    fn default() -> Self {
        Self::new()
    }
}
