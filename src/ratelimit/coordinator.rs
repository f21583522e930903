//! Cooldown state machine
//!
//! Gates new user-initiated actions after a rate-limit failure. Two
//! states: `Idle` (nothing blocked) and `Cooling` until a deadline.
//! The deadline is consumed by a 1 Hz ticker; an explicit history reset
//! clears it unconditionally. The coordinator never retries on its own.
//!
//! All time-dependent methods take `now` explicitly so tests can drive
//! the clock.

use super::classify::{classify, CooldownConfig, ErrorClass};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Result of one ticker pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownTick {
    /// No active cooldown
    Idle,

    /// Still cooling; non-negative whole seconds left
    Cooling { seconds_remaining: u64 },

    /// The cooldown just elapsed; the caller must clear any associated
    /// error banner
    Expired,
}

#[derive(Debug, Clone, Copy)]
enum State {
    Idle,
    Cooling { end: Instant },
}

#[derive(Debug, Clone)]
pub struct CooldownCoordinator {
    state: State,
    config: CooldownConfig,
}

impl CooldownCoordinator {
    pub fn new(config: CooldownConfig) -> Self {
        Self {
            state: State::Idle,
            config,
        }
    }

    /// Classify a gateway failure and enter `Cooling` if it is a rate
    /// limit. Generic failures leave the state untouched.
    pub fn note_failure(&mut self, message: &str, now: Instant) -> ErrorClass {
        let class = classify(message, &self.config);
        if let ErrorClass::RateLimited { wait_secs } = class {
            self.state = State::Cooling {
                end: now + Duration::from_secs(wait_secs),
            };
            info!(wait_secs, "rate limited, entering cooldown");
        }
        class
    }

    /// Whether new sends/recordings are currently blocked
    pub fn is_cooling(&self, now: Instant) -> bool {
        matches!(self.state, State::Cooling { end } if now < end)
    }

    /// Whole seconds until the cooldown elapses, zero when idle
    pub fn seconds_remaining(&self, now: Instant) -> u64 {
        match self.state {
            State::Cooling { end } if now < end => {
                (end - now).as_secs_f64().ceil() as u64
            }
            _ => 0,
        }
    }

    /// Advance the state machine; call at >= 1 Hz while cooling
    pub fn tick(&mut self, now: Instant) -> CooldownTick {
        match self.state {
            State::Idle => CooldownTick::Idle,
            State::Cooling { end } => {
                if now >= end {
                    self.state = State::Idle;
                    debug!("cooldown elapsed");
                    CooldownTick::Expired
                } else {
                    CooldownTick::Cooling {
                        seconds_remaining: self.seconds_remaining(now),
                    }
                }
            }
        }
    }

    /// Unconditionally return to `Idle`; a user-initiated history reset
    /// always wins over an in-flight cooldown.
    pub fn reset(&mut self) {
        if matches!(self.state, State::Cooling { .. }) {
            info!("cooldown cleared by reset");
        }
        self.state = State::Idle;
    }
}

impl Default for CooldownCoordinator {
    fn default() -> Self {
        Self::new(CooldownConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(base: Instant, secs: u64) -> Instant {
        base + Duration::from_secs(secs)
    }

    #[test]
    fn test_starts_idle() {
        let coordinator = CooldownCoordinator::default();
        let now = Instant::now();
        assert!(!coordinator.is_cooling(now));
        assert_eq!(coordinator.seconds_remaining(now), 0);
    }

    #[test]
    fn test_rate_limit_enters_cooling() {
        let mut coordinator = CooldownCoordinator::default();
        let now = Instant::now();

        let class = coordinator.note_failure("429 Please retry in 12.5s", now);
        assert_eq!(class, ErrorClass::RateLimited { wait_secs: 14 });
        assert!(coordinator.is_cooling(now));
        assert_eq!(coordinator.seconds_remaining(now), 14);
    }

    #[test]
    fn test_generic_failure_stays_idle() {
        let mut coordinator = CooldownCoordinator::default();
        let now = Instant::now();

        let class = coordinator.note_failure("network timeout", now);
        assert_eq!(class, ErrorClass::Generic);
        assert!(!coordinator.is_cooling(now));
        assert_eq!(coordinator.tick(now), CooldownTick::Idle);
    }

    #[test]
    fn test_tick_counts_down_and_expires() {
        let mut coordinator = CooldownCoordinator::default();
        let base = Instant::now();
        coordinator.note_failure("quota exceeded", base);

        assert_eq!(
            coordinator.tick(at(base, 1)),
            CooldownTick::Cooling {
                seconds_remaining: 29
            }
        );
        assert_eq!(
            coordinator.tick(at(base, 29)),
            CooldownTick::Cooling {
                seconds_remaining: 1
            }
        );
        assert_eq!(coordinator.tick(at(base, 30)), CooldownTick::Expired);
        // One-shot: subsequent ticks report idle
        assert_eq!(coordinator.tick(at(base, 31)), CooldownTick::Idle);
    }

    #[test]
    fn test_seconds_remaining_is_monotonic() {
        let mut coordinator = CooldownCoordinator::default();
        let base = Instant::now();
        coordinator.note_failure("quota exceeded", base);

        let mut previous = u64::MAX;
        for secs in 0..31 {
            let remaining = coordinator.seconds_remaining(at(base, secs));
            assert!(remaining <= previous);
            previous = remaining;
        }
        assert_eq!(coordinator.seconds_remaining(at(base, 30)), 0);
    }

    #[test]
    fn test_reset_wins_over_cooldown() {
        let mut coordinator = CooldownCoordinator::default();
        let base = Instant::now();
        coordinator.note_failure("quota exceeded", base);
        assert!(coordinator.is_cooling(at(base, 1)));

        coordinator.reset();
        assert!(!coordinator.is_cooling(at(base, 1)));
        assert_eq!(coordinator.tick(at(base, 1)), CooldownTick::Idle);
    }

    #[test]
    fn test_huge_retry_hint_yields_bounded_deadline() {
        let mut coordinator = CooldownCoordinator::default();
        let base = Instant::now();

        coordinator.note_failure("retry in 99999999999999999999999s", base);

        assert!(coordinator.is_cooling(base));
        assert_eq!(coordinator.seconds_remaining(base), 60 * 60);
        assert_eq!(coordinator.tick(at(base, 60 * 60)), CooldownTick::Expired);
    }

    #[test]
    fn test_new_rate_limit_extends_cooldown() {
        let mut coordinator = CooldownCoordinator::default();
        let base = Instant::now();
        coordinator.note_failure("retry in 5s", base);
        coordinator.note_failure("retry in 60s", at(base, 2));

        assert_eq!(coordinator.seconds_remaining(at(base, 2)), 61);
    }
}
