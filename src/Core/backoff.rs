use crossbeam_utils::Backoff;
use std::time::Duration;

/// How long a blocked producer keeps escalating before it gives up.
///
/// The busy-spin and yield phases come from [`crossbeam_utils::Backoff`];
/// this policy only bounds the final sleep phase, so every wait finishes
/// within `sleep_rounds * sleep_interval` plus the fixed spin/yield budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub sleep_rounds: u32,
    pub sleep_interval: Duration,
}

impl BackoffPolicy {
    pub const DEFAULT_SLEEP_ROUNDS: u32 = 8;
    pub const DEFAULT_SLEEP_INTERVAL: Duration = Duration::from_micros(50);

    pub const fn new(sleep_rounds: u32, sleep_interval: Duration) -> Self {
        Self {
            sleep_rounds,
            sleep_interval,
        }
    }

    /// Spin and yield only; never sleeps.
    pub const fn impatient() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Waits up to roughly 200ms for the consumer to catch up.
    pub const fn patient() -> Self {
        Self::new(2000, Duration::from_micros(100))
    }

    /// Upper bound of the sleep phase.
    pub fn max_sleep(&self) -> Duration {
        self.sleep_interval.saturating_mul(self.sleep_rounds)
    }

    pub(crate) fn start(&self) -> Escalation<'_> {
        Escalation {
            backoff: Backoff::new(),
            contention: Backoff::new(),
            slept: 0,
            policy: self,
        }
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SLEEP_ROUNDS, Self::DEFAULT_SLEEP_INTERVAL)
    }
}

/// Per-call escalation state: busy loop, then yield, then short sleeps.
pub(crate) struct Escalation<'a> {
    backoff: Backoff,
    /// Separate counter for lost CAS races, so they leave `wait` untouched.
    contention: Backoff,
    slept: u32,
    policy: &'a BackoffPolicy,
}

impl Escalation<'_> {
    /// Waits one round. Returns `false` once every round has been spent.
    pub(crate) fn wait(&mut self) -> bool {
        if !self.backoff.is_completed() {
            self.backoff.snooze();
            return true;
        }
        if self.slept < self.policy.sleep_rounds {
            self.slept += 1;
            std::thread::sleep(self.policy.sleep_interval);
            return true;
        }
        false
    }

    /// Short spin after losing a CAS race.
    #[inline]
    pub(crate) fn contended(&self) {
        self.contention.spin();
    }
}
