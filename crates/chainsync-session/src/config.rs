//! Session configuration and reconnect backoff.

use std::time::Duration;

use rand::Rng;

/// Configuration for a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Upper bound on establishing a transport handle.
    pub connect_timeout: Duration,
    /// What to do when the transport fails mid-stream.
    pub reconnect: ReconnectPolicy,
    /// Buffered notifications per subscriber before the oldest are dropped.
    pub notification_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            reconnect: ReconnectPolicy::default(),
            notification_capacity: 64,
        }
    }
}

/// Reconnect behaviour on transport failure during streaming.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    /// Whether to reconnect at all.
    pub enabled: bool,
    /// Delay before the first attempt of an outage.
    pub base_delay: Duration,
    /// Ceiling for the doubling delay.
    pub max_delay: Duration,
    /// Attempts per outage before giving up. `None` retries forever.
    pub max_attempts: Option<u32>,
    /// Shave a random amount (up to half) off each delay.
    pub jitter: bool,
}

impl ReconnectPolicy {
    /// Never reconnect; a transport failure ends the stream.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Retry at once, forever.
    pub fn immediate() -> Self {
        Self {
            enabled: true,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            max_attempts: None,
            jitter: false,
        }
    }

    /// Bound the attempts per outage.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(30),
            max_attempts: Some(10),
            jitter: true,
        }
    }
}

/// Exponential backoff for one outage.
#[derive(Debug)]
pub(crate) struct Backoff {
    max: Duration,
    current: Duration,
    jitter: bool,
}

impl Backoff {
    pub(crate) fn new(policy: &ReconnectPolicy) -> Self {
        Self {
            max: policy.max_delay,
            current: std::cmp::min(policy.base_delay, policy.max_delay),
            jitter: policy.jitter,
        }
    }

    pub(crate) fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        let next = self.current.checked_mul(2).unwrap_or(self.max);
        self.current = std::cmp::min(next, self.max);

        if self.jitter && !delay.is_zero() {
            let millis = delay.as_millis() as u64;
            let shave = rand::thread_rng().gen_range(0..=millis / 2);
            delay - Duration::from_millis(shave)
        } else {
            delay
        }
    }
}
