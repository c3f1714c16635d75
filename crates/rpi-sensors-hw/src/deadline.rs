//! Read deadlines and retry policy.
//!
//! Sensors like the DS18B20 and the DHT family occasionally hand back
//! garbage and have to be asked again. The retry loop keeps going until the
//! sensor produces a well-formed payload, the deadline passes, or an optional
//! attempt cap is reached.

use crate::{Error, Result};
use std::time::{Duration, Instant};
use tracing::debug;

/// Wall-clock bound for a single sensor read.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    limit: Option<Duration>,
}

impl Deadline {
    /// Creates a deadline that expires `limit` from now.
    pub fn after(limit: Duration) -> Self {
        Self {
            started: Instant::now(),
            limit: Some(limit),
        }
    }

    /// Creates a deadline that never expires.
    pub fn none() -> Self {
        Self {
            started: Instant::now(),
            limit: None,
        }
    }

    /// Returns true once the deadline has passed.
    pub fn expired(&self) -> bool {
        self.limit
            .map(|limit| self.started.elapsed() >= limit)
            .unwrap_or(false)
    }

    /// Returns the time left, or `None` for an unbounded deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.limit
            .map(|limit| limit.saturating_sub(self.started.elapsed()))
    }

    /// Fails with [`Error::Timeout`] once the deadline has passed.
    pub fn check(&self) -> Result<()> {
        match self.limit {
            Some(limit) if self.expired() => Err(Error::Timeout(limit)),
            _ => Ok(()),
        }
    }

    /// Sleeps for `pause`, cut short so it never overshoots the deadline.
    pub fn sleep(&self, pause: Duration) {
        let pause = self.remaining().map_or(pause, |left| left.min(pause));
        if !pause.is_zero() {
            std::thread::sleep(pause);
        }
    }
}

/// How to retry a read that returned an unstable payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Pause between attempts.
    pub delay: Duration,
    /// Maximum number of attempts; `None` retries until the deadline.
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    /// Creates an uncapped policy with the given pause between attempts.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: None,
        }
    }

    /// Caps the number of attempts.
    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Runs `attempt` until it yields a value.
    ///
    /// `Ok(None)` from the closure means "unstable, try again"; errors abort
    /// immediately.
    pub fn run<T>(
        &self,
        deadline: &Deadline,
        what: &str,
        mut attempt: impl FnMut() -> Result<Option<T>>,
    ) -> Result<T> {
        let mut attempts: u32 = 0;
        loop {
            deadline.check()?;
            attempts += 1;

            if let Some(value) = attempt()? {
                if attempts > 1 {
                    debug!("{} stabilised after {} attempts", what, attempts);
                }
                return Ok(value);
            }

            if self.max_attempts.is_some_and(|max| attempts >= max) {
                return Err(Error::RetriesExhausted(attempts));
            }

            debug!(
                "{} returned an unstable reading (attempt {}), retrying in {:?}",
                what, attempts, self.delay
            );
            deadline.sleep(self.delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_deadline_never_expires() {
        let deadline = Deadline::none();
        assert!(!deadline.expired());
        assert!(deadline.remaining().is_none());
        assert!(deadline.check().is_ok());
    }

    #[test]
    fn test_zero_deadline_expires_immediately() {
        let deadline = Deadline::after(Duration::ZERO);
        assert!(deadline.expired());
        assert!(matches!(deadline.check(), Err(Error::Timeout(_))));
    }

    #[test]
    fn test_retry_until_stable() {
        let policy = RetryPolicy::new(Duration::ZERO);
        let mut calls = 0;
        let value = policy
            .run(&Deadline::none(), "probe", || {
                calls += 1;
                Ok(if calls < 4 { None } else { Some(calls) })
            })
            .unwrap();
        assert_eq!(value, 4);
    }

    #[test]
    fn test_retry_cap() {
        let policy = RetryPolicy::new(Duration::ZERO).with_max_attempts(Some(3));
        let mut calls = 0;
        let result: Result<()> = policy.run(&Deadline::none(), "probe", || {
            calls += 1;
            Ok(None)
        });
        assert!(matches!(result, Err(Error::RetriesExhausted(3))));
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_retry_stops_at_deadline() {
        let policy = RetryPolicy::new(Duration::from_millis(5));
        let deadline = Deadline::after(Duration::from_millis(30));
        let result: Result<()> = policy.run(&deadline, "probe", || Ok(None));
        assert!(matches!(result, Err(Error::Timeout(_))));
    }

    #[test]
    fn test_retry_propagates_errors() {
        let policy = RetryPolicy::new(Duration::ZERO);
        let result: Result<()> = policy.run(&Deadline::none(), "probe", || {
            Err(Error::Parse("boom".to_string()))
        });
        assert!(matches!(result, Err(Error::Parse(_))));
    }
}
