//! Bounded retry with exponential backoff.
//!
//! Every network call that may be retried goes through [`RetryPolicy`], so
//! there is always a fixed attempt count and a definitive failure.

use std::time::{Duration, Instant};

/// Outcome of a single attempt.
#[derive(Debug)]
pub enum Attempt<T, E> {
    /// Done; stop retrying.
    Success(T),
    /// Failed in a way worth retrying.
    Retry(E),
    /// Failed in a way that retrying cannot fix.
    Fatal(E),
}

/// Why a retried operation gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// Every attempt failed; holds the last error.
    Exhausted { attempts: u32, last: E },
    /// A non-retryable error.
    Fatal(E),
    /// The overall deadline passed before success; holds the last error if any.
    TimedOut { attempts: u32, last: Option<E> },
}

impl<E: std::fmt::Display> std::fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exhausted { attempts, last } => {
                write!(f, "gave up after {attempts} attempt(s): {last}")
            }
            Self::Fatal(e) => write!(f, "{e}"),
            Self::TimedOut { attempts, last } => match last {
                Some(e) => write!(f, "timed out after {attempts} attempt(s): {e}"),
                None => write!(f, "timed out after {attempts} attempt(s)"),
            },
        }
    }
}

impl<E: std::fmt::Debug + std::fmt::Display> std::error::Error for RetryError<E> {}

/// Attempt count, backoff schedule and optional overall deadline.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub deadline: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(8),
            deadline: None,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Default::default()
        }
    }

    /// A policy that retries immediately; used by tests and offline fakes.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            deadline: None,
        }
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Delay before retry number `retry` (0-based): `base * 2^retry`, capped.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Run `op` until it succeeds, fails fatally, or the policy is exhausted.
    ///
    /// `op` receives the 1-based attempt number.
    pub fn run<T, E>(
        &self,
        op: impl FnMut(u32) -> Attempt<T, E>,
    ) -> Result<T, RetryError<E>> {
        self.run_with_sleep(op, std::thread::sleep)
    }

    /// [`run`](Self::run) with an injectable sleeper.
    pub fn run_with_sleep<T, E>(
        &self,
        mut op: impl FnMut(u32) -> Attempt<T, E>,
        mut sleep: impl FnMut(Duration),
    ) -> Result<T, RetryError<E>> {
        let started = Instant::now();
        let mut last = None;

        for attempt in 1..=self.max_attempts {
            if let Some(deadline) = self.deadline
                && started.elapsed() >= deadline
            {
                return Err(RetryError::TimedOut {
                    attempts: attempt - 1,
                    last,
                });
            }

            match op(attempt) {
                Attempt::Success(value) => return Ok(value),
                Attempt::Fatal(e) => return Err(RetryError::Fatal(e)),
                Attempt::Retry(e) => last = Some(e),
            }

            if attempt < self.max_attempts {
                let mut delay = self.delay_for(attempt - 1);
                if let Some(deadline) = self.deadline {
                    delay = delay.min(deadline.saturating_sub(started.elapsed()));
                }
                if !delay.is_zero() {
                    sleep(delay);
                }
            }
        }

        match last {
            Some(last) => Err(RetryError::Exhausted {
                attempts: self.max_attempts,
                last,
            }),
            None => Err(RetryError::TimedOut {
                attempts: self.max_attempts,
                last: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_on_first_success() {
        let policy = RetryPolicy::immediate(5);
        let mut calls = 0;
        let result: Result<u32, RetryError<&str>> = policy.run(|n| {
            calls += 1;
            if n == 2 {
                Attempt::Success(n)
            } else {
                Attempt::Retry("empty")
            }
        });
        assert_eq!(result, Ok(2));
        assert_eq!(calls, 2);
    }

    #[test]
    fn exhausts_after_max_attempts() {
        let policy = RetryPolicy::immediate(3);
        let mut calls = 0;
        let result: Result<(), _> = policy.run(|_| {
            calls += 1;
            Attempt::Retry("nope")
        });
        assert_eq!(
            result,
            Err(RetryError::Exhausted {
                attempts: 3,
                last: "nope"
            })
        );
        assert_eq!(calls, 3);
    }

    #[test]
    fn fatal_short_circuits() {
        let policy = RetryPolicy::immediate(3);
        let mut calls = 0;
        let result: Result<(), _> = policy.run(|_| {
            calls += 1;
            Attempt::Fatal("bad request")
        });
        assert_eq!(result, Err(RetryError::Fatal("bad request")));
        assert_eq!(calls, 1);
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 10,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(500),
            deadline: None,
        };
        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(2), Duration::from_millis(400));
        assert_eq!(policy.delay_for(3), Duration::from_millis(500));
        assert_eq!(policy.delay_for(40), Duration::from_millis(500));
    }

    #[test]
    fn sleeps_between_attempts_only() {
        let policy = RetryPolicy::new(3).with_base_delay(Duration::from_millis(10));
        let mut slept = Vec::new();
        let _: Result<(), _> = policy.run_with_sleep(|_| Attempt::Retry(()), |d| slept.push(d));
        assert_eq!(
            slept,
            vec![Duration::from_millis(10), Duration::from_millis(20)]
        );
    }

    #[test]
    fn deadline_stops_retrying() {
        let policy = RetryPolicy::immediate(100).with_deadline(Duration::ZERO);
        let result: Result<(), RetryError<()>> = policy.run(|_| Attempt::Retry(()));
        assert_eq!(
            result,
            Err(RetryError::TimedOut {
                attempts: 0,
                last: None
            })
        );
    }
}
