//! Pipeline progress reporting.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Minimum spacing between forwarded updates.
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(200);

/// Trait for receiving progress updates at pipeline checkpoints.
pub trait ProgressSink {
    /// Called when a step starts or advances (`current` of `total` steps).
    fn on_step(&self, step: &str, current: usize, total: usize);

    /// Called once when the operation is complete.
    fn on_complete(&self, message: &str);
}

/// A no-op progress reporter that discards all updates.
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn on_step(&self, _step: &str, _current: usize, _total: usize) {}
    fn on_complete(&self, _message: &str) {}
}

/// A progress reporter that logs to the `log` crate.
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn on_step(&self, step: &str, current: usize, total: usize) {
        log::info!("  [{}/{}] {}", current, total, step);
    }

    fn on_complete(&self, message: &str) {
        log::info!("{}", message);
    }
}

/// Forwards at most one step update per interval; completion always goes through.
pub struct Throttled<P> {
    inner: P,
    interval: Duration,
    last: Cell<Option<Instant>>,
}

impl<P: ProgressSink> Throttled<P> {
    pub fn new(inner: P) -> Self {
        Self::with_interval(inner, DEFAULT_THROTTLE)
    }

    pub fn with_interval(inner: P, interval: Duration) -> Self {
        Self {
            inner,
            interval,
            last: Cell::new(None),
        }
    }

    pub fn into_inner(self) -> P {
        self.inner
    }
}

impl<P: ProgressSink> ProgressSink for Throttled<P> {
    fn on_step(&self, step: &str, current: usize, total: usize) {
        let now = Instant::now();
        let due = self
            .last
            .get()
            .is_none_or(|last| now.duration_since(last) >= self.interval);
        if due {
            self.last.set(Some(now));
            self.inner.on_step(step, current, total);
        }
    }

    fn on_complete(&self, message: &str) {
        self.inner.on_complete(message);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        steps: RefCell<Vec<String>>,
        completed: Cell<bool>,
    }

    impl ProgressSink for &Recorder {
        fn on_step(&self, step: &str, _current: usize, _total: usize) {
            self.steps.borrow_mut().push(step.to_string());
        }

        fn on_complete(&self, _message: &str) {
            self.completed.set(true);
        }
    }

    #[test]
    fn bursts_are_throttled() {
        let recorder = Recorder::default();
        let throttled = Throttled::with_interval(&recorder, Duration::from_secs(60));
        throttled.on_step("read", 1, 3);
        throttled.on_step("extract", 2, 3);
        throttled.on_step("translate", 3, 3);
        throttled.on_complete("done");
        assert_eq!(*recorder.steps.borrow(), vec!["read"]);
        assert!(recorder.completed.get());
    }

    #[test]
    fn zero_interval_forwards_everything() {
        let recorder = Recorder::default();
        let throttled = Throttled::with_interval(&recorder, Duration::ZERO);
        throttled.on_step("a", 1, 2);
        throttled.on_step("b", 2, 2);
        assert_eq!(recorder.steps.borrow().len(), 2);
    }
}
