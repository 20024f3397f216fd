//! Debouncing of rapid input such as search-as-you-type

use std::time::{Duration, Instant};
use tokio::sync::mpsc;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Keeps only the latest value and releases it after a quiet period
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    /// Replace any pending value and restart the quiet period
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    /// The pending value, once `delay` has passed since the last push
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, at)) if now.saturating_duration_since(*at) >= self.delay => {
                self.pending.take().map(|(value, _)| value)
            }
            _ => None,
        }
    }

    /// When the pending value becomes due
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at + self.delay)
    }

    /// Take the pending value without waiting
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

/// Forward values from `input`, dropping any followed by another within
/// `delay`. A value still pending when `input` closes is delivered.
pub fn debounced<T: Send + 'static>(mut input: mpsc::Receiver<T>, delay: Duration) -> mpsc::Receiver<T> {
    let (tx, rx) = mpsc::channel(16);

    tokio::spawn(async move {
        let mut debouncer = Debouncer::new(delay);
        loop {
            let deadline = debouncer.deadline();
            let due = tokio::time::Instant::from_std(deadline.unwrap_or_else(Instant::now));

            tokio::select! {
                value = input.recv() => match value {
                    Some(value) => debouncer.push(value, Instant::now()),
                    None => {
                        if let Some(value) = debouncer.flush() {
                            let _ = tx.send(value).await;
                        }
                        break;
                    }
                },
                _ = tokio::time::sleep_until(due), if deadline.is_some() => {
                    if let Some(value) = debouncer.poll(Instant::now()) {
                        if tx.send(value).await.is_err() {
                            break;
                        }
                    }
                }
            }
        }
    });

    rx
}
