//! Settle-window debouncer
//!
//! A small state machine, `Idle -> Pending(value, deadline) -> Settled`,
//! that knows nothing about event loops. Callers feed raw values with the
//! instant they were observed and poll with the current instant.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
enum DebounceState<T> {
    Idle,
    Pending { value: T, deadline: Instant },
    Settled(T),
}

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    settle: Duration,
    state: DebounceState<T>,
    /// Last value handed out by `poll`, for change-by-value suppression.
    emitted: Option<T>,
}

impl<T: Clone + PartialEq> Debouncer<T> {
    pub fn new(settle: Duration) -> Self {
        Self {
            settle,
            state: DebounceState::Idle,
            emitted: None,
        }
    }

    pub fn settle_window(&self) -> Duration {
        self.settle
    }

    /// Record a raw value. Any pending value is replaced and the settle
    /// window restarts from `at`.
    pub fn push(&mut self, value: T, at: Instant) {
        self.state = DebounceState::Pending {
            value,
            deadline: at + self.settle,
        };
    }

    /// When the pending value will settle, if one is pending.
    pub fn deadline(&self) -> Option<Instant> {
        match &self.state {
            DebounceState::Pending { deadline, .. } => Some(*deadline),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, DebounceState::Pending { .. })
    }

    /// The most recently settled value, if any.
    pub fn settled(&self) -> Option<&T> {
        match &self.state {
            DebounceState::Settled(value) => Some(value),
            _ => self.emitted.as_ref(),
        }
    }

    /// Settle the pending value once its deadline has passed.
    ///
    /// Returns the value only when it differs from the last one returned;
    /// a burst that ends where it started yields nothing.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let value = match &self.state {
            DebounceState::Pending { value, deadline } if now >= *deadline => value.clone(),
            _ => return None,
        };

        self.state = DebounceState::Settled(value.clone());
        if self.emitted.as_ref() == Some(&value) {
            return None;
        }
        self.emitted = Some(value.clone());
        Some(value)
    }

    /// Drop a pending value without settling it.
    pub fn cancel(&mut self) {
        if self.is_pending() {
            self.state = match self.emitted.clone() {
                Some(value) => DebounceState::Settled(value),
                None => DebounceState::Idle,
            };
        }
    }

    /// Forget everything, including the last emitted value.
    pub fn reset(&mut self) {
        self.state = DebounceState::Idle;
        self.emitted = None;
    }
}
