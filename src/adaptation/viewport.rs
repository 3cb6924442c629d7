//! Debounced viewport size source
//!
//! Raw resize events are broadcast with the instant they happened. Each
//! subscription runs its own [`Debouncer`], so subscribing again restarts
//! the sequence from the current size.

use super::debounce::Debouncer;
use crate::types::ViewportSize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{self, Instant};

const RAW_EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy)]
struct RawResize {
    size: ViewportSize,
    at: Instant,
}

/// Producer side: feed it every raw resize.
#[derive(Debug, Clone)]
pub struct ViewportSource {
    tx: broadcast::Sender<RawResize>,
    current: Arc<Mutex<ViewportSize>>,
    settle: Duration,
}

impl ViewportSource {
    pub fn new(initial: ViewportSize, settle: Duration) -> Self {
        let (tx, _) = broadcast::channel(RAW_EVENT_CAPACITY);
        Self {
            tx,
            current: Arc::new(Mutex::new(initial)),
            settle,
        }
    }

    pub fn resize(&self, size: ViewportSize) {
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = size;
        // No subscribers is fine: the next subscription starts from `current`.
        let _ = self.tx.send(RawResize {
            size,
            at: Instant::now(),
        });
    }

    pub fn current(&self) -> ViewportSize {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn settle_window(&self) -> Duration {
        self.settle
    }

    /// Start a debounced sequence seeded with the current size.
    pub fn subscribe(&self) -> DebouncedViewport {
        let rx = self.tx.subscribe();
        let mut debouncer = Debouncer::new(self.settle);
        debouncer.push(self.current(), Instant::now().into_std());
        DebouncedViewport {
            rx,
            current: Arc::clone(&self.current),
            debouncer,
            closed: false,
        }
    }
}

/// Consumer side: yields a size only after it has been stable for the
/// settle window and differs from the previous yielded size.
#[derive(Debug)]
pub struct DebouncedViewport {
    rx: broadcast::Receiver<RawResize>,
    current: Arc<Mutex<ViewportSize>>,
    debouncer: Debouncer<ViewportSize>,
    closed: bool,
}

impl DebouncedViewport {
    /// Next settled size; `None` once the source is gone and nothing is pending.
    pub async fn next(&mut self) -> Option<ViewportSize> {
        loop {
            let deadline = self.debouncer.deadline().map(Instant::from_std);

            match (deadline, self.closed) {
                (None, true) => return None,
                (Some(deadline), true) => {
                    time::sleep_until(deadline).await;
                    if let Some(size) = self.debouncer.poll(Instant::now().into_std()) {
                        return Some(size);
                    }
                }
                (Some(deadline), false) => {
                    tokio::select! {
                        biased;
                        raw = self.rx.recv() => {
                            if let Some(size) = self.ingest(raw) {
                                return Some(size);
                            }
                        }
                        _ = time::sleep_until(deadline) => {
                            if let Some(size) = self.debouncer.poll(Instant::now().into_std()) {
                                return Some(size);
                            }
                        }
                    }
                }
                (None, false) => {
                    let raw = self.rx.recv().await;
                    if let Some(size) = self.ingest(raw) {
                        return Some(size);
                    }
                }
            }
        }
    }

    /// Restart the settle window from the current size.
    ///
    /// The current size is yielded again once it has been stable for a full
    /// window, even if it equals the last yielded size.
    pub fn rearm(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) => {}
                Err(broadcast::error::TryRecvError::Empty) => break,
                Err(broadcast::error::TryRecvError::Closed) => {
                    self.closed = true;
                    break;
                }
            }
        }
        let current = *self.current.lock().unwrap_or_else(|e| e.into_inner());
        self.debouncer.reset();
        self.debouncer.push(current, Instant::now().into_std());
    }

    /// Last size this subscription yielded.
    pub fn settled(&self) -> Option<ViewportSize> {
        self.debouncer.settled().copied()
    }

    fn ingest(&mut self, raw: Result<RawResize, broadcast::error::RecvError>) -> Option<ViewportSize> {
        match raw {
            Ok(RawResize { size, at }) => {
                // A value whose window closed before this event still counts.
                let settled = self.debouncer.poll(at.into_std());
                self.debouncer.push(size, at.into_std());
                settled
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                log::debug!("Viewport subscription skipped {} raw resize events", skipped);
                None
            }
            Err(broadcast::error::RecvError::Closed) => {
                self.closed = true;
                None
            }
        }
    }
}
