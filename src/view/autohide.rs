//! Single-shot, cancellable visibility timer
//!
//! One timer owns one visibility flag. Scheduling a hide always cancels the
//! previous one first, and every show or explicit hide cancels too, so a
//! stale timer can never re-hide controls after an intentional re-show.

use crate::invariants::SINGLE_PENDING_HIDE;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug)]
pub struct AutoHideTimer {
    visible: Arc<watch::Sender<bool>>,
    generation: Arc<AtomicU64>,
    pending: Option<JoinHandle<()>>,
}

impl AutoHideTimer {
    pub fn new(initially_visible: bool) -> Self {
        let (visible, _) = watch::channel(initially_visible);
        Self {
            visible: Arc::new(visible),
            generation: Arc::new(AtomicU64::new(0)),
            pending: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        *self.visible.borrow()
    }

    /// Whether a hide is scheduled and has not fired yet.
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Watch the visibility flag.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.visible.subscribe()
    }

    /// Cancel any pending hide and mark visible.
    pub fn show(&mut self) {
        self.cancel();
        set_visible(&self.visible, true);
    }

    /// Cancel any pending hide and mark hidden now.
    pub fn hide(&mut self) {
        self.cancel();
        set_visible(&self.visible, false);
    }

    /// Hide after `dwell` unless cancelled first. Replaces any pending hide.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule_hide(&mut self, dwell: Duration) {
        self.cancel();
        crate::assert_invariant!(self.pending.is_none(), SINGLE_PENDING_HIDE, "AutoHideTimer::schedule_hide");

        let scheduled = self.generation.load(Ordering::SeqCst);
        let generation = Arc::clone(&self.generation);
        let visible = Arc::clone(&self.visible);

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(dwell).await;
            // Checked under the channel lock so a concurrent cancel + show wins.
            visible.send_if_modified(|shown| {
                if generation.load(Ordering::SeqCst) != scheduled || !*shown {
                    return false;
                }
                *shown = false;
                true
            });
        }));
        log::trace!("Hide scheduled in {:?}", dwell);
    }

    /// Cancel the pending hide, if any. Visibility is left as is.
    pub fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }
}

impl Drop for AutoHideTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn set_visible(flag: &watch::Sender<bool>, value: bool) {
    flag.send_if_modified(|current| {
        if *current == value {
            return false;
        }
        *current = value;
        true
    });
}
