//! Testing utilities for roomview
//!
//! A recording transport and consumer fixtures shaped like what a real
//! room client produces, so adaptation can be exercised without a media
//! server.

use crate::adaptation::{AdaptationRequest, MediaTransport};
use crate::consumers::{Consumer, LayerState, MediaSource};
use crate::errors::TransportError;
use crate::types::{ConsumerId, ViewportSize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Recorded {
    requests: Vec<AdaptationRequest>,
    failures: VecDeque<TransportError>,
    attempts: usize,
}

/// Transport that remembers every successful request.
///
/// Clones share the same record, so a test can keep one handle and give
/// another to a controller or driver.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Successful requests in the order they were made.
    pub fn requests(&self) -> Vec<AdaptationRequest> {
        self.lock().requests.clone()
    }

    pub fn last(&self) -> Option<AdaptationRequest> {
        self.lock().requests.last().cloned()
    }

    /// Calls made, failed ones included.
    pub fn attempts(&self) -> usize {
        self.lock().attempts
    }

    /// Make the next call fail with `error`. Queued failures are used in order.
    pub fn fail_next(&self, error: TransportError) {
        self.lock().failures.push_back(error);
    }

    pub fn clear(&self) {
        let mut recorded = self.lock();
        recorded.requests.clear();
        recorded.attempts = 0;
    }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl MediaTransport for RecordingTransport {
    fn request_layer_adaptation(
        &self,
        consumer_id: &ConsumerId,
        viewport_width: u32,
        viewport_height: u32,
    ) -> Result<(), TransportError> {
        let mut recorded = self.lock();
        recorded.attempts += 1;
        if let Some(error) = recorded.failures.pop_front() {
            return Err(error);
        }
        recorded.requests.push(AdaptationRequest::new(
            consumer_id.clone(),
            ViewportSize::new(viewport_width, viewport_height),
        ));
        Ok(())
    }
}

/// Simulcast webcam: three spatial and three temporal layers up to 720p.
pub fn layered_consumer(id: &str) -> Consumer {
    Consumer::layered(
        id,
        format!("peer-{}", id),
        MediaSource::Webcam,
        LayerState::new(3, 3, 1280, 720),
    )
}

/// Screen share with two spatial layers up to 1080p.
pub fn layered_screen(id: &str) -> Consumer {
    Consumer::layered(
        id,
        format!("peer-{}", id),
        MediaSource::Screen,
        LayerState::new(2, 1, 1920, 1080),
    )
}

/// Plain single-stream consumer, e.g. audio or a non-simulcast video.
pub fn simple_consumer(id: &str) -> Consumer {
    Consumer::simple(id, format!("peer-{}", id), MediaSource::Webcam)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_record() {
        let transport = RecordingTransport::new();
        let handle = transport.clone();
        transport
            .request_layer_adaptation(&ConsumerId::new("c1"), 800, 600)
            .unwrap();
        assert_eq!(handle.requests().len(), 1);
        assert_eq!(handle.last().unwrap().viewport(), ViewportSize::new(800, 600));
    }

    #[test]
    fn queued_failures_are_consumed_in_order() {
        let transport = RecordingTransport::new();
        transport.fail_next(TransportError::Closed);
        let id = ConsumerId::new("c1");

        assert_eq!(
            transport.request_layer_adaptation(&id, 1, 1),
            Err(TransportError::Closed)
        );
        assert!(transport.request_layer_adaptation(&id, 1, 1).is_ok());
        assert_eq!(transport.attempts(), 2);
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn fixtures_have_expected_shape() {
        assert!(layered_consumer("a").is_layered());
        assert!(layered_screen("b").is_layered());
        assert!(!simple_consumer("c").is_layered());
        assert_eq!(simple_consumer("c").peer_id.as_str(), "peer-c");
    }
}
