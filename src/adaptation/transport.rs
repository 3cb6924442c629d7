//! Media transport boundary
//!
//! The room client that actually renegotiates layers with the media server
//! lives outside this crate. It plugs in through [`MediaTransport`].

use crate::errors::TransportError;
use crate::types::{ConsumerId, ViewportSize};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Ask the pipeline to deliver layers matching this viewport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptationRequest {
    pub consumer_id: ConsumerId,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl AdaptationRequest {
    pub fn new(consumer_id: ConsumerId, viewport: ViewportSize) -> Self {
        Self {
            consumer_id,
            viewport_width: viewport.width,
            viewport_height: viewport.height,
        }
    }

    pub fn viewport(&self) -> ViewportSize {
        ViewportSize::new(self.viewport_width, self.viewport_height)
    }
}

/// Fire-and-forget layer adaptation. Implementations must not block; no
/// acknowledgement is awaited beyond the returned failure.
pub trait MediaTransport: Send + Sync {
    fn request_layer_adaptation(
        &self,
        consumer_id: &ConsumerId,
        viewport_width: u32,
        viewport_height: u32,
    ) -> Result<(), TransportError>;
}

impl<T: MediaTransport + ?Sized> MediaTransport for Arc<T> {
    fn request_layer_adaptation(
        &self,
        consumer_id: &ConsumerId,
        viewport_width: u32,
        viewport_height: u32,
    ) -> Result<(), TransportError> {
        (**self).request_layer_adaptation(consumer_id, viewport_width, viewport_height)
    }
}

impl<T: MediaTransport + ?Sized> MediaTransport for Box<T> {
    fn request_layer_adaptation(
        &self,
        consumer_id: &ConsumerId,
        viewport_width: u32,
        viewport_height: u32,
    ) -> Result<(), TransportError> {
        (**self).request_layer_adaptation(consumer_id, viewport_width, viewport_height)
    }
}

/// Hands requests to whatever task owns the room client.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<AdaptationRequest>,
}

impl ChannelTransport {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<AdaptationRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl MediaTransport for ChannelTransport {
    fn request_layer_adaptation(
        &self,
        consumer_id: &ConsumerId,
        viewport_width: u32,
        viewport_height: u32,
    ) -> Result<(), TransportError> {
        self.tx
            .send(AdaptationRequest {
                consumer_id: consumer_id.clone(),
                viewport_width,
                viewport_height,
            })
            .map_err(|_| TransportError::Closed)
    }
}

/// Logs requests and drops them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingTransport;

impl MediaTransport for LoggingTransport {
    fn request_layer_adaptation(
        &self,
        consumer_id: &ConsumerId,
        viewport_width: u32,
        viewport_height: u32,
    ) -> Result<(), TransportError> {
        log::info!(
            "Layer adaptation for consumer {} at {}x{}",
            consumer_id,
            viewport_width,
            viewport_height
        );
        Ok(())
    }
}
