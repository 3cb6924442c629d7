//! Task that keeps the fullscreen consumer's layers matched to the viewport
//!
//! Wakes on settled viewport sizes and on room change notifications, and
//! re-reads the shared room every time so a timer that fires after the
//! fullscreen target changed sees the current target.

use super::controller::LayerAdaptationController;
use super::transport::MediaTransport;
use super::viewport::{DebouncedViewport, ViewportSource};
use crate::config::AdaptationConfig;
use crate::errors::RoomError;
use crate::room::{RoomEvent, SharedRoom};
use crate::types::ViewportSize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

pub struct AdaptationDriver<T> {
    room: SharedRoom,
    controller: LayerAdaptationController<T>,
    viewport: DebouncedViewport,
    events: mpsc::UnboundedReceiver<RoomEvent>,
    failures: Option<mpsc::UnboundedSender<RoomError>>,
    enabled: bool,
}

impl<T: MediaTransport + 'static> AdaptationDriver<T> {
    /// Subscribe to the room and the viewport source.
    ///
    /// With adaptation disabled the driver still follows the room so it stops
    /// on teardown, but never reaches the transport.
    pub async fn new(
        room: SharedRoom,
        source: &ViewportSource,
        transport: T,
        config: &AdaptationConfig,
    ) -> Self {
        let events = room.write().await.subscribe();
        Self {
            room,
            controller: LayerAdaptationController::new(transport),
            viewport: source.subscribe(),
            events,
            failures: None,
            enabled: config.enabled,
        }
    }

    /// Forward transport failures to `tx` as well as logging them.
    pub fn report_failures(mut self, tx: mpsc::UnboundedSender<RoomError>) -> Self {
        self.failures = Some(tx);
        self
    }

    pub fn spawn(self) -> AdaptationTask<T> {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(self.run(shutdown_rx));
        AdaptationTask {
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Run until shutdown, room teardown or the viewport source going away.
    pub async fn run(mut self, mut shutdown: oneshot::Receiver<()>) -> LayerAdaptationController<T> {
        if self.enabled {
            log::debug!("Layer adaptation driver started");
        } else {
            log::info!("Layer adaptation disabled by configuration");
        }

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    log::debug!("Layer adaptation driver shutting down");
                    break;
                }
                event = self.events.recv() => match event {
                    Some(_) => self.evaluate(None).await,
                    None => {
                        log::debug!("Room notifications closed, stopping adaptation");
                        break;
                    }
                },
                size = self.viewport.next() => match size {
                    Some(size) => self.evaluate(Some(size)).await,
                    None => {
                        log::debug!("Viewport source closed, stopping adaptation");
                        break;
                    }
                },
            }
        }

        self.controller
    }

    async fn evaluate(&mut self, settled: Option<ViewportSize>) {
        if !self.enabled {
            return;
        }

        let room = self.room.read().await;
        let result = match settled {
            Some(size) => self.controller.on_viewport_settled(size, &room),
            None => self.controller.evaluate(&room),
        };
        drop(room);

        if self.controller.take_refocus() {
            self.viewport.rearm();
        }

        if let Err(err) = result {
            log::warn!("Layer adaptation failed: {}", err);
            if let Some(tx) = &self.failures {
                let _ = tx.send(err);
            }
        }
    }
}

/// Handle to a spawned driver. Dropping it aborts the task.
pub struct AdaptationTask<T> {
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<LayerAdaptationController<T>>>,
}

impl<T> AdaptationTask<T> {
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Stop the driver and get its controller back.
    pub async fn shutdown(mut self) -> Option<LayerAdaptationController<T>> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let handle = self.handle.take()?;
        match handle.await {
            Ok(controller) => Some(controller),
            Err(e) => {
                log::warn!("Layer adaptation driver ended abnormally: {}", e);
                None
            }
        }
    }
}

impl<T> Drop for AdaptationTask<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
