use super::transport::{AdaptationRequest, MediaTransport};
use crate::consumers::Consumer;
use crate::errors::RoomError;
use crate::invariants::ADAPT_LAYERED_ONLY;
use crate::room::RoomContext;
use crate::types::{ConsumerId, ViewportSize};

/// The part of the fullscreen consumer adaptation depends on.
///
/// `None` stands for "no adaptable consumer": nothing fullscreen, a dangling
/// id, or a simple consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AdaptationTarget {
    consumer_id: ConsumerId,
    spatial_layers: u8,
    temporal_layers: u8,
}

impl AdaptationTarget {
    fn resolve(consumer: Option<&Consumer>) -> Option<Self> {
        let consumer = consumer?;
        let layers = consumer.layers()?;
        Some(Self {
            consumer_id: consumer.id.clone(),
            spatial_layers: layers.spatial_layers,
            temporal_layers: layers.temporal_layers,
        })
    }
}

/// Requests layers matching the fullscreen viewport for layered consumers.
///
/// Each evaluation compares the resolved target and the settled viewport
/// with the previous evaluation by value and issues at most one request
/// when either changed. When a different consumer becomes the target, the
/// controller waits for the next settled viewport instead of reusing the
/// one it already has. Failures are returned to the caller and never
/// retried; the inputs still count as seen.
#[derive(Debug)]
pub struct LayerAdaptationController<T> {
    transport: T,
    viewport: Option<ViewportSize>,
    target: Option<AdaptationTarget>,
    awaiting_settle: bool,
    refocused: bool,
    last_inputs: Option<(Option<AdaptationTarget>, ViewportSize)>,
    issued: u64,
}

impl<T: MediaTransport> LayerAdaptationController<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            viewport: None,
            target: None,
            awaiting_settle: false,
            refocused: false,
            last_inputs: None,
            issued: 0,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Latest settled viewport, if one has arrived.
    pub fn viewport(&self) -> Option<ViewportSize> {
        self.viewport
    }

    /// Number of requests handed to the transport, failed ones included.
    pub fn issued(&self) -> u64 {
        self.issued
    }

    /// True while a new target waits for the viewport to settle.
    pub fn is_awaiting_settle(&self) -> bool {
        self.awaiting_settle
    }

    /// Whether the target moved to another consumer since the last call.
    ///
    /// The owner of the viewport sequence restarts its settle window when
    /// this returns true.
    pub fn take_refocus(&mut self) -> bool {
        std::mem::take(&mut self.refocused)
    }

    /// Record a newly settled viewport and evaluate against current state.
    pub fn on_viewport_settled(
        &mut self,
        viewport: ViewportSize,
        room: &RoomContext,
    ) -> Result<Option<AdaptationRequest>, RoomError> {
        self.viewport = Some(viewport);
        self.awaiting_settle = false;
        self.target = AdaptationTarget::resolve(room.fullscreen_consumer());
        self.adapt(room)
    }

    /// Re-resolve the fullscreen consumer after a room change.
    ///
    /// A change of layer counts on the current target adapts right away. A
    /// new target only adapts once the next viewport has settled.
    pub fn evaluate(&mut self, room: &RoomContext) -> Result<Option<AdaptationRequest>, RoomError> {
        let target = AdaptationTarget::resolve(room.fullscreen_consumer());
        let refocus = match (&self.target, &target) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(prev), Some(next)) => prev.consumer_id != next.consumer_id,
        };
        self.target = target;

        if refocus {
            log::debug!("Fullscreen target changed, waiting for the viewport to settle");
            self.awaiting_settle = true;
            self.refocused = true;
        }
        if self.awaiting_settle {
            return Ok(None);
        }
        self.adapt(room)
    }

    fn adapt(&mut self, room: &RoomContext) -> Result<Option<AdaptationRequest>, RoomError> {
        let Some(viewport) = self.viewport else {
            return Ok(None);
        };

        let inputs = (self.target.clone(), viewport);
        if self.last_inputs.as_ref() == Some(&inputs) {
            return Ok(None);
        }
        let (target, viewport) = inputs.clone();
        self.last_inputs = Some(inputs);

        let Some(target) = target else {
            log::debug!("No layered fullscreen consumer, skipping adaptation at {}", viewport);
            return Ok(None);
        };

        crate::assert_invariant!(
            room.consumers()
                .get(&target.consumer_id)
                .is_some_and(Consumer::is_layered),
            ADAPT_LAYERED_ONLY,
            "LayerAdaptationController::adapt"
        );

        let request = AdaptationRequest::new(target.consumer_id, viewport);
        self.issued += 1;
        self.transport
            .request_layer_adaptation(&request.consumer_id, viewport.width, viewport.height)
            .map_err(|e| {
                log::warn!("Layer adaptation for {} failed: {}", request.consumer_id, e);
                RoomError::from(e)
            })?;

        log::debug!("Requested layers for {} at {}", request.consumer_id, viewport);
        Ok(Some(request))
    }

    /// Forget the last evaluated inputs so the next evaluation adapts again.
    pub fn reset(&mut self) {
        self.last_inputs = None;
    }
}
