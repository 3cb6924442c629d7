use super::actions::RoomAction;
use super::state::{LifecycleState, RoomChange, RoomSession, RoomSettings, RoomUpdate};
use crate::config::RoomViewConfig;
use crate::consumers::{Consumer, ConsumerRegistry, ConsumerUpdate};
use crate::invariants::EVENT_SEQUENCE_GAP_FREE;
use crate::types::{ConsumerId, PeerId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

/// Change notification published after every applied operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomEvent {
    pub sequence: u64,
    pub at: DateTime<Utc>,
    pub change: RoomChange,
}

/// Context shared between the tasks of one room session.
pub type SharedRoom = Arc<RwLock<RoomContext>>;

/// Owner of one room session's state.
///
/// Create it when the session starts and call [`RoomContext::teardown`] when
/// it ends. All mutation goes through its methods, which apply the change
/// and then notify every subscriber in application order.
#[derive(Debug)]
pub struct RoomContext {
    session_id: Uuid,
    session: RoomSession,
    consumers: ConsumerRegistry,
    subscribers: Vec<mpsc::UnboundedSender<RoomEvent>>,
    sequence: u64,
}

impl RoomContext {
    pub fn new(name: impl Into<String>, config: &RoomViewConfig) -> Self {
        let settings = RoomSettings {
            name: name.into(),
            layout: config.view.default_layout,
            ..RoomSettings::default()
        };

        let session_id = Uuid::new_v4();
        log::info!("Room session {} created for room '{}'", session_id, settings.name);

        Self {
            session_id,
            session: RoomSession::with_settings(settings),
            consumers: ConsumerRegistry::new(),
            subscribers: Vec::new(),
            sequence: 0,
        }
    }

    pub fn into_shared(self) -> SharedRoom {
        Arc::new(RwLock::new(self))
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn session(&self) -> &RoomSession {
        &self.session
    }

    pub fn consumers(&self) -> &ConsumerRegistry {
        &self.consumers
    }

    /// Ordered, lossless feed of every change applied after this call.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<RoomEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.iter().filter(|tx| !tx.is_closed()).count()
    }

    /// Sequence number of the last published event (0 before any).
    pub fn last_sequence(&self) -> u64 {
        self.sequence
    }

    pub fn dispatch(&mut self, action: RoomAction) -> RoomEvent {
        let change = self.session.apply(action);
        self.log_change(&change);
        self.publish(change)
    }

    pub fn set_lifecycle(&mut self, next: LifecycleState) -> RoomEvent {
        self.dispatch(RoomAction::SetLifecycle(next))
    }

    pub fn toggle_fullscreen(&mut self, consumer_id: impl Into<ConsumerId>) -> RoomEvent {
        self.dispatch(RoomAction::ToggleFullscreen(consumer_id.into()))
    }

    pub fn toggle_window(&mut self, consumer_id: impl Into<ConsumerId>) -> RoomEvent {
        self.dispatch(RoomAction::ToggleWindow(consumer_id.into()))
    }

    pub fn add_selected_peer(&mut self, peer_id: impl Into<PeerId>) -> RoomEvent {
        self.dispatch(RoomAction::AddSelectedPeer(peer_id.into()))
    }

    pub fn remove_selected_peer(&mut self, peer_id: impl Into<PeerId>) -> RoomEvent {
        self.dispatch(RoomAction::RemoveSelectedPeer(peer_id.into()))
    }

    pub fn clear_selected_peers(&mut self) -> RoomEvent {
        self.dispatch(RoomAction::ClearSelectedPeers)
    }

    pub fn clear_spotlights(&mut self) -> RoomEvent {
        self.dispatch(RoomAction::ClearSpotlights)
    }

    pub fn set(&mut self, update: RoomUpdate) -> RoomEvent {
        self.dispatch(RoomAction::Set(update))
    }

    pub fn add_consumer(&mut self, consumer: Consumer) -> RoomEvent {
        let id = consumer.id.clone();
        if self.consumers.insert(consumer).is_some() {
            log::debug!("Consumer {} replaced", id);
        }
        self.publish(RoomChange::ConsumerAdded { id })
    }

    pub fn remove_consumer(&mut self, id: &ConsumerId) -> RoomEvent {
        if self.consumers.remove(id).is_none() {
            log::debug!("Removing unknown consumer {}", id);
        }
        self.publish(RoomChange::ConsumerRemoved { id: id.clone() })
    }

    pub fn update_consumer(&mut self, id: &ConsumerId, update: ConsumerUpdate) -> RoomEvent {
        let applied = self.consumers.apply(id, update);
        self.publish(RoomChange::ConsumerUpdated {
            id: id.clone(),
            applied,
        })
    }

    /// The fullscreen consumer, or `None` when unset or dangling.
    pub fn fullscreen_consumer(&self) -> Option<&Consumer> {
        self.resolve(self.session.full_screen_consumer_id())
    }

    /// The window consumer, or `None` when unset or dangling.
    pub fn window_consumer(&self) -> Option<&Consumer> {
        self.resolve(self.session.window_consumer_id())
    }

    /// Close the session and drop every subscription.
    pub fn teardown(&mut self) {
        if self.session.lifecycle() != LifecycleState::Closed {
            self.set_lifecycle(LifecycleState::Closed);
        }
        self.subscribers.clear();
        log::info!("Room session {} torn down", self.session_id);
    }

    fn resolve(&self, id: Option<&ConsumerId>) -> Option<&Consumer> {
        let id = id?;
        let consumer = self.consumers.get(id);
        if consumer.is_none() {
            log::debug!("Consumer {} referenced by room state is gone", id);
        }
        consumer
    }

    fn publish(&mut self, change: RoomChange) -> RoomEvent {
        let next = self.sequence.wrapping_add(1);
        crate::assert_invariant!(
            next > self.sequence,
            EVENT_SEQUENCE_GAP_FREE,
            "RoomContext::publish"
        );
        self.sequence = next;

        let event = RoomEvent {
            sequence: self.sequence,
            at: Utc::now(),
            change,
        };

        self.subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
        event
    }

    fn log_change(&self, change: &RoomChange) {
        match change {
            RoomChange::Lifecycle { previous, current, .. } => {
                log::info!("Room {} lifecycle {} -> {}", self.session_id, previous, current)
            }
            RoomChange::Fullscreen { current: Some(id), .. } => {
                log::info!("Consumer {} entered fullscreen", id)
            }
            RoomChange::Fullscreen { previous, current: None } => {
                log::info!("Fullscreen cleared (was {:?})", previous.as_ref().map(|id| id.as_str()))
            }
            RoomChange::Window { current, .. } => {
                log::info!("Window consumer now {:?}", current.as_ref().map(|id| id.as_str()))
            }
            other => log::debug!("Room change: {:?}", other),
        }
    }
}
