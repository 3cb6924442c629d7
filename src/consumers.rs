//! Consumer registry
//!
//! Local records of the remote tracks this client receives. Records are
//! created, updated and removed by the media pipeline; the rest of the crate
//! only reads them.

use crate::types::{ConsumerId, PeerId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What the remote track carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaSource {
    Mic,
    Webcam,
    Screen,
    ExtraVideo,
}

/// Simulcast/SVC layer bookkeeping for a layered consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerState {
    pub spatial_layers: u8,
    pub temporal_layers: u8,
    /// Resolution of the highest spatial layer.
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub current_spatial_layer: Option<u8>,
    #[serde(default)]
    pub current_temporal_layer: Option<u8>,
    #[serde(default)]
    pub preferred_spatial_layer: Option<u8>,
    #[serde(default)]
    pub preferred_temporal_layer: Option<u8>,
}

impl LayerState {
    pub fn new(spatial_layers: u8, temporal_layers: u8, width: u32, height: u32) -> Self {
        Self {
            spatial_layers,
            temporal_layers,
            width,
            height,
            current_spatial_layer: None,
            current_temporal_layer: None,
            preferred_spatial_layer: None,
            preferred_temporal_layer: None,
        }
    }
}

/// Single-layer or multi-layer capable consumer.
///
/// Layer state only exists for layered consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ConsumerKind {
    Simple,
    Layered(LayerState),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerScore {
    pub score: u8,
    pub producer_score: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consumer {
    pub id: ConsumerId,
    pub peer_id: PeerId,
    pub source: MediaSource,
    pub kind: ConsumerKind,
    #[serde(default)]
    pub locally_paused: bool,
    #[serde(default)]
    pub remotely_paused: bool,
    #[serde(default)]
    pub codec: Option<String>,
    #[serde(default)]
    pub score: Option<ConsumerScore>,
}

impl Consumer {
    pub fn simple(id: impl Into<ConsumerId>, peer_id: impl Into<PeerId>, source: MediaSource) -> Self {
        Self {
            id: id.into(),
            peer_id: peer_id.into(),
            source,
            kind: ConsumerKind::Simple,
            locally_paused: false,
            remotely_paused: false,
            codec: None,
            score: None,
        }
    }

    pub fn layered(
        id: impl Into<ConsumerId>,
        peer_id: impl Into<PeerId>,
        source: MediaSource,
        layers: LayerState,
    ) -> Self {
        Self {
            kind: ConsumerKind::Layered(layers),
            ..Self::simple(id, peer_id, source)
        }
    }

    /// Visible iff paused neither locally nor remotely.
    pub fn is_visible(&self) -> bool {
        !self.locally_paused && !self.remotely_paused
    }

    pub fn is_layered(&self) -> bool {
        matches!(self.kind, ConsumerKind::Layered(_))
    }

    pub fn layers(&self) -> Option<&LayerState> {
        match &self.kind {
            ConsumerKind::Layered(layers) => Some(layers),
            ConsumerKind::Simple => None,
        }
    }

    fn layers_mut(&mut self) -> Option<&mut LayerState> {
        match &mut self.kind {
            ConsumerKind::Layered(layers) => Some(layers),
            ConsumerKind::Simple => None,
        }
    }
}

/// Which side paused a consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PauseOrigin {
    Local,
    Remote,
}

/// Mutation reported by the media pipeline for an existing consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "update", rename_all = "camelCase")]
pub enum ConsumerUpdate {
    Paused { origin: PauseOrigin, paused: bool },
    CurrentLayers { spatial: Option<u8>, temporal: Option<u8> },
    PreferredLayers { spatial: u8, temporal: u8 },
    Score(ConsumerScore),
}

/// Every consumer known to the room session, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ConsumerRegistry {
    consumers: HashMap<ConsumerId, Consumer>,
}

impl ConsumerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a consumer, returning the previous record.
    pub fn insert(&mut self, consumer: Consumer) -> Option<Consumer> {
        self.consumers.insert(consumer.id.clone(), consumer)
    }

    pub fn remove(&mut self, id: &ConsumerId) -> Option<Consumer> {
        self.consumers.remove(id)
    }

    pub fn get(&self, id: &ConsumerId) -> Option<&Consumer> {
        self.consumers.get(id)
    }

    pub fn contains(&self, id: &ConsumerId) -> bool {
        self.consumers.contains_key(id)
    }

    /// Apply a pipeline update. Returns whether anything was applied.
    ///
    /// Unknown ids and layer updates against simple consumers are ignored.
    pub fn apply(&mut self, id: &ConsumerId, update: ConsumerUpdate) -> bool {
        let Some(consumer) = self.consumers.get_mut(id) else {
            log::debug!("Ignoring update for unknown consumer {}", id);
            return false;
        };

        match update {
            ConsumerUpdate::Paused { origin, paused } => {
                match origin {
                    PauseOrigin::Local => consumer.locally_paused = paused,
                    PauseOrigin::Remote => consumer.remotely_paused = paused,
                }
                true
            }
            ConsumerUpdate::Score(score) => {
                consumer.score = Some(score);
                true
            }
            ConsumerUpdate::CurrentLayers { spatial, temporal } => match consumer.layers_mut() {
                Some(layers) => {
                    layers.current_spatial_layer = spatial;
                    layers.current_temporal_layer = temporal;
                    true
                }
                None => {
                    log::debug!("Simple consumer {} has no layers to update", id);
                    false
                }
            },
            ConsumerUpdate::PreferredLayers { spatial, temporal } => match consumer.layers_mut() {
                Some(layers) => {
                    layers.preferred_spatial_layer = Some(spatial);
                    layers.preferred_temporal_layer = Some(temporal);
                    true
                }
                None => {
                    log::debug!("Simple consumer {} has no layers to prefer", id);
                    false
                }
            },
        }
    }

    pub fn len(&self) -> usize {
        self.consumers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Consumer> {
        self.consumers.values()
    }

    pub fn for_peer<'a>(&'a self, peer_id: &'a PeerId) -> impl Iterator<Item = &'a Consumer> + 'a {
        self.consumers.values().filter(move |c| &c.peer_id == peer_id)
    }

    pub fn clear(&mut self) {
        self.consumers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn webcam(id: &str) -> Consumer {
        Consumer::layered(id, "p1", MediaSource::Webcam, LayerState::new(3, 3, 1280, 720))
    }

    #[test]
    fn visibility_needs_both_sides_unpaused() {
        let mut registry = ConsumerRegistry::new();
        registry.insert(webcam("c1"));
        let id = ConsumerId::new("c1");
        assert!(registry.get(&id).unwrap().is_visible());

        registry.apply(&id, ConsumerUpdate::Paused { origin: PauseOrigin::Remote, paused: true });
        assert!(!registry.get(&id).unwrap().is_visible());

        registry.apply(&id, ConsumerUpdate::Paused { origin: PauseOrigin::Local, paused: true });
        registry.apply(&id, ConsumerUpdate::Paused { origin: PauseOrigin::Remote, paused: false });
        assert!(!registry.get(&id).unwrap().is_visible());

        registry.apply(&id, ConsumerUpdate::Paused { origin: PauseOrigin::Local, paused: false });
        assert!(registry.get(&id).unwrap().is_visible());
    }

    #[test]
    fn simple_consumers_reject_layer_updates() {
        let mut registry = ConsumerRegistry::new();
        registry.insert(Consumer::simple("a1", "p1", MediaSource::Mic));
        let id = ConsumerId::new("a1");

        assert!(!registry.apply(&id, ConsumerUpdate::PreferredLayers { spatial: 1, temporal: 1 }));
        assert!(!registry.apply(&id, ConsumerUpdate::CurrentLayers { spatial: Some(0), temporal: None }));
        assert!(registry.get(&id).unwrap().layers().is_none());
    }

    #[test]
    fn layered_consumers_track_current_and_preferred() {
        let mut registry = ConsumerRegistry::new();
        registry.insert(webcam("c1"));
        let id = ConsumerId::new("c1");

        assert!(registry.apply(&id, ConsumerUpdate::CurrentLayers { spatial: Some(2), temporal: Some(1) }));
        assert!(registry.apply(&id, ConsumerUpdate::PreferredLayers { spatial: 1, temporal: 2 }));

        let layers = registry.get(&id).unwrap().layers().unwrap();
        assert_eq!(layers.current_spatial_layer, Some(2));
        assert_eq!(layers.current_temporal_layer, Some(1));
        assert_eq!(layers.preferred_spatial_layer, Some(1));
        assert_eq!(layers.preferred_temporal_layer, Some(2));
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut registry = ConsumerRegistry::new();
        assert!(!registry.apply(&ConsumerId::new("ghost"), ConsumerUpdate::Score(ConsumerScore::default())));
        assert!(registry.is_empty());
    }

    #[test]
    fn for_peer_filters_by_owner() {
        let mut registry = ConsumerRegistry::new();
        registry.insert(webcam("c1"));
        registry.insert(Consumer::simple("c2", "p2", MediaSource::Mic));
        registry.insert(Consumer::simple("c3", "p1", MediaSource::Mic));

        let p1 = PeerId::new("p1");
        let mut ids: Vec<&str> = registry.for_peer(&p1).map(|c| c.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["c1", "c3"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn consumer_kind_serializes_with_type_tag() {
        let simple = serde_json::to_value(ConsumerKind::Simple).unwrap();
        assert_eq!(simple["type"], "simple");

        let layered: Consumer = serde_json::from_value(serde_json::json!({
            "id": "c1",
            "peerId": "p1",
            "source": "webcam",
            "kind": { "type": "layered", "spatialLayers": 3, "temporalLayers": 3, "width": 1280, "height": 720 }
        }))
        .unwrap();
        assert!(layered.is_layered());
        assert!(layered.is_visible());
        assert_eq!(layered.layers().unwrap().spatial_layers, 3);
    }
}
