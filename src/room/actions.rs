use super::state::{LifecycleState, RoomChange, RoomSession, RoomUpdate};
use crate::types::{ConsumerId, PeerId};
use serde::{Deserialize, Serialize};

/// User or signalling intent against the room session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum RoomAction {
    SetLifecycle(LifecycleState),
    ToggleFullscreen(ConsumerId),
    ToggleWindow(ConsumerId),
    AddSelectedPeer(PeerId),
    RemoveSelectedPeer(PeerId),
    ClearSelectedPeers,
    ClearSpotlights,
    Set(RoomUpdate),
}

impl RoomSession {
    /// Apply one intent and describe what it changed.
    pub fn apply(&mut self, action: RoomAction) -> RoomChange {
        match action {
            RoomAction::SetLifecycle(next) => self.set_lifecycle(next),
            RoomAction::ToggleFullscreen(id) => self.toggle_fullscreen(id),
            RoomAction::ToggleWindow(id) => self.toggle_window(id),
            RoomAction::AddSelectedPeer(peer) => self.add_selected_peer(peer),
            RoomAction::RemoveSelectedPeer(peer) => self.remove_selected_peer(&peer),
            RoomAction::ClearSelectedPeers => self.clear_selected_peers(),
            RoomAction::ClearSpotlights => self.clear_spotlights(),
            RoomAction::Set(update) => self.set(update),
        }
    }
}
