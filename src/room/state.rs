//! Room session state and its reducers
//!
//! `RoomSession` holds the four fields with dedicated semantics (lifecycle,
//! fullscreen target, window target, selected peers) privately. Everything
//! else lives in [`RoomSettings`] and is written through the generic
//! [`RoomUpdate`] setter, which has no variant for the dedicated fields.

use crate::types::{ConsumerId, PeerId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    #[default]
    New,
    Connecting,
    Connected,
    Disconnected,
    Closed,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::New => "new",
            LifecycleState::Connecting => "connecting",
            LifecycleState::Connected => "connected",
            LifecycleState::Disconnected => "disconnected",
            LifecycleState::Closed => "closed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LifecycleState::Closed)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewLayout {
    Auto,
    #[default]
    Democratic,
    Filmstrip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingsTab {
    #[default]
    Media,
    Appearance,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRole {
    pub id: u32,
    pub label: String,
    pub level: u32,
    pub promotable: bool,
}

/// `PascalCase` variant name to its `camelCase` wire name.
fn camel_case(variant: &str) -> String {
    let mut chars = variant.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

macro_rules! room_settings {
    ($( $(#[$doc:meta])* $field:ident : $ty:ty = $default:expr => $variant:ident ),* $(,)?) => {
        /// Room fields writable through the generic setter.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct RoomSettings {
            $( $(#[$doc])* pub $field: $ty, )*
        }

        impl Default for RoomSettings {
            fn default() -> Self {
                Self { $( $field: $default, )* }
            }
        }

        /// Generic `set(key, value)`: one variant per settable field.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "key", content = "value", rename_all = "camelCase")]
        pub enum RoomUpdate {
            $( $variant($ty), )*
        }

        impl RoomUpdate {
            /// Wire name of the field this update writes, as in the `key` tag.
            pub fn key(&self) -> String {
                let variant = match self {
                    $( RoomUpdate::$variant(_) => stringify!($variant), )*
                };
                camel_case(variant)
            }
        }

        impl RoomSettings {
            fn apply(&mut self, update: RoomUpdate) {
                match update {
                    $( RoomUpdate::$variant(value) => self.$field = value, )*
                }
            }
        }
    };
}

room_settings! {
    name: String = String::new() => Name,
    locked: bool = false => Locked,
    in_lobby: bool = false => InLobby,
    sign_in_required: bool = false => SignInRequired,
    over_room_limit: bool = false => OverRoomLimit,
    /// Access code to the room when locked and `join_by_access_code` is set.
    access_code: String = String::new() => AccessCode,
    join_by_access_code: bool = true => JoinByAccessCode,
    /// Cleared whenever the room leaves the connected state.
    active_speaker_id: Option<PeerId> = None => ActiveSpeakerId,
    torrent_support: bool = false => TorrentSupport,
    show_settings: bool = false => ShowSettings,
    /// Display hint only.
    toolbars_visible: bool = true => ToolbarsVisible,
    layout: ViewLayout = ViewLayout::default() => Layout,
    spotlights: Vec<PeerId> = Vec::new() => Spotlights,
    roles_manager_peer: Option<PeerId> = None => RolesManagerPeer,
    settings_open: bool = false => SettingsOpen,
    extra_video_open: bool = false => ExtraVideoOpen,
    hide_self_view: bool = false => HideSelfView,
    roles_manager_open: bool = false => RolesManagerOpen,
    help_open: bool = false => HelpOpen,
    about_open: bool = false => AboutOpen,
    leave_open: bool = false => LeaveOpen,
    current_settings_tab: SettingsTab = SettingsTab::default() => CurrentSettingsTab,
    lock_dialog_open: bool = false => LockDialogOpen,
    joined: bool = false => Joined,
    mute_all_in_progress: bool = false => MuteAllInProgress,
    lobby_peers_promotion_in_progress: bool = false => LobbyPeersPromotionInProgress,
    stop_all_video_in_progress: bool = false => StopAllVideoInProgress,
    stop_all_screen_sharing_in_progress: bool = false => StopAllScreenSharingInProgress,
    close_meeting_in_progress: bool = false => CloseMeetingInProgress,
    clear_chat_in_progress: bool = false => ClearChatInProgress,
    clear_file_sharing_in_progress: bool = false => ClearFileSharingInProgress,
    /// Opaque permission document from the server.
    room_permissions: Option<serde_json::Value> = None => RoomPermissions,
    user_roles: Option<BTreeMap<u32, UserRole>> = None => UserRoles,
    allow_when_role_missing: Option<Vec<String>> = None => AllowWhenRoleMissing,
}

/// What a single state operation changed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "change", rename_all = "camelCase")]
pub enum RoomChange {
    Lifecycle {
        previous: LifecycleState,
        current: LifecycleState,
        cleared_active_speaker: Option<PeerId>,
    },
    Fullscreen {
        previous: Option<ConsumerId>,
        current: Option<ConsumerId>,
    },
    Window {
        previous: Option<ConsumerId>,
        current: Option<ConsumerId>,
    },
    SelectedPeers {
        peers: Vec<PeerId>,
    },
    SpotlightsCleared,
    Updated {
        key: String,
    },
    ConsumerAdded {
        id: ConsumerId,
    },
    ConsumerRemoved {
        id: ConsumerId,
    },
    ConsumerUpdated {
        id: ConsumerId,
        applied: bool,
    },
}

/// Room-level state for one session.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSession {
    lifecycle: LifecycleState,
    full_screen_consumer_id: Option<ConsumerId>,
    window_consumer_id: Option<ConsumerId>,
    selected_peers: Vec<PeerId>,
    #[serde(flatten)]
    settings: RoomSettings,
}

impl RoomSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: RoomSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn lifecycle(&self) -> LifecycleState {
        self.lifecycle
    }

    pub fn full_screen_consumer_id(&self) -> Option<&ConsumerId> {
        self.full_screen_consumer_id.as_ref()
    }

    pub fn window_consumer_id(&self) -> Option<&ConsumerId> {
        self.window_consumer_id.as_ref()
    }

    pub fn selected_peers(&self) -> &[PeerId] {
        &self.selected_peers
    }

    pub fn settings(&self) -> &RoomSettings {
        &self.settings
    }

    /// Any transition is accepted. Leaving (or never reaching) `connected`
    /// drops the active speaker.
    pub fn set_lifecycle(&mut self, next: LifecycleState) -> RoomChange {
        let previous = self.lifecycle;
        self.lifecycle = next;

        let cleared_active_speaker = if next == LifecycleState::Connected {
            None
        } else {
            self.settings.active_speaker_id.take()
        };

        RoomChange::Lifecycle {
            previous,
            current: next,
            cleared_active_speaker,
        }
    }

    /// Clears the fullscreen target if one is set, whichever consumer it is;
    /// otherwise makes `consumer_id` the target. Switching between consumers
    /// therefore takes two calls.
    pub fn toggle_fullscreen(&mut self, consumer_id: ConsumerId) -> RoomChange {
        let previous = self.full_screen_consumer_id.take();
        if previous.is_none() {
            self.full_screen_consumer_id = Some(consumer_id);
        }

        RoomChange::Fullscreen {
            previous,
            current: self.full_screen_consumer_id.clone(),
        }
    }

    /// Clears the window target when it is `consumer_id`, otherwise switches
    /// to `consumer_id`.
    pub fn toggle_window(&mut self, consumer_id: ConsumerId) -> RoomChange {
        let previous = self.window_consumer_id.take();
        if previous.as_ref() != Some(&consumer_id) {
            self.window_consumer_id = Some(consumer_id);
        }

        RoomChange::Window {
            previous,
            current: self.window_consumer_id.clone(),
        }
    }

    /// Appends without deduplication.
    pub fn add_selected_peer(&mut self, peer_id: PeerId) -> RoomChange {
        self.selected_peers.push(peer_id);
        self.selected_peers_change()
    }

    /// Removes every occurrence of `peer_id`, keeping the order of the rest.
    pub fn remove_selected_peer(&mut self, peer_id: &PeerId) -> RoomChange {
        self.selected_peers.retain(|peer| peer != peer_id);
        self.selected_peers_change()
    }

    pub fn clear_selected_peers(&mut self) -> RoomChange {
        self.selected_peers.clear();
        self.selected_peers_change()
    }

    pub fn clear_spotlights(&mut self) -> RoomChange {
        self.settings.spotlights.clear();
        RoomChange::SpotlightsCleared
    }

    pub fn set(&mut self, update: RoomUpdate) -> RoomChange {
        let key = update.key();
        self.settings.apply(update);
        RoomChange::Updated { key }
    }

    fn selected_peers_change(&self) -> RoomChange {
        RoomChange::SelectedPeers {
            peers: self.selected_peers.clone(),
        }
    }
}
