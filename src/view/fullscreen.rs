//! Fullscreen overlay model
//!
//! The controls over a fullscreen consumer fade in on hover or touch and
//! fade out again when the pointer leaves or shortly after the touch ends.
//! The collapsible control panel folds itself away once the pointer has
//! been off it for the pointer dwell.

use super::autohide::AutoHideTimer;
use crate::config::{AutoHideConfig, RoomViewConfig};
use crate::consumers::{ConsumerScore, LayerState};
use crate::room::{RoomContext, RoomEvent, RoomSession};
use crate::types::{ConsumerId, ViewportSize};
use serde::Serialize;
use tokio::sync::watch;

/// Read-only view of what the fullscreen view shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FullscreenSnapshot {
    pub consumer_id: ConsumerId,
    pub video_visible: bool,
    pub multi_layer: bool,
    pub layers: Option<LayerState>,
    pub codec: Option<String>,
    pub score: Option<ConsumerScore>,
    pub viewport: ViewportSize,
    pub advanced_mode: bool,
    pub controls_visible: bool,
    pub panel_expanded: bool,
    pub exit_button_visible: bool,
}

#[derive(Debug)]
pub struct FullscreenOverlay {
    controls: AutoHideTimer,
    panel: AutoHideTimer,
    auto_hide: AutoHideConfig,
    permanent_top_bar: bool,
    advanced_mode: bool,
}

impl FullscreenOverlay {
    /// Controls start hidden and the panel collapsed.
    pub fn new(config: &RoomViewConfig) -> Self {
        Self {
            controls: AutoHideTimer::new(false),
            panel: AutoHideTimer::new(false),
            auto_hide: config.auto_hide.clone(),
            permanent_top_bar: config.view.permanent_top_bar,
            advanced_mode: config.view.advanced_mode,
        }
    }

    pub fn controls_visible(&self) -> bool {
        self.controls.is_visible()
    }

    pub fn panel_expanded(&self) -> bool {
        self.panel.is_visible()
    }

    pub fn watch_controls(&self) -> watch::Receiver<bool> {
        self.controls.subscribe()
    }

    pub fn watch_panel(&self) -> watch::Receiver<bool> {
        self.panel.subscribe()
    }

    pub fn pointer_over(&mut self) {
        self.controls.show();
    }

    pub fn pointer_out(&mut self) {
        self.controls.hide();
    }

    pub fn touch_start(&mut self) {
        self.controls.show();
    }

    pub fn touch_end(&mut self) {
        self.controls.schedule_hide(self.auto_hide.touch_dwell());
    }

    /// Expand or collapse the control panel; returns the new state.
    pub fn toggle_panel(&mut self) -> bool {
        if self.panel.is_visible() {
            self.panel.hide();
        } else {
            self.panel.show();
        }
        self.panel.is_visible()
    }

    pub fn panel_pointer_enter(&mut self) {
        self.panel.cancel();
    }

    pub fn panel_pointer_leave(&mut self) {
        self.panel.schedule_hide(self.auto_hide.pointer_dwell());
    }

    pub fn exit_button_visible(&self, session: &RoomSession) -> bool {
        session.settings().toolbars_visible || self.permanent_top_bar
    }

    /// Leave fullscreen for the consumer currently shown.
    ///
    /// Nothing happens when the fullscreen id does not resolve to a consumer,
    /// since there is no view to exit from.
    pub fn exit(&mut self, room: &mut RoomContext) -> Option<RoomEvent> {
        let id = room.fullscreen_consumer()?.id.clone();
        log::debug!("Exit button pressed for {}", id);
        Some(room.toggle_fullscreen(id))
    }

    pub fn snapshot(&self, room: &RoomContext, viewport: ViewportSize) -> Option<FullscreenSnapshot> {
        let consumer = room.fullscreen_consumer()?;
        Some(FullscreenSnapshot {
            consumer_id: consumer.id.clone(),
            video_visible: consumer.is_visible(),
            multi_layer: consumer.is_layered(),
            layers: consumer.layers().cloned(),
            codec: consumer.codec.clone(),
            score: consumer.score,
            viewport,
            advanced_mode: self.advanced_mode,
            controls_visible: self.controls_visible(),
            panel_expanded: self.panel_expanded(),
            exit_button_visible: self.exit_button_visible(room.session()),
        })
    }

    /// Cancel every pending timer. Visibility is left where it is.
    pub fn teardown(&mut self) {
        self.controls.cancel();
        self.panel.cancel();
    }
}
