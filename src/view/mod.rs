//! View-side helpers: auto-hiding controls and the fullscreen overlay

pub mod autohide;
pub mod fullscreen;

pub use autohide::AutoHideTimer;
pub use fullscreen::{FullscreenOverlay, FullscreenSnapshot};
