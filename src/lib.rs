//! roomview: room session and view state for multi-party video conferencing clients
//!
//! This crate holds the client-side state of one room session and keeps the
//! fullscreen video matched to the window it is shown in.
//!
//! # Features
//! - Room session state with fullscreen/window toggles and lifecycle cleanup
//! - Registry of remote media consumers, simple and layered (simulcast/SVC)
//! - Debounced viewport tracking driving layer adaptation requests
//! - Cancellable auto-hide timers for overlay controls
//! - Ordered change notifications for every state operation
//!
//! # Usage
//! ```rust,ignore
//! use roomview::adaptation::{AdaptationDriver, LoggingTransport, ViewportSource};
//! use roomview::{RoomContext, RoomViewConfig, ViewportSize};
//!
//! #[tokio::main]
//! async fn main() {
//!     roomview::init_logging();
//!     let config = RoomViewConfig::load_or_default();
//!     let room = RoomContext::new("standup", &config).into_shared();
//!     let viewport = ViewportSource::new(ViewportSize::new(1280, 720), config.adaptation.settle_window());
//!
//!     let task = AdaptationDriver::new(room.clone(), &viewport, LoggingTransport, &config.adaptation)
//!         .await
//!         .spawn();
//!     room.write().await.toggle_fullscreen("consumer-1");
//!     viewport.resize(ViewportSize::new(1920, 1080));
//!     // ...
//!     room.write().await.teardown();
//!     task.shutdown().await;
//! }
//! ```
pub mod adaptation;
pub mod config;
pub mod consumers;
pub mod errors;
pub mod invariants;
pub mod room;
pub mod types;
pub mod view;

// Testing utilities - recording transport and consumer fixtures
pub mod testing;

// Re-exports for convenience
pub use config::RoomViewConfig;
pub use consumers::{Consumer, ConsumerKind, ConsumerRegistry, ConsumerUpdate, LayerState, MediaSource};
pub use errors::{RoomError, TransportError};
pub use room::{
    LifecycleState, RoomAction, RoomChange, RoomContext, RoomEvent, RoomSession, RoomUpdate,
    SharedRoom,
};
pub use types::{ConsumerId, PeerId, ViewportSize};
pub use view::{AutoHideTimer, FullscreenOverlay};

/// Initialize logging for roomview
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "roomview=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get crate information
pub fn get_info() -> CrateInfo {
    CrateInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: DESCRIPTION.to_string(),
    }
}

/// Crate information structure
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CrateInfo {
    pub name: String,
    pub version: String,
    pub description: String,
}
