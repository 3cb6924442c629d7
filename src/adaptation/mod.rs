//! Layer adaptation for the fullscreen consumer
//!
//! A settled viewport size plus a layered fullscreen consumer turns into one
//! fire-and-forget request to the media transport. Simple consumers and
//! dangling ids are ignored.

pub mod controller;
pub mod debounce;
pub mod driver;
pub mod layers;
pub mod transport;
pub mod viewport;

pub use controller::LayerAdaptationController;
pub use debounce::Debouncer;
pub use driver::{AdaptationDriver, AdaptationTask};
pub use layers::{layer_resolution, select_layers, LayerSelection};
pub use transport::{AdaptationRequest, ChannelTransport, LoggingTransport, MediaTransport};
pub use viewport::{DebouncedViewport, ViewportSource};
