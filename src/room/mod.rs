pub mod actions;
pub mod context;
pub mod state;

pub use actions::RoomAction;
pub use context::{RoomContext, RoomEvent, SharedRoom};
pub use state::{
    LifecycleState, RoomChange, RoomSession, RoomSettings, RoomUpdate, SettingsTab, UserRole,
    ViewLayout,
};
