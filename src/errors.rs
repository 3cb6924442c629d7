use thiserror::Error;

/// Failure reported by the media transport when asked to adapt layers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The transport is gone (room client torn down, channel closed).
    #[error("Transport closed")]
    Closed,
    /// The media pipeline refused the request for this consumer.
    #[error("Layer adaptation rejected for consumer {consumer_id}: {reason}")]
    Rejected { consumer_id: String, reason: String },
    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum RoomError {
    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RoomError {
    /// True for failures the next qualifying trigger may clear on its own.
    pub fn is_transient(&self) -> bool {
        match self {
            RoomError::Transport(TransportError::Closed) => false,
            RoomError::Transport(_) => true,
            RoomError::Config(_) | RoomError::Io(_) => false,
        }
    }
}

impl From<config::ConfigError> for RoomError {
    fn from(err: config::ConfigError) -> Self {
        RoomError::Config(err.to_string())
    }
}
