//! Unified error type for the Sketchroom server.

use sketchroom_protocol::ProtocolError;
use sketchroom_room::RoomError;
use sketchroom_transport::TransportError;

use crate::ConfigError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` conversions let `?` lift any layer's error into this one.
#[derive(Debug, thiserror::Error)]
pub enum SketchError {
    /// A transport-level error (bind, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (not found, unauthorized, invalid state).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// Bad startup configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
