//! Error types for the room layer.

use sketchroom_protocol::RoomCode;
use sketchroom_transport::ConnectionId;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No live room has this code.
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// The sender lacks the role this action needs, e.g. a non-host
    /// starting the game or a non-drawer sending strokes.
    #[error("not allowed: {0}")]
    Unauthorized(String),

    /// Too few players to start or continue a game.
    #[error("need at least {need} players, have {have}")]
    InsufficientPlayers { have: usize, need: usize },

    /// The room's phase doesn't allow this operation.
    #[error("invalid room state for this operation: {0}")]
    InvalidState(String),

    /// The connection is already seated in this room.
    #[error("{0} already in room {1}")]
    AlreadyInRoom(ConnectionId, RoomCode),

    /// The connection is not seated in this room.
    #[error("{0} not in room {1}")]
    NotInRoom(ConnectionId, RoomCode),

    /// The room's actor has stopped or its command channel is closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),

    /// Game settings that no round could run under.
    #[error("invalid game config: {0}")]
    InvalidConfig(String),

    /// The word bank has nothing to draw from.
    #[error("word bank is empty")]
    EmptyWordBank,
}
