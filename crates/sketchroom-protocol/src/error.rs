//! Error types for the protocol layer.

/// Errors raised while turning events into frames and back.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// An outbound event could not be serialized.
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// An inbound frame was not valid JSON or named no known event.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// The frame parsed but carries nothing the server can act on,
    /// e.g. an empty display name.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
