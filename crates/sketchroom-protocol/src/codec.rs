//! Turning events into frames and back.
//!
//! The gateway never calls `serde_json` directly; it goes through a
//! [`Codec`] so the frame format lives in one place.

use serde::{Serialize, de::DeserializeOwned};

use crate::{ClientEvent, ProtocolError};

/// Why a `createRoom` or `joinRoom` with a blank name was refused.
pub const NAME_REQUIRED: &str = "Please enter a name!";

/// Encodes outbound values to text frames and decodes inbound frames.
///
/// `Send + Sync + 'static` so one codec can sit in the shared server state
/// and be used from every connection task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into one text frame.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Parses one inbound frame.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;

    /// Parses a client frame and rejects events that are well-formed but
    /// unusable.
    ///
    /// The `InvalidMessage` text is meant to be shown to the player.
    fn decode_client(&self, data: &[u8]) -> Result<ClientEvent, ProtocolError> {
        let event: ClientEvent = self.decode(data)?;
        match &event {
            ClientEvent::CreateRoom(name)
            | ClientEvent::JoinRoom {
                player_name: name, ..
            } if name.trim().is_empty() => Err(ProtocolError::InvalidMessage(
                NAME_REQUIRED.into(),
            )),
            _ => Ok(event),
        }
    }
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`.
///
/// ```rust
/// use sketchroom_protocol::{Codec, JsonCodec, ServerEvent};
///
/// let frame = JsonCodec.encode(&ServerEvent::TimerUpdate(80)).unwrap();
/// assert_eq!(frame, r#"{"event":"timerUpdate","data":80}"#);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
