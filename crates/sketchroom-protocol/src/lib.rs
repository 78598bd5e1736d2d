//! Wire protocol for Sketchroom.
//!
//! - **Types** ([`ClientEvent`], [`ServerEvent`], [`RoomCode`],
//!   [`Recipient`]): what travels on the wire and who it is addressed to.
//! - **Codec** ([`Codec`], [`JsonCodec`]): how events become text frames.
//! - **Errors** ([`ProtocolError`]).
//!
//! The protocol layer knows nothing about rooms or rounds. It sits between
//! raw transport frames and the game logic:
//!
//! ```text
//! Transport (frames) → Protocol (ClientEvent) → Room (state machine)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec, NAME_REQUIRED};
pub use error::ProtocolError;
pub use types::{
    ClientEvent, PlayerSummary, Recipient, RoomCode, ServerEvent, Stroke,
    StrokeKind,
};
