//! # Sketchroom
//!
//! A real-time multiplayer drawing and guessing game server.
//!
//! Players gather in rooms identified by short codes. Each round one player
//! draws a secret word while the others guess it in chat; a correct guess
//! scores and passes the pen to the next player.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sketchroom::prelude::*;
//!
//! # async fn run() -> Result<(), SketchError> {
//! let config = Config::from_env()?;
//! let server = SketchServer::builder().config(&config).build().await?;
//! server.run().await
//! # }
//! ```

pub mod config;
mod error;
mod handler;
mod server;

pub use config::{Config, ConfigError};
pub use error::SketchError;
pub use server::{SketchServer, SketchServerBuilder};

/// The types most embedders need.
pub mod prelude {
    pub use crate::{Config, ConfigError, SketchError, SketchServer, SketchServerBuilder};
    pub use sketchroom_protocol::{ClientEvent, PlayerSummary, RoomCode, ServerEvent};
    pub use sketchroom_room::{GameConfig, RoundPhase, WordBank};
}
