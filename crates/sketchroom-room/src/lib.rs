//! Rooms, rounds, and the room registry for Sketchroom.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns its
//! players, its round state and its timers.
//!
//! # Key types
//!
//! - [`Room`]: one room's state and the round rules, as synchronous
//!   transitions
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`RoomManager`]: creates/destroys rooms and tracks memberships
//! - [`WordBank`]: where secret words come from
//! - [`GameConfig`] / [`RoundPhase`]: tunables and the round phase machine

mod config;
mod error;
mod hint;
mod manager;
mod player;
mod room;
mod round;
mod state;
mod words;

pub use config::{GameConfig, RoundPhase};
pub use error::RoomError;
pub use hint::Hint;
pub use manager::RoomManager;
pub use player::{PALETTE, Player};
pub use room::{RoomHandle, RoomInfo};
pub use state::{PlayerSender, Room, TimerEvent};
pub use words::WordBank;
