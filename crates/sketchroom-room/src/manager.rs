//! Room registry: creates, tracks, and tears down rooms.

use std::collections::HashMap;

use sketchroom_protocol::RoomCode;
use sketchroom_transport::ConnectionId;

use crate::room::spawn_room;
use crate::state::PlayerSender;
use crate::{GameConfig, RoomError, RoomHandle, RoomInfo, WordBank};

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Tracks every live room and which room each connection sits in.
///
/// A connection is in at most one room at a time; creating or joining a
/// room while seated elsewhere leaves the old room first. A room is
/// removed as soon as its last player leaves.
pub struct RoomManager {
    rooms: HashMap<RoomCode, RoomHandle>,
    memberships: HashMap<ConnectionId, RoomCode>,
    config: GameConfig,
    words: WordBank,
}

impl RoomManager {
    /// Creates an empty registry. Every room it opens uses `config` and
    /// draws from `words`.
    pub fn new(config: GameConfig, words: WordBank) -> Self {
        Self {
            rooms: HashMap::new(),
            memberships: HashMap::new(),
            config,
            words,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Opens a room with `host` as its only player and returns its code.
    ///
    /// Codes are regenerated until one is not in use.
    pub async fn create_room(
        &mut self,
        host: ConnectionId,
        host_name: String,
        sender: PlayerSender,
    ) -> RoomCode {
        self.leave_current(host).await;

        let code = loop {
            let candidate = RoomCode::random();
            if !self.rooms.contains_key(&candidate) {
                break candidate;
            }
            tracing::debug!(room = %candidate, "room code collision, retrying");
        };

        let handle = spawn_room(
            code.clone(),
            self.config.clone(),
            self.words.clone(),
            host,
            host_name,
            sender,
            DEFAULT_CHANNEL_SIZE,
        );
        self.rooms.insert(code.clone(), handle);
        self.memberships.insert(host, code.clone());
        tracing::info!(room = %code, %host, rooms = self.rooms.len(), "room created");
        code
    }

    /// Seats `conn` in the room named by `code`.
    pub async fn join_room(
        &mut self,
        code: &RoomCode,
        conn: ConnectionId,
        name: String,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        let handle = self
            .rooms
            .get(code)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;

        if self.memberships.get(&conn) == Some(code) {
            return Err(RoomError::AlreadyInRoom(conn, code.clone()));
        }
        self.leave_current(conn).await;

        handle.join(conn, name, sender).await?;
        self.memberships.insert(conn, code.clone());
        Ok(())
    }

    /// Unseats `conn` from its room, destroying the room if it empties.
    pub async fn remove_player(
        &mut self,
        conn: ConnectionId,
    ) -> Result<(), RoomError> {
        let code = self.memberships.remove(&conn).ok_or_else(|| {
            RoomError::InvalidState(format!("{conn} is not in any room"))
        })?;
        let handle = self
            .rooms
            .get(&code)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;

        match handle.leave(conn).await {
            Ok(0) => self.destroy_room(&code).await,
            Ok(_) => Ok(()),
            Err(RoomError::Unavailable(_)) => {
                // The actor is gone; forget the room so nobody joins it.
                tracing::warn!(room = %code, "room actor unavailable, dropping room");
                self.forget_room(&code);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Shuts a room down and forgets everyone seated in it.
    pub async fn destroy_room(&mut self, code: &RoomCode) -> Result<(), RoomError> {
        let handle = self
            .rooms
            .get(code)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        let _ = handle.shutdown().await;
        self.forget_room(code);
        tracing::info!(room = %code, rooms = self.rooms.len(), "room destroyed");
        Ok(())
    }

    /// Returns a handle to a live room.
    pub fn get(&self, code: &RoomCode) -> Option<RoomHandle> {
        self.rooms.get(code).cloned()
    }

    pub async fn get_room_info(&self, code: &RoomCode) -> Result<RoomInfo, RoomError> {
        let handle = self
            .rooms
            .get(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        handle.get_info().await
    }

    /// The room `conn` is seated in, if any.
    pub fn room_of(&self, conn: ConnectionId) -> Option<RoomCode> {
        self.memberships.get(&conn).cloned()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn room_codes(&self) -> Vec<RoomCode> {
        self.rooms.keys().cloned().collect()
    }

    async fn leave_current(&mut self, conn: ConnectionId) {
        if !self.memberships.contains_key(&conn) {
            return;
        }
        if let Err(e) = self.remove_player(conn).await {
            tracing::warn!(%conn, error = %e, "failed to leave previous room");
        }
    }

    fn forget_room(&mut self, code: &RoomCode) {
        self.rooms.remove(code);
        self.memberships.retain(|_, c| c != code);
    }
}

impl Default for RoomManager {
    fn default() -> Self {
        Self::new(GameConfig::default(), WordBank::builtin())
    }
}
