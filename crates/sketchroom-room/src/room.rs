//! Room actor: an isolated Tokio task that owns one [`Room`].
//!
//! The outside world talks to it through a [`RoomHandle`]. Commands and
//! timer events are handled one at a time, so room state needs no locks
//! and one room can never block another.

use std::ops::ControlFlow;

use sketchroom_protocol::{PlayerSummary, RoomCode, Stroke};
use sketchroom_transport::ConnectionId;
use tokio::sync::{mpsc, oneshot};

use crate::state::PlayerSender;
use crate::{GameConfig, Room, RoomError, RoundPhase, WordBank};

/// Commands sent to a room actor through its channel.
///
/// Variants with a `reply` are request/response; the rest are
/// fire-and-forget.
pub(crate) enum RoomCommand {
    Join {
        conn: ConnectionId,
        name: String,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Replies with the number of players left.
    Leave {
        conn: ConnectionId,
        reply: oneshot::Sender<Result<usize, RoomError>>,
    },

    StartGame {
        by: ConnectionId,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    Guess {
        conn: ConnectionId,
        text: String,
    },

    Stroke {
        conn: ConnectionId,
        stroke: Stroke,
    },

    GetInfo {
        reply: oneshot::Sender<RoomInfo>,
    },

    Shutdown,
}

/// A snapshot of a room for callers outside the actor.
#[derive(Debug, Clone)]
pub struct RoomInfo {
    pub code: RoomCode,
    pub phase: RoundPhase,
    pub player_count: usize,
    pub host: ConnectionId,
    pub drawer: Option<ConnectionId>,
    pub time_remaining: u32,
    /// The hint as non-drawers currently see it.
    pub hint: String,
    /// Scoreboard in join order.
    pub scores: Vec<PlayerSummary>,
}

impl RoomInfo {
    fn of(room: &Room) -> Self {
        Self {
            code: room.code().clone(),
            phase: room.phase(),
            player_count: room.player_count(),
            host: room.host(),
            drawer: room.drawer(),
            time_remaining: room.time_remaining(),
            hint: room.hint().to_string(),
            scores: room.scores(),
        }
    }
}

/// Handle to a running room actor.
///
/// Cheap to clone. The [`RoomManager`](crate::RoomManager) keeps one per
/// room; the gateway clones it so it can talk to the room without holding
/// the registry lock.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Seats a connection in the room.
    pub async fn join(
        &self,
        conn: ConnectionId,
        name: String,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Join {
            conn,
            name,
            sender,
            reply,
        })
        .await?
    }

    /// Unseats a connection. Returns how many players remain.
    pub async fn leave(&self, conn: ConnectionId) -> Result<usize, RoomError> {
        self.request(|reply| RoomCommand::Leave { conn, reply })
            .await?
    }

    /// Asks the room to start the game on behalf of `by`.
    pub async fn start_game(&self, by: ConnectionId) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::StartGame { by, reply })
            .await?
    }

    /// Submits a chat line / guess (fire-and-forget).
    pub async fn guess(
        &self,
        conn: ConnectionId,
        text: String,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Guess { conn, text }).await
    }

    /// Submits a canvas event for relay (fire-and-forget).
    pub async fn stroke(
        &self,
        conn: ConnectionId,
        stroke: Stroke,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Stroke { conn, stroke }).await
    }

    pub async fn get_info(&self) -> Result<RoomInfo, RoomError> {
        self.request(|reply| RoomCommand::GetInfo { reply }).await
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::Shutdown).await
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(make(reply_tx)).await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }
}

/// The actor task's state: the room plus its inbox.
struct RoomActor {
    room: Room,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Runs until shutdown or until every handle is dropped.
    async fn run(mut self) {
        tracing::info!(room = %self.room.code(), "room actor started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => {
                    let Some(cmd) = cmd else { break };
                    if self.handle(cmd).is_break() {
                        break;
                    }
                }
                event = self.room.next_timer() => self.room.on_timer(event),
            }
        }

        tracing::info!(room = %self.room.code(), "room actor stopped");
    }

    fn handle(&mut self, cmd: RoomCommand) -> ControlFlow<()> {
        match cmd {
            RoomCommand::Join {
                conn,
                name,
                sender,
                reply,
            } => {
                let _ = reply.send(self.room.join(conn, name, sender));
            }
            RoomCommand::Leave { conn, reply } => {
                let _ = reply.send(self.room.leave(conn));
            }
            RoomCommand::StartGame { by, reply } => {
                let _ = reply.send(self.room.start_game(by));
            }
            RoomCommand::Guess { conn, text } => {
                if let Err(e) = self.room.guess(conn, &text) {
                    tracing::debug!(room = %self.room.code(), %conn, error = %e, "guess dropped");
                }
            }
            RoomCommand::Stroke { conn, stroke } => {
                if let Err(e) = self.room.relay_stroke(conn, stroke) {
                    tracing::debug!(room = %self.room.code(), %conn, error = %e, "stroke dropped");
                }
            }
            RoomCommand::GetInfo { reply } => {
                let _ = reply.send(RoomInfo::of(&self.room));
            }
            RoomCommand::Shutdown => {
                tracing::info!(room = %self.room.code(), "room shutting down");
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }
}

/// Opens a room with `host` seated and spawns its actor.
///
/// The host's `roomCreated` and the first player list go out before this
/// returns. `channel_size` bounds the command inbox.
pub(crate) fn spawn_room(
    code: RoomCode,
    config: GameConfig,
    words: WordBank,
    host: ConnectionId,
    host_name: String,
    sender: PlayerSender,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);
    let room = Room::open(code.clone(), config, words, host, host_name, sender);

    tokio::spawn(RoomActor { room, receiver: rx }.run());

    RoomHandle { code, sender: tx }
}
