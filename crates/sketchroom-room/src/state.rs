//! Per-room state owned by a room actor.
//!
//! [`Room`] is plain data plus synchronous transitions (see `round.rs`).
//! It has no locks: exactly one actor task owns it and feeds it commands
//! and timer events one at a time.

use sketchroom_protocol::{PlayerSummary, Recipient, RoomCode, ServerEvent};
use sketchroom_tick::{Deadline, TickScheduler};
use sketchroom_transport::ConnectionId;
use tokio::sync::mpsc;

use crate::hint::Hint;
use crate::player::Player;
use crate::{GameConfig, RoundPhase, WordBank};

/// Channel for delivering outbound events to one connection.
///
/// Unbounded so a slow client never stalls the room; the gateway drains
/// it into the socket.
pub type PlayerSender = mpsc::UnboundedSender<ServerEvent>;

/// Which of the room's timers fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// One second of the round countdown elapsed.
    ///
    /// `skipped` counts whole seconds that passed unobserved before it.
    Tick { skipped: u64 },
    /// The pause between rounds is over.
    IntermissionEnd,
}

/// A player in a seat, with the channel that reaches them.
#[derive(Debug)]
pub(crate) struct Seat {
    pub(crate) conn: ConnectionId,
    pub(crate) player: Player,
    pub(crate) sender: PlayerSender,
}

/// One game room: its seats in join order and the round in progress.
#[derive(Debug)]
pub struct Room {
    pub(crate) code: RoomCode,
    pub(crate) config: GameConfig,
    pub(crate) words: WordBank,
    /// Join order. Drawer rotation walks this list.
    pub(crate) seats: Vec<Seat>,
    pub(crate) host: ConnectionId,
    pub(crate) drawer: Option<ConnectionId>,
    /// Rotation cursor into `seats`.
    pub(crate) drawer_index: usize,
    pub(crate) word: String,
    pub(crate) hint: Hint,
    pub(crate) time_remaining: u32,
    pub(crate) phase: RoundPhase,
    /// The room's single round countdown, 1 Hz.
    pub(crate) countdown: TickScheduler,
    pub(crate) intermission: Deadline,
}

impl Room {
    /// Opens a room with `host` as its only player.
    ///
    /// The host is told the room code, then gets the first player list.
    pub fn open(
        code: RoomCode,
        config: GameConfig,
        words: WordBank,
        host: ConnectionId,
        host_name: impl Into<String>,
        sender: PlayerSender,
    ) -> Self {
        let room = Self {
            code,
            config,
            words,
            seats: vec![Seat {
                conn: host,
                player: Player::new(host_name),
                sender,
            }],
            host,
            drawer: None,
            drawer_index: 0,
            word: String::new(),
            hint: Hint::default(),
            time_remaining: 0,
            phase: RoundPhase::Idle,
            countdown: TickScheduler::with_rate(1),
            intermission: Deadline::new(),
        };

        tracing::info!(room = %room.code, conn = %host, "room opened");
        room.send_to(host, ServerEvent::RoomCreated(room.code.clone()));
        room.dispatch(Recipient::All, ServerEvent::PlayerList(room.scores()));
        room
    }

    // -- accessors ---------------------------------------------------------

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn host(&self) -> ConnectionId {
        self.host
    }

    /// The current drawer. Set while a round runs and during the pause
    /// after it.
    pub fn drawer(&self) -> Option<ConnectionId> {
        self.drawer
    }

    pub fn drawer_index(&self) -> usize {
        self.drawer_index
    }

    /// The secret word, empty while idle.
    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn hint(&self) -> &Hint {
        &self.hint
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn player_count(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    pub fn contains(&self, conn: ConnectionId) -> bool {
        self.seat(conn).is_some()
    }

    pub fn player(&self, conn: ConnectionId) -> Option<&Player> {
        self.seat(conn).map(|s| &s.player)
    }

    /// Seated connections in join order.
    pub fn connections(&self) -> Vec<ConnectionId> {
        self.seats.iter().map(|s| s.conn).collect()
    }

    /// Scoreboard in join order.
    pub fn scores(&self) -> Vec<PlayerSummary> {
        self.seats.iter().map(|s| s.player.summary()).collect()
    }

    pub fn countdown_running(&self) -> bool {
        self.countdown.is_running()
    }

    pub fn intermission_pending(&self) -> bool {
        self.intermission.is_armed()
    }

    // -- timers ------------------------------------------------------------

    /// Waits for whichever room timer fires next.
    ///
    /// Pends forever while neither is armed. Cancel-safe, so it can sit in
    /// a `select!` next to the command channel.
    pub async fn next_timer(&mut self) -> TimerEvent {
        tokio::select! {
            info = self.countdown.wait_for_tick() => TimerEvent::Tick {
                skipped: info.ticks_skipped,
            },
            () = self.intermission.elapsed() => TimerEvent::IntermissionEnd,
        }
    }

    /// Applies a fired timer.
    pub fn on_timer(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::Tick { skipped } => {
                if skipped > 0 {
                    tracing::debug!(room = %self.code, skipped, "countdown fell behind");
                }
                self.on_tick();
            }
            TimerEvent::IntermissionEnd => self.on_intermission_end(),
        }
    }

    // -- fan-out -----------------------------------------------------------

    pub(crate) fn seat(&self, conn: ConnectionId) -> Option<&Seat> {
        self.seats.iter().find(|s| s.conn == conn)
    }

    pub(crate) fn seat_mut(&mut self, conn: ConnectionId) -> Option<&mut Seat> {
        self.seats.iter_mut().find(|s| s.conn == conn)
    }

    /// Sends `event` to every seat `to` addresses.
    pub(crate) fn dispatch(&self, to: Recipient, event: ServerEvent) {
        for seat in self.seats.iter().filter(|s| to.includes(s.conn)) {
            // A closed receiver means the connection is going away; its
            // leave command is already on the way.
            let _ = seat.sender.send(event.clone());
        }
    }

    pub(crate) fn send_to(&self, conn: ConnectionId, event: ServerEvent) {
        self.dispatch(Recipient::Player(conn), event);
    }

    pub(crate) fn broadcast_message(&self, text: impl Into<String>) {
        self.dispatch(Recipient::All, ServerEvent::Message(text.into()));
    }

    pub(crate) fn set_phase(&mut self, next: RoundPhase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "illegal phase change {} -> {}",
            self.phase,
            next
        );
        tracing::debug!(room = %self.code, from = %self.phase, to = %next, "phase change");
        self.phase = next;
    }
}
