//! Round transitions: the rules of the game.
//!
//! Every method here runs to completion on the room actor, so no two
//! transitions ever interleave. Each one mutates [`Room`] and fans the
//! resulting events out before returning.

use serde_json::Value;
use sketchroom_protocol::{Recipient, ServerEvent, Stroke};
use sketchroom_transport::ConnectionId;
use tracing::{debug, info, trace};

use crate::hint::Hint;
use crate::player::Player;
use crate::state::{PlayerSender, Seat};
use crate::{Room, RoomError, RoundPhase};

impl Room {
    // =====================================================================
    // Membership
    // =====================================================================

    /// Seats `conn` at the end of the join order.
    ///
    /// The joiner gets `joinedRoom`, the room gets a fresh player list, and
    /// a joiner arriving mid-round is caught up on the drawer, the hint and
    /// the clock.
    pub fn join(
        &mut self,
        conn: ConnectionId,
        name: impl Into<String>,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        if self.contains(conn) {
            return Err(RoomError::AlreadyInRoom(conn, self.code.clone()));
        }

        self.seats.push(Seat {
            conn,
            player: Player::new(name),
            sender,
        });
        info!(
            room = %self.code,
            %conn,
            players = self.seats.len(),
            "player joined"
        );

        self.send_to(conn, ServerEvent::JoinedRoom(self.code.clone()));
        self.dispatch(Recipient::All, ServerEvent::PlayerList(self.scores()));

        // Mid-round or between rounds, show the joiner where the game is.
        if self.phase.is_active() {
            if let Some(drawer_name) = self.drawer_name() {
                self.send_to(conn, ServerEvent::DrawerChanged { drawer_name });
            }
            self.send_to(
                conn,
                ServerEvent::ShowHint {
                    hint: self.hint.to_string(),
                },
            );
            self.send_to(conn, ServerEvent::TimerUpdate(self.time_remaining));
        }
        Ok(())
    }

    /// Unseats `conn` and returns how many players remain.
    ///
    /// Keeps the rotation cursor on the same upcoming player, hands the
    /// host role on if needed, and applies the round rules: a room below
    /// the minimum pauses, and a departed drawer is replaced at once.
    pub fn leave(&mut self, conn: ConnectionId) -> Result<usize, RoomError> {
        let pos = self
            .seats
            .iter()
            .position(|s| s.conn == conn)
            .ok_or_else(|| RoomError::NotInRoom(conn, self.code.clone()))?;
        let seat = self.seats.remove(pos);
        let remaining = self.seats.len();
        info!(
            room = %self.code,
            %conn,
            name = %seat.player.name,
            players = remaining,
            "player left"
        );

        if remaining == 0 {
            self.countdown.stop();
            self.drawer = None;
            self.word.clear();
            self.phase = RoundPhase::Idle;
            return Ok(0);
        }

        if pos <= self.drawer_index {
            self.drawer_index = (self.drawer_index + remaining - 1) % remaining;
        }

        self.dispatch(Recipient::All, ServerEvent::PlayerList(self.scores()));

        if conn == self.host {
            let next = &self.seats[0];
            self.host = next.conn;
            info!(room = %self.code, host = %next.conn, "host transferred");
            self.broadcast_message(format!(
                "👑 {} is now the host.",
                next.player.name
            ));
        }

        let drawer_left = self.drawer == Some(conn);
        if drawer_left {
            self.drawer = None;
        }

        if self.phase.is_active() && remaining < self.config.min_players {
            self.pause("⚠️ Not enough players, game paused.");
        } else if drawer_left && self.phase == RoundPhase::Active {
            info!(room = %self.code, %conn, "drawer left, rotating");
            self.countdown.stop();
            self.rotate_drawer();
        }

        Ok(remaining)
    }

    // =====================================================================
    // Round lifecycle
    // =====================================================================

    /// Starts the game from idle. Only the host may do this.
    ///
    /// With too few players the room is told so and stays idle.
    pub fn start_game(&mut self, by: ConnectionId) -> Result<(), RoomError> {
        if by != self.host {
            return Err(RoomError::Unauthorized(format!(
                "{by} is not the host of room {}",
                self.code
            )));
        }
        if self.phase != RoundPhase::Idle {
            return Err(RoomError::InvalidState(format!(
                "cannot start a game while {}",
                self.phase
            )));
        }

        let have = self.seats.len();
        let need = self.config.min_players;
        if have < need {
            self.broadcast_message(format!("Need at least {need} players!"));
            return Err(RoomError::InsufficientPlayers { have, need });
        }

        self.drawer_index = 0;
        self.begin_round();
        Ok(())
    }

    /// Moves the cursor to the next seat and starts a round there.
    pub(crate) fn rotate_drawer(&mut self) {
        let n = self.seats.len();
        if n == 0 {
            return;
        }
        self.drawer_index = (self.drawer_index + 1) % n;
        self.begin_round();
    }

    /// Starts a round with the seat under the cursor as drawer.
    ///
    /// Restarting the countdown replaces any countdown still running.
    fn begin_round(&mut self) {
        let n = self.seats.len();
        if n == 0 {
            return;
        }
        self.drawer_index %= n;
        let drawer = self.seats[self.drawer_index].conn;
        let drawer_name = self.seats[self.drawer_index].player.name.clone();

        self.drawer = Some(drawer);
        self.word = self.words.pick().to_owned();
        self.hint = Hint::masked(&self.word);
        self.time_remaining = self.config.round_secs;
        self.set_phase(RoundPhase::Active);
        self.countdown.start();

        info!(
            room = %self.code,
            %drawer,
            drawer_index = self.drawer_index,
            players = n,
            "round started"
        );

        self.dispatch(Recipient::All, ServerEvent::CanvasClear(Value::Null));
        self.broadcast_message(format!("🖊️ {drawer_name} is drawing now!"));
        self.dispatch(Recipient::All, ServerEvent::UpdateScores(self.scores()));
        self.send_to(
            drawer,
            ServerEvent::SetDrawer {
                word: self.word.clone(),
            },
        );
        self.dispatch(
            Recipient::AllExcept(drawer),
            ServerEvent::DrawerChanged { drawer_name },
        );
        self.dispatch(
            Recipient::AllExcept(drawer),
            ServerEvent::ShowHint {
                hint: self.hint.to_string(),
            },
        );
    }

    /// One second of the countdown.
    ///
    /// Broadcasts the clock, reveals a letter at each checkpoint, and ends
    /// the round at zero.
    pub fn on_tick(&mut self) {
        if self.phase != RoundPhase::Active {
            trace!(room = %self.code, phase = %self.phase, "stale tick");
            return;
        }

        self.time_remaining = self.time_remaining.saturating_sub(1);
        trace!(room = %self.code, remaining = self.time_remaining, "tick");
        self.dispatch(Recipient::All, ServerEvent::TimerUpdate(self.time_remaining));

        let elapsed = self.config.round_secs - self.time_remaining;
        if self.config.reveal_at_elapsed.contains(&elapsed) && self.hint.reveal_random() {
            debug!(
                room = %self.code,
                revealed = self.hint.revealed_count(),
                "hint letter revealed"
            );
            if let Some(drawer) = self.drawer {
                self.dispatch(
                    Recipient::AllExcept(drawer),
                    ServerEvent::ShowHint {
                        hint: self.hint.to_string(),
                    },
                );
            }
        }

        if self.time_remaining == 0 {
            self.countdown.stop();
            self.broadcast_message(format!(
                "⏰ Time's up! The word was \"{}\"",
                self.word
            ));
            self.end_round("timeout");
        }
    }

    /// The pause between rounds is over.
    ///
    /// The deadline is never cancelled, so this re-checks that the room is
    /// still waiting for a next round.
    pub fn on_intermission_end(&mut self) {
        if self.phase != RoundPhase::Transitioning {
            debug!(room = %self.code, phase = %self.phase, "stale intermission");
            return;
        }
        if self.seats.len() < self.config.min_players {
            self.pause("⚠️ Not enough players to continue!");
            return;
        }
        self.rotate_drawer();
    }

    fn end_round(&mut self, reason: &'static str) {
        self.set_phase(RoundPhase::Transitioning);
        self.intermission.arm(self.config.intermission);
        info!(room = %self.code, reason, "round ended");
    }

    fn pause(&mut self, notice: &str) {
        self.countdown.stop();
        self.drawer = None;
        self.word.clear();
        self.set_phase(RoundPhase::Idle);
        info!(room = %self.code, players = self.seats.len(), "game paused");
        self.broadcast_message(notice);
    }

    // =====================================================================
    // Player input
    // =====================================================================

    /// Handles a chat line that may be the word.
    ///
    /// A correct guess from a non-drawer during a round scores and ends the
    /// round. Anything else is chat, except the drawer giving the word away,
    /// which is swallowed. Guesses in an idle room are ignored.
    pub fn guess(&mut self, conn: ConnectionId, text: &str) -> Result<(), RoomError> {
        let name = self
            .player(conn)
            .map(|p| p.name.clone())
            .ok_or_else(|| RoomError::NotInRoom(conn, self.code.clone()))?;

        if self.phase == RoundPhase::Idle {
            debug!(room = %self.code, %conn, "guess while idle ignored");
            return Ok(());
        }

        let matches =
            !self.word.is_empty() && text.trim().to_lowercase() == self.word;
        let is_drawer = self.drawer == Some(conn);

        if matches && is_drawer {
            debug!(room = %self.code, %conn, "drawer said the word, suppressed");
            return Ok(());
        }

        if matches && self.phase == RoundPhase::Active {
            let points = self.config.correct_guess_points;
            if let Some(seat) = self.seat_mut(conn) {
                seat.player.score += points;
            }
            info!(room = %self.code, %conn, points, "correct guess");
            self.broadcast_message(format!("✅ {name} guessed it right!"));
            self.dispatch(Recipient::All, ServerEvent::UpdateScores(self.scores()));
            self.countdown.stop();
            self.end_round("guessed");
            return Ok(());
        }

        self.broadcast_message(format!("{name}: {text}"));
        Ok(())
    }

    /// Relays a canvas event from the drawer to everyone else.
    pub fn relay_stroke(&self, conn: ConnectionId, stroke: Stroke) -> Result<(), RoomError> {
        if self.drawer != Some(conn) {
            return Err(RoomError::Unauthorized(format!(
                "{conn} is not drawing in room {}",
                self.code
            )));
        }
        self.dispatch(Recipient::AllExcept(conn), stroke.into_event());
        Ok(())
    }

    fn drawer_name(&self) -> Option<String> {
        self.drawer
            .and_then(|d| self.player(d))
            .map(|p| p.name.clone())
    }
}
