//! Per-connection handler: the event gateway.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! It decodes inbound frames, checks the sender's room and role, and
//! forwards to the registry or the room actor. Outbound events from the
//! room arrive on the connection's channel and are written to the socket
//! in order.

use std::sync::Arc;

use sketchroom_protocol::{ClientEvent, Codec, ProtocolError, RoomCode, ServerEvent};
use sketchroom_room::{PlayerSender, RoomError, RoomHandle};
use sketchroom_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::mpsc;

use crate::SketchError;
use crate::server::ServerState;

/// Shown to a client that tries to join a code with no live room.
const ROOM_NOT_FOUND: &str = "Room not found!";

/// Drop guard that takes the connection out of its room when the handler
/// exits, however it exits.
///
/// `Drop` is synchronous, so the async cleanup runs on a spawned task.
struct MembershipGuard<C: Codec> {
    conn: ConnectionId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for MembershipGuard<C> {
    fn drop(&mut self) {
        let conn = self.conn;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let mut rooms = state.rooms.lock().await;
            if rooms.room_of(conn).is_none() {
                return;
            }
            if let Err(e) = rooms.remove_player(conn).await {
                tracing::debug!(%conn, error = %e, "cleanup after disconnect failed");
            }
        });
    }
}

/// What the gateway knows about one connection.
struct Session {
    conn: ConnectionId,
    /// Handle to the room this connection sits in.
    room: Option<RoomHandle>,
    name: Option<String>,
}

impl Session {
    fn code(&self) -> Option<&RoomCode> {
        self.room.as_ref().map(RoomHandle::code)
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), SketchError> {
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();
    let _guard = MembershipGuard {
        conn: conn_id,
        state: Arc::clone(&state),
    };
    let mut session = Session {
        conn: conn_id,
        room: None,
        name: None,
    };

    loop {
        tokio::select! {
            inbound = conn.recv() => {
                let data = match inbound {
                    Ok(Some(data)) => data,
                    Ok(None) => {
                        tracing::info!(
                            %conn_id,
                            name = session.name.as_deref().unwrap_or(""),
                            "connection closed"
                        );
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(%conn_id, error = %e, "recv error");
                        break;
                    }
                };

                let event = match state.codec.decode_client(&data) {
                    Ok(event) => event,
                    Err(ProtocolError::InvalidMessage(reason)) => {
                        tracing::debug!(%conn_id, %reason, "rejecting unusable event");
                        let _ = tx.send(ServerEvent::ErrorMessage(reason));
                        continue;
                    }
                    Err(e) => {
                        tracing::debug!(%conn_id, error = %e, "ignoring malformed frame");
                        continue;
                    }
                };
                handle_event(&state, &mut session, &tx, event).await;
            }
            Some(event) = rx.recv() => {
                let frame = state.codec.encode(&event)?;
                conn.send(&frame).await?;
            }
        }
    }

    // Completes the closing handshake; the peer may already be gone.
    if let Err(e) = conn.close().await {
        tracing::trace!(%conn_id, error = %e, "close after disconnect");
    }

    // _guard drops here → the room is told this connection is gone.
    Ok(())
}

/// Applies one inbound event. Failures are logged, never fatal.
async fn handle_event<C: Codec>(
    state: &ServerState<C>,
    session: &mut Session,
    tx: &PlayerSender,
    event: ClientEvent,
) {
    let conn = session.conn;
    match event {
        ClientEvent::CreateRoom(name) => {
            let name = name.trim().to_string();
            let handle = {
                let mut rooms = state.rooms.lock().await;
                let code = rooms.create_room(conn, name.clone(), tx.clone()).await;
                rooms.get(&code)
            };
            session.room = handle;
            session.name = Some(name);
        }

        ClientEvent::JoinRoom {
            room_code,
            player_name,
        } => {
            let name = player_name.trim().to_string();
            let result = {
                let mut rooms = state.rooms.lock().await;
                match rooms.join_room(&room_code, conn, name.clone(), tx.clone()).await {
                    Ok(()) => Ok(rooms.get(&room_code)),
                    Err(e) => Err(e),
                }
            };

            match result {
                Ok(handle) => {
                    session.room = handle;
                    session.name = Some(name);
                }
                Err(RoomError::NotFound(code)) => {
                    tracing::debug!(%conn, room = %code, "join for unknown room");
                    let _ = tx.send(ServerEvent::ErrorMessage(ROOM_NOT_FOUND.to_string()));
                }
                Err(e) => {
                    tracing::debug!(%conn, room = %room_code, error = %e, "join failed");
                }
            }
        }

        ClientEvent::StartGame => {
            let Some(handle) = &session.room else {
                tracing::debug!(%conn, "start from a connection in no room");
                return;
            };
            match handle.start_game(conn).await {
                // The room already told everyone why.
                Ok(()) | Err(RoomError::InsufficientPlayers { .. }) => {}
                Err(e) => {
                    tracing::debug!(%conn, room = %handle.code(), error = %e, "start rejected");
                }
            }
        }

        ClientEvent::Guess { room_code, guess } => {
            if session.code() != Some(&room_code) {
                tracing::debug!(%conn, room = %room_code, "guess for a room the sender is not in");
                return;
            }
            if let Some(handle) = &session.room {
                if let Err(e) = handle.guess(conn, guess).await {
                    tracing::debug!(%conn, error = %e, "guess not delivered");
                }
            }
        }

        other => {
            let Some(stroke) = other.into_stroke() else {
                return;
            };
            let Some(handle) = &session.room else {
                tracing::debug!(%conn, "stroke from a connection in no room");
                return;
            };
            if let Err(e) = handle.stroke(conn, stroke).await {
                tracing::debug!(%conn, error = %e, "stroke not delivered");
            }
        }
    }
}
