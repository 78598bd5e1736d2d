//! Integration tests for room actors and the registry.
//!
//! Timer-driven tests use `start_paused = true`: the clock only advances
//! when every task is idle, so an 80-second round runs instantly and
//! deterministically.

use std::time::Duration;

use sketchroom_protocol::{RoomCode, ServerEvent};
use sketchroom_room::{GameConfig, PlayerSender, RoomError, RoomManager, RoundPhase, WordBank};
use sketchroom_transport::ConnectionId;
use tokio::sync::mpsc;

// =========================================================================
// Helpers
// =========================================================================

struct Client {
    conn: ConnectionId,
    rx: mpsc::UnboundedReceiver<ServerEvent>,
}

impl Client {
    fn new(id: u64) -> (Self, PlayerSender) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                conn: ConnectionId::new(id),
                rx,
            },
            tx,
        )
    }

    fn drain(&mut self) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(ev) = self.rx.try_recv() {
            events.push(ev);
        }
        events
    }

    fn messages(&mut self) -> Vec<String> {
        self.drain()
            .into_iter()
            .filter_map(|ev| match ev {
                ServerEvent::Message(text) => Some(text),
                _ => None,
            })
            .collect()
    }
}

fn manager() -> RoomManager {
    RoomManager::new(GameConfig::default(), WordBank::new(["apple"]).unwrap())
}

/// A registry with one room: Alice (host, conn 1) and Bob (conn 2).
async fn two_player_room() -> (RoomManager, RoomCode, Client, Client) {
    let mut mgr = manager();
    let (mut alice, tx) = Client::new(1);
    let code = mgr.create_room(alice.conn, "Alice".into(), tx).await;
    let (mut bob, tx) = Client::new(2);
    mgr.join_room(&code, bob.conn, "Bob".into(), tx).await.unwrap();
    alice.drain();
    bob.drain();
    (mgr, code, alice, bob)
}

// =========================================================================
// Registry
// =========================================================================

#[tokio::test]
async fn test_create_room_greets_host() {
    let mut mgr = manager();
    let (mut alice, tx) = Client::new(1);
    let code = mgr.create_room(alice.conn, "Alice".into(), tx).await;

    assert_eq!(code.as_str().len(), RoomCode::LEN);
    assert_eq!(mgr.room_count(), 1);
    assert_eq!(mgr.room_of(alice.conn), Some(code.clone()));

    let events = alice.drain();
    assert_eq!(events[0], ServerEvent::RoomCreated(code));
    assert!(matches!(&events[1], ServerEvent::PlayerList(l) if l.len() == 1));
}

#[tokio::test]
async fn test_create_room_returns_unique_codes() {
    let mut mgr = manager();
    let mut codes = Vec::new();
    for id in 1..=20 {
        let (_, tx) = Client::new(id);
        codes.push(mgr.create_room(ConnectionId::new(id), "P".into(), tx).await);
    }
    codes.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    codes.dedup();
    assert_eq!(codes.len(), 20);
    assert_eq!(mgr.room_count(), 20);
}

#[tokio::test]
async fn test_join_unknown_room_is_not_found() {
    let mut mgr = manager();
    let (bob, tx) = Client::new(2);
    let err = mgr
        .join_room(&RoomCode::new("zzzz"), bob.conn, "Bob".into(), tx)
        .await
        .unwrap_err();
    assert!(matches!(err, RoomError::NotFound(code) if code.as_str() == "ZZZZ"));
    assert_eq!(mgr.room_of(bob.conn), None);
}

#[tokio::test]
async fn test_join_code_is_case_insensitive() {
    let mut mgr = manager();
    let (alice, tx) = Client::new(1);
    let code = mgr.create_room(alice.conn, "Alice".into(), tx).await;

    let lower = RoomCode::new(&code.as_str().to_lowercase());
    let (bob, tx) = Client::new(2);
    mgr.join_room(&lower, bob.conn, "Bob".into(), tx).await.unwrap();
    assert_eq!(mgr.room_of(bob.conn), Some(code));
}

#[tokio::test]
async fn test_join_same_room_twice_is_rejected() {
    let (mut mgr, code, _alice, bob) = two_player_room().await;
    let (_, tx) = Client::new(2);
    let err = mgr
        .join_room(&code, bob.conn, "Bob".into(), tx)
        .await
        .unwrap_err();
    assert!(matches!(err, RoomError::AlreadyInRoom(..)));
}

#[tokio::test]
async fn test_joining_elsewhere_leaves_old_room() {
    let mut mgr = manager();
    let (alice, tx) = Client::new(1);
    let first = mgr.create_room(alice.conn, "Alice".into(), tx).await;
    let (bob, tx) = Client::new(2);
    let second = mgr.create_room(bob.conn, "Bob".into(), tx).await;

    let (_, tx) = Client::new(1);
    mgr.join_room(&second, alice.conn, "Alice".into(), tx)
        .await
        .unwrap();

    // Alice was alone in the first room, so it is gone.
    assert!(mgr.get(&first).is_none());
    assert_eq!(mgr.room_count(), 1);
    assert_eq!(mgr.room_of(alice.conn), Some(second.clone()));
    let info = mgr.get_room_info(&second).await.unwrap();
    assert_eq!(info.player_count, 2);
}

#[tokio::test]
async fn test_creating_while_seated_moves_connection() {
    let (mut mgr, first, _alice, bob) = two_player_room().await;
    let (_, tx) = Client::new(2);
    let second = mgr.create_room(bob.conn, "Bob".into(), tx).await;

    assert_ne!(first, second);
    assert_eq!(mgr.room_of(bob.conn), Some(second));
    let info = mgr.get_room_info(&first).await.unwrap();
    assert_eq!(info.player_count, 1);
}

#[tokio::test]
async fn test_remove_last_player_destroys_room() {
    let mut mgr = manager();
    let (alice, tx) = Client::new(1);
    let code = mgr.create_room(alice.conn, "Alice".into(), tx).await;
    let handle = mgr.get(&code).unwrap();

    mgr.remove_player(alice.conn).await.unwrap();

    assert_eq!(mgr.room_count(), 0);
    assert!(mgr.get(&code).is_none());
    assert_eq!(mgr.room_of(alice.conn), None);

    // The actor is shut down; stale handles see it as unavailable.
    tokio::task::yield_now().await;
    assert!(matches!(
        handle.get_info().await,
        Err(RoomError::Unavailable(_))
    ));
}

#[tokio::test]
async fn test_remove_player_not_in_any_room() {
    let mut mgr = manager();
    let result = mgr.remove_player(ConnectionId::new(7)).await;
    assert!(matches!(result, Err(RoomError::InvalidState(_))));
}

#[tokio::test]
async fn test_destroy_room_not_found() {
    let mut mgr = manager();
    let result = mgr.destroy_room(&RoomCode::new("NOPE")).await;
    assert!(matches!(result, Err(RoomError::NotFound(_))));
}

#[tokio::test]
async fn test_room_codes_lists_live_rooms() {
    let mut mgr = manager();
    let (_, tx) = Client::new(1);
    let a = mgr.create_room(ConnectionId::new(1), "A".into(), tx).await;
    let (_, tx) = Client::new(2);
    let b = mgr.create_room(ConnectionId::new(2), "B".into(), tx).await;

    let codes = mgr.room_codes();
    assert_eq!(codes.len(), 2);
    assert!(codes.contains(&a));
    assert!(codes.contains(&b));
}

#[tokio::test]
async fn test_two_departures_pause_then_remove_room() {
    let (mut mgr, code, mut alice, _bob) = two_player_room().await;
    let handle = mgr.get(&code).unwrap();
    handle.start_game(alice.conn).await.unwrap();
    alice.drain();

    mgr.remove_player(ConnectionId::new(2)).await.unwrap();
    assert!(
        alice
            .messages()
            .contains(&"⚠️ Not enough players, game paused.".to_string())
    );
    assert_eq!(mgr.get_room_info(&code).await.unwrap().phase, RoundPhase::Idle);

    mgr.remove_player(alice.conn).await.unwrap();
    assert_eq!(mgr.room_count(), 0);
}

// =========================================================================
// Room actor
// =========================================================================

#[tokio::test]
async fn test_non_host_start_is_unauthorized() {
    let (mgr, code, _alice, bob) = two_player_room().await;
    let handle = mgr.get(&code).unwrap();
    let err = handle.start_game(bob.conn).await.unwrap_err();
    assert!(matches!(err, RoomError::Unauthorized(_)));
}

#[tokio::test]
async fn test_lone_host_start_reports_insufficient_players() {
    let mut mgr = manager();
    let (mut alice, tx) = Client::new(1);
    let code = mgr.create_room(alice.conn, "Alice".into(), tx).await;
    alice.drain();

    let err = mgr
        .get(&code)
        .unwrap()
        .start_game(alice.conn)
        .await
        .unwrap_err();
    assert!(matches!(err, RoomError::InsufficientPlayers { have: 1, need: 2 }));
    assert_eq!(alice.messages(), vec!["Need at least 2 players!"]);
}

#[tokio::test(start_paused = true)]
async fn test_countdown_reveals_hint_after_thirty_seconds() {
    let (mgr, code, alice, mut bob) = two_player_room().await;
    let handle = mgr.get(&code).unwrap();
    handle.start_game(alice.conn).await.unwrap();

    let info = handle.get_info().await.unwrap();
    assert_eq!(info.phase, RoundPhase::Active);
    assert_eq!(info.drawer, Some(alice.conn));
    assert_eq!(info.hint, "_ _ _ _ _");

    tokio::time::sleep(Duration::from_millis(30_100)).await;

    let info = handle.get_info().await.unwrap();
    assert_eq!(info.time_remaining, 50);
    assert_eq!(info.hint.split(' ').filter(|t| *t != "_").count(), 1);

    let timer_updates = bob
        .drain()
        .into_iter()
        .filter(|ev| matches!(ev, ServerEvent::TimerUpdate(_)))
        .count();
    assert_eq!(timer_updates, 30);
}

#[tokio::test(start_paused = true)]
async fn test_round_times_out_and_next_drawer_starts() {
    let (mgr, code, alice, mut bob) = two_player_room().await;
    let handle = mgr.get(&code).unwrap();
    handle.start_game(alice.conn).await.unwrap();

    // Just past zero: the round is over, the next one isn't started yet.
    tokio::time::sleep(Duration::from_millis(80_100)).await;
    let info = handle.get_info().await.unwrap();
    assert_eq!(info.phase, RoundPhase::Transitioning);
    assert!(
        bob.messages()
            .contains(&"⏰ Time's up! The word was \"apple\"".to_string())
    );

    tokio::time::sleep(Duration::from_millis(1500)).await;
    let info = handle.get_info().await.unwrap();
    assert_eq!(info.phase, RoundPhase::Active);
    assert_eq!(info.drawer, Some(bob.conn));
    assert_eq!(info.time_remaining, 80);
}

#[tokio::test(start_paused = true)]
async fn test_correct_guess_scores_and_rotates() {
    let (mgr, code, alice, mut bob) = two_player_room().await;
    let handle = mgr.get(&code).unwrap();
    handle.start_game(alice.conn).await.unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;

    handle.guess(bob.conn, " Apple".into()).await.unwrap();
    let info = handle.get_info().await.unwrap();
    assert_eq!(info.phase, RoundPhase::Transitioning);
    assert_eq!(info.scores[1].score, 10);
    assert_eq!(info.scores[0].score, 0);
    assert!(
        bob.messages()
            .contains(&"✅ Bob guessed it right!".to_string())
    );

    // The countdown stopped with the guess.
    let frozen = info.time_remaining;
    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(handle.get_info().await.unwrap().time_remaining, frozen);

    tokio::time::sleep(Duration::from_millis(600)).await;
    let info = handle.get_info().await.unwrap();
    assert_eq!(info.phase, RoundPhase::Active);
    assert_eq!(info.drawer, Some(bob.conn));
}

#[tokio::test(start_paused = true)]
async fn test_drawer_disconnect_rotates_without_waiting() {
    let mut mgr = manager();
    let (alice, tx) = Client::new(1);
    let code = mgr.create_room(alice.conn, "Alice".into(), tx).await;
    for (id, name) in [(2, "Bob"), (3, "Carol")] {
        let (_, tx) = Client::new(id);
        mgr.join_room(&code, ConnectionId::new(id), name.into(), tx)
            .await
            .unwrap();
    }
    let handle = mgr.get(&code).unwrap();
    handle.start_game(alice.conn).await.unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;

    mgr.remove_player(alice.conn).await.unwrap();

    let info = handle.get_info().await.unwrap();
    assert_eq!(info.phase, RoundPhase::Active);
    assert_eq!(info.drawer, Some(ConnectionId::new(2)));
    assert_eq!(info.time_remaining, 80);
    assert_eq!(info.host, ConnectionId::new(2));
}

#[tokio::test(start_paused = true)]
async fn test_rooms_run_independently() {
    let mut mgr = manager();
    let mut handles = Vec::new();
    for base in [1u64, 10] {
        let (_, tx) = Client::new(base);
        let code = mgr
            .create_room(ConnectionId::new(base), "Host".into(), tx)
            .await;
        let (_, tx) = Client::new(base + 1);
        mgr.join_room(&code, ConnectionId::new(base + 1), "Guest".into(), tx)
            .await
            .unwrap();
        handles.push(mgr.get(&code).unwrap());
    }

    handles[0].start_game(ConnectionId::new(1)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(3_100)).await;

    assert_eq!(handles[0].get_info().await.unwrap().time_remaining, 77);
    let other = handles[1].get_info().await.unwrap();
    assert_eq!(other.phase, RoundPhase::Idle);
    assert_eq!(other.time_remaining, 0);
}
