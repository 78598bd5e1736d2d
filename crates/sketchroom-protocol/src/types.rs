//! Core protocol types for Sketchroom's wire format.
//!
//! Every frame is one JSON object tagged by event name, with the payload
//! under `data`:
//!
//! ```text
//! { "event": "joinRoom", "data": { "roomCode": "ABCD", "playerName": "Bob" } }
//! { "event": "timerUpdate", "data": 42 }
//! { "event": "startGame" }
//! ```
//!
//! Stroke payloads are opaque [`serde_json::Value`]s: the server relays
//! them verbatim and never looks at coordinates.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sketchroom_transport::ConnectionId;

// ---------------------------------------------------------------------------
// RoomCode
// ---------------------------------------------------------------------------

/// Characters a generated room code is drawn from.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A short, human-typeable room identifier.
///
/// Input is case-insensitive: every construction path (including
/// deserialization) trims and uppercases, so `" abcd"` and `"ABCD"` name
/// the same room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Length of generated codes.
    pub const LEN: usize = 4;

    /// Normalizes user input into a room code.
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_ascii_uppercase())
    }

    /// Generates a random code of [`Self::LEN`] alphanumeric characters.
    ///
    /// Uniqueness against live rooms is the registry's job.
    pub fn random() -> Self {
        let mut rng = rand::rng();
        let code = (0..Self::LEN)
            .map(|_| {
                CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char
            })
            .collect();
        Self(code)
    }

    /// The canonical (uppercase) form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RoomCode {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<&str> for RoomCode {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Recipient: who should receive an event?
// ---------------------------------------------------------------------------

/// Addresses an outbound event within one room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every member of the room.
    All,

    /// One specific member.
    Player(ConnectionId),

    /// Every member except one (the drawer, or a stroke's sender).
    AllExcept(ConnectionId),
}

impl Recipient {
    /// Whether `conn` is addressed.
    pub fn includes(&self, conn: ConnectionId) -> bool {
        match self {
            Self::All => true,
            Self::Player(target) => *target == conn,
            Self::AllExcept(excluded) => *excluded != conn,
        }
    }
}

// ---------------------------------------------------------------------------
// Scoreboard
// ---------------------------------------------------------------------------

/// One scoreboard row, as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub name: String,
    pub score: u32,
    pub color: String,
}

// ---------------------------------------------------------------------------
// Strokes
// ---------------------------------------------------------------------------

/// The four canvas events a drawer can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeKind {
    Begin,
    Move,
    End,
    Clear,
}

/// A canvas event on its way from the drawer to the other members.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub kind: StrokeKind,
    pub data: Value,
}

impl Stroke {
    /// Wraps the payload back into the outbound event of the same name.
    pub fn into_event(self) -> ServerEvent {
        match self.kind {
            StrokeKind::Begin => ServerEvent::StrokeBegin(self.data),
            StrokeKind::Move => ServerEvent::StrokeMove(self.data),
            StrokeKind::End => ServerEvent::StrokeEnd(self.data),
            StrokeKind::Clear => ServerEvent::CanvasClear(self.data),
        }
    }
}

// ---------------------------------------------------------------------------
// Inbound events
// ---------------------------------------------------------------------------

/// Events a client sends to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    /// Open a new room; the payload is the creator's display name.
    CreateRoom(String),

    /// Take a seat in an existing room.
    JoinRoom {
        room_code: RoomCode,
        player_name: String,
    },

    /// Host only: begin the first round.
    StartGame,

    StrokeBegin(Value),
    StrokeMove(Value),
    StrokeEnd(Value),

    /// Clients may omit the payload entirely.
    CanvasClear(Option<Value>),

    /// A chat line that may be the secret word.
    Guess { room_code: RoomCode, guess: String },
}

impl ClientEvent {
    /// Converts canvas events into a [`Stroke`]; `None` for everything else.
    pub fn into_stroke(self) -> Option<Stroke> {
        let (kind, data) = match self {
            Self::StrokeBegin(data) => (StrokeKind::Begin, data),
            Self::StrokeMove(data) => (StrokeKind::Move, data),
            Self::StrokeEnd(data) => (StrokeKind::End, data),
            Self::CanvasClear(data) => {
                (StrokeKind::Clear, data.unwrap_or(Value::Null))
            }
            _ => return None,
        };
        Some(Stroke { kind, data })
    }
}

// ---------------------------------------------------------------------------
// Outbound events
// ---------------------------------------------------------------------------

/// Events the server sends to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    /// To the creator: the new room's code.
    RoomCreated(RoomCode),

    /// To a joiner: the room it now sits in.
    JoinedRoom(RoomCode),

    /// To one client: a user-visible failure ("Room not found!").
    ErrorMessage(String),

    /// To the room: membership changed.
    PlayerList(Vec<PlayerSummary>),

    /// To the room: scores changed or a round began.
    UpdateScores(Vec<PlayerSummary>),

    /// To non-drawers: who is drawing this round.
    DrawerChanged { drawer_name: String },

    /// To the drawer only: the secret word.
    SetDrawer { word: String },

    /// To non-drawers only: the masked word.
    ShowHint { hint: String },

    /// Chat lines and system announcements.
    Message(String),

    /// Seconds left in the round.
    TimerUpdate(u32),

    StrokeBegin(Value),
    StrokeMove(Value),
    StrokeEnd(Value),
    CanvasClear(Value),
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The browser client matches on exact event names and field casing,
    //! so these tests pin the JSON shapes.

    use super::*;
    use serde_json::json;

    // =====================================================================
    // RoomCode
    // =====================================================================

    #[test]
    fn test_room_code_normalizes_case_and_whitespace() {
        assert_eq!(RoomCode::new(" ab1d ").as_str(), "AB1D");
        assert_eq!(RoomCode::new("ab1d"), RoomCode::new("AB1D"));
    }

    #[test]
    fn test_random_room_code_shape() {
        for _ in 0..100 {
            let code = RoomCode::random();
            assert_eq!(code.as_str().len(), RoomCode::LEN);
            assert!(code.as_str().bytes().all(|b| CODE_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_room_code_serializes_as_plain_string() {
        let json = serde_json::to_string(&RoomCode::new("WXYZ")).unwrap();
        assert_eq!(json, "\"WXYZ\"");
    }

    #[test]
    fn test_room_code_deserialization_normalizes() {
        let code: RoomCode = serde_json::from_str("\"wxyz\"").unwrap();
        assert_eq!(code.as_str(), "WXYZ");
    }

    // =====================================================================
    // Recipient
    // =====================================================================

    #[test]
    fn test_recipient_includes() {
        let a = ConnectionId::new(1);
        let b = ConnectionId::new(2);
        assert!(Recipient::All.includes(a));
        assert!(Recipient::Player(a).includes(a));
        assert!(!Recipient::Player(a).includes(b));
        assert!(!Recipient::AllExcept(a).includes(a));
        assert!(Recipient::AllExcept(a).includes(b));
    }

    // =====================================================================
    // Inbound
    // =====================================================================

    #[test]
    fn test_create_room_takes_bare_name() {
        let ev: ClientEvent =
            serde_json::from_value(json!({"event": "createRoom", "data": "Alice"}))
                .unwrap();
        assert_eq!(ev, ClientEvent::CreateRoom("Alice".into()));
    }

    #[test]
    fn test_join_room_uses_camel_case_fields() {
        let ev: ClientEvent = serde_json::from_value(json!({
            "event": "joinRoom",
            "data": { "roomCode": "abcd", "playerName": "Bob" }
        }))
        .unwrap();
        assert_eq!(
            ev,
            ClientEvent::JoinRoom {
                room_code: RoomCode::new("ABCD"),
                player_name: "Bob".into(),
            }
        );
    }

    #[test]
    fn test_start_game_has_no_payload() {
        let ev: ClientEvent =
            serde_json::from_value(json!({"event": "startGame"})).unwrap();
        assert_eq!(ev, ClientEvent::StartGame);
    }

    #[test]
    fn test_guess_shape() {
        let ev: ClientEvent = serde_json::from_value(json!({
            "event": "guess",
            "data": { "roomCode": "ABCD", "guess": "apple " }
        }))
        .unwrap();
        assert_eq!(
            ev,
            ClientEvent::Guess {
                room_code: RoomCode::new("ABCD"),
                guess: "apple ".into(),
            }
        );
    }

    #[test]
    fn test_canvas_clear_payload_is_optional() {
        let bare: ClientEvent =
            serde_json::from_value(json!({"event": "canvasClear"})).unwrap();
        assert_eq!(bare, ClientEvent::CanvasClear(None));

        let stroke = bare.into_stroke().unwrap();
        assert_eq!(stroke.kind, StrokeKind::Clear);
        assert_eq!(stroke.data, Value::Null);
    }

    #[test]
    fn test_stroke_payload_passes_through_untouched() {
        let data = json!({"x": 0.25, "y": 0.5, "color": "#000", "size": 4});
        let ev: ClientEvent = serde_json::from_value(
            json!({"event": "strokeMove", "data": data.clone()}),
        )
        .unwrap();

        let relayed = ev.into_stroke().unwrap().into_event();
        assert_eq!(relayed, ServerEvent::StrokeMove(data.clone()));

        let wire = serde_json::to_value(&relayed).unwrap();
        assert_eq!(wire, json!({"event": "strokeMove", "data": data}));
    }

    #[test]
    fn test_non_stroke_event_is_not_a_stroke() {
        assert!(ClientEvent::StartGame.into_stroke().is_none());
    }

    #[test]
    fn test_unknown_event_is_rejected() {
        let result: Result<ClientEvent, _> =
            serde_json::from_value(json!({"event": "flyToMoon", "data": 1}));
        assert!(result.is_err());
    }

    #[test]
    fn test_join_room_missing_field_is_rejected() {
        let result: Result<ClientEvent, _> = serde_json::from_value(
            json!({"event": "joinRoom", "data": {"roomCode": "ABCD"}}),
        );
        assert!(result.is_err());
    }

    // =====================================================================
    // Outbound
    // =====================================================================

    #[test]
    fn test_drawer_changed_json_format() {
        let ev = ServerEvent::DrawerChanged { drawer_name: "Alice".into() };
        assert_eq!(
            serde_json::to_value(&ev).unwrap(),
            json!({"event": "drawerChanged", "data": {"drawerName": "Alice"}})
        );
    }

    #[test]
    fn test_timer_update_json_format() {
        assert_eq!(
            serde_json::to_value(ServerEvent::TimerUpdate(79)).unwrap(),
            json!({"event": "timerUpdate", "data": 79})
        );
    }

    #[test]
    fn test_player_list_json_format() {
        let ev = ServerEvent::PlayerList(vec![PlayerSummary {
            name: "Alice".into(),
            score: 10,
            color: "#ef4444".into(),
        }]);
        assert_eq!(
            serde_json::to_value(&ev).unwrap(),
            json!({
                "event": "playerList",
                "data": [{"name": "Alice", "score": 10, "color": "#ef4444"}]
            })
        );
    }

    #[test]
    fn test_show_hint_and_set_drawer_shapes() {
        assert_eq!(
            serde_json::to_value(ServerEvent::ShowHint { hint: "_ _ _".into() })
                .unwrap(),
            json!({"event": "showHint", "data": {"hint": "_ _ _"}})
        );
        assert_eq!(
            serde_json::to_value(ServerEvent::SetDrawer { word: "cat".into() })
                .unwrap(),
            json!({"event": "setDrawer", "data": {"word": "cat"}})
        );
    }
}
