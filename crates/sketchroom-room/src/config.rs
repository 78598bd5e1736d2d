//! Game settings and the round phase machine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::RoomError;

// ---------------------------------------------------------------------------
// GameConfig
// ---------------------------------------------------------------------------

/// Tunables shared by every room a [`RoomManager`](crate::RoomManager)
/// creates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Length of one drawing round, in seconds.
    pub round_secs: u32,

    /// Elapsed seconds at which one more hint letter is revealed.
    pub reveal_at_elapsed: Vec<u32>,

    /// Pause between the end of one round and the start of the next.
    pub intermission: Duration,

    /// Points awarded for guessing the word.
    pub correct_guess_points: u32,

    /// Players required to start and to keep playing.
    pub min_players: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            round_secs: 80,
            reveal_at_elapsed: vec![30, 60],
            intermission: Duration::from_millis(1500),
            correct_guess_points: 10,
            min_players: 2,
        }
    }
}

impl GameConfig {
    /// Default settings with a different round length.
    pub fn with_round_secs(round_secs: u32) -> Self {
        Self {
            round_secs,
            ..Self::default()
        }
    }

    /// Rejects settings no round could run under.
    pub fn validate(&self) -> Result<(), RoomError> {
        if self.round_secs == 0 {
            return Err(RoomError::InvalidConfig(
                "round length must be at least one second".into(),
            ));
        }
        if self.min_players == 0 {
            return Err(RoomError::InvalidConfig(
                "min_players must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RoundPhase
// ---------------------------------------------------------------------------

/// Where a room is in its round cycle.
///
/// ```text
///          start_game              timeout / correct guess
///   Idle ─────────────▶ Active ──────────────────────────▶ Transitioning
///    ▲                  │  ▲ │ drawer left                      │
///    │   < min players  │  │ └──────┘          intermission end │
///    └──────────────────┘  └────────────────────────────────────┘
/// ```
///
/// Any non-idle phase falls back to `Idle` when the room drops below the
/// minimum player count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// No game running. Waiting for the host.
    Idle,
    /// A drawer is drawing and the countdown is running.
    Active,
    /// A round just ended; the next one starts after the intermission.
    Transitioning,
}

impl RoundPhase {
    /// Whether a game is in progress (a round or the pause after one).
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Returns `true` if moving to `target` is a legal step.
    pub fn can_transition_to(self, target: Self) -> bool {
        use RoundPhase::*;
        matches!(
            (self, target),
            (Idle, Active)
                | (Active, Active)
                | (Active, Transitioning)
                | (Transitioning, Active)
                | (Active | Transitioning, Idle)
        )
    }
}

impl std::fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Active => write!(f, "Active"),
            Self::Transitioning => write!(f, "Transitioning"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_phase_transitions() {
        use RoundPhase::*;
        assert!(Idle.can_transition_to(Active));
        assert!(Active.can_transition_to(Transitioning));
        assert!(Active.can_transition_to(Active));
        assert!(Transitioning.can_transition_to(Active));
        assert!(Transitioning.can_transition_to(Idle));
        assert!(Active.can_transition_to(Idle));

        assert!(!Idle.can_transition_to(Transitioning));
        assert!(!Idle.can_transition_to(Idle));
        assert!(!Transitioning.can_transition_to(Transitioning));
    }

    #[test]
    fn test_round_phase_is_active() {
        assert!(!RoundPhase::Idle.is_active());
        assert!(RoundPhase::Active.is_active());
        assert!(RoundPhase::Transitioning.is_active());
    }

    #[test]
    fn test_round_phase_display() {
        assert_eq!(RoundPhase::Transitioning.to_string(), "Transitioning");
    }

    #[test]
    fn test_game_config_default() {
        let config = GameConfig::default();
        assert_eq!(config.round_secs, 80);
        assert_eq!(config.reveal_at_elapsed, vec![30, 60]);
        assert_eq!(config.intermission, Duration::from_millis(1500));
        assert_eq!(config.correct_guess_points, 10);
        assert_eq!(config.min_players, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_length_round_is_rejected() {
        let config = GameConfig::with_round_secs(0);
        assert!(matches!(
            config.validate(),
            Err(RoomError::InvalidConfig(_))
        ));
    }
}
