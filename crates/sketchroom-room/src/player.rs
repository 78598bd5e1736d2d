//! Seated players.

use rand::Rng;
use sketchroom_protocol::PlayerSummary;

/// Avatar colors handed out at join time.
pub const PALETTE: [&str; 6] = [
    "#ef4444", "#10b981", "#3b82f6", "#f59e0b", "#8b5cf6", "#ec4899",
];

/// A player's in-room identity and score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub name: String,
    pub score: u32,
    pub color: &'static str,
}

impl Player {
    /// A fresh player with zero points and a random palette color.
    pub fn new(name: impl Into<String>) -> Self {
        let color = PALETTE[rand::rng().random_range(0..PALETTE.len())];
        Self {
            name: name.into(),
            score: 0,
            color,
        }
    }

    pub fn summary(&self) -> PlayerSummary {
        PlayerSummary {
            name: self.name.clone(),
            score: self.score,
            color: self.color.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player_starts_at_zero_with_palette_color() {
        let p = Player::new("Alice");
        assert_eq!(p.score, 0);
        assert!(PALETTE.contains(&p.color));
        assert_eq!(
            p.summary(),
            PlayerSummary {
                name: "Alice".into(),
                score: 0,
                color: p.color.into(),
            }
        );
    }
}
