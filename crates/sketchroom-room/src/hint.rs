//! The masked word non-drawers see.

use std::fmt;

use rand::Rng;

/// One slot per letter of the secret word, hidden until revealed.
///
/// Displays as space-separated tokens with `_` for hidden letters:
/// `"_ p _ _ e"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hint {
    letters: Vec<char>,
    revealed: Vec<bool>,
}

impl Hint {
    /// A fully hidden hint for `word`.
    pub fn masked(word: &str) -> Self {
        let letters: Vec<char> = word.chars().collect();
        let revealed = vec![false; letters.len()];
        Self { letters, revealed }
    }

    /// Reveals one hidden letter, chosen uniformly among the hidden ones.
    ///
    /// Returns `false` (and changes nothing) if every letter is showing.
    pub fn reveal_random(&mut self) -> bool {
        let hidden: Vec<usize> = self
            .revealed
            .iter()
            .enumerate()
            .filter(|(_, shown)| !**shown)
            .map(|(i, _)| i)
            .collect();
        if hidden.is_empty() {
            return false;
        }
        let pick = hidden[rand::rng().random_range(0..hidden.len())];
        self.revealed[pick] = true;
        true
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.iter().filter(|shown| **shown).count()
    }

    /// Number of letter slots.
    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (letter, shown)) in
            self.letters.iter().zip(&self.revealed).enumerate()
        {
            if i > 0 {
                f.write_str(" ")?;
            }
            if *shown {
                write!(f, "{letter}")?;
            } else {
                f.write_str("_")?;
            }
        }
        Ok(())
    }
}
