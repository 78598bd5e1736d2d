//! The word bank: secret words a round can draw from.

use std::collections::HashSet;
use std::sync::Arc;

use rand::Rng;

use crate::RoomError;

/// Words used when no custom list is configured.
const BUILTIN_WORDS: &[&str] = &[
    "banana", "hotdog", "sausage", "pickle", "melons", "peaches", "eggplant",
    "donut", "taco", "bun", "muffin", "cream", "popsicle", "burrito",
    "sandwich", "nacho", "cookie", "lollipop", "bed", "shower", "heels",
    "lipstick", "selfie", "wink", "blush", "pillow", "mirror", "perfume",
    "blanket", "candle", "chocolate", "belly", "tongue", "beard", "eyebrow",
    "icecube", "lotion", "towel", "pajamas", "diary", "toilet", "hairbrush",
    "sneeze", "rooster", "monkey", "donkey", "duck", "cow", "pig", "disco",
    "straw", "couch", "belt", "tie", "boots", "necklace", "sunglasses",
    "sticky", "sweaty", "juicy", "spicy", "clown", "slipper", "remote",
    "balloon", "soap", "bathtub", "rubberduck", "bubbles", "steam", "sponge",
    "secret", "spy", "whisper", "dare", "truth", "filter", "emoji", "hashtag",
    "like", "meme", "honey", "sugar", "candy", "icecream", "milkshake", "rose",
    "heart", "cupid", "valentine", "hug", "bite", "chase", "drool", "sock",
    "wig", "sweat", "dance", "karaoke", "pizza", "toast", "popcorn", "burger",
    "fries", "onion", "cheese", "potato", "chips", "marshmallow", "coffee",
    "milk", "fork", "spoon", "knife", "lunchbox", "basket", "lipgloss",
    "bracelet", "watch", "charger", "laptop", "keyboard", "backpack", "wallet",
    "ribbon", "confetti", "cake", "guitar", "drum", "violin", "piano",
    "microphone", "speaker", "heartbeat", "fire", "moon", "star", "rocket",
    "alien", "mermaid", "unicorn", "dragon", "genie", "witch", "vampire",
    "ghost", "angel", "halo", "cuddle", "tickle", "jump", "slide", "spin",
    "peek", "snap", "stretch", "pose", "laugh", "sleep", "dream", "run", "fly",
    "swim", "surf", "climb", "fall", "grab", "tug", "poke", "tap", "kick",
    "snore", "rain", "storm", "beach", "forest", "mountain", "valley",
    "island", "key", "lock", "door", "window", "curtain", "fan", "light",
    "battery", "pen", "pencil", "paper", "book", "map", "bag", "bottle",
    "clock", "stage", "shadow", "moonlight",
];

/// An immutable, non-empty list of distinct lowercase words.
///
/// Cloning is cheap; every room shares the same backing list.
#[derive(Debug, Clone)]
pub struct WordBank {
    words: Arc<[String]>,
}

impl WordBank {
    /// Builds a bank from arbitrary input.
    ///
    /// Words are trimmed and lowercased; blanks and repeats are dropped.
    /// Fails if nothing usable is left.
    pub fn new<I, S>(words: I) -> Result<Self, RoomError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = normalize(words);
        if words.is_empty() {
            return Err(RoomError::EmptyWordBank);
        }
        Ok(Self {
            words: words.into(),
        })
    }

    /// The built-in word list.
    pub fn builtin() -> Self {
        Self {
            words: normalize(BUILTIN_WORDS).into(),
        }
    }

    /// Picks a word uniformly at random.
    pub fn pick(&self) -> &str {
        let i = rand::rng().random_range(0..self.words.len());
        &self.words[i]
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Always `false`: an empty bank can't be constructed.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.iter().any(|w| w.eq_ignore_ascii_case(word))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

impl Default for WordBank {
    fn default() -> Self {
        Self::builtin()
    }
}

fn normalize<I, S>(words: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    words
        .into_iter()
        .map(|w| w.as_ref().trim().to_lowercase())
        .filter(|w| !w.is_empty() && seen.insert(w.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_bank_has_no_duplicates() {
        let bank = WordBank::builtin();
        let unique: HashSet<&str> = bank.iter().collect();
        assert_eq!(unique.len(), bank.len());
        assert!(bank.len() > 100);
    }

    #[test]
    fn test_new_normalizes_and_dedupes() {
        let bank = WordBank::new(["Apple", " apple ", "", "PEAR"]).unwrap();
        let words: Vec<&str> = bank.iter().collect();
        assert_eq!(words, vec!["apple", "pear"]);
    }

    #[test]
    fn test_empty_bank_is_rejected() {
        assert!(matches!(
            WordBank::new(["  ", ""]),
            Err(RoomError::EmptyWordBank)
        ));
        assert!(matches!(
            WordBank::new(Vec::<String>::new()),
            Err(RoomError::EmptyWordBank)
        ));
    }

    #[test]
    fn test_pick_comes_from_the_bank() {
        let bank = WordBank::new(["cat", "dog"]).unwrap();
        for _ in 0..50 {
            assert!(bank.contains(bank.pick()));
        }
    }

    #[test]
    fn test_single_word_bank_always_picks_it() {
        let bank = WordBank::new(["apple"]).unwrap();
        assert_eq!(bank.pick(), "apple");
    }
}
