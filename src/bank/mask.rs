use serde::{Deserialize, Serialize};

pub const DEFAULT_MASK_CHAR: char = '#';

/// How the target word is rendered in a display record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WordMask {
    Reveal,
    Mask(char),
}

impl WordMask {
    pub fn for_request(hide_word: bool, mask_char: char) -> Self {
        if hide_word {
            WordMask::Mask(mask_char)
        } else {
            WordMask::Reveal
        }
    }

    pub fn apply(self, word: &str) -> String {
        match self {
            WordMask::Reveal => word.to_string(),
            WordMask::Mask(c) => mask_word(word, c),
        }
    }
}

/// One `mask_char` per character of `word`.
pub fn mask_word(word: &str, mask_char: char) -> String {
    std::iter::repeat(mask_char).take(word.chars().count()).collect()
}
