use serde::{Deserialize, Serialize};

/// How many tokens of left and right context to keep. `None` keeps the
/// whole stored context on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContextWindow {
    pub left: Option<usize>,
    pub right: Option<usize>,
}

impl ContextWindow {
    pub fn full() -> Self {
        Self {
            left: None,
            right: None,
        }
    }

    /// Exact widths; zero means an empty side.
    pub fn sides(left: usize, right: usize) -> Self {
        Self {
            left: Some(left),
            right: Some(right),
        }
    }

    /// Configured widths, where a non-positive size disables truncation on
    /// that side.
    pub fn from_side_sizes(left: i64, right: i64) -> Self {
        Self {
            left: positive(left),
            right: positive(right),
        }
    }

    /// Derive a symmetric window from a total length that includes the
    /// word itself: `max(1, (window_size - 1) / 2)` tokens per side.
    pub fn from_window_size(window_size: i64) -> Self {
        if window_size <= 0 {
            return Self::full();
        }
        let side = ((window_size - 1) / 2).max(1) as usize;
        Self::sides(side, side)
    }

    /// Truncate a (left, right) pair from the boundary nearest the word.
    pub fn apply(&self, left: &str, right: &str) -> (String, String) {
        (
            keep_last_tokens(left, self.left),
            keep_first_tokens(right, self.right),
        )
    }
}

fn positive(size: i64) -> Option<usize> {
    usize::try_from(size).ok().filter(|&s| s > 0)
}

/// Last `n` space-separated tokens of `text`.
pub fn keep_last_tokens(text: &str, n: Option<usize>) -> String {
    let Some(n) = n else {
        return text.to_string();
    };
    let tokens: Vec<&str> = text.split(' ').collect();
    tokens[tokens.len().saturating_sub(n)..].join(" ")
}

/// First `n` space-separated tokens of `text`.
pub fn keep_first_tokens(text: &str, n: Option<usize>) -> String {
    let Some(n) = n else {
        return text.to_string();
    };
    text.split(' ').take(n).collect::<Vec<_>>().join(" ")
}
