//! # Round: one generated question event.
//!
//! A [`Round`] is cheap to clone (the question is behind an `Arc`), so the
//! broadcaster hands the very same question to every player without copying
//! text. Rounds are immutable once created.

use std::sync::Arc;

use super::Question;

/// One generated trivia round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    seq: u64,
    question: Arc<Question>,
}

impl Round {
    /// Creates round number `seq` (1-based, generation order).
    pub fn new(seq: u64, question: Arc<Question>) -> Self {
        Self { seq, question }
    }

    /// Generation sequence number.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Question text.
    pub fn question(&self) -> &str {
        self.question.text()
    }

    /// Ordered options.
    pub fn options(&self) -> &[String] {
        self.question.options()
    }

    /// Option text at `choice`, if it is a legal index.
    pub fn option(&self, choice: usize) -> Option<&str> {
        self.options().get(choice).map(String::as_str)
    }

    /// Number of options (always at least 2).
    pub fn option_count(&self) -> usize {
        self.options().len()
    }
}
