//! # Running vote counts and their snapshots.
//!
//! [`TallyState`] is the only mutable piece of the pipeline. It is owned by
//! the tally worker and mutated from a single loop, so it needs no lock.
//! Every applied [`Answer`] yields a [`TallySnapshot`]: a full, independent
//! copy of the counts that can be handed to other tasks freely.
//!
//! ## Modes
//! - [`TallyMode::Cumulative`]: counts accumulate for the whole process
//!   lifetime, across unrelated rounds.
//! - [`TallyMode::PerRound`]: counts are cleared when the first answer of a
//!   newer round arrives, so a snapshot only ever describes one round. An
//!   answer to an older round arriving after that is discarded.

use std::collections::BTreeMap;
use std::fmt;

use super::Answer;

/// When (if ever) the running counts are cleared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TallyMode {
    /// Never reset.
    #[default]
    Cumulative,
    /// Reset on the first answer of a newer round.
    PerRound,
}

/// Mutable running counts (choice index → votes).
#[derive(Debug, Default)]
pub struct TallyState {
    mode: TallyMode,
    counts: BTreeMap<usize, u64>,
    round: Option<u64>,
    seq: u64,
}

impl TallyState {
    /// Creates an empty tally.
    pub fn new(mode: TallyMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Applies one answer and returns the resulting snapshot.
    ///
    /// Returns `None` (and leaves the counts untouched) for a `PerRound`
    /// answer to a round older than the one being counted.
    pub fn apply(&mut self, answer: &Answer) -> Option<TallySnapshot> {
        match (self.mode, self.round) {
            (TallyMode::PerRound, Some(current)) if answer.round() < current => return None,
            (TallyMode::PerRound, Some(current)) if answer.round() > current => {
                self.counts.clear();
            }
            _ => {}
        }
        if self.round.is_none_or(|r| answer.round() > r) {
            self.round = Some(answer.round());
        }

        *self.counts.entry(answer.choice()).or_insert(0) += 1;
        self.seq += 1;
        Some(self.snapshot(answer.round()))
    }

    /// Number of answers applied so far.
    pub fn applied(&self) -> u64 {
        self.seq
    }

    /// Sum of the current counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    fn snapshot(&self, round: u64) -> TallySnapshot {
        TallySnapshot {
            seq: self.seq,
            round,
            counts: self.counts.clone(),
        }
    }
}

/// Immutable point-in-time copy of the counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TallySnapshot {
    seq: u64,
    round: u64,
    counts: BTreeMap<usize, u64>,
}

impl TallySnapshot {
    /// 1-based snapshot number, in emission order.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Round of the answer that produced this snapshot.
    pub fn round(&self) -> u64 {
        self.round
    }

    /// Votes for `choice` (0 if never seen).
    pub fn count(&self, choice: usize) -> u64 {
        self.counts.get(&choice).copied().unwrap_or(0)
    }

    /// Sum of all votes.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Counts ordered by choice index.
    pub fn counts(&self) -> &BTreeMap<usize, u64> {
        &self.counts
    }

    /// Takes the counts out; the caller owns an independent map.
    pub fn into_counts(self) -> BTreeMap<usize, u64> {
        self.counts
    }
}

impl fmt::Display for TallySnapshot {
    /// Renders as `{0: 2, 3: 1}`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (choice, votes)) in self.counts.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{choice}: {votes}")?;
        }
        f.write_str("}")
    }
}
