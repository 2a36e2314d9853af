//! # Player identity and answers.

use std::fmt;
use std::num::NonZeroU32;

/// Stable identity of a simulated player (`1..=N`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayerId(NonZeroU32);

impl PlayerId {
    /// Returns `None` for zero; player ids are positive.
    pub fn new(id: u32) -> Option<Self> {
        NonZeroU32::new(id).map(Self)
    }

    /// Raw numeric id.
    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// Ids `1..=count`, in order. Counts beyond `u32::MAX` saturate.
    pub fn range(count: usize) -> impl Iterator<Item = PlayerId> {
        let last = u32::try_from(count).unwrap_or(u32::MAX);
        (1..=last).filter_map(PlayerId::new)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One player's answer to one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Answer {
    player: PlayerId,
    round: u64,
    choice: usize,
}

impl Answer {
    /// Creates an answer of `player` for round `round`.
    pub fn new(player: PlayerId, round: u64, choice: usize) -> Self {
        Self {
            player,
            round,
            choice,
        }
    }

    /// Answering player.
    pub fn player(&self) -> PlayerId {
        self.player
    }

    /// Sequence number of the answered round.
    pub fn round(&self) -> u64 {
        self.round
    }

    /// Option index chosen.
    pub fn choice(&self) -> usize {
        self.choice
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_not_a_player() {
        assert!(PlayerId::new(0).is_none());
        assert_eq!(PlayerId::new(4).map(PlayerId::get), Some(4));
    }

    #[test]
    fn range_is_one_based() {
        let ids: Vec<u32> = PlayerId::range(3).map(PlayerId::get).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(PlayerId::range(0).count(), 0);
    }

    #[test]
    fn oversized_range_saturates_instead_of_wrapping() {
        let Ok(count) = usize::try_from(u64::from(u32::MAX) + 1) else {
            return;
        };
        let ids = PlayerId::range(count);
        assert_eq!(ids.size_hint().1, Some(u32::MAX as usize));
    }
}
