//! Trivia data model: catalog, rounds, answers and tallies.
//!
//! ## Contents
//! - [`Question`], [`Catalog`] validated static question catalog
//! - [`Round`] one generated question event (shared, immutable)
//! - [`PlayerId`], [`Answer`] one player's response to a round
//! - [`TallyState`], [`TallySnapshot`], [`TallyMode`] running vote counts

mod answer;
mod question;
mod round;
mod tally;

pub use answer::{Answer, PlayerId};
pub use question::{Catalog, Question};
pub use round::Round;
pub use tally::{TallyMode, TallySnapshot, TallyState};
