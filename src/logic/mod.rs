//! Tournament business logic: ratings, pairing, round lifecycle.

mod pairing;
mod rating;
mod runner;

pub use pairing::{generate_round, KeepOrder, RandomShuffle, Round, Shuffle};
pub use rating::{expected_score, update_rating, K_FACTOR};
pub use runner::{RecordOutcome, RosterCallback, TournamentRunner, TournamentSetup};
