//! Single-elimination tournament organizer: library with models, engine and roster storage.

pub mod lobby;
pub mod logic;
pub mod models;
pub mod store;

pub use lobby::Lobby;
pub use logic::{
    expected_score, generate_round, update_rating, KeepOrder, RandomShuffle, RecordOutcome,
    Round, Shuffle, TournamentRunner, TournamentSetup, K_FACTOR,
};
pub use models::{
    Match, MatchId, MatchOutcome, Player, PlayerId, Roster, RoundBounds, Slot, TournamentError,
    TournamentId, TournamentOutcome, TournamentSnapshot, TournamentState, DEFAULT_ELO,
};
pub use store::{JsonFileStore, MemoryStore, RosterStore, StoreError};
