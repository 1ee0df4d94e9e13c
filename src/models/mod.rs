//! Data structures for the tournament: players, roster, matches, tournament state.

mod game;
mod player;
mod roster;
mod tournament;

pub use game::{Match, MatchId, MatchOutcome, Slot};
pub use player::{Player, PlayerId, DEFAULT_ELO};
pub use roster::Roster;
pub use tournament::{
    RoundBounds, TournamentError, TournamentId, TournamentOutcome, TournamentSnapshot,
    TournamentState,
};
