//! TournamentState, TournamentError and the serializable views of a tournament.

use crate::models::game::{Match, MatchId};
use crate::models::player::{Player, PlayerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during roster and tournament operations.
///
/// None of these are fatal; the operation that returned one left prior state unchanged.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum TournamentError {
    /// Empty or otherwise unusable pool, or a round count outside the allowed bounds.
    #[error("Invalid state: {0}")]
    InvalidState(String),
    /// A result was recorded against a match that is not in the current round.
    #[error("Match not found: {0}")]
    UnknownMatch(MatchId),
    /// The operation is not allowed in the tournament's current state.
    #[error("Cannot {action} while tournament is {state}")]
    InvalidTransition {
        action: &'static str,
        state: TournamentState,
    },
    /// Winner slot other than 1 or 2.
    #[error("Invalid winner slot {0}: expected 1 or 2")]
    InvalidSlot(u8),
    /// A tournament operation was called before any tournament was started.
    #[error("No tournament")]
    NoTournament,
    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),
    #[error("Player name must not be empty")]
    EmptyPlayerName,
}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Current phase of the tournament.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentState {
    /// Round in progress, at least one match has no winner.
    AwaitingResults,
    /// Every match in the current round has a winner.
    RoundComplete,
    /// Terminal.
    Finished,
}

impl std::fmt::Display for TournamentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentState::AwaitingResults => write!(f, "awaiting results"),
            TournamentState::RoundComplete => write!(f, "between rounds"),
            TournamentState::Finished => write!(f, "finished"),
        }
    }
}

/// Allowed `total_rounds` for a given number of players (inclusive on both ends).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundBounds {
    pub player_count: usize,
    pub min: u32,
    pub max: u32,
}

impl RoundBounds {
    /// Single elimination needs `ceil(log2(n))` rounds to reduce `n` players to one,
    /// and that is also the most it can take. One round for a degenerate pool.
    pub fn for_players(player_count: usize) -> Self {
        let rounds = if player_count > 1 {
            usize::BITS - (player_count - 1).leading_zeros()
        } else {
            1
        };
        Self {
            player_count,
            min: rounds,
            max: rounds,
        }
    }

    pub fn contains(&self, total_rounds: u32) -> bool {
        (self.min..=self.max).contains(&total_rounds)
    }
}

/// How a tournament ended.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TournamentOutcome {
    /// The sole survivor, if the bracket reduced to one player.
    pub champion: Option<Player>,
    /// Everyone still standing after the last resolved round.
    pub survivors: Vec<Player>,
}

impl TournamentOutcome {
    pub fn from_survivors(survivors: Vec<Player>) -> Self {
        let champion = match survivors.as_slice() {
            [only] => Some(only.clone()),
            _ => None,
        };
        Self {
            champion,
            survivors,
        }
    }
}

/// Read-only copy of a running (or finished) tournament, for API responses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TournamentSnapshot {
    pub id: TournamentId,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub state: TournamentState,
    pub current_round: u32,
    pub total_rounds: u32,
    /// Players entering the current round.
    pub active_players: Vec<Player>,
    pub matches: Vec<Match>,
    pub byes: Vec<Player>,
    pub bye_history: Vec<PlayerId>,
    pub outcome: Option<TournamentOutcome>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_ceil_log2_of_player_count() {
        let expected = [(2, 1), (3, 2), (4, 2), (5, 3), (8, 3), (9, 4), (16, 4), (17, 5), (1000, 10)];
        for (n, rounds) in expected {
            let b = RoundBounds::for_players(n);
            assert_eq!((b.min, b.max), (rounds, rounds), "n = {n}");
        }
    }

    #[test]
    fn degenerate_pools_allow_one_round() {
        for n in [0, 1] {
            let b = RoundBounds::for_players(n);
            assert!(b.contains(1));
            assert!(!b.contains(2));
        }
    }

    #[test]
    fn outcome_has_champion_only_for_single_survivor() {
        let a = Player::new("A");
        assert_eq!(TournamentOutcome::from_survivors(vec![a.clone()]).champion, Some(a.clone()));
        let two = TournamentOutcome::from_survivors(vec![a, Player::new("B")]);
        assert!(two.champion.is_none());
        assert_eq!(two.survivors.len(), 2);
    }

    #[test]
    fn transition_error_names_state() {
        let e = TournamentError::InvalidTransition {
            action: "advance round",
            state: TournamentState::AwaitingResults,
        };
        assert_eq!(e.to_string(), "Cannot advance round while tournament is awaiting results");
    }
}
