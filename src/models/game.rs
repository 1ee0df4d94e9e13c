//! Match, MatchOutcome and Slot for 1v1 elimination games.

use crate::models::player::Player;
use crate::models::tournament::TournamentError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match. Only meaningful within the round that created it.
pub type MatchId = Uuid;

/// Which side of the match won. Sent over the wire as `1` or `2`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Slot {
    One,
    Two,
}

impl TryFrom<u8> for Slot {
    type Error = TournamentError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Slot::One),
            2 => Ok(Slot::Two),
            other => Err(TournamentError::InvalidSlot(other)),
        }
    }
}

impl From<Slot> for u8 {
    fn from(slot: Slot) -> Self {
        match slot {
            Slot::One => 1,
            Slot::Two => 2,
        }
    }
}

/// Result state of a match. The winner is a snapshot taken after the rating update.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "winner", rename_all = "snake_case")]
pub enum MatchOutcome {
    #[default]
    Unresolved,
    Resolved(Player),
}

/// A single match between two player snapshots taken at pairing time.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub player_1: Player,
    pub player_2: Player,
    pub outcome: MatchOutcome,
}

impl Match {
    pub fn new(player_1: Player, player_2: Player) -> Self {
        Self {
            id: Uuid::new_v4(),
            player_1,
            player_2,
            outcome: MatchOutcome::Unresolved,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.outcome, MatchOutcome::Resolved(_))
    }

    /// Winner snapshot, if the match has been played.
    pub fn winner(&self) -> Option<&Player> {
        match &self.outcome {
            MatchOutcome::Resolved(p) => Some(p),
            MatchOutcome::Unresolved => None,
        }
    }

    /// Participant in the given slot.
    pub fn player(&self, slot: Slot) -> &Player {
        match slot {
            Slot::One => &self.player_1,
            Slot::Two => &self.player_2,
        }
    }
}
