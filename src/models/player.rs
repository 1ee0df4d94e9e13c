//! Player data structure.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player (used in matches, bye history and lookups).
pub type PlayerId = Uuid;

/// Rating every new player starts with, and the value a reset restores.
pub const DEFAULT_ELO: i32 = 1000;

/// A player on the roster.
///
/// Serialized as `{ "id", "name", "currentElo" }`, the persisted record format.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub current_elo: i32,
}

impl Player {
    /// Create a new player with the given name and the default rating.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_elo(name, DEFAULT_ELO)
    }

    /// Create a new player with an explicit starting rating.
    pub fn with_elo(name: impl Into<String>, current_elo: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            current_elo,
        }
    }

    /// Put the rating back to the default.
    pub fn reset_elo(&mut self) {
        self.current_elo = DEFAULT_ELO;
    }
}
