//! Roster: the ordered list of players the store persists.

use crate::models::player::{Player, PlayerId};
use crate::models::tournament::TournamentError;
use serde::{Deserialize, Serialize};
use std::io;

/// Every known player, in insertion order.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    players: Vec<Player>,
}

/// Trim a display name, rejecting names that are empty afterwards.
fn clean_name(name: &str) -> Result<&str, TournamentError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TournamentError::EmptyPlayerName);
    }
    Ok(trimmed)
}

impl Roster {
    pub fn new(players: Vec<Player>) -> Self {
        Self { players }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Add a player at the default rating. Names are trimmed; duplicates are allowed.
    pub fn add_player(&mut self, name: &str) -> Result<Player, TournamentError> {
        let player = Player::new(clean_name(name)?);
        self.players.push(player.clone());
        Ok(player)
    }

    /// Change a player's display name.
    pub fn rename_player(&mut self, id: PlayerId, name: &str) -> Result<&Player, TournamentError> {
        let name = clean_name(name)?;
        let p = self
            .players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(TournamentError::PlayerNotFound(id))?;
        p.name = name.to_string();
        Ok(&*p)
    }

    /// Remove a player by id, returning the removed record.
    pub fn remove_player(&mut self, id: PlayerId) -> Result<Player, TournamentError> {
        let idx = self
            .players
            .iter()
            .position(|p| p.id == id)
            .ok_or(TournamentError::PlayerNotFound(id))?;
        Ok(self.players.remove(idx))
    }

    /// Reset every rating to the default.
    pub fn reset_ratings(&mut self) {
        for p in &mut self.players {
            p.reset_elo();
        }
    }

    pub fn clear(&mut self) {
        self.players.clear();
    }

    /// Replace the player with the same id, or append if unknown.
    pub fn upsert(&mut self, player: Player) {
        match self.players.iter_mut().find(|p| p.id == player.id) {
            Some(existing) => *existing = player,
            None => self.players.push(player),
        }
    }

    /// Players by rating, highest first. Equal ratings keep roster order.
    pub fn leaderboard(&self) -> Vec<Player> {
        let mut sorted = self.players.clone();
        sorted.sort_by(|a, b| b.current_elo.cmp(&a.current_elo));
        sorted
    }

    /// Write the leaderboard as CSV with a `rank,name,elo` header.
    pub fn write_leaderboard_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(["rank", "name", "elo"])?;
        for (idx, p) in self.leaderboard().iter().enumerate() {
            wtr.write_record([(idx + 1).to_string(), p.name.clone(), p.current_elo.to_string()])?;
        }
        wtr.flush()?;
        Ok(())
    }
}
