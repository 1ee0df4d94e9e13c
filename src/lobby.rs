//! Lobby: the roster, its store, and at most one tournament at a time.

use crate::logic::{RecordOutcome, Shuffle, TournamentRunner, TournamentSetup, K_FACTOR};
use crate::models::{
    Match, MatchId, Player, PlayerId, Roster, RoundBounds, Slot, TournamentError,
    TournamentOutcome, TournamentState,
};
use crate::store::{RosterStore, StoreError};
use std::sync::Arc;

/// Owns the roster and writes it to the store after every change.
///
/// Roster edits are refused while a tournament is in progress; a finished
/// tournament stays readable until the next one starts or it is abandoned.
pub struct Lobby {
    roster: Roster,
    store: Arc<dyn RosterStore>,
    k_factor: i32,
    tournament: Option<TournamentRunner>,
}

impl Lobby {
    /// Load the roster from `store`.
    pub fn open(store: Arc<dyn RosterStore>) -> Result<Self, StoreError> {
        let roster = Roster::new(store.load()?);
        log::info!("Loaded {} players", roster.len());
        Ok(Self {
            roster,
            store,
            k_factor: K_FACTOR,
            tournament: None,
        })
    }

    /// K-factor used by tournaments started from now on.
    pub fn with_k_factor(mut self, k_factor: i32) -> Self {
        self.k_factor = k_factor;
        self
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn leaderboard(&self) -> Vec<Player> {
        self.roster.leaderboard()
    }

    /// Allowed round counts for a tournament with the whole roster.
    pub fn round_bounds(&self) -> RoundBounds {
        RoundBounds::for_players(self.roster.len())
    }

    pub fn add_player(&mut self, name: &str) -> Result<Player, TournamentError> {
        self.ensure_idle("add a player")?;
        let player = self.roster.add_player(name)?;
        log::info!("Added player {}", player.name);
        self.save();
        Ok(player)
    }

    pub fn rename_player(&mut self, id: PlayerId, name: &str) -> Result<Player, TournamentError> {
        self.ensure_idle("rename a player")?;
        let player = self.roster.rename_player(id, name)?.clone();
        self.save();
        Ok(player)
    }

    pub fn remove_player(&mut self, id: PlayerId) -> Result<Player, TournamentError> {
        self.ensure_idle("remove a player")?;
        let player = self.roster.remove_player(id)?;
        log::info!("Removed player {}", player.name);
        self.save();
        Ok(player)
    }

    /// Put every rating back to the default.
    pub fn reset_ratings(&mut self) -> Result<(), TournamentError> {
        self.ensure_idle("reset ratings")?;
        self.roster.reset_ratings();
        log::info!("Reset ratings for {} players", self.roster.len());
        self.save();
        Ok(())
    }

    /// Delete every player, in memory and in the store.
    pub fn clear_players(&mut self) -> Result<(), TournamentError> {
        self.ensure_idle("clear players")?;
        self.roster.clear();
        log::info!("Cleared all players");
        if let Err(e) = self.store.clear() {
            log::error!("Failed to clear stored roster: {}", e);
        }
        Ok(())
    }

    pub fn tournament(&self) -> Option<&TournamentRunner> {
        self.tournament.as_ref()
    }

    /// Start a tournament with the given entrants, or the whole roster if `None`.
    pub fn start_tournament(
        &mut self,
        entrants: Option<&[PlayerId]>,
        total_rounds: u32,
        shuffle: impl Shuffle + 'static,
    ) -> Result<&TournamentRunner, TournamentError> {
        self.ensure_idle("start a tournament")?;
        let mut setup = TournamentSetup::new(self.roster.players().to_vec(), total_rounds)
            .with_k_factor(self.k_factor);
        if let Some(ids) = entrants {
            setup = setup.with_entrants(ids)?;
        }
        let store = Arc::clone(&self.store);
        let runner = TournamentRunner::start(setup, shuffle, move |players: &[Player]| {
            if let Err(e) = store.save(players) {
                log::error!("Failed to save roster: {}", e);
            }
        })?;
        self.roster = runner.roster().clone();
        Ok(&*self.tournament.insert(runner))
    }

    pub fn record_result(
        &mut self,
        match_id: MatchId,
        winner: Slot,
    ) -> Result<RecordOutcome, TournamentError> {
        let recorded = self.runner_mut()?.record_result(match_id, winner)?;
        self.sync_roster();
        Ok(recorded)
    }

    pub fn advance_round(&mut self) -> Result<Vec<Match>, TournamentError> {
        let matches = self.runner_mut()?.advance_round()?.to_vec();
        self.sync_roster();
        Ok(matches)
    }

    pub fn finish_tournament(&mut self) -> Result<TournamentOutcome, TournamentError> {
        let outcome = self.runner_mut()?.finish()?.clone();
        self.sync_roster();
        Ok(outcome)
    }

    /// Drop the current tournament. Ratings already recorded stay on the roster.
    pub fn abandon_tournament(&mut self) -> Option<TournamentRunner> {
        let runner = self.tournament.take();
        if let Some(t) = &runner {
            log::info!("Abandoned tournament {} in round {}", t.id(), t.current_round());
        }
        runner
    }

    fn runner_mut(&mut self) -> Result<&mut TournamentRunner, TournamentError> {
        self.tournament.as_mut().ok_or(TournamentError::NoTournament)
    }

    fn ensure_idle(&self, action: &'static str) -> Result<(), TournamentError> {
        match &self.tournament {
            Some(t) if t.state() != TournamentState::Finished => {
                Err(TournamentError::InvalidTransition {
                    action,
                    state: t.state(),
                })
            }
            _ => Ok(()),
        }
    }

    fn sync_roster(&mut self) {
        if let Some(t) = &self.tournament {
            self.roster = t.roster().clone();
        }
    }

    fn save(&self) {
        if let Err(e) = self.store.save(self.roster.players()) {
            log::error!("Failed to save roster: {}", e);
        }
    }
}
