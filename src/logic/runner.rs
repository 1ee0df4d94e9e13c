//! Tournament lifecycle: start, record results, advance rounds, finish.
//!
//! ```text
//! start ──> AwaitingResults ──(last result)──> RoundComplete ──advance_round──> AwaitingResults
//!   │              │                                │
//!   │              └──(one survivor)──> Finished <──┘ finish (final round)
//!   └──(<= 1 player)──> Finished
//! ```

use crate::logic::pairing::{generate_round, Round, Shuffle};
use crate::logic::rating::{update_rating, K_FACTOR};
use crate::models::{
    Match, MatchId, MatchOutcome, Player, PlayerId, Roster, RoundBounds, Slot, TournamentError,
    TournamentId, TournamentOutcome, TournamentSnapshot, TournamentState,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

/// Receives the full roster after every mutation.
pub type RosterCallback = Box<dyn FnMut(&[Player]) + Send>;

/// Everything needed to start a tournament.
#[derive(Clone, Debug)]
pub struct TournamentSetup {
    /// Full roster; persisted as a whole after every change.
    pub roster: Vec<Player>,
    /// Players taking part. Defaults to the whole roster.
    pub entrants: Vec<Player>,
    pub total_rounds: u32,
    pub k_factor: i32,
}

impl TournamentSetup {
    pub fn new(roster: Vec<Player>, total_rounds: u32) -> Self {
        Self {
            entrants: roster.clone(),
            roster,
            total_rounds,
            k_factor: K_FACTOR,
        }
    }

    /// Restrict entrants to the given roster ids, in that order.
    pub fn with_entrants(mut self, ids: &[PlayerId]) -> Result<Self, TournamentError> {
        self.entrants = ids
            .iter()
            .map(|&id| {
                self.roster
                    .iter()
                    .find(|p| p.id == id)
                    .cloned()
                    .ok_or(TournamentError::PlayerNotFound(id))
            })
            .collect::<Result<_, _>>()?;
        Ok(self)
    }

    pub fn with_k_factor(mut self, k_factor: i32) -> Self {
        self.k_factor = k_factor;
        self
    }
}

/// What `record_result` did.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordOutcome {
    /// Ratings updated and the winner stored.
    Applied,
    /// The match already had a winner; nothing changed.
    AlreadyResolved,
}

/// Drives one single-elimination tournament from first round to champion.
pub struct TournamentRunner {
    id: TournamentId,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    state: TournamentState,
    /// Players entering the current round.
    active: Vec<Player>,
    roster: Roster,
    current_round: u32,
    total_rounds: u32,
    bye_history: HashSet<PlayerId>,
    round: Round,
    outcome: Option<TournamentOutcome>,
    k_factor: i32,
    shuffle: Box<dyn Shuffle>,
    on_roster_update: RosterCallback,
}

impl fmt::Debug for TournamentRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TournamentRunner")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("current_round", &self.current_round)
            .field("total_rounds", &self.total_rounds)
            .field("active", &self.active.len())
            .finish_non_exhaustive()
    }
}

impl TournamentRunner {
    /// Validate the round count and pair round 1.
    ///
    /// `total_rounds` must lie within [`RoundBounds::for_players`] of the entrant count.
    /// With one entrant or none the tournament is finished immediately.
    pub fn start(
        setup: TournamentSetup,
        shuffle: impl Shuffle + 'static,
        on_roster_update: impl FnMut(&[Player]) + Send + 'static,
    ) -> Result<Self, TournamentError> {
        let bounds = RoundBounds::for_players(setup.entrants.len());
        if !bounds.contains(setup.total_rounds) {
            log::warn!(
                "Rejected tournament start: {} rounds for {} players",
                setup.total_rounds,
                bounds.player_count
            );
            return Err(TournamentError::InvalidState(format!(
                "{} players need between {} and {} rounds, got {}",
                bounds.player_count, bounds.min, bounds.max, setup.total_rounds
            )));
        }
        Self::launch(setup, Box::new(shuffle), Box::new(on_roster_update))
    }

    /// Build the runner and pair round 1 without checking the round count.
    fn launch(
        setup: TournamentSetup,
        shuffle: Box<dyn Shuffle>,
        on_roster_update: RosterCallback,
    ) -> Result<Self, TournamentError> {
        let mut roster = Roster::new(setup.roster);
        for p in &setup.entrants {
            roster.upsert(p.clone());
        }
        let mut runner = Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            state: TournamentState::AwaitingResults,
            active: setup.entrants,
            roster,
            current_round: 1,
            total_rounds: setup.total_rounds,
            bye_history: HashSet::new(),
            round: Round::default(),
            outcome: None,
            k_factor: setup.k_factor,
            shuffle,
            on_roster_update,
        };

        if runner.active.len() <= 1 {
            log::info!(
                "Tournament {} started with {} player(s); nothing to play",
                runner.id,
                runner.active.len()
            );
            let survivors = runner.active.clone();
            runner.conclude(survivors);
            return Ok(runner);
        }

        runner.round = generate_round(&runner.active, &mut runner.bye_history, &mut *runner.shuffle)?;
        log::info!(
            "Tournament {} started: {} players, {} rounds",
            runner.id,
            runner.active.len(),
            runner.total_rounds
        );
        Ok(runner)
    }

    pub fn id(&self) -> TournamentId {
        self.id
    }

    pub fn state(&self) -> TournamentState {
        self.state
    }

    /// 1-based.
    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    pub fn active_players(&self) -> &[Player] {
        &self.active
    }

    pub fn matches(&self) -> &[Match] {
        &self.round.matches
    }

    pub fn byes(&self) -> &[Player] {
        &self.round.byes
    }

    pub fn bye_history(&self) -> &HashSet<PlayerId> {
        &self.bye_history
    }

    /// Master roster including every rating change so far.
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn outcome(&self) -> Option<&TournamentOutcome> {
        self.outcome.as_ref()
    }

    pub fn champion(&self) -> Option<&Player> {
        self.outcome.as_ref().and_then(|o| o.champion.as_ref())
    }

    /// True once every match in the current round has a winner.
    pub fn round_resolved(&self) -> bool {
        self.round.matches.iter().all(Match::is_resolved)
    }

    /// Match winners followed by byes. Only meaningful once the round is resolved.
    pub fn advancing_players(&self) -> Vec<Player> {
        self.round
            .matches
            .iter()
            .filter_map(Match::winner)
            .chain(self.round.byes.iter())
            .cloned()
            .collect()
    }

    /// Record the winner of one match in the current round.
    ///
    /// Updates both ratings, stores the post-match winner snapshot and persists the roster.
    /// A match that already has a winner is left untouched. Resolving the last match either
    /// completes the round or, when only one player advances, finishes the tournament.
    pub fn record_result(
        &mut self,
        match_id: MatchId,
        winner: Slot,
    ) -> Result<RecordOutcome, TournamentError> {
        if self.state == TournamentState::Finished {
            return Err(self.transition_error("record a result"));
        }
        let idx = self
            .round
            .matches
            .iter()
            .position(|m| m.id == match_id)
            .ok_or(TournamentError::UnknownMatch(match_id))?;

        let m = &self.round.matches[idx];
        if m.is_resolved() {
            log::warn!("Ignoring repeated result for match {}", match_id);
            return Ok(RecordOutcome::AlreadyResolved);
        }
        let loser_slot = match winner {
            Slot::One => Slot::Two,
            Slot::Two => Slot::One,
        };
        let (winner, loser) = update_rating(m.player(winner), m.player(loser_slot), self.k_factor);
        log::info!(
            "Round {}: {} ({}) beat {} ({})",
            self.current_round,
            winner.name,
            winner.current_elo,
            loser.name,
            loser.current_elo
        );

        self.round.matches[idx].outcome = MatchOutcome::Resolved(winner.clone());
        for updated in [&winner, &loser] {
            if let Some(p) = self.active.iter_mut().find(|p| p.id == updated.id) {
                *p = updated.clone();
            }
        }
        self.roster.upsert(winner);
        self.roster.upsert(loser);
        self.persist();

        if self.round_resolved() {
            if self.round.advancing_count() == 1 {
                let champion = self.advancing_players();
                self.conclude(champion);
            } else {
                log::info!(
                    "Round {} of {} complete, {} advancing",
                    self.current_round,
                    self.total_rounds,
                    self.round.advancing_count()
                );
                self.state = TournamentState::RoundComplete;
            }
        }
        Ok(RecordOutcome::Applied)
    }

    /// Move winners and byes into the next round and pair it.
    pub fn advance_round(&mut self) -> Result<&[Match], TournamentError> {
        if self.state != TournamentState::RoundComplete || self.current_round >= self.total_rounds {
            return Err(self.transition_error("advance to the next round"));
        }
        let pool = self.advancing_players();
        let round = generate_round(&pool, &mut self.bye_history, &mut *self.shuffle)?;

        self.active = pool;
        self.persist();
        self.current_round += 1;
        self.round = round;
        self.state = TournamentState::AwaitingResults;
        log::info!(
            "Round {} of {}: {} matches, {} bye(s)",
            self.current_round,
            self.total_rounds,
            self.round.matches.len(),
            self.round.byes.len()
        );
        Ok(self.round.matches.as_slice())
    }

    /// End the tournament after the final round.
    ///
    /// Only a single survivor is crowned; otherwise the outcome lists every survivor.
    pub fn finish(&mut self) -> Result<&TournamentOutcome, TournamentError> {
        if self.state != TournamentState::RoundComplete || self.current_round < self.total_rounds {
            return Err(self.transition_error("finish"));
        }
        let survivors = self.advancing_players();
        Ok(self.conclude(survivors))
    }

    pub fn snapshot(&self) -> TournamentSnapshot {
        let mut bye_history: Vec<_> = self.bye_history.iter().copied().collect();
        bye_history.sort();
        TournamentSnapshot {
            id: self.id,
            started_at: self.started_at,
            finished_at: self.finished_at,
            state: self.state,
            current_round: self.current_round,
            total_rounds: self.total_rounds,
            active_players: self.active.clone(),
            matches: self.round.matches.clone(),
            byes: self.round.byes.clone(),
            bye_history,
            outcome: self.outcome.clone(),
        }
    }

    fn conclude(&mut self, survivors: Vec<Player>) -> &TournamentOutcome {
        let outcome = TournamentOutcome::from_survivors(survivors);
        match &outcome.champion {
            Some(c) => log::info!("Tournament {} finished: {} is the champion", self.id, c.name),
            None => log::info!(
                "Tournament {} finished with {} survivors and no single champion",
                self.id,
                outcome.survivors.len()
            ),
        }
        self.state = TournamentState::Finished;
        self.finished_at = Some(Utc::now());
        self.persist();
        self.outcome.insert(outcome)
    }

    fn persist(&mut self) {
        (self.on_roster_update)(self.roster.players());
    }

    fn transition_error(&self, action: &'static str) -> TournamentError {
        log::warn!("Cannot {} in state {:?}", action, self.state);
        TournamentError::InvalidTransition {
            action,
            state: self.state,
        }
    }
}
