//! Round generation: shuffle the pool, hand out at most one bye, pair the rest.

use crate::models::{Match, Player, PlayerId, TournamentError};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

/// Orders a pool before pairing. Implementations must produce a permutation.
pub trait Shuffle: Send {
    fn shuffle(&mut self, players: &mut [Player]);
}

/// Uniformly random order.
#[derive(Debug)]
pub struct RandomShuffle<R = StdRng> {
    rng: R,
}

impl RandomShuffle<StdRng> {
    /// Seeded from OS entropy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl Default for RandomShuffle<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RandomShuffle<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng + Send> Shuffle for RandomShuffle<R> {
    fn shuffle(&mut self, players: &mut [Player]) {
        players.shuffle(&mut self.rng);
    }
}

/// Leaves the pool as given. Used to replay a known draw.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeepOrder;

impl Shuffle for KeepOrder {
    fn shuffle(&mut self, _players: &mut [Player]) {}
}

/// Matches and byes for one round.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Round {
    pub matches: Vec<Match>,
    /// Zero or one player advancing without a match.
    pub byes: Vec<Player>,
}

impl Round {
    /// Number of players that will enter the next round.
    pub fn advancing_count(&self) -> usize {
        self.matches.len() + self.byes.len()
    }
}

/// Generate one round from `pool`.
///
/// 1. Order the pool with `shuffle`.
/// 2. If the pool is odd, the first player (in that order) not in `bye_history` gets the bye;
///    if everyone has had one, the first player gets it again. The recipient is added to `bye_history`.
/// 3. Pair the rest two at a time in order.
///
/// A pool of one yields no matches and that player as the bye.
pub fn generate_round(
    pool: &[Player],
    bye_history: &mut HashSet<PlayerId>,
    shuffle: &mut dyn Shuffle,
) -> Result<Round, TournamentError> {
    if pool.is_empty() {
        return Err(TournamentError::InvalidState(
            "cannot generate a round from an empty pool".to_string(),
        ));
    }
    let mut seen = HashSet::with_capacity(pool.len());
    if let Some(dup) = pool.iter().find(|p| !seen.insert(p.id)) {
        return Err(TournamentError::InvalidState(format!(
            "player {} appears more than once in the pool",
            dup.id
        )));
    }

    let mut ordered = pool.to_vec();
    shuffle.shuffle(&mut ordered);

    let mut byes = Vec::new();
    if ordered.len() % 2 != 0 {
        let idx = ordered
            .iter()
            .position(|p| !bye_history.contains(&p.id))
            .unwrap_or(0);
        let bye = ordered.remove(idx);
        log::debug!("Bye: {}", bye.name);
        bye_history.insert(bye.id);
        byes.push(bye);
    }

    let mut remaining = ordered.into_iter();
    let mut matches = Vec::with_capacity(pool.len() / 2);
    while let (Some(p1), Some(p2)) = (remaining.next(), remaining.next()) {
        matches.push(Match::new(p1, p2));
    }

    Ok(Round { matches, byes })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(players: &[Player]) -> Vec<&str> {
        players.iter().map(|p| p.name.as_str()).collect()
    }

    fn pool(names: &[&str]) -> Vec<Player> {
        names.iter().map(|n| Player::new(*n)).collect()
    }

    #[test]
    fn even_pool_pairs_in_order_without_bye() {
        let p = pool(&["A", "B", "C", "D"]);
        let mut history = HashSet::new();
        let round = generate_round(&p, &mut history, &mut KeepOrder).unwrap();
        assert!(round.byes.is_empty());
        assert!(history.is_empty());
        let pairs: Vec<_> = round
            .matches
            .iter()
            .map(|m| (m.player_1.name.as_str(), m.player_2.name.as_str()))
            .collect();
        assert_eq!(pairs, [("A", "B"), ("C", "D")]);
    }

    #[test]
    fn odd_pool_skips_players_who_already_had_a_bye() {
        let p = pool(&["A", "B", "C"]);
        let mut history: HashSet<_> = [p[0].id].into_iter().collect();
        let round = generate_round(&p, &mut history, &mut KeepOrder).unwrap();
        assert_eq!(names(&round.byes), ["B"]);
        assert!(history.contains(&p[1].id));
        let m = &round.matches[0];
        assert_eq!((m.player_1.name.as_str(), m.player_2.name.as_str()), ("A", "C"));
    }

    #[test]
    fn exhausted_history_falls_back_to_first_player() {
        let p = pool(&["A", "B", "C"]);
        let mut history: HashSet<_> = p.iter().map(|x| x.id).collect();
        let round = generate_round(&p, &mut history, &mut KeepOrder).unwrap();
        assert_eq!(names(&round.byes), ["A"]);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn single_player_is_sole_bye() {
        let p = pool(&["Solo"]);
        let mut history = HashSet::new();
        let round = generate_round(&p, &mut history, &mut KeepOrder).unwrap();
        assert!(round.matches.is_empty());
        assert_eq!(names(&round.byes), ["Solo"]);
        assert_eq!(round.advancing_count(), 1);
    }

    #[test]
    fn empty_and_duplicate_pools_are_rejected() {
        let mut history = HashSet::new();
        assert!(matches!(
            generate_round(&[], &mut history, &mut KeepOrder),
            Err(TournamentError::InvalidState(_))
        ));
        let a = Player::new("A");
        assert!(matches!(
            generate_round(&[a.clone(), a], &mut history, &mut KeepOrder),
            Err(TournamentError::InvalidState(_))
        ));
    }

    #[test]
    fn seeded_shuffle_is_a_permutation() {
        let p = pool(&["A", "B", "C", "D", "E", "F", "G"]);
        let mut shuffle = RandomShuffle::with_rng(StdRng::seed_from_u64(7));
        let mut history = HashSet::new();
        let round = generate_round(&p, &mut history, &mut shuffle).unwrap();
        let mut seen: Vec<PlayerId> = round
            .matches
            .iter()
            .flat_map(|m| [m.player_1.id, m.player_2.id])
            .chain(round.byes.iter().map(|b| b.id))
            .collect();
        seen.sort();
        let mut expected: Vec<_> = p.iter().map(|x| x.id).collect();
        expected.sort();
        assert_eq!(seen, expected);
    }
}
