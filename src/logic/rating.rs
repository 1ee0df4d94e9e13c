//! Elo rating updates after a decided match.

use crate::models::Player;

/// Default K-factor: the largest possible rating swing for one match.
pub const K_FACTOR: i32 = 32;

/// Expected score of a player rated `rating` against one rated `opponent` (0.0..=1.0).
pub fn expected_score(rating: i32, opponent: i32) -> f64 {
    1.0 / (1.0 + 10f64.powf((f64::from(opponent) - f64::from(rating)) / 400.0))
}

/// Classic Elo update for a decided game. Returns updated copies `(winner, loser)`.
///
/// Each adjustment is truncated toward zero, so a heavy favourite can win
/// without gaining anything. `k_factor` is used as given, including zero or negative values.
pub fn update_rating(winner: &Player, loser: &Player, k_factor: i32) -> (Player, Player) {
    let expected_winner = expected_score(winner.current_elo, loser.current_elo);
    let expected_loser = expected_score(loser.current_elo, winner.current_elo);
    let k = f64::from(k_factor);

    let mut winner = winner.clone();
    let mut loser = loser.clone();
    // `as` truncates toward zero and clamps to the i32 range.
    winner.current_elo = winner
        .current_elo
        .saturating_add((k * (1.0 - expected_winner)) as i32);
    loser.current_elo = loser
        .current_elo
        .saturating_add((k * (0.0 - expected_loser)) as i32);

    log::debug!(
        "Elo: {} -> {}, {} -> {}",
        winner.name,
        winner.current_elo,
        loser.name,
        loser.current_elo
    );
    (winner, loser)
}
