//! Single binary web server: JSON API over the roster and the running tournament.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT, ROSTER_PATH (roster JSON file), K_FACTOR.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use elite_tournament::{
    JsonFileStore, Lobby, MatchId, PlayerId, RandomShuffle, Slot, TournamentError,
};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

/// Every request runs one lobby operation to completion under this lock.
type AppState = Data<Mutex<Lobby>>;

/// Startup settings, read from the environment.
struct Config {
    host: String,
    port: u16,
    roster_path: PathBuf,
    k_factor: i32,
}

impl Config {
    fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| default_host()),
            port: env_parse("PORT").unwrap_or_else(default_port),
            roster_path: std::env::var("ROSTER_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_roster_path()),
            k_factor: env_parse("K_FACTOR").unwrap_or(elite_tournament::K_FACTOR),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_roster_path() -> PathBuf {
    PathBuf::from("saved_players.v1.json")
}

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct PlayerNameBody {
    name: String,
}

#[derive(Deserialize)]
struct StartTournamentBody {
    /// Defaults to the maximum allowed for the entrant count.
    total_rounds: Option<u32>,
    /// Defaults to the whole roster.
    player_ids: Option<Vec<PlayerId>>,
}

#[derive(Deserialize)]
struct SetMatchWinnerBody {
    /// 1 or 2.
    winner: Slot,
}

#[derive(Deserialize)]
struct BoundsQuery {
    players: Option<usize>,
}

/// Path segment: player id (e.g. /api/players/{player_id})
#[derive(Deserialize)]
struct PlayerPath {
    player_id: PlayerId,
}

/// Path segment: match id (e.g. /api/tournament/matches/{match_id}/winner)
#[derive(Deserialize)]
struct MatchPath {
    match_id: MatchId,
}

fn lock(state: &AppState) -> Result<MutexGuard<'_, Lobby>, HttpResponse> {
    state
        .lock()
        .map_err(|_| HttpResponse::InternalServerError().body("lock error"))
}

fn error_response(e: TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        TournamentError::UnknownMatch(_)
        | TournamentError::PlayerNotFound(_)
        | TournamentError::NoTournament => HttpResponse::NotFound().json(body),
        TournamentError::InvalidTransition { .. } => HttpResponse::Conflict().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}

fn no_tournament() -> HttpResponse {
    error_response(TournamentError::NoTournament)
}

/// Current tournament as JSON, or 404.
fn tournament_json(lobby: &Lobby) -> HttpResponse {
    match lobby.tournament() {
        Some(t) => HttpResponse::Ok().json(t.snapshot()),
        None => no_tournament(),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "elite-tournament",
    })
}

/// Full roster in insertion order.
#[get("/api/players")]
async fn api_list_players(state: AppState) -> HttpResponse {
    let lobby = match lock(&state) {
        Ok(g) => g,
        Err(resp) => return resp,
    };
    HttpResponse::Ok().json(lobby.roster())
}

#[post("/api/players")]
async fn api_add_player(state: AppState, body: Json<PlayerNameBody>) -> HttpResponse {
    let mut lobby = match lock(&state) {
        Ok(g) => g,
        Err(resp) => return resp,
    };
    match lobby.add_player(&body.name) {
        Ok(p) => HttpResponse::Ok().json(p),
        Err(e) => error_response(e),
    }
}

#[get("/api/players/{player_id}")]
async fn api_get_player(state: AppState, path: Path<PlayerPath>) -> HttpResponse {
    let lobby = match lock(&state) {
        Ok(g) => g,
        Err(resp) => return resp,
    };
    match lobby.roster().get(path.player_id) {
        Some(p) => HttpResponse::Ok().json(p),
        None => error_response(TournamentError::PlayerNotFound(path.player_id)),
    }
}

#[put("/api/players/{player_id}")]
async fn api_rename_player(
    state: AppState,
    path: Path<PlayerPath>,
    body: Json<PlayerNameBody>,
) -> HttpResponse {
    let mut lobby = match lock(&state) {
        Ok(g) => g,
        Err(resp) => return resp,
    };
    match lobby.rename_player(path.player_id, &body.name) {
        Ok(p) => HttpResponse::Ok().json(p),
        Err(e) => error_response(e),
    }
}

#[delete("/api/players/{player_id}")]
async fn api_remove_player(state: AppState, path: Path<PlayerPath>) -> HttpResponse {
    let mut lobby = match lock(&state) {
        Ok(g) => g,
        Err(resp) => return resp,
    };
    match lobby.remove_player(path.player_id) {
        Ok(_) => HttpResponse::Ok().json(lobby.roster()),
        Err(e) => error_response(e),
    }
}

/// Clear every player.
#[delete("/api/players")]
async fn api_clear_players(state: AppState) -> HttpResponse {
    let mut lobby = match lock(&state) {
        Ok(g) => g,
        Err(resp) => return resp,
    };
    match lobby.clear_players() {
        Ok(()) => HttpResponse::Ok().json(lobby.roster()),
        Err(e) => error_response(e),
    }
}

/// Reset every rating to the default.
#[post("/api/players/reset-ratings")]
async fn api_reset_ratings(state: AppState) -> HttpResponse {
    let mut lobby = match lock(&state) {
        Ok(g) => g,
        Err(resp) => return resp,
    };
    match lobby.reset_ratings() {
        Ok(()) => HttpResponse::Ok().json(lobby.roster()),
        Err(e) => error_response(e),
    }
}

#[get("/api/leaderboard")]
async fn api_leaderboard(state: AppState) -> HttpResponse {
    let lobby = match lock(&state) {
        Ok(g) => g,
        Err(resp) => return resp,
    };
    HttpResponse::Ok().json(lobby.leaderboard())
}

#[get("/api/leaderboard.csv")]
async fn api_leaderboard_csv(state: AppState) -> HttpResponse {
    let lobby = match lock(&state) {
        Ok(g) => g,
        Err(resp) => return resp,
    };
    let mut buf = Vec::new();
    match lobby.roster().write_leaderboard_csv(&mut buf) {
        Ok(()) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .body(buf),
        Err(e) => {
            log::error!("Failed to write leaderboard CSV: {}", e);
            HttpResponse::InternalServerError().body("csv error")
        }
    }
}

/// Allowed round counts for the roster, or for `?players=N`.
#[get("/api/rounds")]
async fn api_round_bounds(state: AppState, query: Query<BoundsQuery>) -> HttpResponse {
    let lobby = match lock(&state) {
        Ok(g) => g,
        Err(resp) => return resp,
    };
    let bounds = match query.players {
        Some(n) => elite_tournament::RoundBounds::for_players(n),
        None => lobby.round_bounds(),
    };
    HttpResponse::Ok().json(bounds)
}

#[get("/api/tournament")]
async fn api_get_tournament(state: AppState) -> HttpResponse {
    let lobby = match lock(&state) {
        Ok(g) => g,
        Err(resp) => return resp,
    };
    tournament_json(&lobby)
}

/// Start a tournament (whole roster unless `player_ids` is given).
#[post("/api/tournament")]
async fn api_start_tournament(state: AppState, body: Json<StartTournamentBody>) -> HttpResponse {
    let mut lobby = match lock(&state) {
        Ok(g) => g,
        Err(resp) => return resp,
    };
    let body = body.into_inner();
    let entrant_count = body
        .player_ids
        .as_ref()
        .map_or(lobby.roster().len(), Vec::len);
    let total_rounds = body
        .total_rounds
        .unwrap_or_else(|| elite_tournament::RoundBounds::for_players(entrant_count).max);
    let started = lobby.start_tournament(
        body.player_ids.as_deref(),
        total_rounds,
        RandomShuffle::new(),
    );
    match started {
        Ok(t) => HttpResponse::Ok().json(t.snapshot()),
        Err(e) => error_response(e),
    }
}

/// Record the winner of one match. Repeating a result is accepted and changes nothing.
#[put("/api/tournament/matches/{match_id}/winner")]
async fn api_set_match_winner(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<SetMatchWinnerBody>,
) -> HttpResponse {
    let mut lobby = match lock(&state) {
        Ok(g) => g,
        Err(resp) => return resp,
    };
    match lobby.record_result(path.match_id, body.winner) {
        Ok(recorded) => HttpResponse::Ok().json(serde_json::json!({
            "recorded": recorded,
            "tournament": lobby.tournament().map(|t| t.snapshot()),
        })),
        Err(e) => error_response(e),
    }
}

#[post("/api/tournament/advance")]
async fn api_advance_round(state: AppState) -> HttpResponse {
    let mut lobby = match lock(&state) {
        Ok(g) => g,
        Err(resp) => return resp,
    };
    match lobby.advance_round() {
        Ok(_) => tournament_json(&lobby),
        Err(e) => error_response(e),
    }
}

#[post("/api/tournament/finish")]
async fn api_finish_tournament(state: AppState) -> HttpResponse {
    let mut lobby = match lock(&state) {
        Ok(g) => g,
        Err(resp) => return resp,
    };
    match lobby.finish_tournament() {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => error_response(e),
    }
}

/// Abandon the current tournament; recorded ratings are kept.
#[delete("/api/tournament")]
async fn api_abandon_tournament(state: AppState) -> HttpResponse {
    let mut lobby = match lock(&state) {
        Ok(g) => g,
        Err(resp) => return resp,
    };
    match lobby.abandon_tournament() {
        Some(t) => HttpResponse::Ok().json(t.snapshot()),
        None => no_tournament(),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();
    let store = Arc::new(JsonFileStore::new(config.roster_path));
    log::info!(
        "Roster file {}, K-factor {}",
        store.path().display(),
        config.k_factor
    );
    let lobby = Lobby::open(store)
        .map_err(std::io::Error::other)?
        .with_k_factor(config.k_factor);

    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(Mutex::new(lobby));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_list_players)
            .service(api_add_player)
            .service(api_reset_ratings)
            .service(api_get_player)
            .service(api_rename_player)
            .service(api_remove_player)
            .service(api_clear_players)
            .service(api_leaderboard)
            .service(api_leaderboard_csv)
            .service(api_round_bounds)
            .service(api_get_tournament)
            .service(api_start_tournament)
            .service(api_set_match_winner)
            .service(api_advance_round)
            .service(api_finish_tournament)
            .service(api_abandon_tournament)
    })
    .bind(bind)?
    .run()
    .await
}
