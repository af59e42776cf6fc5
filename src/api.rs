//! REST API: in-memory tournament store and actix-web handlers.
//!
//! Every mutating request takes the store's write lock, so writes to a tournament are serialized.
//! Clients may also send `expectedVersion` to reject a write based on a stale read.

use crate::logic::{
    begin_tournament, cast_vote, close_voting, set_matchup_winner, AdvanceOutcome, VoteTally,
};
use crate::models::{
    BracketError, MatchupId, Participant, ParticipantId, SeedingPolicy, Tournament,
    TournamentError, TournamentId, UserId,
};
use actix_web::{
    delete, get, http::StatusCode, post, put,
    web::{Data, Json, Path, ServiceConfig},
    HttpResponse, Responder, ResponseError,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Per-tournament entry: tournament data + last activity time (for auto-cleanup).
struct TournamentEntry {
    tournament: Tournament,
    last_activity: Instant,
}

/// All live tournaments, keyed by id.
#[derive(Default)]
pub struct TournamentStore {
    entries: RwLock<HashMap<TournamentId, TournamentEntry>>,
}

impl TournamentStore {
    /// Drop tournaments not touched within `timeout`. Returns how many were removed.
    pub fn remove_inactive(&self, timeout: Duration) -> Result<usize, ApiError> {
        let mut g = self.entries.write().map_err(|_| ApiError::Lock)?;
        let before = g.len();
        g.retain(|_, entry| entry.last_activity.elapsed() < timeout);
        Ok(before - g.len())
    }

    pub fn len(&self) -> Result<usize, ApiError> {
        let g = self.entries.read().map_err(|_| ApiError::Lock)?;
        Ok(g.len())
    }

    pub fn is_empty(&self) -> Result<bool, ApiError> {
        Ok(self.len()? == 0)
    }

    fn insert(&self, tournament: Tournament) -> Result<(), ApiError> {
        let mut g = self.entries.write().map_err(|_| ApiError::Lock)?;
        g.insert(
            tournament.id,
            TournamentEntry {
                tournament,
                last_activity: Instant::now(),
            },
        );
        Ok(())
    }

    /// Run `f` on one tournament under the write lock, refreshing its activity time.
    fn with_tournament<T>(
        &self,
        id: TournamentId,
        f: impl FnOnce(&mut Tournament) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let mut g = self.entries.write().map_err(|_| ApiError::Lock)?;
        let entry = g
            .get_mut(&id)
            .ok_or(ApiError::Tournament(TournamentError::TournamentNotFound(id)))?;
        entry.last_activity = Instant::now();
        f(&mut entry.tournament)
    }
}

pub type AppState = Data<TournamentStore>;

/// Error returned by handlers; rendered as `{"error": message}` with a matching status.
#[derive(Debug)]
pub enum ApiError {
    Tournament(TournamentError),
    Lock,
}

impl From<TournamentError> for ApiError {
    fn from(e: TournamentError) -> Self {
        ApiError::Tournament(e)
    }
}

impl From<BracketError> for ApiError {
    fn from(e: BracketError) -> Self {
        ApiError::Tournament(e.into())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Tournament(e) => write!(f, "{e}"),
            ApiError::Lock => write!(f, "lock error"),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        use TournamentError::*;
        match self {
            ApiError::Lock => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Tournament(e) => match e {
                TournamentNotFound(_) | ParticipantNotFound(_) => StatusCode::NOT_FOUND,
                Bracket(BracketError::InvalidMatchup(_)) => StatusCode::NOT_FOUND,
                Bracket(BracketError::MatchupAlreadyResolved { .. }) => StatusCode::CONFLICT,
                InvalidState(_) | AlreadyJoined(_) | VotingClosed(_) | VersionConflict { .. } => {
                    StatusCode::CONFLICT
                }
                NotOrganizer => StatusCode::FORBIDDEN,
                _ => StatusCode::BAD_REQUEST,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.to_string() }))
    }
}

type ApiResult = Result<HttpResponse, ApiError>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

/// Seeding requested at creation. A random policy without a seed gets one drawn and stored.
#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum SeedingRequest {
    Ranked,
    Random { seed: Option<u64> },
}

impl SeedingRequest {
    fn into_policy(self) -> SeedingPolicy {
        match self {
            SeedingRequest::Ranked => SeedingPolicy::Ranked,
            SeedingRequest::Random { seed } => SeedingPolicy::Random {
                seed: seed.unwrap_or_else(|| rand::thread_rng().gen()),
            },
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTournamentBody {
    name: String,
    organizer_id: UserId,
    seeding: Option<SeedingRequest>,
    max_participants: Option<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JoinBody {
    participant_id: ParticipantId,
    display_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrganizerBody {
    organizer_id: UserId,
    expected_version: Option<u64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VoteBody {
    voter_id: UserId,
    participant_id: ParticipantId,
    expected_version: Option<u64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetWinnerBody {
    organizer_id: UserId,
    winner_participant_id: ParticipantId,
    expected_version: Option<u64>,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and participant id.
#[derive(Deserialize)]
struct ParticipantPath {
    id: TournamentId,
    participant_id: ParticipantId,
}

/// Path segments: tournament id and matchup id (`R{round}M{index}`).
#[derive(Deserialize)]
struct MatchupPath {
    id: TournamentId,
    matchup_id: String,
}

impl MatchupPath {
    fn matchup_id(&self) -> Result<MatchupId, ApiError> {
        self.matchup_id
            .parse()
            .map_err(|_| BracketError::InvalidMatchup(self.matchup_id.clone()).into())
    }
}

/// Result of a vote: the new tally plus the tournament it applies to.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoteResponse<'a> {
    tally: VoteTally,
    tournament: &'a Tournament,
}

/// Result of resolving a matchup.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResolveResponse<'a> {
    resolved: Vec<MatchupId>,
    champion: Option<&'a ParticipantId>,
    tournament: &'a Tournament,
}

fn resolve_response(tournament: &Tournament, outcome: AdvanceOutcome) -> HttpResponse {
    let resolved = match outcome {
        AdvanceOutcome::Advanced { resolved } | AdvanceOutcome::Completed { resolved, .. } => {
            resolved
        }
        AdvanceOutcome::Unchanged => Vec::new(),
    };
    HttpResponse::Ok().json(ResolveResponse {
        resolved,
        champion: tournament.champion.as_ref(),
        tournament,
    })
}

fn log_completion(tournament: &Tournament, outcome: &AdvanceOutcome) {
    if let AdvanceOutcome::Completed { champion, .. } = outcome {
        log::info!("Tournament {} completed, champion {}", tournament.id, champion);
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "musik-madness",
    })
}

/// Create a tournament (Open, no participants).
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<CreateTournamentBody>) -> ApiResult {
    let body = body.into_inner();
    let seeding = body
        .seeding
        .map(SeedingRequest::into_policy)
        .unwrap_or_default();
    let mut tournament = Tournament::new(body.name.trim(), body.organizer_id, seeding);
    if let Some(max) = body.max_participants {
        tournament = tournament.with_capacity(max);
    }
    log::info!("Created tournament {} ({:?})", tournament.id, tournament.name);
    let response = HttpResponse::Ok().json(&tournament);
    state.insert(tournament)?;
    Ok(response)
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> ApiResult {
    state.with_tournament(path.id, |t| Ok(HttpResponse::Ok().json(&*t)))
}

/// The bracket alone (409 before the tournament begins).
#[get("/api/tournaments/{id}/bracket")]
async fn api_get_bracket(state: AppState, path: Path<TournamentPath>) -> ApiResult {
    state.with_tournament(path.id, |t| match &t.bracket {
        Some(bracket) => Ok(HttpResponse::Ok().json(bracket)),
        None => Err(TournamentError::InvalidState(t.status).into()),
    })
}

#[post("/api/tournaments/{id}/participants")]
async fn api_join(state: AppState, path: Path<TournamentPath>, body: Json<JoinBody>) -> ApiResult {
    let body = body.into_inner();
    state.with_tournament(path.id, |t| {
        t.join(Participant::new(body.participant_id, body.display_name))?;
        Ok(HttpResponse::Ok().json(&*t))
    })
}

#[delete("/api/tournaments/{id}/participants/{participant_id}")]
async fn api_leave(state: AppState, path: Path<ParticipantPath>) -> ApiResult {
    state.with_tournament(path.id, |t| {
        t.leave(&path.participant_id)?;
        Ok(HttpResponse::Ok().json(&*t))
    })
}

/// Generate the bracket and start play (Open -> InProgress).
#[post("/api/tournaments/{id}/begin")]
async fn api_begin(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<OrganizerBody>,
) -> ApiResult {
    state.with_tournament(path.id, |t| {
        t.check_version(body.expected_version)?;
        begin_tournament(t, &body.organizer_id)?;
        log::info!(
            "Tournament {} begun with {} participants (bracket of {})",
            t.id,
            t.participants.len(),
            t.bracket.as_ref().map_or(0, |b| b.size())
        );
        Ok(HttpResponse::Ok().json(&*t))
    })
}

#[post("/api/tournaments/{id}/matchups/{matchup_id}/votes")]
async fn api_vote(state: AppState, path: Path<MatchupPath>, body: Json<VoteBody>) -> ApiResult {
    let matchup_id = path.matchup_id()?;
    state.with_tournament(path.id, |t| {
        t.check_version(body.expected_version)?;
        let tally = cast_vote(t, matchup_id, &body.voter_id, &body.participant_id)?;
        Ok(HttpResponse::Ok().json(VoteResponse {
            tally,
            tournament: t,
        }))
    })
}

/// Close voting on a matchup; the side with more votes advances.
#[post("/api/tournaments/{id}/matchups/{matchup_id}/close")]
async fn api_close_voting(
    state: AppState,
    path: Path<MatchupPath>,
    body: Json<OrganizerBody>,
) -> ApiResult {
    let matchup_id = path.matchup_id()?;
    state.with_tournament(path.id, |t| {
        t.check_version(body.expected_version)?;
        let outcome = close_voting(t, &body.organizer_id, matchup_id)?;
        log_completion(t, &outcome);
        Ok(resolve_response(t, outcome))
    })
}

/// Organizer override: declare the winner of a matchup.
#[put("/api/tournaments/{id}/matchups/{matchup_id}/winner")]
async fn api_set_winner(
    state: AppState,
    path: Path<MatchupPath>,
    body: Json<SetWinnerBody>,
) -> ApiResult {
    let matchup_id = path.matchup_id()?;
    state.with_tournament(path.id, |t| {
        t.check_version(body.expected_version)?;
        let outcome = set_matchup_winner(
            t,
            &body.organizer_id,
            matchup_id,
            &body.winner_participant_id,
        )?;
        log_completion(t, &outcome);
        Ok(resolve_response(t, outcome))
    })
}

/// Register every route on an app.
pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(api_health)
        .service(api_create_tournament)
        .service(api_get_tournament)
        .service(api_get_bracket)
        .service(api_join)
        .service(api_leave)
        .service(api_begin)
        .service(api_vote)
        .service(api_close_voting)
        .service(api_set_winner);
}
