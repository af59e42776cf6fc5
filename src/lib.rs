//! MusikMadness: single-elimination music competitions. Library with models, bracket logic,
//! and the REST API served by the `web` binary.

pub mod api;
pub mod config;
pub mod logic;
pub mod models;

pub use logic::{
    advance, begin_tournament, bracket_size, build_bracket, cast_vote, close_voting, seed,
    set_matchup_winner, standard_order, AdvanceOutcome, SeededSlot, VoteTally,
};
pub use models::{
    Bracket, BracketError, BracketSlot, InvalidWinnerReason, Matchup, MatchupId, MatchupState,
    Occupant, Participant, ParticipantId, SeedingPolicy, Side, Tournament, TournamentError,
    TournamentId, TournamentStatus, UserId, BYE_LABEL,
};
