//! Data structures for bracket tournaments: participants, matchups, brackets, tournaments.

mod bracket;
mod matchup;
mod participant;
mod tournament;

pub use bracket::{Bracket, BracketError, InvalidWinnerReason};
pub use matchup::{
    BracketSlot, Matchup, MatchupId, MatchupRecordError, MatchupState, Occupant,
    ParseMatchupIdError, Side, BYE_LABEL,
};
pub use participant::{Participant, ParticipantId};
pub use tournament::{
    SeedingPolicy, Tournament, TournamentError, TournamentId, TournamentStatus, UserId,
};
