//! Votes and results: listeners vote on pending matchups, the organizer closes voting or overrides.

use crate::logic::advancement::{advance, AdvanceOutcome};
use crate::models::{
    BracketError, InvalidWinnerReason, Matchup, MatchupId, Side, Tournament, TournamentError,
    TournamentStatus,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Current votes per side of a matchup.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteTally {
    pub player1: u32,
    pub player2: u32,
}

/// Record `voter_id`'s vote for `participant_id` in a pending matchup.
///
/// One vote per voter per matchup; voting again moves the vote. Slot scores are kept equal to the
/// tally. Returns the tally after the vote.
pub fn cast_vote(
    tournament: &mut Tournament,
    matchup_id: MatchupId,
    voter_id: &str,
    participant_id: &str,
) -> Result<VoteTally, TournamentError> {
    tournament.require_status(TournamentStatus::InProgress)?;
    let status = tournament.status;
    let matchup = tournament
        .bracket
        .as_mut()
        .ok_or(TournamentError::InvalidState(status))?
        .matchup_mut(matchup_id)
        .ok_or_else(|| BracketError::InvalidMatchup(matchup_id.to_string()))?;
    ensure_open_for_votes(matchup)?;
    if matchup.side_of(participant_id).is_none() {
        return Err(BracketError::InvalidWinner {
            matchup: matchup_id,
            reason: InvalidWinnerReason::NotAnOccupant(participant_id.to_string()),
        }
        .into());
    }

    let ballots = tournament.votes.entry(matchup_id).or_default();
    ballots.insert(voter_id.to_string(), participant_id.to_string());

    let count = |side: Side| {
        let id = matchup.slot(side).occupant.participant().map(|p| p.id.as_str());
        ballots.values().filter(|v| Some(v.as_str()) == id).count() as u32
    };
    let tally = VoteTally {
        player1: count(Side::One),
        player2: count(Side::Two),
    };
    matchup.player1.score = tally.player1;
    matchup.player2.score = tally.player2;
    tournament.touch();
    Ok(tally)
}

/// End voting on a matchup: the side with more votes wins and advances. Ties (0-0 included) are
/// left for the organizer to settle with `set_matchup_winner`.
pub fn close_voting(
    tournament: &mut Tournament,
    organizer_id: &str,
    matchup_id: MatchupId,
) -> Result<AdvanceOutcome, TournamentError> {
    tournament.require_organizer(organizer_id)?;
    tournament.require_status(TournamentStatus::InProgress)?;
    let matchup = tournament
        .bracket
        .as_ref()
        .and_then(|b| b.matchup(matchup_id))
        .ok_or_else(|| BracketError::InvalidMatchup(matchup_id.to_string()))?;
    ensure_open_for_votes(matchup)?;

    let (votes1, votes2) = (matchup.player1.score, matchup.player2.score);
    let side = match votes1.cmp(&votes2) {
        Ordering::Greater => Side::One,
        Ordering::Less => Side::Two,
        Ordering::Equal => {
            return Err(TournamentError::TiedVote {
                matchup: matchup_id,
                votes: votes1,
            })
        }
    };
    let winner = matchup
        .slot(side)
        .occupant
        .participant()
        .map(|p| p.id.clone())
        .ok_or(BracketError::InvalidWinner {
            matchup: matchup_id,
            reason: InvalidWinnerReason::AwaitingEarlierRound,
        })?;
    apply_winner(tournament, matchup_id, &winner)
}

/// Organizer override: declare the winner directly, regardless of votes.
pub fn set_matchup_winner(
    tournament: &mut Tournament,
    organizer_id: &str,
    matchup_id: MatchupId,
    winner: &str,
) -> Result<AdvanceOutcome, TournamentError> {
    tournament.require_organizer(organizer_id)?;
    if tournament.status == TournamentStatus::Open {
        return Err(TournamentError::InvalidState(TournamentStatus::Open));
    }
    apply_winner(tournament, matchup_id, winner)
}

fn ensure_open_for_votes(matchup: &Matchup) -> Result<(), TournamentError> {
    if matchup.is_resolved() {
        return Err(TournamentError::VotingClosed(matchup.id));
    }
    if matchup.is_placeholder() {
        return Err(BracketError::InvalidWinner {
            matchup: matchup.id,
            reason: InvalidWinnerReason::AwaitingEarlierRound,
        }
        .into());
    }
    Ok(())
}

fn apply_winner(
    tournament: &mut Tournament,
    matchup_id: MatchupId,
    winner: &str,
) -> Result<AdvanceOutcome, TournamentError> {
    let outcome = advance(tournament.bracket_mut()?, matchup_id, winner)?;
    if outcome != AdvanceOutcome::Unchanged {
        tournament.complete_if_decided();
        tournament.touch();
    }
    Ok(outcome)
}
