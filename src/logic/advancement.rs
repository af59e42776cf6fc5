//! Advancement engine: declare a matchup winner and carry them into the next round.

use crate::models::{
    Bracket, BracketError, InvalidWinnerReason, MatchupId, Occupant, ParticipantId, Side,
};

/// What an `advance` call changed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AdvanceOutcome {
    /// The matchup already had this winner; nothing changed.
    Unchanged,
    /// The matchup resolved. `resolved` starts with it, followed by any BYEs it cascaded through.
    Advanced { resolved: Vec<MatchupId> },
    /// The final resolved. `resolved` is ordered as for `Advanced` and ends with the final.
    Completed {
        resolved: Vec<MatchupId>,
        champion: ParticipantId,
    },
}

/// Declare `winner` the winner of `matchup_id` and propagate them forward.
///
/// Resubmitting the current winner is a no-op. Every check runs before anything is written,
/// so on error the bracket is untouched.
pub fn advance(
    bracket: &mut Bracket,
    matchup_id: MatchupId,
    winner: &str,
) -> Result<AdvanceOutcome, BracketError> {
    let matchup = bracket
        .matchup(matchup_id)
        .ok_or_else(|| BracketError::InvalidMatchup(matchup_id.to_string()))?;
    let side = matchup.side_of(winner);

    if let Some(current) = &matchup.winner {
        if current == winner {
            return Ok(AdvanceOutcome::Unchanged);
        }
        return Err(match side {
            Some(_) => BracketError::MatchupAlreadyResolved {
                matchup: matchup_id,
                winner: current.clone(),
            },
            None => BracketError::InvalidWinner {
                matchup: matchup_id,
                reason: InvalidWinnerReason::NotAnOccupant(winner.to_string()),
            },
        });
    }
    if matchup.is_placeholder() {
        return Err(BracketError::InvalidWinner {
            matchup: matchup_id,
            reason: InvalidWinnerReason::AwaitingEarlierRound,
        });
    }
    let side = side.ok_or_else(|| BracketError::InvalidWinner {
        matchup: matchup_id,
        reason: InvalidWinnerReason::NotAnOccupant(winner.to_string()),
    })?;

    let resolved = resolve(bracket, matchup_id, side);
    Ok(match bracket.champion() {
        Some(champion) => AdvanceOutcome::Completed {
            resolved,
            champion: champion.clone(),
        },
        None => AdvanceOutcome::Advanced { resolved },
    })
}

/// Set the occupant on `side` as winner of `id`, fill them into the next matchup, and keep going
/// while the filled matchup is a BYE. Returns every matchup resolved, in order.
///
/// Expects `id` to exist and `side` to hold a known occupant; stops quietly otherwise.
pub(crate) fn resolve(bracket: &mut Bracket, id: MatchupId, side: Side) -> Vec<MatchupId> {
    let rounds = bracket.round_count();
    let mut resolved = Vec::new();
    let mut current = Some((id, side));

    while let Some((id, side)) = current.take() {
        let Some(matchup) = bracket.matchup_mut(id) else {
            break;
        };
        let Some(winner) = matchup.slot(side).occupant.participant().cloned() else {
            break;
        };
        matchup.winner = Some(winner.id.clone());
        resolved.push(id);
        if id.round() == rounds {
            break;
        }

        let (next_id, next_side) = id.next();
        let Some(next) = bracket.matchup_mut(next_id) else {
            break;
        };
        next.slot_mut(next_side).occupant = Occupant::Known(winner);
        current = next.bye_winner().map(|s| (next_id, s));
    }
    resolved
}
