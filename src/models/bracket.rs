//! Bracket: the ordered matchups of a single-elimination tournament, and the bracket error taxonomy.

use crate::models::matchup::{Matchup, MatchupId, Occupant, Side};
use crate::models::participant::ParticipantId;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Why a winner was refused.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InvalidWinnerReason {
    NotAnOccupant(ParticipantId),
    /// A slot still waits on an earlier matchup.
    AwaitingEarlierRound,
}

impl fmt::Display for InvalidWinnerReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidWinnerReason::NotAnOccupant(id) => write!(f, "{id} is not playing in it"),
            InvalidWinnerReason::AwaitingEarlierRound => {
                write!(f, "it is still waiting on an earlier round")
            }
        }
    }
}

/// Errors from seeding, building, and advancing a bracket.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum BracketError {
    #[error("need at least 2 participants to build a bracket (have {count})")]
    InsufficientParticipants { count: usize },
    #[error("participant {0} appears more than once")]
    DuplicateParticipant(ParticipantId),
    #[error("invalid bracket: {0}")]
    InvalidBracketTopology(String),
    #[error("no matchup {0}")]
    InvalidMatchup(String),
    #[error("matchup {matchup} was already won by {winner}")]
    MatchupAlreadyResolved {
        matchup: MatchupId,
        winner: ParticipantId,
    },
    #[error("cannot declare a winner of {matchup}: {reason}")]
    InvalidWinner {
        matchup: MatchupId,
        reason: InvalidWinnerReason,
    },
}

/// All matchups of a tournament, round 1 first and in index order within each round.
///
/// `size` is the padded power-of-two field; round `r` holds `size / 2^r` matchups.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BracketRecord")]
pub struct Bracket {
    size: usize,
    matchups: Vec<Matchup>,
}

impl Bracket {
    /// Caller guarantees `matchups` is laid out for `size`.
    pub(crate) fn from_parts(size: usize, matchups: Vec<Matchup>) -> Self {
        Self { size, matchups }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn round_count(&self) -> u32 {
        self.size.trailing_zeros()
    }

    pub fn matchups(&self) -> &[Matchup] {
        &self.matchups
    }

    /// Matchups of one round (empty if out of range).
    pub fn round(&self, round: u32) -> &[Matchup] {
        if round == 0 || round > self.round_count() {
            return &[];
        }
        let start = self.offset(round);
        &self.matchups[start..start + (self.size >> round)]
    }

    pub fn matchup(&self, id: MatchupId) -> Option<&Matchup> {
        self.position(id).map(|i| &self.matchups[i])
    }

    pub(crate) fn matchup_mut(&mut self, id: MatchupId) -> Option<&mut Matchup> {
        self.position(id).map(move |i| &mut self.matchups[i])
    }

    pub fn final_matchup(&self) -> Option<&Matchup> {
        self.matchups.last()
    }

    /// Winner of the final, once decided.
    pub fn champion(&self) -> Option<&ParticipantId> {
        self.final_matchup().and_then(|m| m.winner.as_ref())
    }

    pub fn is_complete(&self) -> bool {
        self.champion().is_some()
    }

    /// Reject a BYE facing a BYE, and placeholders that do not name the matchup feeding their
    /// slot or that wait on a matchup already decided.
    fn check_slots(&self, m: &Matchup) -> Result<(), BracketError> {
        if m.player1.occupant == Occupant::Bye && m.player2.occupant == Occupant::Bye {
            return Err(BracketError::InvalidBracketTopology(format!(
                "matchup {} pairs a BYE against a BYE",
                m.id
            )));
        }
        for side in [Side::One, Side::Two] {
            let Occupant::AwaitingMatch(feeder) = m.slot(side).occupant else {
                continue;
            };
            if self.position(feeder).is_none() || feeder.next() != (m.id, side) {
                return Err(BracketError::InvalidBracketTopology(format!(
                    "matchup {} waits on {feeder}, which does not feed that slot",
                    m.id
                )));
            }
            if self.matchup(feeder).is_some_and(Matchup::is_resolved) {
                return Err(BracketError::InvalidBracketTopology(format!(
                    "matchup {} still waits on {feeder}, which is already decided",
                    m.id
                )));
            }
        }
        Ok(())
    }

    fn offset(&self, round: u32) -> usize {
        self.size - (self.size >> (round - 1))
    }

    fn position(&self, id: MatchupId) -> Option<usize> {
        let round = id.round();
        if round == 0 || round > self.round_count() {
            return None;
        }
        let index = id.index() as usize;
        if index == 0 || index > self.size >> round {
            return None;
        }
        Some(self.offset(round) + index - 1)
    }
}

#[derive(Deserialize)]
struct BracketRecord {
    size: usize,
    matchups: Vec<Matchup>,
}

impl TryFrom<BracketRecord> for Bracket {
    type Error = BracketError;

    fn try_from(record: BracketRecord) -> Result<Self, Self::Error> {
        let size = record.size;
        if size < 2 || !size.is_power_of_two() {
            return Err(BracketError::InvalidBracketTopology(format!(
                "size {size} is not a power of two of at least 2"
            )));
        }
        if record.matchups.len() != size - 1 {
            return Err(BracketError::InvalidBracketTopology(format!(
                "{} matchups for a bracket of {size}",
                record.matchups.len()
            )));
        }
        let bracket = Bracket::from_parts(size, record.matchups);
        for (i, m) in bracket.matchups.iter().enumerate() {
            if bracket.position(m.id) != Some(i) {
                return Err(BracketError::InvalidBracketTopology(format!(
                    "matchup {} out of place",
                    m.id
                )));
            }
            bracket.check_slots(m)?;
        }
        Ok(bracket)
    }
}
