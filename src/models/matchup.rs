//! Matchup, its slots, and the `R{round}M{index}` identifier.

use crate::models::participant::{Participant, ParticipantId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Display name served for a BYE slot.
pub const BYE_LABEL: &str = "BYE";

const AWAITING_PREFIX: &str = "Winner of ";

/// Identifier of a matchup: round and index within the round, both 1-indexed.
///
/// Printed and parsed as `R{round}M{index}`; external callers address matchups by this string.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct MatchupId {
    round: u32,
    index: u32,
}

impl MatchupId {
    pub fn new(round: u32, index: u32) -> Self {
        Self { round, index }
    }

    pub fn round(self) -> u32 {
        self.round
    }

    pub fn index(self) -> u32 {
        self.index
    }

    /// The matchup this one feeds and the side its winner lands on.
    pub fn next(self) -> (MatchupId, Side) {
        let side = if self.index % 2 == 1 { Side::One } else { Side::Two };
        (MatchupId::new(self.round + 1, self.index.div_ceil(2)), side)
    }

    /// The two previous-round matchups feeding player1 and player2. `None` in round 1.
    pub fn feeders(self) -> Option<(MatchupId, MatchupId)> {
        if self.round < 2 || self.index == 0 {
            return None;
        }
        Some((
            MatchupId::new(self.round - 1, self.index * 2 - 1),
            MatchupId::new(self.round - 1, self.index * 2),
        ))
    }
}

impl fmt::Display for MatchupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}M{}", self.round, self.index)
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("invalid matchup id {0:?}, expected R<round>M<index>")]
pub struct ParseMatchupIdError(pub String);

impl FromStr for MatchupId {
    type Err = ParseMatchupIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseMatchupIdError(s.to_string());
        let rest = s.strip_prefix('R').ok_or_else(err)?;
        let (round, index) = rest.split_once('M').ok_or_else(err)?;
        let parse = |part: &str| -> Result<u32, ParseMatchupIdError> {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(err());
            }
            match part.parse::<u32>() {
                Ok(0) | Err(_) => Err(err()),
                Ok(n) => Ok(n),
            }
        };
        Ok(MatchupId::new(parse(round)?, parse(index)?))
    }
}

impl From<MatchupId> for String {
    fn from(id: MatchupId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for MatchupId {
    type Error = ParseMatchupIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Which slot of a matchup.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    One,
    Two,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }
}

/// Who sits in a bracket slot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Occupant {
    Known(Participant),
    /// Filled by the winner of the given earlier matchup once it resolves.
    AwaitingMatch(MatchupId),
    Bye,
}

impl Occupant {
    pub fn participant(&self) -> Option<&Participant> {
        match self {
            Occupant::Known(p) => Some(p),
            _ => None,
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            Occupant::Known(p) => p.display_name.clone(),
            Occupant::AwaitingMatch(id) => format!("{AWAITING_PREFIX}{id}"),
            Occupant::Bye => BYE_LABEL.to_string(),
        }
    }
}

/// One player position in a matchup.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BracketSlot {
    pub occupant: Occupant,
    /// Votes received in this matchup.
    pub score: u32,
}

impl BracketSlot {
    pub fn new(occupant: Occupant) -> Self {
        Self { occupant, score: 0 }
    }
}

/// Where a matchup is in its lifecycle. Matchups only move forward.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchupState {
    /// At least one slot awaits an earlier matchup.
    Placeholder,
    /// Both occupants known, no winner yet.
    Pending,
    Resolved,
}

/// A head-to-head pairing within one round.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(into = "MatchupRecord", try_from = "MatchupRecord")]
pub struct Matchup {
    pub id: MatchupId,
    pub player1: BracketSlot,
    pub player2: BracketSlot,
    pub winner: Option<ParticipantId>,
}

impl Matchup {
    pub fn new(id: MatchupId, player1: Occupant, player2: Occupant) -> Self {
        Self {
            id,
            player1: BracketSlot::new(player1),
            player2: BracketSlot::new(player2),
            winner: None,
        }
    }

    pub fn round(&self) -> u32 {
        self.id.round()
    }

    pub fn slot(&self, side: Side) -> &BracketSlot {
        match side {
            Side::One => &self.player1,
            Side::Two => &self.player2,
        }
    }

    pub fn slot_mut(&mut self, side: Side) -> &mut BracketSlot {
        match side {
            Side::One => &mut self.player1,
            Side::Two => &mut self.player2,
        }
    }

    /// Side held by the given participant, if they are a known occupant.
    pub fn side_of(&self, participant_id: &str) -> Option<Side> {
        [Side::One, Side::Two].into_iter().find(|&side| {
            self.slot(side)
                .occupant
                .participant()
                .is_some_and(|p| p.id == participant_id)
        })
    }

    pub fn is_bye(&self) -> bool {
        self.player1.occupant == Occupant::Bye || self.player2.occupant == Occupant::Bye
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.player1.occupant, Occupant::AwaitingMatch(_))
            || matches!(self.player2.occupant, Occupant::AwaitingMatch(_))
    }

    pub fn is_resolved(&self) -> bool {
        self.winner.is_some()
    }

    pub fn state(&self) -> MatchupState {
        if self.is_resolved() {
            MatchupState::Resolved
        } else if self.is_placeholder() {
            MatchupState::Placeholder
        } else {
            MatchupState::Pending
        }
    }

    /// Side that advances without a contest: an unresolved known occupant facing a BYE.
    pub fn bye_winner(&self) -> Option<Side> {
        if self.is_resolved() {
            return None;
        }
        match (&self.player1.occupant, &self.player2.occupant) {
            (Occupant::Known(_), Occupant::Bye) => Some(Side::One),
            (Occupant::Bye, Occupant::Known(_)) => Some(Side::Two),
            _ => None,
        }
    }
}

/// Rejected matchup record.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum MatchupRecordError {
    #[error("round number {round_number} does not match matchup {matchup}")]
    RoundMismatch { matchup: MatchupId, round_number: u32 },
    #[error("slot {display_name:?} in {matchup} has no participant and is neither a bye nor a placeholder")]
    UnknownSlot { matchup: MatchupId, display_name: String },
    #[error("winner {winner} is not an occupant of {matchup}")]
    ForeignWinner { matchup: MatchupId, winner: ParticipantId },
}

/// Persisted and served JSON shape of a matchup.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchupRecord {
    matchup_id: MatchupId,
    round_number: u32,
    player1: SlotRecord,
    player2: SlotRecord,
    winner_participant_id: Option<ParticipantId>,
    is_placeholder: bool,
    is_bye: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SlotRecord {
    participant_id: Option<ParticipantId>,
    display_name: String,
    #[serde(default)]
    score: u32,
}

impl From<&BracketSlot> for SlotRecord {
    fn from(slot: &BracketSlot) -> Self {
        Self {
            participant_id: slot.occupant.participant().map(|p| p.id.clone()),
            display_name: slot.occupant.display_name(),
            score: slot.score,
        }
    }
}

impl SlotRecord {
    fn into_slot(self, matchup: MatchupId) -> Result<BracketSlot, MatchupRecordError> {
        let occupant = match self.participant_id {
            Some(id) => Occupant::Known(Participant::new(id, self.display_name)),
            None if self.display_name == BYE_LABEL => Occupant::Bye,
            None => self
                .display_name
                .strip_prefix(AWAITING_PREFIX)
                .and_then(|id| id.parse().ok())
                .map(Occupant::AwaitingMatch)
                .ok_or(MatchupRecordError::UnknownSlot {
                    matchup,
                    display_name: self.display_name,
                })?,
        };
        Ok(BracketSlot {
            occupant,
            score: self.score,
        })
    }
}

impl From<Matchup> for MatchupRecord {
    fn from(m: Matchup) -> Self {
        Self {
            matchup_id: m.id,
            round_number: m.round(),
            player1: SlotRecord::from(&m.player1),
            player2: SlotRecord::from(&m.player2),
            is_placeholder: m.is_placeholder(),
            is_bye: m.is_bye(),
            winner_participant_id: m.winner,
        }
    }
}

impl TryFrom<MatchupRecord> for Matchup {
    type Error = MatchupRecordError;

    fn try_from(record: MatchupRecord) -> Result<Self, Self::Error> {
        let id = record.matchup_id;
        if record.round_number != id.round() {
            return Err(MatchupRecordError::RoundMismatch {
                matchup: id,
                round_number: record.round_number,
            });
        }
        let matchup = Matchup {
            id,
            player1: record.player1.into_slot(id)?,
            player2: record.player2.into_slot(id)?,
            winner: record.winner_participant_id,
        };
        if let Some(winner) = &matchup.winner {
            if matchup.side_of(winner).is_none() {
                return Err(MatchupRecordError::ForeignWinner {
                    matchup: id,
                    winner: winner.clone(),
                });
            }
        }
        Ok(matchup)
    }
}
