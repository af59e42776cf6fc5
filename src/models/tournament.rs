//! Tournament aggregate and TournamentStatus.

use crate::models::bracket::{Bracket, BracketError};
use crate::models::matchup::MatchupId;
use crate::models::participant::{Participant, ParticipantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// User identifier of someone voting or organizing (not necessarily a participant).
pub type UserId = String;

/// Errors from tournament-level operations. Bracket failures are wrapped as-is.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum TournamentError {
    #[error("not allowed while the tournament is {0}")]
    InvalidState(TournamentStatus),
    #[error("participant {0} already joined")]
    AlreadyJoined(ParticipantId),
    #[error("tournament is full ({capacity} participants)")]
    TournamentFull { capacity: usize },
    #[error("participant {0} not found")]
    ParticipantNotFound(ParticipantId),
    #[error("display name must not be empty")]
    EmptyDisplayName,
    #[error("only the organizer can do this")]
    NotOrganizer,
    #[error("voting on {0} is closed")]
    VotingClosed(MatchupId),
    #[error("voting on {matchup} is tied at {votes} each")]
    TiedVote { matchup: MatchupId, votes: u32 },
    #[error("tournament changed (expected version {expected}, now {actual})")]
    VersionConflict { expected: u64, actual: u64 },
    #[error("tournament {0} not found")]
    TournamentNotFound(TournamentId),
    #[error(transparent)]
    Bracket(#[from] BracketError),
}

/// Tournament lifecycle. Only moves forward.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Accepting participants; no bracket yet.
    #[default]
    Open,
    /// Bracket generated; matchups resolving.
    InProgress,
    /// Final resolved; champion set.
    Completed,
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TournamentStatus::Open => "open",
            TournamentStatus::InProgress => "in progress",
            TournamentStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// How participants are ordered into bracket slots when the tournament begins.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SeedingPolicy {
    /// Join order is seed order (first joined = seed 1).
    #[default]
    Ranked,
    /// Shuffle with a fixed RNG seed, then place as ranked. Same seed, same bracket.
    Random { seed: u64 },
}

/// A bracket competition: participants, the bracket once begun, votes, and status.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub organizer_id: UserId,
    pub status: TournamentStatus,
    pub seeding: SeedingPolicy,
    /// None means unlimited.
    pub max_participants: Option<usize>,
    /// Join order; this is the seed order under ranked seeding.
    pub participants: Vec<Participant>,
    /// Generated once when the tournament begins.
    pub bracket: Option<Bracket>,
    /// Per matchup: voter -> participant voted for.
    pub votes: BTreeMap<MatchupId, BTreeMap<UserId, ParticipantId>>,
    pub champion: Option<ParticipantId>,
    /// Bumped on every change; callers use it for compare-and-swap writes.
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Tournament {
    /// Create an open tournament with no participants.
    pub fn new(
        name: impl Into<String>,
        organizer_id: impl Into<UserId>,
        seeding: SeedingPolicy,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            organizer_id: organizer_id.into(),
            status: TournamentStatus::Open,
            seeding,
            max_participants: None,
            participants: Vec::new(),
            bracket: None,
            votes: BTreeMap::new(),
            champion: None,
            version: 0,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    pub fn with_capacity(self, max_participants: usize) -> Self {
        Self {
            max_participants: Some(max_participants),
            ..self
        }
    }

    pub fn participant(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Add a participant (Open only). Ids are unique; the display name is trimmed.
    pub fn join(&mut self, participant: Participant) -> Result<(), TournamentError> {
        self.require_status(TournamentStatus::Open)?;
        let display_name = participant.display_name.trim();
        if display_name.is_empty() {
            return Err(TournamentError::EmptyDisplayName);
        }
        if self.participant(&participant.id).is_some() {
            return Err(TournamentError::AlreadyJoined(participant.id));
        }
        if let Some(capacity) = self.max_participants {
            if self.participants.len() >= capacity {
                return Err(TournamentError::TournamentFull { capacity });
            }
        }
        let participant = Participant::new(participant.id, display_name);
        self.participants.push(participant);
        self.touch();
        Ok(())
    }

    /// Remove a participant (Open only).
    pub fn leave(&mut self, participant_id: &str) -> Result<(), TournamentError> {
        self.require_status(TournamentStatus::Open)?;
        let idx = self
            .participants
            .iter()
            .position(|p| p.id == participant_id)
            .ok_or_else(|| TournamentError::ParticipantNotFound(participant_id.to_string()))?;
        self.participants.remove(idx);
        self.touch();
        Ok(())
    }

    /// Fail with `VersionConflict` unless `expected` is absent or matches the current version.
    pub fn check_version(&self, expected: Option<u64>) -> Result<(), TournamentError> {
        match expected {
            Some(expected) if expected != self.version => Err(TournamentError::VersionConflict {
                expected,
                actual: self.version,
            }),
            _ => Ok(()),
        }
    }

    pub(crate) fn require_status(&self, status: TournamentStatus) -> Result<(), TournamentError> {
        if self.status != status {
            return Err(TournamentError::InvalidState(self.status));
        }
        Ok(())
    }

    pub(crate) fn require_organizer(&self, user_id: &str) -> Result<(), TournamentError> {
        if self.organizer_id != user_id {
            return Err(TournamentError::NotOrganizer);
        }
        Ok(())
    }

    /// The bracket of a begun tournament.
    pub(crate) fn bracket_mut(&mut self) -> Result<&mut Bracket, TournamentError> {
        let status = self.status;
        self.bracket
            .as_mut()
            .ok_or(TournamentError::InvalidState(status))
    }

    /// Record the champion once the bracket's final is resolved.
    pub(crate) fn complete_if_decided(&mut self) {
        let champion = self.bracket.as_ref().and_then(|b| b.champion()).cloned();
        if let Some(champion) = champion {
            self.champion = Some(champion);
            self.status = TournamentStatus::Completed;
            self.completed_at = Some(Utc::now());
        }
    }

    pub(crate) fn touch(&mut self) {
        self.version += 1;
    }
}
