//! Begin a tournament: seed the current participants and build the bracket (Open -> InProgress).

use crate::logic::builder::build_bracket;
use crate::logic::seeding::seed;
use crate::models::{Tournament, TournamentError, TournamentStatus};
use chrono::Utc;

/// Generate the bracket from the participants who joined and start play.
///
/// Only the organizer may begin, and only once. Nothing changes on error.
pub fn begin_tournament(
    tournament: &mut Tournament,
    organizer_id: &str,
) -> Result<(), TournamentError> {
    tournament.require_organizer(organizer_id)?;
    tournament.require_status(TournamentStatus::Open)?;

    let slots = seed(&tournament.participants, tournament.seeding)?;
    let bracket = build_bracket(slots)?;

    tournament.bracket = Some(bracket);
    tournament.status = TournamentStatus::InProgress;
    tournament.started_at = Some(Utc::now());
    tournament.complete_if_decided();
    tournament.touch();
    Ok(())
}
