//! Bracket builder: seeded slots to a full single-elimination bracket.

use crate::logic::advancement::resolve;
use crate::logic::seeding::SeededSlot;
use crate::models::{Bracket, BracketError, Matchup, MatchupId, Occupant};

/// Build every round of the bracket from seeded slots.
///
/// Round 1 pairs slot `2i` with `2i + 1`. Later rounds start as placeholders fed by the
/// previous round. Round-1 BYEs are resolved before returning, cascading forward through
/// any further BYEs. Two BYEs paired together are rejected.
pub fn build_bracket(slots: Vec<SeededSlot>) -> Result<Bracket, BracketError> {
    let size = slots.len();
    if size < 2 || !size.is_power_of_two() {
        return Err(BracketError::InvalidBracketTopology(format!(
            "{size} slots is not a power of two of at least 2"
        )));
    }
    let rounds = size.trailing_zeros();

    let mut matchups = Vec::with_capacity(size - 1);
    let mut slots = slots.into_iter();
    let mut index = 0;
    while let (Some(a), Some(b)) = (slots.next(), slots.next()) {
        index += 1;
        let id = MatchupId::new(1, index);
        if a.is_bye() && b.is_bye() {
            return Err(BracketError::InvalidBracketTopology(format!(
                "{id} pairs two byes"
            )));
        }
        matchups.push(Matchup::new(id, occupant(a), occupant(b)));
    }

    for round in 2..=rounds {
        for index in 1..=(size >> round) as u32 {
            let id = MatchupId::new(round, index);
            if let Some((feeder1, feeder2)) = id.feeders() {
                matchups.push(Matchup::new(
                    id,
                    Occupant::AwaitingMatch(feeder1),
                    Occupant::AwaitingMatch(feeder2),
                ));
            }
        }
    }

    let mut bracket = Bracket::from_parts(size, matchups);
    let byes: Vec<_> = bracket
        .round(1)
        .iter()
        .filter_map(|m| m.bye_winner().map(|side| (m.id, side)))
        .collect();
    for (id, side) in byes {
        resolve(&mut bracket, id, side);
    }
    Ok(bracket)
}

fn occupant(slot: SeededSlot) -> Occupant {
    match slot {
        SeededSlot::Entrant(p) => Occupant::Known(p),
        SeededSlot::Bye => Occupant::Bye,
    }
}
