//! Seeding: order participants into bracket slots, padding the field with BYEs.

use crate::models::{BracketError, Participant, SeedingPolicy};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashSet;

/// One bracket position before matchups are built.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SeededSlot {
    Entrant(Participant),
    Bye,
}

impl SeededSlot {
    pub fn is_bye(&self) -> bool {
        matches!(self, SeededSlot::Bye)
    }
}

/// Padded field size for `count` participants: the smallest power of two >= count.
pub fn bracket_size(count: usize) -> usize {
    count.next_power_of_two()
}

/// Seed numbers (1-based) in bracket position order for a field of `size`.
///
/// Seed `s` opens against seed `size + 1 - s`, and the top two seeds land in opposite halves.
/// For 8: `[1, 8, 4, 5, 2, 7, 3, 6]`.
pub fn standard_order(size: usize) -> Vec<usize> {
    let mut order = vec![1];
    while order.len() < size {
        let n = order.len() * 2;
        order = order.iter().flat_map(|&s| [s, n + 1 - s]).collect();
    }
    order
}

/// Order `participants` into `bracket_size(len)` slots.
///
/// 1. Reject fewer than 2 participants and duplicate ids.
/// 2. Rank: input order, or a shuffle driven by the policy's RNG seed.
/// 3. Place ranks in standard order; ranks past the field are BYEs.
///
/// BYEs are the lowest seeds and each faces a real participant in round 1.
pub fn seed(
    participants: &[Participant],
    policy: SeedingPolicy,
) -> Result<Vec<SeededSlot>, BracketError> {
    if participants.len() < 2 {
        return Err(BracketError::InsufficientParticipants {
            count: participants.len(),
        });
    }
    let mut seen = HashSet::with_capacity(participants.len());
    for p in participants {
        if !seen.insert(p.id.as_str()) {
            return Err(BracketError::DuplicateParticipant(p.id.clone()));
        }
    }

    let mut ranked = participants.to_vec();
    if let SeedingPolicy::Random { seed } = policy {
        ranked.shuffle(&mut StdRng::seed_from_u64(seed));
    }

    let slots = standard_order(bracket_size(ranked.len()))
        .into_iter()
        .map(|rank| {
            ranked
                .get(rank - 1)
                .cloned()
                .map_or(SeededSlot::Bye, SeededSlot::Entrant)
        })
        .collect();
    Ok(slots)
}
