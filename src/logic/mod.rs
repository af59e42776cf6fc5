//! Bracket business logic: seeding, building, advancing, and the tournament flow around them.

mod advancement;
mod builder;
mod seeding;
mod setup;
mod voting;

pub use advancement::{advance, AdvanceOutcome};
pub use builder::build_bracket;
pub use seeding::{bracket_size, seed, standard_order, SeededSlot};
pub use setup::begin_tournament;
pub use voting::{cast_vote, close_voting, set_matchup_winner, VoteTally};
