//! Integration tests for the advancement engine.

use musik_madness::{
    advance, build_bracket, seed, AdvanceOutcome, Bracket, BracketError, InvalidWinnerReason,
    MatchupId, MatchupState, Occupant, Participant, SeedingPolicy,
};

/// Ranked bracket over participants with ids "a", "b", "c", ... in seed order.
fn bracket_of(n: usize) -> Bracket {
    let field: Vec<_> = (0..n)
        .map(|i| {
            let id = ((b'a' + i as u8) as char).to_string();
            Participant::new(id.clone(), id.to_uppercase())
        })
        .collect();
    build_bracket(seed(&field, SeedingPolicy::Ranked).unwrap()).unwrap()
}

fn id(round: u32, index: u32) -> MatchupId {
    MatchupId::new(round, index)
}

#[test]
fn four_player_winners_meet_in_final() {
    // R1M1 = a vs d, R1M2 = b vs c
    let mut bracket = bracket_of(4);
    assert_eq!(
        advance(&mut bracket, id(1, 1), "a").unwrap(),
        AdvanceOutcome::Advanced {
            resolved: vec![id(1, 1)]
        }
    );
    advance(&mut bracket, id(1, 2), "c").unwrap();

    let final_ = bracket.matchup(id(2, 1)).unwrap();
    assert_eq!(final_.player1.occupant.participant().unwrap().id, "a");
    assert_eq!(final_.player2.occupant.participant().unwrap().id, "c");
    assert!(!final_.is_placeholder());
    assert_eq!(final_.state(), MatchupState::Pending);

    assert_eq!(
        advance(&mut bracket, id(2, 1), "c").unwrap(),
        AdvanceOutcome::Completed {
            resolved: vec![id(2, 1)],
            champion: "c".into()
        }
    );
    assert!(bracket.is_complete());
    assert_eq!(bracket.champion().map(String::as_str), Some("c"));
}

#[test]
fn three_player_final_needs_only_one_result() {
    let mut bracket = bracket_of(3);
    advance(&mut bracket, id(1, 2), "b").unwrap();
    let final_ = bracket.matchup(id(2, 1)).unwrap();
    assert_eq!(final_.state(), MatchupState::Pending);
    assert_eq!(
        advance(&mut bracket, id(2, 1), "a").unwrap(),
        AdvanceOutcome::Completed {
            resolved: vec![id(2, 1)],
            champion: "a".into()
        }
    );
}

#[test]
fn advancing_before_feeders_resolve_is_invalid_winner() {
    let mut bracket = bracket_of(4);
    let err = advance(&mut bracket, id(2, 1), "a").unwrap_err();
    assert_eq!(
        err,
        BracketError::InvalidWinner {
            matchup: id(2, 1),
            reason: InvalidWinnerReason::AwaitingEarlierRound,
        }
    );

    // One feeder resolved is still not enough.
    advance(&mut bracket, id(1, 1), "a").unwrap();
    assert!(matches!(
        advance(&mut bracket, id(2, 1), "a"),
        Err(BracketError::InvalidWinner {
            reason: InvalidWinnerReason::AwaitingEarlierRound,
            ..
        })
    ));
}

#[test]
fn foreign_winner_is_invalid_winner() {
    let mut bracket = bracket_of(4);
    let before = bracket.clone();
    assert_eq!(
        advance(&mut bracket, id(1, 1), "b").unwrap_err(),
        BracketError::InvalidWinner {
            matchup: id(1, 1),
            reason: InvalidWinnerReason::NotAnOccupant("b".into()),
        }
    );
    assert_eq!(bracket, before);
}

#[test]
fn unknown_matchup_is_invalid_matchup() {
    let mut bracket = bracket_of(4);
    for missing in [id(1, 3), id(3, 1), id(0, 1), id(2, 0)] {
        assert_eq!(
            advance(&mut bracket, missing, "a").unwrap_err(),
            BracketError::InvalidMatchup(missing.to_string())
        );
    }
}

#[test]
fn same_winner_twice_is_a_no_op() {
    let mut bracket = bracket_of(4);
    advance(&mut bracket, id(1, 1), "a").unwrap();
    let after_first = bracket.clone();
    assert_eq!(
        advance(&mut bracket, id(1, 1), "a").unwrap(),
        AdvanceOutcome::Unchanged
    );
    assert_eq!(bracket, after_first);
}

#[test]
fn different_winner_after_resolution_conflicts() {
    let mut bracket = bracket_of(4);
    advance(&mut bracket, id(1, 1), "a").unwrap();
    let after_first = bracket.clone();
    assert_eq!(
        advance(&mut bracket, id(1, 1), "d").unwrap_err(),
        BracketError::MatchupAlreadyResolved {
            matchup: id(1, 1),
            winner: "a".into(),
        }
    );
    assert_eq!(bracket, after_first);
}

#[test]
fn bye_matchups_accept_their_winner_again_but_nobody_else() {
    let mut bracket = bracket_of(5);
    // R1M1 = a vs BYE, resolved at build time.
    assert_eq!(
        advance(&mut bracket, id(1, 1), "a").unwrap(),
        AdvanceOutcome::Unchanged
    );
    assert!(matches!(
        advance(&mut bracket, id(1, 1), "e"),
        Err(BracketError::InvalidWinner { .. })
    ));
}

#[test]
fn advancing_touches_only_the_next_matchup() {
    let mut bracket = bracket_of(8);
    let before = bracket.clone();
    advance(&mut bracket, id(1, 3), "b").unwrap();
    let changed: Vec<_> = bracket
        .matchups()
        .iter()
        .zip(before.matchups())
        .filter(|(after, before)| after != before)
        .map(|(after, _)| after.id)
        .collect();
    assert_eq!(changed, vec![id(1, 3), id(2, 2)]);
    assert_eq!(
        bracket.matchup(id(2, 2)).unwrap().player1.occupant,
        Occupant::Known(Participant::new("b", "B"))
    );
}
