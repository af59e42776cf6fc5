//! Integration tests for the tournament lifecycle: joining, beginning, voting, and results.

use musik_madness::{
    begin_tournament, cast_vote, close_voting, set_matchup_winner, AdvanceOutcome, BracketError,
    InvalidWinnerReason, MatchupId, Participant, SeedingPolicy, Tournament, TournamentError,
    TournamentStatus, VoteTally,
};

const ORGANIZER: &str = "org";

fn open_tournament(n: usize) -> Tournament {
    let mut t = Tournament::new("Spring Showdown", ORGANIZER, SeedingPolicy::Ranked);
    for i in 0..n {
        t.join(Participant::new(format!("u{i}"), format!("Track {i}")))
            .unwrap();
    }
    t
}

fn id(round: u32, index: u32) -> MatchupId {
    MatchupId::new(round, index)
}

#[test]
fn join_trims_and_rejects_duplicates_and_blank_names() {
    let mut t = open_tournament(0);
    t.join(Participant::new("u0", "  DJ Ana  ")).unwrap();
    assert_eq!(t.participants[0].display_name, "DJ Ana");
    assert_eq!(
        t.join(Participant::new("u0", "Again")),
        Err(TournamentError::AlreadyJoined("u0".into()))
    );
    assert_eq!(
        t.join(Participant::new("u1", "   ")),
        Err(TournamentError::EmptyDisplayName)
    );
}

#[test]
fn join_respects_capacity() {
    let mut t = Tournament::new("Tiny", ORGANIZER, SeedingPolicy::Ranked).with_capacity(2);
    t.join(Participant::new("u0", "A")).unwrap();
    t.join(Participant::new("u1", "B")).unwrap();
    assert_eq!(
        t.join(Participant::new("u2", "C")),
        Err(TournamentError::TournamentFull { capacity: 2 })
    );
}

#[test]
fn leave_removes_participant_while_open() {
    let mut t = open_tournament(3);
    t.leave("u1").unwrap();
    assert_eq!(t.participants.len(), 2);
    assert_eq!(
        t.leave("u1"),
        Err(TournamentError::ParticipantNotFound("u1".into()))
    );
}

#[test]
fn begin_requires_organizer_and_two_participants() {
    let mut t = open_tournament(1);
    assert_eq!(
        begin_tournament(&mut t, "someone-else"),
        Err(TournamentError::NotOrganizer)
    );
    assert_eq!(
        begin_tournament(&mut t, ORGANIZER),
        Err(TournamentError::Bracket(
            BracketError::InsufficientParticipants { count: 1 }
        ))
    );
    assert_eq!(t.status, TournamentStatus::Open);
    assert!(t.bracket.is_none());
}

#[test]
fn begin_builds_once_and_locks_the_field() {
    let mut t = open_tournament(5);
    let version = t.version;
    begin_tournament(&mut t, ORGANIZER).unwrap();
    assert_eq!(t.status, TournamentStatus::InProgress);
    assert!(t.started_at.is_some());
    assert!(t.version > version);
    assert_eq!(t.bracket.as_ref().unwrap().size(), 8);

    assert_eq!(
        begin_tournament(&mut t, ORGANIZER),
        Err(TournamentError::InvalidState(TournamentStatus::InProgress))
    );
    assert_eq!(
        t.join(Participant::new("late", "Latecomer")),
        Err(TournamentError::InvalidState(TournamentStatus::InProgress))
    );
    assert_eq!(
        t.leave("u0"),
        Err(TournamentError::InvalidState(TournamentStatus::InProgress))
    );
}

#[test]
fn votes_tally_and_move() {
    let mut t = open_tournament(4);
    begin_tournament(&mut t, ORGANIZER).unwrap();
    // R1M1 = u0 vs u3
    cast_vote(&mut t, id(1, 1), "fan1", "u0").unwrap();
    cast_vote(&mut t, id(1, 1), "fan2", "u3").unwrap();
    let tally = cast_vote(&mut t, id(1, 1), "fan3", "u3").unwrap();
    assert_eq!(
        tally,
        VoteTally {
            player1: 1,
            player2: 2
        }
    );
    // fan2 changes their mind
    let tally = cast_vote(&mut t, id(1, 1), "fan2", "u0").unwrap();
    assert_eq!(
        tally,
        VoteTally {
            player1: 2,
            player2: 1
        }
    );
    let m = t.bracket.as_ref().unwrap().matchup(id(1, 1)).unwrap();
    assert_eq!((m.player1.score, m.player2.score), (2, 1));
}

#[test]
fn votes_rejected_for_outsiders_and_unready_matchups() {
    let mut t = open_tournament(4);
    assert_eq!(
        cast_vote(&mut t, id(1, 1), "fan", "u0"),
        Err(TournamentError::InvalidState(TournamentStatus::Open))
    );
    begin_tournament(&mut t, ORGANIZER).unwrap();
    assert_eq!(
        cast_vote(&mut t, id(1, 1), "fan", "u1"),
        Err(TournamentError::Bracket(BracketError::InvalidWinner {
            matchup: id(1, 1),
            reason: InvalidWinnerReason::NotAnOccupant("u1".into()),
        }))
    );
    assert_eq!(
        cast_vote(&mut t, id(2, 1), "fan", "u0"),
        Err(TournamentError::Bracket(BracketError::InvalidWinner {
            matchup: id(2, 1),
            reason: InvalidWinnerReason::AwaitingEarlierRound,
        }))
    );
    assert_eq!(
        cast_vote(&mut t, id(4, 1), "fan", "u0"),
        Err(TournamentError::Bracket(BracketError::InvalidMatchup(
            "R4M1".into()
        )))
    );
}

#[test]
fn close_voting_advances_leader_and_refuses_ties() {
    let mut t = open_tournament(4);
    begin_tournament(&mut t, ORGANIZER).unwrap();
    assert_eq!(
        close_voting(&mut t, ORGANIZER, id(1, 1)),
        Err(TournamentError::TiedVote {
            matchup: id(1, 1),
            votes: 0
        })
    );
    cast_vote(&mut t, id(1, 1), "fan", "u3").unwrap();
    assert_eq!(
        close_voting(&mut t, "fan", id(1, 1)),
        Err(TournamentError::NotOrganizer)
    );
    assert_eq!(
        close_voting(&mut t, ORGANIZER, id(1, 1)).unwrap(),
        AdvanceOutcome::Advanced {
            resolved: vec![id(1, 1)]
        }
    );
    assert_eq!(
        cast_vote(&mut t, id(1, 1), "fan2", "u0"),
        Err(TournamentError::VotingClosed(id(1, 1)))
    );
    let final_ = t.bracket.as_ref().unwrap().matchup(id(2, 1)).unwrap();
    assert_eq!(final_.player1.occupant.participant().unwrap().id, "u3");
}

#[test]
fn resolving_final_completes_tournament() {
    let mut t = open_tournament(4);
    begin_tournament(&mut t, ORGANIZER).unwrap();
    set_matchup_winner(&mut t, ORGANIZER, id(1, 1), "u0").unwrap();
    set_matchup_winner(&mut t, ORGANIZER, id(1, 2), "u2").unwrap();
    assert_eq!(t.status, TournamentStatus::InProgress);

    let outcome = set_matchup_winner(&mut t, ORGANIZER, id(2, 1), "u2").unwrap();
    assert_eq!(
        outcome,
        AdvanceOutcome::Completed {
            resolved: vec![id(2, 1)],
            champion: "u2".into()
        }
    );
    assert_eq!(t.status, TournamentStatus::Completed);
    assert_eq!(t.champion.as_deref(), Some("u2"));
    assert!(t.completed_at.is_some());

    // Resubmitting is harmless; changing the result is not allowed.
    let version = t.version;
    assert_eq!(
        set_matchup_winner(&mut t, ORGANIZER, id(2, 1), "u2").unwrap(),
        AdvanceOutcome::Unchanged
    );
    assert_eq!(t.version, version);
    assert!(matches!(
        set_matchup_winner(&mut t, ORGANIZER, id(2, 1), "u0"),
        Err(TournamentError::Bracket(
            BracketError::MatchupAlreadyResolved { .. }
        ))
    ));
}

#[test]
fn override_requires_begun_tournament() {
    let mut t = open_tournament(4);
    assert_eq!(
        set_matchup_winner(&mut t, ORGANIZER, id(1, 1), "u0"),
        Err(TournamentError::InvalidState(TournamentStatus::Open))
    );
}

#[test]
fn version_check_detects_stale_writes() {
    let mut t = open_tournament(2);
    let seen = t.version;
    t.check_version(Some(seen)).unwrap();
    t.check_version(None).unwrap();
    begin_tournament(&mut t, ORGANIZER).unwrap();
    assert_eq!(
        t.check_version(Some(seen)),
        Err(TournamentError::VersionConflict {
            expected: seen,
            actual: t.version
        })
    );
}

#[test]
fn random_seeding_same_seed_same_bracket() {
    let build = || {
        let mut t = Tournament::new("Shuffle", ORGANIZER, SeedingPolicy::Random { seed: 7 });
        for i in 0..6 {
            t.join(Participant::new(format!("u{i}"), format!("Track {i}")))
                .unwrap();
        }
        begin_tournament(&mut t, ORGANIZER).unwrap();
        t.bracket.unwrap()
    };
    assert_eq!(build(), build());
}
