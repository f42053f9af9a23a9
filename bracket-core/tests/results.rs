mod common;

use bracket_core::bracket::{
    AdvanceError, BuilderOptions, ByePolicy, MatchResult, MatchSlot, plan_ordered,
};
use bracket_core::events::{BracketEvent, DEFAULT_CHANNEL_BUFFER, EventSink, bracket_event_channel};
use bracket_core::store::{CreateBracket, CreatedBracket, MemoryProcessor};
use bracket_core::{BracketError, BracketService, ErrorKind};
use bracket_sdk::objects::MatchStatus;
use common::{FakeParticipants, RecordingSink, TestService, players, service};
use kanau::processor::Processor;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Persist a bracket with round 1 seeded in exactly the given order.
async fn seeded(
    order: &[Uuid],
    options: BuilderOptions,
) -> (TestService, MemoryProcessor, RecordingSink, CreatedBracket) {
    let store = MemoryProcessor::new();
    let plan = plan_ordered(Uuid::new_v4(), order, options).unwrap();
    let created = <MemoryProcessor as Processor<CreateBracket>>::process(&store, CreateBracket { plan })
        .await
        .unwrap();
    let sink = RecordingSink::default();
    let svc = service(store.clone(), FakeParticipants::default(), sink.clone(), options);
    (svc, store, sink, created)
}

fn id_of(created: &CreatedBracket, round: u32, match_number: u32) -> Uuid {
    created.ids.get(MatchSlot::new(round, match_number)).unwrap()
}

fn win(winner_id: Uuid, score_a: u32, score_b: u32) -> MatchResult {
    MatchResult {
        score_a,
        score_b,
        winner_id,
    }
}

#[tokio::test]
async fn test_four_player_bracket_runs_to_completion() {
    let [p1, p2, p3, p4] = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
    let (svc, _store, sink, created) = seeded(&[p3, p1, p4, p2], BuilderOptions::default()).await;
    let (m1, m2, fin) = (id_of(&created, 1, 1), id_of(&created, 1, 2), id_of(&created, 2, 1));

    let first = svc.get_match(m1).await.unwrap();
    assert_eq!((first.player1_id, first.player2_id), (Some(p3), Some(p1)));
    let second = svc.get_match(m2).await.unwrap();
    assert_eq!((second.player1_id, second.player2_id), (Some(p4), Some(p2)));

    let updated = svc.update_match_result(m1, win(p1, 2, 1)).await.unwrap();
    assert_eq!(updated.status, MatchStatus::Completed);
    assert_eq!(updated.winner_id, Some(p1));
    assert_eq!((updated.score_a, updated.score_b), (Some(2), Some(1)));

    let final_match = svc.get_match(fin).await.unwrap();
    assert_eq!((final_match.player1_id, final_match.player2_id), (Some(p1), None));
    assert_eq!(final_match.status, MatchStatus::Scheduled);

    svc.update_match_result(m2, win(p2, 0, 3)).await.unwrap();
    let final_match = svc.get_match(fin).await.unwrap();
    assert_eq!((final_match.player1_id, final_match.player2_id), (Some(p1), Some(p2)));

    let before = svc.get_bracket(created.tournament_id).await.unwrap();
    let champion = svc.update_match_result(fin, win(p1, 3, 2)).await.unwrap();
    assert_eq!(champion.winner_id, Some(p1));
    assert!(champion.next_match_id.is_none());

    let after = svc.get_bracket(created.tournament_id).await.unwrap();
    for (old, new) in before.matches.iter().zip(&after.matches).skip(1) {
        assert_eq!(old, new);
    }
    assert!(after.matches.iter().all(|m| m.status == MatchStatus::Completed));

    let published = sink.published();
    assert_eq!(published.len(), 3);
    assert!(matches!(
        published[0],
        BracketEvent::MatchCompleted { match_id, next_match_id: Some(next), .. }
            if match_id == m1 && next == fin
    ));
    assert!(matches!(
        published[2],
        BracketEvent::MatchCompleted { next_match_id: None, winner_id, .. } if winner_id == p1
    ));
}

#[tokio::test]
async fn test_winner_fills_slot_by_parity() {
    let ids = players(8);
    let (svc, _store, _sink, created) = seeded(&ids, BuilderOptions::default()).await;

    svc.update_match_result(id_of(&created, 1, 3), win(ids[5], 1, 4))
        .await
        .unwrap();
    svc.update_match_result(id_of(&created, 1, 4), win(ids[6], 2, 0))
        .await
        .unwrap();

    let target = svc.get_match(id_of(&created, 2, 2)).await.unwrap();
    assert_eq!(target.player1_id, Some(ids[5]));
    assert_eq!(target.player2_id, Some(ids[6]));
    assert_eq!(target.status, MatchStatus::Scheduled);
    assert!(svc.get_match(id_of(&created, 2, 1)).await.unwrap().player1_id.is_none());
}

#[tokio::test]
async fn test_winner_must_be_a_player() {
    let ids = players(4);
    let (svc, store, sink, created) = seeded(&ids, BuilderOptions::default()).await;
    let before = store.snapshot().unwrap();

    let err = svc
        .update_match_result(id_of(&created, 1, 1), win(ids[2], 1, 0))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BracketError::ResultRejected(AdvanceError::WinnerNotInMatch { .. })
    ));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(store.snapshot().unwrap(), before);
    assert!(sink.published().is_empty());
}

#[tokio::test]
async fn test_completed_match_is_terminal() {
    let ids = players(4);
    let (svc, store, _sink, created) = seeded(&ids, BuilderOptions::default()).await;
    let m1 = id_of(&created, 1, 1);

    svc.update_match_result(m1, win(ids[0], 2, 0)).await.unwrap();
    let before = store.snapshot().unwrap();

    let err = svc.update_match_result(m1, win(ids[1], 0, 2)).await.unwrap_err();
    assert!(matches!(
        err,
        BracketError::ResultRejected(AdvanceError::AlreadyCompleted(id)) if id == m1
    ));
    assert_eq!(store.snapshot().unwrap(), before);
}

#[tokio::test]
async fn test_unknown_match_is_not_found() {
    let (svc, _store, _sink, _created) = seeded(&players(2), BuilderOptions::default()).await;
    let missing = Uuid::new_v4();

    let err = svc
        .update_match_result(missing, win(Uuid::new_v4(), 1, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, BracketError::MatchNotFound(id) if id == missing));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(svc.get_match(missing).await.unwrap_err().kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_failed_advancement_rolls_back_result() {
    let ids = players(4);
    let (_svc, store, _sink, created) = seeded(&ids, BuilderOptions::default()).await;
    let before = store.snapshot().unwrap();

    let failing = service(
        store.failing_after(1),
        FakeParticipants::default(),
        RecordingSink::default(),
        BuilderOptions::default(),
    );
    let err = failing
        .update_match_result(id_of(&created, 1, 1), win(ids[0], 1, 0))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Persistence);
    assert_eq!(store.snapshot().unwrap(), before);
}

#[tokio::test]
async fn test_three_players_faithful_bye_is_not_advanced() {
    let [a, b, c] = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
    let (svc, _store, _sink, created) = seeded(&[a, b, c], BuilderOptions::default()).await;
    assert_eq!(created.rounds, 2);

    let bye = svc.get_match(id_of(&created, 1, 2)).await.unwrap();
    assert_eq!((bye.player1_id, bye.player2_id), (Some(c), None));
    assert_eq!(bye.status, MatchStatus::Completed);

    svc.update_match_result(id_of(&created, 1, 1), win(b, 0, 1))
        .await
        .unwrap();
    let final_match = svc.get_match(id_of(&created, 2, 1)).await.unwrap();
    assert_eq!((final_match.player1_id, final_match.player2_id), (Some(b), None));

    let err = svc
        .update_match_result(id_of(&created, 1, 2), win(c, 1, 0))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BracketError::ResultRejected(AdvanceError::AlreadyCompleted(_))
    ));
}

#[tokio::test]
async fn test_three_players_advance_policy_completes() {
    let [a, b, c] = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
    let options = BuilderOptions {
        bye_policy: ByePolicy::Advance,
    };
    let (svc, _store, _sink, created) = seeded(&[a, b, c], options).await;

    let fin = id_of(&created, 2, 1);
    assert_eq!(svc.get_match(fin).await.unwrap().player2_id, Some(c));

    svc.update_match_result(id_of(&created, 1, 1), win(a, 3, 0))
        .await
        .unwrap();
    let champion = svc.update_match_result(fin, win(c, 1, 2)).await.unwrap();
    assert_eq!(champion.winner_id, Some(c));
    assert_eq!(champion.status, MatchStatus::Completed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_results_apply_once() {
    let ids = players(4);
    let (svc, store, sink, created) = seeded(&ids, BuilderOptions::default()).await;
    let (m1, fin) = (id_of(&created, 1, 1), id_of(&created, 2, 1));
    let svc = Arc::new(svc);

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let svc = svc.clone();
            let winner = ids[i % 2];
            tokio::spawn(async move { svc.update_match_result(m1, win(winner, 1, 0)).await })
        })
        .collect();

    let mut applied = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => applied += 1,
            Err(BracketError::ResultRejected(AdvanceError::AlreadyCompleted(id))) => assert_eq!(id, m1),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(applied, 1);

    let rows = store.snapshot().unwrap();
    let stored = rows.iter().find(|m| m.id == m1).unwrap();
    let final_match = rows.iter().find(|m| m.id == fin).unwrap();
    assert!(stored.winner_id.is_some());
    assert_eq!(final_match.player1_id, stored.winner_id);
    assert_eq!(final_match.player2_id, None);
    assert_eq!(sink.published().len(), 1);
}

#[tokio::test]
async fn test_full_event_channel_does_not_stall_results() {
    let ids = players(4);
    let store = MemoryProcessor::new();
    let plan = plan_ordered(Uuid::new_v4(), &ids, BuilderOptions::default()).unwrap();
    let created = <MemoryProcessor as Processor<CreateBracket>>::process(&store, CreateBracket { plan })
        .await
        .unwrap();
    let m1 = id_of(&created, 1, 1);

    let (tx, _rx) = bracket_event_channel();
    for _ in 0..DEFAULT_CHANNEL_BUFFER {
        tx.publish(BracketEvent::BracketGenerated {
            tournament_id: created.tournament_id,
            rounds: created.rounds,
            matches: 3,
        })
        .await
        .unwrap();
    }
    let svc = BracketService::with_options(
        store.clone(),
        FakeParticipants::default(),
        tx,
        BuilderOptions::default(),
        Some(42),
    );

    let updated = tokio::time::timeout(Duration::from_secs(2), svc.update_match_result(m1, win(ids[0], 1, 0)))
        .await
        .expect("result write waited on the event consumer")
        .unwrap();
    assert_eq!(updated.winner_id, Some(ids[0]));

    let rows = store.snapshot().unwrap();
    assert_eq!(rows.iter().find(|m| m.id == m1).unwrap().winner_id, Some(ids[0]));
}
