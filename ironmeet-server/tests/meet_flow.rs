//! End-to-end meet flow tests against an in-memory database

use chrono::NaiveDate;
use ironmeet_common::config::VerdictPolicy;
use ironmeet_common::events::MeetEvent;
use ironmeet_common::models::{AttemptStatus, Gender, LiftType, NewLifter, Vote};
use ironmeet_server::api::auth::JudgeRoster;
use ironmeet_server::meet::{registration, MeetController};
use ironmeet_server::sse::EventBroadcaster;
use ironmeet_server::{db, Error};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

async fn setup() -> (SqlitePool, EventBroadcaster, MeetController) {
    let options = SqliteConnectOptions::new()
        .in_memory(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    db::init::initialize_database(&pool).await.unwrap();

    let broadcaster = EventBroadcaster::new(64);
    let controller = MeetController::new(
        pool.clone(),
        broadcaster.clone(),
        VerdictPolicy::WaitForThree,
    );
    (pool, broadcaster, controller)
}

fn lifter_a() -> NewLifter {
    NewLifter {
        lifter_number: "A-100".to_string(),
        name: "Anna".to_string(),
        gender: Gender::Female,
        bodyweight: 68.0,
        birth_date: NaiveDate::from_ymd_opt(1998, 3, 20).unwrap(),
        opener_squat: Some(100.0),
        opener_bench: None,
        opener_deadlift: None,
    }
}

#[tokio::test]
async fn test_registration_classifies_and_generates_attempts() {
    let (pool, broadcaster, _controller) = setup().await;

    let lifter = registration::register_lifter(&pool, &broadcaster, lifter_a())
        .await
        .unwrap();

    // 68.0kg female lands in the seeded (63.01, 69] class
    let expected_class: i64 =
        sqlx::query_scalar("SELECT id FROM weight_classes WHERE name = 'Women''s 69kg'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(lifter.weight_class_id, Some(expected_class));
    assert!(lifter.age_class_id.is_some());

    // Only the squat opener was declared: three pending attempts 100/105/110
    let attempts = db::attempts::list_attempts_for_lifter(&pool, lifter.id)
        .await
        .unwrap();
    assert_eq!(attempts.len(), 3);
    let weights: Vec<f64> = attempts.iter().map(|a| a.weight).collect();
    assert_eq!(weights, vec![100.0, 105.0, 110.0]);
    assert!(attempts.iter().all(|a| a.status == AttemptStatus::Pending));
    assert!(attempts.iter().all(|a| a.lift == LiftType::Squat));
    assert!(attempts.iter().all(|a| a.verdict == Vote::Unset));
}

#[tokio::test]
async fn test_queue_orders_by_weight_then_bodyweight() {
    let (pool, broadcaster, controller) = setup().await;

    // Berit opens heavier, so Anna's opener comes up first
    let anna = registration::register_lifter(&pool, &broadcaster, lifter_a())
        .await
        .unwrap();
    let mut heavier = lifter_a();
    heavier.lifter_number = "B-200".to_string();
    heavier.name = "Berit".to_string();
    heavier.opener_squat = Some(110.0);
    let berit = registration::register_lifter(&pool, &broadcaster, heavier)
        .await
        .unwrap();

    // Deterministic: repeated peeks return the same attempt
    let first = controller.peek_next().await.unwrap().unwrap();
    let second = controller.peek_next().await.unwrap().unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(first.lifter_id, anna.id);

    // Activating removes it from the queue; the next pick differs
    let active = controller.activate(None).await.unwrap().unwrap();
    assert_eq!(active.id, first.id);
    let next = controller.peek_next().await.unwrap().unwrap();
    assert_eq!(next.lifter_id, berit.id);
}

#[tokio::test]
async fn test_equal_bar_weight_breaks_tie_on_bodyweight() {
    let (pool, broadcaster, controller) = setup().await;

    let mut heavy = lifter_a();
    heavy.bodyweight = 75.0;
    let heavy = registration::register_lifter(&pool, &broadcaster, heavy)
        .await
        .unwrap();

    let mut light = lifter_a();
    light.lifter_number = "B-200".to_string();
    light.bodyweight = 60.0;
    let light = registration::register_lifter(&pool, &broadcaster, light)
        .await
        .unwrap();

    // Same bar weight: the lighter lifter goes first despite registering later
    let first = controller.peek_next().await.unwrap().unwrap();
    assert_eq!(first.lifter_id, light.id);
    assert_ne!(first.lifter_id, heavy.id);
}

#[tokio::test]
async fn test_vote_quorum_and_implicit_completion() {
    let (pool, broadcaster, controller) = setup().await;
    registration::register_lifter(&pool, &broadcaster, lifter_a())
        .await
        .unwrap();

    let active = controller.activate(None).await.unwrap().unwrap();

    // Two votes are not a quorum under the strict policy
    let after_one = controller
        .submit_vote(active.id, 3, Vote::Fail)
        .await
        .unwrap();
    assert_eq!(after_one.verdict, Vote::Unset);
    assert_eq!(after_one.status, AttemptStatus::Active);

    let after_two = controller
        .submit_vote(active.id, 1, Vote::Pass)
        .await
        .unwrap();
    assert_eq!(after_two.verdict, Vote::Unset);

    // Third vote finalizes: 2-of-3 pass, attempt completes, platform clears
    let after_three = controller
        .submit_vote(active.id, 2, Vote::Pass)
        .await
        .unwrap();
    assert_eq!(after_three.verdict, Vote::Pass);
    assert_eq!(after_three.status, AttemptStatus::Completed);

    let cursor = controller.cursor().await.unwrap();
    assert_eq!(cursor.active_attempt_id, None);

    // Completed attempts reject further votes
    let err = controller.submit_vote(active.id, 1, Vote::Fail).await;
    assert!(matches!(err, Err(Error::NotActive(_))));
}

#[tokio::test]
async fn test_two_fails_make_no_lift() {
    let (pool, broadcaster, controller) = setup().await;
    registration::register_lifter(&pool, &broadcaster, lifter_a())
        .await
        .unwrap();

    let active = controller.activate(None).await.unwrap().unwrap();
    controller.submit_vote(active.id, 1, Vote::Fail).await.unwrap();
    controller.submit_vote(active.id, 2, Vote::Pass).await.unwrap();
    let done = controller
        .submit_vote(active.id, 3, Vote::Fail)
        .await
        .unwrap();
    assert_eq!(done.verdict, Vote::Fail);
    assert_eq!(done.status, AttemptStatus::Completed);
}

#[tokio::test]
async fn test_judges_may_correct_before_quorum() {
    let (pool, broadcaster, controller) = setup().await;
    registration::register_lifter(&pool, &broadcaster, lifter_a())
        .await
        .unwrap();

    let active = controller.activate(None).await.unwrap().unwrap();
    controller.submit_vote(active.id, 1, Vote::Fail).await.unwrap();
    // Judge 1 corrects themselves before the other slots fill
    controller.submit_vote(active.id, 1, Vote::Pass).await.unwrap();
    controller.submit_vote(active.id, 2, Vote::Pass).await.unwrap();
    let done = controller
        .submit_vote(active.id, 3, Vote::Fail)
        .await
        .unwrap();
    assert_eq!(done.verdict, Vote::Pass);
}

#[tokio::test]
async fn test_invalid_judge_slot_rejected() {
    let (pool, broadcaster, controller) = setup().await;
    registration::register_lifter(&pool, &broadcaster, lifter_a())
        .await
        .unwrap();
    let active = controller.activate(None).await.unwrap().unwrap();

    let err = controller.submit_vote(active.id, 4, Vote::Pass).await;
    assert!(matches!(err, Err(Error::InvalidJudge(4))));
    let err = controller.submit_vote(active.id, 0, Vote::Pass).await;
    assert!(matches!(err, Err(Error::InvalidJudge(0))));
}

#[tokio::test]
async fn test_advance_stops_at_round_three() {
    let (_pool, _broadcaster, controller) = setup().await;

    let cursor = controller.advance_attempt_number().await.unwrap();
    assert_eq!(cursor.attempt_number, 2);
    let cursor = controller.advance_attempt_number().await.unwrap();
    assert_eq!(cursor.attempt_number, 3);

    let err = controller.advance_attempt_number().await;
    assert!(matches!(err, Err(Error::MaxAttemptReached)));
    assert_eq!(controller.cursor().await.unwrap().attempt_number, 3);
}

#[tokio::test]
async fn test_set_lift_type_resets_round() {
    let (_pool, _broadcaster, controller) = setup().await;

    controller.advance_attempt_number().await.unwrap();
    let cursor = controller.set_lift_type(LiftType::Bench).await.unwrap();
    assert_eq!(cursor.lift, LiftType::Bench);
    assert_eq!(cursor.attempt_number, 1);
    assert!(cursor.is_idle());
}

#[tokio::test]
async fn test_activate_with_empty_queue_broadcasts_null_once() {
    let (_pool, broadcaster, controller) = setup().await;

    // No bench attempts exist
    controller.set_lift_type(LiftType::Bench).await.unwrap();

    let mut rx = broadcaster.subscribe();
    let result = controller.activate(None).await.unwrap();
    assert!(result.is_none());

    let cursor = controller.cursor().await.unwrap();
    assert!(cursor.is_idle());

    let mut null_broadcasts = 0;
    while let Ok(event) = rx.try_recv() {
        if let MeetEvent::ActiveAttemptChanged { attempt: None, .. } = event {
            null_broadcasts += 1;
        }
    }
    assert_eq!(null_broadcasts, 1);
}

#[tokio::test]
async fn test_explicit_activation_checks_cursor_match() {
    let (pool, broadcaster, controller) = setup().await;
    let lifter = registration::register_lifter(&pool, &broadcaster, lifter_a())
        .await
        .unwrap();
    let attempts = db::attempts::list_attempts_for_lifter(&pool, lifter.id)
        .await
        .unwrap();
    let round_two = attempts.iter().find(|a| a.number == 2).unwrap();

    // Cursor is at round 1; a round-2 attempt is not eligible
    let err = controller.activate(Some(round_two.id)).await;
    assert!(matches!(err, Err(Error::NotPending(_))));

    let err = controller.activate(Some(99999)).await;
    assert!(matches!(err, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_reactivation_demotes_and_rescores() {
    let (pool, broadcaster, controller) = setup().await;
    let anna = registration::register_lifter(&pool, &broadcaster, lifter_a())
        .await
        .unwrap();
    let mut other = lifter_a();
    other.lifter_number = "B-200".to_string();
    other.opener_squat = Some(110.0);
    let berit = registration::register_lifter(&pool, &broadcaster, other)
        .await
        .unwrap();
    let berit_opener = db::attempts::list_attempts_for_lifter(&pool, berit.id)
        .await
        .unwrap()
        .into_iter()
        .find(|a| a.number == 1)
        .unwrap();

    let first = controller.activate(None).await.unwrap().unwrap();
    assert_eq!(first.lifter_id, anna.id);
    controller.submit_vote(first.id, 1, Vote::Pass).await.unwrap();

    // Organizer switches to the other lifter: first goes back to pending,
    // keeping its vote until it is reactivated
    let second = controller
        .activate(Some(berit_opener.id))
        .await
        .unwrap()
        .unwrap();
    assert_ne!(second.id, first.id);
    let demoted = db::attempts::get_attempt(&pool, first.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(demoted.status, AttemptStatus::Pending);
    assert_eq!(demoted.judge1, Vote::Pass);

    // Reactivation clears the slate for rescoring
    let reactivated = controller.activate(Some(first.id)).await.unwrap().unwrap();
    assert_eq!(reactivated.id, first.id);
    assert_eq!(reactivated.judge1, Vote::Unset);
    assert_eq!(reactivated.status, AttemptStatus::Active);
}

#[tokio::test]
async fn test_deleting_lifter_cascades_attempts() {
    let (pool, broadcaster, _controller) = setup().await;
    let lifter = registration::register_lifter(&pool, &broadcaster, lifter_a())
        .await
        .unwrap();

    registration::remove_lifter(&pool, &broadcaster, lifter.id)
        .await
        .unwrap();

    let attempts = db::attempts::list_attempts(&pool).await.unwrap();
    assert!(attempts.is_empty());

    let err = registration::remove_lifter(&pool, &broadcaster, lifter.id).await;
    assert!(matches!(err, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_judge_roster_resolves_default_pins() {
    // Explicit (empty) config file and CLI values keep the test independent
    // of the host environment
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = 5790").unwrap();
    let config = ironmeet_common::config::Config::load(
        Some(5790),
        Some(PathBuf::from("/tmp/meet.db")),
        Some(file.path().to_path_buf()),
    )
    .unwrap();
    let roster = JudgeRoster::from_config(&config);
    assert_eq!(roster.slot_for_pin("1111"), Some(1));
    assert_eq!(roster.slot_for_pin("2222"), Some(2));
    assert_eq!(roster.slot_for_pin("3333"), Some(3));
    assert_eq!(roster.slot_for_pin("4444"), None);
}

#[tokio::test]
async fn test_concurrent_votes_on_distinct_slots_both_land() {
    let (pool, broadcaster, controller) = setup().await;
    registration::register_lifter(&pool, &broadcaster, lifter_a())
        .await
        .unwrap();
    let active = controller.activate(None).await.unwrap().unwrap();

    // Two judges vote at the same time on different slots; neither write
    // may clobber the other
    let controller = Arc::new(controller);
    let id = active.id;
    let c1 = Arc::clone(&controller);
    let c2 = Arc::clone(&controller);
    let t1 = tokio::spawn(async move { c1.submit_vote(id, 1, Vote::Pass).await });
    let t2 = tokio::spawn(async move { c2.submit_vote(id, 2, Vote::Fail).await });
    t1.await.unwrap().unwrap();
    t2.await.unwrap().unwrap();

    let attempt = db::attempts::get_attempt(&pool, id).await.unwrap().unwrap();
    assert_eq!(attempt.judge1, Vote::Pass);
    assert_eq!(attempt.judge2, Vote::Fail);
    assert_eq!(attempt.judge3, Vote::Unset);
    // Two votes are no quorum under the strict policy
    assert_eq!(attempt.status, AttemptStatus::Active);
    assert_eq!(attempt.verdict, Vote::Unset);
}

#[tokio::test]
async fn test_activation_claim_has_single_winner() {
    let (pool, broadcaster, _controller) = setup().await;
    let lifter = registration::register_lifter(&pool, &broadcaster, lifter_a())
        .await
        .unwrap();
    let opener = db::attempts::list_attempts_for_lifter(&pool, lifter.id)
        .await
        .unwrap()
        .into_iter()
        .find(|a| a.number == 1)
        .unwrap();

    // The status guard makes claiming a check-and-set: first caller wins,
    // second sees the attempt is no longer pending
    assert!(db::attempts::claim_for_activation(&pool, opener.id)
        .await
        .unwrap());
    assert!(!db::attempts::claim_for_activation(&pool, opener.id)
        .await
        .unwrap());

    let claimed = db::attempts::get_attempt(&pool, opener.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(claimed.status, AttemptStatus::Active);
}
