use ronda::core::calculator::window::{last_window_end, occurrence_dates, window_for};
use ronda::core::checkpoint::{CheckpointLogic, NewCheckpoint};
use ronda::core::engine::FineEngine;
use ronda::core::ledger::{AuditLedgerBridge, FineLedger, LedgerBridge};
use ronda::core::policy::PolicyLogic;
use ronda::core::roster::RosterLogic;
use ronda::core::shift::{NewShift, ShiftLogic};
use ronda::db::fines::FineFilter;
use ronda::errors::{AppError, AppResult};
use ronda::models::fine::{Fine, FineStatus};
use ronda::models::fine_policy::DEFAULT_TOLERANCE_MINUTES;
use ronda::models::participant::ParticipantStatus;
use ronda::models::shift::ShiftStatus;
use ronda::models::violation_kind::ViolationKind;
use rusqlite::Connection;

mod common;
use common::*;

#[test]
fn test_overnight_shift_windows() {
    let mut pool = open_pool("reg_overnight");
    let shift = seed_shift(&mut pool, "2026-03-10", "2026-03-12", "22:00", "04:00", None);

    assert!(shift.is_overnight());
    assert_eq!(
        occurrence_dates(&shift),
        vec![date("2026-03-10"), date("2026-03-11")]
    );

    let w = window_for(&shift, date("2026-03-11"));
    assert_eq!(w.start, ts("2026-03-11T22:00"));
    assert_eq!(w.end, ts("2026-03-12T04:00"));
    assert_eq!(last_window_end(&shift), ts("2026-03-12T04:00"));
}

#[test]
fn test_day_shift_occurrences_include_end_date() {
    let mut pool = open_pool("reg_day_shift");
    let shift = seed_shift(&mut pool, "2026-03-10", "2026-03-11", "18:00", "21:00", None);

    assert!(!shift.is_overnight());
    assert_eq!(occurrence_dates(&shift).len(), 2);
    assert_eq!(last_window_end(&shift), ts("2026-03-11T21:00"));
}

#[test]
fn test_shift_validation() {
    let mut pool = open_pool("reg_shift_validation");

    let base = NewShift {
        label: "Night round".to_string(),
        start_date: date("2026-03-10"),
        end_date: date("2026-03-10"),
        start_time: hm("22:00"),
        end_time: hm("04:00"),
        checkpoint_id: None,
    };

    // overnight window cannot end on its start date
    let err = ShiftLogic::create(&mut pool, NB, base.clone()).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let blank = NewShift {
        label: "   ".to_string(),
        end_date: date("2026-03-11"),
        ..base.clone()
    };
    assert!(matches!(
        ShiftLogic::create(&mut pool, NB, blank).unwrap_err(),
        AppError::Validation(_)
    ));

    let missing_cp = NewShift {
        end_date: date("2026-03-11"),
        checkpoint_id: Some(77),
        ..base
    };
    assert!(matches!(
        ShiftLogic::create(&mut pool, NB, missing_cp).unwrap_err(),
        AppError::CheckpointNotFound(77)
    ));
}

#[test]
fn test_cancel_and_list_by_status() {
    let mut pool = open_pool("reg_cancel");
    let a = seed_shift(&mut pool, "2026-03-10", "2026-03-11", "22:00", "04:00", None);
    let b = seed_shift(&mut pool, "2026-03-11", "2026-03-12", "22:00", "04:00", None);

    ShiftLogic::cancel(&mut pool, NB, a.id).expect("cancel");
    assert!(matches!(
        ShiftLogic::cancel(&mut pool, NB, a.id).unwrap_err(),
        AppError::Validation(_)
    ));

    let active = ShiftLogic::list(&mut pool, NB, Some(ShiftStatus::Active)).expect("list");
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, b.id);

    let all = ShiftLogic::list(&mut pool, NB, None).expect("list");
    assert_eq!(all.len(), 2);
    assert!(ShiftLogic::list(&mut pool, NB + 1, None).expect("list").is_empty());
}

#[test]
fn test_checkpoint_validation_and_token_issue() {
    let mut pool = open_pool("reg_checkpoint");
    let cp = seed_checkpoint_at(&mut pool, 50.0, "2026-03-10T21:00", 15);

    assert_eq!(cp.access_token.len(), 32);
    assert_eq!(cp.token_expires_at, ts("2026-03-10T21:15"));
    assert!(cp.accepts_token(&cp.access_token, ts("2026-03-10T21:15")));
    assert!(!cp.accepts_token(&cp.access_token, ts("2026-03-10T21:16")));
    assert!(!cp.accepts_token("nope", ts("2026-03-10T21:00")));

    let stored = CheckpointLogic::get(&mut pool, NB, cp.id).expect("reload");
    assert_eq!(stored.access_token, cp.access_token);

    let bad_radius = NewCheckpoint {
        name: "Gate".to_string(),
        latitude: CP_LAT,
        longitude: CP_LON,
        radius_meters: 0.0,
    };
    let err = CheckpointLogic::create(&mut pool, NB, bad_radius, 15, ts("2026-03-10T21:00"))
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let bad_lat = NewCheckpoint {
        name: "Gate".to_string(),
        latitude: 91.0,
        longitude: CP_LON,
        radius_meters: 10.0,
    };
    let err = CheckpointLogic::create(&mut pool, NB, bad_lat, 15, ts("2026-03-10T21:00"))
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = CheckpointLogic::rotate(&mut pool, NB, cp.id, 0, ts("2026-03-10T21:00")).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = CheckpointLogic::rotate(&mut pool, NB + 1, cp.id, 15, ts("2026-03-10T21:00"))
        .unwrap_err();
    assert!(matches!(err, AppError::CheckpointNotFound(_)));
}

#[test]
fn test_roster_assignment_is_idempotent() {
    let mut pool = open_pool("reg_roster");
    let shift = seed_shift(&mut pool, "2026-03-10", "2026-03-13", "22:00", "04:00", None);

    let first = RosterLogic::assign(&mut pool, NB, shift.id, 7, None).expect("assign");
    assert_eq!(first.created, 3);
    assert_eq!(first.existing, 0);

    let again = RosterLogic::assign(&mut pool, NB, shift.id, 7, Some(date("2026-03-11")))
        .expect("assign one");
    assert_eq!(again.created, 0);
    assert_eq!(again.existing, 1);

    // 2026-03-13 is only the morning end of the last occurrence
    let err = RosterLogic::assign(&mut pool, NB, shift.id, 8, Some(date("2026-03-13"))).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    assert_eq!(RosterLogic::list(&mut pool, NB, shift.id).expect("list").len(), 3);
}

#[test]
fn test_excuse_only_from_pending() {
    let mut pool = open_pool("reg_excuse");
    let (cp, shift, p) = seed_night(&mut pool);
    let other = assign(&mut pool, shift.id, 8);

    let excused = RosterLogic::excuse(&mut pool, NB, p.id, Some(" out of town ")).expect("excuse");
    assert_eq!(excused.notes, "out of town");
    assert!(matches!(
        RosterLogic::excuse(&mut pool, NB, p.id, None).unwrap_err(),
        AppError::Validation(_)
    ));

    ronda::core::attendance::AttendanceVerifier::check_in(
        &mut pool,
        NB,
        &token_request(&other, &cp, "2026-03-10T22:00"),
    )
    .expect("check in");
    assert!(matches!(
        RosterLogic::excuse(&mut pool, NB, other.id, None).unwrap_err(),
        AppError::Validation(_)
    ));
}

#[test]
fn test_excuse_refused_once_resident_is_fined() {
    let mut pool = open_pool("reg_excuse_fined");
    let (_cp, shift, p) = seed_night(&mut pool);
    set_policy(&mut pool, ViolationKind::Absence, 50000, None);

    // evaluated mid-window: still PENDING but already fined for absence
    let created = FineEngine::evaluate_shift(&mut pool, NB, shift.id, ts("2026-03-10T23:00"))
        .expect("evaluate");
    assert_eq!(created.len(), 1);

    let err = RosterLogic::excuse(&mut pool, NB, p.id, Some("sick")).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let after = RosterLogic::get(&mut pool, NB, p.id).expect("participant");
    assert_eq!(after.status, ParticipantStatus::Pending);
    assert!(after.is_fined);
    assert_eq!(after.fine_amount, Some(50000));
}

#[test]
fn test_excuse_refused_when_fine_row_exists_on_active_shift() {
    let mut pool = open_pool("reg_excuse_fine_row");
    let (_cp, shift, p) = seed_night(&mut pool);

    let fine = Fine {
        id: 0,
        neighborhood_id: NB,
        resident_id: p.resident_id,
        shift_id: shift.id,
        participant_id: p.id,
        violation_kind: ViolationKind::Absence,
        amount: 50000,
        status: FineStatus::Unpaid,
        generated_at: ts("2026-03-10T23:00"),
        paid_at: None,
    };
    ronda::db::fines::insert_fine(&pool.conn, &fine)
        .expect("insert")
        .expect("fine id");

    assert_eq!(
        ShiftLogic::get(&mut pool, NB, shift.id).expect("shift").status,
        ShiftStatus::Active
    );
    let err = RosterLogic::excuse(&mut pool, NB, p.id, None).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(
        RosterLogic::get(&mut pool, NB, p.id).expect("participant").status,
        ParticipantStatus::Pending
    );
}

#[test]
fn test_policy_upsert_keeps_one_row_per_kind() {
    let mut pool = open_pool("reg_policy");

    set_policy(&mut pool, ViolationKind::Absence, 50000, None);
    let updated = PolicyLogic::set(&mut pool, NB, ViolationKind::Absence, 60000, Some(5), true)
        .expect("update");
    assert_eq!(updated.amount, 60000);
    assert_eq!(updated.tolerance(), 5);

    let early = PolicyLogic::set(&mut pool, NB, ViolationKind::EarlyDeparture, 10000, None, true)
        .expect("early");
    assert_eq!(early.tolerance_minutes, None);
    assert_eq!(early.tolerance(), DEFAULT_TOLERANCE_MINUTES);

    let all = PolicyLogic::list(&mut pool, NB).expect("list");
    assert_eq!(all.len(), 2);

    let err = PolicyLogic::set(&mut pool, NB, ViolationKind::LateArrival, -1, None, true).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

/// Bridge that refuses every hand-off.
struct FailingBridge;

impl LedgerBridge for FailingBridge {
    fn post_paid_fine(&mut self, _conn: &Connection, _fine: &Fine) -> AppResult<()> {
        Err(AppError::Other("ledger offline".into()))
    }
}

#[test]
fn test_mark_paid_hands_fine_to_ledger() {
    let mut pool = open_pool("reg_ledger");
    let (_cp, shift, _p) = seed_night(&mut pool);
    set_policy(&mut pool, ViolationKind::Absence, 50000, None);
    let outcomes = FineEngine::evaluate_shift(&mut pool, NB, shift.id, ts("2026-03-11T08:00"))
        .expect("evaluate");
    let fine_id = outcomes[0].fine.id;

    // a failing bridge leaves the fine untouched
    let err = FineLedger::mark_paid(&mut pool, NB, fine_id, ts("2026-03-12T10:00"), &mut FailingBridge)
        .unwrap_err();
    assert!(matches!(err, AppError::Other(_)));
    assert_eq!(
        FineLedger::get(&mut pool, NB, fine_id).expect("get").status,
        FineStatus::Unpaid
    );

    let paid = FineLedger::mark_paid(
        &mut pool,
        NB,
        fine_id,
        ts("2026-03-12T10:00"),
        &mut AuditLedgerBridge,
    )
    .expect("pay");
    assert_eq!(paid.status, FineStatus::Paid);
    assert_eq!(paid.paid_at, Some(ts("2026-03-12T10:00")));

    let handoffs: i64 = pool
        .conn
        .query_row(
            "SELECT COUNT(*) FROM log WHERE operation = 'ledger_handoff'",
            [],
            |row| row.get(0),
        )
        .expect("count");
    assert_eq!(handoffs, 1);

    let err = FineLedger::mark_paid(
        &mut pool,
        NB,
        fine_id,
        ts("2026-03-12T11:00"),
        &mut AuditLedgerBridge,
    )
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let unpaid = FineFilter {
        status: Some(FineStatus::Unpaid),
        ..FineFilter::default()
    };
    assert!(FineLedger::list(&mut pool, NB, &unpaid).expect("list").is_empty());

    let since = FineFilter {
        since: Some(ts("2026-03-11T09:00")),
        ..FineFilter::default()
    };
    assert!(FineLedger::list(&mut pool, NB, &since).expect("list").is_empty());

    assert!(matches!(
        FineLedger::get(&mut pool, NB + 1, fine_id).unwrap_err(),
        AppError::FineNotFound(_)
    ));
}
