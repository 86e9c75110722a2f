use ronda::core::attendance::AttendanceVerifier;
use ronda::core::calculator::geofence::haversine_meters;
use ronda::core::checkpoint::CheckpointLogic;
use ronda::core::roster::RosterLogic;
use ronda::core::shift::ShiftLogic;
use ronda::errors::AppError;
use ronda::models::check_in_method::CheckInMethod;
use ronda::models::participant::ParticipantStatus;

mod common;
use common::*;

#[test]
fn test_check_in_marks_present_and_records_telemetry() {
    let mut pool = open_pool("att_check_in_ok");
    let (cp, _shift, p) = seed_night(&mut pool);

    let req = token_request(&p, &cp, "2026-03-10T22:05");
    let updated = AttendanceVerifier::check_in(&mut pool, NB, &req).expect("check in");

    assert_eq!(updated.status, ParticipantStatus::Present);
    assert_eq!(updated.check_in_at, Some(ts("2026-03-10T22:05")));
    assert_eq!(updated.check_in_method, Some(CheckInMethod::Token));
    assert_eq!(updated.checkpoint_id, Some(cp.id));
    assert_eq!(updated.measured_distance_meters, Some(0.0));

    let stored = RosterLogic::get(&mut pool, NB, p.id).expect("reload");
    assert_eq!(stored.status, ParticipantStatus::Present);
    assert_eq!(stored.check_in_lat, Some(CP_LAT));
    assert_eq!(stored.check_in_long, Some(CP_LON));
    assert_eq!(stored.version, p.version + 1);
}

#[test]
fn test_out_of_geofence_keeps_pending() {
    let mut pool = open_pool("att_out_of_geofence");
    let (cp, _shift, p) = seed_night(&mut pool);

    // ~1.1 km north of the checkpoint
    let mut req = token_request(&p, &cp, "2026-03-10T22:05");
    req.latitude = CP_LAT + 0.01;

    let err = AttendanceVerifier::check_in(&mut pool, NB, &req).unwrap_err();
    match err {
        AppError::OutOfGeofence {
            distance_meters,
            radius_meters,
        } => {
            assert!(distance_meters > radius_meters);
            assert_eq!(radius_meters, 100.0);
        }
        other => panic!("expected OutOfGeofence, got {other:?}"),
    }

    let stored = RosterLogic::get(&mut pool, NB, p.id).expect("reload");
    assert_eq!(stored.status, ParticipantStatus::Pending);
    assert!(stored.check_in_at.is_none());
    assert_eq!(stored.version, p.version);
}

#[test]
fn test_distance_equal_to_radius_is_inside() {
    let mut pool = open_pool("att_boundary");

    let lat = CP_LAT + 0.0005;
    let exact = haversine_meters(lat, CP_LON, CP_LAT, CP_LON);

    let cp = seed_checkpoint_at(&mut pool, exact, "2026-01-01T00:00", 365 * 24 * 60);
    let shift = seed_shift(&mut pool, "2026-03-10", "2026-03-11", "22:00", "04:00", Some(cp.id));
    let p = assign(&mut pool, shift.id, 7);

    let mut req = token_request(&p, &cp, "2026-03-10T22:00");
    req.latitude = lat;

    let updated = AttendanceVerifier::check_in(&mut pool, NB, &req).expect("boundary is inside");
    assert_eq!(updated.status, ParticipantStatus::Present);
}

#[test]
fn test_token_expiry_is_inclusive() {
    let mut pool = open_pool("att_token_expiry");
    let cp = seed_checkpoint_at(&mut pool, 100.0, "2026-03-10T21:50", 15);
    let shift = seed_shift(&mut pool, "2026-03-10", "2026-03-11", "22:00", "04:00", Some(cp.id));
    let late = assign(&mut pool, shift.id, 7);
    let on_time = assign(&mut pool, shift.id, 8);

    // one minute after expiry
    let err = AttendanceVerifier::check_in(&mut pool, NB, &token_request(&late, &cp, "2026-03-10T22:06"))
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidOrExpiredToken));

    // exactly at expiry
    let ok = AttendanceVerifier::check_in(&mut pool, NB, &token_request(&on_time, &cp, "2026-03-10T22:05"))
        .expect("token valid at its expiry instant");
    assert_eq!(ok.status, ParticipantStatus::Present);

    let stored = RosterLogic::get(&mut pool, NB, late.id).expect("reload");
    assert_eq!(stored.status, ParticipantStatus::Pending);
}

#[test]
fn test_rotated_token_replaces_previous() {
    let mut pool = open_pool("att_token_rotate");
    let (old_cp, _shift, p) = seed_night(&mut pool);

    let rotated = CheckpointLogic::rotate(&mut pool, NB, old_cp.id, 60, ts("2026-03-10T21:45"))
        .expect("rotate");
    assert_ne!(rotated.access_token, old_cp.access_token);
    assert_eq!(rotated.token_expires_at, ts("2026-03-10T22:45"));

    let err = AttendanceVerifier::check_in(&mut pool, NB, &token_request(&p, &old_cp, "2026-03-10T22:01"))
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidOrExpiredToken));

    AttendanceVerifier::check_in(&mut pool, NB, &token_request(&p, &rotated, "2026-03-10T22:01"))
        .expect("new token accepted");
}

#[test]
fn test_missing_token_is_a_validation_error() {
    let mut pool = open_pool("att_missing_token");
    let (cp, _shift, p) = seed_night(&mut pool);

    let mut req = token_request(&p, &cp, "2026-03-10T22:01");
    req.token = None;

    let err = AttendanceVerifier::check_in(&mut pool, NB, &req).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[test]
fn test_manual_check_in_skips_token_but_not_geofence() {
    let mut pool = open_pool("att_manual");
    let (cp, _shift, p) = seed_night(&mut pool);

    let mut req = token_request(&p, &cp, "2026-03-10T22:01");
    req.token = None;
    req.method = CheckInMethod::Manual;
    req.latitude = CP_LAT + 0.01;

    let err = AttendanceVerifier::check_in(&mut pool, NB, &req).unwrap_err();
    assert!(matches!(err, AppError::OutOfGeofence { .. }));

    req.latitude = CP_LAT;
    let updated = AttendanceVerifier::check_in(&mut pool, NB, &req).expect("manual check in");
    assert_eq!(updated.check_in_method, Some(CheckInMethod::Manual));
}

#[test]
fn test_repeated_check_in_keeps_first_timestamp() {
    let mut pool = open_pool("att_repeat");
    let (cp, _shift, p) = seed_night(&mut pool);

    AttendanceVerifier::check_in(&mut pool, NB, &token_request(&p, &cp, "2026-03-10T22:02"))
        .expect("first tap");

    let mut again = token_request(&p, &cp, "2026-03-10T22:03");
    again.latitude = CP_LAT + 0.0002;
    let updated = AttendanceVerifier::check_in(&mut pool, NB, &again).expect("second tap");

    assert_eq!(updated.status, ParticipantStatus::Present);
    assert_eq!(updated.check_in_at, Some(ts("2026-03-10T22:02")));
    assert_eq!(updated.check_in_lat, Some(CP_LAT + 0.0002));
    assert!(updated.measured_distance_meters.unwrap_or(0.0) > 0.0);
}

#[test]
fn test_stale_participant_version_is_rejected() {
    let mut pool = open_pool("att_stale_version");
    let (_cp, _shift, p) = seed_night(&mut pool);

    pool.conn
        .execute("UPDATE participants SET version = version + 1 WHERE id = ?1", [p.id])
        .expect("bump version");

    // p still carries the old version
    let err = ronda::db::participants::update_attendance(&pool.conn, &p).unwrap_err();
    assert!(matches!(err, AppError::ConcurrentUpdate(id) if id == p.id));
}

#[test]
fn test_check_in_rejected_on_canceled_shift_and_excused_participant() {
    let mut pool = open_pool("att_rejections");
    let (cp, shift, p) = seed_night(&mut pool);
    let excused = assign(&mut pool, shift.id, 8);

    RosterLogic::excuse(&mut pool, NB, excused.id, Some("sick")).expect("excuse");
    let err = AttendanceVerifier::check_in(&mut pool, NB, &token_request(&excused, &cp, "2026-03-10T22:01"))
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    ShiftLogic::cancel(&mut pool, NB, shift.id).expect("cancel");
    let err = AttendanceVerifier::check_in(&mut pool, NB, &token_request(&p, &cp, "2026-03-10T22:01"))
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[test]
fn test_unknown_or_foreign_participant_is_not_found() {
    let mut pool = open_pool("att_not_found");
    let (cp, _shift, p) = seed_night(&mut pool);

    let mut req = token_request(&p, &cp, "2026-03-10T22:01");
    req.participant_id = 9999;
    let err = AttendanceVerifier::check_in(&mut pool, NB, &req).unwrap_err();
    assert!(matches!(err, AppError::ParticipantNotFound(9999)));

    // same participant, other neighborhood
    let req = token_request(&p, &cp, "2026-03-10T22:01");
    let err = AttendanceVerifier::check_in(&mut pool, NB + 1, &req).unwrap_err();
    assert!(matches!(err, AppError::ParticipantNotFound(_)));
}

#[test]
fn test_check_out_requires_presence_and_order() {
    let mut pool = open_pool("att_check_out");
    let (cp, _shift, p) = seed_night(&mut pool);

    let err = AttendanceVerifier::check_out(&mut pool, NB, &token_request(&p, &cp, "2026-03-11T03:00"))
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    AttendanceVerifier::check_in(&mut pool, NB, &token_request(&p, &cp, "2026-03-10T22:00"))
        .expect("check in");

    let err = AttendanceVerifier::check_out(&mut pool, NB, &token_request(&p, &cp, "2026-03-10T21:00"))
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // far away is fine on the way out
    let mut req = token_request(&p, &cp, "2026-03-11T04:00");
    req.latitude = CP_LAT + 0.05;
    let updated = AttendanceVerifier::check_out(&mut pool, NB, &req).expect("check out");

    assert_eq!(updated.status, ParticipantStatus::Present);
    assert_eq!(updated.check_out_at, Some(ts("2026-03-11T04:00")));
    assert_eq!(updated.check_in_at, Some(ts("2026-03-10T22:00")));
}
