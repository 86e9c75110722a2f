use crate::cli::parser::{AttendanceArgs, Commands};
use crate::config::Config;
use crate::core::attendance::{AttendanceRequest, AttendanceVerifier};
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::success;
use crate::utils::formatting::format_meters;
use crate::utils::time::{format_ts, resolve_now};

/// Handles both `checkin` and `checkout`.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let (args, is_check_in) = match cmd {
        Commands::Checkin(args) => (args, true),
        Commands::Checkout(args) => (args, false),
        _ => return Ok(()),
    };

    let req = build_request(args, cfg)?;
    let mut pool = DbPool::new(&cfg.database)?;
    let nb = cfg.neighborhood_id;

    if is_check_in {
        let p = AttendanceVerifier::check_in(&mut pool, nb, &req)?;
        success(format!(
            "Participant #{} (resident {}) is PRESENT, checked in at {} ({} from checkpoint)",
            p.id,
            p.resident_id,
            p.check_in_at.as_ref().map(format_ts).unwrap_or_default(),
            format_meters(p.measured_distance_meters)
        ));
    } else {
        let p = AttendanceVerifier::check_out(&mut pool, nb, &req)?;
        success(format!(
            "Participant #{} (resident {}) checked out at {}",
            p.id,
            p.resident_id,
            p.check_out_at.as_ref().map(format_ts).unwrap_or_default()
        ));
    }

    Ok(())
}

fn build_request(args: &AttendanceArgs, cfg: &Config) -> AppResult<AttendanceRequest> {
    let method = match args.method {
        Some(m) => m,
        None => cfg.check_in_method()?,
    };

    Ok(AttendanceRequest {
        participant_id: args.participant,
        latitude: args.lat,
        longitude: args.lon,
        token: args.token.clone(),
        method,
        checkpoint_id: args.checkpoint,
        at: resolve_now(args.at.as_ref())?,
    })
}
