use crate::cli::parser::{Commands, RosterAction};
use crate::config::Config;
use crate::core::roster::RosterLogic;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::models::participant::Participant;
use crate::ui::messages::{header, info, success, warning};
use crate::utils::colors::{RESET, color_for_participant, colorize_optional};
use crate::utils::date::{format_date, parse_date_arg};
use crate::utils::formatting::{format_amount, format_meters};
use crate::utils::table::Table;
use crate::utils::time::format_ts;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Roster { action } = cmd else {
        return Ok(());
    };

    let mut pool = DbPool::new(&cfg.database)?;
    let nb = cfg.neighborhood_id;

    match action {
        RosterAction::Assign {
            shift,
            resident,
            date,
        } => {
            let occurrence = date.as_deref().map(parse_date_arg).transpose()?;
            let summary = RosterLogic::assign(&mut pool, nb, *shift, *resident, occurrence)?;

            if summary.created > 0 {
                success(format!(
                    "Resident {} assigned to shift #{} ({} occurrence(s))",
                    resident, shift, summary.created
                ));
            }
            if summary.existing > 0 {
                info(format!(
                    "{} occurrence(s) were already assigned",
                    summary.existing
                ));
            }
        }

        RosterAction::List { shift } => {
            let roster = RosterLogic::list(&mut pool, nb, *shift)?;
            if roster.is_empty() {
                warning(format!("Nobody is assigned to shift #{}.", shift));
                return Ok(());
            }

            header(format!("Roster of shift #{}", shift));
            let mut table = Table::new(&[
                "ID", "RESIDENT", "DATE", "STATUS", "IN", "OUT", "DISTANCE", "METHOD", "FINE",
            ]);
            for p in &roster {
                table.add_row(row(p));
            }
            print!("{}", table.render());
        }

        RosterAction::Excuse { id, notes } => {
            let p = RosterLogic::excuse(&mut pool, nb, *id, notes.as_deref())?;
            success(format!(
                "Participant #{} (resident {}) excused for {}",
                p.id,
                p.resident_id,
                format_date(&p.occurrence_date)
            ));
        }
    }

    Ok(())
}

fn row(p: &Participant) -> Vec<String> {
    let opt_ts = |ts: &Option<chrono::NaiveDateTime>| {
        colorize_optional(&ts.as_ref().map(format_ts).unwrap_or_default())
    };

    vec![
        p.id.to_string(),
        p.resident_id.to_string(),
        format_date(&p.occurrence_date),
        format!(
            "{}{}{}",
            color_for_participant(p.status),
            p.status.to_db_str(),
            RESET
        ),
        opt_ts(&p.check_in_at),
        opt_ts(&p.check_out_at),
        colorize_optional(&format_meters(p.measured_distance_meters)),
        colorize_optional(
            p.check_in_method
                .map(|m| m.to_db_str())
                .unwrap_or_default(),
        ),
        colorize_optional(&p.fine_amount.map(format_amount).unwrap_or_default()),
    ]
}
