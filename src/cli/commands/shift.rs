use crate::cli::parser::{Commands, ShiftAction};
use crate::config::Config;
use crate::core::shift::{NewShift, ShiftLogic};
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::models::shift::{Shift, ShiftStatus};
use crate::ui::messages::{header, success, warning};
use crate::utils::colors::{GREEN, GREY, RED, RESET, colorize_optional};
use crate::utils::date::parse_date_arg;
use crate::utils::table::Table;
use crate::utils::time::parse_time_arg;
use chrono::Days;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Shift { action } = cmd else {
        return Ok(());
    };

    let mut pool = DbPool::new(&cfg.database)?;
    let nb = cfg.neighborhood_id;

    match action {
        ShiftAction::Add {
            label,
            start_date,
            end_date,
            start,
            end,
            checkpoint,
        } => {
            let start_date = parse_date_arg(start_date)?;
            let start_time = parse_time_arg(start)?;
            let end_time = parse_time_arg(end)?;

            // a single overnight occurrence ends the next morning
            let end_date = match end_date {
                Some(d) => parse_date_arg(d)?,
                None if end_time <= start_time => start_date
                    .checked_add_days(Days::new(1))
                    .unwrap_or(start_date),
                None => start_date,
            };

            let shift = ShiftLogic::create(
                &mut pool,
                nb,
                NewShift {
                    label: label.clone(),
                    start_date,
                    end_date,
                    start_time,
                    end_time,
                    checkpoint_id: *checkpoint,
                },
            )?;

            success(format!(
                "Shift #{} '{}' scheduled: {}",
                shift.id,
                shift.label,
                shift.window_str()
            ));
            if shift.is_overnight() {
                println!("   overnight: each occurrence ends the following morning");
            }
        }

        ShiftAction::List { status } => {
            let shifts = ShiftLogic::list(&mut pool, nb, *status)?;
            if shifts.is_empty() {
                warning("No shifts found.");
                return Ok(());
            }

            header(format!("Shifts (neighborhood {})", nb));
            let mut table = Table::new(&["ID", "LABEL", "DATES", "HOURS", "CHECKPOINT", "STATUS"]);
            for s in &shifts {
                table.add_row(row(s));
            }
            print!("{}", table.render());
        }

        ShiftAction::Cancel { id } => {
            let shift = ShiftLogic::cancel(&mut pool, nb, *id)?;
            success(format!("Shift #{} '{}' canceled", shift.id, shift.label));
        }
    }

    Ok(())
}

fn row(s: &Shift) -> Vec<String> {
    let status_color = match s.status {
        ShiftStatus::Active => GREEN,
        ShiftStatus::Closed => GREY,
        ShiftStatus::Canceled => RED,
    };

    vec![
        s.id.to_string(),
        s.label.clone(),
        format!(
            "{} → {}",
            s.start_date.format("%Y-%m-%d"),
            s.end_date.format("%Y-%m-%d")
        ),
        format!(
            "{}-{}{}",
            s.start_time.format("%H:%M"),
            s.end_time.format("%H:%M"),
            if s.is_overnight() { " (+1)" } else { "" }
        ),
        colorize_optional(&s.checkpoint_id.map(|c| format!("#{c}")).unwrap_or_default()),
        format!("{}{}{}", status_color, s.status.to_db_str(), RESET),
    ]
}
