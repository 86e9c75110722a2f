use crate::cli::parser::{Commands, FinesAction};
use crate::config::Config;
use crate::core::ledger::{AuditLedgerBridge, FineLedger};
use crate::db::fines::FineFilter;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::export::ExportLogic;
use crate::models::fine::{Fine, FineStatus};
use crate::ui::messages::{header, success, warning};
use crate::utils::colors::{RESET, color_for_fine, colorize_optional};
use crate::utils::formatting::format_amount;
use crate::utils::path::expand_tilde;
use crate::utils::table::Table;
use crate::utils::time::{format_ts, now, parse_timestamp_arg};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Fines { action } = cmd else {
        return Ok(());
    };

    let mut pool = DbPool::new(&cfg.database)?;
    let nb = cfg.neighborhood_id;

    match action {
        FinesAction::List {
            shift,
            status,
            since,
        } => {
            let filter = FineFilter {
                shift_id: *shift,
                status: *status,
                since: since.as_deref().map(parse_timestamp_arg).transpose()?,
            };

            let fines = FineLedger::list(&mut pool, nb, &filter)?;
            if fines.is_empty() {
                warning("No fines found.");
                return Ok(());
            }

            header(format!("Fines (neighborhood {})", nb));
            let mut table = Table::new(&[
                "ID", "RESIDENT", "SHIFT", "KIND", "AMOUNT", "STATUS", "GENERATED", "PAID",
            ]);
            for f in &fines {
                table.add_row(row(f));
            }
            print!("{}", table.render());

            let unpaid: i64 = fines
                .iter()
                .filter(|f| f.status == FineStatus::Unpaid)
                .map(|f| f.amount)
                .sum();
            println!("\nUnpaid in this list: {}", format_amount(unpaid));
        }

        FinesAction::Pay { id } => {
            let fine = FineLedger::mark_paid(&mut pool, nb, *id, now(), &mut AuditLedgerBridge)?;
            success(format!(
                "Fine #{} ({}) paid by resident {}",
                fine.id,
                format_amount(fine.amount),
                fine.resident_id
            ));
        }

        FinesAction::Export {
            format,
            file,
            shift,
            status,
            force,
        } => {
            let filter = FineFilter {
                shift_id: *shift,
                status: *status,
                since: None,
            };
            ExportLogic::export(&mut pool, nb, *format, &expand_tilde(file), &filter, *force)?;
        }
    }

    Ok(())
}

fn row(f: &Fine) -> Vec<String> {
    vec![
        f.id.to_string(),
        f.resident_id.to_string(),
        format!("#{}", f.shift_id),
        f.violation_kind.to_db_str().to_string(),
        format_amount(f.amount),
        format!("{}{}{}", color_for_fine(f.status), f.status.to_db_str(), RESET),
        format_ts(&f.generated_at),
        colorize_optional(&f.paid_at.as_ref().map(format_ts).unwrap_or_default()),
    ]
}
