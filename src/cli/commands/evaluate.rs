use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::engine::{EvaluationReport, FineEngine, SkipReason};
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::{error, fine, info, success, warning};
use crate::utils::formatting::format_amount;
use crate::utils::time::{format_ts, resolve_now};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Evaluate { shift, due, at } = cmd else {
        return Ok(());
    };

    let now = resolve_now(at.as_ref())?;
    let mut pool = DbPool::new(&cfg.database)?;
    let nb = cfg.neighborhood_id;

    if *due {
        let run = FineEngine::evaluate_due(&mut pool, nb, now)?;
        if run.is_empty() {
            info(format!("No shift has ended by {}.", format_ts(&now)));
        }
        for r in &run.reports {
            print_report(r);
        }
        for f in &run.failed {
            error(format!("Shift #{} not evaluated: {}", f.shift_id, f.error));
        }
        return Ok(());
    }

    if let Some(id) = shift {
        let report = FineEngine::evaluate_shift_report(&mut pool, nb, *id, now)?;
        print_report(&report);
    }

    Ok(())
}

fn print_report(r: &EvaluationReport) {
    info(format!("Evaluating shift #{}", r.shift_id));

    if r.marked_absent > 0 {
        println!("   {} participant(s) marked ABSENT", r.marked_absent);
    }

    for o in &r.fines {
        fine(format!(
            "fine #{}: resident {} owes {} ({})",
            o.fine.id,
            o.fine.resident_id,
            format_amount(o.fine.amount),
            o.fine.violation_kind.label()
        ));
    }

    for s in &r.skipped {
        match &s.reason {
            SkipReason::Failed(_) | SkipReason::NoActivePolicyForNeighborhood => warning(format!(
                "participant #{} (resident {}): {}",
                s.participant_id, s.resident_id, s.reason
            )),
            _ => println!(
                "   participant #{} (resident {}): {}",
                s.participant_id, s.resident_id, s.reason
            ),
        }
    }

    success(format!(
        "Shift #{}: {} fine(s) created, total {}",
        r.shift_id,
        r.fines.len(),
        format_amount(r.total_amount())
    ));
}
