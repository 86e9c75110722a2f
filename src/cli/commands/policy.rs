use crate::cli::parser::{Commands, PolicyAction};
use crate::config::Config;
use crate::core::policy::PolicyLogic;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::models::fine_policy::FinePolicy;
use crate::ui::messages::{header, success, warning};
use crate::utils::colors::{GREEN, GREY, RESET};
use crate::utils::formatting::format_amount;
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Policy { action } = cmd else {
        return Ok(());
    };

    let mut pool = DbPool::new(&cfg.database)?;
    let nb = cfg.neighborhood_id;

    match action {
        PolicyAction::Set {
            kind,
            amount,
            tolerance,
            inactive,
        } => {
            let p = PolicyLogic::set(&mut pool, nb, *kind, *amount, *tolerance, !*inactive)?;
            success(format!(
                "{} policy: {} (tolerance {} min){}",
                p.violation_kind.label(),
                format_amount(p.amount),
                p.tolerance(),
                if p.is_active { "" } else { ", inactive" }
            ));
        }

        PolicyAction::List => {
            let all = PolicyLogic::list(&mut pool, nb)?;
            if all.is_empty() {
                warning(format!(
                    "Neighborhood {} has no fine policy: evaluations will not fine anyone.",
                    nb
                ));
                return Ok(());
            }

            header(format!("Fine policies (neighborhood {})", nb));
            let mut table = Table::new(&["KIND", "AMOUNT", "TOLERANCE", "ACTIVE"]);
            for p in &all {
                table.add_row(row(p));
            }
            print!("{}", table.render());
        }
    }

    Ok(())
}

fn row(p: &FinePolicy) -> Vec<String> {
    vec![
        p.violation_kind.to_db_str().to_string(),
        format_amount(p.amount),
        match p.tolerance_minutes {
            Some(t) => format!("{t} min"),
            None => format!("{GREY}{} min (default){RESET}", p.tolerance()),
        },
        if p.is_active {
            format!("{GREEN}yes{RESET}")
        } else {
            format!("{GREY}no{RESET}")
        },
    ]
}
