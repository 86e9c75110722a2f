use crate::cli::parser::{CheckpointAction, Commands};
use crate::config::Config;
use crate::core::checkpoint::{CheckpointLogic, NewCheckpoint};
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::models::checkpoint::Checkpoint;
use crate::ui::messages::{header, info, success, warning};
use crate::utils::colors::{GREY, RED, RESET};
use crate::utils::formatting::bold;
use crate::utils::table::Table;
use crate::utils::time::{format_ts, now};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Checkpoint { action } = cmd else {
        return Ok(());
    };

    let mut pool = DbPool::new(&cfg.database)?;
    let nb = cfg.neighborhood_id;

    match action {
        CheckpointAction::Add {
            name,
            lat,
            lon,
            radius,
            ttl,
        } => {
            let cp = CheckpointLogic::create(
                &mut pool,
                nb,
                NewCheckpoint {
                    name: name.clone(),
                    latitude: *lat,
                    longitude: *lon,
                    radius_meters: *radius,
                },
                ttl.unwrap_or(cfg.token_ttl_minutes),
                now(),
            )?;

            success(format!(
                "Checkpoint #{} '{}' created (radius {} m)",
                cp.id, cp.name, cp.radius_meters
            ));
            print_token(&cp);
        }

        CheckpointAction::List { tokens } => {
            let all = CheckpointLogic::list(&mut pool, nb)?;
            if all.is_empty() {
                warning("No checkpoints found.");
                return Ok(());
            }

            let current = now();
            let mut headers = vec!["ID", "NAME", "LATITUDE", "LONGITUDE", "RADIUS", "TOKEN EXPIRES"];
            if *tokens {
                headers.push("TOKEN");
            }

            header(format!("Checkpoints (neighborhood {})", nb));
            let mut table = Table::new(&headers);
            for cp in &all {
                let expires = format_ts(&cp.token_expires_at);
                let mut row = vec![
                    cp.id.to_string(),
                    cp.name.clone(),
                    format!("{:.6}", cp.latitude),
                    format!("{:.6}", cp.longitude),
                    format!("{} m", cp.radius_meters),
                    if cp.token_expires_at < current {
                        format!("{RED}{expires} (expired){RESET}")
                    } else {
                        expires
                    },
                ];
                if *tokens {
                    row.push(format!("{GREY}{}{RESET}", cp.access_token));
                }
                table.add_row(row);
            }
            print!("{}", table.render());
        }

        CheckpointAction::Rotate { id, ttl } => {
            let cp = CheckpointLogic::rotate(
                &mut pool,
                nb,
                *id,
                ttl.unwrap_or(cfg.token_ttl_minutes),
                now(),
            )?;

            success(format!("Token of checkpoint #{} '{}' rotated", cp.id, cp.name));
            info("The previous token no longer works.");
            print_token(&cp);
        }
    }

    Ok(())
}

fn print_token(cp: &Checkpoint) {
    println!(
        "   token: {}  (valid until {})",
        bold(&cp.access_token),
        format_ts(&cp.token_expires_at)
    );
}
