use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::db::stats;
use crate::errors::AppResult;
use crate::utils::colors::{CYAN, GREEN, RED, RESET};
use std::fs;

/// `ronda db`: the flags run in a fixed order (migrate, info, check, vacuum).
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Db {
        migrate,
        check,
        vacuum,
        info,
    } = cmd
    else {
        return Ok(());
    };

    if !(*migrate || *check || *vacuum || *info) {
        println!("Nothing to do: pass --migrate, --check, --vacuum or --info.");
        return Ok(());
    }

    let mut pool = DbPool::new(&cfg.database)?;

    if *migrate {
        step("Running migrations");
        let applied = init_db(&pool.conn)?;
        done(&format!("Migration completed ({applied} applied)."));
    }

    if *info {
        stats::print_db_info(&mut pool, &cfg.database)?;
    }

    if *check {
        step("Running integrity check");
        let problems = integrity_problems(&pool)?;
        if problems.is_empty() {
            done("Integrity check passed.");
        } else {
            println!("{}✘ Integrity check failed:{}", RED, RESET);
            for p in problems {
                println!("   {p}");
            }
            println!();
        }
    }

    if *vacuum {
        step("Running VACUUM");
        let before = file_size(&cfg.database);
        pool.conn.execute_batch("VACUUM;")?;
        let after = file_size(&cfg.database);
        done(&format!(
            "Vacuum completed ({} → {} bytes).",
            before, after
        ));
    }

    Ok(())
}

fn step(msg: &str) {
    println!("{}▶ {}…{}", CYAN, msg, RESET);
}

fn done(msg: &str) {
    println!("{}✔ {}{}\n", GREEN, msg, RESET);
}

fn file_size(path: &str) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

/// Rows reported by `PRAGMA integrity_check` plus foreign key violations.
fn integrity_problems(pool: &DbPool) -> AppResult<Vec<String>> {
    let mut problems = Vec::new();

    let mut stmt = pool.conn.prepare("PRAGMA integrity_check")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    for r in rows {
        let line = r?;
        if line != "ok" {
            problems.push(line);
        }
    }

    let mut fk = pool.conn.prepare("PRAGMA foreign_key_check")?;
    let rows = fk.query_map([], |row| {
        Ok(format!(
            "foreign key violation in {} (rowid {})",
            row.get::<_, String>(0)?,
            row.get::<_, Option<i64>>(1)?.unwrap_or_default()
        ))
    })?;
    for r in rows {
        problems.push(r?);
    }

    Ok(problems)
}
