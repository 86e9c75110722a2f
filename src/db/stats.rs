use crate::db::migrate::known_versions;
use crate::db::pool::DbPool;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use crate::utils::formatting::format_amount;
use rusqlite::OptionalExtension;
use std::fs;

fn count(pool: &DbPool, table: &str) -> rusqlite::Result<i64> {
    pool.conn
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
}

pub fn print_db_info(pool: &mut DbPool, db_path: &str) -> rusqlite::Result<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    //
    // 2) ROW COUNTS
    //
    for table in ["shifts", "checkpoints", "participants", "fine_policies", "fines"] {
        println!(
            "{}• {}:{} {}{}{}",
            CYAN,
            table,
            RESET,
            GREEN,
            count(pool, table)?,
            RESET
        );
    }

    //
    // 3) OUTSTANDING FINES
    //
    let unpaid: Option<i64> = pool
        .conn
        .query_row(
            "SELECT SUM(amount) FROM fines WHERE status = 'UNPAID'",
            [],
            |row| row.get(0),
        )
        .optional()?
        .flatten();

    let fmt_unpaid = unpaid
        .map(format_amount)
        .unwrap_or_else(|| format!("{GREY}--{RESET}"));
    println!("{}• Unpaid fines total:{} {}", CYAN, RESET, fmt_unpaid);

    //
    // 4) SCHEMA VERSION
    //
    let last: Option<String> = pool
        .conn
        .query_row(
            "SELECT target FROM log WHERE operation = 'migration_applied'
             ORDER BY id DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;

    let latest_known = known_versions().last().copied().unwrap_or("--");
    println!(
        "{}• Schema:{} {} (latest known: {})",
        CYAN,
        RESET,
        last.unwrap_or_else(|| format!("{GREY}--{RESET}")),
        latest_known
    );

    println!();
    Ok(())
}
