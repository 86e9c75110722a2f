//! Column decoding helpers shared by the row mappers.
//!
//! Text columns that fail to parse are reported as
//! `FromSqlConversionFailure` carrying the matching `AppError`.

use crate::errors::AppError;
use crate::utils::time::TS_FORMAT;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::Row;
use rusqlite::types::Type;

fn conversion(idx: usize, err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn column_index(row: &Row, col: &str) -> usize {
    row.as_ref().column_index(col).unwrap_or(0)
}

pub fn date(row: &Row, col: &str) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(col)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|_| conversion(column_index(row, col), AppError::InvalidDate(raw)))
}

pub fn time(row: &Row, col: &str) -> rusqlite::Result<NaiveTime> {
    let raw: String = row.get(col)?;
    NaiveTime::parse_from_str(&raw, "%H:%M")
        .map_err(|_| conversion(column_index(row, col), AppError::InvalidTime(raw)))
}

pub fn timestamp(row: &Row, col: &str) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(col)?;
    NaiveDateTime::parse_from_str(&raw, TS_FORMAT)
        .map_err(|_| conversion(column_index(row, col), AppError::InvalidTime(raw)))
}

pub fn opt_timestamp(row: &Row, col: &str) -> rusqlite::Result<Option<NaiveDateTime>> {
    let raw: Option<String> = row.get(col)?;
    match raw {
        None => Ok(None),
        Some(s) => NaiveDateTime::parse_from_str(&s, TS_FORMAT)
            .map(Some)
            .map_err(|_| conversion(column_index(row, col), AppError::InvalidTime(s))),
    }
}

/// Decode an enum column through its `from_db_str`.
pub fn enumeration<T>(
    row: &Row,
    col: &str,
    from_db_str: fn(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    let raw: String = row.get(col)?;
    from_db_str(&raw).ok_or_else(|| {
        conversion(
            column_index(row, col),
            AppError::Other(format!("Invalid value '{}' in column {}", raw, col)),
        )
    })
}

pub fn opt_enumeration<T>(
    row: &Row,
    col: &str,
    from_db_str: fn(&str) -> Option<T>,
) -> rusqlite::Result<Option<T>> {
    let raw: Option<String> = row.get(col)?;
    match raw {
        None => Ok(None),
        Some(s) => from_db_str(&s).map(Some).ok_or_else(|| {
            conversion(
                column_index(row, col),
                AppError::Other(format!("Invalid value '{}' in column {}", s, col)),
            )
        }),
    }
}

pub fn flag(row: &Row, col: &str) -> rusqlite::Result<bool> {
    Ok(row.get::<_, i64>(col)? != 0)
}
