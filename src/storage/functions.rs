//! `MONTH()` and `YEAR()` scalar functions for SQLite connections.
//!
//! The report queries are written against a dialect that provides these
//! scalars natively. SQLite does not, so every connection opened by
//! [`Database`](super::Database) registers them before running a query.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::types::ValueRef;
use rusqlite::Connection;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Register `MONTH(ts)` and `YEAR(ts)` on a connection.
pub fn register(conn: &Connection) -> Result<(), rusqlite::Error> {
    let flags = FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC;
    conn.create_scalar_function("MONTH", 1, flags, sql_month)?;
    conn.create_scalar_function("YEAR", 1, flags, sql_year)?;
    Ok(())
}

fn sql_month(ctx: &Context<'_>) -> rusqlite::Result<Option<i64>> {
    Ok(date_arg(ctx).map(|d| d.month() as i64))
}

fn sql_year(ctx: &Context<'_>) -> rusqlite::Result<Option<i64>> {
    Ok(date_arg(ctx).map(|d| d.year() as i64))
}

fn date_arg(ctx: &Context<'_>) -> Option<NaiveDate> {
    match ctx.get_raw(0) {
        ValueRef::Text(t) => std::str::from_utf8(t).ok().and_then(parse_timestamp),
        _ => None,
    }
}

/// Parse a stored timestamp. Accepts plain dates and date-times with a space
/// or `T` separator, optional fractional seconds and an optional UTC offset
/// (`Z`, `+hh:mm`, `+hhmm`). Anything else is `None`, which surfaces as SQL
/// NULL.
///
/// Offset timestamps keep the calendar date as written; they are not
/// converted to UTC.
pub fn parse_timestamp(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt.date());
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .or_else(|| {
            OFFSET_FORMATS
                .iter()
                .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
        })
        .map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_formats() {
        let nov2 = NaiveDate::from_ymd_opt(2020, 11, 2).unwrap();
        assert_eq!(parse_timestamp("2020-11-02"), Some(nov2));
        assert_eq!(parse_timestamp("2020-11-02 13:45:00"), Some(nov2));
        assert_eq!(parse_timestamp("2020-11-02T13:45:00"), Some(nov2));
        assert_eq!(parse_timestamp("2020-11-02 13:45:00.250"), Some(nov2));
        assert_eq!(parse_timestamp("2020-11-02 13:45"), Some(nov2));
        assert_eq!(parse_timestamp(" 2020-11-02 "), Some(nov2));
    }

    #[test]
    fn test_parse_timestamp_with_offset() {
        let nov3 = NaiveDate::from_ymd_opt(2020, 11, 3).unwrap();
        assert_eq!(parse_timestamp("2020-11-03T09:00:00Z"), Some(nov3));
        assert_eq!(parse_timestamp("2020-11-03T09:00:00.5+02:00"), Some(nov3));
        assert_eq!(parse_timestamp("2020-11-03 09:00:00+02:00"), Some(nov3));
        assert_eq!(parse_timestamp("2020-11-03 09:00:00-0500"), Some(nov3));
        // Calendar date as written, not shifted to UTC.
        assert_eq!(
            parse_timestamp("2020-11-30T23:30:00-05:00"),
            NaiveDate::from_ymd_opt(2020, 11, 30)
        );
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2020-13-01"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_month_and_year_in_sql() {
        let conn = Connection::open_in_memory().unwrap();
        register(&conn).unwrap();

        let (month, year): (i64, i64) = conn
            .query_row(
                "SELECT MONTH('2020-09-30 23:59:59'), YEAR('2020-09-30 23:59:59')",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!((month, year), (9, 2020));

        let (month, year): (i64, i64) = conn
            .query_row(
                "SELECT MONTH('2020-11-02T10:00:00Z'), YEAR('2020-11-02T10:00:00Z')",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!((month, year), (11, 2020));

        let missing: Option<i64> = conn
            .query_row("SELECT MONTH(NULL)", [], |row| row.get(0))
            .unwrap();
        assert_eq!(missing, None);

        let bad: Option<i64> = conn
            .query_row("SELECT YEAR('not a date')", [], |row| row.get(0))
            .unwrap();
        assert_eq!(bad, None);
    }
}
