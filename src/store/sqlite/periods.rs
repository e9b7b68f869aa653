use chrono::{Datelike, NaiveDate, Weekday};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::{date_column, format_date};
use crate::error::{Error, Result};
use crate::types::Period;

const PERIOD_COLUMNS: &str = "code, starts_on, ends_on";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Half {
    /// March to July.
    First,
    /// October to February of the following year.
    Second,
}

impl Half {
    fn prefix(self) -> &'static str {
        match self {
            Self::First => "I",
            Self::Second => "II",
        }
    }

    /// (start month, start year offset, end month, end year offset)
    fn months(self) -> (u32, i32, u32, i32) {
        match self {
            Self::First => (3, 0, 7, 0),
            Self::Second => (10, 0, 2, 1),
        }
    }
}

fn code(half: Half, year: i32) -> String {
    format!("{}-{year}", half.prefix())
}

fn parse_code(code: &str) -> Option<(Half, i32)> {
    let (prefix, year) = code.split_once('-')?;
    let half = match prefix {
        "I" => Half::First,
        "II" => Half::Second,
        _ => return None,
    };
    Some((half, year.parse().ok()?))
}

fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u8) -> Result<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
        .ok_or_else(|| Error::validation(format!("year {year} is out of range")))
}

/// Default bounds: the first half runs from the second Monday of March to
/// the first Friday of July, the second from the first Monday of October to
/// the second Friday of February.
fn default_bounds(half: Half, year: i32) -> Result<(NaiveDate, NaiveDate)> {
    match half {
        Half::First => Ok((
            nth_weekday(year, 3, Weekday::Mon, 2)?,
            nth_weekday(year, 7, Weekday::Fri, 1)?,
        )),
        Half::Second => Ok((
            nth_weekday(year, 10, Weekday::Mon, 1)?,
            nth_weekday(year + 1, 2, Weekday::Fri, 2)?,
        )),
    }
}

fn period_from_row(row: &Row<'_>) -> rusqlite::Result<Period> {
    Ok(Period {
        code: row.get(0)?,
        starts_on: date_column(row, 1)?,
        ends_on: date_column(row, 2)?,
    })
}

/// Inserts the default periods around `today` that are not stored yet.
/// Returns how many were added.
pub(super) fn ensure(conn: &Connection, today: NaiveDate) -> Result<usize> {
    let mut added = 0;
    for year in today.year() - 1..=today.year() + 1 {
        for half in [Half::First, Half::Second] {
            let (starts_on, ends_on) = default_bounds(half, year)?;
            added += conn.execute(
                "INSERT OR IGNORE INTO periods (code, starts_on, ends_on) VALUES (?1, ?2, ?3)",
                params![code(half, year), format_date(starts_on), format_date(ends_on)],
            )?;
        }
    }
    if added > 0 {
        tracing::info!(added, "seeded periods");
    }
    Ok(added)
}

pub(super) fn list(conn: &Connection) -> Result<Vec<Period>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PERIOD_COLUMNS} FROM periods ORDER BY starts_on DESC"
    ))?;
    let rows = stmt.query_map([], period_from_row)?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Error::from)
}

pub(super) fn active(conn: &Connection, today: NaiveDate) -> Result<Option<Period>> {
    conn.query_row(
        &format!(
            "SELECT {PERIOD_COLUMNS} FROM periods
             WHERE starts_on <= ?1 ORDER BY starts_on DESC LIMIT 1"
        ),
        params![format_date(today)],
        period_from_row,
    )
    .optional()
    .map_err(Error::from)
}

pub(super) fn update(
    conn: &Connection,
    code: &str,
    starts_on: NaiveDate,
    ends_on: NaiveDate,
    today: NaiveDate,
) -> Result<Period> {
    let (half, year) =
        parse_code(code).ok_or_else(|| Error::validation(format!("invalid period code '{code}'")))?;

    let known: Option<String> = conn
        .query_row("SELECT code FROM periods WHERE code = ?1", params![code], |row| row.get(0))
        .optional()?;
    if known.is_none() {
        return Err(Error::not_found(format!("Period {code} not found")));
    }

    match active(conn, today)? {
        Some(current) if current.code == code => {}
        _ => {
            return Err(Error::validation(format!(
                "only the active period can be edited, {code} is not active"
            )));
        }
    }

    let (start_month, start_offset, end_month, end_offset) = half.months();
    if starts_on.month() != start_month || starts_on.year() != year + start_offset {
        return Err(Error::validation(format!(
            "{code} must start in month {start_month} of {}",
            year + start_offset
        )));
    }
    if ends_on.month() != end_month || ends_on.year() != year + end_offset {
        return Err(Error::validation(format!(
            "{code} must end in month {end_month} of {}",
            year + end_offset
        )));
    }
    if ends_on < starts_on {
        return Err(Error::validation("a period cannot end before it starts"));
    }

    conn.execute(
        "UPDATE periods SET starts_on = ?1, ends_on = ?2 WHERE code = ?3",
        params![format_date(starts_on), format_date(ends_on), code],
    )?;
    tracing::info!(code, %starts_on, %ends_on, "updated period");
    Ok(Period {
        code: code.to_string(),
        starts_on,
        ends_on,
    })
}
