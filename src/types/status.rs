use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Workshop state of a ticket.
///
/// `Pending` is the only open state; `Repaired` and `Unrepaired` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Pending,
    Repaired,
    Unrepaired,
}

impl TicketStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Repaired => "repaired",
            Self::Unrepaired => "unrepaired",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    pub fn parse(s: &str) -> Option<TicketStatus> {
        match s {
            "pending" => Some(Self::Pending),
            "repaired" => Some(Self::Repaired),
            "unrepaired" => Some(Self::Unrepaired),
            _ => None,
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown ticket status '{s}'"))
    }
}

impl ToSql for TicketStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TicketStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        Self::parse(s).ok_or_else(|| FromSqlError::Other(format!("unknown ticket status '{s}'").into()))
    }
}

/// Status criterion accepted by ticket listings.
///
/// `History` matches every terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Exact(TicketStatus),
    History,
}

impl StatusFilter {
    #[must_use]
    pub fn statuses(self) -> Vec<TicketStatus> {
        match self {
            Self::Exact(status) => vec![status],
            Self::History => vec![TicketStatus::Repaired, TicketStatus::Unrepaired],
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "history" {
            return Ok(Self::History);
        }
        s.parse().map(Self::Exact)
    }
}
