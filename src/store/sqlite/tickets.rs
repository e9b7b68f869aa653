use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};

use super::filter::{DEVICE_JOINS, DEVICE_SEARCH_COLUMNS, WhereClause};
use super::hierarchy::path_from_row;
use super::{TicketPolicy, count, date_column, exists, format_date, is_unique_violation, optional_date_column};
use crate::error::{Error, Result};
use crate::store::names::normalize_optional;
use crate::types::*;

const TICKET_COLUMNS: &str = "tk.id, tk.device_id, tk.status, tk.date_in, tk.date_out, tk.details_in, tk.details_out";

const TICKET_VIEW_COLUMNS: &str = "
    tk.id, tk.device_id, tk.status, tk.date_in, tk.date_out, tk.details_in, tk.details_out,
    d.code, t.value, br.value, m.value, d.serial,
    b.name, f.name, a.name, r.name, l.details";

const TICKET_FROM: &str = "FROM tickets tk JOIN devices d ON d.id = tk.device_id";

fn ticket_from_row(row: &Row<'_>) -> rusqlite::Result<Ticket> {
    Ok(Ticket {
        id: row.get(0)?,
        device_id: row.get(1)?,
        status: row.get(2)?,
        date_in: date_column(row, 3)?,
        date_out: optional_date_column(row, 4)?,
        details_in: row.get(5)?,
        details_out: row.get(6)?,
    })
}

fn ticket_view_from_row(row: &Row<'_>) -> rusqlite::Result<TicketView> {
    Ok(TicketView {
        ticket: ticket_from_row(row)?,
        device_code: row.get(7)?,
        device_type: row.get(8)?,
        brand: row.get(9)?,
        model: row.get(10)?,
        serial: row.get(11)?,
        location_display: path_from_row(row, 12)?.to_string(),
    })
}

fn get(conn: &Connection, id: i64) -> Result<Ticket> {
    conn.query_row(
        &format!("SELECT {TICKET_COLUMNS} FROM tickets tk WHERE tk.id = ?1"),
        params![id],
        ticket_from_row,
    )
    .optional()?
    .ok_or_else(|| Error::not_found(format!("Ticket {id} not found")))
}

fn check_date_in(date_in: NaiveDate, today: NaiveDate) -> Result<()> {
    if date_in > today {
        return Err(Error::validation(format!(
            "date_in {date_in} is in the future (today is {today})"
        )));
    }
    Ok(())
}

fn require_device(conn: &Connection, device_id: i64) -> Result<()> {
    if exists(conn, "devices", device_id)? {
        Ok(())
    } else {
        Err(Error::not_found(format!("Device {device_id} not found")))
    }
}

/// Rejects a pending intake that would duplicate another pending ticket,
/// and under a strict policy any second pending ticket for the device.
/// `skip` excludes the ticket being edited.
fn check_pending(
    conn: &Connection,
    policy: TicketPolicy,
    device_id: i64,
    date_in: NaiveDate,
    details_in: Option<&str>,
    skip: Option<i64>,
) -> Result<()> {
    let skip = skip.unwrap_or(0);

    if policy.one_pending_per_device {
        let pending = count(
            conn,
            "SELECT COUNT(*) FROM tickets WHERE device_id = ?1 AND status = 'pending' AND id != ?2",
            params![device_id, skip],
        )?;
        if pending > 0 {
            return Err(Error::conflict(format!(
                "device {device_id} already has a pending ticket"
            )));
        }
    }

    let duplicates = count(
        conn,
        "SELECT COUNT(*) FROM tickets
         WHERE device_id = ?1 AND status = 'pending' AND date_in = ?2
           AND details_in IS ?3 AND id != ?4",
        params![device_id, format_date(date_in), details_in, skip],
    )?;
    if duplicates > 0 {
        return Err(duplicate_ticket(device_id, TicketStatus::Pending, date_in));
    }
    Ok(())
}

fn duplicate_ticket(device_id: i64, status: TicketStatus, date_in: NaiveDate) -> Error {
    Error::conflict(format!(
        "duplicate ticket: device {device_id} already has an identical {status} ticket from {date_in}"
    ))
}

pub(super) fn open(
    conn: &Connection,
    policy: TicketPolicy,
    device_id: i64,
    date_in: NaiveDate,
    details_in: Option<&str>,
    today: NaiveDate,
) -> Result<Ticket> {
    check_date_in(date_in, today)?;
    require_device(conn, device_id)?;
    let details_in = normalize_optional(details_in);
    check_pending(conn, policy, device_id, date_in, details_in.as_deref(), None)?;

    match conn.execute(
        "INSERT INTO tickets (device_id, status, date_in, details_in) VALUES (?1, ?2, ?3, ?4)",
        params![device_id, TicketStatus::Pending, format_date(date_in), details_in],
    ) {
        Ok(_) => {}
        Err(e) if is_unique_violation(&e) => {
            return Err(duplicate_ticket(device_id, TicketStatus::Pending, date_in));
        }
        Err(e) => return Err(Error::from(e)),
    }

    let id = conn.last_insert_rowid();
    tracing::info!(ticket_id = id, device_id, %date_in, "opened ticket");
    get(conn, id)
}

pub(super) fn close(
    conn: &Connection,
    id: i64,
    status: TicketStatus,
    date_out: NaiveDate,
    details_out: Option<&str>,
) -> Result<Ticket> {
    if !status.is_terminal() {
        return Err(Error::validation("a ticket can only be closed as repaired or unrepaired"));
    }

    let ticket = get(conn, id)?;
    if ticket.status.is_terminal() {
        return Err(Error::validation(format!(
            "ticket {id} is already closed as {}",
            ticket.status
        )));
    }
    if date_out < ticket.date_in {
        return Err(Error::validation(format!(
            "date_out {date_out} is before date_in {}",
            ticket.date_in
        )));
    }

    match conn.execute(
        "UPDATE tickets SET status = ?1, date_out = ?2, details_out = ?3 WHERE id = ?4",
        params![status, format_date(date_out), normalize_optional(details_out), id],
    ) {
        Ok(_) => {}
        Err(e) if is_unique_violation(&e) => {
            return Err(duplicate_ticket(ticket.device_id, status, ticket.date_in));
        }
        Err(e) => return Err(Error::from(e)),
    }
    tracing::info!(ticket_id = id, %status, %date_out, "closed ticket");
    get(conn, id)
}

pub(super) fn edit(
    conn: &Connection,
    policy: TicketPolicy,
    id: i64,
    edit: &TicketEdit,
    today: NaiveDate,
) -> Result<Ticket> {
    let ticket = get(conn, id)?;
    if ticket.status.is_terminal() {
        return Err(Error::validation(format!(
            "ticket {id} is {} and can no longer be edited",
            ticket.status
        )));
    }

    let date_in = edit.date_in.unwrap_or(ticket.date_in);
    check_date_in(date_in, today)?;

    let device_id = edit.device_id.unwrap_or(ticket.device_id);
    if device_id != ticket.device_id {
        require_device(conn, device_id)?;
    }

    let details_in = match edit.details_in.as_deref() {
        Some(details) => normalize_optional(Some(details)),
        None => ticket.details_in,
    };

    check_pending(conn, policy, device_id, date_in, details_in.as_deref(), Some(id))?;

    match conn.execute(
        "UPDATE tickets SET device_id = ?1, date_in = ?2, details_in = ?3 WHERE id = ?4",
        params![device_id, format_date(date_in), details_in, id],
    ) {
        Ok(_) => {}
        Err(e) if is_unique_violation(&e) => {
            return Err(duplicate_ticket(device_id, TicketStatus::Pending, date_in));
        }
        Err(e) => return Err(Error::from(e)),
    }
    get(conn, id)
}

pub(super) fn get_view(conn: &Connection, id: i64) -> Result<Option<TicketView>> {
    conn.query_row(
        &format!("SELECT {TICKET_VIEW_COLUMNS} {TICKET_FROM} {DEVICE_JOINS} WHERE tk.id = ?1"),
        params![id],
        ticket_view_from_row,
    )
    .optional()
    .map_err(Error::from)
}

fn where_clause(filter: &TicketFilter) -> WhereClause {
    let mut clause = WhereClause::new();

    if let Some(status) = filter.status {
        let statuses = status.statuses();
        let placeholders = vec!["?"; statuses.len()].join(", ");
        clause.push(
            format!("tk.status IN ({placeholders})"),
            statuses
                .into_iter()
                .map(|s| Value::Text(s.as_str().to_string())),
        );
    }
    if let Some(from) = filter.date_out_from {
        clause.push("tk.date_out >= ?", [Value::Text(format_date(from))]);
    }
    if let Some(to) = filter.date_out_to {
        clause.push("tk.date_out <= ?", [Value::Text(format_date(to))]);
    }

    let mut columns = DEVICE_SEARCH_COLUMNS.to_vec();
    columns.extend(["tk.details_in", "tk.details_out"]);
    clause.search(filter.q.as_deref(), &columns);

    clause.eq("tk.device_id", filter.device_id);
    clause.attributes(&filter.attributes);
    clause
}

pub(super) fn list(conn: &Connection, filter: &TicketFilter, page: PageRequest) -> Result<Page<TicketView>> {
    let clause = where_clause(filter);
    let where_sql = clause.sql();

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) {TICKET_FROM} {DEVICE_JOINS}{where_sql}"),
        params_from_iter(clause.args()),
        |row| row.get(0),
    )?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {TICKET_VIEW_COLUMNS} {TICKET_FROM} {DEVICE_JOINS}{where_sql}
         ORDER BY tk.id DESC LIMIT ? OFFSET ?"
    ))?;
    let rows = stmt.query_map(params_from_iter(clause.paged_args(page)), ticket_view_from_row)?;
    let items = rows.collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(Page {
        items,
        total,
        page: page.page,
        limit: page.limit,
    })
}

pub(super) fn delete(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn.execute("DELETE FROM tickets WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(Error::not_found(format!("Ticket {id} not found")));
    }
    tracing::info!(ticket_id = id, "deleted ticket");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::SqliteStore;
    use super::super::test_support::{TestStore, store};
    use super::*;
    use crate::store::Store;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn today() -> NaiveDate {
        date("2024-05-20")
    }

    fn device(store: &SqliteStore, device_type: &str, area: &str) -> i64 {
        let location = LocationRef::Path(LocationPath::new("Building 01", "Floor 01", area, None));
        store
            .create_device(&NewDevice::new(device_type, location))
            .unwrap()
            .id
    }

    fn with_device() -> (TestStore, i64) {
        let t = store();
        let id = device(&t.store, "PC", "Area TIC");
        (t, id)
    }

    #[test]
    fn test_open_ticket() {
        let (t, pc) = with_device();
        let ticket = t
            .store
            .open_ticket(pc, date("2024-05-02"), Some(" no power "), today())
            .unwrap();
        assert_eq!(ticket.status, TicketStatus::Pending);
        assert_eq!(ticket.date_in, date("2024-05-02"));
        assert_eq!(ticket.details_in.as_deref(), Some("no power"));
        assert_eq!(ticket.date_out, None);
    }

    #[test]
    fn test_open_rejects_future_and_unknown_device() {
        let (t, pc) = with_device();
        assert!(matches!(
            t.store.open_ticket(pc, date("2024-05-21"), None, today()),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            t.store.open_ticket(999, date("2024-05-01"), None, today()),
            Err(Error::NotFound(_))
        ));
        t.store.open_ticket(pc, today(), None, today()).unwrap();
    }

    #[test]
    fn test_duplicate_pending_ticket_conflicts() {
        let (t, pc) = with_device();
        t.store
            .open_ticket(pc, date("2024-05-02"), Some("no power"), today())
            .unwrap();

        let err = t
            .store
            .open_ticket(pc, date("2024-05-02"), Some("no power"), today())
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));

        // A different description is a distinct intake under the default policy.
        t.store
            .open_ticket(pc, date("2024-05-02"), Some("broken screen"), today())
            .unwrap();
        t.store.open_ticket(pc, date("2024-05-02"), None, today()).unwrap();
        assert!(matches!(
            t.store.open_ticket(pc, date("2024-05-02"), Some("  "), today()),
            Err(Error::Conflict(_))
        ));
    }

    #[test]
    fn test_closing_into_identical_history_conflicts() {
        let (t, pc) = with_device();
        let first = t
            .store
            .open_ticket(pc, date("2024-05-02"), Some("no boot"), today())
            .unwrap();
        t.store
            .close_ticket(first.id, TicketStatus::Repaired, date("2024-05-02"), None)
            .unwrap();

        // A closed ticket does not block a new identical intake.
        let second = t
            .store
            .open_ticket(pc, date("2024-05-02"), Some("no boot"), today())
            .unwrap();
        let err = t
            .store
            .close_ticket(second.id, TicketStatus::Repaired, date("2024-05-03"), None)
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));

        let unchanged = get(&t.store.connection(), second.id).unwrap();
        assert_eq!(unchanged.status, TicketStatus::Pending);
        assert_eq!(unchanged.date_out, None);

        t.store
            .close_ticket(second.id, TicketStatus::Unrepaired, date("2024-05-03"), None)
            .unwrap();
    }

    #[test]
    fn test_strict_policy_allows_one_pending_ticket() {
        let t = store();
        let strict = SqliteStore::new(t.path())
            .unwrap()
            .with_ticket_policy(TicketPolicy {
                one_pending_per_device: true,
                ..Default::default()
            });
        let pc = device(&strict, "PC", "Area TIC");

        let first = strict.open_ticket(pc, date("2024-05-02"), Some("a"), today()).unwrap();
        assert!(matches!(
            strict.open_ticket(pc, date("2024-05-03"), Some("b"), today()),
            Err(Error::Conflict(_))
        ));

        // Editing the only pending ticket does not count against itself.
        strict
            .edit_ticket(
                first.id,
                &TicketEdit {
                    details_in: Some("c".into()),
                    ..Default::default()
                },
                today(),
            )
            .unwrap();

        strict
            .close_ticket(first.id, TicketStatus::Unrepaired, date("2024-05-04"), None)
            .unwrap();
        strict.open_ticket(pc, date("2024-05-05"), Some("b"), today()).unwrap();
    }

    #[test]
    fn test_close_ticket_rules() {
        let (t, pc) = with_device();
        let ticket = t
            .store
            .open_ticket(pc, date("2024-05-10"), None, today())
            .unwrap();

        assert!(matches!(
            t.store
                .close_ticket(ticket.id, TicketStatus::Pending, date("2024-05-11"), None),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            t.store
                .close_ticket(ticket.id, TicketStatus::Repaired, date("2024-05-09"), None),
            Err(Error::Validation(_))
        ));

        let closed = t
            .store
            .close_ticket(ticket.id, TicketStatus::Repaired, date("2024-05-10"), Some("fuse"))
            .unwrap();
        assert_eq!(closed.status, TicketStatus::Repaired);
        assert_eq!(closed.date_out, Some(date("2024-05-10")));
        assert_eq!(closed.details_out.as_deref(), Some("fuse"));

        assert!(matches!(
            t.store
                .close_ticket(ticket.id, TicketStatus::Unrepaired, date("2024-05-12"), None),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            t.store
                .close_ticket(999, TicketStatus::Repaired, date("2024-05-12"), None),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_edit_pending_ticket() {
        let t = store();
        let pc = device(&t.store, "PC", "Area TIC");
        let printer = device(&t.store, "Printer", "Archive");
        let ticket = t
            .store
            .open_ticket(pc, date("2024-05-02"), Some("no power"), today())
            .unwrap();

        let edited = t
            .store
            .edit_ticket(
                ticket.id,
                &TicketEdit {
                    date_in: Some(date("2024-05-01")),
                    device_id: Some(printer),
                    details_in: None,
                },
                today(),
            )
            .unwrap();
        assert_eq!(edited.device_id, printer);
        assert_eq!(edited.date_in, date("2024-05-01"));
        assert_eq!(edited.details_in.as_deref(), Some("no power"));

        assert!(matches!(
            t.store.edit_ticket(
                ticket.id,
                &TicketEdit {
                    date_in: Some(date("2024-06-01")),
                    ..Default::default()
                },
                today(),
            ),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            t.store.edit_ticket(
                ticket.id,
                &TicketEdit {
                    device_id: Some(999),
                    ..Default::default()
                },
                today(),
            ),
            Err(Error::NotFound(_))
        ));

        t.store
            .close_ticket(ticket.id, TicketStatus::Repaired, date("2024-05-03"), None)
            .unwrap();
        assert!(matches!(
            t.store.edit_ticket(ticket.id, &TicketEdit::default(), today()),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_edit_into_duplicate_conflicts() {
        let (t, pc) = with_device();
        t.store
            .open_ticket(pc, date("2024-05-02"), Some("no power"), today())
            .unwrap();
        let other = t
            .store
            .open_ticket(pc, date("2024-05-02"), Some("noise"), today())
            .unwrap();

        let err = t
            .store
            .edit_ticket(
                other.id,
                &TicketEdit {
                    details_in: Some("no power".into()),
                    ..Default::default()
                },
                today(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[test]
    fn test_list_tickets_filters() {
        let t = store();
        let pc = device(&t.store, "PC", "Area TIC");
        let printer = device(&t.store, "Printer", "Archive");

        let a = t.store.open_ticket(pc, date("2024-04-01"), Some("no power"), today()).unwrap();
        let b = t.store.open_ticket(printer, date("2024-04-02"), Some("paper jam"), today()).unwrap();
        t.store.open_ticket(printer, date("2024-05-01"), None, today()).unwrap();
        t.store
            .close_ticket(a.id, TicketStatus::Repaired, date("2024-04-10"), None)
            .unwrap();
        t.store
            .close_ticket(b.id, TicketStatus::Unrepaired, date("2024-04-20"), None)
            .unwrap();

        let list = |filter: TicketFilter| {
            t.store
                .list_tickets(&filter, PageRequest::default())
                .unwrap()
        };

        let all = list(TicketFilter::default());
        assert_eq!(all.total, 3);
        assert_eq!(all.items[0].device_type, "Printer");
        assert_eq!(all.items[0].location_display, "Building 01 > Floor 01 > Archive");

        let pending = list(TicketFilter {
            status: Some(StatusFilter::Exact(TicketStatus::Pending)),
            ..Default::default()
        });
        assert_eq!(pending.total, 1);

        let history = list(TicketFilter {
            status: Some(StatusFilter::History),
            ..Default::default()
        });
        assert_eq!(history.total, 2);

        let ranged = list(TicketFilter {
            status: Some(StatusFilter::History),
            date_out_from: Some(date("2024-04-15")),
            date_out_to: Some(date("2024-04-20")),
            ..Default::default()
        });
        assert_eq!(ranged.total, 1);
        assert_eq!(ranged.items[0].ticket.id, b.id);

        let searched = list(TicketFilter {
            q: Some("jam".into()),
            ..Default::default()
        });
        assert_eq!(searched.total, 1);

        let by_location = list(TicketFilter {
            q: Some("archive".into()),
            ..Default::default()
        });
        assert_eq!(by_location.total, 2);

        let by_device = list(TicketFilter {
            device_id: Some(pc),
            ..Default::default()
        });
        assert_eq!(by_device.total, 1);
        assert_eq!(by_device.items[0].ticket.id, a.id);
    }

    #[test]
    fn test_delete_ticket() {
        let (t, pc) = with_device();
        let ticket = t.store.open_ticket(pc, date("2024-05-02"), None, today()).unwrap();

        assert!(matches!(t.store.delete_device(pc), Err(Error::Conflict(_))));

        t.store.delete_ticket(ticket.id).unwrap();
        assert!(t.store.get_ticket(ticket.id).unwrap().is_none());
        assert!(matches!(t.store.delete_ticket(ticket.id), Err(Error::NotFound(_))));
        t.store.delete_device(pc).unwrap();
    }
}
