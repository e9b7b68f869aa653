use rusqlite::types::Value;

use crate::types::{AttributeFilter, PageRequest};

/// Joins shared by device and ticket queries. Expects `d` as the devices alias.
pub(super) const DEVICE_JOINS: &str = "
    JOIN device_types t ON t.id = d.device_type_id
    JOIN locations l ON l.id = d.location_id
    JOIN areas a ON a.id = l.area_id
    JOIN floors f ON f.id = a.floor_id
    JOIN buildings b ON b.id = f.building_id
    LEFT JOIN rooms r ON r.id = l.room_id
    LEFT JOIN brands br ON br.id = d.brand_id
    LEFT JOIN models m ON m.id = d.model_id
    LEFT JOIN operating_systems os ON os.id = d.os_id
    LEFT JOIN ram_sizes ram ON ram.id = d.ram_id
    LEFT JOIN storage_sizes st ON st.id = d.storage_id
    LEFT JOIN processors p ON p.id = d.processor_id";

/// Columns matched by free-text device search.
pub(super) const DEVICE_SEARCH_COLUMNS: &[&str] = &[
    "d.code",
    "d.serial",
    "d.details",
    "t.value",
    "br.value",
    "m.value",
    "os.value",
    "b.name",
    "f.name",
    "a.name",
    "r.name",
    "l.details",
];

/// Accumulates AND-combined conditions with their positional arguments.
#[derive(Debug, Default)]
pub(super) struct WhereClause {
    clauses: Vec<String>,
    args: Vec<Value>,
}

impl WhereClause {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn push(&mut self, clause: impl Into<String>, args: impl IntoIterator<Item = Value>) {
        self.clauses.push(clause.into());
        self.args.extend(args);
    }

    pub(super) fn eq(&mut self, column: &str, value: Option<i64>) {
        if let Some(value) = value {
            self.push(format!("{column} = ?"), [Value::Integer(value)]);
        }
    }

    /// Case-insensitive substring match OR-combined across `columns`.
    pub(super) fn search(&mut self, q: Option<&str>, columns: &[&str]) {
        let Some(q) = q.map(str::trim).filter(|q| !q.is_empty()) else {
            return;
        };
        let pattern = format!("%{q}%");
        let clause = columns
            .iter()
            .map(|c| format!("{c} LIKE ?"))
            .collect::<Vec<_>>()
            .join(" OR ");
        self.push(
            format!("({clause})"),
            columns.iter().map(|_| Value::Text(pattern.clone())),
        );
    }

    pub(super) fn attributes(&mut self, filter: &AttributeFilter) {
        self.eq("d.device_type_id", filter.device_type_id);
        self.eq("d.brand_id", filter.brand_id);
        self.eq("d.model_id", filter.model_id);
        self.eq("d.os_id", filter.os_id);
        self.eq("d.ram_id", filter.ram_id);
        self.eq("d.storage_id", filter.storage_id);
        self.eq("d.processor_id", filter.processor_id);
        self.eq("b.id", filter.building_id);
        self.eq("f.id", filter.floor_id);
        self.eq("a.id", filter.area_id);
        self.eq("l.room_id", filter.room_id);
        self.eq("d.location_id", filter.location_id);
    }

    pub(super) fn sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    pub(super) fn args(&self) -> &[Value] {
        &self.args
    }

    /// Arguments followed by LIMIT and OFFSET for `page`.
    pub(super) fn paged_args(&self, page: PageRequest) -> Vec<Value> {
        let mut args = self.args.clone();
        args.push(Value::Integer(i64::from(page.limit)));
        args.push(Value::Integer(page.offset()));
        args
    }
}
