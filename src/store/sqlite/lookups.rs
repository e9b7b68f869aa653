use rusqlite::{Connection, OptionalExtension, params};

use super::{count, exists, find_or_insert, is_unique_violation};
use crate::error::{Error, Result};
use crate::store::names::normalize_name;
use crate::types::{LookupKind, LookupRef, LookupValue, ModelValue};

pub(super) fn list(conn: &Connection, kind: LookupKind) -> Result<Vec<LookupValue>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, value FROM {} ORDER BY value",
        kind.table()
    ))?;
    let rows = stmt.query_map([], |row| {
        Ok(LookupValue {
            id: row.get(0)?,
            value: row.get(1)?,
        })
    })?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Error::from)
}

pub(super) fn create(conn: &Connection, kind: LookupKind, value: &str) -> Result<LookupValue> {
    let value = normalize_name(value, kind.label())?;
    let sql = format!("INSERT INTO {} (value) VALUES (?1)", kind.table());

    match conn.execute(&sql, params![value]) {
        Ok(_) => Ok(LookupValue {
            id: conn.last_insert_rowid(),
            value,
        }),
        Err(e) if is_unique_violation(&e) => Err(Error::conflict(format!(
            "{kind} '{value}' already exists"
        ))),
        Err(e) => Err(Error::from(e)),
    }
}

pub(super) fn rename(conn: &Connection, kind: LookupKind, id: i64, value: &str) -> Result<LookupValue> {
    let value = normalize_name(value, kind.label())?;
    let sql = format!("UPDATE {} SET value = ?1 WHERE id = ?2", kind.table());

    match conn.execute(&sql, params![value, id]) {
        Ok(0) => Err(Error::not_found(format!("{kind} {id} not found"))),
        Ok(_) => Ok(LookupValue { id, value }),
        Err(e) if is_unique_violation(&e) => Err(Error::conflict(format!(
            "{kind} '{value}' already exists"
        ))),
        Err(e) => Err(Error::from(e)),
    }
}

pub(super) fn delete(conn: &Connection, kind: LookupKind, id: i64) -> Result<()> {
    if !exists(conn, kind.table(), id)? {
        return Err(Error::not_found(format!("{kind} {id} not found")));
    }

    let used_by = count(
        conn,
        &format!("SELECT COUNT(*) FROM devices WHERE {} = ?1", kind.device_column()),
        params![id],
    )?;
    if used_by > 0 {
        return Err(Error::conflict(format!(
            "{kind} {id} is used by {used_by} device(s)"
        )));
    }

    if kind == LookupKind::Brand {
        let models = count(conn, "SELECT COUNT(*) FROM models WHERE brand_id = ?1", params![id])?;
        if models > 0 {
            return Err(Error::conflict(format!(
                "Brand {id} still has {models} model(s)"
            )));
        }
    }

    conn.execute(&format!("DELETE FROM {} WHERE id = ?1", kind.table()), params![id])?;
    Ok(())
}

/// Turns a lookup reference into a row id, creating the value if needed.
pub(super) fn resolve_ref(conn: &Connection, kind: LookupKind, lookup: &LookupRef) -> Result<i64> {
    match lookup {
        LookupRef::Id(id) => {
            if exists(conn, kind.table(), *id)? {
                Ok(*id)
            } else {
                Err(Error::not_found(format!("{kind} {id} not found")))
            }
        }
        LookupRef::Value(value) => {
            let value = normalize_name(value, kind.label())?;
            let (id, _) = find_or_insert(
                conn,
                &format!("SELECT id FROM {} WHERE value = ?1", kind.table()),
                &format!("INSERT INTO {} (value) VALUES (?1)", kind.table()),
                params![value],
            )?;
            Ok(id)
        }
    }
}

pub(super) fn list_models(conn: &Connection, brand_id: Option<i64>) -> Result<Vec<ModelValue>> {
    let mut stmt = conn.prepare(
        "SELECT id, brand_id, value FROM models
         WHERE ?1 IS NULL OR brand_id = ?1
         ORDER BY value",
    )?;
    let rows = stmt.query_map(params![brand_id], |row| {
        Ok(ModelValue {
            id: row.get(0)?,
            brand_id: row.get(1)?,
            value: row.get(2)?,
        })
    })?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Error::from)
}

pub(super) fn create_model(conn: &Connection, brand_id: i64, value: &str) -> Result<ModelValue> {
    let value = normalize_name(value, "Model")?;
    if !exists(conn, LookupKind::Brand.table(), brand_id)? {
        return Err(Error::not_found(format!("Brand {brand_id} not found")));
    }

    match conn.execute(
        "INSERT INTO models (brand_id, value) VALUES (?1, ?2)",
        params![brand_id, value],
    ) {
        Ok(_) => Ok(ModelValue {
            id: conn.last_insert_rowid(),
            brand_id,
            value,
        }),
        Err(e) if is_unique_violation(&e) => Err(Error::conflict(format!(
            "Model '{value}' already exists for brand {brand_id}"
        ))),
        Err(e) => Err(Error::from(e)),
    }
}

pub(super) fn delete_model(conn: &Connection, id: i64) -> Result<()> {
    if !exists(conn, "models", id)? {
        return Err(Error::not_found(format!("Model {id} not found")));
    }

    let used_by = count(conn, "SELECT COUNT(*) FROM devices WHERE model_id = ?1", params![id])?;
    if used_by > 0 {
        return Err(Error::conflict(format!(
            "Model {id} is used by {used_by} device(s)"
        )));
    }

    conn.execute("DELETE FROM models WHERE id = ?1", params![id])?;
    Ok(())
}

/// Resolves a model reference, enforcing that it belongs to `brand_id`.
pub(super) fn resolve_model_ref(
    conn: &Connection,
    brand_id: Option<i64>,
    model: &LookupRef,
) -> Result<i64> {
    let Some(brand_id) = brand_id else {
        return Err(Error::validation("a model requires a brand"));
    };

    match model {
        LookupRef::Id(id) => {
            let owner: Option<i64> = conn
                .query_row(
                    "SELECT brand_id FROM models WHERE id = ?1",
                    params![id],
                    |row| row.get(0),
                )
                .optional()?;
            match owner {
                None => Err(Error::not_found(format!("Model {id} not found"))),
                Some(owner) if owner != brand_id => Err(Error::conflict(format!(
                    "model does not belong to brand: model {id} is registered under brand {owner}"
                ))),
                Some(_) => Ok(*id),
            }
        }
        LookupRef::Value(value) => {
            let value = normalize_name(value, "Model")?;
            let (id, _) = find_or_insert(
                conn,
                "SELECT id FROM models WHERE brand_id = ?1 AND value = ?2",
                "INSERT INTO models (brand_id, value) VALUES (?1, ?2)",
                params![brand_id, value],
            )?;
            Ok(id)
        }
    }
}
