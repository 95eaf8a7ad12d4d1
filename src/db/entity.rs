//! Entity metadata shared by every table
//!
//! Reads and deletes are generic over [`Entity`]; each entity module only
//! supplies its column list, row mapping, field rules, foreign keys and the
//! insert/update statements.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{BackofficeError, Result};
use crate::integrity::EntityKind;

pub trait Entity: Serialize + Sized + Send + Sync + 'static {
    /// Request body for create and update
    type Input: DeserializeOwned + Send;

    const KIND: EntityKind;

    /// Select list, in the order `from_row` reads it
    const COLUMNS: &'static str;

    fn from_row(row: &Row) -> rusqlite::Result<Self>;

    /// Field-level rules; the first violation wins
    fn validate(input: &Self::Input) -> Result<()>;

    /// Foreign keys this record points at, in the order they are checked
    fn references(_input: &Self::Input) -> Vec<(EntityKind, i64)> {
        Vec::new()
    }

    /// Insert and return the new id
    fn insert(conn: &Connection, input: &Self::Input) -> Result<i64>;

    /// Overwrite row `id`; returns rows affected
    fn update(conn: &Connection, id: i64, input: &Self::Input) -> Result<usize>;
}

/// Entities with a single boolean status column settable on its own
pub trait StatusFlag: Entity {
    const STATUS_COLUMN: &'static str;
}

pub fn list<E: Entity>(conn: &Connection) -> Result<Vec<E>> {
    let sql = format!("SELECT {} FROM {} ORDER BY id", E::COLUMNS, E::KIND.table());
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| E::from_row(row))?;
    Ok(rows.collect::<rusqlite::Result<Vec<E>>>()?)
}

pub fn get<E: Entity>(conn: &Connection, id: i64) -> Result<Option<E>> {
    let sql = format!("SELECT {} FROM {} WHERE id = ?1", E::COLUMNS, E::KIND.table());
    Ok(conn.query_row(&sql, [id], |row| E::from_row(row)).optional()?)
}

pub fn delete<E: Entity>(conn: &Connection, id: i64) -> Result<usize> {
    let sql = format!("DELETE FROM {} WHERE id = ?1", E::KIND.table());
    Ok(conn.execute(&sql, [id])?)
}

pub fn set_status<E: StatusFlag>(conn: &Connection, id: i64, value: bool) -> Result<usize> {
    let sql = format!(
        "UPDATE {} SET {} = ?1, updated_at = datetime('now') WHERE id = ?2",
        E::KIND.table(),
        E::STATUS_COLUMN
    );
    Ok(conn.execute(&sql, params![value, id])?)
}

// ============================================================================
// Field rules
// ============================================================================

pub(crate) fn invalid(message: &str) -> BackofficeError {
    BackofficeError::InvalidInput(message.to_string())
}

pub(crate) fn require_filled(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BackofficeError::InvalidInput(format!("{} must be filled", field)));
    }
    Ok(())
}

pub(crate) fn max_length(value: &str, field: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(BackofficeError::InvalidInput(format!("max length {} {}", field, max)));
    }
    Ok(())
}

pub(crate) fn require_positive(value: f64, field: &str) -> Result<()> {
    if value <= 0.0 || value.is_nan() {
        return Err(BackofficeError::InvalidInput(format!("{} must be greater than 0", field)));
    }
    Ok(())
}

pub(crate) fn require_positive_id(value: i64, field: &str) -> Result<()> {
    if value <= 0 {
        return Err(BackofficeError::InvalidInput(format!("{} must be greater than 0", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_messages() {
        assert_eq!(require_filled(" ", "name").unwrap_err().to_string(), "name must be filled");
        assert_eq!(
            max_length(&"x".repeat(256), "name", 255).unwrap_err().to_string(),
            "max length name 255"
        );
        assert!(max_length(&"é".repeat(255), "name", 255).is_ok());
        assert_eq!(
            require_positive(0.0, "amount").unwrap_err().to_string(),
            "amount must be greater than 0"
        );
        assert!(require_positive(f64::NAN, "amount").is_err());
        assert!(require_positive_id(1, "budget details id").is_ok());
    }
}
