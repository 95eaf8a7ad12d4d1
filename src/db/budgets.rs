//! Budgets CRUD

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::entity::{invalid, max_length, require_filled, Entity, StatusFlag};
use crate::error::Result;
use crate::integrity::EntityKind;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Budget {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub periode: String,
    pub is_approved: bool,
    /// Organisational unit; units live outside this service
    pub units_id: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BudgetInput {
    pub name: String,
    pub description: String,
    pub periode: String,
    pub is_approved: bool,
    pub units_id: i64,
}

impl Entity for Budget {
    type Input = BudgetInput;

    const KIND: EntityKind = EntityKind::Budgets;
    const COLUMNS: &'static str =
        "id, name, description, periode, is_approved, units_id, created_at, updated_at";

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            periode: row.get("periode")?,
            is_approved: row.get("is_approved")?,
            units_id: row.get("units_id")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn validate(input: &BudgetInput) -> Result<()> {
        require_filled(&input.name, "name")?;
        max_length(&input.name, "name", 255)?;
        max_length(&input.description, "description", 255)?;
        require_filled(&input.periode, "periode")?;
        if input.units_id == 0 {
            return Err(invalid("unitsID must be filled and valid"));
        }
        Ok(())
    }

    fn insert(conn: &Connection, input: &BudgetInput) -> Result<i64> {
        conn.execute(
            "INSERT INTO budgets (name, description, periode, is_approved, units_id) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![input.name, input.description, input.periode, input.is_approved, input.units_id],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update(conn: &Connection, id: i64, input: &BudgetInput) -> Result<usize> {
        Ok(conn.execute(
            "UPDATE budgets SET name = ?1, description = ?2, periode = ?3, is_approved = ?4, units_id = ?5, \
             updated_at = datetime('now') WHERE id = ?6",
            params![input.name, input.description, input.periode, input.is_approved, input.units_id, id],
        )?)
    }
}

impl StatusFlag for Budget {
    const STATUS_COLUMN: &'static str = "is_approved";
}
