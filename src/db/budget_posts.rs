//! Budget posts CRUD

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::entity::{max_length, require_filled, Entity, StatusFlag};
use crate::error::Result;
use crate::integrity::EntityKind;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetPost {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BudgetPostInput {
    pub name: String,
    pub description: String,
    pub is_active: bool,
}

impl Entity for BudgetPost {
    type Input = BudgetPostInput;

    const KIND: EntityKind = EntityKind::BudgetPosts;
    const COLUMNS: &'static str = "id, name, description, is_active, created_at, updated_at";

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            is_active: row.get("is_active")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn validate(input: &BudgetPostInput) -> Result<()> {
        require_filled(&input.name, "name")?;
        max_length(&input.name, "name", 255)?;
        max_length(&input.description, "description", 255)
    }

    fn insert(conn: &Connection, input: &BudgetPostInput) -> Result<i64> {
        conn.execute(
            "INSERT INTO budget_posts (name, description, is_active) VALUES (?1, ?2, ?3)",
            params![input.name, input.description, input.is_active],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update(conn: &Connection, id: i64, input: &BudgetPostInput) -> Result<usize> {
        Ok(conn.execute(
            "UPDATE budget_posts SET name = ?1, description = ?2, is_active = ?3, updated_at = datetime('now') WHERE id = ?4",
            params![input.name, input.description, input.is_active, id],
        )?)
    }
}

impl StatusFlag for BudgetPost {
    const STATUS_COLUMN: &'static str = "is_active";
}
