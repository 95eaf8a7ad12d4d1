//! Activities CRUD

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::entity::{max_length, require_filled, Entity, StatusFlag};
use crate::error::Result;
use crate::integrity::EntityKind;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Activity {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ActivityInput {
    pub name: String,
    pub description: String,
    pub is_active: bool,
}

impl Entity for Activity {
    type Input = ActivityInput;

    const KIND: EntityKind = EntityKind::Activities;
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

    fn validate(input: &ActivityInput) -> Result<()> {
        require_filled(&input.name, "name")?;
        max_length(&input.name, "name", 255)?;
        max_length(&input.description, "description", 255)
    }

    fn insert(conn: &Connection, input: &ActivityInput) -> Result<i64> {
        conn.execute(
            "INSERT INTO activities (name, description, is_active) VALUES (?1, ?2, ?3)",
            params![input.name, input.description, input.is_active],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update(conn: &Connection, id: i64, input: &ActivityInput) -> Result<usize> {
        Ok(conn.execute(
            "UPDATE activities SET name = ?1, description = ?2, is_active = ?3, updated_at = datetime('now') WHERE id = ?4",
            params![input.name, input.description, input.is_active, id],
        )?)
    }
}

impl StatusFlag for Activity {
    const STATUS_COLUMN: &'static str = "is_active";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::entity;
    use crate::db::schema::init_schema;

    #[test]
    fn insert_update_toggle() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let id = Activity::insert(
            &conn,
            &ActivityInput {
                name: "Field survey".into(),
                description: "Q1".into(),
                is_active: true,
            },
        )
        .unwrap();

        let row: Activity = entity::get(&conn, id).unwrap().unwrap();
        assert_eq!(row.name, "Field survey");
        assert!(row.is_active);

        assert_eq!(entity::set_status::<Activity>(&conn, id, false).unwrap(), 1);
        let row: Activity = entity::get(&conn, id).unwrap().unwrap();
        assert!(!row.is_active);

        assert_eq!(entity::set_status::<Activity>(&conn, id + 1, true).unwrap(), 0);
    }

    #[test]
    fn name_rules() {
        let mut input = ActivityInput::default();
        assert_eq!(Activity::validate(&input).unwrap_err().to_string(), "name must be filled");

        input.name = "n".repeat(256);
        assert_eq!(Activity::validate(&input).unwrap_err().to_string(), "max length name 255");

        input.name = "ok".into();
        input.description = "d".repeat(256);
        assert_eq!(
            Activity::validate(&input).unwrap_err().to_string(),
            "max length description 255"
        );
    }
}
