//! Database schema definitions

use rusqlite::{Connection, OptionalExtension};
use tracing::info;

use crate::error::Result;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Create tables on first open
pub fn init_schema(conn: &Connection) -> Result<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Creating new database schema v{}", SCHEMA_VERSION);
        conn.execute_batch(REFERENCE_SCHEMA)?;
        conn.execute_batch(BUDGET_SCHEMA)?;
        conn.execute_batch(FUND_REQUEST_SCHEMA)?;
        conn.execute_batch(USERS_SCHEMA)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else {
        info!("Database schema is up to date (v{})", current_version);
    }

    Ok(())
}

/// Current schema version (0 if not initialized)
fn get_schema_version(conn: &Connection) -> Result<i32> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)",
        [],
    )?;

    let version = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| row.get(0))
        .optional()?;

    Ok(version.unwrap_or(0))
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

const REFERENCE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS activities (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    is_active INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS budgets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    periode TEXT NOT NULL,
    is_approved INTEGER NOT NULL DEFAULT 0,
    units_id INTEGER NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS budget_posts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    is_active INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

const BUDGET_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS budget_caps (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    budgets_id INTEGER NOT NULL,
    budget_posts_id INTEGER NOT NULL,
    amount REAL NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS budget_details (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    budgets_id INTEGER NOT NULL,
    activities_id INTEGER NOT NULL,
    description TEXT NOT NULL,
    target TEXT,
    quantity REAL NOT NULL DEFAULT 0,
    unit_value REAL NOT NULL DEFAULT 0,
    total REAL NOT NULL DEFAULT 0,
    terms REAL NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS budget_details_posts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    budget_details_id INTEGER NOT NULL,
    budget_posts_id INTEGER NOT NULL,
    planned_amount REAL NOT NULL,
    approved_amount REAL NOT NULL,
    usage_amount REAL NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS budget_details_posts_recommendations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    budget_details_posts_id INTEGER NOT NULL,
    user_groups_id INTEGER NOT NULL,
    recommendation INTEGER NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_budget_caps_budget ON budget_caps(budgets_id);
CREATE INDEX IF NOT EXISTS idx_budget_details_budget ON budget_details(budgets_id);
CREATE INDEX IF NOT EXISTS idx_budget_details_posts_detail ON budget_details_posts(budget_details_id);
"#;

const FUND_REQUEST_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS fund_requests (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    budget_posts_id INTEGER NOT NULL,
    date TEXT NOT NULL,
    type TEXT NOT NULL,
    amount REAL NOT NULL,
    status TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS fund_request_details (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    fund_requests_id INTEGER NOT NULL,
    activities_id INTEGER NOT NULL,
    budget_details_id INTEGER NOT NULL,
    amount REAL NOT NULL,
    recommendation TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_fund_request_details_request ON fund_request_details(fund_requests_id);
"#;

const USERS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    userid TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL
);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrity::EntityKind;

    #[test]
    fn every_registered_table_exists() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        for kind in EntityKind::ALL {
            let count: i64 = conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", kind.table()), [], |row| row.get(0))
                .unwrap();
            assert_eq!(count, 0, "{}", kind.table());
        }
    }

    #[test]
    fn init_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }
}
