//! Login accounts

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::Result;

/// User row; `password` holds an argon2 PHC hash
#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub userid: String,
    pub password: String,
}

impl UserRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            userid: row.get("userid")?,
            password: row.get("password")?,
        })
    }
}

pub fn find_by_userid(conn: &Connection, userid: &str) -> Result<Option<UserRow>> {
    Ok(conn
        .query_row(
            "SELECT id, userid, password FROM users WHERE userid = ?1",
            [userid],
            UserRow::from_row,
        )
        .optional()?)
}

/// Insert or replace the password of `userid`; returns the user id
pub fn upsert_user(conn: &Connection, userid: &str, password_hash: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO users (userid, password) VALUES (?1, ?2) \
         ON CONFLICT(userid) DO UPDATE SET password = excluded.password",
        params![userid, password_hash],
    )?;
    let id = conn.query_row("SELECT id FROM users WHERE userid = ?1", [userid], |row| row.get(0))?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::init_schema;

    #[test]
    fn upsert_keeps_id() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let first = upsert_user(&conn, "finance", "hash-1").unwrap();
        let second = upsert_user(&conn, "finance", "hash-2").unwrap();
        assert_eq!(first, second);

        let user = find_by_userid(&conn, "finance").unwrap().unwrap();
        assert_eq!(user.password, "hash-2");
        assert!(find_by_userid(&conn, "nobody").unwrap().is_none());
    }
}
