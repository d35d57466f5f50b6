use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Message {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub body: String,
    pub is_read: bool,
    pub created_at: Option<NaiveDateTime>,
}

impl Message {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let read_raw: Option<i64> = row.get("is_read")?;
        Ok(Message {
            id: row.get("id")?,
            name: row.get("name")?,
            email: row.get("email")?,
            body: row.get("body")?,
            is_read: read_raw.unwrap_or(0) != 0,
            created_at: row.get("created_at").ok().flatten(),
        })
    }

    pub fn find_by_id(conn: &Connection, id: i64) -> Option<Self> {
        conn.query_row(
            "SELECT * FROM message WHERE id = ?1",
            params![id],
            Self::from_row,
        )
        .ok()
    }

    pub fn list(conn: &Connection) -> Vec<Self> {
        let mut stmt = match conn.prepare("SELECT * FROM message ORDER BY created_at DESC, id DESC") {
            Ok(s) => s,
            Err(_) => return vec![],
        };

        stmt.query_map([], Self::from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    pub fn count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM message", [], |row| row.get(0))
            .unwrap_or(0)
    }

    pub fn count_unread(conn: &Connection) -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM message WHERE is_read = 0",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0)
    }

    /// New messages start unread.
    pub fn create(conn: &Connection, name: &str, email: &str, body: &str) -> Result<i64, String> {
        conn.execute(
            "INSERT INTO message (name, email, body, is_read) VALUES (?1, ?2, ?3, 0)",
            params![name, email, body],
        )
        .map_err(|e| e.to_string())?;
        Ok(conn.last_insert_rowid())
    }

    pub fn mark_read(conn: &Connection, id: i64) -> Result<(), String> {
        conn.execute("UPDATE message SET is_read = 1 WHERE id = ?1", params![id])
            .map_err(|e| e.to_string())?;
        Ok(())
    }

    pub fn delete(conn: &Connection, id: i64) -> Result<(), String> {
        conn.execute("DELETE FROM message WHERE id = ?1", params![id])
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}
