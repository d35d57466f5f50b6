use rusqlite::{params, Connection, Row};
use serde::Serialize;

use crate::auth;

#[derive(Debug, Serialize, Clone)]
pub struct Admin {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl Admin {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Admin {
            id: row.get("id")?,
            username: row.get("username")?,
            password_hash: row.get("password_hash")?,
        })
    }

    pub fn find_by_id(conn: &Connection, id: i64) -> Option<Self> {
        conn.query_row(
            "SELECT id, username, password_hash FROM admin WHERE id = ?1",
            params![id],
            Self::from_row,
        )
        .ok()
    }

    pub fn find_by_username(conn: &Connection, username: &str) -> Option<Self> {
        conn.query_row(
            "SELECT id, username, password_hash FROM admin WHERE username = ?1",
            params![username],
            Self::from_row,
        )
        .ok()
    }

    pub fn create(conn: &Connection, username: &str, password: &str) -> Result<i64, String> {
        let hash = auth::hash_password(password)?;
        Self::create_with_hash(conn, username, &hash)
    }

    pub fn create_with_hash(conn: &Connection, username: &str, hash: &str) -> Result<i64, String> {
        conn.execute(
            "INSERT INTO admin (username, password_hash) VALUES (?1, ?2)",
            params![username, hash],
        )
        .map_err(|e| e.to_string())?;
        Ok(conn.last_insert_rowid())
    }

    pub fn check_password(&self, password: &str) -> bool {
        auth::verify_password(password, &self.password_hash)
    }
}
