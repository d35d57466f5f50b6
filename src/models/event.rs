use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::ordering::{self, SortableList};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub sort_order: i64,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default)]
pub struct EventForm {
    pub title: String,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl Event {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Event {
            id: row.get("id")?,
            title: row.get("title")?,
            date: row.get("date")?,
            time: row.get("time")?,
            location: row.get("location")?,
            description: row.get("description")?,
            sort_order: row.get::<_, Option<i64>>("sort_order")?.unwrap_or(0),
            created_at: row.get("created_at").ok().flatten(),
        })
    }

    pub fn find_by_id(conn: &Connection, id: i64) -> Option<Self> {
        conn.query_row(
            "SELECT * FROM event WHERE id = ?1",
            params![id],
            Self::from_row,
        )
        .ok()
    }

    /// Events in display order; `limit` caps the count (the homepage shows three).
    pub fn list(conn: &Connection, limit: Option<i64>) -> Vec<Self> {
        let mut stmt = match conn
            .prepare("SELECT * FROM event ORDER BY sort_order, date DESC LIMIT ?1")
        {
            Ok(s) => s,
            Err(_) => return vec![],
        };

        // LIMIT -1 means no limit in SQLite
        stmt.query_map(params![limit.unwrap_or(-1)], Self::from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    pub fn create(conn: &Connection, form: &EventForm) -> Result<i64, String> {
        let sort_order = ordering::next_sort_order(conn, SortableList::Events)?;
        conn.execute(
            "INSERT INTO event (title, date, time, location, description, sort_order)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                form.title,
                form.date,
                form.time,
                form.location,
                form.description,
                sort_order,
            ],
        )
        .map_err(|e| e.to_string())?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update(conn: &Connection, id: i64, form: &EventForm) -> Result<(), String> {
        conn.execute(
            "UPDATE event SET title=?1, date=?2, time=?3, location=?4, description=?5 WHERE id=?6",
            params![
                form.title,
                form.date,
                form.time,
                form.location,
                form.description,
                id,
            ],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    pub fn delete(conn: &Connection, id: i64) -> Result<(), String> {
        conn.execute("DELETE FROM event WHERE id = ?1", params![id])
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}
