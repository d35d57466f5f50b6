use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::ordering::{self, SortableList};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GalleryPhoto {
    pub id: i64,
    pub image_filename: String,
    pub caption: Option<String>,
    pub sort_order: i64,
}

impl GalleryPhoto {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(GalleryPhoto {
            id: row.get("id")?,
            image_filename: row.get("image_filename")?,
            caption: row.get("caption")?,
            sort_order: row.get::<_, Option<i64>>("sort_order")?.unwrap_or(0),
        })
    }

    pub fn find_by_id(conn: &Connection, id: i64) -> Option<Self> {
        conn.query_row(
            "SELECT * FROM gallery WHERE id = ?1",
            params![id],
            Self::from_row,
        )
        .ok()
    }

    pub fn list(conn: &Connection) -> Vec<Self> {
        let mut stmt = match conn.prepare("SELECT * FROM gallery ORDER BY sort_order") {
            Ok(s) => s,
            Err(_) => return vec![],
        };

        stmt.query_map([], Self::from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    pub fn create(conn: &Connection, image_filename: &str, caption: Option<&str>) -> Result<i64, String> {
        let sort_order = ordering::next_sort_order(conn, SortableList::Gallery)?;
        conn.execute(
            "INSERT INTO gallery (image_filename, caption, sort_order) VALUES (?1, ?2, ?3)",
            params![image_filename, caption, sort_order],
        )
        .map_err(|e| e.to_string())?;
        Ok(conn.last_insert_rowid())
    }

    pub fn delete(conn: &Connection, id: i64) -> Result<(), String> {
        conn.execute("DELETE FROM gallery WHERE id = ?1", params![id])
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}
