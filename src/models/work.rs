use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::ordering::{self, SortableList};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Work {
    pub id: i64,
    pub title: String,
    pub year: Option<i64>,
    pub duration: Option<String>,
    pub description: Option<String>,
    pub performers: Option<String>,
    pub image_filename: Option<String>,
    pub sort_order: i64,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WorkVideo {
    pub id: i64,
    pub work_id: i64,
    pub title: Option<String>,
    pub video_url: String,
    pub sort_order: i64,
}

/// A work together with its videos, as listed on the public works page.
#[derive(Debug, Serialize, Clone)]
pub struct WorkWithVideos {
    #[serde(flatten)]
    pub work: Work,
    pub videos: Vec<WorkVideo>,
}

/// Editable fields of a work. Empty strings have already been turned into `None`.
#[derive(Debug, Clone, Default)]
pub struct WorkForm {
    pub title: String,
    pub year: Option<i64>,
    pub duration: Option<String>,
    pub description: Option<String>,
    pub performers: Option<String>,
    pub image_filename: Option<String>,
    pub video_urls: Vec<String>,
}

impl Work {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Work {
            id: row.get("id")?,
            title: row.get("title")?,
            year: row.get("year")?,
            duration: row.get("duration")?,
            description: row.get("description")?,
            performers: row.get("performers")?,
            image_filename: row.get("image_filename")?,
            sort_order: row.get::<_, Option<i64>>("sort_order")?.unwrap_or(0),
            created_at: row.get("created_at").ok().flatten(),
        })
    }

    pub fn find_by_id(conn: &Connection, id: i64) -> Option<Self> {
        conn.query_row(
            "SELECT * FROM work WHERE id = ?1",
            params![id],
            Self::from_row,
        )
        .ok()
    }

    pub fn list(conn: &Connection) -> Vec<Self> {
        let mut stmt = match conn.prepare("SELECT * FROM work ORDER BY sort_order, year DESC") {
            Ok(s) => s,
            Err(_) => return vec![],
        };

        stmt.query_map([], Self::from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    pub fn list_with_videos(conn: &Connection) -> Vec<WorkWithVideos> {
        Self::list(conn)
            .into_iter()
            .map(|work| {
                let videos = WorkVideo::for_work(conn, work.id);
                WorkWithVideos { work, videos }
            })
            .collect()
    }

    pub fn create(conn: &Connection, form: &WorkForm) -> Result<i64, String> {
        let sort_order = ordering::next_sort_order(conn, SortableList::Works)?;

        conn.execute(
            "INSERT INTO work (title, year, duration, description, performers, image_filename, sort_order)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                form.title,
                form.year,
                form.duration,
                form.description,
                form.performers,
                form.image_filename,
                sort_order,
            ],
        )
        .map_err(|e| e.to_string())?;

        let id = conn.last_insert_rowid();
        WorkVideo::replace_for_work(conn, id, &form.video_urls)?;
        Ok(id)
    }

    /// Overwrites all fields and replaces the video list. `sort_order` is kept.
    pub fn update(conn: &Connection, id: i64, form: &WorkForm) -> Result<(), String> {
        conn.execute(
            "UPDATE work SET title=?1, year=?2, duration=?3, description=?4, performers=?5,
             image_filename=?6 WHERE id=?7",
            params![
                form.title,
                form.year,
                form.duration,
                form.description,
                form.performers,
                form.image_filename,
                id,
            ],
        )
        .map_err(|e| e.to_string())?;

        WorkVideo::replace_for_work(conn, id, &form.video_urls)
    }

    /// Deletes the row and its videos. The caller owns removing the image file.
    pub fn delete(conn: &Connection, id: i64) -> Result<(), String> {
        conn.execute("DELETE FROM work_video WHERE work_id = ?1", params![id])
            .map_err(|e| e.to_string())?;
        conn.execute("DELETE FROM work WHERE id = ?1", params![id])
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}

impl WorkVideo {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(WorkVideo {
            id: row.get("id")?,
            work_id: row.get("work_id")?,
            title: row.get("title")?,
            video_url: row.get("video_url")?,
            sort_order: row.get::<_, Option<i64>>("sort_order")?.unwrap_or(0),
        })
    }

    pub fn for_work(conn: &Connection, work_id: i64) -> Vec<Self> {
        let mut stmt = match conn
            .prepare("SELECT * FROM work_video WHERE work_id = ?1 ORDER BY sort_order, id")
        {
            Ok(s) => s,
            Err(_) => return vec![],
        };

        stmt.query_map(params![work_id], Self::from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    /// Drops the existing videos and inserts the non-blank URLs in form order.
    /// Position in the submitted list becomes `sort_order`.
    pub fn replace_for_work(conn: &Connection, work_id: i64, urls: &[String]) -> Result<(), String> {
        conn.execute("DELETE FROM work_video WHERE work_id = ?1", params![work_id])
            .map_err(|e| e.to_string())?;

        for (i, url) in urls.iter().enumerate() {
            let url = url.trim();
            if url.is_empty() {
                continue;
            }
            conn.execute(
                "INSERT INTO work_video (work_id, video_url, sort_order) VALUES (?1, ?2, ?3)",
                params![work_id, url, i as i64],
            )
            .map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}
