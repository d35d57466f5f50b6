use std::ops::Deref;
use std::path::Path;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use rocket::State;
use rusqlite::{params, Connection};

pub type DbPool = Pool<SqliteConnectionManager>;

pub fn init_pool(path: &Path) -> Result<DbPool, Box<dyn std::error::Error>> {
    // foreign_keys is per-connection, so every pooled connection gets it
    let manager = SqliteConnectionManager::file(path)
        .with_init(|c| c.execute_batch("PRAGMA foreign_keys=ON;"));
    let pool = Pool::builder().max_size(10).build(manager)?;

    // Enable WAL mode for better concurrent read performance
    let conn = pool.get()?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    Ok(pool)
}

/// One pooled connection, held for the lifetime of a single request and
/// returned to the pool when the guard drops.
pub struct Db(PooledConnection<SqliteConnectionManager>);

impl Deref for Db {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.0
    }
}

impl Db {
    pub fn into_inner(self) -> PooledConnection<SqliteConnectionManager> {
        self.0
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Db {
    type Error = String;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let pool = match request.guard::<&State<DbPool>>().await {
            Outcome::Success(p) => p,
            _ => {
                return Outcome::Error((
                    Status::InternalServerError,
                    "database pool not managed".to_string(),
                ))
            }
        };

        match pool.get() {
            Ok(conn) => Outcome::Success(Db(conn)),
            Err(e) => {
                log::error!("Could not acquire database connection: {}", e);
                Outcome::Error((Status::ServiceUnavailable, e.to_string()))
            }
        }
    }
}

pub fn run_migrations(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        -- Admin credentials
        CREATE TABLE IF NOT EXISTS admin (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT UNIQUE NOT NULL,
            password_hash TEXT NOT NULL
        );

        -- Works (pieces / performances)
        CREATE TABLE IF NOT EXISTS work (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            year INTEGER,
            duration TEXT,
            description TEXT,
            performers TEXT,
            image_filename TEXT,
            sort_order INTEGER DEFAULT 0,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        -- Videos linked to a work
        CREATE TABLE IF NOT EXISTS work_video (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            work_id INTEGER NOT NULL,
            title TEXT,
            video_url TEXT NOT NULL,
            sort_order INTEGER DEFAULT 0,
            FOREIGN KEY (work_id) REFERENCES work(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_work_video_work ON work_video(work_id);

        -- Photo gallery
        CREATE TABLE IF NOT EXISTS gallery (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            image_filename TEXT NOT NULL,
            caption TEXT,
            sort_order INTEGER DEFAULT 0
        );

        -- Contact form submissions
        CREATE TABLE IF NOT EXISTS message (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            body TEXT NOT NULL,
            is_read INTEGER DEFAULT 0,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        -- Settings (key-value)
        CREATE TABLE IF NOT EXISTS setting (
            key TEXT PRIMARY KEY,
            value TEXT
        );

        -- Events
        CREATE TABLE IF NOT EXISTS event (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            date TEXT,
            time TEXT,
            location TEXT,
            description TEXT,
            sort_order INTEGER DEFAULT 0,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
        ",
    )?;

    // Databases created before reordering existed lack sort_order
    for table in ["work", "event"] {
        if !has_column(conn, table, "sort_order")? {
            log::info!("Adding sort_order column to {}", table);
            conn.execute_batch(&format!(
                "ALTER TABLE {} ADD COLUMN sort_order INTEGER DEFAULT 0",
                table
            ))?;
        }
    }

    Ok(())
}

fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool, rusqlite::Error> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names.iter().any(|n| n == column))
}

pub fn seed_defaults(conn: &Connection) -> Result<(), rusqlite::Error> {
    let defaults = [
        ("recipient_email", ""),
        ("mail_server", "smtp.gmail.com"),
        ("mail_port", "587"),
        ("mail_username", ""),
        ("mail_password", ""),
    ];

    for (key, value) in defaults {
        conn.execute(
            "INSERT OR IGNORE INTO setting (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
    }

    Ok(())
}
