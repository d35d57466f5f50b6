use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Keys edited from the dashboard's mail settings form.
///
/// Values are stored as plain text, including `mail_password`.
pub const MAIL_KEYS: [&str; 5] = [
    "recipient_email",
    "mail_server",
    "mail_port",
    "mail_username",
    "mail_password",
];

pub const DEFAULT_MAIL_PORT: u16 = 587;

#[derive(Debug, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
}

impl Setting {
    pub fn get(conn: &Connection, key: &str) -> Option<String> {
        conn.query_row(
            "SELECT value FROM setting WHERE key = ?1",
            params![key],
            |row| row.get::<_, Option<String>>(0),
        )
        .ok()
        .map(|v| v.unwrap_or_default())
    }

    pub fn get_or(conn: &Connection, key: &str, default: &str) -> String {
        Self::get(conn, key).unwrap_or_else(|| default.to_string())
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<(), String> {
        conn.execute(
            "INSERT INTO setting (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    pub fn set_many(conn: &Connection, settings: &HashMap<String, String>) -> Result<(), String> {
        for (key, value) in settings {
            Self::set(conn, key, value)?;
        }
        Ok(())
    }

    /// The mail settings as a map, each key falling back to "" when unset.
    pub fn mail_group(conn: &Connection) -> HashMap<String, String> {
        MAIL_KEYS
            .iter()
            .map(|key| (key.to_string(), Self::get_or(conn, key, "")))
            .collect()
    }
}

/// Outbound mail configuration, read from the settings table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailSettings {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub recipient: String,
}

impl MailSettings {
    pub fn load(conn: &Connection) -> Self {
        let port = Setting::get_or(conn, "mail_port", "")
            .trim()
            .parse()
            .unwrap_or(DEFAULT_MAIL_PORT);
        MailSettings {
            server: Setting::get_or(conn, "mail_server", ""),
            port,
            username: Setting::get_or(conn, "mail_username", ""),
            password: Setting::get_or(conn, "mail_password", ""),
            recipient: Setting::get_or(conn, "recipient_email", ""),
        }
    }

    /// Mail is only attempted once credentials and a recipient exist.
    pub fn is_configured(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty() && !self.recipient.is_empty()
    }
}
