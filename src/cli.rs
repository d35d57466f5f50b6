use std::io::{self, BufRead, Write};

use clap::{Parser, Subcommand};
use rusqlite::Connection;

use crate::models::admin::Admin;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Parser)]
#[command(name = "repertoire")]
#[command(about = "Portfolio site for a performing artist: works, events, gallery and contact")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the web server (default)
    Serve,
    /// Create an admin account, prompting for anything not given as a flag
    InitAdmin {
        #[arg(long)]
        username: Option<String>,
        /// Visible in shell history; prefer the prompt
        #[arg(long)]
        password: Option<String>,
    },
}

/// The trimmed username, if it is non-empty and not taken.
pub fn check_username(conn: &Connection, username: &str) -> Result<String, String> {
    let username = username.trim();
    if username.is_empty() {
        return Err("Username cannot be empty.".into());
    }
    if Admin::find_by_username(conn, username).is_some() {
        return Err(format!("User '{}' already exists.", username));
    }
    Ok(username.to_string())
}

/// Validate and insert a new admin. The error is the line to print.
pub fn init_admin(conn: &Connection, username: &str, password: &str) -> Result<i64, String> {
    let username = check_username(conn, username)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {} characters.",
            MIN_PASSWORD_LEN
        ));
    }
    Admin::create(conn, &username, password)
}

/// Print `label` and read one line from stdin, without the line ending.
pub fn prompt(label: &str) -> io::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
