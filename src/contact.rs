//! Public contact form submission.

use rusqlite::Connection;

use crate::email::{self, Mailer};
use crate::models::message::Message;
use crate::models::settings::MailSettings;
use crate::security::BotCheck;

pub const VERIFICATION_FAILED: &str = "Verification failed. Please try again.";
pub const FIELDS_REQUIRED: &str = "All fields are required.";
pub const SAVE_FAILED: &str = "Your message could not be saved. Please try again.";
pub const SENT: &str = "Message sent. Thank you!";

#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub message: String,
    pub token: String,
    pub remote_ip: Option<String>,
}

/// Run a submission through bot-check, validation, storage and mail
/// notification, in that order. `Ok` carries the new message id; `Err` the
/// flash text for the visitor.
///
/// Mail failures never surface: once the row is stored the submission
/// counts as sent.
pub fn submit(
    conn: &Connection,
    bot: &dyn BotCheck,
    mailer: &dyn Mailer,
    site_name: &str,
    form: &Submission,
) -> Result<i64, &'static str> {
    if !bot.verify(form.token.trim(), form.remote_ip.as_deref()) {
        return Err(VERIFICATION_FAILED);
    }

    let name = form.name.trim();
    let email = form.email.trim();
    let body = form.message.trim();

    if name.is_empty() || email.is_empty() || body.is_empty() {
        return Err(FIELDS_REQUIRED);
    }

    let id = Message::create(conn, name, email, body).map_err(|e| {
        log::error!("Failed to store contact message: {}", e);
        SAVE_FAILED
    })?;

    let settings = MailSettings::load(conn);
    if let Err(e) = email::notify_contact(mailer, &settings, site_name, name, email, body) {
        log::warn!("[email] Contact notification failed (message {} kept): {}", id, e);
    }

    Ok(id)
}
