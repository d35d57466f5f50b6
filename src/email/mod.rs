pub mod smtp;

use crate::models::settings::MailSettings;

pub use smtp::SmtpMailer;

/// A plain-text mail ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub body: String,
}

/// Transport for outbound mail. The SMTP implementation is used in
/// production; tests substitute their own.
pub trait Mailer: Send + Sync {
    fn send(&self, settings: &MailSettings, mail: &OutgoingMail) -> Result<(), String>;
}

/// Notification sent to the site owner for a contact form submission.
pub fn contact_notice(
    settings: &MailSettings,
    site_name: &str,
    name: &str,
    email: &str,
    body: &str,
) -> OutgoingMail {
    OutgoingMail {
        from: settings.username.clone(),
        to: settings.recipient.clone(),
        reply_to: Some(email.to_string()),
        subject: format!("[{}] Message from {}", site_name, name),
        body: format!(
            "From: {}\nEmail: {}\n{}\n\n{}",
            name,
            email,
            "─".repeat(40),
            body
        ),
    }
}

/// Best-effort delivery of a contact notice. Returns `Ok(false)` without
/// sending when mail credentials or the recipient are not configured.
pub fn notify_contact(
    mailer: &dyn Mailer,
    settings: &MailSettings,
    site_name: &str,
    name: &str,
    email: &str,
    body: &str,
) -> Result<bool, String> {
    if !settings.is_configured() {
        log::info!("[email] Mail not configured, skipping contact notification");
        return Ok(false);
    }

    let mail = contact_notice(settings, site_name, name, email, body);
    mailer.send(settings, &mail)?;
    log::info!("[email] Contact notification sent to {}", mail.to);
    Ok(true)
}
