use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use super::{Mailer, OutgoingMail};
use crate::models::settings::MailSettings;

/// STARTTLS SMTP relay using the credentials stored in settings.
pub struct SmtpMailer;

impl Mailer for SmtpMailer {
    fn send(&self, settings: &MailSettings, mail: &OutgoingMail) -> Result<(), String> {
        if settings.server.is_empty() {
            return Err("SMTP server not configured".into());
        }

        let mut builder = Message::builder()
            .from(mail.from.parse().map_err(|e| format!("Invalid from address: {}", e))?)
            .to(mail.to.parse().map_err(|e| format!("Invalid to address: {}", e))?)
            .subject(mail.subject.as_str())
            .header(ContentType::TEXT_PLAIN);

        if let Some(reply_to) = mail.reply_to.as_deref() {
            builder = builder.reply_to(
                reply_to
                    .parse()
                    .map_err(|e| format!("Invalid reply-to address: {}", e))?,
            );
        }

        let email = builder
            .body(mail.body.clone())
            .map_err(|e| format!("Failed to build email: {}", e))?;

        let creds = Credentials::new(settings.username.clone(), settings.password.clone());

        let mailer = SmtpTransport::starttls_relay(&settings.server)
            .map_err(|e| format!("SMTP relay error: {}", e))?
            .port(settings.port)
            .credentials(creds)
            .build();

        mailer.send(&email).map_err(|e| format!("SMTP send error: {}", e))?;
        Ok(())
    }
}
