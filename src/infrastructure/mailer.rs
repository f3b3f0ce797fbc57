//! SMTP delivery behind the `Mailer` port.
//!
//! Transports are synchronous on purpose: every caller already runs inside
//! `web::block`, next to the diesel work.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::domain::errors::NotificationError;
use crate::domain::ports::Mailer;

pub struct SmtpMailer {
    transport: SmtpTransport,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(
        host: &str,
        port: u16,
        credentials: Option<(String, String)>,
        from_address: &str,
    ) -> Result<Self, NotificationError> {
        let from: Mailbox = from_address
            .parse()
            .map_err(|_| NotificationError::Recipient(from_address.to_string()))?;
        let mut builder = SmtpTransport::starttls_relay(host)
            .map_err(|e| NotificationError::Transport(e.to_string()))?
            .port(port);
        if let Some((username, password)) = credentials {
            builder = builder.credentials(Credentials::new(username, password));
        }
        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotificationError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to
                .parse()
                .map_err(|_| NotificationError::Recipient(to.to_string()))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| NotificationError::Message(e.to_string()))?;
        self.transport
            .send(&message)
            .map_err(|e| NotificationError::Transport(e.to_string()))?;
        Ok(())
    }
}

/// Fallback used when SMTP is not configured: notifications are written to
/// the log instead of delivered. Keeps local development and demo setups
/// working without a mail relay.
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotificationError> {
        log::info!("mail to {to}: {subject}\n{body}");
        Ok(())
    }
}
