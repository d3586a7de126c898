//! SMTP mail transport over implicit TLS (lettre).

use async_trait::async_trait;
use lettre::message::{Mailbox, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use platform::config::AppConfig;

use crate::application::ports::Mailer;
use crate::application::render::Notification;
use crate::error::TransportError;

const MAILER_NAME: &str = concat!("domain-tracker/", env!("CARGO_PKG_VERSION"));

pub struct SmtpMailer {
    transport: SmtpTransport,
    from: Mailbox,
    to: Vec<Mailbox>,
}

fn parse_mailbox(raw: &str) -> Result<Mailbox, TransportError> {
    raw.parse()
        .map_err(|e| TransportError(format!("invalid address {raw:?}: {e}")))
}

impl SmtpMailer {
    /// Relay on `smtp_host:smtp_port` with the configured credentials.
    pub fn from_config(config: &AppConfig) -> Result<Self, TransportError> {
        let mut builder = SmtpTransport::relay(&config.smtp_host)
            .map_err(|e| TransportError(format!("invalid SMTP relay: {e}")))?
            .port(config.smtp_port);

        if !config.smtp_user.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.smtp_user.clone(),
                config.smtp_password.clone(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            from: parse_mailbox(&config.from_email)?,
            to: config
                .recipients()
                .map(parse_mailbox)
                .collect::<Result<_, _>>()?,
        })
    }

    pub fn build_message(&self, notification: &Notification) -> Result<Message, TransportError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(notification.subject.as_str())
            .user_agent(MAILER_NAME.to_string());

        for to in &self.to {
            builder = builder.to(to.clone());
        }

        builder
            .header(header::ContentType::TEXT_HTML)
            .body(notification.html_body.clone())
            .map_err(|e| TransportError(format!("failed to build message: {e}")))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, notification: &Notification) -> Result<(), TransportError> {
        let message = self.build_message(notification)?;
        let transport = self.transport.clone();

        // lettre's SmtpTransport is blocking
        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| TransportError(format!("mail task failed: {e}")))?
            .map_err(|e| TransportError(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig::from_json(
            r#"{
                "databaseURL": "postgres://localhost/tracker",
                "initUser": "admin",
                "initPassword": "pw",
                "remindDomainExpDays": 30,
                "to_email": "ops@example.com, billing@example.com",
                "from_email": "tracker@example.com",
                "smtp_host": "smtp.example.com",
                "smtp_port": 465,
                "SMTP_USER": "tracker",
                "SMTP_PASSWORD": "secret"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_message_goes_to_every_recipient() {
        let mailer = SmtpMailer::from_config(&config()).unwrap();
        let message = mailer
            .build_message(&Notification {
                subject: "Domains expiring soon".into(),
                html_body: "<ul><li>example.com</li></ul>".into(),
            })
            .unwrap();

        assert_eq!(message.envelope().to().len(), 2);
        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("Subject: Domains expiring soon"));
        assert!(formatted.contains("Content-Type: text/html"));
        assert!(formatted.contains("From: tracker@example.com"));
    }

    #[test]
    fn test_bad_sender_is_rejected() {
        let mut config = config();
        config.from_email = "not an address".into();
        assert!(SmtpMailer::from_config(&config).is_err());
    }
}
