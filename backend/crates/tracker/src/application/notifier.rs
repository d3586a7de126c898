//! Notifier
//!
//! Hands rendered messages to the mail transport. A failed send is logged
//! and reported to the caller, never raised.

use std::sync::Arc;

use crate::application::ports::Mailer;
use crate::application::render::Notification;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Nothing to send
    Skipped,
    Sent,
    Failed,
}

#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    pub async fn dispatch(&self, notification: Option<Notification>) -> Delivery {
        let Some(notification) = notification else {
            tracing::info!("Nothing to notify, skipping email");
            return Delivery::Skipped;
        };

        match self.mailer.send(&notification).await {
            Ok(()) => {
                tracing::info!(subject = %notification.subject, "Notification sent");
                Delivery::Sent
            }
            Err(e) => {
                tracing::error!(
                    subject = %notification.subject,
                    error = %e,
                    "Failed to send notification"
                );
                Delivery::Failed
            }
        }
    }
}
