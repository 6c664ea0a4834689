use async_trait::async_trait;

use super::EmailSender;
use crate::models::OutgoingEmail;

/// Non-production backend: logs the message instead of delivering it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSender;

impl LogSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailSender for LogSender {
    async fn send(&self, email: &OutgoingEmail) -> eyre::Result<bool> {
        tracing::info!(
            recipient = %email.recipient,
            subject = %email.subject,
            body = %email.body,
            has_html = email.html_body.is_some(),
            "Email not delivered (log sender)"
        );
        Ok(true)
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
