//! Capturing sender for tests

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::EmailSender;
use crate::models::OutgoingEmail;

#[derive(Debug, Clone)]
enum Outcome {
    Deliver,
    Reject,
    Fail(String),
}

/// Records every message it is asked to send.
pub struct MockSender {
    sent_emails: Arc<Mutex<Vec<OutgoingEmail>>>,
    outcome: Outcome,
}

impl MockSender {
    /// Accepts every message
    pub fn new() -> Self {
        Self::with_outcome(Outcome::Deliver)
    }

    /// Returns `Ok(false)` for every message
    pub fn rejecting() -> Self {
        Self::with_outcome(Outcome::Reject)
    }

    /// Fails every send with a transport error carrying `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_outcome(Outcome::Fail(message.into()))
    }

    fn with_outcome(outcome: Outcome) -> Self {
        Self {
            sent_emails: Arc::new(Mutex::new(Vec::new())),
            outcome,
        }
    }

    /// Every message passed to `send`, including refused ones
    pub async fn sent_emails(&self) -> Vec<OutgoingEmail> {
        self.sent_emails.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent_emails.lock().await.len()
    }

    pub async fn was_sent_to(&self, recipient: &str) -> bool {
        self.sent_emails
            .lock()
            .await
            .iter()
            .any(|e| e.recipient == recipient)
    }
}

impl Default for MockSender {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmailSender for MockSender {
    async fn send(&self, email: &OutgoingEmail) -> eyre::Result<bool> {
        self.sent_emails.lock().await.push(email.clone());

        match &self.outcome {
            Outcome::Deliver => Ok(true),
            Outcome::Reject => Ok(false),
            Outcome::Fail(message) => Err(eyre::eyre!(message.clone())),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(to: &str) -> OutgoingEmail {
        OutgoingEmail {
            recipient: to.to_string(),
            subject: "Test".to_string(),
            body: "Body".to_string(),
            html_body: None,
        }
    }

    #[tokio::test]
    async fn test_mock_sender_captures() {
        let sender = MockSender::new();
        assert!(sender.send(&email("user@example.com")).await.unwrap());

        assert_eq!(sender.sent_count().await, 1);
        assert!(sender.was_sent_to("user@example.com").await);
        assert!(!sender.was_sent_to("other@example.com").await);
    }

    #[tokio::test]
    async fn test_mock_sender_rejects() {
        let sender = MockSender::rejecting();
        assert!(!sender.send(&email("user@example.com")).await.unwrap());
        assert_eq!(sender.sent_count().await, 1);
    }

    #[tokio::test]
    async fn test_mock_sender_fails() {
        let sender = MockSender::failing("Simulated failure");
        let result = sender.send(&email("user@example.com")).await;
        assert!(result.unwrap_err().to_string().contains("Simulated failure"));
    }
}
