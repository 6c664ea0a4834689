//! SMTP delivery using lettre

use async_trait::async_trait;
use eyre::{Result, WrapErr};
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::time::Duration;

use super::{EmailSender, SmtpConfig, SmtpSecurity};
use crate::models::OutgoingEmail;

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Delivers over SMTP. Never returns `Ok(false)`: server rejections surface
/// as errors.
pub struct SmtpSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpSender {
    /// Builds the transport. No connection is made until the first send.
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let from: Mailbox = format!("{} <{}>", config.from_name, config.from_address)
            .parse()
            .wrap_err("Invalid from address")?;

        let builder = match config.security {
            SmtpSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                    .wrap_err("Failed to create SMTP STARTTLS relay")?
            }
            SmtpSecurity::ImplicitTls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .wrap_err("Failed to create SMTP relay")?,
            // No TLS (for Mailpit/Mailhog)
            SmtpSecurity::Plain => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host),
        };

        let mut builder = builder.port(config.port).timeout(Some(SMTP_TIMEOUT));
        if config.has_credentials() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        tracing::info!(
            host = %config.host,
            port = config.port,
            security = ?config.security,
            "SMTP sender configured"
        );

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn build_message(&self, email: &OutgoingEmail) -> Result<Message> {
        let to: Mailbox = email.recipient.parse().wrap_err("Invalid recipient address")?;

        let builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&email.subject);

        let plain = SinglePart::builder()
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone());

        let message = match &email.html_body {
            Some(html) => builder
                .multipart(
                    MultiPart::alternative().singlepart(plain).singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html.clone()),
                    ),
                )
                .wrap_err("Failed to build multipart message")?,
            None => builder
                .singlepart(plain)
                .wrap_err("Failed to build text message")?,
        };

        Ok(message)
    }
}

#[async_trait]
impl EmailSender for SmtpSender {
    async fn send(&self, email: &OutgoingEmail) -> Result<bool> {
        let message = self.build_message(email)?;

        // lettre turns every negative reply into an error, so a rejected
        // message is reported as `Err` with the server's code and text.
        self.transport
            .send(message)
            .await
            .wrap_err("Failed to send email via SMTP")?;

        tracing::info!(recipient = %email.recipient, subject = %email.subject, "Email sent");
        Ok(true)
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}
