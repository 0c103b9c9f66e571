//! SMTP delivery gateway — async lettre transport.
//!
//! Port 587 with TLS enabled gets STARTTLS, port 465 a TLS relay, anything
//! else a plain connection. The network timeout lives here, not in the
//! worker.

use std::time::Duration;

use async_trait::async_trait;
use courier_core::config::SmtpConfig;
use courier_core::{ComposedEmail, CourierConfig, DeliveryGateway};
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, Message, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Async SMTP `DeliveryGateway`.
pub struct SmtpGateway {
    smtp: SmtpConfig,
    from: String,
}

impl SmtpGateway {
    pub fn new(config: &CourierConfig) -> Self {
        Self {
            smtp: config.smtp.clone(),
            from: config.email.from.clone(),
        }
    }

    /// Assemble the RFC 5322 message: text + related HTML (with inline
    /// images) as alternatives, then regular attachments.
    fn build_message(&self, email: &ComposedEmail) -> Result<Message, String> {
        let from: Mailbox = self
            .from
            .parse()
            .map_err(|e| format!("invalid from address '{}': {e}", self.from))?;
        let to: Mailbox = email
            .recipient
            .parse()
            .map_err(|e| format!("invalid recipient '{}': {e}", email.recipient))?;

        let mut related = MultiPart::related().singlepart(
            SinglePart::builder()
                .header(ContentType::TEXT_HTML)
                .body(email.body_html.clone()),
        );
        for image in &email.inline_images {
            related = related.singlepart(
                Attachment::new_inline(image.cid.clone())
                    .body(image.data.clone(), content_type(&image.mime)),
            );
        }

        let alternative = MultiPart::alternative()
            .singlepart(
                SinglePart::builder()
                    .header(ContentType::TEXT_PLAIN)
                    .body(email.body_text.clone()),
            )
            .multipart(related);

        let mut mixed = MultiPart::mixed().multipart(alternative);
        for attachment in &email.attachments {
            mixed = mixed.singlepart(
                Attachment::new(attachment.filename.clone())
                    .body(attachment.data.clone(), content_type(&attachment.mime)),
            );
        }

        Message::builder()
            .from(from)
            .to(to)
            .subject(email.subject.clone())
            .multipart(mixed)
            .map_err(|e| format!("build email: {e}"))
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, String> {
        let credentials = Credentials::new(self.smtp.user.clone(), self.smtp.password.clone());

        let builder = if self.smtp.use_tls && self.smtp.port == 587 {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.smtp.host)
                .map_err(|e| format!("SMTP STARTTLS relay: {e}"))?
        } else if self.smtp.port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.smtp.host)
                .map_err(|e| format!("SMTP TLS relay: {e}"))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.smtp.host)
        };

        Ok(builder
            .port(self.smtp.port)
            .credentials(credentials)
            .timeout(Some(SMTP_TIMEOUT))
            .build())
    }
}

#[async_trait]
impl DeliveryGateway for SmtpGateway {
    async fn deliver(&self, email: &ComposedEmail) -> Result<(), String> {
        let message = self.build_message(email)?;
        let mailer = self.transport()?;
        mailer
            .send(message)
            .await
            .map_err(|e| format!("SMTP send: {e}"))?;
        tracing::info!("📤 Email sent to: {}", email.recipient);
        Ok(())
    }
}

fn content_type(mime: &str) -> ContentType {
    ContentType::parse(mime).unwrap_or(ContentType::TEXT_PLAIN)
}
