//! Immediate dispatch — send-now mode. No queue involved: compose and
//! deliver to every configured recipient right away, recording each
//! outcome in the audit log.

use courier_core::{ComposeRequest, CourierConfig, CourierError, DeliveryGateway, MessageComposer, Result};

use crate::audit::AuditLog;
use crate::schedule;
use crate::variants::{RotationStore, VariantSelector};

/// Outcome counts for one send-now run.
#[derive(Debug, Clone, Copy, Default)]
pub struct SendSummary {
    pub sent: usize,
    pub failed: usize,
}

/// Send to every configured recipient immediately. Per-recipient failures
/// are counted and logged, never fatal to the run.
pub async fn send_now(
    config: &CourierConfig,
    composer: &dyn MessageComposer,
    gateway: &dyn DeliveryGateway,
) -> Result<SendSummary> {
    let recipients = config.email.recipients();
    if recipients.is_empty() {
        return Err(CourierError::Config("no recipients in email.to".into()));
    }

    let selector = VariantSelector::new(
        &config.variants,
        RotationStore::new(&config.state_path()),
    );
    let audit = AuditLog::new(&config.log_path());
    let mut summary = SendSummary::default();

    for recipient in &recipients {
        let variant_index = selector.select(recipient, None);
        let request = ComposeRequest {
            recipient: recipient.clone(),
            subject_override: None,
            template_override: None,
            variant_index,
        };
        let now = schedule::now_in(&config.app.timezone);

        match composer.compose(&request) {
            Ok(email) => match gateway.deliver(&email).await {
                Ok(()) => {
                    tracing::info!("✅ Email sent to {recipient}");
                    let mut detail = String::from("sent");
                    if !email.theme_name.is_empty() {
                        detail.push_str(&format!(" | THEME={}", email.theme_name));
                    }
                    if !email.ps_line.is_empty() {
                        detail.push_str(&format!(" | PS={}", email.ps_line));
                    }
                    audit.record(&now.log_stamp(), recipient, &email.subject, true, &detail);
                    summary.sent += 1;
                }
                Err(description) => {
                    tracing::warn!("⚠️ Sending to {recipient} failed: {description}");
                    audit.record(&now.log_stamp(), recipient, &email.subject, false, &description);
                    summary.failed += 1;
                }
            },
            Err(e) => {
                let description = e.to_string();
                tracing::warn!("⚠️ Compose for {recipient} failed: {description}");
                audit.record(
                    &now.log_stamp(),
                    recipient,
                    &config.email.subject,
                    false,
                    &description,
                );
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}
