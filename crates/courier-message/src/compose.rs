//! The message composer — builds one recipient's complete email.
//!
//! Construction order matters and mirrors how the transforms compose:
//! postscript first (so theme replacements also restyle it), then the QR
//! placeholder, then the theme, and only then CID rewriting, which must
//! see the final image sources.

use std::path::PathBuf;

use courier_core::config::Theme;
use courier_core::{
    ComposeRequest, ComposedEmail, CourierConfig, FileAttachment, MessageComposer, Result,
};

use crate::inline;
use crate::template;
use crate::vcard;

/// Config-driven `MessageComposer`. Pure with respect to the queue: it
/// only reads template and attachment files.
pub struct MailComposer {
    config: CourierConfig,
}

impl MailComposer {
    pub fn new(config: CourierConfig) -> Self {
        Self { config }
    }

    fn template_path(&self, request: &ComposeRequest) -> PathBuf {
        let name = request
            .template_override
            .as_deref()
            .unwrap_or(&self.config.email.html_template);
        self.config.resolve(name)
    }

    /// The theme for a captured variant index, if variants are on and the
    /// index is in range. The composer never runs a selection strategy;
    /// the decision always arrives from the caller.
    fn theme_for(&self, request: &ComposeRequest) -> Option<&Theme> {
        if !self.config.variants.enabled {
            return None;
        }
        request
            .variant_index
            .and_then(|i| self.config.variants.themes.get(i))
    }
}

impl MessageComposer for MailComposer {
    fn compose(&self, request: &ComposeRequest) -> Result<ComposedEmail> {
        let ps_line = template::pick_ps(&self.config.ps);
        let theme = self.theme_for(request);

        let template_path = self.template_path(request);
        let html = template::load_template(&template_path)?;
        let template_dir = template_path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let body_text =
            template::apply_ps_to_text(&self.config.email.body_text, ps_line.as_deref(), &self.config.ps);

        let html = template::apply_ps_to_html(&html, ps_line.as_deref(), &self.config.ps);
        let html = template::inject_qr(&html, &self.config.qr);
        let html = template::apply_theme(&html, theme);
        let (body_html, inline_images) = inline::inline_local_images(&html, &template_dir);

        let mut attachments = inline::load_attachments(
            &self.config.attachments_dir(),
            &self.config.email.attachments,
        );
        if self.config.vcard.enabled {
            attachments.push(FileAttachment {
                filename: self.config.vcard.filename.clone(),
                mime: "text/vcard".into(),
                data: vcard::build_vcard(&self.config.vcard),
            });
        }

        let subject = request
            .subject_override
            .clone()
            .unwrap_or_else(|| self.config.email.subject.clone());

        Ok(ComposedEmail {
            recipient: request.recipient.clone(),
            subject,
            body_text,
            body_html,
            inline_images,
            attachments,
            theme_name: theme.map(|t| t.name.clone()).unwrap_or_default(),
            ps_line: ps_line.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::config::{Theme, VariantStrategy};
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(&dir).ok();
        dir
    }

    fn config_in(dir: &PathBuf) -> CourierConfig {
        std::fs::write(
            dir.join("template.html"),
            "<body><h1 style=\"color:#1e3a8a\">Hello</h1></body>",
        )
        .unwrap();
        let mut config = CourierConfig::default();
        config.base_dir = dir.clone();
        config.email.subject = "Default subject".into();
        config.email.body_text = "Plain body.".into();
        config.vcard.enabled = false;
        config.variants.enabled = true;
        config.variants.strategy = VariantStrategy::RoundRobin;
        config.variants.themes = vec![
            Theme { name: "navy".into(), replace: BTreeMap::new() },
            Theme {
                name: "slate".into(),
                replace: BTreeMap::from([("#1e3a8a".to_string(), "#0f172a".to_string())]),
            },
        ];
        config
    }

    fn request(variant_index: Option<usize>) -> ComposeRequest {
        ComposeRequest {
            recipient: "a@x.com".into(),
            subject_override: None,
            template_override: None,
            variant_index,
        }
    }

    #[test]
    fn test_compose_applies_captured_variant() {
        let dir = scratch("courier-compose-variant");
        let composer = MailComposer::new(config_in(&dir));

        let email = composer.compose(&request(Some(1))).unwrap();
        assert_eq!(email.theme_name, "slate");
        assert!(email.body_html.contains("#0f172a"));
        assert!(!email.body_html.contains("#1e3a8a"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_compose_without_variant_is_unthemed() {
        let dir = scratch("courier-compose-unthemed");
        let composer = MailComposer::new(config_in(&dir));

        let email = composer.compose(&request(None)).unwrap();
        assert!(email.theme_name.is_empty());
        assert!(email.body_html.contains("#1e3a8a"));

        // Out-of-range index (theme list may have shrunk since enqueue)
        // also renders the default.
        let email = composer.compose(&request(Some(9))).unwrap();
        assert!(email.theme_name.is_empty());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_subject_override_applies_to_one_message() {
        let dir = scratch("courier-compose-subject");
        let composer = MailComposer::new(config_in(&dir));

        let mut req = request(None);
        req.subject_override = Some("Special".into());
        assert_eq!(composer.compose(&req).unwrap().subject, "Special");
        // The next request without override still gets the default.
        assert_eq!(composer.compose(&request(None)).unwrap().subject, "Default subject");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_template_override_and_missing_template() {
        let dir = scratch("courier-compose-template");
        std::fs::write(dir.join("alt.html"), "<body>ALT</body>").unwrap();
        let composer = MailComposer::new(config_in(&dir));

        let mut req = request(None);
        req.template_override = Some("alt.html".into());
        assert!(composer.compose(&req).unwrap().body_html.contains("ALT"));

        req.template_override = Some("gone.html".into());
        assert!(composer.compose(&req).is_err());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_vcard_attached_when_enabled() {
        let dir = scratch("courier-compose-vcard");
        let mut config = config_in(&dir);
        config.vcard.enabled = true;
        config.vcard.full_name = "Ada".into();
        let composer = MailComposer::new(config);

        let email = composer.compose(&request(None)).unwrap();
        assert_eq!(email.attachments.len(), 1);
        assert_eq!(email.attachments[0].filename, "contact.vcf");
        assert_eq!(email.attachments[0].mime, "text/vcard");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_ps_lands_in_text_and_html() {
        let dir = scratch("courier-compose-ps");
        let mut config = config_in(&dir);
        config.ps.enabled = true;
        config.ps.phrases = vec!["thanks for reading".into()];
        let composer = MailComposer::new(config);

        let email = composer.compose(&request(None)).unwrap();
        assert_eq!(email.ps_line, "P.S.: thanks for reading");
        assert!(email.body_text.ends_with("P.S.: thanks for reading"));
        assert!(email.body_html.contains("P.S.: thanks for reading"));
        std::fs::remove_dir_all(&dir).ok();
    }
}
