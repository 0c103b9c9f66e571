//! Template transforms — pure string operations on the HTML and text body.

use std::path::Path;

use courier_core::config::{PsConfig, QrConfig, Theme};
use courier_core::{CourierError, Result};
use rand::seq::SliceRandom;

/// Marker the template may carry for the QR image source.
pub const QR_MARKER: &str = "{{QR_SRC}}";

/// Marker the template may carry for the postscript line.
pub const PS_MARKER: &str = "{{PS}}";

/// Read the HTML template from disk.
pub fn load_template(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| CourierError::Compose(format!("read template {}: {e}", path.display())))
}

/// Pick one postscript line ("prefix phrase"), or None when the feature is
/// off or no usable phrase is configured.
pub fn pick_ps(ps: &PsConfig) -> Option<String> {
    if !ps.enabled || ps.phrases.is_empty() {
        return None;
    }
    let phrase = ps.phrases.choose(&mut rand::thread_rng())?.trim();
    if phrase.is_empty() {
        return None;
    }
    Some(format!("{} {}", ps.prefix, phrase))
}

/// Append the postscript to the plain-text body.
pub fn apply_ps_to_text(body_text: &str, ps_line: Option<&str>, ps: &PsConfig) -> String {
    match ps_line {
        Some(line) if ps.add_to_text => {
            format!("{}\n\n{}", body_text.trim_end(), line)
        }
        _ => body_text.to_string(),
    }
}

/// Insert the postscript into the HTML: the `{{PS}}` marker wins; without
/// one, a styled paragraph goes in just before `</body>`. No body tag, no
/// change.
pub fn apply_ps_to_html(html: &str, ps_line: Option<&str>, ps: &PsConfig) -> String {
    let line = match ps_line {
        Some(line) if ps.add_to_html => line,
        _ => return html.to_string(),
    };

    if html.contains(PS_MARKER) {
        return html.replace(PS_MARKER, line);
    }

    match html.rfind("</body>") {
        Some(pos) => {
            let paragraph = format!("<p style=\"{}\">{}</p>", ps.html_style, line);
            let mut out = String::with_capacity(html.len() + paragraph.len());
            out.push_str(&html[..pos]);
            out.push_str(&paragraph);
            out.push_str(&html[pos..]);
            out
        }
        None => html.to_string(),
    }
}

/// Fill the QR marker: the configured image source when the feature is on,
/// otherwise the plain URL. Without a marker (or anything to fill it with)
/// the HTML is untouched.
pub fn inject_qr(html: &str, qr: &QrConfig) -> String {
    if !html.contains(QR_MARKER) {
        return html.to_string();
    }
    if qr.enabled && !qr.image_src.is_empty() {
        return html.replace(QR_MARKER, &qr.image_src);
    }
    if !qr.url.is_empty() {
        return html.replace(QR_MARKER, &qr.url);
    }
    html.to_string()
}

/// Apply a theme's literal string replacements. Empty or identity pairs
/// are skipped.
pub fn apply_theme(html: &str, theme: Option<&Theme>) -> String {
    let Some(theme) = theme else {
        return html.to_string();
    };
    let mut out = html.to_string();
    for (from, to) in &theme.replace {
        if from.is_empty() || from == to {
            continue;
        }
        out = out.replace(from.as_str(), to.as_str());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn ps_config(enabled: bool) -> PsConfig {
        PsConfig {
            enabled,
            prefix: "P.S.:".into(),
            phrases: vec!["check the attachment".into()],
            ..PsConfig::default()
        }
    }

    #[test]
    fn test_pick_ps_disabled_or_empty() {
        assert!(pick_ps(&ps_config(false)).is_none());
        let mut ps = ps_config(true);
        ps.phrases.clear();
        assert!(pick_ps(&ps).is_none());
    }

    #[test]
    fn test_pick_ps_formats_with_prefix() {
        let line = pick_ps(&ps_config(true)).unwrap();
        assert_eq!(line, "P.S.: check the attachment");
    }

    #[test]
    fn test_ps_text_appended() {
        let ps = ps_config(true);
        let out = apply_ps_to_text("Hello.\n", Some("P.S.: hi"), &ps);
        assert_eq!(out, "Hello.\n\nP.S.: hi");
        // Feature gate respected.
        let mut off = ps_config(true);
        off.add_to_text = false;
        assert_eq!(apply_ps_to_text("Hello.", Some("P.S.: hi"), &off), "Hello.");
    }

    #[test]
    fn test_ps_html_marker_wins() {
        let ps = ps_config(true);
        let out = apply_ps_to_html("<body><p>{{PS}}</p></body>", Some("P.S.: hi"), &ps);
        assert_eq!(out, "<body><p>P.S.: hi</p></body>");
    }

    #[test]
    fn test_ps_html_inserted_before_body_close() {
        let ps = ps_config(true);
        let out = apply_ps_to_html("<body><p>main</p></body>", Some("P.S.: hi"), &ps);
        assert!(out.contains("P.S.: hi"));
        assert!(out.ends_with("</body>"));
        let ps_pos = out.find("P.S.: hi").unwrap();
        assert!(ps_pos > out.find("main").unwrap());
    }

    #[test]
    fn test_ps_html_without_body_untouched() {
        let ps = ps_config(true);
        assert_eq!(apply_ps_to_html("<p>x</p>", Some("P.S.: hi"), &ps), "<p>x</p>");
    }

    #[test]
    fn test_inject_qr_precedence() {
        let qr = QrConfig {
            enabled: true,
            image_src: "generated/qr.png".into(),
            url: "https://example.com".into(),
        };
        assert_eq!(inject_qr("<img src=\"{{QR_SRC}}\">", &qr), "<img src=\"generated/qr.png\">");

        let disabled = QrConfig {
            enabled: false,
            image_src: "generated/qr.png".into(),
            url: "https://example.com".into(),
        };
        assert_eq!(inject_qr("<img src=\"{{QR_SRC}}\">", &disabled), "<img src=\"https://example.com\">");

        assert_eq!(inject_qr("<p>no marker</p>", &qr), "<p>no marker</p>");
    }

    #[test]
    fn test_apply_theme_replacements() {
        let mut replace = BTreeMap::new();
        replace.insert("#1e3a8a".to_string(), "#0f172a".to_string());
        replace.insert("Hello".to_string(), "Hola".to_string());
        replace.insert(String::new(), "ignored".to_string());
        let theme = Theme { name: "dark".into(), replace };

        let out = apply_theme("<p style=\"color:#1e3a8a\">Hello</p>", Some(&theme));
        assert_eq!(out, "<p style=\"color:#0f172a\">Hola</p>");
        assert_eq!(apply_theme("<p>Hello</p>", None), "<p>Hello</p>");
    }
}
