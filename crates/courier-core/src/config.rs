//! Courier configuration system.
//!
//! One TOML file drives both binaries. Every field has a default so a
//! minimal config (SMTP credentials plus recipients) is enough to send.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{CourierError, Result};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CourierConfig {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub variants: VariantsConfig,
    #[serde(default)]
    pub ps: PsConfig,
    #[serde(default)]
    pub qr: QrConfig,
    #[serde(default)]
    pub vcard: VcardConfig,

    /// Directory relative paths resolve against. Set at load time to the
    /// config file's parent; never serialized.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl CourierConfig {
    /// Load config from the default path (~/.courier/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CourierError::Config(format!("Failed to read config: {e}")))?;
        let mut config: Self = toml::from_str(&content)
            .map_err(|e| CourierError::Config(format!("Failed to parse config: {e}")))?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(config)
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the Courier home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".courier")
    }

    /// Resolve a possibly-relative path against the config's base directory.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let p = PathBuf::from(path);
        if p.is_absolute() {
            p
        } else if self.base_dir.as_os_str().is_empty() {
            PathBuf::from(".").join(p)
        } else {
            self.base_dir.join(p)
        }
    }

    /// Absolute path of the queue file.
    pub fn queue_path(&self) -> PathBuf {
        self.resolve(&self.app.queue_file)
    }

    /// Absolute path of the variant rotation state file.
    pub fn state_path(&self) -> PathBuf {
        self.resolve(&self.variants.state_file)
    }

    /// Absolute path of the delivery audit log.
    pub fn log_path(&self) -> PathBuf {
        self.resolve(&self.email.log_file)
    }

    /// Absolute path of the regular-attachments directory.
    pub fn attachments_dir(&self) -> PathBuf {
        self.resolve(&self.email.attachments_dir)
    }
}

/// App-level behavior: run mode, timezone, and the worker's pacing knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub mode: SendMode,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_queue_file")]
    pub queue_file: String,
    /// How often the worker re-reads the queue.
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: u64,
    /// Pause between consecutive dispatches within one tick.
    #[serde(default = "default_rate_limit_seconds")]
    pub rate_limit_seconds: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_seconds")]
    pub retry_delay_seconds: u64,
}

fn default_timezone() -> String {
    "UTC".into()
}
fn default_queue_file() -> String {
    "queue.json".into()
}
fn default_tick_seconds() -> u64 {
    5
}
fn default_rate_limit_seconds() -> u64 {
    15
}
fn default_max_retries() -> u32 {
    2
}
fn default_retry_delay_seconds() -> u64 {
    300
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: SendMode::default(),
            timezone: default_timezone(),
            queue_file: default_queue_file(),
            tick_seconds: default_tick_seconds(),
            rate_limit_seconds: default_rate_limit_seconds(),
            max_retries: default_max_retries(),
            retry_delay_seconds: default_retry_delay_seconds(),
        }
    }
}

/// What the `courier` binary does when invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SendMode {
    /// Send to every recipient right away.
    #[default]
    SendNow,
    /// Only write jobs into the queue; a worker sends them later.
    Schedule,
}

/// SMTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    #[serde(default = "default_smtp_host")]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_true")]
    pub use_tls: bool,
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".into()
}
fn default_smtp_port() -> u16 {
    587
}
fn default_true() -> bool {
    true
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            user: String::new(),
            password: String::new(),
            use_tls: true,
        }
    }
}

/// Message content settings shared by send-now and the enqueue path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: Vec<String>,
    #[serde(default)]
    pub subject: String,
    #[serde(default = "default_body_text")]
    pub body_text: String,
    #[serde(default = "default_html_template")]
    pub html_template: String,
    /// Target instant for schedule mode, "YYYY-MM-DD HH:MM" in app.timezone.
    #[serde(default)]
    pub scheduled_for: String,
    #[serde(default)]
    pub attachments: Vec<String>,
    #[serde(default = "default_attachments_dir")]
    pub attachments_dir: String,
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

fn default_body_text() -> String {
    "This email contains HTML content.".into()
}
fn default_html_template() -> String {
    "template.html".into()
}
fn default_attachments_dir() -> String {
    "attachments".into()
}
fn default_log_file() -> String {
    "sent_emails.log".into()
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            from: String::new(),
            to: Vec::new(),
            subject: String::new(),
            body_text: default_body_text(),
            html_template: default_html_template(),
            scheduled_for: String::new(),
            attachments: Vec::new(),
            attachments_dir: default_attachments_dir(),
            log_file: default_log_file(),
        }
    }
}

impl EmailConfig {
    /// Recipients with surrounding whitespace stripped and empties dropped.
    pub fn recipients(&self) -> Vec<String> {
        self.to
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// Variant (theme) selection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub strategy: VariantStrategy,
    #[serde(default = "default_state_file")]
    pub state_file: String,
    #[serde(default)]
    pub themes: Vec<Theme>,
}

fn default_state_file() -> String {
    "variants_state.json".into()
}

impl Default for VariantsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            strategy: VariantStrategy::default(),
            state_file: default_state_file(),
            themes: Vec::new(),
        }
    }
}

/// How a variant index is chosen for a recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VariantStrategy {
    /// Rotate through the theme list; the cursor persists across runs.
    #[default]
    RoundRobin,
    /// Uniform pick per selection, no persisted state.
    Random,
    /// Stable hash of the recipient address; same address, same theme.
    ByRecipient,
}

/// A named content variant: literal string replacements applied to the HTML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    #[serde(default)]
    pub replace: BTreeMap<String, String>,
}

/// Random postscript appended to outgoing messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_ps_prefix")]
    pub prefix: String,
    #[serde(default)]
    pub phrases: Vec<String>,
    #[serde(default = "default_true")]
    pub add_to_text: bool,
    #[serde(default = "default_true")]
    pub add_to_html: bool,
    #[serde(default = "default_ps_style")]
    pub html_style: String,
}

fn default_ps_prefix() -> String {
    "P.S.:".into()
}
fn default_ps_style() -> String {
    "margin:14px 0 0; padding:12px 12px; border-radius:12px; \
     background:#f8fafc; border:1px solid #e2e8f0; \
     color:#334155; font-size:11px; line-height:16px;"
        .into()
}

impl Default for PsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            prefix: default_ps_prefix(),
            phrases: Vec::new(),
            add_to_text: true,
            add_to_html: true,
            html_style: default_ps_style(),
        }
    }
}

/// QR placeholder settings. The template's `{{QR_SRC}}` marker is replaced
/// with `image_src` when set, otherwise with the plain `url`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct QrConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub image_src: String,
    #[serde(default)]
    pub url: String,
}

/// vCard attachment settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VcardConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub portfolio: String,
    #[serde(default)]
    pub github: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default = "default_vcard_filename")]
    pub filename: String,
}

fn default_vcard_filename() -> String {
    "contact.vcf".into()
}

impl Default for VcardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            full_name: String::new(),
            title: String::new(),
            email: String::new(),
            portfolio: String::new(),
            github: String::new(),
            phone: None,
            location: None,
            filename: default_vcard_filename(),
        }
    }
}
