//! Data carried across the composer and gateway seams.

/// Everything the composer needs to build one recipient's message.
///
/// Overrides and the variant index come from the job when the worker is
/// driving; the send-now path fills them from config plus a fresh variant
/// selection.
#[derive(Debug, Clone, Default)]
pub struct ComposeRequest {
    pub recipient: String,
    pub subject_override: Option<String>,
    pub template_override: Option<String>,
    pub variant_index: Option<usize>,
}

/// A fully built message, ready for the gateway. Carries bytes, not paths,
/// so delivery needs no filesystem access.
#[derive(Debug, Clone)]
pub struct ComposedEmail {
    pub recipient: String,
    pub subject: String,
    pub body_text: String,
    pub body_html: String,
    pub inline_images: Vec<InlineImage>,
    pub attachments: Vec<FileAttachment>,
    /// Name of the applied theme, for the audit log. Empty when unthemed.
    pub theme_name: String,
    /// Postscript line that was inserted, for the audit log.
    pub ps_line: String,
}

/// An image embedded in the HTML body via a `cid:` reference.
#[derive(Debug, Clone)]
pub struct InlineImage {
    pub cid: String,
    pub filename: String,
    pub mime: String,
    pub data: Vec<u8>,
}

/// A regular (non-inline) file attachment.
#[derive(Debug, Clone)]
pub struct FileAttachment {
    pub filename: String,
    pub mime: String,
    pub data: Vec<u8>,
}
