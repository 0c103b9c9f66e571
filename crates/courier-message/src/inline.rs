//! Inline images and file attachments.
//!
//! Local `<img src>` references become `cid:` URIs with the image bytes
//! carried as related parts, so mail clients render them without fetching
//! anything remote. Remote, `cid:` and `data:` sources are left alone.

use std::collections::HashMap;
use std::path::Path;

use courier_core::{FileAttachment, InlineImage};
use regex::Regex;
use uuid::Uuid;

/// Rewrite local image references in the HTML to `cid:` URIs and collect
/// the referenced files. Missing files are warned about and left as-is;
/// a source that appears several times shares one CID.
pub fn inline_local_images(html: &str, base_dir: &Path) -> (String, Vec<InlineImage>) {
    let Ok(img_src) = Regex::new(r#"<img[^>]*\ssrc\s*=\s*["']([^"']+)["']"#) else {
        return (html.to_string(), Vec::new());
    };

    let mut images = Vec::new();
    let mut cids: HashMap<String, String> = HashMap::new();

    for caps in img_src.captures_iter(html) {
        let src = caps[1].to_string();
        if src.starts_with("http://")
            || src.starts_with("https://")
            || src.starts_with("cid:")
            || src.starts_with("data:")
            || cids.contains_key(&src)
        {
            continue;
        }

        let path = {
            let p = Path::new(&src);
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                base_dir.join(p)
            }
        };
        if !path.exists() {
            tracing::warn!("⚠️ Image not found, leaving as is: {src}");
            continue;
        }
        let data = match std::fs::read(&path) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("⚠️ Could not read image {}: {e}", path.display());
                continue;
            }
        };

        let cid = Uuid::new_v4().simple().to_string();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| src.clone());
        tracing::debug!("🖼️ Embedded image {src} as CID {cid}");
        images.push(InlineImage {
            cid: cid.clone(),
            filename,
            mime: mime_for(&path).to_string(),
            data,
        });
        cids.insert(src, cid);
    }

    let mut out = html.to_string();
    for (src, cid) in &cids {
        out = out.replace(&format!("src=\"{src}\""), &format!("src=\"cid:{cid}\""));
        out = out.replace(&format!("src='{src}'"), &format!("src=\"cid:{cid}\""));
    }
    (out, images)
}

/// Resolve the configured regular attachments from the attachments
/// directory. Missing files are warned about and skipped.
pub fn load_attachments(dir: &Path, names: &[String]) -> Vec<FileAttachment> {
    let mut attachments = Vec::new();
    for name in names {
        let path = dir.join(name);
        if !path.exists() {
            tracing::warn!("⚠️ Attachment not found: {}", path.display());
            continue;
        }
        match std::fs::read(&path) {
            Ok(data) => {
                tracing::debug!("📎 Prepared attachment: {name}");
                attachments.push(FileAttachment {
                    filename: name.clone(),
                    mime: mime_for(&path).to_string(),
                    data,
                });
            }
            Err(e) => tracing::warn!("⚠️ Could not read attachment {}: {e}", path.display()),
        }
    }
    attachments
}

/// MIME type from the file extension.
fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        "vcf" => "text/vcard",
        _ => "application/octet-stream",
    }
}
