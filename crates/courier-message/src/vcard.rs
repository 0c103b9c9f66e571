//! vCard 3.0 encoding — lets the recipient save the sender as a contact
//! in one click. CRLF line endings for client compatibility.

use courier_core::config::VcardConfig;

/// Build the vCard bytes from config.
pub fn build_vcard(vcard: &VcardConfig) -> Vec<u8> {
    let mut lines = vec![
        "BEGIN:VCARD".to_string(),
        "VERSION:3.0".to_string(),
        format!("FN:{}", vcard.full_name),
        format!("TITLE:{}", vcard.title),
        format!("EMAIL;TYPE=INTERNET:{}", vcard.email),
        format!("URL:{}", vcard.portfolio),
        format!("X-SOCIALPROFILE;TYPE=github:{}", vcard.github),
    ];
    if let Some(phone) = vcard.phone.as_deref().map(str::trim) {
        if !phone.is_empty() {
            lines.push(format!("TEL;TYPE=CELL:{phone}"));
        }
    }
    if let Some(location) = vcard.location.as_deref().map(str::trim) {
        if !location.is_empty() {
            lines.push(format!("NOTE:Location - {location}"));
        }
    }
    lines.push("END:VCARD".to_string());
    lines.push(String::new());

    lines.join("\r\n").into_bytes()
}
