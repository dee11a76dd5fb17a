//! mailer::mailto
//!
//! `mailto:` URIs.
//!
//! Every byte outside the unreserved set (`A-Z a-z 0-9 - . _ ~`) is
//! percent-encoded. Line breaks are removed from header values. A URI
//! longer than [`MAX_URI_LENGTH`] gets its body cut in steps of
//! [`TRUNCATE_STEP`] characters, followed by [`TRUNCATION_MARKER`].

use super::{DeliveryError, DeliveryReceipt, Transport};
use crate::report::OutgoingMessage;

/// Longest URI handed to another program; Linux allows 131071 bytes per
/// argument.
pub const MAX_URI_LENGTH: usize = 130_000;

/// Characters removed from the body per truncation step.
pub const TRUNCATE_STEP: usize = 2000;

/// Appended to a truncated body.
pub const TRUNCATION_MARKER: &str = "[ MAILBODY EXCEEDED REASONABLE LENGTH, OUTPUT TRUNCATED ]";

/// Percent-encode everything but unreserved characters.
///
/// # Example
///
/// ```
/// use bugsmith::mailer::mailto::percent_encode;
///
/// assert_eq!(percent_encode("a b@c/ü"), "a%20b%40c%2F%C3%BC");
/// ```
pub fn percent_encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        if is_unreserved(byte) {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~')
}

fn one_line(value: &str) -> String {
    value.lines().collect()
}

/// Build the `mailto:` URI for a message.
pub fn mailto_uri(message: &OutgoingMessage) -> Result<String, DeliveryError> {
    let mut base = format!("mailto:{}?", percent_encode(&one_line(&message.to.join(", "))));

    let params = [
        ("subject", message.subject.clone()),
        ("cc", message.cc.join(", ")),
        ("bcc", message.bcc.join(", ")),
    ];
    for (name, value) in params {
        if !value.is_empty() {
            base.push_str(&format!("{}={}&", name, percent_encode(&one_line(&value))));
        }
    }

    let body = message.body.as_str();
    if body.is_empty() {
        return Ok(base.trim_end_matches(['?', '&']).to_string());
    }

    let body_param = format!("{}body=", base);
    let full = percent_encode(body);
    if body_param.len() + full.len() <= MAX_URI_LENGTH {
        return Ok(body_param + &full);
    }

    // Encoded length and byte offset after each character.
    let mut cuts = Vec::with_capacity(body.len() + 1);
    cuts.push((0usize, 0usize));
    let mut encoded_len = 0;
    for (offset, ch) in body.char_indices() {
        encoded_len += if ch.is_ascii() && is_unreserved(ch as u8) { 1 } else { 3 * ch.len_utf8() };
        cuts.push((encoded_len, offset + ch.len_utf8()));
    }

    let marker = percent_encode(&format!("\n\n{}", TRUNCATION_MARKER));
    let budget = MAX_URI_LENGTH
        .checked_sub(body_param.len() + marker.len())
        .ok_or(DeliveryError::TooLong)?;

    let mut keep = (cuts.len() - 1).saturating_sub(TRUNCATE_STEP);
    while cuts[keep].0 > budget {
        keep = keep.saturating_sub(TRUNCATE_STEP);
    }
    let end = cuts[keep].1;
    Ok(format!("{}{}{}", body_param, percent_encode(&body[..end]), marker))
}

/// Transport opening the URI with the desktop's default mail handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct MailtoTransport;

impl MailtoTransport {
    pub fn desktop() -> Self {
        Self
    }
}

impl Transport for MailtoTransport {
    fn name(&self) -> &'static str {
        "mailto"
    }

    fn carries_attachments(&self) -> bool {
        false
    }

    fn deliver(&self, message: &OutgoingMessage) -> Result<DeliveryReceipt, DeliveryError> {
        let uri = mailto_uri(message)?;
        open::that(&uri).map_err(|e| DeliveryError::Open(e.to_string()))?;
        Ok(DeliveryReceipt {
            channel: self.name(),
            destination: message.to.join(", "),
            submitted: false,
        })
    }
}
