//! report::message
//!
//! The outgoing mail message.
//!
//! # Header order
//!
//! `From`, `To`, `Cc`, `Bcc`, `Reply-To`, `Subject`, the remaining headers
//! in draft order, then `X-Mailer`, `Date`, `Message-ID` and the MIME
//! headers.
//!
//! Non-ASCII header text is written as RFC 2047 `Q` encoded words. In
//! address headers only the display names are encoded. Multi-line header
//! values are folded with a leading space on each continuation line.
//!
//! # Attachments
//!
//! A message without attachments is a single `text/plain` part. With
//! attachments it becomes `multipart/mixed`: the report text first, then
//! one base64 part per file.

use std::fs;
use std::io;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, FixedOffset, Local};
use uuid::Uuid;

use crate::core::normalize::{Header, NormalizedReport};

/// Value of the `X-Mailer` header.
pub const MAILER: &str = concat!("bugsmith ", env!("CARGO_PKG_VERSION"));

/// Longest encoded word allowed by RFC 2047.
const MAX_ENCODED_WORD: usize = 75;

const ADDRESS_HEADERS: &[&str] = &["From", "To", "Cc", "Bcc", "Reply-To"];

/// Line length of base64 attachment data.
const BASE64_LINE: usize = 76;

/// A file sent along with the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl Attachment {
    /// UTF-8 text without NUL bytes is `text/plain`, anything else
    /// `application/octet-stream`.
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        let content_type = match std::str::from_utf8(&data) {
            Ok(text) if !text.contains('\0') => "text/plain; charset=\"utf-8\"",
            _ => "application/octet-stream",
        };
        Self {
            filename: filename.into(),
            content_type: content_type.to_string(),
            data,
        }
    }

    /// Read a file, naming the attachment after its last path component.
    pub fn read(path: &Path) -> io::Result<Self> {
        let data = fs::read(path)?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        Ok(Self::new(filename, data))
    }

    fn render_part(&self, out: &mut String) {
        let filename: String = self
            .filename
            .chars()
            .map(|c| if c == '"' || c == '\\' || c.is_control() { '_' } else { c })
            .collect();
        let filename = encode_text(&filename);
        out.push_str(&format!("Content-Type: {}; name=\"{}\"\n", self.content_type, filename));
        out.push_str(&format!("Content-Disposition: attachment; filename=\"{}\"\n", filename));
        out.push_str("Content-Transfer-Encoding: base64\n\n");
        let encoded = BASE64.encode(&self.data);
        for line in encoded.as_bytes().chunks(BASE64_LINE) {
            out.push_str(&String::from_utf8_lossy(line));
            out.push('\n');
        }
    }
}

/// Addressing and identity for a message, before the draft is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageParts {
    pub from: Option<String>,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub reply_to: Option<String>,
    /// Subject used when the draft has none
    pub subject: String,
}

/// A complete message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub from: Option<String>,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub reply_to: Option<String>,
    pub subject: String,
    /// Other headers, in order
    pub headers: Vec<Header>,
    /// RFC 2822 date
    pub date: String,
    pub message_id: String,
    /// Pseudo-header block, blank line, body
    pub body: String,
    pub attachments: Vec<Attachment>,
}

fn split_addresses(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn push_unique(list: &mut Vec<String>, address: String) {
    if !list.iter().any(|a| a.eq_ignore_ascii_case(&address)) {
        list.push(address);
    }
}

impl OutgoingMessage {
    /// Combine addressing with a normalized report.
    ///
    /// Draft `Subject`, `From` and `Reply-To` headers replace the given
    /// ones; draft `To`, `Cc` and `Bcc` headers add recipients. All other
    /// draft headers are carried over in order.
    pub fn assemble(parts: MessageParts, report: &NormalizedReport) -> Self {
        Self::assemble_at(parts, report, Local::now().into())
    }

    /// [`OutgoingMessage::assemble`] with a fixed date.
    pub fn assemble_at(parts: MessageParts, report: &NormalizedReport, date: DateTime<FixedOffset>) -> Self {
        let MessageParts {
            mut from,
            mut to,
            mut cc,
            mut bcc,
            mut reply_to,
            mut subject,
        } = parts;
        let mut headers = Vec::new();

        for header in &report.headers {
            let value = header.value.trim();
            match header.name.to_ascii_lowercase().as_str() {
                "subject" => subject = value.to_string(),
                "from" => from = Some(value.to_string()),
                "reply-to" => reply_to = Some(value.to_string()),
                "to" => split_addresses(value).for_each(|a| push_unique(&mut to, a)),
                "cc" => split_addresses(value).for_each(|a| push_unique(&mut cc, a)),
                "bcc" => split_addresses(value).for_each(|a| push_unique(&mut bcc, a)),
                // Generated at render time.
                "date" | "message-id" | "x-mailer" | "mime-version" | "content-type"
                | "content-transfer-encoding" => {}
                _ => headers.push(header.clone()),
            }
        }

        Self {
            message_id: message_id(from.as_deref()),
            from,
            to,
            cc,
            bcc,
            reply_to,
            subject,
            headers,
            date: date.to_rfc2822(),
            body: report.message_body(),
            attachments: Vec::new(),
        }
    }

    /// Every recipient address (To, Cc and Bcc).
    pub fn recipients(&self) -> Vec<&str> {
        self.to
            .iter()
            .chain(&self.cc)
            .chain(&self.bcc)
            .map(String::as_str)
            .collect()
    }

    /// Header lines in order, values unencoded.
    pub fn header_lines(&self) -> Vec<(String, String)> {
        let mut lines = Vec::new();
        if let Some(from) = &self.from {
            lines.push(("From".to_string(), from.clone()));
        }
        for (name, list) in [("To", &self.to), ("Cc", &self.cc), ("Bcc", &self.bcc)] {
            if !list.is_empty() {
                lines.push((name.to_string(), list.join(", ")));
            }
        }
        if let Some(reply_to) = &self.reply_to {
            lines.push(("Reply-To".to_string(), reply_to.clone()));
        }
        lines.push(("Subject".to_string(), self.subject.clone()));
        for header in &self.headers {
            lines.push((header.name.clone(), header.value.clone()));
        }
        lines.push(("X-Mailer".to_string(), MAILER.to_string()));
        lines.push(("Date".to_string(), self.date.clone()));
        lines.push(("Message-ID".to_string(), self.message_id.clone()));
        lines
    }

    /// Render the message as RFC 5322 text with `\n` line endings.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, value) in self.header_lines() {
            let value = if ADDRESS_HEADERS.iter().any(|h| h.eq_ignore_ascii_case(&name)) {
                encode_addresses(&value)
            } else {
                encode_text(&value)
            };
            out.push_str(&name);
            out.push_str(": ");
            out.push_str(&fold(&value));
            out.push('\n');
        }

        out.push_str("MIME-Version: 1.0\n");
        if self.attachments.is_empty() {
            self.render_text_part(&mut out);
            return out;
        }

        let boundary = self.boundary();
        out.push_str(&format!("Content-Type: multipart/mixed; boundary=\"{}\"\n\n", boundary));
        out.push_str("This is a multi-part MIME message.\n\n");
        out.push_str(&format!("--{}\n", boundary));
        self.render_text_part(&mut out);
        if !out.ends_with('\n') {
            out.push('\n');
        }
        for attachment in &self.attachments {
            out.push_str(&format!("--{}\n", boundary));
            attachment.render_part(&mut out);
        }
        out.push_str(&format!("--{}--\n", boundary));
        out
    }

    fn render_text_part(&self, out: &mut String) {
        if self.body.is_ascii() {
            out.push_str("Content-Type: text/plain; charset=\"us-ascii\"\n");
            out.push_str("Content-Transfer-Encoding: 7bit\n");
        } else {
            out.push_str("Content-Type: text/plain; charset=\"utf-8\"\n");
            out.push_str("Content-Transfer-Encoding: 8bit\n");
        }
        out.push('\n');
        out.push_str(&self.body);
    }

    /// Multipart boundary, unique per message.
    fn boundary(&self) -> String {
        let local = self
            .message_id
            .trim_matches(|c| c == '<' || c == '>')
            .split('@')
            .next()
            .unwrap_or_default();
        format!("bugsmith-part-{}", local)
    }
}

fn message_id(from: Option<&str>) -> String {
    let domain = from
        .and_then(|f| f.rsplit('@').next().filter(|_| f.contains('@')))
        .map(|d| d.trim_end_matches('>').trim())
        .filter(|d| !d.is_empty())
        .unwrap_or("bugsmith.invalid");
    format!("<{}@{}>", Uuid::new_v4().simple(), domain)
}

/// Continue multi-line values with a leading space.
fn fold(value: &str) -> String {
    value.split('\n').collect::<Vec<_>>().join("\n ")
}

/// Encode header text as RFC 2047 `Q` encoded words when it is not ASCII.
///
/// # Example
///
/// ```
/// use bugsmith::report::message::encode_text;
///
/// assert_eq!(encode_text("plain"), "plain");
/// assert_eq!(encode_text("Grüße"), "=?utf-8?q?Gr=C3=BC=C3=9Fe?=");
/// ```
pub fn encode_text(value: &str) -> String {
    if value.is_ascii() {
        return value.to_string();
    }

    const PREFIX: &str = "=?utf-8?q?";
    const SUFFIX: &str = "?=";
    let room = MAX_ENCODED_WORD - PREFIX.len() - SUFFIX.len();

    let mut words = Vec::new();
    let mut current = String::new();
    for ch in value.chars() {
        let encoded = q_encode_char(ch);
        if !current.is_empty() && current.len() + encoded.len() > room {
            words.push(format!("{}{}{}", PREFIX, current, SUFFIX));
            current.clear();
        }
        current.push_str(&encoded);
    }
    if !current.is_empty() {
        words.push(format!("{}{}{}", PREFIX, current, SUFFIX));
    }
    words.join("\n")
}

fn q_encode_char(ch: char) -> String {
    match ch {
        ' ' => "_".to_string(),
        c if c.is_ascii_alphanumeric() || "!*+-/".contains(c) => c.to_string(),
        c => {
            let mut buf = [0u8; 4];
            c.encode_utf8(&mut buf)
                .bytes()
                .map(|b| format!("={:02X}", b))
                .collect()
        }
    }
}

/// Encode the display names of a comma-separated address list.
pub fn encode_addresses(value: &str) -> String {
    if value.is_ascii() {
        return value.to_string();
    }
    value
        .split(',')
        .map(|addr| {
            let addr = addr.trim();
            match addr.rfind('<') {
                Some(pos) => {
                    let name = addr[..pos].trim().trim_matches('"');
                    format!("{} {}", encode_text(name), &addr[pos..])
                }
                None => addr.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn report(headers: &[(&str, &str)]) -> NormalizedReport {
        NormalizedReport {
            body: "It broke.\n".into(),
            headers: headers.iter().map(|(n, v)| Header::new(*n, *v)).collect(),
            pseudo_headers: vec!["Package: hello".into(), "Version: 1.0".into()],
        }
    }

    fn date() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 1, 12, 30, 0)
            .unwrap()
    }

    fn parts() -> MessageParts {
        MessageParts {
            from: Some("Jane Doe <jane@example.org>".into()),
            to: vec!["submit@bugs.debian.org".into()],
            subject: "fallback".into(),
            ..Default::default()
        }
    }

    #[test]
    fn draft_subject_wins() {
        let msg = OutgoingMessage::assemble_at(parts(), &report(&[("Subject", "real subject")]), date());
        assert_eq!(msg.subject, "real subject");

        let msg = OutgoingMessage::assemble_at(parts(), &report(&[]), date());
        assert_eq!(msg.subject, "fallback");
    }

    #[test]
    fn draft_recipients_are_added() {
        let msg = OutgoingMessage::assemble_at(
            parts(),
            &report(&[
                ("Cc", "a@example.org, b@example.org"),
                ("X-Debbugs-Foo", "bar"),
                ("Bcc", "c@example.org"),
            ]),
            date(),
        );
        assert_eq!(msg.cc, vec!["a@example.org", "b@example.org"]);
        assert_eq!(msg.headers, vec![Header::new("X-Debbugs-Foo", "bar")]);
        assert_eq!(
            msg.recipients(),
            vec!["submit@bugs.debian.org", "a@example.org", "b@example.org", "c@example.org"]
        );
    }

    #[test]
    fn renders_in_order() {
        let mut msg = OutgoingMessage::assemble_at(
            parts(),
            &report(&[("Subject", "crash"), ("X-Debbugs-Cc", "me@example.org")]),
            date(),
        );
        msg.message_id = "<id@example.org>".into();

        let expected = format!(
            "From: Jane Doe <jane@example.org>\n\
To: submit@bugs.debian.org\n\
Subject: crash\n\
X-Debbugs-Cc: me@example.org\n\
X-Mailer: {}\n\
Date: Fri, 1 Mar 2024 12:30:00 +0100\n\
Message-ID: <id@example.org>\n\
MIME-Version: 1.0\n\
Content-Type: text/plain; charset=\"us-ascii\"\n\
Content-Transfer-Encoding: 7bit\n\
\n\
Package: hello\n\
Version: 1.0\n\
\n\
It broke.\n",
            MAILER
        );
        assert_eq!(msg.render(), expected);
    }

    #[test]
    fn attachments_make_a_multipart_message() {
        let mut msg = OutgoingMessage::assemble_at(parts(), &report(&[("Subject", "crash")]), date());
        msg.message_id = "<id@example.org>".into();
        msg.attachments.push(Attachment::new("core.log", b"hello\n".to_vec()));
        msg.attachments.push(Attachment::new("dump.bin", vec![0, 159, 146, 150]));

        let text = msg.render();

        assert!(text.contains(
            "MIME-Version: 1.0\n\
Content-Type: multipart/mixed; boundary=\"bugsmith-part-id\"\n\
\n\
This is a multi-part MIME message.\n\
\n\
--bugsmith-part-id\n\
Content-Type: text/plain; charset=\"us-ascii\"\n\
Content-Transfer-Encoding: 7bit\n\
\n\
Package: hello\n"
        ));
        assert!(text.contains(
            "It broke.\n\
--bugsmith-part-id\n\
Content-Type: text/plain; charset=\"utf-8\"; name=\"core.log\"\n\
Content-Disposition: attachment; filename=\"core.log\"\n\
Content-Transfer-Encoding: base64\n\
\n\
aGVsbG8K\n"
        ));
        assert!(text.contains("Content-Type: application/octet-stream; name=\"dump.bin\"\n"));
        assert!(text.contains("AJ+Slg==\n"));
        assert!(text.ends_with("--bugsmith-part-id--\n"));
    }

    #[test]
    fn long_attachments_wrap_base64_lines() {
        let mut msg = OutgoingMessage::assemble_at(parts(), &report(&[]), date());
        msg.attachments.push(Attachment::new("big.txt", vec![b'a'; 300]));

        let text = msg.render();
        let data: Vec<&str> = text
            .lines()
            .skip_while(|line| !line.starts_with("Content-Transfer-Encoding: base64"))
            .skip(2)
            .take_while(|line| !line.starts_with("--"))
            .collect();
        assert_eq!(data.len(), 6);
        assert!(data.iter().all(|line| line.len() <= BASE64_LINE));
        assert_eq!(data[0].len(), BASE64_LINE);
    }

    #[test]
    fn attachment_is_read_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("trace.txt");
        fs::write(&path, "frame 0\n").unwrap();

        let attachment = Attachment::read(&path).unwrap();
        assert_eq!(attachment.filename, "trace.txt");
        assert_eq!(attachment.data, b"frame 0\n");
        assert!(attachment.content_type.starts_with("text/plain"));

        assert!(Attachment::read(&dir.path().join("absent")).is_err());
    }

    #[test]
    fn message_id_uses_sender_domain() {
        let msg = OutgoingMessage::assemble_at(parts(), &report(&[]), date());
        assert!(msg.message_id.starts_with('<'));
        assert!(msg.message_id.ends_with("@example.org>"));

        let anonymous = OutgoingMessage::assemble_at(MessageParts::default(), &report(&[]), date());
        assert!(anonymous.message_id.ends_with("@bugsmith.invalid>"));
    }

    #[test]
    fn non_ascii_is_encoded() {
        let mut parts = parts();
        parts.from = Some("José Núñez <jose@example.org>".into());
        let mut rep = report(&[("Subject", "añadir opción")]);
        rep.body = "cañón\n".into();

        let text = OutgoingMessage::assemble_at(parts, &rep, date()).render();

        assert!(text.contains("From: =?utf-8?q?Jos=C3=A9_N=C3=BA=C3=B1ez?= <jose@example.org>\n"));
        assert!(text.contains("Subject: =?utf-8?q?a=C3=B1adir_opci=C3=B3n?=\n"));
        assert!(text.contains("charset=\"utf-8\""));
        assert!(text.contains("Content-Transfer-Encoding: 8bit"));
    }

    #[test]
    fn long_values_split_into_words() {
        let encoded = encode_text(&"é".repeat(40));
        let words: Vec<&str> = encoded.split('\n').collect();
        assert!(words.len() > 1);
        assert!(words.iter().all(|w| w.len() <= MAX_ENCODED_WORD));

        let rendered = fold(&encoded);
        assert!(rendered.contains("?=\n =?utf-8?q?"));
    }

    #[test]
    fn folded_values_get_leading_space() {
        let msg = OutgoingMessage::assemble_at(parts(), &report(&[("X-Long", "one\ntwo")]), date());
        assert!(msg.render().contains("X-Long: one\n two\n"));
    }
}
