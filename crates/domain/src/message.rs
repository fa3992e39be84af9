//! Message profiles and outgoing message snapshots.

use mailbridge_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{EmailFormat, Recipient};

/// Character set applied when a profile does not name one.
pub const DEFAULT_CHARSET: &str = "UTF-8";

/// Content transfer encoding applied to every composed message.
pub const DEFAULT_ENCODING: &str = "quoted-printable";

/// Line length at which plain-text bodies are wrapped.
pub const DEFAULT_WORD_WRAP: usize = 75;

/// Default settings for composed messages, registered under a profile name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageProfile {
    /// Character set of the body.
    #[serde(default = "default_charset")]
    pub charset: String,
    /// Envelope sender address.
    #[serde(default)]
    pub sender: String,
    /// Body format setting, resolved with [`EmailFormat::from_setting`].
    #[serde(default = "default_email_format")]
    pub email_format: String,
    /// Name of the transport profile used for delivery.
    #[serde(default = "default_transport")]
    pub transport: String,
    /// Recipients that replace the real ones outside production.
    #[serde(default)]
    pub testing: Vec<String>,
}

fn default_charset() -> String {
    DEFAULT_CHARSET.to_owned()
}

fn default_email_format() -> String {
    "text".to_owned()
}

fn default_transport() -> String {
    "default".to_owned()
}

impl MessageProfile {
    /// Builds a profile from a raw configuration map.
    pub fn from_map(settings: Map<String, Value>) -> AppResult<Self> {
        serde_json::from_value(Value::Object(settings))
            .map_err(|error| AppError::Validation(format!("invalid message profile: {error}")))
    }

    /// Returns the resolved body format.
    #[must_use]
    pub fn format(&self) -> EmailFormat {
        EmailFormat::from_setting(self.email_format.as_str())
    }
}

impl Default for MessageProfile {
    fn default() -> Self {
        Self {
            charset: default_charset(),
            sender: String::new(),
            email_format: default_email_format(),
            transport: default_transport(),
            testing: Vec::new(),
        }
    }
}

/// A custom message header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailHeader {
    /// Header name.
    pub name: String,
    /// Header value.
    pub value: String,
}

impl MailHeader {
    /// Creates a header.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Snapshot of a composed message handed to a transport for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    /// `From` address. Empty when the sender should be used.
    pub from: String,
    /// `From` display name.
    pub from_name: Option<String>,
    /// Envelope sender address.
    pub sender: String,
    /// `To` recipients.
    pub recipients: Vec<Recipient>,
    /// Subject line.
    pub subject: String,
    /// Body content.
    pub body: String,
    /// Body format.
    pub format: EmailFormat,
    /// Body character set.
    pub charset: String,
    /// Content transfer encoding.
    pub encoding: String,
    /// Plain-text wrap width; zero disables wrapping.
    pub word_wrap: usize,
    /// Custom headers in insertion order.
    pub headers: Vec<MailHeader>,
}

impl OutgoingMail {
    /// Returns the address to put in `From`, falling back to the sender.
    #[must_use]
    pub fn from_address(&self) -> &str {
        if self.from.is_empty() {
            self.sender.as_str()
        } else {
            self.from.as_str()
        }
    }

    /// Returns recipient addresses in order.
    #[must_use]
    pub fn recipient_addresses(&self) -> Vec<&str> {
        self.recipients
            .iter()
            .map(|recipient| recipient.address.as_str())
            .collect()
    }

    /// Returns the body as it should be transmitted: plain-text bodies are
    /// wrapped at [`OutgoingMail::word_wrap`], HTML bodies are left intact.
    #[must_use]
    pub fn rendered_body(&self) -> String {
        match self.format {
            EmailFormat::Plain if self.word_wrap > 0 => wrap_text(&self.body, self.word_wrap),
            _ => self.body.clone(),
        }
    }
}

/// Wraps text at word boundaries so no line exceeds `width` characters.
///
/// Existing line breaks are preserved. Words longer than `width` are kept
/// whole on their own line.
#[must_use]
pub fn wrap_text(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_owned();
    }

    let mut wrapped = Vec::new();
    for line in text.split('\n') {
        let (content, terminator) = match line.strip_suffix('\r') {
            Some(content) => (content, "\r"),
            None => (line, ""),
        };
        if content.chars().count() <= width {
            wrapped.push(line.to_owned());
            continue;
        }

        let mut current = String::new();
        let mut current_len = 0;
        for word in content.split(' ') {
            let word_len = word.chars().count();
            if current_len > 0 && current_len + 1 + word_len > width {
                current.push_str(terminator);
                wrapped.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(word);
            current_len += word_len;
        }
        current.push_str(terminator);
        wrapped.push(current);
    }

    wrapped.join("\n")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{MessageProfile, OutgoingMail, wrap_text};
    use crate::{EmailFormat, Recipient};

    fn outgoing(format: EmailFormat, body: &str) -> OutgoingMail {
        OutgoingMail {
            from: String::new(),
            from_name: None,
            sender: "no-reply@x.com".to_owned(),
            recipients: vec![Recipient::new("a@x.com", None)],
            subject: "Hi".to_owned(),
            body: body.to_owned(),
            format,
            charset: "UTF-8".to_owned(),
            encoding: "quoted-printable".to_owned(),
            word_wrap: 10,
            headers: Vec::new(),
        }
    }

    #[test]
    fn profile_applies_defaults() {
        let profile = MessageProfile::from_map(
            json!({ "sender": "no-reply@x.com" })
                .as_object()
                .cloned()
                .unwrap_or_default(),
        )
        .unwrap_or_else(|_| unreachable!());

        assert_eq!(profile.charset, "UTF-8");
        assert_eq!(profile.email_format, "text");
        assert_eq!(profile.transport, "default");
        assert_eq!(profile.format(), EmailFormat::Plain);
        assert!(profile.testing.is_empty());
    }

    #[test]
    fn profile_reads_camel_case_keys() {
        let profile = MessageProfile::from_map(
            json!({
                "charset": "ISO-8859-1",
                "sender": "bounce@x.com",
                "emailFormat": "html",
                "testing": ["qa@x.com"],
            })
            .as_object()
            .cloned()
            .unwrap_or_default(),
        )
        .unwrap_or_else(|_| unreachable!());

        assert_eq!(profile.charset, "ISO-8859-1");
        assert_eq!(profile.format(), EmailFormat::Html);
        assert_eq!(profile.testing, vec!["qa@x.com".to_owned()]);
    }

    #[test]
    fn profile_rejects_wrong_types() {
        let result = MessageProfile::from_map(
            json!({ "charset": 8 }).as_object().cloned().unwrap_or_default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn from_address_falls_back_to_sender() {
        let mut mail = outgoing(EmailFormat::Html, "body");
        assert_eq!(mail.from_address(), "no-reply@x.com");

        mail.from = "a@b.com".to_owned();
        assert_eq!(mail.from_address(), "a@b.com");
    }

    #[test]
    fn only_plain_bodies_are_wrapped() {
        let body = "one two three four";
        assert_eq!(
            outgoing(EmailFormat::Plain, body).rendered_body(),
            "one two\nthree four"
        );
        assert_eq!(outgoing(EmailFormat::Html, body).rendered_body(), body);
    }

    #[test]
    fn wrap_keeps_long_words_and_existing_breaks() {
        assert_eq!(wrap_text("abcdefghijkl xy", 5), "abcdefghijkl\nxy");
        assert_eq!(wrap_text("short\nlines", 5), "short\nlines");
        assert_eq!(wrap_text("unchanged", 0), "unchanged");
    }

    #[test]
    fn wrap_keeps_crlf_line_endings() {
        assert_eq!(wrap_text("a\r\nb", 75), "a\r\nb");
        assert_eq!(wrap_text("aaa bbb\r\nc", 3), "aaa\r\nbbb\r\nc");
    }
}
