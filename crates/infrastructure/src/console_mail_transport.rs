//! Console mail transport for development. Logs messages to tracing output.

use async_trait::async_trait;
use mailbridge_application::MailTransport;
use mailbridge_core::AppResult;
use mailbridge_domain::OutgoingMail;
use tracing::info;

/// Development mail transport that logs messages instead of sending them.
#[derive(Clone)]
pub struct ConsoleMailTransport;

impl ConsoleMailTransport {
    /// Creates a new console mail transport.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleMailTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MailTransport for ConsoleMailTransport {
    async fn deliver(&self, mail: &OutgoingMail) -> AppResult<()> {
        let to = mail.recipient_addresses().join(", ");
        let headers = mail
            .headers
            .iter()
            .map(|header| format!("{}: {}\n", header.name, header.value))
            .collect::<String>();

        info!(
            to = to.as_str(),
            subject = mail.subject.as_str(),
            "--- EMAIL (console) ---\nFrom: {}\nTo: {}\nSubject: {}\nContent-Type: {}; charset={}\n{}\n{}\n--- END EMAIL ---",
            mail.from_address(),
            to,
            mail.subject,
            mail.format.content_type(),
            mail.charset,
            headers,
            mail.rendered_body()
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mailbridge_application::MailTransport;
    use mailbridge_domain::{EmailFormat, OutgoingMail, Recipient};

    use super::ConsoleMailTransport;

    #[tokio::test]
    async fn console_delivery_always_succeeds() {
        let mail = OutgoingMail {
            from: String::new(),
            from_name: None,
            sender: "no-reply@x.com".to_owned(),
            recipients: vec![Recipient::new("a@x.com", None)],
            subject: "Hi".to_owned(),
            body: "Hello".to_owned(),
            format: EmailFormat::Plain,
            charset: "UTF-8".to_owned(),
            encoding: "quoted-printable".to_owned(),
            word_wrap: 75,
            headers: Vec::new(),
        };

        assert!(ConsoleMailTransport::new().deliver(&mail).await.is_ok());
    }
}
