//! Fluent message composition and delivery.

use std::sync::Arc;

use tracing::{info, warn};

use mailbridge_core::{AppError, AppResult};
use mailbridge_domain::{
    DEFAULT_ENCODING, DEFAULT_WORD_WRAP, EmailAddress, EmailFormat, MailHeader, MessageProfile,
    OutgoingMail, Recipient, TransportSettings,
};

use crate::{
    DEFAULT_PROFILE, MailTransport, ProfileRegistry, TransportFactory, TransportProfile,
};

/// Header marking a message whose recipients were replaced for testing.
pub const DEBUG_HEADER: &str = "X-Mailer-Debug";

/// Header carrying the replaced recipients as a JSON array.
pub const ORIGINAL_RECIPIENTS_HEADER: &str = "X-Mailer-Original-Rcpt";

const SMTP_SCHEME: &str = "smtp";

/// A single outgoing message built from the `default` profiles.
///
/// Setters return `&mut Self` so calls can be chained:
///
/// ```ignore
/// let mut message = MessageComposer::from_registry(&registry, &factory)?;
/// message
///     .to("user@example.com", Some("User"))
///     .subject("Welcome")
///     .body("<p>Thanks for signing up.</p>");
/// message.send().await?;
/// ```
pub struct MessageComposer {
    transport: Arc<dyn MailTransport>,
    mailer: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    charset: String,
    encoding: String,
    word_wrap: usize,
    format: EmailFormat,
    sender: String,
    from: String,
    from_name: Option<String>,
    recipients: Vec<Recipient>,
    subject: String,
    body: String,
    headers: Vec<MailHeader>,
    testing: Vec<String>,
}

impl MessageComposer {
    /// Creates a message delivered through `transport`.
    ///
    /// Requires a `default` message profile and the transport profile it
    /// names, which supplies host and port for `smtp`.
    pub fn new(registry: &ProfileRegistry, transport: Arc<dyn MailTransport>) -> AppResult<Self> {
        let profile = default_profile(registry)?;
        let transport_profile = named_transport(registry, &profile)?;

        Self::from_profile(&profile, Some(transport_profile.settings()), transport)
    }

    /// Creates a message whose transport comes from the registered profile.
    ///
    /// A prebuilt transport registered as the profile's class is used as-is;
    /// otherwise `factory` builds one from the profile settings.
    pub fn from_registry(
        registry: &ProfileRegistry,
        factory: &dyn TransportFactory,
    ) -> AppResult<Self> {
        let profile = default_profile(registry)?;
        let transport_profile = named_transport(registry, &profile)?;

        let transport = match transport_profile.instance() {
            Some(transport) => transport,
            None => factory.build(transport_profile.settings())?,
        };

        Self::from_profile(&profile, Some(transport_profile.settings()), transport)
    }

    fn from_profile(
        profile: &MessageProfile,
        settings: Option<&TransportSettings>,
        transport: Arc<dyn MailTransport>,
    ) -> AppResult<Self> {
        let mut composer = Self {
            transport,
            mailer: None,
            host: None,
            port: None,
            charset: profile.charset.clone(),
            encoding: DEFAULT_ENCODING.to_owned(),
            word_wrap: DEFAULT_WORD_WRAP,
            format: EmailFormat::Html,
            sender: profile.sender.clone(),
            from: String::new(),
            from_name: None,
            recipients: Vec::new(),
            subject: String::new(),
            body: String::new(),
            headers: Vec::new(),
            testing: profile.testing.clone(),
        };

        if let Some(settings) = settings.filter(|settings| settings.scheme() == Some(SMTP_SCHEME)) {
            composer.mailer = Some(SMTP_SCHEME.to_owned());
            composer.host = settings.host().map(str::to_owned);
            composer.port = settings.port()?;
        }

        composer.email_format(profile.email_format.as_str());

        Ok(composer)
    }

    /// Selects plain text or HTML rendering, see [`EmailFormat::from_setting`].
    pub fn email_format(&mut self, format: &str) -> &mut Self {
        self.format = EmailFormat::from_setting(format);
        self
    }

    /// Replaces the From and Sender identity.
    ///
    /// Fails without touching the message when `email` is empty or malformed.
    pub fn anonymize(&mut self, email: &str, name: Option<&str>) -> AppResult<&mut Self> {
        let address = EmailAddress::new(email)?;

        self.from = address.into();
        self.from_name = name.map(str::to_owned);
        self.sender = self.from.clone();

        Ok(self)
    }

    /// Adds a `To` recipient.
    ///
    /// An address already present, compared case-insensitively, is ignored.
    pub fn to(&mut self, email: &str, name: Option<&str>) -> &mut Self {
        let duplicate = self
            .recipients
            .iter()
            .any(|recipient| recipient.address.eq_ignore_ascii_case(email));

        if !duplicate {
            self.recipients.push(Recipient::new(email, name));
        }
        self
    }

    /// Sets the subject line.
    pub fn subject(&mut self, subject: &str) -> &mut Self {
        self.subject = subject.to_owned();
        self
    }

    /// Sets the body.
    pub fn body(&mut self, content: &str) -> &mut Self {
        self.body = content.to_owned();
        self
    }

    /// Sets the recipients that replace the real ones when sending.
    ///
    /// An empty list turns the override off.
    pub fn testing<I, S>(&mut self, recipients: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.testing = recipients.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a custom header.
    pub fn add_custom_header(&mut self, name: &str, value: &str) -> &mut Self {
        self.headers.push(MailHeader::new(name, value));
        self
    }

    /// Removes all custom headers.
    pub fn clear_custom_headers(&mut self) -> &mut Self {
        self.headers.clear();
        self
    }

    /// Removes every recipient added so far.
    pub fn clear_all_recipients(&mut self) -> &mut Self {
        self.recipients.clear();
        self
    }

    /// Clears recipients, sender identity, subject and body for reuse.
    pub fn reset(&mut self) -> &mut Self {
        self.clear_all_recipients();
        self.from.clear();
        self.from_name = None;
        self.sender.clear();
        self.subject.clear();
        self.body.clear();
        self
    }

    /// Sends the message.
    ///
    /// With a test override configured, the real recipients are recorded in
    /// [`ORIGINAL_RECIPIENTS_HEADER`] and replaced by the override list before
    /// delivery. Each call transmits again.
    pub async fn send(&mut self) -> AppResult<()> {
        if !self.testing.is_empty() {
            self.substitute_test_recipients()?;
        }

        let mail = self.outgoing();
        info!(
            recipients = mail.recipients.len(),
            subject = %mail.subject,
            "sending email"
        );

        self.transport.deliver(&mail).await.inspect_err(|error| {
            warn!(%error, "email delivery failed");
        })
    }

    fn substitute_test_recipients(&mut self) -> AppResult<()> {
        let original = serde_json::to_string(&self.all_recipients()).map_err(|error| {
            AppError::Internal(format!("failed to encode original recipients: {error}"))
        })?;

        self.clear_custom_headers();
        self.add_custom_header(DEBUG_HEADER, "1");
        self.add_custom_header(ORIGINAL_RECIPIENTS_HEADER, original.as_str());

        self.clear_all_recipients();
        for recipient in self.testing.clone() {
            self.to(recipient.as_str(), None);
        }

        info!(
            original = %original,
            replacements = self.testing.len(),
            "replaced recipients with test recipients"
        );

        Ok(())
    }

    /// Returns the body for inspection instead of sending.
    #[must_use]
    pub fn render_debug(&self) -> String {
        self.body.clone()
    }

    /// Returns a snapshot of the message as it would be delivered now.
    #[must_use]
    pub fn outgoing(&self) -> OutgoingMail {
        OutgoingMail {
            from: self.from.clone(),
            from_name: self.from_name.clone(),
            sender: self.sender.clone(),
            recipients: self.recipients.clone(),
            subject: self.subject.clone(),
            body: self.body.clone(),
            format: self.format,
            charset: self.charset.clone(),
            encoding: self.encoding.clone(),
            word_wrap: self.word_wrap,
            headers: self.headers.clone(),
        }
    }

    /// Lowercased recipient addresses without duplicates, in insertion order.
    fn all_recipients(&self) -> Vec<String> {
        let mut addresses: Vec<String> = Vec::with_capacity(self.recipients.len());
        for recipient in &self.recipients {
            let address = recipient.address.to_lowercase();
            if !addresses.contains(&address) {
                addresses.push(address);
            }
        }

        addresses
    }

    /// Transport kind set from an `smtp` profile.
    #[must_use]
    pub fn mailer(&self) -> Option<&str> {
        self.mailer.as_deref()
    }

    /// SMTP host from the transport profile.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// SMTP port from the transport profile.
    #[must_use]
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Body character set.
    #[must_use]
    pub fn charset(&self) -> &str {
        self.charset.as_str()
    }

    /// Content transfer encoding.
    #[must_use]
    pub fn encoding(&self) -> &str {
        self.encoding.as_str()
    }

    /// Plain-text wrap width.
    #[must_use]
    pub fn word_wrap(&self) -> usize {
        self.word_wrap
    }

    /// MIME content type of the body.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }

    /// Whether the body is rendered as HTML.
    #[must_use]
    pub fn is_html(&self) -> bool {
        self.format.is_html()
    }

    /// Envelope sender.
    #[must_use]
    pub fn sender(&self) -> &str {
        self.sender.as_str()
    }

    /// `From` address.
    #[must_use]
    pub fn from_address(&self) -> &str {
        self.from.as_str()
    }

    /// `From` display name.
    #[must_use]
    pub fn from_name(&self) -> Option<&str> {
        self.from_name.as_deref()
    }

    /// Current recipients.
    #[must_use]
    pub fn recipients(&self) -> &[Recipient] {
        &self.recipients
    }

    /// Subject line.
    #[must_use]
    pub fn subject_line(&self) -> &str {
        self.subject.as_str()
    }

    /// Body content.
    #[must_use]
    pub fn body_content(&self) -> &str {
        self.body.as_str()
    }

    /// Custom headers.
    #[must_use]
    pub fn headers(&self) -> &[MailHeader] {
        &self.headers
    }

    /// Test override recipients.
    #[must_use]
    pub fn testing_recipients(&self) -> &[String] {
        &self.testing
    }
}

fn default_profile(registry: &ProfileRegistry) -> AppResult<MessageProfile> {
    registry.config(DEFAULT_PROFILE)?.ok_or_else(|| {
        AppError::Configuration(format!(
            "message profile '{DEFAULT_PROFILE}' is not configured"
        ))
    })
}

fn named_transport(
    registry: &ProfileRegistry,
    profile: &MessageProfile,
) -> AppResult<TransportProfile> {
    registry
        .transport(profile.transport.as_str())?
        .ok_or_else(|| {
            AppError::Configuration(format!(
                "transport profile '{}' is not configured",
                profile.transport
            ))
        })
}
