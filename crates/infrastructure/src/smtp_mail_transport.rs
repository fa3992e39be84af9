//! SMTP mail transport using the `lettre` crate.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::{ContentTransferEncoding, ContentType, HeaderName, HeaderValue};
use lettre::message::{Body, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use mailbridge_application::MailTransport;
use mailbridge_core::{AppError, AppResult};
use mailbridge_domain::{OutgoingMail, TransportSettings};
use tracing::debug;

const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpTlsMode {
    /// Plain connection upgraded with STARTTLS.
    StartTls,
    /// TLS from the first byte (SMTPS).
    Tls,
    /// Unencrypted connection, for local relays and test servers.
    None,
}

impl SmtpTlsMode {
    /// Parses `starttls`, `tls` or `none`.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value.to_ascii_lowercase().as_str() {
            "starttls" => Ok(Self::StartTls),
            "tls" | "ssl" => Ok(Self::Tls),
            "none" | "false" => Ok(Self::None),
            other => Err(AppError::Validation(format!(
                "SMTP tls mode must be 'starttls', 'tls' or 'none', got '{other}'"
            ))),
        }
    }
}

/// SMTP transport configuration.
#[derive(Clone)]
pub struct SmtpTransportConfig {
    /// SMTP server hostname.
    pub host: String,
    /// SMTP server port. The TLS mode's default port is used when unset.
    pub port: Option<u16>,
    /// SMTP username.
    pub username: Option<String>,
    /// SMTP password.
    pub password: Option<String>,
    /// Connection security.
    pub tls: SmtpTlsMode,
    /// Connection timeout.
    pub timeout: Duration,
}

impl SmtpTransportConfig {
    /// Reads SMTP settings from a transport profile.
    pub fn from_settings(settings: &TransportSettings) -> AppResult<Self> {
        let host = settings
            .host()
            .filter(|host| !host.trim().is_empty())
            .ok_or_else(|| {
                AppError::Configuration("smtp transport requires a 'host'".to_owned())
            })?
            .to_owned();

        let tls = match settings.get_str("tls") {
            Some(mode) => SmtpTlsMode::parse(mode)?,
            None => SmtpTlsMode::StartTls,
        };

        let timeout = settings
            .get_u64("timeout")?
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS);

        Ok(Self {
            host,
            port: settings.port()?,
            username: settings.user().map(str::to_owned),
            password: settings.pass().map(str::to_owned),
            tls,
            timeout: Duration::from_secs(timeout),
        })
    }
}

/// Production mail transport using SMTP.
#[derive(Clone)]
pub struct SmtpMailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailTransport {
    /// Creates a new SMTP transport.
    pub fn new(config: SmtpTransportConfig) -> AppResult<Self> {
        let mut builder = match config.tls {
            SmtpTlsMode::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            }
            SmtpTlsMode::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|error| {
                    AppError::Configuration(format!("failed to create SMTP transport: {error}"))
                })?,
            SmtpTlsMode::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host).map_err(
                    |error| {
                        AppError::Configuration(format!(
                            "failed to create SMTP transport: {error}"
                        ))
                    },
                )?
            }
        };

        builder = builder.timeout(Some(config.timeout));

        if let Some(port) = config.port {
            builder = builder.port(port);
        }

        if let (Some(username), Some(password)) = (config.username, config.password) {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn deliver(&self, mail: &OutgoingMail) -> AppResult<()> {
        let message = build_message(mail)?;

        self.transport
            .send(message)
            .await
            .map_err(|error| AppError::Delivery(format!("failed to send email: {error}")))?;

        debug!(recipients = mail.recipients.len(), "email accepted by SMTP server");

        Ok(())
    }
}

/// Converts a composed message into a lettre message.
pub(crate) fn build_message(mail: &OutgoingMail) -> AppResult<Message> {
    let from = Mailbox::new(mail.from_name.clone(), parse_address(mail.from_address(), "from")?);
    let mut builder = Message::builder().from(from);

    if !mail.sender.is_empty() {
        builder = builder.sender(Mailbox::new(None, parse_address(&mail.sender, "sender")?));
    }

    for recipient in &mail.recipients {
        let address = parse_address(&recipient.address, "recipient")?;
        builder = builder.to(Mailbox::new(recipient.name.clone(), address));
    }

    for header in &mail.headers {
        let name = HeaderName::new_from_ascii(header.name.clone()).map_err(|error| {
            AppError::Validation(format!("invalid header name '{}': {error}", header.name))
        })?;
        builder = builder.raw_header(HeaderValue::new(name, header.value.clone()));
    }

    let content_type = ContentType::parse(&format!(
        "{}; charset={}",
        mail.format.content_type(),
        mail.charset
    ))
    .map_err(|error| AppError::Validation(format!("invalid content type: {error}")))?;

    let encoding = transfer_encoding(&mail.encoding)?;
    let body = Body::new_with_encoding(mail.rendered_body(), encoding).map_err(|_| {
        AppError::Validation(format!(
            "email body cannot be sent with '{}' encoding",
            mail.encoding
        ))
    })?;

    builder
        .subject(mail.subject.clone())
        .header(content_type)
        .body(body)
        .map_err(|error| AppError::Validation(format!("failed to build email: {error}")))
}

fn parse_address(value: &str, role: &str) -> AppResult<Address> {
    value
        .parse()
        .map_err(|error| AppError::Validation(format!("invalid {role} address '{value}': {error}")))
}

fn transfer_encoding(value: &str) -> AppResult<ContentTransferEncoding> {
    match value.to_ascii_lowercase().as_str() {
        "quoted-printable" => Ok(ContentTransferEncoding::QuotedPrintable),
        "base64" => Ok(ContentTransferEncoding::Base64),
        "8bit" => Ok(ContentTransferEncoding::EightBit),
        "7bit" => Ok(ContentTransferEncoding::SevenBit),
        other => Err(AppError::Validation(format!(
            "unsupported content transfer encoding '{other}'"
        ))),
    }
}
