//! Email address validation and recipient records.

use mailbridge_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

const MAX_ADDRESS_LENGTH: usize = 254;
const MAX_LOCAL_PART_LENGTH: usize = 64;
const MAX_DOMAIN_LABEL_LENGTH: usize = 63;

/// Special characters allowed in an unquoted local part (RFC 5322 `atext`).
const LOCAL_PART_SPECIALS: &str = "!#$%&'*+/=?^_`{|}~-";

/// Syntactically validated email address.
///
/// The address is kept exactly as given: unlike login identifiers, sender
/// addresses must round-trip into message headers unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Empty input and malformed input are reported with distinct messages so
    /// callers can tell a missing address from a mistyped one.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();

        if value.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        if !is_well_formed(value.as_str()) {
            return Err(AppError::Validation(format!(
                "malformed email address '{value}'"
            )));
        }

        Ok(Self(value))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

fn is_well_formed(value: &str) -> bool {
    if value.len() > MAX_ADDRESS_LENGTH {
        return false;
    }

    let Some((local, domain)) = value.rsplit_once('@') else {
        return false;
    };

    is_valid_local_part(local) && is_valid_domain(domain)
}

fn is_valid_local_part(local: &str) -> bool {
    if local.is_empty() || local.len() > MAX_LOCAL_PART_LENGTH {
        return false;
    }

    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }

    local.chars().all(|character| {
        character.is_ascii_alphanumeric()
            || character == '.'
            || LOCAL_PART_SPECIALS.contains(character)
    })
}

fn is_valid_domain(domain: &str) -> bool {
    if !domain.contains('.') {
        return false;
    }

    domain.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= MAX_DOMAIN_LABEL_LENGTH
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .chars()
                .all(|character| character.is_ascii_alphanumeric() || character == '-')
    })
}

/// A message recipient with an optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    /// Recipient address as supplied by the caller.
    pub address: String,
    /// Optional display name.
    pub name: Option<String>,
}

impl Recipient {
    /// Creates a recipient. An empty display name is treated as absent.
    #[must_use]
    pub fn new(address: impl Into<String>, name: Option<&str>) -> Self {
        Self {
            address: address.into(),
            name: name
                .filter(|value| !value.trim().is_empty())
                .map(str::to_owned),
        }
    }
}

#[cfg(test)]
mod tests {
    use mailbridge_core::AppError;

    use super::{EmailAddress, Recipient};

    #[test]
    fn valid_email_is_accepted_verbatim() {
        let email = EmailAddress::new("Jane.Doe+news@Example.COM");
        assert_eq!(
            email.unwrap_or_else(|_| unreachable!()).as_str(),
            "Jane.Doe+news@Example.COM"
        );
    }

    #[test]
    fn empty_email_reports_empty() {
        let result = EmailAddress::new("");
        assert!(matches!(
            result,
            Err(AppError::Validation(message)) if message.contains("must not be empty")
        ));
    }

    #[test]
    fn email_without_at_reports_malformed() {
        let result = EmailAddress::new("not-an-email");
        assert!(matches!(
            result,
            Err(AppError::Validation(message)) if message.starts_with("malformed")
        ));
    }

    #[test]
    fn email_with_bad_dots_is_rejected() {
        assert!(EmailAddress::new(".user@example.com").is_err());
        assert!(EmailAddress::new("us..er@example.com").is_err());
        assert!(EmailAddress::new("user@example..com").is_err());
        assert!(EmailAddress::new("user@nodot").is_err());
    }

    #[test]
    fn email_with_bad_domain_label_is_rejected() {
        assert!(EmailAddress::new("user@-example.com").is_err());
        assert!(EmailAddress::new("user@exa_mple.com").is_err());
        assert!(EmailAddress::new("user name@example.com").is_err());
    }

    #[test]
    fn overlong_local_part_is_rejected() {
        let local = "a".repeat(65);
        assert!(EmailAddress::new(format!("{local}@example.com")).is_err());
    }

    #[test]
    fn blank_recipient_name_is_dropped() {
        let recipient = Recipient::new("a@x.com", Some("  "));
        assert_eq!(recipient.name, None);

        let named = Recipient::new("a@x.com", Some("Alice"));
        assert_eq!(named.name.as_deref(), Some("Alice"));
    }
}
