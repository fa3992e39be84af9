//! Plain text and HTML body formats.

/// Rendering format of a message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailFormat {
    /// `text/plain` body.
    Plain,
    /// `text/html` body.
    Html,
}

impl EmailFormat {
    /// Resolves a configured format value.
    ///
    /// Any value containing `plain`, or exactly `text`, selects plain text.
    /// Everything else, including the empty string, selects HTML. The match
    /// is deliberately loose: `"plaintext"` is plain.
    #[must_use]
    pub fn from_setting(value: &str) -> Self {
        if value.contains("plain") || value == "text" {
            Self::Plain
        } else {
            Self::Html
        }
    }

    /// Returns the MIME content type for this format.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Plain => "text/plain",
            Self::Html => "text/html",
        }
    }

    /// Returns whether the body is rendered as HTML.
    #[must_use]
    pub fn is_html(&self) -> bool {
        matches!(self, Self::Html)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::EmailFormat;

    #[test]
    fn plain_variants_select_plain() {
        assert_eq!(EmailFormat::from_setting("plain"), EmailFormat::Plain);
        assert_eq!(EmailFormat::from_setting("text"), EmailFormat::Plain);
        assert_eq!(EmailFormat::from_setting("plaintext"), EmailFormat::Plain);
    }

    #[test]
    fn other_values_select_html() {
        assert_eq!(EmailFormat::from_setting("html"), EmailFormat::Html);
        assert_eq!(EmailFormat::from_setting(""), EmailFormat::Html);
        assert_eq!(EmailFormat::from_setting("text/html"), EmailFormat::Html);
        assert_eq!(EmailFormat::from_setting("both"), EmailFormat::Html);
    }

    #[test]
    fn content_type_follows_format() {
        assert_eq!(EmailFormat::Plain.content_type(), "text/plain");
        assert_eq!(EmailFormat::Html.content_type(), "text/html");
        assert!(EmailFormat::Html.is_html());
    }

    proptest! {
        #[test]
        fn any_value_containing_plain_is_plain(prefix in "[a-z ]{0,8}", suffix in "[a-z ]{0,8}") {
            let value = format!("{prefix}plain{suffix}");
            prop_assert_eq!(EmailFormat::from_setting(&value), EmailFormat::Plain);
        }

        #[test]
        fn values_without_plain_are_html_unless_text(value in "[a-oq-z]{0,12}") {
            let expected = if value == "text" { EmailFormat::Plain } else { EmailFormat::Html };
            prop_assert_eq!(EmailFormat::from_setting(&value), expected);
        }
    }
}
