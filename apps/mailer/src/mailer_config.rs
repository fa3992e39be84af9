use std::env;

use mailbridge_core::AppError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct MailerConfig {
    pub config_path: Option<String>,
    pub to: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub body: String,
    pub format: Option<String>,
    pub from_address: Option<String>,
    pub from_name: Option<String>,
    pub debug: bool,
}

impl MailerConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let optional = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let to = optional("MAILER_TO")
            .ok_or_else(|| AppError::Validation("MAILER_TO is required".to_owned()))?;

        Ok(Self {
            config_path: optional("MAILER_CONFIG_PATH"),
            to,
            to_name: optional("MAILER_TO_NAME"),
            subject: optional("MAILER_SUBJECT")
                .unwrap_or_else(|| "mailbridge test message".to_owned()),
            body: optional("MAILER_BODY")
                .unwrap_or_else(|| "This message was sent by mailbridge.".to_owned()),
            format: optional("MAILER_FORMAT"),
            from_address: optional("MAILER_FROM"),
            from_name: optional("MAILER_FROM_NAME"),
            debug: optional("MAILER_DEBUG").is_some_and(|value| value.eq_ignore_ascii_case("true")),
        })
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::MailerConfig;

    fn load(vars: &[(&str, &str)]) -> Result<MailerConfig, mailbridge_core::AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        MailerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn recipient_is_required() {
        assert!(load(&[]).is_err());
        assert!(load(&[("MAILER_TO", "  ")]).is_err());
    }

    #[test]
    fn defaults_fill_optional_settings() {
        let config = load(&[("MAILER_TO", "a@x.com")]).unwrap_or_else(|_| unreachable!());

        assert_eq!(config.to, "a@x.com");
        assert_eq!(config.subject, "mailbridge test message");
        assert!(config.config_path.is_none());
        assert!(!config.debug);
    }

    #[test]
    fn debug_flag_is_case_insensitive() {
        let config = load(&[("MAILER_TO", "a@x.com"), ("MAILER_DEBUG", "TRUE")])
            .unwrap_or_else(|_| unreachable!());

        assert!(config.debug);
    }
}
