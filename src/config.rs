//! Settings for the advice service and the mail relay.
//!
//! Both groups are flattened into the command line and can also be supplied
//! through environment variables, so credentials never need to live in the
//! ledger directory or in shell history.

use clap::Args;

use crate::application::AppError;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro-latest";
pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 465;

#[derive(Debug, Clone, Args)]
pub struct AdviceConfig {
    /// API key for the Gemini generative language API
    #[arg(long = "gemini-api-key", env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model used for advice and chat
    #[arg(long = "gemini-model", env = "GEMINI_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
    pub model: String,

    /// Base URL of the generative language API
    #[arg(long = "gemini-endpoint", env = "GEMINI_ENDPOINT", default_value = DEFAULT_GEMINI_ENDPOINT)]
    pub endpoint: String,
}

impl AdviceConfig {
    pub fn api_key(&self) -> Result<&str, AppError> {
        non_blank(self.api_key.as_deref())
            .ok_or_else(|| AppError::MissingConfig("GEMINI_API_KEY".into()))
    }

    /// Model name without the `models/` prefix the API paths already carry.
    pub fn model_name(&self) -> &str {
        let model = self.model.trim();
        model.strip_prefix("models/").unwrap_or(model)
    }
}

impl Default for AdviceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct SmtpConfig {
    /// SMTP relay host (implicit TLS)
    #[arg(long = "smtp-host", env = "CASHBOOK_SMTP_HOST", default_value = DEFAULT_SMTP_HOST)]
    pub host: String,

    /// SMTP relay port
    #[arg(long = "smtp-port", env = "CASHBOOK_SMTP_PORT", default_value_t = DEFAULT_SMTP_PORT)]
    pub port: u16,

    /// SMTP login
    #[arg(long = "smtp-username", env = "CASHBOOK_SMTP_USERNAME")]
    pub username: Option<String>,

    /// SMTP password (for Gmail, an app password)
    #[arg(long = "smtp-password", env = "CASHBOOK_SMTP_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Sender address; defaults to the SMTP login
    #[arg(long = "smtp-from", env = "CASHBOOK_SMTP_FROM")]
    pub from: Option<String>,
}

impl SmtpConfig {
    pub fn credentials(&self) -> Result<(&str, &str), AppError> {
        let username = non_blank(self.username.as_deref())
            .ok_or_else(|| AppError::MissingConfig("CASHBOOK_SMTP_USERNAME".into()))?;
        let password = non_blank(self.password.as_deref())
            .ok_or_else(|| AppError::MissingConfig("CASHBOOK_SMTP_PASSWORD".into()))?;
        Ok((username, password))
    }

    pub fn sender(&self) -> Result<&str, AppError> {
        non_blank(self.from.as_deref())
            .or_else(|| non_blank(self.username.as_deref()))
            .ok_or_else(|| AppError::MissingConfig("CASHBOOK_SMTP_FROM".into()))
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SMTP_HOST.to_string(),
            port: DEFAULT_SMTP_PORT,
            username: None,
            password: None,
            from: None,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key() {
        let config = AdviceConfig {
            api_key: Some("  ".into()),
            ..AdviceConfig::default()
        };
        assert!(matches!(config.api_key(), Err(AppError::MissingConfig(_))));
    }

    #[test]
    fn test_model_prefix_is_stripped() {
        let config = AdviceConfig {
            model: "models/gemini-1.5-pro-latest".into(),
            ..AdviceConfig::default()
        };
        assert_eq!(config.model_name(), "gemini-1.5-pro-latest");
    }

    #[test]
    fn test_sender_falls_back_to_username() {
        let config = SmtpConfig {
            username: Some("me@example.com".into()),
            ..SmtpConfig::default()
        };
        assert_eq!(config.sender().unwrap(), "me@example.com");
        assert!(matches!(
            config.credentials(),
            Err(AppError::MissingConfig(_))
        ));
    }
}
