use std::env;

use serde::{Deserialize, Serialize};

use super::notifier::NotifyError;

/// SMTP relay settings for outbound notifications
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SmtpConfig {
    // The email address/username for SMTP authentication
    pub username: String,
    // The password or app-specific password for SMTP
    pub password: String,
    // SMTP server hostname (e.g., smtp.gmail.com)
    pub host: String,
    // SMTP server port (typically 587 for TLS)
    pub port: u16,
}

impl SmtpConfig {
    /// Load settings from the SMTP_USER, SMTP_PASS, SMTP_HOST and SMTP_PORT
    /// environment variables.
    pub fn from_env() -> Result<Self, NotifyError> {
        let username = require_env("SMTP_USER")?;
        let password = require_env("SMTP_PASS")?;
        let host = require_env("SMTP_HOST")?;
        let port = require_env("SMTP_PORT")?
            .parse()
            .map_err(|_| NotifyError::Config("SMTP_PORT is not a valid port number".to_string()))?;
        Ok(Self {
            username,
            password,
            host,
            port,
        })
    }
}

fn require_env(name: &str) -> Result<String, NotifyError> {
    env::var(name).map_err(|_| NotifyError::Config(format!("{} is not set", name)))
}
