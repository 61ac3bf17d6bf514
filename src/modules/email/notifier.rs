use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::transport::smtp::PoolConfig;
use lettre::{Message, SmtpTransport, Transport};
use thiserror::Error;

use super::smtp::SmtpConfig;

/// Errors raised while building or delivering a notification.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("notifier configuration error: {0}")]
    Config(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("failed to build message: {0}")]
    Message(String),

    #[error("failed to send message: {0}")]
    Transport(String),
}

/// Outbound notification delivery.
pub trait Notifier: Send + Sync {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Notifier backed by an SMTP relay with mandatory TLS.
pub struct SmtpNotifier {
    config: SmtpConfig,
}

impl SmtpNotifier {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// Build a notifier from process environment variables.
    pub fn from_env() -> Result<Self, NotifyError> {
        Ok(Self::new(SmtpConfig::from_env()?))
    }
}

impl Notifier for SmtpNotifier {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        let from: Mailbox = format!("gpauth <{}>", self.config.username)
            .parse()
            .map_err(|e| NotifyError::InvalidAddress(format!("from address: {}", e)))?;
        let to_address: Mailbox = to
            .parse()
            .map_err(|e| NotifyError::InvalidAddress(format!("{}: {}", to, e)))?;

        let email = Message::builder()
            .from(from)
            .to(to_address)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| NotifyError::Message(e.to_string()))?;

        // Explicit TLS configuration
        let tls_parameters = TlsParameters::builder(self.config.host.clone())
            .build()
            .map_err(|e| NotifyError::Transport(format!("TLS setup failed: {}", e)))?;

        let mailer = SmtpTransport::relay(&self.config.host)
            .map_err(|e| NotifyError::Transport(e.to_string()))?
            .credentials(Credentials::new(
                self.config.username.clone(),
                self.config.password.clone(),
            ))
            .port(self.config.port)
            .tls(Tls::Required(tls_parameters))
            .pool_config(PoolConfig::new().max_size(1))
            .timeout(Some(std::time::Duration::from_secs(10)))
            .build();

        mailer
            .send(&email)
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        log::info!("notification sent to {}", to);
        Ok(())
    }
}
