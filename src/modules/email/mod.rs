pub mod notifier;
pub mod smtp;
pub mod templates;

pub use notifier::{Notifier, NotifyError, SmtpNotifier};
pub use smtp::SmtpConfig;
pub use templates::{
    lockout_alert_body, reset_request_body, LOCKOUT_ALERT_SUBJECT, RESET_REQUEST_SUBJECT,
};
