use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::modules::utils::time::{format_datetime, format_duration};

pub const LOCKOUT_ALERT_SUBJECT: &str = "Alert: Suspicious Login Attempts";
pub const RESET_REQUEST_SUBJECT: &str = "Password Reset Request";

/// Body of the alert sent when an account is temporarily blocked.
pub fn lockout_alert_body(until: DateTime<Utc>) -> String {
    format!(
        "Multiple failed login attempts were detected for your account.\n\
        \n\
        Your account is temporarily blocked until {}.\n\
        \n\
        If these attempts were not yours, consider resetting your graphical \
        password once the block lifts.",
        format_datetime(until)
    )
}

/// Body of the password reset message carrying the reset token.
pub fn reset_request_body(token: &str, valid_for: Duration) -> String {
    format!(
        "A graphical password reset was requested for your account.\n\
        \n\
        Use the following token to reset your graphical password. It is \
        valid for {}:\n\
        \n\
        {}\n\
        \n\
        If you did not request this reset, you can ignore this message and \
        ensure your account is secure.",
        format_duration(valid_for),
        token
    )
}
