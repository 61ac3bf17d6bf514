use chrono::{DateTime, Utc};
use thiserror::Error;

use super::store::StoreError;
use crate::modules::email::NotifyError;

/// Errors produced by registration, authentication, and account protection.
#[derive(Error, Debug)]
pub enum AuthError {
    /// A record with the same username or email already exists.
    #[error("username or email already exists")]
    UserExists,

    /// No record matches the given username.
    #[error("user not found")]
    UserNotFound,

    /// The provided graphical password does not match the stored digest.
    #[error("invalid graphical password")]
    InvalidGraphicalPassword,

    #[error("graphical password sequence must not be empty")]
    EmptySequence,

    #[error("username must not be empty")]
    InvalidUsername,

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// The account is locked out; authentication was not attempted.
    #[error("account is temporarily blocked until {}", .until.format("%Y-%m-%d %H:%M:%S UTC"))]
    AccountBlocked { until: DateTime<Utc> },

    #[error("failed to hash graphical password: {0}")]
    Hashing(String),

    /// The stored digest could not be parsed, as opposed to a mismatch.
    #[error("stored graphical password digest is malformed")]
    MalformedDigest,

    #[error("failed to generate reset token: {0}")]
    TokenGeneration(String),

    #[error("credential store error: {0}")]
    Store(#[from] StoreError),

    #[error("failed to send notification: {0}")]
    Notification(#[from] NotifyError),
}
