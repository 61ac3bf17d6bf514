use super::error::AuthError;
use super::password::{dummy_digest, hash_graphical_password, verify_graphical_password};
use super::store::{CredentialStore, StoreError, UserRecord};
use super::validation::is_valid_email;
use crate::modules::utils::logging::log_auth_event;

/// Registration and plain authentication composed over a credential store.
pub struct AuthCore<S> {
    store: S,
}

impl<S: CredentialStore> AuthCore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Access the underlying credential store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Registers a new user with a username, email, and graphical password.
    /// Fails with `UserExists` if a record with the same username or email is
    /// already present, whether caught by the pre-check or by the store's own
    /// uniqueness enforcement during insert.
    pub fn register(&self, username: &str, email: &str, sequence: &[u32]) -> Result<(), AuthError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::InvalidUsername);
        }
        let email = email.trim();
        if !is_valid_email(email) {
            return Err(AuthError::InvalidEmail(email.to_string()));
        }
        if sequence.is_empty() {
            return Err(AuthError::EmptySequence);
        }

        // Best-effort early exit; the insert below remains the source of truth.
        if self.store.exists_by_username_or_email(username, email)? {
            return Err(AuthError::UserExists);
        }

        let digest = hash_graphical_password(sequence)?;
        match self.store.insert(UserRecord::new(username, email, digest)) {
            Ok(()) => {
                log_auth_event("register", username, true, None);
                Ok(())
            }
            Err(StoreError::DuplicateIdentity) => Err(AuthError::UserExists),
            Err(e) => Err(e.into()),
        }
    }

    /// Authenticates a user against their stored digest. Returns `Ok(true)`
    /// on success; failures carry the reason (`UserNotFound` or
    /// `InvalidGraphicalPassword`) for callers that inspect the error kind.
    pub fn authenticate(&self, username: &str, sequence: &[u32]) -> Result<bool, AuthError> {
        if sequence.is_empty() {
            return Err(AuthError::EmptySequence);
        }
        let record = match self.store.find_by_username(username)? {
            Some(record) => record,
            None => {
                // Burn a full verification anyway so an unknown username
                // costs as much as a wrong password.
                let _ = verify_graphical_password(sequence, dummy_digest());
                log_auth_event("login", username, false, Some("unknown username"));
                return Err(AuthError::UserNotFound);
            }
        };
        match verify_graphical_password(sequence, &record.graphical_password_hash) {
            Ok(()) => {
                log_auth_event("login", username, true, None);
                Ok(true)
            }
            Err(AuthError::InvalidGraphicalPassword) => {
                log_auth_event("login", username, false, Some("graphical password mismatch"));
                Err(AuthError::InvalidGraphicalPassword)
            }
            Err(e) => Err(e),
        }
    }
}
