use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;

use super::core::AuthCore;
use super::error::AuthError;
use super::store::CredentialStore;
use crate::modules::email::templates::{
    lockout_alert_body, reset_request_body, LOCKOUT_ALERT_SUBJECT, RESET_REQUEST_SUBJECT,
};
use crate::modules::email::Notifier;
use crate::modules::utils::logging::log_auth_event;

/// Number of random bytes in a reset token before hex encoding.
pub const RESET_TOKEN_BYTES: usize = 32;

/// Thresholds and windows applied by `SecureAuthManager`.
#[derive(Debug, Clone)]
pub struct ProtectionPolicy {
    /// Failed attempts at which an account is blocked (`>=` comparison).
    pub attempt_threshold: u32,
    /// How long an account stays blocked after reaching the threshold.
    pub block_duration: Duration,
    /// Validity window of a password reset token.
    pub token_duration: Duration,
}

impl Default for ProtectionPolicy {
    fn default() -> Self {
        Self {
            attempt_threshold: 3,
            block_duration: Duration::from_secs(10 * 60),
            token_duration: Duration::from_secs(15 * 60),
        }
    }
}

struct ResetTokenInfo {
    token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
struct ProtectionState {
    // A username holds at most one entry in each map.
    failed_attempts: HashMap<String, u32>,
    block_until: HashMap<String, DateTime<Utc>>,
    reset_tokens: HashMap<String, ResetTokenInfo>,
}

/// Wraps `AuthCore` with per-account failed-attempt counting, temporary
/// lockout, and time-limited password reset tokens. Safe to share across
/// threads; each call runs as one critical section over the manager's state,
/// and the lock is never held while a notification is being sent.
pub struct SecureAuthManager<S> {
    core: AuthCore<S>,
    notifier: Arc<dyn Notifier>,
    policy: ProtectionPolicy,
    state: Mutex<ProtectionState>,
}

impl<S: CredentialStore> SecureAuthManager<S> {
    pub fn new(core: AuthCore<S>, notifier: Arc<dyn Notifier>, policy: ProtectionPolicy) -> Self {
        Self {
            core,
            notifier,
            policy,
            state: Mutex::new(ProtectionState::default()),
        }
    }

    /// Access the wrapped authentication core.
    pub fn core(&self) -> &AuthCore<S> {
        &self.core
    }

    pub fn policy(&self) -> &ProtectionPolicy {
        &self.policy
    }

    /// Authenticates with brute-force protection. While an account is
    /// blocked the call fails fast with `AccountBlocked` and does not count
    /// as an attempt; once the threshold is reached an alert is dispatched to
    /// `contact_address` in the background and the original failure is
    /// returned unmasked.
    pub fn authenticate_with_protection(
        &self,
        username: &str,
        sequence: &[u32],
        contact_address: &str,
    ) -> Result<bool, AuthError> {
        // Validation failures are rejected before any shared state is
        // touched; only real credential attempts feed the counter.
        if sequence.is_empty() {
            return Err(AuthError::EmptySequence);
        }
        let now = Utc::now();
        let mut state = self.state.lock().expect("protection state poisoned");

        if let Some(&until) = state.block_until.get(username) {
            if now < until {
                return Err(AuthError::AccountBlocked { until });
            }
            // The block has lapsed; the counter restarts from zero.
            state.block_until.remove(username);
            state.failed_attempts.remove(username);
        }

        match self.core.authenticate(username, sequence) {
            Ok(ok) => {
                state.failed_attempts.remove(username);
                state.block_until.remove(username);
                Ok(ok)
            }
            Err(err) => {
                let attempts = state
                    .failed_attempts
                    .entry(username.to_string())
                    .or_insert(0);
                *attempts += 1;
                if *attempts >= self.policy.attempt_threshold {
                    let until = now + self.policy.block_duration;
                    state.block_until.insert(username.to_string(), until);
                    drop(state);
                    log_auth_event("lockout", username, false, Some("attempt threshold reached"));
                    self.dispatch_lockout_alert(contact_address, until);
                }
                Err(err)
            }
        }
    }

    /// Generates a reset token for the username, stores it with an expiry
    /// (replacing any previous token), and sends it to `contact_address`.
    /// The send is synchronous: if it fails, the call fails and the caller
    /// should retry to overwrite the stranded token.
    pub fn initiate_password_reset(
        &self,
        username: &str,
        contact_address: &str,
    ) -> Result<String, AuthError> {
        let token = generate_reset_token(RESET_TOKEN_BYTES)?;
        let expires_at = Utc::now() + self.policy.token_duration;
        {
            let mut state = self.state.lock().expect("protection state poisoned");
            state.reset_tokens.insert(
                username.to_string(),
                ResetTokenInfo {
                    token: token.clone(),
                    expires_at,
                },
            );
        }

        let body = reset_request_body(&token, self.policy.token_duration);
        self.notifier
            .send(contact_address, RESET_REQUEST_SUBJECT, &body)?;
        log_auth_event("password_reset_initiated", username, true, None);
        Ok(token)
    }

    /// Checks whether the supplied token is the live one for this username.
    /// An absent or expired entry is removed and reported invalid; a token
    /// expiring exactly now counts as expired.
    pub fn validate_reset_token(&self, username: &str, token: &str) -> bool {
        let mut state = self.state.lock().expect("protection state poisoned");
        match state.reset_tokens.get(username) {
            Some(info) if Utc::now() < info.expires_at => info.token == token,
            _ => {
                state.reset_tokens.remove(username);
                false
            }
        }
    }

    // Best-effort: a failed send is logged and the lockout stands regardless.
    fn dispatch_lockout_alert(&self, contact_address: &str, until: DateTime<Utc>) {
        let notifier = Arc::clone(&self.notifier);
        let to = contact_address.to_string();
        let body = lockout_alert_body(until);
        thread::spawn(move || {
            if let Err(e) = notifier.send(&to, LOCKOUT_ALERT_SUBJECT, &body) {
                log::error!("failed to send lockout alert to {}: {}", to, e);
            }
        });
    }
}

fn generate_reset_token(n_bytes: usize) -> Result<String, AuthError> {
    let mut bytes = vec![0u8; n_bytes];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))?;
    Ok(hex::encode(bytes))
}

#[cfg(test)]
impl<S: CredentialStore> SecureAuthManager<S> {
    fn failed_attempt_count(&self, username: &str) -> u32 {
        let state = self.state.lock().unwrap();
        state.failed_attempts.get(username).copied().unwrap_or(0)
    }

    fn blocked_until(&self, username: &str) -> Option<DateTime<Utc>> {
        let state = self.state.lock().unwrap();
        state.block_until.get(username).copied()
    }

    fn has_reset_token(&self, username: &str) -> bool {
        let state = self.state.lock().unwrap();
        state.reset_tokens.contains_key(username)
    }
}
