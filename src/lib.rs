// First, declare the modules folder itself
mod modules;

// Re-export everything from modules for easier access
pub use modules::{auth, email, utils};

// Re-export the public surface so callers need a single import point
pub use modules::auth::{
    encode_sequence, hash_graphical_password, is_valid_email, verify_graphical_password, AuthCore,
    AuthError, CredentialStore, FileCredentialStore, MemoryCredentialStore, ProtectionPolicy,
    SecureAuthManager, StoreError, UserRecord,
};
pub use modules::email::{Notifier, NotifyError, SmtpConfig, SmtpNotifier};
pub use modules::utils::logging::init_logging;

// Constants
pub use modules::auth::password::PBKDF2_ROUNDS;
pub use modules::auth::security::RESET_TOKEN_BYTES;
