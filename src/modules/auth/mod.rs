pub mod core;
pub mod error;
pub mod password;
pub mod security;
pub mod store;
pub mod validation;

// Re-export the main types and functions
pub use self::core::AuthCore;
pub use error::AuthError;
pub use password::{encode_sequence, hash_graphical_password, verify_graphical_password};
pub use security::{ProtectionPolicy, SecureAuthManager};
pub use store::{
    CredentialStore, FileCredentialStore, MemoryCredentialStore, StoreError, UserRecord,
};
pub use validation::is_valid_email;
