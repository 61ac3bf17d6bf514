use itertools::Itertools;
use lazy_static::lazy_static;
use pbkdf2::password_hash::{
    rand_core::OsRng, Error as HashError, PasswordHash, PasswordHasher, PasswordVerifier,
    SaltString,
};
use pbkdf2::{Params, Pbkdf2};

use super::error::AuthError;

/// PBKDF2-HMAC-SHA256 round count applied to every digest.
pub const PBKDF2_ROUNDS: u32 = 10_000;

/// Length in bytes of the derived key stored inside the digest.
const OUTPUT_LENGTH: usize = 32;

lazy_static! {
    // Verified on the unknown-username path so that lookups for missing and
    // existing accounts take comparable time.
    static ref DUMMY_DIGEST: String = hash_graphical_password(&[0]).unwrap_or_default();
}

pub(crate) fn dummy_digest() -> &'static str {
    &DUMMY_DIGEST
}

/// Converts a graphical password (a sequence of image indices) into its
/// canonical dash-separated form. For example, `[1, 3, 5]` becomes `"1-3-5"`.
/// Decimal digits cannot contain the separator, so two distinct sequences
/// never share an encoding.
pub fn encode_sequence(sequence: &[u32]) -> String {
    sequence.iter().join("-")
}

/// Encodes the provided graphical password and hashes it with PBKDF2-SHA256
/// under a fresh random salt, returning a self-describing PHC string.
pub fn hash_graphical_password(sequence: &[u32]) -> Result<String, AuthError> {
    if sequence.is_empty() {
        return Err(AuthError::EmptySequence);
    }
    let encoded = encode_sequence(sequence);
    let salt = SaltString::generate(&mut OsRng);
    let digest = Pbkdf2
        .hash_password_customized(
            encoded.as_bytes(),
            // Default algorithm identifier, pbkdf2-sha256.
            None,
            None,
            Params {
                rounds: PBKDF2_ROUNDS,
                output_length: OUTPUT_LENGTH,
            },
            &salt,
        )
        .map_err(|e| AuthError::Hashing(e.to_string()))?;
    Ok(digest.to_string())
}

/// Compares the provided graphical password with a stored digest using the
/// primitive's constant-time comparison. A mismatch and an unparseable digest
/// are reported as distinct error kinds.
pub fn verify_graphical_password(sequence: &[u32], digest: &str) -> Result<(), AuthError> {
    if sequence.is_empty() {
        return Err(AuthError::EmptySequence);
    }
    let encoded = encode_sequence(sequence);
    let parsed = PasswordHash::new(digest).map_err(|_| AuthError::MalformedDigest)?;
    match Pbkdf2.verify_password(encoded.as_bytes(), &parsed) {
        Ok(()) => Ok(()),
        Err(HashError::Password) => Err(AuthError::InvalidGraphicalPassword),
        Err(_) => Err(AuthError::MalformedDigest),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_is_canonical() {
        assert_eq!(encode_sequence(&[1, 3, 5]), "1-3-5");
        assert_eq!(encode_sequence(&[7]), "7");
        assert_eq!(encode_sequence(&[]), "");
    }

    #[test]
    fn test_encoding_is_injective() {
        // Adjacent digits must never collapse into the same string.
        assert_ne!(encode_sequence(&[1, 23]), encode_sequence(&[12, 3]));
        assert_ne!(encode_sequence(&[1, 2, 3]), encode_sequence(&[1, 23]));
    }

    #[test]
    fn test_hash_and_verify_round_trip() {
        let sequence = [1, 3, 5, 7];
        let digest = hash_graphical_password(&sequence).unwrap();
        assert!(verify_graphical_password(&sequence, &digest).is_ok());
    }

    #[test]
    fn test_verify_rejects_different_sequence() {
        let digest = hash_graphical_password(&[1, 3, 5, 7]).unwrap();
        assert!(matches!(
            verify_graphical_password(&[1, 3, 5, 8], &digest),
            Err(AuthError::InvalidGraphicalPassword)
        ));
        assert!(matches!(
            verify_graphical_password(&[1, 23], &digest),
            Err(AuthError::InvalidGraphicalPassword)
        ));
    }

    #[test]
    fn test_salts_differ_between_digests() {
        let first = hash_graphical_password(&[2, 4, 6]).unwrap();
        let second = hash_graphical_password(&[2, 4, 6]).unwrap();
        assert_ne!(first, second);
        assert!(verify_graphical_password(&[2, 4, 6], &first).is_ok());
        assert!(verify_graphical_password(&[2, 4, 6], &second).is_ok());
    }

    #[test]
    fn test_empty_sequence_is_rejected() {
        assert!(matches!(
            hash_graphical_password(&[]),
            Err(AuthError::EmptySequence)
        ));
        let digest = hash_graphical_password(&[9]).unwrap();
        assert!(matches!(
            verify_graphical_password(&[], &digest),
            Err(AuthError::EmptySequence)
        ));
    }

    #[test]
    fn test_malformed_digest_is_distinguished() {
        assert!(matches!(
            verify_graphical_password(&[1, 2], "not a digest"),
            Err(AuthError::MalformedDigest)
        ));
    }

    #[test]
    fn test_dummy_digest_is_usable() {
        assert!(verify_graphical_password(&[0], dummy_digest()).is_ok());
    }
}
