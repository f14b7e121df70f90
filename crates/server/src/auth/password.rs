use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Outcome of a password check against a stored hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Invalid,
    Valid,
    /// Correct password against a legacy bcrypt hash; replace it with an
    /// argon2 hash on the way out.
    ValidNeedsRehash,
}

/// Hash a password with argon2id.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a stored hash. Accepts argon2 hashes and
/// legacy bcrypt hashes from pre-migration accounts.
pub fn verify_password(password: &str, hash: &str) -> Result<Verification, String> {
    if hash.starts_with("$argon2") {
        let parsed = PasswordHash::new(hash).map_err(|e| e.to_string())?;
        let valid = Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok();
        Ok(if valid {
            Verification::Valid
        } else {
            Verification::Invalid
        })
    } else if hash.starts_with("$2a$") || hash.starts_with("$2b$") || hash.starts_with("$2y$") {
        let valid = bcrypt::verify(password, hash).unwrap_or(false);
        Ok(if valid {
            Verification::ValidNeedsRehash
        } else {
            Verification::Invalid
        })
    } else {
        Err("Unknown hash format".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("test_password_123").unwrap();
        assert!(hash.starts_with("$argon2"));

        assert_eq!(
            verify_password("test_password_123", &hash).unwrap(),
            Verification::Valid
        );
        assert_eq!(
            verify_password("wrong_password", &hash).unwrap(),
            Verification::Invalid
        );
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(verify_password("whatever", "plaintext-hash").is_err());
    }
}
