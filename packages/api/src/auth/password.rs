//! # Password hashing and verification (Argon2id)
//!
//! - [`hash_password`] salts with [`OsRng`] and returns a PHC-format string
//!   (`$argon2id$v=19$...`) for the `password_hash` column of `profiles`.
//! - [`verify_password`] returns `Ok(false)` on mismatch and `Err` only when
//!   the stored hash is malformed.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a password using Argon2id. Returns a PHC-format string.
pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| format!("Failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

/// Verify a password against a PHC-format hash string.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, String> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| format!("Invalid password hash: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("night-shift-42").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("night-shift-42", &hash).unwrap());
        assert!(!verify_password("day-shift-42", &hash).unwrap());
        assert!(verify_password("x", "not a hash").is_err());
    }
}
