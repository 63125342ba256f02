use pbkdf2::password_hash::{Error as HashError, PasswordHash, PasswordHasher, PasswordVerifier};
use pbkdf2::{Params, Pbkdf2};
use std::io;

use super::error::AuthError;
use crate::modules::encryption::keys::{generate_random_salt, key_params, rounds_in_range};

/// Hash a password with a fresh random salt.
///
/// The result is a PHC string, `$pbkdf2-sha256$i=<rounds>,l=32$<salt>$<hash>`,
/// so records hashed under an older iteration count still verify.
pub fn hash_password(password: &str, iterations: u32) -> Result<String, AuthError> {
    if !rounds_in_range(iterations) {
        return Err(AuthError::Hashing(format!(
            "iteration count {} out of range",
            iterations
        )));
    }

    let salt = generate_random_salt();
    let hash = Pbkdf2
        .hash_password_customized(
            password.as_bytes(),
            None,
            None,
            key_params(iterations),
            salt.as_salt(),
        )
        .map_err(|e| AuthError::Hashing(e.to_string()))?;
    Ok(hash.to_string())
}

/// Check `password` against a hash produced by [`hash_password`].
///
/// A stored hash asking for more rounds than the directory would ever issue
/// is refused before any derivation runs.
pub fn verify_password(password: &str, encoded: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(encoded).map_err(|e| AuthError::Hashing(e.to_string()))?;
    let params = Params::try_from(&parsed).map_err(|e| AuthError::Hashing(e.to_string()))?;
    if !rounds_in_range(params.rounds) {
        return Err(AuthError::Hashing(format!(
            "iteration count {} out of range",
            params.rounds
        )));
    }

    match Pbkdf2.verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(HashError::Password) => Ok(false),
        Err(e) => Err(AuthError::Hashing(e.to_string())),
    }
}

/// Helper function to read a password without echoing it
pub fn read_password() -> io::Result<String> {
    rpassword::read_password()
}
