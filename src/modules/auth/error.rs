use thiserror::Error;

use crate::modules::storage::StorageError;

/// Failure of a directory operation. `Display` gives the message to show the caller.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email already registered.")]
    DuplicateEmail,
    #[error("{0}")]
    NotFound(&'static str),
    #[error("Invalid password.")]
    InvalidCredentials,
    #[error("Invalid token.")]
    InvalidToken,
    #[error("Token expired.")]
    ExpiredToken,
    #[error("Password hashing failed: {0}")]
    Hashing(String),
    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl AuthError {
    pub(crate) fn no_account() -> Self {
        AuthError::NotFound("No account found with that email.")
    }

    pub(crate) fn no_user_for_token() -> Self {
        AuthError::NotFound("No user for token.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(AuthError::DuplicateEmail.to_string(), "Email already registered.");
        assert_eq!(
            AuthError::no_account().to_string(),
            "No account found with that email."
        );
        assert_eq!(AuthError::no_user_for_token().to_string(), "No user for token.");
        assert_eq!(AuthError::InvalidCredentials.to_string(), "Invalid password.");
        assert_eq!(AuthError::InvalidToken.to_string(), "Invalid token.");
        assert_eq!(AuthError::ExpiredToken.to_string(), "Token expired.");
    }
}
