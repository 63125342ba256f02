use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::modules::storage::{read_json, write_json, KeyValueStore, StorageError};

/// Length of the random part of a reset token
const TOKEN_RANDOM_LEN: usize = 24;

/// Stored reset tokens keyed by token string
pub type TokenTable = HashMap<String, ResetToken>;

/// A single-use credential authorizing one password change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResetToken {
    pub token: String,
    /// Stored email of the account the token was issued for
    pub email: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub expires: DateTime<Utc>,
}

impl ResetToken {
    pub fn issue(email: &str, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            token: generate_reset_token(now),
            email: email.to_string(),
            expires: now + ttl,
        }
    }

    /// A token is dead from its expiry instant onwards
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires
    }
}

/// What a reset request hands back: the token and the link that would carry it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetTicket {
    pub token: String,
    pub reset_url: String,
}

/// Random alphanumeric body from the thread CSPRNG plus a base36 millisecond suffix
pub fn generate_reset_token(now: DateTime<Utc>) -> String {
    let body: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_RANDOM_LEN)
        .map(char::from)
        .collect();
    let millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
    format!("{}{}", body, to_base36(millis))
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(DIGITS[(value % 36) as usize] as char);
        value /= 36;
    }
    digits.iter().rev().collect()
}

pub fn load_tokens(store: &dyn KeyValueStore, key: &str) -> Result<TokenTable, StorageError> {
    read_json(store, key)
}

pub fn save_tokens(
    store: &mut dyn KeyValueStore,
    key: &str,
    tokens: &TokenTable,
) -> Result<(), StorageError> {
    write_json(store, key, tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::storage::MemoryStore;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_123).unwrap()
    }

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_700_000_000_123), "loyw3v5n");
    }

    #[test]
    fn test_token_shape() {
        let token = generate_reset_token(fixed_now());
        assert!(token.ends_with(&to_base36(1_700_000_000_123)));
        assert_eq!(token.len(), TOKEN_RANDOM_LEN + 8);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(token, generate_reset_token(fixed_now()));
    }

    #[test]
    fn test_expiry_boundary() {
        let now = fixed_now();
        let entry = ResetToken::issue("amina@example.com", now, Duration::hours(1));
        assert_eq!(entry.expires, now + Duration::hours(1));

        assert!(!entry.is_expired(now));
        assert!(!entry.is_expired(entry.expires - Duration::milliseconds(1)));
        assert!(entry.is_expired(entry.expires));
        assert!(entry.is_expired(entry.expires + Duration::seconds(1)));
    }

    #[test]
    fn test_expires_is_stored_as_millis() {
        let entry = ResetToken {
            token: "abc".to_string(),
            email: "amina@example.com".to_string(),
            expires: fixed_now(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["expires"], 1_700_000_000_123i64);
    }

    #[test]
    fn test_ticket_json_shape() {
        let ticket = ResetTicket {
            token: "abc".to_string(),
            reset_url: "http://localhost/reset_password.html?token=abc".to_string(),
        };
        let json = serde_json::to_value(&ticket).unwrap();
        assert_eq!(json["resetUrl"], "http://localhost/reset_password.html?token=abc");
    }

    #[test]
    fn test_load_and_save_tokens() {
        let mut store = MemoryStore::new();
        assert!(load_tokens(&store, "tokens").unwrap().is_empty());

        let entry = ResetToken::issue("amina@example.com", fixed_now(), Duration::hours(1));
        let mut tokens = TokenTable::new();
        tokens.insert(entry.token.clone(), entry.clone());
        save_tokens(&mut store, "tokens", &tokens).unwrap();

        let loaded = load_tokens(&store, "tokens").unwrap();
        assert_eq!(loaded.get(&entry.token), Some(&entry));
    }
}
