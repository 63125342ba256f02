use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::modules::storage::{read_json, write_json, KeyValueStore, StorageError};

/// Account role; decides where a user lands after login
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum Role {
    #[default]
    Customer,
    Admin,
    Vendor,
    Rider,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Customer, Role::Admin, Role::Vendor, Role::Rider];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
            Role::Vendor => "vendor",
            Role::Rider => "rider",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict parse for user input
impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| format!("Unknown role '{}' (expected customer, admin, vendor or rider)", s))
    }
}

/// Lenient conversion for stored data: anything unrecognised is a customer
impl From<String> for Role {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl From<Role> for &'static str {
    fn from(role: Role) -> Self {
        role.as_str()
    }
}

/// One account in the directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Unique key, compared case-insensitively but stored as entered
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub role: Role,
    /// Salted password hash, never the password itself
    pub password: String,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn matches_email(&self, email: &str) -> bool {
        self.email.to_lowercase() == email.to_lowercase()
    }
}

/// Input to a registration
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub password: String,
}

impl Registration {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }
}

/// Function to generate an identifier for a new record: creation millis plus a random tail
pub fn generate_user_id(created_at: DateTime<Utc>) -> String {
    let tail: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect();
    format!("u_{}_{}", created_at.timestamp_millis(), tail)
}

/// Find the record whose email matches case-insensitively
pub fn find_by_email<'a>(users: &'a [UserRecord], email: &str) -> Option<&'a UserRecord> {
    users.iter().find(|user| user.matches_email(email))
}

pub fn load_users(store: &dyn KeyValueStore, key: &str) -> Result<Vec<UserRecord>, StorageError> {
    read_json(store, key)
}

pub fn save_users(
    store: &mut dyn KeyValueStore,
    key: &str,
    users: &[UserRecord],
) -> Result<(), StorageError> {
    write_json(store, key, users)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::storage::MemoryStore;
    use chrono::TimeZone;

    fn sample_user(email: &str) -> UserRecord {
        UserRecord {
            id: "u_1".to_string(),
            name: "Amina".to_string(),
            email: email.to_string(),
            phone: "08030000000".to_string(),
            role: Role::Vendor,
            password: "$pbkdf2-sha256$i=1000,l=32$c2FsdHNhbHQ$aGFzaA".to_string(),
            created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("rider".parse::<Role>().unwrap(), Role::Rider);
        assert!("Admin".parse::<Role>().is_err());
        assert!("superuser".parse::<Role>().is_err());

        assert_eq!(Role::from("vendor".to_string()), Role::Vendor);
        assert_eq!(Role::from("superuser".to_string()), Role::Customer);
        assert_eq!(Role::default(), Role::Customer);
    }

    #[test]
    fn test_record_json_shape() {
        let user = sample_user("Amina@Example.com");
        let json = serde_json::to_value(&user).unwrap();

        assert_eq!(json["email"], "Amina@Example.com");
        assert_eq!(json["role"], "vendor");
        assert_eq!(json["createdAt"], "2023-11-14T22:13:20Z");
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn test_record_defaults_for_missing_fields() {
        let json = r#"{
            "id": "u_1700000000000",
            "email": "rider@example.com",
            "role": "courier",
            "password": "x",
            "createdAt": "2024-01-01T00:00:00.000Z"
        }"#;
        let user: UserRecord = serde_json::from_str(json).unwrap();
        assert_eq!(user.name, "");
        assert_eq!(user.phone, "");
        assert_eq!(user.role, Role::Customer);

        let json = r#"{"id": "u", "email": "e@x.io", "password": "x", "createdAt": "2024-01-01T00:00:00Z"}"#;
        let user: UserRecord = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, Role::Customer);
    }

    #[test]
    fn test_email_matching_is_case_insensitive() {
        let users = vec![sample_user("Amina@Example.com")];
        assert!(find_by_email(&users, "amina@example.com").is_some());
        assert!(find_by_email(&users, "AMINA@EXAMPLE.COM").is_some());
        assert!(find_by_email(&users, "amina@example.org").is_none());
    }

    #[test]
    fn test_user_id_format() {
        let created = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let id = generate_user_id(created);
        assert!(id.starts_with("u_1700000000000_"));
        assert_eq!(id.len(), "u_1700000000000_".len() + 6);
        assert_ne!(id, generate_user_id(created));
    }

    #[test]
    fn test_load_and_save_users() {
        let mut store = MemoryStore::new();
        assert!(load_users(&store, "users").unwrap().is_empty());

        let users = vec![sample_user("a@example.com"), sample_user("b@example.com")];
        save_users(&mut store, "users", &users).unwrap();

        assert_eq!(load_users(&store, "users").unwrap(), users);
    }
}
