// First, declare the modules folder itself
mod modules;

// Re-export everything from modules for easier access
pub use modules::{auth, config, encryption, storage, utils};

// Re-export commonly used types
pub use modules::auth::{
    AccountDirectory, AuthError, Destination, Registration, ResetTicket, Role, Session, UserRecord,
};
pub use modules::config::{ConfigError, DirectoryConfig};
pub use modules::storage::{FileStore, KeyValueStore, MemoryStore, StorageError};

// Storage keys
pub const USERS_KEY: &str = "arewadeliver_users";
pub const RESET_TOKENS_KEY: &str = "arewadeliver_reset_tokens";
pub const SESSION_KEY: &str = "arewa_session";

// Defaults
pub const RESET_TOKEN_DURATION: u64 = 3600;
pub const DEFAULT_HASH_ITERATIONS: u32 = 100_000;
pub const MAX_HASH_ITERATIONS: u32 = 1_000_000;
pub const DEFAULT_RESET_BASE_URL: &str = "http://localhost/";
pub const DEFAULT_RESET_PAGE: &str = "reset_password.html";
