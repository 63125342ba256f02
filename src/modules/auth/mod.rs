pub mod directory;
pub mod error;
pub mod password;
pub mod session;
pub mod store;
pub mod tokens;

// Re-export the main types and functions
pub use directory::AccountDirectory;
pub use error::AuthError;
pub use password::{hash_password, verify_password};
pub use session::{route_for_role, Destination, Session};
pub use store::{Registration, Role, UserRecord};
pub use tokens::{ResetTicket, ResetToken};
