pub mod keys;

pub use keys::{generate_random_salt, key_params, rounds_in_range};
