use pbkdf2::password_hash::SaltString;
use pbkdf2::Params;
use rand::rngs::OsRng;

use crate::MAX_HASH_ITERATIONS;

/// Length in bytes of a derived key
pub const KEY_LEN: usize = 32;

/// Function to generate a random salt for PBKDF2, already in PHC base64 form
pub fn generate_random_salt() -> SaltString {
    SaltString::generate(&mut OsRng)
}

/// PBKDF2 parameters for deriving a `KEY_LEN`-byte key with `rounds` iterations
pub fn key_params(rounds: u32) -> Params {
    Params {
        rounds,
        output_length: KEY_LEN,
    }
}

/// Whether `rounds` is a usable iteration count, neither zero nor above the ceiling
pub fn rounds_in_range(rounds: u32) -> bool {
    (1..=MAX_HASH_ITERATIONS).contains(&rounds)
}
