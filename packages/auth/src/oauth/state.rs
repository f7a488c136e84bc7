// ABOUTME: Generation of unguessable OAuth state values for CSRF protection
// ABOUTME: States are random alphanumeric strings mapped server-side to the initiating user

use rand::{distributions::Alphanumeric, Rng};

/// 32 alphanumeric characters, roughly 190 bits of entropy
pub const STATE_LENGTH: usize = 32;

/// Generate a random, single-use OAuth state value
pub fn generate_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LENGTH)
        .map(char::from)
        .collect()
}
