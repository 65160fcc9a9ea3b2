//! Wall-clock-seeded byte generation for salts, nonces, and raw keys.
//!
//! KNOWN WEAKNESS: randomness here derives from a coarse wall-clock
//! reading, not from a cryptographically strong entropy source. This
//! matches the original design on purpose; substituting the operating
//! system's entropy source would change output determinism and break
//! behavioral parity with other implementations.

use std::time::{SystemTime, UNIX_EPOCH};

use super::keystream::Keystream;

/// Builds a 12-byte generator seed from the current wall-clock time
/// (UNIX seconds plus subsecond nanoseconds, little-endian).
fn clock_seed() -> [u8; 12] {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let mut seed = [0u8; 12];
    seed[..8].copy_from_slice(&now.as_secs().to_le_bytes());
    seed[8..].copy_from_slice(&now.subsec_nanos().to_le_bytes());
    seed
}

/// Produces `length` pseudo-random bytes from a freshly seeded generator.
pub(crate) fn random_bytes(length: usize) -> Vec<u8> {
    let mut stream = Keystream::seeded(&clock_seed());
    stream.take_bytes(length)
}

/// Generates a fresh nonce for one encrypt call.
pub(crate) fn generate_nonce() -> [u8; crate::cipher::NONCE_LENGTH] {
    let mut stream = Keystream::seeded(&clock_seed());
    let mut nonce = [0u8; crate::cipher::NONCE_LENGTH];
    for byte in nonce.iter_mut() {
        *byte = stream.next_byte();
    }
    nonce
}

/// Generates a fresh salt for password-based key derivation.
pub(crate) fn generate_salt() -> Vec<u8> {
    random_bytes(crate::cipher::SALT_LENGTH)
}
