//! Password-based key derivation for SymmetricMorph.
//!
//! Stretches a password and public salt into a fixed-length secret key
//! through iterated byte mixing. No external hash primitive is used;
//! diffusion comes entirely from the per-byte transform and the XOR fold
//! of the whole buffer into a running scalar state after every round.
//!
//! The process:
//! 1. Concatenate password and salt into a working buffer.
//! 2. For each round, rewrite every buffer byte as a function of its
//!    previous value, its position, the running state, and the round
//!    index, then XOR-fold the transformed buffer into the running state.
//! 3. Build the output key by indexing cyclically into the final buffer
//!    and mixing each output byte with its index and the final state.

use zeroize::Zeroize;

/// Derives a secret key from a password and salt.
///
/// Deterministic: identical `(password, salt, iterations, key_length)`
/// always yields an identical key. An empty password and empty salt are
/// mixed from a single zero byte so the buffer is never empty.
///
/// # Parameters
/// - `password`: The password bytes.
/// - `salt`: The public salt bytes.
/// - `iterations`: Number of mixing rounds (default 20000).
/// - `key_length`: Length of the derived key in bytes (default 64).
///
/// # Returns
/// The derived key of exactly `key_length` bytes.
pub(crate) fn derive_key(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    key_length: usize,
) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(password.len() + salt.len());
    buffer.extend_from_slice(password);
    buffer.extend_from_slice(salt);
    if buffer.is_empty() {
        buffer.push(0);
    }
    let length = buffer.len();

    let mut mix: u8 = 0;
    for round in 0..iterations {
        let round_byte = round as u8;
        for (i, byte) in buffer.iter_mut().enumerate() {
            let previous = *byte;
            *byte = (previous ^ mix)
                .wrapping_add((i as u8).wrapping_mul(13))
                ^ round_byte.wrapping_mul(7);
        }
        for &byte in &buffer {
            mix ^= byte;
        }
    }

    let mut key = Vec::with_capacity(key_length);
    for j in 0..key_length {
        key.push(buffer[j % length].wrapping_add((j as u8).wrapping_mul(31)) ^ mix);
    }

    buffer.zeroize();
    key
}
